use super::{ArcIdx, Arcs, BeachLine};
use crate::sites::SiteSet;

/// The simplest beach line: walk the arcs from the left until we find the
/// one that reaches past `x`.
///
/// Lookups take linear time, but there's nothing to maintain.
#[derive(Clone, Copy, Debug, Default)]
pub struct ArcList;

impl BeachLine for ArcList {
    fn locate(&mut self, arcs: &Arcs, sites: &SiteSet, x: f64, sweep_y: f64) -> Option<ArcIdx> {
        let mut arc = arcs.head()?;
        while let Some(next) = arcs.right(arc) {
            if x <= arcs.right_break_x(sites, arc, sweep_y) {
                break;
            }
            arc = next;
        }
        Some(arc)
    }

    fn insert_first(&mut self, _arcs: &Arcs, _arc: ArcIdx) {}

    fn insert_after(&mut self, _arcs: &Arcs, _after: ArcIdx, _arc: ArcIdx) {}

    fn remove(&mut self, _arcs: &Arcs, _arc: ArcIdx) {}

    fn check_invariants(&self, _arcs: &Arcs) {}
}
