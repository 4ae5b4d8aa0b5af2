//! The beach line: the parabolic arcs that are currently visible from the
//! sweep line, in left-to-right order.
//!
//! The arcs themselves, and their left-to-right order, live in an [`Arcs`]
//! arena that's shared by all representations. What differs between
//! representations is how they find the arc above a point; that's the
//! [`BeachLine`] trait, with a linked-list implementation ([`ArcList`]) and
//! a splay-tree implementation ([`SplayTree`]).
//!
//! A breakpoint is identified by the arc on its left: every arc except the
//! rightmost one has a breakpoint on its right, and that's where we keep the
//! half-edge that the breakpoint is tracing.

use crate::{
    dcel::HalfEdgeIdx,
    events::EventKey,
    geom::{breakpoint_x, Point},
    sites::{SiteIdx, SiteSet},
};

mod list;
mod splay;

pub use list::ArcList;
pub use splay::SplayTree;

/// An index into the [`Arcs`] arena.
#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash, serde::Serialize)]
pub struct ArcIdx(pub(crate) usize);

impl std::fmt::Debug for ArcIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "a{}", self.0)
    }
}

/// A parabolic arc.
#[derive(Clone, Debug, PartialEq)]
pub struct Arc {
    /// The site whose parabola this arc is part of.
    pub site: SiteIdx,
    /// The circle event that will remove this arc, if one is pending.
    pub circle_event: Option<EventKey>,
    prev: Option<ArcIdx>,
    next: Option<ArcIdx>,
    right_edge: Option<HalfEdgeIdx>,
    live: bool,
}

/// The meeting point of two neighboring arcs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BreakPoint {
    /// The arc on the left.
    pub left: ArcIdx,
    /// The arc on the right.
    pub right: ArcIdx,
    /// The half-edge pair this breakpoint is tracing out, once it's been
    /// assigned one.
    pub edge: Option<HalfEdgeIdx>,
}

impl BreakPoint {
    /// The horizontal position of this breakpoint when the sweep line is at `sweep_y`.
    pub fn x(&self, arcs: &Arcs, sites: &SiteSet, sweep_y: f64) -> f64 {
        breakpoint_x(
            sites[arcs[self.left].site],
            sites[arcs[self.right].site],
            sweep_y,
        )
    }
}

/// The arcs of a beach line, linked in left-to-right order.
///
/// Removed arcs stay in the arena (so indices stay valid), but they're
/// unlinked and marked dead.
#[derive(Clone, Debug, Default)]
pub struct Arcs {
    arcs: Vec<Arc>,
    head: Option<ArcIdx>,
    len: usize,
}

impl std::ops::Index<ArcIdx> for Arcs {
    type Output = Arc;

    fn index(&self, index: ArcIdx) -> &Arc {
        &self.arcs[index.0]
    }
}

impl Arcs {
    /// The leftmost arc.
    pub fn head(&self) -> Option<ArcIdx> {
        self.head
    }

    /// The number of live arcs.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Are there no live arcs?
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The arc to the left of `arc`.
    pub fn left(&self, arc: ArcIdx) -> Option<ArcIdx> {
        self.arcs[arc.0].prev
    }

    /// The arc to the right of `arc`.
    pub fn right(&self, arc: ArcIdx) -> Option<ArcIdx> {
        self.arcs[arc.0].next
    }

    /// The live arcs, from left to right.
    pub fn iter(&self) -> impl Iterator<Item = ArcIdx> + '_ {
        std::iter::successors(self.head, |&a| self.right(a))
    }

    /// The breakpoint on the left of `arc`.
    pub fn left_break(&self, arc: ArcIdx) -> Option<BreakPoint> {
        self.left(arc).and_then(|l| self.right_break(l))
    }

    /// The breakpoint on the right of `arc`.
    pub fn right_break(&self, arc: ArcIdx) -> Option<BreakPoint> {
        let a = &self.arcs[arc.0];
        a.next.map(|right| BreakPoint {
            left: arc,
            right,
            edge: a.right_edge,
        })
    }

    /// Where `arc` starts, or negative infinity for the leftmost arc.
    pub fn left_break_x(&self, sites: &SiteSet, arc: ArcIdx, sweep_y: f64) -> f64 {
        self.left_break(arc)
            .map_or(f64::NEG_INFINITY, |bp| bp.x(self, sites, sweep_y))
    }

    /// Where `arc` ends, or infinity for the rightmost arc.
    pub fn right_break_x(&self, sites: &SiteSet, arc: ArcIdx, sweep_y: f64) -> f64 {
        self.right_break(arc)
            .map_or(f64::INFINITY, |bp| bp.x(self, sites, sweep_y))
    }

    fn push(&mut self, site: SiteIdx) -> ArcIdx {
        self.arcs.push(Arc {
            site,
            circle_event: None,
            prev: None,
            next: None,
            right_edge: None,
            live: true,
        });
        self.len += 1;
        ArcIdx(self.arcs.len() - 1)
    }

    fn link_after(&mut self, after: ArcIdx, arc: ArcIdx) {
        let next = self.arcs[after.0].next;
        self.arcs[arc.0].prev = Some(after);
        self.arcs[arc.0].next = next;
        self.arcs[after.0].next = Some(arc);
        if let Some(next) = next {
            self.arcs[next.0].prev = Some(arc);
        }
    }

    fn unlink(&mut self, arc: ArcIdx) {
        let Arc { prev, next, .. } = self.arcs[arc.0];
        match prev {
            Some(p) => self.arcs[p.0].next = next,
            None => self.head = next,
        }
        if let Some(n) = next {
            self.arcs[n.0].prev = prev;
        }
        let a = &mut self.arcs[arc.0];
        a.prev = None;
        a.next = None;
        a.right_edge = None;
        a.live = false;
        self.len -= 1;
    }

    /// Checks that the links are consistent.
    pub fn check_invariants(&self) {
        let mut count = 0;
        let mut prev = None;
        for arc in self.iter() {
            assert!(self.arcs[arc.0].live, "dead arc {arc:?} is still linked");
            assert_eq!(self.arcs[arc.0].prev, prev, "bad back link at {arc:?}");
            count += 1;
            assert!(count <= self.len, "the arc list has a cycle");
            prev = Some(arc);
        }
        assert_eq!(count, self.len);
    }
}

/// A way of finding arcs in the beach line.
///
/// Implementations index the arcs of an [`Arcs`] arena, and get told about
/// every change to its order. They're allowed to reorganize themselves on
/// lookups, which is why [`BeachLine::locate`] takes `&mut self`.
pub trait BeachLine: Default + std::fmt::Debug {
    /// Finds the arc above horizontal position `x` when the sweep line is
    /// at `sweep_y`, or `None` if the beach line is empty.
    fn locate(&mut self, arcs: &Arcs, sites: &SiteSet, x: f64, sweep_y: f64) -> Option<ArcIdx>;

    /// Records `arc` as the only arc of a (previously empty) beach line.
    fn insert_first(&mut self, arcs: &Arcs, arc: ArcIdx);

    /// Records that `arc` has been linked in directly to the right of `after`.
    fn insert_after(&mut self, arcs: &Arcs, after: ArcIdx, arc: ArcIdx);

    /// Records that `arc` is about to be unlinked.
    fn remove(&mut self, arcs: &Arcs, arc: ArcIdx);

    /// Checks that the index agrees with the arena's order.
    fn check_invariants(&self, arcs: &Arcs);
}

/// The result of removing an arc.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RemovedArc {
    /// The breakpoint that was on the left of the removed arc.
    pub left: BreakPoint,
    /// The breakpoint that was on the right of the removed arc.
    pub right: BreakPoint,
    /// The new breakpoint between the removed arc's neighbors. It isn't
    /// tracing anything yet.
    pub merged: BreakPoint,
}

/// The beach line, with its search structure.
#[derive(Clone, Debug, Default)]
pub struct BeachLineStatus<B> {
    arcs: Arcs,
    index: B,
}

impl<B: BeachLine> BeachLineStatus<B> {
    /// An empty beach line.
    pub fn new() -> Self {
        Self::default()
    }

    /// The arcs.
    pub fn arcs(&self) -> &Arcs {
        &self.arcs
    }

    /// Is the beach line empty?
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Starts off an empty beach line with a single arc.
    pub fn init_with_arc(&mut self, site: SiteIdx) -> ArcIdx {
        assert!(self.is_empty(), "the beach line was already started");
        let arc = self.arcs.push(site);
        self.arcs.head = Some(arc);
        self.index.insert_first(&self.arcs, arc);
        arc
    }

    /// The arc directly above `point`, when the sweep line is at `point.y`.
    ///
    /// Panics if the beach line is empty.
    pub fn arc_above(&mut self, sites: &SiteSet, point: Point) -> ArcIdx {
        self.index
            .locate(&self.arcs, sites, point.x, point.y)
            .unwrap_or_else(|| panic!("no arc above {point:?} in an empty beach line"))
    }

    /// Splits `arc` in two, and puts a new arc for `site` in between.
    ///
    /// `arc` keeps its index and becomes the left piece. The right piece is a
    /// new arc for the same site, so that each piece can have its own circle
    /// event. Returns the new arc for `site`, and its left and right
    /// breakpoints. The breakpoint that used to be on the right of `arc` is now
    /// on the right of the right piece, and keeps tracing the same edge.
    pub fn split_arc(&mut self, arc: ArcIdx, site: SiteIdx) -> (ArcIdx, BreakPoint, BreakPoint) {
        let old_site = self.arcs[arc].site;
        let old_edge = self.arcs.arcs[arc.0].right_edge.take();

        let middle = self.arcs.push(site);
        self.arcs.link_after(arc, middle);
        self.index.insert_after(&self.arcs, arc, middle);

        let right = self.arcs.push(old_site);
        self.arcs.link_after(middle, right);
        self.index.insert_after(&self.arcs, middle, right);
        self.arcs.arcs[right.0].right_edge = old_edge;

        let bp = |left, right| BreakPoint {
            left,
            right,
            edge: None,
        };
        (middle, bp(arc, middle), bp(middle, right))
    }

    /// Removes an arc that has neighbors on both sides.
    ///
    /// Panics if either neighbor is missing, or if both neighbors belong to
    /// the same site: that would mean two arcs of one parabola meeting, which
    /// can't happen.
    pub fn remove_arc(&mut self, arc: ArcIdx) -> RemovedArc {
        let (Some(left), Some(right)) = (self.arcs.left_break(arc), self.arcs.right_break(arc))
        else {
            panic!("{arc:?} is at the end of the beach line");
        };
        let (l, r) = (left.left, right.right);
        assert_ne!(
            self.arcs[l].site,
            self.arcs[r].site,
            "removing {arc:?} would join two arcs of the same site"
        );

        self.index.remove(&self.arcs, arc);
        self.arcs.unlink(arc);
        self.arcs.arcs[l.0].right_edge = None;
        RemovedArc {
            left,
            right,
            merged: BreakPoint {
                left: l,
                right: r,
                edge: None,
            },
        }
    }

    /// The arc to the left of `arc`.
    pub fn left_arc(&self, arc: ArcIdx) -> Option<ArcIdx> {
        self.arcs.left(arc)
    }

    /// The arc to the right of `arc`.
    pub fn right_arc(&self, arc: ArcIdx) -> Option<ArcIdx> {
        self.arcs.right(arc)
    }

    /// Makes a breakpoint trace a half-edge pair.
    pub fn trace(&mut self, bp: &BreakPoint, edge: HalfEdgeIdx) {
        assert_eq!(
            self.arcs.right(bp.left),
            Some(bp.right),
            "{bp:?} is no longer a breakpoint"
        );
        self.arcs.arcs[bp.left.0].right_edge = Some(edge);
    }

    /// Forgets and returns an arc's pending circle event.
    pub fn take_circle_event(&mut self, arc: ArcIdx) -> Option<EventKey> {
        self.arcs.arcs[arc.0].circle_event.take()
    }

    /// Attaches a pending circle event to an arc.
    pub fn set_circle_event(&mut self, arc: ArcIdx, key: EventKey) {
        self.arcs.arcs[arc.0].circle_event = Some(key);
    }

    /// The sites of the arcs, from left to right.
    pub fn sites(&self) -> impl Iterator<Item = SiteIdx> + '_ {
        self.arcs.iter().map(|a| self.arcs[a].site)
    }

    /// The breakpoints, from left to right.
    pub fn breakpoints(&self) -> impl Iterator<Item = BreakPoint> + '_ {
        self.arcs.iter().filter_map(|a| self.arcs.right_break(a))
    }

    /// Checks the arena and the search structure.
    pub fn check_invariants(&self) {
        self.arcs.check_invariants();
        self.index.check_invariants(&self.arcs);
    }
}
