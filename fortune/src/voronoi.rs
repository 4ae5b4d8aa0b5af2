//! Fortune's sweep, and the Voronoi diagram it produces.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::{
    beach_line::{ArcIdx, ArcList, BeachLine, BeachLineStatus, SplayTree},
    dcel::{Dcel, FaceIdx, FaceLabel, HalfEdgeIdx, RayOrientation, VertexIdx},
    delaunay::DelaunayTriangulation,
    events::{CircleEvent, Event, EventKey, EventQueue},
    geom::{
        bisector_direction, breakpoint_x, circumcircle, orient, parabola_y, strictly_inside_circle,
        Point, Vector,
    },
    options::{BeachLineKind, Options},
    sites::{SiteIdx, SiteSet},
    Error,
};

mod bounding_box;

pub use bounding_box::BoundingBox;
use bounding_box::Frame;

/// Where a [`Sweep`] is at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum SweepState {
    /// No events have been processed yet.
    Idle,
    /// Some events have been processed, and some are left.
    Running,
    /// The event queue is empty.
    Finished,
}

/// What happened during one step of a [`Sweep`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub enum SweepStep {
    /// The sweep line reached a site, and added its arc to the beach line.
    Site {
        /// The site.
        site: SiteIdx,
        /// Where the sweep line is.
        y: f64,
    },
    /// An arc disappeared, leaving behind a Voronoi vertex.
    Circle {
        /// The new vertex.
        vertex: VertexIdx,
        /// The sites of the disappearing arc and its two neighbors, from
        /// left to right.
        sites: [SiteIdx; 3],
        /// Where the sweep line is.
        y: f64,
    },
}

/// Fortune's sweep, one event at a time.
///
/// Most callers just want [`VoronoiDiagram::build`]. A `Sweep` is for
/// watching the algorithm work: between calls to [`Sweep::step`], the
/// beach line and the partial diagram can be inspected.
#[derive(Debug)]
pub struct Sweep<B: BeachLine = SplayTree> {
    sites: SiteSet,
    options: Options,
    queue: EventQueue,
    beach: BeachLineStatus<B>,
    dcel: Dcel,
    // The site whose cell is on the left of each half-edge.
    cell_of: HashMap<HalfEdgeIdx, SiteIdx>,
    site_edges: Vec<Option<HalfEdgeIdx>>,
    adjacency: Vec<Vec<SiteIdx>>,
    sweep_y: f64,
    state: SweepState,
}

impl<B: BeachLine> Sweep<B> {
    /// Prepares to sweep a set of sites.
    ///
    /// Panics if `options.margin` isn't bigger than 1; a clipping box that
    /// isn't bigger than the diagram can't clip it.
    pub fn new(sites: SiteSet, options: Options) -> Self {
        assert!(
            options.margin > 1.0,
            "the clipping margin must be bigger than 1, not {}",
            options.margin
        );
        let queue = EventQueue::with_sites(&sites);
        let n = sites.len();
        Sweep {
            queue,
            beach: BeachLineStatus::new(),
            dcel: Dcel::new(),
            cell_of: HashMap::new(),
            site_edges: vec![None; n],
            adjacency: vec![Vec::new(); n],
            sweep_y: f64::INFINITY,
            state: SweepState::Idle,
            sites,
            options,
        }
    }

    /// The sites being swept.
    pub fn sites(&self) -> &SiteSet {
        &self.sites
    }

    /// The height of the sweep line: the height of the last processed event,
    /// or infinity if nothing has happened yet.
    pub fn sweep_y(&self) -> f64 {
        self.sweep_y
    }

    /// Where the sweep is at.
    pub fn state(&self) -> SweepState {
        self.state
    }

    /// The sites of the arcs in the beach line, from left to right. A site
    /// can show up more than once.
    pub fn beach_line_sites(&self) -> Vec<SiteIdx> {
        self.beach.sites().collect()
    }

    /// The diagram so far.
    ///
    /// Until the sweep is finished, most half-edges are missing an endpoint
    /// and none of them have faces.
    pub fn dcel(&self) -> &Dcel {
        &self.dcel
    }

    /// The pending events.
    pub fn events(&self) -> &EventQueue {
        &self.queue
    }

    /// Processes the next event.
    ///
    /// Returns `None` once the event queue is empty.
    pub fn step(&mut self) -> Option<SweepStep> {
        let Some((key, event)) = self.queue.pop() else {
            self.state = SweepState::Finished;
            return None;
        };
        self.state = SweepState::Running;
        let step = match event {
            Event::Site(site) => self.site_event(site),
            Event::Circle(circle) => self.circle_event(key, circle),
        };

        #[cfg(debug_assertions)]
        self.check_invariants();

        if self.queue.is_empty() {
            self.state = SweepState::Finished;
        }
        Some(step)
    }

    fn site_event(&mut self, site: SiteIdx) -> SweepStep {
        let p = self.sites[site];
        self.sweep_y = p.y;
        debug!(?site, y = p.y, "site event");

        if self.beach.is_empty() {
            self.beach.init_with_arc(site);
            return SweepStep::Site { site, y: p.y };
        }

        let above = self.beach.arc_above(&self.sites, p);
        self.cancel_circle_event(above);
        let old_site = self.beach.arcs()[above].site;
        let (_, left, right) = self.beach.split_arc(above, site);

        let edge = self.dcel.add_edge();
        let twin = self.dcel[edge].twin;
        self.cell_of.insert(edge, old_site);
        self.cell_of.insert(twin, site);
        self.beach.trace(&left, edge);
        self.beach.trace(&right, edge);

        let slope = self.sample_slope(old_site, site);
        self.dcel.edge_mut(edge).slope = slope;
        self.dcel.edge_mut(twin).slope = slope;

        self.site_edges[old_site.0] = Some(edge);
        self.site_edges[site.0] = Some(twin);
        self.add_adjacency(old_site, site);

        self.check_circle_event(left.left);
        self.check_circle_event(right.right);
        SweepStep::Site { site, y: p.y }
    }

    /// Estimates the slope of the edge between the arcs of `old` and `new`
    /// by following both breakpoints a little way down.
    fn sample_slope(&self, old: SiteIdx, new: SiteIdx) -> f64 {
        let (p, q) = (self.sites[old], self.sites[new]);
        let y = self.sweep_y - self.options.slope_sample * self.sites.extent();
        let x0 = breakpoint_x(p, q, y);
        let x1 = breakpoint_x(q, p, y);
        let y0 = parabola_y(q, y, x0);
        let y1 = parabola_y(q, y, x1);
        (y1 - y0) / (x1 - x0)
    }

    fn circle_event(&mut self, key: EventKey, event: CircleEvent) -> SweepStep {
        self.sweep_y = key.y();
        let arc = event.arc;
        let [a, b, c] = event.sites;
        debug!(?arc, sites = ?event.sites, y = self.sweep_y, "circle event");

        self.beach.take_circle_event(arc);
        // unwrap: arcs get circle events only when they have neighbors on both sides
        let left = self.beach.left_arc(arc).unwrap();
        let right = self.beach.right_arc(arc).unwrap();
        debug_assert_eq!(self.beach.arcs()[left].site, a);
        debug_assert_eq!(self.beach.arcs()[arc].site, b);
        debug_assert_eq!(self.beach.arcs()[right].site, c);
        self.cancel_circle_event(left);
        self.cancel_circle_event(right);

        let removed = self.beach.remove_arc(arc);
        let v = self.dcel.add_vertex(event.center);
        self.dcel.vertex_mut(v).circle_vertex = true;

        // unwrap: breakpoints start tracing an edge as soon as they're created
        let ab = removed.left.edge.unwrap();
        let bc = removed.right.edge.unwrap();
        let out_ab = self.half_with_cell(ab, a);
        let out_bc = self.half_with_cell(bc, b);
        let out_ac = self.dcel.add_edge();
        let in_ac = self.dcel[out_ac].twin;
        self.cell_of.insert(out_ac, c);
        self.cell_of.insert(in_ac, a);
        self.beach.trace(&removed.merged, out_ac);

        for out in [out_ab, out_bc, out_ac] {
            self.dcel.set_edge_origin(out, v);
            self.orient_ray(out);
        }
        // Going around each of the three cells, the edge arriving at v is
        // followed by the one leaving it.
        self.dcel.set_next(in_ac, out_ab);
        self.dcel.set_next(self.dcel[out_ab].twin, out_bc);
        self.dcel.set_next(self.dcel[out_bc].twin, out_ac);

        self.add_adjacency(a, c);
        self.check_circle_event(left);
        self.check_circle_event(right);
        SweepStep::Circle {
            vertex: v,
            sites: event.sites,
            y: self.sweep_y,
        }
    }

    /// The half of the edge pair `e` that has `site`'s cell on its left.
    fn half_with_cell(&self, e: HalfEdgeIdx, site: SiteIdx) -> HalfEdgeIdx {
        if self.cell_of[&e] == site {
            e
        } else {
            let twin = self.dcel[e].twin;
            debug_assert_eq!(self.cell_of[&twin], site);
            twin
        }
    }

    /// The direction of a half-edge, from the sites on either side of it.
    fn direction(&self, e: HalfEdgeIdx) -> Vector {
        let left = self.cell_of[&e];
        let right = self.cell_of[&self.dcel[e].twin];
        bisector_direction(self.sites[left], self.sites[right])
    }

    /// Records which way a half-edge leaves its origin.
    fn orient_ray(&mut self, e: HalfEdgeIdx) {
        let d = self.direction(e);
        let edge = self.dcel.edge_mut(e);
        edge.orientation = if d.x < 0.0 {
            RayOrientation::Left
        } else {
            RayOrientation::Right
        };
        edge.slope = if d.x == 0.0 {
            f64::INFINITY.copysign(d.y)
        } else {
            d.y / d.x
        };
    }

    /// The direction of a half-edge with no endpoints, from the slope sampled
    /// when it was created. It points so that `e`'s cell is on its left.
    fn sampled_direction(&self, e: HalfEdgeIdx) -> Vector {
        let slope = self.dcel[e].slope;
        let d = if slope.is_finite() {
            Vector::new(1.0, slope)
        } else {
            Vector::new(0.0, 1.0)
        };
        let left = self.sites[self.cell_of[&e]];
        let right = self.sites[self.cell_of[&self.dcel[e].twin]];
        if d.cross(&(left - right)) < 0.0 {
            d * -1.0
        } else {
            d
        }
    }

    fn add_adjacency(&mut self, s: SiteIdx, t: SiteIdx) {
        if !self.adjacency[s.0].contains(&t) {
            self.adjacency[s.0].push(t);
            self.adjacency[t.0].push(s);
        }
    }

    fn cancel_circle_event(&mut self, arc: ArcIdx) {
        if let Some(key) = self.beach.take_circle_event(arc) {
            if self.queue.cancel(key).is_some() {
                trace!(?arc, ?key, "cancelled circle event");
            }
        }
    }

    /// Schedules the circle event for `arc` and its two neighbors, if there
    /// is one.
    fn check_circle_event(&mut self, arc: ArcIdx) {
        debug_assert!(self.beach.arcs()[arc].circle_event.is_none());
        // The cells of collinear sites are strips, even where breaking ties
        // bent a row.
        if self.sites.is_collinear() {
            return;
        }
        let (Some(left), Some(right)) = (self.beach.left_arc(arc), self.beach.right_arc(arc))
        else {
            return;
        };
        let arcs = self.beach.arcs();
        let sites = [arcs[left].site, arcs[arc].site, arcs[right].site];
        let [a, b, c] = sites;
        if a == b || b == c || a == c {
            trace!(?sites, "rejected: repeated site");
            return;
        }

        let [pa, pb, pc] = sites.map(|s| self.sites[s]);
        // Exact, so a nearly straight triple still gets its (huge) circle.
        if orient(pa, pb, pc) >= 0.0 {
            trace!(?sites, "rejected: breakpoints diverge");
            return;
        }
        // unwrap: orient is exact, and non-zero
        let circle = circumcircle(pa, pb, pc).unwrap();
        if let Some((inside, _)) = self
            .sites
            .iter()
            .find(|&(s, p)| !sites.contains(&s) && strictly_inside_circle(pa, pb, pc, p))
        {
            trace!(?sites, ?inside, "rejected: circle isn't empty");
            return;
        }
        if self.queue.contains_triple(&sites) {
            trace!(?sites, "rejected: already scheduled");
            return;
        }
        let bottom = circle.bottom();
        if bottom.y > self.sweep_y + self.options.tolerance * self.sites.extent() {
            trace!(?sites, y = bottom.y, "rejected: above the sweep line");
            return;
        }

        let event = CircleEvent {
            bottom,
            center: circle.center,
            radius: circle.radius,
            sites,
            arc,
        };
        if let Some(key) = self.queue.push_circle(event) {
            trace!(?sites, ?key, "scheduled circle event");
            self.beach.set_circle_event(arc, key);
        }
    }

    /// Checks the partial diagram, the beach line and the event queue.
    pub fn check_invariants(&self) {
        self.dcel.check_invariants();
        self.beach.check_invariants();

        let slack = self.options.tolerance * self.sites.extent();
        if let Some((key, _)) = self.queue.peek() {
            assert!(
                key.y() <= self.sweep_y + slack,
                "event {key:?} is above the sweep line at {}",
                self.sweep_y
            );
        }
        for arc in self.beach.arcs().iter() {
            if let Some(key) = self.beach.arcs()[arc].circle_event {
                assert!(self.queue.contains(&key), "{arc:?} has a stale circle event");
            }
        }
        for bp in self.beach.breakpoints() {
            assert!(bp.edge.is_some(), "{bp:?} isn't tracing anything");
        }
    }

    /// Runs the rest of the sweep, clips the diagram to a bounding box and
    /// works out its faces.
    pub fn finish(mut self) -> VoronoiDiagram {
        while self.step().is_some() {}

        let swept: Vec<HalfEdgeIdx> = self.dcel.half_edge_indices().step_by(2).collect();
        let collinear = self.sites.is_collinear();

        let vertices = self.dcel.vertex_indices().map(|v| self.dcel[v].point);
        // unwrap: site sets are never empty
        let bbox = BoundingBox::enclosing(self.sites.points().iter().copied().chain(vertices))
            .unwrap()
            .grow(self.options.margin);
        let mut frame = Frame::new(&mut self.dcel, bbox);

        for e in swept {
            let twin = self.dcel[e].twin;
            match (self.dcel[e].origin, self.dcel[twin].origin) {
                (Some(_), Some(_)) => {}
                // Only collinear sites have whole lines for edges.
                (None, None) => {
                    let mid = self.sites[self.cell_of[&e]].midpoint(&self.sites[self.cell_of[&twin]]);
                    let dir = self.sampled_direction(e);
                    frame.clip(&mut self.dcel, e, mid, dir);
                    frame.clip(&mut self.dcel, twin, mid, dir * -1.0);
                }
                (Some(_), None) => self.clip_ray(&mut frame, e),
                (None, Some(_)) => self.clip_ray(&mut frame, twin),
            }
        }

        self.dcel.set_faces();
        for (site, edge) in self.site_edges.iter().enumerate() {
            let edge = edge.unwrap_or(frame.inner_edge());
            // unwrap: set_faces gives every half-edge a face
            let face = self.dcel[edge].face.unwrap();
            let old = self.dcel.face_mut(face).label.replace(FaceLabel::Cell(SiteIdx(site)));
            debug_assert_eq!(old, None, "{face:?} is the cell of two sites");
        }

        #[cfg(debug_assertions)]
        self.dcel.check_invariants();
        debug!(
            vertices = self.dcel.num_vertices(),
            half_edges = self.dcel.num_half_edges(),
            faces = self.dcel.num_faces(),
            collinear,
            "finished the diagram"
        );

        let mut adjacency = self.adjacency;
        for neighbors in &mut adjacency {
            neighbors.sort();
        }
        VoronoiDiagram {
            sites: self.sites,
            dcel: self.dcel,
            adjacency,
            site_edges: self.site_edges,
            collinear,
            bounding_box: frame.bbox(),
        }
    }

    fn clip_ray(&mut self, frame: &mut Frame, ray: HalfEdgeIdx) {
        // unwrap: only half-edges with an origin are rays
        let from = self.dcel.origin_point(ray).unwrap();
        let dir = self.dcel[ray]
            .ray_direction()
            .unwrap_or_else(|| self.direction(ray));
        frame.clip(&mut self.dcel, ray, from, dir);
    }
}

/// A Voronoi diagram, clipped to a box.
///
/// Every site's cell is a bounded face of the DCEL, labelled
/// [`FaceLabel::Cell`]. The only other face is the unbounded one outside the
/// box, whose single inner component is the outside of the box.
#[derive(Clone, Debug, serde::Serialize)]
pub struct VoronoiDiagram {
    sites: SiteSet,
    dcel: Dcel,
    adjacency: Vec<Vec<SiteIdx>>,
    site_edges: Vec<Option<HalfEdgeIdx>>,
    collinear: bool,
    bounding_box: BoundingBox,
}

impl VoronoiDiagram {
    /// Computes the Voronoi diagram of a set of sites.
    pub fn build(sites: &SiteSet, options: &Options) -> Self {
        match options.beach_line {
            BeachLineKind::List => Sweep::<ArcList>::new(sites.clone(), options.clone()).finish(),
            BeachLineKind::Tree => {
                Sweep::<SplayTree>::new(sites.clone(), options.clone()).finish()
            }
        }
    }

    /// Validates and prepares some points, and computes their Voronoi diagram
    /// with the default options.
    pub fn from_points<P: Into<Point>>(points: impl IntoIterator<Item = P>) -> Result<Self, Error> {
        let sites = SiteSet::new(points)?;
        Ok(Self::build(&sites, &Options::default()))
    }

    /// The sites.
    pub fn sites(&self) -> &SiteSet {
        &self.sites
    }

    /// The diagram.
    pub fn dcel(&self) -> &Dcel {
        &self.dcel
    }

    /// The sites whose cells share an edge with `site`'s, in increasing order.
    pub fn neighbors(&self, site: SiteIdx) -> &[SiteIdx] {
        &self.adjacency[site.0]
    }

    /// All pairs of sites whose cells share an edge, each pair once, smaller
    /// index first.
    pub fn adjacent_pairs(&self) -> impl Iterator<Item = (SiteIdx, SiteIdx)> + '_ {
        self.adjacency.iter().enumerate().flat_map(|(i, ns)| {
            ns.iter()
                .filter(move |n| n.0 > i)
                .map(move |&n| (SiteIdx(i), n))
        })
    }

    /// A half-edge on the boundary of `site`'s cell, with the cell on its
    /// left. Only a lone site has none.
    pub fn site_edge(&self, site: SiteIdx) -> Option<HalfEdgeIdx> {
        self.site_edges[site.0]
    }

    /// The face that is `site`'s cell.
    pub fn cell(&self, site: SiteIdx) -> FaceIdx {
        // unwrap: finishing the sweep labels a face for each site, through the
        // site's own edge or, for a lone site, the box; no face is the cell
        // of two sites
        self.dcel.labelled_face(FaceLabel::Cell(site)).unwrap()
    }

    /// The corners of `site`'s cell, counter-clockwise.
    pub fn cell_points(&self, site: SiteIdx) -> Vec<Point> {
        self.dcel.face_points(self.cell(site))
    }

    /// The face outside the bounding box.
    pub fn unbounded_face(&self) -> FaceIdx {
        // unwrap: the outside of the box is a clockwise cycle with no Voronoi
        // vertices, and set_faces makes such a cycle unbounded
        self.dcel
            .face_indices()
            .find(|&f| self.dcel[f].is_unbounded())
            .unwrap()
    }

    /// Do all the sites lie on a line? Then the diagram is a set of parallel
    /// strips, and there's no triangulation.
    pub fn is_collinear(&self) -> bool {
        self.collinear
    }

    /// The box the diagram was clipped to.
    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    /// The dual Delaunay triangulation.
    pub fn delaunay(&self) -> Result<DelaunayTriangulation, Error> {
        DelaunayTriangulation::from_voronoi(self)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use assert_matches::assert_matches;

    use super::*;

    fn diagram(points: &[(f64, f64)], kind: BeachLineKind) -> VoronoiDiagram {
        let sites = SiteSet::new(points.iter().copied()).unwrap();
        VoronoiDiagram::build(&sites, &Options::default().with_beach_line(kind))
    }

    fn euler(d: &Dcel) -> isize {
        d.num_vertices() as isize - (d.num_half_edges() / 2) as isize + d.num_faces() as isize
    }

    #[test]
    fn triangle() {
        for kind in [BeachLineKind::List, BeachLineKind::Tree] {
            let v = diagram(&[(0.0, 0.0), (2.0, 0.0), (1.0, 2.0)], kind);
            let d = v.dcel();
            assert!(!v.is_collinear());

            let voronoi_vertices: Vec<_> = d
                .vertex_indices()
                .filter(|&v| d[v].circle_vertex)
                .collect();
            assert_eq!(voronoi_vertices.len(), 1);
            let center = d[voronoi_vertices[0]].point;
            assert!((center.x - 1.0).abs() < 1e-6);
            assert!((center.y - 0.75).abs() < 1e-6);

            // One vertex, four corners and three clip points.
            assert_eq!(d.num_vertices(), 8);
            // Three rays and the box, split in three places.
            assert_eq!(d.num_half_edges(), 2 * (3 + 4 + 3));
            assert_eq!(d.num_faces(), 4);
            assert_eq!(euler(d), 2);

            for site in v.sites().indices() {
                assert_eq!(v.neighbors(site).len(), 2);
                let cell = v.cell(site);
                assert!(!d[cell].is_unbounded());
                assert_eq!(d[cell].label, Some(FaceLabel::Cell(site)));
            }
            assert_eq!(v.adjacent_pairs().count(), 3);
        }
    }

    #[test]
    fn cells_contain_their_sites() {
        let v = diagram(
            &[(0.0, 0.0), (2.0, 0.0), (1.0, 2.0), (3.0, 3.0), (-1.0, 2.5)],
            BeachLineKind::Tree,
        );
        for (site, p) in v.sites().iter() {
            let corners = v.cell_points(site);
            // The cell is convex and counter-clockwise, so the site is on the
            // left of every side.
            for i in 0..corners.len() {
                let (a, b) = (corners[i], corners[(i + 1) % corners.len()]);
                assert!(orient(a, b, p) >= 0.0, "{site:?} is outside its cell");
            }
        }
    }

    #[test]
    fn collinear_row() {
        for kind in [BeachLineKind::List, BeachLineKind::Tree] {
            let v = diagram(&[(0.0, 5.0), (1.0, 5.0), (2.0, 5.0)], kind);
            assert!(v.is_collinear());
            let d = v.dcel();
            assert!(d.vertex_indices().all(|v| !d[v].circle_vertex));
            // Two lines cut the box into three strips.
            assert_eq!(d.num_faces(), 4);
            assert_eq!(euler(d), 2);
            for site in v.sites().indices() {
                assert_eq!(d.face_points(v.cell(site)).len(), 4);
            }
            assert_matches!(v.delaunay(), Err(Error::Collinear));
        }
    }

    #[test]
    fn tied_row_above_a_site() {
        for kind in [BeachLineKind::List, BeachLineKind::Tree] {
            let v = diagram(&[(7.0, 5.0), (-1.0, 5.0), (0.0, 5.0), (-5.0, -6.0)], kind);
            assert!(!v.is_collinear());
            let d = v.dcel();
            assert_eq!(euler(d), 2);
            assert_eq!(d.num_faces(), 5);
            let cells: HashSet<_> = v.sites().indices().map(|s| v.cell(s)).collect();
            assert_eq!(cells.len(), 4);

            // p0 = (-1, 5), p1 = (0, 5), p2 = (7, 5) and p3 = (-5, -6). The
            // row's middle site is on the hull, and the low site sees all of
            // the row.
            assert_eq!(v.neighbors(SiteIdx(0)), [1, 3].map(SiteIdx));
            assert_eq!(v.neighbors(SiteIdx(1)), [0, 2, 3].map(SiteIdx));
            assert_eq!(v.neighbors(SiteIdx(3)), [0, 1, 2].map(SiteIdx));
            assert_eq!(v.delaunay().unwrap().num_triangles(), 2);
        }
    }

    #[test]
    fn sampled_slope_follows_the_bisector() {
        let sites = SiteSet::new([(0.0, 3.0), (2.0, 0.0)]).unwrap();
        let mut sweep = Sweep::<ArcList>::new(sites, Options::default());
        sweep.step();
        sweep.step();
        let e = sweep.dcel().half_edge_indices().next().unwrap();
        // The bisector of (0, 3) and (2, 0) runs along (3, 2).
        let slope = sweep.dcel()[e].slope;
        assert!((slope - 2.0 / 3.0).abs() < 1e-9, "{slope}");

        // The whole line gets clipped along the sampled direction, so both
        // ends are as far from one site as from the other.
        let v = sweep.finish();
        let sites = v.sites();
        let edge = v.site_edge(SiteIdx(0)).unwrap();
        for p in [v.dcel().origin_point(edge), v.dcel().destination_point(edge)] {
            let p = p.unwrap();
            let (d0, d1) = (p.dist_sq(&sites[SiteIdx(0)]), p.dist_sq(&sites[SiteIdx(1)]));
            assert!((d0 - d1).abs() < 1e-9 * d0, "{p:?}");
        }
    }

    #[test]
    fn two_sites() {
        let v = diagram(&[(0.0, 0.0), (1.0, 1.0)], BeachLineKind::Tree);
        assert!(v.is_collinear());
        assert_eq!(v.dcel().num_faces(), 3);
        assert_eq!(v.neighbors(SiteIdx(0)), &[SiteIdx(1)]);
    }

    #[test]
    fn one_site() {
        let v = diagram(&[(3.0, 4.0)], BeachLineKind::List);
        assert!(v.is_collinear());
        let d = v.dcel();
        assert_eq!(d.num_vertices(), 4);
        assert_eq!(d.num_faces(), 2);
        assert_eq!(v.site_edge(SiteIdx(0)), None);
        assert!(v.bounding_box().contains(Point::new(3.0, 4.0)));
        assert_eq!(v.cell_points(SiteIdx(0)).len(), 4);
    }

    #[test]
    fn square() {
        // Four cocircular sites: the tie-breaking nudge splits the vertex in two.
        let v = diagram(
            &[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)],
            BeachLineKind::Tree,
        );
        let d = v.dcel();
        let centers: Vec<_> = d
            .vertex_indices()
            .filter(|&v| d[v].circle_vertex)
            .map(|v| d[v].point)
            .collect();
        assert_eq!(centers.len(), 2);
        assert!(centers[0].dist_sq(&centers[1]) < 1e-12);
        assert_eq!(euler(d), 2);
        assert_eq!(v.adjacent_pairs().count(), 5);
    }

    #[test]
    fn stepping() {
        let sites = SiteSet::new([(0.0, 0.0), (2.0, 0.0), (1.0, 2.0)]).unwrap();
        let mut sweep = Sweep::<ArcList>::new(sites, Options::default());
        assert_eq!(sweep.state(), SweepState::Idle);

        assert_matches!(sweep.step(), Some(SweepStep::Site { site: SiteIdx(0), .. }));
        assert_eq!(sweep.state(), SweepState::Running);
        assert_eq!(sweep.sweep_y(), 2.0);
        assert_eq!(sweep.beach_line_sites(), vec![SiteIdx(0)]);

        assert_matches!(sweep.step(), Some(SweepStep::Site { site: SiteIdx(1), .. }));
        assert_eq!(sweep.beach_line_sites(), [0, 1, 0].map(SiteIdx));
        assert_matches!(sweep.step(), Some(SweepStep::Site { site: SiteIdx(2), .. }));
        assert_eq!(sweep.beach_line_sites(), [0, 1, 0, 2, 0].map(SiteIdx));
        assert_eq!(sweep.events().len(), 1);

        assert_matches!(sweep.step(), Some(SweepStep::Circle { sites, .. }) => {
            assert_eq!(sites, [1, 0, 2].map(SiteIdx));
        });
        assert_eq!(sweep.state(), SweepState::Finished);
        assert_eq!(sweep.beach_line_sites(), [0, 1, 2, 0].map(SiteIdx));
        assert!(sweep.step().is_none());

        let v = sweep.finish();
        assert_eq!(v.dcel().num_faces(), 4);
    }

    #[test]
    #[should_panic(expected = "margin")]
    fn margin_too_small() {
        let sites = SiteSet::new([(0.0, 0.0)]).unwrap();
        let opts = Options {
            margin: 1.0,
            ..Options::default()
        };
        Sweep::<SplayTree>::new(sites, opts);
    }
}
