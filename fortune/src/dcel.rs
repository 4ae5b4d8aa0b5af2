//! A doubly-connected edge list.
//!
//! Both the Voronoi diagram and the Delaunay triangulation are stored as a
//! [`Dcel`]: an arena of vertices, half-edges and faces that refer to one
//! another by index. Half-edges come in twin pairs, and every half-edge has
//! its face on its left; so bounded faces are traversed counter-clockwise
//! and the outside of everything is traversed clockwise.

use crate::{geom::Point, sites::SiteIdx};

/// An index into the vertices of a [`Dcel`].
#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash, serde::Serialize)]
pub struct VertexIdx(usize);

/// An index into the half-edges of a [`Dcel`].
///
/// Twin half-edges are allocated together, so a half-edge and its twin
/// differ only in the lowest bit of their index.
#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash, serde::Serialize)]
pub struct HalfEdgeIdx(usize);

/// An index into the faces of a [`Dcel`].
#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash, serde::Serialize)]
pub struct FaceIdx(usize);

impl std::fmt::Debug for VertexIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl std::fmt::Debug for HalfEdgeIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "e{}", self.0)
    }
}

impl std::fmt::Debug for FaceIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "f{}", self.0)
    }
}

impl VertexIdx {
    /// The position of this vertex in its arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl HalfEdgeIdx {
    /// The position of this half-edge in its arena.
    pub fn index(self) -> usize {
        self.0
    }

    fn twin(self) -> HalfEdgeIdx {
        HalfEdgeIdx(self.0 ^ 1)
    }
}

impl FaceIdx {
    /// The position of this face in its arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A vertex.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Vertex {
    /// Where it is.
    pub point: Point,
    /// Some half-edge whose origin is this vertex.
    pub incident_edge: Option<HalfEdgeIdx>,
    /// True for Voronoi vertices (centers of circle events), false for the
    /// corners of the clipping box and the points where edges were clipped.
    pub circle_vertex: bool,
}

/// Which way a half-edge heads from its origin, while its other endpoint is
/// still unknown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize)]
pub enum RayOrientation {
    /// Towards decreasing `x`.
    Left,
    /// Towards increasing `x`. Vertical rays count as going right.
    Right,
    /// Not known (yet).
    #[default]
    Unknown,
}

/// A half-edge.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct HalfEdge {
    /// The vertex this half-edge starts at, once known.
    pub origin: Option<VertexIdx>,
    /// The oppositely-directed half-edge along the same edge.
    pub twin: HalfEdgeIdx,
    /// The next half-edge along the boundary of our face.
    pub next: Option<HalfEdgeIdx>,
    /// The previous half-edge along the boundary of our face.
    pub prev: Option<HalfEdgeIdx>,
    /// The face on our left.
    pub face: Option<FaceIdx>,
    /// The slope (`dy / dx`) of the line we lie on. Only meaningful while
    /// one endpoint is missing.
    pub slope: f64,
    /// Which way we head from our origin. Only meaningful while our twin
    /// has no origin.
    pub orientation: RayOrientation,
}

impl HalfEdge {
    fn new(twin: HalfEdgeIdx) -> Self {
        HalfEdge {
            origin: None,
            twin,
            next: None,
            prev: None,
            face: None,
            slope: 0.0,
            orientation: RayOrientation::Unknown,
        }
    }

    /// A direction vector for the ray that this half-edge describes, if its
    /// orientation is known.
    pub fn ray_direction(&self) -> Option<crate::geom::Vector> {
        use crate::geom::Vector;

        if self.slope.is_infinite() {
            return match self.orientation {
                RayOrientation::Unknown => None,
                _ => Some(Vector::new(0.0, self.slope.signum())),
            };
        }
        match self.orientation {
            RayOrientation::Left => Some(Vector::new(-1.0, -self.slope)),
            RayOrientation::Right => Some(Vector::new(1.0, self.slope)),
            RayOrientation::Unknown => None,
        }
    }
}

/// What a face stands for.
#[derive(Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum FaceLabel {
    /// The Voronoi cell of a site.
    Cell(SiteIdx),
    /// A Delaunay triangle, numbered in order of creation.
    Triangle(usize),
}

impl std::fmt::Debug for FaceLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FaceLabel::Cell(site) => write!(f, "c{}", site.0),
            FaceLabel::Triangle(n) => write!(f, "t{n}"),
        }
    }
}

/// A face.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct Face {
    /// A half-edge on the outer boundary, for bounded faces.
    pub outer_component: Option<HalfEdgeIdx>,
    /// A half-edge on each hole's boundary. Only the unbounded face has these.
    pub inner_components: Vec<HalfEdgeIdx>,
    /// What this face stands for, once that's been worked out.
    pub label: Option<FaceLabel>,
}

impl Face {
    /// Some half-edge on the boundary of this face.
    pub fn boundary_edge(&self) -> Option<HalfEdgeIdx> {
        self.outer_component
            .or_else(|| self.inner_components.first().copied())
    }

    /// Is this the face extending to infinity?
    pub fn is_unbounded(&self) -> bool {
        self.outer_component.is_none()
    }
}

/// A doubly-connected edge list.
#[derive(Clone, Default, PartialEq, serde::Serialize)]
pub struct Dcel {
    vertices: Vec<Vertex>,
    edges: Vec<HalfEdge>,
    faces: Vec<Face>,
}

impl std::ops::Index<VertexIdx> for Dcel {
    type Output = Vertex;

    fn index(&self, index: VertexIdx) -> &Vertex {
        &self.vertices[index.0]
    }
}

impl std::ops::Index<HalfEdgeIdx> for Dcel {
    type Output = HalfEdge;

    fn index(&self, index: HalfEdgeIdx) -> &HalfEdge {
        &self.edges[index.0]
    }
}

impl std::ops::Index<FaceIdx> for Dcel {
    type Output = Face;

    fn index(&self, index: FaceIdx) -> &Face {
        &self.faces[index.0]
    }
}

impl Dcel {
    /// An empty edge list.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// The number of half-edges (twice the number of edges).
    pub fn num_half_edges(&self) -> usize {
        self.edges.len()
    }

    /// The number of faces.
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// All vertex indices.
    pub fn vertex_indices(&self) -> impl Iterator<Item = VertexIdx> {
        (0..self.vertices.len()).map(VertexIdx)
    }

    /// All half-edge indices.
    pub fn half_edge_indices(&self) -> impl Iterator<Item = HalfEdgeIdx> {
        (0..self.edges.len()).map(HalfEdgeIdx)
    }

    /// All face indices.
    pub fn face_indices(&self) -> impl Iterator<Item = FaceIdx> {
        (0..self.faces.len()).map(FaceIdx)
    }

    /// The vertex at the far end of a half-edge, if known.
    pub fn destination(&self, e: HalfEdgeIdx) -> Option<VertexIdx> {
        self.edges[e.twin().0].origin
    }

    /// The position of a half-edge's origin, if known.
    pub fn origin_point(&self, e: HalfEdgeIdx) -> Option<Point> {
        self[e].origin.map(|v| self[v].point)
    }

    /// The position of a half-edge's destination, if known.
    pub fn destination_point(&self, e: HalfEdgeIdx) -> Option<Point> {
        self.destination(e).map(|v| self[v].point)
    }

    pub(crate) fn vertex_mut(&mut self, v: VertexIdx) -> &mut Vertex {
        &mut self.vertices[v.0]
    }

    pub(crate) fn edge_mut(&mut self, e: HalfEdgeIdx) -> &mut HalfEdge {
        &mut self.edges[e.0]
    }

    pub(crate) fn face_mut(&mut self, f: FaceIdx) -> &mut Face {
        &mut self.faces[f.0]
    }

    /// Adds a vertex, with no incident edges.
    pub fn add_vertex(&mut self, point: Point) -> VertexIdx {
        self.vertices.push(Vertex {
            point,
            incident_edge: None,
            circle_vertex: false,
        });
        VertexIdx(self.vertices.len() - 1)
    }

    /// Adds a pair of twin half-edges with no endpoints, returning one of them.
    pub fn add_edge(&mut self) -> HalfEdgeIdx {
        let e = HalfEdgeIdx(self.edges.len());
        self.edges.push(HalfEdge::new(e.twin()));
        self.edges.push(HalfEdge::new(e));
        e
    }

    /// Adds a pair of twin half-edges between two existing vertices, returning
    /// the one that starts at `from`.
    pub fn add_edge_between(&mut self, from: VertexIdx, to: VertexIdx) -> HalfEdgeIdx {
        let e = self.add_edge();
        self.edges[e.0].origin = Some(from);
        self.edges[e.twin().0].origin = Some(to);
        self.vertices[from.0].incident_edge.get_or_insert(e);
        self.vertices[to.0].incident_edge.get_or_insert(e.twin());
        e
    }

    /// Adds an empty face.
    pub fn add_face(&mut self) -> FaceIdx {
        self.faces.push(Face::default());
        FaceIdx(self.faces.len() - 1)
    }

    /// Attaches `v` to whichever end of `e` is still missing, preferring `e`'s
    /// own origin if both are.
    pub fn set_edge_origin(&mut self, e: HalfEdgeIdx, v: VertexIdx) {
        let target = if self.edges[e.0].origin.is_none() {
            e
        } else {
            e.twin()
        };
        assert!(
            self.edges[target.0].origin.is_none(),
            "{e:?} already has both endpoints"
        );
        self.edges[target.0].origin = Some(v);
        self.vertices[v.0].incident_edge = Some(target);
    }

    /// Makes `next` follow `e` around their common face.
    pub fn set_next(&mut self, e: HalfEdgeIdx, next: HalfEdgeIdx) {
        self.edges[e.0].next = Some(next);
        self.edges[next.0].prev = Some(e);
    }

    /// Splits the edge `e` at `point`, where the dangling half-edge `other` ends.
    ///
    /// `e` must have both endpoints and be part of closed cycles on both sides;
    /// `other` must have an origin but no destination, and it must arrive at
    /// `point` from the right of `e` (that is, from the side of `e`'s twin).
    /// Afterwards `e` ends at the new vertex, a new half-edge (returned)
    /// continues from there to `e`'s old destination, `other` ends at the new
    /// vertex, and the cycle on the twin side of `e` has been split in two
    /// along `other`.
    pub fn intersect_edge(
        &mut self,
        e: HalfEdgeIdx,
        other: HalfEdgeIdx,
        point: Point,
    ) -> HalfEdgeIdx {
        let v = self.add_vertex(point);
        let e_twin = e.twin();
        let other_twin = other.twin();
        let old_dest = self.edges[e_twin.0].origin;

        let e_new = self.add_edge();
        let e_new_twin = e_new.twin();
        self.edges[e_new.0].origin = Some(v);
        self.vertices[v.0].incident_edge = Some(e_new);
        self.edges[e_new_twin.0].origin = old_dest;
        if let Some(d) = old_dest {
            if self.vertices[d.0].incident_edge == Some(e_twin) {
                self.vertices[d.0].incident_edge = Some(e_new_twin);
            }
        }

        // The new half-edge takes over the second half of e, on both sides.
        if let Some(next) = self.edges[e.0].next {
            self.set_next(e_new, next);
        }
        if let Some(prev) = self.edges[e_twin.0].prev {
            self.set_next(prev, e_new_twin);
        }
        self.edges[e_twin.0].origin = Some(v);
        self.set_next(e, e_new);

        // Thread `other` into the new vertex, splitting the twin-side cycle.
        self.edges[other_twin.0].origin = Some(v);
        self.set_next(other, e_twin);
        self.set_next(e_new_twin, other_twin);

        e_new
    }

    /// Walks the face cycle starting at `start`.
    ///
    /// Panics if some half-edge on the way has no `next`, or if the walk takes
    /// more steps than there are half-edges (so it can never return to `start`).
    pub fn cycle(&self, start: HalfEdgeIdx) -> impl Iterator<Item = HalfEdgeIdx> + '_ {
        let mut cur = Some(start);
        let mut steps = 0;
        std::iter::from_fn(move || {
            let e = cur?;
            steps += 1;
            assert!(
                steps <= self.edges.len(),
                "the face cycle through {start:?} doesn't close"
            );
            let next = self.edges[e.0]
                .next
                .unwrap_or_else(|| panic!("{e:?} has no next half-edge"));
            cur = (next != start).then_some(next);
            Some(e)
        })
    }

    /// The boundary of a face, as a cycle of half-edges.
    pub fn face_cycle(&self, f: FaceIdx) -> impl Iterator<Item = HalfEdgeIdx> + '_ {
        let start = self.faces[f.0].boundary_edge();
        start.into_iter().flat_map(move |s| self.cycle(s))
    }

    /// The positions of the vertices around a face, in order.
    ///
    /// Panics if some half-edge on the boundary has no origin.
    pub fn face_points(&self, f: FaceIdx) -> Vec<Point> {
        self.face_cycle(f)
            .map(|e| {
                self.origin_point(e)
                    .unwrap_or_else(|| panic!("{e:?} has no origin"))
            })
            .collect()
    }

    /// The face carrying a label.
    pub fn labelled_face(&self, label: FaceLabel) -> Option<FaceIdx> {
        self.face_indices()
            .find(|&f| self.faces[f.0].label == Some(label))
    }

    /// Twice the signed area enclosed by a cycle: positive if the cycle turns
    /// counter-clockwise.
    pub fn signed_area(&self, start: HalfEdgeIdx) -> f64 {
        self.cycle(start)
            .map(|e| {
                let p = self.origin_point(e).unwrap_or_default();
                let q = self.destination_point(e).unwrap_or_default();
                p.x * q.y - q.x * p.y
            })
            .sum()
    }

    /// Creates a face for every cycle of half-edges that doesn't have one yet.
    ///
    /// A cycle that only visits non-Voronoi vertices and turns clockwise is
    /// the outside of the clipping box, and becomes an inner component of the
    /// unbounded face; every other cycle becomes the outer component of a
    /// bounded face. Running this again on a faced DCEL changes nothing.
    pub fn set_faces(&mut self) {
        for start in self.half_edge_indices() {
            if self.edges[start.0].face.is_some() {
                continue;
            }

            let cycle: Vec<_> = self.cycle(start).collect();
            let only_box_vertices = cycle.iter().all(|&e| {
                self.edges[e.0]
                    .origin
                    .is_some_and(|v| !self.vertices[v.0].circle_vertex)
            });
            let unbounded = only_box_vertices && self.signed_area(start) < 0.0;

            let f = self.add_face();
            for &e in &cycle {
                self.edges[e.0].face = Some(f);
            }
            if unbounded {
                self.faces[f.0].inner_components.push(start);
            } else {
                self.faces[f.0].outer_component = Some(start);
            }
        }
    }

    /// Checks the pointer structure, panicking if anything is inconsistent.
    pub fn check_invariants(&self) {
        for e in self.half_edge_indices() {
            let edge = &self.edges[e.0];
            assert_eq!(self.edges[edge.twin.0].twin, e, "{e:?}'s twin isn't twinned back");
            assert_ne!(edge.twin, e, "{e:?} is its own twin");
            if let Some(next) = edge.next {
                assert_eq!(self.edges[next.0].prev, Some(e), "{e:?}.next.prev != {e:?}");
                assert_eq!(
                    self.destination(e),
                    self.edges[next.0].origin,
                    "{e:?} doesn't end where {next:?} starts"
                );
                if edge.face.is_some() {
                    assert_eq!(edge.face, self.edges[next.0].face, "{e:?} and {next:?} disagree on the face");
                }
            }
            if let Some(prev) = edge.prev {
                assert_eq!(self.edges[prev.0].next, Some(e), "{e:?}.prev.next != {e:?}");
            }
        }
        for v in self.vertex_indices() {
            if let Some(e) = self.vertices[v.0].incident_edge {
                assert_eq!(self.edges[e.0].origin, Some(v), "{v:?}'s incident edge starts elsewhere");
            }
        }
    }
}

impl std::fmt::Debug for Dcel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let opt = |x: Option<&dyn std::fmt::Debug>| match x {
            Some(x) => format!("{x:?}"),
            None => "nil".to_owned(),
        };

        for v in self.vertex_indices() {
            let vert = &self[v];
            writeln!(
                f,
                "{v:?} {:?} {}",
                vert.point,
                opt(vert.incident_edge.as_ref().map(|e| e as _))
            )?;
        }
        for face in self.face_indices() {
            let fc = &self[face];
            writeln!(
                f,
                "{face:?} {} outer {} inner {:?}",
                opt(fc.label.as_ref().map(|l| l as _)),
                opt(fc.outer_component.as_ref().map(|e| e as _)),
                fc.inner_components
            )?;
        }
        for e in self.half_edge_indices() {
            let edge = &self[e];
            writeln!(
                f,
                "{e:?} {} -> {} twin {:?} next {} prev {} face {}",
                opt(edge.origin.as_ref().map(|v| v as _)),
                opt(self.destination(e).as_ref().map(|v| v as _)),
                edge.twin,
                opt(edge.next.as_ref().map(|e| e as _)),
                opt(edge.prev.as_ref().map(|e| e as _)),
                opt(edge.face.as_ref().map(|f| f as _)),
            )?;
        }
        Ok(())
    }
}
