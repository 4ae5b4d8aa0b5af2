//! The Delaunay triangulation, as the dual of a Voronoi diagram.
//!
//! Two sites are joined by a Delaunay edge exactly when their Voronoi cells
//! share an edge, so the triangulation's graph comes straight from the
//! diagram's adjacency. What's left to do is to work out the faces: around
//! each vertex the edges are taken in angular order, and each half-edge is
//! followed by the next one clockwise from its twin.

use crate::{
    dcel::{Dcel, FaceIdx, FaceLabel, HalfEdgeIdx, VertexIdx},
    sites::{SiteIdx, SiteSet},
    voronoi::VoronoiDiagram,
    Error,
};

/// A Delaunay triangulation.
///
/// Vertex `i` of the DCEL is site `i`. Every bounded face is a triangle,
/// labelled [`FaceLabel::Triangle`]; the unbounded face is bounded by the
/// convex hull.
#[derive(Clone, Debug, serde::Serialize)]
pub struct DelaunayTriangulation {
    sites: SiteSet,
    dcel: Dcel,
    vertices: Vec<VertexIdx>,
    outer_face: FaceIdx,
    triangles: Vec<FaceIdx>,
}

impl DelaunayTriangulation {
    /// Builds the triangulation dual to a Voronoi diagram.
    ///
    /// Fails with [`Error::Collinear`] if the sites are all on one line.
    pub fn from_voronoi(voronoi: &VoronoiDiagram) -> Result<Self, Error> {
        if voronoi.is_collinear() {
            return Err(Error::Collinear);
        }
        let sites = voronoi.sites().clone();
        let mut dcel = Dcel::new();
        let vertices: Vec<_> = sites.iter().map(|(_, p)| dcel.add_vertex(p)).collect();

        let mut outgoing = vec![Vec::new(); sites.len()];
        for (s, t) in voronoi.adjacent_pairs() {
            let e = dcel.add_edge_between(vertices[s.0], vertices[t.0]);
            outgoing[s.0].push(e);
            outgoing[t.0].push(dcel[e].twin);
        }

        // Starting from the leftmost site, the steepest edge has the outside
        // on its left.
        let leftmost = sites
            .iter()
            .min_by(|(_, p), (_, q)| p.x.total_cmp(&q.x).then(p.y.total_cmp(&q.y)))
            .map(|(s, _)| s);
        // unwrap: site sets aren't empty, and in a non-collinear diagram every
        // site has a neighbor
        let leftmost = leftmost.unwrap();
        let start = outgoing[leftmost.0]
            .iter()
            .copied()
            .max_by(|&e, &f| angle(&dcel, e).total_cmp(&angle(&dcel, f)))
            .unwrap();

        let outer_face = dcel.add_face();
        dcel.face_mut(outer_face).inner_components.push(start);
        close_face(&mut dcel, &outgoing, start, outer_face);

        let mut triangles = Vec::new();
        for e in dcel.half_edge_indices().collect::<Vec<_>>() {
            if dcel[e].next.is_some() {
                continue;
            }
            let face = dcel.add_face();
            let f = dcel.face_mut(face);
            f.outer_component = Some(e);
            f.label = Some(FaceLabel::Triangle(triangles.len()));
            close_face(&mut dcel, &outgoing, e, face);
            triangles.push(face);
        }

        #[cfg(debug_assertions)]
        dcel.check_invariants();
        tracing::debug!(
            sites = sites.len(),
            triangles = triangles.len(),
            "built the triangulation"
        );

        Ok(DelaunayTriangulation {
            sites,
            dcel,
            vertices,
            outer_face,
            triangles,
        })
    }

    /// The sites.
    pub fn sites(&self) -> &SiteSet {
        &self.sites
    }

    /// The triangulation.
    pub fn dcel(&self) -> &Dcel {
        &self.dcel
    }

    /// The vertex standing for a site.
    pub fn vertex(&self, site: SiteIdx) -> VertexIdx {
        self.vertices[site.0]
    }

    /// The site a vertex stands for.
    pub fn site(&self, vertex: VertexIdx) -> SiteIdx {
        SiteIdx(vertex.index())
    }

    /// The face outside the convex hull.
    pub fn outer_face(&self) -> FaceIdx {
        self.outer_face
    }

    /// The triangular faces, in the order of their labels.
    pub fn triangle_faces(&self) -> &[FaceIdx] {
        &self.triangles
    }

    /// The number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// The triangles, as counter-clockwise triples of sites.
    pub fn triangles(&self) -> Vec<[SiteIdx; 3]> {
        self.triangles
            .iter()
            .map(|&f| {
                let corners = self.face_sites(f);
                assert_eq!(corners.len(), 3, "{f:?} isn't a triangle");
                [corners[0], corners[1], corners[2]]
            })
            .collect()
    }

    /// The sites on the convex hull, in clockwise order.
    pub fn hull(&self) -> Vec<SiteIdx> {
        self.face_sites(self.outer_face)
    }

    /// The edges, as pairs of sites.
    pub fn edges(&self) -> impl Iterator<Item = (SiteIdx, SiteIdx)> + '_ {
        self.dcel.half_edge_indices().step_by(2).map(|e| {
            // unwrap: every edge joins two sites
            let from = self.dcel[e].origin.unwrap();
            let to = self.dcel.destination(e).unwrap();
            (self.site(from), self.site(to))
        })
    }

    fn face_sites(&self, face: FaceIdx) -> Vec<SiteIdx> {
        self.dcel
            .face_cycle(face)
            .filter_map(|e| self.dcel[e].origin)
            .map(|v| self.site(v))
            .collect()
    }
}

/// The direction of a half-edge, as an angle in `(-π, π]`.
fn angle(dcel: &Dcel, e: HalfEdgeIdx) -> f64 {
    // unwrap: all the triangulation's edges join two sites
    let d = dcel.destination_point(e).unwrap() - dcel.origin_point(e).unwrap();
    d.y.atan2(d.x)
}

/// The half-edge following `e` around its face: the first one clockwise
/// from `e`'s twin, around `e`'s destination.
fn next_around(dcel: &Dcel, outgoing: &[Vec<HalfEdgeIdx>], e: HalfEdgeIdx) -> HalfEdgeIdx {
    let twin = dcel[e].twin;
    // unwrap: all the triangulation's edges join two sites
    let v = dcel.destination(e).unwrap();
    let center = dcel[v].point;
    let back = dcel[dcel[e].origin.unwrap()].point - center;

    outgoing[v.index()]
        .iter()
        .copied()
        .filter(|&c| c != twin)
        .max_by(|&c, &d| {
            let angle = |h: HalfEdgeIdx| {
                let to = dcel.destination_point(h).unwrap() - center;
                back.angle_to(&to)
            };
            angle(c).total_cmp(&angle(d))
        })
        // A vertex with only one edge: turn around.
        .unwrap_or(twin)
}

/// Threads the face cycle through `start`, putting all of it in `face`.
fn close_face(dcel: &mut Dcel, outgoing: &[Vec<HalfEdgeIdx>], start: HalfEdgeIdx, face: FaceIdx) {
    let mut e = start;
    let mut steps = 0;
    loop {
        dcel.edge_mut(e).face = Some(face);
        let next = next_around(dcel, outgoing, e);
        dcel.set_next(e, next);
        e = next;
        steps += 1;
        assert!(
            steps <= dcel.num_half_edges(),
            "the face through {start:?} doesn't close"
        );
        if e == start {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use malachite::Rational;

    use super::*;
    use crate::{geom::Point, options::Options};

    fn triangulate(points: &[(f64, f64)]) -> DelaunayTriangulation {
        let sites = SiteSet::new(points.iter().copied()).unwrap();
        VoronoiDiagram::build(&sites, &Options::default())
            .delaunay()
            .unwrap()
    }

    fn exact(p: Point) -> [Rational; 2] {
        // unwrap: site coordinates are finite
        [
            Rational::try_from(p.x).unwrap(),
            Rational::try_from(p.y).unwrap(),
        ]
    }

    /// Is `d` strictly inside the circle through the counter-clockwise `a`, `b`, `c`?
    /// Computed exactly, with no help from the predicates under test.
    fn exactly_inside(a: Point, b: Point, c: Point, d: Point) -> bool {
        let [dx, dy] = exact(d);
        let row = |p: Point| {
            let [x, y] = exact(p);
            let (x, y) = (x - &dx, y - &dy);
            let lift = &x * &x + &y * &y;
            (x, y, lift)
        };
        let (ax, ay, al) = row(a);
        let (bx, by, bl) = row(b);
        let (cx, cy, cl) = row(c);
        let det = &ax * (&by * &cl - &bl * &cy) - &ay * (&bx * &cl - &bl * &cx)
            + &al * (&bx * &cy - &by * &cx);
        det > Rational::from(0)
    }

    #[test]
    fn single_triangle() {
        let tri = triangulate(&[(0.0, 0.0), (2.0, 0.0), (1.0, 2.0)]);
        assert_eq!(tri.num_triangles(), 1);
        insta::assert_debug_snapshot!(tri.triangles(), @r###"
        [
            [
                p0,
                p1,
                p2,
            ],
        ]
        "###);
        assert_eq!(tri.hull(), [1, 0, 2].map(SiteIdx));
        assert_eq!(tri.edges().count(), 3);
        assert!(tri.dcel()[tri.outer_face()].is_unbounded());
    }

    #[test]
    fn point_in_a_square() {
        let tri = triangulate(&[(0.0, 0.0), (4.0, 0.1), (4.2, 4.0), (0.1, 3.9), (2.0, 2.1)]);
        // 2n - 2 - h, with four sites on the hull.
        assert_eq!(tri.num_triangles(), 4);
        assert_eq!(tri.hull().len(), 4);
        let center = tri
            .sites()
            .iter()
            .find(|(_, p)| *p == Point::new(2.0, 2.1))
            .map(|(s, _)| s)
            .unwrap();
        assert!(!tri.hull().contains(&center));
        for t in tri.triangles() {
            assert!(t.contains(&center));
        }
    }

    #[test]
    fn triangles_are_counter_clockwise_and_empty() {
        let points = [
            (0.0, 0.0),
            (3.0, 0.5),
            (5.0, 2.0),
            (1.0, 4.0),
            (2.5, 2.0),
            (-1.0, 2.0),
            (4.0, 4.5),
            (2.0, -2.0),
        ];
        let tri = triangulate(&points);
        let sites = tri.sites();
        let n = sites.len();
        assert_eq!(tri.num_triangles(), 2 * n - 2 - tri.hull().len());

        for [a, b, c] in tri.triangles() {
            let (pa, pb, pc) = (sites[a], sites[b], sites[c]);
            assert!(crate::geom::orient(pa, pb, pc) > 0.0);
            for (s, p) in sites.iter() {
                if ![a, b, c].contains(&s) {
                    assert!(!exactly_inside(pa, pb, pc, p), "{s:?} is inside {a:?}{b:?}{c:?}");
                }
            }
        }
    }

    #[test]
    fn collinear_sites() {
        let sites = SiteSet::new([(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]).unwrap();
        let v = VoronoiDiagram::build(&sites, &Options::default());
        assert_matches!(DelaunayTriangulation::from_voronoi(&v), Err(Error::Collinear));
    }
}
