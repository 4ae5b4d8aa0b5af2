//! The clipping box, and cutting unbounded edges off at it.

use tracing::trace;

use crate::{
    dcel::{Dcel, HalfEdgeIdx},
    geom::{Point, Vector},
};

/// An axis-aligned rectangle.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct BoundingBox {
    /// The bottom-left corner.
    pub min: Point,
    /// The top-right corner.
    pub max: Point,
}

impl BoundingBox {
    /// The smallest box containing all the points, or `None` if there aren't any.
    pub fn enclosing(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        points.into_iter().fold(None, |bbox, p| {
            Some(match bbox {
                None => BoundingBox { min: p, max: p },
                Some(BoundingBox { min, max }) => BoundingBox {
                    min: Point::new(min.x.min(p.x), min.y.min(p.y)),
                    max: Point::new(max.x.max(p.x), max.y.max(p.y)),
                },
            })
        })
    }

    /// This box, scaled about its center by `margin`.
    ///
    /// A side that's much shorter than the other one (or that has zero
    /// length) is first stretched to half the length of the other one, so
    /// that the result is never degenerate.
    pub fn grow(&self, margin: f64) -> Self {
        let half_width = self.width() / 2.0;
        let half_height = self.height() / 2.0;
        let extent = half_width.max(half_height);
        let extent = if extent > 0.0 { extent } else { 1.0 };
        let half = Vector::new(
            margin * half_width.max(extent / 2.0),
            margin * half_height.max(extent / 2.0),
        );
        let center = self.center();
        BoundingBox {
            min: center + half * -1.0,
            max: center + half,
        }
    }

    /// The horizontal size.
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// The vertical size.
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// The center.
    pub fn center(&self) -> Point {
        self.min.midpoint(&self.max)
    }

    /// Is `p` in the box (or on its boundary)?
    pub fn contains(&self, p: Point) -> bool {
        self.min.x <= p.x && p.x <= self.max.x && self.min.y <= p.y && p.y <= self.max.y
    }

    /// The corners, clockwise from the top left.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min.x, self.max.y),
            self.max,
            Point::new(self.max.x, self.min.y),
            self.min,
        ]
    }

    /// Where the ray from `from` (inside the box) in direction `dir` leaves the box.
    fn exit(&self, from: Point, dir: Vector) -> (Side, Point) {
        let time = |lo: f64, hi: f64, start: f64, speed: f64| {
            if speed > 0.0 {
                (hi - start) / speed
            } else if speed < 0.0 {
                (lo - start) / speed
            } else {
                f64::INFINITY
            }
        };
        let tx = time(self.min.x, self.max.x, from.x, dir.x);
        let ty = time(self.min.y, self.max.y, from.y, dir.y);

        if tx <= ty {
            let (side, x) = if dir.x > 0.0 {
                (Side::Right, self.max.x)
            } else {
                (Side::Left, self.min.x)
            };
            let y = (from.y + tx * dir.y).clamp(self.min.y, self.max.y);
            (side, Point::new(x, y))
        } else {
            let (side, y) = if dir.y > 0.0 {
                (Side::Top, self.max.y)
            } else {
                (Side::Bottom, self.min.y)
            };
            let x = (from.x + ty * dir.x).clamp(self.min.x, self.max.x);
            (side, Point::new(x, y))
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Top = 0,
    Right = 1,
    Bottom = 2,
    Left = 3,
}

/// A bounding box that's been added to a DCEL.
///
/// The box's outside is a clockwise cycle and its inside a counter-clockwise
/// one. Clipping splits the sides, so for each side we keep the clockwise
/// pieces it has been split into.
#[derive(Clone, Debug)]
pub(crate) struct Frame {
    bbox: BoundingBox,
    sides: [Vec<HalfEdgeIdx>; 4],
    inner: HalfEdgeIdx,
}

impl Frame {
    pub(crate) fn new(dcel: &mut Dcel, bbox: BoundingBox) -> Self {
        let [v1, v2, v3, v4] = bbox.corners().map(|p| dcel.add_vertex(p));
        let outer = [
            dcel.add_edge_between(v1, v2),
            dcel.add_edge_between(v2, v3),
            dcel.add_edge_between(v3, v4),
            dcel.add_edge_between(v4, v1),
        ];
        for i in 0..4 {
            let (e, next) = (outer[i], outer[(i + 1) % 4]);
            dcel.set_next(e, next);
            dcel.set_next(dcel[next].twin, dcel[e].twin);
        }

        Frame {
            bbox,
            sides: outer.map(|e| vec![e]),
            inner: dcel[outer[0]].twin,
        }
    }

    pub(crate) fn bbox(&self) -> BoundingBox {
        self.bbox
    }

    /// A half-edge on the inside of the box.
    pub(crate) fn inner_edge(&self) -> HalfEdgeIdx {
        self.inner
    }

    /// Ends `ray`, which starts at `from` and heads in direction `dir`, where
    /// it meets the box.
    ///
    /// `ray` must be missing its destination. Its origin isn't looked at, so
    /// this also works for the first end of a line with no endpoints at all.
    pub(crate) fn clip(&mut self, dcel: &mut Dcel, ray: HalfEdgeIdx, from: Point, dir: Vector) {
        let (side, p) = self.bbox.exit(from, dir);
        trace!(?ray, ?side, ?p, "clipping");

        let coord = |q: Point| match side {
            Side::Top | Side::Bottom => q.x,
            Side::Left | Side::Right => q.y,
        };
        let c = coord(p);
        let piece = self.sides[side as usize].iter().copied().find(|&e| {
            // unwrap: the box's edges always have both endpoints
            let a = coord(dcel.origin_point(e).unwrap());
            let b = coord(dcel.destination_point(e).unwrap());
            a.min(b) <= c && c <= a.max(b)
        });
        // unwrap: the pieces of a side cover all of it, and exit points are
        // clamped to the side
        let piece = piece.unwrap();

        let rest = dcel.intersect_edge(piece, ray, p);
        self.sides[side as usize].push(rest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grow_about_the_center() {
        let bbox = BoundingBox::enclosing([Point::new(0.0, 0.0), Point::new(4.0, 2.0)]).unwrap();
        let grown = bbox.grow(1.5);
        assert_eq!(grown.min, Point::new(-1.0, -0.5));
        assert_eq!(grown.max, Point::new(5.0, 2.5));
    }

    #[test]
    fn grow_degenerate() {
        let flat = BoundingBox::enclosing([Point::new(0.0, 5.0), Point::new(2.0, 5.0)]).unwrap();
        let grown = flat.grow(2.0);
        assert_eq!(grown.min, Point::new(-1.0, 4.0));
        assert_eq!(grown.max, Point::new(3.0, 6.0));

        let dot = BoundingBox::enclosing([Point::new(1.0, 1.0)]).unwrap();
        let grown = dot.grow(2.0);
        assert_eq!(grown.min, Point::new(0.0, 0.0));
        assert_eq!(grown.max, Point::new(2.0, 2.0));

        assert!(BoundingBox::enclosing([]).is_none());
    }

    #[test]
    fn exits() {
        let bbox = BoundingBox {
            min: Point::new(0.0, 0.0),
            max: Point::new(4.0, 2.0),
        };
        let from = Point::new(1.0, 1.0);
        assert_eq!(
            bbox.exit(from, Vector::new(1.0, 0.0)),
            (Side::Right, Point::new(4.0, 1.0))
        );
        assert_eq!(
            bbox.exit(from, Vector::new(0.0, -3.0)),
            (Side::Bottom, Point::new(1.0, 0.0))
        );
        assert_eq!(
            bbox.exit(from, Vector::new(-1.0, 1.0)),
            (Side::Left, Point::new(0.0, 2.0))
        );
        assert_eq!(
            bbox.exit(from, Vector::new(1.0, 1.0)),
            (Side::Top, Point::new(2.0, 2.0))
        );
    }

    #[test]
    fn clip_a_line_across_the_box() {
        let mut dcel = Dcel::new();
        let bbox = BoundingBox {
            min: Point::new(0.0, 0.0),
            max: Point::new(4.0, 2.0),
        };
        let mut frame = Frame::new(&mut dcel, bbox);
        dcel.check_invariants();

        // A vertical line through the middle, with neither endpoint known.
        let line = dcel.add_edge();
        let twin = dcel[line].twin;
        let mid = Point::new(2.0, 1.0);
        frame.clip(&mut dcel, line, mid, Vector::new(0.0, 1.0));
        frame.clip(&mut dcel, twin, mid, Vector::new(0.0, -1.0));

        assert_eq!(dcel.origin_point(line), Some(Point::new(2.0, 0.0)));
        assert_eq!(dcel.destination_point(line), Some(Point::new(2.0, 2.0)));
        dcel.check_invariants();
        dcel.set_faces();
        dcel.check_invariants();

        // Two rectangles inside, and the outside.
        assert_eq!(dcel.num_vertices(), 6);
        assert_eq!(dcel.num_faces(), 3);
        // The line goes up, so the left half of the box is on its left.
        let left = dcel[line].face.unwrap();
        let right = dcel[twin].face.unwrap();
        assert_ne!(left, right);
        assert_eq!(dcel.face_points(right).len(), 4);
        assert!(dcel.face_points(left).iter().all(|p| p.x <= 2.0));
        assert!(dcel.face_points(right).iter().all(|p| p.x >= 2.0));
        let outside = dcel[dcel[frame.inner_edge()].twin].face.unwrap();
        assert!(dcel[outside].is_unbounded());
    }
}
