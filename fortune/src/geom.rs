//! Points, and the handful of formulas the sweep needs: parabolic arcs,
//! breakpoints between neighboring arcs, and circumcircles.

use std::hash::{Hash, Hasher};

use robust::Coord;

/// A point in the plane.
///
/// Equality is exact, and hashing agrees with equality, so points can be
/// used as map keys. That's only sound because points never hold NaN:
/// [`SiteSet`](crate::SiteSet) rejects NaN input, and every point computed
/// from finite sites is finite.
#[derive(Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Point {
    /// The horizontal coordinate.
    pub x: f64,
    /// The vertical coordinate. The sweep line moves towards smaller `y`.
    pub y: f64,
}

impl Eq for Point {}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Adding zero turns -0.0 into 0.0, which compare equal.
        (self.x + 0.0).to_bits().hash(state);
        (self.y + 0.0).to_bits().hash(state);
    }
}

impl std::fmt::Debug for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:?}, {:?})", self.x, self.y)
    }
}

impl Point {
    /// Creates a new point.
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Do these two points name the same site?
    ///
    /// This compares coordinates, so two sites typed in twice are the same
    /// site.
    pub fn same_site(&self, other: &Point) -> bool {
        self.x == other.x && self.y == other.y
    }

    /// The squared Euclidean distance between two points.
    pub fn dist_sq(&self, other: &Point) -> f64 {
        (*self - *other).norm_sq()
    }

    pub(crate) fn coord(self) -> Coord<f64> {
        Coord {
            x: self.x,
            y: self.y,
        }
    }

    pub(crate) fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl std::ops::Sub for Point {
    type Output = Vector;

    fn sub(self, rhs: Self) -> Self::Output {
        Vector {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl std::ops::Add<Vector> for Point {
    type Output = Point;

    fn add(self, rhs: Vector) -> Self::Output {
        Point {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

/// A displacement between two points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vector {
    /// The horizontal component.
    pub x: f64,
    /// The vertical component.
    pub y: f64,
}

impl Vector {
    /// Creates a new vector.
    pub fn new(x: f64, y: f64) -> Self {
        Vector { x, y }
    }

    /// The z component of the 3d cross product; positive if `other` is
    /// counter-clockwise from `self`.
    pub fn cross(&self, other: &Vector) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// The dot product.
    pub fn dot(&self, other: &Vector) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// This vector, rotated a quarter turn counter-clockwise.
    pub fn perp(&self) -> Vector {
        Vector {
            x: -self.y,
            y: self.x,
        }
    }

    /// The squared length.
    pub fn norm_sq(&self) -> f64 {
        self.dot(self)
    }

    /// The counter-clockwise angle from `self` to `other`, in `[0, 2π)`.
    pub fn angle_to(&self, other: &Vector) -> f64 {
        let angle = self.cross(other).atan2(self.dot(other));
        if angle < 0.0 {
            angle + std::f64::consts::TAU
        } else {
            angle
        }
    }
}

impl std::ops::Mul<f64> for Vector {
    type Output = Vector;

    fn mul(self, rhs: f64) -> Self::Output {
        Vector {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

/// The orientation of three points: positive if they turn counter-clockwise,
/// negative if they turn clockwise, and zero if they're collinear.
///
/// The sign is exact.
pub fn orient(a: Point, b: Point, c: Point) -> f64 {
    robust::orient2d(a.coord(), b.coord(), c.coord())
}

/// Is `d` strictly inside the circle through `a`, `b` and `c`?
///
/// The three points may come in either orientation, but must not be collinear.
/// The answer is exact.
pub fn strictly_inside_circle(a: Point, b: Point, c: Point, d: Point) -> bool {
    let det = robust::incircle(a.coord(), b.coord(), c.coord(), d.coord());
    if orient(a, b, c) > 0.0 {
        det > 0.0
    } else {
        det < 0.0
    }
}

/// The height of the parabola with the given focus and (horizontal) directrix,
/// at horizontal position `x`.
///
/// This is the beach-line arc of the site `focus` when the sweep line is at
/// `directrix`. The directrix must be strictly below the focus.
pub fn parabola_y(focus: Point, directrix: f64, x: f64) -> f64 {
    let dx = x - focus.x;
    dx * dx / (2.0 * (focus.y - directrix)) + (focus.y + directrix) / 2.0
}

/// The horizontal position of the breakpoint between the arc of `left` (on the
/// left) and the arc of `right` (on the right) when the sweep line is at `directrix`.
///
/// Both sites must be at or above the directrix, and at most one of them on it.
/// A site on the directrix has a degenerate arc: a vertical ray up from the site.
pub fn breakpoint_x(left: Point, right: Point, directrix: f64) -> f64 {
    let d1 = 2.0 * (left.y - directrix);
    let d2 = 2.0 * (right.y - directrix);
    if d1 == 0.0 {
        return left.x;
    }
    if d2 == 0.0 {
        return right.x;
    }

    // The difference between the two parabolas is a x^2 + b x + c, and it
    // crosses zero (from positive to negative, or negative to positive
    // depending on the sign of a) where the left arc hands over to the right
    // one. Of the two roots, that's always (-b + sqrt(disc)) / 2a.
    let a = 1.0 / d1 - 1.0 / d2;
    let b = 2.0 * (right.x / d2 - left.x / d1);
    let c = left.x * left.x / d1 - right.x * right.x / d2 + (left.y - right.y) / 2.0;

    let disc = (b * b - 4.0 * a * c).max(0.0);
    let sq = disc.sqrt();
    if b > 0.0 {
        // Same root, but without the cancellation in -b + sq. This also
        // covers sites at the same height, where a vanishes.
        2.0 * c / (-b - sq)
    } else if a != 0.0 {
        (-b + sq) / (2.0 * a)
    } else {
        -c / b
    }
}

/// A circle, as produced by [`circumcircle`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Circle {
    /// The center.
    pub center: Point,
    /// The radius.
    pub radius: f64,
    bottom_y: f64,
}

impl Circle {
    /// The lowest point of the circle, where the sweep line touches it last.
    ///
    /// It is never above the lowest of the three points the circle was
    /// built from.
    pub fn bottom(&self) -> Point {
        Point::new(self.center.x, self.bottom_y)
    }
}

/// The circle through three points, or `None` if they're exactly collinear.
///
/// Nearly collinear points have huge circles. Everything is computed
/// relative to the lowest of the three points, and the bottom of the circle
/// doesn't come from subtracting the radius from the center's height, so it
/// stays accurate however far away the center is.
pub fn circumcircle(a: Point, b: Point, c: Point) -> Option<Circle> {
    let mut points = [a, b, c];
    points.sort_by(|p, q| p.y.total_cmp(&q.y));
    let [low, p, q] = points;
    let d = 2.0 * orient(low, p, q);
    if d == 0.0 {
        return None;
    }

    let lp = p - low;
    let lq = q - low;
    let lp_sq = lp.norm_sq();
    let lq_sq = lq.norm_sq();
    let offset = Vector::new(
        (lq.y * lp_sq - lp.y * lq_sq) / d,
        (lp.x * lq_sq - lq.x * lp_sq) / d,
    );
    let radius = offset.norm_sq().sqrt();
    // How far the bottom is below `low`. With the center above `low`, that's
    // r - dy = dx^2 / (dy + r).
    let drop = if offset.y > 0.0 {
        offset.x * offset.x / (offset.y + radius)
    } else {
        radius - offset.y
    };
    Some(Circle {
        center: low + offset,
        radius,
        bottom_y: low.y - drop,
    })
}

/// The direction of the Voronoi edge between `left` and `right`, oriented so
/// that `left` is on its left.
///
/// This is the perpendicular bisector direction `perp(right - left)`.
pub fn bisector_direction(left: Point, right: Point) -> Vector {
    (right - left).perp()
}
