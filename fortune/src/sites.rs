use crate::{
    geom::{orient, Point},
    Error,
};

/// An index into a [`SiteSet`].
///
/// Sites are numbered in sweep order: `SiteIdx(0)` is the highest site.
/// (Like all the indices in this crate, a `SiteIdx` only means something
/// to the `SiteSet` it came from.)
#[derive(
    Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct SiteIdx(pub usize);

impl std::fmt::Debug for SiteIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// The sites of a diagram, ready to be swept.
///
/// The sweep needs its sites to have distinct `y` coordinates. Building a
/// `SiteSet` takes care of that: it rejects non-finite coordinates, drops
/// exact duplicates, nudges sites that share a `y` coordinate downwards by a
/// tiny amount, and sorts the result by decreasing `y`. The nudging is
/// deterministic: among sites at the same height, the leftmost one keeps its
/// coordinate, and a site `t * extent` to the right of it moves down by
/// `eps * (t + t^2)`, where `eps` is the perturbation times the extent of the
/// whole set. The row bends into an arch, so three nudged sites are never
/// collinear unless rounding makes them so.
///
/// Whether the sites are collinear is decided before nudging, on the sites
/// as given.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SiteSet {
    points: Vec<Point>,
    extent: f64,
    collinear: bool,
}

impl SiteSet {
    /// The default relative perturbation used by [`SiteSet::new`].
    pub const DEFAULT_PERTURBATION: f64 = 1e-9;

    /// Prepares a collection of sites for sweeping.
    pub fn new<P: Into<Point>>(points: impl IntoIterator<Item = P>) -> Result<Self, Error> {
        Self::with_perturbation(points, Self::DEFAULT_PERTURBATION)
    }

    /// Prepares a collection of sites for sweeping, breaking ties in `y`
    /// with the given perturbation (relative to the extent of the site set).
    pub fn with_perturbation<P: Into<Point>>(
        points: impl IntoIterator<Item = P>,
        perturbation: f64,
    ) -> Result<Self, Error> {
        let mut points: Vec<Point> = points.into_iter().map(Into::into).collect();
        let (min, max) = extrema(points.iter().flat_map(|p| [p.x, p.y]))?;
        if min.is_infinite() || max.is_infinite() {
            // An empty input leaves the extrema at their infinite starting values.
            return Err(if points.is_empty() {
                Error::NoSites
            } else {
                Error::Infinity
            });
        }

        points.sort_by(|p, q| q.y.total_cmp(&p.y).then(p.x.total_cmp(&q.x)));
        points.dedup_by(|p, q| p.same_site(q));

        let extent = extent(&points);
        let collinear = collinear(&points);
        perturb_ties(&mut points, perturbation * extent, extent);
        debug_assert!(points.windows(2).all(|w| w[0].y > w[1].y));

        Ok(SiteSet {
            points,
            extent,
            collinear,
        })
    }

    /// The number of sites.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Is this set empty? (It never is; construction fails on empty input.)
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The position of a site.
    pub fn get(&self, idx: SiteIdx) -> Point {
        self.points[idx.0]
    }

    /// All the site indices, in sweep order.
    pub fn indices(&self) -> impl Iterator<Item = SiteIdx> {
        (0..self.points.len()).map(SiteIdx)
    }

    /// All the site positions, in sweep order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The sites, with their indices.
    pub fn iter(&self) -> impl Iterator<Item = (SiteIdx, Point)> + '_ {
        self.points.iter().enumerate().map(|(i, p)| (SiteIdx(i), *p))
    }

    /// The larger of the width and the height of the site set, or 1.0 if
    /// that would be zero.
    ///
    /// Tolerances are measured relative to this.
    pub fn extent(&self) -> f64 {
        self.extent
    }

    /// Do all the sites lie on one line? Fewer than three sites always do.
    ///
    /// This is exact, and looks at the sites before ties were broken: a row
    /// of sites at the same height is collinear even though nudging bent it.
    pub fn is_collinear(&self) -> bool {
        self.collinear
    }
}

impl std::ops::Index<SiteIdx> for SiteSet {
    type Output = Point;

    fn index(&self, index: SiteIdx) -> &Point {
        &self.points[index.0]
    }
}

fn extrema(mut xs: impl Iterator<Item = f64>) -> Result<(f64, f64), Error> {
    xs.try_fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), x| {
        if x.is_nan() {
            Err(Error::NaN)
        } else {
            Ok((x.min(min), x.max(max)))
        }
    })
}

fn extent(points: &[Point]) -> f64 {
    let (x_min, x_max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.x), hi.max(p.x))
        });
    let (y_min, y_max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.y), hi.max(p.y))
        });
    let extent = (x_max - x_min).max(y_max - y_min);
    if extent > 0.0 {
        extent
    } else {
        1.0
    }
}

fn collinear(points: &[Point]) -> bool {
    match points {
        [first, second, rest @ ..] => rest.iter().all(|&p| orient(*first, *second, p) == 0.0),
        _ => true,
    }
}

/// Assumes the points are sorted by decreasing `y`, and by increasing `x`
/// within the same `y`, with no duplicates.
fn perturb_ties(points: &mut [Point], eps: f64, extent: f64) {
    let mut start = 0;
    while start < points.len() {
        let Point { x: x0, y } = points[start];
        let end = start + points[start..].iter().take_while(|p| p.y == y).count();
        if end - start > 1 {
            // The biggest nudge is 2 eps; keep it within half of the gap to
            // the next height down.
            let eps = match points.get(end) {
                Some(next) => eps.min((y - next.y) / 4.0),
                None => eps,
            };
            for k in start + 1..end {
                let t = (points[k].x - x0) / extent;
                let prev = points[k - 1].y;
                let mut new_y = y - eps * (t + t * t);
                if new_y >= prev {
                    new_y = next_down(prev);
                }
                points[k].y = new_y;
            }
        }
        start = end;
    }
}

/// The largest float strictly smaller than `x`, for finite `x`.
fn next_down(x: f64) -> f64 {
    if x == 0.0 {
        -f64::from_bits(1)
    } else if x > 0.0 {
        f64::from_bits(x.to_bits() - 1)
    } else {
        f64::from_bits(x.to_bits() + 1)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn rejects_bad_input() {
        assert_matches!(SiteSet::new([(0.0, f64::NAN)]), Err(Error::NaN));
        assert_matches!(
            SiteSet::new([(0.0, 1.0), (f64::INFINITY, 1.0)]),
            Err(Error::Infinity)
        );
        assert_matches!(SiteSet::new(Vec::<Point>::new()), Err(Error::NoSites));
    }

    #[test]
    fn sorted_and_deduplicated() {
        let sites = SiteSet::new([(0.0, 0.0), (1.0, 3.0), (0.0, 0.0), (-2.0, 1.0)]).unwrap();
        assert_eq!(
            sites.points(),
            &[
                Point::new(1.0, 3.0),
                Point::new(-2.0, 1.0),
                Point::new(0.0, 0.0)
            ]
        );
        assert_eq!(sites.extent(), 3.0);
        assert_eq!(sites[SiteIdx(1)], Point::new(-2.0, 1.0));
    }

    #[test]
    fn ties_are_broken_downwards() {
        let sites = SiteSet::new([(2.0, 5.0), (0.0, 5.0), (1.0, 5.0)]).unwrap();
        let ps = sites.points();
        assert_eq!(ps[0], Point::new(0.0, 5.0));
        assert_eq!(ps[1].x, 1.0);
        assert_eq!(ps[2].x, 2.0);
        assert!(ps[0].y > ps[1].y && ps[1].y > ps[2].y);
        assert!(5.0 - ps[2].y < 1e-8);
    }

    #[test]
    fn tied_rows_bend_into_an_arch() {
        // Evenly spaced, so a nudge proportional to the position along the
        // row would leave it straight.
        let sites = SiteSet::new([(0.0, 5.0), (1.0, 5.0), (2.0, 5.0), (3.0, 5.0)]).unwrap();
        let ps = sites.points();
        for w in ps.windows(3) {
            // The middle one is above the chord.
            assert!(orient(w[0], w[1], w[2]) < 0.0, "{w:?}");
        }
        assert!(sites.is_collinear());
    }

    #[test]
    fn collinearity() {
        assert!(SiteSet::new([(0.0, 0.0), (1.0, 1.0), (3.0, 3.0)])
            .unwrap()
            .is_collinear());
        assert!(SiteSet::new([(0.0, 0.0), (1.0, 1.0)]).unwrap().is_collinear());
        // Duplicates don't count as a second direction.
        assert!(SiteSet::new([(2.0, 0.0), (2.0, 0.0), (2.0, 7.0)])
            .unwrap()
            .is_collinear());
        assert!(!SiteSet::new([(7.0, 5.0), (-1.0, 5.0), (0.0, 5.0), (-5.0, -6.0)])
            .unwrap()
            .is_collinear());
    }

    #[test]
    fn ties_stay_above_the_next_row() {
        let sites =
            SiteSet::with_perturbation([(0.0, 1.0), (1.0, 1.0), (2.0, 1.0), (0.5, 0.999)], 0.1)
                .unwrap();
        let ys: Vec<_> = sites.points().iter().map(|p| p.y).collect();
        assert!(ys.windows(2).all(|w| w[0] > w[1]), "{ys:?}");
        assert_eq!(ys[3], 0.999);
    }

    #[test]
    fn single_site() {
        let sites = SiteSet::new([(3.0, 4.0)]).unwrap();
        assert_eq!(sites.len(), 1);
        assert_eq!(sites.extent(), 1.0);
    }

    #[test]
    fn next_down_is_tight() {
        assert!(next_down(1.0) < 1.0);
        assert!(next_down(-1.0) < -1.0);
        assert!(next_down(0.0) < 0.0);
        assert_eq!(next_down(1.0), 1.0 - f64::EPSILON / 2.0);
    }
}
