//! Strategies for generating awkward site sets.
//!
//! Random sites are easy for a sweep; the trouble comes from grids, rows
//! and cocircular points, and from their slightly-nudged neighbors. We build
//! test cases by taking a few degenerate base cases, moving some of their
//! points by small amounts, and overlaying the results.

use proptest::prelude::*;

use crate::geom::Point;

// Kind of like Arbitrary, but
// - it's a local trait, so we can impl it for whatever we want, and
// - it only returns "reasonable" values.
pub trait Reasonable {
    type Strategy: Strategy<Value = Self>;
    fn reasonable() -> Self::Strategy;
}

impl<S: Reasonable, T: Reasonable> Reasonable for (S, T) {
    type Strategy = (S::Strategy, T::Strategy);

    fn reasonable() -> Self::Strategy {
        (S::reasonable(), T::reasonable())
    }
}

impl Reasonable for f64 {
    type Strategy = BoxedStrategy<f64>;

    fn reasonable() -> Self::Strategy {
        (-1e6..1e6).boxed()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct PointPerturbation {
    pub dx: f64,
    pub dy: f64,
}

impl PointPerturbation {
    pub fn apply(&self, p: Point) -> Point {
        Point::new(p.x + self.dx, p.y + self.dy)
    }
}

#[derive(Clone, Debug)]
pub enum Perturbation {
    Base {
        idx: usize,
    },
    Point {
        perturbation: PointPerturbation,
        idx: usize,
        next: Box<Perturbation>,
    },
    Superimposition {
        left: Box<Perturbation>,
        right: Box<Perturbation>,
    },
}

pub fn point_perturbation(eps: f64) -> impl Strategy<Value = PointPerturbation> {
    (-eps..=eps, -eps..=eps).prop_map(|(dx, dy)| PointPerturbation { dx, dy })
}

pub fn perturbation(eps: f64) -> impl Strategy<Value = Perturbation> {
    let leaf = any::<usize>().prop_map(|idx| Perturbation::Base { idx });
    leaf.prop_recursive(3, 16, 8, move |inner| {
        prop_oneof![
            (point_perturbation(eps), any::<usize>(), inner.clone()).prop_map(
                |(perturbation, idx, next)| Perturbation::Point {
                    perturbation,
                    idx,
                    next: Box::new(next),
                }
            ),
            (inner.clone(), inner.clone()).prop_map(|(left, right)| {
                Perturbation::Superimposition {
                    left: Box::new(left),
                    right: Box::new(right),
                }
            })
        ]
    })
}

/// Some site sets that are degenerate in all the ways a sweep cares about.
pub fn degenerate_cases() -> Vec<Vec<Point>> {
    let grid = (0..3)
        .flat_map(|i| (0..3).map(move |j| Point::new(i as f64, j as f64)))
        .collect();
    // Integer points on a circle of radius 5.
    let circle = [
        (0.0, 5.0),
        (3.0, 4.0),
        (4.0, 3.0),
        (5.0, 0.0),
        (4.0, -3.0),
        (3.0, -4.0),
        (0.0, -5.0),
        (-3.0, -4.0),
        (-4.0, -3.0),
        (-5.0, 0.0),
        (-4.0, 3.0),
        (-3.0, 4.0),
    ]
    .into_iter()
    .map(Point::from)
    .collect();
    let row = (0..5).map(|i| Point::new(i as f64, 0.0)).collect();
    let column = (0..5).map(|i| Point::new(1.0, i as f64)).collect();
    let diagonal = (0..5).map(|i| Point::new(i as f64, i as f64)).collect();
    vec![grid, circle, row, column, diagonal]
}

fn index<T>(arr: &[T], idx: usize) -> &T {
    &arr[idx % arr.len()]
}

fn index_mut<T>(arr: &mut [T], idx: usize) -> &mut T {
    let len = arr.len();
    &mut arr[idx % len]
}

pub fn realize_perturbation(base_cases: &[Vec<Point>], pert: &Perturbation) -> Vec<Point> {
    match pert {
        Perturbation::Base { idx } => index(base_cases, *idx).to_owned(),
        Perturbation::Point {
            perturbation,
            idx,
            next,
        } => {
            let mut next = realize_perturbation(base_cases, next);
            let p = index_mut(&mut next, *idx);
            *p = perturbation.apply(*p);
            next
        }
        Perturbation::Superimposition { left, right } => {
            let mut next = realize_perturbation(base_cases, left);
            next.extend(realize_perturbation(base_cases, right));
            next
        }
    }
}
