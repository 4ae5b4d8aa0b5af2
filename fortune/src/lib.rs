#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

pub mod beach_line;
pub mod dcel;
mod delaunay;
pub mod events;
mod geom;
mod options;
mod sites;
pub mod voronoi;

pub use dcel::{Dcel, FaceIdx, FaceLabel, HalfEdgeIdx, VertexIdx};
pub use delaunay::DelaunayTriangulation;
pub use geom::{Point, Vector};
pub use options::{BeachLineKind, Options};
pub use sites::{SiteIdx, SiteSet};
pub use voronoi::{BoundingBox, Sweep, SweepState, SweepStep, VoronoiDiagram};

#[cfg(test)]
pub mod perturbation;

/// The ways building a diagram can fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum Error {
    /// At least one of the inputs was infinite.
    #[error("a site coordinate is infinite")]
    Infinity,
    /// At least one of the inputs was not a number.
    #[error("a site coordinate is NaN")]
    NaN,
    /// There were no sites at all.
    #[error("there are no sites")]
    NoSites,
    /// All the sites are on one line, so there's no triangulation.
    #[error("the sites are collinear")]
    Collinear,
}
