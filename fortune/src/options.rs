/// Which beach-line representation the sweep uses.
///
/// Both give the same diagrams; they differ only in how fast they find the
/// arc above a new site.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum BeachLineKind {
    /// A linked list of arcs, searched from left to right.
    List,
    /// A self-adjusting (splay) tree of arcs.
    #[default]
    Tree,
}

/// Knobs for building a diagram.
///
/// All the tolerances are relative: they get multiplied by the extent of the
/// site set (see [`SiteSet::extent`](crate::SiteSet::extent)) before use.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Options {
    /// How much bigger than the diagram the clipping box is.
    ///
    /// The box is the bounding box of all sites and Voronoi vertices, scaled
    /// by this factor about its center. Must be bigger than 1.
    pub margin: f64,
    /// How far above the sweep line a circle event may be and still get
    /// scheduled. This absorbs rounding in the circumcircle computation.
    pub tolerance: f64,
    /// How far below a site event the breakpoints get sampled to estimate
    /// the slope of a new edge. Edges that never get a vertex are clipped
    /// along that slope.
    pub slope_sample: f64,
    /// The beach-line representation.
    pub beach_line: BeachLineKind,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            margin: 1.5,
            tolerance: 1e-9,
            slope_sample: 0.25,
            beach_line: BeachLineKind::default(),
        }
    }
}

impl Options {
    /// These options, with a different beach line.
    pub fn with_beach_line(self, beach_line: BeachLineKind) -> Self {
        Options { beach_line, ..self }
    }
}
