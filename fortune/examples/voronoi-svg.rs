use std::path::PathBuf;

use anyhow::{anyhow, bail};
use clap::Parser;
use fortune::{BeachLineKind, Options, Point, SiteSet, VoronoiDiagram};
use svg::node::element::{path::Data, Circle, Path};

/// Draws the Voronoi diagram and Delaunay triangulation of some sites.
///
/// The input has sites written as `(x, y)`, any number to a line.
#[derive(Parser)]
struct Args {
    input: PathBuf,
    output: PathBuf,

    /// Use the linked-list beach line instead of the tree.
    #[arg(long)]
    list: bool,

    /// Don't draw the triangulation.
    #[arg(long)]
    no_delaunay: bool,
}

fn parse_sites(input: &str) -> anyhow::Result<Vec<Point>> {
    let mut points = Vec::new();
    for (line_no, line) in input.lines().enumerate() {
        let mut rest = line.trim();
        while !rest.is_empty() {
            let Some(body) = rest.strip_prefix('(') else {
                bail!("line {}: expected '(' at {rest:?}", line_no + 1);
            };
            let (pair, tail) = body
                .split_once(')')
                .ok_or_else(|| anyhow!("line {}: unclosed parenthesis", line_no + 1))?;
            let (x, y) = pair
                .split_once(',')
                .ok_or_else(|| anyhow!("line {}: expected \"x, y\" in {pair:?}", line_no + 1))?;
            points.push(Point::new(x.trim().parse()?, y.trim().parse()?));
            rest = tail.trim_start();
        }
    }
    Ok(points)
}

fn segment(a: Point, b: Point) -> Data {
    // SVG's y axis points down.
    Data::new().move_to((a.x, -a.y)).line_to((b.x, -b.y))
}

pub fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let input = std::fs::read_to_string(&args.input)?;
    let sites = SiteSet::new(parse_sites(&input)?)?;
    let kind = if args.list {
        BeachLineKind::List
    } else {
        BeachLineKind::Tree
    };
    let diagram = VoronoiDiagram::build(&sites, &Options::default().with_beach_line(kind));
    let dcel = diagram.dcel();

    let bbox = diagram.bounding_box();
    let stroke_width = bbox.width().max(bbox.height()) / 512.0;
    let dot_radius = stroke_width * 2.0;
    let mut document = svg::Document::new().set(
        "viewBox",
        (bbox.min.x, -bbox.max.y, bbox.width(), bbox.height()),
    );

    for e in dcel.half_edge_indices().step_by(2) {
        let (Some(a), Some(b)) = (dcel.origin_point(e), dcel.destination_point(e)) else {
            continue;
        };
        let path = Path::new()
            .set("stroke", "black")
            .set("stroke-width", stroke_width)
            .set("d", segment(a, b));
        document = document.add(path);
    }

    if !args.no_delaunay {
        match diagram.delaunay() {
            Ok(tri) => {
                for (s, t) in tri.edges() {
                    let path = Path::new()
                        .set("stroke", "blue")
                        .set("stroke-width", stroke_width / 2.0)
                        .set("stroke-opacity", "0.5")
                        .set("d", segment(sites[s], sites[t]));
                    document = document.add(path);
                }
            }
            Err(e) => eprintln!("no triangulation: {e}"),
        }
    }

    for v in dcel.vertex_indices().filter(|&v| dcel[v].circle_vertex) {
        let p = dcel[v].point;
        let circle = Circle::new()
            .set("cx", p.x)
            .set("cy", -p.y)
            .set("r", dot_radius / 2.0)
            .set("fill", "red");
        document = document.add(circle);
    }
    for (_, p) in sites.iter() {
        let circle = Circle::new()
            .set("cx", p.x)
            .set("cy", -p.y)
            .set("r", dot_radius)
            .set("fill", "black");
        document = document.add(circle);
    }

    svg::save(&args.output, &document)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse() {
        let points = parse_sites("(0, 0) (2.5, -1)\n\n  (1,2)\n").unwrap();
        assert_eq!(
            points,
            [
                Point::new(0.0, 0.0),
                Point::new(2.5, -1.0),
                Point::new(1.0, 2.0)
            ]
        );
        assert!(parse_sites("(0, 0) 1, 2").is_err());
        assert!(parse_sites("(0 0)").is_err());
    }
}
