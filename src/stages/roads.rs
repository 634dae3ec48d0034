//! Road network and block layout.
//!
//! Two strategies share one stage: an orthogonal grid of classified axis
//! lines, and a radial plan of concentric rings cut by arterial spokes. Both
//! inset their blocks by half the width of every adjoining road so that blocks
//! never overlap a carriageway.

use std::f64::consts::TAU;

use tracing::debug;

use crate::{
    city::{Block, City, RoadSegment, RoadType, Wedge},
    config::LayoutMode,
    geometry::{Point, Rect},
    pipeline::{Stage, StageContext, Workspace},
    rng::CityRng,
};

/// Grid line positions as fractions of the developed radius.
const GRID_LINE_OFFSETS: [f64; 7] = [-1.0, -0.9, -0.5, 0.0, 0.5, 0.9, 1.0];
const MIN_BLOCK_SIDE: f64 = 1.0;
const GRID_BLOCK_REACH: f64 = 1.05;
const RADIAL_BLOCK_REACH: f64 = 1.1;
const MIN_RING_SEGMENTS: usize = 32;
/// Target chord length of ring polylines in grid units.
const RING_SEGMENT_LENGTH: f64 = 1.0;

pub fn classify_grid_line(normalized: f64) -> RoadType {
    if normalized < 0.15 {
        RoadType::Arterial
    } else if normalized < 0.6 {
        RoadType::Secondary
    } else {
        RoadType::Local
    }
}

pub fn classify_ring(normalized: f64) -> RoadType {
    if normalized < 0.3 {
        RoadType::Arterial
    } else if normalized < 0.75 {
        RoadType::Secondary
    } else {
        RoadType::Local
    }
}

/// `(rings, spokes)` for a radial plan.
pub fn radial_counts(population: u64, city_radius: f64) -> (usize, usize) {
    let rings = (3.0 + population as f64 / 200_000.0).round().clamp(3.0, 8.0) as usize;
    let spokes = (10.0 + city_radius * 8.0).round().clamp(8.0, 20.0) as usize;
    (rings, spokes)
}

pub struct RoadNetworkBuilder;

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RoadNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for RoadNetworkBuilder {
    fn name(&self) -> &str {
        "roads"
    }

    fn run(&mut self, ctx: &StageContext, work: &mut Workspace, _rng: &mut CityRng) {
        match ctx.settings.layout {
            LayoutMode::Grid => build_grid(ctx.centre, ctx.radius, &mut work.city),
            LayoutMode::Radial => {
                let (rings, spokes) =
                    radial_counts(ctx.settings.population, ctx.settings.city_radius);
                build_radial(ctx.centre, ctx.radius, rings, spokes, &mut work.city);
            }
        }
        debug!(
            roads = work.city.roads.len(),
            blocks = work.city.blocks.len(),
            "road network built"
        );
    }
}

/// Sorted, deduplicated axis lines with their hierarchy class.
fn grid_lines(centre: f64, radius: f64) -> Vec<(f64, RoadType)> {
    let mut positions: Vec<f64> = GRID_LINE_OFFSETS
        .iter()
        .map(|offset| centre + offset * radius)
        .collect();
    positions.sort_by(f64::total_cmp);
    positions.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
    positions
        .into_iter()
        .map(|pos| {
            let normalized = if radius > 0.0 {
                (pos - centre).abs() / radius
            } else {
                0.0
            };
            (pos, classify_grid_line(normalized))
        })
        .collect()
}

fn build_grid(centre: Point, radius: f64, city: &mut City) {
    let xs = grid_lines(centre.x, radius);
    let ys = grid_lines(centre.y, radius);
    let (Some(&(x_first, _)), Some(&(x_last, _))) = (xs.first(), xs.last()) else {
        return;
    };
    let (Some(&(y_first, _)), Some(&(y_last, _))) = (ys.first(), ys.last()) else {
        return;
    };

    for &(x, kind) in &xs {
        city.roads.push(RoadSegment::new(
            Point::new(x, y_first),
            Point::new(x, y_last),
            kind,
        ));
    }
    for &(y, kind) in &ys {
        city.roads.push(RoadSegment::new(
            Point::new(x_first, y),
            Point::new(x_last, y),
            kind,
        ));
    }

    for xw in xs.windows(2) {
        for yw in ys.windows(2) {
            let x0 = xw[0].0 + xw[0].1.half_width();
            let x1 = xw[1].0 - xw[1].1.half_width();
            let y0 = yw[0].0 + yw[0].1.half_width();
            let y1 = yw[1].0 - yw[1].1.half_width();
            if x1 - x0 < MIN_BLOCK_SIDE || y1 - y0 < MIN_BLOCK_SIDE {
                continue;
            }
            let bounds = Rect::new(x0, y0, x1, y1);
            if bounds.centre().distance(centre) > radius * GRID_BLOCK_REACH {
                continue;
            }
            city.blocks.push(Block::rect(bounds));
        }
    }
}

fn push_ring(city: &mut City, centre: Point, radius: f64, kind: RoadType) {
    let by_length = (TAU * radius / RING_SEGMENT_LENGTH).ceil() as usize;
    let segments = by_length.max(MIN_RING_SEGMENTS);
    for i in 0..segments {
        let a0 = TAU * i as f64 / segments as f64;
        let a1 = TAU * (i + 1) as f64 / segments as f64;
        city.roads.push(RoadSegment::new(
            Point::from_polar(centre, radius, a0),
            Point::from_polar(centre, radius, a1),
            kind,
        ));
    }
}

/// Smallest wedge inner radius at which the angular inset
/// `asin(half_width / r)` is at most half of `half_span`.
fn spoke_clearance(spoke_half_width: f64, half_span: f64, radius: f64) -> f64 {
    let min_inset = (half_span * 0.5).sin();
    if min_inset > 0.0 {
        spoke_half_width / min_inset
    } else {
        radius
    }
}

fn build_radial(centre: Point, radius: f64, rings: usize, spokes: usize, city: &mut City) {
    if radius <= 0.0 || rings == 0 || spokes == 0 {
        return;
    }
    let edges: Vec<(f64, RoadType)> = (0..=rings)
        .map(|k| {
            let r = radius * k as f64 / rings as f64;
            (r, classify_ring(r / radius))
        })
        .collect();

    for &(r, kind) in &edges[1..] {
        push_ring(city, centre, r, kind);
    }

    let spoke_angle = |k: usize| TAU * k as f64 / spokes as f64;
    for k in 0..spokes {
        city.roads.push(RoadSegment::new(
            centre,
            Point::from_polar(centre, radius, spoke_angle(k)),
            RoadType::Arterial,
        ));
    }

    let spoke_half_width = RoadType::Arterial.half_width();
    let half_span = std::f64::consts::PI / spokes as f64;
    let clearance = spoke_clearance(spoke_half_width, half_span, radius);

    for ring in edges.windows(2) {
        let (r0, kind0) = ring[0];
        let (r1, kind1) = ring[1];
        let inner_road = if r0 > 0.0 { kind0.half_width() } else { 0.0 };
        let inner = (r0 + inner_road).max(clearance);
        let outer = r1 - kind1.half_width();
        if outer <= inner {
            continue;
        }
        let inset = (spoke_half_width / inner).min(1.0).asin();
        for k in 0..spokes {
            let start_angle = spoke_angle(k) + inset;
            let end_angle = spoke_angle(k + 1) - inset;
            if end_angle <= start_angle {
                continue;
            }
            let wedge = Wedge {
                centre,
                inner_radius: inner,
                outer_radius: outer,
                start_angle,
                end_angle,
            };
            if wedge.centroid().distance(centre) > radius * RADIAL_BLOCK_REACH {
                continue;
            }
            city.blocks.push(Block::wedge(wedge));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::BlockShape;

    #[test]
    fn test_grid_line_classes() {
        let lines = grid_lines(25.0, 15.0);
        assert_eq!(lines.len(), 7);
        let kinds: Vec<_> = lines.iter().map(|(_, k)| *k).collect();
        assert_eq!(
            kinds,
            vec![
                RoadType::Local,
                RoadType::Local,
                RoadType::Secondary,
                RoadType::Arterial,
                RoadType::Secondary,
                RoadType::Local,
                RoadType::Local,
            ]
        );
        assert!(lines.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_grid_lines_deduplicate_at_zero_radius() {
        let lines = grid_lines(5.0, 0.0);
        assert_eq!(lines, vec![(5.0, RoadType::Arterial)]);
    }

    #[test]
    fn test_grid_blocks_clear_of_roads() {
        let mut city = City::new(50);
        build_grid(Point::new(25.0, 25.0), 15.0, &mut city);
        assert_eq!(city.roads.len(), 14);
        assert!(!city.blocks.is_empty());
        for block in &city.blocks {
            assert!(block.bounds.width() >= MIN_BLOCK_SIDE);
            assert!(block.bounds.height() >= MIN_BLOCK_SIDE);
            assert!(block.bounds.centre().distance(Point::new(25.0, 25.0)) <= 15.0 * 1.05);
            let interior = block.bounds.expand(-1e-6);
            for road in &city.roads {
                assert!(
                    !interior.overlaps(&road.corridor()),
                    "block {:?} overlaps road {:?}",
                    block.bounds,
                    road
                );
            }
        }
    }

    #[test]
    fn test_radial_counts() {
        assert_eq!(radial_counts(0, 0.1), (3, 11));
        assert_eq!(radial_counts(500_000, 0.8), (6, 16));
        assert_eq!(radial_counts(10_000_000, 1.0), (8, 18));
    }

    #[test]
    fn test_innermost_ring_keeps_open_wedges() {
        for spokes in [8, 11, 16, 20] {
            let half_span = std::f64::consts::PI / spokes as f64;
            let clearance = spoke_clearance(RoadType::Arterial.half_width(), half_span, 30.0);
            let inset = (RoadType::Arterial.half_width() / clearance).asin();
            assert!(2.0 * half_span - 2.0 * inset >= half_span - 1e-12);

            let mut city = City::new(64);
            build_radial(Point::new(32.0, 32.0), 30.0, 3, spokes, &mut city);
            let first_ring = city
                .blocks
                .iter()
                .filter(|b| matches!(b.shape, BlockShape::Wedge(w) if w.outer_radius < 10.0))
                .count();
            assert_eq!(first_ring, spokes, "spokes {spokes}");
        }
    }

    #[test]
    fn test_ring_classes() {
        assert_eq!(classify_ring(0.25), RoadType::Arterial);
        assert_eq!(classify_ring(0.5), RoadType::Secondary);
        assert_eq!(classify_ring(1.0), RoadType::Local);
    }

    #[test]
    fn test_radial_network() {
        let centre = Point::new(50.0, 50.0);
        let mut city = City::new(100);
        build_radial(centre, 40.0, 4, 12, &mut city);

        let spokes: Vec<_> = city
            .roads
            .iter()
            .filter(|r| r.start == centre)
            .collect();
        assert_eq!(spokes.len(), 12);
        assert!(spokes.iter().all(|r| r.kind == RoadType::Arterial));
        assert!(spokes
            .iter()
            .all(|r| (r.length() - 40.0).abs() < 1e-9));

        let ring_segments = city.roads.len() - spokes.len();
        assert!(ring_segments >= 4 * MIN_RING_SEGMENTS);

        assert_eq!(city.blocks.len(), 4 * 12);
        let innermost = city
            .blocks
            .iter()
            .filter(|b| matches!(b.shape, BlockShape::Wedge(w) if w.outer_radius <= 10.0))
            .count();
        assert_eq!(innermost, 12);
        for block in &city.blocks {
            let BlockShape::Wedge(wedge) = block.shape else {
                panic!("radial blocks must be wedges");
            };
            assert!(wedge.outer_radius <= 40.0);
            assert!(wedge.inner_radius < wedge.outer_radius);
            assert!(wedge.span() > 0.0);
            assert!(block.corners.is_some());
        }
    }
}
