//! Block parcelization.
//!
//! Grid blocks lose a randomly sized central courtyard and have their border
//! strips split by recursive bisection. Radial wedges are unwrapped into a flat
//! `(arc length, radial depth)` rectangle, split the same way and mapped back
//! through polar coordinates. Every final parcel is shrunk and nudged by
//! [`jitter_footprint`].

use tracing::debug;

use crate::{
    city::{BlockShape, Wedge},
    geometry::{Footprint, Point, Rect},
    pipeline::{Stage, StageContext, Workspace},
    rng::{CityRng, RngExt},
};

pub const MIN_PARCEL_SIZE: f64 = 0.75;
pub const MAX_PARCEL_SIZE: f64 = 2.5;
/// Bisection depth limit; a region yields at most `2^6` parcels.
const MAX_SUBDIVISION_DEPTH: u32 = 6;
const COURTYARD_FRACTION_MIN: f64 = 0.15;
const COURTYARD_FRACTION_MAX: f64 = 0.30;
const FOOTPRINT_AREA_SCALE_MIN: f64 = 0.4;
const FOOTPRINT_AREA_SCALE_MAX: f64 = 0.9;
/// Share of the free margin a shrunk footprint may drift from the parcel centre.
const FOOTPRINT_OFFSET_SHARE: f64 = 0.6;
const MIN_WEDGE_THICKNESS: f64 = 0.1;
const MIN_WEDGE_SPAN: f64 = 1e-4;
const MIN_WEDGE_RADIUS: f64 = 1e-6;

/// A building lot awaiting zone and height assignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parcel {
    pub footprint: Footprint,
    /// Index of the originating block.
    pub block: usize,
}

pub struct BlockParcelizer;

impl BlockParcelizer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BlockParcelizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for BlockParcelizer {
    fn name(&self) -> &str {
        "parcels"
    }

    fn run(&mut self, _ctx: &StageContext, work: &mut Workspace, rng: &mut CityRng) {
        for (idx, block) in work.city.blocks.iter().enumerate() {
            match block.shape {
                BlockShape::Rect => {
                    for rect in parcelize_rect_block(block.bounds, rng) {
                        work.parcels.push(Parcel {
                            footprint: Footprint::Rect(rect),
                            block: idx,
                        });
                    }
                }
                BlockShape::Wedge(wedge) => {
                    for quad in parcelize_wedge(&wedge, rng) {
                        work.parcels.push(Parcel {
                            footprint: Footprint::Quad(quad),
                            block: idx,
                        });
                    }
                }
            }
        }
        debug!(parcels = work.parcels.len(), "blocks parcelized");
    }
}

/// Recursively bisects `rect` along its longer side until both sides fit in
/// `max_size`. Cuts keep at least `min_size` on either side; a region with no
/// room for such a cut is kept whole.
pub fn subdivide_rect(
    rect: Rect,
    min_size: f64,
    max_size: f64,
    rng: &mut CityRng,
    out: &mut Vec<Rect>,
) {
    subdivide_at(rect, min_size, max_size, 0, rng, out);
}

fn subdivide_at(
    rect: Rect,
    min_size: f64,
    max_size: f64,
    depth: u32,
    rng: &mut CityRng,
    out: &mut Vec<Rect>,
) {
    let width = rect.width();
    let height = rect.height();
    if (width <= max_size && height <= max_size) || depth >= MAX_SUBDIVISION_DEPTH {
        out.push(rect);
        return;
    }

    let split_x = width > height;
    let (lo, hi) = if split_x {
        (rect.x0 + min_size, rect.x1 - min_size)
    } else {
        (rect.y0 + min_size, rect.y1 - min_size)
    };
    if hi <= lo {
        out.push(rect);
        return;
    }

    let cut = rng.uniform(lo, hi);
    let (a, b) = if split_x {
        (
            Rect::new(rect.x0, rect.y0, cut, rect.y1),
            Rect::new(cut, rect.y0, rect.x1, rect.y1),
        )
    } else {
        (
            Rect::new(rect.x0, rect.y0, rect.x1, cut),
            Rect::new(rect.x0, cut, rect.x1, rect.y1),
        )
    };
    subdivide_at(a, min_size, max_size, depth + 1, rng, out);
    subdivide_at(b, min_size, max_size, depth + 1, rng, out);
}

/// Shrinks `parcel` to a random share of its area and offsets it inside the
/// freed margin. The result never leaves `parcel`.
pub fn jitter_footprint(parcel: Rect, rng: &mut CityRng) -> Rect {
    let area_scale = rng.uniform(FOOTPRINT_AREA_SCALE_MIN, FOOTPRINT_AREA_SCALE_MAX);
    let linear = area_scale.sqrt();
    let width = parcel.width() * linear;
    let height = parcel.height() * linear;

    let margin_x = (parcel.width() - width) * 0.5;
    let margin_y = (parcel.height() - height) * 0.5;
    let centre = parcel.centre();
    let offset_x = rng.uniform(-FOOTPRINT_OFFSET_SHARE, FOOTPRINT_OFFSET_SHARE) * margin_x;
    let offset_y = rng.uniform(-FOOTPRINT_OFFSET_SHARE, FOOTPRINT_OFFSET_SHARE) * margin_y;

    let cx = (centre.x + offset_x).clamp(parcel.x0 + width * 0.5, parcel.x1 - width * 0.5);
    let cy = (centre.y + offset_y).clamp(parcel.y0 + height * 0.5, parcel.y1 - height * 0.5);
    Rect::from_centre(Point::new(cx, cy), width, height)
}

/// Parcels of an axis-aligned block, courtyard carved when it fits.
pub fn parcelize_rect_block(bounds: Rect, rng: &mut CityRng) -> Vec<Rect> {
    let width = bounds.width();
    let height = bounds.height();
    let mut lots = Vec::new();

    let margin =
        width.min(height) * rng.uniform(COURTYARD_FRACTION_MIN, COURTYARD_FRACTION_MAX);
    if margin * 2.0 < width && margin * 2.0 < height {
        let inner = Rect::new(
            bounds.x0 + margin,
            bounds.y0 + margin,
            bounds.x1 - margin,
            bounds.y1 - margin,
        );
        let strips = [
            Rect::new(bounds.x0, bounds.y0, bounds.x1, inner.y0),
            Rect::new(bounds.x0, inner.y1, bounds.x1, bounds.y1),
            Rect::new(bounds.x0, inner.y0, inner.x0, inner.y1),
            Rect::new(inner.x1, inner.y0, bounds.x1, inner.y1),
        ];
        for strip in strips {
            if strip.width() >= MIN_PARCEL_SIZE && strip.height() >= MIN_PARCEL_SIZE {
                subdivide_rect(strip, MIN_PARCEL_SIZE, MAX_PARCEL_SIZE, rng, &mut lots);
            }
        }
    } else {
        subdivide_rect(bounds, MIN_PARCEL_SIZE, MAX_PARCEL_SIZE, rng, &mut lots);
    }

    let mut parcels = Vec::with_capacity(lots.len());
    for lot in lots {
        if lot.is_degenerate() {
            continue;
        }
        parcels.push(jitter_footprint(lot, rng));
    }
    parcels
}

/// Parcels of a ring wedge as counter-clockwise world-space quads.
pub fn parcelize_wedge(wedge: &Wedge, rng: &mut CityRng) -> Vec<[Point; 4]> {
    let thickness = wedge.thickness();
    let span = wedge.span();
    let mid_radius = wedge.mid_radius();
    if thickness <= MIN_WEDGE_THICKNESS || span <= MIN_WEDGE_SPAN || mid_radius <= MIN_WEDGE_RADIUS
    {
        return Vec::new();
    }

    let arc_length = mid_radius * span;
    let unwrapped = Rect::new(0.0, 0.0, arc_length, thickness);
    let mut lots = Vec::new();
    subdivide_rect(unwrapped, MIN_PARCEL_SIZE, MAX_PARCEL_SIZE, rng, &mut lots);

    let mut quads = Vec::with_capacity(lots.len());
    for lot in lots {
        if lot.is_degenerate() {
            continue;
        }
        let footprint = jitter_footprint(lot, rng);
        quads.push(unwrapped_to_world(wedge, arc_length, &footprint));
    }
    quads
}

fn wedge_point(wedge: &Wedge, arc_length: f64, u: f64, v: f64) -> Point {
    let angle = wedge.start_angle + (u / arc_length) * wedge.span();
    let radius = wedge.inner_radius + v;
    Point::from_polar(wedge.centre, radius, angle)
}

fn unwrapped_to_world(wedge: &Wedge, arc_length: f64, rect: &Rect) -> [Point; 4] {
    [
        wedge_point(wedge, arc_length, rect.x0, rect.y0),
        wedge_point(wedge, arc_length, rect.x0, rect.y1),
        wedge_point(wedge, arc_length, rect.x1, rect.y1),
        wedge_point(wedge, arc_length, rect.x1, rect.y0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::signed_area;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_subdivision_respects_sizes() {
        let mut rng = CityRng::new(11);
        let rect = Rect::new(0.0, 0.0, 20.0, 7.0);
        let mut out = Vec::new();
        subdivide_rect(rect, 1.0, 3.0, &mut rng, &mut out);

        assert!(out.len() > 1);
        let total: f64 = out.iter().map(Rect::area).sum();
        assert!((total - rect.area()).abs() < 1e-6);
        for lot in &out {
            assert!(lot.width() >= 1.0 - EPS && lot.height() >= 1.0 - EPS);
            assert!(rect.contains_rect(lot, EPS));
        }
    }

    #[test]
    fn test_subdivision_depth_cap() {
        let mut rng = CityRng::new(3);
        let mut out = Vec::new();
        subdivide_rect(
            Rect::new(0.0, 0.0, 1_000.0, 1_000.0),
            0.1,
            0.5,
            &mut rng,
            &mut out,
        );
        assert_eq!(out.len(), 64);
    }

    #[test]
    fn test_subdivision_without_valid_cut_keeps_region() {
        let mut rng = CityRng::new(3);
        let mut out = Vec::new();
        let rect = Rect::new(0.0, 0.0, 1.2, 1.0);
        subdivide_rect(rect, 0.75, 1.0, &mut rng, &mut out);
        assert_eq!(out, vec![rect]);
    }

    #[test]
    fn test_jitter_stays_inside_parcel() {
        let mut rng = CityRng::new(21);
        let parcel = Rect::new(2.0, 3.0, 4.5, 4.0);
        for _ in 0..500 {
            let footprint = jitter_footprint(parcel, &mut rng);
            assert!(parcel.contains_rect(&footprint, EPS));
            let ratio = footprint.area() / parcel.area();
            assert!(ratio >= 0.4 - 1e-6 && ratio <= 0.9 + 1e-6, "ratio {ratio}");
        }
    }

    #[test]
    fn test_courtyard_stays_open() {
        let mut rng = CityRng::new(8);
        let block = Rect::new(0.0, 0.0, 10.0, 10.0);
        let parcels = parcelize_rect_block(block, &mut rng);
        assert!(!parcels.is_empty());
        // The margin never exceeds 30% of the short side, so this core is always courtyard.
        let core = Rect::new(3.0 + 1e-6, 3.0 + 1e-6, 7.0 - 1e-6, 7.0 - 1e-6);
        for parcel in &parcels {
            assert!(block.contains_rect(parcel, EPS));
            assert!(!parcel.overlaps(&core), "parcel {parcel:?} inside courtyard");
        }
    }

    #[test]
    fn test_degenerate_wedges_yield_nothing() {
        let mut rng = CityRng::new(1);
        let base = Wedge {
            centre: Point::new(0.0, 0.0),
            inner_radius: 5.0,
            outer_radius: 9.0,
            start_angle: 0.0,
            end_angle: 0.5,
        };
        let thin = Wedge {
            outer_radius: 5.05,
            ..base
        };
        let narrow = Wedge {
            end_angle: 5e-5,
            ..base
        };
        let collapsed = Wedge {
            inner_radius: 0.0,
            outer_radius: 0.0,
            ..base
        };
        assert!(parcelize_wedge(&thin, &mut rng).is_empty());
        assert!(parcelize_wedge(&narrow, &mut rng).is_empty());
        assert!(parcelize_wedge(&collapsed, &mut rng).is_empty());
        assert!(!parcelize_wedge(&base, &mut rng).is_empty());
    }

    #[test]
    fn test_wedge_parcels_stay_in_wedge() {
        let mut rng = CityRng::new(17);
        let wedge = Wedge {
            centre: Point::new(30.0, 30.0),
            inner_radius: 6.0,
            outer_radius: 11.0,
            start_angle: 1.0,
            end_angle: 1.6,
        };
        let quads = parcelize_wedge(&wedge, &mut rng);
        assert!(quads.len() > 1);
        for quad in &quads {
            assert!(signed_area(quad) > 0.0, "quad must wind counter-clockwise");
            for corner in quad {
                let dx = corner.x - wedge.centre.x;
                let dy = corner.y - wedge.centre.y;
                let r = dx.hypot(dy);
                let angle = dy.atan2(dx);
                assert!(r >= wedge.inner_radius - EPS && r <= wedge.outer_radius + EPS);
                assert!(angle >= wedge.start_angle - EPS && angle <= wedge.end_angle + EPS);
            }
        }
    }
}
