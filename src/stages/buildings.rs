use rand::Rng;
use rand_distr::{Exp1, StandardNormal};
use tracing::debug;

use crate::{
    city::{Building, ZoneType},
    pipeline::{Stage, StageContext, Workspace},
    rng::CityRng,
};

fn log_normal(rng: &mut CityRng, median: f64, sigma: f64) -> f64 {
    let z: f64 = rng.sample(StandardNormal);
    (median.ln() + sigma * z).exp()
}

fn storeys(raw: f64, min: f64, max: f64) -> u32 {
    raw.round().clamp(min, max) as u32
}

/// Samples a storey count for a parcel.
///
/// `footprint_area` is in grid units squared and `radial` is the centre bias
/// in `[0, 1]`, 1 at the city centre. Green and undeveloped parcels are flat.
pub fn sample_height(zone: ZoneType, footprint_area: f64, radial: f64, rng: &mut CityRng) -> u32 {
    let area = footprint_area.max(0.0);
    match zone {
        ZoneType::Residential => {
            let base = log_normal(rng, 3.0, 0.35);
            let raw = base * (0.6 + 0.7 * radial) + (0.25 * area).min(1.5);
            storeys(raw, 2.0, 12.0)
        }
        ZoneType::Commercial => {
            let base = log_normal(rng, 8.0, 0.5);
            let raw = base * (0.8 + 1.2 * radial) + (0.5 * area).min(3.0);
            storeys(raw, 4.0, 40.0)
        }
        ZoneType::Industrial => {
            let tail: f64 = rng.sample(Exp1);
            let base = 2.0 + 5.0 * tail;
            let raw = base * (0.7 + 0.6 * radial) + (0.15 * area).min(1.0);
            storeys(raw, 2.0, 14.0)
        }
        ZoneType::Green | ZoneType::None => 0,
    }
}

/// Turns parcels into buildings using the zone under each footprint centre.
pub struct BuildingPlacer;

impl BuildingPlacer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BuildingPlacer {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for BuildingPlacer {
    fn name(&self) -> &str {
        "buildings"
    }

    fn run(&mut self, ctx: &StageContext, work: &mut Workspace, rng: &mut CityRng) {
        let mut discarded = 0usize;
        for parcel in &work.parcels {
            let centre = parcel.footprint.centre();
            let zone = work.city.zone_near(centre);
            if zone == ZoneType::None {
                discarded += 1;
                continue;
            }
            let radial = if ctx.radius > 0.0 {
                1.0 - (centre.distance(ctx.centre) / ctx.radius).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let height = sample_height(zone, parcel.footprint.area(), radial, rng);
            work.city.buildings.push(Building {
                footprint: parcel.footprint,
                zone,
                height,
                facility: None,
                block: parcel.block,
            });
        }
        debug!(
            buildings = work.city.buildings.len(),
            discarded, "buildings placed"
        );
    }
}
