use rand::seq::SliceRandom;
use tracing::debug;

use crate::{
    city::ZoneType,
    pipeline::{Stage, StageContext, Workspace},
    rng::CityRng,
};

/// Reference area of one grid cell (100 m x 100 m).
pub const CELL_AREA_M2: f64 = 10_000.0;

pub fn target_green_cells(population: u64, green_m2_per_capita: f64) -> usize {
    (population as f64 * green_m2_per_capita / CELL_AREA_M2).ceil() as usize
}

/// Converts residential and industrial cells to parks until the per-capita
/// green minimum is met or no candidates remain.
pub struct GreenSpaceBalancer;

impl GreenSpaceBalancer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GreenSpaceBalancer {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for GreenSpaceBalancer {
    fn name(&self) -> &str {
        "green_space"
    }

    fn run(&mut self, ctx: &StageContext, work: &mut Workspace, rng: &mut CityRng) {
        let target = target_green_cells(ctx.settings.population, ctx.settings.green_m2_per_capita);
        let current = work.city.count_zone(ZoneType::Green);
        if current >= target {
            return;
        }

        let mut candidates: Vec<usize> = work
            .city
            .zones
            .iter()
            .enumerate()
            .filter(|(_, zone)| matches!(zone, ZoneType::Residential | ZoneType::Industrial))
            .map(|(idx, _)| idx)
            .collect();
        candidates.shuffle(rng);

        let deficit = target - current;
        let converted = deficit.min(candidates.len());
        for &idx in &candidates[..converted] {
            work.city.zones[idx] = ZoneType::Green;
        }
        debug!(target, current, converted, "green space balanced");
    }
}
