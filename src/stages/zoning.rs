use crate::{
    city::ZoneType,
    noise,
    pipeline::{Stage, StageContext, Workspace},
    rng::CityRng,
};

const RESIDENTIAL_BELOW: f64 = 0.55;
const COMMERCIAL_BELOW: f64 = 0.75;
const INDUSTRIAL_BELOW: f64 = 0.90;

/// Maps a fractal noise value onto a developed zone.
pub fn classify_noise(value: f64) -> ZoneType {
    if value < RESIDENTIAL_BELOW {
        ZoneType::Residential
    } else if value < COMMERCIAL_BELOW {
        ZoneType::Commercial
    } else if value < INDUSTRIAL_BELOW {
        ZoneType::Industrial
    } else {
        ZoneType::Green
    }
}

pub struct ZoneAssigner;

impl ZoneAssigner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ZoneAssigner {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for ZoneAssigner {
    fn name(&self) -> &str {
        "zoning"
    }

    fn run(&mut self, ctx: &StageContext, work: &mut Workspace, _rng: &mut CityRng) {
        let size = work.city.size();
        let seed = ctx.settings.seed;
        for y in 0..size {
            for x in 0..size {
                let dx = x as f64 + 0.5 - ctx.centre.x;
                let dy = y as f64 + 0.5 - ctx.centre.y;
                let zone = if dx.hypot(dy) > ctx.radius {
                    ZoneType::None
                } else {
                    classify_noise(noise::fractal(x as i32, y as i32, seed))
                };
                work.city.set_zone(x, y, zone);
            }
        }
    }
}
