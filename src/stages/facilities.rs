//! Greedy hospital and school placement.
//!
//! Candidate buildings are split into a near-road set and an interior set.
//! Each set is shuffled and then stably sorted by road distance, so ties keep
//! a seed-dependent order while closer buildings always come first.

use rand::seq::SliceRandom;
use tracing::debug;

use crate::{
    city::{Building, City, Facility, FacilityType, RoadSegment, ZoneType},
    geometry::Footprint,
    pipeline::{Stage, StageContext, Workspace},
    rng::CityRng,
};

/// Buildings at most this far from a road corridor count as road-accessible.
pub const ACCESSIBLE_ROAD_DISTANCE: f64 = 1.0;

/// Distance from the footprint's bounding box to the nearest road corridor.
/// Infinite when the city has no roads.
pub fn road_distance(footprint: &Footprint, roads: &[RoadSegment]) -> f64 {
    let bounds = footprint.bounds();
    roads
        .iter()
        .map(|road| bounds.gap(&road.corridor()))
        .fold(f64::INFINITY, f64::min)
}

pub fn facility_height(kind: FacilityType, footprint_area: f64) -> u32 {
    let root = footprint_area.max(0.0).sqrt();
    match kind {
        FacilityType::Hospital => (4.0 + 2.5 * root).round().clamp(5.0, 12.0) as u32,
        FacilityType::School => (1.5 + root).round().clamp(2.0, 5.0) as u32,
    }
}

/// Building indices in the order facilities should claim them.
///
/// Residential and commercial buildings are preferred. Without any, every
/// other building is ranked, with green lots behind all built ones.
pub fn placement_order(
    buildings: &[Building],
    roads: &[RoadSegment],
    rng: &mut CityRng,
) -> Vec<usize> {
    let preferred: Vec<usize> = buildings
        .iter()
        .enumerate()
        .filter(|(_, b)| {
            !b.is_facility() && matches!(b.zone, ZoneType::Residential | ZoneType::Commercial)
        })
        .map(|(idx, _)| idx)
        .collect();
    if !preferred.is_empty() {
        return rank_by_access(preferred, buildings, roads, rng);
    }

    let (green, built): (Vec<usize>, Vec<usize>) =
        (0..buildings.len()).partition(|&idx| buildings[idx].zone == ZoneType::Green);
    let mut order = rank_by_access(built, buildings, roads, rng);
    order.extend(rank_by_access(green, buildings, roads, rng));
    order
}

/// Near-road candidates first, each group shuffled then stably sorted by distance.
fn rank_by_access(
    candidates: Vec<usize>,
    buildings: &[Building],
    roads: &[RoadSegment],
    rng: &mut CityRng,
) -> Vec<usize> {
    let mut near = Vec::new();
    let mut interior = Vec::new();
    for idx in candidates {
        let distance = road_distance(&buildings[idx].footprint, roads);
        if distance <= ACCESSIBLE_ROAD_DISTANCE {
            near.push((idx, distance));
        } else {
            interior.push((idx, distance));
        }
    }

    for group in [&mut near, &mut interior] {
        group.shuffle(rng);
        group.sort_by(|a, b| a.1.total_cmp(&b.1));
    }

    near.into_iter()
        .chain(interior)
        .map(|(idx, _)| idx)
        .collect()
}

fn imprint(city: &mut City, idx: usize, kind: FacilityType) {
    let building = &mut city.buildings[idx];
    building.facility = Some(kind);
    building.height = facility_height(kind, building.footprint.area());
    let position = building.footprint.centre();
    city.facilities.push(Facility {
        position,
        kind,
        building: idx,
    });
}

fn place(city: &mut City, order: &[usize], kind: FacilityType, count: u32) -> u32 {
    let mut placed = 0;
    for &idx in order {
        if placed >= count {
            break;
        }
        if city.buildings[idx].is_facility() {
            continue;
        }
        imprint(city, idx, kind);
        placed += 1;
    }
    placed
}

pub struct FacilityPlacer;

impl FacilityPlacer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FacilityPlacer {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for FacilityPlacer {
    fn name(&self) -> &str {
        "facilities"
    }

    fn run(&mut self, ctx: &StageContext, work: &mut Workspace, rng: &mut CityRng) {
        let order = placement_order(&work.city.buildings, &work.city.roads, rng);
        let hospitals = place(
            &mut work.city,
            &order,
            FacilityType::Hospital,
            ctx.settings.hospitals,
        );
        let schools = place(
            &mut work.city,
            &order,
            FacilityType::School,
            ctx.settings.schools,
        );
        debug!(
            hospitals,
            requested_hospitals = ctx.settings.hospitals,
            schools,
            requested_schools = ctx.settings.schools,
            "facilities placed"
        );
    }
}
