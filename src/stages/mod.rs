mod buildings;
mod facilities;
mod green_space;
mod parcels;
mod roads;
mod zoning;

pub use buildings::{sample_height, BuildingPlacer};
pub use facilities::{
    facility_height, placement_order, road_distance, FacilityPlacer, ACCESSIBLE_ROAD_DISTANCE,
};
pub use green_space::{target_green_cells, GreenSpaceBalancer, CELL_AREA_M2};
pub use parcels::{
    jitter_footprint, parcelize_rect_block, parcelize_wedge, subdivide_rect, BlockParcelizer,
    Parcel, MAX_PARCEL_SIZE, MIN_PARCEL_SIZE,
};
pub use roads::{classify_grid_line, classify_ring, radial_counts, RoadNetworkBuilder};
pub use zoning::{classify_noise, ZoneAssigner};
