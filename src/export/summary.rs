use serde::{Deserialize, Serialize};

use crate::city::{City, FacilityType, ZoneType};

/// Aggregate counts written next to the mesh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitySummary {
    pub grid_size: usize,
    /// Buildings that are neither green nor undeveloped.
    pub total_buildings: usize,
    pub residential_cells: usize,
    pub commercial_cells: usize,
    pub industrial_cells: usize,
    pub green_cells: usize,
    pub undeveloped_cells: usize,
    pub num_hospitals: usize,
    pub num_schools: usize,
    pub num_blocks: usize,
    pub num_roads: usize,
}

impl CitySummary {
    pub fn from_city(city: &City) -> Self {
        let mut summary = Self {
            grid_size: city.size(),
            total_buildings: city
                .buildings()
                .iter()
                .filter(|b| b.zone.is_built())
                .count(),
            residential_cells: 0,
            commercial_cells: 0,
            industrial_cells: 0,
            green_cells: 0,
            undeveloped_cells: 0,
            num_hospitals: city.facility_count(FacilityType::Hospital),
            num_schools: city.facility_count(FacilityType::School),
            num_blocks: city.blocks().len(),
            num_roads: city.roads().len(),
        };
        for zone in city.zones() {
            match zone {
                ZoneType::None => summary.undeveloped_cells += 1,
                ZoneType::Residential => summary.residential_cells += 1,
                ZoneType::Commercial => summary.commercial_cells += 1,
                ZoneType::Industrial => summary.industrial_cells += 1,
                ZoneType::Green => summary.green_cells += 1,
            }
        }
        summary
    }

    pub fn total_cells(&self) -> usize {
        self.undeveloped_cells
            + self.residential_cells
            + self.commercial_cells
            + self.industrial_cells
            + self.green_cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        city::{Building, Facility},
        geometry::{Footprint, Point, Rect},
    };

    fn building(zone: ZoneType) -> Building {
        Building {
            footprint: Footprint::Rect(Rect::new(0.0, 0.0, 1.0, 1.0)),
            zone,
            height: if zone.is_built() { 3 } else { 0 },
            facility: None,
            block: 0,
        }
    }

    #[test]
    fn test_counts() {
        let mut city = City::new(4);
        city.set_zone(0, 0, ZoneType::Residential);
        city.set_zone(1, 0, ZoneType::Residential);
        city.set_zone(2, 0, ZoneType::Commercial);
        city.set_zone(3, 0, ZoneType::Green);
        city.buildings = vec![
            building(ZoneType::Residential),
            building(ZoneType::Green),
            building(ZoneType::Industrial),
        ];
        city.facilities.push(Facility {
            position: Point::new(0.5, 0.5),
            kind: FacilityType::School,
            building: 0,
        });

        let summary = CitySummary::from_city(&city);
        assert_eq!(summary.grid_size, 4);
        assert_eq!(summary.total_buildings, 2);
        assert_eq!(summary.residential_cells, 2);
        assert_eq!(summary.commercial_cells, 1);
        assert_eq!(summary.green_cells, 1);
        assert_eq!(summary.undeveloped_cells, 12);
        assert_eq!(summary.total_cells(), 16);
        assert_eq!(summary.num_schools, 1);
        assert_eq!(summary.num_hospitals, 0);
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(CitySummary::from_city(&City::new(10))).unwrap();
        assert_eq!(json["gridSize"], 10);
        assert_eq!(json["undevelopedCells"], 100);
        assert!(json.get("numHospitals").is_some());
        assert!(json.get("totalBuildings").is_some());
    }
}
