//! Wavefront OBJ mesh of buildings and roads.
//!
//! Every solid is a prism over a four-corner base. Faces are triangles with
//! 1-based vertex indices, as the format requires.

use std::io::{self, Write};

use crate::{
    city::{Building, City, FacilityType, RoadSegment, ZoneType},
    geometry::{sub_quad, Point},
};

pub const ROAD_THICKNESS: f64 = 0.05;
pub const GREEN_PAD_HEIGHT: f64 = 0.05;
const MIN_ROAD_LENGTH: f64 = 1e-6;

/// Triangle faces of a prism whose eight vertices start at `v`.
const PRISM_FACES: [[usize; 3]; 12] = [
    [0, 1, 2],
    [0, 2, 3],
    [4, 7, 6],
    [4, 6, 5],
    [0, 4, 5],
    [0, 5, 1],
    [1, 5, 6],
    [1, 6, 2],
    [2, 6, 7],
    [2, 7, 3],
    [3, 7, 4],
    [3, 4, 0],
];

#[derive(Debug, Default, Clone)]
pub struct Mesh {
    vertices: Vec<[f64; 3]>,
    faces: Vec<[usize; 3]>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertices(&self) -> &[[f64; 3]] {
        &self.vertices
    }

    /// 1-based vertex indices.
    pub fn faces(&self) -> &[[usize; 3]] {
        &self.faces
    }

    pub fn push_prism(&mut self, base: &[Point; 4], bottom: f64, top: f64) {
        let first = self.vertices.len() + 1;
        for z in [bottom, top] {
            for corner in base {
                self.vertices.push([corner.x, corner.y, z]);
            }
        }
        for face in PRISM_FACES {
            self.faces
                .push([first + face[0], first + face[1], first + face[2]]);
        }
    }

    /// Flat slab along the road centreline. Returns `false` for zero-length
    /// segments, which are skipped.
    pub fn push_road(&mut self, road: &RoadSegment) -> bool {
        let dx = road.end.x - road.start.x;
        let dy = road.end.y - road.start.y;
        let length = dx.hypot(dy);
        if length < MIN_ROAD_LENGTH {
            return false;
        }
        let half_width = road.width() * 0.5;
        let hx = -dy / length * half_width;
        let hy = dx / length * half_width;
        let base = [
            Point::new(road.start.x + hx, road.start.y + hy),
            Point::new(road.start.x - hx, road.start.y - hy),
            Point::new(road.end.x - hx, road.end.y - hy),
            Point::new(road.end.x + hx, road.end.y + hy),
        ];
        self.push_prism(&base, 0.0, ROAD_THICKNESS);
        true
    }

    pub fn push_building(&mut self, building: &Building) {
        let corners = building.footprint.corners();
        let height = f64::from(building.height).max(1.0);
        match (building.zone, building.facility) {
            (ZoneType::None, _) => {}
            (_, Some(FacilityType::Hospital)) => self.push_hospital(&corners, height),
            (_, Some(FacilityType::School)) => self.push_school(&corners, height),
            (ZoneType::Green, None) => self.push_prism(&corners, 0.0, GREEN_PAD_HEIGHT),
            (ZoneType::Residential | ZoneType::Commercial | ZoneType::Industrial, None) => {
                self.push_prism(&corners, 0.0, height)
            }
        }
    }

    /// Podium over the whole lot, a main block and a lower side wing.
    fn push_hospital(&mut self, corners: &[Point; 4], height: f64) {
        let podium = (height * 0.25).clamp(1.0, height);
        self.push_prism(corners, 0.0, podium);
        let main = sub_quad(corners, 0.1, 0.15, 0.6, 0.85);
        self.push_prism(&main, podium, height.max(podium + 1.0));
        let wing = sub_quad(corners, 0.6, 0.3, 0.9, 0.7);
        let wing_top = podium + (height - podium).max(1.0) * 0.5;
        self.push_prism(&wing, podium, wing_top);
    }

    /// Sports field pad with the classroom block offset to one side.
    fn push_school(&mut self, corners: &[Point; 4], height: f64) {
        self.push_prism(corners, 0.0, GREEN_PAD_HEIGHT);
        let block = sub_quad(corners, 0.0, 0.1, 0.55, 0.9);
        self.push_prism(&block, 0.0, height);
    }

    pub fn write_to<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "# citygen mesh")?;
        for [x, y, z] in &self.vertices {
            writeln!(out, "v {x:.4} {y:.4} {z:.4}")?;
        }
        for [a, b, c] in &self.faces {
            writeln!(out, "f {a} {b} {c}")?;
        }
        out.flush()
    }
}

/// Mesh of every developed building followed by every road.
pub fn city_mesh(city: &City) -> Mesh {
    let mut mesh = Mesh::new();
    for building in city.buildings() {
        mesh.push_building(building);
    }
    for road in city.roads() {
        mesh.push_road(road);
    }
    mesh
}
