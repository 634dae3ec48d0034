use serde::{Deserialize, Serialize};

use crate::geometry::{Footprint, Point, Rect};

/// Land-use class of a grid cell or parcel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneType {
    #[default]
    None,
    Residential,
    Commercial,
    Industrial,
    Green,
}

impl ZoneType {
    /// Zones that carry vertical mass.
    pub fn is_built(self) -> bool {
        match self {
            ZoneType::Residential | ZoneType::Commercial | ZoneType::Industrial => true,
            ZoneType::Green | ZoneType::None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacilityType {
    Hospital,
    School,
}

/// Road hierarchy class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadType {
    Arterial,
    Secondary,
    Local,
}

impl RoadType {
    /// Carriageway width in grid units.
    pub fn width(self) -> f64 {
        match self {
            RoadType::Arterial => 0.8,
            RoadType::Secondary => 0.5,
            RoadType::Local => 0.3,
        }
    }

    pub fn half_width(self) -> f64 {
        self.width() * 0.5
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoadSegment {
    pub start: Point,
    pub end: Point,
    pub kind: RoadType,
}

impl RoadSegment {
    pub fn new(start: Point, end: Point, kind: RoadType) -> Self {
        Self { start, end, kind }
    }

    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    pub fn width(&self) -> f64 {
        self.kind.width()
    }

    /// Bounding box of the centreline grown by half the carriageway width.
    pub fn corridor(&self) -> Rect {
        Rect::new(self.start.x, self.start.y, self.end.x, self.end.y).expand(self.kind.half_width())
    }
}

/// Annular sector between two ring radii and two spoke angles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wedge {
    pub centre: Point,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
}

impl Wedge {
    pub fn mid_radius(&self) -> f64 {
        (self.inner_radius + self.outer_radius) * 0.5
    }

    pub fn thickness(&self) -> f64 {
        self.outer_radius - self.inner_radius
    }

    pub fn span(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    pub fn centroid(&self) -> Point {
        let angle = (self.start_angle + self.end_angle) * 0.5;
        Point::from_polar(self.centre, self.mid_radius(), angle)
    }

    /// Counter-clockwise corners: inner-start, outer-start, outer-end, inner-end.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::from_polar(self.centre, self.inner_radius, self.start_angle),
            Point::from_polar(self.centre, self.outer_radius, self.start_angle),
            Point::from_polar(self.centre, self.outer_radius, self.end_angle),
            Point::from_polar(self.centre, self.inner_radius, self.end_angle),
        ]
    }

    /// Bounding box including the bulge of both arcs.
    pub fn bounds(&self) -> Rect {
        const ARC_SAMPLES: usize = 16;
        let mut points = Vec::with_capacity(2 * (ARC_SAMPLES + 1));
        for i in 0..=ARC_SAMPLES {
            let angle = self.start_angle + self.span() * i as f64 / ARC_SAMPLES as f64;
            points.push(Point::from_polar(self.centre, self.inner_radius, angle));
            points.push(Point::from_polar(self.centre, self.outer_radius, angle));
        }
        // The outermost point of an arc may fall between samples.
        let sagitta = self.outer_radius * (1.0 - (self.span() / (2.0 * ARC_SAMPLES as f64)).cos());
        Rect::bounding(&points)
            .map(|rect| rect.expand(sagitta))
            .unwrap_or_else(|| Rect::from_centre(self.centre, 0.0, 0.0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockShape {
    Rect,
    Wedge(Wedge),
}

/// Road-bounded region prior to parcel subdivision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub bounds: Rect,
    /// Quad outline for non-axis-aligned (radial) blocks.
    pub corners: Option<[Point; 4]>,
    pub shape: BlockShape,
}

impl Block {
    pub fn rect(bounds: Rect) -> Self {
        Self {
            bounds,
            corners: None,
            shape: BlockShape::Rect,
        }
    }

    pub fn wedge(wedge: Wedge) -> Self {
        Self {
            bounds: wedge.bounds(),
            corners: Some(wedge.corners()),
            shape: BlockShape::Wedge(wedge),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub footprint: Footprint,
    pub zone: ZoneType,
    /// Storeys.
    pub height: u32,
    pub facility: Option<FacilityType>,
    /// Index of the originating block in [`City::blocks`].
    pub block: usize,
}

impl Building {
    pub fn is_facility(&self) -> bool {
        self.facility.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub position: Point,
    pub kind: FacilityType,
    /// Index of the host building in [`City::buildings`].
    pub building: usize,
}

/// Generated city. Built once by the pipeline and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    size: usize,
    pub(crate) zones: Vec<ZoneType>,
    pub(crate) blocks: Vec<Block>,
    pub(crate) buildings: Vec<Building>,
    pub(crate) facilities: Vec<Facility>,
    pub(crate) roads: Vec<RoadSegment>,
}

impl City {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            zones: vec![ZoneType::None; size * size],
            blocks: Vec::new(),
            buildings: Vec::new(),
            facilities: Vec::new(),
            roads: Vec::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn centre(&self) -> Point {
        let c = self.size as f64 * 0.5;
        Point::new(c, c)
    }

    /// Row-major zone grid, `size * size` cells.
    pub fn zones(&self) -> &[ZoneType] {
        &self.zones
    }

    pub fn zone_at(&self, x: usize, y: usize) -> Option<ZoneType> {
        if x < self.size && y < self.size {
            Some(self.zones[y * self.size + x])
        } else {
            None
        }
    }

    pub(crate) fn set_zone(&mut self, x: usize, y: usize, zone: ZoneType) {
        if x < self.size && y < self.size {
            self.zones[y * self.size + x] = zone;
        }
    }

    /// Zone of the cell containing `point`, clamped onto the grid.
    pub fn zone_near(&self, point: Point) -> ZoneType {
        if self.size == 0 {
            return ZoneType::None;
        }
        let max = (self.size - 1) as f64;
        let x = point.x.clamp(0.0, max).floor() as usize;
        let y = point.y.clamp(0.0, max).floor() as usize;
        self.zones[y * self.size + x]
    }

    pub fn count_zone(&self, zone: ZoneType) -> usize {
        self.zones.iter().filter(|z| **z == zone).count()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub fn facilities(&self) -> &[Facility] {
        &self.facilities
    }

    pub fn roads(&self) -> &[RoadSegment] {
        &self.roads
    }

    pub fn facility_count(&self, kind: FacilityType) -> usize {
        self.facilities.iter().filter(|f| f.kind == kind).count()
    }
}
