//! Planar geometry in grid units: points, axis-aligned rectangles and the
//! rectangle-or-quad footprints that parcels and buildings occupy.

use serde::{Deserialize, Serialize};

/// Position on the city plane, in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Cartesian position of polar coordinates `(radius, angle)` around `centre`.
    pub fn from_polar(centre: Point, radius: f64, angle: f64) -> Self {
        Self {
            x: centre.x + radius * angle.cos(),
            y: centre.y + radius * angle.sin(),
        }
    }
}

/// Axis-aligned bounds. Construction orders the corners so `x1 >= x0` and `y1 >= y0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn from_centre(centre: Point, width: f64, height: f64) -> Self {
        let hw = width.abs() * 0.5;
        let hh = height.abs() * 0.5;
        Self::new(centre.x - hw, centre.y - hh, centre.x + hw, centre.y + hh)
    }

    /// Bounding box of a set of points; `None` when the set is empty.
    pub fn bounding(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut rect = Rect::new(first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            rect.x0 = rect.x0.min(p.x);
            rect.y0 = rect.y0.min(p.y);
            rect.x1 = rect.x1.max(p.x);
            rect.y1 = rect.y1.max(p.y);
        }
        Some(rect)
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn centre(&self) -> Point {
        Point::new((self.x0 + self.x1) * 0.5, (self.y0 + self.y1) * 0.5)
    }

    pub fn is_degenerate(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Grow (or shrink, for negative `amount`) by `amount` on every side.
    pub fn expand(&self, amount: f64) -> Self {
        Rect::new(
            self.x0 - amount,
            self.y0 - amount,
            self.x1 + amount,
            self.y1 + amount,
        )
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x0 <= other.x1 && other.x0 <= self.x1 && self.y0 <= other.y1 && other.y0 <= self.y1
    }

    /// Euclidean gap between two boxes, zero when they touch or overlap.
    pub fn gap(&self, other: &Rect) -> f64 {
        let dx = (other.x0 - self.x1).max(self.x0 - other.x1).max(0.0);
        let dy = (other.y0 - self.y1).max(self.y0 - other.y1).max(0.0);
        dx.hypot(dy)
    }

    pub fn contains_rect(&self, other: &Rect, eps: f64) -> bool {
        other.x0 >= self.x0 - eps
            && other.y0 >= self.y0 - eps
            && other.x1 <= self.x1 + eps
            && other.y1 <= self.y1 + eps
    }

    /// Corners in counter-clockwise order starting at `(x0, y0)`.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x0, self.y0),
            Point::new(self.x1, self.y0),
            Point::new(self.x1, self.y1),
            Point::new(self.x0, self.y1),
        ]
    }
}

/// Ground outline of a parcel or building.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "shape", rename_all = "snake_case")]
pub enum Footprint {
    Rect(Rect),
    /// Four corners, counter-clockwise.
    Quad([Point; 4]),
}

impl Footprint {
    pub fn corners(&self) -> [Point; 4] {
        match self {
            Footprint::Rect(rect) => rect.corners(),
            Footprint::Quad(corners) => *corners,
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Footprint::Rect(rect) => *rect,
            Footprint::Quad(corners) => {
                let [a, b, c, d] = *corners;
                Rect::new(
                    a.x.min(b.x).min(c.x).min(d.x),
                    a.y.min(b.y).min(c.y).min(d.y),
                    a.x.max(b.x).max(c.x).max(d.x),
                    a.y.max(b.y).max(c.y).max(d.y),
                )
            }
        }
    }

    pub fn centre(&self) -> Point {
        match self {
            Footprint::Rect(rect) => rect.centre(),
            Footprint::Quad(corners) => {
                let sx: f64 = corners.iter().map(|p| p.x).sum();
                let sy: f64 = corners.iter().map(|p| p.y).sum();
                Point::new(sx / 4.0, sy / 4.0)
            }
        }
    }

    pub fn area(&self) -> f64 {
        match self {
            Footprint::Rect(rect) => rect.area(),
            Footprint::Quad(corners) => signed_area(corners).abs(),
        }
    }
}

/// Shoelace area; positive for counter-clockwise winding.
pub fn signed_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        sum += a.x * b.y - b.x * a.y;
    }
    sum * 0.5
}

/// Bilinear point inside a quad given as `[p00, p10, p11, p01]`.
pub fn quad_lerp(corners: &[Point; 4], u: f64, v: f64) -> Point {
    let [p00, p10, p11, p01] = *corners;
    let bottom_x = p00.x + (p10.x - p00.x) * u;
    let bottom_y = p00.y + (p10.y - p00.y) * u;
    let top_x = p01.x + (p11.x - p01.x) * u;
    let top_y = p01.y + (p11.y - p01.y) * u;
    Point::new(bottom_x + (top_x - bottom_x) * v, bottom_y + (top_y - bottom_y) * v)
}

/// Sub-quad of `corners` spanning `[u0, u1] x [v0, v1]` in its bilinear parameter space.
pub fn sub_quad(corners: &[Point; 4], u0: f64, v0: f64, u1: f64, v1: f64) -> [Point; 4] {
    [
        quad_lerp(corners, u0, v0),
        quad_lerp(corners, u1, v0),
        quad_lerp(corners, u1, v1),
        quad_lerp(corners, u0, v1),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_orders_corners() {
        let rect = Rect::new(4.0, 5.0, 1.0, 2.0);
        assert_eq!(rect.x0, 1.0);
        assert_eq!(rect.y0, 2.0);
        assert_eq!(rect.width(), 3.0);
        assert_eq!(rect.height(), 3.0);
        assert_eq!(rect.centre(), Point::new(2.5, 3.5));
    }

    #[test]
    fn test_gap_and_overlap() {
        let a = Rect::new(0.0, 0.0, 1.0, 1.0);
        let b = Rect::new(4.0, 5.0, 6.0, 6.0);
        assert!(!a.overlaps(&b));
        assert!((a.gap(&b) - 5.0).abs() < 1e-12);

        let c = Rect::new(0.5, 0.5, 2.0, 2.0);
        assert!(a.overlaps(&c));
        assert_eq!(a.gap(&c), 0.0);
    }

    #[test]
    fn test_rect_corners_are_counter_clockwise() {
        let rect = Rect::new(0.0, 0.0, 2.0, 3.0);
        assert!((signed_area(&rect.corners()) - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_quad_footprint_metrics() {
        let quad = Footprint::Quad([
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(2.0, 2.0),
            Point::new(0.0, 2.0),
        ]);
        assert!((quad.area() - 4.0).abs() < 1e-12);
        assert_eq!(quad.centre(), Point::new(1.0, 1.0));
        assert_eq!(quad.bounds(), Rect::new(0.0, 0.0, 2.0, 2.0));
    }

    #[test]
    fn test_sub_quad_of_square() {
        let corners = Rect::new(0.0, 0.0, 10.0, 10.0).corners();
        let inner = sub_quad(&corners, 0.2, 0.2, 0.8, 0.8);
        let bounds = Rect::bounding(&inner).unwrap();
        let expected = Rect::new(2.0, 2.0, 8.0, 8.0);
        assert!(expected.contains_rect(&bounds, 1e-9));
        assert!(bounds.contains_rect(&expected, 1e-9));
    }

    #[test]
    fn test_from_polar() {
        let p = Point::from_polar(Point::new(1.0, 1.0), 2.0, std::f64::consts::FRAC_PI_2);
        assert!((p.x - 1.0).abs() < 1e-12);
        assert!((p.y - 3.0).abs() < 1e-12);
    }
}
