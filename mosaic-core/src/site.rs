//! Seed and position types for Voronoi computation.

use crate::ColorSample;

/// 2D position
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared distance to another position
    pub fn dist_sq(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Distance to another position
    pub fn dist(&self, other: &Position) -> f64 {
        self.dist_sq(other).sqrt()
    }

    pub fn midpoint(&self, other: &Position) -> Position {
        Position::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Vector from `self` to `other`
    pub fn delta(&self, other: &Position) -> (f64, f64) {
        (other.x - self.x, other.y - self.y)
    }
}

/// A Voronoi seed: grid coordinate plus the color sampled there
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seed {
    pub pos: Position,
    pub color: ColorSample,
}

impl Seed {
    pub fn new(pos: Position, color: ColorSample) -> Self {
        Self { pos, color }
    }

    pub fn at(x: f64, y: f64, color: ColorSample) -> Self {
        Self::new(Position::new(x, y), color)
    }
}

/// Closed convex polygon; vertex order defines edge direction
pub type Polygon = Vec<Position>;

/// The rectangle `[0,width] × [0,height]`, clockwise in screen coordinates
pub fn bounding_box(width: f64, height: f64) -> Polygon {
    vec![
        Position::new(0.0, 0.0),
        Position::new(width, 0.0),
        Position::new(width, height),
        Position::new(0.0, height),
    ]
}

/// Signed shoelace area; positive for the winding `bounding_box` uses
pub fn signed_area(poly: &[Position]) -> f64 {
    if poly.len() < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for (i, a) in poly.iter().enumerate() {
        let b = &poly[(i + 1) % poly.len()];
        twice += a.x * b.y - b.x * a.y;
    }
    twice / 2.0
}
