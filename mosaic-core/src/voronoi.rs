//! Exact Voronoi cells by repeated half-plane clipping.
//!
//! Each seed's cell starts as the full domain rectangle and is clipped
//! (Sutherland–Hodgman) against the perpendicular bisector with every other
//! seed. Cost is O(seeds²) clips, which stays cheap for the tens to low
//! hundreds of seeds the adaptive sampler produces. Cells are independent of
//! each other, so they are built in parallel with Rayon.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::site::{bounding_box, Polygon, Position, Seed};

const PARALLEL_EPSILON: f64 = 1e-10;

/// A seed together with its region of the domain. The polygon may be empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub seed: Seed,
    pub polygon: Polygon,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        self.polygon.is_empty()
    }

    pub fn area(&self) -> f64 {
        crate::site::signed_area(&self.polygon).abs()
    }
}

/// Where edge `a → b` crosses the bisector of `p` and `q`.
///
/// Returns `None` when the edge is parallel to the bisector or the crossing
/// lies outside the segment.
pub fn intersect_bisector(a: &Position, b: &Position, p: &Position, q: &Position) -> Option<Position> {
    let m = p.midpoint(q);
    let (ab_dx, ab_dy) = a.delta(b);
    let (pq_dx, pq_dy) = p.delta(q);

    let denom = ab_dx * pq_dx + ab_dy * pq_dy;
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }

    let (am_dx, am_dy) = a.delta(&m);
    let t = (am_dx * pq_dx + am_dy * pq_dy) / denom;
    if !(0.0..=1.0).contains(&t) {
        return None;
    }

    Some(Position::new(a.x + t * ab_dx, a.y + t * ab_dy))
}

/// Clip `poly` to the half-plane of points at least as close to `p` as to `q`
pub fn clip_polygon(poly: &[Position], p: &Position, q: &Position) -> Polygon {
    let inside = |pt: &Position| pt.dist_sq(p) <= pt.dist_sq(q);
    let mut clipped = Vec::with_capacity(poly.len() + 1);

    for (i, curr) in poly.iter().enumerate() {
        let next = &poly[(i + 1) % poly.len()];
        match (inside(curr), inside(next)) {
            (true, true) => clipped.push(*next),
            (true, false) => {
                if let Some(ip) = intersect_bisector(curr, next, p, q) {
                    clipped.push(ip);
                }
            }
            (false, true) => {
                if let Some(ip) = intersect_bisector(curr, next, p, q) {
                    clipped.push(ip);
                }
                // `next` can sit on the bisector with `t` rounded past 1.
                clipped.push(*next);
            }
            (false, false) => {}
        }
    }

    clipped
}

/// Cell of `seeds[index]` within `domain`
fn compute_cell(index: usize, seeds: &[Seed], domain: &[Position]) -> Cell {
    let p = seeds[index];
    let mut polygon: Polygon = domain.to_vec();

    for (j, q) in seeds.iter().enumerate() {
        if j == index {
            continue;
        }
        polygon = clip_polygon(&polygon, &p.pos, &q.pos);
        if polygon.is_empty() {
            break;
        }
    }

    Cell { seed: p, polygon }
}

/// Build one cell per seed over `[0,width] × [0,height]`, in seed order
pub fn build_cells(seeds: &[Seed], width: usize, height: usize) -> Vec<Cell> {
    if width == 0 || height == 0 {
        return Vec::new();
    }
    let domain = bounding_box(width as f64, height as f64);

    #[cfg(feature = "parallel")]
    let cells: Vec<Cell> = (0..seeds.len())
        .into_par_iter()
        .map(|i| compute_cell(i, seeds, &domain))
        .collect();
    #[cfg(not(feature = "parallel"))]
    let cells: Vec<Cell> = (0..seeds.len())
        .map(|i| compute_cell(i, seeds, &domain))
        .collect();

    tracing::debug!(
        cells = cells.len(),
        empty = cells.iter().filter(|c| c.is_empty()).count(),
        "built voronoi cells"
    );
    cells
}
