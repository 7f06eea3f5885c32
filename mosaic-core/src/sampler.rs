//! Adaptive seed placement by quadtree subdivision.
//!
//! Regions whose sparse color sample is uniform get a single seed at their
//! midpoint; other regions split into quadrants until `min_size`. Seed density
//! therefore follows local color variance.

use crate::{ColorGrid, ColorSample, Seed};

/// Geometry constants of the sampler
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerConfig {
    /// Side of the initial tiles
    pub starting_size: usize,
    /// Regions at or below this side always emit one seed; also the sample stride
    pub min_size: usize,
    /// Max squared RGB distance between any two samples of a uniform region
    pub variance_threshold: u32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            starting_size: 128,
            min_size: 8,
            variance_threshold: 80 * 80,
        }
    }
}

/// Sample seeds with the default constants
pub fn sample(grid: &ColorGrid) -> Vec<Seed> {
    sample_with(grid, &SamplerConfig::default())
}

/// Sample seeds for `grid`. The empty grid yields no seeds.
pub fn sample_with(grid: &ColorGrid, config: &SamplerConfig) -> Vec<Seed> {
    if grid.is_empty() {
        return Vec::new();
    }
    let start = config.starting_size.max(1);
    let min_size = config.min_size.max(1);

    let mut seeds = Vec::new();
    let mut stack: Vec<(usize, usize, usize)> = Vec::new();

    for y in (0..grid.height()).step_by(start) {
        for x in (0..grid.width()).step_by(start) {
            stack.push((x, y, start));

            while let Some((x, y, size)) = stack.pop() {
                let mid = midpoint(grid, x, y, size);

                if size <= min_size
                    || is_uniform(&region_sample(grid, x, y, size, min_size), config.variance_threshold)
                {
                    seeds.push(mid);
                    continue;
                }

                // Pushed in reverse so quadrants pop top-left, top-right,
                // bottom-left, bottom-right.
                let half = size / 2;
                stack.push((x + half, y + half, half));
                stack.push((x, y + half, half));
                stack.push((x + half, y, half));
                stack.push((x, y, half));
            }
        }
    }

    tracing::debug!(
        seeds = seeds.len(),
        width = grid.width(),
        height = grid.height(),
        "sampled seeds"
    );
    seeds
}

/// Seed at the region midpoint, clamped into the grid
fn midpoint(grid: &ColorGrid, x: usize, y: usize, size: usize) -> Seed {
    let mx = (x + size / 2).min(grid.width() - 1);
    let my = (y + size / 2).min(grid.height() - 1);
    Seed::at(mx as f64, my as f64, grid.get(mx, my))
}

/// Colors at `stride` spacing inside the region, bounded by the grid edge
fn region_sample(grid: &ColorGrid, x: usize, y: usize, size: usize, stride: usize) -> Vec<ColorSample> {
    let mut sample = Vec::new();
    let mut i = 0;
    while i < size && y + i < grid.height() {
        let mut j = 0;
        while j < size && x + j < grid.width() {
            sample.push(grid.get(x + j, y + i));
            j += stride;
        }
        i += stride;
    }
    sample
}

/// True when no pair of samples is farther apart than `threshold`.
/// Pairs include each sample with itself.
fn is_uniform(sample: &[ColorSample], threshold: u32) -> bool {
    for (a, ca) in sample.iter().enumerate() {
        for cb in &sample[a..] {
            if ca.dist_sq(cb) > threshold {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard(width: usize, height: usize, cell: usize) -> ColorGrid {
        let mut samples = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let on = ((x / cell) + (y / cell)) % 2 == 0;
                samples.push(if on {
                    ColorSample::new(255, 255, 255)
                } else {
                    ColorSample::new(0, 0, 0)
                });
            }
        }
        ColorGrid::from_samples(width, height, samples).unwrap()
    }

    #[test]
    fn test_empty_grid() {
        assert!(sample(&ColorGrid::empty()).is_empty());
    }

    #[test]
    fn test_uniform_grid_one_seed_per_tile() {
        let grid = ColorGrid::filled(256, 128, ColorSample::new(40, 80, 120));
        let seeds = sample(&grid);
        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[0].pos.x, 64.0);
        assert_eq!(seeds[0].pos.y, 64.0);
        assert_eq!(seeds[1].pos.x, 192.0);
        assert_eq!(seeds[0].color, ColorSample::new(40, 80, 120));
    }

    #[test]
    fn test_partial_tile_midpoint_clamped() {
        let grid = ColorGrid::filled(50, 20, ColorSample::new(1, 1, 1));
        let seeds = sample(&grid);
        assert_eq!(seeds.len(), 1);
        assert_eq!(seeds[0].pos.x, 49.0);
        assert_eq!(seeds[0].pos.y, 19.0);
    }

    #[test]
    fn test_high_variance_reaches_min_size() {
        // Checker period equals the sample stride, so every region is non-uniform
        // until the recursion bottoms out at 8x8.
        let grid = checkerboard(128, 128, 8);
        let seeds = sample(&grid);
        assert_eq!(seeds.len(), (128 / 8) * (128 / 8));
        for seed in &seeds {
            assert_eq!(seed.pos.x as usize % 8, 4);
            assert_eq!(seed.pos.y as usize % 8, 4);
        }
    }

    #[test]
    fn test_subdivision_order_depth_first() {
        // Only the top-left 64x64 quadrant is busy.
        let mut samples = vec![ColorSample::new(0, 0, 0); 128 * 128];
        for y in 0..64 {
            for x in 0..64 {
                if ((x / 8) + (y / 8)) % 2 == 0 {
                    samples[y * 128 + x] = ColorSample::new(255, 255, 255);
                }
            }
        }
        let grid = ColorGrid::from_samples(128, 128, samples).unwrap();
        let seeds = sample(&grid);
        // 64 fine seeds from the busy quadrant, then 3 coarse ones.
        assert_eq!(seeds.len(), 64 + 3);
        assert_eq!((seeds[0].pos.x, seeds[0].pos.y), (4.0, 4.0));
        let coarse: Vec<(f64, f64)> = seeds[64..].iter().map(|s| (s.pos.x, s.pos.y)).collect();
        assert_eq!(coarse, vec![(96.0, 32.0), (32.0, 96.0), (96.0, 96.0)]);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        // Distance exactly 80^2 still counts as uniform.
        let mut samples = vec![ColorSample::new(0, 0, 0); 16 * 16];
        samples[8] = ColorSample::new(80, 0, 0);
        let grid = ColorGrid::from_samples(16, 16, samples).unwrap();
        assert_eq!(sample(&grid).len(), 1);

        let mut samples = vec![ColorSample::new(0, 0, 0); 16 * 16];
        samples[8] = ColorSample::new(81, 0, 0);
        let grid = ColorGrid::from_samples(16, 16, samples).unwrap();
        assert!(sample(&grid).len() > 1);
    }

    #[test]
    fn test_deterministic() {
        let grid = checkerboard(200, 150, 13);
        assert_eq!(sample(&grid), sample(&grid));
    }
}
