//! Spatial Shannon entropy of particle occupancy.
//!
//! At each time step the square [0, L)² is divided into G×G cells, every
//! particle is dropped into one cell and the occupancy is normalised to a
//! probability distribution p. The entropy is
//!
//!   S = -Σ p·ln(p)   over cells with p > 0,
//!
//! so 0 ≤ S ≤ ln(min(N, G²)). Positions outside the box are clamped into
//! the nearest boundary cell, never dropped: escaping particles pile up on
//! the edges, which is what lets a free gas show entropy *decreasing* once
//! most of it has left the box.

use std::collections::BTreeMap;

use ndarray::ArrayView2;

use crate::classical::Trajectory;
use crate::error::{ReversalError, Result};

/// Side length assumed when no extent is given, matching the default
/// classical box.
pub const DEFAULT_EXTENT: f64 = 10.0;

/// One entropy value per trajectory step.
pub type EntropySeries = Vec<f64>;

/// Cell index along one axis: floor(x / L · G) clipped to [0, G-1].
#[inline]
pub fn cell_index(x: f64, extent: f64, grid_size: usize) -> usize {
    let raw = (x / extent * grid_size as f64).floor();
    if raw <= 0.0 || raw.is_nan() {
        0
    } else {
        (raw as usize).min(grid_size - 1)
    }
}

/// Per-step occupancy of the G×G cells, keyed by (x cell, y cell). Only
/// occupied cells are stored, so memory and time scale with N, not G².
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    grid_size: usize,
    counts: BTreeMap<(usize, usize), u32>,
    total: u32,
}

impl OccupancyGrid {
    pub fn new(grid_size: usize) -> Self {
        Self {
            grid_size,
            counts: BTreeMap::new(),
            total: 0,
        }
    }

    /// Bin every row of an (N, 2) position array.
    pub fn from_positions(positions: ArrayView2<'_, f64>, extent: f64, grid_size: usize) -> Self {
        let mut grid = Self::new(grid_size);
        for p in positions.outer_iter() {
            grid.insert(p[0], p[1], extent);
        }
        grid
    }

    pub fn insert(&mut self, x: f64, y: f64, extent: f64) {
        let ix = cell_index(x, extent, self.grid_size);
        let iy = cell_index(y, extent, self.grid_size);
        *self.counts.entry((ix, iy)).or_insert(0) += 1;
        self.total += 1;
    }

    pub fn count(&self, ix: usize, iy: usize) -> u32 {
        self.counts.get(&(ix, iy)).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    /// Number of cells holding at least one particle.
    pub fn occupied_cells(&self) -> usize {
        self.counts.len()
    }

    /// Shannon entropy of the normalised occupancy. Empty cells are
    /// never stored; a single occupied cell gives exactly 0.
    pub fn shannon_entropy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let total = self.total as f64;
        let s: f64 = self
            .counts
            .values()
            .map(|&c| {
                let p = c as f64 / total;
                p * p.ln()
            })
            .sum();
        // -0.0 when one cell holds everything
        (-s).max(0.0)
    }
}

/// Entropy series for a trajectory in the default 10×10 box.
pub fn compute_entropy(trajectory: &Trajectory, grid_size: usize) -> Result<EntropySeries> {
    compute_entropy_with_extent(trajectory, grid_size, DEFAULT_EXTENT)
}

/// Entropy series for a trajectory generated in a box of side `extent`.
pub fn compute_entropy_with_extent(
    trajectory: &Trajectory,
    grid_size: usize,
    extent: f64,
) -> Result<EntropySeries> {
    if grid_size == 0 {
        return Err(ReversalError::ZeroGridSize);
    }
    if !(extent.is_finite() && extent > 0.0) {
        return Err(ReversalError::InvalidDomainExtent(extent));
    }
    if trajectory.n_particles() == 0 {
        return Err(ReversalError::NoParticles);
    }

    Ok(trajectory
        .snapshots()
        .map(|snapshot| OccupancyGrid::from_positions(snapshot, extent, grid_size).shannon_entropy())
        .collect())
}

/// Upper bound ln(min(N, G²)) on the entropy of N particles in G×G cells.
/// G² is taken in floating point and cannot overflow.
pub fn max_entropy(n_particles: usize, grid_size: usize) -> f64 {
    (n_particles as f64).min((grid_size as f64).powi(2)).ln()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classical::simulate_classical;
    use ndarray::{Array2, Array3};

    fn single_step(points: &[(f64, f64)]) -> Trajectory {
        let mut data = Array3::zeros((1, points.len(), 2));
        for (i, &(x, y)) in points.iter().enumerate() {
            data[[0, i, 0]] = x;
            data[[0, i, 1]] = y;
        }
        Trajectory::from_array(data).unwrap()
    }

    #[test]
    fn cell_index_clamps() {
        assert_eq!(cell_index(-3.0, 10.0, 10), 0);
        assert_eq!(cell_index(0.0, 10.0, 10), 0);
        assert_eq!(cell_index(0.99, 10.0, 10), 0);
        assert_eq!(cell_index(1.0, 10.0, 10), 1);
        assert_eq!(cell_index(9.99, 10.0, 10), 9);
        assert_eq!(cell_index(10.0, 10.0, 10), 9);
        assert_eq!(cell_index(250.0, 10.0, 10), 9);
        assert_eq!(cell_index(f64::NAN, 10.0, 10), 0);
    }

    #[test]
    fn collapsed_occupancy_has_zero_entropy() {
        let traj = single_step(&[(2.1, 3.4), (2.2, 3.5), (2.9, 3.0), (2.5, 3.9)]);
        let s = compute_entropy(&traj, 10).unwrap();
        assert_eq!(s, vec![0.0]);
    }

    #[test]
    fn escaped_particles_clamp_to_one_corner() {
        // All far outside on the same side → same boundary cell
        let traj = single_step(&[(50.0, 50.0), (120.0, 11.0), (10.5, 99.0)]);
        assert_eq!(compute_entropy(&traj, 10).unwrap(), vec![0.0]);
    }

    #[test]
    fn one_particle_per_cell_is_maximal() {
        let mut points = Vec::new();
        for i in 0..10 {
            for j in 0..10 {
                points.push((i as f64 + 0.5, j as f64 + 0.5));
            }
        }
        let s = compute_entropy(&single_step(&points), 10).unwrap()[0];
        let bound = max_entropy(100, 10);
        assert!((s - bound).abs() < 1e-12, "S = {}, ln(100) = {}", s, bound);
    }

    #[test]
    fn two_equal_cells_give_ln2() {
        let traj = single_step(&[(0.5, 0.5), (0.6, 0.6), (5.5, 5.5), (5.6, 5.6)]);
        let s = compute_entropy(&traj, 10).unwrap()[0];
        assert!((s - 2f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn entropy_within_bounds_for_reference_run() {
        let (fwd, rev) = simulate_classical(20, 100.0, 0.1, 42).unwrap();
        let bound = max_entropy(20, 10);
        for traj in [&fwd, &rev] {
            let series = compute_entropy(traj, 10).unwrap();
            assert_eq!(series.len(), 1000);
            for (t, &s) in series.iter().enumerate() {
                assert!(
                    s >= 0.0 && s <= bound + 1e-12,
                    "step {}: S = {} outside [0, {}]",
                    t, s, bound
                );
            }
        }
    }

    #[test]
    fn coarse_grid_bound_uses_cell_count() {
        // 20 particles in a 2×2 grid: bound is ln(4), not ln(20)
        let (fwd, _) = simulate_classical(20, 5.0, 0.1, 9).unwrap();
        let bound = max_entropy(20, 2);
        assert!((bound - 4f64.ln()).abs() < 1e-15);
        for s in compute_entropy(&fwd, 2).unwrap() {
            assert!(s <= bound + 1e-12);
        }
    }

    #[test]
    fn empty_trajectory_gives_empty_series() {
        let traj = Trajectory::from_array(Array3::zeros((0, 4, 2))).unwrap();
        assert!(compute_entropy(&traj, 10).unwrap().is_empty());
    }

    #[test]
    fn invalid_inputs_rejected() {
        let traj = single_step(&[(1.0, 1.0)]);
        assert_eq!(compute_entropy(&traj, 0), Err(ReversalError::ZeroGridSize));
        assert!(compute_entropy_with_extent(&traj, 10, 0.0).is_err());
        let empty = Trajectory::from_array(Array3::zeros((3, 0, 2))).unwrap();
        assert_eq!(compute_entropy(&empty, 10), Err(ReversalError::NoParticles));
    }

    #[test]
    fn grid_counts_every_particle() {
        let positions = Array2::from_shape_vec((3, 2), vec![-1.0, -1.0, 4.2, 7.7, 4.9, 7.1]).unwrap();
        let grid = OccupancyGrid::from_positions(positions.view(), 10.0, 10);
        assert_eq!(grid.total(), 3);
        assert_eq!(grid.count(0, 0), 1);
        assert_eq!(grid.count(4, 7), 2);
        assert_eq!(grid.occupied_cells(), 2);
        assert_eq!(grid.count(9, 9), 0);
    }

    #[test]
    fn huge_grid_counts_only_occupied_cells() {
        let g = 1usize << 32;
        let stacked = Trajectory::from_array(Array3::zeros((1, 3, 2))).unwrap();
        assert_eq!(compute_entropy(&stacked, g).unwrap(), vec![0.0]);

        let spread = single_step(&[(1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);
        let s = compute_entropy(&spread, g).unwrap()[0];
        assert!((s - 3f64.ln()).abs() < 1e-12, "S = {}", s);
        assert!((max_entropy(3, g) - 3f64.ln()).abs() < 1e-15);
        assert_eq!(max_entropy(3, usize::MAX), 3f64.ln());
    }

    #[test]
    fn binning_scales_with_extent() {
        // Box of side 20 and G = 10: cells are 2 wide
        let traj = single_step(&[(15.0, 15.0), (1.9, 19.9), (25.0, -1.0)]);
        let grid = OccupancyGrid::from_positions(traj.snapshot(0), 20.0, 10);
        assert_eq!(grid.count(7, 7), 1);
        assert_eq!(grid.count(0, 9), 1);
        assert_eq!(grid.count(9, 0), 1);
        let s = compute_entropy_with_extent(&traj, 10, 20.0).unwrap()[0];
        assert!((s - 3f64.ln()).abs() < 1e-12);

        // The same points in the default box of side 10 collapse differently
        let default_grid = OccupancyGrid::from_positions(traj.snapshot(0), DEFAULT_EXTENT, 10);
        assert_eq!(default_grid.count(7, 7), 0);
        assert_eq!(default_grid.count(9, 9), 1);
    }
}
