//! Pairwise-distance chaos indicator.
//!
//! For each time step:
//!
//!   χ(t) = ln( mean_{i<j} |x_i(t) - x_j(t)| + ε ),   ε = 1e-8
//!
//! This is a Lyapunov-*like* proxy only. It tracks how far apart the cloud
//! is, not how fast nearby trajectories separate under perturbation, and no
//! exponential rate is fitted. For free particles the mean distance grows
//! linearly at late times, so χ grows like ln(t), not like λt.
//!
//! Cost is O(N²) per step.

use ndarray::ArrayView2;

use crate::classical::Trajectory;
use crate::error::{ReversalError, Result};

/// Added to the mean distance before taking the log.
pub const STABILIZER: f64 = 1e-8;

/// One chaos value per trajectory step.
pub type ChaosSeries = Vec<f64>;

/// Mean Euclidean distance over all unordered pairs of rows of an (N, 2)
/// array. Returns `None` when N < 2.
pub fn mean_pairwise_distance(positions: ArrayView2<'_, f64>) -> Option<f64> {
    let n = positions.nrows();
    if n < 2 {
        return None;
    }
    let mut total = 0.0;
    for i in 0..n {
        let (xi, yi) = (positions[[i, 0]], positions[[i, 1]]);
        for j in (i + 1)..n {
            let dx = xi - positions[[j, 0]];
            let dy = yi - positions[[j, 1]];
            total += dx.hypot(dy);
        }
    }
    let pairs = n * (n - 1) / 2;
    Some(total / pairs as f64)
}

/// Log mean pairwise distance per step. Fails for fewer than two particles,
/// where no pair exists.
pub fn compute_chaos(trajectory: &Trajectory) -> Result<ChaosSeries> {
    let n = trajectory.n_particles();
    if n < 2 {
        return Err(ReversalError::TooFewParticles(n));
    }
    Ok(trajectory
        .snapshots()
        .map(|snapshot| {
            // n >= 2 checked above
            let mean = mean_pairwise_distance(snapshot).unwrap_or(0.0);
            (mean + STABILIZER).ln()
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classical::simulate_classical;
    use ndarray::{array, Array3};

    #[test]
    fn unit_square_mean_distance() {
        let square = array![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
        // 4 sides of length 1, 2 diagonals of √2
        let expected = (4.0 + 2.0 * 2f64.sqrt()) / 6.0;
        let mean = mean_pairwise_distance(square.view()).unwrap();
        assert!((mean - expected).abs() < 1e-12);
    }

    #[test]
    fn single_particle_is_degenerate() {
        let traj = Trajectory::from_array(Array3::zeros((5, 1, 2))).unwrap();
        let err = compute_chaos(&traj).unwrap_err();
        assert_eq!(err, ReversalError::TooFewParticles(1));
        assert!(err.is_degeneracy());
        let none = Trajectory::from_array(Array3::zeros((5, 0, 2))).unwrap();
        assert!(compute_chaos(&none).is_err());
    }

    #[test]
    fn coincident_particles_stay_finite() {
        let traj = Trajectory::from_array(Array3::zeros((3, 4, 2))).unwrap();
        let series = compute_chaos(&traj).unwrap();
        for &c in &series {
            assert!(c.is_finite());
            assert!((c - STABILIZER.ln()).abs() < 1e-12);
        }
    }

    #[test]
    fn small_separation_is_negative() {
        let mut data = Array3::zeros((1, 2, 2));
        data[[0, 1, 0]] = 0.01;
        let traj = Trajectory::from_array(data).unwrap();
        let c = compute_chaos(&traj).unwrap()[0];
        assert!(c < 0.0, "ln(0.01) should be negative, got {}", c);
    }

    #[test]
    fn reference_run_is_finite_and_aligned() {
        let (fwd, rev) = simulate_classical(20, 100.0, 0.1, 42).unwrap();
        for traj in [&fwd, &rev] {
            let series = compute_chaos(traj).unwrap();
            assert_eq!(series.len(), traj.steps());
            assert!(series.iter().all(|c| c.is_finite()));
        }
    }

    #[test]
    fn free_expansion_spreads_late() {
        // Eventually distances grow ~ linearly with t regardless of direction
        let (fwd, rev) = simulate_classical(20, 100.0, 0.1, 42).unwrap();
        for traj in [&fwd, &rev] {
            let series = compute_chaos(traj).unwrap();
            assert!(series[999] > series[100]);
        }
    }

    #[test]
    fn empty_trajectory_gives_empty_series() {
        let traj = Trajectory::from_array(Array3::zeros((0, 3, 2))).unwrap();
        assert!(compute_chaos(&traj).unwrap().is_empty());
    }
}
