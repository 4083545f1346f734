//! Classical free-particle kinematics, forward and time-reversed.
//!
//! N point particles start at uniform random positions in a square box with
//! standard-normal velocities. The reverse run shares the initial positions
//! and uses exactly negated velocities. Both are advanced by explicit Euler,
//!
//!   x(t + dt) = x(t) + v · dt,
//!
//! with no forces and no walls: particles leave the box freely. Trajectories
//! are accumulated into a preallocated (step, particle, axis) array, one
//! snapshot per step, each computed from the previous snapshot only.

use log::debug;
use ndarray::{s, Array2, Array3, ArrayView2, ArrayView3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::config::ClassicalConfig;
use crate::error::{ReversalError, Result};

/// Spatial dimensionality of the classical system.
pub const DIM: usize = 2;

/// Positions and velocities of N particles, each an (N, 2) array.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleState {
    positions: Array2<f64>,
    velocities: Array2<f64>,
}

impl ParticleState {
    /// Build a state, checking that both arrays are (N, 2) with the same N.
    pub fn new(positions: Array2<f64>, velocities: Array2<f64>) -> Result<Self> {
        let n = positions.nrows();
        if positions.ncols() != DIM {
            return Err(ReversalError::LengthMismatch {
                what: "position dimensions",
                got: positions.ncols(),
                expected: DIM,
            });
        }
        if velocities.dim() != (n, DIM) {
            return Err(ReversalError::LengthMismatch {
                what: "velocities",
                got: velocities.len(),
                expected: n * DIM,
            });
        }
        Ok(Self { positions, velocities })
    }

    /// Draw N particles: positions uniform in [0, extent)², velocities
    /// standard normal per component. Positions are drawn first, matching
    /// the order the generator is consumed in for a given seed.
    pub fn random<R: Rng>(n: usize, extent: f64, rng: &mut R) -> Self {
        let positions = Array2::from_shape_simple_fn((n, DIM), || rng.gen::<f64>() * extent);
        let velocities =
            Array2::from_shape_simple_fn((n, DIM), || rng.sample::<f64, _>(StandardNormal));
        Self { positions, velocities }
    }

    /// Same positions, negated velocities.
    pub fn reversed(&self) -> Self {
        Self {
            positions: self.positions.clone(),
            velocities: self.velocities.mapv(|v| -v),
        }
    }

    pub fn n_particles(&self) -> usize {
        self.positions.nrows()
    }

    pub fn positions(&self) -> ArrayView2<'_, f64> {
        self.positions.view()
    }

    pub fn velocities(&self) -> ArrayView2<'_, f64> {
        self.velocities.view()
    }
}

/// Cumulative positions indexed by (time step, particle, axis).
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    data: Array3<f64>,
}

impl Trajectory {
    /// Wrap an existing (steps, N, 2) array.
    pub fn from_array(data: Array3<f64>) -> Result<Self> {
        let (_, _, dim) = data.dim();
        if dim != DIM {
            return Err(ReversalError::LengthMismatch {
                what: "trajectory dimensions",
                got: dim,
                expected: DIM,
            });
        }
        Ok(Self { data })
    }

    /// Number of recorded time steps.
    pub fn steps(&self) -> usize {
        self.data.dim().0
    }

    pub fn n_particles(&self) -> usize {
        self.data.dim().1
    }

    pub fn is_empty(&self) -> bool {
        self.steps() == 0
    }

    /// Positions of all particles at one step, shape (N, 2).
    pub fn snapshot(&self, step: usize) -> ArrayView2<'_, f64> {
        self.data.slice(s![step, .., ..])
    }

    /// Iterate snapshots in time order.
    pub fn snapshots(&self) -> impl Iterator<Item = ArrayView2<'_, f64>> + '_ {
        self.data.outer_iter()
    }

    pub fn view(&self) -> ArrayView3<'_, f64> {
        self.data.view()
    }
}

/// One explicit Euler step for free particles. Pure in the previous
/// snapshot: `displacement` is v·dt, precomputed once per run.
pub fn euler_step(
    positions: ArrayView2<'_, f64>,
    displacement: ArrayView2<'_, f64>,
) -> Array2<f64> {
    &positions + &displacement
}

/// Advance `state` for `steps` steps of size `dt`, recording the
/// positions after every step.
pub fn integrate(state: &ParticleState, dt: f64, steps: usize) -> Trajectory {
    let n = state.n_particles();
    let displacement = &state.velocities * dt;
    let mut data = Array3::zeros((steps, n, DIM));

    let mut current = state.positions.clone();
    for mut snapshot in data.outer_iter_mut() {
        current = euler_step(current.view(), displacement.view());
        snapshot.assign(&current);
    }

    Trajectory { data }
}

/// Everything produced by one classical run.
#[derive(Debug, Clone)]
pub struct ClassicalRun {
    pub initial_forward: ParticleState,
    pub initial_reverse: ParticleState,
    pub forward: Trajectory,
    pub reverse: Trajectory,
}

/// Run forward and reverse integrations from a seeded initial state.
pub fn simulate(config: &ClassicalConfig) -> Result<ClassicalRun> {
    config.validate()?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    simulate_with_rng(config, &mut rng)
}

/// Like [`simulate`] but drawing the initial state from a caller-supplied
/// generator.
pub fn simulate_with_rng<R: Rng>(config: &ClassicalConfig, rng: &mut R) -> Result<ClassicalRun> {
    config.validate()?;
    let steps = config.steps();
    let initial_forward =
        ParticleState::random(config.n_particles, config.domain_extent, rng);
    let initial_reverse = initial_forward.reversed();

    debug!(
        "integrating {} particles for {} steps (dt = {})",
        config.n_particles, steps, config.dt
    );
    let forward = integrate(&initial_forward, config.dt, steps);
    let reverse = integrate(&initial_reverse, config.dt, steps);

    Ok(ClassicalRun {
        initial_forward,
        initial_reverse,
        forward,
        reverse,
    })
}

/// Forward and reverse trajectories for `n_particles` drawn with `seed`
/// in the default 10×10 box.
pub fn simulate_classical(
    n_particles: usize,
    total_time: f64,
    dt: f64,
    seed: u64,
) -> Result<(Trajectory, Trajectory)> {
    let config = ClassicalConfig {
        n_particles,
        total_time,
        dt,
        seed,
        ..Default::default()
    };
    let run = simulate(&config)?;
    Ok((run.forward, run.reverse))
}
