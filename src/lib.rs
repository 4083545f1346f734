//! # time-reversal-sim
//!
//! Forward and reverse time evolution in three regimes, computed so that
//! the two directions can be compared side by side:
//!
//! ```text
//! Classical free particles (v and -v from the same start)
//!   ↓ trajectories
//! Spatial Shannon entropy  ·  log mean pairwise distance
//!   ↓ series per time step
//! Gaussian wave packet under exp(-iE(k)t/ħ), t = ±τ
//!   ↓ densities, round-trip error
//! Renderer (outside this crate)
//! ```
//!
//! Classically, reversing velocities gives a second, independent gas whose
//! coarse-grained entropy and spread evolve just like the first: the arrow
//! of time shows up only in the statistics. Quantum mechanically the
//! spectral propagator is exact, so U(-τ)U(τ)ψ₀ = ψ₀ to round-off.
//!
//! ## Usage
//!
//! ```no_run
//! use time_reversal_sim::prelude::*;
//!
//! let (fwd, rev) = simulate_classical(20, 100.0, 0.1, 42)?;
//! let s_fwd = compute_entropy(&fwd, 10)?;
//! let chi_rev = compute_chaos(&rev)?;
//!
//! let x = position_grid(-10.0, 10.0, 1024);
//! let k = wavenumber_grid(x.len(), x[1] - x[0]);
//! let psi0 = gaussian_packet(&x, -3.0, 5.0, 1.0);
//! let psi_t = evolve_wavepacket(&x, &k, &psi0, 1.0, 1.0, 1.0)?;
//! # Ok::<(), ReversalError>(())
//! ```

pub mod units;
pub mod error;
pub mod config;
pub mod classical;
pub mod entropy;
pub mod chaos;
pub mod wave;
pub mod pipeline;

pub mod prelude {
    pub use crate::chaos::*;
    pub use crate::classical::*;
    pub use crate::config::*;
    pub use crate::entropy::*;
    pub use crate::error::ReversalError;
    pub use crate::pipeline::*;
    pub use crate::wave::*;
}
