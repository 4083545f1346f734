//! Experiment configuration.
//!
//! Every engine receives its parameters explicitly; `Default` reproduces
//! the reference experiment (20 particles in a 10×10 box for 100 time
//! units, Gaussian packet at x₀ = -3 moving with k₀ = 5).

use crate::error::{require_positive, ReversalError, Result};
use crate::units::{HBAR, NATURAL_HBAR};

/// Classical many-body run parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassicalConfig {
    /// Number of particles N
    pub n_particles: usize,
    /// Total simulated time T
    pub total_time: f64,
    /// Euler time step dt
    pub dt: f64,
    /// Seed for initial positions and velocities
    pub seed: u64,
    /// Side length of the square in which initial positions are drawn.
    /// Also the extent assumed by the entropy binning.
    pub domain_extent: f64,
}

impl ClassicalConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_particles == 0 {
            return Err(ReversalError::NoParticles);
        }
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(ReversalError::InvalidTimeStep(self.dt));
        }
        if !(self.total_time.is_finite() && self.total_time >= 0.0) {
            return Err(ReversalError::InvalidTotalTime(self.total_time));
        }
        if !(self.domain_extent.is_finite() && self.domain_extent > 0.0) {
            return Err(ReversalError::InvalidDomainExtent(self.domain_extent));
        }
        Ok(())
    }

    /// Number of Euler steps: floor(T/dt), tolerant to rounding in the
    /// division (0.3/0.1 counts as 3).
    pub fn steps(&self) -> usize {
        step_count(self.total_time, self.dt)
    }

    /// Simulated time after step `i` (0-based). The first snapshot is
    /// recorded after one step, the time axis starts at 0 to line up with
    /// step indices.
    pub fn time_axis(&self) -> Vec<f64> {
        (0..self.steps()).map(|i| i as f64 * self.dt).collect()
    }
}

impl Default for ClassicalConfig {
    fn default() -> Self {
        Self {
            n_particles: 20,
            total_time: 100.0,
            dt: 0.1,
            seed: 42,
            domain_extent: 10.0,
        }
    }
}

pub(crate) fn step_count(total_time: f64, dt: f64) -> usize {
    if !(total_time.is_finite() && dt.is_finite()) || total_time <= 0.0 || dt <= 0.0 {
        return 0;
    }
    let ratio = total_time / dt;
    let nearest = ratio.round();
    if (ratio - nearest).abs() <= 1e-9 * nearest.max(1.0) {
        nearest as usize
    } else {
        ratio.floor() as usize
    }
}

/// Wave packet and spectral evolution parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveConfig {
    /// Left end of the position grid (inclusive)
    pub x_min: f64,
    /// Right end of the position grid (inclusive)
    pub x_max: f64,
    /// Number of grid points
    pub points: usize,
    /// Packet centre x₀
    pub x0: f64,
    /// Carrier wavenumber k₀
    pub k0: f64,
    /// Packet width σ
    pub sigma: f64,
    /// Evolution time; the packet is evolved to +t and -t
    pub t: f64,
    /// Particle mass m
    pub mass: f64,
    /// Reduced Planck constant ħ in the chosen unit system
    pub hbar: f64,
}

impl WaveConfig {
    /// Same packet with SI ħ and unit mass. The phase ħk²t/2m is then
    /// ~1e-32, so the packet is effectively frozen.
    pub fn si_units() -> Self {
        Self {
            hbar: HBAR,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.points < 2 {
            return Err(ReversalError::GridTooSmall(self.points));
        }
        let finite = [
            ("x_min", self.x_min),
            ("x_max", self.x_max),
            ("x0", self.x0),
            ("k0", self.k0),
            ("t", self.t),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(ReversalError::NonFinite { name, value });
            }
        }
        require_positive("grid span", self.x_max - self.x_min)?;
        require_positive("sigma", self.sigma)?;
        require_positive("mass", self.mass)?;
        require_positive("hbar", self.hbar)?;
        Ok(())
    }

    /// Grid spacing dx of the inclusive linspace.
    pub fn dx(&self) -> f64 {
        (self.x_max - self.x_min) / (self.points - 1) as f64
    }
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            x_min: -10.0,
            x_max: 10.0,
            points: 1024,
            x0: -3.0,
            k0: 5.0,
            sigma: 1.0,
            t: 1.0,
            mass: 1.0,
            hbar: NATURAL_HBAR,
        }
    }
}

/// Full experiment configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ReversalConfig {
    pub classical: ClassicalConfig,
    /// Entropy grid resolution G (cells per axis)
    pub grid_size: usize,
    pub wave: WaveConfig,
}

impl ReversalConfig {
    pub fn validate(&self) -> Result<()> {
        self.classical.validate()?;
        if self.grid_size == 0 {
            return Err(ReversalError::ZeroGridSize);
        }
        self.wave.validate()
    }
}

impl Default for ReversalConfig {
    fn default() -> Self {
        Self {
            classical: ClassicalConfig::default(),
            grid_size: 10,
            wave: WaveConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ReversalConfig::default().validate().is_ok());
        assert!(ReversalConfig {
            wave: WaveConfig::si_units(),
            ..Default::default()
        }
        .validate()
        .is_ok());
    }

    #[test]
    fn default_has_1000_steps() {
        let c = ClassicalConfig::default();
        assert_eq!(c.steps(), 1000);
        let axis = c.time_axis();
        assert_eq!(axis.len(), 1000);
        assert_eq!(axis[0], 0.0);
        assert!((axis[999] - 99.9).abs() < 1e-9);
    }

    #[test]
    fn step_count_tolerates_rounding() {
        assert_eq!(step_count(0.3, 0.1), 3);
        assert_eq!(step_count(1.0, 0.1), 10);
        assert_eq!(step_count(0.25, 0.1), 2);
        assert_eq!(step_count(0.05, 0.1), 0);
        assert_eq!(step_count(0.0, 0.1), 0);
    }

    #[test]
    fn invalid_classical_rejected() {
        let bad = [
            ClassicalConfig { n_particles: 0, ..Default::default() },
            ClassicalConfig { dt: 0.0, ..Default::default() },
            ClassicalConfig { dt: -0.1, ..Default::default() },
            ClassicalConfig { total_time: -1.0, ..Default::default() },
            ClassicalConfig { total_time: f64::NAN, ..Default::default() },
            ClassicalConfig { domain_extent: 0.0, ..Default::default() },
        ];
        for c in &bad {
            let err = c.validate().unwrap_err();
            assert!(err.is_domain_error(), "{:?} -> {:?}", c, err);
        }
    }

    #[test]
    fn zero_grid_rejected() {
        let c = ReversalConfig { grid_size: 0, ..Default::default() };
        assert_eq!(c.validate(), Err(ReversalError::ZeroGridSize));
    }

    #[test]
    fn invalid_wave_rejected() {
        assert_eq!(
            WaveConfig { points: 1, ..Default::default() }.validate(),
            Err(ReversalError::GridTooSmall(1))
        );
        assert!(WaveConfig { mass: 0.0, ..Default::default() }.validate().is_err());
        assert!(WaveConfig { hbar: -1.0, ..Default::default() }.validate().is_err());
        assert!(WaveConfig { sigma: 0.0, ..Default::default() }.validate().is_err());
        assert!(WaveConfig { x_min: 1.0, x_max: 1.0, ..Default::default() }
            .validate()
            .is_err());
    }

    #[test]
    fn dx_matches_linspace() {
        let w = WaveConfig::default();
        assert!((w.dx() - 20.0 / 1023.0).abs() < 1e-15);
    }
}
