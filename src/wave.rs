//! Spectral evolution of a free-particle wave packet.
//!
//! Solves iħ ∂ψ/∂t = -(ħ²/2m) ∂²ψ/∂x² on a periodic grid by diagonalising
//! the Hamiltonian in Fourier space:
//!
//! ```text
//!   ψ(x, 0) ──FFT──▶ ψ̃(k, 0)
//!                      │  × exp(-i E(k) t / ħ),   E(k) = ħ²k²/2m
//!                      ▼
//!   ψ(x, t) ◀─IFFT── ψ̃(k, t)
//! ```
//!
//! The phase factor is the exact propagator for each mode, so there is no
//! stepping error: evolving by +t and then by -t returns the initial
//! amplitudes up to FFT round-off. Time reversal is complex conjugation,
//! ψ(−t) = [U(t) ψ*]*, which [`time_reverse`] exposes for checking.
//!
//! The wavenumber grid must be the reciprocal of the position grid,
//! k_j = 2π·fftfreq(n, dx)_j. Any other grid makes the phase meaningless,
//! so [`evolve_wavepacket`] rejects it.
//!
//! The grid is periodic: a packet that reaches one edge re-enters from the
//! other.

use std::sync::Arc;

use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};

use crate::config::WaveConfig;
use crate::error::{require_positive, ReversalError, Result};
use crate::units::{free_particle_phase, PI};

/// Relative tolerance on grid spacing and wavenumber checks.
const GRID_TOL: f64 = 1e-6;

/// `n` evenly spaced points from `start` to `stop`, both included.
pub fn position_grid(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut x: Vec<f64> = (0..n).map(|i| start + i as f64 * step).collect();
            x[n - 1] = stop;
            x
        }
    }
}

/// Angular wavenumbers in FFT order for `n` samples spaced `dx` apart:
/// 0, 1, …, ⌈n/2⌉-1, -⌊n/2⌋, …, -1, each times 2π/(n·dx).
pub fn wavenumber_grid(n: usize, dx: f64) -> Vec<f64> {
    let val = 1.0 / (n as f64 * dx);
    let positive = (n + 1) / 2;
    (0..n)
        .map(|j| {
            let freq = if j < positive {
                j as f64
            } else {
                j as f64 - n as f64
            };
            freq * val * 2.0 * PI
        })
        .collect()
}

/// ψ₀(x) = 1/(σ√(2π)) · exp(-(x-x₀)²/(2σ²)) · exp(i·k₀·x)
pub fn gaussian_packet(x: &[f64], x0: f64, k0: f64, sigma: f64) -> Vec<Complex64> {
    let amplitude = 1.0 / (sigma * (2.0 * PI).sqrt());
    x.iter()
        .map(|&xi| {
            let envelope = amplitude * (-(xi - x0).powi(2) / (2.0 * sigma * sigma)).exp();
            Complex64::from_polar(envelope, k0 * xi)
        })
        .collect()
}

/// |ψ(x)|² per grid point.
pub fn probability_density(psi: &[Complex64]) -> Vec<f64> {
    psi.iter().map(|c| c.norm_sqr()).collect()
}

/// Σ|ψ|²·dx
pub fn total_probability(psi: &[Complex64], dx: f64) -> f64 {
    psi.iter().map(|c| c.norm_sqr()).sum::<f64>() * dx
}

/// Largest elementwise |a - b|. Slices of different lengths compare
/// only over the common prefix.
pub fn max_abs_diff(a: &[Complex64], b: &[Complex64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).norm())
        .fold(0.0_f64, f64::max)
}

/// Antiunitary time-reversal operator for a spinless particle: ψ → ψ*.
pub fn time_reverse(psi: &[Complex64]) -> Vec<Complex64> {
    psi.iter().map(|c| c.conj()).collect()
}

/// Spacing of an evenly spaced grid, or an error naming the first
/// irregular interval.
///
/// Every interval must match the first within a relative `GRID_TOL`, or
/// within the rounding of coordinates of magnitude max|x|, whichever is
/// larger. The returned spacing is the mean interval (x[n-1] - x[0]) / (n-1).
pub fn grid_spacing(x: &[f64]) -> Result<f64> {
    let n = x.len();
    if n < 2 {
        return Err(ReversalError::GridTooSmall(n));
    }
    let first = x[1] - x[0];
    require_positive("grid spacing", first)?;
    let magnitude = x[0].abs().max(x[n - 1].abs());
    let tol = (GRID_TOL * first).max(16.0 * f64::EPSILON * magnitude);
    for (i, pair) in x.windows(2).enumerate().skip(1) {
        if ((pair[1] - pair[0]) - first).abs() > tol {
            return Err(ReversalError::NonUniformGrid { index: i });
        }
    }
    Ok((x[n - 1] - x[0]) / (n - 1) as f64)
}

fn check_wavenumbers(k: &[f64], dx: f64) -> Result<()> {
    let expected = wavenumber_grid(k.len(), dx);
    for (index, (&got, &want)) in k.iter().zip(expected.iter()).enumerate() {
        if (got - want).abs() > GRID_TOL * want.abs().max(1.0) {
            return Err(ReversalError::InconsistentWavenumbers {
                index,
                expected: want,
                got,
            });
        }
    }
    Ok(())
}

/// Forward/inverse FFT pair planned once for a fixed grid length.
pub struct SpectralPropagator {
    n: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl SpectralPropagator {
    pub fn new(n: usize) -> Self {
        let mut planner = FftPlanner::<f64>::new();
        Self {
            n,
            forward: planner.plan_fft_forward(n),
            inverse: planner.plan_fft_inverse(n),
        }
    }

    /// Apply exp(-i·E(k)·t/ħ) in Fourier space. `psi` and `k` must both
    /// have the planned length; callers validate.
    pub fn propagate(
        &self,
        psi: &[Complex64],
        k: &[f64],
        t: f64,
        mass: f64,
        hbar: f64,
    ) -> Vec<Complex64> {
        let mut buf = psi.to_vec();
        self.forward.process(&mut buf);

        for (amp, &kj) in buf.iter_mut().zip(k.iter()) {
            *amp *= Complex64::cis(free_particle_phase(kj, t, mass, hbar));
        }

        self.inverse.process(&mut buf);
        // rustfft leaves the inverse unnormalised
        let scale = 1.0 / self.n as f64;
        for amp in buf.iter_mut() {
            *amp *= scale;
        }
        buf
    }
}

/// Evolve `psi0` sampled on `x_grid` to time `t` (either sign) under the
/// free-particle Hamiltonian with mass `mass` and reduced Planck constant
/// `hbar`. `k_grid` must be `wavenumber_grid(n, dx)` for the spacing of
/// `x_grid`.
pub fn evolve_wavepacket(
    x_grid: &[f64],
    k_grid: &[f64],
    psi0: &[Complex64],
    t: f64,
    mass: f64,
    hbar: f64,
) -> Result<Vec<Complex64>> {
    let n = x_grid.len();
    let dx = grid_spacing(x_grid)?;
    if k_grid.len() != n {
        return Err(ReversalError::LengthMismatch {
            what: "wavenumber grid",
            got: k_grid.len(),
            expected: n,
        });
    }
    if psi0.len() != n {
        return Err(ReversalError::LengthMismatch {
            what: "amplitudes",
            got: psi0.len(),
            expected: n,
        });
    }
    require_positive("mass", mass)?;
    require_positive("hbar", hbar)?;
    if !t.is_finite() {
        return Err(ReversalError::NonFinite { name: "t", value: t });
    }
    check_wavenumbers(k_grid, dx)?;

    Ok(SpectralPropagator::new(n).propagate(psi0, k_grid, t, mass, hbar))
}

/// Amplitudes on a position grid together with the matching wavenumbers.
#[derive(Debug, Clone, PartialEq)]
pub struct WavePacket {
    x: Vec<f64>,
    k: Vec<f64>,
    psi: Vec<Complex64>,
    dx: f64,
}

impl WavePacket {
    /// Wrap amplitudes sampled on an evenly spaced grid; the wavenumber
    /// grid is derived from the spacing.
    pub fn new(x: Vec<f64>, psi: Vec<Complex64>) -> Result<Self> {
        let dx = grid_spacing(&x)?;
        if psi.len() != x.len() {
            return Err(ReversalError::LengthMismatch {
                what: "amplitudes",
                got: psi.len(),
                expected: x.len(),
            });
        }
        let k = wavenumber_grid(x.len(), dx);
        Ok(Self { x, k, psi, dx })
    }

    /// Gaussian packet described by `config`.
    pub fn gaussian(config: &WaveConfig) -> Result<Self> {
        config.validate()?;
        let x = position_grid(config.x_min, config.x_max, config.points);
        let psi = gaussian_packet(&x, config.x0, config.k0, config.sigma);
        Self::new(x, psi)
    }

    /// New packet evolved to time `t`; `self` is left untouched.
    pub fn evolve(&self, t: f64, mass: f64, hbar: f64) -> Result<Self> {
        let psi = evolve_wavepacket(&self.x, &self.k, &self.psi, t, mass, hbar)?;
        Ok(Self {
            x: self.x.clone(),
            k: self.k.clone(),
            psi,
            dx: self.dx,
        })
    }

    pub fn positions(&self) -> &[f64] {
        &self.x
    }

    pub fn wavenumbers(&self) -> &[f64] {
        &self.k
    }

    pub fn amplitudes(&self) -> &[Complex64] {
        &self.psi
    }

    pub fn dx(&self) -> f64 {
        self.dx
    }

    pub fn density(&self) -> Vec<f64> {
        probability_density(&self.psi)
    }

    /// Σ|ψ|²·dx
    pub fn norm(&self) -> f64 {
        total_probability(&self.psi, self.dx)
    }

    /// ⟨x⟩ = Σ x|ψ|² / Σ|ψ|²
    pub fn mean_position(&self) -> f64 {
        let weight: f64 = self.psi.iter().map(|c| c.norm_sqr()).sum();
        if weight == 0.0 {
            return 0.0;
        }
        self.x
            .iter()
            .zip(self.psi.iter())
            .map(|(&x, c)| x * c.norm_sqr())
            .sum::<f64>()
            / weight
    }
}
