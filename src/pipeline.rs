//! End-to-end experiment: classical run, diagnostics, quantum evolution.
//!
//! ```text
//! ClassicalConfig ─▶ simulate ─┬─▶ forward  ─┬─▶ entropy
//!                              │             └─▶ chaos
//!                              └─▶ reverse  ─┬─▶ entropy
//!                                            └─▶ chaos
//! WaveConfig ─▶ ψ₀ ─┬─▶ ψ(+t) ─▶ ψ(+t-t)   (round-trip check)
//!                   └─▶ ψ(-t)
//! ```
//!
//! Independent branches run on the rayon pool when the `parallel` feature
//! is enabled, sequentially otherwise. Output is identical either way.

use std::io::{self, Write};

use log::{debug, info};

use crate::chaos::{compute_chaos, ChaosSeries};
use crate::classical::{self, Trajectory};
use crate::config::{ReversalConfig, WaveConfig};
use crate::entropy::{compute_entropy_with_extent, EntropySeries};
use crate::error::Result;
use crate::wave::{max_abs_diff, WavePacket};

#[cfg(feature = "parallel")]
fn join<A, B, RA, RB>(a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA + Send,
    B: FnOnce() -> RB + Send,
    RA: Send,
    RB: Send,
{
    rayon::join(a, b)
}

#[cfg(not(feature = "parallel"))]
fn join<A, B, RA, RB>(a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA,
    B: FnOnce() -> RB,
{
    (a(), b())
}

/// Entropy and chaos series for one time direction.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionSeries {
    pub entropy: EntropySeries,
    pub chaos: ChaosSeries,
}

impl DirectionSeries {
    fn analyse(trajectory: &Trajectory, grid_size: usize, extent: f64) -> Result<Self> {
        let (entropy, chaos) = join(
            || compute_entropy_with_extent(trajectory, grid_size, extent),
            || compute_chaos(trajectory),
        );
        Ok(Self {
            entropy: entropy?,
            chaos: chaos?,
        })
    }

    /// S(end) - S(start); zero for an empty run.
    pub fn entropy_change(&self) -> f64 {
        match (self.entropy.first(), self.entropy.last()) {
            (Some(a), Some(b)) => b - a,
            _ => 0.0,
        }
    }

    /// χ(end) - χ(start); zero for an empty run.
    pub fn chaos_change(&self) -> f64 {
        match (self.chaos.first(), self.chaos.last()) {
            (Some(a), Some(b)) => b - a,
            _ => 0.0,
        }
    }
}

/// Everything the rendering side needs, plus symmetry diagnostics.
#[derive(Debug, Clone)]
pub struct ReversalReport {
    pub config: ReversalConfig,
    /// step · dt for each recorded step
    pub time: Vec<f64>,
    pub forward: DirectionSeries,
    pub reverse: DirectionSeries,
    /// Position grid of the wave packet
    pub x: Vec<f64>,
    pub density_initial: Vec<f64>,
    /// |ψ(x, +t)|²
    pub density_forward: Vec<f64>,
    /// |ψ(x, -t)|²
    pub density_reverse: Vec<f64>,
    pub norm_initial: f64,
    pub norm_forward: f64,
    pub norm_reverse: f64,
    /// max |U(-t)U(t)ψ₀ - ψ₀|
    pub round_trip_error: f64,
    /// max |ρ(+t) - ρ(-t)|; nonzero whenever k₀ ≠ 0
    pub mirror_error: f64,
}

struct QuantumOutcome {
    initial: WavePacket,
    forward: WavePacket,
    reverse: WavePacket,
    round_trip_error: f64,
}

fn run_quantum(wave: &WaveConfig) -> Result<QuantumOutcome> {
    let initial = WavePacket::gaussian(wave)?;
    let (forward, reverse) = join(
        || initial.evolve(wave.t, wave.mass, wave.hbar),
        || initial.evolve(-wave.t, wave.mass, wave.hbar),
    );
    let (forward, reverse) = (forward?, reverse?);
    let restored = forward.evolve(-wave.t, wave.mass, wave.hbar)?;
    let round_trip_error = max_abs_diff(initial.amplitudes(), restored.amplitudes());
    debug!("spectral round-trip error at t = ±{}: {:.3e}", wave.t, round_trip_error);

    Ok(QuantumOutcome {
        initial,
        forward,
        reverse,
        round_trip_error,
    })
}

fn run_classical(config: &ReversalConfig) -> Result<(DirectionSeries, DirectionSeries)> {
    let run = classical::simulate(&config.classical)?;
    let extent = config.classical.domain_extent;
    let (forward, reverse) = join(
        || DirectionSeries::analyse(&run.forward, config.grid_size, extent),
        || DirectionSeries::analyse(&run.reverse, config.grid_size, extent),
    );
    Ok((forward?, reverse?))
}

/// Run the full experiment.
pub fn run(config: &ReversalConfig) -> Result<ReversalReport> {
    config.validate()?;
    info!(
        "time-reversal run: N = {}, T = {}, dt = {}, grid = {}, wave points = {}",
        config.classical.n_particles,
        config.classical.total_time,
        config.classical.dt,
        config.grid_size,
        config.wave.points
    );

    let (classical, quantum) = join(|| run_classical(config), || run_quantum(&config.wave));
    let (forward, reverse) = classical?;
    let quantum = quantum?;

    let density_forward = quantum.forward.density();
    let density_reverse = quantum.reverse.density();
    let mirror_error = density_forward
        .iter()
        .zip(density_reverse.iter())
        .map(|(a, b)| (a - b).abs())
        .fold(0.0_f64, f64::max);

    let report = ReversalReport {
        config: config.clone(),
        time: config.classical.time_axis(),
        forward,
        reverse,
        x: quantum.initial.positions().to_vec(),
        density_initial: quantum.initial.density(),
        density_forward,
        density_reverse,
        norm_initial: quantum.initial.norm(),
        norm_forward: quantum.forward.norm(),
        norm_reverse: quantum.reverse.norm(),
        round_trip_error: quantum.round_trip_error,
        mirror_error,
    };

    info!(
        "entropy change fwd {:+.4} rev {:+.4}; round-trip error {:.3e}",
        report.forward.entropy_change(),
        report.reverse.entropy_change(),
        report.round_trip_error
    );
    Ok(report)
}

impl ReversalReport {
    /// Largest relative deviation of the evolved norms from the initial one.
    pub fn norm_drift(&self) -> f64 {
        let n0 = self.norm_initial;
        if n0 == 0.0 {
            return 0.0;
        }
        ((self.norm_forward - n0).abs()).max((self.norm_reverse - n0).abs()) / n0
    }

    /// `time,entropy_forward,entropy_reverse,chaos_forward,chaos_reverse`
    pub fn write_series_csv<W: Write>(&self, mut w: W) -> io::Result<()> {
        writeln!(w, "time,entropy_forward,entropy_reverse,chaos_forward,chaos_reverse")?;
        for (i, t) in self.time.iter().enumerate() {
            writeln!(
                w,
                "{},{},{},{},{}",
                t,
                self.forward.entropy[i],
                self.reverse.entropy[i],
                self.forward.chaos[i],
                self.reverse.chaos[i]
            )?;
        }
        Ok(())
    }

    /// `x,density_initial,density_forward,density_reverse`
    pub fn write_density_csv<W: Write>(&self, mut w: W) -> io::Result<()> {
        writeln!(w, "x,density_initial,density_forward,density_reverse")?;
        for (i, x) in self.x.iter().enumerate() {
            writeln!(
                w,
                "{},{},{},{}",
                x, self.density_initial[i], self.density_forward[i], self.density_reverse[i]
            )?;
        }
        Ok(())
    }
}
