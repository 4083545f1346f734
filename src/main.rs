//! Time-reversal experiment: prints a summary and optionally writes CSV
//! series for plotting.
//!
//!   time-reversal-sim [OUTPUT_DIR]
//!
//! With OUTPUT_DIR, writes `series.csv` and `density.csv` there.
//! Set `RUST_LOG=debug` for per-stage logging.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

use log::info;

use time_reversal_sim::config::ReversalConfig;
use time_reversal_sim::entropy::max_entropy;
use time_reversal_sim::pipeline;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = ReversalConfig::default();
    let report = pipeline::run(&config)?;
    let c = &config.classical;

    println!(
        "━━━ Classical: {} free particles, T = {}, dt = {} ━━━",
        c.n_particles, c.total_time, c.dt
    );
    println!();
    println!("  {:>8}  {:>10}  {:>10}  {:>10}  {:>10}", "t", "S fwd", "S rev", "χ fwd", "χ rev");
    println!("  {:─>8}  {:─>10}  {:─>10}  {:─>10}  {:─>10}", "", "", "", "", "");
    let stride = (report.time.len() / 10).max(1);
    for i in (0..report.time.len()).step_by(stride) {
        println!(
            "  {:>8.1}  {:>10.4}  {:>10.4}  {:>10.4}  {:>10.4}",
            report.time[i],
            report.forward.entropy[i],
            report.reverse.entropy[i],
            report.forward.chaos[i],
            report.reverse.chaos[i]
        );
    }
    println!();
    println!(
        "  Entropy bound ln(min(N, G²)) = {:.4}",
        max_entropy(c.n_particles, config.grid_size)
    );
    println!(
        "  ΔS fwd = {:+.4}   ΔS rev = {:+.4}",
        report.forward.entropy_change(),
        report.reverse.entropy_change()
    );
    println!(
        "  Δχ fwd = {:+.4}   Δχ rev = {:+.4}",
        report.forward.chaos_change(),
        report.reverse.chaos_change()
    );
    println!();

    let w = &config.wave;
    println!(
        "━━━ Quantum: Gaussian packet x₀ = {}, k₀ = {}, σ = {}, t = ±{} ━━━",
        w.x0, w.k0, w.sigma, w.t
    );
    println!();
    println!("  Norm  ψ₀:      {:.12}", report.norm_initial);
    println!("  Norm  ψ(+t):   {:.12}", report.norm_forward);
    println!("  Norm  ψ(-t):   {:.12}", report.norm_reverse);
    println!("  Round trip max|U(-t)U(t)ψ₀ - ψ₀| = {:.3e}", report.round_trip_error);
    println!("  Mirror     max|ρ(+t) - ρ(-t)|     = {:.3e}", report.mirror_error);

    if let Some(dir) = std::env::args().nth(1).map(PathBuf::from) {
        fs::create_dir_all(&dir)?;
        let series = dir.join("series.csv");
        report.write_series_csv(BufWriter::new(File::create(&series)?))?;
        let density = dir.join("density.csv");
        report.write_density_csv(BufWriter::new(File::create(&density)?))?;
        info!("wrote {} and {}", series.display(), density.display());
    }

    Ok(())
}
