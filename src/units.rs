//! Physical constants and unit systems.
//!
//! The spectral evolver takes ħ as an explicit argument, so both SI and
//! natural units are usable. SI values from CODATA 2018 / NIST.

/// Reduced Planck constant (J·s)
pub const HBAR: f64 = 1.054_571_817e-34;

/// Reduced Planck constant in natural units (ħ = 1)
pub const NATURAL_HBAR: f64 = 1.0;

/// Pi
pub const PI: f64 = std::f64::consts::PI;

/// Free-particle dispersion relation E(k) = ħ²k²/(2m).
#[inline]
pub fn free_particle_energy(k: f64, mass: f64, hbar: f64) -> f64 {
    hbar * hbar * k * k / (2.0 * mass)
}

/// Phase angle accumulated by mode k over time t: -E(k)·t/ħ = -ħk²t/(2m).
///
/// Written without the ħ²/ħ round trip so SI-scale ħ does not lose
/// precision.
#[inline]
pub fn free_particle_phase(k: f64, t: f64, mass: f64, hbar: f64) -> f64 {
    -hbar * k * k * t / (2.0 * mass)
}

// ─── Kani formal verification harnesses ─────────────────────────────────────
#[cfg(kani)]
mod kani_proofs {
    use super::*;

    /// Energy is never negative for positive mass.
    #[kani::proof]
    fn energy_non_negative() {
        let k: f64 = kani::any();
        let m: f64 = kani::any();
        kani::assume(k.is_finite() && k.abs() < 1e6);
        kani::assume(m > 1e-6 && m < 1e6);
        assert!(free_particle_energy(k, m, NATURAL_HBAR) >= 0.0);
    }

    /// Phase flips sign exactly under t → -t.
    #[kani::proof]
    fn phase_odd_in_time() {
        let k: f64 = kani::any();
        let t: f64 = kani::any();
        kani::assume(k.is_finite() && k.abs() < 1e3);
        kani::assume(t.is_finite() && t.abs() < 1e3);
        let fwd = free_particle_phase(k, t, 1.0, NATURAL_HBAR);
        let rev = free_particle_phase(k, -t, 1.0, NATURAL_HBAR);
        assert!(fwd == -rev);
    }
}
