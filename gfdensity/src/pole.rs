//! Analytic single-pole Green's functions
//!
//! A single level at energy ε has G(iωₙ) = 1/(iωₙ - ε) and density
//! n_F(ε) for fermions or -n_B(ε) for bosons. These closed forms serve as
//! references in tests and demos, in every supported representation.

use num_complex::Complex;

use crate::error::Result;
use crate::freq::MatsubaraFreq;
use crate::gf::{GreenFunction, TargetShape};
use crate::legendre::project_legendre;
use crate::mesh::{ImFreqMesh, LegendreMesh, ReFreqMesh};
use crate::traits::Statistics;

/// Single-pole Green's function at imaginary time τ ∈ [-β, β]
///
/// For τ ∈ [0, β]: G(τ) = -e^{-ωτ}(1 - n(ω)) for fermions and
/// -e^{-ωτ}(1 + n(ω)) for bosons. Negative τ is mapped to τ + β using
/// G(τ + β) = ∓G(τ) (fermions/bosons). Overflow-free for large |βω|.
///
/// # Example
/// ```
/// use gfdensity::pole::gtau_single_pole;
/// use gfdensity::Statistics;
///
/// let (beta, omega) = (1.0, 5.0);
/// let g = gtau_single_pole(Statistics::Fermionic, 0.5 * beta, omega, beta);
/// assert!(g < 0.0);
/// ```
pub fn gtau_single_pole(statistics: Statistics, tau: f64, omega: f64, beta: f64) -> f64 {
    // Normalize τ to [0, β] and track sign from (anti-)periodicity
    let (tau, sign) = if tau < 0.0 {
        (tau + beta, statistics.sign())
    } else {
        (tau, 1.0)
    };

    let xi = -statistics.sign(); // +1 fermions, -1 bosons
    let value = if omega >= 0.0 {
        // e^{-ωτ} / (1 + ξ e^{-βω})
        (-omega * tau).exp() / (1.0 + xi * (-beta * omega).exp())
    } else {
        // e^{ω(β-τ)} / (e^{βω} + ξ)
        (omega * (beta - tau)).exp() / ((beta * omega).exp() + xi)
    };
    -sign * value
}

/// Single-pole Green's function at a Matsubara frequency: 1/(iωₙ - ω)
pub fn giwn_single_pole(matsubara_freq: &MatsubaraFreq, omega: f64, beta: f64) -> Complex<f64> {
    let wn = matsubara_freq.value(beta);
    let denominator = Complex::new(0.0, 1.0) * wn - Complex::new(omega, 0.0);
    Complex::new(1.0, 0.0) / denominator
}

/// Retarded Green's function of a Lorentzian level: 1/(ω - ε + iγ)
pub fn lorentzian_retarded(omega: f64, epsilon: f64, gamma: f64) -> Complex<f64> {
    Complex::new(1.0, 0.0) / Complex::new(omega - epsilon, gamma)
}

/// Spectral function of a Lorentzian level: (γ/π) / ((ω - ε)² + γ²)
pub fn lorentzian_spectral(omega: f64, epsilon: f64, gamma: f64) -> f64 {
    gamma / std::f64::consts::PI / ((omega - epsilon).powi(2) + gamma * gamma)
}

/// Exact density of a single level at energy ε
pub fn single_pole_density(statistics: Statistics, epsilon: f64, beta: f64) -> f64 {
    statistics.pole_boundary_value(epsilon, beta)
}

/// Scalar single-pole Green's function on a Matsubara mesh
pub fn single_pole_imfreq(mesh: ImFreqMesh, epsilon: f64) -> Result<GreenFunction> {
    let beta = mesh.beta();
    let values: Vec<Complex<f64>> = mesh
        .iter()
        .map(|f| giwn_single_pole(&f, epsilon, beta))
        .collect();
    GreenFunction::scalar(mesh, &values)
}

/// Scalar single-pole Green's function as Legendre coefficients
///
/// The coefficients are projected from G(-τ) with an `n_quad`-point rule.
pub fn single_pole_legendre(
    mesh: LegendreMesh,
    epsilon: f64,
    n_quad: usize,
) -> Result<GreenFunction> {
    let (beta, statistics) = (mesh.beta(), mesh.statistics());
    project_legendre(mesh, TargetShape::Scalar, n_quad, |tau, _, _| {
        Complex::new(gtau_single_pole(statistics, -tau, epsilon, beta), 0.0)
    })
}

/// Scalar Lorentzian level on a real-frequency mesh
pub fn lorentzian_refreq(mesh: ReFreqMesh, epsilon: f64, gamma: f64) -> Result<GreenFunction> {
    let values: Vec<Complex<f64>> = mesh
        .iter()
        .map(|omega| lorentzian_retarded(omega, epsilon, gamma))
        .collect();
    GreenFunction::scalar(mesh, &values)
}
