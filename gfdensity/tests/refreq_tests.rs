use std::f64::consts::PI;

use gfdensity::pole::{lorentzian_refreq, lorentzian_retarded, lorentzian_spectral};
use gfdensity::{
    Accuracy, GreenFunction, ReFreqMesh, Statistics, TargetShape, density, density_refreq,
};
use num_complex::Complex;

mod common;
use common::digamma;

const OMEGA_MIN: f64 = -20.0;
const OMEGA_MAX: f64 = 20.0;
const N_OMEGA: usize = 8001;

/// Spectral weight of the Lorentzian below the window
fn lower_tail(eps: f64, gamma: f64) -> f64 {
    ((OMEGA_MIN - eps) / gamma).atan() / PI + 0.5
}

#[test]
fn test_lorentzian_zero_temperature() {
    let (eps, gamma) = (0.3, 0.5);
    let mesh = ReFreqMesh::new(OMEGA_MIN, OMEGA_MAX, N_OMEGA).unwrap();
    let gf = lorentzian_refreq(mesh, eps, gamma).unwrap();

    let n = density_refreq(&gf, None).unwrap().as_scalar().unwrap();
    let expected = ((-eps / gamma).atan() - ((OMEGA_MIN - eps) / gamma).atan()) / PI;
    assert!((n.re - expected).abs() < 1e-5, "n = {}, expected {}", n.re, expected);
    assert!(n.im.abs() < 1e-14);
}

#[test]
fn test_lorentzian_zero_temperature_off_grid_fermi_level() {
    // 8000 points: ω = 0 falls between two grid points
    let (eps, gamma) = (-0.2, 0.4);
    let mesh = ReFreqMesh::new(OMEGA_MIN, OMEGA_MAX, 8000).unwrap();
    let gf = lorentzian_refreq(mesh, eps, gamma).unwrap();

    let n = density_refreq(&gf, None).unwrap().as_scalar().unwrap();
    let expected = ((-eps / gamma).atan() - ((OMEGA_MIN - eps) / gamma).atan()) / PI;
    assert!((n.re - expected).abs() < 1e-5, "n = {}, expected {}", n.re, expected);
}

#[test]
fn test_lorentzian_finite_temperature() {
    let (beta, eps, gamma) = (10.0, 0.3, 0.5);
    let mesh = ReFreqMesh::new(OMEGA_MIN, OMEGA_MAX, N_OMEGA)
        .unwrap()
        .with_beta(beta)
        .unwrap();
    let gf = lorentzian_refreq(mesh, eps, gamma).unwrap();

    // ∫ A(ω) n_F(ω) dω over the real line = 1/2 - Im ψ(1/2 + β(γ + iε)/2π)/π
    let z = Complex::new(0.5 + beta * gamma / (2.0 * PI), beta * eps / (2.0 * PI));
    let full_line = 0.5 - digamma(z).im / PI;
    let expected = full_line - lower_tail(eps, gamma);

    let result = density(&gf, None).unwrap();
    let n = result.as_scalar().unwrap();
    assert!((n.re - expected).abs() < 1e-5, "n = {}, expected {}", n.re, expected);

    match result.accuracy() {
        Accuracy::Quadrature { edge_weight } => {
            let a_edge = lorentzian_spectral(OMEGA_MIN, eps, gamma)
                .max(lorentzian_spectral(OMEGA_MAX, eps, gamma));
            assert!((edge_weight - a_edge).abs() < 1e-10, "edge weight {}", edge_weight);
        }
        other => panic!("unexpected accuracy {:?}", other),
    }
}

#[test]
fn test_low_temperature_limit_approaches_zero_temperature() {
    let (eps, gamma) = (0.3, 0.5);
    let mesh = ReFreqMesh::new(OMEGA_MIN, OMEGA_MAX, N_OMEGA).unwrap();
    let gf = lorentzian_refreq(mesh, eps, gamma).unwrap();
    let n_zero = density_refreq(&gf, None).unwrap().as_scalar().unwrap();
    let n_cold = density_refreq(&gf, Some(1000.0)).unwrap().as_scalar().unwrap();
    assert!((n_zero.re - n_cold.re).abs() < 1e-4);
}

#[test]
fn test_digamma_reference() {
    // ψ(1) = -γ_E and ψ(1/2 + iy) has Im = (π/2) tanh(πy)
    let euler_gamma = 0.577_215_664_901_532_9;
    assert!((digamma(Complex::new(1.0, 0.0)).re + euler_gamma).abs() < 1e-12);
    let y = 0.7;
    let im = digamma(Complex::new(0.5, y)).im;
    assert!((im - 0.5 * PI * (PI * y).tanh()).abs() < 1e-12);
}

#[test]
fn test_bosonic_mesh_needs_temperature() {
    let mesh = ReFreqMesh::new(-1.0, 1.0, 11)
        .unwrap()
        .with_statistics(Statistics::Bosonic);
    // Odd spectral function A(ω) = A_L(ω; 0.5) - A_L(ω; -0.5), vanishing at ω = 0
    let gf = GreenFunction::from_fn(mesh, TargetShape::Scalar, |w, _, _| {
        let omega = mesh.omega(w);
        lorentzian_retarded(omega, 0.5, 0.1) + lorentzian_retarded(omega, -0.5, 0.1).conj()
    })
    .unwrap();
    assert!(density(&gf, None).is_err());
    let n = density_refreq(&gf, Some(2.0)).unwrap().as_scalar().unwrap();
    assert!(n.re.is_finite());
}
