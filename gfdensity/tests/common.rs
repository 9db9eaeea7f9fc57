//! Common test utilities

#![allow(dead_code)]

use gfdensity::{GreenFunction, ImFreqMesh, Statistics, TailMoments};
use num_complex::Complex;

/// Complex digamma function ψ(z) for Re z > 0
///
/// Shifts z upward with ψ(z) = ψ(z+1) - 1/z until |z| ≥ 10, then uses the
/// asymptotic series.
pub fn digamma(mut z: Complex<f64>) -> Complex<f64> {
    let mut shift = Complex::new(0.0, 0.0);
    while z.norm() < 10.0 {
        shift -= 1.0 / z;
        z += 1.0;
    }
    let z2 = 1.0 / (z * z);
    let series = z.ln() - 0.5 / z
        - z2 * (1.0 / 12.0 - z2 * (1.0 / 120.0 - z2 * (1.0 / 252.0 - z2 * (1.0 / 240.0))));
    series + shift
}

/// Fermi function written with exponentials, independent of the library's tanh form
pub fn fermi(eps: f64, beta: f64) -> f64 {
    1.0 / ((beta * eps).exp() + 1.0)
}

/// Bose function
pub fn bose(eps: f64, beta: f64) -> f64 {
    1.0 / ((beta * eps).exp() - 1.0)
}

/// Scalar 1/(iωₙ - ε) on a full Matsubara mesh
pub fn single_pole_gf(beta: f64, statistics: Statistics, n_iw: usize, eps: f64) -> GreenFunction {
    let mesh = ImFreqMesh::new(beta, statistics, n_iw).unwrap();
    gfdensity::pole::single_pole_imfreq(mesh, eps).unwrap()
}

/// Exact moments 1, ε, ε² of a single pole
pub fn single_pole_moments(eps: f64) -> TailMoments {
    TailMoments::from_scalars(&[
        Complex::new(1.0, 0.0),
        Complex::new(eps, 0.0),
        Complex::new(eps * eps, 0.0),
    ])
    .unwrap()
}

/// Assert |a - b| < tol with a readable message
pub fn assert_close(a: Complex<f64>, b: Complex<f64>, tol: f64, what: &str) {
    assert!(
        (a - b).norm() < tol,
        "{}: got {}, expected {}, |diff| = {:e}",
        what,
        a,
        b,
        (a - b).norm()
    );
}

/// Two-level Hamiltonian H = U diag(ε₁, ε₂) U† with U a rotation by θ and a phase φ
pub struct TwoLevel {
    pub eps: [f64; 2],
    pub theta: f64,
    pub phi: f64,
}

impl TwoLevel {
    fn u(&self, i: usize, k: usize) -> Complex<f64> {
        let (c, s) = (self.theta.cos(), self.theta.sin());
        let phase = Complex::from_polar(1.0, self.phi);
        match (i, k) {
            (0, 0) => Complex::new(c, 0.0),
            (0, 1) => -s * phase.conj(),
            (1, 0) => s * phase,
            _ => Complex::new(c, 0.0),
        }
    }

    /// Σₖ U_ik f(εₖ) U*_jk
    pub fn apply<F: Fn(f64) -> Complex<f64>>(&self, i: usize, j: usize, f: F) -> Complex<f64> {
        (0..2)
            .map(|k| self.u(i, k) * f(self.eps[k]) * self.u(j, k).conj())
            .sum()
    }

    pub fn gf(&self, mesh: ImFreqMesh) -> GreenFunction {
        let beta = mesh.beta();
        GreenFunction::from_fn(mesh, gfdensity::TargetShape::Matrix(2, 2), |w, i, j| {
            let iw = mesh.freq(w).value_imaginary(beta);
            self.apply(i, j, |e| 1.0 / (iw - e))
        })
        .unwrap()
    }

    /// M₁ = 1, M₂ = H, M₃ = H²
    pub fn moments(&self) -> TailMoments {
        let m: Vec<gfdensity::DTensor<Complex<f64>, 2>> = (0..3)
            .map(|k| {
                gfdensity::DTensor::<Complex<f64>, 2>::from_fn([2, 2], |idx| {
                    self.apply(idx[0], idx[1], |e| Complex::new(e.powi(k), 0.0))
                })
            })
            .collect();
        TailMoments::new(m).unwrap()
    }

    pub fn density(&self, statistics: Statistics, beta: f64, i: usize, j: usize) -> Complex<f64> {
        self.apply(i, j, |e| Complex::new(gfdensity::single_pole_density(statistics, e, beta), 0.0))
    }
}
