//! Density from a real-frequency Green's function
//!
//! The spectral function A(ω) = i (G(ω) - G(ω)†) / 2π, which reduces to
//! -Im G(ω)/π for scalars, is integrated against the occupation weight
//!
//! density = ∫ A(ω) w(ω) dω,  w = n_F (fermions) or -n_B (bosons),
//!
//! by the trapezoidal rule over the sampled window. Spectral weight outside
//! the window is ignored.

use mdarray::DTensor;
use num_complex::Complex;
use num_traits::Zero;

use crate::error::{DensityError, Result};
use crate::gf::GreenFunction;
use crate::mesh::{Mesh, ReFreqMesh};
use crate::result::{Accuracy, DensityResult, DensityValue};
use crate::traits::Statistics;

fn refreq_mesh(gf: &GreenFunction) -> Result<&ReFreqMesh> {
    match gf.mesh() {
        Mesh::ReFreq(mesh) => Ok(mesh),
        other => Err(DensityError::UnsupportedMeshKind {
            found: other.kind(),
            expected: "refreq",
        }),
    }
}

/// A_ij(ω) at every mesh point, shape (n_points, d, d)
fn spectral_function(gf: &GreenFunction) -> DTensor<Complex<f64>, 3> {
    let (n_points, d1, d2) = *gf.data().shape();
    let i_over_2pi = Complex::new(0.0, 1.0 / (2.0 * std::f64::consts::PI));
    DTensor::<Complex<f64>, 3>::from_fn([n_points, d1, d2], |idx| {
        let (w, i, j) = (idx[0], idx[1], idx[2]);
        (gf.get(w, i, j) - gf.get(w, j, i).conj()) * i_over_2pi
    })
}

/// Trapezoid over the negative frequencies, clipping the segment that crosses ω = 0
fn integrate_zero_temperature(omegas: &[f64], a: &[Complex<f64>]) -> Complex<f64> {
    let mut sum = Complex::zero();
    for k in 0..omegas.len() - 1 {
        let (w0, w1) = (omegas[k], omegas[k + 1]);
        if w0 >= 0.0 {
            break;
        }
        if w1 <= 0.0 {
            sum += (a[k] + a[k + 1]) * (0.5 * (w1 - w0));
        } else {
            let a_zero = a[k] + (a[k + 1] - a[k]) * (-w0 / (w1 - w0));
            sum += (a[k] + a_zero) * (0.5 * -w0);
        }
    }
    sum
}

/// Trapezoid of A(ω) w(ω) at finite temperature
fn integrate_finite_temperature(
    omegas: &[f64],
    a: &[Complex<f64>],
    statistics: Statistics,
    beta: f64,
) -> Complex<f64> {
    let n = omegas.len();
    // A uniform grid can land on ω = 0 only up to rounding of omega_min + k δ
    let zero_tol = 1e-9 * (omegas[1] - omegas[0]);
    let f: Vec<Complex<f64>> = (0..n)
        .map(|k| {
            let omega = omegas[k];
            if statistics.is_bosonic() && omega.abs() <= zero_tol {
                // A(ω)(-n_B(ω)) → -A'(0)/β as ω → 0
                let (lo, hi) = (k.saturating_sub(1), (k + 1).min(n - 1));
                let slope = (a[hi] - a[lo]) / (omegas[hi] - omegas[lo]);
                -slope / beta
            } else {
                a[k] * statistics.pole_boundary_value(omega, beta)
            }
        })
        .collect();
    (0..n - 1)
        .map(|k| (f[k] + f[k + 1]) * (0.5 * (omegas[k + 1] - omegas[k])))
        .sum()
}

/// Density of a real-frequency Green's function
///
/// `beta = None` selects the zero-temperature limit w(ω) = θ(-ω), which is
/// only defined for fermions.
pub fn density_refreq(gf: &GreenFunction, beta: Option<f64>) -> Result<DensityResult> {
    let mesh = refreq_mesh(gf)?;
    let statistics = mesh.statistics();
    match beta {
        Some(b) if !(b.is_finite() && b > 0.0) => {
            return Err(DensityError::InvalidParameter(format!(
                "beta must be positive and finite, got {}",
                b
            )));
        }
        None if statistics.is_bosonic() => {
            return Err(DensityError::InvalidParameter(
                "zero temperature is not defined for a bosonic real-frequency mesh".to_string(),
            ));
        }
        _ => {}
    }
    let (d1, d2) = gf.dims();
    if d1 != d2 {
        return Err(DensityError::ShapeMismatch {
            context: "real-frequency spectral function",
            expected: (d1, d1),
            found: (d1, d2),
        });
    }
    gf.ensure_finite()?;

    let omegas: Vec<f64> = mesh.iter().collect();
    let spectral = spectral_function(gf);
    let last = omegas.len() - 1;

    let mut rho = DTensor::<Complex<f64>, 2>::from_elem([d1, d2], Complex::zero());
    let mut edge_weight: f64 = 0.0;
    for i in 0..d1 {
        for j in 0..d2 {
            let a: Vec<Complex<f64>> = (0..omegas.len()).map(|w| spectral[[w, i, j]]).collect();
            edge_weight = edge_weight.max(a[0].norm()).max(a[last].norm());
            rho[[i, j]] = match beta {
                Some(b) => integrate_finite_temperature(&omegas, &a, statistics, b),
                None => integrate_zero_temperature(&omegas, &a),
            };
        }
    }

    tracing::debug!(
        omega_min = mesh.omega_min(),
        omega_max = mesh.omega_max(),
        n_points = mesh.len(),
        beta = ?beta,
        edge_weight,
        "computed real-frequency density"
    );

    Ok(DensityResult::new(
        DensityValue::from_matrix(gf.target(), rho),
        Accuracy::Quadrature { edge_weight },
    ))
}
