//! Density from Legendre coefficients
//!
//! The coefficients Gₗ expand the reversed-time function on [0, β],
//!
//! G(-τ) = Σₗ (2l+1) Gₗ Pₗ(x),  x = 2τ/β - 1,
//!
//! so the density G(0⁻) is the expansion at x = -1, where Pₗ(-1) = (-1)ˡ.

use mdarray::DTensor;
use num_complex::Complex;
use num_traits::Zero;

use crate::error::{DensityError, Result};
use crate::gauss::{legendre, legendre_vandermonde};
use crate::gf::{GreenFunction, TargetShape};
use crate::mesh::{LegendreMesh, Mesh};
use crate::result::{Accuracy, DensityResult, DensityValue};

fn legendre_mesh(gf: &GreenFunction) -> Result<&LegendreMesh> {
    match gf.mesh() {
        Mesh::Legendre(mesh) => Ok(mesh),
        other => Err(DensityError::UnsupportedMeshKind {
            found: other.kind(),
            expected: "legendre",
        }),
    }
}

/// Σₗ (2l+1) Gₗ pₗ for every matrix entry
fn contract(gf: &GreenFunction, p: impl Fn(usize) -> f64) -> DTensor<Complex<f64>, 2> {
    let (n_l, d1, d2) = *gf.data().shape();
    let mut out = DTensor::<Complex<f64>, 2>::from_elem([d1, d2], Complex::zero());
    for l in 0..n_l {
        let factor = (2 * l + 1) as f64 * p(l);
        for i in 0..d1 {
            for j in 0..d2 {
                out[[i, j]] += gf.get(l, i, j) * factor;
            }
        }
    }
    out
}

/// Density of a Legendre-coefficient Green's function: Σₗ Gₗ (2l+1)(-1)ˡ
///
/// The result is exact for the given truncation; no tail correction applies.
pub fn density_legendre(gf: &GreenFunction) -> Result<DensityResult> {
    let mesh = legendre_mesh(gf)?;
    gf.ensure_finite()?;

    let rho = contract(gf, |l| if l % 2 == 0 { 1.0 } else { -1.0 });

    tracing::debug!(
        beta = mesh.beta(),
        statistics = %mesh.statistics(),
        n_l = mesh.len(),
        "computed Legendre density"
    );
    Ok(DensityResult::new(
        DensityValue::from_matrix(gf.target(), rho),
        Accuracy::Exact,
    ))
}

/// Evaluate G(-τ) from the Legendre coefficients, τ ∈ [0, β]
///
/// `legendre_value_at(gf, 0.0)` equals the density.
pub fn legendre_value_at(gf: &GreenFunction, tau: f64) -> Result<DensityValue> {
    let mesh = legendre_mesh(gf)?;
    let beta = mesh.beta();
    if !(0.0..=beta).contains(&tau) {
        return Err(DensityError::InvalidParameter(format!(
            "tau must lie in [0, beta] = [0, {}], got {}",
            beta, tau
        )));
    }

    let x = 2.0 * tau / beta - 1.0;
    let p = legendre_vandermonde(&[x], mesh.len() - 1);
    Ok(DensityValue::from_matrix(
        gf.target(),
        contract(gf, |l| p[[0, l]]),
    ))
}

/// Legendre coefficients of a reversed-time function
///
/// `f(τ, i, j)` must return G_ij(-τ) for τ ∈ (0, β). The coefficients
/// Gₗ = ½ ∫₋₁¹ Pₗ(x) G(-τ(x)) dx are computed with an `n_quad`-point
/// Gauss-Legendre rule, which is exact for polynomial integrands up to
/// degree 2 `n_quad` - 1.
pub fn project_legendre<F>(
    mesh: LegendreMesh,
    target: TargetShape,
    n_quad: usize,
    f: F,
) -> Result<GreenFunction>
where
    F: Fn(f64, usize, usize) -> Complex<f64>,
{
    if n_quad == 0 {
        return Err(DensityError::InvalidParameter(
            "projection needs at least one quadrature point".to_string(),
        ));
    }
    let (d1, d2) = target.dims();
    let beta = mesh.beta();
    let n_l = mesh.len();

    let rule = legendre(n_quad);
    let p = legendre_vandermonde(&rule.x, n_l - 1);
    // Same nodes on the τ axis; Gₗ = (1/β) ∫₀^β Pₗ(x(τ)) G(-τ) dτ
    let tau_rule = rule.reseat(0.0, beta);
    let samples = DTensor::<Complex<f64>, 3>::from_fn([n_quad, d1, d2], |idx| {
        f(tau_rule.x[idx[0]], idx[1], idx[2])
    });

    let gf = GreenFunction::from_fn(mesh, target, |l, i, j| {
        let integral: Complex<f64> = (0..n_quad)
            .map(|q| samples[[q, i, j]] * (tau_rule.w[q] * p[[q, l]]))
            .sum();
        integral / beta
    })?;
    gf.ensure_finite()?;
    Ok(gf)
}
