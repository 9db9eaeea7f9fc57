//! Density from a Matsubara-frequency Green's function
//!
//! The sum (1/β) Σₙ G(iωₙ) e^{iωₙ0⁺} converges only like 1/ωₙ. The known
//! high-frequency behaviour is therefore split off as three simple poles
//!
//! T(iω) = Σᵢ aᵢ / (iω - bᵢ)
//!
//! whose amplitudes reproduce the moments M₁…M₃ exactly. The remainder
//! G - T decays like 1/ωₙ⁴ and is summed over the mesh, while the pole sums
//! are evaluated in closed form.

use mdarray::DTensor;
use num_complex::Complex;
use num_traits::Zero;

use crate::error::{DensityError, Result};
use crate::gf::GreenFunction;
use crate::result::{DensityResult, DensityValue};
use crate::tail::{MAX_MOMENTS, TailFitOptions, TailMoments, imfreq_mesh, resolve_moments};
use crate::traits::Statistics;

/// Pole positions of the analytic tail
///
/// Bosonic nodes avoid b = 0 where the pole would sit on iω₀ = 0.
fn tail_nodes(statistics: Statistics) -> [f64; MAX_MOMENTS] {
    match statistics {
        Statistics::Fermionic => [0.0, 1.0, -1.0],
        Statistics::Bosonic => [1.0, -1.0, 2.0],
    }
}

/// Amplitudes aᵢ with Σᵢ aᵢ bᵢ^{k-1} = Mₖ for k = 1, 2, 3
fn tail_amplitudes(
    nodes: &[f64; MAX_MOMENTS],
    m: [Complex<f64>; MAX_MOMENTS],
) -> [Complex<f64>; MAX_MOMENTS] {
    std::array::from_fn(|i| {
        let bi = nodes[i];
        let bj = nodes[(i + 1) % MAX_MOMENTS];
        let bk = nodes[(i + 2) % MAX_MOMENTS];
        (m[2] - m[1] * (bj + bk) + m[0] * (bj * bk)) / ((bi - bj) * (bi - bk))
    })
}

/// Density of a Matsubara Green's function
///
/// With `moments = None` the tail moments are fitted with default options.
/// Fewer than three supplied moments give a result flagged as degraded.
///
/// # Examples
/// ```
/// use gfdensity::{GreenFunction, ImFreqMesh, Statistics, TailMoments, density_imfreq};
/// use num_complex::Complex;
///
/// let (beta, eps) = (10.0, 0.5);
/// let mesh = ImFreqMesh::new(beta, Statistics::Fermionic, 1000).unwrap();
/// let values: Vec<_> = mesh.iter().map(|f| 1.0 / (f.value_imaginary(beta) - eps)).collect();
/// let gf = GreenFunction::scalar(mesh, &values).unwrap();
///
/// let moments = TailMoments::from_scalars(&[
///     Complex::new(1.0, 0.0),
///     Complex::new(eps, 0.0),
///     Complex::new(eps * eps, 0.0),
/// ]).unwrap();
/// let n = density_imfreq(&gf, Some(&moments)).unwrap().as_scalar().unwrap();
/// assert!((n.re - 1.0 / ((beta * eps).exp() + 1.0)).abs() < 1e-8);
/// ```
pub fn density_imfreq(gf: &GreenFunction, moments: Option<&TailMoments>) -> Result<DensityResult> {
    density_imfreq_with(gf, moments, &TailFitOptions::default())
}

/// [`density_imfreq`] with explicit tail-fit options
pub fn density_imfreq_with(
    gf: &GreenFunction,
    moments: Option<&TailMoments>,
    options: &TailFitOptions,
) -> Result<DensityResult> {
    let mesh = imfreq_mesh(gf)?;
    gf.ensure_finite()?;
    let (d1, d2) = gf.dims();
    // The negative half of a positive-only mesh is G(iω)†, which needs a square target
    if mesh.is_positive_only() && d1 != d2 {
        return Err(DensityError::ShapeMismatch {
            context: "positive-only Matsubara mesh",
            expected: (d1, d1),
            found: (d1, d2),
        });
    }
    let resolved = resolve_moments(gf, moments, options)?;

    let beta = mesh.beta();
    let statistics = mesh.statistics();
    let nodes = tail_nodes(statistics);
    let boundary: [f64; MAX_MOMENTS] =
        std::array::from_fn(|i| statistics.pole_boundary_value(nodes[i], beta));

    let amplitudes: Vec<[Complex<f64>; MAX_MOMENTS]> = (0..d1 * d2)
        .map(|c| {
            let (i, j) = (c / d2, c % d2);
            tail_amplitudes(&nodes, std::array::from_fn(|k| resolved.moments[k][[i, j]]))
        })
        .collect();
    let tail = |a: &[Complex<f64>; MAX_MOMENTS], iw: Complex<f64>| -> Complex<f64> {
        a.iter().zip(&nodes).map(|(&ai, &bi)| ai / (iw - bi)).sum()
    };

    let iws: Vec<Complex<f64>> = mesh.iter().map(|f| f.value_imaginary(beta)).collect();
    let positive_only = mesh.is_positive_only();

    let mut rho = DTensor::<Complex<f64>, 2>::from_elem([d1, d2], Complex::zero());
    for i in 0..d1 {
        for j in 0..d2 {
            let a = &amplitudes[i * d2 + j];
            let mut residual = Complex::<f64>::zero();
            for (w, &iw) in iws.iter().enumerate() {
                residual += gf.get(w, i, j) - tail(a, iw);
            }
            if positive_only {
                // G_ij(-iω) = conj(G_ji(iω)); the bosonic zero frequency is its own mirror
                for (w, &iw) in iws.iter().enumerate() {
                    if iw.im == 0.0 {
                        continue;
                    }
                    residual += gf.get(w, j, i).conj() - tail(a, -iw);
                }
            }

            let tail_sum: Complex<f64> = a.iter().zip(&boundary).map(|(&ai, &ni)| ai * ni).sum();
            rho[[i, j]] = residual / beta + tail_sum;
        }
    }

    tracing::debug!(
        beta,
        statistics = %statistics,
        n_points = mesh.len(),
        positive_only,
        accuracy = ?resolved.accuracy,
        "computed Matsubara density"
    );

    Ok(DensityResult::new(
        DensityValue::from_matrix(gf.target(), rho),
        resolved.accuracy,
    ))
}
