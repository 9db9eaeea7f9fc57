//! High-frequency tail moments
//!
//! A Matsubara Green's function behaves as
//!
//! G(iωₙ) ≈ M₁/(iωₙ) + M₂/(iωₙ)² + M₃/(iωₙ)³ + …
//!
//! for large |ωₙ|. This module holds the moments M₁…M₃, validates
//! caller-supplied ones against a Green's function, and estimates missing
//! ones by a least-squares fit to the outermost frequencies of the mesh.

use mdarray::DTensor;
use num_complex::Complex;
use num_traits::Zero;

use crate::error::{DensityError, Result};
use crate::fitter::ComplexMatrixFitter;
use crate::freq::MatsubaraFreq;
use crate::gf::{GreenFunction, ensure_finite};
use crate::mesh::{ImFreqMesh, Mesh};
use crate::result::Accuracy;

/// Largest moment order used by the tail correction
pub const MAX_MOMENTS: usize = 3;

/// Ordered tail moments M₁, M₂, … (at most three), all of one shape
#[derive(Debug, Clone, Default)]
pub struct TailMoments {
    moments: Vec<DTensor<Complex<f64>, 2>>,
}

impl TailMoments {
    /// Moments from matrices, lowest order first
    ///
    /// Fails with [`DensityError::TooManyMoments`] for more than three matrices
    /// and with [`DensityError::ShapeMismatch`] if their shapes differ.
    pub fn new(moments: Vec<DTensor<Complex<f64>, 2>>) -> Result<Self> {
        if moments.len() > MAX_MOMENTS {
            return Err(DensityError::TooManyMoments(moments.len()));
        }
        if let Some(first) = moments.first() {
            let expected = *first.shape();
            for m in &moments[1..] {
                if *m.shape() != expected {
                    return Err(DensityError::ShapeMismatch {
                        context: "tail moments",
                        expected,
                        found: *m.shape(),
                    });
                }
            }
        }
        Ok(Self { moments })
    }

    /// Moments of a scalar Green's function
    pub fn from_scalars(moments: &[Complex<f64>]) -> Result<Self> {
        Self::new(
            moments
                .iter()
                .map(|&m| DTensor::<Complex<f64>, 2>::from_elem([1, 1], m))
                .collect(),
        )
    }

    /// No known moments
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of supplied orders
    pub fn len(&self) -> usize {
        self.moments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moments.is_empty()
    }

    /// Moment of the given order (1-based), if supplied
    pub fn order(&self, order: usize) -> Option<&DTensor<Complex<f64>, 2>> {
        order.checked_sub(1).and_then(|k| self.moments.get(k))
    }

    pub fn iter(&self) -> impl Iterator<Item = &DTensor<Complex<f64>, 2>> {
        self.moments.iter()
    }

    /// Matrix dimensions shared by all moments
    pub fn dims(&self) -> Option<(usize, usize)> {
        self.moments.first().map(|m| *m.shape())
    }

    /// Check shapes against `(d1, d2)` and reject non-finite entries
    pub(crate) fn validate(&self, dims: (usize, usize)) -> Result<()> {
        for m in &self.moments {
            if *m.shape() != dims {
                return Err(DensityError::ShapeMismatch {
                    context: "tail moments",
                    expected: dims,
                    found: *m.shape(),
                });
            }
        }
        ensure_finite(self.moments.iter().flat_map(|m| m.iter()), "tail moments")
    }

    /// All three orders, missing ones filled with zero matrices
    pub(crate) fn padded(&self, dims: (usize, usize)) -> [DTensor<Complex<f64>, 2>; MAX_MOMENTS] {
        let (d1, d2) = dims;
        std::array::from_fn(|k| match self.moments.get(k) {
            Some(m) => m.clone(),
            None => DTensor::<Complex<f64>, 2>::from_elem([d1, d2], Complex::zero()),
        })
    }
}

/// Options of the least-squares tail fit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TailFitOptions {
    /// Fraction of the positive frequencies, counted from the top, used for the fit
    pub tail_fraction: f64,
    /// Maximum number of fitted frequencies per sign
    pub n_tail_max: usize,
    /// Highest power of 1/(iωₙ) in the fitted expansion
    pub expansion_order: usize,
    /// Fit residual above which a warning is logged
    pub max_fit_error: f64,
}

impl Default for TailFitOptions {
    fn default() -> Self {
        Self {
            tail_fraction: 0.2,
            n_tail_max: 30,
            expansion_order: 6,
            max_fit_error: 1e-2,
        }
    }
}

impl TailFitOptions {
    pub fn with_tail_fraction(mut self, tail_fraction: f64) -> Self {
        self.tail_fraction = tail_fraction;
        self
    }

    pub fn with_n_tail_max(mut self, n_tail_max: usize) -> Self {
        self.n_tail_max = n_tail_max;
        self
    }

    pub fn with_expansion_order(mut self, expansion_order: usize) -> Self {
        self.expansion_order = expansion_order;
        self
    }

    pub fn with_max_fit_error(mut self, max_fit_error: f64) -> Self {
        self.max_fit_error = max_fit_error;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.tail_fraction > 0.0 && self.tail_fraction <= 1.0) {
            return Err(DensityError::InvalidParameter(format!(
                "tail_fraction must lie in (0, 1], got {}",
                self.tail_fraction
            )));
        }
        if self.n_tail_max == 0 {
            return Err(DensityError::InvalidParameter(
                "n_tail_max must be at least 1".to_string(),
            ));
        }
        if !(MAX_MOMENTS..=16).contains(&self.expansion_order) {
            return Err(DensityError::InvalidParameter(format!(
                "expansion_order must lie in [{}, 16], got {}",
                MAX_MOMENTS, self.expansion_order
            )));
        }
        Ok(())
    }
}

/// Outcome of [`fit_tail_moments`]
#[derive(Debug, Clone)]
pub struct TailFit {
    moments: TailMoments,
    n_fitted: usize,
    fit_error: f64,
}

impl TailFit {
    /// M₁, M₂, M₃: known orders as given, the rest fitted
    pub fn moments(&self) -> &TailMoments {
        &self.moments
    }

    pub fn into_moments(self) -> TailMoments {
        self.moments
    }

    /// Number of orders among M₁…M₃ that were estimated
    pub fn n_fitted(&self) -> usize {
        self.n_fitted
    }

    /// Largest absolute residual of the fit over the fitted frequencies
    pub fn fit_error(&self) -> f64 {
        self.fit_error
    }
}

/// Moments ready for the tail correction
#[derive(Debug, Clone)]
pub struct ResolvedMoments {
    pub moments: [DTensor<Complex<f64>, 2>; MAX_MOMENTS],
    pub accuracy: Accuracy,
}

pub(crate) fn imfreq_mesh(gf: &GreenFunction) -> Result<&ImFreqMesh> {
    match gf.mesh() {
        Mesh::ImFreq(mesh) => Ok(mesh),
        other => Err(DensityError::UnsupportedMeshKind {
            found: other.kind(),
            expected: "imfreq",
        }),
    }
}

/// Mesh positions used by the fit, outermost frequencies first
fn fit_window(mesh: &ImFreqMesh, options: &TailFitOptions) -> Vec<usize> {
    let n_iw = mesh.n_iw();
    let n_window = ((n_iw as f64 * options.tail_fraction).round() as usize).clamp(1, n_iw);
    let n_pick = n_window.min(options.n_tail_max);

    // Spread the picked indices evenly over k ∈ [n_iw - n_window, n_iw)
    let mut ks: Vec<i64> = (0..n_pick)
        .map(|j| {
            let offset = if n_pick == 1 {
                0
            } else {
                (j * (n_window - 1) + (n_pick - 1) / 2) / (n_pick - 1)
            };
            (n_iw - 1 - offset) as i64
        })
        .collect();
    ks.dedup();

    let mut positions = Vec::with_capacity(2 * ks.len());
    for k in ks {
        let freq = MatsubaraFreq::from_index(k, mesh.statistics());
        if freq.is_zero() {
            continue;
        }
        if let Some(pos) = mesh.position(k) {
            positions.push(pos);
        }
        if !mesh.is_positive_only() {
            if let Some(pos) = mesh.position((-freq).index()) {
                positions.push(pos);
            }
        }
    }
    positions
}

/// Least-squares estimate of the tail moments of a Matsubara Green's function
///
/// The coefficients of 1/(iωₙ)ᵏ for k = `known.len()` + 1 … `expansion_order`
/// are fitted to the outermost frequencies of the mesh after subtracting the
/// known low-order moments. The first three orders are returned; higher
/// fitted orders only serve to absorb the truncation of the expansion.
pub fn fit_tail_moments(
    gf: &GreenFunction,
    known: &TailMoments,
    options: &TailFitOptions,
) -> Result<TailFit> {
    let mesh = imfreq_mesh(gf)?;
    options.validate()?;
    let dims = gf.dims();
    known.validate(dims)?;
    gf.ensure_finite()?;

    let n_known = known.len();
    if n_known == MAX_MOMENTS {
        return Ok(TailFit {
            moments: known.clone(),
            n_fitted: 0,
            fit_error: 0.0,
        });
    }

    let n_free = options.expansion_order - n_known;
    let positions = fit_window(mesh, options);
    if positions.len() <= n_free {
        return Err(DensityError::InsufficientMesh {
            available: positions.len(),
            required: n_free + 1,
        });
    }

    let beta = mesh.beta();
    let iws: Vec<Complex<f64>> = positions
        .iter()
        .map(|&p| mesh.freq(p).value_imaginary(beta))
        .collect();
    let omega_scale = iws.iter().map(|z| z.im.abs()).fold(0.0, f64::max);

    // Columns in x = iω/ω_s keep the design matrix well conditioned
    let design = DTensor::<Complex<f64>, 2>::from_fn([iws.len(), n_free], |idx| {
        let x = iws[idx[0]] / omega_scale;
        x.powi(-((n_known + 1 + idx[1]) as i32))
    });

    let (d1, d2) = dims;
    let values = DTensor::<Complex<f64>, 2>::from_fn([iws.len(), d1 * d2], |idx| {
        let (i, j) = (idx[1] / d2, idx[1] % d2);
        let iw = iws[idx[0]];
        let known_part: Complex<f64> = known
            .iter()
            .enumerate()
            .map(|(k, m)| m[[i, j]] * iw.powi(-(k as i32 + 1)))
            .sum();
        gf.get(positions[idx[0]], i, j) - known_part
    });

    let fitter = ComplexMatrixFitter::new(design)?;
    let coeffs = fitter.fit_2d(&values);
    let reconstructed = fitter.evaluate_2d(&coeffs);

    let mut fit_error: f64 = 0.0;
    for p in 0..iws.len() {
        for c in 0..d1 * d2 {
            fit_error = fit_error.max((reconstructed[[p, c]] - values[[p, c]]).norm());
        }
    }

    let mut moments: Vec<DTensor<Complex<f64>, 2>> = known.iter().cloned().collect();
    for order in n_known + 1..=MAX_MOMENTS {
        let col = order - n_known - 1;
        let scale = omega_scale.powi(order as i32);
        moments.push(DTensor::<Complex<f64>, 2>::from_fn([d1, d2], |idx| {
            coeffs[[col, idx[0] * d2 + idx[1]]] * scale
        }));
    }

    tracing::debug!(
        n_points = iws.len(),
        n_known,
        expansion_order = options.expansion_order,
        fit_error,
        "fitted high-frequency tail"
    );
    if fit_error > options.max_fit_error {
        tracing::warn!(
            fit_error,
            max_fit_error = options.max_fit_error,
            "tail fit residual is large; the mesh may not reach the asymptotic regime"
        );
    }

    Ok(TailFit {
        moments: TailMoments::new(moments)?,
        n_fitted: MAX_MOMENTS - n_known,
        fit_error,
    })
}

/// M₁ ≈ ½ [iω G(iω) + (-iω) G(-iω)] at the outermost frequency pair
///
/// The M₂/(iω) terms cancel between the pair, leaving an error of order
/// 1/ω_max². A mesh without a nonzero frequency yields zero.
fn boundary_first_moment(
    gf: &GreenFunction,
    mesh: &ImFreqMesh,
) -> Result<DTensor<Complex<f64>, 2>> {
    let (d1, d2) = gf.dims();
    let k = mesh.n_iw() as i64 - 1;
    let freq = MatsubaraFreq::from_index(k, mesh.statistics());
    let Some(pos) = mesh.position(k).filter(|_| !freq.is_zero()) else {
        return Ok(DTensor::<Complex<f64>, 2>::from_elem([d1, d2], Complex::zero()));
    };
    let iw = freq.value_imaginary(mesh.beta());

    if mesh.is_positive_only() {
        if d1 != d2 {
            return Err(DensityError::ShapeMismatch {
                context: "positive-only Matsubara mesh",
                expected: (d1, d1),
                found: (d1, d2),
            });
        }
        return Ok(DTensor::<Complex<f64>, 2>::from_fn([d1, d2], |idx| {
            let (i, j) = (idx[0], idx[1]);
            (iw * gf.get(pos, i, j) - iw * gf.get(pos, j, i).conj()) * 0.5
        }));
    }
    let Some(mirror) = mesh.position((-freq).index()) else {
        return Ok(DTensor::<Complex<f64>, 2>::from_elem([d1, d2], Complex::zero()));
    };
    Ok(DTensor::<Complex<f64>, 2>::from_fn([d1, d2], |idx| {
        let (i, j) = (idx[0], idx[1]);
        (iw * gf.get(pos, i, j) - iw * gf.get(mirror, i, j)) * 0.5
    }))
}

/// Moments for the tail correction of `gf`
///
/// Supplied moments are validated and padded with zeros; fewer than three
/// supplied orders degrade the accuracy of the sum. For an empty set M₁ is
/// read off the outermost frequencies so that the sum still converges to
/// G(0⁻), at the slow rate of the plain sum. With `moments = None` all three
/// orders are fitted.
pub fn resolve_moments(
    gf: &GreenFunction,
    moments: Option<&TailMoments>,
    options: &TailFitOptions,
) -> Result<ResolvedMoments> {
    let dims = gf.dims();
    match moments {
        Some(m) => {
            m.validate(dims)?;
            let accuracy = if m.len() < MAX_MOMENTS {
                tracing::warn!(
                    order = m.len(),
                    "fewer than {} tail moments supplied; the Matsubara sum converges slowly",
                    MAX_MOMENTS
                );
                Accuracy::Degraded { order: m.len() }
            } else {
                Accuracy::TailCorrected { fit_error: None }
            };
            let mut moments = m.padded(dims);
            if m.is_empty() {
                let mesh = imfreq_mesh(gf)?;
                moments[0] = boundary_first_moment(gf, mesh)?;
                tracing::debug!(n_iw = mesh.n_iw(), "estimated M1 from the outermost frequencies");
            }
            Ok(ResolvedMoments { moments, accuracy })
        }
        None => {
            let fit = fit_tail_moments(gf, &TailMoments::empty(), options)?;
            Ok(ResolvedMoments {
                moments: fit.moments.padded(dims),
                accuracy: Accuracy::TailCorrected {
                    fit_error: Some(fit.fit_error),
                },
            })
        }
    }
}
