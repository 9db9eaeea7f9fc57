//! Single entry point dispatching on the mesh kind

use crate::error::{DensityError, Result};
use crate::gf::GreenFunction;
use crate::legendre::density_legendre;
use crate::matsubara::density_imfreq_with;
use crate::mesh::Mesh;
use crate::refreq::density_refreq;
use crate::result::DensityResult;
use crate::tail::{TailFitOptions, TailMoments};

/// Options shared by the dispatching entry points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DensityOptions {
    /// Tail fit used by Matsubara inputs without supplied moments
    pub tail: TailFitOptions,
    /// Evaluate independent blocks on the rayon thread pool
    pub parallel: bool,
}

impl DensityOptions {
    pub fn with_tail(mut self, tail: TailFitOptions) -> Self {
        self.tail = tail;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Density of `gf`, whatever its mesh kind
///
/// * imfreq: tail-corrected Matsubara sum with the given or fitted moments
/// * legendre: closed-form boundary value; `moments` must be `None`
/// * refreq: occupation-weighted integral at the mesh's β, or T = 0 without one
pub fn density(gf: &GreenFunction, moments: Option<&TailMoments>) -> Result<DensityResult> {
    density_with(gf, moments, &DensityOptions::default())
}

/// [`density`] with explicit options
pub fn density_with(
    gf: &GreenFunction,
    moments: Option<&TailMoments>,
    options: &DensityOptions,
) -> Result<DensityResult> {
    match gf.mesh() {
        Mesh::ImFreq(_) => density_imfreq_with(gf, moments, &options.tail),
        Mesh::Legendre(_) => {
            if moments.is_some() {
                return Err(DensityError::InvalidParameter(
                    "tail moments do not apply to Legendre coefficients".to_string(),
                ));
            }
            density_legendre(gf)
        }
        Mesh::ReFreq(mesh) => {
            if let Some(m) = moments {
                m.validate(gf.dims())?;
            }
            density_refreq(gf, mesh.beta())
        }
    }
}
