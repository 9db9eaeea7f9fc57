//! Density of block-diagonal Green's functions
//!
//! Each block is an independent Green's function with its own shape and its
//! own tail moments. All contract checks run before any block is summed, so
//! a violation never yields partial output.

use rayon::prelude::*;

use crate::density::DensityOptions;
use crate::error::{DensityError, Result};
use crate::gf::{BlockGreenFunction, GreenFunction};
use crate::matsubara::density_imfreq_with;
use crate::mesh::{Mesh, MeshKind};
use crate::refreq::density_refreq;
use crate::result::DensityResult;
use crate::tail::TailMoments;

/// Check block/moment pairing, mesh kinds, shapes and finiteness
fn check_blocks(bgf: &BlockGreenFunction, moments: &[Option<TailMoments>]) -> Result<MeshKind> {
    if bgf.len() != moments.len() {
        return Err(DensityError::BlockCountMismatch {
            blocks: bgf.len(),
            moments: moments.len(),
        });
    }

    let mut kind = None;
    for gf in bgf.blocks() {
        let found = gf.kind();
        let supported = matches!(found, MeshKind::ImFreq | MeshKind::ReFreq);
        if !supported || kind.is_some_and(|k| k != found) {
            return Err(DensityError::UnsupportedMeshKind {
                found,
                expected: "imfreq or refreq, the same for all blocks",
            });
        }
        kind = Some(found);
    }

    for (gf, m) in bgf.blocks().iter().zip(moments) {
        if let Some(m) = m {
            m.validate(gf.dims())?;
        }
        gf.ensure_finite()?;
    }

    // An empty collection has no kind; report it as Matsubara
    Ok(kind.unwrap_or(MeshKind::ImFreq))
}

fn density_block(
    gf: &GreenFunction,
    moments: Option<&TailMoments>,
    options: &DensityOptions,
) -> Result<DensityResult> {
    match gf.mesh() {
        Mesh::ReFreq(mesh) => density_refreq(gf, mesh.beta()),
        _ => density_imfreq_with(gf, moments, &options.tail),
    }
}

/// Density of every block, in block order
///
/// Matsubara blocks are tail-corrected with their paired moments (`None`
/// fits them). Real-frequency blocks are integrated at their own mesh's β;
/// their paired moments are checked but not used.
pub fn density_blocks(
    bgf: &BlockGreenFunction,
    moments: &[Option<TailMoments>],
    options: &DensityOptions,
) -> Result<Vec<DensityResult>> {
    let kind = check_blocks(bgf, moments)?;

    tracing::debug!(
        n_blocks = bgf.len(),
        kind = %kind,
        parallel = options.parallel,
        "computing block densities"
    );

    if options.parallel {
        bgf.blocks()
            .par_iter()
            .zip(moments.par_iter())
            .map(|(gf, m)| density_block(gf, m.as_ref(), options))
            .collect()
    } else {
        bgf.blocks()
            .iter()
            .zip(moments)
            .map(|(gf, m)| density_block(gf, m.as_ref(), options))
            .collect()
    }
}
