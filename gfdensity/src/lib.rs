//! # gfdensity: equal-time density of thermal Green's functions
//!
//! Computes the one-particle density matrix G(τ=0⁻) of a Green's function
//! sampled on Matsubara frequencies, Legendre coefficients or real
//! frequencies, for single functions and for block-diagonal collections.
//! The slowly converging Matsubara sum is accelerated by subtracting an
//! analytic high-frequency tail whose contribution is known in closed form.

pub mod block; // Block-diagonal dispatch (optionally parallel)
pub mod density; // Runtime dispatch on the mesh kind
pub mod error;
mod fitter; // Least-squares fitter for the tail moments
pub mod freq;
pub mod gauss;
pub mod gf;
pub mod legendre;
pub mod matsubara; // Tail-corrected Matsubara summation
pub mod mesh;
pub mod pole; // Analytic single-pole references
pub mod refreq;
pub mod result;
pub mod tail;
pub mod traits;

// Re-export commonly used types and functions
pub use block::density_blocks;
pub use density::{DensityOptions, density, density_with};
pub use error::{DensityError, Result};
pub use freq::MatsubaraFreq;
pub use gauss::Rule;
pub use gf::{BlockGreenFunction, GreenFunction, TargetShape};
pub use legendre::{density_legendre, legendre_value_at, project_legendre};
pub use matsubara::{density_imfreq, density_imfreq_with};
pub use mesh::{ImFreqMesh, LegendreMesh, Mesh, MeshKind, ReFreqMesh};
pub use pole::{giwn_single_pole, gtau_single_pole, single_pole_density};
pub use refreq::density_refreq;
pub use result::{Accuracy, DensityResult, DensityValue};
pub use tail::{TailFit, TailFitOptions, TailMoments, fit_tail_moments, resolve_moments};
pub use traits::Statistics;

// Re-export external dependencies for convenience
pub use mdarray::DTensor;
pub use num_complex::Complex;
