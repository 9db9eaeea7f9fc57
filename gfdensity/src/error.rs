//! Error type shared by every density entry point
//!
//! All variants are contract violations or malformed input detected before
//! any summation starts. Reduced accuracy is never an error; it is reported
//! through [`crate::result::Accuracy`].

use thiserror::Error;

use crate::mesh::MeshKind;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DensityError {
    #[error("block count ({blocks}) does not match the number of moment sets ({moments})")]
    BlockCountMismatch { blocks: usize, moments: usize },

    #[error("mesh kind {found} is not supported here (expected {expected})")]
    UnsupportedMeshKind {
        found: MeshKind,
        expected: &'static str,
    },

    #[error(
        "too few high-frequency points to fit the tail: {available} available, {required} required"
    )]
    InsufficientMesh { available: usize, required: usize },

    #[error("shape mismatch in {context}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        context: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("non-finite value in {context} at flat index {index}")]
    NonFinite { context: &'static str, index: usize },

    #[error("at most 3 tail moments are supported, got {0}")]
    TooManyMoments(usize),

    #[error("Matsubara index n={n} is not allowed for {statistics} statistics")]
    InvalidFrequency { n: i64, statistics: &'static str },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, DensityError>;
