//! Matsubara frequencies
//!
//! A Matsubara frequency is ωₙ = nπ/β with n odd for fermions and even for
//! bosons. The statistics is carried at runtime so that meshes of either kind
//! share one type.

use num_complex::Complex64;

use crate::error::{DensityError, Result};
use crate::traits::Statistics;

/// Matsubara frequency ωₙ = nπ/β for a given statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatsubaraFreq {
    n: i64,
    statistics: Statistics,
}

impl MatsubaraFreq {
    /// Create a new Matsubara frequency
    ///
    /// Fails with [`DensityError::InvalidFrequency`] if the parity of `n` does
    /// not match the statistics (odd for fermions, even for bosons).
    ///
    /// # Examples
    /// ```
    /// use gfdensity::freq::MatsubaraFreq;
    /// use gfdensity::traits::Statistics;
    ///
    /// assert!(MatsubaraFreq::new(1, Statistics::Fermionic).is_ok());
    /// assert!(MatsubaraFreq::new(0, Statistics::Fermionic).is_err());
    /// ```
    pub fn new(n: i64, statistics: Statistics) -> Result<Self> {
        let allowed = match statistics {
            Statistics::Fermionic => n % 2 != 0,
            Statistics::Bosonic => n % 2 == 0,
        };

        if !allowed {
            return Err(DensityError::InvalidFrequency {
                n,
                statistics: statistics.as_str(),
            });
        }

        Ok(Self { n, statistics })
    }

    /// Frequency for the mesh index k, i.e. n = 2k + ζ
    pub fn from_index(k: i64, statistics: Statistics) -> Self {
        Self {
            n: 2 * k + statistics.zeta(),
            statistics,
        }
    }

    /// Get the Matsubara index n
    pub fn n(&self) -> i64 {
        self.n
    }

    /// Mesh index k with n = 2k + ζ
    pub fn index(&self) -> i64 {
        (self.n - self.statistics.zeta()).div_euclid(2)
    }

    pub fn statistics(&self) -> Statistics {
        self.statistics
    }

    /// Real frequency value nπ/β
    pub fn value(&self, beta: f64) -> f64 {
        self.n as f64 * std::f64::consts::PI / beta
    }

    /// Imaginary frequency value iωₙ
    pub fn value_imaginary(&self, beta: f64) -> Complex64 {
        Complex64::new(0.0, self.value(beta))
    }

    /// Whether this is the bosonic zero frequency
    pub fn is_zero(&self) -> bool {
        self.n == 0
    }
}

impl std::ops::Neg for MatsubaraFreq {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            n: -self.n,
            statistics: self.statistics,
        }
    }
}
