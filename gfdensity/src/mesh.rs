//! Meshes a Green's function can be sampled on
//!
//! [`Mesh`] is a tagged union over the three supported domains. Each variant
//! carries its own domain parameters (inverse temperature, statistics, window
//! bounds) so that density routines never need extra arguments to interpret
//! the samples.

use std::fmt;

use crate::error::{DensityError, Result};
use crate::freq::MatsubaraFreq;
use crate::traits::Statistics;

/// Kind tag of a [`Mesh`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshKind {
    ImFreq,
    ReFreq,
    Legendre,
}

impl MeshKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MeshKind::ImFreq => "imfreq",
            MeshKind::ReFreq => "refreq",
            MeshKind::Legendre => "legendre",
        }
    }
}

impl fmt::Display for MeshKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn check_beta(beta: f64) -> Result<()> {
    if !(beta.is_finite() && beta > 0.0) {
        return Err(DensityError::InvalidParameter(format!(
            "beta must be positive and finite, got {}",
            beta
        )));
    }
    Ok(())
}

/// Matsubara frequency mesh
///
/// A full mesh holds the indices k ∈ [-n_iw, n_iw) for fermions and
/// k ∈ (-n_iw, n_iw) for bosons, with n = 2k + ζ. A positive-only mesh holds
/// k ∈ [0, n_iw); the negative half is implied by G(-iωₙ) = G(iωₙ)†.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImFreqMesh {
    beta: f64,
    statistics: Statistics,
    n_iw: usize,
    positive_only: bool,
}

impl ImFreqMesh {
    pub fn new(beta: f64, statistics: Statistics, n_iw: usize) -> Result<Self> {
        check_beta(beta)?;
        if n_iw == 0 {
            return Err(DensityError::InvalidParameter(
                "Matsubara mesh needs at least one positive frequency".to_string(),
            ));
        }
        Ok(Self {
            beta,
            statistics,
            n_iw,
            positive_only: false,
        })
    }

    /// Same mesh restricted to non-negative frequencies
    pub fn positive_only(mut self) -> Self {
        self.positive_only = true;
        self
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn statistics(&self) -> Statistics {
        self.statistics
    }

    /// Number of non-negative frequencies
    pub fn n_iw(&self) -> usize {
        self.n_iw
    }

    pub fn is_positive_only(&self) -> bool {
        self.positive_only
    }

    /// Mesh index k of the first point
    fn first_index(&self) -> i64 {
        match (self.positive_only, self.statistics) {
            (true, _) => 0,
            (false, Statistics::Fermionic) => -(self.n_iw as i64),
            (false, Statistics::Bosonic) => -(self.n_iw as i64) + 1,
        }
    }

    /// Number of mesh points
    pub fn len(&self) -> usize {
        match (self.positive_only, self.statistics) {
            (true, _) => self.n_iw,
            (false, Statistics::Fermionic) => 2 * self.n_iw,
            (false, Statistics::Bosonic) => 2 * self.n_iw - 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Frequency at linear position `i`
    pub fn freq(&self, i: usize) -> MatsubaraFreq {
        MatsubaraFreq::from_index(self.first_index() + i as i64, self.statistics)
    }

    /// Linear position of the frequency with mesh index k, if it lies on the mesh
    pub fn position(&self, k: i64) -> Option<usize> {
        let pos = k - self.first_index();
        (pos >= 0 && (pos as usize) < self.len()).then_some(pos as usize)
    }

    /// Iterate over all frequencies in mesh order
    pub fn iter(&self) -> impl Iterator<Item = MatsubaraFreq> + '_ {
        (0..self.len()).map(move |i| self.freq(i))
    }
}

/// Uniform real-frequency mesh including both window bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReFreqMesh {
    omega_min: f64,
    omega_max: f64,
    n_points: usize,
    statistics: Statistics,
    beta: Option<f64>,
}

impl ReFreqMesh {
    pub fn new(omega_min: f64, omega_max: f64, n_points: usize) -> Result<Self> {
        if !(omega_min.is_finite() && omega_max.is_finite() && omega_min < omega_max) {
            return Err(DensityError::InvalidParameter(format!(
                "real-frequency window must satisfy omega_min < omega_max, got [{}, {}]",
                omega_min, omega_max
            )));
        }
        if n_points < 2 {
            return Err(DensityError::InvalidParameter(format!(
                "real-frequency mesh needs at least 2 points, got {}",
                n_points
            )));
        }
        Ok(Self {
            omega_min,
            omega_max,
            n_points,
            statistics: Statistics::Fermionic,
            beta: None,
        })
    }

    pub fn with_statistics(mut self, statistics: Statistics) -> Self {
        self.statistics = statistics;
        self
    }

    /// Attach an inverse temperature; without one the mesh is read at T = 0
    pub fn with_beta(mut self, beta: f64) -> Result<Self> {
        check_beta(beta)?;
        self.beta = Some(beta);
        Ok(self)
    }

    pub fn omega_min(&self) -> f64 {
        self.omega_min
    }

    pub fn omega_max(&self) -> f64 {
        self.omega_max
    }

    pub fn statistics(&self) -> Statistics {
        self.statistics
    }

    pub fn beta(&self) -> Option<f64> {
        self.beta
    }

    pub fn len(&self) -> usize {
        self.n_points
    }

    pub fn is_empty(&self) -> bool {
        self.n_points == 0
    }

    /// Grid spacing
    pub fn delta(&self) -> f64 {
        (self.omega_max - self.omega_min) / (self.n_points - 1) as f64
    }

    /// Frequency at linear position `i`
    pub fn omega(&self, i: usize) -> f64 {
        if i + 1 == self.n_points {
            self.omega_max
        } else {
            self.omega_min + i as f64 * self.delta()
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.n_points).map(move |i| self.omega(i))
    }
}

/// Legendre coefficient mesh l = 0 … n_l - 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegendreMesh {
    beta: f64,
    statistics: Statistics,
    n_l: usize,
}

impl LegendreMesh {
    pub fn new(beta: f64, statistics: Statistics, n_l: usize) -> Result<Self> {
        check_beta(beta)?;
        if n_l == 0 {
            return Err(DensityError::InvalidParameter(
                "Legendre mesh needs at least one coefficient".to_string(),
            ));
        }
        Ok(Self {
            beta,
            statistics,
            n_l,
        })
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn statistics(&self) -> Statistics {
        self.statistics
    }

    pub fn len(&self) -> usize {
        self.n_l
    }

    pub fn is_empty(&self) -> bool {
        self.n_l == 0
    }
}

/// Any supported mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mesh {
    ImFreq(ImFreqMesh),
    ReFreq(ReFreqMesh),
    Legendre(LegendreMesh),
}

impl Mesh {
    pub fn kind(&self) -> MeshKind {
        match self {
            Mesh::ImFreq(_) => MeshKind::ImFreq,
            Mesh::ReFreq(_) => MeshKind::ReFreq,
            Mesh::Legendre(_) => MeshKind::Legendre,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Mesh::ImFreq(m) => m.len(),
            Mesh::ReFreq(m) => m.len(),
            Mesh::Legendre(m) => m.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inverse temperature, if the mesh carries one
    pub fn beta(&self) -> Option<f64> {
        match self {
            Mesh::ImFreq(m) => Some(m.beta()),
            Mesh::ReFreq(m) => m.beta(),
            Mesh::Legendre(m) => Some(m.beta()),
        }
    }

    pub fn statistics(&self) -> Statistics {
        match self {
            Mesh::ImFreq(m) => m.statistics(),
            Mesh::ReFreq(m) => m.statistics(),
            Mesh::Legendre(m) => m.statistics(),
        }
    }
}

impl From<ImFreqMesh> for Mesh {
    fn from(mesh: ImFreqMesh) -> Self {
        Mesh::ImFreq(mesh)
    }
}

impl From<ReFreqMesh> for Mesh {
    fn from(mesh: ReFreqMesh) -> Self {
        Mesh::ReFreq(mesh)
    }
}

impl From<LegendreMesh> for Mesh {
    fn from(mesh: LegendreMesh) -> Self {
        Mesh::Legendre(mesh)
    }
}
