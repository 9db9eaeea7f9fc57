//! Particle statistics and the thermal factors that depend on them

/// Statistics type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Statistics {
    #[default]
    Fermionic,
    Bosonic,
}

impl Statistics {
    /// Check if this statistics type is fermionic
    pub fn is_fermionic(self) -> bool {
        matches!(self, Statistics::Fermionic)
    }

    /// Check if this statistics type is bosonic
    pub fn is_bosonic(self) -> bool {
        matches!(self, Statistics::Bosonic)
    }

    /// Get the string representation of the statistics
    pub fn as_str(self) -> &'static str {
        match self {
            Statistics::Fermionic => "fermionic",
            Statistics::Bosonic => "bosonic",
        }
    }

    /// Statistics parameter ζ in ωₙ = (2k + ζ)π/β
    pub fn zeta(self) -> i64 {
        match self {
            Statistics::Fermionic => 1,
            Statistics::Bosonic => 0,
        }
    }

    /// Sign picked up by G(τ) under a shift by β: -1 for fermions, +1 for bosons
    pub fn sign(self) -> f64 {
        match self {
            Statistics::Fermionic => -1.0,
            Statistics::Bosonic => 1.0,
        }
    }

    /// Occupation factor n(ε) = 1 / (exp(βε) ∓ ξ)
    ///
    /// Fermi function for fermions, Bose function for bosons. The bosonic
    /// factor diverges at ε = 0.
    pub fn occupation(self, epsilon: f64, beta: f64) -> f64 {
        let half = 0.5 * beta * epsilon;
        match self {
            Statistics::Fermionic => 0.5 * (1.0 - half.tanh()),
            Statistics::Bosonic => 0.5 * (1.0 / half.tanh() - 1.0),
        }
    }

    /// Boundary value G(τ=0⁻) of a unit pole 1/(iωₙ - b)
    ///
    /// (1/β) Σₙ e^{iωₙ0⁺} / (iωₙ - b) = (1 - tanh(βb/2))/2 for fermions and
    /// (1 - coth(βb/2))/2 for bosons, i.e. n_F(b) and -n_B(b).
    pub fn pole_boundary_value(self, b: f64, beta: f64) -> f64 {
        match self {
            Statistics::Fermionic => self.occupation(b, beta),
            Statistics::Bosonic => -self.occupation(b, beta),
        }
    }
}

impl std::fmt::Display for Statistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
