//! Gauss quadrature rules for numerical integration
//!
//! The integral of f(x) over [a, b] is approximated by the weighted sum
//!
//! sum(f(xi) * wi for (xi, wi) in zip(x, w))
//!
//! which converges superexponentially for smooth f(x) with the number of
//! quadrature points.

use mdarray::DTensor;

/// Quadrature rule for numerical integration.
///
/// Represents an approximation of an integral by a weighted sum over discrete points.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    /// Quadrature points, ascending
    pub x: Vec<f64>,
    /// Quadrature weights
    pub w: Vec<f64>,
    /// Left endpoint of integration interval
    pub a: f64,
    /// Right endpoint of integration interval
    pub b: f64,
}

impl Rule {
    /// Create a new quadrature rule from points and weights.
    ///
    /// # Panics
    /// Panics if x and w have different lengths.
    pub fn new(x: Vec<f64>, w: Vec<f64>, a: f64, b: f64) -> Self {
        assert_eq!(x.len(), w.len(), "x and w must have the same length");
        Self { x, w, a, b }
    }

    /// Create a default rule with empty arrays.
    pub fn empty() -> Self {
        Self::new(vec![], vec![], -1.0, 1.0)
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Reseat the rule to a new interval [a, b].
    ///
    /// Scales and translates the quadrature points and weights to the new interval.
    pub fn reseat(&self, a: f64, b: f64) -> Self {
        let scaling = (b - a) / (self.b - self.a);
        let midpoint_old = (self.b + self.a) * 0.5;
        let midpoint_new = (b + a) * 0.5;

        let x = self
            .x
            .iter()
            .map(|&xi| scaling * (xi - midpoint_old) + midpoint_new)
            .collect();
        let w = self.w.iter().map(|&wi| wi * scaling).collect();
        Self { x, w, a, b }
    }
}

/// Compute Gauss-Legendre quadrature nodes and weights using Newton's method.
fn gauss_legendre_nodes_weights(n: usize) -> (Vec<f64>, Vec<f64>) {
    if n == 0 {
        return (Vec::new(), Vec::new());
    }

    if n == 1 {
        return (vec![0.0], vec![2.0]);
    }

    let mut x = Vec::with_capacity(n);
    let mut w = Vec::with_capacity(n);

    // Roots come in ± pairs; find the non-negative half
    let m = n.div_ceil(2);
    let pi = std::f64::consts::PI;

    for i in 0..m {
        // Initial guess using Chebyshev nodes
        let mut z = (pi * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();

        for _ in 0..100 {
            let (p0, p1) = legendre_polynomial_and_derivative(n, z);
            let step = p0 / p1;
            z -= step;
            if step.abs() < 4.0 * f64::EPSILON {
                break;
            }
        }

        let (_, p1) = legendre_polynomial_and_derivative(n, z);
        let weight = 2.0 / ((1.0 - z * z) * p1 * p1);

        x.push(-z);
        w.push(weight);

        if i != n - 1 - i {
            x.push(z);
            w.push(weight);
        }
    }

    // Sort by x values
    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by(|&a, &b| x[a].total_cmp(&x[b]));

    let sorted_x = indices.iter().map(|&i| x[i]).collect();
    let sorted_w = indices.iter().map(|&i| w[i]).collect();

    (sorted_x, sorted_w)
}

/// Compute Legendre polynomial P_n(x) and its derivative using recurrence relation.
pub(crate) fn legendre_polynomial_and_derivative(n: usize, x: f64) -> (f64, f64) {
    if n == 0 {
        return (1.0, 0.0);
    }

    if n == 1 {
        return (x, 1.0);
    }

    let mut p0 = 1.0;
    let mut p1 = x;
    let mut dp0 = 0.0;
    let mut dp1 = 1.0;

    for k in 2..=n {
        let k_f = k as f64;
        let k1_f = (k - 1) as f64;

        let p2 = ((2.0 * k1_f + 1.0) * x * p1 - k1_f * p0) / k_f;
        let dp2 = ((2.0 * k1_f + 1.0) * (p1 + x * dp1) - k1_f * dp0) / k_f;

        p0 = p1;
        p1 = p2;
        dp0 = dp1;
        dp1 = dp2;
    }

    (p1, dp1)
}

/// Create a Gauss-Legendre quadrature rule with n points on [-1, 1].
pub fn legendre(n: usize) -> Rule {
    if n == 0 {
        return Rule::empty();
    }

    let (x, w) = gauss_legendre_nodes_weights(n);
    Rule::new(x, w, -1.0, 1.0)
}

/// Legendre Vandermonde matrix
///
/// # Returns
/// Matrix V where V[i,j] = P_j(x_i), with P_j being the j-th Legendre polynomial
pub fn legendre_vandermonde(x: &[f64], degree: usize) -> DTensor<f64, 2> {
    let n = x.len();
    let mut v = DTensor::<f64, 2>::from_elem([n, degree + 1], 0.0);

    // First column is all ones (P_0(x) = 1)
    for i in 0..n {
        v[[i, 0]] = 1.0;
    }

    // Second column is x (P_1(x) = x)
    if degree > 0 {
        for i in 0..n {
            v[[i, 1]] = x[i];
        }
    }

    // Recurrence relation: P_n(x) = ((2n-1)x*P_{n-1}(x) - (n-1)*P_{n-2}(x)) / n
    for j in 2..=degree {
        let n_f64 = j as f64;
        for i in 0..n {
            let term1 = (2.0 * n_f64 - 1.0) * x[i] * v[[i, j - 1]];
            let term2 = (n_f64 - 1.0) * v[[i, j - 2]];
            v[[i, j]] = (term1 - term2) / n_f64;
        }
    }

    v
}

#[cfg(test)]
#[path = "gauss_tests.rs"]
mod tests;
