//! Density values and the accuracy indicator that accompanies them

use mdarray::DTensor;
use num_complex::Complex;

use crate::gf::TargetShape;

/// Density of a scalar- or matrix-valued Green's function
#[derive(Debug, Clone)]
pub enum DensityValue {
    Scalar(Complex<f64>),
    Matrix(DTensor<Complex<f64>, 2>),
}

impl DensityValue {
    /// Wrap a `(d1, d2)` matrix according to the target shape it was computed for
    pub(crate) fn from_matrix(target: TargetShape, matrix: DTensor<Complex<f64>, 2>) -> Self {
        match target {
            TargetShape::Scalar => DensityValue::Scalar(matrix[[0, 0]]),
            TargetShape::Matrix(..) => DensityValue::Matrix(matrix),
        }
    }

    pub fn as_scalar(&self) -> Option<Complex<f64>> {
        match self {
            DensityValue::Scalar(z) => Some(*z),
            DensityValue::Matrix(_) => None,
        }
    }

    pub fn as_matrix(&self) -> Option<&DTensor<Complex<f64>, 2>> {
        match self {
            DensityValue::Scalar(_) => None,
            DensityValue::Matrix(m) => Some(m),
        }
    }

    /// Matrix dimensions; scalars are 1×1
    pub fn dims(&self) -> (usize, usize) {
        match self {
            DensityValue::Scalar(_) => (1, 1),
            DensityValue::Matrix(m) => *m.shape(),
        }
    }

    /// Entry (i, j); a scalar answers for (0, 0)
    ///
    /// # Panics
    /// Panics if (i, j) lies outside [`dims`](Self::dims).
    pub fn get(&self, i: usize, j: usize) -> Complex<f64> {
        match self {
            DensityValue::Scalar(z) => {
                assert!(i == 0 && j == 0, "scalar density has no entry ({}, {})", i, j);
                *z
            }
            DensityValue::Matrix(m) => m[[i, j]],
        }
    }

    /// Sum of the diagonal entries (total occupation)
    pub fn trace(&self) -> Complex<f64> {
        let (d1, d2) = self.dims();
        (0..d1.min(d2)).map(|i| self.get(i, i)).sum()
    }

    /// Largest |ρ_ij - conj(ρ_ji)|; zero for an exactly Hermitian result
    pub fn hermiticity_error(&self) -> f64 {
        let (d1, d2) = self.dims();
        if d1 != d2 {
            return f64::INFINITY;
        }
        let mut err: f64 = 0.0;
        for i in 0..d1 {
            for j in 0..d2 {
                err = err.max((self.get(i, j) - self.get(j, i).conj()).norm());
            }
        }
        err
    }
}

/// How much the returned value can be trusted
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Accuracy {
    /// Closed-form evaluation, exact up to the truncation of the input
    Exact,
    /// Matsubara sum corrected by an analytic tail of order 3
    TailCorrected {
        /// Largest absolute residual of the tail fit, if moments were fitted
        fit_error: Option<f64>,
    },
    /// Matsubara sum with fewer than three tail moments; converges slowly
    Degraded {
        /// Number of tail moments that were available (0 … 2)
        order: usize,
    },
    /// Trapezoidal quadrature truncated at the real-frequency window
    Quadrature {
        /// Largest spectral weight |A(ω)| at the window bounds
        edge_weight: f64,
    },
}

impl Accuracy {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Accuracy::Degraded { .. })
    }
}

/// Density together with its accuracy indicator
#[derive(Debug, Clone)]
pub struct DensityResult {
    value: DensityValue,
    accuracy: Accuracy,
}

impl DensityResult {
    pub(crate) fn new(value: DensityValue, accuracy: Accuracy) -> Self {
        Self { value, accuracy }
    }

    pub fn value(&self) -> &DensityValue {
        &self.value
    }

    pub fn into_value(self) -> DensityValue {
        self.value
    }

    pub fn accuracy(&self) -> Accuracy {
        self.accuracy
    }

    pub fn is_degraded(&self) -> bool {
        self.accuracy.is_degraded()
    }

    pub fn as_scalar(&self) -> Option<Complex<f64>> {
        self.value.as_scalar()
    }

    pub fn as_matrix(&self) -> Option<&DTensor<Complex<f64>, 2>> {
        self.value.as_matrix()
    }

    /// Entry (i, j) of the value, see [`DensityValue::get`]
    pub fn get(&self, i: usize, j: usize) -> Complex<f64> {
        self.value.get(i, j)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_target_unwraps_matrix() {
        let m = DTensor::<Complex<f64>, 2>::from_elem([1, 1], Complex::new(0.25, 0.0));
        let v = DensityValue::from_matrix(TargetShape::Scalar, m);
        assert_eq!(v.as_scalar(), Some(Complex::new(0.25, 0.0)));
        assert_eq!(v.dims(), (1, 1));
    }

    #[test]
    fn test_trace_and_hermiticity() {
        let m = DTensor::<Complex<f64>, 2>::from_fn([2, 2], |idx| match (idx[0], idx[1]) {
            (0, 0) => Complex::new(0.3, 0.0),
            (1, 1) => Complex::new(0.6, 0.0),
            (0, 1) => Complex::new(0.1, 0.2),
            _ => Complex::new(0.1, -0.2),
        });
        let v = DensityValue::from_matrix(TargetShape::Matrix(2, 2), m);
        assert!((v.trace() - Complex::new(0.9, 0.0)).norm() < 1e-15);
        assert!(v.hermiticity_error() < 1e-15);
    }

    #[test]
    #[should_panic(expected = "scalar density has no entry (0, 1)")]
    fn test_scalar_get_out_of_range_panics() {
        DensityValue::Scalar(Complex::new(1.0, 0.0)).get(0, 1);
    }

    #[test]
    fn test_degraded_flag() {
        assert!(Accuracy::Degraded { order: 1 }.is_degraded());
        assert!(!Accuracy::Exact.is_degraded());
    }
}
