//! Least-squares fitter for complex design matrices
//!
//! Solves min ||A * coeffs - values||^2 for a complex matrix A and complex
//! coefficients, for one or many right-hand sides at once.
//!
//! Strategy: flatten to an equivalent real problem and solve it with a real SVD.
//!   coeffs = x + i y
//!   A_real ∈ R^{2n×2m}: rows [Re(A[p,:]), -Im(A[p,:])] and [Im(A[p,:]), Re(A[p,:])]
//!   values_flat ∈ R^{2n}: [Re(v[0]); Im(v[0]); Re(v[1]); Im(v[1]); ...]

use mdarray::DTensor;
use num_complex::Complex;

use crate::error::{DensityError, Result};

/// SVD decomposition for real matrices
struct RealSVD {
    u: DTensor<f64, 2>,  // (n_rows, min_dim)
    s: Vec<f64>,         // (min_dim,)
    vt: DTensor<f64, 2>, // (min_dim, n_cols)
}

/// Fitter for complex matrix with complex coefficients: A ∈ C^{n×m}
///
/// Singular values below `rcond * s_max` are discarded, so a rank-deficient
/// design yields the minimum-norm solution.
pub(crate) struct ComplexMatrixFitter {
    matrix: DTensor<Complex<f64>, 2>, // (n_points, basis_size)
    svd: RealSVD,                     // of the (2n, 2m) flattened matrix
    rcond: f64,
}

impl ComplexMatrixFitter {
    /// Create a fitter and factorize the design matrix
    pub fn new(matrix: DTensor<Complex<f64>, 2>) -> Result<Self> {
        let (n_points, basis_size) = *matrix.shape();

        let matrix_real = DTensor::<f64, 2>::from_fn([2 * n_points, 2 * basis_size], |idx| {
            let p = idx[0] / 2;
            let j = idx[1] % basis_size;
            let val = matrix[[p, j]];
            let imag_column = idx[1] >= basis_size;
            match (idx[0] % 2 == 0, imag_column) {
                (true, false) => val.re,
                (true, true) => -val.im,
                (false, false) => val.im,
                (false, true) => val.re,
            }
        });

        let svd = compute_real_svd(&matrix_real)?;
        Ok(Self {
            matrix,
            svd,
            rcond: 1e-14,
        })
    }

    /// Number of data points
    pub fn n_points(&self) -> usize {
        self.matrix.shape().0
    }

    /// Number of basis functions (coefficients)
    pub fn basis_size(&self) -> usize {
        self.matrix.shape().1
    }

    /// Fit 2D complex tensor (along dim=0)
    ///
    /// # Arguments
    /// * `values_2d` - Shape: [n_points, extra_size]
    ///
    /// # Returns
    /// Complex coefficients tensor, shape: [basis_size, extra_size]
    pub fn fit_2d(&self, values_2d: &DTensor<Complex<f64>, 2>) -> DTensor<Complex<f64>, 2> {
        let (n_points, extra_size) = *values_2d.shape();
        assert_eq!(
            n_points,
            self.n_points(),
            "values_2d.shape().0={} must equal n_points={}",
            n_points,
            self.n_points()
        );

        // Flatten complex values to real: [n_points, extra_size] → [2*n_points, extra_size]
        let values_flat = DTensor::<f64, 2>::from_fn([2 * n_points, extra_size], |idx| {
            let val = values_2d[[idx[0] / 2, idx[1]]];
            if idx[0] % 2 == 0 { val.re } else { val.im }
        });

        let svd = &self.svd;
        let s_max = svd.s.iter().cloned().fold(0.0, f64::max);
        let cutoff = self.rcond * s_max;

        // coeffs_flat = V * S^{-1} * U^T * values_flat

        // 1. U^T * values_flat
        let ut = svd.u.transpose().to_tensor();
        let ut_values = matmul(&ut, &values_flat);

        // 2. S^{-1} * (U^T * values_flat), dropping negligible singular values
        let min_dim = svd.s.len();
        let s_inv_ut_values = DTensor::<f64, 2>::from_fn([min_dim, extra_size], |idx| {
            let s = svd.s[idx[0]];
            if s > cutoff { ut_values[[idx[0], idx[1]]] / s } else { 0.0 }
        });

        // 3. V * (S^{-1} * U^T * values_flat)
        let v = svd.vt.transpose().to_tensor(); // [2*basis_size, min_dim]
        let coeffs_flat = matmul(&v, &s_inv_ut_values);

        // Recombine: first half of the rows is Re(coeffs), second half Im(coeffs)
        let basis_size = self.basis_size();
        DTensor::<Complex<f64>, 2>::from_fn([basis_size, extra_size], |idx| {
            Complex::new(
                coeffs_flat[[idx[0], idx[1]]],
                coeffs_flat[[basis_size + idx[0], idx[1]]],
            )
        })
    }

    /// Evaluate 2D complex coefficients: values_2d = A * coeffs_2d
    pub fn evaluate_2d(&self, coeffs_2d: &DTensor<Complex<f64>, 2>) -> DTensor<Complex<f64>, 2> {
        let (basis_size, extra_size) = *coeffs_2d.shape();
        assert_eq!(
            basis_size,
            self.basis_size(),
            "coeffs_2d.shape().0={} must equal basis_size={}",
            basis_size,
            self.basis_size()
        );

        let n_points = self.n_points();
        DTensor::<Complex<f64>, 2>::from_fn([n_points, extra_size], |idx| {
            (0..basis_size)
                .map(|l| self.matrix[[idx[0], l]] * coeffs_2d[[l, idx[1]]])
                .sum()
        })
    }
}

/// C = A * B on the Faer backend
fn matmul(a: &DTensor<f64, 2>, b: &DTensor<f64, 2>) -> DTensor<f64, 2> {
    use mdarray_linalg::prelude::{MatMul, MatMulBuilder};
    use mdarray_linalg_faer::Faer;

    Faer.matmul(a, b).eval()
}

/// Compute SVD of a real matrix using mdarray-linalg
fn compute_real_svd(matrix: &DTensor<f64, 2>) -> Result<RealSVD> {
    use mdarray_linalg::prelude::SVD;
    use mdarray_linalg::svd::SVDDecomp;
    use mdarray_linalg_faer::Faer;

    let mut a = matrix.clone();
    let SVDDecomp { u, s, vt } = Faer.svd(&mut *a).map_err(|e| {
        DensityError::InvalidParameter(format!("SVD of the tail design matrix failed: {:?}", e))
    })?;

    // Extract singular values from first row
    let min_dim = s.shape().0.min(s.shape().1);
    let s_vec: Vec<f64> = (0..min_dim).map(|i| s[[0, i]]).collect();

    // Keep the thin factors only
    let (n_rows, n_cols) = *matrix.shape();
    let k = s_vec.len().min(n_rows.min(n_cols));
    let u = DTensor::<f64, 2>::from_fn([n_rows, k], |idx| u[[idx[0], idx[1]]]);
    let vt = DTensor::<f64, 2>::from_fn([k, n_cols], |idx| vt[[idx[0], idx[1]]]);
    let s_vec = s_vec.into_iter().take(k).collect();

    Ok(RealSVD { u, s: s_vec, vt })
}
