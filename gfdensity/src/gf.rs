//! Read-only Green's function containers
//!
//! [`GreenFunction`] couples a [`Mesh`] with a value tensor of shape
//! `(n_points, d1, d2)`. Scalar-valued functions are stored as 1×1 matrices
//! and tagged with [`TargetShape::Scalar`] so that results come back as
//! scalars. The density routines only ever borrow these containers.

use mdarray::DTensor;
use num_complex::Complex;

use crate::error::{DensityError, Result};
use crate::mesh::{Mesh, MeshKind};

/// Value shape of a Green's function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetShape {
    Scalar,
    Matrix(usize, usize),
}

impl TargetShape {
    /// Matrix dimensions; scalars are 1×1
    pub fn dims(self) -> (usize, usize) {
        match self {
            TargetShape::Scalar => (1, 1),
            TargetShape::Matrix(d1, d2) => (d1, d2),
        }
    }

    pub fn is_scalar(self) -> bool {
        matches!(self, TargetShape::Scalar)
    }
}

/// Error if any entry of `values` is NaN or infinite, reporting its position in iteration order
pub(crate) fn ensure_finite<'a, I>(values: I, context: &'static str) -> Result<()>
where
    I: IntoIterator<Item = &'a Complex<f64>>,
{
    match values
        .into_iter()
        .position(|z| !(z.re.is_finite() && z.im.is_finite()))
    {
        Some(index) => Err(DensityError::NonFinite { context, index }),
        None => Ok(()),
    }
}

/// Green's function sampled on a mesh
#[derive(Debug, Clone)]
pub struct GreenFunction {
    mesh: Mesh,
    target: TargetShape,
    data: DTensor<Complex<f64>, 3>, // (n_points, d1, d2)
}

impl GreenFunction {
    /// Matrix-valued Green's function from a `(n_points, d1, d2)` tensor
    pub fn new(mesh: impl Into<Mesh>, data: DTensor<Complex<f64>, 3>) -> Result<Self> {
        let mesh = mesh.into();
        let (n_points, d1, d2) = *data.shape();
        if n_points != mesh.len() {
            return Err(DensityError::InvalidParameter(format!(
                "data has {} mesh points but the {} mesh has {}",
                n_points,
                mesh.kind(),
                mesh.len()
            )));
        }
        if d1 == 0 || d2 == 0 {
            return Err(DensityError::InvalidParameter(
                "target shape must not be empty".to_string(),
            ));
        }
        Ok(Self {
            mesh,
            target: TargetShape::Matrix(d1, d2),
            data,
        })
    }

    /// Scalar-valued Green's function, one value per mesh point
    pub fn scalar(mesh: impl Into<Mesh>, values: &[Complex<f64>]) -> Result<Self> {
        let mesh = mesh.into();
        if values.len() != mesh.len() {
            return Err(DensityError::InvalidParameter(format!(
                "got {} values for a {} mesh of {} points",
                values.len(),
                mesh.kind(),
                mesh.len()
            )));
        }
        let data = DTensor::<Complex<f64>, 3>::from_fn([values.len(), 1, 1], |idx| values[idx[0]]);
        Ok(Self {
            mesh,
            target: TargetShape::Scalar,
            data,
        })
    }

    /// Build by evaluating `f(point, i, j)` at every mesh point and matrix entry
    pub fn from_fn<F>(mesh: impl Into<Mesh>, target: TargetShape, f: F) -> Result<Self>
    where
        F: Fn(usize, usize, usize) -> Complex<f64>,
    {
        let mesh = mesh.into();
        let (d1, d2) = target.dims();
        if d1 == 0 || d2 == 0 {
            return Err(DensityError::InvalidParameter(
                "target shape must not be empty".to_string(),
            ));
        }
        let data = DTensor::<Complex<f64>, 3>::from_fn([mesh.len(), d1, d2], |idx| {
            f(idx[0], idx[1], idx[2])
        });
        Ok(Self { mesh, target, data })
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn kind(&self) -> MeshKind {
        self.mesh.kind()
    }

    pub fn target(&self) -> TargetShape {
        self.target
    }

    /// Matrix dimensions of one sample
    pub fn dims(&self) -> (usize, usize) {
        self.target.dims()
    }

    pub fn data(&self) -> &DTensor<Complex<f64>, 3> {
        &self.data
    }

    /// Value at mesh position `w`, matrix entry (i, j)
    #[inline]
    pub fn get(&self, w: usize, i: usize, j: usize) -> Complex<f64> {
        self.data[[w, i, j]]
    }

    /// Fail with [`DensityError::NonFinite`] if any sample is NaN or infinite
    pub fn ensure_finite(&self) -> Result<()> {
        ensure_finite(self.data.iter(), "Green's function data")
    }
}

/// Block-diagonal collection of independent Green's functions
#[derive(Debug, Clone, Default)]
pub struct BlockGreenFunction {
    names: Vec<String>,
    blocks: Vec<GreenFunction>,
}

impl BlockGreenFunction {
    /// Blocks named "0", "1", …
    pub fn new(blocks: Vec<GreenFunction>) -> Self {
        let names = (0..blocks.len()).map(|i| i.to_string()).collect();
        Self { names, blocks }
    }

    pub fn with_names(names: Vec<String>, blocks: Vec<GreenFunction>) -> Result<Self> {
        if names.len() != blocks.len() {
            return Err(DensityError::InvalidParameter(format!(
                "{} block names given for {} blocks",
                names.len(),
                blocks.len()
            )));
        }
        Ok(Self { names, blocks })
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn blocks(&self) -> &[GreenFunction] {
        &self.blocks
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GreenFunction)> {
        self.names.iter().map(String::as_str).zip(self.blocks.iter())
    }
}

impl std::ops::Index<usize> for BlockGreenFunction {
    type Output = GreenFunction;

    fn index(&self, index: usize) -> &GreenFunction {
        &self.blocks[index]
    }
}
