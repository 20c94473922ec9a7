use core::fmt::Display;

use derive_new::new;

use super::Dynamicity;
use crate::UnsupportedError;

/// Shape of a matrix multiplication in the usual convention: the lhs is `m`x`k`, the rhs is
/// `k`x`n` and the accumulator/result is `m`x`n`.
///
/// `accumulate` tells whether the matmul accumulates into an existing accumulator
/// (`C += A * B`) or overwrites the result (`C = A * B`), and `dynamicity` whether
/// the sizes are fixed in the tensor types or only known at runtime.
#[derive(new, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TestShape {
    pub m: u32,
    pub k: u32,
    pub n: u32,
    pub accumulate: bool,
    pub dynamicity: Dynamicity,
}

/// A size that may appear in a tensor type such as `tensor<?x4xf32>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DimSize {
    Fixed(u32),
    /// Maps to `?` in tensor types.
    Dynamic,
}

impl DimSize {
    pub fn new(size: u32, dynamicity: Dynamicity) -> Result<Self, UnsupportedError> {
        match dynamicity {
            Dynamicity::Dynamic => Ok(DimSize::Dynamic),
            Dynamicity::Static => Ok(DimSize::Fixed(size)),
            Dynamicity::Mixed => Err(UnsupportedError::MixedDynamicity),
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, DimSize::Dynamic)
    }

    /// Form used inside identifiers, where `?` isn't allowed.
    pub fn ident(&self) -> DimIdent {
        DimIdent(*self)
    }
}

impl Display for DimSize {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DimSize::Fixed(size) => write!(f, "{size}"),
            DimSize::Dynamic => f.write_str("?"),
        }
    }
}

/// Identifier-safe rendering of a [DimSize], e.g. `matmul_DYNxDYN`.
#[derive(Debug, Clone, Copy)]
pub struct DimIdent(DimSize);

impl Display for DimIdent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.0 {
            DimSize::Fixed(size) => write!(f, "{size}"),
            DimSize::Dynamic => f.write_str("DYN"),
        }
    }
}

/// Resolved sizes of the lhs, rhs and accumulator of a testcase, as they appear in the
/// tensor types of the generated function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResolvedShape {
    pub lhs_rows: DimSize,
    pub lhs_cols: DimSize,
    pub rhs_rows: DimSize,
    pub rhs_cols: DimSize,
    pub acc_rows: DimSize,
    pub acc_cols: DimSize,
}

impl ResolvedShape {
    /// Resolves the tensor sizes of a testcase.
    ///
    /// With `transpose_rhs` the rhs is stored as `n`x`k` instead of `k`x`n`.
    pub fn resolve(shape: &TestShape, transpose_rhs: bool) -> Result<Self, UnsupportedError> {
        let dim = |size| DimSize::new(size, shape.dynamicity);

        let (rhs_rows, rhs_cols) = match transpose_rhs {
            true => (dim(shape.n)?, dim(shape.k)?),
            false => (dim(shape.k)?, dim(shape.n)?),
        };

        Ok(Self {
            lhs_rows: dim(shape.m)?,
            lhs_cols: dim(shape.k)?,
            rhs_rows,
            rhs_cols,
            acc_rows: dim(shape.m)?,
            acc_cols: dim(shape.n)?,
        })
    }
}
