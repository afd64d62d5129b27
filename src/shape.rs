//! Tensor shapes and the broadcast/matmul shape rules.
//!
//! Shapes are row-major dimension lists. The broadcast rule is the
//! trailing-aligned one: dimensions are matched from the right, and a
//! dimension of 1 stretches to match its partner.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A tensor shape.
///
/// # Examples
///
/// ```
/// use fxpir::Shape;
///
/// let a = Shape::new(&[2, 3]);
/// let b = Shape::new(&[3]);
/// assert_eq!(a.broadcast_with(&b), Some(Shape::new(&[2, 3])));
/// assert_eq!(a.numel(), 6);
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    /// Creates a new shape from dimensions.
    #[must_use]
    pub fn new(dims: &[usize]) -> Self {
        Self {
            dims: dims.to_vec(),
        }
    }

    /// Scalar shape (0 dimensions).
    #[must_use]
    pub fn scalar() -> Self {
        Self { dims: Vec::new() }
    }

    /// Number of dimensions (rank).
    #[must_use]
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Total number of elements.
    #[must_use]
    pub fn numel(&self) -> usize {
        self.dims.iter().product()
    }

    /// Dimension sizes as a slice.
    #[must_use]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Size of a specific dimension.
    #[must_use]
    pub fn dim(&self, axis: usize) -> Option<usize> {
        self.dims.get(axis).copied()
    }

    /// Whether this is a scalar (0-dimensional).
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        self.dims.is_empty()
    }

    /// Default strides for a contiguous row-major layout.
    #[must_use]
    pub fn contiguous_strides(&self) -> Vec<usize> {
        let rank = self.dims.len();
        if rank == 0 {
            return Vec::new();
        }
        let mut strides = vec![0usize; rank];
        strides[rank - 1] = 1;
        for i in (0..rank - 1).rev() {
            strides[i] = strides[i + 1] * self.dims[i + 1];
        }
        strides
    }

    /// Attempts to broadcast this shape with another.
    ///
    /// Returns the broadcast shape, or `None` if incompatible.
    #[must_use]
    pub fn broadcast_with(&self, other: &Shape) -> Option<Shape> {
        let max_rank = self.rank().max(other.rank());
        let mut result = Vec::with_capacity(max_rank);

        for i in 0..max_rank {
            let a = if i < self.rank() {
                self.dims[self.rank() - 1 - i]
            } else {
                1
            };
            let b = if i < other.rank() {
                other.dims[other.rank() - 1 - i]
            } else {
                1
            };

            if a == b {
                result.push(a);
            } else if a == 1 {
                result.push(b);
            } else if b == 1 {
                result.push(a);
            } else {
                return None;
            }
        }

        result.reverse();
        Some(Shape { dims: result })
    }

    /// Result shape of a batched matrix product `self × rhs`.
    ///
    /// `self` must be `[..., m, k]` with the leading dimensions treated as
    /// batch dimensions, and `rhs` must be exactly `[k, n]`. Returns
    /// `[..., m, n]`, or `None` if the shapes do not contract.
    #[must_use]
    pub fn matmul_with(&self, rhs: &Shape) -> Option<Shape> {
        if self.rank() < 2 || rhs.rank() != 2 {
            return None;
        }
        let k_lhs = self.dims[self.rank() - 1];
        let (k_rhs, n) = (rhs.dims[0], rhs.dims[1]);
        if k_lhs != k_rhs {
            return None;
        }
        let mut dims = self.dims.clone();
        let last = dims.len() - 1;
        dims[last] = n;
        Some(Shape { dims })
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shape({:?})", self.dims.as_slice())
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, "x")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, "]")
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Shape::new(dims)
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Shape { dims }
    }
}

macro_rules! impl_shape_from_array {
    ($($n:expr),*) => {
        $(
            impl From<[usize; $n]> for Shape {
                fn from(dims: [usize; $n]) -> Self {
                    Shape::new(&dims)
                }
            }
        )*
    };
}

impl_shape_from_array!(0, 1, 2, 3, 4, 5, 6);
