use std::ops::Index;

use nalgebra::{RealField, SMatrix};

/// Implicit N×N identity matrix
///
/// Only the values one and zero are stored. Indexing returns one on the
/// in-bounds diagonal and zero everywhere else, so the covariance correction
/// can use `I - K·H` without keeping a dense N² identity around.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiagonalIdentity<T: RealField + Copy, const N: usize> {
    one: T,
    zero: T,
}

impl<T: RealField + Copy, const N: usize> DiagonalIdentity<T, N> {
    pub fn new() -> Self {
        Self {
            one: nalgebra::one(),
            zero: nalgebra::zero(),
        }
    }

    /// Element (row, col) of the identity
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> T {
        self[(row, col)]
    }

    /// `I - m`, computed without building I
    pub fn complement(&self, m: &SMatrix<T, N, N>) -> SMatrix<T, N, N> {
        let mut out = -*m;
        for i in 0..N {
            out[(i, i)] += self.one;
        }
        out
    }

    /// Dense equivalent of this view
    pub fn to_dense(&self) -> SMatrix<T, N, N> {
        SMatrix::from_fn(|row, col| self.get(row, col))
    }
}

impl<T: RealField + Copy, const N: usize> Default for DiagonalIdentity<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RealField + Copy, const N: usize> Index<(usize, usize)> for DiagonalIdentity<T, N> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        if row == col && row < N {
            &self.one
        } else {
            &self.zero
        }
    }
}
