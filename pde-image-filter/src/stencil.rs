use crate::error::{FilterError, Result};
use crate::field::{Field, FieldShape};
use ndarray::{s, Array2, ArrayView2};
use rand::Rng;

// Range of the random stencil entries
pub const RANDOM_COEFF_MIN: i32 = -2;
pub const RANDOM_COEFF_MAX: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stencil {
    Laplacian,  // [1, -2, 1]
    Gradient,   // [-0.5, 0, 0.5]
    Brightness, // [-5, 0, 12]
}

impl Stencil {
    // Offsets 0, 1 and 2 from the diagonal
    pub fn taps(self) -> [f64; 3] {
        match self {
            Stencil::Laplacian => [1.0, -2.0, 1.0],
            Stencil::Gradient => [-0.5, 0.0, 0.5],
            Stencil::Brightness => [-5.0, 0.0, 12.0],
        }
    }

    pub fn matrix(self, n: usize) -> Result<Array2<f64>> {
        check_size(n)?;
        let taps = self.taps();
        Ok(Array2::from_shape_fn((n, n + 2), |(i, j)| {
            match j.checked_sub(i) {
                Some(offset) if offset < taps.len() => taps[offset],
                _ => 0.0,
            }
        }))
    }

    /// `S(L) · P[:, 1..C+1]`, the stencil taken along the row axis.
    pub fn apply_vertical(self, padded: ArrayView2<f64>, shape: FieldShape) -> Result<Field> {
        check_padded(&padded, shape)?;
        let (rows, cols) = shape.dim();

        let mut out = Field::zeros((rows, cols));
        for (offset, &weight) in self.taps().iter().enumerate() {
            out.scaled_add(weight, &padded.slice(s![offset..offset + rows, 1..cols + 1]));
        }
        Ok(out)
    }

    /// `P[1..L+1, :] · S(C)ᵗ`, the stencil taken along the column axis.
    pub fn apply_horizontal(self, padded: ArrayView2<f64>, shape: FieldShape) -> Result<Field> {
        check_padded(&padded, shape)?;
        let (rows, cols) = shape.dim();

        let mut out = Field::zeros((rows, cols));
        for (offset, &weight) in self.taps().iter().enumerate() {
            out.scaled_add(weight, &padded.slice(s![1..rows + 1, offset..offset + cols]));
        }
        Ok(out)
    }
}

/// Every entry is drawn fresh on each call.
pub fn random_matrix<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Result<Array2<f64>> {
    check_size(n)?;
    Ok(Array2::from_shape_simple_fn((n, n + 2), || {
        f64::from(rng.random_range(RANDOM_COEFF_MIN..=RANDOM_COEFF_MAX))
    }))
}

/// Dense equivalent of [`Stencil::apply_vertical`] for an arbitrary `(L, L + 2)` matrix.
pub fn dense_vertical(
    matrix: &Array2<f64>,
    padded: ArrayView2<f64>,
    shape: FieldShape,
) -> Result<Field> {
    check_padded(&padded, shape)?;
    check_matrix(matrix, shape.rows)?;
    Ok(matrix.dot(&padded.slice(s![.., 1..shape.cols + 1])))
}

pub fn dense_horizontal(
    matrix: &Array2<f64>,
    padded: ArrayView2<f64>,
    shape: FieldShape,
) -> Result<Field> {
    check_padded(&padded, shape)?;
    check_matrix(matrix, shape.cols)?;
    Ok(padded.slice(s![1..shape.rows + 1, ..]).dot(&matrix.t()))
}

fn check_size(n: usize) -> Result<()> {
    if n == 0 {
        return Err(FilterError::InvalidDimension(n));
    }
    Ok(())
}

fn check_matrix(matrix: &Array2<f64>, n: usize) -> Result<()> {
    if matrix.dim() != (n, n + 2) {
        return Err(FilterError::DimensionMismatch {
            expected: (n, n + 2),
            found: matrix.dim(),
        });
    }
    Ok(())
}

fn check_padded(padded: &ArrayView2<f64>, shape: FieldShape) -> Result<()> {
    if padded.dim() != shape.padded() {
        return Err(FilterError::DimensionMismatch {
            expected: shape.padded(),
            found: padded.dim(),
        });
    }
    Ok(())
}
