use crate::error::{FilterError, Result};
use ndarray::{s, Array2, ArrayView2, ArrayView3};

pub type Field = Array2<f64>; // [[row, col]]
pub type Image = ndarray::Array3<f64>; // [[row, col, channel]]

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldShape {
    pub rows: usize,
    pub cols: usize,
}

impl FieldShape {
    pub fn new(rows: usize, cols: usize) -> Self {
        FieldShape { rows, cols }
    }

    pub fn of(field: &ArrayView2<f64>) -> Result<Self> {
        let (rows, cols) = field.dim();
        if rows == 0 || cols == 0 {
            return Err(FilterError::InvalidShape {
                shape: vec![rows, cols],
                reason: "field must have at least one row and one column".to_string(),
            });
        }
        Ok(FieldShape { rows, cols })
    }

    pub fn padded(&self) -> (usize, usize) {
        (self.rows + 2, self.cols + 2)
    }

    pub fn dim(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }
}

/// Shape of an image as `(rows, cols, channels)`, rejecting empty axes.
pub fn image_shape(image: &ArrayView3<f64>) -> Result<(usize, usize, usize)> {
    let (rows, cols, channels) = image.dim();
    if rows == 0 || cols == 0 || channels == 0 {
        return Err(FilterError::InvalidShape {
            shape: vec![rows, cols, channels],
            reason: "image must have non-empty row, column and channel axes".to_string(),
        });
    }
    Ok((rows, cols, channels))
}

/// Pads a field by one cell on every side, replicating the outermost values.
///
/// Rows are replicated first, then columns of the row-padded array, so each
/// corner of the result equals the matching corner of the input.
pub fn extend_borders(field: ArrayView2<f64>) -> Result<Field> {
    let shape = FieldShape::of(&field)?;
    let (rows, cols) = shape.dim();

    let mut padded = Array2::<f64>::zeros(shape.padded());
    padded.slice_mut(s![1..rows + 1, 1..cols + 1]).assign(&field);

    // Top and bottom
    padded
        .slice_mut(s![0, 1..cols + 1])
        .assign(&field.row(0));
    padded
        .slice_mut(s![rows + 1, 1..cols + 1])
        .assign(&field.row(rows - 1));

    // Left and right, taken from the row-padded array
    {
        let (mut left, first) = padded.multi_slice_mut((s![.., 0], s![.., 1]));
        left.assign(&first);
    }
    {
        let (mut right, last) = padded.multi_slice_mut((s![.., cols + 1], s![.., cols]));
        right.assign(&last);
    }

    Ok(padded)
}
