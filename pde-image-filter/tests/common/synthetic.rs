use ndarray::{Array2, Array3};

/// Zero field with a single raised cell.
pub fn peak(rows: usize, cols: usize, at: (usize, usize), value: f64) -> Array2<f64> {
    let mut field = Array2::zeros((rows, cols));
    field[at] = value;
    field
}

/// RGB-like image whose channels differ: diagonal stripes, a ramp and a checkerboard.
pub fn test_image(rows: usize, cols: usize) -> Array3<f64> {
    Array3::from_shape_fn((rows, cols, 3), |(i, j, c)| match c {
        0 => (((i + j) / 2) % 2) as f64 * 200.0,
        1 => 255.0 * (j as f64) / (cols.max(2) - 1) as f64,
        _ => ((i / 2 + j / 2) % 2) as f64 * 120.0 + 30.0,
    })
}

/// `test_image` scaled to `[0, 0.1]`, small enough for the quartic filter to stay finite.
pub fn dim_test_image(rows: usize, cols: usize) -> Array3<f64> {
    test_image(rows, cols) / 2550.0
}

/// Bitwise equality, so NaN compares equal to the same NaN.
pub fn same_bits<D: ndarray::Dimension>(
    a: &ndarray::ArrayView<f64, D>,
    b: &ndarray::ArrayView<f64, D>,
) -> bool {
    a.shape() == b.shape() && a.iter().zip(b.iter()).all(|(x, y)| x.to_bits() == y.to_bits())
}
