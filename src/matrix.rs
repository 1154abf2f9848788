//! Dense matrix buffer shared by the accessor contract and dense storage.

/// A dense, row-major `rows × cols` matrix owning a flat contiguous buffer.
///
/// This is the buffer type the [`DataAccessor`](crate::DataAccessor) fills
/// and the payload of [`BlockData::Dense`](crate::BlockData). Deliberately
/// minimal: entry access, slice views, and the handful of vector kernels the
/// engine needs. Dimension agreement on the kernels is the caller's job and
/// is checked with debug assertions; the public consumer surface in
/// [`storage`](crate::storage) performs the real error checking.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

impl DenseMatrix {
    /// Zero-initialized `rows × cols` matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![0.0; rows * cols],
            rows,
            cols,
        }
    }

    /// Build from an existing row-major buffer. `data.len()` must equal
    /// `rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Self {
        assert_eq!(
            data.len(),
            rows * cols,
            "buffer length {} does not match {rows}x{cols}",
            data.len()
        );
        Self { data, rows, cols }
    }

    /// Build by evaluating `f(row, col)` for every entry.
    pub fn from_fn<F: FnMut(usize, usize) -> f64>(rows: usize, cols: usize, mut f: F) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                data.push(f(i, j));
            }
        }
        Self { data, rows, cols }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Entry at `(row, col)`.
    #[inline]
    pub fn value(&self, row: usize, col: usize) -> f64 {
        debug_assert!(row < self.rows && col < self.cols);
        self.data[row * self.cols + col]
    }

    /// Set the entry at `(row, col)`.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        debug_assert!(row < self.rows && col < self.cols);
        self.data[row * self.cols + col] = value;
    }

    /// Contiguous slice view of one row.
    #[inline]
    pub fn row(&self, row: usize) -> &[f64] {
        debug_assert!(row < self.rows);
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Mutable slice view of one row.
    #[inline]
    pub fn row_mut(&mut self, row: usize) -> &mut [f64] {
        debug_assert!(row < self.rows);
        &mut self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Flat row-major view of the whole buffer.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Mutable flat row-major view of the whole buffer.
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Frobenius norm: square root of the sum of squared entries.
    pub fn frobenius_norm(&self) -> f64 {
        self.data.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// True when every entry is finite (no NaN or infinity).
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }

    /// Accumulate `y += alpha * A * x`. `x.len()` must equal `cols`,
    /// `y.len()` must equal `rows`.
    pub fn apply(&self, alpha: f64, x: &[f64], y: &mut [f64]) {
        debug_assert_eq!(x.len(), self.cols);
        debug_assert_eq!(y.len(), self.rows);
        for (i, yi) in y.iter_mut().enumerate() {
            let row = &self.data[i * self.cols..(i + 1) * self.cols];
            let dot: f64 = row.iter().zip(x.iter()).map(|(a, b)| a * b).sum();
            *yi += alpha * dot;
        }
    }

    /// Accumulate `y += alpha * Aᵀ * x`. `x.len()` must equal `rows`,
    /// `y.len()` must equal `cols`.
    pub fn apply_transpose(&self, alpha: f64, x: &[f64], y: &mut [f64]) {
        debug_assert_eq!(x.len(), self.rows);
        debug_assert_eq!(y.len(), self.cols);
        for (i, &xi) in x.iter().enumerate() {
            let row = &self.data[i * self.cols..(i + 1) * self.cols];
            let scale = alpha * xi;
            for (yj, &aij) in y.iter_mut().zip(row.iter()) {
                *yj += scale * aij;
            }
        }
    }

    /// Heap footprint of the buffer in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.data.len() * std::mem::size_of::<f64>()
    }
}
