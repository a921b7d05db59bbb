//! Individual numeric array representation.
//!
//! [`MatData`] represents a single numeric array from a MAT container,
//! providing access to its data as ndarray arrays.

use ndarray::{Array1, Array2, ShapeBuilder};

/// Plausible datenum range for instrument clocks (years 1900 to 2100).
const DATENUM_RANGE: std::ops::RangeInclusive<f64> = 693_962.0..=767_011.0;

/// A numeric array from a MAT container.
///
/// `MatData` wraps a single array, providing:
/// - Shape information
/// - Data access as 1D or 2D arrays
/// - Type information
///
/// # Data Layout
///
/// MATLAB stores arrays in column-major (Fortran) order. `real_data` keeps
/// that order, and [`MatData::to_array2`] builds a column-major view so
/// indexing `[row, col]` matches MATLAB's `(row, col)`.
///
/// # Example
///
/// ```
/// use flume_rs::MatData;
/// use ndarray::array;
///
/// let data = MatData::from_array2("eta", &array![[1.0, 2.0], [3.0, 4.0]]);
/// assert_eq!(data.shape(), &[2, 2]);
/// assert_eq!(data.to_array2().unwrap()[[1, 0]], 3.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MatData {
    /// Variable or field name.
    name: String,

    /// Shape of the array.
    shape: Vec<usize>,

    /// Real part of the data, column-major.
    real_data: Vec<f64>,

    /// Imaginary part (only for complex data).
    imag_data: Option<Vec<f64>>,

    /// MATLAB class name (double, single, int16, logical, ...).
    dtype: &'static str,
}

impl MatData {
    /// Create MatData from decoded parts.
    pub(crate) fn new(
        name: impl Into<String>,
        shape: Vec<usize>,
        real_data: Vec<f64>,
        imag_data: Option<Vec<f64>>,
        dtype: &'static str,
    ) -> Self {
        MatData {
            name: name.into(),
            shape,
            real_data,
            imag_data,
            dtype,
        }
    }

    /// Create a double row vector (shape `[1, N]`).
    pub fn from_array1(name: impl Into<String>, values: &Array1<f64>) -> Self {
        Self::new(
            name,
            vec![1, values.len()],
            values.to_vec(),
            None,
            "double",
        )
    }

    /// Create a double column vector (shape `[N, 1]`).
    pub fn column(name: impl Into<String>, values: &[f64]) -> Self {
        Self::new(name, vec![values.len(), 1], values.to_vec(), None, "double")
    }

    /// Create a double matrix from a 2D array.
    pub fn from_array2(name: impl Into<String>, values: &Array2<f64>) -> Self {
        let (rows, cols) = values.dim();
        // Transposed logical order is column-major order
        let real_data = values.t().iter().copied().collect();
        Self::new(name, vec![rows, cols], real_data, None, "double")
    }

    /// Return a copy carrying a different name.
    pub(crate) fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Get the variable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the shape of the array.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Get the number of dimensions.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Check if the array is 1-dimensional.
    ///
    /// MATLAB stores row vectors as [1, N] and column vectors as [N, 1].
    /// This returns true for both, as well as true 1D arrays and
    /// arrays with no elements.
    pub fn is_1d(&self) -> bool {
        self.is_empty() || self.shape.iter().filter(|&&d| d != 1).count() <= 1
    }

    /// Check if the array is 2-dimensional.
    pub fn is_2d(&self) -> bool {
        self.shape.len() == 2
    }

    /// Check if the data is complex.
    pub fn is_complex(&self) -> bool {
        self.imag_data.is_some()
    }

    /// Get the total number of elements.
    pub fn len(&self) -> usize {
        self.real_data.len()
    }

    /// Check if the array is empty.
    pub fn is_empty(&self) -> bool {
        self.real_data.is_empty()
    }

    /// Get the MATLAB class name.
    pub fn dtype(&self) -> &str {
        self.dtype
    }

    /// Get the real part as a 1D array.
    ///
    /// Returns `None` unless the array is a vector in one of its
    /// MATLAB layouts.
    pub fn to_array1(&self) -> Option<Array1<f64>> {
        if !self.is_1d() {
            return None;
        }

        Some(Array1::from_vec(self.real_data.clone()))
    }

    /// Get the real part as a 2D array.
    ///
    /// Returns `None` when the array does not have exactly two axes.
    pub fn to_array2(&self) -> Option<Array2<f64>> {
        let (rows, cols) = match self.shape.as_slice() {
            [r, c] => (*r, *c),
            _ => return None,
        };

        Array2::from_shape_vec((rows, cols).f(), self.real_data.clone()).ok()
    }

    /// Get raw real data slice (column-major).
    pub fn real_data(&self) -> &[f64] {
        &self.real_data
    }

    /// Get raw imaginary data slice (if complex).
    pub fn imag_data(&self) -> Option<&[f64]> {
        self.imag_data.as_deref()
    }

    /// Check if values are monotonically non-decreasing.
    pub fn is_monotonically_increasing(&self) -> bool {
        self.real_data.windows(2).all(|w| w[1] >= w[0] - 1e-10)
    }

    /// Check if this array looks like a vector of instrument date codes.
    ///
    /// Heuristics:
    /// 1. Array is a non-empty vector
    /// 2. Values lie in the datenum range of years 1900-2100
    /// 3. Values are monotonically increasing
    pub fn is_likely_datenum(&self) -> bool {
        self.is_1d()
            && !self.is_empty()
            && self.real_data.iter().all(|v| DATENUM_RANGE.contains(v))
            && self.is_monotonically_increasing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_is_1d() {
        assert!(MatData::column("c", &[1.0, 2.0, 3.0]).is_1d());
        assert!(MatData::from_array1("r", &array![1.0, 2.0]).is_1d());
        assert!(MatData::new("e", vec![0, 0], vec![], None, "double").is_1d());
        assert!(!MatData::from_array2("m", &array![[1.0, 2.0], [3.0, 4.0]]).is_1d());
    }

    #[test]
    fn test_array2_is_column_major() {
        let m = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let data = MatData::from_array2("m", &m);

        assert_eq!(data.real_data(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
        assert_eq!(data.to_array2().unwrap(), m);
        assert!(data.to_array1().is_none());
    }

    #[test]
    fn test_three_axes_has_no_2d_view() {
        let data = MatData::new("cube", vec![2, 2, 2], vec![0.0; 8], None, "double");
        assert!(data.to_array2().is_none());
        assert_eq!(data.ndim(), 3);
    }

    #[test]
    fn test_datenum_heuristic() {
        let dates = MatData::column("date", &[734_000.5, 734_000.6, 734_000.7]);
        assert!(dates.is_likely_datenum());

        let seconds = MatData::column("t", &[0.0, 0.1, 0.2]);
        assert!(!seconds.is_likely_datenum());

        let backwards = MatData::column("d", &[734_001.0, 734_000.0]);
        assert!(!backwards.is_likely_datenum());
    }
}
