//! Extraction of the wave-record arrays from a container.
//!
//! [`WaveFields`] is the single place that knows how flume recordings are
//! laid out: a top-level struct (`eta` by default) whose fields hold the
//! time codes, gauge elevations, gauge positions, and wave maker series.
//! Each field has an explicit expected shape; anything else is rejected
//! before the arrays reach the loader.

use std::path::Path;

use log::{debug, warn};
use ndarray::{Array1, Array2};

use crate::error::{Error, Result};
use super::data::MatData;
use super::file::MatFile;
use super::value::{MatStruct, MatValue};

/// Default name of the top-level struct.
pub const DEFAULT_STRUCT_NAME: &str = "eta";

/// Expected layout of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    /// Any of `(N,)`, `(1, N)`, `(N, 1)`.
    Vector,
    /// Exactly two axes.
    Matrix,
}

impl FieldShape {
    /// Human-readable form used in shape errors.
    pub fn expected(self) -> &'static str {
        match self {
            FieldShape::Vector => "a vector (N,), (1, N) or (N, 1)",
            FieldShape::Matrix => "exactly two axes",
        }
    }

    /// Unwrap `value` into the layout this contract asks for.
    pub fn extract(self, value: &MatValue, name: &str, path: &Path) -> Result<FieldArray> {
        match self {
            FieldShape::Vector => extract_vector(value, name, path).map(FieldArray::Vector),
            FieldShape::Matrix => extract_matrix(value, name, path).map(FieldArray::Matrix),
        }
    }
}

/// A field after extraction, in the layout its contract selected.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldArray {
    /// One axis.
    Vector(Array1<f64>),
    /// Two axes.
    Matrix(Array2<f64>),
}

impl FieldArray {
    /// Dimensions of the extracted array.
    pub fn shape(&self) -> &[usize] {
        match self {
            FieldArray::Vector(v) => v.shape(),
            FieldArray::Matrix(m) => m.shape(),
        }
    }
}

/// One extracted field under its qualified name (`eta.date`).
#[derive(Debug)]
struct Extracted {
    name: String,
    array: FieldArray,
}

impl Extracted {
    fn into_vector(self) -> Result<Array1<f64>> {
        match self.array {
            FieldArray::Vector(v) => Ok(v),
            other => Err(Error::shape_mismatch(
                self.name,
                other.shape(),
                FieldShape::Vector.expected(),
            )),
        }
    }

    fn into_matrix(self) -> Result<Array2<f64>> {
        match self.array {
            FieldArray::Matrix(m) => Ok(m),
            other => Err(Error::shape_mismatch(
                self.name,
                other.shape(),
                FieldShape::Matrix.expected(),
            )),
        }
    }
}

/// A required field and its shape contract.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Field name inside the struct.
    pub name: &'static str,
    /// Expected layout.
    pub shape: FieldShape,
}

impl FieldSpec {
    /// A field holding a vector.
    pub const fn vector(name: &'static str) -> Self {
        FieldSpec {
            name,
            shape: FieldShape::Vector,
        }
    }

    /// A field holding a matrix.
    pub const fn matrix(name: &'static str) -> Self {
        FieldSpec {
            name,
            shape: FieldShape::Matrix,
        }
    }
}

/// The fields a flume recording must provide.
pub const WAVE_FIELDS: [FieldSpec; 6] = [
    FieldSpec::vector("date"),
    FieldSpec::matrix("eta"),
    FieldSpec::vector("x"),
    FieldSpec::vector("y"),
    FieldSpec::vector("eta_wm"),
    FieldSpec::vector("x_wm"),
];

/// Raw arrays of one recording, unwrapped but not yet cross-checked.
#[derive(Debug, Clone)]
pub struct WaveFields {
    /// Instrument time codes, length T.
    pub date: Array1<f64>,
    /// Gauge elevations, T×G.
    pub eta: Array2<f64>,
    /// Gauge cross-shore positions, length G.
    pub x: Array1<f64>,
    /// Gauge along-shore positions, length G.
    pub y: Array1<f64>,
    /// Elevation in front of the wave maker, length T.
    pub eta_wm: Array1<f64>,
    /// Wave maker position, length T.
    pub x_wm: Array1<f64>,
}

/// Where the named fields are looked up.
enum Source<'a> {
    Struct(&'a MatStruct),
    TopLevel(&'a MatFile),
}

impl<'a> Source<'a> {
    fn get(&self, name: &str) -> Option<&'a MatValue> {
        match self {
            Source::Struct(s) => s.field(name),
            Source::TopLevel(mat) => mat.get(name),
        }
    }
}

impl WaveFields {
    /// Extract the recording arrays from `mat`.
    ///
    /// The fields are read from the top-level struct `struct_name`. When
    /// that variable is a plain numeric array and a top-level `date`
    /// exists, the fields are read from top-level variables instead.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingVariable`] if the struct or one of its fields is
    ///   absent
    /// - [`Error::MalformedContainer`] if a field is not numeric
    /// - [`Error::ShapeMismatch`] if a field violates its shape contract
    pub fn from_mat(mat: &MatFile, struct_name: &str) -> Result<Self> {
        let root = mat.require(struct_name)?;

        let (source, prefix) = match root {
            MatValue::Struct(s) => {
                if s.is_empty() {
                    return Err(Error::malformed(
                        mat.path(),
                        format!("struct '{struct_name}' has no elements"),
                    ));
                }
                if s.len() > 1 {
                    warn!(
                        "Struct '{}' has {} elements; using the first",
                        struct_name,
                        s.len()
                    );
                }
                (Source::Struct(s), format!("{struct_name}."))
            }
            MatValue::Numeric(_) if mat.get("date").is_some() => {
                debug!("'{}' is numeric; reading fields from top level", struct_name);
                (Source::TopLevel(mat), String::new())
            }
            other => {
                return Err(Error::malformed(
                    mat.path(),
                    format!(
                        "'{}' is a {} array, expected a struct",
                        struct_name,
                        other.class_name()
                    ),
                ))
            }
        };

        let [date, eta, x, y, eta_wm, x_wm] =
            extract_fields(&source, &prefix, mat.path(), WAVE_FIELDS);

        // Struct literal order matches the table, so the first bad field wins
        Ok(WaveFields {
            date: date?.into_vector()?,
            eta: eta?.into_matrix()?,
            x: x?.into_vector()?,
            y: y?.into_vector()?,
            eta_wm: eta_wm?.into_vector()?,
            x_wm: x_wm?.into_vector()?,
        })
    }

    /// Number of time samples (length of `date`).
    pub fn num_times(&self) -> usize {
        self.date.len()
    }

    /// Number of gauges (length of `x`).
    pub fn num_gauges(&self) -> usize {
        self.x.len()
    }
}

/// Extract every field of `specs`, each under its own shape contract.
fn extract_fields<const N: usize>(
    source: &Source<'_>,
    prefix: &str,
    path: &Path,
    specs: [FieldSpec; N],
) -> [Result<Extracted>; N] {
    specs.map(|spec| -> Result<Extracted> {
        let (name, value) = lookup(source, prefix, &spec, path)?;
        let array = spec.shape.extract(value, &name, path)?;
        Ok(Extracted { name, array })
    })
}

fn lookup<'a>(
    source: &Source<'a>,
    prefix: &str,
    spec: &FieldSpec,
    path: &Path,
) -> Result<(String, &'a MatValue)> {
    let qualified = format!("{prefix}{}", spec.name);
    let value = source
        .get(spec.name)
        .ok_or_else(|| Error::missing_variable(&qualified, path))?;
    Ok((qualified, value))
}

fn numeric<'v>(value: &'v MatValue, name: &str, path: &Path) -> Result<&'v MatData> {
    value.unwrap_singletons().as_numeric().ok_or_else(|| {
        Error::malformed(
            path,
            format!("'{}' is a {} array, expected numeric", name, value.class_name()),
        )
    })
}

/// Unwrap a field holding a vector in any MATLAB orientation.
pub fn extract_vector(value: &MatValue, name: &str, path: &Path) -> Result<Array1<f64>> {
    let data = numeric(value, name, path)?;
    data.to_array1()
        .ok_or_else(|| Error::shape_mismatch(name, data.shape(), FieldShape::Vector.expected()))
}

/// Unwrap a field holding a matrix with exactly two axes.
pub fn extract_matrix(value: &MatValue, name: &str, path: &Path) -> Result<Array2<f64>> {
    let data = numeric(value, name, path)?;
    data.to_array2()
        .ok_or_else(|| Error::shape_mismatch(name, data.shape(), FieldShape::Matrix.expected()))
}
