//! Decoded MAT values: numeric arrays, structs, cells, and text.

use super::data::MatData;

/// A decoded value from a MAT container.
#[derive(Debug, Clone, PartialEq)]
pub enum MatValue {
    /// Numeric or logical array.
    Numeric(MatData),

    /// Struct array.
    Struct(MatStruct),

    /// Cell array.
    Cell(MatCell),

    /// Character array.
    Char(String),

    /// A class this library does not decode (sparse, object, ...).
    Unsupported {
        /// MATLAB class name.
        class: &'static str,
        /// Array dimensions.
        shape: Vec<usize>,
    },
}

impl MatValue {
    /// MATLAB class name of the value.
    pub fn class_name(&self) -> &str {
        match self {
            MatValue::Numeric(data) => data.dtype(),
            MatValue::Struct(_) => "struct",
            MatValue::Cell(_) => "cell",
            MatValue::Char(_) => "char",
            MatValue::Unsupported { class, .. } => class,
        }
    }

    /// Array dimensions of the value.
    pub fn shape(&self) -> Vec<usize> {
        match self {
            MatValue::Numeric(data) => data.shape().to_vec(),
            MatValue::Struct(s) => s.shape.clone(),
            MatValue::Cell(c) => c.shape.clone(),
            MatValue::Char(text) => vec![1, text.chars().count()],
            MatValue::Unsupported { shape, .. } => shape.clone(),
        }
    }

    /// Borrow the numeric array, if this is one.
    pub fn as_numeric(&self) -> Option<&MatData> {
        match self {
            MatValue::Numeric(data) => Some(data),
            _ => None,
        }
    }

    /// Borrow the struct, if this is one.
    pub fn as_struct(&self) -> Option<&MatStruct> {
        match self {
            MatValue::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Strip singleton wrappers left by legacy writers.
    ///
    /// A 1×1 cell is replaced by its content, and a 1×1 struct with a
    /// single field by that field's value, until neither applies.
    pub fn unwrap_singletons(&self) -> &MatValue {
        let mut value = self;
        loop {
            value = match value {
                MatValue::Cell(cell) if cell.values.len() == 1 => &cell.values[0],
                MatValue::Struct(s) if s.len() == 1 && s.field_names.len() == 1 => {
                    &s.elements[0][0]
                }
                _ => return value,
            };
        }
    }
}

impl From<MatData> for MatValue {
    fn from(data: MatData) -> Self {
        MatValue::Numeric(data)
    }
}

impl From<MatStruct> for MatValue {
    fn from(s: MatStruct) -> Self {
        MatValue::Struct(s)
    }
}

/// A MATLAB struct array.
///
/// Elements are stored in column-major order; each element holds one value
/// per field, in `field_names` order. A struct without fields stores no
/// element rows, so its length comes from the shape.
#[derive(Debug, Clone, PartialEq)]
pub struct MatStruct {
    pub(super) shape: Vec<usize>,
    pub(super) field_names: Vec<String>,
    pub(super) elements: Vec<Vec<MatValue>>,
}

impl MatStruct {
    /// Create a 1×1 struct from `(field, value)` pairs.
    pub fn scalar<S: Into<String>>(fields: impl IntoIterator<Item = (S, MatValue)>) -> Self {
        let (field_names, values): (Vec<String>, Vec<MatValue>) =
            fields.into_iter().map(|(n, v)| (n.into(), v)).unzip();

        let elements = if field_names.is_empty() {
            Vec::new()
        } else {
            vec![values]
        };

        MatStruct {
            shape: vec![1, 1],
            field_names,
            elements,
        }
    }

    pub(crate) fn from_parts(
        shape: Vec<usize>,
        field_names: Vec<String>,
        elements: Vec<Vec<MatValue>>,
    ) -> Self {
        MatStruct {
            shape,
            field_names,
            elements,
        }
    }

    /// Array dimensions of the struct.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of struct elements.
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    /// Check if the struct array has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.field_names.iter().map(String::as_str)
    }

    /// Get a field of the element at `index`.
    pub fn element_field(&self, index: usize, name: &str) -> Option<&MatValue> {
        let column = self.field_names.iter().position(|f| f == name)?;
        self.elements.get(index)?.get(column)
    }

    /// Get a field of the first element.
    pub fn field(&self, name: &str) -> Option<&MatValue> {
        self.element_field(0, name)
    }

    /// Iterate over the `(field, value)` pairs of the first element.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &MatValue)> {
        self.field_names
            .iter()
            .map(String::as_str)
            .zip(self.elements.first().into_iter().flatten())
    }
}

/// A MATLAB cell array, elements in column-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct MatCell {
    pub(super) shape: Vec<usize>,
    pub(super) values: Vec<MatValue>,
}

impl MatCell {
    /// Create a cell array from its shape and column-major values.
    pub fn new(shape: Vec<usize>, values: Vec<MatValue>) -> Self {
        MatCell { shape, values }
    }

    /// Cell contents in column-major order.
    pub fn values(&self) -> &[MatValue] {
        &self.values
    }
}
