//! Level 5 MAT container writing.
//!
//! [`MatWriter`] encodes numeric arrays, structs, cells and text as a
//! little-endian Level 5 container, optionally compressing each variable
//! with zlib the way MATLAB's default v7 format does.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::{Error, Result};
use super::element::{
    FLAG_COMPLEX, HEADER_TEXT_LEN, MI_COMPRESSED, MI_DOUBLE, MI_INT32, MI_INT8, MI_MATRIX,
    MI_UINT16, MI_UINT32, MX_CELL, MX_CHAR, MX_DOUBLE, MX_STRUCT,
};
use super::value::MatValue;

const HEADER_TEXT: &str = "MATLAB 5.0 MAT-file, written by flume-rs";

/// Writer for Level 5 MAT containers.
///
/// # Example
///
/// ```no_run
/// use flume_rs::{MatData, MatStruct, MatWriter};
/// use ndarray::array;
///
/// let eta = MatStruct::scalar([
///     ("date", MatData::from_array1("date", &array![734_503.5, 734_503.6]).into()),
/// ]);
///
/// MatWriter::new()
///     .compressed(true)
///     .variable("eta", eta)
///     .write("run.mat")?;
/// # Ok::<(), flume_rs::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct MatWriter {
    variables: Vec<(String, MatValue)>,
    compress: bool,
}

impl MatWriter {
    /// Create an empty, uncompressed writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether variables are zlib-compressed.
    pub fn compressed(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Add a top-level variable.
    pub fn variable(mut self, name: impl Into<String>, value: impl Into<MatValue>) -> Self {
        self.variables.push((name.into(), value.into()));
        self
    }

    /// Encode the container into a byte vector.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = header();

        for (name, value) in &self.variables {
            let element = encode_matrix(name, value)?;

            if self.compress {
                let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(&element)?;
                let compressed = encoder.finish()?;
                push_tag(&mut out, MI_COMPRESSED, compressed.len());
                out.extend_from_slice(&compressed);
            } else {
                out.extend_from_slice(&element);
            }
        }

        Ok(out)
    }

    /// Write the container to any writer.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&self.to_bytes()?)?;
        writer.flush()?;
        Ok(())
    }

    /// Write the container to a file, replacing it if it exists.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Error::file_access(path, e))?;
        self.write_to(BufWriter::new(file))
    }
}

fn header() -> Vec<u8> {
    let mut out = Vec::with_capacity(128);
    out.extend_from_slice(HEADER_TEXT.as_bytes());
    out.resize(HEADER_TEXT_LEN, b' ');
    // Subsystem data offset
    out.extend_from_slice(&[0u8; 8]);
    out.extend_from_slice(&0x0100u16.to_le_bytes());
    out.extend_from_slice(b"IM");
    out
}

fn push_tag(out: &mut Vec<u8>, data_type: u32, len: usize) {
    out.extend_from_slice(&data_type.to_le_bytes());
    out.extend_from_slice(&(len as u32).to_le_bytes());
}

fn pad8(out: &mut Vec<u8>) {
    while out.len() % 8 != 0 {
        out.push(0);
    }
}

fn push_element(out: &mut Vec<u8>, data_type: u32, data: &[u8]) {
    push_tag(out, data_type, data.len());
    out.extend_from_slice(data);
    pad8(out);
}

fn push_doubles(out: &mut Vec<u8>, values: &[f64]) {
    let data: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    push_element(out, MI_DOUBLE, &data);
}

/// Encode a complete `miMATRIX` element, tag included.
fn encode_matrix(name: &str, value: &MatValue) -> Result<Vec<u8>> {
    let (class, complex) = match value {
        MatValue::Numeric(data) => (MX_DOUBLE, data.is_complex()),
        MatValue::Struct(_) => (MX_STRUCT, false),
        MatValue::Cell(_) => (MX_CELL, false),
        MatValue::Char(_) => (MX_CHAR, false),
        MatValue::Unsupported { class, .. } => {
            return Err(Error::malformed(
                "",
                format!("cannot encode '{name}' of class {class}"),
            ))
        }
    };

    let mut body = Vec::new();

    let mut flags = u32::from(class);
    if complex {
        flags |= FLAG_COMPLEX;
    }
    let flag_bytes: Vec<u8> = [flags, 0].iter().flat_map(|v| v.to_le_bytes()).collect();
    push_element(&mut body, MI_UINT32, &flag_bytes);

    let mut shape = value.shape();
    // MATLAB arrays always carry at least two dimensions
    while shape.len() < 2 {
        shape.push(1);
    }
    let dims: Vec<u8> = shape
        .iter()
        .flat_map(|&d| (d as i32).to_le_bytes())
        .collect();
    push_element(&mut body, MI_INT32, &dims);

    push_element(&mut body, MI_INT8, name.as_bytes());

    match value {
        MatValue::Numeric(data) => {
            push_doubles(&mut body, data.real_data());
            if let Some(imag) = data.imag_data() {
                push_doubles(&mut body, imag);
            }
        }
        MatValue::Struct(s) => {
            let longest = s.field_names.iter().map(String::len).max().unwrap_or(0);
            let name_len = (longest + 1).max(32);

            // Field name length goes in small-element form
            body.extend_from_slice(&(MI_INT32 | (4 << 16)).to_le_bytes());
            body.extend_from_slice(&(name_len as i32).to_le_bytes());

            let mut names = Vec::with_capacity(name_len * s.field_names.len());
            for field in &s.field_names {
                let start = names.len();
                names.extend_from_slice(field.as_bytes());
                names.resize(start + name_len, 0);
            }
            push_element(&mut body, MI_INT8, &names);

            for element in &s.elements {
                for field in element {
                    body.extend(encode_matrix("", field)?);
                }
            }
        }
        MatValue::Cell(cell) => {
            for item in cell.values() {
                body.extend(encode_matrix("", item)?);
            }
        }
        MatValue::Char(text) => {
            let units: Vec<u8> = text.encode_utf16().flat_map(|u| u.to_le_bytes()).collect();
            push_element(&mut body, MI_UINT16, &units);
        }
        MatValue::Unsupported { .. } => unreachable!("rejected above"),
    }

    let mut element = Vec::with_capacity(body.len() + 8);
    push_tag(&mut element, MI_MATRIX, body.len());
    element.extend(body);
    Ok(element)
}
