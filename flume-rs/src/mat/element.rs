//! Level 5 MAT data-element decoding.
//!
//! A Level 5 container is a 128-byte header followed by tagged data
//! elements. Each tag carries a data type and a byte count; small elements
//! (4 bytes or less) pack both into a single 32-bit word. Top-level
//! variables are `miMATRIX` elements, optionally wrapped in a zlib
//! `miCOMPRESSED` element.

use std::io::Read;

use flate2::read::ZlibDecoder;
use log::debug;
use thiserror::Error;

use super::data::MatData;
use super::value::{MatCell, MatStruct, MatValue};

pub(crate) const HEADER_LEN: usize = 128;
pub(crate) const HEADER_TEXT_LEN: usize = 116;

/// Smallest encoded size of a nested element (one full tag).
const TAG_LEN: usize = 8;

pub(crate) const MI_INT8: u32 = 1;
pub(crate) const MI_UINT8: u32 = 2;
pub(crate) const MI_INT16: u32 = 3;
pub(crate) const MI_UINT16: u32 = 4;
pub(crate) const MI_INT32: u32 = 5;
pub(crate) const MI_UINT32: u32 = 6;
pub(crate) const MI_SINGLE: u32 = 7;
pub(crate) const MI_DOUBLE: u32 = 9;
pub(crate) const MI_INT64: u32 = 12;
pub(crate) const MI_UINT64: u32 = 13;
pub(crate) const MI_MATRIX: u32 = 14;
pub(crate) const MI_COMPRESSED: u32 = 15;
pub(crate) const MI_UTF8: u32 = 16;
pub(crate) const MI_UTF16: u32 = 17;

pub(crate) const MX_CELL: u8 = 1;
pub(crate) const MX_STRUCT: u8 = 2;
pub(crate) const MX_CHAR: u8 = 4;
pub(crate) const MX_DOUBLE: u8 = 6;

pub(crate) const FLAG_COMPLEX: u32 = 0x0800;
const FLAG_LOGICAL: u32 = 0x0200;

/// Structural problem found while decoding.
#[derive(Error, Debug)]
#[error("{0}")]
pub(crate) struct DecodeError(pub(crate) String);

impl DecodeError {
    fn new(reason: impl Into<String>) -> Self {
        DecodeError(reason.into())
    }
}

type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Byte order declared by the container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Endian {
    Little,
    Big,
}

impl Endian {
    fn u16(self, b: [u8; 2]) -> u16 {
        match self {
            Endian::Little => u16::from_le_bytes(b),
            Endian::Big => u16::from_be_bytes(b),
        }
    }

    fn u32(self, b: [u8; 4]) -> u32 {
        match self {
            Endian::Little => u32::from_le_bytes(b),
            Endian::Big => u32::from_be_bytes(b),
        }
    }
}

/// Copy the first `N` bytes of a slice known to be long enough.
fn bytes<const N: usize>(b: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&b[..N]);
    out
}

/// Parsed 128-byte file header.
#[derive(Debug, Clone)]
pub(crate) struct Header {
    pub(crate) text: String,
    pub(crate) endian: Endian,
}

impl Header {
    pub(crate) fn parse(buf: &[u8]) -> DecodeResult<Self> {
        if buf.len() < HEADER_LEN {
            return Err(DecodeError::new(format!(
                "file is {} bytes, shorter than the {}-byte MAT header",
                buf.len(),
                HEADER_LEN
            )));
        }

        let endian = match &buf[126..128] {
            b"IM" => Endian::Little,
            b"MI" => Endian::Big,
            other => {
                return Err(DecodeError::new(format!(
                    "unrecognized endian indicator {:?} (not a Level 5 MAT file)",
                    String::from_utf8_lossy(other)
                )))
            }
        };

        let version = endian.u16(bytes(&buf[124..126]));
        if version == 0x0200 {
            return Err(DecodeError::new("HDF5-based v7.3 containers are not supported"));
        }
        if version != 0x0100 {
            return Err(DecodeError::new(format!("unsupported MAT version 0x{version:04x}")));
        }

        let text = String::from_utf8_lossy(&buf[..HEADER_TEXT_LEN])
            .trim_end_matches(|c: char| c == '\0' || c == ' ')
            .to_string();

        Ok(Header { text, endian })
    }
}

/// One tagged element: its data type and payload (without padding).
struct Element<'a> {
    data_type: u32,
    data: &'a [u8],
}

/// Sequential reader over a byte buffer.
struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
    endian: Endian,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8], endian: Endian) -> Self {
        Cursor { buf, pos: 0, endian }
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    /// Reject `count` nested elements that cannot fit in the bytes left.
    fn ensure_room(&self, count: Option<usize>, what: &str) -> DecodeResult<()> {
        let fits = count
            .and_then(|n| n.checked_mul(TAG_LEN))
            .is_some_and(|needed| needed <= self.remaining());
        if fits {
            Ok(())
        } else {
            Err(DecodeError::new(format!(
                "{what} declares more elements than the {} bytes left can hold",
                self.remaining()
            )))
        }
    }

    fn take(&mut self, n: usize) -> DecodeResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.buf.len())
            .ok_or_else(|| {
                DecodeError::new(format!(
                    "element of {} bytes at offset {} runs past end of data ({} bytes)",
                    n,
                    self.pos,
                    self.buf.len()
                ))
            })?;
        let buf: &'a [u8] = self.buf;
        let slice = &buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_u32(&mut self) -> DecodeResult<u32> {
        let b = self.take(4)?;
        Ok(self.endian.u32(bytes(b)))
    }

    /// Read the next tagged element, consuming its padding.
    fn read_element(&mut self) -> DecodeResult<Element<'a>> {
        let first = self.read_u32()?;

        // Small data element: byte count in the upper half-word
        if first >> 16 != 0 {
            let len = (first >> 16) as usize;
            if len > 4 {
                return Err(DecodeError::new(format!("small data element claims {len} bytes")));
            }
            let data = self.take(4)?;
            return Ok(Element {
                data_type: first & 0xFFFF,
                data: &data[..len],
            });
        }

        let len = self.read_u32()? as usize;
        let data = self.take(len)?;

        if first != MI_COMPRESSED {
            let pad = (8 - len % 8) % 8;
            self.pos = (self.pos + pad).min(self.buf.len());
        }

        Ok(Element {
            data_type: first,
            data,
        })
    }

    fn expect_element(&mut self, data_type: u32, what: &str) -> DecodeResult<Element<'a>> {
        let element = self.read_element()?;
        if element.data_type != data_type {
            return Err(DecodeError::new(format!(
                "expected {} (type {}), found type {}",
                what, data_type, element.data_type
            )));
        }
        Ok(element)
    }
}

/// Decode every top-level variable following the header.
pub(crate) fn parse_variables(
    buf: &[u8],
    endian: Endian,
) -> DecodeResult<Vec<(String, MatValue)>> {
    let mut cursor = Cursor::new(&buf[HEADER_LEN..], endian);
    let mut variables = Vec::new();

    while !cursor.is_empty() {
        let element = cursor.read_element()?;

        match element.data_type {
            MI_MATRIX => variables.push(decode_matrix(element.data, endian)?),
            MI_COMPRESSED => {
                let inflated = inflate(element.data)?;
                let mut inner = Cursor::new(&inflated, endian);
                let matrix = inner.expect_element(MI_MATRIX, "matrix inside compressed element")?;
                variables.push(decode_matrix(matrix.data, endian)?);
            }
            other => debug!("Skipping top-level element of type {}", other),
        }
    }

    Ok(variables)
}

fn inflate(data: &[u8]) -> DecodeResult<Vec<u8>> {
    let mut out = Vec::new();
    ZlibDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|e| DecodeError::new(format!("corrupt compressed element: {e}")))?;
    Ok(out)
}

/// Decode the payload of an `miMATRIX` element into `(name, value)`.
fn decode_matrix(data: &[u8], endian: Endian) -> DecodeResult<(String, MatValue)> {
    // Empty matrices may be written as a bare tag
    if data.is_empty() {
        let empty = MatData::new("", vec![0, 0], Vec::new(), None, "double");
        return Ok((String::new(), MatValue::Numeric(empty)));
    }

    let mut cursor = Cursor::new(data, endian);

    let flags = cursor.expect_element(MI_UINT32, "array flags")?;
    if flags.data.len() < 4 {
        return Err(DecodeError::new("array flags element is too short"));
    }
    let flag_word = endian.u32(bytes(flags.data));
    let class = (flag_word & 0xFF) as u8;
    let complex = flag_word & FLAG_COMPLEX != 0;
    let logical = flag_word & FLAG_LOGICAL != 0;

    let dims = cursor.expect_element(MI_INT32, "dimensions array")?;
    let shape = dims
        .data
        .chunks_exact(4)
        .map(|c| {
            let d = endian.u32(bytes(c)) as i32;
            usize::try_from(d).map_err(|_| DecodeError::new(format!("negative dimension {d}")))
        })
        .collect::<DecodeResult<Vec<usize>>>()?;
    let numel = shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| {
            DecodeError::new(format!("dimensions {shape:?} overflow the element count"))
        })?;

    let name_element = cursor.expect_element(MI_INT8, "array name")?;
    let name = String::from_utf8_lossy(name_element.data)
        .trim_end_matches('\0')
        .to_string();

    let value = match class {
        MX_CELL => {
            cursor.ensure_room(Some(numel), &format!("cell array '{name}'"))?;
            let mut values = Vec::with_capacity(numel);
            for _ in 0..numel {
                values.push(decode_nested(&mut cursor, endian)?);
            }
            MatValue::Cell(MatCell::new(shape, values))
        }
        MX_STRUCT => MatValue::Struct(decode_struct(&mut cursor, endian, shape, numel)?),
        MX_CHAR => {
            let text = cursor.read_element()?;
            MatValue::Char(decode_text(&text, endian))
        }
        6..=15 => {
            let real = cursor.read_element()?;
            let real_data = to_f64(&real, endian)?;
            let imag_data = if complex {
                let imag = cursor.read_element()?;
                Some(to_f64(&imag, endian)?)
            } else {
                None
            };

            if real_data.len() != numel {
                return Err(DecodeError::new(format!(
                    "array '{}' has {} values for shape {:?}",
                    name,
                    real_data.len(),
                    shape
                )));
            }

            let dtype = if logical { "logical" } else { class_name(class) };
            MatValue::Numeric(MatData::new(name.clone(), shape, real_data, imag_data, dtype))
        }
        other => {
            debug!("Leaving '{}' of class {} undecoded", name, class_name(other));
            MatValue::Unsupported {
                class: class_name(other),
                shape,
            }
        }
    };

    Ok((name, value))
}

/// Decode a nested (unnamed) matrix element inside a cell or struct.
fn decode_nested(cursor: &mut Cursor<'_>, endian: Endian) -> DecodeResult<MatValue> {
    let element = cursor.expect_element(MI_MATRIX, "nested matrix")?;
    decode_matrix(element.data, endian).map(|(_, value)| value)
}

fn decode_struct(
    cursor: &mut Cursor<'_>,
    endian: Endian,
    shape: Vec<usize>,
    numel: usize,
) -> DecodeResult<MatStruct> {
    let name_len = cursor.expect_element(MI_INT32, "field name length")?;
    if name_len.data.len() < 4 {
        return Err(DecodeError::new("field name length element is too short"));
    }
    let name_len = endian.u32(bytes(name_len.data)) as usize;
    if name_len == 0 {
        return Err(DecodeError::new("struct field name length is zero"));
    }

    let names = cursor.expect_element(MI_INT8, "field names")?;
    let field_names: Vec<String> = names
        .data
        .chunks(name_len)
        .map(|chunk| {
            let end = chunk.iter().position(|&b| b == 0).unwrap_or(chunk.len());
            String::from_utf8_lossy(&chunk[..end]).into_owned()
        })
        .collect();

    // A struct without fields has no nested elements to read
    if field_names.is_empty() {
        return Ok(MatStruct::from_parts(shape, field_names, Vec::new()));
    }
    cursor.ensure_room(numel.checked_mul(field_names.len()), "struct array")?;

    let mut elements = Vec::with_capacity(numel);
    for _ in 0..numel {
        let mut values = Vec::with_capacity(field_names.len());
        for field in &field_names {
            let value = match decode_nested(cursor, endian)? {
                MatValue::Numeric(data) => MatValue::Numeric(data.renamed(field.as_str())),
                other => other,
            };
            values.push(value);
        }
        elements.push(values);
    }

    Ok(MatStruct::from_parts(shape, field_names, elements))
}

fn decode_text(element: &Element<'_>, endian: Endian) -> String {
    match element.data_type {
        MI_UTF16 | MI_UINT16 => {
            let units: Vec<u16> = element
                .data
                .chunks_exact(2)
                .map(|c| endian.u16(bytes(c)))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => String::from_utf8_lossy(element.data).into_owned(),
    }
}

/// Convert a numeric element to f64 values.
fn to_f64(element: &Element<'_>, endian: Endian) -> DecodeResult<Vec<f64>> {
    let data = element.data;
    let little = endian == Endian::Little;

    macro_rules! convert {
        ($ty:ty, $size:expr) => {
            data.chunks_exact($size)
                .map(|c| {
                    let b = bytes::<{ $size }>(c);
                    (if little {
                        <$ty>::from_le_bytes(b)
                    } else {
                        <$ty>::from_be_bytes(b)
                    }) as f64
                })
                .collect()
        };
    }

    let values: Vec<f64> = match element.data_type {
        MI_INT8 => convert!(i8, 1),
        MI_UINT8 | MI_UTF8 => convert!(u8, 1),
        MI_INT16 => convert!(i16, 2),
        MI_UINT16 => convert!(u16, 2),
        MI_INT32 => convert!(i32, 4),
        MI_UINT32 => convert!(u32, 4),
        MI_SINGLE => convert!(f32, 4),
        MI_DOUBLE => convert!(f64, 8),
        MI_INT64 => convert!(i64, 8),
        MI_UINT64 => convert!(u64, 8),
        other => {
            return Err(DecodeError::new(format!("data type {other} cannot hold numeric values")))
        }
    };

    Ok(values)
}

/// MATLAB class name for an array class code.
pub(crate) fn class_name(class: u8) -> &'static str {
    match class {
        1 => "cell",
        2 => "struct",
        3 => "object",
        4 => "char",
        5 => "sparse",
        6 => "double",
        7 => "single",
        8 => "int8",
        9 => "uint8",
        10 => "int16",
        11 => "uint16",
        12 => "int32",
        13 => "uint32",
        14 => "int64",
        15 => "uint64",
        16 => "function_handle",
        17 => "opaque",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(endian: &[u8; 2], version: [u8; 2]) -> Vec<u8> {
        let mut buf = vec![b' '; HEADER_TEXT_LEN];
        buf[..19].copy_from_slice(b"MATLAB 5.0 MAT-file");
        buf.extend_from_slice(&[0u8; 8]);
        buf.extend_from_slice(&version);
        buf.extend_from_slice(endian);
        buf
    }

    fn word(endian: Endian, value: u32) -> [u8; 4] {
        match endian {
            Endian::Little => value.to_le_bytes(),
            Endian::Big => value.to_be_bytes(),
        }
    }

    /// A full tagged element padded to 8 bytes.
    fn element(endian: Endian, data_type: u32, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&word(endian, data_type));
        out.extend_from_slice(&word(endian, data.len() as u32));
        out.extend_from_slice(data);
        out.resize(out.len() + (8 - data.len() % 8) % 8, 0);
        out
    }

    /// An `miMATRIX` element built field by field.
    fn matrix(endian: Endian, class: u8, dims: &[u32], name: &str, body: &[u8]) -> Vec<u8> {
        let flags = [word(endian, u32::from(class)), [0; 4]].concat();
        let dims: Vec<u8> = dims.iter().flat_map(|&d| word(endian, d)).collect();

        let mut payload = element(endian, MI_UINT32, &flags);
        payload.extend(element(endian, MI_INT32, &dims));
        payload.extend(element(endian, MI_INT8, name.as_bytes()));
        payload.extend_from_slice(body);
        element(endian, MI_MATRIX, &payload)
    }

    fn doubles(endian: Endian, values: &[f64]) -> Vec<u8> {
        let bytes: Vec<u8> = values
            .iter()
            .flat_map(|v| match endian {
                Endian::Little => v.to_le_bytes(),
                Endian::Big => v.to_be_bytes(),
            })
            .collect();
        element(endian, MI_DOUBLE, &bytes)
    }

    fn field_names(endian: Endian, names: &[&str]) -> Vec<u8> {
        let mut packed = Vec::new();
        for name in names {
            let start = packed.len();
            packed.extend_from_slice(name.as_bytes());
            packed.resize(start + 32, 0);
        }
        let mut out = element(endian, MI_INT32, &word(endian, 32));
        out.extend(element(endian, MI_INT8, &packed));
        out
    }

    fn container(endian: Endian, variables: &[Vec<u8>]) -> Vec<u8> {
        let mut buf = match endian {
            Endian::Little => header(b"IM", [0x00, 0x01]),
            Endian::Big => header(b"MI", [0x01, 0x00]),
        };
        for variable in variables {
            buf.extend_from_slice(variable);
        }
        buf
    }

    #[test]
    fn test_header_endianness() {
        let le = Header::parse(&header(b"IM", [0x00, 0x01])).unwrap();
        assert_eq!(le.endian, Endian::Little);
        assert!(le.text.starts_with("MATLAB 5.0"));

        let be = Header::parse(&header(b"MI", [0x01, 0x00])).unwrap();
        assert_eq!(be.endian, Endian::Big);
    }

    #[test]
    fn test_header_rejects_v73_and_garbage() {
        let err = Header::parse(&header(b"IM", [0x00, 0x02])).unwrap_err();
        assert!(err.to_string().contains("v7.3"));

        assert!(Header::parse(&header(b"XX", [0x00, 0x01])).is_err());
        assert!(Header::parse(b"too short").is_err());
    }

    #[test]
    fn test_small_element() {
        // type miINT32 (5), 4 bytes, value 32
        let buf = [5, 0, 4, 0, 32, 0, 0, 0];
        let mut cursor = Cursor::new(&buf, Endian::Little);
        let element = cursor.read_element().unwrap();

        assert_eq!(element.data_type, MI_INT32);
        assert_eq!(element.data, &[32, 0, 0, 0]);
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_element_padding_is_skipped() {
        // miINT8 with 3 bytes, padded to 8, followed by a small element
        let mut buf = vec![1, 0, 0, 0, 3, 0, 0, 0, b'a', b'b', b'c', 0, 0, 0, 0, 0];
        buf.extend_from_slice(&[5, 0, 4, 0, 7, 0, 0, 0]);
        let mut cursor = Cursor::new(&buf, Endian::Little);

        assert_eq!(cursor.read_element().unwrap().data, b"abc");
        assert_eq!(cursor.read_element().unwrap().data, &[7, 0, 0, 0]);
    }

    #[test]
    fn test_truncated_element() {
        let buf = [9, 0, 0, 0, 16, 0, 0, 0, 1, 2, 3];
        let mut cursor = Cursor::new(&buf, Endian::Little);
        assert!(cursor.read_element().is_err());
    }

    #[test]
    fn test_numeric_conversion() {
        let data: Vec<u8> = [-2i16, 300].iter().flat_map(|v| v.to_be_bytes()).collect();
        let element = Element {
            data_type: MI_INT16,
            data: &data,
        };
        assert_eq!(to_f64(&element, Endian::Big).unwrap(), vec![-2.0, 300.0]);
    }

    #[test]
    fn test_dimension_overflow_is_rejected() {
        let huge = 0x7fff_ffff;
        let body = doubles(Endian::Little, &[1.0]);
        let buf = container(
            Endian::Little,
            &[matrix(Endian::Little, MX_DOUBLE, &[huge, huge, huge], "eta", &body)],
        );

        let err = parse_variables(&buf, Endian::Little).unwrap_err();
        assert!(err.to_string().contains("overflow"), "{err}");
    }

    #[test]
    fn test_oversized_struct_array_is_rejected() {
        let huge = 0x7fff_ffff;
        let body = field_names(Endian::Little, &["date"]);
        let buf = container(
            Endian::Little,
            &[matrix(Endian::Little, MX_STRUCT, &[huge, huge], "eta", &body)],
        );

        let err = parse_variables(&buf, Endian::Little).unwrap_err();
        assert!(err.to_string().contains("bytes left"), "{err}");
    }

    #[test]
    fn test_oversized_cell_array_is_rejected() {
        let buf = container(
            Endian::Little,
            &[matrix(Endian::Little, MX_CELL, &[0x7fff_ffff, 2], "c", &[])],
        );
        assert!(parse_variables(&buf, Endian::Little).is_err());
    }

    #[test]
    fn test_fieldless_struct_array() {
        let body = field_names(Endian::Little, &[]);
        let buf = container(
            Endian::Little,
            &[matrix(Endian::Little, MX_STRUCT, &[0x7fff_ffff, 1], "s", &body)],
        );

        let vars = parse_variables(&buf, Endian::Little).unwrap();
        let s = vars[0].1.as_struct().unwrap();
        assert_eq!(s.len(), 0x7fff_ffff);
        assert_eq!(s.field_names().count(), 0);
    }

    #[test]
    fn test_big_endian_struct_container() {
        let e = Endian::Big;
        let mut body = field_names(e, &["date", "x"]);
        let dates = doubles(e, &[734_504.0, 734_504.5, 734_505.0]);
        body.extend(matrix(e, MX_DOUBLE, &[1, 3], "", &dates));
        let positions: Vec<u8> = [3i16, -2].iter().flat_map(|v| v.to_be_bytes()).collect();
        body.extend(matrix(e, 10, &[1, 2], "", &element(e, MI_INT16, &positions)));

        let buf = container(e, &[matrix(e, MX_STRUCT, &[1, 1], "eta", &body)]);
        let header = Header::parse(&buf).unwrap();
        assert_eq!(header.endian, Endian::Big);

        let vars = parse_variables(&buf, header.endian).unwrap();
        assert_eq!(vars.len(), 1);
        assert_eq!(vars[0].0, "eta");

        let s = vars[0].1.as_struct().unwrap();
        assert_eq!(s.field_names().collect::<Vec<_>>(), ["date", "x"]);

        let date = s.field("date").and_then(MatValue::as_numeric).unwrap();
        assert_eq!(date.shape(), &[1, 3]);
        assert_eq!(date.real_data(), &[734_504.0, 734_504.5, 734_505.0]);

        let x = s.field("x").and_then(MatValue::as_numeric).unwrap();
        assert_eq!(x.dtype(), "int16");
        assert_eq!(x.real_data(), &[3.0, -2.0]);
    }
}
