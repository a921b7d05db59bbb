//! MAT file loading and variable listing.
//!
//! This module provides [`MatFile`], which reads a MATLAB Level 5 `.mat`
//! container into memory and gives access to its decoded variables.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::{Error, Result};
use super::element::{parse_variables, Header};
use super::value::MatValue;

/// A loaded MAT container.
///
/// The whole file is read in one operation and decoded eagerly. The file
/// handle is closed before `open` returns, whether parsing succeeds or not.
///
/// # Supported Formats
///
/// - Level 5 MAT files (MATLAB v5, v6, v7), either byte order
/// - v7 compressed variables (zlib)
/// - Numeric and logical arrays of any class (converted to f64)
/// - Structs, cells and char arrays
///
/// # Unsupported
///
/// - Level 4 MAT files (legacy format)
/// - HDF5-based v7.3 files
/// - Sparse matrices, objects, function handles (kept as
///   [`MatValue::Unsupported`])
///
/// # Example
///
/// ```no_run
/// use flume_rs::MatFile;
///
/// let mat = MatFile::open("run001.mat")?;
///
/// for (name, value) in mat.iter() {
///     println!("{}: {} {:?}", name, value.class_name(), value.shape());
/// }
/// # Ok::<(), flume_rs::Error>(())
/// ```
#[derive(Debug)]
pub struct MatFile {
    /// Decoded variables, in file order.
    variables: Vec<(String, MatValue)>,

    /// Descriptive text from the header.
    description: String,

    /// Original file path (for error messages).
    path: PathBuf,
}

impl MatFile {
    /// Open and parse a MAT file.
    ///
    /// # Errors
    ///
    /// - [`Error::FileAccess`] if the file cannot be opened or read
    /// - [`Error::MalformedContainer`] if the file is not a valid Level 5
    ///   container
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let bytes = {
            let file = File::open(path).map_err(|e| Error::file_access(path, e))?;
            let mut reader = BufReader::new(file);
            let mut bytes = Vec::new();
            reader
                .read_to_end(&mut bytes)
                .map_err(|e| Error::file_access(path, e))?;
            bytes
        };

        debug!("Read {} bytes from '{}'", bytes.len(), path.display());

        Self::from_bytes(&bytes, path)
    }

    /// Parse a container already held in memory.
    ///
    /// `path` is only used to label errors.
    pub fn from_bytes(bytes: &[u8], path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let header = Header::parse(bytes).map_err(|e| Error::malformed(&path, e.to_string()))?;
        let variables = parse_variables(bytes, header.endian)
            .map_err(|e| Error::malformed(&path, e.to_string()))?;

        for (name, value) in &variables {
            if let MatValue::Unsupported { class, .. } = value {
                warn!("Variable '{}' has unsupported class {}", name, class);
            }
        }

        Ok(MatFile {
            variables,
            description: header.text,
            path,
        })
    }

    /// Get the names of all variables in the file.
    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|(name, _)| name.as_str())
    }

    /// Get a variable by name.
    pub fn get(&self, name: &str) -> Option<&MatValue> {
        self.variables
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    /// Get a variable by name, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingVariable`] if the variable doesn't exist.
    pub fn require(&self, name: &str) -> Result<&MatValue> {
        self.get(name)
            .ok_or_else(|| Error::missing_variable(name, &self.path))
    }

    /// Get the number of variables in the file.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Check if the file contains no variables.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Get the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the header description text.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Iterate over all top-level variables.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MatValue)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Flatten the variable tree into dotted paths.
    ///
    /// Struct fields of the first element are listed as `parent.field`
    /// after their parent; cells are not descended into.
    pub fn walk(&self) -> Vec<(String, &MatValue)> {
        fn visit<'a>(prefix: String, value: &'a MatValue, out: &mut Vec<(String, &'a MatValue)>) {
            out.push((prefix.clone(), value));
            if let MatValue::Struct(s) = value {
                for (field, child) in s.fields() {
                    visit(format!("{prefix}.{field}"), child, out);
                }
            }
        }

        let mut out = Vec::new();
        for (name, value) in self.iter() {
            visit(name.to_string(), value, &mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mat::{MatData, MatStruct, MatWriter};

    #[test]
    fn test_open_nonexistent() {
        let result = MatFile::open("/nonexistent/file.mat");
        assert!(matches!(result, Err(Error::FileAccess { .. })));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let result = MatFile::from_bytes(b"definitely not a mat file", "junk.mat");
        match result {
            Err(Error::MalformedContainer { path, .. }) => {
                assert_eq!(path, PathBuf::from("junk.mat"))
            }
            other => panic!("Expected MalformedContainer, got: {:?}", other),
        }
    }

    #[test]
    fn test_require_and_walk() {
        let bytes = MatWriter::new()
            .variable("eta", MatStruct::scalar([("x", MatData::column("x", &[1.0]).into())]))
            .variable("note", MatData::column("note", &[0.0]))
            .to_bytes()
            .unwrap();
        let mat = MatFile::from_bytes(&bytes, "mem.mat").unwrap();

        assert_eq!(mat.len(), 2);
        assert_eq!(mat.variable_names().collect::<Vec<_>>(), ["eta", "note"]);
        assert!(matches!(
            mat.require("date"),
            Err(Error::MissingVariable { ref name, .. }) if name == "date"
        ));

        let paths: Vec<String> = mat.walk().into_iter().map(|(p, _)| p).collect();
        assert_eq!(paths, ["eta", "eta.x", "note"]);
    }
}
