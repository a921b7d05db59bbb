//! MAT container support.
//!
//! This module reads MATLAB Level 5 `.mat` containers, including the
//! struct-wrapped layout flume recordings are stored in, and extracts the
//! arrays a [`Run`](crate::Run) is built from.
//!
//! # Overview
//!
//! The main types are:
//!
//! - [`MatFile`] - Loads and provides access to container contents
//! - [`MatValue`] - A decoded variable (numeric, struct, cell, text)
//! - [`MatData`] - A single numeric array
//! - [`WaveFields`] - The recording arrays, unwrapped and shape-checked
//! - [`MatWriter`] - Writes containers (sample data, fixtures)
//!
//! # Example
//!
//! ```no_run
//! use flume_rs::{MatFile, WaveFields};
//!
//! let mat = MatFile::open("run001.mat")?;
//! let fields = WaveFields::from_mat(&mat, "eta")?;
//!
//! println!("{} samples from {} gauges", fields.num_times(), fields.num_gauges());
//! # Ok::<(), flume_rs::Error>(())
//! ```
//!
//! # Not Supported
//!
//! - HDF5-based v7.3 files
//! - Sparse matrices, objects, function handles

mod data;
mod element;
mod fields;
mod file;
mod value;
mod writer;

pub use data::MatData;
pub use fields::{
    extract_matrix, extract_vector, FieldArray, FieldShape, FieldSpec, WaveFields,
    DEFAULT_STRUCT_NAME, WAVE_FIELDS,
};
pub use file::MatFile;
pub use value::{MatCell, MatStruct, MatValue};
pub use writer::MatWriter;
