//! # flume-rs
//!
//! Load wave flume recordings stored in MATLAB `.mat` containers and
//! derive the matrices used to plot and analyse them.
//!
//! A recording holds one top-level struct (`eta` by default) with the
//! logger's time codes, the elevation at every gauge, the gauge positions,
//! and the wave maker's elevation and position. Loading turns these into a
//! [`Run`]: a shared [`TimeAxis`], one [`ActuatorRecord`], and a
//! [`GaugeRecord`] per gauge.
//!
//! ## Quick Start
//!
//! ### Loading a Run
//!
//! ```no_run
//! use flume_rs::{Run, Result};
//!
//! fn main() -> Result<()> {
//!     let mut run = Run::load("run001", "run001.mat")?;
//!     println!("{run}");
//!     println!("{} samples, {} gauges", run.num_times(), run.num_gauges());
//!
//!     // Derived views for plotting
//!     run.build_derived()?;
//!     if let Some(table) = run.location_table() {
//!         print!("{table}");
//!     }
//!
//!     for profile in run.profiles_at(&[0, 100, 200])? {
//!         println!("Profile at {}", profile.time);
//!         for (x, eta) in profile.points() {
//!             println!("  {x:8.3} {eta:8.4}");
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ### Custom Loader Settings
//!
//! ```no_run
//! use flume_rs::{LoaderConfig, RunLoader, Result};
//!
//! fn main() -> Result<()> {
//!     let loader = RunLoader::new(LoaderConfig::new().struct_name("waves").day_offset(0.0));
//!     let run = loader.load("run002", "run002.mat")?;
//!
//!     for (time, eta) in run.gauge_series(1)?.take(5) {
//!         println!("{time} {eta:.4}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ### Writing a Container
//!
//! ```no_run
//! use flume_rs::{MatData, MatStruct, MatWriter, Result};
//!
//! fn main() -> Result<()> {
//!     let recording = MatStruct::scalar([
//!         ("date", MatData::column("date", &[734_504.0, 734_504.5]).into()),
//!         ("x_wm", MatData::column("x_wm", &[0.0, 0.1]).into()),
//!     ]);
//!
//!     MatWriter::new()
//!         .compressed(true)
//!         .variable("eta", recording)
//!         .write("partial.mat")
//! }
//! ```
//!
//! ## Container Layout
//!
//! | Field | Shape | Content |
//! |-------|-------|---------|
//! | `date` | T | Logger time codes (fractional days) |
//! | `eta` | T×G | Gauge water surface elevation |
//! | `x`, `y` | G | Gauge positions |
//! | `eta_wm` | T | Elevation in front of the wave maker |
//! | `x_wm` | T | Wave maker position |
//!
//! ## Thread Safety
//!
//! A [`Run`] owns its data and is `Send`. Records of one run share their
//! time axis through an `Arc`; nothing is locked or mutated behind a shared
//! reference.

#![deny(missing_docs)]

// Modules
mod error;
pub mod mat;
mod run;
mod time;

// Public exports
pub use error::{Error, Result};
pub use mat::{
    MatCell, MatData, MatFile, MatStruct, MatValue, MatWriter, WaveFields, DEFAULT_STRUCT_NAME,
};
pub use run::{
    ActuatorRecord, FlumeProfile, FlumeSurface, GaugeId, GaugeLocationTable, GaugeRecord,
    LoaderConfig, Location, Run, RunLoader, RunMember, RunState,
};
pub use time::{
    datenum_to_datetime, datetime_to_datenum, TimeAxis, TimeAxisStats, TimeBase, DAY_OFFSET,
};

pub use chrono;
pub use ndarray;
