//! Flume runs and their derived matrices.
//!
//! A [`Run`] is one recording: a shared [`TimeAxis`], the wave maker
//! ([`ActuatorRecord`]) and the gauges ([`GaugeRecord`]) in load order.
//! Derived views are computed on demand and stored on the run.
//!
//! # State Machine
//!
//! ```text
//! Uninitialized → (load / set_time_axis) → Loaded → (build_derived) → Derived
//! ```
//!
//! Re-running a build recomputes and overwrites its output. Adding records
//! after derivation does not clear the stored views; the next flume build
//! checks that they still match the run.
//!
//! # Example
//!
//! ```no_run
//! use flume_rs::Run;
//!
//! let mut run = Run::load("run001", "run001.mat")?;
//! run.build_derived()?;
//!
//! let profile = run.profile_at(0)?;
//! for (x, eta) in profile.points() {
//!     println!("{x:8.3} {eta:8.4}");
//! }
//! # Ok::<(), flume_rs::Error>(())
//! ```

mod actuator;
mod derived;
mod gauge;
mod loader;
mod member;

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use log::debug;
use ndarray::Array2;

use crate::error::{Error, Result};
use crate::time::TimeAxis;

pub use actuator::ActuatorRecord;
pub use derived::{FlumeProfile, FlumeSurface, GaugeLocationTable};
pub use gauge::{GaugeId, GaugeRecord, Location};
pub use loader::{LoaderConfig, RunLoader};
pub use member::RunMember;

/// Lifecycle stage of a [`Run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// No time axis yet.
    Uninitialized,
    /// Time axis and records present, flume views not built.
    Loaded,
    /// Flume surface built.
    Derived,
}

/// One wave flume recording.
#[derive(Debug, Clone)]
pub struct Run {
    id: String,
    source: PathBuf,
    time: Option<TimeAxis>,
    start_date: Option<NaiveDate>,
    actuator: Option<ActuatorRecord>,
    gauges: Vec<GaugeRecord>,
    gauge_surface: Option<Array2<f64>>,
    location_table: Option<GaugeLocationTable>,
    flume: Option<FlumeSurface>,
}

impl Run {
    /// Create an empty run bound to a source file.
    ///
    /// Nothing is read until [`load_wave_data`](Self::load_wave_data).
    pub fn new(id: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Run {
            id: id.into(),
            source: source.into(),
            time: None,
            start_date: None,
            actuator: None,
            gauges: Vec::new(),
            gauge_surface: None,
            location_table: None,
            flume: None,
        }
    }

    /// Load a run with the default [`LoaderConfig`].
    pub fn load(id: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        RunLoader::default().load(id, path)
    }

    /// Populate this run from its own source file.
    ///
    /// On failure the run is left as it was.
    pub fn load_wave_data(&mut self) -> Result<()> {
        *self = RunLoader::default().load(self.id.clone(), &self.source)?;
        Ok(())
    }

    /// Current lifecycle stage.
    pub fn state(&self) -> RunState {
        match (&self.time, &self.flume) {
            (_, Some(_)) => RunState::Derived,
            (Some(_), None) => RunState::Loaded,
            (None, None) => RunState::Uninitialized,
        }
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Set the time axis and start date.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptySequence`] for an empty axis; the run is left
    /// unchanged.
    pub fn set_time_axis(&mut self, time: TimeAxis) -> Result<()> {
        let start = time.start_date()?;
        self.time = Some(time);
        self.start_date = Some(start);
        Ok(())
    }

    /// Add a record of any kind.
    pub fn add(&mut self, member: impl Into<RunMember>) -> Result<()> {
        match member.into() {
            actuator @ RunMember::Actuator(_) => self.add_actuator(actuator),
            gauges => self.add_gauges(gauges),
        }
    }

    /// Replace the wave maker record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if `member` is not an
    /// [`ActuatorRecord`]; the current actuator is kept.
    pub fn add_actuator(&mut self, member: impl Into<RunMember>) -> Result<()> {
        match member.into() {
            RunMember::Actuator(actuator) => {
                debug!("Run '{}': actuator set", self.id);
                self.actuator = Some(actuator);
                Ok(())
            }
            other => Err(Error::type_mismatch("ActuatorRecord", other.kind())),
        }
    }

    /// Append one gauge or several, preserving order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if `member` is an actuator.
    pub fn add_gauges(&mut self, member: impl Into<RunMember>) -> Result<()> {
        match member.into() {
            RunMember::Gauge(gauge) => self.gauges.push(gauge),
            RunMember::Gauges(gauges) => self.gauges.extend(gauges),
            other => {
                return Err(Error::type_mismatch(
                    "GaugeRecord or Vec<GaugeRecord>",
                    other.kind(),
                ))
            }
        }
        debug!("Run '{}': {} gauge(s)", self.id, self.gauges.len());
        Ok(())
    }

    // ------------------------------------------------------------------
    // Derivation
    // ------------------------------------------------------------------

    /// Build the T×G gauge surface matrix.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Precondition`] without a time axis, or if a gauge
    /// series length differs from the axis.
    pub fn build_gauge_surface_matrix(&mut self) -> Result<&Array2<f64>> {
        let time = self
            .time
            .as_ref()
            .ok_or_else(|| Error::precondition("gauge surface needs a time axis"))?;
        let surface = derived::gauge_surface(&self.gauges, time.len())?;
        Ok(self.gauge_surface.insert(surface))
    }

    /// Build the G×2 gauge location table.
    pub fn build_gauge_location_table(&mut self) -> &GaugeLocationTable {
        self.location_table
            .insert(GaugeLocationTable::from_gauges(&self.gauges))
    }

    /// Build the T×(G+1) flume elevation and position matrices.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Precondition`] if the gauge surface, location table,
    /// or actuator is missing, or if they no longer match the run.
    pub fn build_flume_surface_matrix(&mut self) -> Result<&FlumeSurface> {
        let surface = self
            .gauge_surface
            .as_ref()
            .ok_or_else(|| Error::precondition("gauge surface matrix not built"))?;
        let locations = self
            .location_table
            .as_ref()
            .ok_or_else(|| Error::precondition("gauge location table not built"))?;
        let actuator = self
            .actuator
            .as_ref()
            .ok_or_else(|| Error::precondition("run has no actuator"))?;

        if surface.ncols() != self.gauges.len() {
            return Err(Error::precondition(format!(
                "gauge surface has {} columns but the run has {} gauges",
                surface.ncols(),
                self.gauges.len()
            )));
        }
        let num_times = self.num_times();
        if surface.nrows() != num_times {
            return Err(Error::precondition(format!(
                "gauge surface has {} rows but the time axis has {}",
                surface.nrows(),
                num_times
            )));
        }

        let flume = derived::flume_surface(actuator, surface, locations)?;
        Ok(self.flume.insert(flume))
    }

    /// Run all three builds in order.
    pub fn build_derived(&mut self) -> Result<&FlumeSurface> {
        self.build_gauge_surface_matrix()?;
        self.build_gauge_location_table();
        self.build_flume_surface_matrix()
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Run identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Path of the container the run is loaded from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Shared time axis.
    pub fn time_axis(&self) -> Option<&TimeAxis> {
        self.time.as_ref()
    }

    /// Date of the first sample.
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    /// Number of time samples (0 without a time axis).
    pub fn num_times(&self) -> usize {
        self.time.as_ref().map_or(0, TimeAxis::len)
    }

    /// Number of gauges.
    pub fn num_gauges(&self) -> usize {
        self.gauges.len()
    }

    /// Gauges in load order.
    pub fn gauges(&self) -> &[GaugeRecord] {
        &self.gauges
    }

    /// Wave maker record.
    pub fn actuator(&self) -> Option<&ActuatorRecord> {
        self.actuator.as_ref()
    }

    /// Gauge with identifier `id`.
    pub fn gauge(&self, id: GaugeId) -> Option<&GaugeRecord> {
        self.gauges.iter().find(|g| g.id() == id)
    }

    /// `(timestamp, elevation)` pairs of one gauge.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownGauge`] if no gauge has identifier `id`.
    pub fn gauge_series(
        &self,
        id: GaugeId,
    ) -> Result<impl Iterator<Item = (NaiveDateTime, f64)> + '_> {
        let gauge = self.gauge(id).ok_or(Error::UnknownGauge { id })?;
        Ok(gauge
            .time()
            .iter()
            .copied()
            .zip(gauge.eta().iter().copied()))
    }

    /// Gauge surface matrix, if built.
    pub fn gauge_surface(&self) -> Option<&Array2<f64>> {
        self.gauge_surface.as_ref()
    }

    /// Gauge location table, if built.
    pub fn location_table(&self) -> Option<&GaugeLocationTable> {
        self.location_table.as_ref()
    }

    /// Flume surface, if built.
    pub fn flume_surface(&self) -> Option<&FlumeSurface> {
        self.flume.as_ref()
    }

    /// Cross-shore profile at time index `index`.
    ///
    /// # Errors
    ///
    /// - [`Error::Precondition`] if the flume surface is not built
    /// - [`Error::IndexOutOfRange`] if `index` is past the last sample
    pub fn profile_at(&self, index: usize) -> Result<FlumeProfile<'_>> {
        let flume = self
            .flume
            .as_ref()
            .ok_or_else(|| Error::precondition("flume surface not built"))?;
        let time = self
            .time
            .as_ref()
            .ok_or_else(|| Error::precondition("run has no time axis"))?;

        let len = flume.num_times().min(time.len());
        if index >= len {
            return Err(Error::IndexOutOfRange { index, len });
        }

        Ok(FlumeProfile {
            index,
            time: time.as_slice()[index],
            position: flume.position().row(index),
            elevation: flume.elevation().row(index),
        })
    }

    /// Profiles at several time indices, in the order given.
    pub fn profiles_at(&self, indices: &[usize]) -> Result<Vec<FlumeProfile<'_>>> {
        indices.iter().map(|&i| self.profile_at(i)).collect()
    }
}

impl fmt::Display for Run {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "id: {}", self.id)?;
        match self.start_date {
            Some(date) => writeln!(f, "Start Date: {date}")?,
            None => writeln!(f, "Start Date: (not loaded)")?,
        }
        write!(f, "Wave Data File path: {}", self.source.display())
    }
}
