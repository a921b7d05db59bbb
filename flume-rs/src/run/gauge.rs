//! Fixed-position wave gauges.

use ndarray::Array1;

use crate::time::TimeAxis;

/// Identifier of a gauge within a run, starting at 1.
pub type GaugeId = u32;

/// Position of a gauge in the flume, in metres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    /// Cross-shore distance.
    pub x: f64,
    /// Along-shore distance.
    pub y: f64,
}

impl Location {
    /// Create a location from its coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Location { x, y }
    }
}

impl From<(f64, f64)> for Location {
    fn from((x, y): (f64, f64)) -> Self {
        Location { x, y }
    }
}

/// One gauge's water surface elevation series.
///
/// The location is fixed for the whole run; the elevation series is
/// sampled on the run's shared [`TimeAxis`].
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeRecord {
    id: GaugeId,
    location: Location,
    eta: Array1<f64>,
    time: TimeAxis,
}

impl GaugeRecord {
    /// Create a gauge record.
    pub fn new(
        id: GaugeId,
        location: impl Into<Location>,
        eta: Array1<f64>,
        time: TimeAxis,
    ) -> Self {
        GaugeRecord {
            id,
            location: location.into(),
            eta,
            time,
        }
    }

    /// Gauge identifier.
    pub fn id(&self) -> GaugeId {
        self.id
    }

    /// Gauge position.
    pub fn location(&self) -> Location {
        self.location
    }

    /// Water surface elevation series.
    pub fn eta(&self) -> &Array1<f64> {
        &self.eta
    }

    /// Time axis the series is sampled on.
    pub fn time(&self) -> &TimeAxis {
        &self.time
    }

    /// Number of samples in the elevation series.
    pub fn len(&self) -> usize {
        self.eta.len()
    }

    /// Check if the elevation series is empty.
    pub fn is_empty(&self) -> bool {
        self.eta.is_empty()
    }
}
