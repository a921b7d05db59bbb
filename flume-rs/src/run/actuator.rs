//! The piston wave maker.

use ndarray::Array1;

use crate::time::TimeAxis;

/// The wave maker's elevation and position series.
///
/// Unlike a gauge, the wave maker moves: its position is a series sampled
/// on the same [`TimeAxis`] as the elevation in front of the piston.
#[derive(Debug, Clone, PartialEq)]
pub struct ActuatorRecord {
    eta: Array1<f64>,
    position: Array1<f64>,
    time: TimeAxis,
}

impl ActuatorRecord {
    /// Create an actuator record.
    pub fn new(eta: Array1<f64>, position: Array1<f64>, time: TimeAxis) -> Self {
        ActuatorRecord {
            eta,
            position,
            time,
        }
    }

    /// Water surface elevation in front of the piston.
    pub fn eta(&self) -> &Array1<f64> {
        &self.eta
    }

    /// Piston position series.
    pub fn position(&self) -> &Array1<f64> {
        &self.position
    }

    /// Time axis both series are sampled on.
    pub fn time(&self) -> &TimeAxis {
        &self.time
    }
}
