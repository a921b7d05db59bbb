//! Records accepted by [`Run`](crate::Run) add-operations.

use super::actuator::ActuatorRecord;
use super::gauge::GaugeRecord;

/// A record, or batch of records, that can be added to a run.
///
/// Add-operations take `impl Into<RunMember>`, so callers pass an
/// [`ActuatorRecord`], a [`GaugeRecord`], or a `Vec<GaugeRecord>` directly.
/// An operation handed the wrong variant fails with
/// [`Error::TypeMismatch`](crate::Error::TypeMismatch).
#[derive(Debug, Clone, PartialEq)]
pub enum RunMember {
    /// The wave maker.
    Actuator(ActuatorRecord),
    /// A single gauge.
    Gauge(GaugeRecord),
    /// Several gauges, in order.
    Gauges(Vec<GaugeRecord>),
}

impl RunMember {
    /// Name of the variant's record type, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            RunMember::Actuator(_) => "ActuatorRecord",
            RunMember::Gauge(_) => "GaugeRecord",
            RunMember::Gauges(_) => "Vec<GaugeRecord>",
        }
    }
}

impl From<ActuatorRecord> for RunMember {
    fn from(record: ActuatorRecord) -> Self {
        RunMember::Actuator(record)
    }
}

impl From<GaugeRecord> for RunMember {
    fn from(record: GaugeRecord) -> Self {
        RunMember::Gauge(record)
    }
}

impl From<Vec<GaugeRecord>> for RunMember {
    fn from(records: Vec<GaugeRecord>) -> Self {
        RunMember::Gauges(records)
    }
}
