//! Loading a run from a recording container.
//!
//! [`RunLoader`] validates the raw arrays against each other, converts the
//! time codes once, and hands every record the same [`TimeAxis`].

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::{Error, Result};
use crate::mat::{MatFile, WaveFields, DEFAULT_STRUCT_NAME};
use crate::time::{TimeBase, DAY_OFFSET};
use super::actuator::ActuatorRecord;
use super::gauge::{GaugeId, GaugeRecord};
use super::Run;

/// Settings for [`RunLoader`].
///
/// # Example
///
/// ```
/// use flume_rs::LoaderConfig;
///
/// let config = LoaderConfig::new().struct_name("waves").day_offset(0.0);
/// assert_eq!(config.struct_name, "waves");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderConfig {
    /// Name of the top-level struct holding the recording.
    pub struct_name: String,
    /// Day offset applied to time codes.
    pub day_offset: f64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        LoaderConfig {
            struct_name: DEFAULT_STRUCT_NAME.to_string(),
            day_offset: DAY_OFFSET,
        }
    }
}

impl LoaderConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name of the top-level struct holding the recording.
    pub fn struct_name(mut self, name: impl Into<String>) -> Self {
        self.struct_name = name.into();
        self
    }

    /// Set the day offset applied to time codes.
    pub fn day_offset(mut self, days: f64) -> Self {
        self.day_offset = days;
        self
    }

    /// Time converter for this configuration.
    pub fn time_base(&self) -> TimeBase {
        TimeBase::new(self.day_offset)
    }
}

/// Builds [`Run`]s from container files.
#[derive(Debug, Clone, Default)]
pub struct RunLoader {
    config: LoaderConfig,
}

impl RunLoader {
    /// Create a loader.
    pub fn new(config: LoaderConfig) -> Self {
        RunLoader { config }
    }

    /// Loader configuration.
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load a run from the container at `path`.
    ///
    /// # Errors
    ///
    /// - [`Error::FileAccess`] if the file cannot be read
    /// - [`Error::MalformedContainer`] if it is not a valid container
    /// - [`Error::MissingVariable`] if a required array is absent
    /// - [`Error::ShapeMismatch`] if the arrays disagree in size
    /// - [`Error::EmptySequence`] or [`Error::InvalidTimeCode`] if the time
    ///   codes cannot be converted
    pub fn load(&self, id: impl Into<String>, path: impl AsRef<Path>) -> Result<Run> {
        let path = path.as_ref();
        let mat = MatFile::open(path)?;
        debug!(
            "Container '{}' holds {} variable(s)",
            path.display(),
            mat.len()
        );

        let fields = WaveFields::from_mat(&mat, &self.config.struct_name)?;
        self.assemble(id, path, fields)
    }

    /// Assemble a run from already extracted arrays.
    ///
    /// `path` is recorded as the run's source.
    pub fn assemble(
        &self,
        id: impl Into<String>,
        path: impl Into<PathBuf>,
        fields: WaveFields,
    ) -> Result<Run> {
        let prefix = format!("{}.", self.config.struct_name);
        validate_shapes(&fields, &prefix)?;

        let WaveFields {
            date,
            eta,
            x,
            y,
            eta_wm,
            x_wm,
        } = fields;

        let time = self.config.time_base().convert(&date.to_vec())?;

        let actuator = ActuatorRecord::new(eta_wm, x_wm, time.clone());

        let gauges: Vec<GaugeRecord> = eta
            .columns()
            .into_iter()
            .zip(x.iter().zip(y.iter()))
            .enumerate()
            .map(|(i, (column, (&gx, &gy)))| {
                GaugeRecord::new(i as GaugeId + 1, (gx, gy), column.to_owned(), time.clone())
            })
            .collect();

        let mut run = Run::new(id, path);
        run.set_time_axis(time)?;
        run.add_actuator(actuator)?;
        run.add_gauges(gauges)?;

        info!(
            "Loaded run '{}': {} samples, {} gauges, starting {}",
            run.id(),
            run.num_times(),
            run.num_gauges(),
            run.start_date().map_or_else(|| "-".to_string(), |d| d.to_string())
        );

        Ok(run)
    }
}

fn validate_shapes(fields: &WaveFields, prefix: &str) -> Result<()> {
    let num_times = fields.date.len();
    let num_gauges = fields.x.len();
    let (rows, cols) = fields.eta.dim();

    if rows != num_times || cols != num_gauges {
        return Err(Error::shape_mismatch(
            format!("{prefix}eta"),
            &[rows, cols],
            format!("({num_times}, {num_gauges}) from len({prefix}date) and len({prefix}x)"),
        ));
    }
    if fields.y.len() != num_gauges {
        return Err(Error::shape_mismatch(
            format!("{prefix}y"),
            &[fields.y.len()],
            format!("({num_gauges},) to match {prefix}x"),
        ));
    }
    for (name, len) in [("eta_wm", fields.eta_wm.len()), ("x_wm", fields.x_wm.len())] {
        if len != num_times {
            return Err(Error::shape_mismatch(
                format!("{prefix}{name}"),
                &[len],
                format!("({num_times},) to match {prefix}date"),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1, Array2};

    fn fields(num_times: usize, num_gauges: usize) -> WaveFields {
        WaveFields {
            date: Array1::from_iter((0..num_times).map(|i| 734_504.0 + i as f64 / 86_400.0)),
            eta: Array2::from_shape_fn((num_times, num_gauges), |(t, g)| (t * 10 + g) as f64),
            x: Array1::from_iter((0..num_gauges).map(|g| 5.0 * (g + 1) as f64)),
            y: Array1::zeros(num_gauges),
            eta_wm: Array1::linspace(0.0, 1.0, num_times),
            x_wm: Array1::linspace(-0.5, 0.5, num_times),
        }
    }

    #[test]
    fn test_config_builder() {
        let config = LoaderConfig::new().struct_name("waves").day_offset(1.5);
        assert_eq!(config.struct_name, "waves");
        assert_eq!(config.day_offset, 1.5);
        assert_eq!(LoaderConfig::default().day_offset, DAY_OFFSET);
        assert_eq!(LoaderConfig::default().struct_name, "eta");
    }

    #[test]
    fn test_assemble_builds_gauges_in_order() {
        let run = RunLoader::default()
            .assemble("r1", "r1.mat", fields(4, 3))
            .unwrap();

        assert_eq!(run.num_times(), 4);
        assert_eq!(run.num_gauges(), 3);

        let ids: Vec<_> = run.gauges().iter().map(GaugeRecord::id).collect();
        assert_eq!(ids, [1, 2, 3]);
        assert_eq!(run.gauges()[2].eta(), &array![2.0, 12.0, 22.0, 32.0]);
        assert_eq!(run.gauges()[1].location().x, 10.0);

        let axis = run.time_axis().unwrap();
        assert!(run.gauges().iter().all(|g| g.time().ptr_eq(axis)));
        assert!(run.actuator().unwrap().time().ptr_eq(axis));
    }

    #[test]
    fn test_eta_columns_must_match_x() {
        let mut f = fields(4, 3);
        f.x = array![1.0, 2.0];
        f.y = array![0.0, 0.0];

        match RunLoader::default().assemble("r", "r.mat", f) {
            Err(Error::ShapeMismatch {
                variable,
                shape,
                ..
            }) => {
                assert_eq!(variable, "eta.eta");
                assert_eq!(shape, vec![4, 3]);
            }
            other => panic!("Expected ShapeMismatch, got: {:?}", other),
        }
    }

    #[test]
    fn test_y_and_actuator_lengths_checked() {
        let mut f = fields(4, 3);
        f.y = array![0.0];
        assert!(matches!(
            RunLoader::default().assemble("r", "r.mat", f),
            Err(Error::ShapeMismatch { ref variable, .. }) if variable == "eta.y"
        ));

        let mut f = fields(4, 3);
        f.x_wm = array![0.0, 1.0];
        assert!(matches!(
            RunLoader::default().assemble("r", "r.mat", f),
            Err(Error::ShapeMismatch { ref variable, .. }) if variable == "eta.x_wm"
        ));
    }

    #[test]
    fn test_empty_date_fails() {
        let result = RunLoader::default().assemble("r", "r.mat", fields(0, 2));
        assert!(matches!(result, Err(Error::EmptySequence { .. })));
    }
}
