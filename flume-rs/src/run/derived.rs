//! Matrices derived from a run's records.
//!
//! These are the views plotting and reporting code consume: every gauge's
//! elevation side by side, the gauge location table, and the flume-wide
//! surface that puts the moving wave maker in front of the gauges.

use std::fmt;

use chrono::NaiveDateTime;
use ndarray::{s, Array2, ArrayView1, Axis};

use crate::error::{Error, Result};
use super::actuator::ActuatorRecord;
use super::gauge::{GaugeRecord, Location};

/// Gauge positions as a labeled two-column table (`x_loc`, `y_loc`).
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeLocationTable {
    data: Array2<f64>,
}

impl GaugeLocationTable {
    /// Column labels, in order.
    pub const COLUMNS: [&'static str; 2] = ["x_loc", "y_loc"];

    /// Build the table from gauges in run order.
    pub fn from_gauges(gauges: &[GaugeRecord]) -> Self {
        let mut data = Array2::zeros((gauges.len(), Self::COLUMNS.len()));
        for (mut row, gauge) in data.rows_mut().into_iter().zip(gauges) {
            let Location { x, y } = gauge.location();
            row[0] = x;
            row[1] = y;
        }
        GaugeLocationTable { data }
    }

    /// Table dimensions `(gauges, 2)`.
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Number of rows (gauges).
    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    /// Column labels.
    pub fn columns(&self) -> &[&'static str] {
        &Self::COLUMNS
    }

    /// Column by label.
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        let index = Self::COLUMNS.iter().position(|&c| c == name)?;
        Some(self.data.column(index))
    }

    /// Cross-shore positions.
    pub fn x_loc(&self) -> ArrayView1<'_, f64> {
        self.data.column(0)
    }

    /// Along-shore positions.
    pub fn y_loc(&self) -> ArrayView1<'_, f64> {
        self.data.column(1)
    }

    /// Location in row `index`.
    pub fn row(&self, index: usize) -> Option<Location> {
        (index < self.len()).then(|| Location::new(self.data[[index, 0]], self.data[[index, 1]]))
    }

    /// The underlying `(gauges, 2)` array.
    pub fn as_array(&self) -> &Array2<f64> {
        &self.data
    }
}

impl fmt::Display for GaugeLocationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>5}  {:>10}  {:>10}", "", Self::COLUMNS[0], Self::COLUMNS[1])?;
        for (i, row) in self.data.rows().into_iter().enumerate() {
            writeln!(f, "{:>5}  {:>10.4}  {:>10.4}", i, row[0], row[1])?;
        }
        Ok(())
    }
}

/// Elevation and position across the whole flume.
///
/// Both matrices are T×(G+1). Column 0 is the wave maker, whose position
/// changes every sample; columns 1..=G are the gauges, whose cross-shore
/// position repeats down each column.
#[derive(Debug, Clone, PartialEq)]
pub struct FlumeSurface {
    elevation: Array2<f64>,
    position: Array2<f64>,
}

impl FlumeSurface {
    /// Water surface elevation, T×(G+1).
    pub fn elevation(&self) -> &Array2<f64> {
        &self.elevation
    }

    /// Cross-shore position of each elevation value, T×(G+1).
    pub fn position(&self) -> &Array2<f64> {
        &self.position
    }

    /// Number of time samples.
    pub fn num_times(&self) -> usize {
        self.elevation.nrows()
    }
}

/// One cross-shore profile: the flume surface at a single time sample.
#[derive(Debug, Clone)]
pub struct FlumeProfile<'a> {
    /// Time index of the profile.
    pub index: usize,
    /// Timestamp of the profile.
    pub time: NaiveDateTime,
    /// Cross-shore positions, wave maker first.
    pub position: ArrayView1<'a, f64>,
    /// Elevations, wave maker first.
    pub elevation: ArrayView1<'a, f64>,
}

impl FlumeProfile<'_> {
    /// Iterate over `(position, elevation)` points.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.position.iter().copied().zip(self.elevation.iter().copied())
    }
}

/// Stack gauge elevations as columns of a T×G matrix.
pub(crate) fn gauge_surface(gauges: &[GaugeRecord], num_times: usize) -> Result<Array2<f64>> {
    let mut surface = Array2::zeros((num_times, gauges.len()));

    for (mut column, gauge) in surface.columns_mut().into_iter().zip(gauges) {
        if gauge.len() != num_times {
            return Err(Error::precondition(format!(
                "gauge {} has {} samples but the time axis has {}",
                gauge.id(),
                gauge.len(),
                num_times
            )));
        }
        column.assign(gauge.eta());
    }

    Ok(surface)
}

/// Combine the wave maker with gauge elevations and locations.
pub(crate) fn flume_surface(
    actuator: &ActuatorRecord,
    gauge_surface: &Array2<f64>,
    locations: &GaugeLocationTable,
) -> Result<FlumeSurface> {
    let (num_times, num_gauges) = gauge_surface.dim();

    if locations.len() != num_gauges {
        return Err(Error::precondition(format!(
            "gauge surface has {} columns but the location table has {} rows",
            num_gauges,
            locations.len()
        )));
    }
    if actuator.eta().len() != num_times || actuator.position().len() != num_times {
        return Err(Error::precondition(format!(
            "wave maker series have {} and {} samples, expected {}",
            actuator.eta().len(),
            actuator.position().len(),
            num_times
        )));
    }

    let mut elevation = Array2::zeros((num_times, num_gauges + 1));
    elevation.column_mut(0).assign(actuator.eta());
    elevation.slice_mut(s![.., 1..]).assign(gauge_surface);

    let mut position = Array2::zeros((num_times, num_gauges + 1));
    position.column_mut(0).assign(actuator.position());
    position
        .slice_mut(s![.., 1..])
        .assign(&locations.x_loc().insert_axis(Axis(0)));

    Ok(FlumeSurface {
        elevation,
        position,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::TimeAxis;
    use ndarray::array;

    fn axis(n: usize) -> TimeAxis {
        let t0 = chrono::NaiveDate::from_ymd_opt(2011, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        TimeAxis::new((0..n).map(|i| t0 + chrono::Duration::seconds(i as i64)).collect())
    }

    fn gauges() -> Vec<GaugeRecord> {
        let t = axis(2);
        vec![
            GaugeRecord::new(1, (10.0, 0.5), array![0.1, 0.2], t.clone()),
            GaugeRecord::new(2, (20.0, -0.5), array![0.3, 0.4], t),
        ]
    }

    #[test]
    fn test_location_table() {
        let table = GaugeLocationTable::from_gauges(&gauges());

        assert_eq!(table.shape(), (2, 2));
        assert_eq!(table.x_loc(), array![10.0, 20.0]);
        assert_eq!(table.column("y_loc").unwrap(), array![0.5, -0.5]);
        assert!(table.column("z_loc").is_none());
        assert_eq!(table.row(1), Some(Location::new(20.0, -0.5)));
        assert_eq!(table.row(2), None);

        let text = table.to_string();
        assert!(text.contains("x_loc"));
        assert!(text.contains("20.0000"));
    }

    #[test]
    fn test_gauge_surface_columns() {
        let surface = gauge_surface(&gauges(), 2).unwrap();
        assert_eq!(surface, array![[0.1, 0.3], [0.2, 0.4]]);

        let err = gauge_surface(&gauges(), 3).unwrap_err();
        assert!(matches!(err, Error::Precondition { .. }));
    }

    #[test]
    fn test_flume_surface_prepends_wave_maker() {
        let g = gauges();
        let actuator = ActuatorRecord::new(array![0.05, 0.06], array![1.0, 1.2], axis(2));
        let surface = gauge_surface(&g, 2).unwrap();
        let table = GaugeLocationTable::from_gauges(&g);

        let flume = flume_surface(&actuator, &surface, &table).unwrap();
        assert_eq!(flume.elevation(), &array![[0.05, 0.1, 0.3], [0.06, 0.2, 0.4]]);
        assert_eq!(flume.position(), &array![[1.0, 10.0, 20.0], [1.2, 10.0, 20.0]]);
        assert_eq!(flume.num_times(), 2);
    }

    #[test]
    fn test_flume_surface_rejects_short_wave_maker() {
        let g = gauges();
        let actuator = ActuatorRecord::new(array![0.05], array![1.0], axis(1));
        let surface = gauge_surface(&g, 2).unwrap();
        let table = GaugeLocationTable::from_gauges(&g);

        assert!(matches!(
            flume_surface(&actuator, &surface, &table),
            Err(Error::Precondition { .. })
        ));
    }
}
