//! Instrument time codes to calendar time.
//!
//! The flume's data logger stamps samples with MATLAB-style date numbers:
//! fractional days counted from an instrument epoch. [`TimeBase`] turns those
//! codes into [`TimeAxis`], the calendar-time sequence every record of a run
//! shares.

use std::fmt;
use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::error::{Error, Result};

/// Calibration offset, in days, applied to every recorded time code.
///
/// Date numbers count from year 0 while calendar arithmetic here starts at
/// 0001-01-01. The value was fixed empirically against the logger's
/// spreadsheet export for the recording campaign; keep it unless a new
/// cross-check says otherwise.
pub const DAY_OFFSET: f64 = -(365.0 + 2.0);

const MICROS_PER_DAY: f64 = 86_400_000_000.0;

/// Zero epoch of the day count: 0001-01-01T00:00:00.
fn epoch() -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(1, 1, 1)?.and_hms_opt(0, 0, 0)
}

/// Convert one time code to a timestamp.
///
/// Returns `None` for non-finite codes or results outside the calendar
/// range. Precision is one microsecond.
pub fn datenum_to_datetime(code: f64, offset_days: f64) -> Option<NaiveDateTime> {
    let micros = ((code + offset_days) * MICROS_PER_DAY).round();
    if !micros.is_finite() || micros.abs() >= i64::MAX as f64 {
        return None;
    }
    epoch()?.checked_add_signed(Duration::microseconds(micros as i64))
}

/// Convert a timestamp back to a time code.
///
/// Inverse of [`datenum_to_datetime`] to within a microsecond.
pub fn datetime_to_datenum(time: NaiveDateTime, offset_days: f64) -> Option<f64> {
    let micros = (time - epoch()?).num_microseconds()?;
    Some(micros as f64 / MICROS_PER_DAY - offset_days)
}

/// Converter from instrument time codes to a [`TimeAxis`].
///
/// # Example
///
/// ```
/// use flume_rs::TimeBase;
///
/// let axis = TimeBase::default().convert(&[734_504.5])?;
/// assert_eq!(axis.first().unwrap().to_string(), "2011-01-01 12:00:00");
/// # Ok::<(), flume_rs::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeBase {
    offset_days: f64,
}

impl Default for TimeBase {
    fn default() -> Self {
        TimeBase {
            offset_days: DAY_OFFSET,
        }
    }
}

impl TimeBase {
    /// Create a converter with a custom day offset.
    pub fn new(offset_days: f64) -> Self {
        TimeBase { offset_days }
    }

    /// Day offset added to every code.
    pub fn offset_days(&self) -> f64 {
        self.offset_days
    }

    /// Convert a sequence of time codes, preserving order.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptySequence`] if `codes` is empty
    /// - [`Error::InvalidTimeCode`] if a code has no calendar equivalent
    pub fn convert(&self, codes: &[f64]) -> Result<TimeAxis> {
        if codes.is_empty() {
            return Err(Error::empty_sequence("no time codes to convert"));
        }

        let times = codes
            .iter()
            .enumerate()
            .map(|(i, &code)| {
                datenum_to_datetime(code, self.offset_days)
                    .ok_or_else(|| Error::invalid_time_code(i, code + self.offset_days))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(TimeAxis::new(times))
    }
}

/// Calendar timestamps shared by every record of a run.
///
/// Cloning is cheap; clones refer to the same underlying sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeAxis(Arc<[NaiveDateTime]>);

impl TimeAxis {
    /// Wrap a sequence of timestamps.
    pub fn new(times: Vec<NaiveDateTime>) -> Self {
        TimeAxis(times.into())
    }

    /// Number of timestamps.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the axis has no timestamps.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Timestamp at `index`.
    pub fn get(&self, index: usize) -> Option<&NaiveDateTime> {
        self.0.get(index)
    }

    /// First timestamp.
    pub fn first(&self) -> Option<&NaiveDateTime> {
        self.0.first()
    }

    /// Last timestamp.
    pub fn last(&self) -> Option<&NaiveDateTime> {
        self.0.last()
    }

    /// Iterate over the timestamps.
    pub fn iter(&self) -> std::slice::Iter<'_, NaiveDateTime> {
        self.0.iter()
    }

    /// Borrow the timestamps as a slice.
    pub fn as_slice(&self) -> &[NaiveDateTime] {
        &self.0
    }

    /// Check whether two handles share the same sequence.
    pub fn ptr_eq(&self, other: &TimeAxis) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Calendar date of the first timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptySequence`] for an empty axis.
    pub fn start_date(&self) -> Result<NaiveDate> {
        self.first()
            .map(NaiveDateTime::date)
            .ok_or_else(|| Error::empty_sequence("time axis has no start date"))
    }

    /// Check if timestamps never decrease.
    pub fn is_monotonic(&self) -> bool {
        self.0.windows(2).all(|w| w[0] <= w[1])
    }

    /// Sampling statistics, or `None` with fewer than two timestamps.
    pub fn stats(&self) -> Option<TimeAxisStats> {
        if self.len() < 2 {
            return None;
        }

        let start = *self.first()?;
        let end = *self.last()?;

        let intervals: Vec<f64> = self
            .0
            .windows(2)
            .map(|w| (w[1] - w[0]).num_microseconds().unwrap_or(i64::MAX) as f64 / 1e6)
            .collect();
        let mean_interval = intervals.iter().sum::<f64>() / intervals.len() as f64;
        let interval_variance = intervals
            .iter()
            .map(|d| (d - mean_interval).powi(2))
            .sum::<f64>()
            / intervals.len() as f64;

        Some(TimeAxisStats {
            start,
            end,
            duration: end - start,
            num_samples: self.len(),
            mean_interval,
            is_regular: interval_variance.sqrt() <= mean_interval.abs() * 0.01,
            is_monotonic: self.is_monotonic(),
        })
    }
}

impl<'a> IntoIterator for &'a TimeAxis {
    type Item = &'a NaiveDateTime;
    type IntoIter = std::slice::Iter<'a, NaiveDateTime>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Sampling statistics of a time axis.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeAxisStats {
    /// First timestamp.
    pub start: NaiveDateTime,

    /// Last timestamp.
    pub end: NaiveDateTime,

    /// Time between first and last sample.
    pub duration: Duration,

    /// Number of samples.
    pub num_samples: usize,

    /// Mean interval between samples, in seconds.
    pub mean_interval: f64,

    /// Whether the interval varies by less than 1%.
    pub is_regular: bool,

    /// Whether timestamps never decrease.
    pub is_monotonic: bool,
}

impl TimeAxisStats {
    /// Mean sampling rate in Hz.
    pub fn sample_rate(&self) -> f64 {
        if self.mean_interval > 0.0 {
            1.0 / self.mean_interval
        } else {
            0.0
        }
    }
}

impl fmt::Display for TimeAxisStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} samples from {} to {}, dt={:.4}s{}",
            self.num_samples,
            self.start,
            self.end,
            self.mean_interval,
            if self.is_regular {
                " (regular)"
            } else {
                " (irregular)"
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_single_value_is_epoch_plus_days() {
        let v = 734_504.25;
        let axis = TimeBase::default().convert(&[v]).unwrap();

        assert_eq!(axis.len(), 1);
        let expected = epoch().unwrap()
            + Duration::microseconds(((v + DAY_OFFSET) * MICROS_PER_DAY).round() as i64);
        assert_eq!(axis.first(), Some(&expected));
        assert_eq!(axis.first(), Some(&at(2011, 1, 1, 6, 0, 0)));
    }

    #[test]
    fn test_fractional_day_resolution() {
        // 1.5 days plus one minute after the epoch
        let code = 1.5 + 1.0 / 1440.0;
        let axis = TimeBase::new(0.0).convert(&[code]).unwrap();
        assert_eq!(axis.first(), Some(&at(1, 1, 2, 12, 1, 0)));
    }

    #[test]
    fn test_datetime_to_datenum_inverts() {
        let time = at(2011, 1, 1, 6, 0, 0);
        let code = datetime_to_datenum(time, DAY_OFFSET).unwrap();
        assert!((code - 734_504.25).abs() < 1e-9);
        assert_eq!(datenum_to_datetime(code, DAY_OFFSET), Some(time));
    }

    #[test]
    fn test_order_preserved_and_deterministic() {
        let codes = [734_504.5, 734_504.25, 734_504.5];
        let tb = TimeBase::default();
        let a = tb.convert(&codes).unwrap();
        let b = tb.convert(&codes).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
        assert!(a.get(0) > a.get(1));
        assert_eq!(a.get(0), a.get(2));
        assert!(!a.is_monotonic());
    }

    #[test]
    fn test_empty_input_fails() {
        let err = TimeBase::default().convert(&[]).unwrap_err();
        assert!(matches!(err, Error::EmptySequence { .. }));

        let empty = TimeAxis::new(Vec::new());
        assert!(matches!(empty.start_date(), Err(Error::EmptySequence { .. })));
    }

    #[test]
    fn test_invalid_codes() {
        let err = TimeBase::default().convert(&[734_504.0, f64::NAN]).unwrap_err();
        assert!(matches!(err, Error::InvalidTimeCode { index: 1, .. }));

        assert!(datenum_to_datetime(1e300, 0.0).is_none());
    }

    #[test]
    fn test_start_date_and_stats() {
        let codes: Vec<f64> = (0..5).map(|i| 734_504.0 + i as f64 / 86_400.0).collect();
        let axis = TimeBase::default().convert(&codes).unwrap();

        assert_eq!(
            axis.start_date().unwrap(),
            NaiveDate::from_ymd_opt(2011, 1, 1).unwrap()
        );

        let stats = axis.stats().unwrap();
        assert_eq!(stats.num_samples, 5);
        assert!((stats.mean_interval - 1.0).abs() < 1e-6);
        assert!(stats.is_regular);
        assert!(stats.is_monotonic);
        assert_eq!(stats.duration, Duration::seconds(4));
    }

    #[test]
    fn test_clones_share_storage() {
        let axis = TimeBase::default().convert(&[734_504.0]).unwrap();
        let clone = axis.clone();
        assert!(axis.ptr_eq(&clone));
        assert!(!axis.ptr_eq(&TimeBase::default().convert(&[734_504.0]).unwrap()));
    }
}
