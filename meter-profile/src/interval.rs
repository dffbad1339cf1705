//! Load profile interval
//!
//! An interval holds one reading per channel, one status set per channel,
//! an aggregate interval status and the end timestamp of the period it
//! covers (`[time - duration, time]`).

use chrono::{Duration, NaiveDateTime};
use meter_core::{DisplayScale, MeterError, MeterResult, StatusSet};
use serde::{Deserialize, Serialize};

/// One fixed-duration slice of multi-channel readings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    /// Position in the owning interval sequence
    index: usize,
    /// End of the interval
    time: NaiveDateTime,
    /// One value per channel, in channel order
    data: Vec<f64>,
    /// One status set per channel, parallel to `data`
    channel_statuses: Vec<StatusSet>,
    /// Status of the interval as a whole
    interval_status: StatusSet,
    /// Scale the values are expressed in
    scale: DisplayScale,
}

impl Interval {
    /// Create a new interval
    ///
    /// # Arguments
    /// * `index` - Position in the owning sequence
    /// * `data` - One value per channel
    /// * `channel_statuses` - One status set per channel
    /// * `interval_status` - Aggregate interval status
    /// * `time` - End timestamp of the interval
    /// * `scale` - Scale of `data`
    ///
    /// # Errors
    /// Returns `LengthMismatch` if `data` and `channel_statuses` differ in length.
    pub fn new(
        index: usize,
        data: Vec<f64>,
        channel_statuses: Vec<StatusSet>,
        interval_status: StatusSet,
        time: NaiveDateTime,
        scale: DisplayScale,
    ) -> MeterResult<Self> {
        if data.len() != channel_statuses.len() {
            return Err(MeterError::LengthMismatch {
                expected: data.len(),
                actual: channel_statuses.len(),
            });
        }
        Ok(Self {
            index,
            time,
            data,
            channel_statuses,
            interval_status,
            scale,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// End timestamp of the interval
    pub fn time(&self) -> NaiveDateTime {
        self.time
    }

    /// Start timestamp, given the interval duration in minutes
    pub fn start_time(&self, duration_minutes: u32) -> NaiveDateTime {
        self.time - Duration::minutes(duration_minutes as i64)
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Value of one channel
    pub fn value(&self, channel: usize) -> Option<f64> {
        self.data.get(channel).copied()
    }

    pub fn channel_count(&self) -> usize {
        self.data.len()
    }

    pub fn channel_statuses(&self) -> &[StatusSet] {
        &self.channel_statuses
    }

    pub fn channel_status(&self, channel: usize) -> Option<&StatusSet> {
        self.channel_statuses.get(channel)
    }

    pub fn interval_status(&self) -> &StatusSet {
        &self.interval_status
    }

    pub fn scale(&self) -> DisplayScale {
        self.scale
    }

    /// Change the display scale, converting every channel value
    pub fn set_scale(&mut self, scale: DisplayScale) {
        let convert_all = vec![true; self.data.len()];
        self.set_scale_masked(scale, &convert_all);
    }

    /// Change the display scale, converting only the channels where `convert` is `true`
    pub(crate) fn set_scale_masked(&mut self, scale: DisplayScale, convert: &[bool]) {
        if scale == self.scale {
            return;
        }
        let from = self.scale;
        for (value, convert) in self.data.iter_mut().zip(convert.iter()) {
            if *convert {
                *value = from.convert(*value, scale);
            }
        }
        self.scale = scale;
    }

    /// `true` if the interval status has any flag
    pub fn has_interval_status(&self) -> bool {
        self.interval_status.has_status()
    }

    /// `true` if the interval status has any flag other than `D`
    pub fn has_filtered_interval_status(&self) -> bool {
        self.interval_status.has_filtered_status()
    }

    /// Interval status without the `D` flag
    pub fn interval_status_filtered(&self) -> StatusSet {
        self.interval_status.filtered()
    }

    /// Per channel: `true` if the channel status has any flag
    pub fn has_channel_statuses(&self) -> Vec<bool> {
        self.channel_statuses.iter().map(StatusSet::has_status).collect()
    }

    /// Per channel: `true` if the channel status has any flag other than `D`
    pub fn has_filtered_channel_statuses(&self) -> Vec<bool> {
        self.channel_statuses
            .iter()
            .map(StatusSet::has_filtered_status)
            .collect()
    }

    /// Merge flags into the interval status
    pub fn concatenate_interval_status(&mut self, status: &StatusSet) {
        self.interval_status.merge(status);
    }

    /// Merge flags into one channel status
    pub fn concatenate_channel_status(
        &mut self,
        channel: usize,
        status: &StatusSet,
    ) -> MeterResult<()> {
        let count = self.channel_statuses.len();
        let target = self
            .channel_statuses
            .get_mut(channel)
            .ok_or(MeterError::ChannelOutOfRange { index: channel, count })?;
        target.merge(status);
        Ok(())
    }

    /// Value and status of one channel
    ///
    /// # Errors
    /// Returns `ChannelOutOfRange` when either the value or the status is
    /// missing.
    pub(crate) fn cell(&self, channel: usize) -> MeterResult<(f64, &StatusSet)> {
        self.value(channel)
            .zip(self.channel_status(channel))
            .ok_or(MeterError::ChannelOutOfRange {
                index: channel,
                count: self.data.len().min(self.channel_statuses.len()),
            })
    }

    /// Extend to `count` channels with `0.0` and an empty status
    pub(crate) fn padded(mut self, count: usize) -> Self {
        if self.data.len() < count {
            self.data.resize(count, 0.0);
        }
        if self.channel_statuses.len() < count {
            self.channel_statuses.resize(count, StatusSet::new());
        }
        self
    }

    /// Renumber the interval for a new owning sequence
    pub(crate) fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    /// Copy of this interval with one channel cell set
    ///
    /// `channel` may equal the current channel count, in which case the
    /// cell is appended.
    pub(crate) fn with_channel_value(
        &self,
        channel: usize,
        value: f64,
        status: StatusSet,
    ) -> MeterResult<Interval> {
        let mut data = self.data.clone();
        let mut statuses = self.channel_statuses.clone();
        match channel.cmp(&data.len()) {
            std::cmp::Ordering::Less => {
                let count = data.len().min(statuses.len());
                match (data.get_mut(channel), statuses.get_mut(channel)) {
                    (Some(cell), Some(cell_status)) => {
                        *cell = value;
                        *cell_status = status;
                    }
                    _ => return Err(MeterError::ChannelOutOfRange { index: channel, count }),
                }
            }
            std::cmp::Ordering::Equal => {
                data.push(value);
                statuses.push(status);
            }
            std::cmp::Ordering::Greater => {
                return Err(MeterError::ChannelOutOfRange {
                    index: channel,
                    count: data.len(),
                });
            }
        }
        Interval::new(
            self.index,
            data,
            statuses,
            self.interval_status.clone(),
            self.time,
            self.scale,
        )
    }

    /// Replace values and statuses in place
    pub(crate) fn set_values(
        &mut self,
        data: Vec<f64>,
        channel_statuses: Vec<StatusSet>,
        interval_status: StatusSet,
    ) -> MeterResult<()> {
        if data.len() != channel_statuses.len() {
            return Err(MeterError::LengthMismatch {
                expected: data.len(),
                actual: channel_statuses.len(),
            });
        }
        self.data = data;
        self.channel_statuses = channel_statuses;
        self.interval_status = interval_status;
        Ok(())
    }

    /// Multiply one channel's value in place
    pub(crate) fn scale_value(&mut self, channel: usize, factor: f64) {
        if let Some(value) = self.data.get_mut(channel) {
            *value *= factor;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn time(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn interval(data: Vec<f64>, statuses: &[&str], status: &str) -> Interval {
        Interval::new(
            0,
            data,
            statuses.iter().map(|s| StatusSet::from(*s)).collect(),
            StatusSet::from(status),
            time(12, 15),
            DisplayScale::Units,
        )
        .unwrap()
    }

    #[test]
    fn test_interval_new_length_mismatch() {
        let result = Interval::new(
            0,
            vec![1.0, 2.0],
            vec![StatusSet::new()],
            StatusSet::new(),
            time(0, 15),
            DisplayScale::Units,
        );
        assert!(matches!(result, Err(MeterError::LengthMismatch { .. })));
    }

    #[test]
    fn test_interval_start_time() {
        let interval = interval(vec![1.0], &[""], "");
        assert_eq!(interval.start_time(15), time(12, 0));
    }

    #[test]
    fn test_interval_scale_round_trip() {
        let mut interval = interval(vec![1234.5, -0.25, 7.0], &["", "", ""], "");
        interval.set_scale(DisplayScale::Kilo);
        assert_eq!(interval.data(), &[1.2345, -0.00025, 0.007]);
        interval.set_scale(DisplayScale::Mega);
        interval.set_scale(DisplayScale::Units);
        for (value, original) in interval.data().iter().zip([1234.5, -0.25, 7.0]) {
            assert!((value - original).abs() < 1e-9);
        }
        assert_eq!(interval.scale(), DisplayScale::Units);
    }

    #[test]
    fn test_interval_scale_masked() {
        let mut interval = interval(vec![2000.0, 0.9], &["", ""], "");
        interval.set_scale_masked(DisplayScale::Kilo, &[true, false]);
        assert_eq!(interval.data(), &[2.0, 0.9]);
    }

    #[test]
    fn test_interval_status_queries() {
        let interval = interval(vec![1.0, 2.0, 3.0], &["D", "DS", ""], "DS");
        assert_eq!(interval.has_channel_statuses(), vec![true, true, false]);
        assert_eq!(interval.has_filtered_channel_statuses(), vec![false, true, false]);
        assert!(interval.has_interval_status());
        assert!(interval.has_filtered_interval_status());
        assert_eq!(interval.interval_status_filtered().as_str(), "S");
    }

    #[test]
    fn test_interval_concatenate_status() {
        let mut interval = interval(vec![1.0], &["A"], "S");
        interval.concatenate_interval_status(&StatusSet::from("SD"));
        interval.concatenate_channel_status(0, &StatusSet::from("BA")).unwrap();
        assert_eq!(interval.interval_status().as_str(), "SD");
        assert_eq!(interval.channel_status(0).unwrap().as_str(), "AB");
        assert!(interval.concatenate_channel_status(1, &StatusSet::new()).is_err());
    }

    #[test]
    fn test_interval_with_channel_value() {
        let interval = interval(vec![1.0, 2.0], &["", ""], "");
        let appended = interval.with_channel_value(2, 3.0, StatusSet::from("A")).unwrap();
        assert_eq!(appended.data(), &[1.0, 2.0, 3.0]);
        let replaced = appended.with_channel_value(0, 9.0, StatusSet::new()).unwrap();
        assert_eq!(replaced.data(), &[9.0, 2.0, 3.0]);
        assert!(interval.with_channel_value(5, 0.0, StatusSet::new()).is_err());
    }

    #[test]
    fn test_interval_cell_and_padding() {
        let interval = interval(vec![1.0, 2.0], &["A", ""], "");
        let (value, status) = interval.cell(0).unwrap();
        assert_eq!(value, 1.0);
        assert_eq!(status.as_str(), "A");
        assert!(matches!(
            interval.cell(2),
            Err(MeterError::ChannelOutOfRange { index: 2, count: 2 })
        ));

        let padded = interval.padded(4);
        assert_eq!(padded.data(), &[1.0, 2.0, 0.0, 0.0]);
        assert_eq!(padded.channel_statuses().len(), 4);
        assert!(!padded.channel_status(3).unwrap().has_status());
        assert_eq!(padded.clone().padded(1).data(), padded.data());
    }
}
