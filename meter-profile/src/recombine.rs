//! Interval combination and rolling demand
//!
//! Both operations work on the plain channels only and rebuild the
//! derived channels on the new interval set.

use crate::conversion::duration_hours;
use crate::interval::Interval;
use crate::load_profile::{LoadProfileData, ProfileKind};
use chrono::Timelike;
use meter_core::status::FLAG_SHORT;
use meter_core::{MeterError, MeterResult, StatusSet};

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Sum the plain channels of `group` into one interval stamped with the
/// last interval's time
fn sum_group(group: &[Interval], plain: usize) -> MeterResult<Interval> {
    let last = group
        .last()
        .ok_or_else(|| MeterError::InvalidArgument("Cannot combine an empty group".to_string()))?;
    let mut data = vec![0.0; plain];
    let mut statuses = vec![StatusSet::new(); plain];
    let mut interval_status = StatusSet::new();
    for interval in group {
        for (channel, (sum, status)) in data.iter_mut().zip(statuses.iter_mut()).enumerate() {
            let (value, cell_status) = interval.cell(channel)?;
            *sum += value;
            status.merge(cell_status);
        }
        interval_status.merge(interval.interval_status());
    }
    Interval::new(0, data, statuses, interval_status, last.time(), last.scale())
}

impl LoadProfileData {
    /// Number of intervals forming the leading group of a combination
    ///
    /// The leading group runs from the first interval up to the first
    /// boundary of the new duration, counted in minutes since midnight.
    fn leading_group_len(&self, new_duration: u32) -> usize {
        let Some(first) = self.intervals().first() else {
            return 0;
        };
        let time = first.time();
        let minute = time.hour() * 60 + time.minute();
        let boundary = minute.div_ceil(new_duration) * new_duration;
        let boundary = boundary.min(MINUTES_PER_DAY);
        ((boundary - minute) / self.interval_duration()) as usize + 1
    }

    /// Merge consecutive intervals into intervals of `new_duration` minutes
    ///
    /// The leading group is aligned on the new duration and tagged with
    /// the short (`S`) flag when it holds fewer intervals than a full
    /// group. Every following group of `new_duration / duration` intervals
    /// is summed per channel; a trailing partial group is discarded.
    /// Derived channels are recomputed on the result.
    ///
    /// # Errors
    /// Fails on demand data, on empty data, and when `new_duration` is
    /// not a multiple of the current duration.
    pub fn combine_intervals(&self, new_duration: u32) -> MeterResult<LoadProfileData> {
        if self.kind() == ProfileKind::Demand {
            return Err(MeterError::Unsupported(
                "Interval combination of demand data".to_string(),
            ));
        }
        if self.is_empty() {
            return Err(MeterError::InvalidArgument(
                "No intervals to combine".to_string(),
            ));
        }
        let duration = self.interval_duration();
        if new_duration < duration || new_duration % duration != 0 {
            return Err(MeterError::InvalidArgument(format!(
                "New interval duration {} is not a multiple of {}",
                new_duration, duration
            )));
        }

        let ratio = (new_duration / duration) as usize;
        let plain = self.plain_channel_count();
        let intervals = self.intervals();
        let leading = self.leading_group_len(new_duration).min(intervals.len());

        let mut combined = Vec::with_capacity(intervals.len() / ratio + 1);
        let mut head = sum_group(&intervals[..leading], plain)?;
        if leading < ratio {
            log::debug!(
                "Leading group of '{}' holds {} of {} interval(s); marking it short",
                self.name(),
                leading,
                ratio
            );
            head.concatenate_interval_status(&StatusSet::from_flags(&FLAG_SHORT.to_string()));
        }
        combined.push(head);

        let rest = &intervals[leading..];
        let mut groups = rest.chunks_exact(ratio);
        for group in &mut groups {
            combined.push(sum_group(group, plain)?);
        }
        let dropped = groups.remainder().len();
        if dropped > 0 {
            log::warn!(
                "Discarding {} trailing interval(s) of '{}' that do not fill a {} minute interval",
                dropped,
                self.name(),
                new_duration
            );
        }
        log::debug!(
            "Combined {} interval(s) of '{}' into {} interval(s) of {} minutes",
            intervals.len(),
            self.name(),
            combined.len(),
            new_duration
        );
        self.successor(self.kind(), new_duration, combined)
    }

    /// Demand over a trailing window of `intervals_to_combine` intervals
    ///
    /// One demand interval is produced per input interval. The first
    /// intervals use the shorter window of the intervals seen so far, and
    /// the divisor always matches the window actually used. Power factor
    /// channels pass through.
    ///
    /// # Errors
    /// Fails on demand data, on empty data, and when the window is not a
    /// divisor of 60 minutes.
    pub fn calculate_rolling_demand(
        &self,
        intervals_to_combine: u32,
    ) -> MeterResult<LoadProfileData> {
        if self.kind() == ProfileKind::Demand {
            return Err(MeterError::Unsupported(
                "Rolling demand of demand data".to_string(),
            ));
        }
        let duration = self.interval_duration();
        let window_minutes = duration.saturating_mul(intervals_to_combine);
        if intervals_to_combine == 0 || window_minutes > 60 || 60 % window_minutes != 0 {
            return Err(MeterError::InvalidArgument(format!(
                "Rolling window of {} x {} minutes does not divide an hour",
                intervals_to_combine, duration
            )));
        }
        if self.is_empty() {
            return Err(MeterError::InvalidArgument(
                "No intervals for rolling demand".to_string(),
            ));
        }

        let window = intervals_to_combine as usize;
        let pulse = self.kind() == ProfileKind::Pulse;
        let channels = &self.channels()[..self.plain_channel_count()];
        let intervals = self.intervals();

        let mut rolled = Vec::with_capacity(intervals.len());
        for (i, current) in intervals.iter().enumerate() {
            let used = window.min(i + 1);
            let span = &intervals[i + 1 - used..=i];
            let hours = duration_hours(duration * used as u32);

            let mut data = Vec::with_capacity(channels.len());
            let mut statuses = Vec::with_capacity(channels.len());
            for channel in channels {
                let number = channel.number();
                let mut status = StatusSet::new();
                let mut sum = 0.0;
                for interval in span {
                    let (value, cell_status) = interval.cell(number)?;
                    sum += value;
                    status.merge(cell_status);
                }
                let value = if channel.is_power_factor() {
                    current.cell(number)?.0
                } else {
                    let sum = if pulse {
                        sum * channel.pulse_weight() * channel.multiplier()
                    } else {
                        sum
                    };
                    sum / hours
                };
                data.push(value);
                statuses.push(status);
            }
            let mut interval_status = StatusSet::new();
            for interval in span {
                interval_status.merge(interval.interval_status());
            }
            rolled.push(Interval::new(
                i,
                data,
                statuses,
                interval_status,
                current.time(),
                current.scale(),
            )?);
        }
        log::debug!(
            "Calculated rolling demand of '{}' over {} interval(s) of {} minutes",
            self.name(),
            window,
            duration
        );
        self.successor(ProfileKind::Demand, duration, rolled)
    }
}
