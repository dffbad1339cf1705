//! Load profile channel
//!
//! A channel identifies one measured series. It holds no reference to the
//! interval data; every query takes the owning profile's interval slice,
//! so replacing that slice can never leave a channel pointing at stale
//! storage.

use crate::derived::{DerivedKind, DerivedSources};
use crate::interval::Interval;
use meter_core::quantity_names::is_power_factor_name;
use meter_core::{MeterError, MeterResult};
use serde::{Deserialize, Serialize};

/// What a channel carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelKind {
    /// Values stored as read from the meter
    Plain,
    /// Calculated var
    Var(DerivedSources),
    /// Calculated VA
    Va(DerivedSources),
    /// Calculated power factor
    Pf(DerivedSources),
}

impl ChannelKind {
    pub fn derived(kind: DerivedKind, sources: DerivedSources) -> Self {
        match kind {
            DerivedKind::Var => ChannelKind::Var(sources),
            DerivedKind::Va => ChannelKind::Va(sources),
            DerivedKind::Pf => ChannelKind::Pf(sources),
        }
    }

    /// Derived kind and sources, or `None` for plain channels
    pub fn as_derived(&self) -> Option<(DerivedKind, DerivedSources)> {
        match self {
            ChannelKind::Plain => None,
            ChannelKind::Var(sources) => Some((DerivedKind::Var, *sources)),
            ChannelKind::Va(sources) => Some((DerivedKind::Va, *sources)),
            ChannelKind::Pf(sources) => Some((DerivedKind::Pf, *sources)),
        }
    }
}

/// One measured series of a load profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    /// Channel number, also the index into every interval's data
    number: usize,
    /// Display name
    name: String,
    /// Engineering units per pulse
    pulse_weight: f64,
    /// Correction factor applied on top of the pulse weight
    multiplier: f64,
    kind: ChannelKind,
}

impl Channel {
    /// Create a plain channel
    pub fn new(number: usize, name: impl Into<String>, pulse_weight: f64, multiplier: f64) -> Self {
        Self {
            number,
            name: name.into(),
            pulse_weight,
            multiplier,
            kind: ChannelKind::Plain,
        }
    }

    /// Create a derived channel; derived values are never pulse-scaled
    pub(crate) fn new_derived(
        number: usize,
        name: impl Into<String>,
        kind: DerivedKind,
        sources: DerivedSources,
    ) -> Self {
        Self {
            number,
            name: name.into(),
            pulse_weight: 1.0,
            multiplier: 1.0,
            kind: ChannelKind::derived(kind, sources),
        }
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pulse_weight(&self) -> f64 {
        self.pulse_weight
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn kind(&self) -> &ChannelKind {
        &self.kind
    }

    pub fn is_derived(&self) -> bool {
        self.kind.as_derived().is_some()
    }

    /// `true` for calculated PF channels and channels named as power factor
    pub fn is_power_factor(&self) -> bool {
        matches!(self.kind, ChannelKind::Pf(_)) || is_power_factor_name(&self.name)
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub(crate) fn set_pulse_weight(&mut self, pulse_weight: f64) {
        self.pulse_weight = pulse_weight;
    }

    pub(crate) fn set_multiplier(&mut self, multiplier: f64) {
        self.multiplier = multiplier;
    }

    pub(crate) fn set_kind(&mut self, kind: ChannelKind) {
        self.kind = kind;
    }

    /// This channel's values, in interval order
    pub fn values<'a>(&self, intervals: &'a [Interval]) -> impl Iterator<Item = f64> + 'a {
        let number = self.number;
        intervals.iter().filter_map(move |interval| interval.value(number))
    }

    /// Scan for an extreme value; `better(candidate, current)` decides replacement
    fn scan<'a>(
        &self,
        intervals: &'a [Interval],
        better: impl Fn(f64, f64) -> bool,
    ) -> Option<&'a Interval> {
        let mut best: Option<(&Interval, f64)> = None;
        for interval in intervals {
            let Some(value) = interval.value(self.number) else {
                continue;
            };
            match best {
                Some((_, current)) if !better(value, current) => {}
                _ => best = Some((interval, value)),
            }
        }
        best.map(|(interval, _)| interval)
    }

    /// Interval holding the maximum value; the earliest wins ties
    pub fn max_interval<'a>(&self, intervals: &'a [Interval]) -> Option<&'a Interval> {
        self.scan(intervals, |candidate, current| candidate > current)
    }

    /// Interval holding the maximum value; the latest wins ties
    pub fn most_recent_max_interval<'a>(&self, intervals: &'a [Interval]) -> Option<&'a Interval> {
        self.scan(intervals, |candidate, current| candidate >= current)
    }

    /// Interval holding the minimum value; the earliest wins ties
    pub fn min_interval<'a>(&self, intervals: &'a [Interval]) -> Option<&'a Interval> {
        self.scan(intervals, |candidate, current| candidate < current)
    }

    pub fn max_value(&self, intervals: &[Interval]) -> Option<f64> {
        self.max_interval(intervals)
            .and_then(|interval| interval.value(self.number))
    }

    pub fn min_value(&self, intervals: &[Interval]) -> Option<f64> {
        self.min_interval(intervals)
            .and_then(|interval| interval.value(self.number))
    }

    /// The `count` peak intervals, best first
    ///
    /// Peaks are the largest values, except for power factor channels
    /// where they are the smallest. Each pick is the best value among the
    /// intervals not yet picked; on ties the earliest interval wins.
    /// `count` is clamped to the number of intervals.
    pub fn peaks<'a>(&self, intervals: &'a [Interval], count: usize) -> Vec<&'a Interval> {
        let ascending = self.is_power_factor();
        let column: Vec<Option<f64>> = intervals
            .iter()
            .map(|interval| interval.value(self.number))
            .collect();
        let available = column.iter().filter(|value| value.is_some()).count();
        let mut picked = vec![false; column.len()];
        let mut peaks = Vec::with_capacity(count.min(available));

        for _ in 0..count.min(available) {
            let mut best: Option<(usize, f64)> = None;
            for (position, value) in column.iter().enumerate() {
                let Some(value) = *value else { continue };
                if picked[position] {
                    continue;
                }
                let replace = match best {
                    None => true,
                    Some((_, current)) if ascending => value < current,
                    Some((_, current)) => value > current,
                };
                if replace {
                    best = Some((position, value));
                }
            }
            match best {
                Some((position, _)) => {
                    picked[position] = true;
                    peaks.push(&intervals[position]);
                }
                None => break,
            }
        }
        peaks
    }

    /// Sum of the channel's values
    ///
    /// # Errors
    /// Power factor has no meaningful sum; returns `Unsupported` for PF channels.
    pub fn total(&self, intervals: &[Interval]) -> MeterResult<f64> {
        if self.is_power_factor() {
            return Err(MeterError::Unsupported(format!(
                "Total of power factor channel '{}'",
                self.name
            )));
        }
        Ok(self.values(intervals).sum())
    }

    /// Mean of the channel's values, `None` when there are no intervals
    pub fn average(&self, intervals: &[Interval]) -> Option<f64> {
        let count = self.values(intervals).count();
        if count == 0 {
            return None;
        }
        let sum = if self.is_power_factor() {
            self.values(intervals).sum::<f64>()
        } else {
            self.total(intervals).ok()?
        };
        Some(sum / count as f64)
    }
}

/// A channel bound to the interval slice of its profile
#[derive(Debug, Clone, Copy)]
pub struct ChannelSeries<'a> {
    channel: &'a Channel,
    intervals: &'a [Interval],
}

impl<'a> ChannelSeries<'a> {
    pub fn new(channel: &'a Channel, intervals: &'a [Interval]) -> Self {
        Self { channel, intervals }
    }

    pub fn channel(&self) -> &'a Channel {
        self.channel
    }

    pub fn intervals(&self) -> &'a [Interval] {
        self.intervals
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + 'a {
        self.channel.values(self.intervals)
    }

    pub fn max_interval(&self) -> Option<&'a Interval> {
        self.channel.max_interval(self.intervals)
    }

    pub fn most_recent_max_interval(&self) -> Option<&'a Interval> {
        self.channel.most_recent_max_interval(self.intervals)
    }

    pub fn min_interval(&self) -> Option<&'a Interval> {
        self.channel.min_interval(self.intervals)
    }

    pub fn max_value(&self) -> Option<f64> {
        self.channel.max_value(self.intervals)
    }

    pub fn min_value(&self) -> Option<f64> {
        self.channel.min_value(self.intervals)
    }

    pub fn peaks(&self, count: usize) -> Vec<&'a Interval> {
        self.channel.peaks(self.intervals, count)
    }

    pub fn total(&self) -> MeterResult<f64> {
        self.channel.total(self.intervals)
    }

    pub fn average(&self) -> Option<f64> {
        self.channel.average(self.intervals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use meter_core::{DisplayScale, StatusSet};

    fn time(index: usize) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + chrono::Duration::minutes(15 * (index as i64 + 1))
    }

    fn intervals(values: &[f64]) -> Vec<Interval> {
        values
            .iter()
            .enumerate()
            .map(|(index, value)| {
                Interval::new(
                    index,
                    vec![*value],
                    vec![StatusSet::new()],
                    StatusSet::new(),
                    time(index),
                    DisplayScale::Units,
                )
                .unwrap()
            })
            .collect()
    }

    fn indices(picked: &[&Interval]) -> Vec<usize> {
        picked.iter().map(|interval| interval.index()).collect()
    }

    #[test]
    fn test_channel_max_tie_break() {
        let channel = Channel::new(0, "Wh d", 1.0, 1.0);
        let data = intervals(&[3.0, 5.0, 1.0, 5.0, 2.0]);
        assert_eq!(channel.max_interval(&data).unwrap().index(), 1);
        assert_eq!(channel.most_recent_max_interval(&data).unwrap().index(), 3);
        assert_eq!(channel.max_value(&data), Some(5.0));
    }

    #[test]
    fn test_channel_min_tie_break() {
        let channel = Channel::new(0, "Wh d", 1.0, 1.0);
        let data = intervals(&[3.0, 1.0, 4.0, 1.0]);
        assert_eq!(channel.min_interval(&data).unwrap().index(), 1);
        assert_eq!(channel.min_value(&data), Some(1.0));
    }

    #[test]
    fn test_channel_empty() {
        let channel = Channel::new(0, "Wh d", 1.0, 1.0);
        assert!(channel.max_interval(&[]).is_none());
        assert!(channel.most_recent_max_interval(&[]).is_none());
        assert!(channel.min_value(&[]).is_none());
        assert!(channel.average(&[]).is_none());
        assert_eq!(channel.total(&[]).unwrap(), 0.0);
        assert!(channel.peaks(&[], 3).is_empty());
    }

    #[test]
    fn test_channel_peaks_ties() {
        let channel = Channel::new(0, "Wh d", 1.0, 1.0);
        let data = intervals(&[5.0, 5.0, 3.0]);
        assert_eq!(indices(&channel.peaks(&data, 2)), vec![0, 1]);
    }

    #[test]
    fn test_channel_peaks_order_and_clamp() {
        let channel = Channel::new(0, "Wh d", 1.0, 1.0);
        let data = intervals(&[2.0, 7.0, 4.0, 7.0, 9.0]);
        assert_eq!(indices(&channel.peaks(&data, 10)), vec![4, 1, 3, 2, 0]);
    }

    #[test]
    fn test_power_factor_peaks_ascending() {
        let channel = Channel::new(0, "PF", 1.0, 1.0);
        let data = intervals(&[0.9, 0.7, 0.95, 0.7]);
        assert_eq!(indices(&channel.peaks(&data, 3)), vec![1, 3, 0]);
    }

    #[test]
    fn test_channel_total_and_average() {
        let channel = Channel::new(0, "Wh d", 1.0, 1.0);
        let data = intervals(&[1.0, 2.0, 3.0, 6.0]);
        assert_eq!(channel.total(&data).unwrap(), 12.0);
        assert_eq!(channel.average(&data), Some(3.0));
    }

    #[test]
    fn test_power_factor_total_unsupported() {
        let channel = Channel::new(0, "PF (Calculated)", 1.0, 1.0);
        let data = intervals(&[0.5, 1.0]);
        assert!(matches!(channel.total(&data), Err(MeterError::Unsupported(_))));
        assert_eq!(channel.average(&data), Some(0.75));
    }

    #[test]
    fn test_derived_channel_is_power_factor() {
        let sources = DerivedSources::new(0).with_va(1);
        let channel = Channel::new_derived(2, "Calculated", DerivedKind::Pf, sources);
        assert!(channel.is_power_factor());
        assert!(channel.is_derived());
        assert_eq!(channel.kind().as_derived(), Some((DerivedKind::Pf, sources)));
    }
}
