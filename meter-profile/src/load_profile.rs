//! Load Profile Data
//!
//! The aggregate owns the channel list and the interval sequence. Its
//! representation (pulse, energy or demand) is fixed for the lifetime of
//! an instance: conversions, interval combination, rolling demand and
//! range extraction all return a new instance.
//!
//! Derived channels (var, VA, PF) always trail the plain channels. They
//! are computed immediately on energy and demand data. On pulse data a
//! request is recorded as pending and computed once the data is
//! converted.

use crate::channel::{Channel, ChannelKind, ChannelSeries};
use crate::derived::{DerivedKind, DerivedSources, DerivedState};
use crate::interval::Interval;
use chrono::{Duration, NaiveDateTime, Timelike};
use meter_core::quantity_names::{energy_to_demand_name, is_power_factor_name, rescale_name};
use meter_core::{DisplayScale, MeterError, MeterResult, StatusSet};
use meter_quantity::{Quantity, QuantityDecoder};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Representation of the interval values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProfileKind {
    /// Raw pulse counts
    Pulse = 0,
    /// Energy per interval
    Energy = 1,
    /// Average demand over the interval
    Demand = 2,
}

impl ProfileKind {
    pub fn from_u8(value: u8) -> MeterResult<Self> {
        match value {
            0 => Ok(ProfileKind::Pulse),
            1 => Ok(ProfileKind::Energy),
            2 => Ok(ProfileKind::Demand),
            _ => Err(MeterError::InvalidEnumValue {
                kind: "profile kind",
                value: value as u32,
            }),
        }
    }

    pub fn to_u8(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            ProfileKind::Pulse => "Pulse",
            ProfileKind::Energy => "Energy",
            ProfileKind::Demand => "Demand",
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Multi-channel interval data of one representation and duration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadProfileData {
    kind: ProfileKind,
    /// Data-set name
    name: String,
    /// Interval duration in minutes
    interval_duration: u32,
    display_scale: DisplayScale,
    channels: Vec<Channel>,
    intervals: Vec<Interval>,
    var_state: DerivedState,
    va_state: DerivedState,
    pf_state: DerivedState,
}

impl LoadProfileData {
    /// Create an empty load profile
    ///
    /// # Arguments
    /// * `kind` - Representation of the interval values
    /// * `interval_duration` - Interval duration in minutes
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `interval_duration` is zero.
    pub fn new(kind: ProfileKind, interval_duration: u32) -> MeterResult<Self> {
        if interval_duration == 0 {
            return Err(MeterError::InvalidArgument(
                "Interval duration must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            kind,
            name: String::new(),
            interval_duration,
            display_scale: DisplayScale::Units,
            channels: Vec::new(),
            intervals: Vec::new(),
            var_state: DerivedState::NotRequested,
            va_state: DerivedState::NotRequested,
            pf_state: DerivedState::NotRequested,
        })
    }

    pub fn kind(&self) -> ProfileKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Interval duration in minutes
    pub fn interval_duration(&self) -> u32 {
        self.interval_duration
    }

    pub fn display_scale(&self) -> DisplayScale {
        self.display_scale
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn channel(&self, index: usize) -> MeterResult<&Channel> {
        self.channels.get(index).ok_or(MeterError::ChannelOutOfRange {
            index,
            count: self.channels.len(),
        })
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of channels that are not derived
    pub fn plain_channel_count(&self) -> usize {
        self.channels.iter().take_while(|c| !c.is_derived()).count()
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn interval(&self, index: usize) -> MeterResult<&Interval> {
        self.intervals.get(index).ok_or(MeterError::IntervalOutOfRange {
            index,
            count: self.intervals.len(),
        })
    }

    pub fn interval_count(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Request state of one derived kind
    pub fn derived_state(&self, kind: DerivedKind) -> DerivedState {
        match kind {
            DerivedKind::Var => self.var_state,
            DerivedKind::Va => self.va_state,
            DerivedKind::Pf => self.pf_state,
        }
    }

    fn state_mut(&mut self, kind: DerivedKind) -> &mut DerivedState {
        match kind {
            DerivedKind::Var => &mut self.var_state,
            DerivedKind::Va => &mut self.va_state,
            DerivedKind::Pf => &mut self.pf_state,
        }
    }

    /// A channel bound to this profile's intervals, for aggregate queries
    pub fn series(&self, channel: usize) -> MeterResult<ChannelSeries<'_>> {
        Ok(ChannelSeries::new(self.channel(channel)?, &self.intervals))
    }

    /// Add a plain channel
    ///
    /// # Returns
    /// The new channel number.
    ///
    /// # Errors
    /// Channels must be added before any interval and before any derived
    /// channel; returns `InvalidArgument` otherwise.
    pub fn add_channel(
        &mut self,
        name: impl Into<String>,
        pulse_weight: f64,
        multiplier: f64,
    ) -> MeterResult<usize> {
        if !self.intervals.is_empty() {
            return Err(MeterError::InvalidArgument(
                "Channels cannot be added once intervals exist".to_string(),
            ));
        }
        if self.plain_channel_count() != self.channels.len() {
            return Err(MeterError::InvalidArgument(
                "Channels cannot be added after derived channels".to_string(),
            ));
        }
        let number = self.channels.len();
        self.channels
            .push(Channel::new(number, name, pulse_weight, multiplier));
        Ok(number)
    }

    /// Add a plain channel labelled from a quantity code
    ///
    /// Quantities without a profile label use their description. The
    /// label is rescaled to the profile's display scale and rewritten to
    /// its demand name on demand data.
    pub fn add_quantity_channel(
        &mut self,
        code: u32,
        pulse_weight: f64,
        multiplier: f64,
    ) -> MeterResult<usize> {
        let decoder = QuantityDecoder::from_code(code)?;
        let label = decoder
            .channel_name()
            .unwrap_or_else(|| decoder.description());
        let mut name = if is_power_factor_name(&label) {
            label
        } else {
            rescale_name(&label, self.display_scale)
        };
        if self.kind == ProfileKind::Demand {
            name = energy_to_demand_name(&name);
        }
        self.add_channel(name, pulse_weight, multiplier)
    }

    /// Bring interval data to the full channel count
    ///
    /// Data for the plain channels only is padded with `0.0` and an empty
    /// status in every derived slot.
    fn normalize_row(
        &self,
        mut data: Vec<f64>,
        mut channel_statuses: Vec<StatusSet>,
    ) -> MeterResult<(Vec<f64>, Vec<StatusSet>)> {
        if data.len() != channel_statuses.len() {
            return Err(MeterError::LengthMismatch {
                expected: data.len(),
                actual: channel_statuses.len(),
            });
        }
        let count = self.channels.len();
        let plain = self.plain_channel_count();
        if data.len() == count {
            return Ok((data, channel_statuses));
        }
        if data.len() == plain {
            log::debug!(
                "Padding {} derived slot(s) of interval data; \
                 call recalculate_channels to fill them",
                count - plain
            );
            data.resize(count, 0.0);
            channel_statuses.resize(count, StatusSet::new());
            return Ok((data, channel_statuses));
        }
        Err(MeterError::LengthMismatch {
            expected: count,
            actual: data.len(),
        })
    }

    fn scale_mask(&self) -> Vec<bool> {
        self.channels.iter().map(|c| !c.is_power_factor()).collect()
    }

    /// Append an interval
    ///
    /// Values supplied in another scale than the profile's display scale
    /// are converted into it; power factor channels are left as given.
    ///
    /// # Arguments
    /// * `data` - One value per channel, or per plain channel
    /// * `channel_statuses` - One status set per value
    /// * `interval_status` - Aggregate interval status
    /// * `time` - End timestamp; must be later than the previous interval
    /// * `scale` - Scale of `data`
    ///
    /// # Returns
    /// The index of the new interval.
    pub fn add_interval(
        &mut self,
        data: Vec<f64>,
        channel_statuses: Vec<StatusSet>,
        interval_status: StatusSet,
        time: NaiveDateTime,
        scale: DisplayScale,
    ) -> MeterResult<usize> {
        let (data, channel_statuses) = self.normalize_row(data, channel_statuses)?;
        if let Some(last) = self.intervals.last() {
            if time <= last.time() {
                return Err(MeterError::InvalidArgument(format!(
                    "Interval at {} does not follow interval at {}",
                    time,
                    last.time()
                )));
            }
        }
        let index = self.intervals.len();
        let mut interval =
            Interval::new(index, data, channel_statuses, interval_status, time, scale)?;
        if scale != self.display_scale {
            interval.set_scale_masked(self.display_scale, &self.scale_mask());
        }
        self.intervals.push(interval);
        Ok(index)
    }

    /// Replace the values and statuses of one interval
    pub fn update_interval(
        &mut self,
        index: usize,
        data: Vec<f64>,
        channel_statuses: Vec<StatusSet>,
        interval_status: StatusSet,
    ) -> MeterResult<()> {
        let (data, channel_statuses) = self.normalize_row(data, channel_statuses)?;
        let count = self.intervals.len();
        let interval = self
            .intervals
            .get_mut(index)
            .ok_or(MeterError::IntervalOutOfRange { index, count })?;
        interval.set_values(data, channel_statuses, interval_status)
    }

    /// Change the display scale of every value and channel name
    ///
    /// Power factor channels keep their values and names.
    pub fn set_display_scale(&mut self, scale: DisplayScale) {
        if scale == self.display_scale {
            return;
        }
        log::debug!(
            "Changing display scale of '{}' from {:?} to {:?}",
            self.name,
            self.display_scale,
            scale
        );
        let mask = self.scale_mask();
        for interval in &mut self.intervals {
            interval.set_scale_masked(scale, &mask);
        }
        for channel in &mut self.channels {
            if !channel.is_power_factor() {
                let name = rescale_name(channel.name(), scale);
                channel.set_name(name);
            }
        }
        self.display_scale = scale;
    }

    /// Request a calculated var channel
    ///
    /// # Returns
    /// The channel number, or `None` when the request is pending on pulse data.
    pub fn add_calculated_var(&mut self, sources: DerivedSources) -> MeterResult<Option<usize>> {
        self.request_derived(DerivedKind::Var, sources)
    }

    /// Request a calculated VA channel
    pub fn add_calculated_va(&mut self, sources: DerivedSources) -> MeterResult<Option<usize>> {
        self.request_derived(DerivedKind::Va, sources)
    }

    /// Request a calculated power factor channel
    pub fn add_calculated_pf(&mut self, sources: DerivedSources) -> MeterResult<Option<usize>> {
        self.request_derived(DerivedKind::Pf, sources)
    }

    /// Request a derived channel of any kind
    ///
    /// Requesting a kind that is already present refreshes that channel
    /// with the new sources.
    ///
    /// # Errors
    /// Returns `InvalidArgument` when the sources lack a usable second
    /// input, `ChannelOutOfRange` when a source channel does not exist.
    pub fn request_derived(
        &mut self,
        kind: DerivedKind,
        sources: DerivedSources,
    ) -> MeterResult<Option<usize>> {
        sources.second_input(kind)?;
        match self.kind {
            ProfileKind::Pulse => {
                self.validate_sources(&sources, None)?;
                *self.state_mut(kind) = DerivedState::Pending(sources);
                log::debug!(
                    "Deferring calculated {} channel of '{}' until pulse data is converted",
                    kind,
                    self.name
                );
                Ok(None)
            }
            ProfileKind::Energy | ProfileKind::Demand => {
                self.compute_derived(kind, sources).map(Some)
            }
        }
    }

    fn validate_sources(&self, sources: &DerivedSources, target: Option<usize>) -> MeterResult<()> {
        let count = self.channels.len();
        for channel in sources.channels() {
            if channel >= count {
                return Err(MeterError::ChannelOutOfRange { index: channel, count });
            }
            if Some(channel) == target {
                return Err(MeterError::InvalidArgument(format!(
                    "Channel {} cannot be derived from itself",
                    channel
                )));
            }
        }
        Ok(())
    }

    fn derived_channel(&self, kind: DerivedKind) -> Option<usize> {
        self.channels
            .iter()
            .position(|c| c.kind().as_derived().map(|(k, _)| k) == Some(kind))
    }

    fn compute_derived(
        &mut self,
        kind: DerivedKind,
        sources: DerivedSources,
    ) -> MeterResult<usize> {
        let existing = self.derived_channel(kind);
        let target = existing.unwrap_or(self.channels.len());
        self.validate_sources(&sources, Some(target))?;
        match existing {
            Some(channel) => {
                let previous = *self.channels[channel].kind();
                self.channels[channel].set_kind(ChannelKind::derived(kind, sources));
                if let Err(err) = self.recalculate_channels() {
                    self.channels[channel].set_kind(previous);
                    return Err(err);
                }
            }
            None => {
                self.intervals = refresh_column(&self.intervals, kind, sources, target)?;
                let demand = self.kind == ProfileKind::Demand;
                let name = kind.channel_name(self.display_scale, demand);
                self.channels
                    .push(Channel::new_derived(target, name, kind, sources));
            }
        }
        *self.state_mut(kind) = DerivedState::Computed(target);
        Ok(target)
    }

    /// Derived channels ordered so that every channel follows the derived
    /// channels it reads from
    ///
    /// # Errors
    /// Returns `InvalidArgument` when derived channels read from each other
    /// in a cycle.
    fn derived_order(&self) -> MeterResult<Vec<(usize, DerivedKind, DerivedSources)>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            Visiting,
            Done,
        }

        let derived: Vec<Option<(DerivedKind, DerivedSources)>> =
            self.channels.iter().map(|c| c.kind().as_derived()).collect();
        let mut marks = vec![Mark::Unvisited; derived.len()];
        let mut order = Vec::new();
        for (root, entry) in derived.iter().enumerate() {
            if entry.is_none() || marks[root] == Mark::Done {
                continue;
            }
            // Each frame is a channel and the position of its next input
            let mut stack = vec![(root, 0usize)];
            marks[root] = Mark::Visiting;
            while let Some(frame) = stack.last_mut() {
                let (channel, step) = *frame;
                frame.1 += 1;
                let Some((kind, sources)) = derived[channel] else {
                    stack.pop();
                    continue;
                };
                let inputs = [sources.watt, sources.second_input(kind)?.channel()];
                match inputs.get(step) {
                    Some(&input) => {
                        if !matches!(derived.get(input), Some(Some(_))) {
                            continue;
                        }
                        match marks[input] {
                            Mark::Done => {}
                            Mark::Visiting => {
                                return Err(MeterError::InvalidArgument(format!(
                                    "Calculated channel {} depends on itself through channel {}",
                                    input, channel
                                )));
                            }
                            Mark::Unvisited => {
                                marks[input] = Mark::Visiting;
                                stack.push((input, 0));
                            }
                        }
                    }
                    None => {
                        marks[channel] = Mark::Done;
                        order.push((channel, kind, sources));
                        stack.pop();
                    }
                }
            }
        }
        Ok(order)
    }

    /// Recompute every derived channel from its own recorded sources
    ///
    /// Channels are refreshed after the derived channels they read from.
    /// On error the intervals are left untouched.
    ///
    /// # Errors
    /// Returns `InvalidArgument` when derived channels depend on each other
    /// in a cycle, `ChannelOutOfRange` when an interval lacks a source cell.
    pub fn recalculate_channels(&mut self) -> MeterResult<()> {
        let order = self.derived_order()?;
        if order.is_empty() {
            return Ok(());
        }
        let mut intervals = self.intervals.clone();
        for (channel, kind, sources) in order {
            intervals = refresh_column(&intervals, kind, sources, channel)?;
        }
        self.intervals = intervals;
        Ok(())
    }

    /// New profile over `intervals`, with this profile's channels
    ///
    /// `intervals` must carry the plain channels only. Derived channels are
    /// recomputed on the new data and pending requests are replayed; on
    /// demand data converted from another representation the channel names
    /// are rewritten to their demand counterparts.
    pub(crate) fn successor(
        &self,
        kind: ProfileKind,
        interval_duration: u32,
        intervals: Vec<Interval>,
    ) -> MeterResult<LoadProfileData> {
        let rename = kind == ProfileKind::Demand && self.kind != ProfileKind::Demand;
        let channels: Vec<Channel> = self
            .channels
            .iter()
            .map(|channel| {
                let mut channel = channel.clone();
                if rename {
                    let name = energy_to_demand_name(channel.name());
                    channel.set_name(name);
                }
                channel
            })
            .collect();
        let count = channels.len();
        let mut next = LoadProfileData {
            kind,
            name: self.name.clone(),
            interval_duration,
            display_scale: self.display_scale,
            channels,
            intervals: intervals
                .into_iter()
                .enumerate()
                .map(|(index, interval)| interval.with_index(index).padded(count))
                .collect(),
            var_state: DerivedState::NotRequested,
            va_state: DerivedState::NotRequested,
            pf_state: DerivedState::NotRequested,
        };
        for derived in DerivedKind::ALL {
            if let Some(channel) = self.derived_state(derived).channel() {
                *next.state_mut(derived) = DerivedState::Computed(channel);
            }
        }
        next.recalculate_channels()?;
        for derived in DerivedKind::ALL {
            if let DerivedState::Pending(sources) = self.derived_state(derived) {
                if let Some(channel) = next.request_derived(derived, sources)? {
                    log::debug!(
                        "Computed deferred calculated {} channel {} of '{}'",
                        derived,
                        channel,
                        self.name
                    );
                }
            }
        }
        Ok(next)
    }

    /// Intervals within `[start + duration, end]`, compared at minute resolution
    ///
    /// The bounds are `start` truncated to the minute plus one interval
    /// duration, and `end` truncated to the minute plus one second. All
    /// channels are copied; derived values are not recomputed.
    pub fn range(&self, start: NaiveDateTime, end: NaiveDateTime) -> LoadProfileData {
        let lower = truncate_to_minute(start) + Duration::minutes(self.interval_duration as i64);
        let upper = truncate_to_minute(end) + Duration::seconds(1);
        let intervals = self
            .intervals
            .iter()
            .filter(|interval| interval.time() >= lower && interval.time() <= upper)
            .cloned()
            .enumerate()
            .map(|(index, interval)| interval.with_index(index))
            .collect();
        LoadProfileData {
            intervals,
            ..self.clone_without_intervals()
        }
    }

    fn clone_without_intervals(&self) -> LoadProfileData {
        LoadProfileData {
            kind: self.kind,
            name: self.name.clone(),
            interval_duration: self.interval_duration,
            display_scale: self.display_scale,
            channels: self.channels.clone(),
            intervals: Vec::new(),
            var_state: self.var_state,
            va_state: self.va_state,
            pf_state: self.pf_state,
        }
    }

    pub fn change_channel_name(
        &mut self,
        channel: usize,
        name: impl Into<String>,
    ) -> MeterResult<()> {
        self.channel_mut(channel)?.set_name(name);
        Ok(())
    }

    pub fn change_channel_pulse_weight(
        &mut self,
        channel: usize,
        pulse_weight: f64,
    ) -> MeterResult<()> {
        self.channel_mut(channel)?.set_pulse_weight(pulse_weight);
        Ok(())
    }

    /// Change a channel's multiplier
    ///
    /// On energy and demand data the stored values are rescaled by
    /// `new / old` and derived channels are recomputed.
    ///
    /// # Errors
    /// Returns `Unsupported` for derived channels and `InvalidArgument`
    /// when the old multiplier is zero on energy or demand data.
    pub fn change_channel_multiplier(
        &mut self,
        channel: usize,
        multiplier: f64,
    ) -> MeterResult<()> {
        let target = self.channel(channel)?;
        if target.is_derived() {
            return Err(MeterError::Unsupported(format!(
                "Multiplier of derived channel '{}'",
                target.name()
            )));
        }
        let old = target.multiplier();
        if self.kind != ProfileKind::Pulse {
            if old == 0.0 {
                return Err(MeterError::InvalidArgument(format!(
                    "Channel {} has a zero multiplier; its values cannot be rescaled",
                    channel
                )));
            }
            let factor = multiplier / old;
            for interval in &mut self.intervals {
                interval.scale_value(channel, factor);
            }
        }
        self.channel_mut(channel)?.set_multiplier(multiplier);
        if self.kind != ProfileKind::Pulse {
            self.recalculate_channels()?;
        }
        Ok(())
    }

    fn channel_mut(&mut self, index: usize) -> MeterResult<&mut Channel> {
        let count = self.channels.len();
        self.channels
            .get_mut(index)
            .ok_or(MeterError::ChannelOutOfRange { index, count })
    }

    /// Intervals carrying the plain channels only, each value mapped by `convert`
    ///
    /// Statuses and timestamps are carried through unchanged.
    pub(crate) fn map_plain_channels(
        &self,
        convert: impl Fn(&Channel, f64) -> f64,
    ) -> MeterResult<Vec<Interval>> {
        let plain = &self.channels[..self.plain_channel_count()];
        self.intervals
            .iter()
            .map(|interval| {
                let mut data = Vec::with_capacity(plain.len());
                let mut statuses = Vec::with_capacity(plain.len());
                for channel in plain {
                    let (value, status) = interval.cell(channel.number())?;
                    data.push(convert(channel, value));
                    statuses.push(status.clone());
                }
                Interval::new(
                    interval.index(),
                    data,
                    statuses,
                    interval.interval_status().clone(),
                    interval.time(),
                    interval.scale(),
                )
            })
            .collect()
    }
}

/// Copy of `intervals` with one derived column recomputed
fn refresh_column(
    intervals: &[Interval],
    kind: DerivedKind,
    sources: DerivedSources,
    target: usize,
) -> MeterResult<Vec<Interval>> {
    intervals
        .iter()
        .map(|interval| {
            let (value, status) = sources.compute(kind, interval)?;
            interval.with_channel_value(target, value, status)
        })
        .collect()
}

/// Drop seconds and sub-seconds
pub(crate) fn truncate_to_minute(time: NaiveDateTime) -> NaiveDateTime {
    time - Duration::seconds(time.second() as i64) - Duration::nanoseconds(time.nanosecond() as i64)
}
