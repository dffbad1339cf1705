//! Load profile builder
//!
//! Configures the representation, interval duration, display scale,
//! channels and derived-channel requests of a load profile before any
//! interval is added.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use meter_profile::{ChannelSpec, DerivedSources, LoadProfileBuilder, ProfileKind};
//!
//! let profile = LoadProfileBuilder::new(ProfileKind::Energy)
//!     .interval_duration(15)
//!     .name("Feeder 12")
//!     .channel(ChannelSpec::named("Wh d"))
//!     .channel(ChannelSpec::named("varh d").with_multiplier(2.0))
//!     .calculated_pf(DerivedSources::new(0).with_var(1))
//!     .build()?;
//! # Ok::<(), meter_core::MeterError>(())
//! ```

use crate::derived::{DerivedKind, DerivedSources};
use crate::load_profile::{LoadProfileData, ProfileKind};
use meter_core::{DisplayScale, MeterResult};
use serde::{Deserialize, Serialize};

/// How a channel is labelled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChannelLabel {
    /// Explicit channel name
    Name(String),
    /// Label derived from a quantity code
    Quantity(u32),
}

/// Configuration of one plain channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSpec {
    pub label: ChannelLabel,
    pub pulse_weight: f64,
    pub multiplier: f64,
}

impl ChannelSpec {
    /// Channel with an explicit name, pulse weight and multiplier of 1
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            label: ChannelLabel::Name(name.into()),
            pulse_weight: 1.0,
            multiplier: 1.0,
        }
    }

    /// Channel labelled from a quantity code, pulse weight and multiplier of 1
    pub fn quantity(code: u32) -> Self {
        Self {
            label: ChannelLabel::Quantity(code),
            pulse_weight: 1.0,
            multiplier: 1.0,
        }
    }

    pub fn with_pulse_weight(mut self, pulse_weight: f64) -> Self {
        self.pulse_weight = pulse_weight;
        self
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }
}

/// Builder for [`LoadProfileData`]
///
/// # Configuration Flow
/// 1. Create the builder with `LoadProfileBuilder::new(kind)`
/// 2. Set the interval duration, data-set name and display scale
/// 3. Add channels, then derived-channel requests
/// 4. Build the profile with `build()`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadProfileBuilder {
    kind: ProfileKind,
    /// Interval duration in minutes
    interval_duration: u32,
    name: String,
    display_scale: DisplayScale,
    channels: Vec<ChannelSpec>,
    derived: Vec<(DerivedKind, DerivedSources)>,
}

impl LoadProfileBuilder {
    /// Create a builder
    ///
    /// # Default Settings
    /// - Interval duration: 15 minutes
    /// - Display scale: units
    /// - No channels
    pub fn new(kind: ProfileKind) -> Self {
        Self {
            kind,
            interval_duration: 15,
            name: String::new(),
            display_scale: DisplayScale::Units,
            channels: Vec::new(),
            derived: Vec::new(),
        }
    }

    pub fn interval_duration(mut self, minutes: u32) -> Self {
        self.interval_duration = minutes;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Scale the intervals will be supplied in
    ///
    /// Channels labelled from quantity codes are named for this scale;
    /// explicit names are kept as given.
    pub fn display_scale(mut self, scale: DisplayScale) -> Self {
        self.display_scale = scale;
        self
    }

    pub fn channel(mut self, spec: ChannelSpec) -> Self {
        self.channels.push(spec);
        self
    }

    pub fn channels(mut self, specs: impl IntoIterator<Item = ChannelSpec>) -> Self {
        self.channels.extend(specs);
        self
    }

    pub fn calculated_var(self, sources: DerivedSources) -> Self {
        self.calculated(DerivedKind::Var, sources)
    }

    pub fn calculated_va(self, sources: DerivedSources) -> Self {
        self.calculated(DerivedKind::Va, sources)
    }

    pub fn calculated_pf(self, sources: DerivedSources) -> Self {
        self.calculated(DerivedKind::Pf, sources)
    }

    pub fn calculated(mut self, kind: DerivedKind, sources: DerivedSources) -> Self {
        self.derived.push((kind, sources));
        self
    }

    /// Build the load profile
    ///
    /// # Errors
    /// Returns the first error raised while creating the profile, adding
    /// a channel or recording a derived-channel request.
    pub fn build(self) -> MeterResult<LoadProfileData> {
        let mut profile = LoadProfileData::new(self.kind, self.interval_duration)?;
        profile.set_name(self.name);
        profile.set_display_scale(self.display_scale);
        for spec in self.channels {
            match spec.label {
                ChannelLabel::Name(name) => {
                    profile.add_channel(name, spec.pulse_weight, spec.multiplier)?
                }
                ChannelLabel::Quantity(code) => {
                    profile.add_quantity_channel(code, spec.pulse_weight, spec.multiplier)?
                }
            };
        }
        for (kind, sources) in self.derived {
            profile.request_derived(kind, sources)?;
        }
        log::debug!(
            "Built {} load profile '{}' with {} channel(s)",
            profile.kind(),
            profile.name(),
            profile.channel_count()
        );
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derived::DerivedState;
    use meter_core::MeterError;

    #[test]
    fn test_builder_defaults() {
        let profile = LoadProfileBuilder::new(ProfileKind::Energy).build().unwrap();
        assert_eq!(profile.interval_duration(), 15);
        assert_eq!(profile.display_scale(), DisplayScale::Units);
        assert_eq!(profile.channel_count(), 0);
    }

    #[test]
    fn test_builder_channels_and_derived() {
        let profile = LoadProfileBuilder::new(ProfileKind::Energy)
            .interval_duration(30)
            .name("Feeder 12")
            .channel(ChannelSpec::named("Wh d").with_pulse_weight(0.5))
            .channel(ChannelSpec::named("varh d").with_multiplier(2.0))
            .calculated_pf(DerivedSources::new(0).with_var(1))
            .build()
            .unwrap();
        assert_eq!(profile.name(), "Feeder 12");
        assert_eq!(profile.interval_duration(), 30);
        assert_eq!(profile.channel_count(), 3);
        assert_eq!(profile.channel(0).unwrap().pulse_weight(), 0.5);
        assert_eq!(profile.channel(1).unwrap().multiplier(), 2.0);
        assert_eq!(profile.channel(2).unwrap().name(), "PF (Calculated)");
        assert_eq!(profile.derived_state(DerivedKind::Pf), DerivedState::Computed(2));
    }

    #[test]
    fn test_builder_pulse_defers() {
        let sources = DerivedSources::new(0).with_va(1);
        let profile = LoadProfileBuilder::new(ProfileKind::Pulse)
            .channels([ChannelSpec::named("Wh d"), ChannelSpec::named("VAh d")])
            .calculated_var(sources)
            .build()
            .unwrap();
        assert_eq!(profile.channel_count(), 2);
        assert_eq!(profile.derived_state(DerivedKind::Var), DerivedState::Pending(sources));
    }

    #[test]
    fn test_builder_quantity_channel_scale() {
        let profile = LoadProfileBuilder::new(ProfileKind::Demand)
            .display_scale(DisplayScale::Mega)
            .channel(ChannelSpec::quantity(0x0004_1001))
            .build()
            .unwrap();
        assert_eq!(profile.channel(0).unwrap().name(), "MW r");
        assert_eq!(profile.display_scale(), DisplayScale::Mega);
    }

    #[test]
    fn test_builder_errors() {
        assert!(matches!(
            LoadProfileBuilder::new(ProfileKind::Energy).interval_duration(0).build(),
            Err(MeterError::InvalidArgument(_))
        ));
        let missing = LoadProfileBuilder::new(ProfileKind::Energy)
            .channel(ChannelSpec::named("Wh d"))
            .calculated_va(DerivedSources::new(0).with_var(3))
            .build();
        assert!(matches!(missing, Err(MeterError::ChannelOutOfRange { index: 3, count: 1 })));
    }
}
