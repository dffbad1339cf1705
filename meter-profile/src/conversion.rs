//! Representation conversions
//!
//! Pulse converts to energy or demand, energy converts to demand, and each
//! representation converts to itself. Demand cannot be turned back into
//! energy.

use crate::load_profile::{LoadProfileData, ProfileKind};
use meter_core::{MeterError, MeterResult};

/// Interval duration in hours
pub(crate) fn duration_hours(minutes: u32) -> f64 {
    minutes as f64 / 60.0
}

impl LoadProfileData {
    /// Convert to energy
    ///
    /// Pulse values become `pulses × pulse weight × multiplier`. Pending
    /// derived channels are computed on the result.
    ///
    /// # Errors
    /// Returns `UnsupportedConversion` for demand data.
    pub fn to_energy(&self) -> MeterResult<LoadProfileData> {
        match self.kind() {
            ProfileKind::Energy => Ok(self.clone()),
            ProfileKind::Demand => Err(MeterError::UnsupportedConversion {
                from: ProfileKind::Demand.to_string(),
                to: ProfileKind::Energy.to_string(),
            }),
            ProfileKind::Pulse => {
                let intervals = self.map_plain_channels(|channel, pulses| {
                    pulses * channel.pulse_weight() * channel.multiplier()
                })?;
                log::debug!(
                    "Converted {} pulse interval(s) of '{}' to energy",
                    intervals.len(),
                    self.name()
                );
                self.successor(ProfileKind::Energy, self.interval_duration(), intervals)
            }
        }
    }

    /// Convert to demand
    ///
    /// Values are divided by the interval duration in hours, after the
    /// pulse weight and multiplier on pulse data. Power factor channels
    /// pass through unchanged. Derived channels are recomputed from the
    /// converted sources.
    pub fn to_demand(&self) -> MeterResult<LoadProfileData> {
        let hours = duration_hours(self.interval_duration());
        let intervals = match self.kind() {
            ProfileKind::Demand => return Ok(self.clone()),
            ProfileKind::Energy => self.map_plain_channels(|channel, energy| {
                if channel.is_power_factor() {
                    energy
                } else {
                    energy / hours
                }
            })?,
            ProfileKind::Pulse => self.map_plain_channels(|channel, pulses| {
                if channel.is_power_factor() {
                    pulses
                } else {
                    pulses * channel.pulse_weight() * channel.multiplier() / hours
                }
            })?,
        };
        log::debug!(
            "Converted {} {} interval(s) of '{}' to demand",
            intervals.len(),
            self.kind(),
            self.name()
        );
        self.successor(ProfileKind::Demand, self.interval_duration(), intervals)
    }
}

#[cfg(test)]
mod tests {
    use crate::derived::{DerivedKind, DerivedSources, DerivedState};
    use crate::load_profile::tests::{approx, at, profile};
    use crate::load_profile::ProfileKind;
    use meter_core::MeterError;

    #[test]
    fn test_pulse_to_energy() {
        let mut data = profile(
            ProfileKind::Pulse,
            15,
            &["Wh d", "VAh d"],
            at(0, 15),
            &[vec![30.0, 50.0]],
        );
        data.change_channel_pulse_weight(0, 0.1).unwrap();
        data.change_channel_multiplier(0, 2.0).unwrap();
        data.change_channel_pulse_weight(1, 0.1).unwrap();
        data.change_channel_multiplier(1, 2.0).unwrap();
        let sources = DerivedSources::new(0).with_va(1);
        data.add_calculated_var(sources).unwrap();
        data.add_calculated_pf(sources).unwrap();

        let energy = data.to_energy().unwrap();
        assert_eq!(energy.kind(), ProfileKind::Energy);
        assert_eq!(energy.channel_count(), 4);
        assert_eq!(energy.derived_state(DerivedKind::Var), DerivedState::Computed(2));
        assert_eq!(energy.derived_state(DerivedKind::Pf), DerivedState::Computed(3));
        assert_eq!(energy.derived_state(DerivedKind::Va), DerivedState::NotRequested);
        assert_eq!(energy.channel(2).unwrap().name(), "varh (Calculated)");

        let values = energy.interval(0).unwrap().data();
        assert!(approx(values[0], 6.0));
        assert!(approx(values[1], 10.0));
        assert!(approx(values[2], 8.0));
        assert!(approx(values[3], 0.6));

        // the source profile is untouched
        assert_eq!(data.channel_count(), 2);
        assert_eq!(data.interval(0).unwrap().data(), &[30.0, 50.0]);
    }

    #[test]
    fn test_energy_to_demand() {
        let mut data = profile(
            ProfileKind::Energy,
            15,
            &["Wh d", "VAh d", "PF"],
            at(0, 15),
            &[vec![3.0, 5.0, 0.6], vec![1.0, 2.0, 0.5]],
        );
        data.add_calculated_var(DerivedSources::new(0).with_va(1)).unwrap();

        let demand = data.to_demand().unwrap();
        assert_eq!(demand.kind(), ProfileKind::Demand);
        assert_eq!(demand.channel(0).unwrap().name(), "W d");
        assert_eq!(demand.channel(1).unwrap().name(), "VA d");
        assert_eq!(demand.channel(3).unwrap().name(), "var (Calculated)");

        let first = demand.interval(0).unwrap().data();
        assert_eq!(first[0], 12.0);
        assert_eq!(first[1], 20.0);
        assert_eq!(first[2], 0.6);
        assert!(approx(first[3], 16.0));
    }

    #[test]
    fn test_pulse_to_demand() {
        let mut data = profile(
            ProfileKind::Pulse,
            30,
            &["Wh d", "PF"],
            at(0, 30),
            &[vec![100.0, 0.9]],
        );
        data.change_channel_pulse_weight(0, 0.5).unwrap();
        let demand = data.to_demand().unwrap();
        assert_eq!(demand.interval(0).unwrap().data(), &[100.0, 0.9]);
    }

    #[test]
    fn test_demand_to_energy_unsupported() {
        let data = profile(ProfileKind::Demand, 15, &["W d"], at(0, 15), &[vec![1.0]]);
        assert!(matches!(
            data.to_energy(),
            Err(MeterError::UnsupportedConversion { .. })
        ));
        assert_eq!(data.to_demand().unwrap(), data);
    }

    #[test]
    fn test_identity_conversions() {
        let data = profile(ProfileKind::Energy, 15, &["Wh d"], at(0, 15), &[vec![1.0]]);
        assert_eq!(data.to_energy().unwrap(), data);
    }
}
