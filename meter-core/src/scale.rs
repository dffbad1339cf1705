//! Display scale for interval values
//!
//! Interval values can be displayed in units, kilo-units or mega-units.
//! Switching between scales multiplies or divides every value by 1000 per
//! step, and channel names pick up or lose the matching `k`/`M` prefix.

use crate::error::{MeterError, MeterResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Display scale of interval values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DisplayScale {
    /// Plain engineering units (Wh, W, ...)
    #[default]
    Units = 0,
    /// Thousands of units (kWh, kW, ...)
    Kilo = 1,
    /// Millions of units (MWh, MW, ...)
    Mega = 2,
}

impl DisplayScale {
    pub fn from_u8(value: u8) -> MeterResult<Self> {
        match value {
            0 => Ok(DisplayScale::Units),
            1 => Ok(DisplayScale::Kilo),
            2 => Ok(DisplayScale::Mega),
            _ => Err(MeterError::InvalidEnumValue {
                kind: "display scale",
                value: value as u32,
            }),
        }
    }

    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Name prefix letter for this scale (`None` for units)
    pub fn prefix(self) -> Option<char> {
        match self {
            DisplayScale::Units => None,
            DisplayScale::Kilo => Some('k'),
            DisplayScale::Mega => Some('M'),
        }
    }

    /// Suffix appended to names that are not in the quantity-name table
    pub fn suffix(self) -> Option<&'static str> {
        match self {
            DisplayScale::Units => None,
            DisplayScale::Kilo => Some(" (Kilo)"),
            DisplayScale::Mega => Some(" (Mega)"),
        }
    }

    /// Convert a single value from `self` into `target`
    ///
    /// Steps to a larger scale divide by a power of 1000; steps to a
    /// smaller one multiply.
    ///
    /// # Example
    /// Units to Kilo turns `1500.0` into `1.5`.
    pub fn convert(self, value: f64, target: DisplayScale) -> f64 {
        let steps = self.to_u8() as i32 - target.to_u8() as i32;
        if steps >= 0 {
            value * 1000_f64.powi(steps)
        } else {
            value / 1000_f64.powi(-steps)
        }
    }
}

impl fmt::Display for DisplayScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DisplayScale::Units => "Units",
            DisplayScale::Kilo => "Kilo",
            DisplayScale::Mega => "Mega",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_from_u8() {
        assert_eq!(DisplayScale::from_u8(1).unwrap(), DisplayScale::Kilo);
        assert!(DisplayScale::from_u8(3).is_err());
    }

    #[test]
    fn test_scale_conversion() {
        assert_eq!(DisplayScale::Units.convert(1500.0, DisplayScale::Kilo), 1.5);
        assert_eq!(DisplayScale::Mega.convert(2.0, DisplayScale::Units), 2_000_000.0);
        assert_eq!(DisplayScale::Kilo.convert(7.0, DisplayScale::Kilo), 7.0);
        assert_eq!(DisplayScale::Units.convert(2_500_000.0, DisplayScale::Mega), 2.5);
    }

    #[test]
    fn test_scale_round_trip() {
        let value = 1234.5678;
        let kilo = DisplayScale::Units.convert(value, DisplayScale::Kilo);
        let mega = DisplayScale::Kilo.convert(kilo, DisplayScale::Mega);
        let back = DisplayScale::Mega.convert(mega, DisplayScale::Units);
        assert!((back - value).abs() < 1e-9);
    }

    #[test]
    fn test_scale_prefix() {
        assert_eq!(DisplayScale::Units.prefix(), None);
        assert_eq!(DisplayScale::Kilo.prefix(), Some('k'));
        assert_eq!(DisplayScale::Mega.suffix(), Some(" (Mega)"));
    }
}
