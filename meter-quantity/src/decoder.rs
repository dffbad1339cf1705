//! Quantity decoder factory
//!
//! Dispatches on the low nibble of a quantity code and returns the
//! correctly typed decoder.

use crate::Quantity;
use crate::code::{QuantityCode, QuantityType};
use crate::coincident::{CoincidentQuantity, ExtendedCoincidentQuantity};
use crate::electrical::ElectricalQuantity;
use crate::event::EventQuantity;
use crate::extrema::{ExtremaQuantity, RatesExtremaQuantity};
use crate::fields::ElectricalFields;
use crate::harmonics::HarmonicsQuantity;
use crate::io::IoQuantity;
use crate::register::{NonRegisterQuantity, UserDefinedQuantity};
use crate::totalized::TotalizedQuantity;
use crate::volume::VolumeQuantity;
use crate::vq::VqQuantity;
use meter_core::MeterResult;
use serde::{Deserialize, Serialize};

/// A decoded quantity code of any type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuantityDecoder {
    UserDefined(UserDefinedQuantity),
    Electrical(ElectricalQuantity),
    NonRegister(NonRegisterQuantity),
    Event(EventQuantity),
    Coincident(CoincidentQuantity),
    Harmonics(HarmonicsQuantity),
    Io(IoQuantity),
    Totalized(TotalizedQuantity),
    Vq(VqQuantity),
    Extrema(ExtremaQuantity),
    Volume(VolumeQuantity),
    RatesExtrema(RatesExtremaQuantity),
    ExtendedCoincident(ExtendedCoincidentQuantity),
}

impl QuantityDecoder {
    /// Decode a raw quantity code
    ///
    /// # Errors
    /// Returns `UnknownQuantityType` for reserved type nibbles and
    /// `InvalidEnumValue` when a sub-field holds a reserved value.
    pub fn from_code(code: u32) -> MeterResult<Self> {
        let code = QuantityCode::new(code);
        let decoder = match code.quantity_type()? {
            QuantityType::UserDefined => Self::UserDefined(UserDefinedQuantity::from_code(code)?),
            QuantityType::Electrical => Self::Electrical(ElectricalQuantity::from_code(code)?),
            QuantityType::NonRegister => Self::NonRegister(NonRegisterQuantity::from_code(code)?),
            QuantityType::Event => Self::Event(EventQuantity::from_code(code)?),
            QuantityType::Coincident => Self::Coincident(CoincidentQuantity::from_code(code)?),
            QuantityType::Harmonics => Self::Harmonics(HarmonicsQuantity::from_code(code)?),
            QuantityType::Io => Self::Io(IoQuantity::from_code(code)?),
            QuantityType::Totalized => Self::Totalized(TotalizedQuantity::from_code(code)?),
            QuantityType::Vq => Self::Vq(VqQuantity::from_code(code)?),
            QuantityType::Extrema => Self::Extrema(ExtremaQuantity::from_code(code)?),
            QuantityType::Volume => Self::Volume(VolumeQuantity::from_code(code)?),
            QuantityType::RatesExtrema => {
                Self::RatesExtrema(RatesExtremaQuantity::from_code(code)?)
            }
            QuantityType::ExtendedCoincident => {
                Self::ExtendedCoincident(ExtendedCoincidentQuantity::from_code(code)?)
            }
        };
        Ok(decoder)
    }

    fn inner(&self) -> &dyn Quantity {
        match self {
            Self::UserDefined(q) => q,
            Self::Electrical(q) => q,
            Self::NonRegister(q) => q,
            Self::Event(q) => q,
            Self::Coincident(q) => q,
            Self::Harmonics(q) => q,
            Self::Io(q) => q,
            Self::Totalized(q) => q,
            Self::Vq(q) => q,
            Self::Extrema(q) => q,
            Self::Volume(q) => q,
            Self::RatesExtrema(q) => q,
            Self::ExtendedCoincident(q) => q,
        }
    }

    /// Shared electrical sub-fields, for the types that carry them
    pub fn electrical_fields(&self) -> Option<&ElectricalFields> {
        match self {
            Self::Electrical(q) => Some(q.fields()),
            Self::Coincident(q) => Some(q.fields()),
            Self::Totalized(q) => Some(q.fields()),
            Self::Extrema(q) => Some(q.fields()),
            Self::RatesExtrema(q) => Some(q.fields()),
            Self::ExtendedCoincident(q) => Some(q.fields()),
            _ => None,
        }
    }

    /// Load profile channel label, for quantities that can be profiled
    pub fn channel_name(&self) -> Option<String> {
        match self {
            Self::Electrical(q) => Some(q.channel_name()),
            Self::Totalized(q) => Some(q.channel_name()),
            Self::Volume(q) => Some(q.description()),
            Self::Io(q) => Some(q.description()),
            _ => None,
        }
    }
}

impl Quantity for QuantityDecoder {
    fn code(&self) -> QuantityCode {
        self.inner().code()
    }

    fn quantity_type(&self) -> QuantityType {
        self.inner().quantity_type()
    }

    fn description(&self) -> String {
        self.inner().description()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meter_core::MeterError;

    #[test]
    fn test_decoder_dispatch() {
        let decoder = QuantityDecoder::from_code(0x0004_1001).unwrap();
        assert_eq!(decoder.quantity_type(), QuantityType::Electrical);
        assert_eq!(decoder.channel_name().as_deref(), Some("kWh r"));
        assert_eq!(decoder.description(), "kWh Received");

        let decoder = QuantityDecoder::from_code(3 | (7 << 4)).unwrap();
        assert!(matches!(decoder, QuantityDecoder::Event(_)));
        assert!(decoder.electrical_fields().is_none());
        assert!(decoder.channel_name().is_none());
    }

    #[test]
    fn test_decoder_all_types() {
        // Minimal valid code for every type: harmonics needs a V/A unit.
        let codes = [0, 1, 2, 3, 4, 5 | (8 << 4), 6, 7, 8, 9, 10, 11, 12];
        for (expected, code) in codes.iter().enumerate() {
            let decoder = QuantityDecoder::from_code(*code).unwrap();
            assert_eq!(decoder.quantity_type().to_u8() as usize, expected);
            assert_eq!(decoder.code().value(), *code);
        }
    }

    #[test]
    fn test_decoder_reserved_type() {
        for code in [13u32, 14, 15] {
            assert_eq!(
                QuantityDecoder::from_code(code),
                Err(MeterError::UnknownQuantityType(code as u8))
            );
        }
    }
}
