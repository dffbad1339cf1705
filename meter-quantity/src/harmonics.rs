//! Harmonics quantity (type 5)
//!
//! # Layout
//! - bits 4-9: unit (volts or amps only)
//! - bits 10-15: harmonic order, 0 meaning total harmonic distortion
//! - bits 16-18: phase
//! - bits 19-20: scale

use crate::Quantity;
use crate::code::{BitField, QuantityCode, QuantityType};
use crate::fields::{ElectricalUnit, Phase, UNIT_FIELD, decode_scale};
use meter_core::{DisplayScale, MeterError, MeterResult};
use serde::{Deserialize, Serialize};

pub const ORDER_FIELD: BitField = BitField::new(10, 6);
pub const HARMONIC_PHASE_FIELD: BitField = BitField::new(16, 3);
pub const HARMONIC_SCALE_FIELD: BitField = BitField::new(19, 2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarmonicsQuantity {
    code: QuantityCode,
    unit: ElectricalUnit,
    order: u8,
    phase: Phase,
    scale: DisplayScale,
}

impl HarmonicsQuantity {
    pub fn from_code(code: QuantityCode) -> MeterResult<Self> {
        let code = code.expect_type(QuantityType::Harmonics)?;
        let unit = ElectricalUnit::from_u32(code.field(UNIT_FIELD))?;
        if !matches!(unit, ElectricalUnit::Volt | ElectricalUnit::Ampere) {
            return Err(MeterError::InvalidEnumValue {
                kind: "harmonic unit",
                value: unit as u32,
            });
        }
        Ok(Self {
            code,
            unit,
            order: code.field(ORDER_FIELD) as u8,
            phase: Phase::from_u32(code.field(HARMONIC_PHASE_FIELD))?,
            scale: decode_scale(code, HARMONIC_SCALE_FIELD)?,
        })
    }

    pub fn unit(&self) -> ElectricalUnit {
        self.unit
    }

    /// Harmonic order; 0 is total harmonic distortion
    pub fn order(&self) -> u8 {
        self.order
    }

    pub fn is_thd(&self) -> bool {
        self.order == 0
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn scale(&self) -> DisplayScale {
        self.scale
    }
}

impl Quantity for HarmonicsQuantity {
    fn code(&self) -> QuantityCode {
        self.code
    }

    fn quantity_type(&self) -> QuantityType {
        QuantityType::Harmonics
    }

    fn description(&self) -> String {
        let prefix = self.scale.prefix().map(String::from).unwrap_or_default();
        if self.is_thd() {
            format!("{}{} THD, {}", prefix, self.unit.symbol(), self.phase.name())
        } else {
            format!(
                "{}{} Harmonic {}, {}",
                prefix,
                self.unit.symbol(),
                self.order,
                self.phase.name()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harmonics_decode() {
        // A(9), order 5, phase B(2)
        let raw = 5 | (9 << 4) | (5 << 10) | (2 << 16);
        let quantity = HarmonicsQuantity::from_code(QuantityCode::new(raw)).unwrap();
        assert_eq!(quantity.unit(), ElectricalUnit::Ampere);
        assert_eq!(quantity.order(), 5);
        assert_eq!(quantity.description(), "A Harmonic 5, Phase B");
    }

    #[test]
    fn test_harmonics_thd() {
        let raw = 5 | (8 << 4) | (1 << 16);
        let quantity = HarmonicsQuantity::from_code(QuantityCode::new(raw)).unwrap();
        assert!(quantity.is_thd());
        assert_eq!(quantity.description(), "V THD, Phase A");
    }

    #[test]
    fn test_harmonics_rejects_energy_unit() {
        assert!(HarmonicsQuantity::from_code(QuantityCode::new(5)).is_err());
    }
}
