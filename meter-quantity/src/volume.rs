//! Volume quantity (type 10) for gas and water pulse inputs

use crate::Quantity;
use crate::code::{BitField, QuantityCode, QuantityType};
use crate::fields::decode_scale;
use meter_core::{DisplayScale, MeterError, MeterResult};
use serde::{Deserialize, Serialize};

pub const VOLUME_UNIT_FIELD: BitField = BitField::new(4, 4);
pub const VOLUME_MEASURE_FIELD: BitField = BitField::new(8, 2);
pub const VOLUME_SCALE_FIELD: BitField = BitField::new(18, 2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VolumeUnit {
    CubicFeet = 0,
    CubicMeters = 1,
    UsGallons = 2,
    Liters = 3,
    HundredCubicFeet = 4,
}

impl VolumeUnit {
    pub fn from_u32(value: u32) -> MeterResult<Self> {
        match value {
            0 => Ok(Self::CubicFeet),
            1 => Ok(Self::CubicMeters),
            2 => Ok(Self::UsGallons),
            3 => Ok(Self::Liters),
            4 => Ok(Self::HundredCubicFeet),
            _ => Err(MeterError::InvalidEnumValue { kind: "volume unit", value }),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::CubicFeet => "ft³",
            Self::CubicMeters => "m³",
            Self::UsGallons => "gal",
            Self::Liters => "L",
            Self::HundredCubicFeet => "CCF",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VolumeMeasure {
    Total = 0,
    FlowRate = 1,
}

impl VolumeMeasure {
    pub fn from_u32(value: u32) -> MeterResult<Self> {
        match value {
            0 => Ok(Self::Total),
            1 => Ok(Self::FlowRate),
            _ => Err(MeterError::InvalidEnumValue { kind: "volume measure", value }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeQuantity {
    code: QuantityCode,
    unit: VolumeUnit,
    measure: VolumeMeasure,
    scale: DisplayScale,
}

impl VolumeQuantity {
    pub fn from_code(code: QuantityCode) -> MeterResult<Self> {
        let code = code.expect_type(QuantityType::Volume)?;
        Ok(Self {
            code,
            unit: VolumeUnit::from_u32(code.field(VOLUME_UNIT_FIELD))?,
            measure: VolumeMeasure::from_u32(code.field(VOLUME_MEASURE_FIELD))?,
            scale: decode_scale(code, VOLUME_SCALE_FIELD)?,
        })
    }

    pub fn unit(&self) -> VolumeUnit {
        self.unit
    }

    pub fn measure(&self) -> VolumeMeasure {
        self.measure
    }

    pub fn scale(&self) -> DisplayScale {
        self.scale
    }
}

impl Quantity for VolumeQuantity {
    fn code(&self) -> QuantityCode {
        self.code
    }

    fn quantity_type(&self) -> QuantityType {
        QuantityType::Volume
    }

    fn description(&self) -> String {
        let prefix = self.scale.prefix().map(String::from).unwrap_or_default();
        match self.measure {
            VolumeMeasure::Total => format!("{}{}", prefix, self.unit.symbol()),
            VolumeMeasure::FlowRate => format!("{}{}/h", prefix, self.unit.symbol()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_decode() {
        let raw = 10 | (1 << 4) | (1 << 8) | (1 << 18);
        let quantity = VolumeQuantity::from_code(QuantityCode::new(raw)).unwrap();
        assert_eq!(quantity.unit(), VolumeUnit::CubicMeters);
        assert_eq!(quantity.measure(), VolumeMeasure::FlowRate);
        assert_eq!(quantity.description(), "km³/h");
    }
}
