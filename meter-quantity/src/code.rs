//! Raw quantity codes and bit-field extraction

use meter_core::{MeterError, MeterResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A contiguous run of bits inside a 32-bit quantity code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    /// Position of the least significant bit
    pub shift: u32,
    /// Number of bits
    pub width: u32,
}

impl BitField {
    pub const fn new(shift: u32, width: u32) -> Self {
        Self { shift, width }
    }

    /// Mask of the field in its unshifted position
    pub const fn mask(&self) -> u32 {
        if self.width >= 32 {
            u32::MAX
        } else {
            (1u32 << self.width) - 1
        }
    }

    /// Largest value the field can hold
    pub const fn max_value(&self) -> u32 {
        self.mask()
    }

    /// Extract the field from `code`
    pub const fn extract(&self, code: u32) -> u32 {
        (code >> self.shift) & self.mask()
    }

    /// Return `code` with the field replaced by `value`
    ///
    /// # Errors
    /// Returns `FieldOverflow` if `value` does not fit in the field.
    pub fn insert(&self, code: u32, value: u32, name: &'static str) -> MeterResult<u32> {
        if value > self.max_value() {
            return Err(MeterError::FieldOverflow {
                field: name,
                value: value as u64,
                max: self.max_value() as u64,
            });
        }
        Ok((code & !(self.mask() << self.shift)) | (value << self.shift))
    }
}

/// Bits 0-3: quantity type discriminant
pub const TYPE_FIELD: BitField = BitField::new(0, 4);

/// Quantity type selected by the low nibble of a quantity code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuantityType {
    UserDefined = 0,
    Electrical = 1,
    NonRegister = 2,
    Event = 3,
    Coincident = 4,
    Harmonics = 5,
    Io = 6,
    Totalized = 7,
    Vq = 8,
    Extrema = 9,
    Volume = 10,
    RatesExtrema = 11,
    ExtendedCoincident = 12,
}

impl QuantityType {
    pub fn from_u8(value: u8) -> MeterResult<Self> {
        match value {
            0 => Ok(QuantityType::UserDefined),
            1 => Ok(QuantityType::Electrical),
            2 => Ok(QuantityType::NonRegister),
            3 => Ok(QuantityType::Event),
            4 => Ok(QuantityType::Coincident),
            5 => Ok(QuantityType::Harmonics),
            6 => Ok(QuantityType::Io),
            7 => Ok(QuantityType::Totalized),
            8 => Ok(QuantityType::Vq),
            9 => Ok(QuantityType::Extrema),
            10 => Ok(QuantityType::Volume),
            11 => Ok(QuantityType::RatesExtrema),
            12 => Ok(QuantityType::ExtendedCoincident),
            _ => Err(MeterError::UnknownQuantityType(value)),
        }
    }

    pub fn to_u8(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            QuantityType::UserDefined => "User Defined",
            QuantityType::Electrical => "Electrical",
            QuantityType::NonRegister => "Non-Register",
            QuantityType::Event => "Event",
            QuantityType::Coincident => "Coincident",
            QuantityType::Harmonics => "Harmonics",
            QuantityType::Io => "IO",
            QuantityType::Totalized => "Totalized",
            QuantityType::Vq => "Voltage Quality",
            QuantityType::Extrema => "Extrema",
            QuantityType::Volume => "Volume",
            QuantityType::RatesExtrema => "Rates Extrema",
            QuantityType::ExtendedCoincident => "Extended Coincident",
        }
    }
}

/// Raw 32-bit quantity code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuantityCode(u32);

impl QuantityCode {
    pub fn new(code: u32) -> Self {
        Self(code)
    }

    /// Build a code carrying only the type discriminant
    pub fn with_type(quantity_type: QuantityType) -> Self {
        Self(quantity_type.to_u8() as u32)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    /// Raw type discriminant (low nibble)
    pub fn type_id(&self) -> u8 {
        TYPE_FIELD.extract(self.0) as u8
    }

    /// Decode the quantity type
    ///
    /// # Errors
    /// Returns `UnknownQuantityType` for the reserved discriminants 13-15.
    pub fn quantity_type(&self) -> MeterResult<QuantityType> {
        QuantityType::from_u8(self.type_id())
    }

    /// Extract a sub-field
    pub fn field(&self, field: BitField) -> u32 {
        field.extract(self.0)
    }

    /// Return a copy with a sub-field replaced
    pub fn with_field(self, field: BitField, value: u32, name: &'static str) -> MeterResult<Self> {
        Ok(Self(field.insert(self.0, value, name)?))
    }

    /// Check that the code carries the expected type discriminant
    pub(crate) fn expect_type(self, expected: QuantityType) -> MeterResult<Self> {
        let actual = self.quantity_type()?;
        if actual != expected {
            return Err(MeterError::InvalidArgument(format!(
                "Quantity code {} is {}, expected {}",
                self,
                actual.name(),
                expected.name()
            )));
        }
        Ok(self)
    }
}

impl From<u32> for QuantityCode {
    fn from(code: u32) -> Self {
        Self(code)
    }
}

impl fmt::Display for QuantityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_field_extract() {
        let field = BitField::new(4, 6);
        assert_eq!(field.mask(), 0x3F);
        assert_eq!(field.extract(0x0000_03F0), 0x3F);
        assert_eq!(field.extract(0x0000_0010), 1);
    }

    #[test]
    fn test_bit_field_insert() {
        let field = BitField::new(12, 3);
        let code = field.insert(0xFFFF_FFFF, 0, "direction").unwrap();
        assert_eq!(code, 0xFFFF_8FFF);
        assert!(field.insert(0, 8, "direction").is_err());
    }

    #[test]
    fn test_quantity_type_dispatch() {
        assert_eq!(
            QuantityCode::new(0x0000_0001).quantity_type().unwrap(),
            QuantityType::Electrical
        );
        assert_eq!(
            QuantityCode::new(0xABCD_123C).quantity_type().unwrap(),
            QuantityType::ExtendedCoincident
        );
        assert_eq!(
            QuantityCode::new(0x0000_000D).quantity_type(),
            Err(MeterError::UnknownQuantityType(13))
        );
    }

    #[test]
    fn test_quantity_code_display() {
        assert_eq!(format!("{}", QuantityCode::new(0x41)), "0x00000041");
    }
}
