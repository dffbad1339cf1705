//! User-defined (type 0) and non-register (type 2) quantities
//!
//! Neither type carries a measurement layout. A user-defined code is an
//! opaque value assigned by the meter program; a non-register code names a
//! configuration parameter (meter id, program id, battery time, ...).

use crate::Quantity;
use crate::code::{BitField, QuantityCode, QuantityType};
use meter_core::MeterResult;
use serde::{Deserialize, Serialize};

/// Bits 4-31: opaque user value
pub const USER_VALUE_FIELD: BitField = BitField::new(4, 28);
/// Bits 4-19: parameter id
pub const PARAMETER_FIELD: BitField = BitField::new(4, 16);
/// Bits 20-23: display format selector
pub const FORMAT_FIELD: BitField = BitField::new(20, 4);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDefinedQuantity {
    code: QuantityCode,
}

impl UserDefinedQuantity {
    pub fn from_code(code: QuantityCode) -> MeterResult<Self> {
        Ok(Self {
            code: code.expect_type(QuantityType::UserDefined)?,
        })
    }

    pub fn user_value(&self) -> u32 {
        self.code.field(USER_VALUE_FIELD)
    }
}

impl Quantity for UserDefinedQuantity {
    fn code(&self) -> QuantityCode {
        self.code
    }

    fn quantity_type(&self) -> QuantityType {
        QuantityType::UserDefined
    }

    fn description(&self) -> String {
        format!("User Defined 0x{:07X}", self.user_value())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonRegisterQuantity {
    code: QuantityCode,
}

impl NonRegisterQuantity {
    pub fn from_code(code: QuantityCode) -> MeterResult<Self> {
        Ok(Self {
            code: code.expect_type(QuantityType::NonRegister)?,
        })
    }

    pub fn parameter_id(&self) -> u16 {
        self.code.field(PARAMETER_FIELD) as u16
    }

    pub fn format(&self) -> u8 {
        self.code.field(FORMAT_FIELD) as u8
    }
}

impl Quantity for NonRegisterQuantity {
    fn code(&self) -> QuantityCode {
        self.code
    }

    fn quantity_type(&self) -> QuantityType {
        QuantityType::NonRegister
    }

    fn description(&self) -> String {
        format!("Parameter {} (Format {})", self.parameter_id(), self.format())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_defined() {
        let quantity = UserDefinedQuantity::from_code(QuantityCode::new(0xFFFF_FFF0)).unwrap();
        assert_eq!(quantity.user_value(), 0x0FFF_FFFF);
    }

    #[test]
    fn test_non_register() {
        let code = QuantityCode::new(2 | (0x1234 << 4) | (3 << 20));
        let quantity = NonRegisterQuantity::from_code(code).unwrap();
        assert_eq!(quantity.parameter_id(), 0x1234);
        assert_eq!(quantity.format(), 3);
        assert_eq!(quantity.description(), "Parameter 4660 (Format 3)");
    }
}
