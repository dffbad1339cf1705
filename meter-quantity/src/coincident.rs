//! Coincident quantities (types 4 and 12)
//!
//! A coincident value is captured at the moment another demand register
//! reaches its peak, e.g. the var demand coincident with the maximum W
//! demand. Both types reuse the shared electrical layout; they differ in
//! how wide the reference to the triggering demand is.

use crate::Quantity;
use crate::code::{BitField, QuantityCode, QuantityType};
use crate::fields::ElectricalFields;
use meter_core::MeterResult;
use serde::{Deserialize, Serialize};

/// Bits 24-27: index of the demand this value is coincident with
pub const COINCIDENT_INDEX_FIELD: BitField = BitField::new(24, 4);

/// Bits 24-31: extended coincident demand id
pub const EXTENDED_COINCIDENT_FIELD: BitField = BitField::new(24, 8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoincidentQuantity {
    code: QuantityCode,
    fields: ElectricalFields,
    demand_index: u8,
}

impl CoincidentQuantity {
    pub fn from_code(code: QuantityCode) -> MeterResult<Self> {
        let code = code.expect_type(QuantityType::Coincident)?;
        Ok(Self {
            code,
            fields: ElectricalFields::decode(code)?,
            demand_index: code.field(COINCIDENT_INDEX_FIELD) as u8,
        })
    }

    pub fn new(fields: ElectricalFields, demand_index: u8) -> MeterResult<Self> {
        let code = fields
            .encode(QuantityCode::with_type(QuantityType::Coincident))?
            .with_field(COINCIDENT_INDEX_FIELD, demand_index as u32, "coincident index")?;
        Ok(Self {
            code,
            fields,
            demand_index,
        })
    }

    pub fn fields(&self) -> &ElectricalFields {
        &self.fields
    }

    /// Index of the demand whose peak triggered the capture
    pub fn demand_index(&self) -> u8 {
        self.demand_index
    }
}

impl Quantity for CoincidentQuantity {
    fn code(&self) -> QuantityCode {
        self.code
    }

    fn quantity_type(&self) -> QuantityType {
        QuantityType::Coincident
    }

    fn description(&self) -> String {
        format!(
            "{} (Coincident with Demand {})",
            self.fields.description(),
            self.demand_index + 1
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedCoincidentQuantity {
    code: QuantityCode,
    fields: ElectricalFields,
    demand_id: u8,
}

impl ExtendedCoincidentQuantity {
    pub fn from_code(code: QuantityCode) -> MeterResult<Self> {
        let code = code.expect_type(QuantityType::ExtendedCoincident)?;
        Ok(Self {
            code,
            fields: ElectricalFields::decode(code)?,
            demand_id: code.field(EXTENDED_COINCIDENT_FIELD) as u8,
        })
    }

    pub fn new(fields: ElectricalFields, demand_id: u8) -> MeterResult<Self> {
        let code = fields
            .encode(QuantityCode::with_type(QuantityType::ExtendedCoincident))?
            .with_field(EXTENDED_COINCIDENT_FIELD, demand_id as u32, "coincident demand id")?;
        Ok(Self {
            code,
            fields,
            demand_id,
        })
    }

    pub fn fields(&self) -> &ElectricalFields {
        &self.fields
    }

    pub fn demand_id(&self) -> u8 {
        self.demand_id
    }
}

impl Quantity for ExtendedCoincidentQuantity {
    fn code(&self) -> QuantityCode {
        self.code
    }

    fn quantity_type(&self) -> QuantityType {
        QuantityType::ExtendedCoincident
    }

    fn description(&self) -> String {
        format!(
            "{} (Coincident with Demand ID {})",
            self.fields.description(),
            self.demand_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::ElectricalUnit;

    #[test]
    fn test_coincident_decode() {
        // var(5), aggregate, coincident with demand index 2
        let raw = 4 | (5 << 4) | (2 << 24);
        let quantity = CoincidentQuantity::from_code(QuantityCode::new(raw)).unwrap();
        assert_eq!(quantity.fields().unit, ElectricalUnit::Var);
        assert_eq!(quantity.demand_index(), 2);
        assert_eq!(quantity.description(), "var Delivered (Coincident with Demand 3)");
    }

    #[test]
    fn test_extended_coincident_new() {
        let fields = ElectricalFields::new(ElectricalUnit::Watt);
        let quantity = ExtendedCoincidentQuantity::new(fields, 200).unwrap();
        assert_eq!(quantity.code().value() >> 24, 200);
        let decoded = ExtendedCoincidentQuantity::from_code(quantity.code()).unwrap();
        assert_eq!(decoded.demand_id(), 200);
    }

    #[test]
    fn test_coincident_index_overflow() {
        let fields = ElectricalFields::new(ElectricalUnit::Watt);
        assert!(CoincidentQuantity::new(fields, 16).is_err());
    }
}
