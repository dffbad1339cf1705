//! Totalized quantity (type 7): sum of the same quantity across several meters

use crate::Quantity;
use crate::code::{BitField, QuantityCode, QuantityType};
use crate::fields::ElectricalFields;
use meter_core::MeterResult;
use serde::{Deserialize, Serialize};

/// Bits 24-27: totalizer number
pub const TOTALIZER_FIELD: BitField = BitField::new(24, 4);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalizedQuantity {
    code: QuantityCode,
    fields: ElectricalFields,
    totalizer: u8,
}

impl TotalizedQuantity {
    pub fn from_code(code: QuantityCode) -> MeterResult<Self> {
        let code = code.expect_type(QuantityType::Totalized)?;
        Ok(Self {
            code,
            fields: ElectricalFields::decode(code)?,
            totalizer: code.field(TOTALIZER_FIELD) as u8,
        })
    }

    pub fn new(fields: ElectricalFields, totalizer: u8) -> MeterResult<Self> {
        let code = fields
            .encode(QuantityCode::with_type(QuantityType::Totalized))?
            .with_field(TOTALIZER_FIELD, totalizer as u32, "totalizer")?;
        Ok(Self {
            code,
            fields,
            totalizer,
        })
    }

    pub fn fields(&self) -> &ElectricalFields {
        &self.fields
    }

    pub fn totalizer(&self) -> u8 {
        self.totalizer
    }

    pub fn channel_name(&self) -> String {
        format!("{} (Totalizer {})", self.fields.channel_name(), self.totalizer + 1)
    }
}

impl Quantity for TotalizedQuantity {
    fn code(&self) -> QuantityCode {
        self.code
    }

    fn quantity_type(&self) -> QuantityType {
        QuantityType::Totalized
    }

    fn description(&self) -> String {
        format!("Totalizer {}: {}", self.totalizer + 1, self.fields.description())
    }
}
