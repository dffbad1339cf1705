//! Electrical quantity (type 1)

use crate::Quantity;
use crate::code::{QuantityCode, QuantityType};
use crate::fields::{Direction, ElectricalFields, ElectricalUnit, MeasurementType, Phase, TouRate};
use meter_core::{DisplayScale, MeterResult};
use serde::{Deserialize, Serialize};

/// Electrical quantity such as `kWh delivered` or `var Q1, Phase A`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectricalQuantity {
    code: QuantityCode,
    fields: ElectricalFields,
}

impl ElectricalQuantity {
    /// Decode an electrical quantity code
    ///
    /// # Errors
    /// Returns an error if the type nibble is not `Electrical` or a
    /// sub-field holds a reserved value.
    pub fn from_code(code: QuantityCode) -> MeterResult<Self> {
        let code = code.expect_type(QuantityType::Electrical)?;
        Ok(Self {
            code,
            fields: ElectricalFields::decode(code)?,
        })
    }

    /// Build the code for the given sub-fields
    pub fn from_fields(fields: ElectricalFields) -> MeterResult<Self> {
        let code = fields.encode(QuantityCode::with_type(QuantityType::Electrical))?;
        Ok(Self { code, fields })
    }

    pub fn to_code(&self) -> QuantityCode {
        self.code
    }

    pub fn fields(&self) -> &ElectricalFields {
        &self.fields
    }

    pub fn unit(&self) -> ElectricalUnit {
        self.fields.unit
    }

    pub fn measurement(&self) -> MeasurementType {
        self.fields.measurement
    }

    pub fn direction(&self) -> Direction {
        self.fields.direction
    }

    pub fn phase(&self) -> Phase {
        self.fields.phase
    }

    pub fn scale(&self) -> DisplayScale {
        self.fields.scale
    }

    pub fn rate(&self) -> TouRate {
        self.fields.rate
    }

    /// Channel label for a load profile channel carrying this quantity
    pub fn channel_name(&self) -> String {
        self.fields.channel_name()
    }
}

impl Quantity for ElectricalQuantity {
    fn code(&self) -> QuantityCode {
        self.code
    }

    fn quantity_type(&self) -> QuantityType {
        QuantityType::Electrical
    }

    fn description(&self) -> String {
        self.fields.description()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_electrical_from_code() {
        // Wh, energy, received, aggregate, kilo, total
        let quantity = ElectricalQuantity::from_code(QuantityCode::new(0x0004_1001)).unwrap();
        assert_eq!(quantity.unit(), ElectricalUnit::WattHour);
        assert_eq!(quantity.direction(), Direction::Received);
        assert_eq!(quantity.scale(), DisplayScale::Kilo);
        assert_eq!(quantity.channel_name(), "kWh r");
    }

    #[test]
    fn test_electrical_wrong_type() {
        assert!(ElectricalQuantity::from_code(QuantityCode::new(0x0000_0004)).is_err());
    }

    #[test]
    fn test_electrical_from_fields() {
        let mut fields = ElectricalFields::new(ElectricalUnit::VoltAmpereHour);
        fields.direction = Direction::Quadrant2;
        let quantity = ElectricalQuantity::from_fields(fields).unwrap();
        let decoded = ElectricalQuantity::from_code(quantity.to_code()).unwrap();
        assert_eq!(decoded.fields(), &fields);
        assert_eq!(decoded.description(), "VAh Quadrant 2");
    }
}
