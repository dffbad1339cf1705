//! Extrema quantities (types 9 and 11)
//!
//! Minimum or maximum of an electrical value over the billing period.
//! Rates extrema are tracked per TOU rate; plain extrema always carry
//! the total rate.

use crate::Quantity;
use crate::code::{BitField, QuantityCode, QuantityType};
use crate::fields::{ElectricalFields, TouRate};
use meter_core::{MeterError, MeterResult};
use serde::{Deserialize, Serialize};

/// Bit 24: 1 selects the minimum, 0 the maximum
pub const MINIMUM_FIELD: BitField = BitField::new(24, 1);

fn extremum_name(minimum: bool) -> &'static str {
    if minimum { "Minimum" } else { "Maximum" }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtremaQuantity {
    code: QuantityCode,
    fields: ElectricalFields,
    minimum: bool,
}

impl ExtremaQuantity {
    pub fn from_code(code: QuantityCode) -> MeterResult<Self> {
        let code = code.expect_type(QuantityType::Extrema)?;
        Ok(Self {
            code,
            fields: ElectricalFields::decode(code)?,
            minimum: code.field(MINIMUM_FIELD) == 1,
        })
    }

    pub fn new(fields: ElectricalFields, minimum: bool) -> MeterResult<Self> {
        if fields.rate != TouRate::Total {
            return Err(MeterError::InvalidArgument(
                "Extrema quantities carry the total rate; use rates extrema".to_string(),
            ));
        }
        let code = fields
            .encode(QuantityCode::with_type(QuantityType::Extrema))?
            .with_field(MINIMUM_FIELD, minimum as u32, "minimum")?;
        Ok(Self {
            code,
            fields,
            minimum,
        })
    }

    pub fn fields(&self) -> &ElectricalFields {
        &self.fields
    }

    pub fn is_minimum(&self) -> bool {
        self.minimum
    }
}

impl Quantity for ExtremaQuantity {
    fn code(&self) -> QuantityCode {
        self.code
    }

    fn quantity_type(&self) -> QuantityType {
        QuantityType::Extrema
    }

    fn description(&self) -> String {
        format!("{} {}", extremum_name(self.minimum), self.fields.description())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatesExtremaQuantity {
    code: QuantityCode,
    fields: ElectricalFields,
    minimum: bool,
}

impl RatesExtremaQuantity {
    pub fn from_code(code: QuantityCode) -> MeterResult<Self> {
        let code = code.expect_type(QuantityType::RatesExtrema)?;
        Ok(Self {
            code,
            fields: ElectricalFields::decode(code)?,
            minimum: code.field(MINIMUM_FIELD) == 1,
        })
    }

    pub fn new(fields: ElectricalFields, minimum: bool) -> MeterResult<Self> {
        let code = fields
            .encode(QuantityCode::with_type(QuantityType::RatesExtrema))?
            .with_field(MINIMUM_FIELD, minimum as u32, "minimum")?;
        Ok(Self {
            code,
            fields,
            minimum,
        })
    }

    pub fn fields(&self) -> &ElectricalFields {
        &self.fields
    }

    pub fn rate(&self) -> TouRate {
        self.fields.rate
    }

    pub fn is_minimum(&self) -> bool {
        self.minimum
    }
}

impl Quantity for RatesExtremaQuantity {
    fn code(&self) -> QuantityCode {
        self.code
    }

    fn quantity_type(&self) -> QuantityType {
        QuantityType::RatesExtrema
    }

    fn description(&self) -> String {
        format!("{} {}", extremum_name(self.minimum), self.fields.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{ElectricalUnit, Phase};

    #[test]
    fn test_extrema_decode() {
        // V(8), phase C(3), minimum
        let raw = 9 | (8 << 4) | (3 << 15) | (1 << 24);
        let quantity = ExtremaQuantity::from_code(QuantityCode::new(raw)).unwrap();
        assert!(quantity.is_minimum());
        assert_eq!(quantity.fields().phase, Phase::C);
        assert_eq!(quantity.description(), "Minimum V Delivered, Phase C");
    }

    #[test]
    fn test_extrema_rejects_rate() {
        let mut fields = ElectricalFields::new(ElectricalUnit::Watt);
        fields.rate = TouRate::A;
        assert!(ExtremaQuantity::new(fields, false).is_err());
        let rates = RatesExtremaQuantity::new(fields, false).unwrap();
        assert_eq!(rates.rate(), TouRate::A);
        assert_eq!(rates.code().type_id(), 11);
    }
}
