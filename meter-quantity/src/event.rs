//! Event quantity (type 3)

use crate::Quantity;
use crate::code::{BitField, QuantityCode, QuantityType};
use meter_core::{MeterError, MeterResult};
use serde::{Deserialize, Serialize};

/// Bits 4-15: event id
pub const EVENT_ID_FIELD: BitField = BitField::new(4, 12);
/// Bits 16-17: what is recorded about the event
pub const EVENT_MEASURE_FIELD: BitField = BitField::new(16, 2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventMeasure {
    Count = 0,
    CumulativeDuration = 1,
    LastTimestamp = 2,
}

impl EventMeasure {
    pub fn from_u32(value: u32) -> MeterResult<Self> {
        match value {
            0 => Ok(Self::Count),
            1 => Ok(Self::CumulativeDuration),
            2 => Ok(Self::LastTimestamp),
            _ => Err(MeterError::InvalidEnumValue {
                kind: "event measure",
                value,
            }),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Count => "Count",
            Self::CumulativeDuration => "Cumulative Duration",
            Self::LastTimestamp => "Last Occurrence",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventQuantity {
    code: QuantityCode,
    event_id: u16,
    measure: EventMeasure,
}

impl EventQuantity {
    pub fn from_code(code: QuantityCode) -> MeterResult<Self> {
        let code = code.expect_type(QuantityType::Event)?;
        Ok(Self {
            code,
            event_id: code.field(EVENT_ID_FIELD) as u16,
            measure: EventMeasure::from_u32(code.field(EVENT_MEASURE_FIELD))?,
        })
    }

    pub fn new(event_id: u16, measure: EventMeasure) -> MeterResult<Self> {
        let code = QuantityCode::with_type(QuantityType::Event)
            .with_field(EVENT_ID_FIELD, event_id as u32, "event id")?
            .with_field(EVENT_MEASURE_FIELD, measure as u32, "event measure")?;
        Ok(Self {
            code,
            event_id,
            measure,
        })
    }

    pub fn event_id(&self) -> u16 {
        self.event_id
    }

    pub fn measure(&self) -> EventMeasure {
        self.measure
    }
}

impl Quantity for EventQuantity {
    fn code(&self) -> QuantityCode {
        self.code
    }

    fn quantity_type(&self) -> QuantityType {
        QuantityType::Event
    }

    fn description(&self) -> String {
        format!("Event {} {}", self.event_id, self.measure.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_round_trip() {
        let quantity = EventQuantity::new(0x123, EventMeasure::CumulativeDuration).unwrap();
        assert_eq!(quantity.code().value(), 3 | (0x123 << 4) | (1 << 16));
        let decoded = EventQuantity::from_code(quantity.code()).unwrap();
        assert_eq!(decoded.event_id(), 0x123);
        assert_eq!(decoded.description(), "Event 291 Cumulative Duration");
    }

    #[test]
    fn test_event_id_overflow() {
        assert!(EventQuantity::new(0x1000, EventMeasure::Count).is_err());
    }

    #[test]
    fn test_event_reserved_measure() {
        assert!(EventQuantity::from_code(QuantityCode::new(3 | (3 << 16))).is_err());
    }
}
