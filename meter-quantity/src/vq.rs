//! Voltage quality quantity (type 8)

use crate::Quantity;
use crate::code::{BitField, QuantityCode, QuantityType};
use crate::fields::Phase;
use meter_core::{MeterError, MeterResult};
use serde::{Deserialize, Serialize};

pub const VQ_EVENT_FIELD: BitField = BitField::new(4, 4);
pub const VQ_PHASE_FIELD: BitField = BitField::new(8, 3);
pub const VQ_MEASURE_FIELD: BitField = BitField::new(11, 2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VqEvent {
    Sag = 0,
    Swell = 1,
    Interruption = 2,
    Imbalance = 3,
    HarmonicDistortion = 4,
}

impl VqEvent {
    pub fn from_u32(value: u32) -> MeterResult<Self> {
        match value {
            0 => Ok(Self::Sag),
            1 => Ok(Self::Swell),
            2 => Ok(Self::Interruption),
            3 => Ok(Self::Imbalance),
            4 => Ok(Self::HarmonicDistortion),
            _ => Err(MeterError::InvalidEnumValue { kind: "VQ event", value }),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Sag => "Sag",
            Self::Swell => "Swell",
            Self::Interruption => "Interruption",
            Self::Imbalance => "Imbalance",
            Self::HarmonicDistortion => "Harmonic Distortion",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VqMeasure {
    Count = 0,
    Duration = 1,
    Magnitude = 2,
}

impl VqMeasure {
    pub fn from_u32(value: u32) -> MeterResult<Self> {
        match value {
            0 => Ok(Self::Count),
            1 => Ok(Self::Duration),
            2 => Ok(Self::Magnitude),
            _ => Err(MeterError::InvalidEnumValue { kind: "VQ measure", value }),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Count => "Count",
            Self::Duration => "Duration",
            Self::Magnitude => "Magnitude",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VqQuantity {
    code: QuantityCode,
    event: VqEvent,
    phase: Phase,
    measure: VqMeasure,
}

impl VqQuantity {
    pub fn from_code(code: QuantityCode) -> MeterResult<Self> {
        let code = code.expect_type(QuantityType::Vq)?;
        Ok(Self {
            code,
            event: VqEvent::from_u32(code.field(VQ_EVENT_FIELD))?,
            phase: Phase::from_u32(code.field(VQ_PHASE_FIELD))?,
            measure: VqMeasure::from_u32(code.field(VQ_MEASURE_FIELD))?,
        })
    }

    pub fn event(&self) -> VqEvent {
        self.event
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn measure(&self) -> VqMeasure {
        self.measure
    }
}

impl Quantity for VqQuantity {
    fn code(&self) -> QuantityCode {
        self.code
    }

    fn quantity_type(&self) -> QuantityType {
        QuantityType::Vq
    }

    fn description(&self) -> String {
        format!(
            "Voltage {} {}, {}",
            self.event.name(),
            self.measure.name(),
            self.phase.name()
        )
    }
}
