//! Sub-fields shared by every quantity type that measures an electrical value
//!
//! # Layout
//!
//! | bits  | field       |
//! |-------|-------------|
//! | 4-9   | unit        |
//! | 10-11 | measurement |
//! | 12-14 | direction   |
//! | 15-17 | phase       |
//! | 18-19 | scale       |
//! | 20-23 | TOU rate    |

use crate::code::{BitField, QuantityCode};
use meter_core::{DisplayScale, MeterError, MeterResult};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const UNIT_FIELD: BitField = BitField::new(4, 6);
pub const MEASUREMENT_FIELD: BitField = BitField::new(10, 2);
pub const DIRECTION_FIELD: BitField = BitField::new(12, 3);
pub const PHASE_FIELD: BitField = BitField::new(15, 3);
pub const SCALE_FIELD: BitField = BitField::new(18, 2);
pub const RATE_FIELD: BitField = BitField::new(20, 4);

fn invalid(kind: &'static str, value: u32) -> MeterError {
    MeterError::InvalidEnumValue { kind, value }
}

/// Physical unit of an electrical quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElectricalUnit {
    WattHour = 0,
    VarHour = 1,
    VoltAmpereHour = 2,
    QHour = 3,
    Watt = 4,
    Var = 5,
    VoltAmpere = 6,
    Q = 7,
    Volt = 8,
    Ampere = 9,
    VoltSquaredHour = 10,
    AmpereSquaredHour = 11,
    PowerFactor = 12,
    Hertz = 13,
}

impl ElectricalUnit {
    pub fn from_u32(value: u32) -> MeterResult<Self> {
        match value {
            0 => Ok(Self::WattHour),
            1 => Ok(Self::VarHour),
            2 => Ok(Self::VoltAmpereHour),
            3 => Ok(Self::QHour),
            4 => Ok(Self::Watt),
            5 => Ok(Self::Var),
            6 => Ok(Self::VoltAmpere),
            7 => Ok(Self::Q),
            8 => Ok(Self::Volt),
            9 => Ok(Self::Ampere),
            10 => Ok(Self::VoltSquaredHour),
            11 => Ok(Self::AmpereSquaredHour),
            12 => Ok(Self::PowerFactor),
            13 => Ok(Self::Hertz),
            _ => Err(invalid("electrical unit", value)),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::WattHour => "Wh",
            Self::VarHour => "varh",
            Self::VoltAmpereHour => "VAh",
            Self::QHour => "Qh",
            Self::Watt => "W",
            Self::Var => "var",
            Self::VoltAmpere => "VA",
            Self::Q => "Q",
            Self::Volt => "V",
            Self::Ampere => "A",
            Self::VoltSquaredHour => "V²h",
            Self::AmpereSquaredHour => "A²h",
            Self::PowerFactor => "PF",
            Self::Hertz => "Hz",
        }
    }

    /// `true` for energy units accumulated over time
    pub fn is_energy(self) -> bool {
        matches!(
            self,
            Self::WattHour
                | Self::VarHour
                | Self::VoltAmpereHour
                | Self::QHour
                | Self::VoltSquaredHour
                | Self::AmpereSquaredHour
        )
    }

    /// Demand counterpart of an energy unit (`Wh` to `W`)
    pub fn demand_unit(self) -> Self {
        match self {
            Self::WattHour => Self::Watt,
            Self::VarHour => Self::Var,
            Self::VoltAmpereHour => Self::VoltAmpere,
            Self::QHour => Self::Q,
            other => other,
        }
    }

    /// `true` if the unit takes a `k`/`M` scale prefix
    pub fn is_scalable(self) -> bool {
        !matches!(self, Self::PowerFactor)
    }
}

/// How the value is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeasurementType {
    Energy = 0,
    MaxDemand = 1,
    CumulativeDemand = 2,
    Instantaneous = 3,
}

impl MeasurementType {
    pub fn from_u32(value: u32) -> MeterResult<Self> {
        match value {
            0 => Ok(Self::Energy),
            1 => Ok(Self::MaxDemand),
            2 => Ok(Self::CumulativeDemand),
            3 => Ok(Self::Instantaneous),
            _ => Err(invalid("measurement type", value)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Energy => "Energy",
            Self::MaxDemand => "Max Demand",
            Self::CumulativeDemand => "Cumulative Demand",
            Self::Instantaneous => "Instantaneous",
        }
    }
}

/// Energy flow direction or quadrant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Delivered = 0,
    Received = 1,
    Net = 2,
    Total = 3,
    Quadrant1 = 4,
    Quadrant2 = 5,
    Quadrant3 = 6,
    Quadrant4 = 7,
}

impl Direction {
    pub fn from_u32(value: u32) -> MeterResult<Self> {
        match value {
            0 => Ok(Self::Delivered),
            1 => Ok(Self::Received),
            2 => Ok(Self::Net),
            3 => Ok(Self::Total),
            4 => Ok(Self::Quadrant1),
            5 => Ok(Self::Quadrant2),
            6 => Ok(Self::Quadrant3),
            7 => Ok(Self::Quadrant4),
            _ => Err(invalid("direction", value)),
        }
    }

    /// Short suffix used in channel names (`d`, `r`, `Q1`, ...)
    pub fn abbreviation(self) -> &'static str {
        match self {
            Self::Delivered => "d",
            Self::Received => "r",
            Self::Net => "net",
            Self::Total => "total",
            Self::Quadrant1 => "Q1",
            Self::Quadrant2 => "Q2",
            Self::Quadrant3 => "Q3",
            Self::Quadrant4 => "Q4",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Delivered => "Delivered",
            Self::Received => "Received",
            Self::Net => "Net",
            Self::Total => "Total",
            Self::Quadrant1 => "Quadrant 1",
            Self::Quadrant2 => "Quadrant 2",
            Self::Quadrant3 => "Quadrant 3",
            Self::Quadrant4 => "Quadrant 4",
        }
    }
}

/// Phase or phase pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Aggregate = 0,
    A = 1,
    B = 2,
    C = 3,
    Neutral = 4,
    Ab = 5,
    Bc = 6,
    Ca = 7,
}

impl Phase {
    pub fn from_u32(value: u32) -> MeterResult<Self> {
        match value {
            0 => Ok(Self::Aggregate),
            1 => Ok(Self::A),
            2 => Ok(Self::B),
            3 => Ok(Self::C),
            4 => Ok(Self::Neutral),
            5 => Ok(Self::Ab),
            6 => Ok(Self::Bc),
            7 => Ok(Self::Ca),
            _ => Err(invalid("phase", value)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Aggregate => "Aggregate",
            Self::A => "Phase A",
            Self::B => "Phase B",
            Self::C => "Phase C",
            Self::Neutral => "Neutral",
            Self::Ab => "Phase AB",
            Self::Bc => "Phase BC",
            Self::Ca => "Phase CA",
        }
    }
}

/// Time-of-use rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TouRate {
    Total = 0,
    A = 1,
    B = 2,
    C = 3,
    D = 4,
    E = 5,
    F = 6,
    G = 7,
}

impl TouRate {
    pub fn from_u32(value: u32) -> MeterResult<Self> {
        match value {
            0 => Ok(Self::Total),
            1 => Ok(Self::A),
            2 => Ok(Self::B),
            3 => Ok(Self::C),
            4 => Ok(Self::D),
            5 => Ok(Self::E),
            6 => Ok(Self::F),
            7 => Ok(Self::G),
            _ => Err(invalid("TOU rate", value)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Total => "Total",
            Self::A => "Rate A",
            Self::B => "Rate B",
            Self::C => "Rate C",
            Self::D => "Rate D",
            Self::E => "Rate E",
            Self::F => "Rate F",
            Self::G => "Rate G",
        }
    }
}

pub(crate) fn decode_scale(code: QuantityCode, field: BitField) -> MeterResult<DisplayScale> {
    let value = code.field(field);
    DisplayScale::from_u8(value as u8).map_err(|_| invalid("scale", value))
}

/// Decoded shared electrical sub-fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectricalFields {
    pub unit: ElectricalUnit,
    pub measurement: MeasurementType,
    pub direction: Direction,
    pub phase: Phase,
    pub scale: DisplayScale,
    pub rate: TouRate,
}

impl ElectricalFields {
    /// Fields for a delivered, aggregate-phase, total-rate energy value in units
    pub fn new(unit: ElectricalUnit) -> Self {
        Self {
            unit,
            measurement: MeasurementType::Energy,
            direction: Direction::Delivered,
            phase: Phase::Aggregate,
            scale: DisplayScale::Units,
            rate: TouRate::Total,
        }
    }

    /// Decode the shared sub-fields of `code`
    ///
    /// # Errors
    /// Returns `InvalidEnumValue` if any sub-field holds a reserved value.
    pub fn decode(code: QuantityCode) -> MeterResult<Self> {
        Ok(Self {
            unit: ElectricalUnit::from_u32(code.field(UNIT_FIELD))?,
            measurement: MeasurementType::from_u32(code.field(MEASUREMENT_FIELD))?,
            direction: Direction::from_u32(code.field(DIRECTION_FIELD))?,
            phase: Phase::from_u32(code.field(PHASE_FIELD))?,
            scale: decode_scale(code, SCALE_FIELD)?,
            rate: TouRate::from_u32(code.field(RATE_FIELD))?,
        })
    }

    /// Write the shared sub-fields into `code`
    pub fn encode(&self, code: QuantityCode) -> MeterResult<QuantityCode> {
        code.with_field(UNIT_FIELD, self.unit as u32, "unit")?
            .with_field(MEASUREMENT_FIELD, self.measurement as u32, "measurement")?
            .with_field(DIRECTION_FIELD, self.direction as u32, "direction")?
            .with_field(PHASE_FIELD, self.phase as u32, "phase")?
            .with_field(SCALE_FIELD, self.scale.to_u8() as u32, "scale")?
            .with_field(RATE_FIELD, self.rate as u32, "rate")
    }

    /// Channel label matching the quantity-name tables (`kWh d`, `var r`, `PF`)
    pub fn channel_name(&self) -> String {
        if self.unit == ElectricalUnit::PowerFactor {
            return "PF".to_string();
        }
        let prefix = self.scale.prefix().map(String::from).unwrap_or_default();
        match self.unit {
            ElectricalUnit::Volt
            | ElectricalUnit::Ampere
            | ElectricalUnit::VoltSquaredHour
            | ElectricalUnit::AmpereSquaredHour
            | ElectricalUnit::Hertz => format!("{}{}", prefix, self.unit.symbol()),
            _ => format!(
                "{}{} {}",
                prefix,
                self.unit.symbol(),
                self.direction.abbreviation()
            ),
        }
    }

    /// Full description, e.g. `kWh Delivered, Phase A, Rate B, Max Demand`
    pub fn description(&self) -> String {
        let mut text = format!(
            "{}{}",
            if self.unit.is_scalable() {
                self.scale.prefix().map(String::from).unwrap_or_default()
            } else {
                String::new()
            },
            self.unit.symbol()
        );
        text.push(' ');
        text.push_str(self.direction.name());
        if self.phase != Phase::Aggregate {
            text.push_str(", ");
            text.push_str(self.phase.name());
        }
        if self.rate != TouRate::Total {
            text.push_str(", ");
            text.push_str(self.rate.name());
        }
        if self.measurement != MeasurementType::Energy {
            text.push_str(", ");
            text.push_str(self.measurement.name());
        }
        text
    }
}

impl fmt::Display for ElectricalFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}
