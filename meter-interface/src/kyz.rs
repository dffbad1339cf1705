//! KYZ pulse-output configuration
//!
//! A KYZ output is driven either by an energy quantity, emitting one
//! pulse (or one contact toggle) per unit of energy, or by a meter event,
//! emitting a pulse (or a state change) when the event occurs. A zero
//! pulse width selects the toggle/state-change form.
//!
//! Outputs are described as `"<quantity> (<output type>)"`, e.g.
//! `"Wh d (Pulse)"` or `"End of Interval (State Change)"`, and an output
//! with no source is `"Not Used"`.

use meter_core::{MeterError, MeterResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Energy quantities a KYZ output can follow, indexed by energy id
pub const ENERGY_QUANTITIES: [&str; 25] = [
    "Wh d",
    "Wh r",
    "Wh net",
    "Wh total",
    "varh d",
    "varh r",
    "varh net",
    "varh total",
    "varh Q1",
    "varh Q2",
    "varh Q3",
    "varh Q4",
    "VARh d",
    "VARh r",
    "VARh net",
    "VARh total",
    "VAh d",
    "VAh r",
    "VAh net",
    "VAh total",
    "Qh d",
    "Qh r",
    "Qh net",
    "Qh total",
    "VAh (Calculated)",
];

/// First event id
pub const EVENT_ID_BASE: u8 = 0x80;

/// Events a KYZ output can follow, indexed by `event id - EVENT_ID_BASE`
pub const EVENTS: [&str; 4] = [
    "End of Interval",
    "Demand Threshold",
    "Load Control",
    "Power Outage",
];

/// Description of an output with no source
pub const NOT_USED: &str = "Not Used";

/// Display name of an energy id
pub fn energy_name(id: u8) -> MeterResult<&'static str> {
    ENERGY_QUANTITIES
        .get(id as usize)
        .copied()
        .ok_or(MeterError::InvalidEnumValue {
            kind: "KYZ energy id",
            value: id as u32,
        })
}

/// Display name of an event id
pub fn event_name(id: u8) -> MeterResult<&'static str> {
    id.checked_sub(EVENT_ID_BASE)
        .and_then(|offset| EVENTS.get(offset as usize))
        .copied()
        .ok_or(MeterError::InvalidEnumValue {
            kind: "KYZ event id",
            value: id as u32,
        })
}

/// Output signalling form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum KyzOutputType {
    /// Fixed-width pulse
    Pulse = 0,
    /// Contact toggles on every unit of energy
    Toggle = 1,
    /// Contact follows the event state
    StateChange = 2,
}

impl KyzOutputType {
    pub fn from_u8(value: u8) -> MeterResult<Self> {
        match value {
            0 => Ok(Self::Pulse),
            1 => Ok(Self::Toggle),
            2 => Ok(Self::StateChange),
            _ => Err(MeterError::InvalidEnumValue {
                kind: "KYZ output type",
                value: value as u32,
            }),
        }
    }

    pub fn to_u8(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pulse => "Pulse",
            Self::Toggle => "Toggle",
            Self::StateChange => "State Change",
        }
    }

    fn from_text(text: &str) -> Option<Self> {
        [Self::Pulse, Self::Toggle, Self::StateChange]
            .into_iter()
            .find(|t| t.as_str() == text)
    }
}

impl fmt::Display for KyzOutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Text of a raw output type value
///
/// # Errors
/// Returns `InvalidEnumValue` for values outside the output type range.
pub fn output_type_text(value: u8) -> MeterResult<&'static str> {
    KyzOutputType::from_u8(value).map(KyzOutputType::as_str)
}

/// Kind of source driving an output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KyzSource {
    Energy,
    Event,
}

/// Output type implied by a pulse width
///
/// A zero width selects `Toggle` for energy sources and `StateChange`
/// for event sources; any other width selects `Pulse`. Without a source
/// the current type is kept.
pub fn adjust_output_type(
    current: KyzOutputType,
    pulse_width: u16,
    source: Option<KyzSource>,
) -> KyzOutputType {
    match (source, pulse_width) {
        (None, _) => current,
        (Some(_), width) if width != 0 => KyzOutputType::Pulse,
        (Some(KyzSource::Energy), _) => KyzOutputType::Toggle,
        (Some(KyzSource::Event), _) => KyzOutputType::StateChange,
    }
}

/// Configuration of one KYZ output
///
/// At most one of the energy and event ids is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KyzOutput {
    energy_id: Option<u8>,
    event_id: Option<u8>,
    output_type: KyzOutputType,
    /// Pulse width in milliseconds
    pulse_width: u16,
}

impl KyzOutput {
    /// Output with no source
    pub fn unused() -> Self {
        Self {
            energy_id: None,
            event_id: None,
            output_type: KyzOutputType::Pulse,
            pulse_width: 0,
        }
    }

    /// Output following an energy quantity
    ///
    /// # Errors
    /// Returns `InvalidEnumValue` for an unknown energy id.
    pub fn energy(id: u8, pulse_width: u16) -> MeterResult<Self> {
        energy_name(id)?;
        Ok(Self {
            energy_id: Some(id),
            event_id: None,
            output_type: adjust_output_type(
                KyzOutputType::Pulse,
                pulse_width,
                Some(KyzSource::Energy),
            ),
            pulse_width,
        })
    }

    /// Output following a meter event
    ///
    /// # Errors
    /// Returns `InvalidEnumValue` for an unknown event id.
    pub fn event(id: u8, pulse_width: u16) -> MeterResult<Self> {
        event_name(id)?;
        Ok(Self {
            energy_id: None,
            event_id: Some(id),
            output_type: adjust_output_type(
                KyzOutputType::Pulse,
                pulse_width,
                Some(KyzSource::Event),
            ),
            pulse_width,
        })
    }

    pub fn energy_id(&self) -> Option<u8> {
        self.energy_id
    }

    pub fn event_id(&self) -> Option<u8> {
        self.event_id
    }

    pub fn output_type(&self) -> KyzOutputType {
        self.output_type
    }

    pub fn pulse_width(&self) -> u16 {
        self.pulse_width
    }

    pub fn source(&self) -> Option<KyzSource> {
        match (self.energy_id, self.event_id) {
            (Some(_), _) => Some(KyzSource::Energy),
            (None, Some(_)) => Some(KyzSource::Event),
            (None, None) => None,
        }
    }

    pub fn is_used(&self) -> bool {
        self.source().is_some()
    }

    /// Change the pulse width, adjusting the output type to match
    pub fn set_pulse_width(&mut self, pulse_width: u16) {
        self.pulse_width = pulse_width;
        let adjusted = adjust_output_type(self.output_type, pulse_width, self.source());
        if adjusted != self.output_type {
            log::debug!(
                "KYZ output '{}' switches to {} for pulse width {}",
                self.description(),
                adjusted,
                pulse_width
            );
        }
        self.output_type = adjusted;
    }

    /// Name of the source quantity or event
    fn source_name(&self) -> MeterResult<Option<&'static str>> {
        match (self.energy_id, self.event_id) {
            (Some(id), _) => energy_name(id).map(Some),
            (None, Some(id)) => event_name(id).map(Some),
            (None, None) => Ok(None),
        }
    }

    /// `"<quantity> (<output type>)"`, or `"Not Used"`
    pub fn description(&self) -> String {
        match self.source_name() {
            Ok(Some(name)) => format!("{} ({})", name, self.output_type),
            _ => NOT_USED.to_string(),
        }
    }

    /// Parse a description produced by [`KyzOutput::description`]
    ///
    /// # Errors
    /// Returns `InvalidArgument` when the text names no known quantity,
    /// event or output type.
    pub fn from_description(text: &str, pulse_width: u16) -> MeterResult<Self> {
        let text = text.trim();
        if text == NOT_USED {
            return Ok(Self {
                pulse_width,
                ..Self::unused()
            });
        }
        let invalid = || MeterError::InvalidArgument(format!("Unknown KYZ output '{}'", text));
        let (name, output) = text
            .strip_suffix(')')
            .and_then(|rest| rest.rsplit_once(" ("))
            .ok_or_else(invalid)?;
        let output_type = KyzOutputType::from_text(output).ok_or_else(invalid)?;

        let mut parsed = if let Some(id) = ENERGY_QUANTITIES.iter().position(|q| *q == name) {
            Self::energy(id as u8, pulse_width)?
        } else if let Some(offset) = EVENTS.iter().position(|e| *e == name) {
            Self::event(EVENT_ID_BASE + offset as u8, pulse_width)?
        } else {
            return Err(invalid());
        };
        parsed.output_type = output_type;
        Ok(parsed)
    }

    /// Packed configuration byte: output type in the high nibble, source
    /// kind (0 none, 1 energy, 2 event) in the low nibble
    pub fn config_byte(&self) -> u8 {
        let source = match self.source() {
            None => 0,
            Some(KyzSource::Energy) => 1,
            Some(KyzSource::Event) => 2,
        };
        (self.output_type.to_u8() << 4) | source
    }

    /// Rebuild an output from its configuration byte and source id
    ///
    /// # Errors
    /// Returns `InvalidEnumValue` for an unknown output type, source kind
    /// or id.
    pub fn from_config_byte(byte: u8, id: u8, pulse_width: u16) -> MeterResult<Self> {
        let output_type = KyzOutputType::from_u8(byte >> 4)?;
        let mut output = match byte & 0x0F {
            0 => Self {
                pulse_width,
                ..Self::unused()
            },
            1 => Self::energy(id, pulse_width)?,
            2 => Self::event(id, pulse_width)?,
            kind => {
                return Err(MeterError::InvalidEnumValue {
                    kind: "KYZ source kind",
                    value: kind as u32,
                });
            }
        };
        output.output_type = output_type;
        Ok(output)
    }
}

impl Default for KyzOutput {
    fn default() -> Self {
        Self::unused()
    }
}

impl fmt::Display for KyzOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_tables() {
        assert_eq!(energy_name(0x00).unwrap(), "Wh d");
        assert_eq!(energy_name(0x18).unwrap(), "VAh (Calculated)");
        assert!(energy_name(0x19).is_err());
        assert_eq!(event_name(0x80).unwrap(), "End of Interval");
        assert_eq!(event_name(0x83).unwrap(), "Power Outage");
        assert!(event_name(0x84).is_err());
        assert!(event_name(0x00).is_err());
    }

    #[test]
    fn test_output_type_text() {
        assert_eq!(output_type_text(0).unwrap(), "Pulse");
        assert_eq!(output_type_text(2).unwrap(), "State Change");
        assert!(matches!(
            output_type_text(3),
            Err(MeterError::InvalidEnumValue { value: 3, .. })
        ));
    }

    #[test]
    fn test_adjust_output_type() {
        let energy = Some(KyzSource::Energy);
        let event = Some(KyzSource::Event);
        assert_eq!(adjust_output_type(KyzOutputType::Pulse, 0, energy), KyzOutputType::Toggle);
        assert_eq!(adjust_output_type(KyzOutputType::Toggle, 50, energy), KyzOutputType::Pulse);
        assert_eq!(adjust_output_type(KyzOutputType::Pulse, 0, event), KyzOutputType::StateChange);
        assert_eq!(adjust_output_type(KyzOutputType::StateChange, 10, event), KyzOutputType::Pulse);
        assert_eq!(adjust_output_type(KyzOutputType::Toggle, 10, None), KyzOutputType::Toggle);
    }

    #[test]
    fn test_description() {
        assert_eq!(KyzOutput::energy(0x01, 50).unwrap().description(), "Wh r (Pulse)");
        assert_eq!(KyzOutput::energy(0x01, 0).unwrap().description(), "Wh r (Toggle)");
        assert_eq!(
            KyzOutput::event(0x80, 0).unwrap().description(),
            "End of Interval (State Change)"
        );
        assert_eq!(KyzOutput::unused().description(), "Not Used");
    }

    #[test]
    fn test_description_round_trip() {
        let outputs = [
            KyzOutput::energy(0x18, 0).unwrap(),
            KyzOutput::event(0x82, 25).unwrap(),
            KyzOutput::unused(),
        ];
        for output in outputs {
            let parsed =
                KyzOutput::from_description(&output.description(), output.pulse_width()).unwrap();
            assert_eq!(parsed, output);
        }
        assert!(KyzOutput::from_description("Wh d (Blink)", 0).is_err());
        assert!(KyzOutput::from_description("Furlongs (Pulse)", 0).is_err());
        assert!(KyzOutput::from_description("Wh d", 0).is_err());
    }

    #[test]
    fn test_set_pulse_width() {
        let mut output = KyzOutput::event(0x81, 100).unwrap();
        assert_eq!(output.output_type(), KyzOutputType::Pulse);
        output.set_pulse_width(0);
        assert_eq!(output.output_type(), KyzOutputType::StateChange);

        let mut unused = KyzOutput::unused();
        unused.set_pulse_width(0);
        assert_eq!(unused.output_type(), KyzOutputType::Pulse);
    }

    #[test]
    fn test_config_byte() {
        let output = KyzOutput::energy(0x04, 0).unwrap();
        assert_eq!(output.config_byte(), 0x11);
        assert_eq!(KyzOutput::from_config_byte(0x11, 0x04, 0).unwrap(), output);

        let event = KyzOutput::event(0x83, 30).unwrap();
        assert_eq!(event.config_byte(), 0x02);
        assert_eq!(KyzOutput::from_config_byte(0x02, 0x83, 30).unwrap(), event);

        assert_eq!(KyzOutput::unused().config_byte(), 0x00);
        assert!(KyzOutput::from_config_byte(0x03, 0, 0).is_err());
        assert!(KyzOutput::from_config_byte(0x31, 0, 0).is_err());
        assert!(KyzOutput::from_config_byte(0x01, 0x40, 0).is_err());
    }
}
