//! Quantity-code decoders
//!
//! A quantity code is a 32-bit value identifying what a meter register or
//! load profile channel measures. The low nibble selects the quantity
//! type, the remaining bits are type-specific sub-fields (unit,
//! measurement, direction, phase, scale, TOU rate, ...).
//!
//! # Usage
//!
//! ```rust,no_run
//! use meter_quantity::{QuantityDecoder, Quantity};
//!
//! let decoder = QuantityDecoder::from_code(0x0004_1001)?;
//! println!("{}", decoder.description());
//! # Ok::<(), meter_core::MeterError>(())
//! ```

pub mod code;
pub mod coincident;
pub mod decoder;
pub mod electrical;
pub mod event;
pub mod extrema;
pub mod fields;
pub mod harmonics;
pub mod io;
pub mod register;
pub mod totalized;
pub mod volume;
pub mod vq;

pub use code::{BitField, QuantityCode, QuantityType};
pub use coincident::{CoincidentQuantity, ExtendedCoincidentQuantity};
pub use decoder::QuantityDecoder;
pub use electrical::ElectricalQuantity;
pub use event::{EventMeasure, EventQuantity};
pub use extrema::{ExtremaQuantity, RatesExtremaQuantity};
pub use fields::{Direction, ElectricalFields, ElectricalUnit, MeasurementType, Phase, TouRate};
pub use harmonics::HarmonicsQuantity;
pub use io::{IoDirection, IoKind, IoQuantity};
pub use register::{NonRegisterQuantity, UserDefinedQuantity};
pub use totalized::TotalizedQuantity;
pub use volume::{VolumeMeasure, VolumeQuantity, VolumeUnit};
pub use vq::{VqEvent, VqMeasure, VqQuantity};

/// Common behaviour of every typed quantity decoder
pub trait Quantity {
    /// The raw 32-bit code
    fn code(&self) -> QuantityCode;

    /// Quantity type selected by the low nibble
    fn quantity_type(&self) -> QuantityType;

    /// Human-readable label
    fn description(&self) -> String;
}
