//! Electricity-meter telemetry data model
//!
//! # Architecture
//!
//! This library is organized as a workspace with multiple crates:
//!
//! - `meter-core`: Error type, display scale, status flags, quantity names
//! - `meter-quantity`: 32-bit quantity-code decoders
//! - `meter-profile`: Load profile intervals, channels and derived channels
//! - `meter-interface`: KYZ pulse outputs and Smart Energy price payloads
//!
//! # Usage
//!
//! ```no_run
//! use meter::profile::{ChannelSpec, LoadProfileBuilder, ProfileKind};
//!
//! let profile = LoadProfileBuilder::new(ProfileKind::Pulse)
//!     .interval_duration(5)
//!     .channel(ChannelSpec::named("Wh d").with_pulse_weight(0.25))
//!     .build()?;
//! # Ok::<(), meter::MeterError>(())
//! ```

// Re-export core types
pub use meter_core::{DisplayScale, MeterError, MeterResult, StatusSet};
pub use meter_core::quantity_names;

// Re-export quantity decoders
pub mod quantity {
    pub use meter_quantity::*;
}

// Re-export load profile API
pub mod profile {
    pub use meter_profile::*;
}

// Re-export device configuration objects
pub mod interface {
    pub use meter_interface::*;
}
