//! Meter device configuration objects
//!
//! - [`kyz`]: KYZ pulse-output configuration (energy and event sources)
//! - [`price`]: Smart Energy price cluster payloads (Publish Price,
//!   Block Thresholds)

pub mod kyz;
pub mod price;

pub use kyz::{KyzOutput, KyzOutputType, KyzSource};
pub use price::{BlockThresholds, PublishPrice};
