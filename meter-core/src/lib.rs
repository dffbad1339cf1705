//! Core types and utilities for electricity-meter telemetry
//!
//! This crate provides the error type, display scale, interval status
//! flag sets and quantity-name tables shared by the quantity decoder,
//! the load profile engine and the device configuration objects.

pub mod error;
pub mod quantity_names;
pub mod scale;
pub mod status;

pub use error::{MeterError, MeterResult};
pub use scale::DisplayScale;
pub use status::StatusSet;
