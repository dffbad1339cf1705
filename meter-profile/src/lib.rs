//! Load profile interval data
//!
//! This crate models multi-channel interval data read from a meter's load
//! profile: the intervals themselves, the channels describing each
//! column, calculated var/VA/PF channels and the operations that turn one
//! load profile into another.
//!
//! # Operations
//!
//! - Pulse to energy and energy to demand conversion
//! - Interval combination into a coarser duration
//! - Rolling demand over a trailing window
//! - Range extraction by timestamp
//! - Display scale changes (units, kilo, mega)
//!
//! Every operation that changes the representation, the duration or the
//! interval set returns a new [`LoadProfileData`] and leaves its input
//! untouched.
//!
//! # Usage
//!
//! ```rust,no_run
//! use chrono::NaiveDate;
//! use meter_core::{DisplayScale, StatusSet};
//! use meter_profile::{ChannelSpec, LoadProfileBuilder, ProfileKind};
//!
//! let mut profile = LoadProfileBuilder::new(ProfileKind::Energy)
//!     .channel(ChannelSpec::named("Wh d"))
//!     .build()?;
//! let end = NaiveDate::from_ymd_opt(2024, 6, 15)
//!     .and_then(|d| d.and_hms_opt(0, 15, 0))
//!     .unwrap_or_default();
//! profile.add_interval(
//!     vec![120.0],
//!     vec![StatusSet::new()],
//!     StatusSet::new(),
//!     end,
//!     DisplayScale::Units,
//! )?;
//! let demand = profile.to_demand()?;
//! # Ok::<(), meter_core::MeterError>(())
//! ```

pub mod builder;
pub mod channel;
pub mod conversion;
pub mod derived;
pub mod interval;
pub mod load_profile;
pub mod recombine;

pub use builder::{ChannelLabel, ChannelSpec, LoadProfileBuilder};
pub use channel::{Channel, ChannelKind, ChannelSeries};
pub use derived::{DerivedKind, DerivedSources, DerivedState, SecondInput};
pub use interval::Interval;
pub use load_profile::{LoadProfileData, ProfileKind};
