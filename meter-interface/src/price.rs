//! Smart Energy price cluster payloads
//!
//! Field layouts of the Publish Price and Publish Block Thresholds
//! commands. Several fields pack two 4-bit values into one byte; the
//! accessors below split and combine them.

use meter_core::{MeterError, MeterResult};
use serde::{Deserialize, Serialize};

/// Largest value of a 4-bit field
pub const NIBBLE_MAX: u8 = 0x0F;

/// Largest rate label length in bytes
pub const RATE_LABEL_MAX_LEN: usize = 12;

fn high_nibble(byte: u8) -> u8 {
    byte >> 4
}

fn low_nibble(byte: u8) -> u8 {
    byte & NIBBLE_MAX
}

fn check_nibble(field: &'static str, value: u8) -> MeterResult<u8> {
    if value > NIBBLE_MAX {
        return Err(MeterError::FieldOverflow {
            field,
            value: value as u64,
            max: NIBBLE_MAX as u64,
        });
    }
    Ok(value)
}

fn with_high_nibble(byte: u8, field: &'static str, value: u8) -> MeterResult<u8> {
    Ok((check_nibble(field, value)? << 4) | low_nibble(byte))
}

fn with_low_nibble(byte: u8, field: &'static str, value: u8) -> MeterResult<u8> {
    Ok((byte & 0xF0) | check_nibble(field, value)?)
}

/// Apply a trailing-digit count as a decimal exponent
fn scaled(value: u32, trailing_digit: u8) -> f64 {
    value as f64 / 10f64.powi(trailing_digit as i32)
}

/// Publish Price command payload
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PublishPrice {
    pub provider_id: u32,
    rate_label: String,
    pub issuer_event_id: u32,
    /// UTC seconds
    pub current_time: u32,
    pub unit_of_measure: u8,
    /// ISO 4217 numeric currency code
    pub currency: u16,
    /// Trailing digit (high nibble), price tier (low nibble)
    trailing_digit_and_price_tier: u8,
    /// Number of price tiers (high nibble), register tier (low nibble)
    price_tiers_and_register_tier: u8,
    /// UTC seconds; zero means now
    pub start_time: u32,
    /// Minutes
    pub duration: u16,
    pub price: u32,
    pub price_ratio: u8,
    pub generation_price: u32,
    pub generation_price_ratio: u8,
    pub alternate_cost_delivered: u32,
    pub alternate_cost_unit: u8,
    /// Trailing digit in the high nibble
    alternate_cost_trailing_digit: u8,
    pub number_of_block_thresholds: u8,
    pub price_control: u8,
}

impl PublishPrice {
    pub fn new(provider_id: u32, issuer_event_id: u32) -> Self {
        Self {
            provider_id,
            issuer_event_id,
            ..Self::default()
        }
    }

    pub fn rate_label(&self) -> &str {
        &self.rate_label
    }

    /// # Errors
    /// Returns `FieldOverflow` for labels longer than 12 bytes.
    pub fn set_rate_label(&mut self, label: impl Into<String>) -> MeterResult<()> {
        let label = label.into();
        if label.len() > RATE_LABEL_MAX_LEN {
            return Err(MeterError::FieldOverflow {
                field: "rate label",
                value: label.len() as u64,
                max: RATE_LABEL_MAX_LEN as u64,
            });
        }
        self.rate_label = label;
        Ok(())
    }

    /// Number of digits right of the decimal point in `price`
    pub fn price_trailing_digit(&self) -> u8 {
        high_nibble(self.trailing_digit_and_price_tier)
    }

    pub fn set_price_trailing_digit(&mut self, digits: u8) -> MeterResult<()> {
        self.trailing_digit_and_price_tier =
            with_high_nibble(self.trailing_digit_and_price_tier, "price trailing digit", digits)?;
        Ok(())
    }

    pub fn price_tier(&self) -> u8 {
        low_nibble(self.trailing_digit_and_price_tier)
    }

    pub fn set_price_tier(&mut self, tier: u8) -> MeterResult<()> {
        self.trailing_digit_and_price_tier =
            with_low_nibble(self.trailing_digit_and_price_tier, "price tier", tier)?;
        Ok(())
    }

    pub fn number_of_price_tiers(&self) -> u8 {
        high_nibble(self.price_tiers_and_register_tier)
    }

    pub fn set_number_of_price_tiers(&mut self, tiers: u8) -> MeterResult<()> {
        self.price_tiers_and_register_tier =
            with_high_nibble(self.price_tiers_and_register_tier, "number of price tiers", tiers)?;
        Ok(())
    }

    pub fn register_tier(&self) -> u8 {
        low_nibble(self.price_tiers_and_register_tier)
    }

    pub fn set_register_tier(&mut self, tier: u8) -> MeterResult<()> {
        self.price_tiers_and_register_tier =
            with_low_nibble(self.price_tiers_and_register_tier, "register tier", tier)?;
        Ok(())
    }

    pub fn alternate_cost_trailing_digit(&self) -> u8 {
        high_nibble(self.alternate_cost_trailing_digit)
    }

    pub fn set_alternate_cost_trailing_digit(&mut self, digits: u8) -> MeterResult<()> {
        self.alternate_cost_trailing_digit = with_high_nibble(
            self.alternate_cost_trailing_digit,
            "alternate cost trailing digit",
            digits,
        )?;
        Ok(())
    }

    /// Raw packed trailing digit / price tier byte
    pub fn trailing_digit_and_price_tier(&self) -> u8 {
        self.trailing_digit_and_price_tier
    }

    /// Raw packed number of price tiers / register tier byte
    pub fn price_tiers_and_register_tier(&self) -> u8 {
        self.price_tiers_and_register_tier
    }

    /// Price in currency units per unit of measure
    pub fn price_value(&self) -> f64 {
        scaled(self.price, self.price_trailing_digit())
    }

    pub fn alternate_cost_value(&self) -> f64 {
        scaled(self.alternate_cost_delivered, self.alternate_cost_trailing_digit())
    }
}

/// Publish Block Thresholds command payload
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockThresholds {
    pub provider_id: u32,
    pub issuer_event_id: u32,
    /// UTC seconds
    pub start_time: u32,
    pub issuer_tariff_id: u32,
    /// Tier (high nibble), number of thresholds (low nibble)
    tier_and_threshold_count: u8,
    thresholds: Vec<u64>,
}

impl BlockThresholds {
    /// Most thresholds one tier can carry
    pub const MAX_THRESHOLDS: usize = 15;

    /// Thresholds are 48-bit unsigned values
    pub const MAX_THRESHOLD: u64 = (1 << 48) - 1;

    pub fn new(provider_id: u32, issuer_event_id: u32, issuer_tariff_id: u32) -> Self {
        Self {
            provider_id,
            issuer_event_id,
            issuer_tariff_id,
            ..Self::default()
        }
    }

    pub fn tier(&self) -> u8 {
        high_nibble(self.tier_and_threshold_count)
    }

    pub fn set_tier(&mut self, tier: u8) -> MeterResult<()> {
        self.tier_and_threshold_count =
            with_high_nibble(self.tier_and_threshold_count, "block tier", tier)?;
        Ok(())
    }

    pub fn threshold_count(&self) -> u8 {
        low_nibble(self.tier_and_threshold_count)
    }

    pub fn tier_and_threshold_count(&self) -> u8 {
        self.tier_and_threshold_count
    }

    pub fn thresholds(&self) -> &[u64] {
        &self.thresholds
    }

    /// Append a threshold
    ///
    /// # Errors
    /// Returns `FieldOverflow` for values above 48 bits or when 15
    /// thresholds are already present.
    pub fn add_threshold(&mut self, threshold: u64) -> MeterResult<()> {
        if threshold > Self::MAX_THRESHOLD {
            return Err(MeterError::FieldOverflow {
                field: "block threshold",
                value: threshold,
                max: Self::MAX_THRESHOLD,
            });
        }
        if self.thresholds.len() >= Self::MAX_THRESHOLDS {
            return Err(MeterError::FieldOverflow {
                field: "number of block thresholds",
                value: self.thresholds.len() as u64 + 1,
                max: Self::MAX_THRESHOLDS as u64,
            });
        }
        self.thresholds.push(threshold);
        self.tier_and_threshold_count = with_low_nibble(
            self.tier_and_threshold_count,
            "number of block thresholds",
            self.thresholds.len() as u8,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_nibbles() {
        let mut price = PublishPrice::new(7, 1001);
        price.set_price_trailing_digit(3).unwrap();
        price.set_price_tier(2).unwrap();
        price.set_number_of_price_tiers(6).unwrap();
        price.set_register_tier(5).unwrap();
        assert_eq!(price.trailing_digit_and_price_tier(), 0x32);
        assert_eq!(price.price_tiers_and_register_tier(), 0x65);
        assert_eq!(price.price_trailing_digit(), 3);
        assert_eq!(price.price_tier(), 2);
        assert_eq!(price.number_of_price_tiers(), 6);
        assert_eq!(price.register_tier(), 5);

        price.set_price_tier(0x0F).unwrap();
        assert_eq!(price.price_trailing_digit(), 3);
        assert!(matches!(
            price.set_price_tier(0x10),
            Err(MeterError::FieldOverflow { value: 16, max: 15, .. })
        ));
        assert_eq!(price.price_tier(), 0x0F);
    }

    #[test]
    fn test_price_value() {
        let mut price = PublishPrice::new(1, 1);
        price.price = 12345;
        price.set_price_trailing_digit(2).unwrap();
        assert!((price.price_value() - 123.45).abs() < 1e-9);

        price.alternate_cost_delivered = 500;
        price.set_alternate_cost_trailing_digit(1).unwrap();
        assert!((price.alternate_cost_value() - 50.0).abs() < 1e-9);
        assert!(price.set_alternate_cost_trailing_digit(16).is_err());
    }

    #[test]
    fn test_rate_label() {
        let mut price = PublishPrice::default();
        price.set_rate_label("Off Peak").unwrap();
        assert_eq!(price.rate_label(), "Off Peak");
        assert!(price.set_rate_label("Super Off Peak Weekend").is_err());
        assert_eq!(price.rate_label(), "Off Peak");
    }

    #[test]
    fn test_block_thresholds() {
        let mut blocks = BlockThresholds::new(7, 2002, 3);
        blocks.set_tier(4).unwrap();
        blocks.add_threshold(1000).unwrap();
        blocks.add_threshold(BlockThresholds::MAX_THRESHOLD).unwrap();
        assert_eq!(blocks.threshold_count(), 2);
        assert_eq!(blocks.tier(), 4);
        assert_eq!(blocks.tier_and_threshold_count(), 0x42);
        assert_eq!(blocks.thresholds(), &[1000, BlockThresholds::MAX_THRESHOLD]);
        assert!(blocks.add_threshold(1 << 48).is_err());
    }

    #[test]
    fn test_block_thresholds_limit() {
        let mut blocks = BlockThresholds::default();
        for i in 0..15 {
            blocks.add_threshold(i).unwrap();
        }
        assert_eq!(blocks.threshold_count(), 15);
        assert!(matches!(
            blocks.add_threshold(99),
            Err(MeterError::FieldOverflow { value: 16, .. })
        ));
    }
}
