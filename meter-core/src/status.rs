//! Interval status flag sets
//!
//! A status is a string of independent single-character flags. The order
//! of first appearance is kept, every flag appears at most once, and
//! merging two sets never drops a flag.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Flag marking a filtered value; ignored by the "filtered" status queries
pub const FLAG_FILTERED: char = 'D';

/// Flag marking a short (partial) interval produced by interval combination
pub const FLAG_SHORT: char = 'S';

/// Set of single-character status flags
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusSet(String);

impl StatusSet {
    /// Create an empty status set
    pub fn new() -> Self {
        Self(String::new())
    }

    /// Build a status set from a flag string, dropping repeated flags
    pub fn from_flags(flags: &str) -> Self {
        let mut set = Self::new();
        for flag in flags.chars() {
            set.insert(flag);
        }
        set
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` when no flag is set
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, flag: char) -> bool {
        self.0.contains(flag)
    }

    /// Add a flag if it is not already present
    pub fn insert(&mut self, flag: char) {
        if !self.contains(flag) {
            self.0.push(flag);
        }
    }

    /// Union of two status sets
    ///
    /// Keeps the order of `self` and appends flags from `other` that are
    /// not yet present.
    pub fn concatenate(&self, other: &StatusSet) -> StatusSet {
        let mut merged = self.clone();
        for flag in other.0.chars() {
            merged.insert(flag);
        }
        merged
    }

    /// Merge `other` into `self` in place
    pub fn merge(&mut self, other: &StatusSet) {
        for flag in other.0.chars() {
            self.insert(flag);
        }
    }

    /// Status set without the filtered (`D`) flag
    pub fn filtered(&self) -> StatusSet {
        StatusSet(self.0.chars().filter(|c| *c != FLAG_FILTERED).collect())
    }

    /// `true` when any flag is set
    pub fn has_status(&self) -> bool {
        !self.is_empty()
    }

    /// `true` when any flag other than `D` is set
    pub fn has_filtered_status(&self) -> bool {
        self.0.chars().any(|c| c != FLAG_FILTERED)
    }
}

impl From<&str> for StatusSet {
    fn from(flags: &str) -> Self {
        Self::from_flags(flags)
    }
}

impl From<String> for StatusSet {
    fn from(flags: String) -> Self {
        Self::from_flags(&flags)
    }
}

impl fmt::Display for StatusSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_flags_dedup() {
        let set = StatusSet::from_flags("AABA");
        assert_eq!(set.as_str(), "AB");
    }

    #[test]
    fn test_status_concatenate() {
        let a = StatusSet::from("SA");
        let b = StatusSet::from("ADX");
        let merged = a.concatenate(&b);
        assert_eq!(merged.as_str(), "SADX");
        // Operands are untouched
        assert_eq!(a.as_str(), "SA");
        assert_eq!(b.as_str(), "ADX");
    }

    #[test]
    fn test_status_concatenate_empty() {
        let a = StatusSet::new();
        let b = StatusSet::from("D");
        assert_eq!(a.concatenate(&b).as_str(), "D");
        assert_eq!(b.concatenate(&a).as_str(), "D");
    }

    #[test]
    fn test_status_filtered_only_d() {
        let set = StatusSet::from("D");
        assert!(set.has_status());
        assert!(!set.has_filtered_status());
        assert!(set.filtered().is_empty());
    }

    #[test]
    fn test_status_filtered_ds() {
        let set = StatusSet::from("DS");
        assert!(set.has_status());
        assert!(set.has_filtered_status());
        assert_eq!(set.filtered().as_str(), "S");
    }
}
