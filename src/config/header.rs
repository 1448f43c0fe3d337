//! Magic header override ranges

use super::ConfigError;
use crate::protocol::MAGIC_HEADER_RESERVED_MAX;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Range a message's magic header is drawn from.
///
/// `(0, 0)` keeps the protocol default. Any other pair is only valid when
/// `min > 4` and `max >= min`; see [`MagicHeader::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MagicHeader {
    min: u32,
    max: u32,
}

impl MagicHeader {
    /// Use the protocol's built-in header
    pub const DISABLED: Self = Self { min: 0, max: 0 };

    /// Create a range. No validation is done here.
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Degenerate range that always yields `value`
    pub const fn single(value: u32) -> Self {
        Self::new(value, value)
    }

    /// Lower bound
    pub const fn min(&self) -> u32 {
        self.min
    }

    /// Upper bound
    pub const fn max(&self) -> u32 {
        self.max
    }

    pub const fn is_disabled(&self) -> bool {
        self.min == 0 && self.max == 0
    }

    /// Whether this range overrides the default header.
    ///
    /// Only `min` is inspected, so an invalid pair such as `(10, 5)` still
    /// counts as active.
    pub const fn is_active(&self) -> bool {
        self.min > MAGIC_HEADER_RESERVED_MAX
    }

    pub const fn contains(&self, value: u32) -> bool {
        self.min <= value && value <= self.max
    }

    /// Whether two ranges share at least one value
    pub const fn overlaps(&self, other: &MagicHeader) -> bool {
        self.min <= other.max && other.min <= self.max
    }

    /// Check the range invariants. `name` only labels the error.
    pub fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if self.is_disabled() {
            return Ok(());
        }

        if self.min > 0 && self.min <= MAGIC_HEADER_RESERVED_MAX {
            return Err(ConfigError::ReservedMagicHeader {
                name: name.to_string(),
                min: self.min,
            });
        }

        if self.max < self.min {
            return Err(ConfigError::MagicHeaderOrder {
                name: name.to_string(),
                min: self.min,
                max: self.max,
            });
        }

        Ok(())
    }
}

/// Parses `"v"` as `(v, v)` and `"a-b"` as `(a, b)`
impl FromStr for MagicHeader {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('-') {
            Some((min, max)) => Ok(Self::new(min.trim().parse()?, max.trim().parse()?)),
            None => Ok(Self::single(s.parse()?)),
        }
    }
}

impl fmt::Display for MagicHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}-{}", self.min, self.max)
        }
    }
}
