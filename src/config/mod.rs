//! Obfuscation configuration
//!
//! [`AwgConfig`] is built once by the [`Parser`] and then only read. It holds
//! no interior mutability, so it can be shared between packet framing tasks
//! behind an `Arc` without locking.

mod header;
mod parser;

pub use header::MagicHeader;
pub use parser::{parse, Parser, ENABLED_KEY};

use crate::protocol::{
    MessageType, MAGIC_HEADER_RESERVED_MAX, MAX_JUNK_PACKET_COUNT, MAX_JUNK_SIZE,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid config line {line}: expected key=value")]
    Syntax { line: usize },

    #[error("invalid value for {key} on line {line}: {value:?}")]
    InvalidValue {
        line: usize,
        key: String,
        value: String,
    },

    #[error("{name}: Magic header must be > 4 or 0 (disabled) but got min={min}")]
    ReservedMagicHeader { name: String, min: u32 },

    #[error("{name}: max must be >= min (min={min}, max={max})")]
    MagicHeaderOrder { name: String, min: u32, max: u32 },

    #[error("{first} and {second}: magic header ranges overlap")]
    MagicHeaderOverlap {
        first: &'static str,
        second: &'static str,
    },

    #[error("jmax must be >= jmin (jmin={min}, jmax={max})")]
    JunkSizeOrder { min: u32, max: u32 },

    #[error("{key} must be <= {limit} but got {value}")]
    OutOfRange {
        key: &'static str,
        value: u32,
        limit: u32,
    },
}

/// Reject `value` when it exceeds `limit`
pub(crate) fn check_limit(key: &'static str, value: u32, limit: u32) -> Result<(), ConfigError> {
    if value > limit {
        return Err(ConfigError::OutOfRange { key, value, limit });
    }
    Ok(())
}

/// Junk packet and magic header settings.
///
/// All fields default to zero, which leaves the wire format untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwgConfig {
    /// Master switch
    pub enabled: bool,
    /// Junk packets sent before a handshake initiation (jc)
    pub junk_packet_count: u32,
    /// Minimum junk packet payload size (jmin)
    pub junk_packet_min_size: u32,
    /// Maximum junk packet payload size (jmax)
    pub junk_packet_max_size: u32,
    /// Junk bytes added to handshake initiations (s1)
    pub init_packet_junk_size: u32,
    /// Junk bytes added to handshake responses (s2)
    pub response_packet_junk_size: u32,
    /// Junk bytes added to cookie replies (s3)
    pub cookie_packet_junk_size: u32,
    /// Junk bytes added to transport messages (s4)
    pub transport_packet_junk_size: u32,
    /// Header override for handshake initiations (h1)
    pub init_packet_magic_header: MagicHeader,
    /// Header override for handshake responses (h2)
    pub response_packet_magic_header: MagicHeader,
    /// Header override for cookie replies (h3)
    pub cookie_packet_magic_header: MagicHeader,
    /// Header override for transport messages (h4)
    pub transport_packet_magic_header: MagicHeader,
}

impl AwgConfig {
    /// Empty, disabled config
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and parse a config file with the lenient parser
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(parse(&content)?)
    }

    /// Random enabled config within commonly recommended ranges.
    ///
    /// Headers are single values in `5..=i32::MAX`; drawing is repeated
    /// until they are distinct.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let headers = MAGIC_HEADER_RESERVED_MAX + 1..=i32::MAX as u32;
        loop {
            let config = Self {
                enabled: true,
                junk_packet_count: rng.gen_range(3..=10),
                junk_packet_min_size: 50,
                junk_packet_max_size: 1000,
                init_packet_junk_size: rng.gen_range(15..=150),
                response_packet_junk_size: rng.gen_range(15..=150),
                cookie_packet_junk_size: 0,
                transport_packet_junk_size: 0,
                init_packet_magic_header: MagicHeader::single(rng.gen_range(headers.clone())),
                response_packet_magic_header: MagicHeader::single(rng.gen_range(headers.clone())),
                cookie_packet_magic_header: MagicHeader::single(rng.gen_range(headers.clone())),
                transport_packet_magic_header: MagicHeader::single(rng.gen_range(headers.clone())),
            };
            if config.validate().is_ok() {
                return config;
            }
        }
    }

    /// Whether obfuscation changes anything on the wire.
    ///
    /// The master switch alone is not enough: at least one junk packet, one
    /// per-message junk size or one active header range must be set.
    pub fn is_enabled(&self) -> bool {
        if !self.enabled {
            return false;
        }

        let has_junk_packets = self.junk_packet_count > 0;
        let has_message_junk = MessageType::ALL.iter().any(|&kind| self.junk_size(kind) > 0);
        let has_magic_headers = MessageType::ALL
            .iter()
            .any(|&kind| self.magic_header(kind).is_active());

        has_junk_packets || has_message_junk || has_magic_headers
    }

    /// Junk bytes configured for a message kind
    pub fn junk_size(&self, kind: MessageType) -> u32 {
        match kind {
            MessageType::HandshakeInit => self.init_packet_junk_size,
            MessageType::HandshakeResponse => self.response_packet_junk_size,
            MessageType::CookieReply => self.cookie_packet_junk_size,
            MessageType::Transport => self.transport_packet_junk_size,
        }
    }

    /// Header range configured for a message kind
    pub fn magic_header(&self, kind: MessageType) -> MagicHeader {
        match kind {
            MessageType::HandshakeInit => self.init_packet_magic_header,
            MessageType::HandshakeResponse => self.response_packet_magic_header,
            MessageType::CookieReply => self.cookie_packet_magic_header,
            MessageType::Transport => self.transport_packet_magic_header,
        }
    }

    /// Validate every header range, the junk count and size limits, the junk
    /// size bounds, and that no two header ranges overlap.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for kind in MessageType::ALL {
            self.magic_header(kind).validate(kind.header_key())?;
        }

        check_limit("jc", self.junk_packet_count, MAX_JUNK_PACKET_COUNT)?;
        check_limit("jmin", self.junk_packet_min_size, MAX_JUNK_SIZE)?;
        check_limit("jmax", self.junk_packet_max_size, MAX_JUNK_SIZE)?;
        for kind in MessageType::ALL {
            check_limit(kind.junk_key(), self.junk_size(kind), MAX_JUNK_SIZE)?;
        }

        if self.junk_packet_count > 0 && self.junk_packet_min_size > self.junk_packet_max_size {
            return Err(ConfigError::JunkSizeOrder {
                min: self.junk_packet_min_size,
                max: self.junk_packet_max_size,
            });
        }

        // Receivers classify messages by header, so ranges must be disjoint
        for (i, &first) in MessageType::ALL.iter().enumerate() {
            let a = self.magic_header(first);
            if a.is_disabled() {
                continue;
            }
            for &second in &MessageType::ALL[i + 1..] {
                let b = self.magic_header(second);
                if !b.is_disabled() && a.overlaps(&b) {
                    return Err(ConfigError::MagicHeaderOverlap {
                        first: first.header_key(),
                        second: second.header_key(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Activation check for an optional config; `None` is never enabled.
pub fn obfuscation_enabled(config: Option<&AwgConfig>) -> bool {
    config.is_some_and(AwgConfig::is_enabled)
}

impl FromStr for AwgConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Renders the `key=value` text format accepted by a strict [`Parser`].
/// A config with the flag off renders as `enabled=false` only, since the
/// parser discards everything after that line.
impl fmt::Display for AwgConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}={}", ENABLED_KEY, self.enabled)?;
        if !self.enabled {
            return Ok(());
        }
        writeln!(f, "jc={}", self.junk_packet_count)?;
        writeln!(f, "jmin={}", self.junk_packet_min_size)?;
        writeln!(f, "jmax={}", self.junk_packet_max_size)?;
        for kind in MessageType::ALL {
            writeln!(f, "{}={}", kind.junk_key(), self.junk_size(kind))?;
        }
        for kind in MessageType::ALL {
            writeln!(f, "{}={}", kind.header_key(), self.magic_header(kind))?;
        }
        Ok(())
    }
}
