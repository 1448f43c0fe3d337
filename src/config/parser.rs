//! Line-oriented `key=value` parser
//!
//! ```text
//! # comment
//! enabled=true
//! jc=5
//! jmin=20
//! jmax=200
//! s1=10
//! h1=157
//! ```
//!
//! The text is tokenized once. The `enabled` flag gates everything else:
//! entries are consumed only up to the first `enabled` key, and if that flag
//! is not `true` the parser returns a disabled config without looking at the
//! remaining lines.

use super::{AwgConfig, ConfigError, MagicHeader};
use tracing::{debug, trace, warn};

/// Key of the master switch
pub const ENABLED_KEY: &str = "enabled";

/// One `key=value` line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Entry<'a> {
    /// 1-based line number in the source text
    pub line: usize,
    pub key: &'a str,
    pub value: &'a str,
}

/// Lazily split `text` into entries, skipping blank and `#` lines.
///
/// Only the first `=` separates key and value.
pub(crate) fn entries(text: &str) -> impl Iterator<Item = Result<Entry<'_>, ConfigError>> {
    text.lines().enumerate().filter_map(|(idx, raw)| {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        Some(match line.split_once('=') {
            Some((key, value)) => Ok(Entry {
                line: idx + 1,
                key: key.trim(),
                value: value.trim(),
            }),
            None => Err(ConfigError::Syntax { line: idx + 1 }),
        })
    })
}

/// Config parser
#[derive(Debug, Clone, Copy, Default)]
pub struct Parser {
    strict: bool,
}

impl Parser {
    /// Create a lenient parser
    pub fn new() -> Self {
        Self::default()
    }

    /// Require every value to parse completely. Lenient parsing reads the
    /// leading integer only and falls back on bad values.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Whether values must parse completely
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Parse a whole config text
    pub fn parse(&self, text: &str) -> Result<AwgConfig, ConfigError> {
        let mut tokens = entries(text);
        let mut seen = Vec::new();
        let mut enabled = false;

        // The first `enabled` key decides whether the rest is read at all
        for entry in tokens.by_ref() {
            let entry = entry?;
            let is_flag = entry.key == ENABLED_KEY;
            if is_flag {
                enabled = entry.value == "true";
            }
            seen.push(entry);
            if is_flag {
                break;
            }
        }

        if !enabled {
            debug!("obfuscation disabled, skipping remaining config");
            return Ok(AwgConfig::default());
        }

        for entry in tokens {
            seen.push(entry?);
        }

        let mut config = AwgConfig::default();
        for entry in &seen {
            self.apply(&mut config, entry)?;
        }

        debug!(
            entries = seen.len(),
            active = config.is_enabled(),
            "parsed obfuscation config"
        );
        Ok(config)
    }

    fn apply(&self, config: &mut AwgConfig, entry: &Entry<'_>) -> Result<(), ConfigError> {
        match entry.key {
            // Re-applied here, so the last occurrence wins
            ENABLED_KEY => config.enabled = entry.value == "true",
            "jc" => self.assign_number(entry, &mut config.junk_packet_count)?,
            "jmin" => self.assign_number(entry, &mut config.junk_packet_min_size)?,
            "jmax" => self.assign_number(entry, &mut config.junk_packet_max_size)?,
            "s1" => self.assign_number(entry, &mut config.init_packet_junk_size)?,
            "s2" => self.assign_number(entry, &mut config.response_packet_junk_size)?,
            "s3" => self.assign_number(entry, &mut config.cookie_packet_junk_size)?,
            "s4" => self.assign_number(entry, &mut config.transport_packet_junk_size)?,
            "h1" => self.assign_header(entry, &mut config.init_packet_magic_header)?,
            "h2" => self.assign_header(entry, &mut config.response_packet_magic_header)?,
            "h3" => self.assign_header(entry, &mut config.cookie_packet_magic_header)?,
            "h4" => self.assign_header(entry, &mut config.transport_packet_magic_header)?,
            other => trace!(key = other, line = entry.line, "ignoring unknown key"),
        }
        Ok(())
    }

    /// Strict mode needs the whole value to be a `u32`. Lenient mode takes
    /// the leading integer and leaves `slot` untouched when there is none.
    fn assign_number(&self, entry: &Entry<'_>, slot: &mut u32) -> Result<(), ConfigError> {
        if self.strict {
            *slot = entry.value.parse().map_err(|_| invalid_value(entry))?;
            return Ok(());
        }

        match leading_integer(entry.value) {
            Some(value) => *slot = value,
            None => warn!(
                key = entry.key,
                value = entry.value,
                line = entry.line,
                "ignoring invalid value"
            ),
        }
        Ok(())
    }

    /// Strict mode accepts `v` or `min-max`. Lenient mode takes the leading
    /// integer as a single-value header and disables the header when there
    /// is none.
    fn assign_header(&self, entry: &Entry<'_>, slot: &mut MagicHeader) -> Result<(), ConfigError> {
        if self.strict {
            *slot = entry.value.parse().map_err(|_| invalid_value(entry))?;
            return Ok(());
        }

        *slot = match leading_integer(entry.value) {
            Some(value) => MagicHeader::single(value),
            None => {
                warn!(
                    key = entry.key,
                    value = entry.value,
                    line = entry.line,
                    "invalid magic header, disabling"
                );
                MagicHeader::DISABLED
            }
        };
        Ok(())
    }
}

fn invalid_value(entry: &Entry<'_>) -> ConfigError {
    ConfigError::InvalidValue {
        line: entry.line,
        key: entry.key.to_string(),
        value: entry.value.to_string(),
    }
}

/// Leading base-10 integer of `value`; anything after it is ignored
fn leading_integer(value: &str) -> Option<u32> {
    let digits = value.strip_prefix('+').unwrap_or(value);
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse().ok()
}

/// Parse with the default lenient [`Parser`]
pub fn parse(text: &str) -> Result<AwgConfig, ConfigError> {
    Parser::new().parse(text)
}
