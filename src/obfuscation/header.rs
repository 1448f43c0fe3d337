//! Magic header selection
//!
//! Senders replace the WireGuard message type with a value drawn from the
//! configured range. Receivers map the value back to a message kind.

use crate::config::{AwgConfig, ConfigError};
use crate::protocol::MessageType;
use rand::Rng;
use tracing::trace;

/// Picks and recognises magic headers for one config
#[derive(Debug, Clone, Copy)]
pub struct HeaderSelector<'a> {
    config: &'a AwgConfig,
}

impl<'a> HeaderSelector<'a> {
    pub fn new(config: &'a AwgConfig) -> Self {
        Self { config }
    }

    /// Header to send for `kind`.
    ///
    /// Falls back to the plain message type when obfuscation is off or the
    /// kind's range is inactive. An active range must be valid.
    pub fn header_for<R: Rng + ?Sized>(
        &self,
        kind: MessageType,
        rng: &mut R,
    ) -> Result<u32, ConfigError> {
        let range = self.config.magic_header(kind);
        if !self.config.is_enabled() || !range.is_active() {
            return Ok(kind.id());
        }

        range.validate(kind.header_key())?;
        let header = rng.gen_range(range.min()..=range.max());
        trace!(?kind, header, "selected magic header");
        Ok(header)
    }

    /// Message kind a received header belongs to, if any
    pub fn classify(&self, header: u32) -> Option<MessageType> {
        let obfuscated = self.config.is_enabled();
        MessageType::ALL.into_iter().find(|&kind| {
            let range = self.config.magic_header(kind);
            if obfuscated && range.is_active() {
                range.contains(header)
            } else {
                header == kind.id()
            }
        })
    }
}
