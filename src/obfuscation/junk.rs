//! Junk packets and per-message junk bytes

use crate::config::{check_limit, AwgConfig, ConfigError};
use crate::protocol::{MessageType, MAX_JUNK_PACKET_COUNT, MAX_JUNK_SIZE};
use rand::Rng;

/// Generates random junk according to one config
#[derive(Debug, Clone, Copy)]
pub struct JunkGenerator<'a> {
    config: &'a AwgConfig,
}

impl<'a> JunkGenerator<'a> {
    pub fn new(config: &'a AwgConfig) -> Self {
        Self { config }
    }

    /// Junk packets to send before a handshake initiation
    pub fn packet_count(&self) -> usize {
        if self.config.is_enabled() {
            self.config.junk_packet_count as usize
        } else {
            0
        }
    }

    /// Random junk packet length in `[jmin, jmax]`
    pub fn packet_len<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<usize, ConfigError> {
        let min = self.config.junk_packet_min_size;
        let max = self.config.junk_packet_max_size;
        check_limit("jmax", max, MAX_JUNK_SIZE)?;
        if min > max {
            return Err(ConfigError::JunkSizeOrder { min, max });
        }
        Ok(rng.gen_range(min..=max) as usize)
    }

    /// All junk packets for one handshake, empty when obfuscation is off
    pub fn packets<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<Vec<u8>>, ConfigError> {
        let count = self.packet_count();
        check_limit("jc", count as u32, MAX_JUNK_PACKET_COUNT)?;

        let mut packets = Vec::with_capacity(count);
        for _ in 0..count {
            let len = self.packet_len(rng)?;
            packets.push(random_bytes(rng, len));
        }
        Ok(packets)
    }

    /// Junk bytes that accompany a message of `kind`
    pub fn message_prefix<R: Rng + ?Sized>(
        &self,
        kind: MessageType,
        rng: &mut R,
    ) -> Result<Vec<u8>, ConfigError> {
        let len = self.message_prefix_len(kind);
        check_limit(kind.junk_key(), len as u32, MAX_JUNK_SIZE)?;
        Ok(random_bytes(rng, len))
    }

    /// Smallest wire size of a `kind` message including its junk
    pub fn framed_size(&self, kind: MessageType) -> usize {
        kind.min_size() + self.message_prefix_len(kind)
    }

    fn message_prefix_len(&self, kind: MessageType) -> usize {
        if self.config.is_enabled() {
            self.config.junk_size(kind) as usize
        } else {
            0
        }
    }
}

fn random_bytes<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    rng.fill(&mut buf[..]);
    buf
}
