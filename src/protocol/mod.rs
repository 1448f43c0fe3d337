//! Protocol definitions and constants
//!
//! The obfuscation layer sits on top of the WireGuard message set. Message
//! type identifiers double as the default magic header values, which is why
//! header values `1..=4` are reserved.

use thiserror::Error;

/// Protocol errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("Invalid message type: {0}")]
    InvalidMessageType(u32),
}

/// Handshake initiation message type
pub const MESSAGE_TYPE_INIT: u32 = 1;

/// Handshake response message type
pub const MESSAGE_TYPE_RESPONSE: u32 = 2;

/// Cookie reply message type
pub const MESSAGE_TYPE_COOKIE_REPLY: u32 = 3;

/// Transport data message type
pub const MESSAGE_TYPE_TRANSPORT: u32 = 4;

/// Size of a handshake initiation on the wire
pub const MESSAGE_INIT_SIZE: usize = 148;

/// Size of a handshake response on the wire
pub const MESSAGE_RESPONSE_SIZE: usize = 92;

/// Size of a cookie reply on the wire
pub const MESSAGE_COOKIE_REPLY_SIZE: usize = 64;

/// Minimum size of a transport message (header + empty AEAD payload)
pub const MESSAGE_TRANSPORT_MIN_SIZE: usize = 32;

/// Largest header value reserved for the built-in message types
pub const MAGIC_HEADER_RESERVED_MAX: u32 = 4;

/// Upper bound for the junk packet count (jc)
pub const MAX_JUNK_PACKET_COUNT: u32 = 128;

/// Upper bound for any junk size in bytes (jmin, jmax, s1..s4)
pub const MAX_JUNK_SIZE: u32 = 1280;

/// The four message kinds that carry their own junk size and magic header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum MessageType {
    /// Handshake initiation (s1 / h1)
    HandshakeInit = MESSAGE_TYPE_INIT,
    /// Handshake response (s2 / h2)
    HandshakeResponse = MESSAGE_TYPE_RESPONSE,
    /// Cookie reply, sent under load (s3 / h3)
    CookieReply = MESSAGE_TYPE_COOKIE_REPLY,
    /// Transport data (s4 / h4)
    Transport = MESSAGE_TYPE_TRANSPORT,
}

impl MessageType {
    /// All message kinds in wire id order
    pub const ALL: [MessageType; 4] = [
        MessageType::HandshakeInit,
        MessageType::HandshakeResponse,
        MessageType::CookieReply,
        MessageType::Transport,
    ];

    /// Default magic header, i.e. the plain WireGuard message type
    pub fn id(self) -> u32 {
        self as u32
    }

    /// Minimum size of this message on the wire, without junk
    pub fn min_size(self) -> usize {
        match self {
            Self::HandshakeInit => MESSAGE_INIT_SIZE,
            Self::HandshakeResponse => MESSAGE_RESPONSE_SIZE,
            Self::CookieReply => MESSAGE_COOKIE_REPLY_SIZE,
            Self::Transport => MESSAGE_TRANSPORT_MIN_SIZE,
        }
    }

    /// Config key of the per-message junk size
    pub fn junk_key(self) -> &'static str {
        match self {
            Self::HandshakeInit => "s1",
            Self::HandshakeResponse => "s2",
            Self::CookieReply => "s3",
            Self::Transport => "s4",
        }
    }

    /// Config key of the magic header override
    pub fn header_key(self) -> &'static str {
        match self {
            Self::HandshakeInit => "h1",
            Self::HandshakeResponse => "h2",
            Self::CookieReply => "h3",
            Self::Transport => "h4",
        }
    }
}

impl TryFrom<u32> for MessageType {
    type Error = ProtocolError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            MESSAGE_TYPE_INIT => Ok(MessageType::HandshakeInit),
            MESSAGE_TYPE_RESPONSE => Ok(MessageType::HandshakeResponse),
            MESSAGE_TYPE_COOKIE_REPLY => Ok(MessageType::CookieReply),
            MESSAGE_TYPE_TRANSPORT => Ok(MessageType::Transport),
            _ => Err(ProtocolError::InvalidMessageType(value)),
        }
    }
}
