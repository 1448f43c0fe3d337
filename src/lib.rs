//! # awg-obfs
//!
//! Obfuscation settings for a WireGuard tunnel in the AmneziaWG style:
//! junk packets ahead of the handshake, junk bytes per message kind, and
//! magic header ranges that replace the plain message type identifiers.
//!
//! ## Flow
//!
//! ```text
//! text ──► Parser ──► enabled? ──no──► AwgConfig::default()
//!                        │
//!                       yes
//!                        ▼
//!                 all key=value entries ──► AwgConfig
//!                                              │
//!                     validate() / is_enabled()┤
//!                                              ▼
//!                            HeaderSelector, JunkGenerator
//! ```
//!
//! ```
//! use awg_obfs::{AwgConfig, MagicHeader};
//!
//! let config: AwgConfig = "enabled=true\njc=5\njmin=20\njmax=200\nh1=157"
//!     .parse()
//!     .unwrap();
//! assert!(config.is_enabled());
//! assert_eq!(config.init_packet_magic_header, MagicHeader::single(157));
//! config.validate().unwrap();
//! ```

pub mod config;
pub mod obfuscation;
pub mod protocol;

pub use config::{AwgConfig, ConfigError, MagicHeader, Parser};
pub use protocol::MessageType;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] protocol::ProtocolError),
}
