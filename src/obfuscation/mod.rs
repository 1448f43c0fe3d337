//! Traffic obfuscation driven by an [`AwgConfig`]
//!
//! Provides:
//! - Magic header selection and classification
//! - Junk packets sent ahead of a handshake initiation
//! - Per-message junk bytes
//!
//! Nothing here frames packets. Callers get header values and byte buffers
//! and put them on the wire themselves.
//!
//! [`AwgConfig`]: crate::config::AwgConfig

mod header;
mod junk;

pub use header::HeaderSelector;
pub use junk::JunkGenerator;
