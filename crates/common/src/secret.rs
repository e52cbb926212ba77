//! Secret types for protecting sensitive values from accidental logging.
//!
//! This module re-exports types from the [`secrecy`] crate with Murmur-specific
//! guidance. Use these types for every sensitive value: room passwords, owner
//! locks, and any credential material that passes through the server.
//!
//! `SecretString` implements `Debug` with redaction, so a struct that derives
//! `Debug` while holding a secret cannot leak it through `{:?}` or tracing
//! fields. Secrets are also zeroized when dropped.
//!
//! # Example
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct RoomGate {
//!     room_id: String,
//!     password: SecretString, // Debug shows "[REDACTED]"
//! }
//!
//! let gate = RoomGate {
//!     room_id: "deadbeef00112233".to_string(),
//!     password: SecretString::from("sesame"),
//! };
//!
//! // Reading the value is an explicit act:
//! assert_eq!(gate.password.expose_secret(), "sesame");
//! assert!(!format!("{gate:?}").contains("sesame"));
//! ```

// Re-export the main types from secrecy
pub use secrecy::{ExposeSecret, SecretBox, SecretString};
