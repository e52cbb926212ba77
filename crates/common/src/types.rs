//! Common data types for Murmur components.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::secret::{ExposeSecret, SecretString};

/// Unique identifier for a voice room.
///
/// Opaque and unguessable: sixteen random lowercase hex characters minted at
/// room creation. Collision resistance comes from entropy, not from
/// uniqueness enforcement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Number of hex characters in a generated room id.
    pub const LEN: usize = 16;

    /// Mint a new random room id.
    #[must_use]
    pub fn generate() -> Self {
        Self(random_hex(Self::LEN / 2))
    }

    /// Build a room id from a caller-supplied value.
    #[must_use]
    pub fn from_value(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable identifier for a participant, supplied by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Build a participant id from a caller-supplied value.
    #[must_use]
    pub fn from_value(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One voice-room member: a stable id plus the network origin it connected
/// from.
///
/// Immutable; equality and hashing cover both fields, so the same id arriving
/// from a different origin is a different participant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Participant {
    /// Stable participant identifier.
    pub id: ParticipantId,
    /// Network address the participant connected from.
    pub origin: String,
}

impl Participant {
    /// Build a participant from its id and origin.
    #[must_use]
    pub fn new(id: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            id: ParticipantId::from_value(id),
            origin: origin.into(),
        }
    }
}

/// Secret gating a room's kick/mute/heartbeat operations.
///
/// Known only to the room's creator: eight random hex characters minted at
/// creation and revealed exactly once, in the create reply. `Debug` output is
/// redacted via [`SecretString`].
#[derive(Debug, Clone)]
pub struct OwnerLock(SecretString);

impl OwnerLock {
    /// Number of hex characters in a generated owner lock.
    pub const LEN: usize = 8;

    /// Mint a new random owner lock.
    #[must_use]
    pub fn generate() -> Self {
        Self(SecretString::from(random_hex(Self::LEN / 2)))
    }

    /// Build an owner lock from a caller-supplied value.
    #[must_use]
    pub fn from_value(value: impl Into<String>) -> Self {
        Self(SecretString::from(value.into()))
    }

    /// Whether `candidate` matches the lock. Plain comparison; this is a
    /// low-assurance gate, not an authentication scheme.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        self.0.expose_secret() == candidate
    }

    /// Reveal the secret value. The create reply is the only place this
    /// should surface.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

/// Hex-encode `byte_len` random bytes from a cryptographically secure
/// generator, yielding `2 * byte_len` lowercase hex characters.
fn random_hex(byte_len: usize) -> String {
    let mut bytes = vec![0u8; byte_len];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_room_id_generate_shape() {
        let id = RoomId::generate();
        assert_eq!(id.as_str().len(), RoomId::LEN);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_room_id_generate_is_random() {
        // Two mints colliding would mean 64 bits of entropy failed us.
        assert_ne!(RoomId::generate(), RoomId::generate());
    }

    #[test]
    fn test_room_id_display_matches_value() {
        let id = RoomId::from_value("deadbeef00112233");
        assert_eq!(id.to_string(), "deadbeef00112233");
    }

    #[test]
    fn test_participant_equality_covers_origin() {
        let a = Participant::new("alice", "10.0.0.1:5000");
        let same = Participant::new("alice", "10.0.0.1:5000");
        let other_origin = Participant::new("alice", "10.0.0.2:5000");

        assert_eq!(a, same);
        assert_ne!(a, other_origin);
    }

    #[test]
    fn test_participant_serde_round_trip() {
        let p = Participant::new("alice", "10.0.0.1:5000");
        let json = serde_json::to_string(&p).unwrap();
        let back: Participant = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }

    #[test]
    fn test_participant_id_serializes_transparently() {
        let id = ParticipantId::from_value("alice");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"alice\"");
    }

    #[test]
    fn test_owner_lock_generate_shape() {
        let lock = OwnerLock::generate();
        assert_eq!(lock.expose().len(), OwnerLock::LEN);
        assert!(lock.expose().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_owner_lock_matches() {
        let lock = OwnerLock::from_value("cafe0123");
        assert!(lock.matches("cafe0123"));
        assert!(!lock.matches("cafe0124"));
        assert!(!lock.matches(""));
    }

    #[test]
    fn test_owner_lock_debug_is_redacted() {
        let lock = OwnerLock::from_value("cafe0123");
        let debug = format!("{lock:?}");
        assert!(!debug.contains("cafe0123"));
    }
}
