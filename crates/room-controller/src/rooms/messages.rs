//! Validated inbound parameter objects and their replies.
//!
//! The transport layer owns parsing and validation; by the time these types
//! reach [`RoomService`](super::RoomService) they are well formed. Requests
//! only ever travel inbound, so they are deserialize-only, and their password
//! and owner-lock fields ride [`SecretString`] so a `{:?}` of a request can
//! never leak them. Replies are plain data for the transport to serialize
//! back out.

use serde::{Deserialize, Serialize};

use common::secret::SecretString;
use common::types::{Participant, ParticipantId, RoomId};

use crate::bridge::operation::JoinCredential;

/// Establish a new room.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoomRequest {
    /// Whoever is creating the room.
    pub creator: Participant,
    /// Optional room password; absent or empty means the room is open.
    /// Redacted in `Debug` output.
    #[serde(default)]
    pub password: Option<SecretString>,
}

/// Reply to [`CreateRoomRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomReply {
    /// The new room's opaque id.
    pub room_id: RoomId,
    /// The owner lock, revealed exactly once, here.
    pub owner_lock: String,
}

/// Join an existing room.
#[derive(Debug, Clone, Deserialize)]
pub struct JoinRoomRequest {
    /// Target room.
    pub room_id: RoomId,
    /// The joining participant.
    pub participant: Participant,
    /// Supplied password; absent is the same as empty, and open rooms ignore
    /// it either way. Redacted in `Debug` output.
    #[serde(default)]
    pub password: Option<SecretString>,
}

/// Reply to [`JoinRoomRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRoomReply {
    /// The room joined.
    pub room_id: RoomId,
    /// Connection endpoint to attach to.
    pub endpoint: String,
    /// Backend-minted credentials, one per admitted participant.
    pub credentials: Vec<JoinCredential>,
}

/// Remove a member from a room and bar them from rejoining.
#[derive(Debug, Clone, Deserialize)]
pub struct KickRequest {
    /// Target room.
    pub room_id: RoomId,
    /// Member to remove.
    pub target: ParticipantId,
    /// Owner lock gating the operation. Redacted in `Debug` output.
    pub owner_lock: SecretString,
}

/// Apply or lift a hard mute on a member.
#[derive(Debug, Clone, Deserialize)]
pub struct MuteRequest {
    /// Target room.
    pub room_id: RoomId,
    /// Member to mute or unmute.
    pub target: ParticipantId,
    /// `true` mutes, `false` unmutes.
    pub mute: bool,
    /// Owner lock gating the operation. Redacted in `Debug` output.
    pub owner_lock: SecretString,
}

/// Extend a room's expiration.
#[derive(Debug, Clone, Deserialize)]
pub struct HeartbeatRequest {
    /// Target room.
    pub room_id: RoomId,
    /// Owner lock gating the operation. Redacted in `Debug` output.
    pub owner_lock: SecretString,
}
