//! Units of work that must execute on the backend's single legal thread.

use common::types::{Participant, ParticipantId, RoomId};
use serde::{Deserialize, Serialize};

/// Stable correlation id for an issued operation.
///
/// Passed to the backend as opaque callback context in place of a pointer, so
/// a late completion can never dangle into a reclaimed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperationId(u64);

impl OperationId {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }

    /// The raw id value, for logging.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// A request bound for the backend.
///
/// Produced by a caller task, consumed exactly once by the bridge's owning
/// task, and reported exactly once through its paired
/// [`Receipt`](super::Receipt). Distinct operations are independent; the
/// order they are serviced in is unspecified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Request one join credential per participant for a room.
    Join {
        /// Target room.
        room_id: RoomId,
        /// Participants to mint credentials for.
        participants: Vec<Participant>,
    },

    /// Force removal from the backend's live room state.
    ///
    /// Session membership and the ban list are the caller's to update after
    /// this succeeds; the backend call touches neither.
    Kick {
        /// Target room.
        room_id: RoomId,
        /// Participant to remove.
        target: ParticipantId,
    },

    /// Enable or disable a backend-enforced hard mute.
    ///
    /// No local session-state side effect.
    Mute {
        /// Target room.
        room_id: RoomId,
        /// Participant to mute or unmute.
        target: ParticipantId,
        /// `true` mutes, `false` unmutes.
        mute: bool,
    },
}

impl Operation {
    /// Short operation name for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::Join { .. } => "join",
            Operation::Kick { .. } => "kick",
            Operation::Mute { .. } => "mute",
        }
    }

    /// The room this operation targets.
    #[must_use]
    pub fn room_id(&self) -> &RoomId {
        match self {
            Operation::Join { room_id, .. }
            | Operation::Kick { room_id, .. }
            | Operation::Mute { room_id, .. } => room_id,
        }
    }
}

/// Progress reported by the backend for one issued call.
#[derive(Debug)]
pub enum CallProgress {
    /// The backend is still retrying; the operation stays in flight and no
    /// receipt is touched.
    Retrying,

    /// The call finished. Fulfills the operation's receipt exactly once.
    Terminal(OperationOutcome),
}

/// Terminal result of one operation, delivered through its receipt.
///
/// Failure and timeout are ordinary values here, not errors: the bridge layer
/// never raises on a backend-reported outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutcome {
    /// Join succeeded; carries the minted credentials.
    Joined(JoinGrant),

    /// Kick or mute acknowledged by the backend.
    Acknowledged,

    /// The backend gave up on the call.
    Failed(String),

    /// The backend reported the call timed out.
    TimedOut,
}

/// Connection endpoint plus per-participant credentials for a successful
/// join.
///
/// A requested participant missing from `credentials` failed individually;
/// the join as a whole still succeeded for the participants present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinGrant {
    /// The room the grant is for.
    pub room_id: RoomId,
    /// Connection endpoint the participants should attach to.
    pub endpoint: String,
    /// One credential per participant the backend admitted.
    pub credentials: Vec<JoinCredential>,
}

impl JoinGrant {
    /// Credential echoed back for `participant_id`, if the backend granted
    /// one.
    #[must_use]
    pub fn credential_for(&self, participant_id: &ParticipantId) -> Option<&JoinCredential> {
        self.credentials
            .iter()
            .find(|c| &c.participant_id == participant_id)
    }
}

/// One participant's backend-minted join token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinCredential {
    /// The participant the token was minted for.
    pub participant_id: ParticipantId,
    /// Credential letting that participant attach to the room.
    pub token: String,
}
