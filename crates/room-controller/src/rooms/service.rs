//! Caller-side room operations.
//!
//! Authorization checks run here against session state before any operation
//! is built (a rejected request never reaches the bridge), and the session
//! mutations that must follow backend success are applied here after the
//! receipt resolves.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use common::secret::ExposeSecret;
use common::types::{OwnerLock, RoomId};

use crate::bridge::operation::{Operation, OperationOutcome};
use crate::bridge::BridgeHandle;
use crate::errors::RcError;

use super::directory::SessionDirectory;
use super::messages::{
    CreateRoomReply, CreateRoomRequest, HeartbeatRequest, JoinRoomReply, JoinRoomRequest,
    KickRequest, MuteRequest,
};
use super::session::Session;

/// Front door for validated room requests.
///
/// Holds the directory and the submit side of the bridge; cheap to clone into
/// per-request tasks.
#[derive(Clone)]
pub struct RoomService {
    directory: Arc<SessionDirectory>,
    bridge: BridgeHandle,
    session_ttl: Duration,
}

impl RoomService {
    /// Build a service over an existing directory and bridge handle.
    #[must_use]
    pub fn new(
        directory: Arc<SessionDirectory>,
        bridge: BridgeHandle,
        session_ttl: Duration,
    ) -> Self {
        Self {
            directory,
            bridge,
            session_ttl,
        }
    }

    /// Establish a new room and reveal its owner lock.
    ///
    /// Never touches the bridge. The reply is the only place the owner lock
    /// leaves the server; it cannot be recovered later.
    #[instrument(skip_all, name = "rc.rooms.create")]
    pub fn create_room(&self, request: CreateRoomRequest) -> CreateRoomReply {
        let room_id = RoomId::generate();
        let session = Arc::new(Session::new(
            room_id.clone(),
            OwnerLock::generate(),
            request.password,
            self.session_ttl,
        ));

        let reply = CreateRoomReply {
            room_id: room_id.clone(),
            owner_lock: session.reveal_owner_lock().to_string(),
        };
        self.directory.add_session(session);

        info!(
            target: "rc.rooms",
            room_id = %room_id,
            creator = %request.creator.id,
            "room created"
        );
        reply
    }

    /// Admit a participant to a room.
    ///
    /// Existence, ban, and password checks happen before any operation is
    /// built; the backend round trip happens inside the returned future, with
    /// no locks held while waiting.
    #[instrument(skip_all, name = "rc.rooms.join", fields(room_id = %request.room_id))]
    pub async fn join_room(&self, request: JoinRoomRequest) -> Result<JoinRoomReply, RcError> {
        let session = self.find(&request.room_id)?;
        if session.is_banned(&request.participant) {
            return Err(RcError::Banned);
        }
        let supplied = request
            .password
            .as_ref()
            .map(ExposeSecret::expose_secret)
            .unwrap_or("");
        if !session.matches_password(supplied) {
            return Err(RcError::WrongPassword);
        }

        let receipt = self.bridge.submit(Operation::Join {
            room_id: request.room_id.clone(),
            participants: vec![request.participant.clone()],
        });

        let grant = match receipt.wait().await? {
            OperationOutcome::Joined(grant) => grant,
            OperationOutcome::Acknowledged => {
                return Err(RcError::Internal(
                    "join acknowledged without a grant".to_string(),
                ));
            }
            OperationOutcome::Failed(reason) => return Err(RcError::Backend(reason)),
            OperationOutcome::TimedOut => return Err(RcError::BackendTimeout),
        };

        // The backend echoes back exactly the participants it admitted; one
        // missing from the grant failed individually.
        if grant.credential_for(&request.participant.id).is_none() {
            warn!(
                target: "rc.rooms",
                participant = %request.participant.id,
                "backend omitted participant from join grant"
            );
            return Err(RcError::JoinRejected);
        }

        session.add_user(&request.participant);
        info!(
            target: "rc.rooms",
            participant = %request.participant.id,
            members = session.member_count(),
            "participant joined"
        );

        Ok(JoinRoomReply {
            room_id: grant.room_id,
            endpoint: grant.endpoint,
            credentials: grant.credentials,
        })
    }

    /// Eject a member from the backend's live room, then bar them from
    /// rejoining.
    ///
    /// The backend kick touches only live room state; membership removal and
    /// the ban entry are applied here after it succeeds.
    #[instrument(skip_all, name = "rc.rooms.kick", fields(room_id = %request.room_id))]
    pub async fn kick_user(&self, request: KickRequest) -> Result<(), RcError> {
        let session = self.find(&request.room_id)?;
        if !session.matches_owner_lock(request.owner_lock.expose_secret()) {
            return Err(RcError::LockMismatch);
        }
        let Some(member) = session.member_by_id(&request.target) else {
            return Err(RcError::ParticipantNotFound);
        };

        let receipt = self.bridge.submit(Operation::Kick {
            room_id: request.room_id.clone(),
            target: request.target.clone(),
        });
        expect_ack(receipt.wait().await?)?;

        session.remove_user(&member);
        session.ban_user(&member);
        info!(
            target: "rc.rooms",
            target = %request.target,
            "participant kicked and banned"
        );
        Ok(())
    }

    /// Apply or lift a backend-enforced hard mute on a member.
    ///
    /// No local session-state side effect.
    #[instrument(skip_all, name = "rc.rooms.mute", fields(room_id = %request.room_id))]
    pub async fn mute_user(&self, request: MuteRequest) -> Result<(), RcError> {
        let session = self.find(&request.room_id)?;
        if !session.matches_owner_lock(request.owner_lock.expose_secret()) {
            return Err(RcError::LockMismatch);
        }
        if session.member_by_id(&request.target).is_none() {
            return Err(RcError::ParticipantNotFound);
        }

        let receipt = self.bridge.submit(Operation::Mute {
            room_id: request.room_id.clone(),
            target: request.target.clone(),
            mute: request.mute,
        });
        expect_ack(receipt.wait().await?)?;

        info!(
            target: "rc.rooms",
            target = %request.target,
            mute = request.mute,
            "hard mute updated"
        );
        Ok(())
    }

    /// Extend a room's life. Independent of the bridge.
    pub fn heartbeat(&self, request: HeartbeatRequest) -> Result<(), RcError> {
        let session = self.find(&request.room_id)?;
        if !session.matches_owner_lock(request.owner_lock.expose_secret()) {
            return Err(RcError::LockMismatch);
        }

        session.reset_heartbeat();
        debug!(target: "rc.rooms", room_id = %request.room_id, "heartbeat");
        Ok(())
    }

    fn find(&self, room_id: &RoomId) -> Result<Arc<Session>, RcError> {
        self.directory
            .find_session(room_id)
            .ok_or(RcError::RoomNotFound)
    }
}

/// Map a kick/mute outcome onto the service result.
fn expect_ack(outcome: OperationOutcome) -> Result<(), RcError> {
    match outcome {
        OperationOutcome::Acknowledged => Ok(()),
        OperationOutcome::Joined(_) => {
            Err(RcError::Internal("unexpected join grant".to_string()))
        }
        OperationOutcome::Failed(reason) => Err(RcError::Backend(reason)),
        OperationOutcome::TimedOut => Err(RcError::BackendTimeout),
    }
}
