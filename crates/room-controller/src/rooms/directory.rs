//! Thread-safe registry of live sessions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::time::Instant;
use tracing::{debug, warn};

use common::types::RoomId;

use super::session::Session;

/// Registry of sessions keyed by room id.
///
/// The coarse lock here guards only structural insert/remove of the map; each
/// session's fields are guarded by that session's own lock, so mutating two
/// different sessions never contends.
#[derive(Default)]
pub struct SessionDirectory {
    sessions: Mutex<HashMap<RoomId, Arc<Session>>>,
}

impl SessionDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<RoomId, Arc<Session>>> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a session under its id.
    ///
    /// A colliding id overwrites the previous session, last write wins: room
    /// ids carry enough entropy that collisions are noise, not a case worth
    /// failing on.
    pub fn add_session(&self, session: Arc<Session>) {
        let id = session.id().clone();
        if self.sessions().insert(id.clone(), session).is_some() {
            warn!(
                target: "rc.rooms",
                room_id = %id,
                "room id collision, previous session replaced"
            );
        }
    }

    /// Look up a live session.
    ///
    /// Safe under concurrent [`SessionDirectory::add_session`] and
    /// [`SessionDirectory::remove_expired_sessions`]; the returned `Arc`
    /// stays valid even if the session is reaped afterwards.
    #[must_use]
    pub fn find_session(&self, id: &RoomId) -> Option<Arc<Session>> {
        self.sessions().get(id).cloned()
    }

    /// Drop every session expired as of `now`; returns how many were removed.
    pub fn remove_expired_sessions(&self, now: Instant) -> usize {
        let mut sessions = self.sessions();
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now));
        let removed = before - sessions.len();

        if removed > 0 {
            debug!(
                target: "rc.rooms",
                removed,
                remaining = sessions.len(),
                "reaped expired sessions"
            );
        }
        removed
    }

    /// Number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    /// Whether the directory holds no sessions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions().is_empty()
    }
}
