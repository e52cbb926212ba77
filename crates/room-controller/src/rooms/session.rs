//! One voice room's mutable state machine.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use common::secret::{ExposeSecret, SecretString};
use common::types::{OwnerLock, Participant, ParticipantId, RoomId};

/// One room's members, ban list, owner lock, and expiration clock.
///
/// There is no explicit closed state: a session that misses heartbeats past
/// its TTL reads as expired and becomes unreachable once the directory reaps
/// it. Mutable fields are guarded by a lock scoped to this instance, so two
/// different sessions never contend with each other.
pub struct Session {
    id: RoomId,
    owner_lock: OwnerLock,
    /// `None` means the room is open; set once at creation, never changed.
    password: Option<SecretString>,
    ttl: Duration,
    state: Mutex<SessionState>,
}

struct SessionState {
    members: HashSet<Participant>,
    banned: HashSet<ParticipantId>,
    /// Monotonically non-decreasing across the session's life.
    expires_at: Instant,
}

impl Session {
    /// Create a session with a fresh heartbeat.
    ///
    /// An empty `password` means no password is required.
    #[must_use]
    pub fn new(
        id: RoomId,
        owner_lock: OwnerLock,
        password: Option<SecretString>,
        ttl: Duration,
    ) -> Self {
        let password = password.filter(|p| !p.expose_secret().is_empty());

        Self {
            id,
            owner_lock,
            password,
            ttl,
            state: Mutex::new(SessionState {
                members: HashSet::new(),
                banned: HashSet::new(),
                expires_at: Instant::now() + ttl,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The room id.
    #[must_use]
    pub fn id(&self) -> &RoomId {
        &self.id
    }

    /// The owner lock as minted at creation. The create reply is the only
    /// place this value should surface.
    #[must_use]
    pub fn reveal_owner_lock(&self) -> &str {
        self.owner_lock.expose()
    }

    /// Whether `candidate` matches the owner lock.
    #[must_use]
    pub fn matches_owner_lock(&self, candidate: &str) -> bool {
        self.owner_lock.matches(candidate)
    }

    /// Whether `candidate` satisfies the room's password gate.
    ///
    /// A room without a password accepts any candidate, including the empty
    /// string; otherwise the comparison is exact and unhashed.
    #[must_use]
    pub fn matches_password(&self, candidate: &str) -> bool {
        match &self.password {
            None => true,
            Some(stored) => stored.expose_secret() == candidate,
        }
    }

    /// Add a member. Idempotent; returns whether the participant was newly
    /// added. Resets the heartbeat either way.
    ///
    /// Deliberately does not consult the ban list: callers gate on
    /// [`Session::is_banned`] before admitting anyone.
    pub fn add_user(&self, participant: &Participant) -> bool {
        let mut state = self.state();
        let added = state.members.insert(participant.clone());
        Self::touch(&mut state, self.ttl);
        added
    }

    /// Remove a member; returns whether a matching member was present.
    /// Resets the heartbeat.
    pub fn remove_user(&self, participant: &Participant) -> bool {
        let mut state = self.state();
        let removed = state.members.remove(participant);
        Self::touch(&mut state, self.ttl);
        removed
    }

    /// Put the participant's id on the ban list; returns whether it was
    /// newly banned. Resets the heartbeat.
    pub fn ban_user(&self, participant: &Participant) -> bool {
        let mut state = self.state();
        let banned = state.banned.insert(participant.id.clone());
        Self::touch(&mut state, self.ttl);
        banned
    }

    /// Whether the participant's id is on the ban list.
    #[must_use]
    pub fn is_banned(&self, participant: &Participant) -> bool {
        self.state().banned.contains(&participant.id)
    }

    /// Current member carrying `id`, if any.
    #[must_use]
    pub fn member_by_id(&self, id: &ParticipantId) -> Option<Participant> {
        self.state().members.iter().find(|m| &m.id == id).cloned()
    }

    /// Number of current members.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.state().members.len()
    }

    /// Push the expiration out to now + TTL.
    pub fn reset_heartbeat(&self) {
        let mut state = self.state();
        Self::touch(&mut state, self.ttl);
    }

    /// Whether the session has outlived its TTL as of `now`.
    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        self.state().expires_at < now
    }

    /// Current expiration deadline.
    #[must_use]
    pub fn expires_at(&self) -> Instant {
        self.state().expires_at
    }

    fn touch(state: &mut SessionState, ttl: Duration) {
        let next = Instant::now() + ttl;
        // expires_at never moves backwards
        if next > state.expires_at {
            state.expires_at = next;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const TTL: Duration = Duration::from_secs(60);

    fn session() -> Session {
        Session::new(
            RoomId::from_value("deadbeef00112233"),
            OwnerLock::from_value("cafe0123"),
            None,
            TTL,
        )
    }

    fn alice() -> Participant {
        Participant::new("alice", "10.0.0.1:5000")
    }

    fn bob() -> Participant {
        Participant::new("bob", "10.0.0.2:5000")
    }

    #[test]
    fn test_add_user_is_idempotent() {
        let session = session();

        assert!(session.add_user(&alice()));
        assert!(!session.add_user(&alice()));
        assert_eq!(session.member_count(), 1);
    }

    #[test]
    fn test_remove_user_reports_presence() {
        let session = session();
        session.add_user(&alice());

        assert!(session.remove_user(&alice()));
        assert!(!session.remove_user(&alice()));
        assert_eq!(session.member_count(), 0);
    }

    #[test]
    fn test_ban_then_is_banned() {
        let session = session();

        assert!(!session.is_banned(&alice()));
        assert!(session.ban_user(&alice()));
        assert!(!session.ban_user(&alice()));
        assert!(session.is_banned(&alice()));
        assert!(!session.is_banned(&bob()));
    }

    #[test]
    fn test_add_user_ignores_ban_list() {
        // Ban enforcement is the caller's job; the session still admits a
        // banned participant when asked directly.
        let session = session();
        session.ban_user(&alice());

        assert!(session.add_user(&alice()));
        assert!(session.is_banned(&alice()));
    }

    #[test]
    fn test_member_by_id() {
        let session = session();
        session.add_user(&alice());

        assert_eq!(
            session.member_by_id(&ParticipantId::from_value("alice")),
            Some(alice())
        );
        assert_eq!(session.member_by_id(&ParticipantId::from_value("bob")), None);
    }

    #[test]
    fn test_matches_password_open_room() {
        let open = session();

        assert!(open.matches_password(""));
        assert!(open.matches_password("anything"));
    }

    #[test]
    fn test_matches_password_exact() {
        let gated = Session::new(
            RoomId::from_value("deadbeef00112233"),
            OwnerLock::from_value("cafe0123"),
            Some(SecretString::from("sesame")),
            TTL,
        );

        assert!(gated.matches_password("sesame"));
        assert!(!gated.matches_password(""));
        assert!(!gated.matches_password("Sesame"));
    }

    #[test]
    fn test_empty_password_means_open() {
        let open = Session::new(
            RoomId::from_value("deadbeef00112233"),
            OwnerLock::from_value("cafe0123"),
            Some(SecretString::from("")),
            TTL,
        );

        assert!(open.matches_password(""));
        assert!(open.matches_password("anything"));
    }

    #[test]
    fn test_matches_owner_lock() {
        let session = session();

        assert!(session.matches_owner_lock("cafe0123"));
        assert!(!session.matches_owner_lock("cafe0124"));
        assert_eq!(session.reveal_owner_lock(), "cafe0123");
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_heartbeat_strictly_advances() {
        let session = session();
        let first = session.expires_at();

        tokio::time::advance(Duration::from_secs(1)).await;
        session.reset_heartbeat();
        let second = session.expires_at();

        assert!(second > first);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mutations_reset_heartbeat() {
        let session = session();
        let initial = session.expires_at();

        tokio::time::advance(Duration::from_secs(5)).await;
        session.add_user(&alice());
        assert!(session.expires_at() > initial);

        let after_add = session.expires_at();
        tokio::time::advance(Duration::from_secs(5)).await;
        session.ban_user(&bob());
        assert!(session.expires_at() > after_add);
    }

    #[tokio::test(start_paused = true)]
    async fn test_is_expired_boundary() {
        let session = session();
        let deadline = session.expires_at();

        assert!(!session.is_expired(deadline));
        assert!(session.is_expired(deadline + Duration::from_millis(1)));
    }

    #[test]
    fn test_concurrent_add_and_remove_do_not_lose_updates() {
        let session = Arc::new(session());
        session.add_user(&bob());

        let adder = {
            let session = Arc::clone(&session);
            std::thread::spawn(move || session.add_user(&alice()))
        };
        let remover = {
            let session = Arc::clone(&session);
            std::thread::spawn(move || session.remove_user(&bob()))
        };

        assert!(adder.join().unwrap());
        assert!(remover.join().unwrap());

        assert_eq!(session.member_count(), 1);
        assert!(session
            .member_by_id(&ParticipantId::from_value("alice"))
            .is_some());
        assert!(session
            .member_by_id(&ParticipantId::from_value("bob"))
            .is_none());
    }
}
