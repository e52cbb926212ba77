//! Mock RTC backend for bridge and room-service testing.
//!
//! The mock can be configured to:
//! - Complete calls inline with success, failure, or timeout
//! - Report "still retrying" a number of times before succeeding
//! - Park calls for manual completion from another task or thread
//! - Omit specific participants from join grants
//!
//! # Example
//!
//! ```rust,ignore
//! use rc_test_utils::{MockBehavior, MockRtcBackend};
//!
//! let backend = MockRtcBackend::builder()
//!     .behavior(MockBehavior::Manual)
//!     .endpoint("rtc.test.local:9000")
//!     .build();
//! let mock = backend.handle();
//!
//! // Move `backend` into a RequestBridge, then complete parked calls
//! // through `mock` from wherever the test likes.
//! ```

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use common::types::ParticipantId;
use room_controller::bridge::{
    CallProgress, CompletionSink, JoinCredential, JoinGrant, Operation, OperationId,
    OperationOutcome, RtcBackend,
};

/// What the mock does with each issued call.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Report terminal success inline with `issue`.
    Succeed,
    /// Report terminal failure inline.
    Fail(String),
    /// Report a timeout inline.
    TimeOut,
    /// Report `Retrying` n times, then terminal success, all inline.
    RetryThenSucceed(u32),
    /// Park the call; the test completes it through [`MockBackendHandle`].
    Manual,
}

/// One call the mock has seen.
#[derive(Debug, Clone)]
pub struct IssuedCall {
    /// Correlation id the bridge assigned.
    pub id: OperationId,
    /// The operation as issued.
    pub operation: Operation,
}

#[derive(Default)]
struct MockState {
    issued: Vec<IssuedCall>,
    parked: Vec<(OperationId, Operation, CompletionSink)>,
}

/// Mock backend implementing [`RtcBackend`].
pub struct MockRtcBackend {
    behavior: MockBehavior,
    endpoint: String,
    omit: HashSet<ParticipantId>,
    state: Arc<Mutex<MockState>>,
}

impl MockRtcBackend {
    /// Create a new builder.
    #[must_use]
    pub fn builder() -> MockRtcBackendBuilder {
        MockRtcBackendBuilder::default()
    }

    /// Handle for inspecting issued calls and completing parked ones after
    /// the backend has moved into a `RequestBridge`.
    #[must_use]
    pub fn handle(&self) -> MockBackendHandle {
        MockBackendHandle {
            state: Arc::clone(&self.state),
            endpoint: self.endpoint.clone(),
        }
    }

    fn success_outcome(&self, operation: &Operation) -> OperationOutcome {
        success_outcome_for(operation, &self.endpoint, &self.omit)
    }
}

impl RtcBackend for MockRtcBackend {
    fn issue(&mut self, id: OperationId, operation: Operation, completions: CompletionSink) {
        self.state.lock().unwrap().issued.push(IssuedCall {
            id,
            operation: operation.clone(),
        });

        match &self.behavior {
            MockBehavior::Succeed => {
                let outcome = self.success_outcome(&operation);
                completions.report(id, CallProgress::Terminal(outcome));
            }
            MockBehavior::Fail(reason) => {
                completions.report(
                    id,
                    CallProgress::Terminal(OperationOutcome::Failed(reason.clone())),
                );
            }
            MockBehavior::TimeOut => {
                completions.report(id, CallProgress::Terminal(OperationOutcome::TimedOut));
            }
            MockBehavior::RetryThenSucceed(retries) => {
                for _ in 0..*retries {
                    completions.report(id, CallProgress::Retrying);
                }
                let outcome = self.success_outcome(&operation);
                completions.report(id, CallProgress::Terminal(outcome));
            }
            MockBehavior::Manual => {
                self.state
                    .lock()
                    .unwrap()
                    .parked
                    .push((id, operation, completions));
            }
        }
    }
}

/// Shared view into a [`MockRtcBackend`], usable from any task or thread.
#[derive(Clone)]
pub struct MockBackendHandle {
    state: Arc<Mutex<MockState>>,
    endpoint: String,
}

impl MockBackendHandle {
    /// Every call issued so far.
    #[must_use]
    pub fn issued(&self) -> Vec<IssuedCall> {
        self.state.lock().unwrap().issued.clone()
    }

    /// Number of calls issued so far.
    #[must_use]
    pub fn issued_len(&self) -> usize {
        self.state.lock().unwrap().issued.len()
    }

    /// Ids of parked calls awaiting manual completion, in issue order.
    #[must_use]
    pub fn parked_ids(&self) -> Vec<OperationId> {
        self.state
            .lock()
            .unwrap()
            .parked
            .iter()
            .map(|(id, _, _)| *id)
            .collect()
    }

    /// Report progress for a parked call without consuming it.
    ///
    /// Lets tests exercise retry streams and duplicate terminal reports.
    ///
    /// # Panics
    ///
    /// Panics if no parked call carries `id`.
    pub fn report(&self, id: OperationId, progress: CallProgress) {
        let sink = {
            let state = self.state.lock().unwrap();
            state
                .parked
                .iter()
                .find(|(parked_id, _, _)| *parked_id == id)
                .map(|(_, _, sink)| sink.clone())
                .expect("no parked call with that id")
        };
        sink.report(id, progress);
    }

    /// Complete a parked call with the given terminal outcome.
    ///
    /// # Panics
    ///
    /// Panics if no parked call carries `id`.
    pub fn complete(&self, id: OperationId, outcome: OperationOutcome) {
        let (_, _, sink) = {
            let mut state = self.state.lock().unwrap();
            let index = state
                .parked
                .iter()
                .position(|(parked_id, _, _)| *parked_id == id)
                .expect("no parked call with that id");
            state.parked.remove(index)
        };
        sink.report(id, CallProgress::Terminal(outcome));
    }

    /// Complete a parked call with the success outcome the mock would have
    /// minted inline (a full join grant, or an acknowledgement).
    ///
    /// # Panics
    ///
    /// Panics if no parked call carries `id`.
    pub fn complete_ok(&self, id: OperationId) {
        let operation = {
            let state = self.state.lock().unwrap();
            state
                .parked
                .iter()
                .find(|(parked_id, _, _)| *parked_id == id)
                .map(|(_, operation, _)| operation.clone())
                .expect("no parked call with that id")
        };
        let outcome = success_outcome_for(&operation, &self.endpoint, &HashSet::new());
        self.complete(id, outcome);
    }
}

fn success_outcome_for(
    operation: &Operation,
    endpoint: &str,
    omit: &HashSet<ParticipantId>,
) -> OperationOutcome {
    match operation {
        Operation::Join {
            room_id,
            participants,
        } => OperationOutcome::Joined(JoinGrant {
            room_id: room_id.clone(),
            endpoint: endpoint.to_string(),
            credentials: participants
                .iter()
                .filter(|p| !omit.contains(&p.id))
                .enumerate()
                .map(|(index, p)| JoinCredential {
                    participant_id: p.id.clone(),
                    token: format!("token-{index}-{}", p.id),
                })
                .collect(),
        }),
        Operation::Kick { .. } | Operation::Mute { .. } => OperationOutcome::Acknowledged,
    }
}

/// Builder for [`MockRtcBackend`] configuration.
pub struct MockRtcBackendBuilder {
    behavior: MockBehavior,
    endpoint: String,
    omit: HashSet<ParticipantId>,
}

impl Default for MockRtcBackendBuilder {
    fn default() -> Self {
        Self {
            behavior: MockBehavior::Succeed,
            endpoint: "rtc.test.local:9000".to_string(),
            omit: HashSet::new(),
        }
    }
}

impl MockRtcBackendBuilder {
    /// Set the scripted behavior (default: [`MockBehavior::Succeed`]).
    #[must_use]
    pub fn behavior(mut self, behavior: MockBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// Set the endpoint minted into join grants.
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Omit a participant from every join grant, simulating a per-participant
    /// failure inside an otherwise successful join.
    #[must_use]
    pub fn omit_participant(mut self, id: ParticipantId) -> Self {
        self.omit.insert(id);
        self
    }

    /// Build the mock backend.
    #[must_use]
    pub fn build(self) -> MockRtcBackend {
        MockRtcBackend {
            behavior: self.behavior,
            endpoint: self.endpoint,
            omit: self.omit,
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }
}
