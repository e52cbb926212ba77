//! Bridge behavior tests: queue draining, receipt fulfillment, retry
//! tolerance, and shutdown.
//!
//! Uses the manual mock backend to control exactly when completions fire and
//! from where.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use common::types::{Participant, ParticipantId, RoomId};
use rc_test_utils::{init_test_tracing, MockBehavior, MockRtcBackend};
use room_controller::bridge::{
    CallProgress, Operation, OperationOutcome, RequestBridge,
};
use room_controller::errors::RcError;

fn kick_op(n: u32) -> Operation {
    Operation::Kick {
        room_id: RoomId::from_value("deadbeef00112233"),
        target: ParticipantId::from_value(format!("target-{n}")),
    }
}

#[tokio::test]
async fn tick_services_exactly_one_operation_per_call() {
    init_test_tracing();
    let backend = MockRtcBackend::builder()
        .behavior(MockBehavior::Succeed)
        .build();
    let mock = backend.handle();
    let (mut bridge, handle) = RequestBridge::new(backend);

    let receipts: Vec<_> = (0..3).map(|n| handle.submit(kick_op(n))).collect();
    assert_eq!(mock.issued_len(), 0);

    assert!(bridge.tick());
    assert_eq!(mock.issued_len(), 1);

    assert!(bridge.tick());
    assert!(bridge.tick());
    assert_eq!(mock.issued_len(), 3);
    assert!(mock.issued().iter().all(|call| call.operation.kind() == "kick"));

    for receipt in receipts {
        assert_eq!(
            receipt.wait().await.unwrap(),
            OperationOutcome::Acknowledged
        );
    }
}

#[tokio::test]
async fn tick_on_empty_queue_is_a_noop() {
    init_test_tracing();
    let backend = MockRtcBackend::builder().build();
    let mock = backend.handle();
    let (mut bridge, _handle) = RequestBridge::new(backend);

    assert!(!bridge.tick());
    assert!(!bridge.tick());
    assert_eq!(mock.issued_len(), 0);
    assert_eq!(bridge.in_flight_len(), 0);
}

#[tokio::test]
async fn wait_does_not_return_while_backend_is_retrying() {
    init_test_tracing();
    let backend = MockRtcBackend::builder()
        .behavior(MockBehavior::Manual)
        .build();
    let mock = backend.handle();
    let (mut bridge, handle) = RequestBridge::new(backend);

    let receipt = handle.submit(kick_op(0));
    bridge.tick();

    let waiter = tokio::spawn(receipt.wait());
    tokio::task::yield_now().await;

    let id = mock.parked_ids().first().copied().unwrap();
    mock.report(id, CallProgress::Retrying);
    mock.report(id, CallProgress::Retrying);
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert!(!waiter.is_finished());

    mock.report(
        id,
        CallProgress::Terminal(OperationOutcome::Acknowledged),
    );
    assert_eq!(
        waiter.await.unwrap().unwrap(),
        OperationOutcome::Acknowledged
    );
}

#[tokio::test]
async fn duplicate_terminal_reports_are_ignored() {
    init_test_tracing();
    let backend = MockRtcBackend::builder()
        .behavior(MockBehavior::Manual)
        .build();
    let mock = backend.handle();
    let (mut bridge, handle) = RequestBridge::new(backend);

    let receipt = handle.submit(kick_op(0));
    bridge.tick();
    let id = mock.parked_ids().first().copied().unwrap();

    mock.report(
        id,
        CallProgress::Terminal(OperationOutcome::Acknowledged),
    );
    // A second terminal report must not disturb the first outcome.
    mock.report(
        id,
        CallProgress::Terminal(OperationOutcome::Failed("late".to_string())),
    );

    assert_eq!(
        receipt.wait().await.unwrap(),
        OperationOutcome::Acknowledged
    );
}

#[tokio::test]
async fn inline_retries_still_end_in_success() {
    init_test_tracing();
    let backend = MockRtcBackend::builder()
        .behavior(MockBehavior::RetryThenSucceed(3))
        .build();
    let (mut bridge, handle) = RequestBridge::new(backend);

    let receipt = handle.submit(kick_op(0));
    bridge.tick();

    assert_eq!(
        receipt.wait().await.unwrap(),
        OperationOutcome::Acknowledged
    );
}

#[tokio::test]
async fn backend_timeout_is_a_distinct_outcome() {
    init_test_tracing();
    let backend = MockRtcBackend::builder()
        .behavior(MockBehavior::TimeOut)
        .build();
    let (mut bridge, handle) = RequestBridge::new(backend);

    let receipt = handle.submit(kick_op(0));
    bridge.tick();

    assert_eq!(receipt.wait().await.unwrap(), OperationOutcome::TimedOut);
}

#[tokio::test]
async fn join_grant_reports_per_participant_failures_implicitly() {
    init_test_tracing();
    let backend = MockRtcBackend::builder()
        .omit_participant(ParticipantId::from_value("mallory"))
        .build();
    let (mut bridge, handle) = RequestBridge::new(backend);

    let receipt = handle.submit(Operation::Join {
        room_id: RoomId::from_value("deadbeef00112233"),
        participants: vec![
            Participant::new("alice", "10.0.0.1:5000"),
            Participant::new("mallory", "10.0.0.9:5000"),
        ],
    });
    bridge.tick();

    let OperationOutcome::Joined(grant) = receipt.wait().await.unwrap() else {
        panic!("join should succeed overall");
    };
    assert!(grant
        .credential_for(&ParticipantId::from_value("alice"))
        .is_some());
    assert!(grant
        .credential_for(&ParticipantId::from_value("mallory"))
        .is_none());
}

#[tokio::test]
async fn completion_from_another_thread_fulfills_the_receipt() {
    init_test_tracing();
    let backend = MockRtcBackend::builder()
        .behavior(MockBehavior::Manual)
        .build();
    let mock = backend.handle();
    let (mut bridge, handle) = RequestBridge::new(backend);

    let receipt = handle.submit(kick_op(0));
    bridge.tick();
    let id = mock.parked_ids().first().copied().unwrap();

    // The backend delivers callbacks on a thread the core does not control.
    let reporter = std::thread::spawn(move || {
        mock.complete_ok(id);
    });

    assert_eq!(
        receipt.wait().await.unwrap(),
        OperationOutcome::Acknowledged
    );
    reporter.join().unwrap();
}

#[tokio::test]
async fn shutdown_resolves_unfulfilled_receipts_as_closed() {
    init_test_tracing();
    let backend = MockRtcBackend::builder()
        .behavior(MockBehavior::Manual)
        .build();
    let (mut bridge, handle) = RequestBridge::new(backend);

    let in_flight = handle.submit(kick_op(0));
    let queued = handle.submit(kick_op(1));
    bridge.tick();

    bridge.shutdown();
    assert_eq!(handle.in_flight_len(), 0);

    assert!(matches!(in_flight.wait().await, Err(RcError::BridgeClosed)));
    assert!(matches!(queued.wait().await, Err(RcError::BridgeClosed)));

    // Submissions after shutdown resolve the same way instead of hanging.
    let late = handle.submit(kick_op(2));
    assert!(matches!(late.wait().await, Err(RcError::BridgeClosed)));
}
