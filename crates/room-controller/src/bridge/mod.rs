//! Request bridge between concurrent callers and the single-threaded backend.
//!
//! Unlimited caller tasks submit [`Operation`]s through a cloneable
//! [`BridgeHandle`] and receive a [`Receipt`] per submission. The owning side,
//! [`RequestBridge`], is held by exactly one task (the driver) and services at
//! most one operation per [`RequestBridge::tick`], keeping every backend call
//! on one thread and bounding the call rate.
//!
//! Issued operations live in an in-flight arena keyed by [`OperationId`]
//! until their receipt is discarded, so a backend completion arriving on any
//! thread can always find its operation. The backend reports progress through
//! a [`CompletionSink`]; the first terminal report fulfills the receipt,
//! structurally exactly once.

pub mod backend;
pub mod operation;
pub mod receipt;

pub use backend::{CompletionSink, RtcBackend};
pub use operation::{
    CallProgress, JoinCredential, JoinGrant, Operation, OperationId, OperationOutcome,
};
pub use receipt::Receipt;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::observability::BridgeMetrics;

/// One queued submission: the operation plus its reply channel.
struct PendingOperation {
    id: OperationId,
    operation: Operation,
    reply: oneshot::Sender<OperationOutcome>,
}

/// Arena slot for an operation that has been issued to the backend.
pub(crate) struct InFlightOperation {
    /// Owned here until the receipt is discarded, so the backend's callback
    /// can never observe a reclaimed operation.
    operation: Operation,
    /// Taken by the first terminal report; `None` afterwards.
    reply: Option<oneshot::Sender<OperationOutcome>>,
}

/// State shared between the bridge halves, receipts, and completion sinks.
pub(crate) struct BridgeShared {
    in_flight: Mutex<HashMap<OperationId, InFlightOperation>>,
    next_id: AtomicU64,
    metrics: Arc<BridgeMetrics>,
}

impl BridgeShared {
    pub(crate) fn lock_in_flight(&self) -> MutexGuard<'_, HashMap<OperationId, InFlightOperation>> {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Deliver a terminal outcome to an in-flight operation's receipt.
    ///
    /// The first terminal report wins; later ones and unknown ids are logged
    /// and ignored. If the waiter already discarded its receipt, the arena
    /// entry is retired here since nothing else would ever remove it.
    pub(crate) fn fulfill(&self, id: OperationId, outcome: OperationOutcome) {
        let mut in_flight = self.lock_in_flight();
        let Some(entry) = in_flight.get_mut(&id) else {
            warn!(
                target: "rc.bridge",
                operation_id = id.value(),
                "terminal report for unknown operation"
            );
            return;
        };
        let Some(reply) = entry.reply.take() else {
            warn!(
                target: "rc.bridge",
                operation_id = id.value(),
                kind = entry.operation.kind(),
                "duplicate terminal report ignored"
            );
            return;
        };
        self.metrics.record_fulfilled();
        if reply.send(outcome).is_err() {
            in_flight.remove(&id);
        }
    }
}

/// Cloneable submit side of the bridge. Safe to use from any task or thread.
#[derive(Clone)]
pub struct BridgeHandle {
    sender: mpsc::UnboundedSender<PendingOperation>,
    shared: Arc<BridgeShared>,
}

impl BridgeHandle {
    /// Queue an operation for the backend and return the receipt that will
    /// carry its terminal outcome.
    ///
    /// Never blocks. The order distinct operations are serviced in is
    /// unspecified; they are independent. After
    /// [`RequestBridge::shutdown`] the operation is dropped and the receipt
    /// resolves to [`RcError::BridgeClosed`](crate::errors::RcError::BridgeClosed).
    pub fn submit(&self, operation: Operation) -> Receipt {
        let id = OperationId::new(self.shared.next_id.fetch_add(1, Ordering::Relaxed));
        let (reply, outcome) = oneshot::channel();
        self.shared.metrics.record_submitted();

        debug!(
            target: "rc.bridge",
            operation_id = id.value(),
            kind = operation.kind(),
            room_id = %operation.room_id(),
            "operation submitted"
        );

        if self
            .sender
            .send(PendingOperation {
                id,
                operation,
                reply,
            })
            .is_err()
        {
            warn!(
                target: "rc.bridge",
                operation_id = id.value(),
                "submit after shutdown, operation dropped"
            );
        }

        Receipt::new(id, outcome, Arc::clone(&self.shared))
    }

    /// Number of operations currently in flight with the backend.
    #[must_use]
    pub fn in_flight_len(&self) -> usize {
        self.shared.lock_in_flight().len()
    }

    /// Shared traffic counters.
    #[must_use]
    pub fn metrics(&self) -> Arc<BridgeMetrics> {
        Arc::clone(&self.shared.metrics)
    }
}

/// Owning side of the bridge: the pending-queue consumer and the sole holder
/// of the backend.
///
/// Not cloneable. Whichever task owns this value is the backend's single
/// legal calling thread; nothing else can reach the backend.
pub struct RequestBridge<B: RtcBackend> {
    pending: mpsc::UnboundedReceiver<PendingOperation>,
    shared: Arc<BridgeShared>,
    backend: B,
}

impl<B: RtcBackend> RequestBridge<B> {
    /// Create a connected bridge pair around `backend`.
    #[must_use]
    pub fn new(backend: B) -> (Self, BridgeHandle) {
        let (sender, pending) = mpsc::unbounded_channel();
        let shared = Arc::new(BridgeShared {
            in_flight: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            metrics: BridgeMetrics::new(),
        });

        let bridge = Self {
            pending,
            shared: Arc::clone(&shared),
            backend,
        };
        let handle = BridgeHandle { sender, shared };

        (bridge, handle)
    }

    /// Service at most one pending operation; a no-op on an empty queue.
    ///
    /// Returns whether an operation was issued. Bursts drain over successive
    /// calls: one operation per tick is the backpressure valve in front of
    /// the backend. Never blocks.
    pub fn tick(&mut self) -> bool {
        let Ok(PendingOperation {
            id,
            operation,
            reply,
        }) = self.pending.try_recv()
        else {
            return false;
        };

        debug!(
            target: "rc.bridge",
            operation_id = id.value(),
            kind = operation.kind(),
            room_id = %operation.room_id(),
            "issuing backend call"
        );

        // The arena entry must exist before the call: the backend may
        // complete on another thread before `issue` returns.
        let call = operation.clone();
        self.shared.lock_in_flight().insert(
            id,
            InFlightOperation {
                operation,
                reply: Some(reply),
            },
        );
        self.backend
            .issue(id, call, CompletionSink::new(Arc::clone(&self.shared)));
        self.shared.metrics.record_serviced();
        true
    }

    /// Drain the pending queue and clear the in-flight arena.
    ///
    /// Every unfulfilled receipt, queued or in flight, resolves to
    /// [`RcError::BridgeClosed`](crate::errors::RcError::BridgeClosed).
    pub fn shutdown(&mut self) {
        self.pending.close();
        let mut drained: u64 = 0;
        while self.pending.try_recv().is_ok() {
            drained += 1;
        }

        let cleared = {
            let mut in_flight = self.shared.lock_in_flight();
            let cleared = in_flight.len() as u64;
            in_flight.clear();
            cleared
        };

        self.shared.metrics.record_abandoned(drained + cleared);
        info!(
            target: "rc.bridge",
            drained,
            cleared,
            "request bridge shut down"
        );
    }

    /// Number of operations currently in flight with the backend.
    #[must_use]
    pub fn in_flight_len(&self) -> usize {
        self.shared.lock_in_flight().len()
    }

    /// Shared traffic counters.
    #[must_use]
    pub fn metrics(&self) -> Arc<BridgeMetrics> {
        Arc::clone(&self.shared.metrics)
    }
}
