//! Narrow contract to the external real-time-communication backend.

use std::sync::Arc;

use tracing::debug;

use super::operation::{CallProgress, Operation, OperationId};
use super::BridgeShared;

/// The backend boundary the bridge drives.
///
/// The backend library tolerates exactly one calling thread. The bridge
/// enforces that by ownership: only the task holding the
/// [`RequestBridge`](super::RequestBridge) can call
/// [`tick`](super::RequestBridge::tick), and only `tick` calls `issue`.
///
/// Implementations must honor three rules:
///
/// - `issue` must not block. Every call completes asynchronously through
///   [`CompletionSink::report`], on whatever thread the backend chooses.
/// - Any number of [`CallProgress::Retrying`] reports may precede exactly one
///   terminal report per operation; retry timing is entirely the backend's
///   decision.
/// - Each operation id is issued at most once; the bridge never repeats a
///   call for the same logical operation.
pub trait RtcBackend: Send {
    /// Start one backend call for `operation`, correlated by `id`.
    fn issue(&mut self, id: OperationId, operation: Operation, completions: CompletionSink);
}

/// Callback path handed to the backend with every issued call.
///
/// Cloneable and safe to invoke from any thread; the bridge keeps the
/// operation alive in its in-flight arena until the receipt is discarded, so
/// a report can always be correlated.
#[derive(Clone)]
pub struct CompletionSink {
    shared: Arc<BridgeShared>,
}

impl CompletionSink {
    pub(crate) fn new(shared: Arc<BridgeShared>) -> Self {
        Self { shared }
    }

    /// Record progress for an issued operation.
    ///
    /// `Retrying` leaves the operation in flight and touches no receipt. The
    /// first terminal report fulfills the receipt; later terminal reports and
    /// unknown ids are logged and ignored.
    pub fn report(&self, id: OperationId, progress: CallProgress) {
        match progress {
            CallProgress::Retrying => {
                debug!(
                    target: "rc.bridge",
                    operation_id = id.value(),
                    "backend retrying"
                );
            }
            CallProgress::Terminal(outcome) => {
                self.shared.fulfill(id, outcome);
            }
        }
    }
}
