//! Single-fulfillment result cell returned by
//! [`BridgeHandle::submit`](super::BridgeHandle::submit).

use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::debug;

use super::operation::{OperationId, OperationOutcome};
use super::BridgeShared;
use crate::errors::RcError;

/// The caller's claim on one submitted operation's terminal outcome.
///
/// Exactly one waiter: [`Receipt::wait`] consumes the receipt, so the outcome
/// can be read at most once and only once it exists. Dropping the receipt
/// retires the operation from the bridge's in-flight arena; the operation
/// itself still runs to completion (cancellation is unsupported) and its
/// outcome is discarded.
pub struct Receipt {
    id: OperationId,
    outcome: Option<oneshot::Receiver<OperationOutcome>>,
    shared: Arc<BridgeShared>,
}

impl Receipt {
    pub(crate) fn new(
        id: OperationId,
        outcome: oneshot::Receiver<OperationOutcome>,
        shared: Arc<BridgeShared>,
    ) -> Self {
        Self {
            id,
            outcome: Some(outcome),
            shared,
        }
    }

    /// The correlation id of the operation this receipt tracks.
    #[must_use]
    pub fn operation_id(&self) -> OperationId {
        self.id
    }

    /// Wait for the operation's terminal outcome.
    ///
    /// Holds no locks while suspended and imposes no timeout of its own; a
    /// backend-side timeout arrives as the ordinary
    /// [`OperationOutcome::TimedOut`] value. Returns
    /// [`RcError::BridgeClosed`] if the bridge shut down before the operation
    /// completed.
    pub async fn wait(mut self) -> Result<OperationOutcome, RcError> {
        let Some(outcome) = self.outcome.take() else {
            // `wait` consumes the receipt, so the receiver is always present.
            return Err(RcError::BridgeClosed);
        };
        outcome.await.map_err(|_| RcError::BridgeClosed)
    }
}

impl Drop for Receipt {
    fn drop(&mut self) {
        if self.shared.lock_in_flight().remove(&self.id).is_some() {
            debug!(
                target: "rc.bridge",
                operation_id = self.id.value(),
                "operation retired"
            );
        }
    }
}
