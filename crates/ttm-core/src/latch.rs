use tokio_util::sync::CancellationToken;

/// One-shot latch holding task startup until first render completes.
///
/// Cloned handles share state; releasing is idempotent and wakes every
/// current and future waiter.
#[derive(Clone, Debug, Default)]
pub struct StartLatch {
    token: CancellationToken,
}

impl StartLatch {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Release the latch, unblocking all waiters.
    pub fn release(&self) {
        self.token.cancel();
    }

    pub fn is_released(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait until the latch is released. Returns immediately if it already is.
    pub async fn released(&self) {
        self.token.cancelled().await;
    }
}
