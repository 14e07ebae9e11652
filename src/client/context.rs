//! Per-call deadline and cancellation.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;

/// Why a call stopped before the transport produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    Cancelled,
    DeadlineExceeded,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => f.write_str("request cancelled"),
            Self::DeadlineExceeded => f.write_str("deadline exceeded"),
        }
    }
}

impl std::error::Error for CancelReason {}

/// Options attached to a single send call.
///
/// The remaining time until the deadline is applied as the request timeout. A
/// cancellation signal aborts the in-flight request. Whenever the request
/// fails while the deadline has passed or the signal is set, the call reports
/// [`CancelReason`] instead of the raw transport error.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
    cancel: Option<watch::Receiver<bool>>,
}

impl CallContext {
    /// A context without deadline or cancellation.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context paired with a handle that cancels it.
    pub fn cancellable() -> (Self, CancelHandle) {
        let (sender, receiver) = watch::channel(false);
        let ctx = Self::new().with_cancel_signal(receiver);
        (
            ctx,
            CancelHandle {
                sender: Arc::new(sender),
            },
        )
    }

    /// Set the deadline to `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Set an absolute deadline. An earlier existing deadline wins.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        self
    }

    /// Observe an externally owned cancellation flag; `true` means cancelled.
    pub fn with_cancel_signal(mut self, signal: watch::Receiver<bool>) -> Self {
        self.cancel = Some(signal);
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The reason this context has resolved, if it has.
    pub fn resolved(&self) -> Option<CancelReason> {
        if self.cancel.as_ref().is_some_and(|signal| *signal.borrow()) {
            return Some(CancelReason::Cancelled);
        }
        if self
            .deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
        {
            return Some(CancelReason::DeadlineExceeded);
        }
        None
    }

    pub(crate) fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Completes once the cancellation signal is set; pends forever otherwise.
    pub(crate) async fn cancelled(&self) -> CancelReason {
        if let Some(signal) = &self.cancel {
            let mut signal = signal.clone();
            let signalled = signal.wait_for(|cancelled| *cancelled).await.is_ok();
            if signalled {
                return CancelReason::Cancelled;
            }
        }
        std::future::pending().await
    }
}

/// Cancels every [`CallContext`] created alongside it (and their clones).
#[derive(Debug, Clone)]
pub struct CancelHandle {
    sender: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_context_never_resolves() {
        let ctx = CallContext::new();
        assert_eq!(ctx.resolved(), None);
        assert_eq!(ctx.remaining(), None);
        assert_eq!(ctx.deadline(), None);
    }

    #[test]
    fn elapsed_deadline_resolves_as_deadline_exceeded() {
        let ctx = CallContext::new().with_timeout(Duration::ZERO);
        assert_eq!(ctx.resolved(), Some(CancelReason::DeadlineExceeded));
        assert_eq!(ctx.remaining(), Some(Duration::ZERO));
    }

    #[test]
    fn earlier_deadline_wins() {
        let now = Instant::now();
        let ctx = CallContext::new()
            .with_deadline(now + Duration::from_secs(5))
            .with_deadline(now + Duration::from_secs(60));
        assert_eq!(ctx.deadline(), Some(now + Duration::from_secs(5)));
        assert!(ctx.remaining().unwrap() <= Duration::from_secs(5));
    }

    #[test]
    fn cancel_handle_resolves_clones() {
        let (ctx, handle) = CallContext::cancellable();
        let clone = ctx.clone();
        assert_eq!(ctx.resolved(), None);
        assert!(!handle.is_cancelled());

        handle.cancel();
        assert!(handle.is_cancelled());
        assert_eq!(ctx.resolved(), Some(CancelReason::Cancelled));
        assert_eq!(clone.resolved(), Some(CancelReason::Cancelled));
    }

    #[test]
    fn cancellation_takes_precedence_over_deadline() {
        let (ctx, handle) = CallContext::cancellable();
        let ctx = ctx.with_timeout(Duration::ZERO);
        handle.cancel();
        assert_eq!(ctx.resolved(), Some(CancelReason::Cancelled));
    }

    #[tokio::test]
    async fn cancelled_future_completes_after_cancel() {
        let (ctx, handle) = CallContext::cancellable();
        let waiter = tokio::spawn(async move { ctx.cancelled().await });
        handle.cancel();
        assert_eq!(waiter.await.unwrap(), CancelReason::Cancelled);
    }

    #[tokio::test]
    async fn external_signal_cancels_context() {
        let (sender, receiver) = watch::channel(false);
        let ctx = CallContext::new()
            .with_timeout(Duration::from_secs(60))
            .with_cancel_signal(receiver);
        assert_eq!(ctx.resolved(), None);

        sender.send_replace(true);
        assert_eq!(ctx.resolved(), Some(CancelReason::Cancelled));
        assert_eq!(ctx.cancelled().await, CancelReason::Cancelled);
    }

    #[test]
    fn reasons_display() {
        assert_eq!(CancelReason::Cancelled.to_string(), "request cancelled");
        assert_eq!(
            CancelReason::DeadlineExceeded.to_string(),
            "deadline exceeded"
        );
    }
}
