//! Per-dispatch context.
//!
//! A `Context` is created by the transport for each message and threaded
//! through the middleware chain by value. The router writes the subject,
//! the correlation middleware writes the correlation ID.

use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct Context {
    subject: Option<String>,
    correlation_id: Option<String>,
    deadline: Option<Instant>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of this context carrying `subject`.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Subject of the event being dispatched, or `""` outside the router.
    pub fn subject(&self) -> &str {
        self.subject.as_deref().unwrap_or("")
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Correlation ID recorded for this dispatch, if any.
    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Attach a deadline `timeout` from now. The router never enforces it.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// True once the deadline, if any, has passed.
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_round_trip() {
        let ctx = Context::new();
        assert_eq!(ctx.subject(), "");

        let ctx = ctx.with_subject("groups");
        assert_eq!(ctx.subject(), "groups");
    }

    #[test]
    fn test_empty_correlation_id_is_none() {
        let ctx = Context::new().with_correlation_id("");
        assert!(ctx.correlation_id().is_none());

        let ctx = Context::new().with_correlation_id("abc");
        assert_eq!(ctx.correlation_id(), Some("abc"));
    }

    #[tokio::test]
    async fn test_deadline() {
        let ctx = Context::new();
        assert!(!ctx.is_expired());

        let ctx = Context::new().with_timeout(Duration::from_millis(10));
        assert!(ctx.deadline().is_some());
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(ctx.is_expired());
    }
}
