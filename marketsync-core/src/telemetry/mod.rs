//! Operation spans for sync calls
//!
//! Every sync operation runs inside an `operation` span carrying a
//! correlation id, so the facade calls and transitions it produces can be
//! grouped in the logs. Follow-up steps such as the refresh after a publish
//! get a child context pointing back at the operation that triggered them.

use std::time::Instant;
use tracing::{span, Level, Span};
use uuid::Uuid;

/// Correlation ids for one operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    pub correlation_id: String,
    pub parent_id: Option<String>,
}

impl TraceContext {
    pub fn new() -> Self {
        Self {
            correlation_id: Uuid::new_v4().to_string(),
            parent_id: None,
        }
    }

    /// Context for a follow-up operation triggered by this one
    pub fn child(&self) -> Self {
        Self {
            correlation_id: Uuid::new_v4().to_string(),
            parent_id: Some(self.correlation_id.clone()),
        }
    }
}

impl Default for TraceContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Span plus start time for one sync operation
pub struct TracedOperation {
    span: Span,
    start: Instant,
}

impl TracedOperation {
    /// Open a span for `operation` under `context`; `subject` names the
    /// entity acted on, if any
    pub fn with_context(
        operation: &'static str,
        subject: Option<&str>,
        context: &TraceContext,
    ) -> Self {
        let span = span!(
            Level::INFO,
            "operation",
            name = operation,
            subject = subject,
            correlation_id = %context.correlation_id,
            parent_id = ?context.parent_id
        );
        Self {
            span,
            start: Instant::now(),
        }
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn record_error(&self, error: &str) {
        tracing::warn!(parent: &self.span, error = error);
    }

    /// Close the operation, logging its outcome and duration
    pub fn complete(self, outcome: &str) {
        let duration = self.start.elapsed();
        tracing::debug!(
            parent: &self.span,
            outcome = outcome,
            duration_ms = duration.as_millis() as u64,
            "operation completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_context_child() {
        let ctx = TraceContext::new();
        assert!(ctx.parent_id.is_none());

        let child = ctx.child();
        assert_ne!(child.correlation_id, ctx.correlation_id);
        assert_eq!(
            child.parent_id.as_deref(),
            Some(ctx.correlation_id.as_str())
        );
    }

    #[test]
    fn test_traced_operation_lifecycle() {
        let ctx = TraceContext::new();
        let op = TracedOperation::with_context("get_assets", Some("0xabc"), &ctx.child());
        op.record_error("nothing");
        op.complete("ok");
    }
}
