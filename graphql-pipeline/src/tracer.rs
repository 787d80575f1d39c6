//! Phase spans.
//!
//! The pipeline asks a [`Tracer`] for a span around each phase, and only does so
//! when the caller supplied a [`Context`]. Spans end when their [`SpanGuard`] is
//! dropped, which covers every exit path of a phase.

use std::fmt;
use std::time::Instant;

use tracing::Span;

use crate::Context;

pub const PARSING_SPAN_NAME: &str = "GraphQL Parsing";
pub const VALIDATION_SPAN_NAME: &str = "GraphQL Validation";
pub const EXECUTION_SPAN_NAME: &str = "GraphQL Execution";

/// Records named spans tied to a request context.
pub trait Tracer: Send + Sync + fmt::Debug {
    fn start_span(&self, context: &Context, name: &'static str) -> SpanGuard;
}

/// A span that has been started and not finished yet.
pub trait ActiveSpan: Send {
    /// Ends the span.
    fn finish(self: Box<Self>);

    /// The `tracing` span backing this span, if any, so phase work can be recorded under it.
    fn tracing_span(&self) -> Option<&Span> {
        None
    }
}

/// Ends the wrapped span when dropped.
#[must_use = "the span ends as soon as the guard is dropped"]
pub struct SpanGuard {
    span: Option<Box<dyn ActiveSpan>>,
}

impl SpanGuard {
    pub fn new(span: impl ActiveSpan + 'static) -> Self {
        Self {
            span: Some(Box::new(span)),
        }
    }

    /// A guard that records nothing.
    pub fn noop() -> Self {
        Self { span: None }
    }

    /// Runs `f` inside the backing `tracing` span when there is one.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        match self.span.as_ref().and_then(|span| span.tracing_span()) {
            Some(span) => span.in_scope(f),
            None => f(),
        }
    }

    /// The backing `tracing` span, or a disabled span.
    pub fn tracing_span(&self) -> Span {
        self.span
            .as_ref()
            .and_then(|span| span.tracing_span())
            .cloned()
            .unwrap_or_else(Span::none)
    }

    /// Ends the span now instead of at the end of the scope.
    pub fn finish(self) {
        drop(self)
    }
}

impl Drop for SpanGuard {
    fn drop(&mut self) {
        if let Some(span) = self.span.take() {
            span.finish();
        }
    }
}

impl fmt::Debug for SpanGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpanGuard")
            .field("active", &self.span.is_some())
            .finish()
    }
}

/// Records nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTracer;

impl Tracer for NoopTracer {
    fn start_span(&self, _context: &Context, _name: &'static str) -> SpanGuard {
        SpanGuard::noop()
    }
}

/// Records phases as `tracing` spans.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingTracer;

impl Tracer for TracingTracer {
    fn start_span(&self, _context: &Context, name: &'static str) -> SpanGuard {
        let span = tracing::info_span!(
            "graphql_phase",
            "otel.name" = name,
            "otel.kind" = "INTERNAL",
        );
        SpanGuard::new(PhaseSpan {
            name,
            span,
            started_at: Instant::now(),
        })
    }
}

struct PhaseSpan {
    name: &'static str,
    span: Span,
    started_at: Instant,
}

impl ActiveSpan for PhaseSpan {
    fn finish(self: Box<Self>) {
        let elapsed = self.started_at.elapsed();
        self.span.in_scope(|| {
            tracing::debug!(
                phase = self.name,
                duration_ms = elapsed.as_secs_f64() * 1000.0,
                "phase finished"
            );
        });
    }

    fn tracing_span(&self) -> Option<&Span> {
        Some(&self.span)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;

    struct Recorded(Arc<Mutex<Vec<String>>>, &'static str);

    impl ActiveSpan for Recorded {
        fn finish(self: Box<Self>) {
            self.0.lock().push(format!("finish {}", self.1));
        }
    }

    #[test]
    fn guard_finishes_on_drop_and_on_early_return() {
        let events = Arc::new(Mutex::new(Vec::new()));

        fn phase(events: &Arc<Mutex<Vec<String>>>, fail: bool) -> Result<(), ()> {
            let _guard = SpanGuard::new(Recorded(events.clone(), "phase"));
            if fail {
                return Err(());
            }
            events.lock().push("work".to_string());
            Ok(())
        }

        assert!(phase(&events, true).is_err());
        assert!(phase(&events, false).is_ok());
        assert_eq!(
            *events.lock(),
            vec!["finish phase", "work", "finish phase"]
        );
    }

    #[test]
    fn noop_guard_runs_closure() {
        let guard = NoopTracer.start_span(&Context::new(), PARSING_SPAN_NAME);
        assert_eq!(guard.in_scope(|| 42), 42);
        assert!(guard.tracing_span().is_none());
    }

    #[tracing_test::traced_test]
    #[test]
    fn tracing_tracer_logs_phase_end() {
        let guard = TracingTracer.start_span(&Context::new(), VALIDATION_SPAN_NAME);
        guard.finish();
        assert!(logs_contain("phase finished"));
        assert!(logs_contain(VALIDATION_SPAN_NAME));
    }
}
