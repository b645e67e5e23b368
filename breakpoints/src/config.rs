//! Registry configuration.

use breakpoints_core::DispatchError;
use std::{fmt, sync::Arc};

/// What a dispatch pass does when a listener fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Keep running the remaining listeners and report every failure at the
    /// end of the pass as [`DispatchError::Failed`].
    #[default]
    Isolate,
    /// Stop at the first failure and report it as [`DispatchError::Aborted`].
    FailFast,
}

/// Receives errors from passes triggered by the change source.
///
/// Those passes have no caller to return an error to.
pub type DispatchErrorSink = Arc<dyn Fn(&DispatchError) + Send + Sync + 'static>;

/// Configuration for a [`BreakpointHandler`](crate::BreakpointHandler).
///
/// # Example
///
/// ```rust
/// use breakpoints::{ErrorPolicy, HandlerConfig};
///
/// let config = HandlerConfig::new()
///     .with_error_policy(ErrorPolicy::FailFast)
///     .with_error_sink(|err| eprintln!("breakpoint dispatch failed: {err}"));
///
/// assert_eq!(config.error_policy(), ErrorPolicy::FailFast);
/// ```
#[derive(Clone, Default)]
pub struct HandlerConfig {
    error_policy: ErrorPolicy,
    error_sink: Option<DispatchErrorSink>,
}

impl HandlerConfig {
    /// Default configuration: isolate failures, no error sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the error policy.
    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    /// Set the sink for errors of notification-driven passes.
    pub fn with_error_sink<F>(mut self, sink: F) -> Self
    where
        F: Fn(&DispatchError) + Send + Sync + 'static,
    {
        self.error_sink = Some(Arc::new(sink));
        self
    }

    /// The configured error policy.
    pub fn error_policy(&self) -> ErrorPolicy {
        self.error_policy
    }

    pub(crate) fn report(&self, err: &DispatchError) {
        #[cfg(feature = "tracing")]
        tracing::warn!(error = %err, failures = err.failures().len(), "breakpoint dispatch failed");

        if let Some(sink) = &self.error_sink {
            sink(err);
        }
    }
}

impl fmt::Debug for HandlerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerConfig")
            .field("error_policy", &self.error_policy)
            .field("error_sink", &self.error_sink.is_some())
            .finish()
    }
}
