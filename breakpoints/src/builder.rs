//! Builder for [`BreakpointHandler`].

use crate::{
    config::{ErrorPolicy, HandlerConfig},
    handler::BreakpointHandler,
};
use breakpoints_core::{BreakpointError, ChangeSource, DispatchError, Evaluator};

/// Builder for constructing a [`BreakpointHandler`] with its rules.
///
/// Rules are validated before the handler subscribes to its change source,
/// so a failed build leaves the source untouched.
///
/// # Example
///
/// ```rust
/// use breakpoints::{ErrorPolicy, HandlerBuilder};
/// use breakpoints_std::viewport::Viewport;
///
/// let viewport = Viewport::new(1280, 800);
/// let handler = HandlerBuilder::new()
///     .rule("small", "(max-width: 599px)")
///     .rule("medium", "(min-width: 600px) and (max-width: 959px)")
///     .rule("large", "(min-width: 960px)")
///     .error_policy(ErrorPolicy::FailFast)
///     .build(&viewport, viewport.clone())?;
///
/// assert_eq!(handler.rule_count(), 3);
/// assert!(handler.is_active("large")?);
/// # Ok::<(), breakpoints::BreakpointError>(())
/// ```
#[derive(Debug, Default)]
pub struct HandlerBuilder {
    rules: Vec<(String, String)>,
    config: HandlerConfig,
}

impl HandlerBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule.
    pub fn rule(mut self, name: impl Into<String>, query: impl Into<String>) -> Self {
        self.rules.push((name.into(), query.into()));
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: HandlerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the error policy.
    pub fn error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.config = self.config.with_error_policy(policy);
        self
    }

    /// Set the sink for errors of notification-driven passes.
    pub fn on_dispatch_error<F>(mut self, sink: F) -> Self
    where
        F: Fn(&DispatchError) + Send + Sync + 'static,
    {
        self.config = self.config.with_error_sink(sink);
        self
    }

    /// Get the number of rules added so far.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if no rules were added.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Build the handler and subscribe it to `source`.
    ///
    /// Fails with [`BreakpointError::DuplicateRule`] if two rules share a name.
    pub fn build<S, E>(self, source: &S, evaluator: E) -> Result<BreakpointHandler, BreakpointError>
    where
        S: ChangeSource + ?Sized,
        E: Evaluator,
    {
        for (index, (name, _)) in self.rules.iter().enumerate() {
            if self.rules[..index].iter().any(|(seen, _)| seen == name) {
                return Err(BreakpointError::duplicate_rule(name.as_str()));
            }
        }

        let handler = BreakpointHandler::with_config(source, evaluator, self.config);
        for (name, query) in self.rules {
            handler.append_rule(name, query)?;
        }
        Ok(handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use breakpoints_std::{
        source::ManualSource,
        testing::{CallCounter, ScriptedEvaluator},
    };
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    #[test]
    fn test_build_appends_rules_in_order() {
        let source = ManualSource::new();
        let builder = HandlerBuilder::new().rule("a", "qa").rule("b", "qb");
        assert_eq!(builder.len(), 2);

        let handler = builder.build(&source, ScriptedEvaluator::new()).unwrap();
        assert_eq!(handler.rule_names(), vec!["a", "b"]);
        assert_eq!(source.subscriber_count(), 1);
    }

    #[test]
    fn test_duplicate_rule_fails_before_subscribing() {
        let source = ManualSource::new();
        let err = HandlerBuilder::new()
            .rule("a", "q1")
            .rule("a", "q2")
            .build(&source, ScriptedEvaluator::new())
            .unwrap_err();

        assert!(matches!(err, BreakpointError::DuplicateRule { .. }));
        assert_eq!(source.subscriber_count(), 0);
    }

    #[test]
    fn test_dispatch_error_sink_receives_notification_failures() {
        let source = ManualSource::new();
        let evaluator = ScriptedEvaluator::new();
        evaluator.fail("broken");
        let reported = Arc::new(AtomicUsize::new(0));
        let counter = reported.clone();

        let handler = HandlerBuilder::new()
            .rule("broken", "broken")
            .on_dispatch_error(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .build(&source, evaluator)
            .unwrap();
        handler.register("broken", CallCounter::new().callback(), None).unwrap();

        source.notify();
        source.notify();
        assert_eq!(reported.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_empty_builder() {
        let builder = HandlerBuilder::new().error_policy(ErrorPolicy::FailFast);
        assert!(builder.is_empty());
        let handler = builder
            .build(&ManualSource::new(), ScriptedEvaluator::new())
            .unwrap();
        assert_eq!(handler.config().error_policy(), ErrorPolicy::FailFast);
        assert!(handler.handle().is_ok());
    }
}
