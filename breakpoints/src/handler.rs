//! # Breakpoint Registry
//!
//! [`BreakpointHandler`] owns the rules (unique by name, in insertion order)
//! and the listeners (in registration order, which is also dispatch order).
//! It subscribes once to a [`ChangeSource`] and re-dispatches every listener
//! on each notification.
//!
//! # Dispatch
//!
//! A pass takes a snapshot of the listener list and releases the registry
//! lock before running any listener. Callbacks may therefore call back into
//! the registry: listeners added during a pass first run on the next pass,
//! and listeners removed during a pass still run in the current one.
//!
//! Failures are handled according to the configured [`ErrorPolicy`].
//!
//! # Example
//!
//! ```rust
//! use breakpoints::{BreakpointHandler, Callback};
//! use breakpoints_std::viewport::Viewport;
//!
//! let viewport = Viewport::new(1280, 800);
//! let handler = BreakpointHandler::new(&viewport, viewport.clone());
//!
//! handler
//!     .append_rule("small", "(max-width: 599px)")?
//!     .register(
//!         "small",
//!         Callback::new(|| println!("switch to compact layout")),
//!         Callback::new(|| println!("switch to full layout")),
//!     )?;
//!
//! // Resizing notifies the handler, which dispatches every listener.
//! viewport.resize(375, 667);
//! # Ok::<(), breakpoints::BreakpointError>(())
//! ```

use crate::{
    config::{ErrorPolicy, HandlerConfig},
    listener::Listener,
    rule::Rule,
};
use breakpoints_core::{
    BreakpointError, Callback, ChangeSource, DispatchError, Evaluator, ExecuteError,
};
use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
};

#[derive(Default)]
struct State {
    rules: Vec<Arc<Rule>>,
    listeners: Vec<Arc<Listener>>,
}

struct Inner {
    state: Mutex<State>,
    evaluator: Arc<dyn Evaluator>,
    config: HandlerConfig,
}

/// The registry of breakpoint rules and their listeners.
///
/// Cloning is cheap and every clone refers to the same registry.
///
/// Callbacks that need to reach back into the registry should capture a
/// [`WeakBreakpointHandler`] from [`downgrade`](Self::downgrade). A strong
/// handle stored in a callback keeps the registry alive, and subscribed,
/// after every other handle is dropped.
#[derive(Clone)]
pub struct BreakpointHandler {
    inner: Arc<Inner>,
}

impl BreakpointHandler {
    /// Create a registry with the default configuration and subscribe it to
    /// `source`.
    pub fn new<S, E>(source: &S, evaluator: E) -> Self
    where
        S: ChangeSource + ?Sized,
        E: Evaluator,
    {
        Self::with_config(source, evaluator, HandlerConfig::default())
    }

    /// Create a registry with `config` and subscribe it to `source`.
    ///
    /// The subscription only holds a weak reference: once every handle is
    /// dropped, notifications from `source` do nothing.
    pub fn with_config<S, E>(source: &S, evaluator: E, config: HandlerConfig) -> Self
    where
        S: ChangeSource + ?Sized,
        E: Evaluator,
    {
        let handler = Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::default()),
                evaluator: Arc::new(evaluator),
                config,
            }),
        };

        let weak = handler.downgrade();
        source.register(Box::new(move || {
            if let Some(handler) = weak.upgrade() {
                handler.handle_notification();
            }
        }));

        handler
    }

    /// A handle that does not keep the registry alive.
    pub fn downgrade(&self) -> WeakBreakpointHandler {
        WeakBreakpointHandler {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &HandlerConfig {
        &self.inner.config
    }

    // ------------------------------------------------------------------
    // Rules
    // ------------------------------------------------------------------

    /// Append a rule named `name` evaluating `query`.
    ///
    /// Fails with [`BreakpointError::DuplicateRule`] if the name is taken;
    /// the registry is left unchanged in that case.
    pub fn append_rule(
        &self,
        name: impl Into<String>,
        query: impl Into<String>,
    ) -> Result<&Self, BreakpointError> {
        let name = name.into();
        let mut state = self.state();
        if state.rules.iter().any(|rule| rule.name() == name) {
            return Err(BreakpointError::DuplicateRule { name });
        }

        let rule = Rule::new(name, query, Arc::clone(&self.inner.evaluator));

        #[cfg(feature = "tracing")]
        tracing::debug!(rule = rule.name(), query = rule.query(), "rule appended");

        state.rules.push(Arc::new(rule));
        Ok(self)
    }

    /// Remove the rule named `name` together with every listener bound to it.
    ///
    /// Does nothing if no such rule exists.
    pub fn remove_rule(&self, name: &str) -> &Self {
        let mut state = self.state();
        let rules_before = state.rules.len();
        let listeners_before = state.listeners.len();

        state.rules.retain(|rule| rule.name() != name);
        state.listeners.retain(|listener| listener.rule_name() != name);

        #[cfg(feature = "tracing")]
        {
            if state.rules.len() != rules_before {
                tracing::debug!(
                    rule = name,
                    listeners = listeners_before - state.listeners.len(),
                    "rule removed"
                );
            }
        }
        #[cfg(not(feature = "tracing"))]
        let _ = (rules_before, listeners_before);

        self
    }

    /// Whether a rule named `name` exists.
    pub fn has_rule(&self, name: &str) -> bool {
        self.find_rule(name).is_some()
    }

    /// The rule named `name`, if any.
    pub fn rule(&self, name: &str) -> Option<Arc<Rule>> {
        self.find_rule(name)
    }

    /// Names of all rules, in insertion order.
    pub fn rule_names(&self) -> Vec<String> {
        self.state()
            .rules
            .iter()
            .map(|rule| rule.name().to_string())
            .collect()
    }

    /// Number of rules.
    pub fn rule_count(&self) -> usize {
        self.state().rules.len()
    }

    /// Evaluate the rule named `name` right now.
    pub fn is_active(&self, name: &str) -> Result<bool, BreakpointError> {
        let rule = self
            .find_rule(name)
            .ok_or_else(|| BreakpointError::rule_not_found(name))?;
        rule.is_valid().map_err(|source| {
            BreakpointError::from(ExecuteError::Evaluation {
                rule: name.to_string(),
                source,
            })
        })
    }

    // ------------------------------------------------------------------
    // Listeners
    // ------------------------------------------------------------------

    /// Create a listener for the rule named `rule_name` with no-op callbacks.
    ///
    /// The listener is registered immediately; configure it with
    /// [`Listener::success`] and [`Listener::failed`]. Fails with
    /// [`BreakpointError::RuleNotFound`] if the rule does not exist.
    pub fn listener(&self, rule_name: &str) -> Result<Arc<Listener>, BreakpointError> {
        let mut state = self.state();
        let rule = state
            .rules
            .iter()
            .find(|rule| rule.name() == rule_name)
            .cloned()
            .ok_or_else(|| BreakpointError::rule_not_found(rule_name))?;

        let listener = Arc::new(Listener::new(rule, None, None));

        #[cfg(feature = "tracing")]
        tracing::debug!(rule = rule_name, listener = listener.id().get(), "listener registered");

        state.listeners.push(Arc::clone(&listener));
        Ok(listener)
    }

    /// Register `on_true` / `on_false` for the rule named `rule_name`.
    ///
    /// `None` stands for the no-op callback. Fails with
    /// [`BreakpointError::RuleNotFound`] if the rule does not exist.
    pub fn register(
        &self,
        rule_name: &str,
        on_true: impl Into<Option<Callback>>,
        on_false: impl Into<Option<Callback>>,
    ) -> Result<&Self, BreakpointError> {
        self.listener(rule_name)?.success(on_true).failed(on_false);
        Ok(self)
    }

    /// Remove every listener bound to `rule_name` with exactly these
    /// callbacks.
    ///
    /// Callbacks are matched by identity; `None` stands for the no-op
    /// callback. Does nothing if no listener matches.
    pub fn unregister(
        &self,
        rule_name: &str,
        on_true: impl Into<Option<Callback>>,
        on_false: impl Into<Option<Callback>>,
    ) -> &Self {
        let on_true = on_true.into().unwrap_or_default();
        let on_false = on_false.into().unwrap_or_default();

        let mut state = self.state();
        state
            .listeners
            .retain(|listener| !listener.matches(rule_name, &on_true, &on_false));
        self
    }

    /// Remove one specific listener. Returns whether it was registered.
    pub fn remove_listener(&self, listener: &Listener) -> bool {
        let mut state = self.state();
        let before = state.listeners.len();
        state.listeners.retain(|l| l.id() != listener.id());
        state.listeners.len() != before
    }

    /// All listeners, in dispatch order.
    pub fn listeners(&self) -> Vec<Arc<Listener>> {
        self.state().listeners.clone()
    }

    /// Listeners bound to the rule named `rule_name`, in dispatch order.
    pub fn listeners_for(&self, rule_name: &str) -> Vec<Arc<Listener>> {
        self.state()
            .listeners
            .iter()
            .filter(|listener| listener.rule_name() == rule_name)
            .cloned()
            .collect()
    }

    /// Number of listeners.
    pub fn listener_count(&self) -> usize {
        self.state().listeners.len()
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Execute every listener once, in registration order.
    pub fn handle(&self) -> Result<&Self, DispatchError> {
        let listeners = self.listeners();

        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("breakpoint_dispatch", listeners = listeners.len()).entered();

        let mut failures = Vec::new();
        for (index, listener) in listeners.iter().enumerate() {
            let Err(err) = listener.execute() else {
                continue;
            };

            #[cfg(feature = "tracing")]
            tracing::warn!(rule = listener.rule_name(), error = %err, "listener failed");

            match self.inner.config.error_policy() {
                ErrorPolicy::FailFast => {
                    return Err(DispatchError::Aborted {
                        source: err,
                        skipped: listeners.len() - index - 1,
                    });
                }
                ErrorPolicy::Isolate => failures.push(err),
            }
        }

        if failures.is_empty() {
            Ok(self)
        } else {
            Err(DispatchError::Failed { failures })
        }
    }

    fn handle_notification(&self) {
        if let Err(err) = self.handle() {
            self.inner.config.report(&err);
        }
    }

    fn find_rule(&self, name: &str) -> Option<Arc<Rule>> {
        self.state()
            .rules
            .iter()
            .find(|rule| rule.name() == name)
            .cloned()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// A non-owning handle to a [`BreakpointHandler`].
///
/// # Example
///
/// ```rust
/// use breakpoints::{BreakpointHandler, Callback};
/// use breakpoints_std::viewport::Viewport;
///
/// let viewport = Viewport::new(1280, 800);
/// let handler = BreakpointHandler::new(&viewport, viewport.clone());
/// handler.append_rule("small", "(max-width: 599px)")?;
///
/// let weak = handler.downgrade();
/// handler.register(
///     "small",
///     Callback::new(move || {
///         if let Some(handler) = weak.upgrade() {
///             handler.remove_rule("small");
///         }
///     }),
///     None,
/// )?;
///
/// viewport.resize(375, 667);
/// assert!(!handler.has_rule("small"));
/// # Ok::<(), breakpoints::BreakpointError>(())
/// ```
#[derive(Clone)]
pub struct WeakBreakpointHandler {
    inner: Weak<Inner>,
}

impl WeakBreakpointHandler {
    /// The registry, if any strong handle is still alive.
    pub fn upgrade(&self) -> Option<BreakpointHandler> {
        self.inner.upgrade().map(|inner| BreakpointHandler { inner })
    }
}

impl fmt::Debug for WeakBreakpointHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakBreakpointHandler")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl fmt::Debug for BreakpointHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("BreakpointHandler")
            .field("rules", &state.rules)
            .field("listeners", &state.listeners.len())
            .field("config", &self.inner.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use breakpoints_std::{
        source::ManualSource,
        testing::{CallCounter, OrderRecorder, ScriptedEvaluator, failing_callback},
    };

    fn handler() -> (BreakpointHandler, ManualSource, ScriptedEvaluator) {
        let source = ManualSource::new();
        let evaluator = ScriptedEvaluator::new();
        let handler = BreakpointHandler::new(&source, evaluator.clone());
        (handler, source, evaluator)
    }

    #[test]
    fn test_subscribes_exactly_once() {
        let (_handler, source, _) = handler();
        assert_eq!(source.subscriber_count(), 1);
    }

    #[test]
    fn test_append_rule_preserves_order() {
        let (handler, _, _) = handler();
        handler
            .append_rule("small", "(max-width: 599px)")
            .unwrap()
            .append_rule("medium", "(min-width: 600px)")
            .unwrap();

        assert_eq!(handler.rule_names(), vec!["small", "medium"]);
        assert_eq!(handler.rule("medium").unwrap().query(), "(min-width: 600px)");
        assert!(handler.rule("large").is_none());
    }

    #[test]
    fn test_duplicate_rule_leaves_rules_unchanged() {
        let (handler, _, _) = handler();
        handler.append_rule("a", "q1").unwrap();

        let err = handler.append_rule("a", "q2").unwrap_err();
        assert!(matches!(err, BreakpointError::DuplicateRule { ref name } if name == "a"));
        assert_eq!(handler.rule_count(), 1);
        assert_eq!(handler.rule("a").unwrap().query(), "q1");
    }

    #[test]
    fn test_rule_names_are_case_sensitive() {
        let (handler, _, _) = handler();
        handler.append_rule("small", "q").unwrap();
        assert!(handler.append_rule("Small", "q").is_ok());
        assert_eq!(handler.rule_count(), 2);
    }

    #[test]
    fn test_remove_rule_cascades_to_listeners() {
        let (handler, _, _) = handler();
        handler.append_rule("a", "qa").unwrap();
        handler.append_rule("b", "qb").unwrap();
        let first_b = handler.listener("b").unwrap();
        handler.listener("a").unwrap();
        let second_b = handler.listener("b").unwrap();
        handler.listener("a").unwrap();

        handler.remove_rule("a");

        assert!(!handler.has_rule("a"));
        assert!(handler.listeners_for("a").is_empty());
        let remaining: Vec<_> = handler.listeners().iter().map(|l| l.id()).collect();
        assert_eq!(remaining, vec![first_b.id(), second_b.id()]);
    }

    #[test]
    fn test_remove_missing_rule_is_noop() {
        let (handler, _, _) = handler();
        handler.append_rule("a", "qa").unwrap();
        handler.listener("a").unwrap();

        handler.remove_rule("missing");
        assert_eq!(handler.rule_count(), 1);
        assert_eq!(handler.listener_count(), 1);
    }

    #[test]
    fn test_listener_for_missing_rule() {
        let (handler, _, _) = handler();
        let err = handler.listener("missing").unwrap_err();
        assert!(matches!(err, BreakpointError::RuleNotFound { ref name } if name == "missing"));
        assert_eq!(handler.listener_count(), 0);
    }

    #[test]
    fn test_register_and_listener_are_independent() {
        let (handler, _, evaluator) = handler();
        handler.append_rule("small", "q").unwrap();
        evaluator.set("q", true);

        let (a, b, c) = (CallCounter::new(), CallCounter::new(), CallCounter::new());
        handler.register("small", a.callback(), b.callback()).unwrap();
        let second = handler.listener("small").unwrap();
        second.success(c.callback());

        assert_eq!(handler.listener_count(), 2);
        handler.handle().unwrap();
        assert_eq!((a.count(), b.count(), c.count()), (1, 0, 1));
    }

    #[test]
    fn test_unregister_requires_exact_match() {
        let (handler, _, _) = handler();
        handler.append_rule("small", "q").unwrap();
        handler.append_rule("large", "q").unwrap();
        let (a, b, other) = (CallCounter::new(), CallCounter::new(), CallCounter::new());

        handler.register("small", a.callback(), b.callback()).unwrap();
        handler.register("small", other.callback(), b.callback()).unwrap();
        handler.register("large", a.callback(), b.callback()).unwrap();

        handler.unregister("small", a.callback(), b.callback());

        let remaining: Vec<_> = handler
            .listeners()
            .iter()
            .map(|l| (l.rule_name().to_string(), l.on_true()))
            .collect();
        assert_eq!(
            remaining,
            vec![
                ("small".to_string(), other.callback()),
                ("large".to_string(), a.callback()),
            ]
        );
    }

    #[test]
    fn test_unregister_defaults_to_noop_identity() {
        let (handler, _, _) = handler();
        handler.append_rule("small", "q").unwrap();
        let a = CallCounter::new();
        handler.listener("small").unwrap();
        handler.register("small", a.callback(), None).unwrap();

        handler.unregister("small", None, None);
        assert_eq!(handler.listener_count(), 1);

        handler.unregister("small", a.callback(), None);
        assert_eq!(handler.listener_count(), 0);
    }

    #[test]
    fn test_unregister_without_match_is_noop() {
        let (handler, _, _) = handler();
        handler.append_rule("small", "q").unwrap();
        handler.register("small", CallCounter::new().callback(), None).unwrap();

        handler.unregister("small", CallCounter::new().callback(), None);
        handler.unregister("missing", None, None);
        assert_eq!(handler.listener_count(), 1);
    }

    #[test]
    fn test_remove_listener() {
        let (handler, _, _) = handler();
        handler.append_rule("small", "q").unwrap();
        let listener = handler.listener("small").unwrap();

        assert!(handler.remove_listener(&listener));
        assert!(!handler.remove_listener(&listener));
        assert_eq!(handler.listener_count(), 0);
    }

    #[test]
    fn test_handle_runs_in_registration_order() {
        let (handler, _, evaluator) = handler();
        handler.append_rule("a", "qa").unwrap();
        handler.append_rule("b", "qb").unwrap();
        evaluator.set("qb", true);
        let recorder = OrderRecorder::new();

        handler
            .register("b", recorder.callback("b+"), recorder.callback("b-"))
            .unwrap()
            .register("a", recorder.callback("a+"), recorder.callback("a-"))
            .unwrap()
            .register("b", recorder.callback("b2+"), None)
            .unwrap();

        handler.handle().unwrap();
        assert_eq!(recorder.entries(), vec!["b+", "a-", "b2+"]);
    }

    #[test]
    fn test_notification_triggers_dispatch() {
        let (handler, source, evaluator) = handler();
        handler.append_rule("small", "q").unwrap();
        let (yes, no) = (CallCounter::new(), CallCounter::new());
        handler.register("small", yes.callback(), no.callback()).unwrap();

        source.notify();
        evaluator.set("q", true);
        source.notify();
        source.notify();

        assert_eq!((yes.count(), no.count()), (2, 1));
    }

    #[test]
    fn test_dropped_handler_ignores_notifications() {
        let (handler, source, evaluator) = handler();
        handler.append_rule("small", "q").unwrap();
        handler.register("small", CallCounter::new().callback(), None).unwrap();
        drop(handler);

        source.notify();
        assert_eq!(evaluator.evaluations(), 0);
    }

    #[test]
    fn test_isolate_policy_runs_every_listener() {
        let (handler, _, evaluator) = handler();
        handler.append_rule("ok", "ok").unwrap();
        handler.append_rule("broken", "broken").unwrap();
        evaluator.fail("broken");
        let after = CallCounter::new();

        handler
            .register("ok", None, failing_callback("first"))
            .unwrap()
            .register("broken", None, None)
            .unwrap()
            .register("ok", None, after.callback())
            .unwrap();

        let err = handler.handle().unwrap_err();
        assert_eq!(after.count(), 1);
        match err {
            DispatchError::Failed { failures } => {
                assert_eq!(failures.len(), 2);
                assert!(matches!(failures[0], ExecuteError::Callback { .. }));
                assert!(matches!(failures[1], ExecuteError::Evaluation { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(handler.listener_count(), 3);
    }

    #[test]
    fn test_fail_fast_policy_skips_remaining() {
        let source = ManualSource::new();
        let config = HandlerConfig::new().with_error_policy(ErrorPolicy::FailFast);
        let handler = BreakpointHandler::with_config(&source, ScriptedEvaluator::new(), config);
        handler.append_rule("small", "q").unwrap();
        let (before, after) = (CallCounter::new(), CallCounter::new());

        handler
            .register("small", None, before.callback())
            .unwrap()
            .register("small", None, failing_callback("stop"))
            .unwrap()
            .register("small", None, after.callback())
            .unwrap()
            .register("small", None, after.callback())
            .unwrap();

        match handler.handle() {
            Err(DispatchError::Aborted { source, skipped }) => {
                assert_eq!(skipped, 2);
                assert_eq!(source.rule(), "small");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!((before.count(), after.count()), (1, 0));
    }

    #[test]
    fn test_is_active() {
        let (handler, _, evaluator) = handler();
        handler.append_rule("small", "q").unwrap();
        handler.append_rule("broken", "broken").unwrap();
        evaluator.set("q", true);
        evaluator.fail("broken");

        assert!(handler.is_active("small").unwrap());
        assert!(matches!(
            handler.is_active("missing"),
            Err(BreakpointError::RuleNotFound { .. })
        ));
        assert!(matches!(
            handler.is_active("broken"),
            Err(BreakpointError::Execute(ExecuteError::Evaluation { .. }))
        ));
    }

    #[test]
    fn test_debug_lists_rules() {
        let (handler, _, _) = handler();
        handler.append_rule("small", "(max-width: 599px)").unwrap();
        let debug = format!("{handler:?}");
        assert!(debug.contains("small"));
        assert!(debug.contains("listeners: 0"));
    }

    #[test]
    fn test_weak_handle_in_callback_allows_drop() {
        let (handler, source, evaluator) = handler();
        handler.append_rule("small", "q").unwrap();
        let fired = CallCounter::new();

        let weak = handler.downgrade();
        let counter = fired.callback();
        handler
            .register(
                "small",
                None,
                Callback::new(move || {
                    if let Some(handler) = weak.upgrade() {
                        assert!(handler.has_rule("small"));
                    }
                    counter.call()
                }),
            )
            .unwrap();

        source.notify();
        assert_eq!(fired.count(), 1);

        let weak = handler.downgrade();
        drop(handler);
        assert!(weak.upgrade().is_none());

        source.notify();
        source.notify();
        assert_eq!(fired.count(), 1);
        assert_eq!(evaluator.evaluations(), 1);
    }
}
