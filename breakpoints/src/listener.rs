//! # Listeners
//!
//! A [`Listener`] binds one [`Rule`] to two callbacks: one for when the rule
//! holds and one for when it does not. Executing a listener evaluates the rule
//! and fires exactly one of them.
//!
//! Listeners keep no memory of previous results. Every execution evaluates
//! the rule afresh, so the same callback can fire on consecutive passes.
//!
//! Listeners are created by the registry
//! ([`BreakpointHandler::listener`](crate::BreakpointHandler::listener)) and
//! shared as `Arc<Listener>`; their callbacks can be replaced at any time.

use crate::rule::Rule;
use breakpoints_core::{Callback, ExecuteError};
use std::{
    fmt,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

/// Identity of a [`Listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        ListenerId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw numeric value of this id.
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Default)]
struct Callbacks {
    on_true: Callback,
    on_false: Callback,
}

/// A rule bound to a success and a failure callback.
pub struct Listener {
    id: ListenerId,
    rule: Arc<Rule>,
    callbacks: Mutex<Callbacks>,
}

impl Listener {
    pub(crate) fn new(
        rule: Arc<Rule>,
        on_true: impl Into<Option<Callback>>,
        on_false: impl Into<Option<Callback>>,
    ) -> Self {
        let listener = Self {
            id: ListenerId::next(),
            rule,
            callbacks: Mutex::new(Callbacks::default()),
        };
        listener.success(on_true).failed(on_false);
        listener
    }

    /// Identity of this listener.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// The rule this listener is bound to.
    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    /// Name of the bound rule.
    pub fn rule_name(&self) -> &str {
        self.rule.name()
    }

    /// Replace the callback fired when the rule holds.
    ///
    /// `None` resets it to the no-op callback.
    pub fn success(&self, callback: impl Into<Option<Callback>>) -> &Self {
        self.lock().on_true = callback.into().unwrap_or_default();
        self
    }

    /// Replace the callback fired when the rule does not hold.
    ///
    /// `None` resets it to the no-op callback.
    pub fn failed(&self, callback: impl Into<Option<Callback>>) -> &Self {
        self.lock().on_false = callback.into().unwrap_or_default();
        self
    }

    /// The current success callback.
    pub fn on_true(&self) -> Callback {
        self.lock().on_true.clone()
    }

    /// The current failure callback.
    pub fn on_false(&self) -> Callback {
        self.lock().on_false.clone()
    }

    /// Whether this listener is bound to `rule_name` with exactly these callbacks.
    pub fn matches(&self, rule_name: &str, on_true: &Callback, on_false: &Callback) -> bool {
        let callbacks = self.lock();
        self.rule.name() == rule_name
            && callbacks.on_true == *on_true
            && callbacks.on_false == *on_false
    }

    /// Evaluate the rule and fire the matching callback.
    ///
    /// Exactly one callback fires per call. Evaluation and callback errors
    /// are returned to the caller.
    pub fn execute(&self) -> Result<(), ExecuteError> {
        let valid = self
            .rule
            .is_valid()
            .map_err(|source| ExecuteError::Evaluation {
                rule: self.rule.name().to_string(),
                source,
            })?;

        let callback = {
            let callbacks = self.lock();
            if valid {
                callbacks.on_true.clone()
            } else {
                callbacks.on_false.clone()
            }
        };

        callback.call().map_err(|source| ExecuteError::Callback {
            rule: self.rule.name().to_string(),
            source,
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Callbacks> {
        self.callbacks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let callbacks = self.lock();
        f.debug_struct("Listener")
            .field("id", &self.id)
            .field("rule", &self.rule.name())
            .field("on_true", &callbacks.on_true)
            .field("on_false", &callbacks.on_false)
            .finish()
    }
}
