//! Testing utilities for breakpoints.
//!
//! This module provides doubles for both sides of a registry: callbacks that
//! record how they were invoked, and an evaluator whose answers are scripted.
//!
//! # Features
//!
//! - [`CallCounter`]: A callback that counts its invocations
//! - [`OrderRecorder`]: Callbacks that record a label in invocation order
//! - [`ScriptedEvaluator`]: An evaluator with programmable per-query results
//! - [`failing_callback`]: A callback that always returns an error

use breakpoints_core::{Callback, EvaluationError, Evaluator};
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};

// ============================================================================
// Call Counter
// ============================================================================

/// A callback that counts how many times it was invoked.
///
/// Every call to [`CallCounter::callback`] returns the same identity, so the
/// callback can be passed to `register` and later to `unregister`.
///
/// # Example
///
/// ```rust
/// use breakpoints_std::testing::CallCounter;
///
/// let counter = CallCounter::new();
/// counter.callback().call().unwrap();
/// assert_eq!(counter.count(), 1);
/// ```
#[derive(Clone)]
pub struct CallCounter {
    count: Arc<AtomicUsize>,
    callback: Callback,
}

impl CallCounter {
    /// Create a new counter at zero.
    pub fn new() -> Self {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        Self {
            count,
            callback: Callback::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        }
    }

    /// The counting callback.
    pub fn callback(&self) -> Callback {
        self.callback.clone()
    }

    /// Get the current count.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Reset the counter.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }
}

impl Default for CallCounter {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Order Recorder
// ============================================================================

/// Produces callbacks that append a label to a shared log when invoked.
#[derive(Clone, Default)]
pub struct OrderRecorder {
    log: Arc<Mutex<Vec<String>>>,
}

impl OrderRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// A callback recording `label`.
    pub fn callback(&self, label: impl Into<String>) -> Callback {
        let log = self.log.clone();
        let label = label.into();
        Callback::new(move || {
            log.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(label.clone());
        })
    }

    /// Labels recorded so far, in invocation order.
    pub fn entries(&self) -> Vec<String> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Clear the log.
    pub fn clear(&self) {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

// ============================================================================
// Failing Callback
// ============================================================================

/// A callback that always fails with `message`.
pub fn failing_callback(message: impl Into<String>) -> Callback {
    let message = message.into();
    Callback::new(move || Err::<(), _>(message.clone()))
}

// ============================================================================
// Scripted Evaluator
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum Script {
    Match(bool),
    Fail,
}

/// An evaluator whose answer per query is set by the test.
///
/// Unscripted queries evaluate to `false`. Every evaluation is counted, which
/// makes it possible to check that nothing caches results.
///
/// # Example
///
/// ```rust
/// use breakpoints_core::Evaluator;
/// use breakpoints_std::testing::ScriptedEvaluator;
///
/// let evaluator = ScriptedEvaluator::new();
/// evaluator.set("(max-width: 599px)", true);
///
/// assert!(evaluator.matches("(max-width: 599px)").unwrap());
/// assert!(!evaluator.matches("print").unwrap());
/// assert_eq!(evaluator.evaluations(), 2);
/// ```
#[derive(Clone, Default)]
pub struct ScriptedEvaluator {
    scripts: Arc<Mutex<HashMap<String, Script>>>,
    evaluations: Arc<AtomicUsize>,
}

impl ScriptedEvaluator {
    /// Create an evaluator where every query is `false`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `query` evaluate to `value`.
    pub fn set(&self, query: impl Into<String>, value: bool) {
        self.script(query.into(), Script::Match(value));
    }

    /// Make `query` fail with [`EvaluationError::Unavailable`].
    pub fn fail(&self, query: impl Into<String>) {
        self.script(query.into(), Script::Fail);
    }

    /// Number of evaluations performed so far.
    pub fn evaluations(&self) -> usize {
        self.evaluations.load(Ordering::SeqCst)
    }

    fn script(&self, query: String, script: Script) {
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(query, script);
    }
}

impl Evaluator for ScriptedEvaluator {
    fn matches(&self, query: &str) -> Result<bool, EvaluationError> {
        self.evaluations.fetch_add(1, Ordering::SeqCst);
        let script = self
            .scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(query)
            .copied();
        match script {
            Some(Script::Match(value)) => Ok(value),
            Some(Script::Fail) => Err(EvaluationError::Unavailable),
            None => Ok(false),
        }
    }
}
