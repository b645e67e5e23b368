//! Error types for breakpoints.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`BreakpointError`] - Top-level error type for registry operations
//! - [`EvaluationError`] - Errors from the predicate evaluator
//! - [`ExecuteError`] - Errors from executing a single listener
//! - [`DispatchError`] - Errors from a full dispatch pass

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all registry operations.
#[derive(Error, Debug)]
pub enum BreakpointError {
    /// A rule with the same name is already registered.
    #[error("A rule with name \"{name}\" is already defined.")]
    DuplicateRule {
        /// The rejected rule name.
        name: String,
    },

    /// No rule with the requested name is registered.
    #[error("Rule with name \"{name}\" can not be found.")]
    RuleNotFound {
        /// The requested rule name.
        name: String,
    },

    /// Evaluating or executing a listener failed.
    #[error(transparent)]
    Execute(#[from] ExecuteError),

    /// A dispatch pass reported failures.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl BreakpointError {
    /// Create a duplicate rule error.
    pub fn duplicate_rule(name: impl Into<String>) -> Self {
        Self::DuplicateRule { name: name.into() }
    }

    /// Create a rule-not-found error.
    pub fn rule_not_found(name: impl Into<String>) -> Self {
        Self::RuleNotFound { name: name.into() }
    }
}

/// Errors raised by an [`Evaluator`](crate::Evaluator).
#[derive(Error, Debug)]
pub enum EvaluationError {
    /// The evaluation capability is not available in this environment.
    #[error("predicate evaluation is unavailable")]
    Unavailable,

    /// The predicate source could not be understood.
    #[error("invalid query \"{query}\": {reason}")]
    InvalidQuery {
        /// The offending predicate source.
        query: String,
        /// What went wrong.
        reason: String,
    },

    /// A custom evaluator error.
    #[error(transparent)]
    Custom(BoxError),
}

impl EvaluationError {
    /// Create an invalid query error.
    pub fn invalid_query(query: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidQuery {
            query: query.into(),
            reason: reason.into(),
        }
    }
}

impl From<BoxError> for EvaluationError {
    fn from(err: BoxError) -> Self {
        EvaluationError::Custom(err)
    }
}

/// Errors raised while executing one listener.
#[derive(Error, Debug)]
pub enum ExecuteError {
    /// The rule's predicate could not be evaluated.
    #[error("rule \"{rule}\" could not be evaluated")]
    Evaluation {
        /// Name of the rule being evaluated.
        rule: String,
        /// The evaluator failure.
        #[source]
        source: EvaluationError,
    },

    /// The invoked callback returned an error.
    #[error("callback for rule \"{rule}\" failed")]
    Callback {
        /// Name of the rule whose callback failed.
        rule: String,
        /// The callback failure.
        #[source]
        source: BoxError,
    },
}

impl ExecuteError {
    /// Name of the rule the failing listener is bound to.
    pub fn rule(&self) -> &str {
        match self {
            ExecuteError::Evaluation { rule, .. } | ExecuteError::Callback { rule, .. } => rule,
        }
    }
}

/// Errors reported by a dispatch pass.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// A listener failed and the remaining listeners of the pass were skipped.
    #[error("dispatch aborted, {skipped} listener(s) skipped")]
    Aborted {
        /// The failure that stopped the pass.
        #[source]
        source: ExecuteError,
        /// Number of listeners that did not run.
        skipped: usize,
    },

    /// One or more listeners failed; every other listener still ran.
    #[error("{count} listener(s) failed during dispatch", count = .failures.len())]
    Failed {
        /// Every failure of the pass, in dispatch order.
        failures: Vec<ExecuteError>,
    },
}

impl DispatchError {
    /// All listener failures carried by this error, in dispatch order.
    pub fn failures(&self) -> &[ExecuteError] {
        match self {
            DispatchError::Aborted { source, .. } => std::slice::from_ref(source),
            DispatchError::Failed { failures } => failures,
        }
    }
}
