//! # Predicate Evaluation
//!
//! A rule's predicate source (usually a media query) is opaque to the
//! registry. Whether it currently holds is answered by an [`Evaluator`],
//! which is injected when the registry is built.
//!
//! Evaluators must be side-effect free: asking twice without an intervening
//! environment change yields the same answer.

use crate::error::EvaluationError;
use std::sync::Arc;

/// The capability that decides whether a predicate source currently matches.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an `Evaluator`",
    label = "missing `Evaluator` implementation",
    note = "Evaluators must implement `matches` for a predicate source string."
)]
pub trait Evaluator: Send + Sync + 'static {
    /// Returns whether `query` matches the current environment.
    fn matches(&self, query: &str) -> Result<bool, EvaluationError>;
}

impl Evaluator for Arc<dyn Evaluator> {
    fn matches(&self, query: &str) -> Result<bool, EvaluationError> {
        (**self).matches(query)
    }
}

impl Evaluator for Box<dyn Evaluator> {
    fn matches(&self, query: &str) -> Result<bool, EvaluationError> {
        (**self).matches(query)
    }
}
