//! Closure-backed evaluator.

use breakpoints_core::{EvaluationError, Evaluator};

/// An evaluator that delegates to a closure.
///
/// # Example
///
/// ```rust
/// use breakpoints_core::Evaluator;
/// use breakpoints_std::evaluator::FnEvaluator;
///
/// let dark = FnEvaluator::new(|query| Ok(query == "(prefers-color-scheme: dark)"));
/// assert!(dark.matches("(prefers-color-scheme: dark)").unwrap());
/// ```
pub struct FnEvaluator<F> {
    func: F,
}

impl<F> FnEvaluator<F>
where
    F: Fn(&str) -> Result<bool, EvaluationError> + Send + Sync + 'static,
{
    /// Create a new closure evaluator.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> Evaluator for FnEvaluator<F>
where
    F: Fn(&str) -> Result<bool, EvaluationError> + Send + Sync + 'static,
{
    fn matches(&self, query: &str) -> Result<bool, EvaluationError> {
        (self.func)(query)
    }
}
