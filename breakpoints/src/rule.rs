//! Named breakpoint rules.

use breakpoints_core::{EvaluationError, Evaluator};
use std::{fmt, sync::Arc};

/// A named predicate over the ambient environment.
///
/// The predicate source is opaque here; [`Rule::is_valid`] hands it to the
/// registry's evaluator on every call. Nothing is cached, so the answer
/// always reflects the environment at the time of the call.
pub struct Rule {
    name: String,
    query: String,
    evaluator: Arc<dyn Evaluator>,
}

impl Rule {
    pub(crate) fn new(
        name: impl Into<String>,
        query: impl Into<String>,
        evaluator: Arc<dyn Evaluator>,
    ) -> Self {
        Self {
            name: name.into(),
            query: query.into(),
            evaluator,
        }
    }

    /// The unique name of this rule.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The predicate source, e.g. `(max-width: 599px)`.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Whether the predicate currently holds.
    pub fn is_valid(&self) -> Result<bool, EvaluationError> {
        self.evaluator.matches(&self.query)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}
