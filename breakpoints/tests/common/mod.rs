#![allow(dead_code)]

use breakpoints::{
    BreakpointHandler, ErrorPolicy, HandlerConfig,
    source::ManualSource,
    testing::ScriptedEvaluator,
};

// ============================================================================
// Fixture
// ============================================================================

/// A registry wired to a manual change source and a scripted evaluator.
pub struct Fixture {
    pub handler: BreakpointHandler,
    pub source: ManualSource,
    pub evaluator: ScriptedEvaluator,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_policy(ErrorPolicy::default())
    }

    pub fn with_policy(policy: ErrorPolicy) -> Self {
        let source = ManualSource::new();
        let evaluator = ScriptedEvaluator::new();
        let handler = BreakpointHandler::with_config(
            &source,
            evaluator.clone(),
            HandlerConfig::new().with_error_policy(policy),
        );
        Self {
            handler,
            source,
            evaluator,
        }
    }

    /// Simulate an environment change.
    pub fn resize(&self) {
        self.source.notify();
    }
}

// ============================================================================
// Standard breakpoints
// ============================================================================

pub const SMALL: &str = "(max-width: 599px)";
pub const MEDIUM: &str = "(min-width: 600px) and (max-width: 959px)";
pub const LARGE: &str = "(min-width: 960px)";

pub fn append_standard_rules(handler: &BreakpointHandler) {
    handler
        .append_rule("small", SMALL)
        .unwrap()
        .append_rule("medium", MEDIUM)
        .unwrap()
        .append_rule("large", LARGE)
        .unwrap();
}
