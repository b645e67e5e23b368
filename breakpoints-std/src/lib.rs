//! # breakpoints-std
//!
//! Standard implementations of the capabilities consumed by the breakpoints
//! registry.
//!
//! This crate provides:
//! - **Media queries**: a parser and evaluator for responsive media queries
//! - **Viewport**: a simulated environment that is both evaluator and change source
//! - **Change sources**: [`ManualSource`] and async stream bridges
//! - **Evaluators**: [`FnEvaluator`] for closures
//! - **Testing**: counters, recorders and scripted evaluators
//!
//! [`ManualSource`]: source::ManualSource
//! [`FnEvaluator`]: evaluator::FnEvaluator

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use breakpoints_core;

// Modules
pub mod evaluator;
pub mod media;
pub mod source;
pub mod testing;
pub mod viewport;
