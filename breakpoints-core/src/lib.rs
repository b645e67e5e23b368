//! # breakpoints-core
//!
//! Core traits for the breakpoints responsive rule registry.
//!
//! This crate has minimal dependencies and is meant to be imported by
//! integrations (window systems, terminal hosts, test environments) that only
//! need to provide one of the two capabilities the registry consumes.
//!
//! # Capabilities
//!
//! - [`Evaluator`] - answers whether a predicate source (e.g. a media query)
//!   currently matches
//! - [`ChangeSource`] - notifies that the environment may have changed
//!
//! # Callbacks
//!
//! [`Callback`] wraps a zero-argument closure with a stable [`CallbackId`] so
//! that registrations can later be matched by identity.
//!
//! # Error Types
//!
//! - [`BreakpointError`] - Top-level error type
//! - [`EvaluationError`] - Evaluator failures
//! - [`ExecuteError`] - Single listener failures
//! - [`DispatchError`] - Dispatch pass failures

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod callback;
mod error;
mod evaluator;
mod source;

// Re-exports
pub use callback::{Callback, CallbackId, CallbackResult, IntoCallbackResult};
pub use error::{BoxError, BreakpointError, DispatchError, EvaluationError, ExecuteError};
pub use evaluator::Evaluator;
pub use source::{ChangeCallback, ChangeSource};
