//! # breakpoints - Named Responsive Rules with Change-Driven Dispatch
//!
//! `breakpoints` lets an application name its responsive breakpoints (each a
//! media-query-like predicate) and attach callbacks that run when a
//! breakpoint holds or does not hold. Every time the environment reports a
//! change, every listener is evaluated afresh and exactly one of its two
//! callbacks fires.
//!
//! ## Quick Start
//!
//! ```rust
//! use breakpoints::{BreakpointHandler, Callback};
//! use breakpoints::viewport::Viewport;
//!
//! let viewport = Viewport::new(1280, 800);
//! let handler = BreakpointHandler::new(&viewport, viewport.clone());
//!
//! let compact = Callback::new(|| println!("compact"));
//! handler
//!     .append_rule("small", "(max-width: 599px)")?
//!     .register("small", compact.clone(), None)?;
//!
//! viewport.resize(375, 667); // prints "compact"
//!
//! handler.unregister("small", compact, None);
//! # Ok::<(), breakpoints::BreakpointError>(())
//! ```
//!
//! ## Capabilities
//!
//! The registry consumes two injected capabilities from `breakpoints-core`:
//! an [`Evaluator`] deciding whether a query matches and a [`ChangeSource`]
//! announcing environment changes. `breakpoints-std` provides standard
//! implementations, re-exported here as [`viewport`], [`source`], [`media`]
//! and [`testing`].

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod builder;
mod config;
mod handler;
mod listener;
mod rule;

pub use breakpoints_core::{
    // Error types
    BoxError,
    BreakpointError,
    // Callbacks
    Callback,
    CallbackId,
    CallbackResult,
    // Capabilities
    ChangeCallback,
    ChangeSource,
    DispatchError,
    EvaluationError,
    Evaluator,
    ExecuteError,
    IntoCallbackResult,
};

pub use builder::HandlerBuilder;
pub use config::{DispatchErrorSink, ErrorPolicy, HandlerConfig};
pub use handler::{BreakpointHandler, WeakBreakpointHandler};
pub use listener::{Listener, ListenerId};
pub use rule::Rule;

/// Media query parsing and evaluation.
pub mod media {
    pub use breakpoints_std::media::{
        MediaQuery, MediaQueryList, MediaState, MediaTypes, Orientation, ParseError,
    };
}

/// Simulated viewport.
pub mod viewport {
    pub use breakpoints_std::viewport::{Viewport, ViewportSize};
}

/// Standard change sources and evaluators.
pub mod source {
    pub use breakpoints_std::{evaluator::FnEvaluator, source::ManualSource};
}

/// Testing utilities.
pub mod testing {
    pub use breakpoints_std::testing::{
        CallCounter, OrderRecorder, ScriptedEvaluator, failing_callback,
    };
}

/// Prelude module - common imports for breakpoints.
///
/// # Usage
///
/// ```rust,ignore
/// use breakpoints::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        BreakpointError, BreakpointHandler, Callback, ChangeSource, DispatchError, ErrorPolicy,
        Evaluator, HandlerBuilder, HandlerConfig, Listener, Rule, WeakBreakpointHandler,
    };
}
