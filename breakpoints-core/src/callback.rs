//! # Callback Identity
//!
//! Listener callbacks are zero-argument closures wrapped in a [`Callback`].
//! Closures cannot be compared, so each `Callback` carries a [`CallbackId`]
//! allocated when it is created. Clones share the id, which is what lets
//! `unregister` find the exact listener a callback was registered with.
//!
//! The no-op callback uses a reserved id: every `Callback::noop()` compares
//! equal to every other.

use crate::error::BoxError;
use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

/// The result produced by invoking a [`Callback`].
pub type CallbackResult = Result<(), BoxError>;

/// Trait for converting a callback's return value into a [`CallbackResult`].
///
/// # Default Implementations
///
/// - `()` → success
/// - `Result<(), E>` → success or the boxed error
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be returned from a breakpoint callback",
    label = "return `()` or `Result<(), E>` from the callback",
    note = "Callback closures must return a type implementing `IntoCallbackResult`."
)]
pub trait IntoCallbackResult {
    /// Convert the output into a callback result.
    fn into_callback_result(self) -> CallbackResult;
}

impl IntoCallbackResult for () {
    fn into_callback_result(self) -> CallbackResult {
        Ok(())
    }
}

impl<E> IntoCallbackResult for Result<(), E>
where
    E: Into<BoxError>,
{
    fn into_callback_result(self) -> CallbackResult {
        self.map_err(Into::into)
    }
}

/// Identity of a [`Callback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallbackId(u64);

impl CallbackId {
    /// The identity shared by every no-op callback.
    pub const NOOP: CallbackId = CallbackId(0);

    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        CallbackId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw numeric value of this id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CallbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cb#{}", self.0)
    }
}

type CallbackFn = dyn Fn() -> CallbackResult + Send + Sync + 'static;

/// A shareable zero-argument callback with a stable identity.
///
/// # Example
///
/// ```rust
/// use breakpoints_core::Callback;
///
/// let on_small = Callback::new(|| println!("small layout"));
/// let same = on_small.clone();
///
/// assert_eq!(on_small, same);
/// assert_ne!(on_small, Callback::new(|| println!("small layout")));
/// ```
#[derive(Clone)]
pub struct Callback {
    id: CallbackId,
    func: Arc<CallbackFn>,
}

impl Callback {
    /// Wrap a closure, assigning it a fresh identity.
    pub fn new<F, R>(func: F) -> Self
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: IntoCallbackResult,
    {
        Self {
            id: CallbackId::next(),
            func: Arc::new(move || func().into_callback_result()),
        }
    }

    /// The callback that does nothing.
    pub fn noop() -> Self {
        Self {
            id: CallbackId::NOOP,
            func: Arc::new(|| Ok(())),
        }
    }

    /// Identity of this callback.
    pub fn id(&self) -> CallbackId {
        self.id
    }

    /// Whether this is the no-op callback.
    pub fn is_noop(&self) -> bool {
        self.id == CallbackId::NOOP
    }

    /// Invoke the callback.
    pub fn call(&self) -> CallbackResult {
        (self.func)()
    }
}

impl Default for Callback {
    fn default() -> Self {
        Self::noop()
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Callback {}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback").field("id", &self.id).finish()
    }
}
