//! # Change Notification
//!
//! The registry does not watch the environment itself. It subscribes once to
//! a [`ChangeSource`], which calls back whenever the environment may have
//! changed. Cadence, debouncing and threading are the source's business.

/// The callback a registry hands to its change source.
pub type ChangeCallback = Box<dyn Fn() + Send + Sync + 'static>;

/// A source of "the environment may have changed" notifications.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `ChangeSource`",
    label = "missing `ChangeSource` implementation",
    note = "Change sources must implement `register` to accept a notification callback."
)]
pub trait ChangeSource {
    /// Arrange for `callback` to be invoked on every relevant change.
    ///
    /// Registrations are permanent.
    fn register(&self, callback: ChangeCallback);
}

impl<S: ChangeSource + ?Sized> ChangeSource for &S {
    fn register(&self, callback: ChangeCallback) {
        (**self).register(callback);
    }
}

impl<S: ChangeSource + ?Sized> ChangeSource for std::sync::Arc<S> {
    fn register(&self, callback: ChangeCallback) {
        (**self).register(callback);
    }
}
