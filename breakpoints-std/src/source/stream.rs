//! Async bridges from [`Stream`]s to change notifications.
//!
//! Hosts that deliver environment changes as a stream (resize events from a
//! window system, a channel fed by another task) can drive a change source
//! with these helpers. Each stream item produces exactly one notification;
//! dispatch itself stays synchronous.

use super::ManualSource;
use crate::viewport::{Viewport, ViewportSize};
use futures::{Stream, StreamExt, pin_mut};

impl ManualSource {
    /// Notify once for every item of `events`, until the stream ends.
    ///
    /// Returns the number of items consumed.
    pub async fn forward<S>(&self, events: S) -> usize
    where
        S: Stream,
    {
        pin_mut!(events);
        let mut consumed = 0;
        while events.next().await.is_some() {
            self.notify();
            consumed += 1;
        }
        consumed
    }
}

impl Viewport {
    /// Resize to every size yielded by `sizes`, until the stream ends.
    ///
    /// Returns the number of sizes applied.
    pub async fn follow<S>(&self, sizes: S) -> usize
    where
        S: Stream<Item = ViewportSize>,
    {
        pin_mut!(sizes);
        let mut applied = 0;
        while let Some(size) = sizes.next().await {
            self.resize(size.width, size.height);
            applied += 1;
        }
        applied
    }
}
