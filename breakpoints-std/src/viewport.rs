//! A simulated viewport.
//!
//! [`Viewport`] is both capabilities a registry needs: it evaluates media
//! queries against its current size and media types, and it notifies its
//! subscribers whenever that state is changed through [`Viewport::resize`]
//! or [`Viewport::set_media`]. Use it in tests, or as the bridge for a host
//! whose window system reports sizes.

use crate::{
    media::{MediaQueryList, MediaState, MediaTypes},
    source::ManualSource,
};
use breakpoints_core::{ChangeCallback, ChangeSource, EvaluationError, Evaluator};
use std::sync::{Arc, PoisonError, RwLock};

/// Width and height of a viewport in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ViewportSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ViewportSize {
    /// Create a size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy)]
struct ViewportState {
    size: ViewportSize,
    media: MediaTypes,
}

/// A cloneable, thread-safe simulated viewport.
///
/// # Example
///
/// ```rust
/// use breakpoints_core::Evaluator;
/// use breakpoints_std::viewport::Viewport;
///
/// let viewport = Viewport::new(1280, 800);
/// assert!(!viewport.matches("(max-width: 599px)").unwrap());
///
/// viewport.resize(375, 667);
/// assert!(viewport.matches("(max-width: 599px)").unwrap());
/// ```
#[derive(Clone, Debug)]
pub struct Viewport {
    state: Arc<RwLock<ViewportState>>,
    source: ManualSource,
}

impl Viewport {
    /// A screen viewport of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            state: Arc::new(RwLock::new(ViewportState {
                size: ViewportSize::new(width, height),
                media: MediaTypes::default(),
            })),
            source: ManualSource::new(),
        }
    }

    /// Set the initial media types.
    pub fn with_media(self, media: MediaTypes) -> Self {
        self.write(|state| state.media = media);
        self
    }

    /// Current size.
    pub fn size(&self) -> ViewportSize {
        self.read().size
    }

    /// Current media types.
    pub fn media(&self) -> MediaTypes {
        self.read().media
    }

    /// Snapshot of the state media queries are evaluated against.
    pub fn media_state(&self) -> MediaState {
        let state = self.read();
        MediaState {
            width: f64::from(state.size.width),
            height: f64::from(state.size.height),
            media: state.media,
        }
    }

    /// Change the size and notify subscribers.
    pub fn resize(&self, width: u32, height: u32) {
        self.write(|state| state.size = ViewportSize::new(width, height));

        #[cfg(feature = "tracing")]
        tracing::debug!(width, height, "viewport resized");

        self.source.notify();
    }

    /// Change the presented media types and notify subscribers.
    pub fn set_media(&self, media: MediaTypes) {
        self.write(|state| state.media = media);

        #[cfg(feature = "tracing")]
        tracing::debug!(?media, "viewport media changed");

        self.source.notify();
    }

    /// Number of change subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.source.subscriber_count()
    }

    fn read(&self) -> ViewportState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self, update: impl FnOnce(&mut ViewportState)) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        update(&mut *state);
    }
}

impl Evaluator for Viewport {
    fn matches(&self, query: &str) -> Result<bool, EvaluationError> {
        let list = MediaQueryList::parse(query)
            .map_err(|err| EvaluationError::invalid_query(query, err.to_string()))?;
        Ok(list.matches(&self.media_state()))
    }
}

impl ChangeSource for Viewport {
    fn register(&self, callback: ChangeCallback) {
        self.source.register(callback);
    }
}
