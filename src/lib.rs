//! Localized content hydration for a static page shell.
//!
//! A [`LanguageCoordinator`] loads a JSON content bundle per language through
//! a [`ContentRepository`], writes it into a headless [`Page`], persists the
//! choice in a [`SessionStore`], and keeps the scroll-reveal and
//! section-highlight observers and the responsive nav in sync.

pub mod config;
pub mod content;
pub mod coordinator;
pub mod error;
pub mod i18n;
pub mod metrics;
pub mod nav;
pub mod observer;
pub mod page;
pub mod preference;
pub mod render;
pub mod repository;
pub mod retry;
pub mod viewport;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use config::Config;
pub use content::ContentBundle;
pub use coordinator::{
    HydrationSettings, LanguageCoordinator, PageEvent, PageSnapshot, Phase, SwitchOutcome,
};
pub use error::{ContentError, StorageError};
pub use i18n::Language;
pub use metrics::{ContentMetrics, MetricsReport};
pub use nav::{ClickTarget, NavState, ResponsiveNavController};
pub use observer::{ObserverSettings, ViewportObserverManager};
pub use page::{NavLink, Page, SlotRegistry};
pub use preference::{FileSessionStore, LanguagePreference, MemorySessionStore, SessionStore};
pub use render::{RenderDefaults, SlotRenderer};
pub use repository::{
    ContentRepository, ContentSource, DirectoryContentSource, FetchResponse, HttpContentSource,
};
pub use viewport::{HeadlessViewport, Layout, NodeId, PageOutline};

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
