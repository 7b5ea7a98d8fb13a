//! Language switching and page event dispatch.
//!
//! [`LanguageCoordinator`] is the single owner of the page state. Every
//! language switch draws a generation token; only the attempt holding the
//! latest token may write to the page, so when calls overlap the one started
//! last always wins, whatever order the fetches finish in.

use crate::content::ContentBundle;
use crate::i18n::Language;
use crate::lock;
use crate::nav::{ClickTarget, NavState, ResponsiveNavController};
use crate::observer::{ObserverSettings, ViewportObserverManager};
use crate::page::Page;
use crate::preference::{LanguagePreference, SessionStore};
use crate::render::{RenderDefaults, SlotRenderer};
use crate::repository::{ContentRepository, ContentSource};
use crate::viewport::{Layout, NodeId, PageOutline};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Default brand logo shown once content has rendered.
pub const DEFAULT_BRAND_IMAGE_SRC: &str = "assets/img/qyj-logo.png";

#[derive(Debug, Clone, PartialEq)]
pub struct HydrationSettings {
    /// Language used for unsupported requests and as the one-step fallback
    pub fallback: Language,
    pub brand_image_src: String,
    pub observers: ObserverSettings,
    /// Copy used where a bundle leaves a field out
    pub render_defaults: RenderDefaults,
}

impl Default for HydrationSettings {
    fn default() -> Self {
        Self {
            fallback: Language::default_language(),
            brand_image_src: DEFAULT_BRAND_IMAGE_SRC.to_string(),
            observers: ObserverSettings::default(),
            render_defaults: RenderDefaults::default(),
        }
    }
}

/// Lifecycle of the page content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Loading,
    Rendered,
    FallingBack,
    Failed,
}

/// Result of one `set_language` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// Content for this language is on the page
    Rendered(Language),
    /// A later call took over before this one finished
    Superseded,
    /// Neither the requested language nor the fallback could be loaded
    Failed(Language),
}

/// Something that happened on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    Load,
    Scroll,
    Resize,
    OrientationChange,
    NavToggle,
    NavLinkClick,
    DocumentClick(ClickTarget),
    LanguageButton(String),
}

/// Serializable view of everything the coordinator owns.
#[derive(Debug, Clone, Serialize)]
pub struct PageSnapshot {
    pub phase: Phase,
    pub language: Option<Language>,
    pub nav: NavState,
    pub active_section: Option<String>,
    pub revealed: Vec<NodeId>,
    pub page: Page,
}

#[derive(Debug)]
struct ViewState {
    page: Page,
    observers: ViewportObserverManager,
    nav: ResponsiveNavController,
    phase: Phase,
    current: Option<Language>,
}

impl ViewState {
    fn sync_active_nav(&mut self) {
        let target = self.observers.active_target().map(str::to_string);
        self.page.slots.mark_active_nav(target.as_deref());
    }
}

/// Hides the loading indicator when a switch attempt ends, unless a newer
/// attempt has taken over the page.
struct LoadingGuard<'a> {
    generation: &'a AtomicU64,
    view: &'a Mutex<ViewState>,
    token: u64,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.generation.load(Ordering::SeqCst) == self.token {
            lock(self.view).page.set_loading(false);
        }
    }
}

pub struct LanguageCoordinator<S, K, L> {
    repository: ContentRepository<S>,
    preference: LanguagePreference<K>,
    renderer: SlotRenderer,
    layout: L,
    outline: PageOutline,
    settings: HydrationSettings,
    generation: AtomicU64,
    view: Mutex<ViewState>,
}

impl<S, K, L> LanguageCoordinator<S, K, L>
where
    S: ContentSource,
    K: SessionStore,
    L: Layout,
{
    pub fn new(
        repository: ContentRepository<S>,
        preference: LanguagePreference<K>,
        layout: L,
        outline: PageOutline,
        page: Page,
        settings: HydrationSettings,
    ) -> Self {
        let nav = ResponsiveNavController::new(layout.nav_toggle_visible());
        Self {
            repository,
            preference,
            renderer: SlotRenderer::new(settings.render_defaults.clone()),
            layout,
            outline,
            view: Mutex::new(ViewState {
                page,
                observers: ViewportObserverManager::new(settings.observers),
                nav,
                phase: Phase::Idle,
                current: None,
            }),
            settings,
            generation: AtomicU64::new(0),
        }
    }

    /// Load the persisted language, or the fallback when none is stored.
    pub async fn start(&self) -> SwitchOutcome {
        let initial = self.preference.load().unwrap_or(self.settings.fallback);
        info!("Starting with language {}", initial);
        self.set_language(initial.code()).await
    }

    /// Switch the page to `requested`.
    ///
    /// Unsupported codes resolve to the fallback language. If loading fails
    /// the fallback is tried once; if that fails too the page enters
    /// [`Phase::Failed`] and keeps whatever content it had.
    pub async fn set_language(&self, requested: &str) -> SwitchOutcome {
        let code = requested;
        let requested = Language::normalize_or(code, self.settings.fallback);
        if requested.code() != code {
            debug!("Unsupported language '{}', using {}", code, requested);
        }

        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut view = lock(&self.view);
            view.phase = Phase::Loading;
            view.page.set_loading(true);
            view.page.set_failure(false);
        }
        let _loading = LoadingGuard {
            generation: &self.generation,
            view: &self.view,
            token,
        };

        let mut target = requested;
        loop {
            let result = self.repository.get(target).await;

            if !self.is_latest(token) {
                debug!("Discarding {} content, a newer switch is in progress", target);
                return SwitchOutcome::Superseded;
            }

            match result {
                Ok(bundle) => {
                    self.commit(target, &bundle);
                    info!("Rendered content for {}", target);
                    return SwitchOutcome::Rendered(target);
                }
                Err(e) => {
                    error!("Failed to load content for {}: {}", target, e);
                    if target != self.settings.fallback {
                        warn!("Falling back to {}", self.settings.fallback);
                        lock(&self.view).phase = Phase::FallingBack;
                        target = self.settings.fallback;
                        continue;
                    }

                    let mut view = lock(&self.view);
                    view.phase = Phase::Failed;
                    view.page.set_failure(true);
                    return SwitchOutcome::Failed(requested);
                }
            }
        }
    }

    /// A language button was activated; clicks on the current language are
    /// ignored.
    pub async fn select_language(&self, code: &str) -> Option<SwitchOutcome> {
        if self.current_language().map(|lang| lang.code()) == Some(code) {
            debug!("{} is already active", code);
            return None;
        }
        Some(self.set_language(code).await)
    }

    /// Dispatch a page event. Only language buttons produce an outcome.
    pub async fn handle_event(&self, event: PageEvent) -> Option<SwitchOutcome> {
        match event {
            PageEvent::LanguageButton(code) => self.select_language(&code).await,
            other => {
                self.apply_event(other);
                None
            }
        }
    }

    fn apply_event(&self, event: PageEvent) {
        let mut view = lock(&self.view);
        match event {
            PageEvent::Load => {
                view.observers.reveal_visible(&self.layout);
            }
            PageEvent::Scroll => {
                view.observers.observe(&self.layout);
                view.sync_active_nav();
            }
            PageEvent::Resize => {
                view.nav.reconcile(self.layout.nav_toggle_visible());
                view.observers.observe(&self.layout);
                view.observers.reveal_visible(&self.layout);
                view.sync_active_nav();
            }
            PageEvent::OrientationChange => {
                view.nav.reconcile(self.layout.nav_toggle_visible());
            }
            PageEvent::NavToggle => view.nav.toggle(),
            PageEvent::NavLinkClick => view.nav.close(),
            PageEvent::DocumentClick(target) => view.nav.document_click(target),
            PageEvent::LanguageButton(_) => {}
        }
    }

    fn commit(&self, lang: Language, bundle: &ContentBundle) {
        let mut guard = lock(&self.view);
        let view = &mut *guard;

        let nav_links = self.renderer.render(bundle, lang, &mut view.page);
        view.page.update_brand_mark(&self.settings.brand_image_src);
        view.page.update_embeds(lang);
        view.page.highlight_language(lang);

        if let Err(e) = self.preference.save(lang) {
            warn!("Failed to persist language {}: {}", lang, e);
        }
        view.current = Some(lang);

        view.observers.arm(nav_links, &self.outline, &self.layout);
        view.sync_active_nav();
        view.nav.reconcile(self.layout.nav_toggle_visible());
        view.phase = Phase::Rendered;
    }

    /// Drop the observers; the page keeps its content.
    pub fn shutdown(&self) {
        lock(&self.view).observers.disarm();
        debug!("Observers released");
    }

    pub fn snapshot(&self) -> PageSnapshot {
        let view = lock(&self.view);
        PageSnapshot {
            phase: view.phase,
            language: view.current,
            nav: view.nav.state(),
            active_section: view.observers.active_target().map(str::to_string),
            revealed: view.observers.revealed().collect(),
            page: view.page.clone(),
        }
    }
}

impl<S, K, L> LanguageCoordinator<S, K, L> {
    fn is_latest(&self, token: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == token
    }

    pub fn phase(&self) -> Phase {
        lock(&self.view).phase
    }

    pub fn current_language(&self) -> Option<Language> {
        lock(&self.view).current
    }

    pub fn nav_state(&self) -> NavState {
        lock(&self.view).nav.state()
    }

    pub fn active_section(&self) -> Option<String> {
        lock(&self.view)
            .observers
            .active_target()
            .map(str::to_string)
    }

    pub fn is_revealed(&self, node: NodeId) -> bool {
        lock(&self.view).observers.is_revealed(node)
    }

    pub fn live_subscriptions(&self) -> usize {
        lock(&self.view).observers.live_subscriptions()
    }

    /// Run `f` against the current page.
    pub fn with_page<R>(&self, f: impl FnOnce(&Page) -> R) -> R {
        f(&lock(&self.view).page)
    }

    pub fn repository(&self) -> &ContentRepository<S> {
        &self.repository
    }

    pub fn preference(&self) -> &LanguagePreference<K> {
        &self.preference
    }

    pub fn layout(&self) -> &L {
        &self.layout
    }

    pub fn outline(&self) -> &PageOutline {
        &self.outline
    }

    pub fn settings(&self) -> &HydrationSettings {
        &self.settings
    }
}
