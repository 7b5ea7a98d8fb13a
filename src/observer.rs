//! Viewport observers: scroll reveal and active-section highlighting.
//!
//! Both observers are armed against a snapshot of the page taken at arm time
//! and are replaced wholesale on every re-arm. Each one holds a
//! [`Subscription`] that is released when the observer is dropped, so the
//! manager can never leak an old subscription across language switches.

use crate::page::NavLink;
use crate::viewport::{Layout, NodeId, PageOutline};
use std::collections::{BTreeSet, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Visibility thresholds, as fractions of each element's height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverSettings {
    pub reveal_threshold: f64,
    pub highlight_threshold: f64,
}

impl Default for ObserverSettings {
    fn default() -> Self {
        Self {
            reveal_threshold: 0.25,
            highlight_threshold: 0.6,
        }
    }
}

/// Live observation registered with the viewport; released on drop.
#[derive(Debug)]
struct Subscription {
    live: Arc<AtomicUsize>,
}

impl Subscription {
    fn acquire(live: &Arc<AtomicUsize>) -> Self {
        live.fetch_add(1, Ordering::SeqCst);
        Self {
            live: Arc::clone(live),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// One-shot reveal of animatable nodes.
#[derive(Debug)]
struct RevealObserver {
    _subscription: Subscription,
    threshold: f64,
    targets: Vec<NodeId>,
}

/// Tracks which identified sections are in view.
#[derive(Debug)]
struct HighlightObserver {
    _subscription: Subscription,
    threshold: f64,
    sections: Vec<(NodeId, String)>,
    intersecting: HashSet<NodeId>,
}

/// Owns the observer set and the nav links it highlights.
#[derive(Debug)]
pub struct ViewportObserverManager {
    settings: ObserverSettings,
    live: Arc<AtomicUsize>,
    reveal: Option<RevealObserver>,
    highlight: Option<HighlightObserver>,
    animatables: Vec<NodeId>,
    revealed: BTreeSet<NodeId>,
    nav_links: Vec<NavLink>,
}

impl ViewportObserverManager {
    pub fn new(settings: ObserverSettings) -> Self {
        Self {
            settings,
            live: Arc::new(AtomicUsize::new(0)),
            reveal: None,
            highlight: None,
            animatables: Vec::new(),
            revealed: BTreeSet::new(),
            nav_links: Vec::new(),
        }
    }

    /// Tear down the current observers and arm fresh ones.
    ///
    /// Runs an initial observation pass and then reveals every animatable
    /// node already overlapping the viewport.
    pub fn arm<L: Layout + ?Sized>(
        &mut self,
        nav_links: Vec<NavLink>,
        outline: &PageOutline,
        layout: &L,
    ) {
        self.disarm();

        self.nav_links = nav_links
            .into_iter()
            .map(|link| NavLink {
                active: false,
                ..link
            })
            .collect();
        self.animatables = outline.animatables.clone();

        if layout.prefers_reduced_motion() {
            debug!("Reduced motion preferred, revealing all animated nodes");
            self.revealed.extend(self.animatables.iter().copied());
        } else {
            let targets: Vec<NodeId> = self
                .animatables
                .iter()
                .copied()
                .filter(|node| !self.revealed.contains(node))
                .collect();
            self.reveal = Some(RevealObserver {
                _subscription: Subscription::acquire(&self.live),
                threshold: self.settings.reveal_threshold,
                targets,
            });
        }

        let sections: Vec<(NodeId, String)> = outline
            .identified_sections()
            .map(|(node, id)| (node, id.to_string()))
            .collect();
        if !sections.is_empty() && !self.nav_links.is_empty() {
            self.highlight = Some(HighlightObserver {
                _subscription: Subscription::acquire(&self.live),
                threshold: self.settings.highlight_threshold,
                sections,
                intersecting: HashSet::new(),
            });
        }

        debug!(
            "Armed observers: reveal={}, highlight={}, links={}",
            self.reveal.is_some(),
            self.highlight.is_some(),
            self.nav_links.len()
        );

        self.observe(layout);
        self.reveal_visible(layout);
    }

    /// Drop both observers. Revealed marks and nav links are kept.
    pub fn disarm(&mut self) {
        self.reveal = None;
        self.highlight = None;
    }

    /// Process one frame of viewport changes (a scroll or layout shift).
    pub fn observe<L: Layout + ?Sized>(&mut self, layout: &L) {
        if let Some(reveal) = self.reveal.as_mut() {
            let threshold = reveal.threshold;
            let revealed = &mut self.revealed;
            reveal.targets.retain(|node| {
                if crosses(layout.intersection_ratio(*node), threshold) {
                    revealed.insert(*node);
                    false
                } else {
                    true
                }
            });
        }

        let mut entered = None;
        if let Some(highlight) = self.highlight.as_mut() {
            for (node, id) in &highlight.sections {
                let now = crosses(layout.intersection_ratio(*node), highlight.threshold);
                let before = highlight.intersecting.contains(node);
                if now && !before {
                    highlight.intersecting.insert(*node);
                    entered = Some(format!("#{}", id));
                } else if !now && before {
                    highlight.intersecting.remove(node);
                }
            }
        }

        if let Some(target) = entered {
            self.activate(&target);
        }
    }

    /// Reveal every animatable node that overlaps the viewport right now.
    pub fn reveal_visible<L: Layout + ?Sized>(&mut self, layout: &L) {
        let height = layout.viewport_height();
        for node in &self.animatables {
            let on_screen = layout
                .rect(*node)
                .map(|rect| rect.overlaps_viewport(height))
                .unwrap_or(false);
            if on_screen {
                self.revealed.insert(*node);
            }
        }
        if let Some(reveal) = self.reveal.as_mut() {
            let revealed = &self.revealed;
            reveal.targets.retain(|node| !revealed.contains(node));
        }
    }

    fn activate(&mut self, target: &str) {
        debug!("Section {} entered view", target);
        for link in &mut self.nav_links {
            link.active = link.target == target;
        }
    }

    pub fn is_revealed(&self, node: NodeId) -> bool {
        self.revealed.contains(&node)
    }

    pub fn revealed(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.revealed.iter().copied()
    }

    pub fn nav_links(&self) -> &[NavLink] {
        &self.nav_links
    }

    /// Target of the active nav link, if any.
    pub fn active_target(&self) -> Option<&str> {
        self.nav_links
            .iter()
            .find(|link| link.active)
            .map(|link| link.target.as_str())
    }

    pub fn is_armed(&self) -> bool {
        self.reveal.is_some() || self.highlight.is_some()
    }

    /// Number of subscriptions currently registered with the viewport.
    pub fn live_subscriptions(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Nodes the reveal observer is still watching.
    pub fn pending_reveals(&self) -> usize {
        self.reveal.as_ref().map(|r| r.targets.len()).unwrap_or(0)
    }
}

/// A node counts as intersecting only while some part of it is on screen,
/// so a zero threshold means "any overlap".
fn crosses(ratio: f64, threshold: f64) -> bool {
    ratio > 0.0 && ratio >= threshold
}

impl Default for ViewportObserverManager {
    fn default() -> Self {
        Self::new(ObserverSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::HeadlessViewport;
    use proptest::prelude::*;

    const SECTION_HEIGHT: f64 = 1000.0;

    /// hero, pillars, story stacked 1000px apart in an 800px viewport.
    fn fixture() -> (PageOutline, HeadlessViewport) {
        let mut outline = PageOutline::new();
        outline.add_section(Some("hero"), true);
        outline.add_section(Some("pillars"), true);
        outline.add_section(Some("story"), true);
        let viewport = HeadlessViewport::stacked(1280.0, 800.0, &outline, SECTION_HEIGHT);
        (outline, viewport)
    }

    fn links() -> Vec<NavLink> {
        vec![
            NavLink::new("Home", "#hero"),
            NavLink::new("Pillars", "#pillars"),
            NavLink::new("Story", "#story"),
        ]
    }

    // ==================== Arm Tests ====================

    #[test]
    fn test_arm_reveals_nodes_already_on_screen() {
        let (outline, viewport) = fixture();
        let mut manager = ViewportObserverManager::default();

        manager.arm(links(), &outline, &viewport);

        assert!(manager.is_revealed(outline.section("hero").unwrap()));
        assert!(!manager.is_revealed(outline.section("pillars").unwrap()));
        assert_eq!(manager.pending_reveals(), 2);
    }

    #[test]
    fn test_rearm_releases_previous_subscriptions() {
        let (outline, viewport) = fixture();
        let mut manager = ViewportObserverManager::default();

        manager.arm(links(), &outline, &viewport);
        assert_eq!(manager.live_subscriptions(), 2);
        manager.arm(links(), &outline, &viewport);
        manager.arm(links(), &outline, &viewport);
        assert_eq!(manager.live_subscriptions(), 2);

        manager.disarm();
        assert_eq!(manager.live_subscriptions(), 0);
        assert!(!manager.is_armed());
    }

    #[test]
    fn test_highlight_not_armed_without_links() {
        let (outline, viewport) = fixture();
        let mut manager = ViewportObserverManager::default();

        manager.arm(Vec::new(), &outline, &viewport);

        assert_eq!(manager.live_subscriptions(), 1);
        assert_eq!(manager.active_target(), None);
    }

    #[test]
    fn test_highlight_not_armed_without_identified_sections() {
        let mut outline = PageOutline::new();
        outline.add_section(None, true);
        let viewport = HeadlessViewport::stacked(1280.0, 800.0, &outline, SECTION_HEIGHT);
        let mut manager = ViewportObserverManager::default();

        manager.arm(links(), &outline, &viewport);

        assert_eq!(manager.live_subscriptions(), 1);
    }

    #[test]
    fn test_reduced_motion_reveals_everything_without_observing() {
        let (outline, _) = fixture();
        let viewport = HeadlessViewport::stacked(1280.0, 800.0, &outline, SECTION_HEIGHT)
            .with_reduced_motion(true);
        let mut manager = ViewportObserverManager::default();

        manager.arm(links(), &outline, &viewport);

        assert!(outline.animatables.iter().all(|n| manager.is_revealed(*n)));
        assert_eq!(manager.pending_reveals(), 0);
        // Only the highlight observer is live
        assert_eq!(manager.live_subscriptions(), 1);
    }

    // ==================== Reveal Tests ====================

    #[test]
    fn test_reveal_requires_threshold() {
        let (outline, viewport) = fixture();
        let pillars = outline.section("pillars").unwrap();
        let mut manager = ViewportObserverManager::default();
        viewport.scroll_to(300.0);
        manager.arm(links(), &outline, &viewport);
        // reveal_visible catches any overlap, so pillars is already revealed
        assert!(manager.is_revealed(pillars));

        let story = outline.section("story").unwrap();
        // story starts at 2000; at scroll 1300 it overlaps 100px (10%)
        viewport.scroll_to(1300.0);
        manager.observe(&viewport);
        assert!(!manager.is_revealed(story));

        // at scroll 1500 it overlaps 300px (30%)
        viewport.scroll_to(1500.0);
        manager.observe(&viewport);
        assert!(manager.is_revealed(story));
        assert_eq!(manager.pending_reveals(), 0);
    }

    #[test]
    fn test_zero_threshold_ignores_offscreen_nodes() {
        let (outline, viewport) = fixture();
        let mut manager = ViewportObserverManager::new(ObserverSettings {
            reveal_threshold: 0.0,
            highlight_threshold: 0.0,
        });

        manager.arm(links(), &outline, &viewport);

        assert!(manager.is_revealed(outline.section("hero").unwrap()));
        assert!(!manager.is_revealed(outline.section("story").unwrap()));
        assert_eq!(manager.active_target(), Some("#hero"));

        // a single pixel of overlap is enough
        viewport.scroll_to(1201.0);
        manager.observe(&viewport);
        assert!(manager.is_revealed(outline.section("story").unwrap()));
        assert_eq!(manager.active_target(), Some("#story"));
    }

    proptest! {
        #[test]
        fn prop_reveal_is_monotonic(scrolls in proptest::collection::vec(0.0f64..3000.0, 1..20)) {
            let (outline, viewport) = fixture();
            let mut manager = ViewportObserverManager::default();
            manager.arm(links(), &outline, &viewport);

            let mut seen: BTreeSet<NodeId> = manager.revealed().collect();
            for y in scrolls {
                viewport.scroll_to(y);
                manager.observe(&viewport);
                let now: BTreeSet<NodeId> = manager.revealed().collect();
                prop_assert!(seen.is_subset(&now));
                seen = now;
            }
        }
    }

    #[test]
    fn test_revealed_marks_survive_rearm() {
        let (outline, viewport) = fixture();
        let hero = outline.section("hero").unwrap();
        let mut manager = ViewportObserverManager::default();
        manager.arm(links(), &outline, &viewport);
        assert!(manager.is_revealed(hero));

        viewport.scroll_to(2200.0);
        manager.arm(links(), &outline, &viewport);

        assert!(manager.is_revealed(hero));
    }

    // ==================== Highlight Tests ====================

    #[test]
    fn test_section_in_view_activates_matching_link_only() {
        let (outline, viewport) = fixture();
        let mut manager = ViewportObserverManager::default();
        manager.arm(links(), &outline, &viewport);
        assert_eq!(manager.active_target(), Some("#hero"));

        // pillars occupies 1000..2000; scroll 1100 puts 700px (70%) on screen
        viewport.scroll_to(1100.0);
        manager.observe(&viewport);

        let active: Vec<_> = manager
            .nav_links()
            .iter()
            .filter(|l| l.active)
            .map(|l| l.target.as_str())
            .collect();
        assert_eq!(active, vec!["#pillars"]);
    }

    #[test]
    fn test_highlight_below_threshold_keeps_previous() {
        let (outline, viewport) = fixture();
        let mut manager = ViewportObserverManager::default();
        manager.arm(links(), &outline, &viewport);

        // hero drops to 50% and pillars reaches 30%: nothing newly crosses 60%
        viewport.scroll_to(500.0);
        manager.observe(&viewport);

        assert_eq!(manager.active_target(), Some("#hero"));
    }

    #[test]
    fn test_section_reentering_view_reactivates() {
        let (outline, viewport) = fixture();
        let mut manager = ViewportObserverManager::default();
        manager.arm(links(), &outline, &viewport);

        viewport.scroll_to(1100.0);
        manager.observe(&viewport);
        assert_eq!(manager.active_target(), Some("#pillars"));

        viewport.scroll_to(0.0);
        manager.observe(&viewport);
        assert_eq!(manager.active_target(), Some("#hero"));
    }

    #[test]
    fn test_rearm_resets_links_to_inactive_then_reapplies() {
        let (outline, viewport) = fixture();
        let mut manager = ViewportObserverManager::default();
        viewport.scroll_to(1100.0);

        let mut stale = links();
        stale[0].active = true;
        manager.arm(stale, &outline, &viewport);

        assert_eq!(manager.active_target(), Some("#pillars"));
        assert_eq!(manager.nav_links().iter().filter(|l| l.active).count(), 1);
    }
}
