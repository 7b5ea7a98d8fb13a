//! Headless page model.
//!
//! The page shell is represented by a fixed [`SlotRegistry`] of anchors the
//! renderer writes into, the document metadata, and a handful of chrome
//! elements (brand mark, localized embeds, language buttons, status
//! indicators). Nothing here fetches or decides; it only records what the
//! core wrote so a front end (or a test) can apply or inspect it.

use crate::i18n::Language;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Stable slot identifiers of the page shell.
pub mod slots {
    pub const BRAND_NAME: &str = "brandName";
    pub const NAV_TOGGLE_LABEL: &str = "navToggleLabel";
    pub const NAV_TOGGLE: &str = "navToggle";
    pub const HEADER_CTA: &str = "headerCta";
    pub const NAV_LIST: &str = "navList";

    pub const HERO_EYEBROW: &str = "hero.eyebrow";
    pub const HERO_TITLE: &str = "hero.title";
    pub const HERO_SUBTITLE: &str = "hero.subtitle";
    pub const HERO_PRIMARY_CTA: &str = "hero.primaryCta";
    pub const HERO_SECONDARY_CTA: &str = "hero.secondaryCta";
    pub const HERO_HIGHLIGHTS: &str = "hero.highlights";

    pub const PILLARS_EYEBROW: &str = "pillars.eyebrow";
    pub const PILLARS_TITLE: &str = "pillars.title";
    pub const PILLARS_SUBTITLE: &str = "pillars.subtitle";
    pub const PILLARS_ITEMS: &str = "pillars.items";

    pub const STORY_TITLE: &str = "story.title";
    pub const STORY_PARAGRAPHS: &str = "story.paragraphs";
    pub const STORY_BLOCKQUOTE: &str = "story.blockquote";

    pub const CHAPTERS_EYEBROW: &str = "chapters.eyebrow";
    pub const CHAPTERS_TITLE: &str = "chapters.title";
    pub const CHAPTERS_SUBTITLE: &str = "chapters.subtitle";
    pub const CHAPTERS_PARTS: &str = "chapters.parts";

    pub const CTA_TITLE: &str = "cta.title";
    pub const CTA_SUBTITLE: &str = "cta.subtitle";
    pub const CTA_PRIMARY: &str = "cta.primary";
    pub const CTA_SECONDARY: &str = "cta.secondary";

    pub const FOOTER_COPYRIGHT: &str = "footer.copyright";
    pub const FOOTER_LINKS: &str = "footer.links";

    pub const ALL: &[&str] = &[
        BRAND_NAME,
        NAV_TOGGLE_LABEL,
        NAV_TOGGLE,
        HEADER_CTA,
        NAV_LIST,
        HERO_EYEBROW,
        HERO_TITLE,
        HERO_SUBTITLE,
        HERO_PRIMARY_CTA,
        HERO_SECONDARY_CTA,
        HERO_HIGHLIGHTS,
        PILLARS_EYEBROW,
        PILLARS_TITLE,
        PILLARS_SUBTITLE,
        PILLARS_ITEMS,
        STORY_TITLE,
        STORY_PARAGRAPHS,
        STORY_BLOCKQUOTE,
        CHAPTERS_EYEBROW,
        CHAPTERS_TITLE,
        CHAPTERS_SUBTITLE,
        CHAPTERS_PARTS,
        CTA_TITLE,
        CTA_SUBTITLE,
        CTA_PRIMARY,
        CTA_SECONDARY,
        FOOTER_COPYRIGHT,
        FOOTER_LINKS,
    ];
}

/// Class toggled on the nav link of the section currently in view.
pub const ACTIVE_CLASS: &str = "is-active";

// ==================== Elements ====================

/// A generated element inside a slot (nav items, cards, links).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Element {
    pub tag: &'static str,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub class: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<&'static str, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            ..Self::default()
        }
    }

    pub fn class(mut self, class: &str) -> Self {
        self.class = class.to_string();
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.insert(name, value.into());
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class.split_whitespace().any(|c| c == class)
    }

    /// Add or remove a class, leaving the others untouched.
    pub fn toggle_class(&mut self, class: &str, on: bool) {
        let mut classes: Vec<&str> = self
            .class
            .split_whitespace()
            .filter(|c| *c != class)
            .collect();
        if on {
            classes.push(class);
        }
        self.class = classes.join(" ");
    }

    /// Depth-first search for descendants (self included) carrying `class`.
    pub fn find_all<'a>(&'a self, class: &str, out: &mut Vec<&'a Element>) {
        if self.has_class(class) {
            out.push(self);
        }
        for child in &self.children {
            child.find_all(class, out);
        }
    }
}

/// A navigation link built from one `header.nav` entry.
///
/// Links live for one render; the observer manager owns the current set and
/// flips `active` as sections scroll into view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub label: String,
    /// URL fragment of the target section, e.g. "#pillars"
    pub target: String,
    pub active: bool,
}

impl NavLink {
    pub fn new(label: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: target.into(),
            active: false,
        }
    }
}

// ==================== Slot Registry ====================

/// Contents of one slot anchor.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Anchor {
    pub text: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
}

/// Fixed mapping from slot identifier to anchor.
///
/// The set of identifiers is decided at construction. Writes addressed to an
/// identifier the page does not have are dropped, mirroring a markup shell
/// that simply lacks that element.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SlotRegistry {
    anchors: BTreeMap<String, Anchor>,
}

impl SlotRegistry {
    pub fn new<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            anchors: ids
                .into_iter()
                .map(|id| (id.into(), Anchor::default()))
                .collect(),
        }
    }

    /// Registry with every slot of the standard page shell.
    pub fn standard() -> Self {
        Self::new(slots::ALL.iter().copied())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.anchors.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.anchors.keys().map(String::as_str)
    }

    pub fn anchor(&self, id: &str) -> Option<&Anchor> {
        self.anchors.get(id)
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        self.anchor(id).map(|a| a.text.as_str())
    }

    pub fn attr(&self, id: &str, name: &str) -> Option<&str> {
        self.anchor(id)?.attrs.get(name).map(String::as_str)
    }

    /// Children of a slot; empty when the slot does not exist.
    pub fn children(&self, id: &str) -> &[Element] {
        self.anchor(id).map(|a| a.children.as_slice()).unwrap_or(&[])
    }

    fn anchor_mut(&mut self, id: &str) -> Option<&mut Anchor> {
        let anchor = self.anchors.get_mut(id);
        if anchor.is_none() {
            debug!("Slot '{}' is not present on this page, skipping", id);
        }
        anchor
    }

    pub fn set_text(&mut self, id: &str, text: impl Into<String>) -> bool {
        match self.anchor_mut(id) {
            Some(anchor) => {
                anchor.text = text.into();
                true
            }
            None => false,
        }
    }

    pub fn set_attr(&mut self, id: &str, name: &str, value: impl Into<String>) -> bool {
        match self.anchor_mut(id) {
            Some(anchor) => {
                anchor.attrs.insert(name.to_string(), value.into());
                true
            }
            None => false,
        }
    }

    pub fn remove_attr(&mut self, id: &str, name: &str) -> bool {
        match self.anchor_mut(id) {
            Some(anchor) => anchor.attrs.remove(name).is_some(),
            None => false,
        }
    }

    /// Replace everything inside a slot with `children`.
    pub fn replace_children(&mut self, id: &str, children: Vec<Element>) -> bool {
        match self.anchor_mut(id) {
            Some(anchor) => {
                anchor.children = children;
                true
            }
            None => false,
        }
    }

    /// Toggle the active class on the nav list links; `target` selects the
    /// link whose `data-target` matches, `None` clears them all.
    pub fn mark_active_nav(&mut self, target: Option<&str>) {
        let Some(anchor) = self.anchors.get_mut(slots::NAV_LIST) else {
            return;
        };
        for item in &mut anchor.children {
            for link in &mut item.children {
                let matches = target.is_some()
                    && link.attrs.get("data-target").map(String::as_str) == target;
                link.toggle_class(ACTIVE_CLASS, matches);
            }
        }
    }
}

// ==================== Document Metadata ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetaAttr {
    Name,
    Property,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetaTag {
    pub attr: MetaAttr,
    pub key: String,
    pub content: String,
}

/// Document-level metadata: root locale tag, title and `<meta>` tags.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocumentMeta {
    pub lang: String,
    pub title: String,
    pub tags: Vec<MetaTag>,
}

impl DocumentMeta {
    /// Set a tag's content, creating the tag if the document lacks it.
    pub fn upsert_tag(&mut self, attr: MetaAttr, key: &str, content: impl Into<String>) {
        let content = content.into();
        match self
            .tags
            .iter_mut()
            .find(|tag| tag.attr == attr && tag.key == key)
        {
            Some(tag) => tag.content = content,
            None => self.tags.push(MetaTag {
                attr,
                key: key.to_string(),
                content,
            }),
        }
    }

    pub fn tag(&self, attr: MetaAttr, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|tag| tag.attr == attr && tag.key == key)
            .map(|tag| tag.content.as_str())
    }
}

// ==================== Page Chrome ====================

/// The logo next to the brand name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BrandMark {
    pub image_mode: bool,
    pub image_src: Option<String>,
}

impl BrandMark {
    /// Switch to image mode showing `src`; a no-op when already showing it.
    pub fn show_image(&mut self, src: &str) {
        self.image_mode = true;
        if self.image_src.as_deref() != Some(src) {
            self.image_src = Some(src.to_string());
        }
    }
}

/// An embedded widget shown only for some languages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalizedEmbed {
    pub name: String,
    /// Comma separated language codes, or "all"
    pub visible_for: String,
    pub active: bool,
}

impl LocalizedEmbed {
    pub fn new(name: impl Into<String>, visible_for: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible_for: visible_for.into(),
            active: false,
        }
    }

    /// An unset (empty) list means every language.
    pub fn is_visible_for(&self, lang: Language) -> bool {
        if self.visible_for.is_empty() {
            return true;
        }
        self.visible_for
            .split(',')
            .map(str::trim)
            .any(|code| code == "all" || code == lang.code())
    }

    pub fn aria_hidden(&self) -> bool {
        !self.active
    }
}

/// One control of the language switcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageButton {
    pub lang: Language,
    pub active: bool,
}

/// A show/hide status element (loading spinner, failure banner).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Indicator {
    pub active: bool,
}

impl Indicator {
    pub fn aria_hidden(&self) -> bool {
        !self.active
    }
}

/// Everything the core writes into.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Page {
    pub slots: SlotRegistry,
    pub meta: DocumentMeta,
    pub brand_mark: Option<BrandMark>,
    pub embeds: Vec<LocalizedEmbed>,
    pub language_buttons: Vec<LanguageButton>,
    pub loading: Option<Indicator>,
    pub failure: Option<Indicator>,
}

impl Page {
    /// The standard shell: every slot, a brand mark, one button per
    /// language, and both status indicators.
    pub fn standard() -> Self {
        Self {
            slots: SlotRegistry::standard(),
            meta: DocumentMeta::default(),
            brand_mark: Some(BrandMark::default()),
            embeds: Vec::new(),
            language_buttons: Language::all()
                .into_iter()
                .map(|lang| LanguageButton {
                    lang,
                    active: false,
                })
                .collect(),
            loading: Some(Indicator::default()),
            failure: Some(Indicator::default()),
        }
    }

    pub fn with_embed(mut self, embed: LocalizedEmbed) -> Self {
        self.embeds.push(embed);
        self
    }

    pub fn update_brand_mark(&mut self, src: &str) {
        if let Some(mark) = self.brand_mark.as_mut() {
            mark.show_image(src);
        }
    }

    pub fn update_embeds(&mut self, lang: Language) {
        for embed in &mut self.embeds {
            embed.active = embed.is_visible_for(lang);
        }
    }

    pub fn highlight_language(&mut self, lang: Language) {
        for button in &mut self.language_buttons {
            button.active = button.lang == lang;
        }
    }

    pub fn set_loading(&mut self, show: bool) {
        if let Some(indicator) = self.loading.as_mut() {
            indicator.active = show;
        }
    }

    pub fn set_failure(&mut self, show: bool) {
        if let Some(indicator) = self.failure.as_mut() {
            indicator.active = show;
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.map(|i| i.active).unwrap_or(false)
    }

    pub fn is_failed(&self) -> bool {
        self.failure.map(|i| i.active).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Slot Registry Tests ====================

    #[test]
    fn test_standard_registry_has_every_slot() {
        let registry = SlotRegistry::standard();
        assert_eq!(registry.len(), slots::ALL.len());
        assert!(registry.contains(slots::HERO_TITLE));
        assert!(registry.contains(slots::FOOTER_LINKS));
    }

    #[test]
    fn test_writes_to_missing_slot_are_dropped() {
        let mut registry = SlotRegistry::new([slots::HERO_TITLE]);

        assert!(!registry.set_text("hero.unknown", "x"));
        assert!(!registry.replace_children(slots::NAV_LIST, vec![Element::new("li")]));

        assert_eq!(registry.len(), 1);
        assert!(!registry.contains("hero.unknown"));
        assert!(registry.children(slots::NAV_LIST).is_empty());
    }

    #[test]
    fn test_replace_children_discards_previous() {
        let mut registry = SlotRegistry::standard();
        registry.replace_children(
            slots::FOOTER_LINKS,
            vec![Element::new("a"), Element::new("a")],
        );
        registry.replace_children(slots::FOOTER_LINKS, vec![Element::new("a")]);

        assert_eq!(registry.children(slots::FOOTER_LINKS).len(), 1);
    }

    #[test]
    fn test_set_and_remove_attr() {
        let mut registry = SlotRegistry::standard();
        registry.set_attr(slots::CTA_SECONDARY, "target", "_blank");
        assert_eq!(registry.attr(slots::CTA_SECONDARY, "target"), Some("_blank"));

        assert!(registry.remove_attr(slots::CTA_SECONDARY, "target"));
        assert_eq!(registry.attr(slots::CTA_SECONDARY, "target"), None);
    }

    #[test]
    fn test_mark_active_nav_toggles_matching_link() {
        let mut registry = SlotRegistry::standard();
        let item = |target: &str| {
            Element::new("li").child(
                Element::new("a")
                    .class("primary-nav__link")
                    .attr("data-target", target),
            )
        };
        registry.replace_children(slots::NAV_LIST, vec![item("#hero"), item("#pillars")]);

        registry.mark_active_nav(Some("#pillars"));
        let links: Vec<_> = registry
            .children(slots::NAV_LIST)
            .iter()
            .map(|li| li.children[0].has_class(ACTIVE_CLASS))
            .collect();
        assert_eq!(links, vec![false, true]);

        registry.mark_active_nav(None);
        assert!(registry
            .children(slots::NAV_LIST)
            .iter()
            .all(|li| !li.children[0].has_class(ACTIVE_CLASS)));
        assert!(registry.children(slots::NAV_LIST)[1].children[0].has_class("primary-nav__link"));
    }

    // ==================== Element Tests ====================

    #[test]
    fn test_toggle_class_is_idempotent() {
        let mut element = Element::new("a").class("primary-nav__link");
        element.toggle_class(ACTIVE_CLASS, true);
        element.toggle_class(ACTIVE_CLASS, true);
        assert_eq!(element.class, "primary-nav__link is-active");
    }

    #[test]
    fn test_find_all_walks_descendants() {
        let tree = Element::new("article").class("part-card").child(
            Element::new("div")
                .class("chapter-grid")
                .child(Element::new("article").class("chapter-card"))
                .child(Element::new("article").class("chapter-card")),
        );
        let mut found = Vec::new();
        tree.find_all("chapter-card", &mut found);
        assert_eq!(found.len(), 2);
    }

    // ==================== Metadata Tests ====================

    #[test]
    fn test_upsert_tag_does_not_duplicate() {
        let mut meta = DocumentMeta::default();
        meta.upsert_tag(MetaAttr::Name, "description", "first");
        meta.upsert_tag(MetaAttr::Name, "description", "second");
        meta.upsert_tag(MetaAttr::Property, "og:description", "second");

        assert_eq!(meta.tags.len(), 2);
        assert_eq!(meta.tag(MetaAttr::Name, "description"), Some("second"));
        assert_eq!(meta.tag(MetaAttr::Property, "description"), None);
    }

    // ==================== Chrome Tests ====================

    #[test]
    fn test_embed_visibility_list() {
        let embed = LocalizedEmbed::new("podcast", "zh, en");
        assert!(embed.is_visible_for(Language::CHINESE));
        assert!(embed.is_visible_for(Language::ENGLISH));
        assert!(!embed.is_visible_for(Language::KOREAN));
    }

    #[test]
    fn test_embed_visible_for_all() {
        assert!(LocalizedEmbed::new("podcast", "all").is_visible_for(Language::JAPANESE));
        assert!(LocalizedEmbed::new("podcast", "").is_visible_for(Language::KOREAN));
    }

    #[test]
    fn test_embed_list_without_codes_is_hidden() {
        assert!(!LocalizedEmbed::new("podcast", ",").is_visible_for(Language::CHINESE));
        assert!(!LocalizedEmbed::new("podcast", " ").is_visible_for(Language::ENGLISH));
    }

    #[test]
    fn test_update_embeds_sets_aria_hidden() {
        let mut page = Page::standard().with_embed(LocalizedEmbed::new("podcast", "zh"));
        page.update_embeds(Language::ENGLISH);
        assert!(page.embeds[0].aria_hidden());
        page.update_embeds(Language::CHINESE);
        assert!(!page.embeds[0].aria_hidden());
    }

    #[test]
    fn test_highlight_language_marks_exactly_one_button() {
        let mut page = Page::standard();
        page.highlight_language(Language::JAPANESE);
        let active: Vec<_> = page
            .language_buttons
            .iter()
            .filter(|b| b.active)
            .map(|b| b.lang)
            .collect();
        assert_eq!(active, vec![Language::JAPANESE]);
    }

    #[test]
    fn test_brand_mark_switches_to_image() {
        let mut page = Page::standard();
        page.update_brand_mark("assets/img/logo.png");
        let mark = page.brand_mark.as_ref().unwrap();
        assert!(mark.image_mode);
        assert_eq!(mark.image_src.as_deref(), Some("assets/img/logo.png"));
    }

    #[test]
    fn test_indicators_without_elements_are_ignored() {
        let mut page = Page::default();
        page.set_loading(true);
        page.set_failure(true);
        assert!(!page.is_loading());
        assert!(!page.is_failed());
    }
}
