//! Writes a content bundle into the page slots.
//!
//! Every section is written on every render. A section or field missing from
//! the bundle writes an empty value, so switching languages never leaves text
//! from the previous bundle behind.

use crate::content::{
    CallToAction, Card, Chapter, Chapters, ContentBundle, Footer, Header, Hero, Link, Meta, Part,
    Pillars, Story,
};
use crate::i18n::Language;
use crate::page::{slots, Element, MetaAttr, NavLink, Page, SlotRegistry};
use std::borrow::Cow;
use tracing::debug;

/// Values used where the bundle leaves a field out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderDefaults {
    pub nav_toggle_label: String,
    pub header_cta_label: String,
    pub pillars_title: String,
    pub href: String,
}

impl Default for RenderDefaults {
    fn default() -> Self {
        Self {
            nav_toggle_label: "Toggle main menu".to_string(),
            header_cta_label: "Contact".to_string(),
            pillars_title: "Pillars".to_string(),
            href: "#".to_string(),
        }
    }
}

fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

fn or_empty<T: Clone + Default>(section: &Option<T>) -> Cow<'_, T> {
    match section {
        Some(section) => Cow::Borrowed(section),
        None => Cow::Owned(T::default()),
    }
}

#[derive(Debug, Clone, Default)]
pub struct SlotRenderer {
    defaults: RenderDefaults,
}

impl SlotRenderer {
    pub fn new(defaults: RenderDefaults) -> Self {
        Self { defaults }
    }

    /// Render `bundle` into `page` and return the freshly built nav links.
    pub fn render(&self, bundle: &ContentBundle, lang: Language, page: &mut Page) -> Vec<NavLink> {
        self.render_meta(bundle.meta.as_ref(), lang, page);

        let registry = &mut page.slots;
        let nav_links = self.render_header(&or_empty(&bundle.header), registry);
        self.render_hero(&or_empty(&bundle.hero), registry);
        self.render_pillars(&or_empty(&bundle.pillars), registry);
        self.render_story(&or_empty(&bundle.story), registry);
        self.render_chapters(&or_empty(&bundle.chapters), registry);
        self.render_cta(&or_empty(&bundle.cta), registry);
        self.render_footer(&or_empty(&bundle.footer), registry);

        debug!("Rendered {} with {} nav links", lang, nav_links.len());
        nav_links
    }

    fn render_meta(&self, meta: Option<&Meta>, lang: Language, page: &mut Page) {
        let doc = &mut page.meta;
        doc.lang = lang.html_lang().to_string();

        let Some(meta) = meta else {
            return;
        };
        if let Some(title) = meta.title.as_deref().filter(|t| !t.is_empty()) {
            doc.title = title.to_string();
            doc.upsert_tag(MetaAttr::Property, "og:title", title);
        }
        if let Some(description) = meta.description.as_deref().filter(|d| !d.is_empty()) {
            doc.upsert_tag(MetaAttr::Name, "description", description);
            doc.upsert_tag(MetaAttr::Property, "og:description", description);
        }
        if !meta.keywords.is_empty() {
            doc.upsert_tag(MetaAttr::Name, "keywords", meta.keywords.join(","));
        }
    }

    fn render_header(&self, header: &Header, registry: &mut SlotRegistry) -> Vec<NavLink> {
        registry.set_text(slots::BRAND_NAME, text(&header.brand));
        registry.set_text(slots::NAV_TOGGLE_LABEL, text(&header.nav_toggle_label));
        registry.set_attr(
            slots::NAV_TOGGLE,
            "aria-label",
            header
                .nav_toggle_label
                .as_deref()
                .unwrap_or(&self.defaults.nav_toggle_label),
        );

        let cta = header.cta.clone().unwrap_or_default();
        registry.set_text(
            slots::HEADER_CTA,
            cta.label.as_deref().unwrap_or(&self.defaults.header_cta_label),
        );
        registry.set_attr(slots::HEADER_CTA, "href", self.href(&cta));

        let items: Vec<Element> = header
            .nav
            .iter()
            .map(|item| {
                let target = text(&item.target);
                Element::new("li").child(
                    Element::new("a")
                        .class("primary-nav__link")
                        .attr(
                            "href",
                            item.target.as_deref().unwrap_or(&self.defaults.href),
                        )
                        .attr("data-target", target)
                        .text(text(&item.label)),
                )
            })
            .collect();

        if !registry.replace_children(slots::NAV_LIST, items) {
            return Vec::new();
        }
        header
            .nav
            .iter()
            .map(|item| NavLink::new(text(&item.label), text(&item.target)))
            .collect()
    }

    fn render_hero(&self, hero: &Hero, registry: &mut SlotRegistry) {
        registry.set_text(slots::HERO_EYEBROW, text(&hero.eyebrow));
        registry.set_text(slots::HERO_TITLE, text(&hero.title));
        registry.set_text(slots::HERO_SUBTITLE, text(&hero.subtitle));
        self.write_link(registry, slots::HERO_PRIMARY_CTA, hero.primary_cta.as_ref());
        self.write_link(registry, slots::HERO_SECONDARY_CTA, hero.secondary_cta.as_ref());
        registry.replace_children(
            slots::HERO_HIGHLIGHTS,
            hero.highlights
                .iter()
                .map(|card| card_element("hero__card", card))
                .collect(),
        );
    }

    fn render_pillars(&self, pillars: &Pillars, registry: &mut SlotRegistry) {
        let eyebrow = pillars.eyebrow.as_ref().or(pillars.title.as_ref());
        registry.set_text(slots::PILLARS_EYEBROW, eyebrow.map(String::as_str).unwrap_or(""));
        registry.set_text(
            slots::PILLARS_TITLE,
            pillars
                .title
                .as_deref()
                .unwrap_or(&self.defaults.pillars_title),
        );
        registry.set_text(slots::PILLARS_SUBTITLE, text(&pillars.subtitle));
        registry.replace_children(
            slots::PILLARS_ITEMS,
            pillars
                .items
                .iter()
                .map(|card| card_element("pillar-card", card))
                .collect(),
        );
    }

    fn render_story(&self, story: &Story, registry: &mut SlotRegistry) {
        registry.set_text(slots::STORY_TITLE, text(&story.title));
        registry.replace_children(
            slots::STORY_PARAGRAPHS,
            story
                .paragraphs
                .iter()
                .map(|p| Element::new("p").text(p.as_str()))
                .collect(),
        );
        registry.set_text(slots::STORY_BLOCKQUOTE, text(&story.blockquote));
    }

    fn render_chapters(&self, chapters: &Chapters, registry: &mut SlotRegistry) {
        let eyebrow = chapters.eyebrow.as_ref().or(chapters.title.as_ref());
        registry.set_text(slots::CHAPTERS_EYEBROW, eyebrow.map(String::as_str).unwrap_or(""));
        registry.set_text(slots::CHAPTERS_TITLE, text(&chapters.title));
        registry.set_text(slots::CHAPTERS_SUBTITLE, text(&chapters.subtitle));
        registry.replace_children(
            slots::CHAPTERS_PARTS,
            chapters.parts.iter().map(part_element).collect(),
        );
    }

    fn render_cta(&self, cta: &CallToAction, registry: &mut SlotRegistry) {
        registry.set_text(slots::CTA_TITLE, text(&cta.title));
        registry.set_text(slots::CTA_SUBTITLE, text(&cta.subtitle));
        self.write_link(registry, slots::CTA_PRIMARY, cta.primary.as_ref());
        self.write_link(registry, slots::CTA_SECONDARY, cta.secondary.as_ref());

        match cta.secondary.as_ref().and_then(|link| link.target.as_deref()) {
            Some(target) if !target.is_empty() => {
                registry.set_attr(slots::CTA_SECONDARY, "target", target);
            }
            _ => {
                registry.remove_attr(slots::CTA_SECONDARY, "target");
            }
        }
    }

    fn render_footer(&self, footer: &Footer, registry: &mut SlotRegistry) {
        registry.set_text(slots::FOOTER_COPYRIGHT, text(&footer.copyright));
        registry.replace_children(
            slots::FOOTER_LINKS,
            footer
                .links
                .iter()
                .map(|link| {
                    Element::new("a")
                        .attr("href", self.href(link))
                        .attr("target", "_blank")
                        .attr("rel", "noopener")
                        .text(text(&link.label))
                })
                .collect(),
        );
    }

    fn href<'a>(&'a self, link: &'a Link) -> &'a str {
        link.href.as_deref().unwrap_or(&self.defaults.href)
    }

    /// Label and href of a link slot; an absent link writes an empty label.
    fn write_link(&self, registry: &mut SlotRegistry, id: &str, link: Option<&Link>) {
        let link = link.cloned().unwrap_or_default();
        registry.set_text(id, text(&link.label));
        registry.set_attr(id, "href", self.href(&link));
    }
}

fn card_element(class: &str, card: &Card) -> Element {
    Element::new("article")
        .class(class)
        .child(Element::new("h3").text(text(&card.title)))
        .child(Element::new("p").text(text(&card.description)))
}

fn chapter_element(chapter: &Chapter) -> Element {
    Element::new("article")
        .class("chapter-card")
        .child(
            Element::new("h3")
                .class("chapter-card__title")
                .text(text(&chapter.title)),
        )
        .child(
            Element::new("p")
                .class("chapter-card__summary")
                .text(text(&chapter.summary)),
        )
        .child(
            Element::new("p")
                .class("chapter-card__excerpt")
                .text(text(&chapter.excerpt)),
        )
}

fn part_element(part: &Part) -> Element {
    let header = Element::new("div")
        .class("part-card__header")
        .child(
            Element::new("span")
                .class("part-card__eyebrow")
                .text(text(&part.label)),
        )
        .child(
            Element::new("h3")
                .class("part-card__title")
                .text(text(&part.title)),
        )
        .child(
            Element::new("p")
                .class("part-card__description")
                .text(text(&part.description)),
        );

    let grid = part
        .chapters
        .iter()
        .map(chapter_element)
        .fold(Element::new("div").class("chapter-grid"), Element::child);

    Element::new("article")
        .class("part-card")
        .child(header)
        .child(grid)
}
