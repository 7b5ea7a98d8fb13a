//! Content bundle types.
//!
//! A bundle is the JSON document holding all localized copy for one
//! language. Every field is optional: a missing section or field
//! deserializes to `None` / an empty list and the renderer substitutes
//! its defaults. Unknown fields are ignored.

use serde::{Deserialize, Deserializer};

/// Root of a per-language content document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ContentBundle {
    pub meta: Option<Meta>,
    pub header: Option<Header>,
    pub hero: Option<Hero>,
    pub pillars: Option<Pillars>,
    pub story: Option<Story>,
    pub chapters: Option<Chapters>,
    pub cta: Option<CallToAction>,
    pub footer: Option<Footer>,
}

impl ContentBundle {
    /// Parse a bundle from raw JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// Read a list that may be absent or `null` as an empty list.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Document-level metadata.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Meta {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Header {
    pub brand: Option<String>,
    pub nav_toggle_label: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub nav: Vec<NavItem>,
    pub cta: Option<Link>,
}

/// One entry of the primary navigation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NavItem {
    pub label: Option<String>,
    /// URL fragment of the section this entry scrolls to (e.g. "#pillars")
    pub target: Option<String>,
}

/// A labelled hyperlink. `target` is only honoured where the page allows it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Link {
    pub label: Option<String>,
    pub href: Option<String>,
    pub target: Option<String>,
}

/// Title plus description, used for hero highlights and pillar items.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Card {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Hero {
    pub eyebrow: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub primary_cta: Option<Link>,
    pub secondary_cta: Option<Link>,
    #[serde(deserialize_with = "null_as_empty")]
    pub highlights: Vec<Card>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Pillars {
    pub eyebrow: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub items: Vec<Card>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Story {
    pub title: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub paragraphs: Vec<String>,
    pub blockquote: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Chapters {
    pub eyebrow: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub parts: Vec<Part>,
}

/// A group of chapters.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Part {
    pub label: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub chapters: Vec<Chapter>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Chapter {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub excerpt: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CallToAction {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub primary: Option<Link>,
    pub secondary: Option<Link>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Footer {
    pub copyright: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub links: Vec<Link>,
}
