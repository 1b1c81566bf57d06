pub mod connectors;
pub mod enrich;
pub mod extract;

use std::sync::LazyLock;

use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

static PILLAR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("g.pillar").unwrap());
static AREA_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("g.area").unwrap());
static GROUP_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("g").unwrap());

/// Anchor of a diagram node, as written in its `translate(x, y)`.
/// Compared with exact equality, no tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A connector line, read as parent (start) → child (end).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub summary: String,
    pub description: String,
    pub position: Position,
}

/// The parsed map page together with the URL it was served from.
pub struct Diagram {
    html: Html,
    url: Url,
}

impl Diagram {
    pub fn parse(markup: &str, url: Url) -> Self {
        Self {
            html: Html::parse_document(markup),
            url,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn segments(&self) -> Vec<Segment> {
        connectors::build_segments(&self.html)
    }

    /// Pillar group with the given `id`.
    pub fn pillar(&self, id: &str) -> Option<ElementRef<'_>> {
        self.html
            .select(&PILLAR_SEL)
            .find(|g| g.value().id() == Some(id))
    }

    pub fn areas(&self) -> impl Iterator<Item = ElementRef<'_>> + '_ {
        self.html.select(&AREA_SEL)
    }

    /// Sub-area groups carry no class at all.
    pub fn sub_areas(&self) -> impl Iterator<Item = ElementRef<'_>> + '_ {
        self.html.select(&GROUP_SEL).filter(|g| {
            g.value()
                .attr("class")
                .map_or(true, |class| class.trim().is_empty())
        })
    }
}

pub(crate) fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect()
}

pub(crate) fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Newlines dropped, ends trimmed.
pub(crate) fn single_line(s: &str) -> String {
    s.replace('\n', "").trim().to_string()
}

/// Jira wiki link reference, preceded by a blank line.
pub(crate) fn link_reference(text: &str, url: &str) -> String {
    format!("\n\n[{}|{}]", single_line(text), url)
}
