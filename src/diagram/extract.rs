use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Selector};
use tracing::{debug, warn};

use super::enrich::DetailPage;
use super::{link_reference, normalize_whitespace, single_line, text_of, Node, Position};
use crate::fetch::PageSource;

static TRANSLATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"translate\(\s*(-?[0-9]*\.?[0-9]+)\s*[,\s]\s*(-?[0-9]*\.?[0-9]+)\s*\)").unwrap()
});
static TITLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static TEXT_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("text").unwrap());
static ANCHOR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

/// Position from a `transform` attribute such as `translate(400, 300)`.
pub fn parse_translate(transform: &str) -> Option<Position> {
    let caps = TRANSLATE_RE.captures(transform)?;
    let x = caps[1].parse().ok()?;
    let y = caps[2].parse().ok()?;
    Some(Position::new(x, y))
}

/// Turns diagram groups into [`Node`]s.
pub struct Extractor<'a> {
    base: &'a Url,
    pages: &'a dyn PageSource,
    resources_heading: &'a str,
}

impl<'a> Extractor<'a> {
    pub fn new(base: &'a Url, pages: &'a dyn PageSource, resources_heading: &'a str) -> Self {
        Self {
            base,
            pages,
            resources_heading,
        }
    }

    /// `None` for groups without a position or without a `<title>`.
    ///
    /// With `follow_links`, every outbound link is fetched and its detail page
    /// replaces the title-derived content. Without it, links are appended to
    /// the description as `[text|url]` references.
    pub fn extract(&self, group: ElementRef<'_>, follow_links: bool) -> Option<Node> {
        let Some(position) = group.value().attr("transform").and_then(parse_translate) else {
            debug!("Dropping group without a translate() position");
            return None;
        };
        let Some(title) = group.select(&TITLE_SEL).next() else {
            debug!("Dropping group at ({}, {}) without a title", position.x, position.y);
            return None;
        };

        let mut summary = group
            .select(&TEXT_SEL)
            .map(text_of)
            .collect::<Vec<_>>()
            .join(" ");
        let mut description = single_line(&text_of(title));

        for link in group.select(&ANCHOR_SEL) {
            let Some(target) = self.link_target(link) else {
                continue;
            };
            if follow_links {
                if let Some(page) = self.detail_page(&target) {
                    page.apply(&mut summary, &mut description);
                }
            } else {
                description.push_str(&link_reference(&text_of(link), target.as_str()));
            }
        }

        Some(Node {
            summary: normalize_whitespace(&summary),
            description,
            position,
        })
    }

    /// `xlink:href` on SVG anchors, `href` elsewhere; both share the local name.
    fn link_target(&self, link: ElementRef<'_>) -> Option<Url> {
        let (_, href) = link.value().attrs().find(|(name, _)| *name == "href")?;
        match self.base.join(href) {
            Ok(url) => Some(url),
            Err(e) => {
                debug!("Ignoring unresolvable link {:?}: {}", href, e);
                None
            }
        }
    }

    fn detail_page(&self, url: &Url) -> Option<DetailPage> {
        match self.pages.fetch(url) {
            Ok(Some(body)) => {
                let page = DetailPage::parse(&body, self.resources_heading);
                if page.is_none() {
                    debug!("No main region on {}", url);
                }
                page
            }
            Ok(None) => {
                debug!("No enrichment from {}", url);
                None
            }
            Err(e) => {
                warn!("Enrichment fetch failed, keeping title content: {:#}", e);
                None
            }
        }
    }
}
