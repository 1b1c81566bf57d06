use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::{normalize_whitespace, text_of};

static MAIN_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("#main").unwrap());
static H1_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());
static H2_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h2").unwrap());
static ANCHOR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

/// Content pulled from a question/best-practice page linked from the map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailPage {
    pub heading: Option<String>,
    /// First `<p>` following the heading; only looked up when there is one.
    pub paragraph: Option<String>,
    pub resources: Vec<Resource>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub text: String,
    pub href: String,
}

impl DetailPage {
    /// `None` when the page has no `#main` region.
    pub fn parse(markup: &str, resources_heading: &str) -> Option<Self> {
        let html = Html::parse_document(markup);
        let main = html.select(&MAIN_SEL).next()?;

        let h1 = main.select(&H1_SEL).next();
        let heading = h1.map(|h| normalize_whitespace(&text_of(h)));
        let paragraph = h1
            .and_then(|h| {
                h.next_siblings()
                    .filter_map(ElementRef::wrap)
                    .find(|e| e.value().name() == "p")
            })
            .map(|p| text_of(p).trim().to_string());

        let resources = main
            .select(&H2_SEL)
            .filter(|h2| text_of(*h2).trim() == resources_heading)
            .filter_map(|h2| h2.parent().and_then(ElementRef::wrap))
            .flat_map(|section| section.select(&ANCHOR_SEL))
            .filter_map(|a| {
                Some(Resource {
                    text: text_of(a),
                    href: a.value().attr("href")?.to_string(),
                })
            })
            .collect();

        Some(Self {
            heading,
            paragraph,
            resources,
        })
    }

    /// Heading replaces the summary, paragraph replaces the description, and
    /// resources are appended as link references.
    pub fn apply(&self, summary: &mut String, description: &mut String) {
        if let Some(heading) = &self.heading {
            summary.clone_from(heading);
        }
        if let Some(paragraph) = &self.paragraph {
            description.clone_from(paragraph);
        }
        for resource in &self.resources {
            description.push_str(&super::link_reference(&resource.text, &resource.href));
        }
    }
}
