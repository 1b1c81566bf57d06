use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::{Position, Segment};

static LINE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("line").unwrap());

/// Every `<line>` in document order. Lines with a missing or non-numeric
/// endpoint are skipped.
pub fn build_segments(html: &Html) -> Vec<Segment> {
    html.select(&LINE_SEL)
        .filter_map(|line| {
            let segment = read_segment(line);
            if segment.is_none() {
                debug!("Skipping connector with unreadable endpoints: {}", line.html());
            }
            segment
        })
        .collect()
}

fn read_segment(line: ElementRef<'_>) -> Option<Segment> {
    let coord = |name: &str| -> Option<f64> { line.value().attr(name)?.trim().parse().ok() };
    Some(Segment {
        start: Position::new(coord("x1")?, coord("y1")?),
        end: Position::new(coord("x2")?, coord("y2")?),
    })
}
