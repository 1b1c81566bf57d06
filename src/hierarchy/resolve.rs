use crate::diagram::{Node, Position, Segment};

/// Candidates sitting at the far end of every connector that starts at `of`.
///
/// Segment order is preserved and nothing is deduplicated: two connectors to
/// the same child yield it twice. Connectors ending on empty space contribute
/// nothing.
pub fn children<'a>(of: Position, segments: &[Segment], candidates: &'a [Node]) -> Vec<&'a Node> {
    segments
        .iter()
        .filter(|segment| segment.start == of)
        .flat_map(|segment| {
            candidates
                .iter()
                .filter(move |candidate| candidate.position == segment.end)
        })
        .collect()
}
