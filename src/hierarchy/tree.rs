use tracing::warn;

use super::resolve;
use crate::diagram::extract::Extractor;
use crate::diagram::{Diagram, Node, Segment};

#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub node: Node,
    pub children: Vec<Branch>,
}

/// Pillars, their areas, and the areas' sub-areas.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tree {
    pub roots: Vec<Branch>,
}

impl Tree {
    pub const DEPTH: usize = 3;

    /// Pre-order walk yielding each node with its depth (0 for roots).
    pub fn walk(&self) -> Vec<(usize, &Node)> {
        fn visit<'a>(branch: &'a Branch, depth: usize, out: &mut Vec<(usize, &'a Node)>) {
            out.push((depth, &branch.node));
            for child in &branch.children {
                visit(child, depth + 1, out);
            }
        }

        let mut out = Vec::new();
        for root in &self.roots {
            visit(root, 0, &mut out);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.walk().len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn count_at(&self, depth: usize) -> usize {
        self.walk().iter().filter(|(d, _)| *d == depth).count()
    }
}

/// Resolve the full tree for the configured pillars.
///
/// `areas` and `sub_areas` are the already-extracted candidates; groups that
/// failed extraction are simply not in them.
pub fn build(
    diagram: &Diagram,
    extractor: &Extractor<'_>,
    pillar_ids: &[String],
    segments: &[Segment],
    areas: &[Node],
    sub_areas: &[Node],
) -> Tree {
    let roots = pillar_ids.iter().filter_map(|id| {
        let Some(group) = diagram.pillar(id) else {
            warn!("Pillar '{}' not found in the diagram, skipping", id);
            return None;
        };
        let node = extractor.extract(group, false);
        if node.is_none() {
            warn!("Pillar '{}' has no position or title, skipping", id);
        }
        node
    });

    grow_forest(roots, segments, [areas, sub_areas])
}

/// One level of candidates per level below the roots.
pub fn grow_forest(
    roots: impl IntoIterator<Item = Node>,
    segments: &[Segment],
    levels: [&[Node]; Tree::DEPTH - 1],
) -> Tree {
    Tree {
        roots: roots
            .into_iter()
            .map(|root| grow(root, segments, &levels))
            .collect(),
    }
}

fn grow(node: Node, segments: &[Segment], levels: &[&[Node]]) -> Branch {
    let children = match levels.split_first() {
        Some((candidates, below)) => resolve::children(node.position, segments, candidates)
            .into_iter()
            .map(|child| grow(child.clone(), segments, below))
            .collect(),
        None => Vec::new(),
    };
    Branch { node, children }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::Position;
    use crate::fetch::StaticPages;
    use reqwest::Url;

    fn node(name: &str, x: f64, y: f64) -> Node {
        Node {
            summary: name.to_string(),
            description: name.to_string(),
            position: Position::new(x, y),
        }
    }

    fn segment(x1: f64, y1: f64, x2: f64, y2: f64) -> Segment {
        Segment {
            start: Position::new(x1, y1),
            end: Position::new(x2, y2),
        }
    }

    fn assert_depth(tree: &Tree) {
        assert!(tree.walk().iter().all(|(depth, _)| *depth < Tree::DEPTH));
    }

    #[test]
    fn single_connector_scenario() {
        let tree = grow_forest(
            [node("pillar", 0.0, 0.0)],
            &[segment(0.0, 0.0, 10.0, 10.0)],
            [&[node("area", 10.0, 10.0)], &[]],
        );
        assert_eq!(tree.roots.len(), 1);
        assert_eq!(tree.roots[0].children.len(), 1);
        assert_eq!(tree.roots[0].children[0].node.summary, "area");
        assert!(tree.roots[0].children[0].children.is_empty());
        assert_depth(&tree);
    }

    #[test]
    fn leaves_never_grow_children() {
        // self-loop on the sub-area must not add a fourth level
        let tree = grow_forest(
            [node("p", 0.0, 0.0)],
            &[
                segment(0.0, 0.0, 1.0, 1.0),
                segment(1.0, 1.0, 2.0, 2.0),
                segment(2.0, 2.0, 2.0, 2.0),
            ],
            [&[node("a", 1.0, 1.0)], &[node("s", 2.0, 2.0)]],
        );
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.count_at(2), 1);
        assert_depth(&tree);
    }

    #[test]
    fn pillar_without_children() {
        let tree = grow_forest([node("lonely", 0.0, 0.0)], &[], [&[], &[]]);
        assert_eq!(tree.len(), 1);
        assert!(tree.roots[0].children.is_empty());
    }

    #[test]
    fn walk_is_pre_order() {
        let tree = grow_forest(
            [node("p1", 0.0, 0.0), node("p2", 0.0, 9.0)],
            &[
                segment(0.0, 0.0, 1.0, 0.0),
                segment(0.0, 0.0, 1.0, 1.0),
                segment(1.0, 0.0, 2.0, 0.0),
                segment(0.0, 9.0, 1.0, 9.0),
            ],
            [
                &[node("a1", 1.0, 0.0), node("a2", 1.0, 1.0), node("a3", 1.0, 9.0)],
                &[node("s1", 2.0, 0.0)],
            ],
        );
        let order: Vec<(usize, &str)> = tree
            .walk()
            .into_iter()
            .map(|(d, n)| (d, n.summary.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![(0, "p1"), (1, "a1"), (2, "s1"), (1, "a2"), (0, "p2"), (1, "a3")]
        );
    }

    fn fixture_tree(pillars: &[&str]) -> Tree {
        let markup = std::fs::read_to_string("tests/fixtures/wat_map.html").unwrap();
        let diagram = Diagram::parse(
            &markup,
            Url::parse("https://wa.aws.amazon.com/wat.map.en.html").unwrap(),
        );
        let pages = StaticPages::default().with(
            "https://wa.aws.amazon.com/wat.question.SEC_2.en.html",
            std::fs::read_to_string("tests/fixtures/sec_2.html").unwrap(),
        );
        let extractor = Extractor::new(diagram.url(), &pages, "Resources");

        let areas: Vec<Node> = diagram
            .areas()
            .filter_map(|g| extractor.extract(g, false))
            .collect();
        let sub_areas: Vec<Node> = diagram
            .sub_areas()
            .filter_map(|g| extractor.extract(g, true))
            .collect();
        assert_eq!(areas.len(), 3, "untitled area must be dropped");
        assert_eq!(sub_areas.len(), 3, "unplaced sub-area must be dropped");

        let ids: Vec<String> = pillars.iter().map(|s| s.to_string()).collect();
        build(&diagram, &extractor, &ids, &diagram.segments(), &areas, &sub_areas)
    }

    #[test]
    fn map_fixture() {
        let tree = fixture_tree(&["security", "performance", "reliability"]);
        assert_depth(&tree);

        let order: Vec<(usize, String)> = tree
            .walk()
            .into_iter()
            .map(|(d, n)| (d, n.summary.clone()))
            .collect();
        assert_eq!(
            order,
            vec![
                (0, "Security".to_string()),
                (1, "Identity and access management".to_string()),
                (2, "SEC 2. How do you manage identities for people and machines?".to_string()),
                (2, "Manage permissions".to_string()),
                (1, "Detection".to_string()),
                (0, "Reliability".to_string()),
                (1, "Foundations".to_string()),
            ]
        );

        let security = &tree.roots[0].node;
        assert_eq!(
            security.description,
            "The security pillar focuses on protecting information and systems.\
             \n\n[Security|https://wa.aws.amazon.com/wat.pillar.security.en.html]"
        );
        let iam = &tree.roots[0].children[0].node;
        assert_eq!(
            iam.description,
            "Identity and access management\
             \n\n[SEC 2|https://wa.aws.amazon.com/wat.question.SEC_2.en.html]"
        );
    }

    #[test]
    fn untitled_area_does_not_disturb_siblings() {
        let tree = fixture_tree(&["security"]);
        let areas: Vec<&str> = tree.roots[0]
            .children
            .iter()
            .map(|b| b.node.summary.as_str())
            .collect();
        assert_eq!(areas, vec!["Identity and access management", "Detection"]);
        assert_eq!(tree.roots[0].children[0].children.len(), 2);
        assert!(tree
            .walk()
            .iter()
            .all(|(_, n)| n.summary != "Orphan" && n.summary != "Untitled area"));
    }

    #[test]
    fn unknown_pillars_are_skipped() {
        let tree = fixture_tree(&["performance", "sustainability"]);
        assert!(tree.roots.is_empty());
    }
}
