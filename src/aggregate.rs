// Bottom-up character/tag/link statistics.

use crate::tree::{tag_in, Node, NodeId, NodeKind, NodeStats};

/// Fill in `stats` for every node.
///
/// `preorder` must list every node with parents before children; walking it
/// backwards is then a post-order, so each node is summed after all of its
/// children are final. A forward pass first marks which nodes sit inside a
/// link element.
pub(crate) fn aggregate(nodes: &mut [Node], preorder: &[NodeId], link_tags: &[String]) {
    let mut in_link = vec![false; nodes.len()];
    for &id in preorder {
        let node = &nodes[id.index()];
        let inherited = node.parent.is_some_and(|p| in_link[p.index()]);
        in_link[id.index()] = inherited || node.tag().is_some_and(|t| tag_in(t, link_tags));
    }

    for &id in preorder.iter().rev() {
        let node = &nodes[id.index()];
        let mut stats = own_stats(node, in_link[id.index()], link_tags);
        for child in &node.children {
            stats += nodes[child.index()].stats;
        }
        nodes[id.index()].stats = stats;
    }
}

/// The node's direct contribution, before children are added.
fn own_stats(node: &Node, in_link: bool, link_tags: &[String]) -> NodeStats {
    match &node.kind {
        NodeKind::Text { .. } => {
            let chars = node.own_char_count();
            NodeStats {
                char_count: chars,
                link_char_count: if in_link { chars } else { 0 },
                ..NodeStats::default()
            }
        }
        NodeKind::Element { tag } => NodeStats {
            tag_count: 1,
            link_tag_count: usize::from(tag_in(tag, link_tags)),
            ..NodeStats::default()
        },
    }
}
