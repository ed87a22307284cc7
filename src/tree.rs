// Arena tree adapter over scraper's DOM: Element/Text nodes with parent back-references.

use std::ops::AddAssign;

use ego_tree::NodeRef;
use scraper::node::{Element, Node as HtmlNode};
use scraper::Html;

use crate::aggregate;
use crate::error::CetdError;
use crate::Config;

/// Index of a node inside a [`DensityTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// What a node is: an element with a (lowercased) tag name, or a run of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element { tag: String },
    Text { text: String },
}

impl NodeKind {
    pub fn element(tag: &str) -> Self {
        NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        NodeKind::Text { text: text.into() }
    }
}

/// Character, tag and link counts of a subtree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeStats {
    /// Text characters in the subtree.
    pub char_count: usize,
    /// Characters of `char_count` nested inside a link element.
    pub link_char_count: usize,
    /// Element nodes in the subtree, including the node itself.
    pub tag_count: usize,
    /// Link elements in the subtree.
    pub link_tag_count: usize,
}

impl NodeStats {
    pub fn non_link_chars(&self) -> usize {
        self.char_count.saturating_sub(self.link_char_count)
    }
}

impl AddAssign for NodeStats {
    fn add_assign(&mut self, rhs: Self) {
        self.char_count += rhs.char_count;
        self.link_char_count += rhs.link_char_count;
        self.tag_count += rhs.tag_count;
        self.link_tag_count += rhs.link_tag_count;
    }
}

/// One element or text run of the document.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) stats: NodeStats,
}

impl Node {
    fn new(kind: NodeKind, parent: Option<NodeId>) -> Self {
        Self {
            kind,
            parent,
            children: Vec::new(),
            stats: NodeStats::default(),
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Tag name, or `None` for text.
    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { tag } => Some(tag),
            NodeKind::Text { .. } => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text { text } => Some(text),
            NodeKind::Element { .. } => None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element { .. })
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Aggregated counts for the subtree rooted here.
    pub fn stats(&self) -> &NodeStats {
        &self.stats
    }

    /// Characters contributed by this node alone (zero for elements).
    pub fn own_char_count(&self) -> usize {
        self.text().map_or(0, text_char_count)
    }
}

/// Character length of a text run once whitespace is collapsed and trimmed.
pub(crate) fn text_char_count(text: &str) -> usize {
    let mut chars = 0usize;
    let mut words = 0usize;
    for word in text.split_whitespace() {
        chars += word.chars().count();
        words += 1;
    }
    chars + words.saturating_sub(1)
}

pub(crate) fn tag_in(tag: &str, set: &[String]) -> bool {
    set.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

/// A document tree with per-node statistics already aggregated.
///
/// Construction always runs the aggregation pass, so every tree handed to a
/// scorer has final counts. The tree is never mutated afterwards.
#[derive(Debug, Clone)]
pub struct DensityTree {
    nodes: Vec<Node>,
    root: NodeId,
    preorder: Vec<NodeId>,
}

impl DensityTree {
    /// Adapt a parsed HTML document.
    ///
    /// The tree is rooted at `<body>` when the document has one, otherwise at
    /// the root element. Comments, doctypes and processing instructions are
    /// dropped, as are hidden elements when `config.skip_hidden` is set.
    pub fn from_html(doc: &Html, config: &Config) -> Self {
        let html_root = doc.root_element();
        let body = html_root
            .children()
            .find(|child| matches!(child.value(), HtmlNode::Element(el) if el.name() == "body"))
            .unwrap_or(*html_root);

        let mut nodes: Vec<Node> = Vec::new();
        // Children are pushed in reverse so they pop in document order,
        // which makes arena order a pre-order.
        let mut stack: Vec<(NodeRef<HtmlNode>, Option<NodeId>)> = vec![(body, None)];
        while let Some((html_node, parent)) = stack.pop() {
            let kind = match html_node.value() {
                HtmlNode::Element(el) => {
                    if config.skip_hidden && parent.is_some() && is_hidden(el) {
                        continue;
                    }
                    NodeKind::element(el.name())
                }
                HtmlNode::Text(text) => NodeKind::text(&*text.text),
                _ => continue,
            };

            let id = NodeId(nodes.len());
            if let Some(parent) = parent {
                nodes[parent.0].children.push(id);
            }
            let is_element = matches!(kind, NodeKind::Element { .. });
            nodes.push(Node::new(kind, parent));

            if is_element {
                let children: Vec<_> = html_node.children().collect();
                for child in children.into_iter().rev() {
                    stack.push((child, Some(id)));
                }
            }
        }

        let preorder = (0..nodes.len()).map(NodeId).collect();
        let mut tree = Self {
            nodes,
            root: NodeId(0),
            preorder,
        };
        aggregate::aggregate(&mut tree.nodes, &tree.preorder, &config.link_tags);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            nodes = tree.nodes.len(),
            chars = tree.nodes[0].stats.char_count,
            link_chars = tree.nodes[0].stats.link_char_count,
            "built density tree from html"
        );

        tree
    }

    /// Build a tree from nodes listed with their parent ids.
    ///
    /// Siblings keep the relative order in which they appear in `nodes`.
    /// Exactly one node must have no parent; every other node must be
    /// reachable from it through element parents.
    pub fn from_parent_links(
        nodes: Vec<(NodeKind, Option<NodeId>)>,
        config: &Config,
    ) -> Result<Self, CetdError> {
        if nodes.is_empty() {
            return Err(CetdError::InvalidTree("tree has no nodes".to_string()));
        }

        let len = nodes.len();
        let mut root: Option<NodeId> = None;
        for (index, (_, parent)) in nodes.iter().enumerate() {
            match parent {
                None => {
                    if let Some(first) = root {
                        return Err(CetdError::InvalidTree(format!(
                            "more than one root (nodes {} and {index})",
                            first.0
                        )));
                    }
                    root = Some(NodeId(index));
                }
                Some(p) if p.0 >= len => {
                    return Err(CetdError::InvalidTree(format!(
                        "node {index} has parent {} out of range",
                        p.0
                    )));
                }
                Some(p) if matches!(nodes[p.0].0, NodeKind::Text { .. }) => {
                    return Err(CetdError::InvalidTree(format!(
                        "node {index} has text node {} as parent",
                        p.0
                    )));
                }
                Some(_) => {}
            }
        }
        let root =
            root.ok_or_else(|| CetdError::InvalidTree("no root node (cycle?)".to_string()))?;

        let mut arena: Vec<Node> = nodes
            .into_iter()
            .map(|(kind, parent)| Node::new(kind, parent))
            .collect();
        for index in 0..len {
            if let Some(parent) = arena[index].parent {
                arena[parent.0].children.push(NodeId(index));
            }
        }

        let mut preorder = Vec::with_capacity(len);
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            preorder.push(id);
            stack.extend(arena[id.0].children.iter().rev().copied());
        }
        if preorder.len() != len {
            return Err(CetdError::InvalidTree(format!(
                "{} of {len} nodes are unreachable from the root",
                len - preorder.len()
            )));
        }

        aggregate::aggregate(&mut arena, &preorder, &config.link_tags);
        Ok(Self {
            nodes: arena,
            root,
            preorder,
        })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All node ids in document order.
    pub fn preorder(&self) -> &[NodeId] {
        &self.preorder
    }

    /// Ids of `id` and all its descendants, in document order.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.nodes[next.0].children.iter().rev().copied());
        }
        out
    }
}

/// Returns true for elements that a browser would not render.
fn is_hidden(el: &Element) -> bool {
    if el.attr("hidden").is_some() {
        return true;
    }
    if el
        .attr("aria-hidden")
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    {
        return true;
    }
    if el
        .attr("display")
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("none"))
    {
        return true;
    }
    el.attr("style").is_some_and(|style| {
        let compact: String = style
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        compact.contains("display:none")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(html: &str) -> DensityTree {
        DensityTree::from_html(&Html::parse_document(html), &Config::default())
    }

    fn tags(tree: &DensityTree) -> Vec<&str> {
        tree.preorder()
            .iter()
            .filter_map(|&id| tree.node(id).tag())
            .collect()
    }

    #[test]
    fn test_rooted_at_body() {
        let tree = build("<html><head><title>T</title></head><body><p>text</p></body></html>");
        assert_eq!(tree.node(tree.root()).tag(), Some("body"));
        assert_eq!(tags(&tree), vec!["body", "p"]);
    }

    #[test]
    fn test_preorder_is_document_order() {
        let tree = build("<body><div><p>a</p><p>b</p></div><span>c</span></body>");
        assert_eq!(tags(&tree), vec!["body", "div", "p", "p", "span"]);
        let texts: Vec<_> = tree
            .preorder()
            .iter()
            .filter_map(|&id| tree.node(id).text())
            .collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parent_links_match_children() {
        let tree = build("<body><div><p>a <b>b</b></p></div></body>");
        for &id in tree.preorder() {
            for &child in tree.node(id).children() {
                assert_eq!(tree.node(child).parent(), Some(id));
            }
        }
        assert_eq!(tree.node(tree.root()).parent(), None);
    }

    #[test]
    fn test_comments_dropped() {
        let tree = build("<body><!-- hidden note --><p>text</p></body>");
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_hidden_elements_dropped() {
        let tree = build(concat!(
            "<body>",
            "<div hidden>one</div>",
            "<div aria-hidden=\"true\">two</div>",
            "<div display=\"none\">three</div>",
            "<div style=\"color: red; DISPLAY : none\">four</div>",
            "<p>kept</p>",
            "</body>"
        ));
        assert_eq!(tags(&tree), vec!["body", "p"]);
        assert_eq!(tree.node(tree.root()).stats().char_count, 4);
    }

    #[test]
    fn test_hidden_kept_when_disabled() {
        let config = Config::default().with_skip_hidden(false);
        let tree = DensityTree::from_html(
            &Html::parse_document("<body><div hidden>one</div></body>"),
            &config,
        );
        assert_eq!(tags(&tree), vec!["body", "div"]);
    }

    #[test]
    fn test_text_char_count_collapses_whitespace() {
        assert_eq!(text_char_count(""), 0);
        assert_eq!(text_char_count("   \n\t "), 0);
        assert_eq!(text_char_count("Hello "), 5);
        assert_eq!(text_char_count("  a   b\n\nc "), 5);
        assert_eq!(text_char_count("héllo wörld"), 11);
    }

    #[test]
    fn test_element_tag_lowercased() {
        assert_eq!(
            NodeKind::element("DIV"),
            NodeKind::Element {
                tag: "div".to_string()
            }
        );
    }

    #[test]
    fn test_from_parent_links_sibling_order() {
        let tree = DensityTree::from_parent_links(
            vec![
                (NodeKind::element("div"), None),
                (NodeKind::element("p"), Some(NodeId::new(0))),
                (NodeKind::text("first"), Some(NodeId::new(1))),
                (NodeKind::element("p"), Some(NodeId::new(0))),
            ],
            &Config::default(),
        )
        .unwrap();
        assert_eq!(
            tree.node(tree.root()).children(),
            &[NodeId::new(1), NodeId::new(3)]
        );
        assert_eq!(
            tree.preorder(),
            &[NodeId::new(0), NodeId::new(1), NodeId::new(2), NodeId::new(3)]
        );
    }

    #[test]
    fn test_from_parent_links_root_not_first() {
        let tree = DensityTree::from_parent_links(
            vec![
                (NodeKind::text("inner"), Some(NodeId::new(1))),
                (NodeKind::element("body"), None),
            ],
            &Config::default(),
        )
        .unwrap();
        assert_eq!(tree.root(), NodeId::new(1));
        assert_eq!(tree.node(tree.root()).stats().char_count, 5);
    }

    #[test]
    fn test_from_parent_links_rejects_empty() {
        let err = DensityTree::from_parent_links(vec![], &Config::default()).unwrap_err();
        assert!(matches!(err, CetdError::InvalidTree(_)));
    }

    #[test]
    fn test_from_parent_links_rejects_two_roots() {
        let err = DensityTree::from_parent_links(
            vec![(NodeKind::element("div"), None), (NodeKind::element("div"), None)],
            &Config::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CetdError::InvalidTree(_)));
    }

    #[test]
    fn test_from_parent_links_rejects_cycle() {
        // 0 is the root; 1 and 2 point at each other and never reach it.
        let err = DensityTree::from_parent_links(
            vec![
                (NodeKind::element("body"), None),
                (NodeKind::element("div"), Some(NodeId::new(2))),
                (NodeKind::element("div"), Some(NodeId::new(1))),
            ],
            &Config::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            CetdError::InvalidTree("2 of 3 nodes are unreachable from the root".to_string())
        );
    }

    #[test]
    fn test_from_parent_links_rejects_full_cycle() {
        let err = DensityTree::from_parent_links(
            vec![
                (NodeKind::element("div"), Some(NodeId::new(1))),
                (NodeKind::element("div"), Some(NodeId::new(0))),
            ],
            &Config::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CetdError::InvalidTree(_)));
    }

    #[test]
    fn test_from_parent_links_rejects_out_of_range_parent() {
        let err = DensityTree::from_parent_links(
            vec![
                (NodeKind::element("body"), None),
                (NodeKind::text("x"), Some(NodeId::new(7))),
            ],
            &Config::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CetdError::InvalidTree(_)));
    }

    #[test]
    fn test_from_parent_links_rejects_text_parent() {
        let err = DensityTree::from_parent_links(
            vec![
                (NodeKind::element("body"), None),
                (NodeKind::text("x"), Some(NodeId::new(0))),
                (NodeKind::element("p"), Some(NodeId::new(1))),
            ],
            &Config::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CetdError::InvalidTree(_)));
    }

    #[test]
    fn test_subtree_in_document_order() {
        let tree = build("<body><div><p>a</p><p>b</p></div><p>c</p></body>");
        let div = tree.node(tree.root()).children()[0];
        let sub = tree.subtree(div);
        assert_eq!(sub.len(), 5);
        assert_eq!(sub[0], div);
        let texts: Vec<_> = sub.iter().filter_map(|&id| tree.node(id).text()).collect();
        assert_eq!(texts, vec!["a", "b"]);
    }
}
