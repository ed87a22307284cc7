// Anchor search and cohesive expansion over a scored tree.

use crate::error::CetdError;
use crate::score::Scores;
use crate::tree::{tag_in, DensityTree, NodeId};
use crate::Config;

/// The extracted region: an anchor plus every node accepted around it.
///
/// Produced by [`select`]; the tree it refers to is left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    anchor: Option<NodeId>,
    selected: Vec<bool>,
}

impl Selection {
    fn empty(len: usize) -> Self {
        Self {
            anchor: None,
            selected: vec![false; len],
        }
    }

    /// The highest-scoring element, or `None` when nothing scored above zero.
    pub fn anchor(&self) -> Option<NodeId> {
        self.anchor
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selected.get(id.index()).copied().unwrap_or(false)
    }

    /// Selected ids in arena order.
    pub fn selected_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.selected
            .iter()
            .enumerate()
            .filter(|&(_, &s)| s)
            .map(|(index, _)| NodeId::new(index))
    }

    pub fn len(&self) -> usize {
        self.selected.iter().filter(|&&s| s).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.selected.iter().any(|&s| s)
    }

    fn mark_subtree(&mut self, tree: &DensityTree, id: NodeId) {
        for node in tree.subtree(id) {
            self.selected[node.index()] = true;
        }
    }
}

/// Element with the highest score; ties go to the earliest in document order.
///
/// Only elements carrying text are eligible. Returns `None` when no such
/// element scores above zero.
pub fn find_anchor(tree: &DensityTree, scores: &Scores) -> Option<NodeId> {
    let mut best: Option<(NodeId, f64)> = None;
    for &id in tree.preorder() {
        let node = tree.node(id);
        if !node.is_element() || node.stats().char_count == 0 {
            continue;
        }
        let score = scores.get(id);
        if score > best.map_or(0.0, |(_, s)| s) {
            best = Some((id, score));
        }
    }
    best.map(|(id, _)| id)
}

/// Select the content region of `tree`.
///
/// Starting from the anchor, each ancestor level accepts the sibling subtrees
/// whose score reaches `anchor_score * expansion_threshold_factor`. The walk
/// stops at the root or at the first level that accepts no sibling. With
/// [`Config::pass_through_wrappers`] set, siblings without text are ignored
/// and levels that offer no other candidate are walked through instead.
/// Excluded tags and everything under them are removed last.
///
/// Fails when `config` is invalid or `scores` does not cover every node.
pub fn select(
    tree: &DensityTree,
    scores: &Scores,
    config: &Config,
) -> Result<Selection, CetdError> {
    config.validate()?;
    if scores.len() != tree.len() {
        return Err(CetdError::InvalidTree(format!(
            "{} scores for {} nodes",
            scores.len(),
            tree.len()
        )));
    }

    let mut selection = Selection::empty(tree.len());
    let Some(anchor) = find_anchor(tree, scores) else {
        #[cfg(feature = "tracing")]
        tracing::debug!("no element scored above zero; empty selection");
        return Ok(selection);
    };
    selection.anchor = Some(anchor);

    let threshold = scores.get(anchor) * config.expansion_threshold_factor;
    #[cfg(feature = "tracing")]
    tracing::debug!(
        anchor = anchor.index(),
        tag = tree.node(anchor).tag().unwrap_or_default(),
        score = scores.get(anchor),
        threshold,
        "selected anchor"
    );

    selection.mark_subtree(tree, anchor);
    let mut current = anchor;
    while let Some(parent) = tree.node(current).parent() {
        let mut candidates = 0usize;
        let mut accepted = 0usize;
        for &sibling in tree.node(parent).children() {
            if sibling == current {
                continue;
            }
            if config.pass_through_wrappers && tree.node(sibling).stats().char_count == 0 {
                continue;
            }
            candidates += 1;
            if scores.get(sibling) >= threshold {
                selection.mark_subtree(tree, sibling);
                accepted += 1;
            }
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(ancestor = parent.index(), candidates, accepted, "expanded");

        let passes_through = config.pass_through_wrappers && candidates == 0;
        if accepted == 0 && !passes_through {
            break;
        }
        current = parent;
    }

    drop_excluded(tree, &config.excluded_tags, &mut selection);
    Ok(selection)
}

/// Unselect every excluded element and its descendants.
fn drop_excluded(tree: &DensityTree, excluded_tags: &[String], selection: &mut Selection) {
    let mut excluded = vec![false; tree.len()];
    for &id in tree.preorder() {
        let node = tree.node(id);
        let inherited = node.parent().is_some_and(|p| excluded[p.index()]);
        if inherited || node.tag().is_some_and(|t| tag_in(t, excluded_tags)) {
            excluded[id.index()] = true;
            selection.selected[id.index()] = false;
        }
    }
}
