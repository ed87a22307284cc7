// Text density formulas and the scoring strategies built on them.

use crate::tree::{DensityTree, NodeId, NodeStats};
use crate::ScorerKind;

/// A per-node scoring policy.
///
/// Scores are pure functions of a node's aggregated counts, so any
/// implementation can be swapped in without touching selection or rendering.
pub trait DensityScorer {
    fn score(&self, stats: &NodeStats) -> f64;
}

/// Non-link characters per non-link tag.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicDensity;

/// Basic density scaled by text volume and penalized for link-heavy text and markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompositeDensity;

/// Fraction of the node's characters that are not link text.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariantDensity;

impl DensityScorer for BasicDensity {
    fn score(&self, stats: &NodeStats) -> f64 {
        basic_density(stats)
    }
}

impl DensityScorer for CompositeDensity {
    fn score(&self, stats: &NodeStats) -> f64 {
        composite_density(stats)
    }
}

impl DensityScorer for VariantDensity {
    fn score(&self, stats: &NodeStats) -> f64 {
        variant_density(stats)
    }
}

impl DensityScorer for ScorerKind {
    fn score(&self, stats: &NodeStats) -> f64 {
        match self {
            ScorerKind::Basic => composite_density(stats),
            ScorerKind::Variant => variant_density(stats),
        }
    }
}

/// `(chars - link_chars) / (tags - link_tags + 1)`
pub fn basic_density(stats: &NodeStats) -> f64 {
    let non_link_chars = stats.non_link_chars() as f64;
    let non_link_tags = stats.tag_count.saturating_sub(stats.link_tag_count) as f64;
    non_link_chars / (non_link_tags + 1.0)
}

/// `basic × ln(chars + 1) × non_link_chars / (chars + 1)`, divided by
/// `link_char_ratio × link_tag_ratio + 1`.
///
/// With no links the divisor is exactly 1. A node with no text scores 0.
pub fn composite_density(stats: &NodeStats) -> f64 {
    let chars = stats.char_count as f64;
    let link_chars = stats.link_char_count as f64;
    let tags = stats.tag_count as f64;
    let link_tags = stats.link_tag_count as f64;
    let non_link_chars = stats.non_link_chars() as f64;

    let volume = (chars + 1.0).ln();
    let prose_ratio = non_link_chars / (chars + 1.0);
    let link_penalty = (link_chars / (chars + 1.0)) * (link_tags / (tags + 1.0)) + 1.0;
    basic_density(stats) * volume * prose_ratio / link_penalty
}

/// `1 - link_chars / (chars + 1)`
pub fn variant_density(stats: &NodeStats) -> f64 {
    1.0 - stats.link_char_count as f64 / (stats.char_count as f64 + 1.0)
}

/// Scores for every node of one tree, indexed by [`NodeId`].
#[derive(Debug, Clone, PartialEq)]
pub struct Scores(Vec<f64>);

impl Scores {
    /// Wrap precomputed scores, one per node in arena order.
    pub fn from_vec(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// Score of `id`, or `0.0` when `id` lies outside the scored tree.
    ///
    /// [`select`](crate::select) rejects scores whose length does not match
    /// the tree, so this fallback never applies during selection.
    pub fn get(&self, id: NodeId) -> f64 {
        self.0.get(id.index()).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Score every node of `tree`.
pub fn score_tree(tree: &DensityTree, scorer: &dyn DensityScorer) -> Scores {
    Scores(
        (0..tree.len())
            .map(|index| scorer.score(tree.node(NodeId::new(index)).stats()))
            .collect(),
    )
}
