//! Main-content extraction for HTML by composite text density.
//!
//! `cetd` scores every node of a document with a text density metric (how
//! much of its text is prose rather than link text, normalized by markup
//! volume), picks the densest element as an anchor, and grows a cohesive
//! region around it from sibling subtrees that score close to the anchor.
//!
//! # Quick start
//!
//! ```rust
//! use cetd::{extract_text, Config};
//!
//! let html = "<html><body><p>This is the main content.</p></body></html>";
//! let text = extract_text(html, &Config::default()).unwrap();
//! assert_eq!(text, "This is the main content.");
//! ```
//!
//! # Pipeline
//!
//! 1. [`DensityTree::from_html`] adapts the parsed document and aggregates
//!    character, tag and link counts bottom-up.
//! 2. [`score_tree`] applies a [`DensityScorer`] to every node.
//! 3. [`select`] finds the anchor and expands it into a [`Selection`].
//! 4. [`render`] flattens the selected text.
//!
//! [`ScoredDocument`] bundles the four stages and keeps the annotated tree
//! for callers that want structure rather than text.

mod aggregate;
mod error;
mod render;
mod score;
mod select;
mod tree;

pub use error::CetdError;
pub use render::render;
pub use score::{
    basic_density, composite_density, score_tree, variant_density, BasicDensity,
    CompositeDensity, DensityScorer, Scores, VariantDensity,
};
pub use select::{find_anchor, select, Selection};
pub use tree::{DensityTree, Node, NodeId, NodeKind, NodeStats};

use scraper::Html;

/// Which scoring formula drives selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScorerKind {
    /// Composite density: basic density scaled by text volume, penalized for links.
    #[default]
    Basic,
    /// Plain fraction of non-link characters; ignores tag counts.
    Variant,
}

/// What [`extract`] hands back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Text,
    Tree,
}

/// Configuration for extraction.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Config {
    pub scorer: ScorerKind,
    /// Fraction of the anchor's score a sibling needs to be accepted. Must be in `(0, 1]`.
    pub expansion_threshold_factor: f64,
    /// Tags never selected, along with their descendants.
    pub excluded_tags: Vec<String>,
    /// Tags whose text counts as link text.
    pub link_tags: Vec<String>,
    /// Drop `hidden`, `aria-hidden="true"` and `display: none` elements before scoring.
    pub skip_hidden: bool,
    /// Ignore text-less siblings during expansion and keep walking through
    /// levels that offer no other candidate. Off by default: the walk stops at
    /// the first level that accepts nothing.
    pub pass_through_wrappers: bool,
    pub output: OutputMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scorer: ScorerKind::Basic,
            expansion_threshold_factor: 0.3,
            excluded_tags: vec!["style".to_string(), "script".to_string()],
            link_tags: vec!["a".to_string()],
            skip_hidden: true,
            pass_through_wrappers: false,
            output: OutputMode::Text,
        }
    }
}

impl Config {
    pub fn with_scorer(mut self, scorer: ScorerKind) -> Self {
        self.scorer = scorer;
        self
    }
    pub fn with_expansion_threshold_factor(mut self, v: f64) -> Self {
        self.expansion_threshold_factor = v;
        self
    }
    pub fn with_excluded_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_tags = tags.into_iter().map(Into::into).collect();
        self
    }
    pub fn with_link_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.link_tags = tags.into_iter().map(Into::into).collect();
        self
    }
    pub fn with_skip_hidden(mut self, v: bool) -> Self {
        self.skip_hidden = v;
        self
    }
    pub fn with_pass_through_wrappers(mut self, v: bool) -> Self {
        self.pass_through_wrappers = v;
        self
    }
    pub fn with_output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    /// Check that the threshold factor lies in `(0, 1]`.
    pub fn validate(&self) -> Result<(), CetdError> {
        let factor = self.expansion_threshold_factor;
        if factor.is_finite() && factor > 0.0 && factor <= 1.0 {
            Ok(())
        } else {
            Err(CetdError::InvalidConfig(format!(
                "expansion_threshold_factor must be in (0, 1], got {factor}"
            )))
        }
    }
}

/// A document after aggregation, scoring and selection.
#[derive(Debug, Clone)]
pub struct ScoredDocument {
    tree: DensityTree,
    scores: Scores,
    selection: Selection,
}

impl ScoredDocument {
    /// Score and select an already-built tree.
    pub fn from_tree(tree: DensityTree, config: &Config) -> Result<Self, CetdError> {
        let scores = score_tree(&tree, &config.scorer);
        let selection = select(&tree, &scores, config)?;
        Ok(Self {
            tree,
            scores,
            selection,
        })
    }

    /// Re-run scoring and selection on the same tree.
    ///
    /// Only `scorer`, `expansion_threshold_factor`, `excluded_tags` and
    /// `pass_through_wrappers` take effect; link tags and hidden-element
    /// handling are fixed when the tree is built.
    pub fn rescore(&mut self, config: &Config) -> Result<(), CetdError> {
        let scores = score_tree(&self.tree, &config.scorer);
        self.selection = select(&self.tree, &scores, config)?;
        self.scores = scores;
        Ok(())
    }

    pub fn tree(&self) -> &DensityTree {
        &self.tree
    }

    pub fn scores(&self) -> &Scores {
        &self.scores
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn anchor(&self) -> Option<NodeId> {
        self.selection.anchor()
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selection.is_selected(id)
    }

    /// The selected text, one block per line.
    pub fn text(&self) -> String {
        render(&self.tree, &self.selection)
    }

    pub fn into_tree(self) -> DensityTree {
        self.tree
    }
}

/// Output of [`extract`], shaped by [`Config::output`].
#[derive(Debug, Clone)]
pub enum Extracted {
    Text(String),
    Tree(ScoredDocument),
}

impl Extracted {
    /// The extracted text, rendering the tree if needed.
    pub fn into_text(self) -> String {
        match self {
            Extracted::Text(text) => text,
            Extracted::Tree(doc) => doc.text(),
        }
    }
}

/// Parse, score and select `html`, keeping the annotated tree.
pub fn score_document(html: &str, config: &Config) -> Result<ScoredDocument, CetdError> {
    config.validate()?;
    let doc = Html::parse_document(html);
    ScoredDocument::from_tree(DensityTree::from_html(&doc, config), config)
}

/// Extract the main content of `html` as text or as a scored tree.
///
/// # Example
///
/// ```rust
/// use cetd::{extract, Config, Extracted, OutputMode};
///
/// let config = Config::default().with_output(OutputMode::Tree);
/// let Extracted::Tree(doc) = extract("<body><p>Some text</p></body>", &config).unwrap() else {
///     unreachable!()
/// };
/// assert!(doc.anchor().is_some());
/// ```
pub fn extract(html: &str, config: &Config) -> Result<Extracted, CetdError> {
    let doc = score_document(html, config)?;
    Ok(match config.output {
        OutputMode::Text => Extracted::Text(doc.text()),
        OutputMode::Tree => Extracted::Tree(doc),
    })
}

/// Convenience: extract only the main-content text.
///
/// Equivalent to [`extract`] with [`OutputMode::Text`].
pub fn extract_text(html: &str, config: &Config) -> Result<String, CetdError> {
    Ok(score_document(html, config)?.text())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.scorer, ScorerKind::Basic);
        assert_eq!(config.excluded_tags, vec!["style", "script"]);
        assert_eq!(config.link_tags, vec!["a"]);
        assert!(!config.pass_through_wrappers);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_threshold_factor() {
        for bad in [0.0, -0.5, 1.5, f64::NAN, f64::INFINITY] {
            let config = Config::default().with_expansion_threshold_factor(bad);
            assert!(
                matches!(config.validate(), Err(CetdError::InvalidConfig(_))),
                "factor {bad} should be rejected"
            );
        }
        assert!(Config::default()
            .with_expansion_threshold_factor(1.0)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_extract_rejects_bad_config() {
        let config = Config::default().with_expansion_threshold_factor(0.0);
        assert!(extract_text("<p>text</p>", &config).is_err());
    }

    #[test]
    fn test_output_modes() {
        let html = "<body><p>Some prose text</p></body>";
        let text = extract(html, &Config::default()).unwrap();
        assert!(matches!(text, Extracted::Text(ref t) if t == "Some prose text"));

        let tree = extract(html, &Config::default().with_output(OutputMode::Tree)).unwrap();
        match tree {
            Extracted::Tree(doc) => assert_eq!(doc.text(), "Some prose text"),
            Extracted::Text(_) => panic!("expected tree output"),
        }
    }

    #[test]
    fn test_rescore_keeps_tree() {
        // The tag-heavy paragraph is link-free; the prose block carries one link.
        let html = format!(
            "<body><p>{}</p><div>{}<a>x</a></div></body>",
            "<span>ab</span>".repeat(20),
            "prose ".repeat(50)
        );
        let mut doc = score_document(&html, &Config::default()).unwrap();
        let stats_before: Vec<_> = doc
            .tree()
            .preorder()
            .iter()
            .map(|&id| *doc.tree().node(id).stats())
            .collect();
        let basic_anchor = doc.anchor();

        doc.rescore(&Config::default().with_scorer(ScorerKind::Variant))
            .unwrap();
        let stats_after: Vec<_> = doc
            .tree()
            .preorder()
            .iter()
            .map(|&id| *doc.tree().node(id).stats())
            .collect();
        assert_eq!(stats_before, stats_after);
        assert_ne!(doc.anchor(), basic_anchor);
    }
}
