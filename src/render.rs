// Flattens a selection back into plain text.

use crate::select::Selection;
use crate::tree::{DensityTree, NodeId, NodeKind};

/// Elements that start and end a line of output.
const BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "body",
    "br",
    "caption",
    "center",
    "dd",
    "details",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "li",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "summary",
    "table",
    "td",
    "th",
    "tr",
    "ul",
];

fn is_block_tag(tag: &str) -> bool {
    BLOCK_TAGS.contains(&tag)
}

enum Visit {
    Enter(NodeId),
    Exit(NodeId),
}

/// Render selected text in document order.
///
/// Text within one block is joined with its whitespace collapsed; each
/// non-empty block becomes one line.
pub fn render(tree: &DensityTree, selection: &Selection) -> String {
    if selection.is_empty() {
        return String::new();
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut stack = vec![Visit::Enter(tree.root())];
    while let Some(visit) = stack.pop() {
        match visit {
            Visit::Enter(id) => match tree.node(id).kind() {
                NodeKind::Text { text } => {
                    if selection.is_selected(id) {
                        current.push_str(text);
                    }
                }
                NodeKind::Element { tag } => {
                    if is_block_tag(tag) {
                        flush(&mut current, &mut lines);
                    }
                    stack.push(Visit::Exit(id));
                    stack.extend(tree.node(id).children().iter().rev().map(|&c| Visit::Enter(c)));
                }
            },
            Visit::Exit(id) => {
                if tree.node(id).tag().is_some_and(is_block_tag) {
                    flush(&mut current, &mut lines);
                }
            }
        }
    }
    flush(&mut current, &mut lines);
    lines.join("\n")
}

fn flush(current: &mut String, lines: &mut Vec<String>) {
    let line = current.split_whitespace().collect::<Vec<_>>().join(" ");
    if !line.is_empty() {
        lines.push(line);
    }
    current.clear();
}
