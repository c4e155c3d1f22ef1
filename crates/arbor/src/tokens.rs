//! Token-stream extraction.
//!
//! A node's tokens are its lexical leaves in source order with trivia
//! (comments) excluded. Two subtrees with the same kind and the same token
//! text sequence must have been parsed from character-identical source
//! modulo whitespace and comments, which is what the equivalence engine
//! relies on.

use tree_sitter::Node;

use crate::span_of;
use common::SourceSpan;

/// A lexical unit: literal text plus its source range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub span: SourceSpan,
}

/// Node kinds that are trivia and never part of a token stream.
const TRIVIA_KINDS: &[&str] = &["comment", "html_comment"];

/// Returns `true` for comment nodes.
pub fn is_trivia(node: Node<'_>) -> bool {
    TRIVIA_KINDS.contains(&node.kind())
}

/// Flattens a subtree into its ordered lexical tokens, trivia excluded.
///
/// Leaves with zero width (tree-sitter MISSING nodes) yield empty-text
/// tokens, which compare equal only to other empty tokens.
pub fn tokens<'a>(node: Node<'_>, source: &'a str) -> Vec<Token<'a>> {
    let mut out = Vec::new();
    collect(node, source, &mut out);
    out
}

fn collect<'a>(node: Node<'_>, source: &'a str, out: &mut Vec<Token<'a>>) {
    if is_trivia(node) {
        return;
    }
    if node.child_count() == 0 {
        out.push(Token {
            text: &source[node.start_byte()..node.end_byte()],
            span: span_of(node),
        });
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect(child, source, out);
    }
}

/// Returns the first token of `node`, if any.
pub fn first_token<'a>(node: Node<'_>, source: &'a str) -> Option<Token<'a>> {
    tokens(node, source).into_iter().next()
}

/// Finds the first token of `node` with the given text.
pub fn token_by_text<'a>(node: Node<'_>, source: &'a str, text: &str) -> Option<Token<'a>> {
    tokens(node, source).into_iter().find(|t| t.text == text)
}
