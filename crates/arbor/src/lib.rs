//! # Arbor: Tree Host for JavaScript and TypeScript
//!
//! **Role**: Parses JS / JSX / TS / TSX source into tree-sitter syntax trees
//! and exposes the node-level primitives every rule builds on.
//!
//! **Core Types**:
//! - `Grammar`: the four dialects, selected by file extension.
//! - `ParseHost`: a reusable parser that re-targets its grammar per file.
//! - `Token`: a lexical leaf (text + span), trivia excluded.
//!
//! **Design**:
//! - The tree is owned top-down by the parser; parent links are query-only
//!   navigation and never used for lifetime management.
//! - Token streams are flattened on demand per node, never cached — every
//!   analysis is a single pass and re-extraction is linear in subtree size.
//! - Files are memory-mapped and validated as UTF-8 once; all downstream
//!   code works on `&str` slices of that buffer.

pub mod nodes;
pub mod path_util;
pub mod tokens;

use std::fs::File;
use std::path::Path;

use memmap2::MmapOptions;
use tree_sitter::{Language, Node, Parser, Tree};

use common::SourceSpan;

/// Errors produced by the arbor crate.
#[derive(Debug, thiserror::Error)]
pub enum ArborError {
    /// Tree-sitter parsing failed.
    #[error("Parse failure: {0}")]
    ParseFailure(String),

    /// I/O error (file read/write).
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Byte range exceeds u32::MAX (file too large).
    #[error("Byte range overflow: file size exceeds 4GB limit")]
    ByteRangeOverflow,

    /// Source is not valid UTF-8.
    #[error("Non-UTF-8 source: {0}")]
    NonUtf8(String),
}

/// The grammars warden can analyze, selected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    /// `.js` and `.mjs` / `.cjs` — the JavaScript grammar (JSX-capable).
    Javascript,
    /// `.jsx` — the JavaScript grammar with JSX constructs expected.
    Jsx,
    /// `.ts` — the TypeScript grammar.
    Typescript,
    /// `.tsx` — the TSX grammar.
    Tsx,
}

impl Grammar {
    /// Detects the grammar for a path, `None` for unsupported extensions.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str())? {
            "js" | "mjs" | "cjs" => Some(Self::Javascript),
            "jsx" => Some(Self::Jsx),
            "ts" | "mts" | "cts" => Some(Self::Typescript),
            "tsx" => Some(Self::Tsx),
            _ => None,
        }
    }

    /// Returns the tree-sitter language for this grammar.
    pub fn language(&self) -> Language {
        match self {
            Self::Javascript | Self::Jsx => tree_sitter_javascript::LANGUAGE.into(),
            Self::Typescript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

/// A reusable tree-sitter parser that re-targets its grammar per file.
///
/// # Example
/// ```
/// use arbor::{Grammar, ParseHost};
///
/// let mut host = ParseHost::new();
/// let tree = host.parse("if (a) { f(); }", Grammar::Javascript).unwrap();
/// assert_eq!(tree.root_node().kind(), "program");
/// ```
pub struct ParseHost {
    parser: Parser,
}

impl ParseHost {
    /// Creates a parser host with no grammar loaded yet.
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
        }
    }

    /// Parses `source` with the given grammar.
    ///
    /// # Errors
    /// - `ParseFailure` if the grammar cannot be loaded or tree-sitter
    ///   returns no tree (severe internal failure; syntax errors still
    ///   produce a tree with ERROR nodes).
    pub fn parse(&mut self, source: &str, grammar: Grammar) -> Result<Tree, ArborError> {
        self.parser
            .set_language(&grammar.language())
            .map_err(|e| ArborError::ParseFailure(format!("Failed to load grammar: {e}")))?;
        self.parser
            .parse(source, None)
            .ok_or_else(|| ArborError::ParseFailure("Tree-sitter parse returned None".to_string()))
    }
}

impl Default for ParseHost {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads a source file via mmap and validates it as UTF-8.
///
/// # Errors
/// - `IoError`: file not found, permission denied, mmap failure.
/// - `ByteRangeOverflow`: file larger than 4GB (tree-sitter u32 limit).
/// - `NonUtf8`: the file is not valid UTF-8.
pub fn load_source(path: &Path) -> Result<String, ArborError> {
    let file = File::open(path)?;
    let metadata = file.metadata()?;
    if metadata.len() > u32::MAX as u64 {
        return Err(ArborError::ByteRangeOverflow);
    }
    if metadata.len() == 0 {
        return Ok(String::new());
    }

    // SAFETY: The file handle is held for the duration of the mmap lifetime.
    let mmap = unsafe { MmapOptions::new().map(&file)? };
    let text = std::str::from_utf8(&mmap)
        .map_err(|_| ArborError::NonUtf8(path.display().to_string()))?;
    Ok(text.to_string())
}

/// Converts a node's position metadata into a `SourceSpan`.
///
/// Tree-sitter rows are 0-indexed; spans are 1-indexed by line.
pub fn span_of(node: Node<'_>) -> SourceSpan {
    let start = node.start_position();
    let end = node.end_position();
    SourceSpan {
        start_line: start.row as u32 + 1,
        start_col: start.column as u32,
        end_line: end.row as u32 + 1,
        end_col: end.column as u32,
        start_byte: node.start_byte() as u32,
        end_byte: node.end_byte() as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grammar_detection() {
        assert_eq!(
            Grammar::from_path(Path::new("a/b.js")),
            Some(Grammar::Javascript)
        );
        assert_eq!(
            Grammar::from_path(Path::new("c.tsx")),
            Some(Grammar::Tsx)
        );
        assert_eq!(Grammar::from_path(Path::new("d.py")), None);
        assert_eq!(Grammar::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn test_parse_all_grammars() {
        let mut host = ParseHost::new();
        for grammar in [
            Grammar::Javascript,
            Grammar::Jsx,
            Grammar::Typescript,
            Grammar::Tsx,
        ] {
            let tree = host.parse("const x = 1;", grammar).unwrap();
            assert_eq!(tree.root_node().kind(), "program");
        }
    }

    #[test]
    fn test_span_of_is_one_indexed() {
        let mut host = ParseHost::new();
        let source = "let a;\nlet b;";
        let tree = host.parse(source, Grammar::Javascript).unwrap();
        let root = tree.root_node();
        let second = root.named_child(1).unwrap();
        let span = span_of(second);
        assert_eq!(span.start_line, 2);
        assert_eq!(span.start_col, 0);
        assert_eq!(span.start_byte, 7);
    }

    #[test]
    fn test_syntax_errors_still_produce_tree() {
        let mut host = ParseHost::new();
        let tree = host.parse("if (a { ", Grammar::Javascript).unwrap();
        assert!(tree.root_node().has_error());
    }
}
