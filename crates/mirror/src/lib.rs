//! # Mirror: Structural Equivalence Engine
//!
//! Decides whether two syntax subtrees are "the same code" — identical in
//! structure regardless of where they sit in the file.
//!
//! ## Equivalence Rule
//! Two nodes are equivalent when they have the same kind **and** the same
//! flattened token text sequence (trivia excluded). The classic approach
//! would recursively compare typed children, but child enumeration is not
//! uniform across node kinds; because the grammar is deterministic, an
//! identical kind plus an identical ordered token stream implies the
//! subtrees were parsed from character-identical source and therefore have
//! identical structure.
//!
//! Equivalence is reflexive, symmetric, and transitive — it reduces to
//! sequence equality.

pub mod branches;
pub mod conditions;

use tree_sitter::Node;

use arbor::tokens::tokens;

/// Returns `true` if two nodes are structurally equivalent.
///
/// Comparison is by token text, not by source position: the same expression
/// parsed at two different offsets is equivalent.
pub fn are_equivalent(first: Node<'_>, second: Node<'_>, source: &str) -> bool {
    first.kind_id() == second.kind_id() && compare_tokens(first, second, source)
}

/// Returns `true` if two node sequences are positionally equivalent.
///
/// Empty sequences are equivalent to each other; a length mismatch is never
/// equivalent. Short-circuits on the first differing pair.
pub fn are_lists_equivalent(first: &[Node<'_>], second: &[Node<'_>], source: &str) -> bool {
    first.len() == second.len()
        && first
            .iter()
            .zip(second.iter())
            .all(|(a, b)| are_equivalent(*a, *b, source))
}

fn compare_tokens(first: Node<'_>, second: Node<'_>, source: &str) -> bool {
    let first_tokens = tokens(first, source);
    let second_tokens = tokens(second, source);
    first_tokens.len() == second_tokens.len()
        && first_tokens
            .iter()
            .zip(second_tokens.iter())
            .all(|(a, b)| a.text == b.text)
}

/// Computes a deterministic fingerprint of a node's token stream.
///
/// Token texts are hashed length-prefixed so that adjacent-token boundaries
/// cannot collide (`["ab","c"]` vs `["a","bc"]`). Equal token streams always
/// produce equal fingerprints, so the fingerprint is a cheap bucket key for
/// candidate duplicates; exact equivalence confirms them.
///
/// Truncates the 256-bit BLAKE3 digest to a `u64` (first 8 bytes, LE).
pub fn token_fingerprint(node: Node<'_>, source: &str) -> u64 {
    let mut hasher = blake3::Hasher::new();
    for token in tokens(node, source) {
        hasher.update(&(token.text.len() as u32).to_le_bytes());
        hasher.update(token.text.as_bytes());
    }
    let digest = hasher.finalize();
    u64::from_le_bytes(digest.as_bytes()[..8].try_into().expect("blake3 ≥ 8 bytes"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use arbor::{Grammar, ParseHost};
    use tree_sitter::Tree;

    fn parse(source: &str) -> Tree {
        ParseHost::new().parse(source, Grammar::Javascript).unwrap()
    }

    fn nth_statement<'t>(tree: &'t Tree, index: usize) -> Node<'t> {
        tree.root_node().named_child(index as u32).unwrap()
    }

    #[test]
    fn test_reflexive() {
        let source = "if (a) { f(); }";
        let tree = parse(source);
        let stmt = nth_statement(&tree, 0);
        assert!(are_equivalent(stmt, stmt, source));
    }

    #[test]
    fn test_symmetric() {
        let source = "f(a + b);\nf(a + b);";
        let tree = parse(source);
        let (first, second) = (nth_statement(&tree, 0), nth_statement(&tree, 1));
        assert!(are_equivalent(first, second, source));
        assert!(are_equivalent(second, first, source));
    }

    #[test]
    fn test_position_insensitive() {
        // Same expression embedded in different surrounding code.
        let source = "x = a + b;\nwhile (c) { y = a + b; }";
        let tree = parse(source);
        let root = tree.root_node();
        let mut sums = Vec::new();
        collect_kind(root, "binary_expression", &mut sums);
        let sums: Vec<_> = sums
            .into_iter()
            .filter(|n| {
                arbor::nodes::operator_of(*n, source) == Some("+")
            })
            .collect();
        assert_eq!(sums.len(), 2);
        assert!(are_equivalent(sums[0], sums[1], source));
    }

    #[test]
    fn test_different_identifiers_differ() {
        let source = "f(a + b);\nf(a + c);";
        let tree = parse(source);
        assert!(!are_equivalent(
            nth_statement(&tree, 0),
            nth_statement(&tree, 1),
            source
        ));
    }

    #[test]
    fn test_formatting_is_invisible() {
        let source = "f( a,b );\nf(a, /* comment */ b);";
        let tree = parse(source);
        assert!(are_equivalent(
            nth_statement(&tree, 0),
            nth_statement(&tree, 1),
            source
        ));
    }

    #[test]
    fn test_same_tokens_different_kind_differ() {
        // `{ a }` parses as a block at statement position and as an object
        // inside parens; the token streams match, the kinds do not.
        let source = "{ a }\n({ a });";
        let tree = parse(source);
        let block = nth_statement(&tree, 0);
        assert_eq!(block.kind(), "statement_block");

        let mut objects = Vec::new();
        collect_kind(tree.root_node(), "object", &mut objects);
        assert_eq!(objects.len(), 1);

        assert!(!are_equivalent(block, objects[0], source));
    }

    #[test]
    fn test_list_equivalence_length_sensitive() {
        let source = "f();\ng();\nf();\ng();";
        let tree = parse(source);
        let a = [nth_statement(&tree, 0), nth_statement(&tree, 1)];
        let b = [nth_statement(&tree, 2), nth_statement(&tree, 3)];
        assert!(are_lists_equivalent(&a, &b, source));
        assert!(!are_lists_equivalent(&a[..1], &b, source));
        assert!(are_lists_equivalent(&a[..0], &b[..0], source));
    }

    #[test]
    fn test_fingerprint_matches_equivalence() {
        let source = "f(a + b);\nf(a  +  b);\nf(a - b);";
        let tree = parse(source);
        let h0 = token_fingerprint(nth_statement(&tree, 0), source);
        let h1 = token_fingerprint(nth_statement(&tree, 1), source);
        let h2 = token_fingerprint(nth_statement(&tree, 2), source);
        assert_eq!(h0, h1, "formatting must not affect the fingerprint");
        assert_ne!(h0, h2, "different operators must produce different fingerprints");
    }

    fn collect_kind<'t>(node: Node<'t>, kind: &str, out: &mut Vec<Node<'t>>) {
        if node.kind() == kind {
            out.push(node);
        }
        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).collect();
        for child in children {
            collect_kind(child, kind, out);
        }
    }
}
