//! Boolean condition decomposition and subset checking.
//!
//! An `if / else if` chain only reaches a later condition when every earlier
//! condition was false. A later condition that is a subset of an earlier one
//! (after splitting on `||` then `&&`) can therefore never be true. Clause
//! order inside an `&&`/`||` is irrelevant: same-operator binary containment
//! is checked in both orderings.

use tree_sitter::Node;

use crate::are_equivalent;
use arbor::nodes::{is_logical_operator, operator_of, unwrap_parens};

/// Flattens a condition into its top-level `||` operands.
pub fn split_by_or<'t>(node: Node<'t>, source: &str) -> Vec<Node<'t>> {
    split_by_operator("||", node, source)
}

/// Flattens a condition into its top-level `&&` operands.
pub fn split_by_and<'t>(node: Node<'t>, source: &str) -> Vec<Node<'t>> {
    split_by_operator("&&", node, source)
}

fn split_by_operator<'t>(operator: &str, node: Node<'t>, source: &str) -> Vec<Node<'t>> {
    let node = unwrap_parens(node);
    if node.kind() == "binary_expression" && operator_of(node, source) == Some(operator) {
        let mut out = Vec::new();
        if let Some(left) = node.child_by_field_name("left") {
            out.extend(split_by_operator(operator, left, source));
        }
        if let Some(right) = node.child_by_field_name("right") {
            out.extend(split_by_operator(operator, right, source));
        }
        return out;
    }
    vec![node]
}

/// Returns `true` when every clause of `first` is covered by some clause of
/// `second`.
pub fn is_subset(first: &[Node<'_>], second: &[Node<'_>], source: &str) -> bool {
    first
        .iter()
        .all(|fst| second.iter().any(|snd| is_subset_of(*fst, *snd, source)))
}

fn is_subset_of(first: Node<'_>, second: Node<'_>, source: &str) -> bool {
    let first = unwrap_parens(first);
    let second = unwrap_parens(second);

    if first.kind_id() != second.kind_id() {
        return false;
    }

    if first.kind() == "binary_expression" {
        let first_op = operator_of(first, source);
        if first_op == operator_of(second, source)
            && first_op.is_some_and(|op| is_logical_operator(op) && op != "??")
        {
            let (Some(fl), Some(fr)) = (
                first.child_by_field_name("left"),
                first.child_by_field_name("right"),
            ) else {
                return false;
            };
            let (Some(sl), Some(sr)) = (
                second.child_by_field_name("left"),
                second.child_by_field_name("right"),
            ) else {
                return false;
            };
            // Commutative containment: try both orderings.
            return (is_subset_of(fl, sl, source) && is_subset_of(fr, sr, source))
                || (is_subset_of(fl, sr, source) && is_subset_of(fr, sl, source));
        }
    }

    are_equivalent(first, second, source)
}
