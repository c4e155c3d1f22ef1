//! Branch collection for conditional chains.
//!
//! Gathers the comparable units of an `if / else if / else` chain or a
//! `switch` statement so the duplicate-branch rules can test them pairwise.

use tree_sitter::Node;

use arbor::nodes::{
    case_statements, case_value, else_alternative, is_block_statement, is_break_statement,
    is_if_statement, named_children, switch_cases,
};

/// The branch bodies of an `if / else if / ... / else` chain, in order.
#[derive(Debug)]
pub struct IfChain<'t> {
    /// One statement per branch (the consequent of each `if`, then the final
    /// `else` body if present).
    pub branches: Vec<Node<'t>>,
    /// `true` when the chain is closed by an unconditional `else`.
    pub ends_with_else: bool,
}

/// Collects the branch bodies of an `if` chain starting at `if_stmt`.
pub fn collect_if_branches(if_stmt: Node<'_>) -> IfChain<'_> {
    let mut branches = Vec::new();
    let mut ends_with_else = false;

    if let Some(consequence) = if_stmt.child_by_field_name("consequence") {
        branches.push(consequence);
    }

    let mut statement = else_alternative(if_stmt);
    while let Some(node) = statement {
        if is_if_statement(node) {
            if let Some(consequence) = node.child_by_field_name("consequence") {
                branches.push(consequence);
            }
            statement = else_alternative(node);
        } else {
            branches.push(node);
            ends_with_else = true;
            break;
        }
    }

    IfChain {
        branches,
        ends_with_else,
    }
}

/// The comparable branches of a `switch` statement.
#[derive(Debug)]
pub struct SwitchBranches<'t> {
    /// The retained `switch_case` / `switch_default` clause nodes.
    pub cases: Vec<Node<'t>>,
    /// Per retained clause: its statements with a trailing `break` excluded.
    pub branches: Vec<Vec<Node<'t>>>,
    /// `true` when the statement has a `default` clause.
    pub ends_with_default: bool,
}

/// Collects `switch` clauses (both `case` and `default`).
///
/// A clause with no statements is fall-through and is not comparable — it is
/// dropped, except for the last clause, which is kept so an empty trailing
/// branch still participates.
pub fn collect_switch_branches(switch_stmt: Node<'_>) -> SwitchBranches<'_> {
    let all = switch_cases(switch_stmt);
    let mut ends_with_default = false;
    let mut cases = Vec::new();
    let mut branches = Vec::new();

    let last_index = all.len().saturating_sub(1);
    for (index, clause) in all.iter().enumerate() {
        if case_value(*clause).is_none() {
            ends_with_default = true;
        }
        let body = case_statements(*clause);
        if index == last_index || !body.is_empty() {
            cases.push(*clause);
            branches.push(take_without_break(body));
        }
    }

    SwitchBranches {
        cases,
        branches,
        ends_with_default,
    }
}

/// Excludes one trailing `break` statement from the list.
///
/// A branch that ends in an unconditional jump is compared with that jump
/// excluded, so `case 1: f(); break;` matches `else { f(); }`.
pub fn take_without_break(mut nodes: Vec<Node<'_>>) -> Vec<Node<'_>> {
    if nodes.last().is_some_and(|n| is_break_statement(*n)) {
        nodes.pop();
    }
    nodes
}

/// Replaces a lone block statement by its contents.
///
/// `case 1: { f(); }` and `case 2: f();` compare equal after expansion.
pub fn expand_single_block(nodes: Vec<Node<'_>>) -> Vec<Node<'_>> {
    if nodes.len() == 1 && is_block_statement(nodes[0]) {
        return named_children(nodes[0]);
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor::{Grammar, ParseHost};
    use tree_sitter::Tree;

    fn parse(source: &str) -> Tree {
        ParseHost::new().parse(source, Grammar::Javascript).unwrap()
    }

    fn first_if<'t>(tree: &'t Tree) -> Node<'t> {
        tree.root_node().named_child(0).unwrap()
    }

    #[test]
    fn test_collect_open_if_chain() {
        let source = "if (a) { f(); } else if (b) { g(); }";
        let tree = parse(source);
        let chain = collect_if_branches(first_if(&tree));
        assert_eq!(chain.branches.len(), 2);
        assert!(!chain.ends_with_else);
    }

    #[test]
    fn test_collect_closed_if_chain() {
        let source = "if (a) { f(); } else if (b) { g(); } else { h(); }";
        let tree = parse(source);
        let chain = collect_if_branches(first_if(&tree));
        assert_eq!(chain.branches.len(), 3);
        assert!(chain.ends_with_else);
    }

    #[test]
    fn test_braceless_branches_are_collected() {
        let source = "if (a) f(); else g();";
        let tree = parse(source);
        let chain = collect_if_branches(first_if(&tree));
        assert_eq!(chain.branches.len(), 2);
        assert!(chain.ends_with_else);
        assert_eq!(chain.branches[0].kind(), "expression_statement");
    }

    #[test]
    fn test_switch_fall_through_is_dropped() {
        let source = "switch (x) { case 1: case 2: f(); break; default: g(); }";
        let tree = parse(source);
        let sw = first_if(&tree);
        let collected = collect_switch_branches(sw);
        // `case 1:` is fall-through and dropped; `case 2` and `default` remain.
        assert_eq!(collected.branches.len(), 2);
        assert!(collected.ends_with_default);
        // Trailing break excluded from `case 2`.
        assert_eq!(collected.branches[0].len(), 1);
    }

    #[test]
    fn test_empty_last_clause_is_kept() {
        let source = "switch (x) { case 1: f(); break; case 2: }";
        let tree = parse(source);
        let collected = collect_switch_branches(first_if(&tree));
        assert_eq!(collected.branches.len(), 2);
        assert!(collected.branches[1].is_empty());
        assert!(!collected.ends_with_default);
    }

    #[test]
    fn test_expand_single_block() {
        let source = "switch (x) { case 1: { f(); g(); } }";
        let tree = parse(source);
        let collected = collect_switch_branches(first_if(&tree));
        let expanded = expand_single_block(collected.branches[0].clone());
        assert_eq!(expanded.len(), 2);
        assert_eq!(expanded[0].kind(), "expression_statement");
    }
}
