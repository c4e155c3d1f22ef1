//! Two branches in a conditional structure should not have exactly the same
//! implementation.
//!
//! Compares the branches of an `if` chain and the clauses of a `switch`
//! pairwise via structural equivalence. Single-line branches are too small
//! to be worth a finding and are skipped; the all-branches-identical case of
//! a closed structure belongs to `no-all-duplicated-branches` and is skipped
//! here unless the chain is open.

use tree_sitter::Node;

use arbor::nodes::{case_statements, case_value, is_else_if, switch_cases, NodeKind};
use arbor::span_of;
use arbor::tokens::tokens;
use common::{Finding, IssueLocation};
use mirror::branches::{collect_if_branches, expand_single_block, take_without_break};
use mirror::{are_equivalent, are_lists_equivalent};

use crate::{FileContext, Rule};

pub const RULE_NAME: &str = "no-duplicated-branches";

const MESSAGE: &str =
    "This {{type}}'s code block is the same as the block for the {{type}} on line {{line}}.";

pub struct NoDuplicatedBranches;

impl<'t> Rule<'t> for NoDuplicatedBranches {
    fn name(&self) -> &'static str {
        RULE_NAME
    }

    fn visit(&mut self, node: Node<'t>, ctx: &FileContext<'_>, sink: &mut Vec<Finding>) {
        match NodeKind::of(node) {
            NodeKind::IfStatement if !is_else_if(node) => check_if(node, ctx, sink),
            NodeKind::SwitchStatement => check_switch(node, ctx, sink),
            _ => {}
        }
    }
}

fn check_if(if_stmt: Node<'_>, ctx: &FileContext<'_>, sink: &mut Vec<Finding>) {
    let chain = collect_if_branches(if_stmt);
    let branches = &chain.branches;

    // An open chain whose branches are all identical is reported here in
    // full; the closed variant is the other rule's finding.
    if !chain.ends_with_else
        && branches.len() > 1
        && branches
            .windows(2)
            .all(|pair| are_equivalent(pair[0], pair[1], ctx.source))
    {
        for index in 1..branches.len() {
            report(branches[index], branches[index - 1], "branch", sink);
        }
        return;
    }

    for index in 1..branches.len() {
        if !has_required_size(&branches[index..=index], ctx.source) {
            continue;
        }
        for earlier in 0..index {
            if are_equivalent(branches[index], branches[earlier], ctx.source) {
                report(branches[index], branches[earlier], "branch", sink);
                break;
            }
        }
    }
}

fn check_switch(switch_stmt: Node<'_>, ctx: &FileContext<'_>, sink: &mut Vec<Finding>) {
    let cases = switch_cases(switch_stmt);
    let ends_with_default = cases.iter().any(|case| case_value(*case).is_none());
    let bodies: Vec<Vec<Node<'_>>> = cases
        .iter()
        .map(|case| take_without_break(expand_single_block(case_statements(*case))))
        .collect();

    let non_empty: Vec<usize> = (0..cases.len()).filter(|i| !bodies[*i].is_empty()).collect();

    if !ends_with_default
        && non_empty.len() > 1
        && non_empty
            .windows(2)
            .all(|pair| are_lists_equivalent(&bodies[pair[0]], &bodies[pair[1]], ctx.source))
    {
        for pair in non_empty.windows(2) {
            report(cases[pair[1]], cases[pair[0]], "case", sink);
        }
        return;
    }

    for index in 1..cases.len() {
        if !has_required_size(&bodies[index], ctx.source) {
            continue;
        }
        for earlier in 0..index {
            if are_lists_equivalent(&bodies[index], &bodies[earlier], ctx.source) {
                report(cases[index], cases[earlier], "case", sink);
                break;
            }
        }
    }
}

/// A branch is worth reporting only when its statements span several lines:
/// the first and last statement's tokens (braces excluded) must not end on
/// the line they start on.
fn has_required_size(nodes: &[Node<'_>], source: &str) -> bool {
    let (Some(first), Some(last)) = (nodes.first(), nodes.last()) else {
        return false;
    };
    let boundary: Vec<_> = tokens(*first, source)
        .into_iter()
        .chain(tokens(*last, source))
        .filter(|t| t.text != "{" && t.text != "}")
        .collect();
    match (boundary.first(), boundary.last()) {
        (Some(head), Some(tail)) => tail.span.end_line > head.span.start_line,
        _ => false,
    }
}

fn report(node: Node<'_>, original: Node<'_>, kind: &str, sink: &mut Vec<Finding>) {
    let original_span = span_of(original);
    sink.push(
        Finding::new(RULE_NAME, "sameConditionalBlock", span_of(node), MESSAGE)
            .with_data("type", kind)
            .with_data("line", original_span.start_line.to_string())
            .with_secondary(IssueLocation::labeled(original_span, "Original")),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor::nodes::named_children;
    use arbor::{Grammar, ParseHost};

    fn run(source: &str) -> Vec<Finding> {
        let mut host = ParseHost::new();
        let tree = host.parse(source, Grammar::Javascript).unwrap();
        let ctx = FileContext {
            path: "test.js",
            source,
        };
        let mut rule = NoDuplicatedBranches;
        let mut sink = Vec::new();
        visit_all(tree.root_node(), &mut rule, &ctx, &mut sink);
        sink
    }

    fn visit_all<'t>(
        node: Node<'t>,
        rule: &mut NoDuplicatedBranches,
        ctx: &FileContext<'_>,
        sink: &mut Vec<Finding>,
    ) {
        rule.visit(node, ctx, sink);
        for child in named_children(node) {
            visit_all(child, rule, ctx, sink);
        }
    }

    #[test]
    fn test_multiline_duplicate_branch() {
        let source = "if (a) {
    f();
    g();
} else if (b) {
    h();
} else {
    f();
    g();
}";
        let findings = run(source);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].data["type"], "branch");
        assert_eq!(findings[0].data["line"], "1");
    }

    #[test]
    fn test_single_line_branches_are_too_small() {
        let source = "if (a) { f(); } else { f(); }";
        // Closed chain with all branches equal belongs to the other rule;
        // an open one with single-line branches is skipped entirely.
        let open = "if (a) { f(); } else if (b) { g(); } else if (c) { f(); }";
        assert!(run(source).is_empty());
        assert!(run(open).is_empty());
    }

    #[test]
    fn test_open_chain_with_all_branches_equal_reports_each() {
        let source = "if (a) { f(); } else if (b) { f(); }";
        let findings = run(source);
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn test_duplicate_switch_cases() {
        let source = "switch (x) {
    case 1:
        f();
        g();
        break;
    case 2:
        h();
        break;
    case 3:
        f();
        g();
        break;
}";
        let findings = run(source);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].data["type"], "case");
        assert_eq!(findings[0].data["line"], "2");
    }

    #[test]
    fn test_case_matches_block_wrapped_case() {
        let source = "switch (x) {
    case 1: {
        f();
        g();
        break;
    }
    case 2:
        f();
        g();
        break;
}";
        let findings = run(source);
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn test_different_branches_are_fine() {
        let source = "if (a) {
    f();
    g();
} else {
    g();
    f();
}";
        assert!(run(source).is_empty());
    }
}
