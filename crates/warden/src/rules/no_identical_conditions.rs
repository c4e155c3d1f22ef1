//! Related `if / else if` and `switch / case` statements should not have the
//! same condition.
//!
//! An `else if` only runs when every earlier condition in its chain was
//! false. If its condition is covered by one of those earlier conditions —
//! equivalent to it, or a conjunction the earlier one already implies false —
//! the branch is dead. Conditions are decomposed into `||` operands and then
//! `&&` clauses, and coverage is tested with commutative subset matching.
//!
//! For `switch`, two `case` labels testing equivalent expressions duplicate
//! each other outright.

use tree_sitter::Node;

use arbor::nodes::{case_value, condition_of, is_if_statement, operator_of, switch_cases, NodeKind};
use arbor::span_of;
use common::{Finding, IssueLocation};
use mirror::are_equivalent;
use mirror::conditions::{is_subset, split_by_and, split_by_or};

use crate::{FileContext, Rule};

pub const RULE_NAME: &str = "no-identical-conditions";

const CONDITION_MESSAGE: &str = "This condition is covered by the one on line {{line}}";
const CASE_MESSAGE: &str = "This case duplicates the one on line {{line}}";

pub struct NoIdenticalConditions;

impl<'t> Rule<'t> for NoIdenticalConditions {
    fn name(&self) -> &'static str {
        RULE_NAME
    }

    fn visit(&mut self, node: Node<'t>, ctx: &FileContext<'_>, sink: &mut Vec<Finding>) {
        match NodeKind::of(node) {
            NodeKind::IfStatement => check_chain(node, ctx, sink),
            NodeKind::SwitchStatement => check_switch(node, ctx, sink),
            _ => {}
        }
    }
}

fn check_chain(if_stmt: Node<'_>, ctx: &FileContext<'_>, sink: &mut Vec<Finding>) {
    let source = ctx.source;
    let Some(test) = condition_of(if_stmt) else {
        return;
    };

    // `if (a && b)` is covered once `a` alone (or `b` alone) was already
    // tested, so each conjunct is tracked alongside the whole condition.
    let mut conditions = vec![test];
    if test.kind() == "binary_expression" && operator_of(test, source) == Some("&&") {
        conditions.extend(split_by_and(test, source));
    }

    // Per tracked condition: its uncovered `||` operands, each split on `&&`.
    let mut operands: Vec<Vec<Vec<Node<'_>>>> = conditions
        .iter()
        .map(|condition| {
            split_by_or(*condition, source)
                .into_iter()
                .map(|operand| split_by_and(operand, source))
                .collect()
        })
        .collect();

    let mut current = if_stmt;
    while let Some(ancestor) = enclosing_chain_if(current) {
        current = ancestor;
        let Some(ancestor_test) = condition_of(ancestor) else {
            continue;
        };
        let ancestor_operands: Vec<Vec<Node<'_>>> = split_by_or(ancestor_test, source)
            .into_iter()
            .map(|operand| split_by_and(operand, source))
            .collect();

        for tracked in &mut operands {
            tracked.retain(|or_operand| {
                !ancestor_operands
                    .iter()
                    .any(|covering| is_subset(covering, or_operand, source))
            });
        }

        if operands.iter().any(|tracked| tracked.is_empty()) {
            let covering_span = span_of(ancestor_test);
            sink.push(
                Finding::new(
                    RULE_NAME,
                    "duplicatedCondition",
                    span_of(test),
                    CONDITION_MESSAGE,
                )
                .with_data("line", covering_span.start_line.to_string())
                .with_secondary(IssueLocation::labeled(covering_span, "Covering")),
            );
            break;
        }
    }
}

/// The `if` this statement hangs off as an `else` branch, if any.
fn enclosing_chain_if(node: Node<'_>) -> Option<Node<'_>> {
    let clause = node.parent().filter(|p| p.kind() == "else_clause")?;
    clause.parent().filter(|p| is_if_statement(*p))
}

fn check_switch(switch_stmt: Node<'_>, ctx: &FileContext<'_>, sink: &mut Vec<Finding>) {
    let mut previous_tests: Vec<Node<'_>> = Vec::new();
    for case in switch_cases(switch_stmt) {
        let Some(test) = case_value(case) else {
            continue;
        };
        let duplicate = previous_tests
            .iter()
            .find(|previous| are_equivalent(test, **previous, ctx.source));
        match duplicate {
            Some(original) => {
                let original_span = span_of(*original);
                sink.push(
                    Finding::new(RULE_NAME, "duplicatedCase", span_of(test), CASE_MESSAGE)
                        .with_data("line", original_span.start_line.to_string())
                        .with_secondary(IssueLocation::labeled(original_span, "Original")),
                );
            }
            None => previous_tests.push(test),
        }
    }
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
        let mut rule = NoIdenticalConditions;
        let mut sink = Vec::new();
        visit_all(tree.root_node(), &mut rule, &ctx, &mut sink);
        sink
    }

    fn visit_all<'t>(
        node: Node<'t>,
        rule: &mut NoIdenticalConditions,
        ctx: &FileContext<'_>,
        sink: &mut Vec<Finding>,
    ) {
        rule.visit(node, ctx, sink);
        for child in named_children(node) {
            visit_all(child, rule, ctx, sink);
        }
    }

    #[test]
    fn test_identical_condition_in_chain() {
        let findings = run("if (a) { f(); } else if (a) { g(); }");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].message_id, "duplicatedCondition");
        assert_eq!(findings[0].data["line"], "1");
    }

    #[test]
    fn test_conjunction_covered_by_earlier_atom() {
        let findings = run("if (a) { f(); } else if (a && b) { g(); }");
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn test_operand_covered_by_earlier_disjunction() {
        let findings = run("if (a || b) { f(); } else if (a) { g(); }");
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn test_commuted_conjunction_is_covered() {
        let findings = run("if (a && b) { f(); } else if (b && a) { g(); }");
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn test_earlier_conjunction_does_not_cover_atom() {
        // `a && b` false says nothing about `a` alone.
        assert!(run("if (a && b) { f(); } else if (a) { g(); }").is_empty());
    }

    #[test]
    fn test_coverage_found_across_a_long_chain() {
        let findings = run("if (a) {} else if (b) {} else if (a) {}");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].data["line"], "1");
    }

    #[test]
    fn test_unrelated_ifs_are_fine() {
        assert!(run("if (a) { f(); } if (a) { g(); }").is_empty());
    }

    #[test]
    fn test_duplicate_switch_case() {
        let source = "switch (x) {
    case f(a):
        one();
        break;
    case g(b):
        break;
    case f(a):
        two();
        break;
}";
        let findings = run(source);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].message_id, "duplicatedCase");
        assert_eq!(findings[0].data["line"], "2");
        assert_eq!(
            findings[0].secondary_locations[0].message.as_deref(),
            Some("Original")
        );
    }
}
