//! Identical expressions should not be used on both sides of a binary
//! operator.
//!
//! `a.b && a.b`, `x / x`, `y < y` — the right side repeats the left, so the
//! operator is doing nothing (or the author meant something else). Equality
//! operators are only checked when the operands are not bare identifiers:
//! `x !== x` is the idiomatic NaN test and stays legal. `1 << 1` is a
//! legitimate bit-flag construction and is exempt.

use tree_sitter::Node;

use arbor::nodes::{operator_of, unwrap_parens, NodeKind};
use arbor::span_of;
use common::{Finding, IssueLocation};
use mirror::are_equivalent;

use crate::{FileContext, Rule};

pub const RULE_NAME: &str = "no-identical-expressions";

const MESSAGE: &str =
    "Correct one of the identical sub-expressions on both sides of operator \"{{operator}}\"";

const RELEVANT_OPERATORS: &[&str] = &["&&", "||", "/", "-", "<<", ">>", "<", "<=", ">", ">="];
const EQUALITY_OPERATORS: &[&str] = &["==", "===", "!=", "!=="];

pub struct NoIdenticalExpressions;

impl<'t> Rule<'t> for NoIdenticalExpressions {
    fn name(&self) -> &'static str {
        RULE_NAME
    }

    fn visit(&mut self, node: Node<'t>, ctx: &FileContext<'_>, sink: &mut Vec<Finding>) {
        if NodeKind::of(node) != NodeKind::BinaryExpression {
            return;
        }
        let source = ctx.source;
        let Some(operator) = operator_of(node, source) else {
            return;
        };
        let (Some(left), Some(right)) = (
            node.child_by_field_name("left"),
            node.child_by_field_name("right"),
        ) else {
            return;
        };

        if !has_relevant_operator(operator, left, right)
            || is_one_onto_one_shifting(operator, left, source)
            || !are_equivalent(left, right, source)
        {
            return;
        }

        sink.push(
            Finding::new(RULE_NAME, "correctIdenticalSubExpressions", span_of(node), MESSAGE)
                .with_data("operator", operator)
                .with_secondary(IssueLocation::from_span(span_of(left))),
        );
    }
}

fn has_relevant_operator(operator: &str, left: Node<'_>, right: Node<'_>) -> bool {
    RELEVANT_OPERATORS.contains(&operator)
        || (EQUALITY_OPERATORS.contains(&operator) && !has_identifier_operands(left, right))
}

fn has_identifier_operands(left: Node<'_>, right: Node<'_>) -> bool {
    unwrap_parens(left).kind() == "identifier" && unwrap_parens(right).kind() == "identifier"
}

fn is_one_onto_one_shifting(operator: &str, left: Node<'_>, source: &str) -> bool {
    let left = unwrap_parens(left);
    operator == "<<"
        && left.kind() == "number"
        && &source[left.start_byte()..left.end_byte()] == "1"
}
