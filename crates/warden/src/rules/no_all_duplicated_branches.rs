//! All branches in a conditional structure should not have exactly the same
//! implementation.
//!
//! When every branch of a closed structure (an `if` chain ending in `else`,
//! a `switch` with a `default`, or a ternary) is identical, the condition is
//! pointless: the same code runs either way.

use tree_sitter::Node;

use arbor::nodes::{is_else_if, NodeKind};
use arbor::span_of;
use common::Finding;
use mirror::branches::{collect_if_branches, collect_switch_branches};
use mirror::{are_equivalent, are_lists_equivalent};

use crate::{FileContext, Rule};

pub const RULE_NAME: &str = "no-all-duplicated-branches";

const STRUCTURE_MESSAGE: &str =
    "Remove this conditional structure or edit its code blocks so that they're not all the same.";
const TERNARY_MESSAGE: &str =
    "This conditional operation returns the same value whether the condition is \"true\" or \"false\".";

pub struct NoAllDuplicatedBranches;

impl<'t> Rule<'t> for NoAllDuplicatedBranches {
    fn name(&self) -> &'static str {
        RULE_NAME
    }

    fn visit(&mut self, node: Node<'t>, ctx: &FileContext<'_>, sink: &mut Vec<Finding>) {
        match NodeKind::of(node) {
            NodeKind::TernaryExpression => {
                let (Some(consequence), Some(alternative)) = (
                    node.child_by_field_name("consequence"),
                    node.child_by_field_name("alternative"),
                ) else {
                    return;
                };
                if are_equivalent(consequence, alternative, ctx.source) {
                    sink.push(Finding::new(
                        RULE_NAME,
                        "returnsTheSameValue",
                        span_of(node),
                        TERNARY_MESSAGE,
                    ));
                }
            }
            // `else if` statements are visited through their chain head.
            NodeKind::IfStatement if !is_else_if(node) => {
                let chain = collect_if_branches(node);
                if chain.ends_with_else
                    && chain.branches.len() > 1
                    && chain
                        .branches
                        .windows(2)
                        .all(|pair| are_equivalent(pair[0], pair[1], ctx.source))
                {
                    sink.push(Finding::new(
                        RULE_NAME,
                        "removeOrEditConditionalStructure",
                        span_of(node),
                        STRUCTURE_MESSAGE,
                    ));
                }
            }
            NodeKind::SwitchStatement => {
                let collected = collect_switch_branches(node);
                if collected.ends_with_default
                    && collected.branches.len() > 1
                    && collected
                        .branches
                        .windows(2)
                        .all(|pair| are_lists_equivalent(&pair[0], &pair[1], ctx.source))
                {
                    sink.push(Finding::new(
                        RULE_NAME,
                        "removeOrEditConditionalStructure",
                        span_of(node),
                        STRUCTURE_MESSAGE,
                    ));
                }
            }
            _ => {}
        }
    }
}
