//! Functions should not have identical implementations.
//!
//! Candidates are buffered during the traversal and compared pairwise only
//! once the whole file has been visited. Bodies are bucketed by token
//! fingerprint first, so the quadratic pass only ever runs exact equivalence
//! on plausible pairs. Only functions of a configurable minimum size are
//! worth reporting (default 3 lines) — tiny bodies duplicate by accident.

use tree_sitter::Node;

use arbor::nodes::{main_function_token, NodeKind};
use arbor::span_of;
use arbor::tokens::tokens;
use common::{Finding, IssueLocation};
use mirror::{are_equivalent, token_fingerprint};

use crate::{FileContext, Rule};

pub const RULE_NAME: &str = "no-identical-functions";

const MESSAGE: &str =
    "Update this function so that its implementation is not identical to the one on line {{line}}.";

struct Candidate<'t> {
    node: Node<'t>,
    body: Node<'t>,
    fingerprint: u64,
}

pub struct NoIdenticalFunctions<'t> {
    min_lines: u32,
    functions: Vec<Candidate<'t>>,
}

impl NoIdenticalFunctions<'_> {
    pub fn new(min_lines: u32) -> Self {
        Self {
            min_lines,
            functions: Vec::new(),
        }
    }
}

impl<'t> Rule<'t> for NoIdenticalFunctions<'t> {
    fn name(&self) -> &'static str {
        RULE_NAME
    }

    fn visit(&mut self, node: Node<'t>, ctx: &FileContext<'_>, _sink: &mut Vec<Finding>) {
        let candidate = match NodeKind::of(node) {
            NodeKind::FunctionDeclaration
            | NodeKind::GeneratorFunctionDeclaration
            | NodeKind::MethodDefinition => true,
            NodeKind::FunctionExpression
            | NodeKind::GeneratorFunction
            | NodeKind::ArrowFunction => node
                .parent()
                .is_some_and(|p| p.kind() == "variable_declarator"),
            _ => false,
        };
        if !candidate {
            return;
        }
        let Some(body) = node.child_by_field_name("body") else {
            return;
        };
        if !is_big_enough(body, ctx.source, self.min_lines) {
            return;
        }
        self.functions.push(Candidate {
            node,
            body,
            fingerprint: token_fingerprint(body, ctx.source),
        });
    }

    fn finish(&mut self, ctx: &FileContext<'_>, sink: &mut Vec<Finding>) {
        for index in 1..self.functions.len() {
            let duplicating = &self.functions[index];
            for earlier in 0..index {
                let original = &self.functions[earlier];
                if duplicating.fingerprint != original.fingerprint {
                    continue;
                }
                if !are_equivalent(duplicating.body, original.body, ctx.source) {
                    continue;
                }
                let original_anchor = main_function_token(original.node, ctx.source);
                sink.push(
                    Finding::new(
                        RULE_NAME,
                        "identicalFunctions",
                        main_function_token(duplicating.node, ctx.source),
                        MESSAGE,
                    )
                    .with_data("line", span_of(original.node).start_line.to_string())
                    .with_secondary(IssueLocation::labeled(
                        original_anchor,
                        "Original implementation",
                    )),
                );
                break;
            }
        }
    }
}

/// Body token lines (braces excluded) must reach the configured minimum.
fn is_big_enough(body: Node<'_>, source: &str, min_lines: u32) -> bool {
    let mut toks = tokens(body, source);
    if toks.first().is_some_and(|t| t.text == "{") {
        toks.remove(0);
    }
    if toks.last().is_some_and(|t| t.text == "}") {
        toks.pop();
    }
    match (toks.first(), toks.last()) {
        (Some(first), Some(last)) => {
            last.span.end_line - first.span.start_line + 1 >= min_lines
        }
        _ => false,
    }
}
