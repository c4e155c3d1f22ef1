//! The recursive descent that accumulates complexity increments.
//!
//! One `Walker` scores one function. Constructs are charged where they are
//! encountered; the nesting counter follows strict stack discipline (raised
//! entering the body of a nesting construct, restored on exit). Unknown node
//! kinds contribute nothing and are descended into generically, so nested
//! complexity inside unanticipated kinds is never missed.

use std::collections::HashSet;

use tree_sitter::Node;

use arbor::nodes::{
    else_alternative, is_function_like, is_if_statement, is_jsx_element, is_logical_operator,
    named_children, operator_of, operator_span, token_child, unwrap_parens,
};
use arbor::span_of;
use common::SourceSpan;

use crate::{NestedScan, RawIncrement, ScoreOptions};

/// How the walker treats nested function definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FunctionPolicy {
    /// Record each directly-nested function as a separate `NestedScan`
    /// (used for the function under analysis itself).
    Collect,
    /// Fold nested functions into the current record, one extra nesting
    /// level per function boundary (used inside a `NestedScan`).
    Fold,
}

pub(crate) struct Walker<'a> {
    source: &'a str,
    opts: &'a ScoreOptions,
    policy: FunctionPolicy,
    nesting: u32,
    pub(crate) raw: Vec<RawIncrement>,
    pub(crate) nested: Vec<NestedScan>,
    pub(crate) structural_seen: bool,
    pub(crate) returns_jsx: bool,
    /// Logical operator nodes already consumed by a chain flattening.
    counted_operators: HashSet<usize>,
}

/// One operator link of a flattened logical expression, in source order.
struct Link<'t, 'a> {
    node: Node<'t>,
    op: &'a str,
    span: SourceSpan,
}

impl<'a> Walker<'a> {
    pub(crate) fn new(source: &'a str, opts: &'a ScoreOptions, policy: FunctionPolicy) -> Self {
        Self {
            source,
            opts,
            policy,
            nesting: 0,
            raw: Vec::new(),
            nested: Vec::new(),
            structural_seen: false,
            returns_jsx: false,
            counted_operators: HashSet::new(),
        }
    }

    /// Walks the interior of a function node (parameters and body) without
    /// treating the function itself as a boundary.
    pub(crate) fn walk_function(&mut self, fn_node: Node<'_>) {
        for child in named_children(fn_node) {
            self.process(child);
        }
    }

    fn record(&mut self, span: SourceSpan, structural: bool) {
        if structural {
            self.structural_seen = true;
        }
        self.raw.push(RawIncrement {
            span,
            structural,
            nesting: self.nesting,
        });
    }

    fn with_nesting(&mut self, node: Node<'_>) {
        self.nesting += 1;
        self.process(node);
        self.nesting -= 1;
    }

    fn descend(&mut self, node: Node<'_>) {
        for child in named_children(node) {
            self.process(child);
        }
    }

    fn process(&mut self, node: Node<'_>) {
        if is_function_like(node) {
            self.process_function(node);
            return;
        }
        match node.kind() {
            "if_statement" => self.process_if(node, true),
            "while_statement" => self.process_nesting_construct(node, "while"),
            "do_statement" => self.process_nesting_construct(node, "do"),
            "for_statement" | "for_in_statement" => self.process_nesting_construct(node, "for"),
            "switch_statement" => self.process_nesting_construct(node, "switch"),
            "catch_clause" => self.process_nesting_construct(node, "catch"),
            "ternary_expression" => {
                if let Some(mark) = token_child(node, "?") {
                    self.record(span_of(mark), false);
                }
                self.descend(node);
            }
            "break_statement" | "continue_statement" => {
                if node.child_by_field_name("label").is_some() {
                    if let Some(keyword) = node.child(0) {
                        self.record(span_of(keyword), false);
                    }
                }
            }
            "binary_expression" => {
                self.process_logical(node);
                self.descend(node);
            }
            "return_statement" => {
                if self.policy == FunctionPolicy::Collect {
                    if let Some(argument) = named_children(node).into_iter().next() {
                        if is_jsx_element(unwrap_parens(argument)) {
                            self.returns_jsx = true;
                        }
                    }
                }
                self.descend(node);
            }
            _ => self.descend(node),
        }
    }

    /// Charges a structural construct (+1 + nesting at its keyword) and
    /// walks its body one level deeper; everything else stays ambient.
    fn process_nesting_construct(&mut self, node: Node<'_>, keyword: &str) {
        let span = token_child(node, keyword)
            .map(span_of)
            .unwrap_or_else(|| span_of(node));
        self.record(span, true);

        let body_id = node.child_by_field_name("body").map(|b| b.id());
        for child in named_children(node) {
            if Some(child.id()) == body_id {
                self.with_nesting(child);
            } else {
                self.process(child);
            }
        }
    }

    /// Walks a whole `if / else if / else` chain.
    ///
    /// The chain head is structural; every further `if` keyword and the
    /// closing `else` are flat increments at their own point. Each branch
    /// body sits one nesting level below the chain's ambient level.
    fn process_if(&mut self, node: Node<'_>, chain_head: bool) {
        let if_span = token_child(node, "if")
            .map(span_of)
            .unwrap_or_else(|| span_of(node));
        self.record(if_span, chain_head);

        if let Some(condition) = node.child_by_field_name("condition") {
            self.process(condition);
        }
        if let Some(consequence) = node.child_by_field_name("consequence") {
            self.with_nesting(consequence);
        }
        if let Some(alternative) = else_alternative(node) {
            if is_if_statement(alternative) {
                self.process_if(alternative, false);
            } else {
                if let Some(clause) = node.child_by_field_name("alternative") {
                    if let Some(keyword) = token_child(clause, "else") {
                        self.record(span_of(keyword), false);
                    }
                }
                self.with_nesting(alternative);
            }
        }
    }

    /// Counts a logical operator chain: the whole (possibly mixed) tree is
    /// flattened in order through parentheses, then one increment is charged
    /// for the first operator and one at every operator change.
    fn process_logical(&mut self, node: Node<'_>) {
        let Some(op) = operator_of(node, self.source) else {
            return;
        };
        if !is_logical_operator(op) || self.counted_operators.contains(&node.id()) {
            return;
        }

        // Markup composition idiom: a same-operator chain directly inside a
        // JSX expression container renders a child conditionally and is not
        // counted. Mixed chains and chains holding a ternary are control
        // flow and stay counted.
        if self.opts.treat_jsx_short_circuit_as_free
            && node.parent().is_some_and(|p| p.kind() == "jsx_expression")
        {
            if let Some(chain) = flatten_jsx_chain(node, op, self.source) {
                for link in chain {
                    self.counted_operators.insert(link.id());
                }
                return;
            }
        }

        let mut chain = Vec::new();
        flatten_in_order(node, self.source, &mut chain);
        let mut previous: Option<&str> = None;
        for link in chain {
            self.counted_operators.insert(link.node.id());
            if previous != Some(link.op) {
                self.record(link.span, false);
            }
            previous = Some(link.op);
        }
    }

    fn process_function(&mut self, node: Node<'_>) {
        match self.policy {
            FunctionPolicy::Fold => {
                self.nesting += 1;
                self.descend(node);
                self.nesting -= 1;
            }
            FunctionPolicy::Collect => {
                let mut sub = Walker::new(self.source, self.opts, FunctionPolicy::Fold);
                sub.walk_function(node);
                self.nested.push(NestedScan {
                    span: span_of(node),
                    anchor: arbor::nodes::main_function_token(node, self.source),
                    definition_nesting: self.nesting,
                    increments: sub.raw,
                });
            }
        }
    }
}

/// In-order flattening of a logical expression tree, parens transparent.
fn flatten_in_order<'t, 'a>(node: Node<'t>, source: &'a str, out: &mut Vec<Link<'t, 'a>>) {
    let node = unwrap_parens(node);
    if node.kind() == "binary_expression" {
        if let Some(op) = operator_of(node, source) {
            if is_logical_operator(op) {
                if let (Some(left), Some(right)) = (
                    node.child_by_field_name("left"),
                    node.child_by_field_name("right"),
                ) {
                    flatten_in_order(left, source, out);
                    out.push(Link {
                        node,
                        op,
                        span: operator_span(node).unwrap_or_else(|| span_of(node)),
                    });
                    flatten_in_order(right, source, out);
                }
            }
        }
    }
}

/// Flattens a JSX short-circuit chain, or `None` when the chain is not the
/// free rendering idiom (mixed operators or a ternary anywhere inside it).
fn flatten_jsx_chain<'t>(root: Node<'t>, root_op: &str, source: &str) -> Option<Vec<Node<'t>>> {
    let mut out = Vec::new();
    if collect_jsx_chain(root, root_op, source, &mut out) {
        Some(out)
    } else {
        None
    }
}

fn collect_jsx_chain<'t>(
    node: Node<'t>,
    root_op: &str,
    source: &str,
    out: &mut Vec<Node<'t>>,
) -> bool {
    let node = unwrap_parens(node);
    if node.kind() == "ternary_expression" {
        return false;
    }
    if node.kind() == "binary_expression" {
        if let Some(op) = operator_of(node, source) {
            if is_logical_operator(op) {
                if op != root_op {
                    return false;
                }
                let (Some(left), Some(right)) = (
                    node.child_by_field_name("left"),
                    node.child_by_field_name("right"),
                ) else {
                    return false;
                };
                if !collect_jsx_chain(left, root_op, source, out) {
                    return false;
                }
                out.push(node);
                return collect_jsx_chain(right, root_op, source, out);
            }
        }
    }
    // A non-logical operand contributes no operators of its own.
    true
}
