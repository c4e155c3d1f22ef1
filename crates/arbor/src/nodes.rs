//! Node classification and navigation helpers.
//!
//! The set of node kinds the rules care about is fixed and known at compile
//! time, so dispatch goes through the closed `NodeKind` enum rather than
//! string-keyed lookup. Everything here is query-only navigation over the
//! parser-owned tree.

use tree_sitter::Node;

use crate::tokens::{token_by_text, Token};
use crate::{span_of, tokens};
use common::SourceSpan;

/// The node kinds rule visitors dispatch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    IfStatement,
    SwitchStatement,
    TernaryExpression,
    BinaryExpression,
    FunctionDeclaration,
    GeneratorFunctionDeclaration,
    FunctionExpression,
    GeneratorFunction,
    ArrowFunction,
    MethodDefinition,
    /// Any kind no rule dispatches on.
    Other,
}

impl NodeKind {
    /// Classifies a tree-sitter node.
    pub fn of(node: Node<'_>) -> Self {
        match node.kind() {
            "if_statement" => Self::IfStatement,
            "switch_statement" => Self::SwitchStatement,
            "ternary_expression" => Self::TernaryExpression,
            "binary_expression" => Self::BinaryExpression,
            "function_declaration" => Self::FunctionDeclaration,
            "generator_function_declaration" => Self::GeneratorFunctionDeclaration,
            "function_expression" => Self::FunctionExpression,
            "generator_function" => Self::GeneratorFunction,
            "arrow_function" => Self::ArrowFunction,
            "method_definition" => Self::MethodDefinition,
            _ => Self::Other,
        }
    }
}

/// Returns `true` for every function-defining kind.
pub fn is_function_like(node: Node<'_>) -> bool {
    matches!(
        NodeKind::of(node),
        NodeKind::FunctionDeclaration
            | NodeKind::GeneratorFunctionDeclaration
            | NodeKind::FunctionExpression
            | NodeKind::GeneratorFunction
            | NodeKind::ArrowFunction
            | NodeKind::MethodDefinition
    )
}

pub fn is_if_statement(node: Node<'_>) -> bool {
    node.kind() == "if_statement"
}

pub fn is_block_statement(node: Node<'_>) -> bool {
    node.kind() == "statement_block"
}

pub fn is_break_statement(node: Node<'_>) -> bool {
    node.kind() == "break_statement"
}

/// Returns `true` for JSX element kinds (element, self-closing, fragment).
pub fn is_jsx_element(node: Node<'_>) -> bool {
    matches!(
        node.kind(),
        "jsx_element" | "jsx_self_closing_element" | "jsx_fragment"
    )
}

/// Returns `true` if `op` is a short-circuit logical operator.
pub fn is_logical_operator(op: &str) -> bool {
    matches!(op, "&&" | "||" | "??")
}

/// Named children with comments filtered out.
pub fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| !tokens::is_trivia(*c))
        .collect()
}

/// Strips any number of enclosing `parenthesized_expression` wrappers.
///
/// ESTree-style transparency: the upstream rule semantics were written
/// against an AST with no paren nodes, so every structural comparison and
/// decomposition sees through them.
pub fn unwrap_parens(node: Node<'_>) -> Node<'_> {
    let mut current = node;
    while current.kind() == "parenthesized_expression" {
        match named_children(current).into_iter().next() {
            Some(inner) => current = inner,
            None => break,
        }
    }
    current
}

/// The condition expression of an `if`/`while`/`do`/`switch`, parens stripped.
pub fn condition_of(node: Node<'_>) -> Option<Node<'_>> {
    node.child_by_field_name("condition").map(unwrap_parens)
}

/// Returns `true` if this `if_statement` is the `else if` of an outer chain.
pub fn is_else_if(node: Node<'_>) -> bool {
    node.parent().is_some_and(|p| p.kind() == "else_clause")
}

/// The statement (or chained `if_statement`) inside an `if`'s `else_clause`.
pub fn else_alternative(if_stmt: Node<'_>) -> Option<Node<'_>> {
    let clause = if_stmt.child_by_field_name("alternative")?;
    named_children(clause).into_iter().next()
}

/// The operator token text of a binary expression.
pub fn operator_of<'a>(node: Node<'_>, source: &'a str) -> Option<&'a str> {
    let op = node.child_by_field_name("operator")?;
    Some(&source[op.start_byte()..op.end_byte()])
}

/// The span of a binary expression's operator token.
pub fn operator_span(node: Node<'_>) -> Option<SourceSpan> {
    node.child_by_field_name("operator").map(span_of)
}

/// Finds an anonymous keyword/punctuation child by its kind (`"if"`, `"?"`).
pub fn token_child<'t>(node: Node<'t>, text: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|c| c.kind() == text);
    found
}

/// The `case` and `default` clauses of a `switch_statement`, in order.
pub fn switch_cases<'t>(switch_stmt: Node<'t>) -> Vec<Node<'t>> {
    let Some(body) = switch_stmt.child_by_field_name("body") else {
        return Vec::new();
    };
    named_children(body)
        .into_iter()
        .filter(|c| matches!(c.kind(), "switch_case" | "switch_default"))
        .collect()
}

/// The tested expression of a `switch_case` (`None` for `default`).
pub fn case_value(case: Node<'_>) -> Option<Node<'_>> {
    case.child_by_field_name("value").map(unwrap_parens)
}

/// The consequent statements of a `switch_case` or `switch_default`.
pub fn case_statements<'t>(case: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = case.walk();
    let via_field: Vec<Node<'t>> = case
        .children_by_field_name("body", &mut cursor)
        .filter(|c| !tokens::is_trivia(*c))
        .collect();
    if !via_field.is_empty() {
        return via_field;
    }
    // Grammar versions without a `body` field: everything named after the
    // tested value is a consequent statement.
    let value_id = case.child_by_field_name("value").map(|v| v.id());
    named_children(case)
        .into_iter()
        .filter(|c| Some(c.id()) != value_id)
        .collect()
}

/// Returns a location of the "main" function token:
/// - function name for a declaration or method
/// - `function` keyword for an anonymous function expression
/// - `=>` for an arrow function
pub fn main_function_token(fn_node: Node<'_>, source: &str) -> SourceSpan {
    match NodeKind::of(fn_node) {
        NodeKind::FunctionDeclaration
        | NodeKind::GeneratorFunctionDeclaration
        | NodeKind::MethodDefinition => {
            if let Some(name) = fn_node.child_by_field_name("name") {
                return span_of(name);
            }
            // `export default function() {}` has no name token
            keyword_span(fn_node, source, "function")
        }
        NodeKind::FunctionExpression | NodeKind::GeneratorFunction => {
            if let Some(parent) = fn_node.parent() {
                if parent.kind() == "pair" {
                    if let Some(key) = parent.child_by_field_name("key") {
                        return span_of(key);
                    }
                }
            }
            keyword_span(fn_node, source, "function")
        }
        NodeKind::ArrowFunction => token_child(fn_node, "=>")
            .map(span_of)
            .unwrap_or_else(|| span_of(fn_node)),
        _ => span_of(fn_node),
    }
}

fn keyword_span(node: Node<'_>, source: &str, keyword: &str) -> SourceSpan {
    token_by_text(node, source, keyword)
        .map(|t: Token<'_>| t.span)
        .unwrap_or_else(|| span_of(node))
}

/// The declared or inferred name of a function, if any.
///
/// Falls back to the enclosing `variable_declarator` or object-literal key
/// for anonymous expressions (`const Welcome = () => ...`).
pub fn function_name(fn_node: Node<'_>, source: &str) -> Option<String> {
    if let Some(name) = fn_node.child_by_field_name("name") {
        return Some(source[name.start_byte()..name.end_byte()].to_string());
    }
    let parent = fn_node.parent()?;
    let key = match parent.kind() {
        "variable_declarator" => parent.child_by_field_name("name")?,
        "pair" => parent.child_by_field_name("key")?,
        _ => return None,
    };
    Some(source[key.start_byte()..key.end_byte()].to_string())
}
