//! # Warden: Rule Engine
//!
//! **Role**: Drives every registered rule over a parsed file in one
//! depth-first traversal and collects their findings.
//!
//! **Design**:
//! - Rules are visitors: `visit` fires for every named node, `finish` fires
//!   once at end of traversal (used by whole-file rules such as duplicate
//!   function detection, which must buffer candidates first).
//! - Dispatch goes through the closed `arbor::nodes::NodeKind` enum — the
//!   set of interesting kinds is fixed at compile time.
//! - Rules are constructed fresh per file; no state survives a traversal.
//! - Analysis is single-threaded and synchronous; rules only read the
//!   shared tree and push `Finding`s into the shared sink.

pub mod report;
pub mod rules;

use tree_sitter::{Node, Tree};

use arbor::nodes::named_children;
use common::Finding;
use tracing::debug;

use rules::cognitive_complexity::CognitiveComplexity;
use rules::no_all_duplicated_branches::NoAllDuplicatedBranches;
use rules::no_duplicated_branches::NoDuplicatedBranches;
use rules::no_identical_conditions::NoIdenticalConditions;
use rules::no_identical_expressions::NoIdenticalExpressions;
use rules::no_identical_functions::NoIdenticalFunctions;

/// Per-rule knobs, shared by the engine and the CLI.
#[derive(Debug, Clone)]
pub struct RuleConfig {
    /// `cognitive-complexity`: report only totals above this.
    pub complexity_threshold: u32,
    /// `no-identical-functions`: minimum body size worth comparing.
    pub min_function_lines: u32,
    /// `cognitive-complexity`: JSX rendering chains are free.
    pub treat_jsx_short_circuit_as_free: bool,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            complexity_threshold: 15,
            min_function_lines: 3,
            treat_jsx_short_circuit_as_free: true,
        }
    }
}

/// Read-only file context handed to every rule callback.
#[derive(Debug, Clone, Copy)]
pub struct FileContext<'a> {
    pub path: &'a str,
    pub source: &'a str,
}

/// A lint rule driven by the engine's single traversal.
pub trait Rule<'t> {
    /// Stable rule identifier (kebab-case).
    fn name(&self) -> &'static str;

    /// Called for every named node in pre-order.
    fn visit(&mut self, node: Node<'t>, ctx: &FileContext<'_>, sink: &mut Vec<Finding>);

    /// Called once after the traversal completes.
    fn finish(&mut self, _ctx: &FileContext<'_>, _sink: &mut Vec<Finding>) {}
}

/// Builds the full rule set for one file traversal.
pub fn default_rules<'t>(config: &RuleConfig) -> Vec<Box<dyn Rule<'t> + 't>> {
    vec![
        Box::new(CognitiveComplexity::new(
            config.complexity_threshold,
            config.treat_jsx_short_circuit_as_free,
        )),
        Box::new(NoDuplicatedBranches),
        Box::new(NoAllDuplicatedBranches),
        Box::new(NoIdenticalConditions),
        Box::new(NoIdenticalExpressions),
        Box::new(NoIdenticalFunctions::new(config.min_function_lines)),
    ]
}

/// Names of every registered rule, in registration order.
pub fn rule_names() -> Vec<&'static str> {
    default_rules(&RuleConfig::default())
        .iter()
        .map(|r| r.name())
        .collect()
}

/// The analysis engine: configuration plus an optional rule filter.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: RuleConfig,
    enabled: Option<Vec<String>>,
}

impl Engine {
    pub fn new(config: RuleConfig) -> Self {
        Self {
            config,
            enabled: None,
        }
    }

    /// Restricts the run to the named rules.
    pub fn with_rule_filter(mut self, names: Vec<String>) -> Self {
        self.enabled = Some(names);
        self
    }

    /// Runs every enabled rule over one parsed file.
    ///
    /// Findings come back ordered by source position, then rule name.
    pub fn analyze<'t>(&self, tree: &'t Tree, ctx: &FileContext<'_>) -> Vec<Finding> {
        let mut rules = default_rules(&self.config);
        if let Some(enabled) = &self.enabled {
            rules.retain(|r| enabled.iter().any(|n| n == r.name()));
        }

        let mut findings = Vec::new();
        visit_all(tree.root_node(), &mut rules, ctx, &mut findings);
        for rule in &mut rules {
            rule.finish(ctx, &mut findings);
        }

        findings.sort_by(|a, b| {
            (a.span.start_byte, a.rule).cmp(&(b.span.start_byte, b.rule))
        });
        debug!(path = ctx.path, count = findings.len(), "file analyzed");
        findings
    }
}

fn visit_all<'t>(
    node: Node<'t>,
    rules: &mut [Box<dyn Rule<'t> + 't>],
    ctx: &FileContext<'_>,
    sink: &mut Vec<Finding>,
) {
    for rule in rules.iter_mut() {
        rule.visit(node, ctx, sink);
    }
    for child in named_children(node) {
        visit_all(child, rules, ctx, sink);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
