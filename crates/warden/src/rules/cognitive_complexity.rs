//! Functions should not be too hard to understand.
//!
//! Scores every top-level function with the `gauge` scorer and reports those
//! whose attributed total exceeds the configured threshold.
//!
//! Attribution is two-tier. A top-level function that has structural
//! complexity of its own absorbs its nested functions' contributions (each
//! charged one nesting level below its definition point) and is reported
//! alone. A top-level function with no structural complexity of its own is
//! reported for just its own contributions, and each directly-nested
//! function is reported independently as if it were top-level. Functional
//! components (capitalized name, body returns JSX) never absorb their
//! callbacks — a component's event handlers are scored on their own.

use tree_sitter::Node;

use arbor::nodes::{function_name, is_function_like, main_function_token};
use common::{Finding, IssueLocation, SourceSpan};
use gauge::{analyze_function, FunctionScore, ScoreOptions};

use crate::{FileContext, Rule};

pub const RULE_NAME: &str = "cognitive-complexity";

const MESSAGE: &str = "Refactor this function to reduce its Cognitive Complexity from \
                       {{complexityAmount}} to the {{threshold}} allowed.";

pub struct CognitiveComplexity {
    options: ScoreOptions,
}

impl CognitiveComplexity {
    pub fn new(threshold: u32, treat_jsx_short_circuit_as_free: bool) -> Self {
        Self {
            options: ScoreOptions {
                threshold,
                treat_jsx_short_circuit_as_free,
            },
        }
    }

    fn report(&self, score: &FunctionScore, anchor: SourceSpan, sink: &mut Vec<Finding>) {
        if !score.exceeds(self.options.threshold) {
            return;
        }
        let mut finding = Finding::new(RULE_NAME, "refactorFunction", anchor, MESSAGE)
            .with_data("complexityAmount", score.total.to_string())
            .with_data("threshold", self.options.threshold.to_string())
            .with_cost(score.total);
        for increment in &score.increments {
            finding = finding.with_secondary(IssueLocation::labeled(
                increment.span,
                secondary_label(increment.amount),
            ));
        }
        sink.push(finding);
    }
}

impl<'t> Rule<'t> for CognitiveComplexity {
    fn name(&self) -> &'static str {
        RULE_NAME
    }

    fn visit(&mut self, node: Node<'t>, ctx: &FileContext<'_>, sink: &mut Vec<Finding>) {
        if !is_function_like(node) || has_enclosing_function(node) {
            return;
        }

        let analysis = analyze_function(node, ctx.source, &self.options);
        let component = is_functional_component(node, ctx.source, analysis.returns_jsx);

        if analysis.own_structural && !component {
            self.report(
                &analysis.aggregate_score(),
                main_function_token(node, ctx.source),
                sink,
            );
        } else {
            self.report(
                &analysis.own_score(),
                main_function_token(node, ctx.source),
                sink,
            );
            for scan in &analysis.nested {
                self.report(&scan.standalone_score(), scan.anchor, sink);
            }
        }
    }
}

fn secondary_label(amount: u32) -> String {
    if amount == 1 {
        "+1".to_string()
    } else {
        format!("+{} (incl. {} for nesting)", amount, amount - 1)
    }
}

fn has_enclosing_function(node: Node<'_>) -> bool {
    let mut current = node.parent();
    while let Some(ancestor) = current {
        if is_function_like(ancestor) {
            return true;
        }
        current = ancestor.parent();
    }
    false
}

fn is_functional_component(node: Node<'_>, source: &str, returns_jsx: bool) -> bool {
    returns_jsx
        && function_name(node, source)
            .and_then(|name| name.chars().next())
            .is_some_and(|c| c.is_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor::{Grammar, ParseHost};
    use common::Finding;

    fn run(source: &str, threshold: u32) -> Vec<Finding> {
        let mut host = ParseHost::new();
        let tree = host.parse(source, Grammar::Javascript).unwrap();
        let ctx = FileContext {
            path: "test.js",
            source,
        };
        let mut rule = CognitiveComplexity::new(threshold, true);
        let mut sink = Vec::new();
        visit_all(tree.root_node(), &mut rule, &ctx, &mut sink);
        sink
    }

    fn visit_all<'t>(
        node: tree_sitter::Node<'t>,
        rule: &mut CognitiveComplexity,
        ctx: &FileContext<'_>,
        sink: &mut Vec<Finding>,
    ) {
        rule.visit(node, ctx, sink);
        for child in arbor::nodes::named_children(node) {
            visit_all(child, rule, ctx, sink);
        }
    }

    fn totals(findings: &[Finding]) -> Vec<(u32, u32)> {
        findings
            .iter()
            .map(|f| (f.cost.unwrap(), f.span.start_line))
            .collect()
    }

    #[test]
    fn test_structural_outer_absorbs_nested() {
        let source = "function outer() {
            if (condition) {}
            function nested_func() {
                if (condition) {}
            }
        }";
        let findings = run(source, 0);
        assert_eq!(totals(&findings), vec![(3, 1)]);
    }

    #[test]
    fn test_outer_without_complexity_reports_nested_alone() {
        let source = "function outer() {
            function nested_func() {
                if (condition) {}
            }
        }";
        let findings = run(source, 0);
        assert_eq!(totals(&findings), vec![(1, 2)]);
    }

    #[test]
    fn test_non_structural_outer_splits_the_report() {
        let source = "function outer() {
            return a && b;
            function nested_func() {
                if (condition) {}
            }
        }";
        let findings = run(source, 0);
        assert_eq!(totals(&findings), vec![(1, 1), (1, 3)]);
    }

    #[test]
    fn test_two_level_nesting_reports_at_the_second_level() {
        let source = "function outer() {
            function nested1() {
                function nested2() {
                    if (condition) {}
                }
            }
        }";
        let findings = run(source, 0);
        // nested2's if folds into nested1 one level deeper.
        assert_eq!(totals(&findings), vec![(2, 2)]);
    }

    #[test]
    fn test_second_level_own_plus_deeper() {
        let source = "function outer() {
            function nested1() {
                if (condition) {}
                function nested2() {
                    if (condition) {}
                }
            }
        }";
        let findings = run(source, 0);
        assert_eq!(totals(&findings), vec![(3, 2)]);
    }

    #[test]
    fn test_functional_component_does_not_absorb_handlers() {
        let source = "function Welcome() {
            const handleSomething = () => {
                if (x) {}
            };
            if (x) {}
            return <h1>Hello, world</h1>;
        }";
        let findings = run(source, 0);
        // Component reports its own `if`, the handler reports separately.
        assert_eq!(findings.len(), 2);
        assert!(findings.iter().all(|f| f.cost == Some(1)));
    }

    #[test]
    fn test_secondary_labels_and_message() {
        let source = "function f() { if (a) { if (b) {} } }";
        let findings = run(source, 0);
        assert_eq!(findings.len(), 1);
        let f = &findings[0];
        assert_eq!(f.data["complexityAmount"], "3");
        let labels: Vec<_> = f
            .secondary_locations
            .iter()
            .map(|l| l.message.clone().unwrap())
            .collect();
        assert_eq!(labels, vec!["+1", "+2 (incl. 1 for nesting)"]);
    }

    #[test]
    fn test_primary_location_is_the_function_name() {
        let source = "function deeply() { if (a) {} }";
        let findings = run(source, 0);
        let span = findings[0].span;
        assert_eq!(
            &source[span.start_byte as usize..span.end_byte as usize],
            "deeply"
        );
    }

    #[test]
    fn test_threshold_is_strict() {
        let source = "function f() { if (a) {} }";
        assert!(run(source, 1).is_empty());
        assert_eq!(run(source, 0).len(), 1);
    }

    #[test]
    fn test_iife_arguments_are_separate_top_level_functions() {
        let source = "(function(a) {
            if (cond) {}
            return a;
        })(function(b) { return b + 1 })(0);";
        let findings = run(source, 0);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].cost, Some(1));
    }
}
