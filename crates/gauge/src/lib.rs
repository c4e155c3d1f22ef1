//! # Gauge: Cognitive Complexity Scorer
//!
//! Computes a nesting-weighted structural complexity score for a function
//! body — a measure of how hard the control flow is to follow, distinct from
//! cyclomatic complexity. Linear sequences of conditions cost less than
//! deeply nested ones; boolean operator chains are charged per operator run,
//! not per operator.
//!
//! ## Charging Rules
//! - `if` (chain head), loops, `switch`, `catch`: **1 + nesting level**, and
//!   their bodies raise the nesting level by one.
//! - `else if` / `else` keywords, the ternary `?`, labeled jumps, operator
//!   runs: **1**, wherever they occur.
//! - A logical expression tree is flattened in order (`&&`, `||`, `??`,
//!   parens transparent); the first operator and every operator change cost
//!   one each: `a && b && c` = 1, `a && b || c` = 2.
//! - A nested function definition costs nothing by itself; its contents are
//!   charged one nesting level below their definition point when aggregated
//!   into the enclosing function's score.
//! - A same-operator chain directly inside a JSX expression container is
//!   rendering composition and is free (see `ScoreOptions`).
//!
//! Scoring never fails on a syntactically valid tree. Unknown node kinds
//! contribute nothing and are walked into generically.

mod walker;

use tree_sitter::Node;

use common::SourceSpan;
use walker::{FunctionPolicy, Walker};

/// Options for a scoring run.
#[derive(Debug, Clone)]
pub struct ScoreOptions {
    /// A finding is reported only when the total exceeds this.
    pub threshold: u32,
    /// Treat same-operator short-circuit chains directly inside JSX
    /// expression containers as free rendering composition.
    pub treat_jsx_short_circuit_as_free: bool,
}

impl Default for ScoreOptions {
    fn default() -> Self {
        Self {
            threshold: 15,
            treat_jsx_short_circuit_as_free: true,
        }
    }
}

/// One raw contribution as encountered by the walker, before a nesting
/// baseline is applied.
#[derive(Debug, Clone, Copy)]
pub struct RawIncrement {
    pub span: SourceSpan,
    /// Structural constructs charge 1 + nesting; flat ones charge 1.
    pub structural: bool,
    /// Nesting level relative to the walked function, before this
    /// increment's own contribution.
    pub nesting: u32,
}

/// One scored contribution of a function.
#[derive(Debug, Clone, Copy)]
pub struct Increment {
    pub span: SourceSpan,
    /// Total charge: 1 for flat constructs, 1 + nesting for structural ones.
    pub amount: u32,
    /// Nesting level at the increment's point, before its own contribution.
    pub nesting: u32,
}

/// The scored result for one function.
#[derive(Debug, Clone)]
pub struct FunctionScore {
    pub total: u32,
    /// Contributions in left-to-right depth-first encounter order.
    pub increments: Vec<Increment>,
}

impl FunctionScore {
    fn from_increments(increments: Vec<Increment>) -> Self {
        Self {
            total: increments.iter().map(|i| i.amount).sum(),
            increments,
        }
    }

    /// `true` when this score must be reported against `threshold`.
    pub fn exceeds(&self, threshold: u32) -> bool {
        self.total > threshold
    }
}

/// The raw scan of one directly-nested (second-level) function.
#[derive(Debug, Clone)]
pub struct NestedScan {
    /// Span of the whole nested function definition.
    pub span: SourceSpan,
    /// The nested function's "main" token (name, `function`, or `=>`).
    pub anchor: SourceSpan,
    /// Control-flow nesting at the definition point inside the enclosing
    /// function.
    pub definition_nesting: u32,
    /// Contributions relative to the nested function itself; deeper function
    /// boundaries inside it are already folded in as one level each.
    pub increments: Vec<RawIncrement>,
}

impl NestedScan {
    /// The nested function scored as if it were itself top-level.
    pub fn standalone_score(&self) -> FunctionScore {
        FunctionScore::from_increments(charge(&self.increments, 0))
    }

    /// Contributions charged for absorption into the enclosing function:
    /// one level below the definition point.
    fn absorbed(&self) -> Vec<Increment> {
        charge(&self.increments, self.definition_nesting + 1)
    }
}

/// The full analysis of one function: its own contributions plus one scan
/// per directly-nested function, ready for either attribution policy.
#[derive(Debug, Clone)]
pub struct FunctionAnalysis {
    /// Contributions lexically in the function, outside nested functions.
    pub own: Vec<RawIncrement>,
    /// Whether any own contribution is structural (control flow rather than
    /// an operator run, ternary, or labeled jump).
    pub own_structural: bool,
    /// Whether the function's own body returns a JSX element.
    pub returns_jsx: bool,
    /// One scan per directly-nested function, in source order.
    pub nested: Vec<NestedScan>,
}

impl FunctionAnalysis {
    /// The function's own contributions only.
    pub fn own_score(&self) -> FunctionScore {
        FunctionScore::from_increments(charge(&self.own, 0))
    }

    /// Own contributions plus every nested function's contributions charged
    /// one level below its definition point, merged into source order.
    pub fn aggregate_score(&self) -> FunctionScore {
        let mut increments = charge(&self.own, 0);
        for scan in &self.nested {
            increments.extend(scan.absorbed());
        }
        increments.sort_by_key(|i| i.span.start_byte);
        FunctionScore::from_increments(increments)
    }
}

fn charge(raw: &[RawIncrement], baseline: u32) -> Vec<Increment> {
    raw.iter()
        .map(|r| {
            let nesting = baseline + r.nesting;
            Increment {
                span: r.span,
                amount: if r.structural { 1 + nesting } else { 1 },
                nesting,
            }
        })
        .collect()
}

/// Analyzes one function, returning its own contributions and the raw scans
/// of its directly-nested functions.
///
/// Fully self-contained and re-entrant; the accumulator never escapes the
/// call.
pub fn analyze_function(fn_node: Node<'_>, source: &str, opts: &ScoreOptions) -> FunctionAnalysis {
    let mut walker = Walker::new(source, opts, FunctionPolicy::Collect);
    walker.walk_function(fn_node);
    FunctionAnalysis {
        own: walker.raw,
        own_structural: walker.structural_seen,
        returns_jsx: walker.returns_jsx,
        nested: walker.nested,
    }
}

/// Scores one function: its own contributions plus nested functions charged
/// one level below their definition points.
pub fn score_function(fn_node: Node<'_>, source: &str, opts: &ScoreOptions) -> FunctionScore {
    analyze_function(fn_node, source, opts).aggregate_score()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
