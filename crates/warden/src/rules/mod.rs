//! The rule set.
//!
//! Every rule is a thin visitor over the primitives in `mirror` and `gauge`:
//! the structural work lives there, the policy lives here.

pub mod cognitive_complexity;
pub mod no_all_duplicated_branches;
pub mod no_duplicated_branches;
pub mod no_identical_conditions;
pub mod no_identical_expressions;
pub mod no_identical_functions;
