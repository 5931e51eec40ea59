//! Tenant business rules that gate structurally valid transitions.
//!
//! Provides rule types, a condition parser, and a pure-logic evaluator. The
//! database layer maps stored rows into [`RuleSpec`] before evaluation.

pub mod conditions;
pub mod evaluator;

use serde::{Deserialize, Serialize};

use crate::roles::Role;
use crate::types::{DbId, Price};

pub use conditions::{parse_rule_conditions, RuleCondition};
pub use evaluator::evaluate_transition_rules;

/// Maximum length of a rule name.
pub const MAX_RULE_NAME_LENGTH: usize = 200;

/// Default priority for rules created without one. Lower runs first.
pub const DEFAULT_RULE_PRIORITY: i32 = 100;

/// A rule in evaluation form.
#[derive(Debug, Clone)]
pub struct RuleSpec {
    pub rule_id: DbId,
    pub name: String,
    pub priority: i32,
    pub required_role: Option<Role>,
    pub conditions: Vec<RuleCondition>,
}

/// Facts about the acting user and property that rules are checked against.
#[derive(Debug, Clone, Copy)]
pub struct TransitionContext {
    pub acting_role: Role,
    pub price: Option<Price>,
}

/// Why a single rule blocked a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockReason {
    RoleRequired { required: Role, actual: Role },
    BelowMinPrice { min_price: Price, price: Option<Price> },
    AboveMaxPrice { max_price: Price, price: Option<Price> },
}

/// A rule that blocked the transition, with every reason it failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockedRule {
    pub rule_id: DbId,
    pub name: String,
    pub reasons: Vec<BlockReason>,
}

/// Aggregated outcome of evaluating all applicable rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleEvaluation {
    pub can_transition: bool,
    pub blocked_by: Vec<BlockedRule>,
    /// The highest-priority role requirement the acting user did not meet.
    pub required_role: Option<Role>,
}

impl RuleEvaluation {
    /// Names of the blocking rules, in evaluation order.
    pub fn blocking_rule_names(&self) -> Vec<String> {
        self.blocked_by.iter().map(|b| b.name.clone()).collect()
    }
}
