//! Rule evaluator. Pure logic, no database access.

use super::conditions::RuleCondition;
use super::{BlockReason, BlockedRule, RuleEvaluation, RuleSpec, TransitionContext};

/// Evaluate every applicable rule against a requested transition.
///
/// Rules are visited in ascending `(priority, rule_id)` order and all of them
/// are evaluated, so the caller gets the complete list of blocking rules.
/// An empty rule set allows the transition.
pub fn evaluate_transition_rules(rules: &[RuleSpec], ctx: &TransitionContext) -> RuleEvaluation {
    let mut ordered: Vec<&RuleSpec> = rules.iter().collect();
    ordered.sort_by_key(|r| (r.priority, r.rule_id));

    let mut blocked_by = Vec::new();
    let mut required_role = None;

    for rule in ordered {
        let reasons = evaluate_single_rule(rule, ctx);
        if reasons.is_empty() {
            continue;
        }

        if required_role.is_none() {
            required_role = reasons.iter().find_map(|r| match r {
                BlockReason::RoleRequired { required, .. } => Some(*required),
                _ => None,
            });
        }

        blocked_by.push(BlockedRule {
            rule_id: rule.rule_id,
            name: rule.name.clone(),
            reasons,
        });
    }

    RuleEvaluation {
        can_transition: blocked_by.is_empty(),
        blocked_by,
        required_role,
    }
}

fn evaluate_single_rule(rule: &RuleSpec, ctx: &TransitionContext) -> Vec<BlockReason> {
    let mut reasons = Vec::new();

    if let Some(required) = rule.required_role {
        if !ctx.acting_role.satisfies_requirement(required) {
            reasons.push(BlockReason::RoleRequired {
                required,
                actual: ctx.acting_role,
            });
        }
    }

    for condition in &rule.conditions {
        match condition {
            RuleCondition::PriceRange {
                min_price,
                max_price,
            } => {
                if let Some(min) = *min_price {
                    // A property without a price cannot prove it meets a floor.
                    if ctx.price.map_or(true, |p| p < min) {
                        reasons.push(BlockReason::BelowMinPrice {
                            min_price: min,
                            price: ctx.price,
                        });
                    }
                }
                if let Some(max) = *max_price {
                    if ctx.price.is_some_and(|p| p > max) {
                        reasons.push(BlockReason::AboveMaxPrice {
                            max_price: max,
                            price: ctx.price,
                        });
                    }
                }
            }
            RuleCondition::Custom { .. } => {}
        }
    }

    reasons
}
