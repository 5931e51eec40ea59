//! Tenant rule registry and transition-rule evaluation.

use realty_core::property_status::{validate_transition, PropertyStatus};
use realty_core::roles::Role;
use realty_core::types::DbId;
use realty_core::workflow_rules::{
    evaluate_transition_rules, parse_rule_conditions, RuleCondition, RuleEvaluation, RuleSpec,
    TransitionContext,
};
use realty_db::models::property::Property;
use realty_db::models::workflow_rule::{CreateWorkflowRule, UpdateWorkflowRule, WorkflowRule};
use realty_db::repositories::{PropertyRepo, WorkflowRuleRepo};
use sqlx::PgPool;
use validator::Validate;

use crate::error::WorkflowError;

/// CRUD for workflow rules plus the evaluation used by status changes.
#[derive(Clone)]
pub struct WorkflowRuleService {
    pool: PgPool,
}

impl WorkflowRuleService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // -----------------------------------------------------------------------
    // Registry
    // -----------------------------------------------------------------------

    pub async fn create_rule(
        &self,
        tenant_id: DbId,
        input: &CreateWorkflowRule,
    ) -> Result<WorkflowRule, WorkflowError> {
        input.validate()?;
        let from = input
            .from_status
            .as_deref()
            .map(PropertyStatus::from_str)
            .transpose()?;
        let to = PropertyStatus::from_str(&input.to_status)?;
        validate_rule_shape(from, to, input.required_role.as_deref(), input.conditions.as_ref())?;

        let rule = WorkflowRuleRepo::create(&self.pool, tenant_id, input).await?;
        tracing::info!(tenant_id, rule_id = rule.id, name = %rule.name, "Workflow rule created");
        Ok(rule)
    }

    pub async fn get_rules_by_tenant(
        &self,
        tenant_id: DbId,
        include_inactive: bool,
    ) -> Result<Vec<WorkflowRule>, WorkflowError> {
        Ok(WorkflowRuleRepo::list_for_tenant(&self.pool, tenant_id, include_inactive).await?)
    }

    pub async fn get_rule_by_id(
        &self,
        rule_id: DbId,
        tenant_id: DbId,
    ) -> Result<WorkflowRule, WorkflowError> {
        WorkflowRuleRepo::find_by_id(&self.pool, rule_id, tenant_id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("WorkflowRule", rule_id))
    }

    /// Apply a partial update. The merged rule is validated as a whole so a
    /// patch cannot produce a rule the create path would reject.
    pub async fn update_rule(
        &self,
        rule_id: DbId,
        tenant_id: DbId,
        input: &UpdateWorkflowRule,
    ) -> Result<WorkflowRule, WorkflowError> {
        input.validate()?;
        let existing = self.get_rule_by_id(rule_id, tenant_id).await?;

        let from = input
            .from_status
            .as_deref()
            .or(existing.from_status.as_deref())
            .map(PropertyStatus::from_str)
            .transpose()?;
        let to = PropertyStatus::from_str(input.to_status.as_deref().unwrap_or(&existing.to_status))?;
        let role = input.required_role.as_deref().or(existing.required_role.as_deref());
        let conditions = input.conditions.as_ref().unwrap_or(&existing.conditions);
        validate_rule_shape(from, to, role, Some(conditions))?;

        let rule = WorkflowRuleRepo::update(&self.pool, rule_id, tenant_id, input)
            .await?
            .ok_or_else(|| WorkflowError::not_found("WorkflowRule", rule_id))?;
        tracing::info!(tenant_id, rule_id, "Workflow rule updated");
        Ok(rule)
    }

    /// Soft-disable a rule so it no longer gates transitions.
    pub async fn deactivate_rule(&self, rule_id: DbId, tenant_id: DbId) -> Result<(), WorkflowError> {
        if !WorkflowRuleRepo::deactivate(&self.pool, rule_id, tenant_id).await? {
            return Err(WorkflowError::not_found("WorkflowRule", rule_id));
        }
        tracing::info!(tenant_id, rule_id, "Workflow rule deactivated");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Evaluation
    // -----------------------------------------------------------------------

    /// Active rules for `from -> to`, ascending priority.
    pub async fn get_rules_by_transition(
        &self,
        tenant_id: DbId,
        from: PropertyStatus,
        to: PropertyStatus,
    ) -> Result<Vec<WorkflowRule>, WorkflowError> {
        Ok(WorkflowRuleRepo::list_for_transition(&self.pool, tenant_id, from.as_str(), to.as_str())
            .await?)
    }

    /// Evaluate every applicable rule for a transition of a stored property.
    pub async fn evaluate_rules_for_transition(
        &self,
        property_id: DbId,
        tenant_id: DbId,
        from: PropertyStatus,
        to: PropertyStatus,
        user_id: Option<DbId>,
        user_role: Role,
    ) -> Result<RuleEvaluation, WorkflowError> {
        let property = PropertyRepo::find_by_id(&self.pool, property_id, tenant_id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("Property", property_id))?;
        let evaluation = self.evaluate_for_property(&property, from, to, user_role).await?;
        tracing::debug!(
            property_id,
            tenant_id,
            user_id,
            role = %user_role,
            can_transition = evaluation.can_transition,
            "Evaluated workflow rules",
        );
        Ok(evaluation)
    }

    /// Evaluate against an already loaded property.
    pub(crate) async fn evaluate_for_property(
        &self,
        property: &Property,
        from: PropertyStatus,
        to: PropertyStatus,
        user_role: Role,
    ) -> Result<RuleEvaluation, WorkflowError> {
        let rows = self.get_rules_by_transition(property.tenant_id, from, to).await?;
        let specs = rows
            .iter()
            .map(rule_spec)
            .collect::<Result<Vec<_>, _>>()?;
        let ctx = TransitionContext {
            acting_role: user_role,
            price: property.price,
        };
        Ok(evaluate_transition_rules(&specs, &ctx))
    }
}

/// Convert a stored rule into evaluation form.
fn rule_spec(rule: &WorkflowRule) -> Result<RuleSpec, WorkflowError> {
    let required_role = rule
        .required_role
        .as_deref()
        .map(Role::from_str)
        .transpose()?;
    let conditions = parse_rule_conditions(&rule.conditions)?;
    for condition in &conditions {
        if let RuleCondition::Custom { name, .. } = condition {
            tracing::warn!(rule_id = rule.id, condition = %name, "Ignoring unknown rule condition");
        }
    }
    Ok(RuleSpec {
        rule_id: rule.id,
        name: rule.name.clone(),
        priority: rule.priority,
        required_role,
        conditions,
    })
}

fn validate_rule_shape(
    from: Option<PropertyStatus>,
    to: PropertyStatus,
    required_role: Option<&str>,
    conditions: Option<&serde_json::Value>,
) -> Result<(), WorkflowError> {
    if let Some(from) = from {
        validate_transition(from, to).map_err(WorkflowError::Validation)?;
    }
    if let Some(role) = required_role {
        Role::from_str(role)?;
    }
    if let Some(conditions) = conditions {
        parse_rule_conditions(conditions)?;
    }
    Ok(())
}
