//! Trigger registry and dispatch into the action queue.

use realty_core::types::DbId;
use realty_core::workflow_actions::parse_trigger_actions;
use realty_core::workflow_triggers::{
    event_property_id, parse_trigger_conditions, trigger_conditions_match, TriggerEvent,
};
use realty_db::models::workflow_action::{CreateWorkflowAction, WorkflowAction};
use realty_db::models::workflow_trigger::{
    CreateWorkflowTrigger, UpdateWorkflowTrigger, WorkflowTrigger,
};
use realty_db::repositories::{PropertyRepo, WorkflowTriggerRepo};
use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;
use validator::Validate;

use crate::error::WorkflowError;

/// Result of firing one trigger.
#[derive(Debug, Clone, Serialize)]
pub struct TriggerExecution {
    /// The trigger after its counter was bumped.
    pub trigger: WorkflowTrigger,
    /// Actions enqueued by this firing, all `pending`.
    pub actions: Vec<WorkflowAction>,
    /// Immediate notifications. Delivery happens downstream of the action
    /// queue, so this is currently always empty.
    pub notifications: Vec<Value>,
}

#[derive(Clone)]
pub struct WorkflowTriggerService {
    pool: PgPool,
}

impl WorkflowTriggerService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // -----------------------------------------------------------------------
    // Registry
    // -----------------------------------------------------------------------

    pub async fn create_trigger(
        &self,
        tenant_id: DbId,
        input: &CreateWorkflowTrigger,
    ) -> Result<WorkflowTrigger, WorkflowError> {
        input.validate()?;
        TriggerEvent::from_str(&input.trigger_event)?;
        if let Some(conditions) = &input.conditions {
            parse_trigger_conditions(conditions)?;
        }
        parse_trigger_actions(&input.actions)?;

        let trigger = WorkflowTriggerRepo::create(&self.pool, tenant_id, input).await?;
        tracing::info!(
            tenant_id,
            trigger_id = trigger.id,
            event = %trigger.trigger_event,
            "Workflow trigger created",
        );
        Ok(trigger)
    }

    pub async fn get_triggers_by_tenant(
        &self,
        tenant_id: DbId,
        include_inactive: bool,
    ) -> Result<Vec<WorkflowTrigger>, WorkflowError> {
        Ok(WorkflowTriggerRepo::list_for_tenant(&self.pool, tenant_id, include_inactive).await?)
    }

    pub async fn get_trigger_by_id(
        &self,
        trigger_id: DbId,
        tenant_id: DbId,
    ) -> Result<WorkflowTrigger, WorkflowError> {
        WorkflowTriggerRepo::find_by_id(&self.pool, trigger_id, tenant_id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("WorkflowTrigger", trigger_id))
    }

    pub async fn update_trigger(
        &self,
        trigger_id: DbId,
        tenant_id: DbId,
        input: &UpdateWorkflowTrigger,
    ) -> Result<WorkflowTrigger, WorkflowError> {
        input.validate()?;
        if let Some(event) = &input.trigger_event {
            TriggerEvent::from_str(event)?;
        }
        if let Some(conditions) = &input.conditions {
            parse_trigger_conditions(conditions)?;
        }
        if let Some(actions) = &input.actions {
            parse_trigger_actions(actions)?;
        }

        let trigger = WorkflowTriggerRepo::update(&self.pool, trigger_id, tenant_id, input)
            .await?
            .ok_or_else(|| WorkflowError::not_found("WorkflowTrigger", trigger_id))?;
        tracing::info!(tenant_id, trigger_id, "Workflow trigger updated");
        Ok(trigger)
    }

    pub async fn deactivate_trigger(
        &self,
        trigger_id: DbId,
        tenant_id: DbId,
    ) -> Result<(), WorkflowError> {
        if !WorkflowTriggerRepo::deactivate(&self.pool, trigger_id, tenant_id).await? {
            return Err(WorkflowError::not_found("WorkflowTrigger", trigger_id));
        }
        tracing::info!(tenant_id, trigger_id, "Workflow trigger deactivated");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Fire one trigger regardless of its conditions.
    ///
    /// Bumps `trigger_count` exactly once and enqueues one pending action per
    /// entry of the trigger's `actions` map, all in one transaction. Actions
    /// carry the `propertyId` of `event_data` when present, which must name a
    /// property of `tenant_id`.
    pub async fn execute_trigger(
        &self,
        trigger_id: DbId,
        tenant_id: DbId,
        event_data: &Value,
    ) -> Result<TriggerExecution, WorkflowError> {
        let trigger = self.get_trigger_by_id(trigger_id, tenant_id).await?;
        let property_id = self.event_property(tenant_id, event_data).await?;

        let actions: Vec<CreateWorkflowAction> = parse_trigger_actions(&trigger.actions)?
            .into_iter()
            .map(|(kind, config)| CreateWorkflowAction {
                property_id,
                action_type: kind.as_str().to_string(),
                action_data: config,
            })
            .collect();

        let (trigger, actions) =
            WorkflowTriggerRepo::record_execution(&self.pool, trigger_id, tenant_id, &actions)
                .await?
                .ok_or_else(|| WorkflowError::not_found("WorkflowTrigger", trigger_id))?;

        tracing::info!(
            tenant_id,
            trigger_id,
            property_id,
            actions = actions.len(),
            trigger_count = trigger.trigger_count,
            "Workflow trigger fired",
        );

        Ok(TriggerExecution {
            trigger,
            actions,
            notifications: Vec::new(),
        })
    }

    /// Fire every active trigger of `tenant_id` bound to `event` whose
    /// conditions match `event_data`.
    ///
    /// A failing trigger is logged and skipped; the others still run. Only
    /// the successful executions are returned. A `propertyId` outside the
    /// tenant is `NotFound` before any trigger runs.
    pub async fn execute_triggers_by_event(
        &self,
        tenant_id: DbId,
        event: TriggerEvent,
        event_data: &Value,
    ) -> Result<Vec<TriggerExecution>, WorkflowError> {
        self.event_property(tenant_id, event_data).await?;
        let triggers =
            WorkflowTriggerRepo::list_active_for_event(&self.pool, tenant_id, event.as_str())
                .await?;

        let mut executions = Vec::with_capacity(triggers.len());
        for trigger in triggers {
            let matches = match parse_trigger_conditions(&trigger.conditions) {
                Ok(conditions) => trigger_conditions_match(&conditions, event_data),
                Err(e) => {
                    tracing::warn!(
                        trigger_id = trigger.id,
                        error = %e,
                        "Skipping trigger with unreadable conditions",
                    );
                    false
                }
            };
            if !matches {
                tracing::debug!(trigger_id = trigger.id, event = %event, "Trigger conditions not met");
                continue;
            }

            match self.execute_trigger(trigger.id, tenant_id, event_data).await {
                Ok(execution) => executions.push(execution),
                Err(e) => {
                    tracing::error!(
                        tenant_id,
                        trigger_id = trigger.id,
                        event = %event,
                        error = %e,
                        "Workflow trigger failed",
                    );
                }
            }
        }
        Ok(executions)
    }

    /// The `propertyId` of `event_data`, checked against the tenant.
    async fn event_property(
        &self,
        tenant_id: DbId,
        event_data: &Value,
    ) -> Result<Option<DbId>, WorkflowError> {
        let Some(property_id) = event_property_id(event_data) else {
            return Ok(None);
        };
        PropertyRepo::find_by_id(&self.pool, property_id, tenant_id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("Property", property_id))?;
        Ok(Some(property_id))
    }
}
