//! The property status state machine.
//!
//! A status change runs strictly in order: structural check, rule check,
//! guarded status write plus audit record (one transaction), then trigger
//! dispatch. Anything after the commit is best-effort and never undoes it.

use std::sync::Arc;

use realty_core::property_status::{possible_transitions, validate_transition, PropertyStatus};
use realty_core::roles::Role;
use realty_core::types::DbId;
use realty_core::workflow_history::{validate_transition_text, TriggeredBy};
use realty_core::workflow_triggers::{StatusChangeEvent, TriggerEvent};
use realty_db::models::property::Property;
use realty_db::models::workflow_action::WorkflowAction;
use realty_db::models::workflow_history::{CreateWorkflowHistory, WorkflowHistory};
use realty_db::repositories::{PropertyRepo, WorkflowHistoryRepo};
use realty_events::{EventBus, PlatformEvent, PROPERTY_STATUS_CHANGED, PROPERTY_WORKFLOW_INITIALIZED};
use serde::Serialize;
use serde_json::{json, Value};
use sqlx::PgPool;

use crate::error::WorkflowError;
use crate::rules::WorkflowRuleService;
use crate::triggers::{TriggerExecution, WorkflowTriggerService};

/// Input for [`PropertyWorkflowService::change_property_status`].
#[derive(Debug, Clone)]
pub struct ChangeStatusRequest {
    pub property_id: DbId,
    pub tenant_id: DbId,
    pub new_status: PropertyStatus,
    /// Acting user; `None` records the change as system-driven.
    pub user_id: Option<DbId>,
    /// Rules are only evaluated when a role is supplied.
    pub user_role: Option<Role>,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub metadata: Option<Value>,
    pub execute_triggers: bool,
}

impl ChangeStatusRequest {
    /// A system-driven request with no actor, no role and triggers enabled.
    pub fn new(property_id: DbId, tenant_id: DbId, new_status: PropertyStatus) -> Self {
        Self {
            property_id,
            tenant_id,
            new_status,
            user_id: None,
            user_role: None,
            reason: None,
            notes: None,
            metadata: None,
            execute_triggers: true,
        }
    }

    pub fn with_actor(mut self, user_id: DbId, role: Role) -> Self {
        self.user_id = Some(user_id);
        self.user_role = Some(role);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusChangeOutcome {
    pub property: Property,
    pub workflow_history: WorkflowHistory,
    /// Actions enqueued by the `status_change` triggers, across all triggers.
    pub triggered_actions: Vec<WorkflowAction>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PropertyWorkflowState {
    pub current_status: PropertyStatus,
    pub last_transition: Option<WorkflowHistory>,
    pub possible_transitions: Vec<PropertyStatus>,
    /// Newest first.
    pub workflow_history: Vec<WorkflowHistory>,
}

/// Orchestrates status changes for one property at a time.
#[derive(Clone)]
pub struct PropertyWorkflowService {
    pool: PgPool,
    rules: WorkflowRuleService,
    triggers: WorkflowTriggerService,
    event_bus: Option<Arc<EventBus>>,
}

impl PropertyWorkflowService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            rules: WorkflowRuleService::new(pool.clone()),
            triggers: WorkflowTriggerService::new(pool.clone()),
            pool,
            event_bus: None,
        }
    }

    /// Publish committed transitions on `bus`.
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Move a property to a new status.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the property does not exist for the tenant.
    /// - `InvalidTransition` if the state machine forbids the move.
    /// - `TransitionBlocked` if a role was supplied and tenant rules block it.
    /// - `ConcurrentModification` if the status changed since it was read.
    ///
    /// None of these write anything.
    pub async fn change_property_status(
        &self,
        request: ChangeStatusRequest,
    ) -> Result<StatusChangeOutcome, WorkflowError> {
        let ChangeStatusRequest {
            property_id,
            tenant_id,
            new_status,
            user_id,
            user_role,
            reason,
            notes,
            metadata,
            execute_triggers,
        } = request;

        validate_transition_text(reason.as_deref(), notes.as_deref())?;
        let metadata = match metadata {
            None | Some(Value::Null) => json!({}),
            Some(Value::Object(map)) => Value::Object(map),
            Some(other) => {
                return Err(WorkflowError::Validation(format!(
                    "metadata must be a JSON object, got: {other}"
                )))
            }
        };

        let property = self.load_property(property_id, tenant_id).await?;
        let current = PropertyStatus::from_str(&property.status)?;

        validate_transition(current, new_status).map_err(|message| {
            WorkflowError::InvalidTransition {
                from: current,
                to: new_status,
                message,
            }
        })?;

        if let Some(role) = user_role {
            let evaluation = self
                .rules
                .evaluate_for_property(&property, current, new_status, role)
                .await?;
            if !evaluation.can_transition {
                tracing::info!(
                    property_id,
                    tenant_id,
                    from = %current,
                    to = %new_status,
                    role = %role,
                    blocked_by = ?evaluation.blocking_rule_names(),
                    "Status change blocked by workflow rules",
                );
                return Err(WorkflowError::TransitionBlocked {
                    rules: evaluation.blocking_rule_names(),
                    required_role: evaluation.required_role,
                    evaluation,
                });
            }
        }

        let triggered_by = TriggeredBy::for_actor(user_id);
        let trigger_data = match user_role {
            Some(role) => json!({ "userRole": role.as_str() }),
            None => json!({}),
        };
        let history = CreateWorkflowHistory {
            tenant_id,
            property_id,
            from_status: Some(current.as_str().to_string()),
            to_status: new_status.as_str().to_string(),
            user_id,
            reason,
            notes,
            metadata,
            triggered_by: triggered_by.as_str().to_string(),
            trigger_data,
        };

        let (property, workflow_history) =
            PropertyRepo::transition_status(&self.pool, current.as_str(), &history)
                .await?
                .ok_or(WorkflowError::ConcurrentModification {
                    property_id,
                    expected: current,
                })?;

        tracing::info!(
            property_id,
            tenant_id,
            user_id,
            from = %current,
            to = %new_status,
            triggered_by = %triggered_by,
            "Property status changed",
        );

        let event = StatusChangeEvent {
            property_id,
            from_status: Some(current),
            to_status: new_status,
            user_id,
        };
        let event_data = event.to_json();
        self.publish(PROPERTY_STATUS_CHANGED, tenant_id, property_id, user_id, &event_data);

        let triggered_actions = if execute_triggers {
            self.dispatch(tenant_id, TriggerEvent::StatusChange, &event_data).await
        } else {
            Vec::new()
        };

        Ok(StatusChangeOutcome {
            property,
            workflow_history,
            triggered_actions,
        })
    }

    /// Write the creation-time record for a property and fire
    /// `property_created` triggers.
    ///
    /// Idempotent: when the property already has history, the oldest record
    /// is returned and nothing is written or fired.
    pub async fn initialize_property_workflow(
        &self,
        property_id: DbId,
        tenant_id: DbId,
        user_id: Option<DbId>,
    ) -> Result<WorkflowHistory, WorkflowError> {
        let property = self.load_property(property_id, tenant_id).await?;
        if let Some(existing) =
            WorkflowHistoryRepo::find_first_for_property(&self.pool, property_id, tenant_id).await?
        {
            tracing::debug!(property_id, "Workflow already initialized");
            return Ok(existing);
        }

        let status = PropertyStatus::from_str(&property.status)?;
        let record = WorkflowHistoryRepo::create(
            &self.pool,
            &CreateWorkflowHistory {
                tenant_id,
                property_id,
                from_status: None,
                to_status: status.as_str().to_string(),
                user_id,
                reason: Some("Property created".to_string()),
                notes: None,
                metadata: json!({}),
                triggered_by: TriggeredBy::for_actor(user_id).as_str().to_string(),
                trigger_data: json!({}),
            },
        )
        .await?;
        tracing::info!(property_id, tenant_id, status = %status, "Property workflow initialized");

        let event_data = StatusChangeEvent {
            property_id,
            from_status: None,
            to_status: status,
            user_id,
        }
        .to_json();
        self.publish(PROPERTY_WORKFLOW_INITIALIZED, tenant_id, property_id, user_id, &event_data);
        self.dispatch(tenant_id, TriggerEvent::PropertyCreated, &event_data).await;

        Ok(record)
    }

    pub async fn get_property_current_workflow_state(
        &self,
        property_id: DbId,
        tenant_id: DbId,
    ) -> Result<PropertyWorkflowState, WorkflowError> {
        let property = self.load_property(property_id, tenant_id).await?;
        let current_status = PropertyStatus::from_str(&property.status)?;
        let workflow_history =
            WorkflowHistoryRepo::list_for_property(&self.pool, property_id, tenant_id).await?;

        Ok(PropertyWorkflowState {
            current_status,
            last_transition: workflow_history.first().cloned(),
            possible_transitions: possible_transitions(current_status),
            workflow_history,
        })
    }

    /// Audit records for a property, newest first.
    pub async fn get_property_workflow_history(
        &self,
        property_id: DbId,
        tenant_id: DbId,
    ) -> Result<Vec<WorkflowHistory>, WorkflowError> {
        self.load_property(property_id, tenant_id).await?;
        Ok(WorkflowHistoryRepo::list_for_property(&self.pool, property_id, tenant_id).await?)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    async fn load_property(
        &self,
        property_id: DbId,
        tenant_id: DbId,
    ) -> Result<Property, WorkflowError> {
        PropertyRepo::find_by_id(&self.pool, property_id, tenant_id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("Property", property_id))
    }

    /// Fire triggers after a commit. Failures are logged, never returned.
    async fn dispatch(
        &self,
        tenant_id: DbId,
        event: TriggerEvent,
        event_data: &Value,
    ) -> Vec<WorkflowAction> {
        match self
            .triggers
            .execute_triggers_by_event(tenant_id, event, event_data)
            .await
        {
            Ok(executions) => executions
                .into_iter()
                .flat_map(|TriggerExecution { actions, .. }| actions)
                .collect(),
            Err(e) => {
                tracing::error!(tenant_id, event = %event, error = %e, "Trigger dispatch failed");
                Vec::new()
            }
        }
    }

    fn publish(
        &self,
        event_type: &str,
        tenant_id: DbId,
        property_id: DbId,
        user_id: Option<DbId>,
        payload: &Value,
    ) {
        if let Some(bus) = &self.event_bus {
            bus.publish(
                PlatformEvent::new(event_type, tenant_id)
                    .with_source("property", property_id)
                    .with_actor(user_id)
                    .with_payload(payload.clone()),
            );
        }
    }
}
