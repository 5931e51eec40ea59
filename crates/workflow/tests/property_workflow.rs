//! Integration tests for the property workflow engine.
//!
//! Runs the services against a real database and checks the state machine,
//! rule gating, audit trail, trigger dispatch and action queue together.

use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use realty_core::property_status::PropertyStatus;
use realty_core::roles::Role;
use realty_core::workflow_triggers::TriggerEvent;
use realty_db::models::property::{CreateProperty, Property};
use realty_db::models::workflow_action::WorkflowAction;
use realty_db::models::workflow_rule::CreateWorkflowRule;
use realty_db::models::workflow_trigger::CreateWorkflowTrigger;
use realty_db::repositories::{PropertyRepo, WorkflowActionRepo, WorkflowHistoryRepo};
use realty_events::{EventBus, EventLog, PROPERTY_STATUS_CHANGED};
use realty_workflow::{
    ActionError, ActionExecutor, ActionProcessor, ChangeStatusRequest, EventBusActionExecutor,
    PropertyWorkflowService, WorkflowError, WorkflowRuleService, WorkflowTriggerService,
};
use serde_json::{json, Value};
use sqlx::PgPool;

const TENANT: i64 = 10;
const OTHER_TENANT: i64 = 20;
const AGENT_ID: i64 = 501;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_property(pool: &PgPool, price: Option<i64>) -> Property {
    PropertyRepo::create(
        pool,
        &CreateProperty {
            tenant_id: TENANT,
            title: "4 Orchard Row".to_string(),
            status: None,
            price,
        },
    )
    .await
    .unwrap()
}

fn move_to(property: &Property, status: PropertyStatus) -> ChangeStatusRequest {
    ChangeStatusRequest::new(property.id, TENANT, status)
}

fn as_agent(property: &Property, status: PropertyStatus) -> ChangeStatusRequest {
    move_to(property, status).with_actor(AGENT_ID, Role::Agent)
}

async fn add_rule(
    pool: &PgPool,
    name: &str,
    to: &str,
    required_role: Option<&str>,
    conditions: Option<Value>,
    priority: i32,
) {
    WorkflowRuleService::new(pool.clone())
        .create_rule(
            TENANT,
            &CreateWorkflowRule {
                name: name.to_string(),
                description: None,
                from_status: None,
                to_status: to.to_string(),
                conditions,
                required_role: required_role.map(str::to_string),
                is_active: None,
                priority: Some(priority),
            },
        )
        .await
        .unwrap();
}

fn trigger_input(name: &str, event: &str, conditions: Option<Value>, actions: Value) -> CreateWorkflowTrigger {
    CreateWorkflowTrigger {
        name: name.to_string(),
        description: None,
        trigger_event: event.to_string(),
        conditions,
        actions,
        is_active: None,
    }
}

/// Fails every action of one type and succeeds on the rest.
struct FailingOn(&'static str);

#[async_trait]
impl ActionExecutor for FailingOn {
    async fn execute(&self, action: &WorkflowAction) -> Result<(), ActionError> {
        if action.action_type == self.0 {
            Err(ActionError::Failed(format!("{} is unavailable", self.0)))
        } else {
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// State machine + audit
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn reactivation_loop_records_one_row_per_step(pool: PgPool) {
    let service = PropertyWorkflowService::new(pool.clone());
    let property = seed_property(&pool, Some(250_000)).await;

    let path = [
        PropertyStatus::Withdrawn,
        PropertyStatus::Draft,
        PropertyStatus::Active,
        PropertyStatus::Withdrawn,
        PropertyStatus::Draft,
    ];
    for status in path {
        let outcome = service.change_property_status(as_agent(&property, status)).await.unwrap();
        assert_eq!(outcome.property.status, status.as_str());
        assert_eq!(outcome.workflow_history.to_status, status.as_str());
    }

    let history = service.get_property_workflow_history(property.id, TENANT).await.unwrap();
    assert_eq!(history.len(), path.len());
    let newest_first: Vec<&str> = history.iter().map(|h| h.to_status.as_str()).collect();
    assert_eq!(newest_first, ["draft", "withdrawn", "active", "draft", "withdrawn"]);
    assert!(history.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    assert!(history.iter().all(|h| h.triggered_by == "user" && h.user_id == Some(AGENT_ID)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn sold_is_terminal(pool: PgPool) {
    let service = PropertyWorkflowService::new(pool.clone());
    let property = seed_property(&pool, None).await;
    for status in [PropertyStatus::Active, PropertyStatus::UnderOffer, PropertyStatus::Sold] {
        service.change_property_status(move_to(&property, status)).await.unwrap();
    }

    for target in PropertyStatus::ALL {
        let err = service
            .change_property_status(move_to(&property, target))
            .await
            .unwrap_err();
        assert_matches!(
            err,
            WorkflowError::InvalidTransition { from: PropertyStatus::Sold, .. }
        );
    }

    let state = service.get_property_current_workflow_state(property.id, TENANT).await.unwrap();
    assert_eq!(state.current_status, PropertyStatus::Sold);
    assert!(state.possible_transitions.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_transition_names_both_statuses_and_writes_nothing(pool: PgPool) {
    let service = PropertyWorkflowService::new(pool.clone());
    let property = seed_property(&pool, None).await;

    let err = service
        .change_property_status(move_to(&property, PropertyStatus::Sold))
        .await
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("draft") && message.contains("sold"), "{message}");

    let stored = PropertyRepo::find_by_id(&pool, property.id, TENANT).await.unwrap().unwrap();
    assert_eq!(stored.status, "draft");
    let history = WorkflowHistoryRepo::list_for_property(&pool, property.id, TENANT).await.unwrap();
    assert!(history.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn system_change_without_user_is_recorded_as_system(pool: PgPool) {
    let service = PropertyWorkflowService::new(pool.clone());
    let property = seed_property(&pool, None).await;

    let mut request = move_to(&property, PropertyStatus::Active);
    request.reason = Some("Listing went live".to_string());
    request.metadata = Some(json!({"channel": "import"}));
    let outcome = service.change_property_status(request).await.unwrap();

    assert_eq!(outcome.workflow_history.triggered_by, "system");
    assert!(outcome.workflow_history.user_id.is_none());
    assert_eq!(outcome.workflow_history.reason.as_deref(), Some("Listing went live"));
    assert_eq!(outcome.workflow_history.metadata["channel"], "import");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_property_and_foreign_tenant_are_not_found(pool: PgPool) {
    let service = PropertyWorkflowService::new(pool.clone());
    let property = seed_property(&pool, None).await;

    let err = service
        .change_property_status(ChangeStatusRequest::new(property.id, OTHER_TENANT, PropertyStatus::Active))
        .await
        .unwrap_err();
    assert_matches!(err, WorkflowError::NotFound { entity: "Property", .. });

    let err = service.get_property_workflow_history(i64::MAX, TENANT).await.unwrap_err();
    assert_matches!(err, WorkflowError::NotFound { .. });
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn racing_changes_apply_exactly_once(pool: PgPool) {
    let service = PropertyWorkflowService::new(pool.clone());
    let property = seed_property(&pool, None).await;

    let (a, b) = tokio::join!(
        service.change_property_status(as_agent(&property, PropertyStatus::Active)),
        service.change_property_status(as_agent(&property, PropertyStatus::Active)),
    );

    let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    for result in [a, b] {
        if let Err(err) = result {
            assert_matches!(
                err,
                WorkflowError::ConcurrentModification { .. } | WorkflowError::InvalidTransition { .. }
            );
        }
    }

    let history = WorkflowHistoryRepo::list_for_property(&pool, property.id, TENANT).await.unwrap();
    assert_eq!(history.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn committed_change_is_published(pool: PgPool) {
    let bus = Arc::new(EventBus::default());
    let mut rx = bus.subscribe();
    let service = PropertyWorkflowService::new(pool.clone()).with_event_bus(Arc::clone(&bus));
    let property = seed_property(&pool, None).await;

    service
        .change_property_status(as_agent(&property, PropertyStatus::Active))
        .await
        .unwrap();

    let event = rx.recv().await.unwrap();
    assert_eq!(event.event_type, PROPERTY_STATUS_CHANGED);
    assert_eq!(event.tenant_id, TENANT);
    assert_eq!(event.source_entity_id, Some(property.id));
    assert_eq!(event.payload["fromStatus"], "draft");
    assert_eq!(event.payload["toStatus"], "active");
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn role_rule_blocks_agent_but_not_admin(pool: PgPool) {
    let service = PropertyWorkflowService::new(pool.clone());
    let property = seed_property(&pool, None).await;
    add_rule(&pool, "Admin publishes", "active", Some("tenant_owner"), None, 10).await;

    let err = service
        .change_property_status(as_agent(&property, PropertyStatus::Active))
        .await
        .unwrap_err();
    assert_matches!(
        &err,
        WorkflowError::TransitionBlocked { rules, required_role: Some(Role::TenantOwner), .. }
            if rules == &vec!["Admin publishes".to_string()]
    );
    let history = WorkflowHistoryRepo::list_for_property(&pool, property.id, TENANT).await.unwrap();
    assert!(history.is_empty(), "blocked change must not be audited");

    // Tenant admins bypass non-platform role requirements.
    let admin = move_to(&property, PropertyStatus::Active).with_actor(AGENT_ID + 1, Role::TenantAdmin);
    service.change_property_status(admin).await.unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn platform_admin_rules_cannot_be_bypassed(pool: PgPool) {
    let service = PropertyWorkflowService::new(pool.clone());
    let property = seed_property(&pool, None).await;
    add_rule(&pool, "Platform only", "active", Some("platform_admin"), None, 1).await;

    let owner = move_to(&property, PropertyStatus::Active).with_actor(1, Role::TenantOwner);
    let err = service.change_property_status(owner).await.unwrap_err();
    assert_matches!(
        err,
        WorkflowError::TransitionBlocked { required_role: Some(Role::PlatformAdmin), .. }
    );

    let platform = move_to(&property, PropertyStatus::Active).with_actor(2, Role::PlatformAdmin);
    service.change_property_status(platform).await.unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn price_floor_blocks_cheap_listing(pool: PgPool) {
    let service = PropertyWorkflowService::new(pool.clone());
    let cheap = seed_property(&pool, Some(300_000)).await;
    let pricey = seed_property(&pool, Some(750_000)).await;
    add_rule(&pool, "Premium only", "active", None, Some(json!({"minPrice": 500_000})), 5).await;

    let err = service
        .change_property_status(as_agent(&cheap, PropertyStatus::Active))
        .await
        .unwrap_err();
    assert_matches!(err, WorkflowError::TransitionBlocked { required_role: None, .. });

    service
        .change_property_status(as_agent(&pricey, PropertyStatus::Active))
        .await
        .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn evaluation_reports_every_blocking_rule(pool: PgPool) {
    let rules = WorkflowRuleService::new(pool.clone());
    let property = seed_property(&pool, Some(100)).await;
    add_rule(&pool, "Price floor", "active", None, Some(json!({"minPrice": 1000})), 20).await;
    add_rule(&pool, "Owner sign-off", "active", Some("tenant_owner"), None, 10).await;
    add_rule(&pool, "Any price", "active", None, None, 30).await;

    let evaluation = rules
        .evaluate_rules_for_transition(
            property.id,
            TENANT,
            PropertyStatus::Draft,
            PropertyStatus::Active,
            Some(AGENT_ID),
            Role::Agent,
        )
        .await
        .unwrap();

    assert!(!evaluation.can_transition);
    assert_eq!(evaluation.blocking_rule_names(), ["Owner sign-off", "Price floor"]);
    assert_eq!(evaluation.required_role, Some(Role::TenantOwner));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rules_are_skipped_without_a_role_and_absent_rules_allow(pool: PgPool) {
    let service = PropertyWorkflowService::new(pool.clone());
    let rules = WorkflowRuleService::new(pool.clone());
    let gated = seed_property(&pool, Some(1)).await;
    add_rule(&pool, "Premium only", "active", None, Some(json!({"minPrice": 1000})), 1).await;

    // No role: system-driven changes are not rule-gated.
    service
        .change_property_status(move_to(&gated, PropertyStatus::Active))
        .await
        .unwrap();

    let evaluation = rules
        .evaluate_rules_for_transition(
            gated.id,
            TENANT,
            PropertyStatus::Active,
            PropertyStatus::Withdrawn,
            None,
            Role::Viewer,
        )
        .await
        .unwrap();
    assert!(evaluation.can_transition);
    assert!(evaluation.blocked_by.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_rule_definitions_are_rejected(pool: PgPool) {
    let rules = WorkflowRuleService::new(pool.clone());
    let input = CreateWorkflowRule {
        name: "Back to market".to_string(),
        description: None,
        from_status: Some("sold".to_string()),
        to_status: "active".to_string(),
        conditions: None,
        required_role: None,
        is_active: None,
        priority: None,
    };
    let err = rules.create_rule(TENANT, &input).await.unwrap_err();
    assert_matches!(err, WorkflowError::Validation(_));
    assert!(rules.get_rules_by_tenant(TENANT, true).await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Triggers + action queue
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn trigger_counter_increments_once_per_firing(pool: PgPool) {
    let triggers = WorkflowTriggerService::new(pool.clone());
    let trigger = triggers
        .create_trigger(TENANT, &trigger_input("Manual nudge", "manual", None, json!({"create_task": {}})))
        .await
        .unwrap();

    let mut fired_at = Vec::new();
    for _ in 0..3 {
        let execution = triggers.execute_trigger(trigger.id, TENANT, &json!({})).await.unwrap();
        fired_at.push(execution.trigger.last_triggered.unwrap());
    }
    assert!(fired_at.windows(2).all(|pair| pair[0] <= pair[1]));

    let reloaded = triggers.get_trigger_by_id(trigger.id, TENANT).await.unwrap();
    assert_eq!(reloaded.trigger_count, trigger.trigger_count + 3);
    assert_eq!(reloaded.last_triggered, Some(fired_at[2]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn trigger_without_actions_still_counts_firings(pool: PgPool) {
    let triggers = WorkflowTriggerService::new(pool.clone());
    let trigger = triggers
        .create_trigger(TENANT, &trigger_input("Placeholder", "manual", None, json!({})))
        .await
        .unwrap();

    let execution = triggers.execute_trigger(trigger.id, TENANT, &json!({})).await.unwrap();
    assert!(execution.actions.is_empty());
    assert_eq!(execution.trigger.trigger_count, trigger.trigger_count + 1);
    assert!(WorkflowActionRepo::list_pending(&pool, TENANT, 10).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn triggers_only_target_properties_of_the_tenant(pool: PgPool) {
    let triggers = WorkflowTriggerService::new(pool.clone());
    let foreign = PropertyRepo::create(
        &pool,
        &CreateProperty {
            tenant_id: OTHER_TENANT,
            title: "9 Quay Street".to_string(),
            status: None,
            price: None,
        },
    )
    .await
    .unwrap();
    let trigger = triggers
        .create_trigger(
            TENANT,
            &trigger_input("Contacts", "manual", None, json!({"notify_interested_contacts": {}})),
        )
        .await
        .unwrap();

    let err = triggers
        .execute_trigger(trigger.id, TENANT, &json!({"propertyId": foreign.id}))
        .await
        .unwrap_err();
    assert_matches!(err, WorkflowError::NotFound { entity: "Property", id } if id == foreign.id);

    let err = triggers
        .execute_trigger(trigger.id, TENANT, &json!({"propertyId": 999_999}))
        .await
        .unwrap_err();
    assert_matches!(err, WorkflowError::NotFound { entity: "Property", id: 999_999 });

    let err = triggers
        .execute_triggers_by_event(TENANT, TriggerEvent::Manual, &json!({"propertyId": foreign.id}))
        .await
        .unwrap_err();
    assert_matches!(err, WorkflowError::NotFound { entity: "Property", .. });

    let reloaded = triggers.get_trigger_by_id(trigger.id, TENANT).await.unwrap();
    assert_eq!(reloaded.trigger_count, trigger.trigger_count);
    assert!(WorkflowActionRepo::list_pending(&pool, TENANT, 10).await.unwrap().is_empty());
    assert!(WorkflowActionRepo::list_pending(&pool, OTHER_TENANT, 10).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn trigger_fans_out_one_action_per_entry(pool: PgPool) {
    let triggers = WorkflowTriggerService::new(pool.clone());
    let property = seed_property(&pool, None).await;
    let trigger = triggers
        .create_trigger(
            TENANT,
            &trigger_input(
                "Sold follow-up",
                "status_change",
                None,
                json!({
                    "notify_agent": {"channel": "sms"},
                    "update_lead_status": {"status": "closed"},
                    "send_email": {"template": "congratulations"},
                }),
            ),
        )
        .await
        .unwrap();

    let execution = triggers
        .execute_trigger(trigger.id, TENANT, &json!({"propertyId": property.id}))
        .await
        .unwrap();

    assert_eq!(execution.actions.len(), 3);
    assert!(execution.notifications.is_empty());
    assert!(execution
        .actions
        .iter()
        .all(|a| a.status == "pending" && a.property_id == Some(property.id) && a.retry_count == 0));
    let email = execution.actions.iter().find(|a| a.action_type == "send_email").unwrap();
    assert_eq!(email.action_data["template"], "congratulations");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn event_dispatch_respects_status_conditions(pool: PgPool) {
    let service = PropertyWorkflowService::new(pool.clone());
    let triggers = WorkflowTriggerService::new(pool.clone());
    let property = seed_property(&pool, None).await;
    let on_sold = triggers
        .create_trigger(
            TENANT,
            &trigger_input(
                "On sale",
                "status_change",
                Some(json!({"toStatus": "sold"})),
                json!({"notify_agent": {}}),
            ),
        )
        .await
        .unwrap();

    let outcome = service
        .change_property_status(as_agent(&property, PropertyStatus::Active))
        .await
        .unwrap();
    assert!(outcome.triggered_actions.is_empty());

    let executions = triggers
        .execute_triggers_by_event(
            TENANT,
            TriggerEvent::StatusChange,
            &json!({"propertyId": property.id, "fromStatus": "under_offer", "toStatus": "sold"}),
        )
        .await
        .unwrap();
    assert_eq!(executions.len(), 1);
    assert_eq!(executions[0].trigger.id, on_sold.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn triggers_can_be_skipped_per_change(pool: PgPool) {
    let service = PropertyWorkflowService::new(pool.clone());
    let triggers = WorkflowTriggerService::new(pool.clone());
    let property = seed_property(&pool, None).await;
    let trigger = triggers
        .create_trigger(TENANT, &trigger_input("Always", "status_change", None, json!({"notify_agent": {}})))
        .await
        .unwrap();

    let mut request = as_agent(&property, PropertyStatus::Active);
    request.execute_triggers = false;
    let outcome = service.change_property_status(request).await.unwrap();

    assert!(outcome.triggered_actions.is_empty());
    let reloaded = triggers.get_trigger_by_id(trigger.id, TENANT).await.unwrap();
    assert_eq!(reloaded.trigger_count, trigger.trigger_count);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deactivated_trigger_does_not_fire(pool: PgPool) {
    let service = PropertyWorkflowService::new(pool.clone());
    let triggers = WorkflowTriggerService::new(pool.clone());
    let property = seed_property(&pool, None).await;
    let trigger = triggers
        .create_trigger(TENANT, &trigger_input("Paused", "status_change", None, json!({"notify_agent": {}})))
        .await
        .unwrap();
    triggers.deactivate_trigger(trigger.id, TENANT).await.unwrap();

    let outcome = service
        .change_property_status(as_agent(&property, PropertyStatus::Active))
        .await
        .unwrap();
    assert!(outcome.triggered_actions.is_empty());

    let err = triggers.deactivate_trigger(trigger.id, OTHER_TENANT).await.unwrap_err();
    assert_matches!(err, WorkflowError::NotFound { .. });
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn queue_processing_isolates_failures(pool: PgPool) {
    let triggers = WorkflowTriggerService::new(pool.clone());
    let property = seed_property(&pool, None).await;
    let trigger = triggers
        .create_trigger(
            TENANT,
            &trigger_input(
                "Mixed",
                "manual",
                None,
                json!({"notify_agent": {}, "create_task": {}, "send_email": {}}),
            ),
        )
        .await
        .unwrap();
    triggers
        .execute_trigger(trigger.id, TENANT, &json!({"propertyId": property.id}))
        .await
        .unwrap();

    let processor = ActionProcessor::new(pool.clone(), Arc::new(FailingOn("send_email")));
    let summary = processor.process_queued_actions(TENANT).await.unwrap();
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.total_processed, 3);

    let pending = WorkflowActionRepo::list_pending(&pool, TENANT, 10).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].action_type, "send_email");
    assert_eq!(pending[0].retry_count, 1);
    assert!(pending[0].error_message.as_deref().unwrap().contains("send_email"));

    // Later passes retry until the budget is spent, then give up.
    processor.process_queued_actions(TENANT).await.unwrap();
    let last = processor.process_queued_actions(TENANT).await.unwrap();
    assert_eq!(last.failed, 1);
    assert!(WorkflowActionRepo::list_pending(&pool, TENANT, 10).await.unwrap().is_empty());
    let empty = processor.process_queued_actions(TENANT).await.unwrap();
    assert_eq!(empty.total_processed, 0);

    let failed = processor
        .list_actions(
            TENANT,
            &realty_db::models::workflow_action::ActionListQuery {
                status: Some("failed".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].retry_count, 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn recovered_executor_drains_retried_action(pool: PgPool) {
    let triggers = WorkflowTriggerService::new(pool.clone());
    let trigger = triggers
        .create_trigger(TENANT, &trigger_input("Mail", "manual", None, json!({"send_email": {}})))
        .await
        .unwrap();
    triggers.execute_trigger(trigger.id, TENANT, &json!({})).await.unwrap();

    let broken = ActionProcessor::new(pool.clone(), Arc::new(FailingOn("send_email")));
    assert_eq!(broken.process_queued_actions(TENANT).await.unwrap().failed, 1);

    let healthy = ActionProcessor::new(pool.clone(), Arc::new(FailingOn("nothing")));
    let summary = healthy.process_queued_actions(TENANT).await.unwrap();
    assert_eq!(summary.processed, 1);

    let executed = WorkflowActionRepo::count_by_status(&pool, TENANT).await.unwrap();
    assert_eq!(executed.len(), 1);
    assert_eq!(executed[0].status, "executed");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn event_log_alone_does_not_execute_actions(pool: PgPool) {
    let bus = Arc::new(EventBus::default());
    let _event_log = tokio::spawn(EventLog::run(bus.subscribe()));
    let triggers = WorkflowTriggerService::new(pool.clone());
    let trigger = triggers
        .create_trigger(TENANT, &trigger_input("Mail", "manual", None, json!({"send_email": {}})))
        .await
        .unwrap();
    triggers.execute_trigger(trigger.id, TENANT, &json!({})).await.unwrap();

    let processor =
        ActionProcessor::new(pool.clone(), Arc::new(EventBusActionExecutor::new(Arc::clone(&bus))));
    let summary = processor.process_queued_actions(TENANT).await.unwrap();
    assert_eq!(summary.processed, 0);
    assert_eq!(summary.failed, 1);
    let pending = WorkflowActionRepo::list_pending(&pool, TENANT, 10).await.unwrap();
    assert_eq!(pending[0].retry_count, 1);

    let mut consumer = bus.subscribe_actions();
    let summary = processor.process_queued_actions(TENANT).await.unwrap();
    assert_eq!(summary.processed, 1);
    assert_eq!(consumer.recv().await.unwrap().event_type, "workflow.action.send_email");
    assert!(WorkflowActionRepo::list_pending(&pool, TENANT, 10).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn initialize_is_idempotent(pool: PgPool) {
    let service = PropertyWorkflowService::new(pool.clone());
    let triggers = WorkflowTriggerService::new(pool.clone());
    let property = seed_property(&pool, None).await;
    let welcome = triggers
        .create_trigger(
            TENANT,
            &trigger_input("Welcome", "property_created", None, json!({"create_task": {"title": "Photos"}})),
        )
        .await
        .unwrap();

    let first = service
        .initialize_property_workflow(property.id, TENANT, Some(AGENT_ID))
        .await
        .unwrap();
    assert!(first.from_status.is_none());
    assert_eq!(first.to_status, "draft");

    let second = service
        .initialize_property_workflow(property.id, TENANT, Some(AGENT_ID))
        .await
        .unwrap();
    assert_eq!(second.id, first.id);

    let reloaded = triggers.get_trigger_by_id(welcome.id, TENANT).await.unwrap();
    assert_eq!(reloaded.trigger_count, 1);

    let state = service.get_property_current_workflow_state(property.id, TENANT).await.unwrap();
    assert_eq!(state.workflow_history.len(), 1);
    assert_eq!(state.possible_transitions, vec![PropertyStatus::Active, PropertyStatus::Withdrawn]);
}

// ---------------------------------------------------------------------------
// End to end
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn agent_publishes_listing_and_contacts_are_queued(pool: PgPool) {
    let service = PropertyWorkflowService::new(pool.clone());
    let triggers = WorkflowTriggerService::new(pool.clone());
    let property = seed_property(&pool, Some(300_000)).await;
    triggers
        .create_trigger(
            TENANT,
            &trigger_input(
                "Tell interested buyers",
                "status_change",
                None,
                json!({"notify_interested_contacts": {"template": "new_listing"}}),
            ),
        )
        .await
        .unwrap();

    let outcome = service
        .change_property_status(as_agent(&property, PropertyStatus::Active))
        .await
        .unwrap();

    assert_eq!(outcome.property.status, "active");
    assert_eq!(outcome.workflow_history.from_status.as_deref(), Some("draft"));
    assert_eq!(outcome.workflow_history.to_status, "active");
    assert_eq!(outcome.workflow_history.triggered_by, "user");
    assert_eq!(outcome.triggered_actions.len(), 1);
    let action = &outcome.triggered_actions[0];
    assert_eq!(action.action_type, "notify_interested_contacts");
    assert_eq!(action.status, "pending");
    assert_eq!(action.property_id, Some(property.id));

    let history = WorkflowHistoryRepo::list_for_property(&pool, property.id, TENANT).await.unwrap();
    assert_eq!(history.len(), 1);
}
