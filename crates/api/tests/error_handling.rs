//! Tests for `AppError` to HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no server or
//! database is involved.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use realty_api::error::AppError;
use realty_core::error::CoreError;
use realty_core::property_status::PropertyStatus;
use realty_core::roles::Role;
use realty_core::workflow_rules::RuleEvaluation;
use realty_workflow::WorkflowError;

async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Workflow(WorkflowError::NotFound {
        entity: "Property",
        id: 42,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Property with id 42 not found");
}

#[tokio::test]
async fn invalid_transition_returns_422_with_both_statuses() {
    let err = AppError::Workflow(WorkflowError::InvalidTransition {
        from: PropertyStatus::Sold,
        to: PropertyStatus::Active,
        message: "Cannot transition from 'sold' to 'active'".to_string(),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], "INVALID_TRANSITION");
    assert_eq!(json["from"], "sold");
    assert_eq!(json["to"], "active");
}

#[tokio::test]
async fn transition_blocked_returns_403_with_rule_names() {
    let err = AppError::Workflow(WorkflowError::TransitionBlocked {
        rules: vec!["Admin approval".to_string(), "Price floor".to_string()],
        required_role: Some(Role::TenantAdmin),
        evaluation: RuleEvaluation {
            can_transition: false,
            blocked_by: Vec::new(),
            required_role: Some(Role::TenantAdmin),
        },
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "TRANSITION_BLOCKED");
    assert_eq!(json["blocked_by"], serde_json::json!(["Admin approval", "Price floor"]));
    assert_eq!(json["required_role"], "tenant_admin");
}

#[tokio::test]
async fn concurrent_modification_returns_409() {
    let err = AppError::Workflow(WorkflowError::ConcurrentModification {
        property_id: 5,
        expected: PropertyStatus::Draft,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONCURRENT_MODIFICATION");
}

#[tokio::test]
async fn validation_errors_return_400() {
    let (status, json) =
        error_to_response(AppError::Workflow(WorkflowError::Validation("bad".into()))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");

    let (status, json) =
        error_to_response(AppError::Core(CoreError::Validation("bad".into()))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn auth_errors_map_to_401_and_403() {
    let (status, json) =
        error_to_response(AppError::Core(CoreError::Unauthorized("no token".into()))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");

    let (status, json) =
        error_to_response(AppError::Core(CoreError::Forbidden("nope".into()))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");
}

#[tokio::test]
async fn row_not_found_maps_to_404() {
    let (status, json) =
        error_to_response(AppError::Workflow(WorkflowError::Database(sqlx::Error::RowNotFound)))
            .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn internal_error_returns_500_and_sanitizes_message() {
    let err = AppError::InternalError("connection string with password".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}
