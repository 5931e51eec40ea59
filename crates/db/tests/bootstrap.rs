use sqlx::PgPool;

/// Full bootstrap test: connect, migrate, verify schema.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    realty_db::health_check(&pool).await.unwrap();

    let tables = [
        "properties",
        "property_workflow_history",
        "workflow_rules",
        "workflow_triggers",
        "workflow_actions",
    ];

    for table in tables {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|e| panic!("{table} query failed: {e}"));
        assert_eq!(count.0, 0, "{table} should start empty");
    }
}

/// Status columns reject values outside the workflow vocabulary.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_property_status_check_constraint(pool: PgPool) {
    let result = sqlx::query("INSERT INTO properties (tenant_id, title, status) VALUES (1, 'x', 'archived')")
        .execute(&pool)
        .await;
    assert!(result.is_err(), "unknown status must be rejected");
}

/// Queued actions reject unknown statuses.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_action_status_check_constraint(pool: PgPool) {
    let trigger_id: (i64,) = sqlx::query_as(
        "INSERT INTO workflow_triggers (tenant_id, name, trigger_event, actions)
         VALUES (1, 't', 'manual', '{\"send_email\": {}}') RETURNING id",
    )
    .fetch_one(&pool)
    .await
    .unwrap();

    let result = sqlx::query(
        "INSERT INTO workflow_actions (tenant_id, trigger_id, action_type, status)
         VALUES (1, $1, 'send_email', 'running')",
    )
    .bind(trigger_id.0)
    .execute(&pool)
    .await;
    assert!(result.is_err(), "unknown action status must be rejected");
}
