//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! meet the minimum requirement.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use realty_core::error::CoreError;
use realty_core::roles::WORKFLOW_ADMIN_FLOOR;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires a role at or above [`WORKFLOW_ADMIN_FLOOR`]. Rejects with 403
/// Forbidden otherwise.
///
/// ```ignore
/// async fn manage_rules(RequireWorkflowAdmin(user): RequireWorkflowAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireWorkflowAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireWorkflowAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.role.is_at_least(WORKFLOW_ADMIN_FLOOR) {
            return Err(AppError::Core(CoreError::Forbidden(format!(
                "Role '{}' or higher required",
                WORKFLOW_ADMIN_FLOOR
            ))));
        }
        Ok(RequireWorkflowAdmin(user))
    }
}
