//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user and tenant from a JWT Bearer token.
//! - [`rbac::RequireWorkflowAdmin`] -- Requires a role allowed to manage workflow configuration.

pub mod auth;
pub mod rbac;
