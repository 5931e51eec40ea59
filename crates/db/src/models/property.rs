//! Property models.
//!
//! Properties are owned by listing management; the workflow engine only reads
//! them and changes `status` through [`PropertyRepo::transition_status`].
//!
//! [`PropertyRepo::transition_status`]: crate::repositories::PropertyRepo::transition_status

use realty_core::types::{DbId, Price, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `properties` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Property {
    pub id: DbId,
    pub tenant_id: DbId,
    pub title: String,
    pub status: String,
    pub price: Option<Price>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a property. `status` defaults to `draft`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProperty {
    pub tenant_id: DbId,
    pub title: String,
    pub status: Option<String>,
    pub price: Option<Price>,
}
