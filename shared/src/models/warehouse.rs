//! Warehouse models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A warehouse ("depósito") holding racks of positions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: Uuid,
    /// Unique warehouse name
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a warehouse
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWarehouseInput {
    pub name: String,
    pub description: Option<String>,
}

/// Input for updating a warehouse
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateWarehouseInput {
    pub name: Option<String>,
    pub description: Option<String>,
}
