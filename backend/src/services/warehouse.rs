//! Warehouse service

use chrono::{DateTime, Utc};
use shared::{validate_name, CreateWarehouseInput, UpdateWarehouseInput, Warehouse};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Service for managing warehouses
#[derive(Clone)]
pub struct WarehouseService {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct WarehouseRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<WarehouseRow> for Warehouse {
    fn from(row: WarehouseRow) -> Self {
        Warehouse {
            id: row.id,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl WarehouseService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List warehouses ordered by name
    pub async fn list(&self) -> AppResult<Vec<Warehouse>> {
        let rows = sqlx::query_as::<_, WarehouseRow>(
            r#"
            SELECT id, name, description, created_at, updated_at
            FROM warehouses
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Warehouse::from).collect())
    }

    pub async fn get(&self, warehouse_id: Uuid) -> AppResult<Warehouse> {
        let row = sqlx::query_as::<_, WarehouseRow>(
            "SELECT id, name, description, created_at, updated_at FROM warehouses WHERE id = $1",
        )
        .bind(warehouse_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Warehouse".to_string()))?;

        Ok(row.into())
    }

    pub async fn create(&self, input: CreateWarehouseInput) -> AppResult<Warehouse> {
        let name = input.name.trim().to_string();
        validate_name(&name)
            .map_err(|m| AppError::validation("name", m, "El nombre es obligatorio"))?;

        self.ensure_name_free(&name, None).await?;

        let row = sqlx::query_as::<_, WarehouseRow>(
            r#"
            INSERT INTO warehouses (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(&name)
        .bind(&input.description)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(warehouse_id = %row.id, name = %row.name, "Warehouse created");
        Ok(row.into())
    }

    pub async fn update(&self, warehouse_id: Uuid, input: UpdateWarehouseInput) -> AppResult<Warehouse> {
        let existing = self.get(warehouse_id).await?;

        let name = input
            .name
            .map(|n| n.trim().to_string())
            .unwrap_or(existing.name);
        validate_name(&name)
            .map_err(|m| AppError::validation("name", m, "El nombre es obligatorio"))?;

        self.ensure_name_free(&name, Some(warehouse_id)).await?;

        let row = sqlx::query_as::<_, WarehouseRow>(
            r#"
            UPDATE warehouses
            SET name = $1, description = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(&name)
        .bind(input.description.or(existing.description))
        .bind(warehouse_id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Delete a warehouse; fails with a conflict while slots or movements reference it
    pub async fn delete(&self, warehouse_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM warehouses WHERE id = $1")
            .bind(warehouse_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Warehouse".to_string()));
        }

        Ok(())
    }

    async fn ensure_name_free(&self, name: &str, except: Option<Uuid>) -> AppResult<()> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM warehouses WHERE name = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(name)
        .bind(except)
        .fetch_one(&self.db)
        .await?;

        if taken {
            return Err(AppError::DuplicateEntry("name".to_string()));
        }
        Ok(())
    }
}
