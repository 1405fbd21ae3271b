//! Stock movement service
//!
//! Every write locks the affected product rows and keeps the movement table
//! and the product stock counter in one transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::{
    apply_movement, replace_movement, revert_movement, Movement, MovementInput, MovementType,
    MovementView, PalletState,
};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use super::{pallet::insert_pallet, parse_stored};
use crate::error::{AppError, AppResult};

/// Service for recording and correcting stock movements
#[derive(Clone)]
pub struct MovementService {
    db: PgPool,
}

#[derive(Debug, FromRow)]
pub(crate) struct MovementRow {
    id: Uuid,
    movement_type: String,
    product_id: Uuid,
    origin_warehouse_id: Option<Uuid>,
    destination_warehouse_id: Option<Uuid>,
    origin_position_id: Option<Uuid>,
    destination_position_id: Option<Uuid>,
    quantity: Decimal,
    occurred_at: DateTime<Utc>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<MovementRow> for Movement {
    type Error = AppError;

    fn try_from(row: MovementRow) -> AppResult<Self> {
        Ok(Movement {
            id: row.id,
            movement_type: parse_stored(&row.movement_type)?,
            product_id: row.product_id,
            origin_warehouse_id: row.origin_warehouse_id,
            destination_warehouse_id: row.destination_warehouse_id,
            origin_position_id: row.origin_position_id,
            destination_position_id: row.destination_position_id,
            quantity: row.quantity,
            occurred_at: row.occurred_at,
            notes: row.notes,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct MovementViewRow {
    #[sqlx(flatten)]
    movement: MovementRow,
    product_code: String,
    product_name: String,
    origin_warehouse_name: Option<String>,
    destination_warehouse_name: Option<String>,
}

impl TryFrom<MovementViewRow> for MovementView {
    type Error = AppError;

    fn try_from(row: MovementViewRow) -> AppResult<Self> {
        Ok(MovementView {
            movement: row.movement.try_into()?,
            product_code: row.product_code,
            product_name: row.product_name,
            origin_warehouse_name: row.origin_warehouse_name,
            destination_warehouse_name: row.destination_warehouse_name,
        })
    }
}

const MOVEMENT_COLUMNS: &str = "id, movement_type, product_id, origin_warehouse_id, \
     destination_warehouse_id, origin_position_id, destination_position_id, quantity, \
     occurred_at, notes, created_at";

const MOVEMENT_VIEW_SELECT: &str = r#"
    SELECT m.id, m.movement_type, m.product_id, m.origin_warehouse_id,
           m.destination_warehouse_id, m.origin_position_id, m.destination_position_id,
           m.quantity, m.occurred_at, m.notes, m.created_at,
           p.code AS product_code, p.name AS product_name,
           wo.name AS origin_warehouse_name, wd.name AS destination_warehouse_name
    FROM movements m
    JOIN products p ON p.id = m.product_id
    LEFT JOIN warehouses wo ON wo.id = m.origin_warehouse_id
    LEFT JOIN warehouses wd ON wd.id = m.destination_warehouse_id
"#;

/// Lock a product row and return its stock
async fn lock_product_stock(conn: &mut PgConnection, product_id: Uuid) -> AppResult<Decimal> {
    sqlx::query_scalar::<_, Decimal>("SELECT stock FROM products WHERE id = $1 FOR UPDATE")
        .bind(product_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))
}

async fn write_product_stock(conn: &mut PgConnection, product_id: Uuid, stock: Decimal) -> AppResult<()> {
    sqlx::query("UPDATE products SET stock = $1, updated_at = NOW() WHERE id = $2")
        .bind(stock)
        .bind(product_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Check that a warehouse exists and, when given, that the slot belongs to it
async fn check_endpoint(
    conn: &mut PgConnection,
    warehouse_id: Option<Uuid>,
    position_id: Option<Uuid>,
    position_field: &str,
) -> AppResult<()> {
    let Some(warehouse_id) = warehouse_id else {
        return Ok(());
    };

    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM warehouses WHERE id = $1)")
        .bind(warehouse_id)
        .fetch_one(&mut *conn)
        .await?;
    if !exists {
        return Err(AppError::NotFound("Warehouse".to_string()));
    }

    if let Some(position_id) = position_id {
        let owner = sqlx::query_scalar::<_, Uuid>("SELECT warehouse_id FROM positions WHERE id = $1")
            .bind(position_id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError::NotFound("Position".to_string()))?;

        if owner != warehouse_id {
            return Err(AppError::validation(
                position_field,
                "Position does not belong to the selected warehouse",
                "La posición no pertenece al depósito seleccionado",
            ));
        }
    }

    Ok(())
}

async fn check_endpoints(conn: &mut PgConnection, input: &MovementInput) -> AppResult<()> {
    check_endpoint(
        conn,
        input.origin_warehouse_id,
        input.origin_position_id,
        "origin_position_id",
    )
    .await?;
    check_endpoint(
        conn,
        input.destination_warehouse_id,
        input.destination_position_id,
        "destination_position_id",
    )
    .await
}

/// Lock the pallets received with a movement and return their states
async fn lock_linked_pallets(conn: &mut PgConnection, movement_id: Uuid) -> AppResult<Vec<PalletState>> {
    let states = sqlx::query_scalar::<_, String>(
        "SELECT state FROM pallets WHERE movement_id = $1 FOR UPDATE",
    )
    .bind(movement_id)
    .fetch_all(&mut *conn)
    .await?;

    states.iter().map(|state| parse_stored(state)).collect()
}

/// Received pallets go away with their entry, but not while one sits in a slot
fn check_linked_pallets(states: &[PalletState]) -> AppResult<()> {
    if states.contains(&PalletState::Placed) {
        return Err(AppError::Conflict {
            resource: "pallets".to_string(),
            message: "A pallet from this entry is placed; release its position first".to_string(),
            message_es: "Un pallet de esta entrada está ubicado; libere su posición primero"
                .to_string(),
        });
    }
    Ok(())
}

fn prepare(input: MovementInput) -> AppResult<MovementInput> {
    let input = input.normalized();
    input.validate()?;
    Ok(input)
}

impl MovementService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List movements, newest first
    pub async fn list(&self) -> AppResult<Vec<MovementView>> {
        let rows = sqlx::query_as::<_, MovementViewRow>(&format!(
            "{} ORDER BY m.occurred_at DESC, m.created_at DESC",
            MOVEMENT_VIEW_SELECT
        ))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(MovementView::try_from).collect()
    }

    pub async fn get(&self, movement_id: Uuid) -> AppResult<MovementView> {
        let row = sqlx::query_as::<_, MovementViewRow>(&format!(
            "{} WHERE m.id = $1",
            MOVEMENT_VIEW_SELECT
        ))
        .bind(movement_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Movement".to_string()))?;

        row.try_into()
    }

    /// Record a movement and apply it to the product stock.
    ///
    /// Pallets carried by an entry are created in the same transaction.
    pub async fn record(&self, input: MovementInput) -> AppResult<MovementView> {
        let input = prepare(input)?;

        let mut tx = self.db.begin().await?;

        let stock = lock_product_stock(&mut tx, input.product_id).await?;
        check_endpoints(&mut tx, &input).await?;
        let next_stock = apply_movement(stock, input.movement_type, input.quantity)?;

        let row = sqlx::query_as::<_, MovementRow>(&format!(
            r#"
            INSERT INTO movements (movement_type, product_id, origin_warehouse_id, destination_warehouse_id,
                                   origin_position_id, destination_position_id, quantity, occurred_at, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, NOW()), $9)
            RETURNING {}
            "#,
            MOVEMENT_COLUMNS
        ))
        .bind(input.movement_type.as_str())
        .bind(input.product_id)
        .bind(input.origin_warehouse_id)
        .bind(input.destination_warehouse_id)
        .bind(input.origin_position_id)
        .bind(input.destination_position_id)
        .bind(input.quantity)
        .bind(input.occurred_at)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        write_product_stock(&mut tx, input.product_id, next_stock).await?;

        for pallet in &input.pallets {
            insert_pallet(&mut tx, pallet, Some(input.product_id), Some(row.id)).await?;
        }

        tx.commit().await?;

        tracing::info!(
            movement_id = %row.id,
            movement_type = %input.movement_type,
            product_id = %input.product_id,
            quantity = %input.quantity,
            stock = %next_stock,
            pallets = input.pallets.len(),
            "Movement recorded"
        );

        self.get(row.id).await
    }

    /// Replace a movement with its net stock effect.
    ///
    /// Only the resulting stock of each product must stay at or above zero.
    pub async fn update(&self, movement_id: Uuid, input: MovementInput) -> AppResult<MovementView> {
        let input = prepare(input)?;
        if !input.pallets.is_empty() {
            return Err(AppError::validation(
                "pallets",
                "Pallets can only be added when recording an entry",
                "Solo se pueden agregar pallets al registrar una entrada",
            ));
        }

        let mut tx = self.db.begin().await?;

        let existing: Movement = sqlx::query_as::<_, MovementRow>(&format!(
            "SELECT {} FROM movements WHERE id = $1 FOR UPDATE",
            MOVEMENT_COLUMNS
        ))
        .bind(movement_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Movement".to_string()))?
        .try_into()?;

        check_endpoints(&mut tx, &input).await?;

        let received = lock_linked_pallets(&mut tx, movement_id).await?;
        if !received.is_empty()
            && (input.movement_type != MovementType::Entry || input.product_id != existing.product_id)
        {
            return Err(AppError::Conflict {
                resource: "pallets".to_string(),
                message: "Pallets were received with this entry; its type and product cannot change"
                    .to_string(),
                message_es: "Esta entrada tiene pallets; no se puede cambiar su tipo ni su producto"
                    .to_string(),
            });
        }

        if existing.product_id == input.product_id {
            let stock = lock_product_stock(&mut tx, input.product_id).await?;
            let next_stock = replace_movement(
                stock,
                existing.movement_type,
                existing.quantity,
                input.movement_type,
                input.quantity,
            )?;
            write_product_stock(&mut tx, input.product_id, next_stock).await?;
        } else {
            // Lock in a fixed order so concurrent edits cannot deadlock
            let (first, second) = if existing.product_id < input.product_id {
                (existing.product_id, input.product_id)
            } else {
                (input.product_id, existing.product_id)
            };
            let first_stock = lock_product_stock(&mut tx, first).await?;
            let second_stock = lock_product_stock(&mut tx, second).await?;
            let (old_stock, new_stock) = if first == existing.product_id {
                (first_stock, second_stock)
            } else {
                (second_stock, first_stock)
            };

            let old_next = revert_movement(old_stock, existing.movement_type, existing.quantity)?;
            let new_next = apply_movement(new_stock, input.movement_type, input.quantity)?;
            write_product_stock(&mut tx, existing.product_id, old_next).await?;
            write_product_stock(&mut tx, input.product_id, new_next).await?;
        }

        sqlx::query(
            r#"
            UPDATE movements
            SET movement_type = $1, product_id = $2, origin_warehouse_id = $3,
                destination_warehouse_id = $4, origin_position_id = $5,
                destination_position_id = $6, quantity = $7,
                occurred_at = COALESCE($8, occurred_at), notes = $9
            WHERE id = $10
            "#,
        )
        .bind(input.movement_type.as_str())
        .bind(input.product_id)
        .bind(input.origin_warehouse_id)
        .bind(input.destination_warehouse_id)
        .bind(input.origin_position_id)
        .bind(input.destination_position_id)
        .bind(input.quantity)
        .bind(input.occurred_at)
        .bind(&input.notes)
        .bind(movement_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(movement_id = %movement_id, "Movement updated");
        self.get(movement_id).await
    }

    /// Delete a movement, undo its stock effect and drop the pallets it received
    pub async fn delete(&self, movement_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let existing: Movement = sqlx::query_as::<_, MovementRow>(&format!(
            "SELECT {} FROM movements WHERE id = $1 FOR UPDATE",
            MOVEMENT_COLUMNS
        ))
        .bind(movement_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Movement".to_string()))?
        .try_into()?;

        let stock = lock_product_stock(&mut tx, existing.product_id).await?;
        let next_stock = revert_movement(stock, existing.movement_type, existing.quantity)?;

        let received = lock_linked_pallets(&mut tx, movement_id).await?;
        check_linked_pallets(&received)?;

        write_product_stock(&mut tx, existing.product_id, next_stock).await?;

        sqlx::query("DELETE FROM pallets WHERE movement_id = $1")
            .bind(movement_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM movements WHERE id = $1")
            .bind(movement_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            movement_id = %movement_id,
            stock = %next_stock,
            pallets = received.len(),
            "Movement deleted"
        );
        Ok(())
    }
}

/// Quantity totals per movement type, used by the dashboard
pub(crate) async fn totals_by_type(db: &PgPool) -> AppResult<Vec<(MovementType, Decimal)>> {
    let rows = sqlx::query_as::<_, (String, Decimal)>(
        "SELECT movement_type, COALESCE(SUM(quantity), 0) FROM movements GROUP BY movement_type",
    )
    .fetch_all(db)
    .await?;

    rows.into_iter()
        .map(|(kind, total)| -> AppResult<(MovementType, Decimal)> {
            Ok((parse_stored(&kind)?, total))
        })
        .collect()
}
