//! Position (slot) service

use chrono::{DateTime, Utc};
use shared::{
    layout_racks, validate_slot_index, validate_slot_letter, NewPosition, PalletState, Position,
    PositionFilter, PositionRange, PositionState, RackScene, RangeCreationSummary,
    UpdatePositionInput,
};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use super::parse_stored;
use crate::error::{AppError, AppResult};

/// Service for warehouse positions
#[derive(Clone)]
pub struct PositionService {
    db: PgPool,
}

#[derive(Debug, FromRow)]
pub(crate) struct PositionRow {
    id: Uuid,
    warehouse_id: Uuid,
    rack: String,
    rack_column: String,
    level: i32,
    depth: i32,
    state: String,
    pallet_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl TryFrom<PositionRow> for Position {
    type Error = AppError;

    fn try_from(row: PositionRow) -> AppResult<Self> {
        Ok(Position {
            id: row.id,
            warehouse_id: row.warehouse_id,
            rack: row.rack,
            column: row.rack_column,
            level: row.level,
            depth: row.depth,
            state: parse_stored(&row.state)?,
            pallet_id: row.pallet_id,
            created_at: row.created_at,
        })
    }
}

pub(crate) const POSITION_COLUMNS: &str =
    "id, warehouse_id, rack, rack_column, level, depth, state, pallet_id, created_at";

fn upper(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_ascii_uppercase)
}

fn check_letter(field: &str, value: &str) -> AppResult<()> {
    validate_slot_letter(value)
        .map_err(|m| AppError::validation(field, m, "Rack y columna deben ser una letra"))
}

fn check_index(field: &str, value: i32) -> AppResult<()> {
    validate_slot_index(value)
        .map_err(|m| AppError::validation(field, m, "Nivel y profundidad comienzan en 1"))
}

async fn lock_position(conn: &mut PgConnection, position_id: Uuid) -> AppResult<Position> {
    sqlx::query_as::<_, PositionRow>(&format!(
        "SELECT {} FROM positions WHERE id = $1 FOR UPDATE",
        POSITION_COLUMNS
    ))
    .bind(position_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound("Position".to_string()))?
    .try_into()
}

/// A slot holding a pallet only becomes AVAILABLE through `release`
fn check_state_change(position: &Position, state: PositionState) -> AppResult<()> {
    if state == PositionState::Available && position.pallet_id.is_some() {
        return Err(AppError::InvalidStateTransition(
            "position holds a pallet; release it instead".to_string(),
        ));
    }
    Ok(())
}

impl PositionService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List positions ordered by rack, column, level, depth
    pub async fn list(&self, filter: &PositionFilter) -> AppResult<Vec<Position>> {
        let rows = sqlx::query_as::<_, PositionRow>(&format!(
            r#"
            SELECT {}
            FROM positions
            WHERE ($1::uuid IS NULL OR warehouse_id = $1)
              AND ($2::text IS NULL OR rack = $2)
              AND ($3::text IS NULL OR rack_column = $3)
              AND ($4::int IS NULL OR level = $4)
            ORDER BY rack, rack_column, level, depth
            "#,
            POSITION_COLUMNS
        ))
        .bind(filter.warehouse_id)
        .bind(upper(filter.rack.as_deref()))
        .bind(upper(filter.column.as_deref()))
        .bind(filter.level)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(Position::try_from).collect()
    }

    pub async fn get(&self, position_id: Uuid) -> AppResult<Position> {
        sqlx::query_as::<_, PositionRow>(&format!(
            "SELECT {} FROM positions WHERE id = $1",
            POSITION_COLUMNS
        ))
        .bind(position_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Position".to_string()))?
        .try_into()
    }

    /// Distinct racks, optionally within one warehouse
    pub async fn list_racks(&self, warehouse_id: Option<Uuid>) -> AppResult<Vec<String>> {
        let racks = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT rack FROM positions
            WHERE ($1::uuid IS NULL OR warehouse_id = $1)
            ORDER BY rack
            "#,
        )
        .bind(warehouse_id)
        .fetch_all(&self.db)
        .await?;

        Ok(racks)
    }

    /// Distinct columns, optionally within one warehouse and rack
    pub async fn list_columns(
        &self,
        warehouse_id: Option<Uuid>,
        rack: Option<&str>,
    ) -> AppResult<Vec<String>> {
        let columns = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT rack_column FROM positions
            WHERE ($1::uuid IS NULL OR warehouse_id = $1)
              AND ($2::text IS NULL OR rack = $2)
            ORDER BY rack_column
            "#,
        )
        .bind(warehouse_id)
        .bind(upper(rack))
        .fetch_all(&self.db)
        .await?;

        Ok(columns)
    }

    /// Expand a range without writing anything
    pub fn preview_range(&self, range: &PositionRange, limit: usize) -> AppResult<Vec<NewPosition>> {
        Ok(range.expand(limit)?)
    }

    /// Expand a range and insert every slot that does not exist yet
    pub async fn create_range(
        &self,
        range: PositionRange,
        limit: usize,
    ) -> AppResult<RangeCreationSummary> {
        let positions = range.expand(limit)?;

        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM warehouses WHERE id = $1)")
            .bind(range.warehouse_id)
            .fetch_one(&self.db)
            .await?;
        if !exists {
            return Err(AppError::NotFound("Warehouse".to_string()));
        }

        let mut racks = Vec::with_capacity(positions.len());
        let mut columns = Vec::with_capacity(positions.len());
        let mut levels = Vec::with_capacity(positions.len());
        let mut depths = Vec::with_capacity(positions.len());
        for position in &positions {
            racks.push(position.rack.clone());
            columns.push(position.column.clone());
            levels.push(position.level);
            depths.push(position.depth);
        }

        let result = sqlx::query(
            r#"
            INSERT INTO positions (warehouse_id, rack, rack_column, level, depth, state)
            SELECT $1, t.rack, t.rack_column, t.level, t.depth, $6
            FROM UNNEST($2::text[], $3::text[], $4::int[], $5::int[]) AS t(rack, rack_column, level, depth)
            ON CONFLICT ON CONSTRAINT positions_coordinate_key DO NOTHING
            "#,
        )
        .bind(range.warehouse_id)
        .bind(&racks)
        .bind(&columns)
        .bind(&levels)
        .bind(&depths)
        .bind(range.state.as_str())
        .execute(&self.db)
        .await?;

        let requested = positions.len();
        let created = result.rows_affected() as usize;
        let summary = RangeCreationSummary {
            requested,
            created,
            skipped: requested.saturating_sub(created),
        };

        tracing::info!(
            warehouse_id = %range.warehouse_id,
            requested = summary.requested,
            created = summary.created,
            skipped = summary.skipped,
            "Position range created"
        );

        Ok(summary)
    }

    /// Edit a single position; absent fields keep their value
    pub async fn update(&self, position_id: Uuid, input: UpdatePositionInput) -> AppResult<Position> {
        let mut tx = self.db.begin().await?;
        let existing = lock_position(&mut tx, position_id).await?;

        let state = input.state.unwrap_or(existing.state);
        check_state_change(&existing, state)?;

        let rack = upper(input.rack.as_deref()).unwrap_or(existing.rack);
        let column = upper(input.column.as_deref()).unwrap_or(existing.column);
        let level = input.level.unwrap_or(existing.level);
        let depth = input.depth.unwrap_or(existing.depth);

        check_letter("rack", &rack)?;
        check_letter("column", &column)?;
        check_index("level", level)?;
        check_index("depth", depth)?;

        let updated: Position = sqlx::query_as::<_, PositionRow>(&format!(
            r#"
            UPDATE positions
            SET rack = $1, rack_column = $2, level = $3, depth = $4, state = $5
            WHERE id = $6
            RETURNING {}
            "#,
            POSITION_COLUMNS
        ))
        .bind(&rack)
        .bind(&column)
        .bind(level)
        .bind(depth)
        .bind(state.as_str())
        .bind(position_id)
        .fetch_one(&mut *tx)
        .await?
        .try_into()?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Delete an empty position
    pub async fn delete(&self, position_id: Uuid) -> AppResult<()> {
        let position = self.get(position_id).await?;
        if position.pallet_id.is_some() {
            return Err(AppError::Conflict {
                resource: "position".to_string(),
                message: "Release the pallet before deleting the position".to_string(),
                message_es: "Libere el pallet antes de eliminar la posición".to_string(),
            });
        }

        sqlx::query("DELETE FROM positions WHERE id = $1")
            .bind(position_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Store a pallet in an available position
    pub async fn assign_pallet(&self, position_id: Uuid, pallet_id: Uuid) -> AppResult<Position> {
        let mut tx = self.db.begin().await?;

        let position = lock_position(&mut tx, position_id).await?;
        if position.state != PositionState::Available {
            return Err(AppError::InvalidStateTransition(format!(
                "position {} is already occupied",
                position.code()
            )));
        }

        let pallet_state = sqlx::query_scalar::<_, String>(
            "SELECT state FROM pallets WHERE id = $1 FOR UPDATE",
        )
        .bind(pallet_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Pallet".to_string()))?;

        match parse_stored::<PalletState>(&pallet_state)? {
            PalletState::ToPlace => {}
            other => {
                return Err(AppError::InvalidStateTransition(format!(
                    "pallet is {} and cannot be placed",
                    other.as_str()
                )))
            }
        }

        let updated: Position = sqlx::query_as::<_, PositionRow>(&format!(
            "UPDATE positions SET state = $1, pallet_id = $2 WHERE id = $3 RETURNING {}",
            POSITION_COLUMNS
        ))
        .bind(PositionState::Occupied.as_str())
        .bind(pallet_id)
        .bind(position_id)
        .fetch_one(&mut *tx)
        .await?
        .try_into()?;

        sqlx::query("UPDATE pallets SET state = $1, position_id = $2 WHERE id = $3")
            .bind(PalletState::Placed.as_str())
            .bind(position_id)
            .bind(pallet_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(position_id = %position_id, pallet_id = %pallet_id, "Pallet assigned");
        Ok(updated)
    }

    /// Empty a position and send its pallet back to TO_PLACE
    pub async fn release(&self, position_id: Uuid) -> AppResult<Position> {
        let mut tx = self.db.begin().await?;

        let position = lock_position(&mut tx, position_id).await?;

        sqlx::query(
            r#"
            UPDATE pallets SET state = $1, position_id = NULL
            WHERE position_id = $2 OR id = $3
            "#,
        )
        .bind(PalletState::ToPlace.as_str())
        .bind(position_id)
        .bind(position.pallet_id)
        .execute(&mut *tx)
        .await?;

        let updated: Position = sqlx::query_as::<_, PositionRow>(&format!(
            "UPDATE positions SET state = $1, pallet_id = NULL WHERE id = $2 RETURNING {}",
            POSITION_COLUMNS
        ))
        .bind(PositionState::Available.as_str())
        .bind(position_id)
        .fetch_one(&mut *tx)
        .await?
        .try_into()?;

        tx.commit().await?;

        tracing::info!(position_id = %position_id, "Position released");
        Ok(updated)
    }

    /// Rack layout for the 3D view.
    ///
    /// Picker options cover the whole warehouse while the cells honour every filter.
    pub async fn layout(&self, filter: &PositionFilter, selected: Option<Uuid>) -> AppResult<RackScene> {
        let scope = PositionFilter {
            warehouse_id: filter.warehouse_id,
            ..Default::default()
        };
        let positions = self.list(&scope).await?;

        let filter = PositionFilter {
            warehouse_id: filter.warehouse_id,
            rack: upper(filter.rack.as_deref()),
            column: upper(filter.column.as_deref()),
            level: filter.level,
        };
        Ok(layout_racks(&positions, &filter, selected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(pallet_id: Option<Uuid>) -> Position {
        Position {
            id: Uuid::new_v4(),
            warehouse_id: Uuid::new_v4(),
            rack: "A".to_string(),
            column: "C".to_string(),
            level: 2,
            depth: 1,
            state: if pallet_id.is_some() {
                PositionState::Occupied
            } else {
                PositionState::Available
            },
            pallet_id,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_held_slot_cannot_be_freed_by_edit() {
        let held = position(Some(Uuid::new_v4()));
        assert!(matches!(
            check_state_change(&held, PositionState::Available),
            Err(AppError::InvalidStateTransition(_))
        ));
        assert!(check_state_change(&held, PositionState::Occupied).is_ok());
    }

    #[test]
    fn test_empty_slot_state_is_free_to_change() {
        let empty = position(None);
        assert!(check_state_change(&empty, PositionState::Occupied).is_ok());
        assert!(check_state_change(&empty, PositionState::Available).is_ok());
    }

    #[test]
    fn test_upper_trims_and_drops_blank() {
        assert_eq!(upper(Some(" b ")), Some("B".to_string()));
        assert_eq!(upper(Some("  ")), None);
        assert_eq!(upper(None), None);
    }
}
