//! Pallet service

use chrono::{DateTime, NaiveDate, Utc};
use shared::{
    boxes_on_pallet, validate_pallet_dates, validate_pallet_quantity, validate_product_code,
    CreatePalletInput, Pallet, PalletState, PalletView,
};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use super::parse_stored;
use crate::error::{AppError, AppResult};

/// Service for pallets
#[derive(Clone)]
pub struct PalletService {
    db: PgPool,
}

#[derive(Debug, FromRow)]
pub(crate) struct PalletRow {
    id: Uuid,
    code: String,
    description: Option<String>,
    product_id: Uuid,
    quantity: i32,
    lot: Option<String>,
    manufactured_on: Option<NaiveDate>,
    expires_on: Option<NaiveDate>,
    state: String,
    position_id: Option<Uuid>,
    movement_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl TryFrom<PalletRow> for Pallet {
    type Error = AppError;

    fn try_from(row: PalletRow) -> AppResult<Self> {
        Ok(Pallet {
            id: row.id,
            code: row.code,
            description: row.description,
            product_id: row.product_id,
            quantity: row.quantity,
            lot: row.lot,
            manufactured_on: row.manufactured_on,
            expires_on: row.expires_on,
            state: parse_stored(&row.state)?,
            position_id: row.position_id,
            movement_id: row.movement_id,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct PalletViewRow {
    #[sqlx(flatten)]
    pallet: PalletRow,
    product_code: String,
    product_name: String,
    units_per_box: Option<i32>,
}

impl TryFrom<PalletViewRow> for PalletView {
    type Error = AppError;

    fn try_from(row: PalletViewRow) -> AppResult<Self> {
        let boxes = boxes_on_pallet(row.pallet.quantity, row.units_per_box);
        Ok(PalletView {
            pallet: row.pallet.try_into()?,
            product_code: row.product_code,
            product_name: row.product_name,
            boxes,
        })
    }
}

const PALLET_VIEW_SELECT: &str = r#"
    SELECT pl.id, pl.code, pl.description, pl.product_id, pl.quantity, pl.lot,
           pl.manufactured_on, pl.expires_on, pl.state, pl.position_id, pl.movement_id,
           pl.created_at,
           p.code AS product_code, p.name AS product_name, p.units_per_box
    FROM pallets pl
    JOIN products p ON p.id = pl.product_id
"#;

/// Product a new pallet holds. Pallets received with an entry take the
/// entry's product and may not name another one.
fn pallet_product(requested: Option<Uuid>, entry_product: Option<Uuid>) -> AppResult<Uuid> {
    match (requested, entry_product) {
        (Some(requested), Some(entry)) if requested != entry => Err(AppError::validation(
            "pallets",
            "Pallets must hold the product of the entry",
            "Los pallets deben contener el producto de la entrada",
        )),
        (Some(product), _) | (None, Some(product)) => Ok(product),
        (None, None) => Err(AppError::validation(
            "product_id",
            "Product is required",
            "Debe seleccionar un producto",
        )),
    }
}

/// Insert a pallet on an open connection so callers can run it inside
/// their own transaction.
///
/// `entry_product` is set when the pallet arrives with an entry movement.
pub(crate) async fn insert_pallet(
    conn: &mut PgConnection,
    input: &CreatePalletInput,
    entry_product: Option<Uuid>,
    movement_id: Option<Uuid>,
) -> AppResult<Pallet> {
    let code = input.code.trim();
    validate_product_code(code)
        .map_err(|_| AppError::validation("code", "Pallet code is invalid", "Código de pallet inválido"))?;
    validate_pallet_quantity(input.quantity).map_err(|m| {
        AppError::validation("quantity", m, "La cantidad del pallet debe ser positiva")
    })?;
    validate_pallet_dates(input.manufactured_on, input.expires_on).map_err(|m| {
        AppError::validation(
            "expires_on",
            m,
            "El vencimiento no puede ser anterior a la elaboración",
        )
    })?;

    let product_id = pallet_product(input.product_id, entry_product)?;

    let row = sqlx::query_as::<_, PalletRow>(
        r#"
        INSERT INTO pallets (code, description, product_id, quantity, lot, manufactured_on, expires_on, state, movement_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id, code, description, product_id, quantity, lot, manufactured_on, expires_on,
                  state, position_id, movement_id, created_at
        "#,
    )
    .bind(code)
    .bind(&input.description)
    .bind(product_id)
    .bind(input.quantity)
    .bind(&input.lot)
    .bind(input.manufactured_on)
    .bind(input.expires_on)
    .bind(PalletState::ToPlace.as_str())
    .bind(movement_id)
    .fetch_one(&mut *conn)
    .await?;

    row.try_into()
}

impl PalletService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List pallets, newest first
    pub async fn list(&self) -> AppResult<Vec<PalletView>> {
        let rows = sqlx::query_as::<_, PalletViewRow>(&format!(
            "{} ORDER BY pl.created_at DESC",
            PALLET_VIEW_SELECT
        ))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(PalletView::try_from).collect()
    }

    pub async fn get(&self, pallet_id: Uuid) -> AppResult<PalletView> {
        let row = sqlx::query_as::<_, PalletViewRow>(&format!(
            "{} WHERE pl.id = $1",
            PALLET_VIEW_SELECT
        ))
        .bind(pallet_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Pallet".to_string()))?;

        row.try_into()
    }

    /// Create a standalone pallet in TO_PLACE state
    pub async fn create(&self, input: CreatePalletInput) -> AppResult<PalletView> {
        let mut conn = self.db.acquire().await?;
        let pallet = insert_pallet(&mut conn, &input, None, None).await?;
        drop(conn);

        tracing::info!(pallet_id = %pallet.id, code = %pallet.code, "Pallet created");
        self.get(pallet.id).await
    }

    /// Delete a pallet that is not stored in a slot
    pub async fn delete(&self, pallet_id: Uuid) -> AppResult<()> {
        let state = sqlx::query_scalar::<_, String>("SELECT state FROM pallets WHERE id = $1")
            .bind(pallet_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Pallet".to_string()))?;

        if parse_stored::<PalletState>(&state)? == PalletState::Placed {
            return Err(AppError::Conflict {
                resource: "pallet".to_string(),
                message: "Release the position before deleting a placed pallet".to_string(),
                message_es: "Libere la posición antes de eliminar un pallet ubicado".to_string(),
            });
        }

        sqlx::query("DELETE FROM pallets WHERE id = $1")
            .bind(pallet_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(err: AppError) -> String {
        match err {
            AppError::Validation { field, .. } => field,
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_entry_pallet_takes_entry_product() {
        let entry = Uuid::new_v4();
        assert_eq!(pallet_product(None, Some(entry)).unwrap(), entry);
        assert_eq!(pallet_product(Some(entry), Some(entry)).unwrap(), entry);
    }

    #[test]
    fn test_entry_pallet_with_other_product_rejected() {
        let err = pallet_product(Some(Uuid::new_v4()), Some(Uuid::new_v4())).unwrap_err();
        assert_eq!(field(err), "pallets");
    }

    #[test]
    fn test_standalone_pallet_needs_product() {
        let product = Uuid::new_v4();
        assert_eq!(pallet_product(Some(product), None).unwrap(), product);
        assert_eq!(field(pallet_product(None, None).unwrap_err()), "product_id");
    }
}
