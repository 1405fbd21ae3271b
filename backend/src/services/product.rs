//! Product catalog service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::{
    validate_name, validate_packaging_factor, validate_product_code, validate_stock,
    CreateProductInput, Product, UpdateProductInput, DEFAULT_UNIT_OF_MEASURE,
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Service for the product catalog
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// Row for product queries
#[derive(Debug, FromRow)]
pub(crate) struct ProductRow {
    id: Uuid,
    code: String,
    name: String,
    description: Option<String>,
    stock: Decimal,
    unit_of_measure: String,
    units_per_box: Option<i32>,
    boxes_per_pallet: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            code: row.code,
            name: row.name,
            description: row.description,
            stock: row.stock,
            unit_of_measure: row.unit_of_measure,
            units_per_box: row.units_per_box,
            boxes_per_pallet: row.boxes_per_pallet,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub(crate) const PRODUCT_COLUMNS: &str = "id, code, name, description, stock, unit_of_measure, \
     units_per_box, boxes_per_pallet, created_at, updated_at";

fn check(result: Result<(), &'static str>, field: &str, message_es: &str) -> AppResult<()> {
    result.map_err(|message| AppError::validation(field, message, message_es))
}

/// Column values for an update; `stock` is `None` unless the client set it
#[derive(Debug, PartialEq)]
struct ProductChanges {
    code: String,
    name: String,
    description: Option<String>,
    stock: Option<Decimal>,
    unit_of_measure: String,
    units_per_box: Option<i32>,
    boxes_per_pallet: Option<i32>,
}

impl ProductChanges {
    fn resolve(existing: Product, input: UpdateProductInput) -> AppResult<Self> {
        let changes = ProductChanges {
            code: input
                .code
                .map(|c| c.trim().to_string())
                .unwrap_or(existing.code),
            name: input.name.unwrap_or(existing.name).trim().to_string(),
            description: input.description.or(existing.description),
            stock: input.stock,
            unit_of_measure: input
                .unit_of_measure
                .filter(|u| !u.trim().is_empty())
                .unwrap_or(existing.unit_of_measure),
            units_per_box: input.units_per_box.or(existing.units_per_box),
            boxes_per_pallet: input.boxes_per_pallet.or(existing.boxes_per_pallet),
        };

        check(validate_product_code(&changes.code), "code", "Código de producto inválido")?;
        check(validate_name(&changes.name), "name", "El nombre es obligatorio")?;
        if let Some(stock) = changes.stock {
            check(validate_stock(stock), "stock", "El stock no puede ser negativo")?;
        }
        check(
            validate_packaging_factor(changes.units_per_box),
            "units_per_box",
            "Las unidades por caja deben ser positivas",
        )?;
        check(
            validate_packaging_factor(changes.boxes_per_pallet),
            "boxes_per_pallet",
            "Las cajas por pallet deben ser positivas",
        )?;

        Ok(changes)
    }
}

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List products ordered by name, optionally filtered by name
    pub async fn list(&self, name_pattern: Option<&str>) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE ($1::text IS NULL OR name ILIKE $1) ORDER BY name ASC",
            PRODUCT_COLUMNS
        ))
        .bind(name_pattern)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Get a product by id
    pub async fn get(&self, product_id: Uuid) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Ok(row.into())
    }

    /// Create a product
    pub async fn create(&self, input: CreateProductInput) -> AppResult<Product> {
        let code = input.code.trim().to_string();
        check(validate_product_code(&code), "code", "Código de producto inválido")?;
        check(validate_name(&input.name), "name", "El nombre es obligatorio")?;
        check(validate_stock(input.stock), "stock", "El stock no puede ser negativo")?;
        check(
            validate_packaging_factor(input.units_per_box),
            "units_per_box",
            "Las unidades por caja deben ser positivas",
        )?;
        check(
            validate_packaging_factor(input.boxes_per_pallet),
            "boxes_per_pallet",
            "Las cajas por pallet deben ser positivas",
        )?;

        self.ensure_code_free(&code).await?;

        let unit = input
            .unit_of_measure
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_UNIT_OF_MEASURE.to_string());

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            INSERT INTO products (code, name, description, stock, unit_of_measure, units_per_box, boxes_per_pallet)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(&code)
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.stock)
        .bind(&unit)
        .bind(input.units_per_box)
        .bind(input.boxes_per_pallet)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(product_id = %row.id, code = %row.code, "Product created");
        Ok(row.into())
    }

    /// Update a product; absent fields keep their value.
    ///
    /// Stock is only written when the input carries it, and the row stays
    /// locked so a concurrent movement cannot be overwritten.
    pub async fn update(&self, product_id: Uuid, input: UpdateProductInput) -> AppResult<Product> {
        let mut tx = self.db.begin().await?;

        let existing: Product = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = $1 FOR UPDATE",
            PRODUCT_COLUMNS
        ))
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?
        .into();

        let changes = ProductChanges::resolve(existing, input)?;

        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE code = $1 AND id <> $2)",
        )
        .bind(&changes.code)
        .bind(product_id)
        .fetch_one(&mut *tx)
        .await?;
        if taken {
            return Err(AppError::DuplicateEntry("code".to_string()));
        }

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            UPDATE products
            SET code = $1, name = $2, description = $3, stock = COALESCE($4, stock),
                unit_of_measure = $5, units_per_box = $6, boxes_per_pallet = $7, updated_at = NOW()
            WHERE id = $8
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(&changes.code)
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(changes.stock)
        .bind(&changes.unit_of_measure)
        .bind(changes.units_per_box)
        .bind(changes.boxes_per_pallet)
        .bind(product_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        if let Some(stock) = changes.stock {
            tracing::info!(product_id = %product_id, stock = %stock, "Product stock set by hand");
        }
        Ok(row.into())
    }

    /// Delete a product
    pub async fn delete(&self, product_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }

        Ok(())
    }

    /// Reject a code already in use.
    ///
    /// The unique constraint still guards concurrent inserts.
    async fn ensure_code_free(&self, code: &str) -> AppResult<()> {
        let taken =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE code = $1)")
                .bind(code)
                .fetch_one(&self.db)
                .await?;

        if taken {
            return Err(AppError::DuplicateEntry("code".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn product(stock: &str) -> Product {
        Product {
            id: Uuid::new_v4(),
            code: "YM-01".to_string(),
            name: "Yerba".to_string(),
            description: None,
            stock: Decimal::from_str(stock).unwrap(),
            unit_of_measure: "kg".to_string(),
            units_per_box: Some(12),
            boxes_per_pallet: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn rename(name: &str) -> UpdateProductInput {
        UpdateProductInput {
            code: None,
            name: Some(name.to_string()),
            description: None,
            stock: None,
            unit_of_measure: None,
            units_per_box: None,
            boxes_per_pallet: None,
        }
    }

    #[test]
    fn test_rename_leaves_stock_to_the_database() {
        let changes = ProductChanges::resolve(product("10"), rename(" Yerba mate ")).unwrap();
        assert_eq!(changes.name, "Yerba mate");
        assert_eq!(changes.code, "YM-01");
        assert_eq!(changes.stock, None);
        assert_eq!(changes.units_per_box, Some(12));
    }

    #[test]
    fn test_explicit_stock_is_validated() {
        let mut input = rename("Yerba");
        input.stock = Some(Decimal::from(25));
        assert_eq!(
            ProductChanges::resolve(product("10"), input).unwrap().stock,
            Some(Decimal::from(25))
        );

        let mut input = rename("Yerba");
        input.stock = Some(Decimal::NEGATIVE_ONE);
        assert!(matches!(
            ProductChanges::resolve(product("10"), input),
            Err(AppError::Validation { ref field, .. }) if field == "stock"
        ));
    }

    #[test]
    fn test_blank_name_rejected() {
        assert!(ProductChanges::resolve(product("0"), rename("   ")).is_err());
    }
}
