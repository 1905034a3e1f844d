//! # Budget Item Repository
//!
//! Database operations for budget line items (`budget_items`).
//!
//! ## Save Flow
//! ```text
//! BudgetEditor::save() ──► LineItemRecord
//!      │
//!      ▼
//! upsert(record) ← THIS MODULE
//!      │
//!      ├── record → BudgetLineItem   (inputs validated, derived fields recomputed)
//!      │
//!      ├── BEGIN
//!      │   ├── adopt the budget's area convention
//!      │   ├── INSERT ... ON CONFLICT(id) DO UPDATE
//!      │   └── refresh budget_docs.total_amount
//!      └── COMMIT
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use crate::repository::budget::refresh_total;
use crate::repository::to_u32;
use signshop_core::{AreaPricing, BudgetLineItem, LineItemRecord, Money};

// =============================================================================
// Row Type
// =============================================================================

/// A `budget_items` row, as stored.
#[derive(Debug, Clone, sqlx::FromRow)]
struct ItemRow {
    id: String,
    budget_id: String,
    item_no: i64,
    description: String,
    category: String,
    color: String,
    faces: i64,
    height_cm: f64,
    width_cm: f64,
    area_m2: f64,
    area_m2_ceil: f64,
    qty: f64,
    unit_price: i64,
    discount_pct: f64,
    area_pricing: AreaPricing,
    total_gs: i64,
}

impl ItemRow {
    /// Rebuilds the line, recomputing every derived column.
    fn into_line(self) -> DbResult<BudgetLineItem> {
        let record = LineItemRecord {
            id: self.id,
            document_id: self.budget_id,
            line_number: to_u32(self.item_no, "item_no")?,
            description: self.description,
            category: self.category,
            color: self.color,
            faces: to_u32(self.faces, "faces")?,
            height_cm: self.height_cm,
            width_cm: self.width_cm,
            area_m2: self.area_m2,
            area_m2_rounded: self.area_m2_ceil,
            quantity: self.qty,
            unit_price: Money::from_guaranies(self.unit_price),
            discount_pct: self.discount_pct,
            line_total: Money::from_guaranies(self.total_gs),
            area_pricing: self.area_pricing,
        };

        let stored = (record.area_m2_rounded, record.line_total);
        let line = BudgetLineItem::try_from(record)?;

        if stored != (line.area_m2_rounded(), line.line_total()) {
            warn!(
                line_id = %line.id,
                stored_total = stored.1.guaranies(),
                computed_total = line.line_total().guaranies(),
                "Stored line values differ from recomputed values"
            );
        }

        Ok(line)
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for budget line item operations.
#[derive(Debug, Clone)]
pub struct BudgetItemRepository {
    pool: SqlitePool,
}

impl BudgetItemRepository {
    /// Creates a new BudgetItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BudgetItemRepository { pool }
    }

    /// Inserts or updates a line by ID and refreshes the budget total.
    ///
    /// New lines go to the end of the table; updated lines keep their
    /// position. The line is priced under the budget's area convention,
    /// whatever convention the record carries.
    ///
    /// ## Returns
    /// The line as stored, with derived values recomputed.
    ///
    /// ## Errors
    /// - `DbError::Core` if the record fails validation (nothing is written)
    /// - `DbError::ForeignKeyViolation` if the budget doesn't exist
    /// - `DbError::NotFound` if the ID belongs to a line of another budget
    pub async fn upsert(&self, record: &LineItemRecord) -> DbResult<BudgetLineItem> {
        let mut line = BudgetLineItem::try_from(record.clone())?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        // A missing budget falls through to the foreign key check below
        let area_pricing: Option<AreaPricing> =
            sqlx::query_scalar("SELECT area_pricing FROM budget_docs WHERE id = ?1")
                .bind(&line.document_id)
                .fetch_optional(&mut *tx)
                .await?;
        if let Some(area_pricing) = area_pricing {
            line.set_area_pricing(area_pricing)?;
        }

        debug!(
            id = %line.id,
            budget_id = %line.document_id,
            line_total = line.line_total().guaranies(),
            "Saving budget line"
        );

        let result = sqlx::query(
            r#"
            INSERT INTO budget_items (
                id, budget_id, item_no, description, category, color, faces,
                height_cm, width_cm, area_m2, area_m2_ceil, qty,
                unit_price, discount_pct, area_pricing, total_gs,
                position, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7,
                ?8, ?9, ?10, ?11, ?12,
                ?13, ?14, ?15, ?16,
                (SELECT COALESCE(MAX(position), 0) + 1 FROM budget_items WHERE budget_id = ?2),
                ?17, ?17
            )
            ON CONFLICT(id) DO UPDATE SET
                item_no = excluded.item_no,
                description = excluded.description,
                category = excluded.category,
                color = excluded.color,
                faces = excluded.faces,
                height_cm = excluded.height_cm,
                width_cm = excluded.width_cm,
                area_m2 = excluded.area_m2,
                area_m2_ceil = excluded.area_m2_ceil,
                qty = excluded.qty,
                unit_price = excluded.unit_price,
                discount_pct = excluded.discount_pct,
                area_pricing = excluded.area_pricing,
                total_gs = excluded.total_gs,
                updated_at = excluded.updated_at
            WHERE budget_items.budget_id = excluded.budget_id
            "#,
        )
        .bind(&line.id)
        .bind(&line.document_id)
        .bind(line.line_number as i64)
        .bind(&line.description)
        .bind(line.category.tag())
        .bind(&line.color)
        .bind(line.faces() as i64)
        .bind(line.height_cm())
        .bind(line.width_cm())
        .bind(line.area_m2())
        .bind(line.area_m2_rounded())
        .bind(line.quantity())
        .bind(line.unit_price().guaranies())
        .bind(line.discount().fraction())
        .bind(line.area_pricing())
        .bind(line.line_total().guaranies())
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Budget line", &line.id));
        }

        refresh_total(&mut tx, &line.document_id).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(line)
    }

    /// Deletes a line and refreshes the budget total.
    ///
    /// Remaining lines keep their numbers.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting budget line");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let budget_id: Option<String> =
            sqlx::query_scalar("SELECT budget_id FROM budget_items WHERE id = ?1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let budget_id = budget_id.ok_or_else(|| DbError::not_found("Budget line", id))?;

        sqlx::query("DELETE FROM budget_items WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        refresh_total(&mut tx, &budget_id).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Lists a budget's lines in table order.
    pub async fn list_for_budget(&self, budget_id: &str) -> DbResult<Vec<BudgetLineItem>> {
        let mut conn = self.pool.acquire().await?;
        fetch_items(&mut conn, budget_id).await
    }
}

/// Loads and reprices a budget's lines on the given connection.
pub(crate) async fn fetch_items(conn: &mut SqliteConnection, budget_id: &str) -> DbResult<Vec<BudgetLineItem>> {
    let rows: Vec<ItemRow> = sqlx::query_as(
        r#"
        SELECT
            id, budget_id, item_no, description, category, color, faces,
            height_cm, width_cm, area_m2, area_m2_ceil, qty,
            unit_price, discount_pct, area_pricing, total_gs
        FROM budget_items
        WHERE budget_id = ?1
        ORDER BY position
        "#,
    )
    .bind(budget_id)
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter().map(ItemRow::into_line).collect()
}

/// Rewrites the derived pricing columns of a stored line.
pub(crate) async fn write_line_pricing(conn: &mut SqliteConnection, line: &BudgetLineItem) -> DbResult<()> {
    sqlx::query(
        r#"
        UPDATE budget_items SET
            area_pricing = ?2,
            area_m2 = ?3,
            area_m2_ceil = ?4,
            total_gs = ?5,
            updated_at = ?6
        WHERE id = ?1
        "#,
    )
    .bind(&line.id)
    .bind(line.area_pricing())
    .bind(line.area_m2())
    .bind(line.area_m2_rounded())
    .bind(line.line_total().guaranies())
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use signshop_core::{
        BudgetDocument, Category, CoreError, DiscountRate, NewBudget, QuoteSettings, TaxRate,
    };

    const PROJECT_ID: &str = "550e8400-e29b-41d4-a716-446655440000";

    async fn setup() -> (Database, BudgetDocument) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let doc = db
            .budgets()
            .create(
                &NewBudget::new(PROJECT_ID, "Sede central", "Corporación ABC"),
                &QuoteSettings::default(),
            )
            .await
            .unwrap();
        (db, doc)
    }

    fn record(
        id: &str,
        doc: &BudgetDocument,
        n: u32,
        (h, w, qty, price, d): (f64, f64, f64, i64, f64),
    ) -> LineItemRecord {
        let mut line = BudgetLineItem::new(id, doc.id.clone(), n, doc.area_pricing());
        line.set_height_cm(h).unwrap();
        line.set_width_cm(w).unwrap();
        line.set_quantity(qty).unwrap();
        line.set_unit_price(Money::from_guaranies(price)).unwrap();
        line.set_discount(DiscountRate::from_fraction(d).unwrap()).unwrap();
        line.to_record()
    }

    #[tokio::test]
    async fn test_upsert_refreshes_total() {
        let (db, doc) = setup().await;

        db.items()
            .upsert(&record("a", &doc, 1, (200.0, 300.0, 1.0, 5_000_000, 0.0)))
            .await
            .unwrap();
        db.items()
            .upsert(&record("b", &doc, 2, (50.0, 400.0, 10.0, 800_000, 0.05)))
            .await
            .unwrap();

        let stored = db.budgets().get_by_id(&doc.id).await.unwrap().unwrap();
        assert_eq!(stored.total_amount, 13_860_000);

        let loaded = db.budgets().load_document(&doc.id).await.unwrap();
        let ids: Vec<&str> = loaded.items().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        let summary = loaded.summary().unwrap();
        assert_eq!(summary.subtotal.guaranies(), 12_600_000);
        assert_eq!(summary.total.guaranies(), 13_860_000);
    }

    #[tokio::test]
    async fn test_upsert_update_keeps_position() {
        let (db, doc) = setup().await;
        db.items()
            .upsert(&record("a", &doc, 1, (0.0, 0.0, 1.0, 100_000, 0.0)))
            .await
            .unwrap();
        db.items()
            .upsert(&record("b", &doc, 2, (0.0, 0.0, 1.0, 200_000, 0.0)))
            .await
            .unwrap();

        let mut updated = record("a", &doc, 1, (0.0, 0.0, 3.0, 100_000, 0.0));
        updated.category = Category::Vinilo.tag().to_string();
        let line = db.items().upsert(&updated).await.unwrap();
        assert_eq!(line.line_total().guaranies(), 300_000);

        let items = db.items().list_for_budget(&doc.id).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "a");
        assert_eq!(items[0].category, Category::Vinilo);
        assert_eq!(items[0].quantity(), 3.0);

        let stored = db.budgets().get_by_id(&doc.id).await.unwrap().unwrap();
        // (300000 + 200000) × 1.1
        assert_eq!(stored.total_amount, 550_000);
    }

    #[tokio::test]
    async fn test_upsert_recomputes_stale_derived_fields() {
        let (db, doc) = setup().await;
        let mut stale = record("a", &doc, 1, (55.0, 55.0, 1.0, 100_000, 0.0));
        stale.area_m2_rounded = 0.3025;
        stale.line_total = Money::from_guaranies(1);

        let line = db.items().upsert(&stale).await.unwrap();
        assert_eq!(line.area_m2_rounded(), 0.5);
        assert_eq!(line.line_total().guaranies(), 165_289);
    }

    #[tokio::test]
    async fn test_upsert_rejects_invalid_record() {
        let (db, doc) = setup().await;
        let mut bad = record("a", &doc, 1, (10.0, 10.0, 1.0, 1000, 0.0));
        bad.height_cm = -10.0;

        let err = db.items().upsert(&bad).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));
        assert!(db.items().list_for_budget(&doc.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_unknown_budget() {
        let (db, doc) = setup().await;
        let mut orphan = record("a", &doc, 1, (0.0, 0.0, 1.0, 1000, 0.0));
        orphan.document_id = "missing".to_string();

        let err = db.items().upsert(&orphan).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_upsert_adopts_budget_area_pricing() {
        let (db, mut doc) = setup().await;
        doc.set_area_pricing(AreaPricing::PerBillableArea).unwrap();
        doc.set_iva(TaxRate::zero());
        db.budgets().update_header(&doc).await.unwrap();

        let mut rescaled = BudgetLineItem::new("a", doc.id.clone(), 1, AreaPricing::Rescaled);
        rescaled.set_height_cm(55.0).unwrap();
        rescaled.set_width_cm(55.0).unwrap();
        rescaled.set_unit_price(Money::from_guaranies(100_000)).unwrap();

        let line = db.items().upsert(&rescaled.to_record()).await.unwrap();
        assert_eq!(line.area_pricing(), AreaPricing::PerBillableArea);
        assert_eq!(line.line_total().guaranies(), 50_000);

        let stored = db.budgets().get_by_id(&doc.id).await.unwrap().unwrap();
        assert_eq!(stored.total_amount, 50_000);
    }

    #[tokio::test]
    async fn test_discount_stored_exactly() {
        let (db, doc) = setup().await;
        db.items()
            .upsert(&record("a", &doc, 1, (0.0, 0.0, 1.0, 5_000_000, 0.12345)))
            .await
            .unwrap();

        let items = db.items().list_for_budget(&doc.id).await.unwrap();
        assert_eq!(items[0].discount().fraction(), 0.12345);
        assert_eq!(items[0].line_total().guaranies(), 4_382_750);
    }

    #[tokio::test]
    async fn test_delete_refreshes_total() {
        let (db, doc) = setup().await;
        db.items()
            .upsert(&record("a", &doc, 1, (0.0, 0.0, 1.0, 100_000, 0.0)))
            .await
            .unwrap();
        db.items()
            .upsert(&record("b", &doc, 2, (0.0, 0.0, 1.0, 200_000, 0.0)))
            .await
            .unwrap();

        db.items().delete("a").await.unwrap();

        let items = db.items().list_for_budget(&doc.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].line_number, 2);

        let stored = db.budgets().get_by_id(&doc.id).await.unwrap().unwrap();
        assert_eq!(stored.total_amount, 220_000);

        let err = db.items().delete("a").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_reprices_drifted_rows() {
        let (db, doc) = setup().await;
        db.items()
            .upsert(&record("a", &doc, 1, (200.0, 300.0, 1.0, 5_000_000, 0.0)))
            .await
            .unwrap();

        sqlx::query("UPDATE budget_items SET total_gs = 1, area_m2_ceil = 99 WHERE id = 'a'")
            .execute(db.pool())
            .await
            .unwrap();

        let items = db.items().list_for_budget(&doc.id).await.unwrap();
        assert_eq!(items[0].area_m2_rounded(), 6.0);
        assert_eq!(items[0].line_total().guaranies(), 5_000_000);
    }

    #[tokio::test]
    async fn test_header_iva_applies_to_refresh() {
        let (db, mut doc) = setup().await;
        doc.set_iva(TaxRate::zero());
        db.budgets().update_header(&doc).await.unwrap();

        db.items()
            .upsert(&record("a", &doc, 1, (0.0, 0.0, 2.0, 50_000, 0.0)))
            .await
            .unwrap();

        let stored = db.budgets().get_by_id(&doc.id).await.unwrap().unwrap();
        assert_eq!(stored.total_amount, 100_000);
    }
}
