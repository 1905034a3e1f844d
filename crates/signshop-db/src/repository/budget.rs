//! # Budget Repository
//!
//! Database operations for budget documents (`budget_docs`).
//!
//! ## Budget Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Budget Lifecycle                                  │
//! │                                                                         │
//! │  1. CREATE                                                             │
//! │     └── create() → BudgetDocument { status: Draft, total: 0 }          │
//! │                                                                         │
//! │  2. PRICE LINES                                                        │
//! │     └── items().upsert() → total_amount refreshed                      │
//! │     └── items().delete() → total_amount refreshed                      │
//! │     └── update_header()  → discount / IVA changed, total refreshed     │
//! │                             area convention changed, lines repriced   │
//! │                                                                         │
//! │  3. DECIDE                                                             │
//! │     └── set_status(Approved | Rejected)                                │
//! │                                                                         │
//! │  4. (OPTIONAL) NEW VERSION                                             │
//! │     └── set_status(Revised) + create() with version + 1                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::item::{fetch_items, write_line_pricing};
use crate::repository::to_u32;
use signshop_core::{
    summarize, AreaPricing, BudgetDocument, BudgetStatus, BudgetSummary, Money, NewBudget,
    QuoteSettings, TaxRate,
};

// =============================================================================
// Record Type
// =============================================================================

/// A `budget_docs` row.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BudgetRecord {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub client: String,
    pub version: i64,
    pub issue_date: NaiveDate,
    pub status: BudgetStatus,
    pub discount_doc: i64,
    /// IVA as a fraction (`0.1` is 10%).
    pub iva_pct: f64,
    pub area_pricing: AreaPricing,
    /// Stored copy of the document total, refreshed on every item write.
    pub total_amount: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BudgetRecord {
    /// Rebuilds the header as a document with no lines.
    pub fn to_document(&self) -> DbResult<BudgetDocument> {
        let settings = QuoteSettings {
            default_iva: TaxRate::from_fraction(self.iva_pct)?,
            area_pricing: self.area_pricing,
            ..QuoteSettings::default()
        };
        let input = NewBudget {
            project_id: self.project_id.clone(),
            name: self.name.clone(),
            client: self.client.clone(),
            version: to_u32(self.version, "version")?,
            issue_date: Some(self.issue_date),
        };

        let mut doc = BudgetDocument::new(self.id.clone(), input, self.issue_date, &settings)?;
        doc.status = self.status;
        doc.set_discount_doc(Money::from_guaranies(self.discount_doc))?;
        Ok(doc)
    }
}

const SELECT_BUDGET: &str = r#"
    SELECT
        id, project_id, name, client, version, issue_date, status,
        discount_doc, iva_pct, area_pricing, total_amount,
        created_at, updated_at
    FROM budget_docs
"#;

// =============================================================================
// Repository
// =============================================================================

/// Repository for budget document operations.
#[derive(Debug, Clone)]
pub struct BudgetRepository {
    pool: SqlitePool,
}

impl BudgetRepository {
    /// Creates a new BudgetRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BudgetRepository { pool }
    }

    /// Creates a draft budget.
    ///
    /// IVA and the area convention come from `settings`; the issue date
    /// defaults to today.
    ///
    /// ## Errors
    /// - `DbError::Core` if `input` fails validation
    pub async fn create(&self, input: &NewBudget, settings: &QuoteSettings) -> DbResult<BudgetDocument> {
        let today = Utc::now().date_naive();
        let doc = BudgetDocument::new(Uuid::new_v4().to_string(), input.clone(), today, settings)?;
        let now = Utc::now();

        debug!(id = %doc.id, project_id = %doc.project_id, version = doc.version(), "Creating budget");

        sqlx::query(
            r#"
            INSERT INTO budget_docs (
                id, project_id, name, client, version, issue_date, status,
                discount_doc, iva_pct, area_pricing, total_amount,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7,
                ?8, ?9, ?10, 0,
                ?11, ?11
            )
            "#,
        )
        .bind(&doc.id)
        .bind(&doc.project_id)
        .bind(&doc.name)
        .bind(doc.client())
        .bind(doc.version() as i64)
        .bind(doc.issue_date)
        .bind(doc.status)
        .bind(doc.discount_doc().guaranies())
        .bind(doc.iva().fraction())
        .bind(doc.area_pricing())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(doc)
    }

    /// Gets a budget header by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<BudgetRecord>> {
        let mut conn = self.pool.acquire().await?;
        fetch_record(&mut conn, id).await
    }

    /// Lists a project's budgets, newest version first.
    pub async fn list_by_project(&self, project_id: &str) -> DbResult<Vec<BudgetRecord>> {
        let sql = format!("{SELECT_BUDGET} WHERE project_id = ?1 ORDER BY version DESC, created_at DESC");

        let records = sqlx::query_as::<_, BudgetRecord>(&sql)
            .bind(project_id)
            .fetch_all(&self.pool)
            .await?;

        debug!(project_id = %project_id, count = records.len(), "Listed budgets");
        Ok(records)
    }

    /// Loads a budget with its lines, in table order.
    ///
    /// Lines are repriced on load; a stored total that disagrees with the
    /// recomputed one is logged and the recomputed value wins.
    pub async fn load_document(&self, id: &str) -> DbResult<BudgetDocument> {
        let mut conn = self.pool.acquire().await?;

        let record = fetch_record(&mut conn, id)
            .await?
            .ok_or_else(|| DbError::not_found("Budget", id))?;
        let items = fetch_items(&mut conn, id).await?;

        let mut doc = record.to_document()?;
        for line in items {
            doc.push_line(line)?;
        }

        let summary = doc.summary()?;
        if summary.total.guaranies() != record.total_amount {
            warn!(
                id = %id,
                stored = record.total_amount,
                computed = summary.total.guaranies(),
                "Stored budget total differs from recomputed total"
            );
        }

        Ok(doc)
    }

    /// Writes the header fields of `doc` and refreshes the stored total.
    ///
    /// Stored lines are repriced under the header's area convention in the
    /// same transaction. Their inputs are not touched; save edits through
    /// the item repository.
    pub async fn update_header(&self, doc: &BudgetDocument) -> DbResult<BudgetSummary> {
        debug!(id = %doc.id, "Updating budget header");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let result = sqlx::query(
            r#"
            UPDATE budget_docs SET
                name = ?2,
                client = ?3,
                version = ?4,
                issue_date = ?5,
                status = ?6,
                discount_doc = ?7,
                iva_pct = ?8,
                area_pricing = ?9,
                updated_at = ?10
            WHERE id = ?1
            "#,
        )
        .bind(&doc.id)
        .bind(&doc.name)
        .bind(doc.client())
        .bind(doc.version() as i64)
        .bind(doc.issue_date)
        .bind(doc.status)
        .bind(doc.discount_doc().guaranies())
        .bind(doc.iva().fraction())
        .bind(doc.area_pricing())
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Budget", &doc.id));
        }

        let mut repriced = 0;
        for mut line in fetch_items(&mut tx, &doc.id).await? {
            if line.area_pricing() != doc.area_pricing() {
                line.set_area_pricing(doc.area_pricing())?;
                write_line_pricing(&mut tx, &line).await?;
                repriced += 1;
            }
        }
        if repriced > 0 {
            debug!(id = %doc.id, lines = repriced, area_pricing = ?doc.area_pricing(), "Repriced budget lines");
        }

        let summary = refresh_total(&mut tx, &doc.id).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(summary)
    }

    /// Changes the status of a budget.
    pub async fn set_status(&self, id: &str, status: BudgetStatus) -> DbResult<()> {
        debug!(id = %id, status = ?status, "Setting budget status");

        let result = sqlx::query("UPDATE budget_docs SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Budget", id));
        }

        Ok(())
    }

    /// Counts budgets (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM budget_docs")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Shared Helpers
// =============================================================================

async fn fetch_record(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<BudgetRecord>> {
    let sql = format!("{SELECT_BUDGET} WHERE id = ?1");

    let record = sqlx::query_as::<_, BudgetRecord>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(record)
}

/// Recomputes a budget's summary from its stored lines and writes the total
/// back to `budget_docs.total_amount`.
///
/// Runs on the caller's connection so it joins the caller's transaction.
pub(crate) async fn refresh_total(conn: &mut SqliteConnection, budget_id: &str) -> DbResult<BudgetSummary> {
    let header: Option<(i64, f64)> =
        sqlx::query_as("SELECT discount_doc, iva_pct FROM budget_docs WHERE id = ?1")
            .bind(budget_id)
            .fetch_optional(&mut *conn)
            .await?;
    let (discount_doc, iva_pct) = header.ok_or_else(|| DbError::not_found("Budget", budget_id))?;

    let items = fetch_items(&mut *conn, budget_id).await?;
    let summary = summarize(
        &items,
        Money::from_guaranies(discount_doc),
        TaxRate::from_fraction(iva_pct)?,
    )?;

    sqlx::query("UPDATE budget_docs SET total_amount = ?2, updated_at = ?3 WHERE id = ?1")
        .bind(budget_id)
        .bind(summary.total.guaranies())
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

    debug!(
        budget_id = %budget_id,
        lines = items.len(),
        total = summary.total.guaranies(),
        "Refreshed budget total"
    );

    Ok(summary)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use signshop_core::{BudgetLineItem, CoreError, ValidationError};

    const PROJECT_ID: &str = "550e8400-e29b-41d4-a716-446655440000";

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn new_budget(version: u32) -> NewBudget {
        let mut input = NewBudget::new(PROJECT_ID, "Fachada sucursal", "Corporación ABC");
        input.version = version;
        input.issue_date = NaiveDate::from_ymd_opt(2024, 3, 1);
        input
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = db().await;
        let doc = db
            .budgets()
            .create(&new_budget(1), &QuoteSettings::default())
            .await
            .unwrap();

        let record = db.budgets().get_by_id(&doc.id).await.unwrap().unwrap();
        assert_eq!(record.client, "Corporación ABC");
        assert_eq!(record.status, BudgetStatus::Draft);
        assert_eq!(record.iva_pct, 0.1);
        assert_eq!(record.area_pricing, AreaPricing::Rescaled);
        assert_eq!(record.total_amount, 0);
        assert_eq!(record.issue_date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());

        assert!(db.budgets().get_by_id("missing").await.unwrap().is_none());
        assert_eq!(db.budgets().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let db = db().await;
        let mut input = new_budget(1);
        input.client = String::new();

        let err = db
            .budgets()
            .create(&input, &QuoteSettings::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::Validation(ValidationError::Required { .. }))
        ));
        assert_eq!(db.budgets().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_by_project_newest_version_first() {
        let db = db().await;
        let settings = QuoteSettings::default();
        db.budgets().create(&new_budget(1), &settings).await.unwrap();
        db.budgets().create(&new_budget(2), &settings).await.unwrap();

        let records = db.budgets().list_by_project(PROJECT_ID).await.unwrap();
        let versions: Vec<i64> = records.iter().map(|r| r.version).collect();
        assert_eq!(versions, vec![2, 1]);

        assert!(db.budgets().list_by_project("other").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_status() {
        let db = db().await;
        let doc = db
            .budgets()
            .create(&new_budget(1), &QuoteSettings::default())
            .await
            .unwrap();

        db.budgets().set_status(&doc.id, BudgetStatus::Approved).await.unwrap();
        let record = db.budgets().get_by_id(&doc.id).await.unwrap().unwrap();
        assert_eq!(record.status, BudgetStatus::Approved);

        let err = db
            .budgets()
            .set_status("missing", BudgetStatus::Rejected)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_header_refreshes_total() {
        let db = db().await;
        let mut doc = db
            .budgets()
            .create(&new_budget(1), &QuoteSettings::default())
            .await
            .unwrap();

        doc.set_discount_doc(Money::from_guaranies(25_000)).unwrap();
        doc.set_iva(TaxRate::from_fraction(0.05).unwrap());
        doc.set_client("Corporación ABC S.A.").unwrap();

        let summary = db.budgets().update_header(&doc).await.unwrap();
        assert_eq!(summary.total.guaranies(), -25_000);

        let record = db.budgets().get_by_id(&doc.id).await.unwrap().unwrap();
        assert_eq!(record.client, "Corporación ABC S.A.");
        assert_eq!(record.iva_pct, 0.05);
        assert_eq!(record.total_amount, -25_000);
    }

    #[tokio::test]
    async fn test_update_header_reprices_stored_lines() {
        let db = db().await;
        let mut doc = db
            .budgets()
            .create(&new_budget(1), &QuoteSettings::default())
            .await
            .unwrap();

        let mut line = BudgetLineItem::new("a", doc.id.clone(), 1, doc.area_pricing());
        line.set_height_cm(55.0).unwrap();
        line.set_width_cm(55.0).unwrap();
        line.set_unit_price(Money::from_guaranies(100_000)).unwrap();
        db.items().upsert(&line.to_record()).await.unwrap();
        doc.push_line(line).unwrap();
        doc.set_iva(TaxRate::zero());

        doc.set_area_pricing(AreaPricing::PerBillableArea).unwrap();
        let summary = db.budgets().update_header(&doc).await.unwrap();
        assert_eq!(summary.subtotal.guaranies(), 50_000);

        let stored = db.items().list_for_budget(&doc.id).await.unwrap();
        assert_eq!(stored[0].area_pricing(), AreaPricing::PerBillableArea);
        assert_eq!(stored[0].line_total().guaranies(), 50_000);

        let loaded = db.budgets().load_document(&doc.id).await.unwrap();
        assert_eq!(loaded.summary().unwrap().subtotal.guaranies(), 50_000);
        let record = db.budgets().get_by_id(&doc.id).await.unwrap().unwrap();
        assert_eq!(record.total_amount, 50_000);
    }

    #[tokio::test]
    async fn test_load_document_round_trip() {
        let db = db().await;
        let doc = db
            .budgets()
            .create(&new_budget(3), &QuoteSettings::default())
            .await
            .unwrap();

        let loaded = db.budgets().load_document(&doc.id).await.unwrap();
        assert_eq!(loaded, doc);

        let err = db.budgets().load_document("missing").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
