//! Stock CRUD.

use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};

use coursestock_core::{StockId, StoreError, StoreResult};
use coursestock_inventory::{Stock, StockDraft, StockFilter};

use crate::store::InventoryStore;

impl InventoryStore {
    /// Create a stock row from a validated draft.
    pub async fn add_stock(&self, draft: &StockDraft) -> StoreResult<Stock> {
        draft.validate()?;

        let result = sqlx::query(
            r#"
            INSERT INTO stock (course_code, title, language, quantity)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&draft.course_code)
        .bind(&draft.title)
        .bind(&draft.language)
        .bind(draft.quantity)
        .execute(self.pool())
        .await
        .map_err(|e| map_course_code_collision(e, &draft.course_code))?;

        let id = StockId::new(result.last_insert_rowid());
        tracing::debug!(%id, course_code = %draft.course_code, "stock added");

        Ok(Stock {
            id,
            course_code: draft.course_code.clone(),
            title: draft.title.clone(),
            language: draft.language.clone(),
            quantity: draft.quantity,
        })
    }

    /// List stock rows matching `filter`, ordered by course code.
    pub async fn list_stock(&self, filter: &StockFilter) -> StoreResult<Vec<Stock>> {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT id, course_code, title, language, quantity FROM stock");

        let terms = [
            ("course_code", like_term(&filter.course_code)),
            ("title", like_term(&filter.title)),
            ("language", like_term(&filter.language)),
        ];
        let mut prefix = " WHERE ";
        for (column, term) in terms {
            if let Some(term) = term {
                query.push(prefix);
                query.push(column);
                query.push(" LIKE ");
                query.push_bind(format!("%{term}%"));
                prefix = " AND ";
            }
        }
        query.push(" ORDER BY course_code ASC");

        let rows = query
            .build()
            .fetch_all(self.pool())
            .await
            .map_err(StoreError::storage)?;

        rows.iter().map(stock_from_row).collect()
    }

    /// Look up a stock row by id; a missing row is `Ok(None)`.
    pub async fn get_stock(&self, id: StockId) -> StoreResult<Option<Stock>> {
        let row = sqlx::query(
            "SELECT id, course_code, title, language, quantity FROM stock WHERE id = ?1",
        )
        .bind(id.as_i64())
        .fetch_optional(self.pool())
        .await
        .map_err(StoreError::storage)?;

        row.as_ref().map(stock_from_row).transpose()
    }

    /// Look up a stock row by its unique course code; a missing row is
    /// `Ok(None)`.
    pub async fn get_stock_by_course_code(&self, course_code: &str) -> StoreResult<Option<Stock>> {
        let row = sqlx::query(
            "SELECT id, course_code, title, language, quantity FROM stock WHERE course_code = ?1",
        )
        .bind(course_code)
        .fetch_optional(self.pool())
        .await
        .map_err(StoreError::storage)?;

        row.as_ref().map(stock_from_row).transpose()
    }

    /// Overwrite all four fields of an existing stock row.
    ///
    /// Quantity is written as given; it is not reconciled against the
    /// movement log. Direct edits can therefore desynchronize the quantity
    /// from the sum of movement deltas — a deliberate policy, kept from the
    /// system this replaces.
    pub async fn update_stock(&self, id: StockId, draft: &StockDraft) -> StoreResult<Stock> {
        draft.validate()?;

        let result = sqlx::query(
            r#"
            UPDATE stock
            SET course_code = ?1, title = ?2, language = ?3, quantity = ?4
            WHERE id = ?5
            "#,
        )
        .bind(&draft.course_code)
        .bind(&draft.title)
        .bind(&draft.language)
        .bind(draft.quantity)
        .bind(id.as_i64())
        .execute(self.pool())
        .await
        .map_err(|e| map_course_code_collision(e, &draft.course_code))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        tracing::debug!(%id, course_code = %draft.course_code, "stock updated");

        Ok(Stock {
            id,
            course_code: draft.course_code.clone(),
            title: draft.title.clone(),
            language: draft.language.clone(),
            quantity: draft.quantity,
        })
    }

    /// Delete a stock row, unless movements still reference it.
    pub async fn delete_stock(&self, id: StockId) -> StoreResult<()> {
        let mut tx = self.pool().begin().await.map_err(StoreError::storage)?;

        let dependents: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM stock_movement WHERE stock_id = ?1")
                .bind(id.as_i64())
                .fetch_one(&mut *tx)
                .await
                .map_err(StoreError::storage)?;
        if dependents > 0 {
            return Err(StoreError::HasDependents);
        }

        let result = sqlx::query("DELETE FROM stock WHERE id = ?1")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await
            .map_err(StoreError::storage)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        tx.commit().await.map_err(StoreError::storage)?;
        tracing::debug!(%id, "stock deleted");
        Ok(())
    }
}

/// A filter term worth putting in the WHERE clause: present and non-blank.
pub(crate) fn like_term(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn stock_from_row(row: &SqliteRow) -> StoreResult<Stock> {
    Ok(Stock {
        id: StockId::new(row.try_get("id").map_err(StoreError::storage)?),
        course_code: row.try_get("course_code").map_err(StoreError::storage)?,
        title: row.try_get("title").map_err(StoreError::storage)?,
        language: row.try_get("language").map_err(StoreError::storage)?,
        quantity: row.try_get("quantity").map_err(StoreError::storage)?,
    })
}

fn map_course_code_collision(err: sqlx::Error, course_code: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.kind() == sqlx::error::ErrorKind::UniqueViolation => {
            StoreError::duplicate_key(format!("course_code '{course_code}' already exists"))
        }
        _ => StoreError::storage(err),
    }
}
