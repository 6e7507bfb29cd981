//! Movement posting, listing, and deletion.
//!
//! Posting and deletion share one rule: the referenced stock row is read,
//! the signed delta is applied (refusing to go below zero), and the quantity
//! write and the movement row commit in the same database transaction or not
//! at all.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, Transaction};

use coursestock_core::{MovementId, StockId, StoreError, StoreResult};
use coursestock_inventory::{
    MovementAction, MovementDetails, MovementDraft, MovementFilter, MovementRecord, apply_delta,
};

use crate::stock::like_term;
use crate::store::InventoryStore;

const RECORD_COLUMNS: &str = "m.id, m.stock_id, s.course_code, m.action, m.quantity, \
     m.recorded_at, m.enrolment_no, m.name, m.remarks, m.phone";

impl InventoryStore {
    /// Post a movement: adjust the referenced stock's quantity and insert
    /// the movement row as one unit of work.
    ///
    /// An `out` movement larger than the current quantity fails with
    /// `NegativeStock` and persists nothing.
    pub async fn post_movement(&self, draft: &MovementDraft) -> StoreResult<MovementRecord> {
        draft.validate()?;

        let mut tx = self.pool().begin().await.map_err(StoreError::storage)?;

        let delta = draft.action.signed_delta(draft.quantity);
        let course_code = adjust_quantity(&mut tx, draft.stock_id, delta).await?;

        let recorded_at = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO stock_movement
                (stock_id, action, quantity, recorded_at, enrolment_no, name, remarks, phone)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(draft.stock_id.as_i64())
        .bind(draft.action.as_str())
        .bind(draft.quantity)
        .bind(recorded_at.to_rfc3339())
        .bind(&draft.details.enrolment_no)
        .bind(&draft.details.name)
        .bind(&draft.details.remarks)
        .bind(&draft.details.phone)
        .execute(&mut *tx)
        .await
        .map_err(StoreError::storage)?;

        tx.commit().await.map_err(StoreError::storage)?;

        let id = MovementId::new(result.last_insert_rowid());
        tracing::debug!(
            %id,
            stock_id = %draft.stock_id,
            action = %draft.action,
            quantity = draft.quantity,
            "movement posted, stock adjusted"
        );

        Ok(MovementRecord {
            id,
            stock_id: draft.stock_id,
            course_code,
            action: draft.action,
            quantity: draft.quantity,
            recorded_at,
            details: draft.details.clone(),
        })
    }

    /// List movements matching `filter`, most recent first, each joined with
    /// its stock's course code.
    pub async fn list_movements(&self, filter: &MovementFilter) -> StoreResult<Vec<MovementRecord>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {RECORD_COLUMNS} FROM stock_movement m JOIN stock s ON s.id = m.stock_id"
        ));

        let terms = [
            ("s.course_code", like_term(&filter.course_code)),
            ("m.enrolment_no", like_term(&filter.enrolment_no)),
            ("m.name", like_term(&filter.name)),
            ("m.remarks", like_term(&filter.remarks)),
            ("m.phone", like_term(&filter.phone)),
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
        if let Some(action) = filter.action {
            query.push(prefix);
            query.push("m.action = ");
            query.push_bind(action.as_str());
        }
        // RFC 3339 text only sorts at second granularity; break ties by id so
        // "most recent first" stays deterministic.
        query.push(" ORDER BY m.recorded_at DESC, m.id DESC");

        let rows = query
            .build()
            .fetch_all(self.pool())
            .await
            .map_err(StoreError::storage)?;

        rows.iter().map(movement_from_row).collect()
    }

    /// Look up a movement by id, joined with its stock's course code; a
    /// missing row is `Ok(None)`.
    pub async fn get_movement(&self, id: MovementId) -> StoreResult<Option<MovementRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {RECORD_COLUMNS} FROM stock_movement m JOIN stock s ON s.id = m.stock_id \
             WHERE m.id = ?1"
        ))
        .bind(id.as_i64())
        .fetch_optional(self.pool())
        .await
        .map_err(StoreError::storage)?;

        row.as_ref().map(movement_from_row).transpose()
    }

    /// Overwrite the four free-text detail fields of a movement.
    ///
    /// `action`, `quantity`, `stock_id`, and `recorded_at` are immutable
    /// after posting; this never touches stock quantity.
    pub async fn update_movement_details(
        &self,
        id: MovementId,
        details: &MovementDetails,
    ) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE stock_movement
            SET enrolment_no = ?1, name = ?2, remarks = ?3, phone = ?4
            WHERE id = ?5
            "#,
        )
        .bind(&details.enrolment_no)
        .bind(&details.name)
        .bind(&details.remarks)
        .bind(&details.phone)
        .bind(id.as_i64())
        .execute(self.pool())
        .await
        .map_err(StoreError::storage)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        tracing::debug!(%id, "movement details updated");
        Ok(())
    }

    /// Delete a movement, reversing its effect on the linked stock first.
    ///
    /// The reversal runs under the same negative-stock rule as posting: if
    /// removing an `in` movement would drive the quantity below zero, the
    /// whole operation fails and the movement stays in the log.
    pub async fn delete_movement(&self, id: MovementId) -> StoreResult<()> {
        let mut tx = self.pool().begin().await.map_err(StoreError::storage)?;

        let row = sqlx::query("SELECT stock_id, action, quantity FROM stock_movement WHERE id = ?1")
            .bind(id.as_i64())
            .fetch_optional(&mut *tx)
            .await
            .map_err(StoreError::storage)?
            .ok_or(StoreError::NotFound)?;

        let stock_id = StockId::new(row.try_get("stock_id").map_err(StoreError::storage)?);
        let action: String = row.try_get("action").map_err(StoreError::storage)?;
        let action = action_from_db(&action)?;
        let quantity: i64 = row.try_get("quantity").map_err(StoreError::storage)?;

        adjust_quantity(&mut tx, stock_id, action.reversal_delta(quantity)).await?;

        sqlx::query("DELETE FROM stock_movement WHERE id = ?1")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await
            .map_err(StoreError::storage)?;

        tx.commit().await.map_err(StoreError::storage)?;
        tracing::debug!(%id, %stock_id, "movement deleted, stock restored");
        Ok(())
    }
}

/// Apply `delta` to the stock row inside the caller's open transaction,
/// refusing to go below zero. Returns the row's course code for the caller's
/// record. Dropping the transaction without committing rolls everything back.
async fn adjust_quantity(
    tx: &mut Transaction<'_, Sqlite>,
    stock_id: StockId,
    delta: i64,
) -> StoreResult<String> {
    let row = sqlx::query("SELECT course_code, quantity FROM stock WHERE id = ?1")
        .bind(stock_id.as_i64())
        .fetch_optional(&mut **tx)
        .await
        .map_err(StoreError::storage)?
        .ok_or(StoreError::NotFound)?;

    let course_code: String = row.try_get("course_code").map_err(StoreError::storage)?;
    let current: i64 = row.try_get("quantity").map_err(StoreError::storage)?;
    let next = apply_delta(current, delta)?;

    sqlx::query("UPDATE stock SET quantity = ?1 WHERE id = ?2")
        .bind(next)
        .bind(stock_id.as_i64())
        .execute(&mut **tx)
        .await
        .map_err(StoreError::storage)?;

    Ok(course_code)
}

/// Stored action values are constrained by the schema; anything else is
/// corruption, not caller error.
fn action_from_db(value: &str) -> StoreResult<MovementAction> {
    MovementAction::from_str(value)
        .map_err(|_| StoreError::storage(format!("unexpected action value '{value}' in store")))
}

fn movement_from_row(row: &SqliteRow) -> StoreResult<MovementRecord> {
    let action: String = row.try_get("action").map_err(StoreError::storage)?;
    let recorded_at: String = row.try_get("recorded_at").map_err(StoreError::storage)?;
    let recorded_at = DateTime::parse_from_rfc3339(&recorded_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(StoreError::storage)?;

    Ok(MovementRecord {
        id: MovementId::new(row.try_get("id").map_err(StoreError::storage)?),
        stock_id: StockId::new(row.try_get("stock_id").map_err(StoreError::storage)?),
        course_code: row.try_get("course_code").map_err(StoreError::storage)?,
        action: action_from_db(&action)?,
        quantity: row.try_get("quantity").map_err(StoreError::storage)?,
        recorded_at,
        details: MovementDetails {
            enrolment_no: row.try_get("enrolment_no").map_err(StoreError::storage)?,
            name: row.try_get("name").map_err(StoreError::storage)?,
            remarks: row.try_get("remarks").map_err(StoreError::storage)?,
            phone: row.try_get("phone").map_err(StoreError::storage)?,
        },
    })
}
