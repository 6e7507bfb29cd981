//! Form-facing commands.
//!
//! Each command takes the raw text the form collected, parses it into typed
//! values, calls the store, and maps failures to the `kind: message` string
//! the form shows in a blocking notice.

use std::sync::Arc;

use coursestock_core::{MovementId, StockId, StoreError};
use coursestock_inventory::{
    MovementAction, MovementDetails, MovementDraft, MovementFilter, MovementRecord, Stock,
    StockDraft, StockFilter,
};
use coursestock_store::InventoryStore;

/// Application state the form session holds for its lifetime.
#[derive(Debug, Clone)]
pub struct AppState {
    store: Arc<InventoryStore>,
}

impl AppState {
    pub fn new(store: InventoryStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn store(&self) -> &InventoryStore {
        &self.store
    }
}

/// Add a stock item from the manage-stock form fields.
pub async fn add_stock(
    state: &AppState,
    course_code: &str,
    title: &str,
    language: &str,
    quantity: &str,
) -> Result<String, String> {
    let draft = stock_draft(course_code, title, language, quantity).map_err(display_failure)?;
    let stock = state.store.add_stock(&draft).await.map_err(display_failure)?;
    Ok(format!("Stock '{}' added.", stock.course_code))
}

/// List stock rows for the table view, applying the filter boxes.
pub async fn list_stock(
    state: &AppState,
    course_code: &str,
    title: &str,
    language: &str,
) -> Result<Vec<Stock>, String> {
    let filter = StockFilter {
        course_code: blank_to_none(course_code),
        title: blank_to_none(title),
        language: blank_to_none(language),
    };
    state.store.list_stock(&filter).await.map_err(display_failure)
}

/// Fetch one stock row by course code (course-code picker support).
pub async fn get_stock_by_course_code(
    state: &AppState,
    course_code: &str,
) -> Result<Option<Stock>, String> {
    state
        .store
        .get_stock_by_course_code(course_code.trim())
        .await
        .map_err(display_failure)
}

/// Overwrite the selected stock row with the form fields.
pub async fn update_stock(
    state: &AppState,
    id: &str,
    course_code: &str,
    title: &str,
    language: &str,
    quantity: &str,
) -> Result<String, String> {
    let id: StockId = id.parse().map_err(display_failure)?;
    let draft = stock_draft(course_code, title, language, quantity).map_err(display_failure)?;
    let stock = state
        .store
        .update_stock(id, &draft)
        .await
        .map_err(display_failure)?;
    Ok(format!("Stock '{}' updated.", stock.course_code))
}

/// Delete the selected stock row.
pub async fn delete_stock(state: &AppState, id: &str) -> Result<String, String> {
    let id: StockId = id.parse().map_err(display_failure)?;
    state.store.delete_stock(id).await.map_err(display_failure)?;
    Ok("Stock deleted.".to_string())
}

/// Post a movement from the transaction form fields.
#[allow(clippy::too_many_arguments)]
pub async fn post_movement(
    state: &AppState,
    stock_id: &str,
    action: &str,
    quantity: &str,
    enrolment_no: &str,
    name: &str,
    remarks: &str,
    phone: &str,
) -> Result<String, String> {
    let draft = MovementDraft {
        stock_id: stock_id.parse().map_err(display_failure)?,
        action: action.parse().map_err(display_failure)?,
        quantity: parse_quantity(quantity).map_err(display_failure)?,
        details: details(enrolment_no, name, remarks, phone),
    };
    let posted = state
        .store
        .post_movement(&draft)
        .await
        .map_err(display_failure)?;
    Ok(format!(
        "Movement posted; '{}' stock updated.",
        posted.course_code
    ))
}

/// List the movement log for the table view, applying the filter boxes.
#[allow(clippy::too_many_arguments)]
pub async fn list_movements(
    state: &AppState,
    course_code: &str,
    enrolment_no: &str,
    name: &str,
    remarks: &str,
    phone: &str,
    action: &str,
) -> Result<Vec<MovementRecord>, String> {
    let action = match blank_to_none(action) {
        Some(text) => Some(text.parse::<MovementAction>().map_err(display_failure)?),
        None => None,
    };
    let filter = MovementFilter {
        course_code: blank_to_none(course_code),
        enrolment_no: blank_to_none(enrolment_no),
        name: blank_to_none(name),
        remarks: blank_to_none(remarks),
        phone: blank_to_none(phone),
        action,
    };
    state
        .store
        .list_movements(&filter)
        .await
        .map_err(display_failure)
}

/// Fetch one movement for the edit form.
pub async fn get_movement(state: &AppState, id: &str) -> Result<Option<MovementRecord>, String> {
    let id: MovementId = id.parse().map_err(display_failure)?;
    state.store.get_movement(id).await.map_err(display_failure)
}

/// Update the free-text details of the selected movement.
pub async fn update_movement_details(
    state: &AppState,
    id: &str,
    enrolment_no: &str,
    name: &str,
    remarks: &str,
    phone: &str,
) -> Result<String, String> {
    let id: MovementId = id.parse().map_err(display_failure)?;
    state
        .store
        .update_movement_details(id, &details(enrolment_no, name, remarks, phone))
        .await
        .map_err(display_failure)?;
    Ok("Movement details updated.".to_string())
}

/// Delete the selected movement, reversing its effect on stock.
pub async fn delete_movement(state: &AppState, id: &str) -> Result<String, String> {
    let id: MovementId = id.parse().map_err(display_failure)?;
    state
        .store
        .delete_movement(id)
        .await
        .map_err(display_failure)?;
    Ok("Movement deleted, stock restored.".to_string())
}

fn stock_draft(
    course_code: &str,
    title: &str,
    language: &str,
    quantity: &str,
) -> Result<StockDraft, StoreError> {
    Ok(StockDraft {
        course_code: course_code.trim().to_string(),
        title: blank_to_none(title),
        language: blank_to_none(language),
        quantity: parse_quantity(quantity)?,
    })
}

fn details(enrolment_no: &str, name: &str, remarks: &str, phone: &str) -> MovementDetails {
    MovementDetails {
        enrolment_no: blank_to_none(enrolment_no),
        name: blank_to_none(name),
        remarks: blank_to_none(remarks),
        phone: blank_to_none(phone),
    }
}

fn blank_to_none(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_quantity(value: &str) -> Result<i64, StoreError> {
    value.trim().parse::<i64>().map_err(|_| {
        StoreError::invalid_input(format!("quantity must be a whole number (got '{value}')"))
    })
}

/// Render a store failure for the form's blocking notice.
fn display_failure(err: StoreError) -> String {
    format!("{}: {}", err.kind(), err)
}
