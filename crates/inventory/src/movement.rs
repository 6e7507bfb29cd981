use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use coursestock_core::{MovementId, StockId, StoreError, StoreResult};

/// Direction of a stock movement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementAction {
    In,
    Out,
}

impl MovementAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }

    /// Signed effect on stock quantity of a movement of `quantity` in this
    /// direction.
    pub fn signed_delta(&self, quantity: i64) -> i64 {
        match self {
            Self::In => quantity,
            Self::Out => -quantity,
        }
    }

    /// Signed effect of removing an already-applied movement.
    pub fn reversal_delta(&self, quantity: i64) -> i64 {
        -self.signed_delta(quantity)
    }
}

impl core::fmt::Display for MovementAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementAction {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "in" => Ok(Self::In),
            "out" => Ok(Self::Out),
            other => Err(StoreError::invalid_input(format!(
                "action must be 'in' or 'out' (got '{other}')"
            ))),
        }
    }
}

/// Apply a signed delta to a quantity, refusing to go below zero.
pub fn apply_delta(current: i64, delta: i64) -> StoreResult<i64> {
    let next = current
        .checked_add(delta)
        .ok_or_else(|| StoreError::invalid_input("quantity out of range"))?;
    if next < 0 {
        return Err(StoreError::NegativeStock { current, delta });
    }
    Ok(next)
}

/// Free-text fields that stay mutable after a movement is posted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementDetails {
    pub enrolment_no: Option<String>,
    pub name: Option<String>,
    pub remarks: Option<String>,
    pub phone: Option<String>,
}

/// Payload for posting a movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementDraft {
    pub stock_id: StockId,
    pub action: MovementAction,
    pub quantity: i64,
    pub details: MovementDetails,
}

impl MovementDraft {
    pub fn new(stock_id: StockId, action: MovementAction, quantity: i64) -> Self {
        Self {
            stock_id,
            action,
            quantity,
            details: MovementDetails::default(),
        }
    }

    pub fn with_details(mut self, details: MovementDetails) -> Self {
        self.details = details;
        self
    }

    /// Check the draft before it reaches the store.
    pub fn validate(&self) -> StoreResult<()> {
        if self.quantity <= 0 {
            return Err(StoreError::invalid_input(format!(
                "movement quantity must be a positive integer (got {})",
                self.quantity
            )));
        }
        Ok(())
    }
}

/// A movement row joined with its stock's course code, as the log view
/// renders it. `action`, `quantity`, `stock_id`, and `recorded_at` are
/// immutable after posting; only `details` may change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementRecord {
    pub id: MovementId,
    pub stock_id: StockId,
    pub course_code: String,
    pub action: MovementAction,
    pub quantity: i64,
    pub recorded_at: DateTime<Utc>,
    pub details: MovementDetails,
}

impl MovementRecord {
    /// Timestamp in the form the log view renders.
    pub fn recorded_at_display(&self) -> String {
        self.recorded_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Predicates over the movement log; provided fields are ANDed.
///
/// Text fields match substrings; `action` matches exactly. Blank fields are
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementFilter {
    pub course_code: Option<String>,
    pub enrolment_no: Option<String>,
    pub name: Option<String>,
    pub remarks: Option<String>,
    pub phone: Option<String>,
    pub action: Option<MovementAction>,
}

impl MovementFilter {
    pub fn by_action(action: MovementAction) -> Self {
        Self {
            action: Some(action),
            ..Self::default()
        }
    }
}
