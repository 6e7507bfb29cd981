use serde::{Deserialize, Serialize};

use coursestock_core::{StockId, StoreError, StoreResult};

/// A stock row: one course-material item and its on-hand quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub id: StockId,
    pub course_code: String,
    pub title: Option<String>,
    pub language: Option<String>,
    pub quantity: i64,
}

/// Payload for creating a stock row or overwriting an existing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockDraft {
    pub course_code: String,
    pub title: Option<String>,
    pub language: Option<String>,
    pub quantity: i64,
}

impl StockDraft {
    pub fn new(course_code: impl Into<String>, quantity: i64) -> Self {
        Self {
            course_code: course_code.into(),
            title: None,
            language: None,
            quantity,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Check the draft before it reaches the store.
    pub fn validate(&self) -> StoreResult<()> {
        if self.course_code.trim().is_empty() {
            return Err(StoreError::invalid_input("course_code cannot be empty"));
        }
        if self.quantity < 0 {
            return Err(StoreError::invalid_input(format!(
                "quantity cannot be negative (got {})",
                self.quantity
            )));
        }
        Ok(())
    }
}

/// Substring predicates over stock rows; provided fields are ANDed.
///
/// Blank fields are ignored, so the default value matches every row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockFilter {
    pub course_code: Option<String>,
    pub title: Option<String>,
    pub language: Option<String>,
}

impl StockFilter {
    pub fn by_course_code(term: impl Into<String>) -> Self {
        Self {
            course_code: Some(term.into()),
            ..Self::default()
        }
    }
}
