//! Strongly-typed identifiers for store records.
//!
//! Both identifiers wrap the surrogate integer id the store assigns on
//! insert; they exist so a movement id can never be passed where a stock id
//! is expected.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Identifier of a stock row (store-assigned, stable for life).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockId(i64);

/// Identifier of a stock movement row.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovementId(i64);

macro_rules! impl_row_id_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $t {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = StoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let id = s.trim().parse::<i64>().map_err(|e| {
                    StoreError::invalid_input(format!("{}: {}", $name, e))
                })?;
                Ok(Self(id))
            }
        }
    };
}

impl_row_id_newtype!(StockId, "StockId");
impl_row_id_newtype!(MovementId, "MovementId");
