//! Inventory domain module.
//!
//! This crate contains the record types and business rules for
//! course-material stock, implemented purely as deterministic domain logic
//! (no IO, no storage).

pub mod movement;
pub mod stock;

pub use movement::{
    MovementAction, MovementDetails, MovementDraft, MovementFilter, MovementRecord, apply_delta,
};
pub use stock::{Stock, StockDraft, StockFilter};
