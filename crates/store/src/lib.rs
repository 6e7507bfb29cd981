//! `coursestock-store` — the SQLite-backed inventory store.
//!
//! Owns the `stock` and `stock_movement` tables and guarantees the
//! stock/movement consistency rule under every mutation path: a posted
//! movement and its quantity adjustment commit together or not at all, and
//! deleting a movement reverses its effect under the same rule.

mod movements;
mod stock;
mod store;

#[cfg(test)]
mod integration_tests;

pub use store::InventoryStore;
