//! Desktop session entry point.
//!
//! Prepares everything the form session needs: logging, the database file,
//! the schema, and the shared [`AppState`] handle. The visual form layer
//! attaches to that handle; this host owns no business logic.

use std::path::PathBuf;

use anyhow::Context;

use coursestock_desktop::{AppState, commands};
use coursestock_store::InventoryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    coursestock_observability::init();

    let db_path = match std::env::var("COURSESTOCK_DB") {
        Ok(path) => PathBuf::from(path),
        Err(_) => default_db_path()?,
    };

    tracing::info!(path = %db_path.display(), "opening inventory store");
    let store = InventoryStore::open(&db_path).await?;
    let state = AppState::new(store);

    // The form session takes over from here with the prepared state; read
    // both views once through the command layer so startup problems surface
    // now rather than on the first click.
    let stock_rows = commands::list_stock(&state, "", "", "")
        .await
        .map_err(anyhow::Error::msg)?;
    let movement_rows = commands::list_movements(&state, "", "", "", "", "", "")
        .await
        .map_err(anyhow::Error::msg)?;

    tracing::info!(
        stock_rows = stock_rows.len(),
        movement_rows = movement_rows.len(),
        "inventory store ready; session can attach"
    );
    Ok(())
}

/// Resolve the database location: `{data_dir}/coursestock/inventory.db`,
/// creating the directory if needed.
fn default_db_path() -> anyhow::Result<PathBuf> {
    let base = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .context("failed to resolve OS app data directory - tried data_dir() and home_dir()/.local/share")?;

    let mut dir = base;
    dir.push("coursestock");
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create data directory at {:?}", dir))?;
    dir.push("inventory.db");

    Ok(dir)
}
