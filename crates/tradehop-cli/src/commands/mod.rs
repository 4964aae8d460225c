// Subcommand handlers. main.rs parses and dispatches; each module owns one
// subcommand.

pub mod run;
pub mod stations;

use std::path::Path;

use anyhow::{Context, Result};
use tradehop_lib::{load_trade_db, resolve_dataset_path, TradeDb};

/// Resolve the dataset location and load it.
pub fn open_trade_db(target: Option<&Path>) -> Result<TradeDb> {
    let path = resolve_dataset_path(target).context("failed to locate the trade database")?;
    load_trade_db(&path)
        .with_context(|| format!("failed to load trade database from {}", path.display()))
}
