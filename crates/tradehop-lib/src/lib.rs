//! Tradehop library entry points.
//!
//! This crate locates and loads a trade database into memory, resolves and
//! validates run options, and searches for profitable multi-hop trade routes.
//! Higher-level consumers (the CLI) should only depend on the functions
//! exported here instead of reimplementing behavior.
//!

#![deny(warnings)]

pub mod config;
pub mod dataset;
pub mod db;
pub mod eligibility;
pub mod error;
pub mod output;
pub mod place;
pub mod route;
pub mod routing;
pub mod spatial;

pub use config::{RunRequest, SearchConfig};
pub use dataset::{default_dataset_path, resolve_dataset_path};
pub use db::{
    load_trade_db, PadSize, PadSizes, Station, StationId, System, SystemId, TradeDb,
    TradeDbBuilder,
};
pub use eligibility::{Anchor, Ineligibility, StationFilter};
pub use error::{Error, ErrorKind, Result};
pub use output::{CreditStyle, DetailOptions, RunSummary};
pub use place::{Place, PlaceSet};
pub use route::{rank_order, rank_routes, Hop, Route, TradeOption};
pub use routing::{plan_run, plan_run_with_progress, search, HopProgress, RunResult};
