//! Multi-hop trade route search.
//!
//! This module provides:
//! - [`plan_run`] - Main entry point: validate a [`RunRequest`] and search
//! - [`search`] - The hop loop over an already-built [`SearchConfig`]
//! - [`RunResult`] - Ranked routes plus any caution message
//!
//! # Hop loop
//!
//! Seed routes are expanded one hop at a time. Before each expansion the
//! generation is rank-sorted and pruned by the [`BeamPolicy`]; after it the
//! goal system, if any, may end the search early. Once the loop ends the via
//! filter and the final ranking are applied.
//!
//! # Example
//!
//! ```ignore
//! use tradehop_lib::{load_trade_db, plan_run, RunRequest};
//!
//! let db = load_trade_db("path/to/trade.db".as_ref())?;
//! let request = RunRequest {
//!     from: Some("Sol/Abraham Lincoln".into()),
//!     hops: 3,
//!     ..RunRequest::new(100, 50_000, 12.5)
//! };
//! let result = plan_run(&db, &request)?;
//! println!("{}", result.best().map(|r| r.descriptor(&db)).unwrap_or_default());
//! ```

pub mod calc;
pub mod fit;
pub mod prune;
pub mod seed;
pub mod via;

pub use calc::TradeCalc;
pub use prune::{BeamPolicy, ScoreCut};
pub use seed::{expand_for_jumps, seed_routes};
pub use via::{filter_by_via, goal_first, reaches_goal, via_coverage};

use tracing::{debug, info};

use crate::config::{RunRequest, SearchConfig};
use crate::db::TradeDb;
use crate::error::{Error, Result};
use crate::place::{Place, PlaceSet};
use crate::route::{rank_routes, Route};

/// Progress reported at the start of every hop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HopProgress {
    /// 1-based hop number about to be computed.
    pub hop: usize,
    /// Routes being extended after pruning.
    pub origins: usize,
    pub pruned: usize,
}

/// Outcome of a search.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// All surviving routes, best first.
    pub routes: Vec<Route>,
    /// Advisory text; empty when the search fully satisfied the request.
    pub caution: String,
    pub goal_reached: bool,
    pub hops_completed: usize,
    /// Number of routes to show.
    pub display_limit: usize,
}

impl RunResult {
    pub fn best(&self) -> Option<&Route> {
        self.routes.first()
    }

    /// The top routes up to the configured display count.
    pub fn displayed(&self) -> &[Route] {
        &self.routes[..self.routes.len().min(self.display_limit)]
    }
}

/// Validate `request` against `db` and run the search.
pub fn plan_run(db: &TradeDb, request: &RunRequest) -> Result<RunResult> {
    plan_run_with_progress(db, request, |_| {})
}

/// [`plan_run`] with a callback invoked before each hop.
pub fn plan_run_with_progress(
    db: &TradeDb,
    request: &RunRequest,
    progress: impl FnMut(HopProgress),
) -> Result<RunResult> {
    if db.trading_count() == 0 {
        return Err(Error::NoProfitableTrades {
            message: "database does not contain any profitable trades".into(),
        });
    }
    let config = SearchConfig::build(db, request)?;
    search(db, &config, progress)
}

/// Run the hop loop for a validated configuration.
pub fn search(
    db: &TradeDb,
    config: &SearchConfig,
    mut progress: impl FnMut(HopProgress),
) -> Result<RunResult> {
    let mut routes = seed_routes(db, config)?;
    let calc = TradeCalc::new(db, config);
    let via_start = usize::from(config.origin.is_some());
    let via_restricts = !config.via.is_empty() && config.via.len() > config.adhoc_hops;

    let mut cautions: Vec<String> = Vec::new();
    let mut goal_reached = false;
    let mut hops_completed = 0;

    for hop_no in 0..config.hops {
        let last_hop = hop_no + 1 == config.hops;
        let restrict_to = match &config.destinations {
            Some(destinations) if last_hop => Some(destinations),
            _ if via_restricts => Some(&config.via),
            _ => None,
        };

        let pruned = config.beam.apply(&mut routes, hop_no);
        progress(HopProgress {
            hop: hop_no + 1,
            origins: routes.len(),
            pruned,
        });

        let next = calc.best_hops(&routes, restrict_to);
        if next.is_empty() {
            if hop_no == 0 {
                return Err(no_profitable_trades());
            }
            cautions.push(dead_end_caution(db, restrict_to, hop_no + 1));
            break;
        }

        routes = next;
        hops_completed = hop_no + 1;
        rank_routes(&mut routes);
        debug!(hop = hops_completed, routes = routes.len(), "hop complete");

        if let Some(goal) = config.goal_system {
            goal_first(db, &mut routes, goal);
            if routes.first().is_some_and(|route| reaches_goal(db, route, goal)) {
                info!(system = db.system_name(goal), "goal system reached");
                goal_reached = true;
                break;
            }
        }
    }

    if routes.is_empty() {
        return Err(no_profitable_trades());
    }

    let (mut routes, via_caution) = filter_by_via(db, routes, &config.via, via_start)?;
    cautions.extend(via_caution);

    rank_routes(&mut routes);

    Ok(RunResult {
        routes,
        caution: cautions.join("\n"),
        goal_reached,
        hops_completed,
        display_limit: config.routes,
    })
}

fn no_profitable_trades() -> Error {
    Error::NoProfitableTrades {
        message: "no profitable trades matched your criteria, \
                  or price data along the route is missing"
            .into(),
    }
}

fn dead_end_caution(db: &TradeDb, restrict_to: Option<&PlaceSet>, hop: usize) -> String {
    match restrict_to {
        Some(places) => format!(
            "SORRY: Could not find any routes that delivered a profit to {} at hop #{hop}\n\
             You may need to add more hops to your route.",
            describe_places(db, places)
        ),
        None => format!("SORRY: Could not find routes beyond hop #{}", hop - 1),
    }
}

/// `X`, the shared system name, or `A, B or C`.
fn describe_places(db: &TradeDb, places: &PlaceSet) -> String {
    let all: Vec<Place> = places.iter().collect();
    if let [only] = all.as_slice() {
        return only.name(db);
    }
    let systems = places.systems(db);
    if systems.len() == 1 {
        if let Some(system) = systems.first() {
            return db.system_name(*system).to_string();
        }
    }
    let names: Vec<String> = all.iter().map(|place| place.name(db)).collect();
    match names.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{} or {last}", rest.join(", ")),
        _ => names.join(""),
    }
}
