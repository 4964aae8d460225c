//! Via coverage filtering and goal-system ordering.

use std::collections::BTreeSet;

use crate::db::{SystemId, TradeDb};
use crate::error::{Error, Result};
use crate::place::{Place, PlaceSet};
use crate::route::Route;

/// Number of distinct via entries visited by `route` from station index
/// `via_start` on.
pub fn via_coverage(db: &TradeDb, route: &Route, via: &PlaceSet, via_start: usize) -> usize {
    let mut matched: BTreeSet<Place> = BTreeSet::new();
    for station in route
        .stations()
        .iter()
        .skip(via_start)
        .filter_map(|id| db.station(*id))
    {
        matched.extend(via.iter().filter(|place| place.matches_station(station)));
    }
    matched.len()
}

/// Keep the routes covering the most via entries.
///
/// Routes visiting every entry are kept alone with no caution. Otherwise the
/// best partial matches are kept and a caution names the coverage. No route
/// touching any entry is a data error.
pub fn filter_by_via(
    db: &TradeDb,
    routes: Vec<Route>,
    via: &PlaceSet,
    via_start: usize,
) -> Result<(Vec<Route>, Option<String>)> {
    if via.is_empty() {
        return Ok((routes, None));
    }

    let scored: Vec<(usize, Route)> = routes
        .into_iter()
        .map(|route| (via_coverage(db, &route, via, via_start), route))
        .collect();
    let best = scored.iter().map(|(matched, _)| *matched).max().unwrap_or(0);
    if best == 0 {
        return Err(Error::NoViaMatch);
    }

    let kept = scored
        .into_iter()
        .filter(|(matched, _)| *matched == best)
        .map(|(_, route)| route)
        .collect();
    let caution = (best < via.len()).then(|| {
        format!(
            "SORRY: No runs visited all of your via destinations. \
             Listing runs that matched at least {best}."
        )
    });
    Ok((kept, caution))
}

/// Whether the route currently ends in `goal`.
pub fn reaches_goal(db: &TradeDb, route: &Route, goal: SystemId) -> bool {
    db.station(route.last_station())
        .is_some_and(|station| station.system_id == goal)
}

/// Move routes ending in `goal` to the front, keeping relative order.
pub fn goal_first(db: &TradeDb, routes: &mut [Route], goal: SystemId) {
    routes.sort_by_key(|route| !reaches_goal(db, route, goal));
}
