//! Starting points: jump-radius expansion of explicit places and the
//! zero-hop seed routes.

use std::collections::BTreeSet;

use tracing::debug;

use crate::config::SearchConfig;
use crate::db::{StationId, SystemId, TradeDb};
use crate::eligibility::StationFilter;
use crate::error::{Error, Result};
use crate::place::{Place, PlaceSet};
use crate::route::Route;

/// Stations reachable from `places` within `jumps` jumps of `ly_per` each.
///
/// With zero jumps a station place yields itself and a system place yields
/// its eligible stations. Otherwise the systems of `places` are grown ring by
/// ring; avoided systems are never entered, so nothing behind them is reached
/// through them. The result holds every eligible, non-avoided station in the
/// collected systems, in ascending id order.
pub fn expand_for_jumps(
    db: &TradeDb,
    places: &[Place],
    jumps: usize,
    ly_per: f64,
    avoid: &PlaceSet,
    filter: &StationFilter,
) -> Vec<StationId> {
    if jumps == 0 {
        let mut stations = BTreeSet::new();
        for place in places {
            match *place {
                Place::Station(id) => {
                    if db
                        .station(id)
                        .is_some_and(|station| !avoid.matches_station(station))
                    {
                        stations.insert(id);
                    }
                }
                Place::System(id) => stations.extend(
                    db.stations_in(id)
                        .filter(|s| filter.is_eligible(s) && !avoid.matches_station(s))
                        .map(|s| s.id),
                ),
            }
        }
        return stations.into_iter().collect();
    }

    let mut visited: BTreeSet<SystemId> = places
        .iter()
        .filter_map(|place| place.system_id(db))
        .filter(|system| !avoid.contains_system(*system))
        .collect();
    let mut frontier: Vec<SystemId> = visited.iter().copied().collect();

    for ring in 1..=jumps {
        let mut next = Vec::new();
        for system in &frontier {
            for (neighbour, _) in db.systems_in_range(*system, ly_per) {
                if avoid.contains_system(neighbour) || !visited.insert(neighbour) {
                    continue;
                }
                next.push(neighbour);
            }
        }
        debug!(ring, added = next.len(), total = visited.len(), "expanded jump ring");
        if next.is_empty() {
            break;
        }
        frontier = next;
    }

    visited
        .into_iter()
        .flat_map(|system| db.stations_in(system))
        .filter(|station| filter.is_eligible(station) && !avoid.matches_station(station))
        .map(|station| station.id)
        .collect()
}

/// One zero-hop route per usable origin.
///
/// Origins that are avoided (directly or through their system) or whose pads
/// cannot take the ship are dropped.
pub fn seed_routes(db: &TradeDb, config: &SearchConfig) -> Result<Vec<Route>> {
    let start_cr = config.start_cr();
    let routes: Vec<Route> = config
        .origins
        .iter()
        .filter_map(|id| db.station(*id))
        .filter(|station| !config.avoid.matches_station(station))
        .filter(|station| {
            config
                .filter
                .pad_sizes
                .map_or(true, |pads| pads.accepts(station.max_pad_size))
        })
        .map(|station| Route::seed(station.id, start_cr))
        .collect();

    if routes.is_empty() {
        let message = if db.stations().all(|station| station.item_count == 0) {
            "no price data found for any station in the local database"
        } else {
            "no stations could be found that met your selection criteria"
        };
        return Err(Error::NoData {
            message: message.to_string(),
        });
    }

    debug!(origins = routes.len(), "seeded routes");
    Ok(routes)
}
