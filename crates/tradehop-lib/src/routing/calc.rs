//! Hop expansion: extend every route by one profitable buy/sell leg.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::config::SearchConfig;
use crate::db::{Station, StationId, SystemId, TradeDb};
use crate::place::PlaceSet;
use crate::route::{Hop, Route};

use super::fit::{discount, fit_load, Load, LoadLimits};

/// A station reachable from a hop's source, with the systems flown through.
#[derive(Debug, Clone, PartialEq)]
pub struct Destination {
    pub station: StationId,
    /// Fewest-jump system path, source and destination systems included.
    pub jumps: Vec<SystemId>,
}

/// Computes the next generation of routes for one search.
#[derive(Debug)]
pub struct TradeCalc<'a> {
    db: &'a TradeDb,
    config: &'a SearchConfig,
}

struct Best {
    source: usize,
    destination: StationId,
    jumps: Vec<SystemId>,
    load: Load,
    hop_score: f64,
    score: f64,
}

impl<'a> TradeCalc<'a> {
    pub fn new(db: &'a TradeDb, config: &'a SearchConfig) -> Self {
        Self { db, config }
    }

    /// Extend each route by its most profitable next hop.
    ///
    /// Only the best candidate per destination station survives; on equal
    /// scores the earlier source route wins, so callers should pass routes
    /// rank-sorted. With `restrict_to` set, only matching destinations are
    /// considered. An empty result is not an error.
    pub fn best_hops(&self, routes: &[Route], restrict_to: Option<&PlaceSet>) -> Vec<Route> {
        let mut destinations: HashMap<StationId, Vec<Destination>> = HashMap::new();
        let mut best: BTreeMap<StationId, Best> = BTreeMap::new();

        for (source, route) in routes.iter().enumerate() {
            let source_id = route.last_station();
            let Some(station) = self.db.station(source_id) else {
                continue;
            };
            let reachable = destinations
                .entry(source_id)
                .or_insert_with(|| self.destinations(station, restrict_to));

            let limits = LoadLimits {
                capacity: self.config.capacity,
                unit_limit: self.config.unit_limit,
                credits: route.available_cr(),
            };

            for destination in reachable.iter() {
                if self.config.unique && route.stations().contains(&destination.station) {
                    continue;
                }
                let Some(load) = self.load_between(source_id, destination.station, limits) else {
                    continue;
                };
                let ls = self
                    .db
                    .station(destination.station)
                    .map_or(0.0, |s| s.ls_from_star);
                let hop_score = load.gain_cr as f64 * self.ls_multiplier(ls);
                let score = route.score() + hop_score;

                if best
                    .get(&destination.station)
                    .is_some_and(|current| current.score >= score)
                {
                    continue;
                }
                best.insert(
                    destination.station,
                    Best {
                        source,
                        destination: destination.station,
                        jumps: destination.jumps.clone(),
                        load,
                        hop_score,
                        score,
                    },
                );
            }
        }

        debug!(
            sources = routes.len(),
            candidates = best.len(),
            "expanded routes by one hop"
        );

        best.into_values()
            .map(|candidate| {
                routes[candidate.source].extend(
                    candidate.destination,
                    Hop::new(candidate.load.trades),
                    candidate.jumps,
                    candidate.hop_score,
                )
            })
            .collect()
    }

    /// Stations reachable from `source` in one hop, in system path order.
    ///
    /// Systems are explored breadth-first within laden range, at most
    /// `jumps_per` jumps out, never entering avoided systems. With a goal
    /// system only destinations in it or strictly closer to it qualify.
    pub fn destinations(&self, source: &Station, restrict_to: Option<&PlaceSet>) -> Vec<Destination> {
        let config = self.config;
        let origin = source.system_id;

        let mut paths: BTreeMap<SystemId, Vec<SystemId>> = BTreeMap::new();
        paths.insert(origin, vec![origin]);
        let mut order = vec![origin];
        let mut frontier = vec![origin];

        for _ in 0..config.jumps_per {
            let mut next = Vec::new();
            for system in &frontier {
                let path = paths.get(system).cloned().unwrap_or_default();
                for (neighbour, _) in self.db.systems_in_range(*system, config.ly_per) {
                    if paths.contains_key(&neighbour) || config.avoid.contains_system(neighbour) {
                        continue;
                    }
                    let mut extended = path.clone();
                    extended.push(neighbour);
                    paths.insert(neighbour, extended);
                    order.push(neighbour);
                    next.push(neighbour);
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        let goal_distance = config
            .goal_system
            .and_then(|goal| self.db.distance(origin, goal).map(|d| (goal, d)));

        let mut found = Vec::new();
        for system in order {
            if let Some((goal, from_source)) = goal_distance {
                let closer = self
                    .db
                    .distance(system, goal)
                    .is_some_and(|d| d < from_source);
                if system != goal && !closer {
                    continue;
                }
            }
            let Some(path) = paths.get(&system) else {
                continue;
            };
            for station in self.db.stations_in(system) {
                if station.id == source.id
                    || !config.filter.is_eligible(station)
                    || config.avoid.matches_station(station)
                    || restrict_to.is_some_and(|allowed| !allowed.matches_station(station))
                {
                    continue;
                }
                found.push(Destination {
                    station: station.id,
                    jumps: path.clone(),
                });
            }
        }
        found
    }

    fn load_between(&self, src: StationId, dst: StationId, limits: LoadLimits) -> Option<Load> {
        let candidates: Vec<_> = self
            .db
            .trades_between(src, dst)
            .into_iter()
            .filter(|candidate| !self.config.avoid_items.contains(&candidate.item_id))
            .collect();
        if candidates.is_empty() {
            return None;
        }
        let items = discount(
            candidates,
            self.config.margin,
            self.config.min_gain_per_ton,
        );
        fit_load(&items, limits)
    }

    /// Score multiplier for a destination `ls` light-seconds from its star.
    ///
    /// `ls_penalty` is a percentage. No penalty below 1000ls; grows
    /// quadratically beyond, floored at zero.
    pub fn ls_multiplier(&self, ls: f64) -> f64 {
        if self.config.ls_penalty <= 0.0 || ls <= 0.0 {
            return 1.0;
        }
        let kls = (ls / 100.0).floor() / 10.0;
        let penalty = (kls * kls - kls) / 3.0 * (self.config.ls_penalty / 100.0);
        (1.0 - penalty).clamp(0.0, 1.0)
    }
}
