//! Trade routes: the stations visited, the load carried on each hop and the
//! score used to rank them.

use std::cmp::Ordering;

use serde::Serialize;

use crate::db::{ItemId, StationId, SystemId};

/// One commodity bought at a hop's source and sold at its destination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeOption {
    pub item_id: ItemId,
    pub quantity: u32,
    /// Purchase price per unit at the source.
    pub cost_cr: i64,
    /// Per-unit gain after the margin discount.
    pub gain_cr: i64,
    pub src_age_days: f64,
    pub dst_age_days: f64,
}

impl TradeOption {
    pub fn total_cost(&self) -> i64 {
        self.cost_cr * i64::from(self.quantity)
    }

    pub fn total_gain(&self) -> i64 {
        self.gain_cr * i64::from(self.quantity)
    }
}

/// The load traded between two consecutive stations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hop {
    pub trades: Vec<TradeOption>,
    pub gain_cr: i64,
}

impl Hop {
    pub fn new(trades: Vec<TradeOption>) -> Self {
        let gain_cr = trades.iter().map(TradeOption::total_gain).sum();
        Self { trades, gain_cr }
    }

    pub fn units(&self) -> u32 {
        self.trades.iter().map(|t| t.quantity).sum()
    }

    pub fn cost_cr(&self) -> i64 {
        self.trades.iter().map(TradeOption::total_cost).sum()
    }
}

/// A candidate or completed trade route.
///
/// `stations` always holds one more entry than `hops` and `jumps`. Routes are
/// never mutated; [`Route::extend`] returns a new value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    stations: Vec<StationId>,
    hops: Vec<Hop>,
    /// Systems traversed on each hop, source and destination systems included.
    jumps: Vec<Vec<SystemId>>,
    start_cr: i64,
    gain_cr: i64,
    score: f64,
}

impl Route {
    /// A zero-hop route sitting at `station` with `start_cr` credits to trade.
    pub fn seed(station: StationId, start_cr: i64) -> Self {
        Self {
            stations: vec![station],
            hops: Vec::new(),
            jumps: Vec::new(),
            start_cr,
            gain_cr: 0,
            score: 0.0,
        }
    }

    /// A new route continuing this one to `destination`.
    pub fn extend(
        &self,
        destination: StationId,
        hop: Hop,
        jumps: Vec<SystemId>,
        hop_score: f64,
    ) -> Self {
        let mut stations = Vec::with_capacity(self.stations.len() + 1);
        stations.extend_from_slice(&self.stations);
        stations.push(destination);

        let mut hops = Vec::with_capacity(self.hops.len() + 1);
        hops.extend_from_slice(&self.hops);
        let gain_cr = self.gain_cr + hop.gain_cr;
        hops.push(hop);

        let mut all_jumps = Vec::with_capacity(self.jumps.len() + 1);
        all_jumps.extend_from_slice(&self.jumps);
        all_jumps.push(jumps);

        Self {
            stations,
            hops,
            jumps: all_jumps,
            start_cr: self.start_cr,
            gain_cr,
            score: self.score + hop_score,
        }
    }

    pub fn stations(&self) -> &[StationId] {
        &self.stations
    }

    pub fn hops(&self) -> &[Hop] {
        &self.hops
    }

    pub fn jumps(&self) -> &[Vec<SystemId>] {
        &self.jumps
    }

    pub fn origin(&self) -> StationId {
        self.stations[0]
    }

    /// The station the route currently ends at.
    pub fn last_station(&self) -> StationId {
        self.stations[self.stations.len() - 1]
    }

    pub fn hop_count(&self) -> usize {
        self.hops.len()
    }

    /// Credits available for trading when the route started (after insurance).
    pub fn start_cr(&self) -> i64 {
        self.start_cr
    }

    pub fn gain_cr(&self) -> i64 {
        self.gain_cr
    }

    /// Credits available for the next purchase.
    pub fn available_cr(&self) -> i64 {
        self.start_cr + self.gain_cr
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    /// System-to-system jumps across all hops.
    pub fn total_jumps(&self) -> usize {
        self.jumps
            .iter()
            .map(|systems| systems.len().saturating_sub(1))
            .sum()
    }
}

/// Best-first ordering used everywhere routes are ranked.
///
/// Higher score first; ties go to fewer jumps, then higher gain, then the
/// lexicographically smaller station sequence so the order is total.
pub fn rank_order(a: &Route, b: &Route) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.total_jumps().cmp(&b.total_jumps()))
        .then_with(|| b.gain_cr.cmp(&a.gain_cr))
        .then_with(|| a.stations.cmp(&b.stations))
}

/// Sort routes best-first using [`rank_order`].
pub fn rank_routes(routes: &mut [Route]) {
    routes.sort_by(rank_order);
}
