//! Cargo load fitting: choose how many units of each profitable commodity to
//! buy so the hop gain is maximal within hold space and credits.

use std::cmp::Ordering;

use crate::db::TradeCandidate;
use crate::route::TradeOption;

/// Upper bound on search nodes per fit. Keeps pathological inputs tractable;
/// the best load found so far is returned when it is hit.
const NODE_BUDGET: usize = 250_000;

/// Limits for one load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadLimits {
    pub capacity: u32,
    /// Most units of any single commodity.
    pub unit_limit: u32,
    pub credits: i64,
}

/// A candidate commodity after margin discounting.
#[derive(Debug, Clone, Copy)]
struct FitItem {
    candidate: TradeCandidate,
    unit_gain: i64,
    max_units: u32,
}

/// Best load found: per-item quantities plus totals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Load {
    pub trades: Vec<TradeOption>,
    pub gain_cr: i64,
    pub cost_cr: i64,
    pub units: u32,
}

impl Load {
    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }
}

/// Discount each candidate's gain by `margin` and keep those still paying at
/// least `min_gain_per_ton`.
pub fn discount(
    candidates: Vec<TradeCandidate>,
    margin: f64,
    min_gain_per_ton: i64,
) -> Vec<(TradeCandidate, i64)> {
    candidates
        .into_iter()
        .filter_map(|candidate| {
            let unit_gain = (candidate.gain_cr as f64 * (1.0 - margin)).floor() as i64;
            (unit_gain > 0 && unit_gain >= min_gain_per_ton).then_some((candidate, unit_gain))
        })
        .collect()
}

/// Most profitable load of `items` (candidates paired with their discounted
/// per-unit gain). Ties prefer the cheaper load, then the one with fewer
/// units. Returns `None` when nothing profitable fits.
pub fn fit_load(items: &[(TradeCandidate, i64)], limits: LoadLimits) -> Option<Load> {
    if limits.capacity == 0 || limits.credits <= 0 {
        return None;
    }

    let mut fit_items: Vec<FitItem> = items
        .iter()
        .filter(|(candidate, gain)| *gain > 0 && candidate.cost_cr > 0)
        .filter_map(|(candidate, gain)| {
            let mut max_units = limits.unit_limit.min(limits.capacity);
            if let Some(supply) = candidate.supply_units {
                max_units = max_units.min(supply);
            }
            let affordable = limits.credits / candidate.cost_cr;
            max_units = max_units.min(u32::try_from(affordable).unwrap_or(u32::MAX));
            (max_units > 0).then_some(FitItem {
                candidate: *candidate,
                unit_gain: *gain,
                max_units,
            })
        })
        .collect();
    if fit_items.is_empty() {
        return None;
    }

    fit_items.sort_by(|a, b| {
        b.unit_gain
            .cmp(&a.unit_gain)
            .then_with(|| a.candidate.cost_cr.cmp(&b.candidate.cost_cr))
            .then_with(|| a.candidate.item_id.cmp(&b.candidate.item_id))
    });

    let mut search = BranchAndBound {
        items: &fit_items,
        quantities: vec![0; fit_items.len()],
        best: Totals::default(),
        best_quantities: vec![0; fit_items.len()],
        nodes: 0,
    };
    search.descend(0, limits.capacity, limits.credits, Totals::default());

    if search.best.gain <= 0 {
        return None;
    }

    let trades: Vec<TradeOption> = fit_items
        .iter()
        .zip(&search.best_quantities)
        .filter(|(_, quantity)| **quantity > 0)
        .map(|(item, quantity)| TradeOption {
            item_id: item.candidate.item_id,
            quantity: *quantity,
            cost_cr: item.candidate.cost_cr,
            gain_cr: item.unit_gain,
            src_age_days: item.candidate.src_age_days,
            dst_age_days: item.candidate.dst_age_days,
        })
        .collect();

    Some(Load {
        trades,
        gain_cr: search.best.gain,
        cost_cr: search.best.cost,
        units: search.best.units,
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Totals {
    gain: i64,
    cost: i64,
    units: u32,
}

impl Totals {
    /// Higher gain, then lower cost, then fewer units.
    fn preference(&self, other: &Totals) -> Ordering {
        self.gain
            .cmp(&other.gain)
            .then_with(|| other.cost.cmp(&self.cost))
            .then_with(|| other.units.cmp(&self.units))
    }
}

struct BranchAndBound<'a> {
    items: &'a [FitItem],
    quantities: Vec<u32>,
    best: Totals,
    best_quantities: Vec<u32>,
    nodes: usize,
}

impl BranchAndBound<'_> {
    fn descend(&mut self, index: usize, space: u32, credits: i64, totals: Totals) {
        self.nodes += 1;
        if totals.preference(&self.best) == Ordering::Greater {
            self.best = totals;
            self.best_quantities.copy_from_slice(&self.quantities);
        }
        if index == self.items.len() || space == 0 || self.nodes > NODE_BUDGET {
            return;
        }

        // Items are sorted by unit gain, so filling the remaining space at this
        // item's gain bounds anything reachable from here.
        let item = self.items[index];
        if totals.gain + i64::from(space) * item.unit_gain < self.best.gain {
            return;
        }

        let affordable = u32::try_from(credits / item.candidate.cost_cr).unwrap_or(u32::MAX);
        let most = item.max_units.min(space).min(affordable);
        let next_gain = self.items.get(index + 1).map_or(0, |next| next.unit_gain);

        for quantity in (0..=most).rev() {
            let bound = totals.gain
                + i64::from(quantity) * item.unit_gain
                + i64::from(space - quantity) * next_gain;
            if bound < self.best.gain {
                break;
            }
            self.quantities[index] = quantity;
            let next = Totals {
                gain: totals.gain + i64::from(quantity) * item.unit_gain,
                cost: totals.cost + i64::from(quantity) * item.candidate.cost_cr,
                units: totals.units + quantity,
            };
            self.descend(
                index + 1,
                space - quantity,
                credits - i64::from(quantity) * item.candidate.cost_cr,
                next,
            );
        }
        self.quantities[index] = 0;
    }
}
