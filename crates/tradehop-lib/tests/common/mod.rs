//! Common test utilities and fixture helpers.
//!
//! Provides the checked-in SQLite fixture, an in-code grid galaxy with
//! deterministic prices, and assertions shared by the search tests.

#![allow(dead_code)]

use std::path::PathBuf;

use tradehop_lib::{load_trade_db, PadSize, Route, TradeDb, TradeDbBuilder};

/// Path to the minimal test fixture database.
pub fn fixture_db_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures/minimal_trade.db")
}

/// Load the minimal fixture database.
pub fn load_fixture() -> TradeDb {
    load_trade_db(&fixture_db_path()).expect("fixture database loads")
}

/// A `size` x `size` grid of systems 4ly apart, one station each, trading
/// five commodities at deterministic prices.
pub fn grid_db(size: usize) -> TradeDb {
    let mut builder = TradeDbBuilder::new();
    let items: Vec<_> = ["Alloys", "Biowaste", "Coffee", "Drones", "Explosives"]
        .iter()
        .map(|name| builder.item(name))
        .collect();

    for row in 0..size {
        for col in 0..size {
            let index = row * size + col;
            let system = builder.system(
                &format!("Grid {row}-{col}"),
                [col as f64 * 4.0, row as f64 * 4.0, 0.0],
            );
            let pad = if index % 5 == 0 {
                PadSize::Medium
            } else {
                PadSize::Large
            };
            let station = builder.station(
                system,
                &format!("Port {row}-{col}"),
                100.0 + (index as f64 * 137.0) % 3_000.0,
                pad,
            );
            for (k, item) in items.iter().enumerate() {
                let base = 100 + 40 * k as i64;
                let supply = base + ((index * 7 + k * 11) % 13) as i64 * 5;
                let demand = base + ((index * 5 + k * 3) % 17) as i64 * 6;
                let units = Some(3 + ((index + k) % 6) as u32);
                builder
                    .sells(station, *item, supply, units)
                    .buys(station, *item, demand);
            }
        }
    }
    builder.build()
}

/// Checks the structural and budget invariants every returned route holds.
pub fn assert_route_invariants(route: &Route, capacity: u32, unit_limit: u32, min_gain: i64) {
    assert_eq!(route.stations().len(), route.hops().len() + 1);
    assert_eq!(route.stations().len(), route.jumps().len() + 1);

    let mut available = route.start_cr();
    for hop in route.hops() {
        assert!(
            hop.cost_cr() <= available,
            "hop spends {} with only {} available",
            hop.cost_cr(),
            available
        );
        assert!(hop.units() <= capacity);
        for trade in &hop.trades {
            assert!(trade.quantity <= unit_limit);
            assert!(trade.gain_cr >= min_gain);
        }
        available += hop.gain_cr;
    }
    assert_eq!(available, route.available_cr());
}
