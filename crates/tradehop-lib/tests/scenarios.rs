mod common;

use common::load_fixture;
use tradehop_lib::{
    plan_run, plan_run_with_progress, Error, ErrorKind, PadSize, RunRequest, TradeDb,
    TradeDbBuilder,
};

fn single_lane_db() -> TradeDb {
    let mut builder = TradeDbBuilder::new();
    let home = builder.system("Home", [0.0, 0.0, 0.0]);
    let away = builder.system("Away", [3.0, 0.0, 0.0]);
    let origin = builder.station(home, "Origin Dock", 10.0, PadSize::Large);
    let market = builder.station(away, "Market Hub", 10.0, PadSize::Large);
    let widgets = builder.item("Widgets");
    builder
        .sells(origin, widgets, 100, Some(5))
        .buys(market, widgets, 150);
    builder.build()
}

#[test]
fn supply_limits_single_hop_load() {
    let db = single_lane_db();
    let result = plan_run(
        &db,
        &RunRequest {
            from: Some("Origin Dock".into()),
            hops: 1,
            ..RunRequest::new(10, 1_000, 5.0)
        },
    )
    .expect("route");

    assert_eq!(result.routes.len(), 1);
    let route = &result.routes[0];
    assert_eq!(route.hops()[0].units(), 5);
    assert_eq!(route.gain_cr(), 250);
    assert_eq!(route.available_cr(), 1_250);
    assert_eq!(
        route.descriptor(&db),
        "Home/Origin Dock -> Away/Market Hub +250cr"
    );
}

fn goal_db() -> TradeDb {
    let mut builder = TradeDbBuilder::new();
    let start = builder.system("Start", [0.0, 0.0, 0.0]);
    let middle = builder.system("Middle", [3.0, 1.0, 0.0]);
    let goal = builder.system("Goal", [4.0, 0.0, 0.0]);
    let depot = builder.station(start, "Depot", 10.0, PadSize::Large);
    let waypoint = builder.station(middle, "Waypoint", 10.0, PadSize::Large);
    let port = builder.station(goal, "Goal Port", 10.0, PadSize::Large);
    let ore = builder.item("Ore");
    builder
        .sells(depot, ore, 10, None)
        .buys(waypoint, ore, 25)
        .buys(port, ore, 30);
    builder.build()
}

#[test]
fn reaching_goal_ends_search_early() {
    let db = goal_db();
    let mut hops_started = 0;
    let result = plan_run_with_progress(
        &db,
        &RunRequest {
            from: Some("Depot".into()),
            towards: Some("Goal".into()),
            hops: 2,
            ..RunRequest::new(10, 1_000, 5.0)
        },
        |_| hops_started += 1,
    )
    .expect("route");

    assert!(result.goal_reached);
    assert_eq!(result.hops_completed, 1);
    assert_eq!(hops_started, 1);
    let best = result.best().expect("best");
    assert_eq!(best.hop_count(), 1);
    assert_eq!(db.station_name(best.last_station()), "Goal/Goal Port");
}

fn goal_detour_db() -> TradeDb {
    let mut builder = TradeDbBuilder::new();
    let start = builder.system("Start", [0.0, 0.0, 0.0]);
    let rich = builder.system("Rich", [2.0, 2.0, 0.0]);
    let goal = builder.system("Goal", [4.0, 0.0, 0.0]);
    let depot = builder.station(start, "Depot", 10.0, PadSize::Large);
    let rich_port = builder.station(rich, "Rich Port", 10.0, PadSize::Large);
    let goal_port = builder.station(goal, "Goal Port", 10.0, PadSize::Large);
    let ore = builder.item("Ore");
    builder
        .sells(depot, ore, 10, None)
        .buys(rich_port, ore, 100)
        .buys(goal_port, ore, 30);
    builder.build()
}

#[test]
fn goal_stop_keeps_score_order() {
    let db = goal_detour_db();
    let result = plan_run(
        &db,
        &RunRequest {
            from: Some("Depot".into()),
            towards: Some("Goal".into()),
            hops: 2,
            routes: 5,
            ..RunRequest::new(10, 1_000, 5.0)
        },
    )
    .expect("route");

    assert!(result.goal_reached);
    assert_eq!(result.hops_completed, 1);
    let descriptors: Vec<String> = result
        .routes
        .iter()
        .map(|route| route.descriptor(&db))
        .collect();
    assert_eq!(
        descriptors,
        [
            "Start/Depot -> Rich/Rich Port +900cr",
            "Start/Depot -> Goal/Goal Port +200cr",
        ]
    );
    assert_eq!(result.best().map(|route| route.gain_cr()), Some(900));
}

fn split_via_db() -> TradeDb {
    let mut builder = TradeDbBuilder::new();
    let hub = builder.system("Hub", [0.0, 0.0, 0.0]);
    let east = builder.system("East", [4.0, 0.0, 0.0]);
    let west = builder.system("West", [-4.0, 0.0, 0.0]);
    let hub_dock = builder.station(hub, "Hub Dock", 10.0, PadSize::Large);
    let east_dock = builder.station(east, "East Dock", 10.0, PadSize::Large);
    let west_dock = builder.station(west, "West Dock", 10.0, PadSize::Large);
    let cargo = builder.item("Cargo");
    builder
        .sells(hub_dock, cargo, 10, None)
        .buys(east_dock, cargo, 20)
        .buys(west_dock, cargo, 25);
    builder.build()
}

#[test]
fn unreachable_via_pair_lists_partial_matches() {
    let db = split_via_db();
    let result = plan_run(
        &db,
        &RunRequest {
            from: Some("Hub Dock".into()),
            via: vec!["East Dock".into(), "West Dock".into()],
            hops: 2,
            jumps_per: 1,
            routes: 5,
            ..RunRequest::new(10, 1_000, 5.0)
        },
    )
    .expect("partial routes");

    assert!(result
        .caution
        .contains("No runs visited all of your via destinations"));
    assert!(result.caution.contains("matched at least 1"));
    assert_eq!(result.routes.len(), 2);
    assert_eq!(db.station_name(result.routes[0].last_station()), "West/West Dock");
}

#[test]
fn origin_failing_pad_size_is_rejected_before_search() {
    let db = load_fixture();
    let mut searched = false;
    let err = plan_run_with_progress(
        &db,
        &RunRequest {
            from: Some("Ridley Scott".into()),
            pad_size: Some("L".into()),
            ..RunRequest::new(10, 10_000, 5.5)
        },
        |_| searched = true,
    )
    .expect_err("small pad origin");

    assert!(!searched);
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(matches!(err, Error::StationIneligible { .. }));
    assert!(err.to_string().contains("pad-size"), "{err}");
}

#[test]
fn fixture_single_hop_prefers_tea_to_george_lucas() {
    let db = load_fixture();
    let result = plan_run(
        &db,
        &RunRequest {
            from: Some("Lave Station".into()),
            hops: 1,
            ..RunRequest::new(10, 10_000, 5.5)
        },
    )
    .expect("route");

    let best = result.best().expect("best");
    assert_eq!(
        best.descriptor(&db),
        "Lave/Lave Station -> Leesti/George Lucas +2,000cr"
    );
    assert_eq!(db.item_name(best.hops()[0].trades[0].item_id), "Tea");
}

#[test]
fn fixture_avoided_item_changes_best_route() {
    let db = load_fixture();
    let result = plan_run(
        &db,
        &RunRequest {
            from: Some("Lave Station".into()),
            avoid: vec!["tea".into()],
            hops: 1,
            ..RunRequest::new(10, 10_000, 5.5)
        },
    )
    .expect("route");

    assert_eq!(
        result.best().expect("best").descriptor(&db),
        "Lave/Lave Station -> Zaonce/Ridley Scott +1,500cr"
    );
}

#[test]
fn fixture_two_hops_reinvest_first_hop_profit() {
    let db = load_fixture();
    let result = plan_run(
        &db,
        &RunRequest {
            from: Some("Lave Station".into()),
            hops: 2,
            ..RunRequest::new(10, 10_000, 5.5)
        },
    )
    .expect("route");

    let best = result.best().expect("best");
    assert_eq!(best.hop_count(), 2);
    assert_eq!(
        best.descriptor(&db),
        "Lave/Lave Station -> Lave/Lave Station +5,000cr"
    );
    // Seven robotics only become affordable with the first hop's profit.
    assert_eq!(best.hops()[1].units(), 7);
}

#[test]
fn fixture_unique_excludes_revisiting_origin() {
    let db = load_fixture();
    let result = plan_run(
        &db,
        &RunRequest {
            from: Some("Lave Station".into()),
            hops: 2,
            unique: true,
            ..RunRequest::new(10, 10_000, 5.5)
        },
    )
    .expect("route");

    for route in &result.routes {
        let mut stations = route.stations().to_vec();
        stations.sort_unstable();
        stations.dedup();
        assert_eq!(stations.len(), route.stations().len());
    }
    assert_eq!(
        result.best().expect("best").descriptor(&db),
        "Lave/Lave Station -> Leesti/George Lucas +4,000cr"
    );
}

#[test]
fn fixture_without_capacity_is_missing_option() {
    let db = load_fixture();
    let err = plan_run(
        &db,
        &RunRequest {
            capacity: None,
            ..RunRequest::new(10, 10_000, 5.5)
        },
    )
    .expect_err("capacity required");
    assert!(matches!(err, Error::MissingOption { option: "--capacity" }));
}
