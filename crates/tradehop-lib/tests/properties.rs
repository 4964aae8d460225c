mod common;

use std::cmp::Ordering;

use common::{assert_route_invariants, grid_db};
use once_cell::sync::Lazy;
use tradehop_lib::routing::BeamPolicy;
use tradehop_lib::{
    plan_run, plan_run_with_progress, rank_order, Error, PadSize, Place, RunRequest, RunResult,
    StationId, TradeDb,
};

static GRID: Lazy<TradeDb> = Lazy::new(|| grid_db(4));

fn grid_request() -> RunRequest {
    RunRequest {
        hops: 3,
        routes: 50,
        limit: Some(4),
        margin: 0.1,
        min_gain_per_ton: 5,
        ..RunRequest::new(12, 5_000, 6.0)
    }
}

fn run(request: &RunRequest) -> RunResult {
    plan_run(&GRID, request).expect("grid run")
}

fn station_of(db: &TradeDb, name: &str) -> StationId {
    match db.lookup_place(name).expect("known place") {
        Place::Station(id) => id,
        Place::System(_) => panic!("{name} is a system"),
    }
}

#[test]
fn every_route_respects_budget_and_cargo_limits() {
    let result = run(&grid_request());
    assert!(!result.routes.is_empty());
    for route in &result.routes {
        assert_route_invariants(route, 12, 4, 5);
    }
}

#[test]
fn results_are_rank_sorted() {
    let result = run(&grid_request());
    for pair in result.routes.windows(2) {
        assert_ne!(rank_order(&pair[0], &pair[1]), Ordering::Greater);
    }
    let best = result.best().expect("best");
    assert!(result
        .routes
        .iter()
        .all(|route| route.score() <= best.score()));
}

#[test]
fn repeated_runs_are_identical() {
    let first = run(&grid_request());
    let second = run(&grid_request());
    let describe = |result: &RunResult| -> Vec<(Vec<StationId>, i64)> {
        result
            .routes
            .iter()
            .map(|route| (route.stations().to_vec(), route.gain_cr()))
            .collect()
    };
    assert_eq!(describe(&first), describe(&second));
    assert_eq!(first.caution, second.caution);
}

#[test]
fn beam_cut_never_drops_best_route() {
    let result = run(&grid_request());
    let best = result.best().expect("best").clone();
    let mut routes = result.routes.clone();
    let pruned = BeamPolicy {
        max_routes: Some(3),
        score_cut: None,
    }
    .apply(&mut routes, 2);

    assert_eq!(routes.len(), result.routes.len().min(3));
    assert_eq!(pruned, result.routes.len() - routes.len());
    assert_eq!(routes[0], best);
}

#[test]
fn beam_limited_search_still_satisfies_invariants() {
    let request = RunRequest {
        max_routes: Some(2),
        prune_score: 50.0,
        prune_hops: 2,
        ..grid_request()
    };
    let mut widths = Vec::new();
    let result = plan_run_with_progress(&GRID, &request, |progress| widths.push(progress))
        .expect("grid run");
    assert!(widths.iter().skip(1).all(|progress| progress.origins <= 2));
    for route in &result.routes {
        assert_route_invariants(route, 12, 4, 5);
    }
}

#[test]
fn pad_size_filter_excludes_medium_ports() {
    let request = RunRequest {
        pad_size: Some("L".into()),
        ..grid_request()
    };
    let result = run(&request);
    for route in &result.routes {
        for id in route.stations() {
            let station = GRID.station(*id).expect("station");
            assert_eq!(station.max_pad_size, PadSize::Large);
        }
    }
}

#[test]
fn max_ls_bounds_every_stop() {
    let request = RunRequest {
        max_ls: Some(1_500.0),
        ..grid_request()
    };
    let result = run(&request);
    for route in &result.routes {
        for id in route.stations() {
            assert!(GRID.station(*id).expect("station").ls_from_star <= 1_500.0);
        }
    }
}

#[test]
fn unique_routes_never_revisit_a_station() {
    let request = RunRequest {
        unique: true,
        ..grid_request()
    };
    let result = run(&request);
    for route in &result.routes {
        let mut stations = route.stations().to_vec();
        stations.sort_unstable();
        stations.dedup();
        assert_eq!(stations.len(), route.stations().len());
    }
}

#[test]
fn avoided_system_is_never_visited_or_crossed() {
    let avoided = GRID.system_by_name("Grid 1-1").expect("system").id;
    let request = RunRequest {
        avoid: vec!["Grid 1-1".into()],
        ..grid_request()
    };
    let result = run(&request);
    for route in &result.routes {
        for id in route.stations() {
            assert_ne!(GRID.station(*id).expect("station").system_id, avoided);
        }
        for path in route.jumps() {
            assert!(!path.contains(&avoided));
        }
    }
}

#[test]
fn via_station_appears_in_every_route_or_is_explained() {
    let via = station_of(&GRID, "Grid 2-2/Port 2-2");
    let request = RunRequest {
        from: Some("Grid 0-1/Port 0-1".into()),
        via: vec!["Grid 2-2/Port 2-2".into()],
        ..grid_request()
    };
    match plan_run(&GRID, &request) {
        Ok(result) => {
            let visits_all = result
                .routes
                .iter()
                .all(|route| route.stations()[1..].contains(&via));
            assert!(visits_all || !result.caution.is_empty());
        }
        Err(err) => assert!(matches!(err, Error::NoViaMatch), "{err}"),
    }
}

#[test]
fn routes_from_fixed_origin_start_there() {
    let origin = station_of(&GRID, "Grid 3-3/Port 3-3");
    let request = RunRequest {
        from: Some("Grid 3-3/Port 3-3".into()),
        ..grid_request()
    };
    let result = run(&request);
    assert!(result.routes.iter().all(|route| route.origin() == origin));
}

#[test]
fn destination_restricts_final_stop() {
    let target = GRID.system_by_name("Grid 0-0").expect("system").id;
    let request = RunRequest {
        to: Some("Grid 0-0".into()),
        end_jumps: 1,
        ..grid_request()
    };
    let result = run(&request);
    for route in &result.routes {
        let last = GRID.station(route.last_station()).expect("station");
        let distance = GRID.distance(last.system_id, target).expect("distance");
        assert!(distance <= 6.0, "{} is {distance}ly out", last.name);
    }
}
