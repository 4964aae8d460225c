//! Two-phase search configuration.
//!
//! A [`RunRequest`] holds the options as the user typed them: names, raw
//! numbers, nothing checked. [`SearchConfig::build`] resolves every name
//! against the [`TradeDb`], applies every validation rule and produces the
//! immutable snapshot the search reads. No search state exists until it
//! succeeds.

use std::collections::BTreeSet;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::db::{ItemId, PadSizes, StationId, SystemId, TradeDb};
use crate::eligibility::{Anchor, StationFilter};
use crate::error::{Error, Result};
use crate::place::{Place, PlaceSet};
use crate::routing::prune::{BeamPolicy, ScoreCut};
use crate::routing::seed::expand_for_jumps;

/// Most hops a single run may plan.
pub const MAX_HOPS: i64 = 64;

/// Largest supported cargo hold.
pub const MAX_CAPACITY: i64 = 1000;

/// Margins above this would discard most real trades.
pub const MAX_MARGIN: f64 = 0.25;

/// Insurance must leave at least this many credits for trading.
const MIN_TRADE_CREDITS: i64 = 42;

/// Raw, unvalidated run options.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunRequest {
    pub from: Option<String>,
    pub to: Option<String>,
    /// Goal system; mutually exclusive with `to`.
    pub towards: Option<String>,
    pub via: Vec<String>,
    /// Systems, stations or items to stay away from.
    pub avoid: Vec<String>,
    pub capacity: Option<i64>,
    pub credits: i64,
    pub insurance: i64,
    /// Laden jump range.
    pub ly_per: Option<f64>,
    /// Empty-hold jump range used for start/end radius expansion.
    pub empty_ly_per: Option<f64>,
    pub hops: i64,
    pub jumps_per: i64,
    pub start_jumps: i64,
    pub end_jumps: i64,
    /// Per-item unit cap; zero or absent means no cap.
    pub limit: Option<i64>,
    pub max_age_days: Option<f64>,
    pub pad_size: Option<String>,
    pub black_market: bool,
    pub ls_penalty: f64,
    pub max_ls: Option<f64>,
    pub min_gain_per_ton: i64,
    pub unique: bool,
    pub margin: f64,
    /// Number of routes to report.
    pub routes: i64,
    pub max_routes: Option<usize>,
    pub prune_score: f64,
    pub prune_hops: i64,
}

impl Default for RunRequest {
    fn default() -> Self {
        Self {
            from: None,
            to: None,
            towards: None,
            via: Vec::new(),
            avoid: Vec::new(),
            capacity: None,
            credits: 0,
            insurance: 0,
            ly_per: None,
            empty_ly_per: None,
            hops: 2,
            jumps_per: 2,
            start_jumps: 0,
            end_jumps: 0,
            limit: None,
            max_age_days: None,
            pad_size: None,
            black_market: false,
            ls_penalty: 0.6,
            max_ls: None,
            min_gain_per_ton: 1,
            unique: false,
            margin: 0.0,
            routes: 1,
            max_routes: None,
            prune_score: 0.0,
            prune_hops: 3,
        }
    }
}

impl RunRequest {
    /// A request with the three options every run needs and defaults elsewhere.
    pub fn new(capacity: i64, credits: i64, ly_per: f64) -> Self {
        Self {
            capacity: Some(capacity),
            credits,
            ly_per: Some(ly_per),
            ..Self::default()
        }
    }
}

/// Validated, immutable constraints for one search.
///
/// Only [`SearchConfig::build`] can create one.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub capacity: u32,
    /// Per-item unit cap; equals `capacity` when no limit was given.
    pub unit_limit: u32,
    pub credits: i64,
    pub insurance: i64,
    pub ly_per: f64,
    /// Range used for start/end radius expansion.
    pub empty_ly_per: f64,
    pub jumps_per: usize,
    pub hops: usize,
    pub min_gain_per_ton: i64,
    pub margin: f64,
    pub ls_penalty: f64,
    pub filter: StationFilter,
    pub unique: bool,
    /// Explicit `--from` place, if any.
    pub origin: Option<Place>,
    /// Explicit `--to` place, if any.
    pub destination: Option<Place>,
    /// Stations the search starts from.
    pub origins: Vec<StationId>,
    /// Stations the last hop must end at.
    pub destinations: Option<PlaceSet>,
    pub via: PlaceSet,
    pub avoid: PlaceSet,
    pub avoid_items: BTreeSet<ItemId>,
    pub goal_system: Option<SystemId>,
    pub beam: BeamPolicy,
    pub routes: usize,
    /// Hops whose destination is chosen freely by the search.
    pub adhoc_hops: usize,
    _sealed: (),
}

impl SearchConfig {
    /// Resolve and validate `request` against `db`.
    pub fn build(db: &TradeDb, request: &RunRequest) -> Result<Self> {
        let scalars = Scalars::validate(request)?;

        let filter = StationFilter {
            pad_sizes: request
                .pad_size
                .as_deref()
                .map(PadSizes::parse)
                .transpose()?,
            black_market: request.black_market,
            // Zero turns the cap off.
            max_ls: request.max_ls.filter(|ls| *ls > 0.0),
            max_age_days: request.max_age_days,
        };

        let (avoid, avoid_items) = resolve_avoid(db, &request.avoid)?;

        let (origin, origins) = resolve_origins(db, request, &scalars, &filter, &avoid)?;
        let (destination, destinations) =
            resolve_destinations(db, request, &scalars, &filter, &avoid)?;

        let goal_system = match &request.towards {
            Some(name) => db.lookup_place(name)?.system_id(db),
            None => None,
        };

        if scalars.hops == 1 {
            if let (&[only_origin], Some(dests)) = (origins.as_slice(), destinations.as_ref()) {
                if dests.len() == 1 && dests.contains(Place::Station(only_origin)) {
                    return Err(Error::invalid(
                        "more than one hop required to use same from/to destination",
                    ));
                }
            }
        }

        let via = resolve_via(db, &request.via, &filter)?;
        if let Some(conflict) = via.first_conflict(&avoid, db) {
            return Err(Error::ViaAvoidConflict {
                place: conflict.name(db),
            });
        }
        check_anchors_in_via(db, &via, origin, destination, scalars.hops)?;

        let pinned = usize::from(origin.is_some()) + usize::from(destination.is_some());
        let adhoc_points = (scalars.hops + 1).saturating_sub(pinned);
        let via_systems = via.systems(db).len();
        if via_systems > adhoc_points {
            return Err(Error::ViaTooLong {
                suggested_hops: (via_systems + pinned).saturating_sub(1).max(1),
            });
        }

        if request.unique {
            check_unique(db, &scalars, &origins, destinations.as_ref(), &via, origin, destination)?;
        }

        let config = Self {
            capacity: scalars.capacity,
            unit_limit: scalars.unit_limit,
            credits: request.credits,
            insurance: request.insurance,
            ly_per: scalars.ly_per,
            empty_ly_per: scalars.empty_ly_per,
            jumps_per: scalars.jumps_per,
            hops: scalars.hops,
            min_gain_per_ton: request.min_gain_per_ton,
            margin: request.margin,
            ls_penalty: request.ls_penalty,
            filter,
            unique: request.unique,
            origin,
            destination,
            origins,
            destinations,
            via,
            avoid,
            avoid_items,
            goal_system,
            beam: scalars.beam,
            routes: scalars.routes,
            adhoc_hops: adhoc_points.saturating_sub(1),
            _sealed: (),
        };
        debug!(
            origins = config.origins.len(),
            destinations = config.destinations.as_ref().map_or(0, PlaceSet::len),
            via = config.via.len(),
            avoid = config.avoid.len(),
            hops = config.hops,
            "search configuration built"
        );
        Ok(config)
    }

    /// Credits available for the first purchase.
    pub fn start_cr(&self) -> i64 {
        self.credits - self.insurance
    }
}

/// Numeric options after range checks.
struct Scalars {
    capacity: u32,
    unit_limit: u32,
    ly_per: f64,
    empty_ly_per: f64,
    jumps_per: usize,
    hops: usize,
    start_jumps: usize,
    end_jumps: usize,
    routes: usize,
    beam: BeamPolicy,
}

impl Scalars {
    fn validate(request: &RunRequest) -> Result<Self> {
        if request.credits < 0 {
            return Err(Error::invalid("invalid (negative) value for initial credits"));
        }
        if request.routes < 1 {
            return Err(Error::invalid("maximum routes has to be 1 or higher"));
        }
        if request.hops < 1 {
            return Err(Error::invalid("minimum of 1 hop required"));
        }
        if request.hops > MAX_HOPS {
            return Err(Error::invalid(format!(
                "too many hops; at most {MAX_HOPS} are supported"
            )));
        }
        if request.jumps_per < 0 {
            return Err(Error::invalid("negative jumps: you're already there?"));
        }

        let capacity = request
            .capacity
            .ok_or(Error::MissingOption { option: "--capacity" })?;
        if capacity < 0 {
            return Err(Error::invalid("invalid (negative) value for capacity"));
        }
        if capacity > MAX_CAPACITY {
            return Err(Error::invalid(format!(
                "capacity > {MAX_CAPACITY} not supported"
            )));
        }

        let ly_per = request
            .ly_per
            .ok_or(Error::MissingOption { option: "--ly-per" })?;
        if !ly_per.is_finite() || ly_per < 0.0 {
            return Err(Error::invalid("invalid value for --ly-per"));
        }
        let empty_ly_per = match request.empty_ly_per {
            Some(empty) if !empty.is_finite() || empty < 0.0 => {
                return Err(Error::invalid("invalid value for --empty-ly"));
            }
            Some(empty) if empty > 0.0 => empty,
            _ => ly_per,
        };

        let unit_limit = match request.limit {
            Some(limit) if limit < 0 => {
                return Err(Error::invalid("invalid (negative) value for limit"));
            }
            Some(limit) if limit > capacity => {
                return Err(Error::invalid("'limit' must be <= capacity"));
            }
            Some(limit) if limit > 0 => limit,
            _ => capacity,
        };

        if request.insurance < 0 {
            return Err(Error::invalid("invalid (negative) value for insurance"));
        }
        if request.insurance > 0 && request.insurance >= request.credits + MIN_TRADE_CREDITS {
            return Err(Error::invalid("insurance leaves no margin for trade"));
        }

        if !(0.0..=MAX_MARGIN).contains(&request.margin) {
            return Err(Error::invalid(format!(
                "margin must be between 0 and {MAX_MARGIN}"
            )));
        }
        if request.ls_penalty < 0.0 {
            return Err(Error::invalid("invalid (negative) value for --ls-penalty"));
        }
        if request.max_ls.is_some_and(|ls| ls < 0.0) {
            return Err(Error::invalid("invalid (negative) value for --max-ls"));
        }
        if request.max_age_days.is_some_and(|age| age < 0.0) {
            return Err(Error::invalid("invalid (negative) value for --age"));
        }

        if request.start_jumps < 0 || request.end_jumps < 0 {
            return Err(Error::invalid("invalid (negative) value for start/end jumps"));
        }
        if request.start_jumps > 0 && request.from.is_none() {
            return Err(Error::invalid("--start-jumps (-s) only works with --from"));
        }
        if request.end_jumps > 0 && request.to.is_none() {
            return Err(Error::invalid("--end-jumps (-e) only works with --to"));
        }
        if request.towards.is_some() {
            if request.to.is_some() {
                return Err(Error::invalid("--towards is incompatible with --to"));
            }
            if request.from.is_none() {
                return Err(Error::invalid("--towards requires --from"));
            }
        }

        let beam = Self::beam_policy(request)?;

        Ok(Self {
            capacity: to_u32(capacity),
            unit_limit: to_u32(unit_limit),
            ly_per,
            empty_ly_per,
            jumps_per: to_usize(request.jumps_per),
            hops: to_usize(request.hops),
            start_jumps: to_usize(request.start_jumps),
            end_jumps: to_usize(request.end_jumps),
            routes: to_usize(request.routes),
            beam,
        })
    }

    fn beam_policy(request: &RunRequest) -> Result<BeamPolicy> {
        if request.max_routes == Some(0) {
            return Err(Error::invalid("--max-routes must be at least 1"));
        }
        if request.prune_score < 0.0 {
            return Err(Error::invalid("--prune-score cannot be negative"));
        }

        let score_cut = if request.prune_score > 0.0 && request.prune_hops > 0 {
            if request.prune_score > 100.0 {
                return Err(Error::invalid(
                    "--prune-score value must be between 0 and 100",
                ));
            }
            if request.prune_hops < 2 {
                return Err(Error::invalid(
                    "--prune-hops must be 2 or more; you can't prune the first hop",
                ));
            }
            Some(ScoreCut {
                percent: request.prune_score,
                from_hop: to_usize(request.prune_hops),
            })
        } else {
            None
        };

        Ok(BeamPolicy {
            max_routes: request.max_routes,
            score_cut,
        })
    }
}

fn to_u32(value: i64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn to_usize(value: i64) -> usize {
    usize::try_from(value).unwrap_or(0)
}

/// Split the avoid list into places and items. Item names win over places.
fn resolve_avoid(db: &TradeDb, names: &[String]) -> Result<(PlaceSet, BTreeSet<ItemId>)> {
    let mut places = PlaceSet::new();
    let mut items = BTreeSet::new();
    for name in names {
        if let Some(item) = db.lookup_item(name) {
            items.insert(item);
        } else {
            places.insert(db.lookup_place(name)?);
        }
    }
    Ok((places, items))
}

fn resolve_origins(
    db: &TradeDb,
    request: &RunRequest,
    scalars: &Scalars,
    filter: &StationFilter,
    avoid: &PlaceSet,
) -> Result<(Option<Place>, Vec<StationId>)> {
    let Some(name) = request.from.as_deref() else {
        let origins = db
            .stations()
            .filter(|station| filter.is_eligible(station) && !avoid.matches_station(station))
            .map(|station| station.id)
            .collect();
        return Ok((None, origins));
    };

    let place = resolve_endpoint(db, name, filter, Anchor::From)?;
    let origins = expand_for_jumps(
        db,
        &[place],
        scalars.start_jumps,
        scalars.empty_ly_per,
        avoid,
        filter,
    );
    check_for_empty_station_list(db, &origins, place, scalars.start_jumps, Anchor::From)?;
    Ok((Some(place), origins))
}

fn resolve_destinations(
    db: &TradeDb,
    request: &RunRequest,
    scalars: &Scalars,
    filter: &StationFilter,
    avoid: &PlaceSet,
) -> Result<(Option<Place>, Option<PlaceSet>)> {
    let Some(name) = request.to.as_deref() else {
        return Ok((None, None));
    };

    let place = resolve_endpoint(db, name, filter, Anchor::To)?;
    let stations = expand_for_jumps(
        db,
        &[place],
        scalars.end_jumps,
        scalars.empty_ly_per,
        avoid,
        filter,
    );
    check_for_empty_station_list(db, &stations, place, scalars.end_jumps, Anchor::To)?;
    let destinations = stations.into_iter().map(Place::Station).collect();
    Ok((Some(place), Some(destinations)))
}

/// Resolve `--from`/`--to`; a named station is checked strictly.
fn resolve_endpoint(
    db: &TradeDb,
    name: &str,
    filter: &StationFilter,
    anchor: Anchor,
) -> Result<Place> {
    let place = db.lookup_place(name)?;
    match place {
        Place::Station(id) => {
            if let Some(station) = db.station(id) {
                filter.require(db, station, anchor)?;
            }
        }
        Place::System(id) => {
            if db.stations_in(id).next().is_none() {
                return Err(Error::NoData {
                    message: format!(
                        "{} system {} has no stations",
                        anchor.label(),
                        db.system_name(id)
                    ),
                });
            }
        }
    }
    Ok(place)
}

/// Explain why a start/end station list came out empty.
fn check_for_empty_station_list(
    db: &TradeDb,
    stations: &[StationId],
    place: Place,
    jumps: usize,
    anchor: Anchor,
) -> Result<()> {
    if !stations.is_empty() {
        return Ok(());
    }

    let role = anchor.label();
    let name = place.name(db);
    let message = match place {
        _ if jumps > 0 => format!(
            "no {role} stations found within {jumps} jumps of {name} \
             that met your requirements"
        ),
        Place::System(id) if db.stations_in(id).all(|s| s.item_count == 0) => {
            format!("no {role} stations in {name} have price data")
        }
        Place::System(_) => format!(
            "no {role} stations in {name} met your selection criteria \
             (e.g. pad size, black market, age)"
        ),
        Place::Station(_) => format!("{role} station {name} is excluded by your avoid list"),
    };
    Err(Error::NoData { message })
}

fn resolve_via(db: &TradeDb, names: &[String], filter: &StationFilter) -> Result<PlaceSet> {
    let mut via = PlaceSet::new();
    for name in names {
        let place = db.lookup_place(name)?;
        match place {
            Place::Station(id) => {
                if let Some(station) = db.station(id) {
                    filter.require(db, station, Anchor::Via)?;
                }
            }
            Place::System(_) => {
                if !place.check_pad_size(db, filter.pad_sizes.as_ref()) {
                    return Err(Error::invalid(format!(
                        "--via system {} has no stations that match your pad size",
                        place.name(db)
                    )));
                }
            }
        }
        if !via.insert(place) {
            warn!(place = %place.name(db), "duplicate via entry ignored");
        }
    }
    Ok(via)
}

/// With two hops an endpoint station that is also a via leaves nothing to plan.
fn check_anchors_in_via(
    db: &TradeDb,
    via: &PlaceSet,
    origin: Option<Place>,
    destination: Option<Place>,
    hops: usize,
) -> Result<()> {
    if hops != 2 {
        return Ok(());
    }
    for (place, anchor) in [(origin, Anchor::From), (destination, Anchor::To)] {
        if let Some(place @ Place::Station(_)) = place {
            if via.contains(place) {
                return Err(Error::AnchorInVia {
                    place: place.name(db),
                    anchor: anchor.label(),
                });
            }
        }
    }
    Ok(())
}

fn check_unique(
    db: &TradeDb,
    scalars: &Scalars,
    origins: &[StationId],
    destinations: Option<&PlaceSet>,
    via: &PlaceSet,
    origin: Option<Place>,
    destination: Option<Place>,
) -> Result<()> {
    if scalars.hops >= db.station_count() {
        return Err(Error::UniqueInfeasible {
            message: "requested unique trip with more hops than there are stations".into(),
        });
    }

    if let (&[only_origin], Some(dests)) = (origins, destinations) {
        if dests.len() == 1 && dests.contains(Place::Station(only_origin)) {
            return Err(Error::UniqueInfeasible {
                message: "can't have same from/to with --unique".into(),
            });
        }
    }

    for (place, anchor) in [(origin, Anchor::From), (destination, Anchor::To)] {
        if let Some(place @ Place::Station(_)) = place {
            if via.contains(place) {
                return Err(Error::UniqueInfeasible {
                    message: format!(
                        "can't have {} station {} in --via list with --unique",
                        anchor.label(),
                        place.name(db)
                    ),
                });
            }
        }
    }
    Ok(())
}
