use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::Connection;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::place::Place;
use crate::spatial::SpatialIndex;

/// Numeric identifier for a star system.
pub type SystemId = i64;

/// Numeric identifier for a station.
pub type StationId = i64;

/// Numeric identifier for a tradeable commodity.
pub type ItemId = i64;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Cartesian coordinates for a star system, in light-years.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SystemPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl SystemPosition {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Calculate the Euclidean distance to another position.
    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// A star system and the stations orbiting it.
#[derive(Debug, Clone, PartialEq)]
pub struct System {
    pub id: SystemId,
    pub name: String,
    pub position: SystemPosition,
    /// Station identifiers in ascending order.
    pub stations: Vec<StationId>,
}

/// Largest landing pad a station offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PadSize {
    Small,
    Medium,
    Large,
    Unknown,
}

impl PadSize {
    pub fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_uppercase() {
            'S' => Some(PadSize::Small),
            'M' => Some(PadSize::Medium),
            'L' => Some(PadSize::Large),
            '?' => Some(PadSize::Unknown),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            PadSize::Small => 'S',
            PadSize::Medium => 'M',
            PadSize::Large => 'L',
            PadSize::Unknown => '?',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PadSize::Small => "Small",
            PadSize::Medium => "Medium",
            PadSize::Large => "Large",
            PadSize::Unknown => "Unknown",
        }
    }
}

/// Set of acceptable pad sizes, written as a code string such as `"ML?"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PadSizes {
    bits: u8,
}

impl PadSizes {
    /// Parse a code string; every character must be one of `S`, `M`, `L` or `?`.
    pub fn parse(codes: &str) -> Result<Self> {
        let mut sizes = PadSizes::default();
        for code in codes.chars().filter(|c| !c.is_whitespace()) {
            let size = PadSize::from_code(code).ok_or_else(|| {
                Error::invalid(format!(
                    "invalid pad size '{code}' in '{codes}'; expected any of S, M, L or ?"
                ))
            })?;
            sizes.bits |= Self::bit(size);
        }
        if sizes.bits == 0 {
            return Err(Error::invalid("pad size requirement is empty"));
        }
        Ok(sizes)
    }

    pub fn accepts(&self, size: PadSize) -> bool {
        self.bits & Self::bit(size) != 0
    }

    fn bit(size: PadSize) -> u8 {
        match size {
            PadSize::Small => 0b0001,
            PadSize::Medium => 0b0010,
            PadSize::Large => 0b0100,
            PadSize::Unknown => 0b1000,
        }
    }
}

impl fmt::Display for PadSizes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for size in [
            PadSize::Small,
            PadSize::Medium,
            PadSize::Large,
            PadSize::Unknown,
        ] {
            if self.accepts(size) {
                write!(f, "{}", size.code())?;
            }
        }
        Ok(())
    }
}

/// A dockable station belonging to exactly one system.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    pub system_id: SystemId,
    /// Supercruise distance from the arrival star in light-seconds; zero when unknown.
    pub ls_from_star: f64,
    /// `None` when the dataset does not know whether a black market exists.
    pub black_market: Option<bool>,
    pub max_pad_size: PadSize,
    /// Age of the freshest price entry, in days. Filled in when the database is built.
    pub data_age_days: Option<f64>,
    /// Number of priced commodities. Filled in when the database is built.
    pub item_count: usize,
}

impl Station {
    pub fn new(id: StationId, name: impl Into<String>, system_id: SystemId) -> Self {
        Self {
            id,
            name: name.into(),
            system_id,
            ls_from_star: 0.0,
            black_market: None,
            max_pad_size: PadSize::Unknown,
            data_age_days: None,
            item_count: 0,
        }
    }
}

/// A tradeable commodity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
}

/// Price data for one commodity at one station.
///
/// `supply_price` is what the player pays to buy here, `demand_price` what the
/// station pays when the player sells. Zero means the station does not trade
/// in that direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceEntry {
    pub item_id: ItemId,
    pub supply_price: i64,
    /// Units on offer; `None` when unknown.
    pub supply_units: Option<u32>,
    pub demand_price: i64,
    pub age_days: f64,
}

impl PriceEntry {
    fn empty(item_id: ItemId) -> Self {
        Self {
            item_id,
            supply_price: 0,
            supply_units: None,
            demand_price: 0,
            age_days: 0.0,
        }
    }
}

/// A commodity that can be bought at one station and sold at another for profit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeCandidate {
    pub item_id: ItemId,
    pub cost_cr: i64,
    pub gain_cr: i64,
    pub supply_units: Option<u32>,
    pub src_age_days: f64,
    pub dst_age_days: f64,
}

/// In-memory trade database: systems, stations, commodities and prices.
///
/// The database is read-only once built and may be shared across searches.
#[derive(Debug)]
pub struct TradeDb {
    systems: BTreeMap<SystemId, System>,
    stations: BTreeMap<StationId, Station>,
    items: BTreeMap<ItemId, Item>,
    prices: HashMap<StationId, BTreeMap<ItemId, PriceEntry>>,
    system_names: HashMap<String, SystemId>,
    item_names: HashMap<String, ItemId>,
    spatial: SpatialIndex,
    trading_count: usize,
}

impl TradeDb {
    /// Assemble a database from its parts, deriving station item counts, data
    /// ages, per-system station lists and the lookup indexes.
    pub fn from_parts(
        systems: Vec<System>,
        stations: Vec<Station>,
        items: Vec<Item>,
        prices: Vec<(StationId, PriceEntry)>,
    ) -> Self {
        let mut systems: BTreeMap<SystemId, System> = systems
            .into_iter()
            .map(|mut system| {
                system.stations.clear();
                (system.id, system)
            })
            .collect();
        let items: BTreeMap<ItemId, Item> = items.into_iter().map(|i| (i.id, i)).collect();

        let mut station_map = BTreeMap::new();
        let mut orphan_stations = 0usize;
        for station in stations {
            let Some(system) = systems.get_mut(&station.system_id) else {
                orphan_stations += 1;
                continue;
            };
            system.stations.push(station.id);
            station_map.insert(station.id, station);
        }
        for system in systems.values_mut() {
            system.stations.sort_unstable();
        }

        let mut price_map: HashMap<StationId, BTreeMap<ItemId, PriceEntry>> = HashMap::new();
        let mut orphan_prices = 0usize;
        for (station_id, entry) in prices {
            if !station_map.contains_key(&station_id) || !items.contains_key(&entry.item_id) {
                orphan_prices += 1;
                continue;
            }
            price_map
                .entry(station_id)
                .or_default()
                .insert(entry.item_id, entry);
        }

        for station in station_map.values_mut() {
            let entries = price_map.get(&station.id);
            station.item_count = entries.map_or(0, BTreeMap::len);
            station.data_age_days = entries.and_then(|entries| {
                entries
                    .values()
                    .map(|entry| entry.age_days)
                    .min_by(f64::total_cmp)
            });
        }

        if orphan_stations > 0 || orphan_prices > 0 {
            warn!(
                orphan_stations,
                orphan_prices, "ignored rows referencing unknown systems, stations or items"
            );
        }

        let system_names = systems
            .values()
            .map(|system| (system.name.to_uppercase(), system.id))
            .collect();
        let item_names = items
            .values()
            .map(|item| (item.name.to_uppercase(), item.id))
            .collect();
        let spatial = SpatialIndex::build(systems.values());
        let trading_count = count_trading_items(&price_map);

        Self {
            systems,
            stations: station_map,
            items,
            prices: price_map,
            system_names,
            item_names,
            spatial,
            trading_count,
        }
    }

    pub fn system(&self, id: SystemId) -> Option<&System> {
        self.systems.get(&id)
    }

    pub fn station(&self, id: StationId) -> Option<&Station> {
        self.stations.get(&id)
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    /// All systems in ascending identifier order.
    pub fn systems(&self) -> impl Iterator<Item = &System> {
        self.systems.values()
    }

    /// All stations in ascending identifier order.
    pub fn stations(&self) -> impl Iterator<Item = &Station> {
        self.stations.values()
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    /// Stations belonging to a system, in ascending identifier order.
    pub fn stations_in(&self, system: SystemId) -> impl Iterator<Item = &Station> {
        self.systems
            .get(&system)
            .map(|system| system.stations.as_slice())
            .unwrap_or(&[])
            .iter()
            .filter_map(|id| self.stations.get(id))
    }

    /// Lookup a system by case-insensitive name.
    pub fn system_by_name(&self, name: &str) -> Option<&System> {
        self.system_names
            .get(&name.trim().to_uppercase())
            .and_then(|id| self.systems.get(id))
    }

    /// Lookup a commodity by case-insensitive name.
    pub fn lookup_item(&self, name: &str) -> Option<ItemId> {
        self.item_names.get(&name.trim().to_uppercase()).copied()
    }

    /// Resolve a user-supplied name to a system or station.
    ///
    /// Accepts `SYSTEM/STATION`, an exact system name, or an exact station name.
    /// Station names shared by several systems are ambiguous and must be
    /// qualified with their system.
    pub fn lookup_place(&self, name: &str) -> Result<Place> {
        let trimmed = name.trim();

        if let Some((system_name, station_name)) = trimmed.split_once('/') {
            if let Some(system) = self.system_by_name(system_name) {
                if station_name.trim().is_empty() {
                    return Ok(Place::System(system.id));
                }
                let wanted = station_name.trim();
                if let Some(station) = self
                    .stations_in(system.id)
                    .find(|station| station.name.eq_ignore_ascii_case(wanted))
                {
                    return Ok(Place::Station(station.id));
                }
            }
            return Err(self.unknown_place(trimmed));
        }

        if let Some(system) = self.system_by_name(trimmed) {
            return Ok(Place::System(system.id));
        }

        let matches: Vec<&Station> = self
            .stations
            .values()
            .filter(|station| station.name.eq_ignore_ascii_case(trimmed))
            .collect();
        match matches.as_slice() {
            [] => Err(self.unknown_place(trimmed)),
            [station] => Ok(Place::Station(station.id)),
            many => Err(Error::AmbiguousPlace {
                name: trimmed.to_string(),
                candidates: many.iter().map(|s| self.station_name(s.id)).collect(),
            }),
        }
    }

    fn unknown_place(&self, name: &str) -> Error {
        Error::UnknownPlace {
            name: name.to_string(),
            suggestions: self.fuzzy_place_matches(name, 3),
        }
    }

    /// Suggest up to `limit` system or station names similar to `name`.
    pub fn fuzzy_place_matches(&self, name: &str, limit: usize) -> Vec<String> {
        const MIN_SIMILARITY: f64 = 0.8;

        let needle = name.to_uppercase();
        let mut scored: Vec<(f64, String)> = self
            .systems
            .values()
            .map(|system| system.name.clone())
            .chain(self.stations.keys().map(|id| self.station_name(*id)))
            .filter_map(|candidate| {
                let score = strsim::jaro_winkler(&needle, &candidate.to_uppercase());
                (score >= MIN_SIMILARITY).then_some((score, candidate))
            })
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        scored.dedup_by(|a, b| a.1 == b.1);
        scored.truncate(limit);
        scored.into_iter().map(|(_, name)| name).collect()
    }

    /// Fully qualified `SYSTEM/Station` name.
    pub fn station_name(&self, id: StationId) -> String {
        match self.stations.get(&id) {
            Some(station) => {
                let system = self
                    .systems
                    .get(&station.system_id)
                    .map(|s| s.name.as_str())
                    .unwrap_or("<unknown>");
                format!("{}/{}", system, station.name)
            }
            None => format!("<station {id}>"),
        }
    }

    pub fn system_name(&self, id: SystemId) -> &str {
        self.systems
            .get(&id)
            .map(|s| s.name.as_str())
            .unwrap_or("<unknown>")
    }

    pub fn item_name(&self, id: ItemId) -> &str {
        self.items
            .get(&id)
            .map(|i| i.name.as_str())
            .unwrap_or("<unknown>")
    }

    /// Straight-line distance between two systems; `None` if either is unknown.
    pub fn distance(&self, a: SystemId, b: SystemId) -> Option<f64> {
        let a = self.systems.get(&a)?;
        let b = self.systems.get(&b)?;
        Some(a.position.distance_to(&b.position))
    }

    /// Systems within `radius` light-years of `system`, excluding the system itself.
    ///
    /// The sequence is finite and ordered by distance.
    pub fn systems_in_range(
        &self,
        system: SystemId,
        radius: f64,
    ) -> impl Iterator<Item = (SystemId, f64)> {
        let neighbours = match self.systems.get(&system) {
            Some(origin) if radius > 0.0 => self.spatial.within_radius(&origin.position, radius),
            _ => Vec::new(),
        };
        neighbours.into_iter().filter(move |(id, _)| *id != system)
    }

    /// Number of commodities that some station sells below what another buys at.
    pub fn trading_count(&self) -> usize {
        self.trading_count
    }

    /// Price entries for a station in ascending item order.
    pub fn prices(&self, station: StationId) -> impl Iterator<Item = &PriceEntry> {
        self.prices
            .get(&station)
            .into_iter()
            .flat_map(|entries| entries.values())
    }

    /// Commodities purchasable at `src` that `dst` buys for more.
    pub fn trades_between(&self, src: StationId, dst: StationId) -> Vec<TradeCandidate> {
        let (Some(src_prices), Some(dst_prices)) = (self.prices.get(&src), self.prices.get(&dst))
        else {
            return Vec::new();
        };

        src_prices
            .values()
            .filter(|entry| entry.supply_price > 0)
            .filter_map(|supply| {
                let demand = dst_prices.get(&supply.item_id)?;
                let gain_cr = demand.demand_price - supply.supply_price;
                (gain_cr > 0).then_some(TradeCandidate {
                    item_id: supply.item_id,
                    cost_cr: supply.supply_price,
                    gain_cr,
                    supply_units: supply.supply_units,
                    src_age_days: supply.age_days,
                    dst_age_days: demand.age_days,
                })
            })
            .collect()
    }
}

fn count_trading_items(prices: &HashMap<StationId, BTreeMap<ItemId, PriceEntry>>) -> usize {
    let mut cheapest: HashMap<ItemId, i64> = HashMap::new();
    let mut best_bid: HashMap<ItemId, i64> = HashMap::new();
    for entry in prices.values().flat_map(|entries| entries.values()) {
        if entry.supply_price > 0 {
            let current = cheapest.entry(entry.item_id).or_insert(i64::MAX);
            *current = (*current).min(entry.supply_price);
        }
        if entry.demand_price > 0 {
            let current = best_bid.entry(entry.item_id).or_insert(0);
            *current = (*current).max(entry.demand_price);
        }
    }
    cheapest
        .iter()
        .filter(|&(item, &ask)| best_bid.get(item).is_some_and(|&bid| bid > ask))
        .count()
}

/// Incremental builder for [`TradeDb`], handy for embedding and tests.
///
/// Identifiers are allocated sequentially starting at 1.
#[derive(Debug, Default)]
pub struct TradeDbBuilder {
    systems: Vec<System>,
    stations: Vec<Station>,
    items: Vec<Item>,
    prices: BTreeMap<(StationId, ItemId), PriceEntry>,
    ages: HashMap<StationId, f64>,
}

impl TradeDbBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn system(&mut self, name: &str, position: [f64; 3]) -> SystemId {
        let id = self.systems.len() as SystemId + 1;
        self.systems.push(System {
            id,
            name: name.to_string(),
            position: SystemPosition::new(position[0], position[1], position[2]),
            stations: Vec::new(),
        });
        id
    }

    /// Add a station with a known pad size and star distance.
    pub fn station(
        &mut self,
        system: SystemId,
        name: &str,
        ls_from_star: f64,
        max_pad_size: PadSize,
    ) -> StationId {
        let id = self.stations.len() as StationId + 1;
        let mut station = Station::new(id, name, system);
        station.ls_from_star = ls_from_star;
        station.max_pad_size = max_pad_size;
        self.stations.push(station);
        id
    }

    pub fn black_market(&mut self, station: StationId, present: Option<bool>) -> &mut Self {
        if let Some(entry) = self.stations.iter_mut().find(|s| s.id == station) {
            entry.black_market = present;
        }
        self
    }

    pub fn item(&mut self, name: &str) -> ItemId {
        let id = self.items.len() as ItemId + 1;
        self.items.push(Item {
            id,
            name: name.to_string(),
        });
        id
    }

    /// Record that `station` sells `item` to players at `price`.
    pub fn sells(
        &mut self,
        station: StationId,
        item: ItemId,
        price: i64,
        units: Option<u32>,
    ) -> &mut Self {
        let entry = self
            .prices
            .entry((station, item))
            .or_insert_with(|| PriceEntry::empty(item));
        entry.supply_price = price;
        entry.supply_units = units;
        self
    }

    /// Record that `station` buys `item` from players at `price`.
    pub fn buys(&mut self, station: StationId, item: ItemId, price: i64) -> &mut Self {
        let entry = self
            .prices
            .entry((station, item))
            .or_insert_with(|| PriceEntry::empty(item));
        entry.demand_price = price;
        self
    }

    /// Age every price entry of `station` to `days`.
    pub fn data_age(&mut self, station: StationId, days: f64) -> &mut Self {
        self.ages.insert(station, days);
        self
    }

    pub fn build(self) -> TradeDb {
        let ages = self.ages;
        let prices = self
            .prices
            .into_iter()
            .map(|((station, _), mut entry)| {
                if let Some(age) = ages.get(&station) {
                    entry.age_days = *age;
                }
                (station, entry)
            })
            .collect();
        TradeDb::from_parts(self.systems, self.stations, self.items, prices)
    }
}

/// Load a trade database from SQLite.
///
/// Expects `System`, `Station`, `Item` and `StationItem` tables. Optional
/// station columns (`ls_from_star`, `blackmarket`, `max_pad_size`) default to
/// unknown when missing. Price age comes from an `age_days` column when present,
/// otherwise from the `modified` unix timestamp relative to now.
pub fn load_trade_db(db_path: &Path) -> Result<TradeDb> {
    let connection = Connection::open(db_path)?;
    let schema = detect_schema(&connection)?;
    debug!(path = %db_path.display(), ?schema, "loading trade database");

    let systems = load_systems(&connection)?;
    let stations = load_stations(&connection, &schema)?;
    let items = load_items(&connection)?;
    let prices = load_prices(&connection, &schema)?;

    let db = TradeDb::from_parts(systems, stations, items, prices);
    info!(
        systems = db.systems.len(),
        stations = db.stations.len(),
        items = db.items.len(),
        trading = db.trading_count,
        "loaded trade database"
    );
    Ok(db)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SchemaDefinition {
    has_ls_from_star: bool,
    has_black_market: bool,
    has_pad_size: bool,
    has_age_days: bool,
    has_modified: bool,
}

fn detect_schema(connection: &Connection) -> Result<SchemaDefinition> {
    let required: [(&str, &[&str]); 4] = [
        ("System", &["system_id", "name", "pos_x", "pos_y", "pos_z"]),
        ("Station", &["station_id", "name", "system_id"]),
        ("Item", &["item_id", "name"]),
        (
            "StationItem",
            &["station_id", "item_id", "demand_price", "supply_price"],
        ),
    ];
    for (table, columns) in required {
        if !table_exists(connection, table)? || !table_has_columns(connection, table, columns)? {
            return Err(Error::UnsupportedSchema);
        }
    }

    Ok(SchemaDefinition {
        has_ls_from_star: table_has_columns(connection, "Station", &["ls_from_star"])?,
        has_black_market: table_has_columns(connection, "Station", &["blackmarket"])?,
        has_pad_size: table_has_columns(connection, "Station", &["max_pad_size"])?,
        has_age_days: table_has_columns(connection, "StationItem", &["age_days"])?,
        has_modified: table_has_columns(connection, "StationItem", &["modified"])?,
    })
}

fn load_systems(connection: &Connection) -> Result<Vec<System>> {
    let mut stmt =
        connection.prepare("SELECT system_id, name, pos_x, pos_y, pos_z FROM System")?;
    let rows = stmt.query_map([], |row| {
        Ok(System {
            id: row.get(0)?,
            name: row.get(1)?,
            position: SystemPosition::new(row.get(2)?, row.get(3)?, row.get(4)?),
            stations: Vec::new(),
        })
    })?;

    let mut systems = Vec::new();
    for entry in rows {
        systems.push(entry?);
    }
    Ok(systems)
}

fn load_stations(connection: &Connection, schema: &SchemaDefinition) -> Result<Vec<Station>> {
    let sql = format!(
        "SELECT station_id, name, system_id, {ls}, {bm}, {pad} FROM Station",
        ls = if schema.has_ls_from_star {
            "ls_from_star"
        } else {
            "0"
        },
        bm = if schema.has_black_market {
            "blackmarket"
        } else {
            "'?'"
        },
        pad = if schema.has_pad_size {
            "max_pad_size"
        } else {
            "'?'"
        },
    );

    let mut stmt = connection.prepare(&sql)?;
    let rows = stmt.query_map([], |row| {
        let mut station = Station::new(row.get(0)?, row.get::<_, String>(1)?, row.get(2)?);
        station.ls_from_star = row.get::<_, Option<f64>>(3)?.unwrap_or(0.0);
        station.black_market = parse_flag(row.get::<_, Option<String>>(4)?.as_deref());
        station.max_pad_size = row
            .get::<_, Option<String>>(5)?
            .and_then(|code| code.chars().next())
            .and_then(PadSize::from_code)
            .unwrap_or(PadSize::Unknown);
        Ok(station)
    })?;

    let mut stations = Vec::new();
    for entry in rows {
        stations.push(entry?);
    }
    Ok(stations)
}

fn load_items(connection: &Connection) -> Result<Vec<Item>> {
    let mut stmt = connection.prepare("SELECT item_id, name FROM Item")?;
    let rows = stmt.query_map([], |row| {
        Ok(Item {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;

    let mut items = Vec::new();
    for entry in rows {
        items.push(entry?);
    }
    Ok(items)
}

fn load_prices(
    connection: &Connection,
    schema: &SchemaDefinition,
) -> Result<Vec<(StationId, PriceEntry)>> {
    let age_column = if schema.has_age_days {
        "age_days"
    } else if schema.has_modified {
        "modified"
    } else {
        "NULL"
    };
    let units_column = if table_has_columns(connection, "StationItem", &["supply_units"])? {
        "supply_units"
    } else {
        "NULL"
    };
    let sql = format!(
        "SELECT station_id, item_id, demand_price, supply_price, {units_column}, {age_column} \
         FROM StationItem"
    );

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);
    let ages_are_days = schema.has_age_days;

    let mut stmt = connection.prepare(&sql)?;
    let rows = stmt.query_map([], |row| {
        let station: StationId = row.get(0)?;
        let raw_age: Option<f64> = row.get(5)?;
        let age_days = match raw_age {
            Some(days) if ages_are_days => days.max(0.0),
            Some(modified) => ((now - modified) / SECONDS_PER_DAY).max(0.0),
            None => 0.0,
        };
        let supply_units = row
            .get::<_, Option<i64>>(4)?
            .filter(|units| *units > 0)
            .and_then(|units| u32::try_from(units).ok());
        Ok((
            station,
            PriceEntry {
                item_id: row.get(1)?,
                demand_price: row.get::<_, Option<i64>>(2)?.unwrap_or(0),
                supply_price: row.get::<_, Option<i64>>(3)?.unwrap_or(0),
                supply_units,
                age_days,
            },
        ))
    })?;

    let mut prices = Vec::new();
    for entry in rows {
        prices.push(entry?);
    }
    Ok(prices)
}

fn parse_flag(value: Option<&str>) -> Option<bool> {
    match value.map(str::trim) {
        Some(v) if v.eq_ignore_ascii_case("Y") => Some(true),
        Some(v) if v.eq_ignore_ascii_case("N") => Some(false),
        _ => None,
    }
}

fn table_exists(connection: &Connection, table: &str) -> Result<bool> {
    let mut stmt = connection
        .prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1 LIMIT 1")?;
    let mut rows = stmt.query([table])?;
    Ok(rows.next()?.is_some())
}

fn table_has_columns(connection: &Connection, table: &str, required: &[&str]) -> Result<bool> {
    let pragma = format!("PRAGMA table_info('{table}')");
    let mut stmt = connection.prepare(&pragma)?;
    let mut rows = stmt.query([])?;

    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        columns.push(name);
    }

    Ok(required.iter().all(|required| {
        columns
            .iter()
            .any(|column| column.eq_ignore_ascii_case(required))
    }))
}
