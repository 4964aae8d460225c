//! Places (systems or stations) and place sets used for via/avoid lists.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::db::{PadSizes, Station, StationId, SystemId, TradeDb};

/// Either a whole system or a single station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Place {
    System(SystemId),
    Station(StationId),
}

impl Place {
    /// The system this place is, or belongs to.
    pub fn system_id(self, db: &TradeDb) -> Option<SystemId> {
        match self {
            Place::System(id) => Some(id),
            Place::Station(id) => db.station(id).map(|station| station.system_id),
        }
    }

    /// Display name: the system name, or `SYSTEM/Station`.
    pub fn name(self, db: &TradeDb) -> String {
        match self {
            Place::System(id) => db.system_name(id).to_string(),
            Place::Station(id) => db.station_name(id),
        }
    }

    /// A system matches any of its stations; a station matches only itself.
    pub fn matches_station(self, station: &Station) -> bool {
        match self {
            Place::System(id) => station.system_id == id,
            Place::Station(id) => station.id == id,
        }
    }

    /// Whether a ship limited to `pads` can dock here. A system qualifies when
    /// any of its stations does.
    pub fn check_pad_size(self, db: &TradeDb, pads: Option<&PadSizes>) -> bool {
        let Some(pads) = pads else {
            return true;
        };
        match self {
            Place::Station(id) => db
                .station(id)
                .is_some_and(|station| pads.accepts(station.max_pad_size)),
            Place::System(id) => db
                .stations_in(id)
                .any(|station| pads.accepts(station.max_pad_size)),
        }
    }
}

/// A set of places with system-covers-station matching semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceSet {
    places: BTreeSet<Place>,
}

impl PlaceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, place: Place) -> bool {
        self.places.insert(place)
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    pub fn contains(&self, place: Place) -> bool {
        self.places.contains(&place)
    }

    pub fn iter(&self) -> impl Iterator<Item = Place> + '_ {
        self.places.iter().copied()
    }

    /// True when the station itself or its system is in the set.
    pub fn matches_station(&self, station: &Station) -> bool {
        self.places.contains(&Place::Station(station.id))
            || self.places.contains(&Place::System(station.system_id))
    }

    /// True when the system itself is in the set. Stations in the set do not
    /// cover their system.
    pub fn contains_system(&self, system: SystemId) -> bool {
        self.places.contains(&Place::System(system))
    }

    /// Distinct systems covered by the set; a station contributes its system.
    pub fn systems(&self, db: &TradeDb) -> BTreeSet<SystemId> {
        self.places
            .iter()
            .filter_map(|place| place.system_id(db))
            .collect()
    }

    /// The first place of `self` that conflicts with `other`: present in it
    /// directly, or a station whose system is in it.
    pub fn first_conflict(&self, other: &PlaceSet, db: &TradeDb) -> Option<Place> {
        self.places.iter().copied().find(|place| match place {
            Place::System(_) => other.contains(*place),
            Place::Station(id) => db
                .station(*id)
                .is_some_and(|station| other.matches_station(station)),
        })
    }
}

impl FromIterator<Place> for PlaceSet {
    fn from_iter<T: IntoIterator<Item = Place>>(iter: T) -> Self {
        Self {
            places: iter.into_iter().collect(),
        }
    }
}
