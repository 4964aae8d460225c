//! Hard per-station constraints: price data, pad size, black market, distance
//! from star and data age.

use std::fmt;

use crate::db::{PadSize, PadSizes, Station, TradeDb};
use crate::error::{Error, Result};

/// Station filters shared by origins, destinations and via stations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationFilter {
    pub pad_sizes: Option<PadSizes>,
    pub black_market: bool,
    /// Maximum light-seconds from the star. Stations with unknown distance fail.
    pub max_ls: Option<f64>,
    pub max_age_days: Option<f64>,
}

/// The first reason a station fails a [`StationFilter`].
#[derive(Debug, Clone, PartialEq)]
pub enum Ineligibility {
    NoPriceData,
    PadSize { required: PadSizes, actual: PadSize },
    NoBlackMarket,
    TooFarFromStar { ls: f64, max: f64 },
    DataTooOld { age_days: f64, max: f64 },
}

impl Ineligibility {
    fn requirement(&self) -> &'static str {
        match self {
            Ineligibility::NoPriceData => "price data",
            Ineligibility::PadSize { .. } => "pad-size",
            Ineligibility::NoBlackMarket => "black-market",
            Ineligibility::TooFarFromStar { .. } => "max-ls",
            Ineligibility::DataTooOld { .. } => "--age",
        }
    }
}

impl fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ineligibility::NoPriceData => f.write_str("no price data"),
            Ineligibility::PadSize { required, actual } => write!(
                f,
                "you specified: {required}, current data for station: {} ({})",
                actual.code(),
                actual.label()
            ),
            Ineligibility::NoBlackMarket => f.write_str("no known black market"),
            Ineligibility::TooFarFromStar { ls, max } if *ls <= 0.0 => {
                write!(f, "distance from star unknown, limit is {max}ls")
            }
            Ineligibility::TooFarFromStar { ls, max } => {
                write!(f, "{ls}ls from star, limit is {max}ls")
            }
            Ineligibility::DataTooOld { age_days, max } => {
                write!(f, "data is {age_days:.1} days old, limit is {max} days")
            }
        }
    }
}

/// Why a station is being checked strictly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    From,
    To,
    Via,
}

impl Anchor {
    pub fn label(self) -> &'static str {
        match self {
            Anchor::From => "--from",
            Anchor::To => "--to",
            Anchor::Via => "--via",
        }
    }
}

impl StationFilter {
    /// The first failed check, in a fixed order: price data, pad size, black
    /// market, distance from star, data age.
    pub fn rejection(&self, station: &Station) -> Option<Ineligibility> {
        if station.item_count == 0 {
            return Some(Ineligibility::NoPriceData);
        }
        if let Some(required) = self.pad_sizes {
            if !required.accepts(station.max_pad_size) {
                return Some(Ineligibility::PadSize {
                    required,
                    actual: station.max_pad_size,
                });
            }
        }
        if self.black_market && station.black_market != Some(true) {
            return Some(Ineligibility::NoBlackMarket);
        }
        if let Some(max) = self.max_ls {
            let ls = station.ls_from_star;
            if ls <= 0.0 || ls > max {
                return Some(Ineligibility::TooFarFromStar { ls, max });
            }
        }
        if let Some(max) = self.max_age_days {
            if let Some(age_days) = station.data_age_days {
                if age_days > max {
                    return Some(Ineligibility::DataTooOld { age_days, max });
                }
            }
        }
        None
    }

    pub fn is_eligible(&self, station: &Station) -> bool {
        self.rejection(station).is_none()
    }

    /// Strict variant for explicitly named stations.
    ///
    /// A missing price list is a data error and a failed filter is a
    /// configuration error. The `--from` station is only held to the price and
    /// pad-size checks since the ship is already docked there.
    pub fn require(&self, db: &TradeDb, station: &Station, anchor: Anchor) -> Result<()> {
        let Some(rejection) = self.rejection(station) else {
            return Ok(());
        };

        match rejection {
            Ineligibility::NoPriceData => Err(Error::NoPriceData {
                role: anchor.label().to_string(),
                station: db.station_name(station.id),
            }),
            Ineligibility::NoBlackMarket
            | Ineligibility::TooFarFromStar { .. }
            | Ineligibility::DataTooOld { .. }
                if anchor == Anchor::From =>
            {
                Ok(())
            }
            other => Err(Error::StationIneligible {
                role: anchor.label().to_string(),
                station: db.station_name(station.id),
                requirement: other.requirement(),
                detail: Some(other.to_string()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::TradeDbBuilder;
    use crate::error::ErrorKind;

    fn db_with_station(ls: f64, pad: PadSize, bm: Option<bool>, age: f64) -> TradeDb {
        let mut builder = TradeDbBuilder::new();
        let sys = builder.system("Sol", [0.0, 0.0, 0.0]);
        let stn = builder.station(sys, "Abraham Lincoln", ls, pad);
        let empty = builder.station(sys, "Empty Dock", ls, pad);
        let item = builder.item("Gold");
        builder
            .sells(stn, item, 100, None)
            .black_market(stn, bm)
            .black_market(empty, bm)
            .data_age(stn, age);
        builder.build()
    }

    #[test]
    fn open_filter_accepts_priced_station() {
        let db = db_with_station(0.0, PadSize::Unknown, None, 30.0);
        let filter = StationFilter::default();
        assert!(filter.is_eligible(db.station(1).unwrap()));
        assert_eq!(
            filter.rejection(db.station(2).unwrap()),
            Some(Ineligibility::NoPriceData)
        );
    }

    #[test]
    fn each_check_disables_independently() {
        let db = db_with_station(500.0, PadSize::Medium, Some(false), 3.0);
        let station = db.station(1).unwrap();

        let pad = StationFilter {
            pad_sizes: Some(PadSizes::parse("L").unwrap()),
            ..StationFilter::default()
        };
        assert!(matches!(
            pad.rejection(station),
            Some(Ineligibility::PadSize { .. })
        ));

        let bm = StationFilter {
            black_market: true,
            ..StationFilter::default()
        };
        assert_eq!(bm.rejection(station), Some(Ineligibility::NoBlackMarket));

        let ls = StationFilter {
            max_ls: Some(400.0),
            ..StationFilter::default()
        };
        assert!(matches!(
            ls.rejection(station),
            Some(Ineligibility::TooFarFromStar { .. })
        ));

        let age = StationFilter {
            max_age_days: Some(2.0),
            ..StationFilter::default()
        };
        assert!(matches!(
            age.rejection(station),
            Some(Ineligibility::DataTooOld { .. })
        ));
    }

    #[test]
    fn unknown_star_distance_fails_max_ls() {
        let db = db_with_station(0.0, PadSize::Large, None, 0.0);
        let filter = StationFilter {
            max_ls: Some(10_000.0),
            ..StationFilter::default()
        };
        assert!(!filter.is_eligible(db.station(1).unwrap()));
    }

    #[test]
    fn strict_from_only_enforces_price_and_pad() {
        let db = db_with_station(500.0, PadSize::Medium, Some(false), 3.0);
        let station = db.station(1).unwrap();
        let filter = StationFilter {
            black_market: true,
            max_ls: Some(100.0),
            ..StationFilter::default()
        };
        assert!(filter.require(&db, station, Anchor::From).is_ok());

        let err = filter
            .require(&db, station, Anchor::To)
            .expect_err("black market required at destination");
        assert!(err.to_string().contains("--to station Sol/Abraham Lincoln"));
        assert!(err.to_string().contains("black-market"));
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let pad = StationFilter {
            pad_sizes: Some(PadSizes::parse("L").unwrap()),
            ..StationFilter::default()
        };
        let err = pad
            .require(&db, station, Anchor::From)
            .expect_err("pad size is enforced at the origin");
        assert!(err.to_string().contains("pad-size"));
    }

    #[test]
    fn strict_check_on_unpriced_station_is_a_data_error() {
        let db = db_with_station(10.0, PadSize::Large, None, 0.0);
        let err = StationFilter::default()
            .require(&db, db.station(2).unwrap(), Anchor::Via)
            .expect_err("no prices");
        assert_eq!(err.kind(), ErrorKind::Data);
        assert!(err.to_string().contains("--via station: Sol/Empty Dock"));
    }
}
