//! `stations` subcommand: list a place's stations and whether they pass the
//! station filters a run would apply.

use anyhow::{Context, Result};

use tradehop_cli::output::{render_stations_text, OutputFormat, StationRow};
use tradehop_cli::terminal::ColorPalette;
use tradehop_lib::{PadSizes, Place, StationFilter, TradeDb};

use crate::commands::open_trade_db;
use crate::{GlobalOptions, StationsArgs};

impl StationsArgs {
    fn filter(&self) -> Result<StationFilter> {
        let pad_sizes = self
            .pad_size
            .as_deref()
            .map(PadSizes::parse)
            .transpose()
            .context("invalid --pad-size")?;
        Ok(StationFilter {
            pad_sizes,
            black_market: self.black_market,
            max_ls: self.max_ls.filter(|ls| *ls > 0.0),
            max_age_days: self.max_age_days,
        })
    }
}

/// Handle the stations subcommand.
pub fn handle_stations(global: &GlobalOptions, args: &StationsArgs) -> Result<()> {
    let db = open_trade_db(global.db.as_deref())?;
    let filter = args.filter()?;
    let rows = station_rows(&db, &args.place, &filter, args.all)?;

    match global.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Text if rows.is_empty() => {
            println!("No stations at {} match the filters.", args.place);
        }
        OutputFormat::Text => print!("{}", render_stations_text(&rows, ColorPalette::detect())),
    }
    Ok(())
}

fn station_rows(
    db: &TradeDb,
    name: &str,
    filter: &StationFilter,
    include_rejected: bool,
) -> Result<Vec<StationRow>> {
    let stations: Vec<_> = match db.lookup_place(name)? {
        Place::Station(id) => db.station(id).into_iter().collect(),
        Place::System(id) => db.stations_in(id).collect(),
    };
    Ok(stations
        .into_iter()
        .map(|station| StationRow::from_station(db, station, filter))
        .filter(|row| include_rejected || row.rejected.is_none())
        .collect())
}
