//! Output formatting for run results and station listings.
//!
//! Renderers return strings; the command handlers decide where they go.

use std::fmt::Write;

use clap::ValueEnum;
use serde::Serialize;
use tradehop_lib::{
    DetailOptions, HopProgress, RunResult, Station, StationFilter, StationId, TradeDb,
};

use crate::terminal::ColorPalette;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON for scripting.
    Json,
}

/// How much of each route the text renderer shows.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteDisplay {
    /// Show the compact per-hop summary instead of the full load instructions.
    pub summary: bool,
    pub detail: DetailOptions,
}

/// `* Hop   1: .......12 origins`
pub fn format_progress(progress: &HopProgress) -> String {
    let mut line = format!(
        "* Hop {:>3}: {:.>10} origins",
        progress.hop, progress.origins
    );
    if progress.pruned > 0 {
        let _ = write!(line, " ({} pruned)", progress.pruned);
    }
    line
}

/// Render the displayed routes of `result`, cautions first.
pub fn render_run_text(
    db: &TradeDb,
    result: &RunResult,
    display: &RouteDisplay,
    palette: ColorPalette,
) -> String {
    let p = palette;
    let mut buffer = String::new();

    for line in result.caution.lines() {
        let _ = writeln!(buffer, "{}{}{}", p.yellow, line, p.reset);
    }
    if !result.caution.is_empty() {
        buffer.push('\n');
    }

    for (index, route) in result.displayed().iter().enumerate() {
        if index > 0 {
            buffer.push('\n');
        }
        if display.summary {
            let _ = writeln!(buffer, "{}", route.summary(db));
        } else {
            let body = route.detail(db, &display.detail);
            let (headline, rest) = body.split_once('\n').unwrap_or((body.as_str(), ""));
            let _ = writeln!(buffer, "{}{}{}", p.white_bold, headline, p.reset);
            if !rest.is_empty() {
                let _ = writeln!(buffer, "{rest}");
            }
        }
    }

    if result.goal_reached {
        let _ = writeln!(
            buffer,
            "{}Goal system reached after {} hop(s).{}",
            p.gray, result.hops_completed, p.reset
        );
    }
    buffer
}

/// One row of the `stations` listing.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StationRow {
    pub id: StationId,
    pub name: String,
    pub system: String,
    pub ls_from_star: Option<f64>,
    pub pad_size: char,
    pub black_market: Option<bool>,
    pub items: usize,
    pub data_age_days: Option<f64>,
    /// Why the station fails the active filters, if it does.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected: Option<String>,
}

impl StationRow {
    pub fn from_station(db: &TradeDb, station: &Station, filter: &StationFilter) -> Self {
        Self {
            id: station.id,
            name: station.name.clone(),
            system: db.system_name(station.system_id).to_string(),
            ls_from_star: (station.ls_from_star > 0.0).then_some(station.ls_from_star),
            pad_size: station.max_pad_size.code(),
            black_market: station.black_market,
            items: station.item_count,
            data_age_days: station.data_age_days,
            rejected: filter.rejection(station).map(|reason| reason.to_string()),
        }
    }
}

pub fn render_stations_text(rows: &[StationRow], palette: ColorPalette) -> String {
    let p = palette;
    let width = rows
        .iter()
        .map(|row| row.system.len() + row.name.len() + 1)
        .max()
        .unwrap_or(0);

    let mut buffer = String::new();
    for row in rows {
        let name = format!("{}/{}", row.system, row.name);
        let ls = row
            .ls_from_star
            .map_or_else(|| "?".to_string(), |ls| format!("{ls:.0}"));
        let age = row
            .data_age_days
            .map_or_else(|| "-".to_string(), |age| format!("{age:.1}d"));
        let bm = match row.black_market {
            Some(true) => 'Y',
            Some(false) => 'N',
            None => '?',
        };
        let _ = write!(
            buffer,
            "{name:<width$}  {ls:>7}ls  Pad:{}  BMk:{bm}  {:>3} items  {age:>7}",
            row.pad_size, row.items
        );
        match &row.rejected {
            Some(reason) => {
                let _ = writeln!(buffer, "  {}[{reason}]{}", p.red, p.reset);
            }
            None => {
                let _ = writeln!(buffer, "  {}[ok]{}", p.green, p.reset);
            }
        }
    }
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradehop_lib::{PadSize, PadSizes, TradeDbBuilder};

    fn db() -> TradeDb {
        let mut builder = TradeDbBuilder::new();
        let sys = builder.system("Lave", [0.0, 0.0, 0.0]);
        let big = builder.station(sys, "Lave Station", 300.0, PadSize::Large);
        let small = builder.station(sys, "Castellan", 0.0, PadSize::Small);
        let tea = builder.item("Tea");
        builder
            .sells(big, tea, 100, None)
            .buys(small, tea, 150)
            .data_age(big, 1.5);
        builder.build()
    }

    #[test]
    fn progress_pads_with_dots() {
        let line = format_progress(&HopProgress {
            hop: 1,
            origins: 12,
            pruned: 0,
        });
        assert_eq!(line, "* Hop   1: ........12 origins");

        let pruned = format_progress(&HopProgress {
            hop: 2,
            origins: 5,
            pruned: 7,
        });
        assert!(pruned.ends_with("origins (7 pruned)"));
    }

    #[test]
    fn station_rows_explain_rejections() {
        let db = db();
        let filter = StationFilter {
            pad_sizes: Some(PadSizes::parse("L").expect("pads")),
            ..StationFilter::default()
        };
        let rows: Vec<StationRow> = db
            .stations()
            .map(|station| StationRow::from_station(&db, station, &filter))
            .collect();

        assert_eq!(rows[0].rejected, None);
        assert_eq!(rows[0].data_age_days, Some(1.5));
        assert!(rows[1]
            .rejected
            .as_deref()
            .is_some_and(|reason| reason.contains("you specified")));
        assert_eq!(rows[1].ls_from_star, None);

        let text = render_stations_text(&rows, ColorPalette::plain());
        assert!(text.contains("Lave/Lave Station"));
        assert!(text.contains("[ok]"));
        assert!(text.contains("    ?ls"));
    }

    #[test]
    fn json_rows_omit_missing_rejection() {
        let db = db();
        let station = db.stations().next().expect("station");
        let row = StationRow::from_station(&db, station, &StationFilter::default());
        let json = serde_json::to_value(&row).expect("json");
        assert!(json.get("rejected").is_none());
        assert_eq!(json["pad_size"], "L");
    }
}
