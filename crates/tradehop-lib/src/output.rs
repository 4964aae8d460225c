use std::fmt::Write;

use serde::Serialize;

use crate::db::{ItemId, StationId, TradeDb};
use crate::route::{Hop, Route, TradeOption};
use crate::routing::RunResult;

/// How credit amounts are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CreditStyle {
    /// `12,345cr`
    #[default]
    Grouped,
    /// `12345cr`
    Plain,
}

/// Display settings for [`Route::detail`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetailOptions {
    /// 0 shows loads only; 1 adds jumps; 2 adds station details and data ages.
    pub verbosity: u8,
    pub credits: CreditStyle,
}

/// Format a credit amount with the `cr` suffix.
pub fn format_credits(value: i64, style: CreditStyle) -> String {
    let digits = match style {
        CreditStyle::Plain => value.unsigned_abs().to_string(),
        CreditStyle::Grouped => format_with_separators(value.unsigned_abs()),
    };
    if value < 0 {
        format!("-{digits}cr")
    } else {
        format!("{digits}cr")
    }
}

fn format_with_separators(value: u64) -> String {
    let raw = value.to_string();
    let mut out = String::with_capacity(raw.len() + raw.len() / 3);
    for (index, ch) in raw.chars().enumerate() {
        if index > 0 && (raw.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

impl Route {
    /// One line: `SYS/Station -> SYS/Station +1,234cr`.
    pub fn descriptor(&self, db: &TradeDb) -> String {
        format!(
            "{} -> {} +{}",
            db.station_name(self.origin()),
            db.station_name(self.last_station()),
            format_credits(self.gain_cr(), CreditStyle::Grouped)
        )
    }

    /// Start credits, per-hop gains and totals.
    pub fn summary(&self, db: &TradeDb) -> String {
        let style = CreditStyle::Grouped;
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "{} -> {}",
            db.station_name(self.origin()),
            db.station_name(self.last_station())
        );
        let _ = writeln!(buffer, "  Start CR: {}", format_credits(self.start_cr(), style));
        for (index, hop) in self.hops().iter().enumerate() {
            let jumps = self.jumps()[index].len().saturating_sub(1);
            let _ = writeln!(
                buffer,
                "  Hop {:>4}: +{} to {} ({} {})",
                index + 1,
                format_credits(hop.gain_cr, style),
                db.station_name(self.stations()[index + 1]),
                jumps,
                if jumps == 1 { "jump" } else { "jumps" }
            );
        }
        let _ = writeln!(
            buffer,
            "  Gain CR : {} ({}/hop)",
            format_credits(self.gain_cr(), style),
            format_credits(self.gain_per_hop(), style)
        );
        let _ = write!(
            buffer,
            "  Final CR: {}",
            format_credits(self.available_cr(), style)
        );
        buffer
    }

    /// Step-by-step rendering: what to load, where to fly, what it earns.
    pub fn detail(&self, db: &TradeDb, options: &DetailOptions) -> String {
        let style = options.credits;
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "{} (score: {:.2})",
            self.descriptor(db),
            self.score()
        );

        let mut running = self.start_cr();
        for (index, hop) in self.hops().iter().enumerate() {
            let src = self.stations()[index];
            let dst = self.stations()[index + 1];

            let _ = writeln!(
                buffer,
                "  Load from {}{}:",
                db.station_name(src),
                station_details(db, src, options)
            );
            write_trades(&mut buffer, db, hop, options);

            if options.verbosity >= 1 {
                let path: Vec<&str> = self.jumps()[index]
                    .iter()
                    .map(|system| db.system_name(*system))
                    .collect();
                let _ = writeln!(buffer, "  Jump {}", path.join(" -> "));
            }

            running += hop.gain_cr;
            let units = hop.units().max(1);
            let _ = writeln!(
                buffer,
                "  Unload at {}{} => Gain {} ({}/ton) => {}",
                db.station_name(dst),
                station_details(db, dst, options),
                format_credits(hop.gain_cr, style),
                format_credits(hop.gain_cr / i64::from(units), style),
                format_credits(running, style)
            );
        }

        let _ = writeln!(buffer, "  ----------");
        let _ = write!(
            buffer,
            "  Finish at {} gaining {} ({}/hop) => est {} total",
            db.station_name(self.last_station()),
            format_credits(self.gain_cr(), style),
            format_credits(self.gain_per_hop(), style),
            format_credits(self.available_cr(), style)
        );
        buffer
    }

    fn gain_per_hop(&self) -> i64 {
        match i64::try_from(self.hop_count()) {
            Ok(hops) if hops > 0 => self.gain_cr() / hops,
            _ => 0,
        }
    }
}

fn station_details(db: &TradeDb, station: StationId, options: &DetailOptions) -> String {
    if options.verbosity < 2 {
        return String::new();
    }
    let Some(station) = db.station(station) else {
        return String::new();
    };
    let ls = if station.ls_from_star > 0.0 {
        format!("{:.0}ls", station.ls_from_star)
    } else {
        "?ls".to_string()
    };
    let bm = match station.black_market {
        Some(true) => 'Y',
        Some(false) => 'N',
        None => '?',
    };
    format!(" ({ls}, BMk:{bm}, Pad:{})", station.max_pad_size.code())
}

fn write_trades(buffer: &mut String, db: &TradeDb, hop: &Hop, options: &DetailOptions) {
    let width = hop
        .trades
        .iter()
        .map(|trade| db.item_name(trade.item_id).len())
        .max()
        .unwrap_or(0);
    for trade in &hop.trades {
        let _ = write!(
            buffer,
            "     {:>4} x {:<width$} {:>12} each, +{}/unit",
            trade.quantity,
            db.item_name(trade.item_id),
            format_credits(trade.cost_cr, options.credits),
            format_credits(trade.gain_cr, options.credits),
        );
        if options.verbosity >= 2 {
            let _ = write!(
                buffer,
                ", {:.1} vs {:.1} days",
                trade.src_age_days, trade.dst_age_days
            );
        }
        buffer.push('\n');
    }
}

/// Serialisable view of a finished search.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RunSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caution: Option<String>,
    pub goal_reached: bool,
    pub hops_completed: usize,
    pub routes: Vec<RouteSummary>,
}

/// Serialisable view of one route with resolved names.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteSummary {
    pub rank: usize,
    pub stations: Vec<StopSummary>,
    pub hops: Vec<HopSummary>,
    pub start_cr: i64,
    pub gain_cr: i64,
    pub final_cr: i64,
    pub score: f64,
    pub jumps: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StopSummary {
    pub id: StationId,
    pub name: String,
    pub system: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HopSummary {
    pub from: String,
    pub to: String,
    pub jumps: Vec<String>,
    pub units: u32,
    pub cost_cr: i64,
    pub gain_cr: i64,
    pub trades: Vec<TradeSummary>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TradeSummary {
    pub item_id: ItemId,
    pub item: String,
    pub quantity: u32,
    pub cost_cr: i64,
    pub gain_cr: i64,
    pub src_age_days: f64,
    pub dst_age_days: f64,
}

impl RunSummary {
    /// Summarise the displayed routes of `result`.
    pub fn from_result(db: &TradeDb, result: &RunResult) -> Self {
        Self {
            caution: (!result.caution.is_empty()).then(|| result.caution.clone()),
            goal_reached: result.goal_reached,
            hops_completed: result.hops_completed,
            routes: result
                .displayed()
                .iter()
                .enumerate()
                .map(|(index, route)| RouteSummary::from_route(db, index + 1, route))
                .collect(),
        }
    }
}

impl RouteSummary {
    pub fn from_route(db: &TradeDb, rank: usize, route: &Route) -> Self {
        let stations = route
            .stations()
            .iter()
            .map(|id| StopSummary {
                id: *id,
                name: db
                    .station(*id)
                    .map(|s| s.name.clone())
                    .unwrap_or_default(),
                system: db
                    .station(*id)
                    .map(|s| db.system_name(s.system_id).to_string())
                    .unwrap_or_default(),
            })
            .collect();

        let hops = route
            .hops()
            .iter()
            .enumerate()
            .map(|(index, hop)| HopSummary {
                from: db.station_name(route.stations()[index]),
                to: db.station_name(route.stations()[index + 1]),
                jumps: route.jumps()[index]
                    .iter()
                    .map(|system| db.system_name(*system).to_string())
                    .collect(),
                units: hop.units(),
                cost_cr: hop.cost_cr(),
                gain_cr: hop.gain_cr,
                trades: hop
                    .trades
                    .iter()
                    .map(|trade| TradeSummary::from_option(db, trade))
                    .collect(),
            })
            .collect();

        Self {
            rank,
            stations,
            hops,
            start_cr: route.start_cr(),
            gain_cr: route.gain_cr(),
            final_cr: route.available_cr(),
            score: route.score(),
            jumps: route.total_jumps(),
        }
    }
}

impl TradeSummary {
    fn from_option(db: &TradeDb, trade: &TradeOption) -> Self {
        Self {
            item_id: trade.item_id,
            item: db.item_name(trade.item_id).to_string(),
            quantity: trade.quantity,
            cost_cr: trade.cost_cr,
            gain_cr: trade.gain_cr,
            src_age_days: trade.src_age_days,
            dst_age_days: trade.dst_age_days,
        }
    }
}
