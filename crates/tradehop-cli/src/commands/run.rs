//! `run` subcommand: search for the most profitable multi-hop trade runs.

use anyhow::Result;
use tracing::debug;

use tradehop_cli::output::{format_progress, render_run_text, OutputFormat, RouteDisplay};
use tradehop_cli::terminal::ColorPalette;
use tradehop_lib::{
    plan_run_with_progress, CreditStyle, DetailOptions, RunRequest, RunSummary,
};

use crate::commands::open_trade_db;
use crate::{GlobalOptions, RunArgs};

impl RunArgs {
    /// Convert CLI args to a library [`RunRequest`].
    pub fn to_request(&self) -> RunRequest {
        RunRequest {
            from: self.from.clone(),
            to: self.to.clone(),
            towards: self.towards.clone(),
            via: self.via.clone(),
            avoid: self.avoid.clone(),
            capacity: self.capacity,
            credits: self.credits,
            insurance: self.insurance,
            ly_per: self.ly_per,
            empty_ly_per: self.empty_ly,
            hops: self.hops,
            jumps_per: self.jumps_per,
            start_jumps: self.start_jumps,
            end_jumps: self.end_jumps,
            limit: self.limit,
            max_age_days: self.max_age_days,
            pad_size: self.pad_size.clone(),
            black_market: self.black_market,
            ls_penalty: self.ls_penalty,
            max_ls: self.max_ls,
            min_gain_per_ton: self.min_gain_per_ton,
            unique: self.unique,
            margin: self.margin,
            routes: self.routes,
            max_routes: self.max_routes,
            prune_score: self.prune_score,
            prune_hops: self.prune_hops,
        }
    }

    fn display(&self) -> RouteDisplay {
        RouteDisplay {
            summary: self.summary,
            detail: DetailOptions {
                verbosity: self.verbose,
                credits: if self.plain_credits {
                    CreditStyle::Plain
                } else {
                    CreditStyle::Grouped
                },
            },
        }
    }
}

/// Handle the run subcommand.
pub fn handle_run(global: &GlobalOptions, args: &RunArgs) -> Result<()> {
    let db = open_trade_db(global.db.as_deref())?;
    let request = args.to_request();
    debug!(?request, "run request");

    // Progress goes to stderr so JSON on stdout stays parseable.
    let result = plan_run_with_progress(&db, &request, |progress| {
        if args.progress {
            eprintln!("{}", format_progress(&progress));
        }
    })?;

    match global.format {
        OutputFormat::Json => {
            let summary = RunSummary::from_result(&db, &result);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Text => {
            print!(
                "{}",
                render_run_text(&db, &result, &args.display(), ColorPalette::detect())
            );
        }
    }
    Ok(())
}
