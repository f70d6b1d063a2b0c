//! billsplit - split a restaurant bill between adults and minors
//!
//! Builds a session from the bill total, tip and head count, applies the
//! edit commands given with `--apply` in order, and prints what everyone
//! owes.
//!
//! Module structure:
//! - `domain/` - Core types (BillState, Adult, Minor, Item)
//! - `services/` - Allocation engine, negative-amount guard, session operations
//! - `io/` - Command parsing, table and JSON output
//! - `infra/` - Infrastructure (Config, logging)
//!
//! Usage:
//!   billsplit --total 100 --tip 10 --adults 2 --minors 1
//!   billsplit --total 80 --tip 12 --tip-mode amount --apply "item adult-0 drink 6"

use anyhow::Context;
use billsplit::domain::TipMode;
use billsplit::infra::{logging, Config};
use billsplit::io::{apply_all, render_table, Command, Report};
use billsplit::services::{allocate, create_session};
use clap::Parser;
use rust_decimal::Decimal;
use tracing::{debug, info};

/// billsplit - per-person amounts for a shared bill
#[derive(Parser, Debug)]
#[command(name = "billsplit", version, about)]
struct Args {
    /// Path to TOML configuration file (falls back to CONFIG_FILE, then
    /// config/billsplit.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Bill total before tip
    #[arg(short, long)]
    total: Decimal,

    /// Tip, as a percentage or an amount depending on --tip-mode
    #[arg(long, default_value = "0")]
    tip: Decimal,

    /// How --tip is interpreted: percent or amount (default from config)
    #[arg(long)]
    tip_mode: Option<TipMode>,

    /// Number of adults (default from config)
    #[arg(short, long)]
    adults: Option<usize>,

    /// Number of minors (default from config)
    #[arg(short, long)]
    minors: Option<usize>,

    /// Edit command, may be repeated; applied in order
    ///
    /// - item <adult-id> <drink|food> <amount>
    /// - remove <adult-id> <index>
    /// - percent <minor-id> <25|50|75>
    /// - amount <minor-id> [amount]   (blank or 0 clears the override)
    /// - clear <minor-id>
    /// - rename <person-id> [name]
    #[arg(long = "apply", value_name = "COMMAND")]
    commands: Vec<Command>,

    /// Print a JSON report instead of the table
    #[arg(long)]
    json: bool,

    /// Include the allocation breakdown in the output
    #[arg(long)]
    breakdown: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::load(args.config.as_deref());

    logging::init(&config);
    info!(version = env!("CARGO_PKG_VERSION"), git_hash = env!("GIT_HASH"), "billsplit_starting");
    debug!(
        config_file = %config.config_file(),
        currency_symbol = %config.currency_symbol(),
        default_tip_mode = %config.default_tip_mode().as_str(),
        "config_loaded"
    );

    let tip_mode = args.tip_mode.unwrap_or(config.default_tip_mode());
    let adults = args.adults.unwrap_or(config.default_adults());
    let minors = args.minors.unwrap_or(config.default_minors());

    let mut state = create_session(args.total, args.tip, tip_mode, adults, minors)
        .context("Could not start a session")?;

    let rejections = apply_all(&mut state, &args.commands)
        .context("Edit command referenced a person or item that does not exist")?;

    let allocation = allocate(&state).context("Could not allocate the bill")?;
    let show_breakdown = args.breakdown || config.show_breakdown();

    if args.json {
        let report = Report::build(&state, &allocation, &rejections, show_breakdown);
        println!("{}", report.to_json().context("Failed to serialize report")?);
    } else {
        print!(
            "{}",
            render_table(&state, &allocation, config.currency_symbol(), show_breakdown)
        );
        for rejection in &rejections {
            eprintln!("Refused '{}': {}", rejection.command, rejection.message);
        }
    }

    info!(
        session_id = %state.session_id(),
        grand_total = %allocation.grand_total,
        allocated = %allocation.total_allocated(),
        "billsplit_done"
    );
    Ok(())
}
