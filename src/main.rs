use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use night_audit_engine::db::{self, AuditRecord, RateSuggestionRecord};
use night_audit_engine::forecast::window_start;
use night_audit_engine::insights::format_money;
use night_audit_engine::{
    apply_header_aliases, detect_layout, forecast, ingest, readiness, room_type_distribution,
    summarize, summarize_history, AdrInsight, AuditLayout, Config, CustomMapping,
    DateDisplayFormat, DayType, IngestContext, LayoutKind, OccupancyBand, RateEngine, RateForecast,
    RateSuggestionInput, RawAuditTable, RoomInventory,
};

/// Night audit ingestion and rate suggestions
#[derive(Parser, Debug)]
#[command(name = "night-audit", version, about)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize a night audit export and print the nightly summary
    Ingest(IngestArgs),
    /// Suggest tonight's rate from inventory and market inputs
    Suggest(SuggestArgs),
    /// Project the next 3 nights from saved suggestions
    Forecast,
    /// 30-day performance summary and annual revenue projection
    Optimize {
        /// Rooms used for the revenue projection
        #[arg(long, default_value_t = 60)]
        rooms: u32,
        /// Occupancy percent for the projection (defaults to the 30-day average)
        #[arg(long)]
        occupancy: Option<f64>,
    },
    /// Show the most recent saved audits
    History {
        #[arg(long, default_value_t = 7)]
        limit: usize,
    },
}

#[derive(Args, Debug)]
struct IngestArgs {
    /// CSV export to ingest
    file: PathBuf,

    /// standard, marriott, hilton, custom or auto
    #[arg(long, default_value = "auto")]
    layout: String,

    /// Night being audited (defaults to today)
    #[arg(long)]
    date: Option<NaiveDate>,

    // Custom layout mapping
    #[arg(long)]
    room_type: Option<String>,
    #[arg(long)]
    occupied: Option<String>,
    #[arg(long)]
    rate: Option<String>,
    #[arg(long)]
    check_in: Option<String>,
    #[arg(long)]
    check_out: Option<String>,
    /// Extra source columns to carry through (repeatable)
    #[arg(long = "extra")]
    extra_columns: Vec<String>,
    /// original-timestamp, YYYY-MM-DD, DD-MM-YYYY or MM-DD-YYYY
    #[arg(long)]
    date_format: Option<String>,

    /// Print the normalized rows
    #[arg(long)]
    show_rows: bool,

    /// Save the summary to the history database
    #[arg(long)]
    save: bool,
}

#[derive(Args, Debug)]
struct SuggestArgs {
    #[arg(long)]
    competitor_rate: f64,
    #[arg(long, default_value_t = 0)]
    total_rooms: u32,
    #[arg(long, default_value_t = 0)]
    out_of_order: u32,
    #[arg(long, default_value_t = 0)]
    dirty: u32,
    #[arg(long, default_value_t = 0)]
    occupied: u32,
    /// Weekday or Weekend (defaults to today's day of week)
    #[arg(long)]
    day_type: Option<DayType>,
    #[arg(long)]
    event: bool,
    #[arg(long)]
    holiday: bool,

    /// Save the suggestion to the rate history
    #[arg(long)]
    save: bool,
}

fn main() -> Result<()> {
    // Default: INFO, use RUST_LOG=debug for unit/layout decisions
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Ingest(args) => run_ingest(&config, args),
        Command::Suggest(args) => run_suggest(&config, args),
        Command::Forecast => run_forecast(&config),
        Command::Optimize { rooms, occupancy } => run_optimize(&config, rooms, occupancy),
        Command::History { limit } => run_history(&config, limit),
    }
}

fn resolve_layout(args: &IngestArgs, table: &mut RawAuditTable) -> Result<AuditLayout> {
    let kind = if args.layout.eq_ignore_ascii_case("auto") {
        let renamed = apply_header_aliases(table);
        for (from, to) in &renamed {
            info!("renamed column '{}' to '{}'", from, to);
        }
        match detect_layout(table) {
            Some(kind) => kind,
            None => {
                let missing = readiness(table);
                bail!(
                    "could not detect the layout (missing: {}); pass --layout custom with a column mapping",
                    missing.join(", ")
                );
            }
        }
    } else {
        args.layout.parse::<LayoutKind>().map_err(anyhow::Error::msg)?
    };

    let layout = match kind {
        LayoutKind::Standard => AuditLayout::Standard,
        LayoutKind::Marriott => AuditLayout::Marriott,
        LayoutKind::Hilton => AuditLayout::Hilton,
        LayoutKind::Custom => {
            let (Some(room_type), Some(rate), Some(check_in), Some(check_out)) =
                (&args.room_type, &args.rate, &args.check_in, &args.check_out)
            else {
                bail!("custom layout needs --room-type, --rate, --check-in and --check-out");
            };

            let extras: Vec<&str> = args.extra_columns.iter().map(|c| c.as_str()).collect();
            let mut mapping = CustomMapping::new(room_type, rate, check_in, check_out)
                .with_extra_columns(&extras);
            if let Some(occupied) = &args.occupied {
                mapping = mapping.with_occupied(occupied);
            }
            if let Some(format) = &args.date_format {
                mapping = mapping.with_date_format(
                    format.parse::<DateDisplayFormat>().map_err(anyhow::Error::msg)?,
                );
            }
            AuditLayout::Custom(mapping)
        }
    };

    Ok(layout)
}

fn run_ingest(config: &Config, args: IngestArgs) -> Result<()> {
    let mut table = RawAuditTable::from_csv_path(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;
    info!("loaded {} rows from {}", table.len(), args.file.display());

    let layout = resolve_layout(&args, &mut table)?;
    let today = args.date.unwrap_or_else(|| Local::now().date_naive());
    let result = ingest(&table, &layout, &IngestContext::new(today))?;

    let symbol = config.currency_symbol();
    let summary = summarize(&result.records, symbol);

    println!("🏨 Night Audit - {} ({})", config.property.hotel_name, today);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("   Layout:         {}", layout.kind().name());
    println!(
        "   Date units:     check-in {}, check-out {}",
        result.check_in_unit.name(),
        result.check_out_unit.name()
    );
    if result.occupancy_inferred {
        println!("   Occupancy:      inferred from stay dates");
    }
    println!("   Total Rooms:    {}", summary.total_rooms);
    println!("   Occupied:       {}", summary.occupied_rooms);
    println!("   Vacant:         {}", summary.vacant_rooms);
    println!("   Total Revenue:  {}", format_money(symbol, summary.total_revenue));
    println!("   Average Rate:   {}", format_money(symbol, summary.average_rate));
    println!("   ADR:            {}", format_money(symbol, summary.adr));
    println!("   Occupancy:      {}%", summary.occupancy_pct);

    if summary.has_no_occupancy() {
        warn!("no occupied rooms found in this audit; ADR and revenue are 0");
    }

    println!("\n📊 Room Type Summary");
    for (row, (_, share)) in summary
        .room_type_breakdown
        .iter()
        .zip(room_type_distribution(&summary))
    {
        println!(
            "   {:<20} {:>3} rooms ({:>5.1}%)  {:>3} occupied  avg {}",
            row.room_type,
            row.total,
            share,
            row.occupied,
            format_money(symbol, row.avg_rate)
        );
    }

    println!("\n💡 {}", OccupancyBand::from_pct(summary.occupancy_pct).advice(summary.occupancy_pct));
    println!("💵 {}", AdrInsight::evaluate(summary.adr, symbol).message);

    if !result.issues.is_empty() {
        println!("\n⚠️  {} cell(s) could not be parsed (see log)", result.issues.len());
    }

    if args.show_rows {
        println!("\n{}", result.display_headers().join(" | "));
        for row in result.display_rows() {
            println!("{}", row.join(" | "));
        }
    }

    if args.save {
        let extra_fields = if result.normalized.extra_columns.is_empty() {
            None
        } else {
            let extras: Vec<_> = result.records.iter().map(|r| &r.extra_fields).collect();
            Some(serde_json::to_string(&extras)?)
        };

        let conn = db::open_database(config.database_path())?;
        let record = AuditRecord {
            user_id: config.user_id().to_string(),
            date: today,
            hotel_name: config.property.hotel_name.clone(),
            summary,
            extra_fields,
        };
        if db::insert_audit_summary(&conn, &record)? {
            println!("\n✓ Night audit saved");
        } else {
            println!("\n✓ This audit was already saved");
        }
    }

    Ok(())
}

fn run_suggest(config: &Config, args: SuggestArgs) -> Result<()> {
    let inventory = RoomInventory {
        total_rooms: args.total_rooms,
        out_of_order: args.out_of_order,
        dirty_rooms: args.dirty,
        occupied_rooms: args.occupied,
    };
    let now = Local::now().naive_local();
    let day_type = args.day_type.unwrap_or_else(|| DayType::from_date(now.date()));

    let input = RateSuggestionInput::from_inventory(&inventory, args.competitor_rate, day_type)
        .with_event(args.event)
        .with_holiday(args.holiday);
    let engine = RateEngine::with_rules(config.pricing.clone());
    let result = engine.suggest(&input);
    let symbol = config.currency_symbol();

    println!("💡 Suggested Rate: {} {:.2}", symbol, result.suggested_rate);
    println!("   {} {:.2} for 1 Room (1 Person)", symbol, result.tiers.single);
    println!("   {} {:.2} for 1 Room (2 Persons)", symbol, result.tiers.double);
    println!("   {} {:.2} for Family Room", symbol, result.tiers.family);

    println!("\n📌 Reasons:");
    for reason in result.reasons(symbol) {
        println!("   - {}", reason);
    }

    println!(
        "\n🎯 {} Confidence ({}%)",
        result.confidence_band.label(),
        result.confidence_score
    );
    for reason in &result.confidence_reasons {
        println!("   ✓ {}", reason);
    }

    if args.save {
        let conn = db::open_database(config.database_path())?;
        let record = RateSuggestionRecord {
            user_id: config.user_id().to_string(),
            timestamp: now,
            occupancy_pct: inventory.occupancy_pct(),
            competitor_rate: args.competitor_rate,
            event_today: args.event,
            day_type,
            currency: symbol.to_string(),
            suggested_rate: result.suggested_rate,
            hotel_name: config.property.hotel_name.clone(),
        };
        let id = db::insert_rate_suggestion(&conn, &record)?;
        println!("\n✓ Suggestion saved ({})", id);
    }

    Ok(())
}

fn run_forecast(config: &Config) -> Result<()> {
    let conn = db::open_database(config.database_path())?;
    let now = Local::now().naive_local();
    let history = db::get_rate_history(&conn, config.user_id(), window_start(now, 14))?;
    let symbol = config.currency_symbol();

    match forecast(&history, now) {
        RateForecast::InsufficientData => {
            println!("Not enough rate history to forecast. Save a few suggestions first.");
        }
        RateForecast::Projected(report) => {
            println!("🪄 3-Day Rate Forecast");
            println!(
                "   7-Day Avg: {} {:.2} | 14-Day Avg: {} {:.2} | Trend: {:?} | Confidence: {}",
                symbol,
                report.avg_7,
                symbol,
                report.avg_14,
                report.trend,
                report.confidence.label()
            );
            for point in &report.points {
                println!(
                    "   {} → {} {:.2}",
                    point.date.format("%a, %b %d"),
                    symbol,
                    point.projected_rate
                );
            }
        }
    }

    Ok(())
}

fn run_optimize(config: &Config, rooms: u32, occupancy: Option<f64>) -> Result<()> {
    let conn = db::open_database(config.database_path())?;
    let now = Local::now().naive_local();
    let history = db::get_rate_history(&conn, config.user_id(), window_start(now, 30))?;
    let symbol = config.currency_symbol();

    let Some(summary) = summarize_history(&history, now) else {
        println!("No rate history in the last 30 days.");
        return Ok(());
    };

    println!("📈 Rate Optimizer ({} suggestions)", summary.sample_count);
    println!("   Avg. Rate (30d): {} ({:?})", format_money(symbol, summary.avg_rate), summary.rate_trend);
    match summary.avg_occupancy_pct {
        Some(occ) => println!("   Avg. Occupancy:  {:.1}% ({:?})", occ, summary.occupancy_trend),
        None => println!("   Avg. Occupancy:  n/a"),
    }
    println!("   {}", summary.recommendation.message());

    let occ = occupancy.or(summary.avg_occupancy_pct).unwrap_or(0.0);
    let revenue = summary.projected_revenue(occ, rooms);
    println!(
        "\n📆 Projected Year Revenue: {}{:.0} (rooms {}, occupancy {:.0}%)",
        symbol, revenue, rooms, occ
    );

    Ok(())
}

fn run_history(config: &Config, limit: usize) -> Result<()> {
    let conn = db::open_database(config.database_path())?;
    let audits = db::get_recent_audits(&conn, config.user_id(), limit)?;

    if audits.is_empty() {
        println!("No saved audits yet.");
        return Ok(());
    }

    println!("🗓️  Recent Night Audits");
    for audit in &audits {
        println!(
            "   {}  occupancy {:>3}%  ADR {}",
            audit.date,
            audit.occupancy_pct,
            format_money(&audit.summary.currency_symbol, audit.adr)
        );
    }

    Ok(())
}
