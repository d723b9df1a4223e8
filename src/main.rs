use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand};
use parkfinder_core::prelude::*;
use parkfinder_core::tariff::TariffFile;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Parking search and fee quotes for St. Gallen
#[derive(Debug, Parser)]
#[command(name = "parkfinder", version)]
struct Cli {
    /// Log filter, e.g. `info` or `parkfinder_core=debug`
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    /// TOML tariff table replacing the built-in one
    #[arg(long, global = true)]
    tariffs: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Price a stay at one or more garages
    Quote(QuoteArgs),
    /// Find parking around a destination in a snapshot
    Search(SearchArgs),
    /// Print the category of zone descriptions
    Classify {
        #[arg(required = true)]
        descriptions: Vec<String>,
    },
}

#[derive(Debug, Args)]
struct StayArgs {
    /// Arrival as `YYYY-MM-DD HH:MM`
    #[arg(long, value_parser = parse_datetime)]
    arrival: Option<NaiveDateTime>,
    /// Departure as `YYYY-MM-DD HH:MM`
    #[arg(long, value_parser = parse_datetime, conflicts_with = "hours")]
    departure: Option<NaiveDateTime>,
    /// Stay length in hours instead of a departure
    #[arg(long)]
    hours: Option<f64>,
    #[arg(long, default_value = "ceil")]
    rounding: DurationRounding,
}

#[derive(Debug, Args)]
struct QuoteArgs {
    /// Garage name, repeatable
    #[arg(long = "facility", required = true)]
    facilities: Vec<String>,
    #[command(flatten)]
    stay: StayArgs,
}

#[derive(Debug, Args)]
struct SearchArgs {
    /// Garage snapshot, `.json` or `.csv`
    #[arg(long)]
    facilities: PathBuf,
    /// Zone snapshot, `.json` or `.csv`
    #[arg(long)]
    zones: Option<PathBuf>,
    /// Destination as `lon,lat`
    #[arg(long = "dest")]
    destination: Option<Coordinate>,
    /// Start of the walk as `lon,lat`
    #[arg(long)]
    origin: Option<Coordinate>,
    /// Search radius in meters
    #[arg(long, default_value_t = 500.0, value_parser = parse_radius)]
    radius: f64,
    #[arg(long)]
    free_only: bool,
    #[command(flatten)]
    stay: StayArgs,
    /// Print a GeoJSON FeatureCollection instead of the report
    #[arg(long)]
    geojson: bool,
    /// Draw zones the classifier could not place
    #[arg(long)]
    show_unclassified: bool,
}

/// Accepts `YYYY-MM-DD HH:MM` or `YYYY-MM-DDTHH:MM`; the time part may also
/// be `HHMM` or `HH.MM`.
fn parse_datetime(value: &str) -> Result<NaiveDateTime, String> {
    let (date, time) = value
        .trim()
        .split_once(|c: char| c == 'T' || c.is_whitespace())
        .ok_or_else(|| format!("expected '<date> <time>', got '{value}'"))?;
    parse_local_datetime(date, time).map_err(|e| e.to_string())
}

fn parse_radius(value: &str) -> Result<f64, String> {
    let radius: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("expected meters, got '{value}'"))?;
    if !radius.is_finite() || radius < 0.0 {
        return Err(format!("radius must be a non-negative number, got '{value}'"));
    }
    Ok(radius)
}

impl StayArgs {
    /// Arrival and billable hours, when a stay was given at all.
    fn resolve(&self) -> anyhow::Result<Option<(NaiveDateTime, Hours, Option<StayBreakdown>)>> {
        let Some(arrival) = self.arrival else {
            if self.departure.is_some() || self.hours.is_some() {
                bail!("--departure and --hours need --arrival");
            }
            return Ok(None);
        };
        match (self.departure, self.hours) {
            (Some(departure), _) => {
                let hours = stay_hours(arrival, departure, self.rounding)?;
                let breakdown = StayBreakdown::between(arrival, departure)?;
                Ok(Some((arrival, hours, Some(breakdown))))
            }
            (None, Some(hours)) => Ok(Some((arrival, hours, None))),
            (None, None) => bail!("--arrival needs --departure or --hours"),
        }
    }
}

#[derive(Debug, Serialize)]
struct QuoteLine {
    facility: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fee: Option<FeeResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct QuoteOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    stay: Option<StayBreakdown>,
    billed_hours: Hours,
    quotes: Vec<QuoteLine>,
}

fn load_tariffs(path: Option<&Path>) -> anyhow::Result<TariffTable> {
    let Some(path) = path else {
        return Ok(TariffTable::st_gallen());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading tariff file {}", path.display()))?;
    let file: TariffFile = toml::from_str(&text)
        .with_context(|| format!("parsing tariff file {}", path.display()))?;
    Ok(file.into_table()?)
}

fn quote(tariffs: &TariffTable, args: &QuoteArgs) -> anyhow::Result<QuoteOutput> {
    let Some((arrival, hours, stay)) = args.stay.resolve()? else {
        bail!("quote needs --arrival");
    };
    let quotes = tariffs
        .quote_all(&args.facilities, arrival, hours)
        .into_iter()
        .map(|(facility, result)| match result {
            Ok(fee) => QuoteLine {
                facility,
                fee: Some(fee),
                error: None,
            },
            Err(e) => QuoteLine {
                facility,
                fee: None,
                error: Some(e.to_string()),
            },
        })
        .collect();
    Ok(QuoteOutput {
        stay,
        billed_hours: hours,
        quotes,
    })
}

fn run_search(tariffs: &TariffTable, args: &SearchArgs) -> anyhow::Result<String> {
    let facilities = load_facilities(&args.facilities)?;
    let zones = match &args.zones {
        Some(path) => load_zones(path)?,
        None => Vec::new(),
    };
    let snapshot = Snapshot::new(facilities, zones);
    if snapshot.is_empty() {
        tracing::warn!("snapshot holds no garages and no zones");
    }

    let mut request = SearchRequest::around(args.destination, args.radius)
        .free_only(args.free_only)
        .from_origin(args.origin);
    if let Some((arrival, hours, _)) = args.stay.resolve()? {
        request = request.staying(arrival, hours);
    }

    let result = search(&snapshot, tariffs, &request);
    for notice in &result.report().notices {
        tracing::warn!(step = notice.step, code = notice.code, "{}", notice.message);
    }

    if args.geojson {
        let visibility = Visibility {
            unclassified: args.show_unclassified,
            ..Visibility::default()
        };
        Ok(result.to_geojson_string(&visibility)?)
    } else {
        Ok(serde_json::to_string_pretty(&result.report())?)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&cli.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let tariffs = load_tariffs(cli.tariffs.as_deref())?;
    let output = match &cli.command {
        Command::Quote(args) => serde_json::to_string_pretty(&quote(&tariffs, args)?)?,
        Command::Search(args) => run_search(&tariffs, args)?,
        Command::Classify { descriptions } => {
            let categories: Vec<_> = descriptions
                .iter()
                .map(|d| serde_json::json!({ "description": d, "category": classify(d) }))
                .collect();
            serde_json::to_string_pretty(&categories)?
        }
    };
    println!("{output}");
    Ok(())
}
