//! Orbit deconfliction CLI.
//!
//! Reviews and rewrites request priorities in a target file: deconflict
//! by orbit, break priority ties, boost special targets, and report
//! per-orbit counts. The output is NOT a substitute for reviewing the
//! file yourself.

mod io;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use orbit_deconflict_core_rs::special::{
    apply_special_priorities, parse_special_priorities, DEFAULT_BASE_PRIORITY,
};
use orbit_deconflict_core_rs::{
    format_report, orbit_count, parse_requests, rewrite_priorities, DeconflictConfig,
    Deconflictor, Document, FieldNames, HalfWidthSchedule, Request, ResetMap,
};

#[derive(Parser)]
#[command(name = "orbit-deconflict")]
#[command(about = "Deconflict and review observation priorities by orbit")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON configuration file (column names apply to every command)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Report additional information (repeat for more)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Keep at most N observations per orbit, negating the rest.
    Prioritize {
        /// Input document (JSON)
        in_file: PathBuf,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Number of observations to keep in an orbit
        #[arg(long)]
        per_orbit: Option<usize>,
        /// Latitude half-width excluded around every kept observation
        #[arg(long, conflicts_with = "schedule")]
        latitude_exclude: Option<f64>,
        /// Priority-dependent half-widths as "threshold:width,..."
        #[arg(long)]
        schedule: Option<String>,
        /// Keep polar observations with many alternates at this priority
        #[arg(long)]
        high_altitude_override: Option<i64>,
        /// Neighbour roll angle above which a low-roll observation is kept
        #[arg(long)]
        high_roll_threshold: Option<f64>,
        /// Give up after this many linked-pair restarts
        #[arg(long)]
        max_passes: Option<usize>,
        /// Perform the rearranging but do not write out results
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Give records with identical priorities unique ones by latitude.
    Rewrite {
        /// Input document (JSON)
        in_file: PathBuf,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Comma-delimited "old:new" pairs making a priority group start elsewhere
        #[arg(short, long)]
        reset: Option<String>,
        /// Retain priorities <= 0 (omitted by default)
        #[arg(short, long)]
        keepzero: bool,
        /// Perform the rearranging but do not write out results
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Count positive and negative observations per orbit.
    Count {
        /// Input document (JSON)
        in_file: PathBuf,
    },

    /// Boost targets from special-target lists.
    Special {
        /// Input document (JSON)
        #[arg(short, long)]
        ptf: PathBuf,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Priority the special lists apply to
        #[arg(long, default_value_t = DEFAULT_BASE_PRIORITY)]
        base: i64,
        /// Files with "id,priority" lines
        #[arg(required = true)]
        lists: Vec<PathBuf>,
    },
}

fn parse_schedule(spec: &str) -> Result<HalfWidthSchedule> {
    let mut pairs = Vec::new();
    for element in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (threshold, width) = element
            .split_once(':')
            .with_context(|| format!("schedule entry '{}' is not 'threshold:width'", element))?;
        pairs.push((threshold.trim().parse::<i64>()?, width.trim().parse::<f64>()?));
    }
    Ok(HalfWidthSchedule::new(pairs)?)
}

fn load_config(path: Option<&Path>) -> Result<DeconflictConfig> {
    match path {
        Some(path) => {
            let text =
                fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            DeconflictConfig::from_json_str(&text)
                .with_context(|| format!("parsing {}", path.display()))
        }
        None => Ok(DeconflictConfig::default()),
    }
}

fn load_requests(in_file: &Path, fields: &FieldNames) -> Result<(Document, Vec<Request>)> {
    let mut document = io::read_document(in_file)?;
    let records = std::mem::take(&mut document.records);
    let requests = parse_requests(records, fields)?;
    Ok((document, requests))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Prioritize {
            in_file,
            output,
            per_orbit,
            latitude_exclude,
            schedule,
            high_altitude_override,
            high_roll_threshold,
            max_passes,
            dry_run,
        } => {
            if let Some(cap) = per_orbit {
                config.selection.per_cycle_cap = cap;
            }
            if let Some(width) = latitude_exclude {
                config.selection.half_width_schedule = HalfWidthSchedule::uniform(width)?;
            }
            if let Some(spec) = schedule {
                config.selection.half_width_schedule = parse_schedule(&spec)?;
            }
            if high_altitude_override.is_some() {
                config.selection.high_altitude_override = high_altitude_override;
            }
            if high_roll_threshold.is_some() {
                config.selection.high_roll_threshold = high_roll_threshold;
            }
            if let Some(passes) = max_passes {
                config.max_passes = passes;
            }

            let fields = config.fields.clone();
            let deconflictor = Deconflictor::new(config)?;
            let document = io::read_document(&in_file)?;
            let outcome = deconflictor.run(document.records.clone())?;

            info!(
                passes = outcome.passes,
                kept = outcome.kept_count(),
                rejected = outcome.rejected_count(),
                overrides = outcome.events.events_of_type("HighAltitudeOverride").len()
                    + outcome.events.events_of_type("HighRollOverride").len(),
                "Prioritized by orbit"
            );

            if !dry_run {
                let records = outcome.into_records(&fields);
                io::write_document(&document.with_records(records), output.as_deref())?;
            }
        }

        Commands::Rewrite {
            in_file,
            output,
            reset,
            keepzero,
            dry_run,
        } => {
            let fields = config.fields;
            let reset = match reset {
                Some(spec) => ResetMap::parse(&spec)?,
                None => ResetMap::new(),
            };
            let (document, requests) = load_requests(&in_file, &fields)?;
            let mut rewritten = rewrite_priorities(requests, &reset, keepzero)?;
            rewritten.sort_by(|a, b| b.priority().cmp(&a.priority()));

            if !dry_run {
                let records = rewritten.into_iter().map(|r| r.into_record(&fields)).collect();
                io::write_document(&document.with_records(records), output.as_deref())?;
            }
        }

        Commands::Count { in_file } => {
            let (_, requests) = load_requests(&in_file, &config.fields)?;
            println!("{}", format_report(&orbit_count(&requests)).join("\n"));
        }

        Commands::Special {
            ptf,
            output,
            base,
            lists,
        } => {
            let mut specials = std::collections::BTreeMap::new();
            for path in &lists {
                let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
                specials.extend(parse_special_priorities(&text)?);
            }

            let fields = config.fields;
            let (document, requests) = load_requests(&ptf, &fields)?;
            let updated = apply_special_priorities(requests, base, &specials)?;
            let records = updated.into_iter().map(|r| r.into_record(&fields)).collect();
            io::write_document(&document.with_records(records), output.as_deref())?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_flag_is_accepted_by_every_command() {
        for args in [
            vec!["orbit-deconflict", "count", "in.json", "--config", "fields.json"],
            vec!["orbit-deconflict", "--config", "fields.json", "rewrite", "in.json"],
            vec!["orbit-deconflict", "special", "-p", "in.json", "a.csv", "--config", "fields.json"],
            vec!["orbit-deconflict", "prioritize", "in.json", "--config", "fields.json"],
        ] {
            let cli = Cli::try_parse_from(args.clone()).unwrap();
            assert_eq!(cli.config, Some(PathBuf::from("fields.json")), "{:?}", args);
        }
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.fields, FieldNames::default());
    }

    #[test]
    fn config_file_column_names_reach_the_parser() {
        let path = std::env::temp_dir().join(format!("orbit-fields-{}.json", std::process::id()));
        fs::write(&path, r#"{"fields": {"priority": "Rank"}}"#).unwrap();

        let config = load_config(Some(&path)).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(config.fields.priority, "Rank");
        assert_eq!(config.fields.id, FieldNames::default().id);
    }
}
