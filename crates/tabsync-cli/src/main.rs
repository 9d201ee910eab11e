//! TabSync runner
//!
//! Builds the run configuration once at process start, wires the
//! file-backed collaborators, executes one reconciliation pass, and
//! prints the automation outputs consumed by the downstream export and
//! notification step.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use clap::{value_parser, Arg, ArgAction, Command};
use tabsync_core::{IdentityMap, ReconciliationRun, RunConfig, RunReport, TrackingMode};
use tabsync_store::{JsonSnapshotSource, JsonStateFile, JsonWorkbook};

/// Environment variable holding the identity-mapping JSON, used when
/// `--config` is not given (CI secret injection)
const MAPPING_ENV: &str = "TABSYNC_IDENTITY_MAP";

fn cli() -> Command {
    Command::new("tabsync")
        .version(tabsync_core::VERSION)
        .about("Form-submission reconciliation runner")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("run")
                .about("Execute one reconciliation pass")
                .arg(
                    Arg::new("config")
                        .long("config")
                        .help("Path to the identity-mapping JSON (defaults to $TABSYNC_IDENTITY_MAP)"),
                )
                .arg(
                    Arg::new("snapshot")
                        .long("snapshot")
                        .default_value("snapshot.json")
                        .help("Path to the submission snapshot JSON"),
                )
                .arg(
                    Arg::new("workbook")
                        .long("workbook")
                        .default_value("workbook.json")
                        .help("Path to the destination workbook JSON"),
                )
                .arg(
                    Arg::new("state")
                        .long("state")
                        .default_value("processed_keys.json")
                        .help("Path to the run-state file"),
                )
                .arg(
                    Arg::new("timestamp-label")
                        .long("timestamp-label")
                        .default_value("Timestamp")
                        .help("Snapshot column holding the submission instant"),
                )
                .arg(
                    Arg::new("identity-label")
                        .long("identity-label")
                        .default_value("Email address")
                        .help("Snapshot column holding the submitter identity"),
                )
                .arg(
                    Arg::new("clear-rows")
                        .long("clear-rows")
                        .default_value("200")
                        .value_parser(value_parser!(u32))
                        .help("Value-column rows cleared per entity before writing"),
                )
                .arg(
                    Arg::new("now")
                        .long("now")
                        .help("Reference instant (RFC 3339); defaults to the current time"),
                )
                .arg(
                    Arg::new("track-entities")
                        .long("track-entities")
                        .action(ArgAction::SetTrue)
                        .help("Track change state by entity name instead of identity"),
                ),
        )
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("run", args)) => {
            if let Err(e) = run(args) {
                tracing::error!(error = %e, "run failed");
                std::process::exit(1);
            }
        }
        _ => unreachable!("subcommand required"),
    }
}

fn run(args: &clap::ArgMatches) -> Result<()> {
    let config = build_config(args)?;

    let snapshot = args.get_one::<String>("snapshot").expect("defaulted");
    let workbook = args.get_one::<String>("workbook").expect("defaulted");
    let state_path = args.get_one::<String>("state").expect("defaulted");
    let timestamp_label = args.get_one::<String>("timestamp-label").expect("defaulted");
    let identity_label = args.get_one::<String>("identity-label").expect("defaulted");

    let source = JsonSnapshotSource::new(snapshot, timestamp_label, identity_label);
    let mut destination = JsonWorkbook::new(workbook);
    let mut state = JsonStateFile::new(state_path);

    let reference = match args.get_one::<String>("now") {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| anyhow!("invalid --now value: {e}"))?,
        None => Utc::now(),
    };

    let run = ReconciliationRun::new(&config);
    let report = run.execute_at(&source, &mut destination, &mut state, reference)?;

    if report.is_empty_run() {
        tracing::info!("nothing to do this period");
    }
    for line in output_lines(&report)? {
        println!("{line}");
    }
    Ok(())
}

fn build_config(args: &clap::ArgMatches) -> Result<RunConfig> {
    let mapping_json = match args.get_one::<String>("config") {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading identity mapping from {path}"))?,
        None => std::env::var(MAPPING_ENV)
            .map_err(|_| anyhow!("no --config given and {MAPPING_ENV} is not set"))?,
    };
    let mapping = IdentityMap::from_json(&mapping_json)?;

    let tracking = if args.get_flag("track-entities") {
        TrackingMode::ByEntity
    } else {
        TrackingMode::ByIdentity
    };

    let config = RunConfig::new(mapping)?
        .with_tracking(tracking)
        .with_clear_rows(*args.get_one::<u32>("clear-rows").expect("defaulted"));
    Ok(config)
}

/// The three automation lines, each a JSON array even when empty
fn output_lines(report: &RunReport) -> Result<Vec<String>> {
    Ok(vec![
        format!(
            "UPDATED_ENTITIES_JSON={}",
            serde_json::to_string(&report.updated)?
        ),
        format!(
            "NEW_KEYS_JSON={}",
            serde_json::to_string(&report.delta_keys)?
        ),
        format!(
            "NEW_ENTITIES_JSON={}",
            serde_json::to_string(&report.delta_entities)?
        ),
    ])
}
