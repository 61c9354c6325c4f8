mod common;
mod logic;

use anyhow::{Context, Result, ensure};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::{self, File};
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use common::{JsonFileStore, find_preset, list_presets, parse_duration_ms};
use logic::{StrategyReport, reports};
use stintwise_engine::constants::{DEFAULT_MAX_STOPS, DEFAULT_MIN_STOPS};
use stintwise_engine::numbers::u64_to_f64;
use stintwise_engine::{SimulationParams, StrategyPlanner};

/// Slot used inside a settings file.
const SETTINGS_SLOT: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Colored tables for a terminal
    Console,
    Json,
    Markdown,
    Csv,
}

#[derive(Debug, Parser)]
#[command(name = "stintwise", version)]
#[command(about = "Pit-stop strategy planner - simulates each stop count and ranks the fastest plans")]
struct Args {
    /// Start from a built-in race preset
    #[arg(long)]
    preset: Option<String>,

    /// List all built-in presets and exit
    #[arg(long)]
    list_presets: bool,

    /// JSON file with simulation parameters (replaces the preset's parameters)
    #[arg(long)]
    params: Option<PathBuf>,

    /// Race duration: milliseconds, M:SS.mmm or H:MM:SS.mmm
    #[arg(long, value_parser = parse_duration_arg)]
    race: Option<u64>,

    /// Baseline lap time: milliseconds or M:SS.mmm
    #[arg(long, value_parser = parse_duration_arg)]
    lap: Option<u64>,

    /// Pit window width, centered on half race
    #[arg(long, value_parser = parse_duration_arg)]
    window: Option<u64>,

    /// Lap time lost over 10 laps of one stint, in seconds
    #[arg(long)]
    degradation: Option<f64>,

    /// Time lost on a pit lap, in seconds
    #[arg(long)]
    pitstop: Option<f64>,

    /// Longest allowed stint
    #[arg(long, value_parser = parse_duration_arg)]
    max_stint: Option<u64>,

    /// Litres burned per lap; enables the fuel model
    #[arg(long)]
    fuel_per_lap: Option<f64>,

    /// Tank capacity in litres
    #[arg(long)]
    fuel_tank: Option<f64>,

    /// Safety margin carried on top of each stint, in laps
    #[arg(long)]
    extra_laps: Option<f64>,

    /// Fewest stops to simulate
    #[arg(long)]
    min_stops: Option<u32>,

    /// Most stops to simulate
    #[arg(long)]
    max_stops: Option<u32>,

    /// Rank (1-based) of the strategy to detail
    #[arg(long)]
    select: Option<usize>,

    /// Settings file restored before the run and saved after it
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Include the lap table of the selected strategy
    #[arg(long)]
    laps: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn parse_duration_arg(value: &str) -> Result<u64, String> {
    parse_duration_ms(value).map_err(|err| err.to_string())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_presets(&args)? {
        return Ok(());
    }

    if args.report == ReportFormat::Console {
        announce_banner();
    }

    let start_time = Instant::now();
    let planner = run_planner(&args)?;
    let report = StrategyReport::from_planner(&planner, args.preset.as_deref(), args.laps);
    write_reports(&args, &report)?;

    if args.verbose {
        eprintln!(
            "🕒 {} strategies ranked in {:?}",
            report.strategies.len(),
            start_time.elapsed()
        );
    }

    let (min_stops, max_stops) = planner.stop_range();
    if planner.params().is_complete() && min_stops <= max_stops && report.is_empty() {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_presets(args: &Args) -> Result<bool> {
    if !args.list_presets {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target, "Available presets:")?;
    for (key, description) in list_presets() {
        writeln!(output_target, "  {key:15} - {description}")?;
    }
    output_target.flush()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🏎️  Stintwise Strategy Planner".bright_cyan().bold());
    println!("{}", "==============================".cyan());
}

/// Preset or params file, before settings and flag overrides.
fn base_inputs(args: &Args) -> Result<(SimulationParams, u32, u32)> {
    let (mut params, min_stops, max_stops) = match args.preset.as_deref() {
        Some(name) => {
            let preset = find_preset(name)
                .with_context(|| format!("unknown preset: {name} (see --list-presets)"))?;
            (preset.params, preset.min_stops, preset.max_stops)
        }
        None => (
            SimulationParams::default(),
            DEFAULT_MIN_STOPS,
            DEFAULT_MAX_STOPS,
        ),
    };

    if let Some(path) = &args.params {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        params = SimulationParams::from_json(&raw)
            .with_context(|| format!("failed to parse {}", path.display()))?;
    }

    Ok((params, min_stops, max_stops))
}

fn apply_overrides(args: &Args, mut params: SimulationParams) -> SimulationParams {
    if let Some(race) = args.race {
        params.race_duration_ms = race;
    }
    if let Some(lap) = args.lap {
        params.lap_time_ms = lap;
    }
    if let Some(window) = args.window {
        params.window_duration_ms = Some(window);
    }
    if let Some(max_stint) = args.max_stint {
        params.stint_duration_secs = Some(u64_to_f64(max_stint) / 1000.0);
    }
    if args.degradation.is_some() {
        params.lap_degradation_secs = args.degradation;
    }
    if args.pitstop.is_some() {
        params.pitstop_secs = args.pitstop;
    }
    if args.fuel_per_lap.is_some() {
        params.fuel_per_lap = args.fuel_per_lap;
    }
    if args.fuel_tank.is_some() {
        params.fuel_tank = args.fuel_tank;
    }
    if args.extra_laps.is_some() {
        params.extra_laps = args.extra_laps;
    }
    params
}

/// Resolve inputs, run the search and persist the effective settings.
fn run_planner(args: &Args) -> Result<StrategyPlanner> {
    let (params, min_stops, max_stops) = base_inputs(args)?;
    let mut planner = StrategyPlanner::new(params, min_stops, max_stops);

    let store = args.settings.as_ref().map(JsonFileStore::new);
    if let Some(store) = &store
        && planner
            .restore_from(store, SETTINGS_SLOT, 0)
            .context("failed to restore settings")?
    {
        log::info!("restored settings from {}", store.path().display());
        if args.verbose {
            eprintln!("📂 Restored settings from {}", store.path().display());
        }
    }

    let params = apply_overrides(args, planner.params().clone());
    params.validate().context("invalid simulation parameters")?;
    let (stored_min, stored_max) = planner.stop_range();
    let min_stops = args.min_stops.unwrap_or(stored_min);
    let max_stops = args.max_stops.unwrap_or(stored_max);
    if min_stops > max_stops {
        log::warn!("stop range {min_stops}..={max_stops} is empty");
    }
    planner.set_params(params, 0);
    planner.set_stop_range(min_stops, max_stops, 0);
    planner.flush();

    if !planner.params().is_complete() {
        log::info!("race duration or lap time missing; nothing to rank");
    }

    if let Some(rank) = args.select {
        apply_selection(&mut planner, rank)?;
    }

    if let Some(store) = &store {
        planner
            .save_to(store, SETTINGS_SLOT)
            .context("failed to save settings")?;
    }

    Ok(planner)
}

fn apply_selection(planner: &mut StrategyPlanner, rank: usize) -> Result<()> {
    ensure!(rank >= 1, "--select takes a 1-based rank");
    if !planner.select(rank - 1) {
        log::warn!(
            "rank {rank} requested but only {} strategies are ranked",
            planner.board().len()
        );
    }
    Ok(())
}

fn write_reports(args: &Args, report: &StrategyReport) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report {
        ReportFormat::Json => reports::generate_json_report(&mut output_target, report)?,
        ReportFormat::Markdown => reports::generate_markdown_report(&mut output_target, report)?,
        ReportFormat::Csv => reports::generate_csv_report(&mut output_target, report)?,
        ReportFormat::Console => reports::generate_console_report(&mut output_target, report)?,
    }

    output_target.flush()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            Self::Stdout(w) => w.write(buf),
            Self::File(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}
