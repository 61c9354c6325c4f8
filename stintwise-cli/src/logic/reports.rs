use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use colored::Colorize;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

use stintwise_engine::{
    FuelSummary, LapRecord, RankedStrategy, SimulationParams, StrategyPlanner,
};

use crate::common::{format_duration, format_gap};

/// One ranked strategy flattened for output. Lap numbers are 1-based.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyRow {
    pub rank: usize,
    pub selected: bool,
    pub stop_count: u32,
    pub laps: usize,
    pub race_time_ms: u64,
    pub race_time: String,
    pub gap_ms: u64,
    pub pit_laps: Vec<u32>,
    pub stint_laps: Vec<u32>,
    pub refuels: Vec<Decimal>,
    pub fuel: Option<FuelSummary>,
}

impl StrategyRow {
    fn new(rank: usize, selected: bool, strategy: &RankedStrategy, leader_ms: u64) -> Self {
        let candidate = &strategy.candidate;
        Self {
            rank,
            selected,
            stop_count: strategy.stop_count,
            laps: strategy.lap_count(),
            race_time_ms: strategy.race_time_ms(),
            race_time: format_duration(strategy.race_time_ms()),
            gap_ms: strategy.race_time_ms().saturating_sub(leader_ms),
            pit_laps: candidate.pit_stops.iter().map(|stop| stop.lap + 1).collect(),
            stint_laps: candidate.stint_lengths(),
            refuels: candidate
                .pit_stops
                .iter()
                .filter_map(|stop| stop.refuel)
                .collect(),
            fuel: candidate.fuel,
        }
    }
}

/// Everything a report format needs, captured once per run.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyReport {
    pub generated_at: String,
    pub preset: Option<String>,
    pub params: SimulationParams,
    pub min_stops: u32,
    pub max_stops: u32,
    pub selected: Option<usize>,
    pub strategies: Vec<StrategyRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lap_table: Option<Vec<LapRecord>>,
}

impl StrategyReport {
    pub fn from_planner(planner: &StrategyPlanner, preset: Option<&str>, laps: bool) -> Self {
        let board = planner.board();
        let selected = board.selected_index();
        let leader_ms = board
            .strategies()
            .first()
            .map_or(0, RankedStrategy::race_time_ms);
        let strategies = board
            .strategies()
            .iter()
            .enumerate()
            .map(|(index, strategy)| {
                StrategyRow::new(index + 1, selected == Some(index), strategy, leader_ms)
            })
            .collect();
        let (min_stops, max_stops) = planner.stop_range();
        Self {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            preset: preset.map(str::to_string),
            params: planner.params().clone(),
            min_stops,
            max_stops,
            selected,
            strategies,
            lap_table: laps
                .then(|| planner.selected().map(|s| s.candidate.laps.clone()))
                .flatten(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

fn join<T: ToString>(values: &[T], separator: &str) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}

fn describe_inputs(params: &SimulationParams) -> String {
    let mut parts = vec![
        format!("race {}", format_duration(params.race_duration_ms)),
        format!("lap {}", format_duration(params.lap_time_ms)),
    ];
    if let Some(window) = params.window_ms() {
        parts.push(format!("window {}", format_duration(window)));
    }
    if let Some(secs) = params.pitstop_secs {
        parts.push(format!("pit {secs} s"));
    }
    if let Some(secs) = params.lap_degradation_secs {
        parts.push(format!("degradation {secs} s/10 laps"));
    }
    if let Some(secs) = params.stint_duration_secs {
        parts.push(format!("max stint {secs} s"));
    }
    if let Some(model) = params.fuel_model() {
        let tank = model
            .tank
            .map_or_else(|| "unlimited".to_string(), |tank| format!("{tank} L"));
        parts.push(format!(
            "fuel {} L/lap, tank {tank}, extra {} laps",
            model.per_lap, model.extra_laps
        ));
    }
    parts.join(", ")
}

pub fn generate_console_report(out: &mut dyn Write, report: &StrategyReport) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "🏁 Strategy Board".bright_cyan().bold())?;
    writeln!(out, "{}", "=================".cyan())?;
    if let Some(preset) = &report.preset {
        writeln!(out, "Preset: {preset}")?;
    }
    writeln!(out, "Inputs: {}", describe_inputs(&report.params))?;
    writeln!(
        out,
        "Stops searched: {}..={}",
        report.min_stops, report.max_stops
    )?;
    writeln!(out)?;

    if report.is_empty() {
        writeln!(out, "{}", "No feasible strategy.".red())?;
        return Ok(());
    }

    writeln!(
        out,
        "{:>4}  {:>5}  {:>4}  {:>13}  {:>11}  Pit laps",
        "Rank", "Stops", "Laps", "Race time", "Gap"
    )?;
    for row in &report.strategies {
        let marker = if row.selected { "▶" } else { " " };
        let line = format!(
            "{marker}{:>3}  {:>5}  {:>4}  {:>13}  {:>11}  {}",
            row.rank,
            row.stop_count,
            row.laps,
            row.race_time,
            format_gap(row.gap_ms),
            join(&row.pit_laps, ", ")
        );
        if row.selected {
            writeln!(out, "{}", line.green().bold())?;
        } else {
            writeln!(out, "{line}")?;
        }
    }

    if let Some(row) = report.strategies.iter().find(|row| row.selected) {
        writeln!(out)?;
        writeln!(
            out,
            "{}",
            format!("⛽ Selected: {} stop(s)", row.stop_count)
                .bright_yellow()
                .bold()
        )?;
        writeln!(out, "   Stint lengths: {}", join(&row.stint_laps, " / "))?;
        if let Some(fuel) = row.fuel {
            writeln!(out, "   Starting fuel: {} L", fuel.initial_fuel)?;
            writeln!(out, "   Fuel used: {} L", fuel.fuel_used)?;
            writeln!(out, "   Required tank: {} L", fuel.required_tank)?;
            if !row.refuels.is_empty() {
                writeln!(out, "   Refuels: {} L", join(&row.refuels, " / "))?;
            }
        }
    }

    if let Some(laps) = &report.lap_table {
        writeln!(out)?;
        writeln!(
            out,
            "{:>4}  {:>5}  {:>10}  {:>7}  {:>13}  {:>9}  Notes",
            "Lap", "Stint", "Lap time", "Degr", "Race time", "Fuel"
        )?;
        for lap in laps {
            let fuel = lap
                .fuel_at_start
                .map_or_else(|| "-".to_string(), |level| level.to_string());
            let mut notes = Vec::new();
            if lap.pits {
                notes.push(match lap.refuel {
                    Some(refuel) => format!("PIT +{refuel} L"),
                    None => "PIT".to_string(),
                });
            }
            if !lap.window_open {
                notes.push("window closed".to_string());
            }
            let line = format!(
                "{:>4}  {:>5}  {:>10}  {:>7}  {:>13}  {:>9}  {}",
                lap.lap + 1,
                lap.stint + 1,
                format_duration(lap.lap_time_ms),
                format!("+{}", lap.degradation_ms),
                format_duration(lap.race_time_ms),
                fuel,
                notes.join(", ")
            );
            if lap.pits {
                writeln!(out, "{}", line.yellow())?;
            } else {
                writeln!(out, "{line}")?;
            }
        }
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, report: &StrategyReport) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, report: &StrategyReport) -> Result<()> {
    writeln!(out, "# Stintwise Strategy Report\n")?;
    writeln!(out, "Generated: {}\n", report.generated_at)?;
    if let Some(preset) = &report.preset {
        writeln!(out, "Preset: `{preset}`\n")?;
    }
    writeln!(out, "Inputs: {}\n", describe_inputs(&report.params))?;

    if report.is_empty() {
        writeln!(out, "_No feasible strategy._")?;
        return Ok(());
    }

    writeln!(out, "| Rank | Stops | Laps | Race time | Gap | Pit laps | Stints |")?;
    writeln!(out, "|------|-------|------|-----------|-----|----------|--------|")?;
    for row in &report.strategies {
        let rank = if row.selected {
            format!("**{}**", row.rank)
        } else {
            row.rank.to_string()
        };
        writeln!(
            out,
            "| {rank} | {} | {} | {} | {} | {} | {} |",
            row.stop_count,
            row.laps,
            row.race_time,
            format_gap(row.gap_ms),
            join(&row.pit_laps, ", "),
            join(&row.stint_laps, " / ")
        )?;
    }
    Ok(())
}

pub fn generate_csv_report(out: &mut dyn Write, report: &StrategyReport) -> Result<()> {
    writeln!(
        out,
        "rank,selected,stops,laps,race_time_ms,gap_ms,pit_laps,stint_laps,refuels"
    )?;
    for row in &report.strategies {
        writeln!(
            out,
            "{},{},{},{},{},{},{},{},{}",
            row.rank,
            row.selected,
            row.stop_count,
            row.laps,
            row.race_time_ms,
            row.gap_ms,
            join(&row.pit_laps, ";"),
            join(&row.stint_laps, ";"),
            join(&row.refuels, ";")
        )?;
    }

    if let Some(laps) = &report.lap_table {
        writeln!(out)?;
        writeln!(
            out,
            "lap,stint,stint_lap,lap_time_ms,degradation_ms,race_time_ms,pits,window_open,fuel_at_start,refuel"
        )?;
        for lap in laps {
            writeln!(
                out,
                "{},{},{},{},{},{},{},{},{},{}",
                lap.lap + 1,
                lap.stint + 1,
                lap.stint_lap + 1,
                lap.lap_time_ms,
                lap.degradation_ms,
                lap.race_time_ms,
                lap.pits,
                lap.window_open,
                lap.fuel_at_start.map(|v| v.to_string()).unwrap_or_default(),
                lap.refuel.map(|v| v.to_string()).unwrap_or_default()
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planner(params: SimulationParams, min: u32, max: u32) -> StrategyPlanner {
        let mut planner = StrategyPlanner::new(params, min, max);
        planner.flush();
        planner
    }

    fn fuelled_report(laps: bool) -> StrategyReport {
        let params = SimulationParams::new(3_600_000, 90_000)
            .with_pitstop(30.0)
            .with_fuel(2.5, Some(60.0), None);
        StrategyReport::from_planner(&planner(params, 1, 3), Some("custom"), laps)
    }

    #[test]
    fn rows_carry_rank_gap_and_one_based_laps() {
        let report = fuelled_report(false);
        assert_eq!(report.selected, Some(0));
        let leader = &report.strategies[0];
        assert!(leader.selected);
        assert_eq!(leader.rank, 1);
        assert_eq!(leader.gap_ms, 0);
        assert_eq!(leader.stop_count, 1);
        assert_eq!(leader.pit_laps, vec![21]);
        assert_eq!(leader.refuels.len(), 1);
        for row in &report.strategies[1..] {
            assert!(!row.selected);
            assert_eq!(row.laps, leader.laps);
            assert!(row.gap_ms > 0);
        }
        assert!(report.lap_table.is_none());
    }

    #[test]
    fn json_report_includes_lap_table_on_request() {
        let report = fuelled_report(true);
        let mut buffer = Vec::new();
        generate_json_report(&mut buffer, &report).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["preset"], "custom");
        assert_eq!(value["strategies"][0]["stop_count"], 1);
        assert_eq!(
            value["lap_table"].as_array().map(Vec::len),
            Some(report.strategies[0].laps)
        );
    }

    #[test]
    fn csv_report_lists_one_row_per_strategy() {
        let report = fuelled_report(false);
        let mut buffer = Vec::new();
        generate_csv_report(&mut buffer, &report).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("rank,selected,stops"));
        assert_eq!(lines.len(), report.strategies.len() + 1);
        assert!(lines[1].starts_with("1,true,1,"));
    }

    #[test]
    fn empty_board_is_reported_as_infeasible() {
        let params = SimulationParams::new(3_600_000, 90_000).with_fuel(3.0, Some(10.0), None);
        let report = StrategyReport::from_planner(&planner(params, 0, 3), None, true);
        assert!(report.is_empty());
        assert!(report.lap_table.is_none());

        let mut console = Vec::new();
        generate_console_report(&mut console, &report).unwrap();
        assert!(String::from_utf8_lossy(&console).contains("No feasible strategy"));

        let mut markdown = Vec::new();
        generate_markdown_report(&mut markdown, &report).unwrap();
        let markdown = String::from_utf8(markdown).unwrap();
        assert!(markdown.contains("# Stintwise Strategy Report"));
        assert!(markdown.contains("_No feasible strategy._"));
    }

    #[test]
    fn console_report_marks_selected_strategy_and_fuel() {
        let report = fuelled_report(true);
        let mut buffer = Vec::new();
        generate_console_report(&mut buffer, &report).unwrap();
        let text = String::from_utf8_lossy(&buffer);
        assert!(text.contains("Strategy Board"));
        assert!(text.contains("Selected: 1 stop(s)"));
        assert!(text.contains("Required tank"));
        assert!(text.contains("PIT +"));
    }
}
