mod common;
mod logic;

use anyhow::{Context, Result};
use balloon_game::GameConfig;
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use common::scenario::{all_scenario_keys, get_scenario, list_scenarios};
use common::split_csv;
use logic::{
    GameTester, GameplayStrategy, LogicTester, PlayabilityAggregate, PlayabilityRecord,
    ScenarioResult, SeedInfo, aggregate_playability, resolve_seed_inputs,
    run_playability_analysis, validate_playability_targets,
};

#[derive(Debug, Parser)]
#[command(name = "balloon-tester", version = "0.1.0")]
#[command(about = "Automated headless QA for the balloon risk game")]
struct Args {
    /// Scenarios to run (comma-separated, or `all`)
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Only run scenarios whose scripted player is one of these (comma-separated, or `all`)
    #[arg(long, default_value = "all")]
    strategies: String,

    /// Seeds to run (comma-separated integers or share codes, or `all`)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of iterations per scenario and seed
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console", "csv"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Game configuration JSON; defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let config = load_config(args.config.as_deref())?;
    let scenarios = expand_scenarios(&args.scenarios);
    let strategies = resolve_strategies(&args.strategies)?;
    let seed_infos = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let logic_seeds: Vec<u64> = seed_infos.iter().map(|s| s.seed).collect();
    let game_tester = GameTester::new(config, args.verbose);

    let all_results =
        run_logic_scenarios(&args, &scenarios, &strategies, &logic_seeds, &game_tester);

    let (playability_records, playability_aggregates) =
        gather_playability(&args, &game_tester, &seed_infos)?;

    write_reports(
        &args,
        &all_results,
        playability_records.as_deref(),
        playability_aggregates.as_deref(),
        start_time,
    )?;

    if let Some(aggregates) = playability_aggregates.as_ref() {
        let record_slice = playability_records.as_deref().unwrap_or(&[]);
        validate_playability_targets(aggregates, record_slice)?;
    }

    if all_results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:25} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🎈 Balloon Automated Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config = GameConfig::from_json(&raw)
        .with_context(|| format!("invalid game configuration in {}", path.display()))?;
    log::info!(
        "loaded {} ({} balloons, {} tiers)",
        path.display(),
        config.balloon_count,
        config.tiers.len()
    );
    Ok(config)
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut scenarios = split_csv(scenarios_arg);
    if scenarios.iter().any(|s| s.eq_ignore_ascii_case("all")) {
        scenarios.retain(|s| !s.eq_ignore_ascii_case("all"));
        for key in all_scenario_keys() {
            if !scenarios.iter().any(|s| s == key) {
                scenarios.push(key.to_string());
            }
        }
    }
    scenarios
}

fn resolve_strategies(strategies_arg: &str) -> Result<Vec<GameplayStrategy>> {
    let tokens = split_csv(strategies_arg);
    if tokens.is_empty() || tokens.iter().any(|t| t.eq_ignore_ascii_case("all")) {
        return Ok(GameplayStrategy::ALL.to_vec());
    }
    tokens.iter().map(|t| t.parse()).collect()
}

fn run_logic_scenarios(
    args: &Args,
    scenarios: &[String],
    strategies: &[GameplayStrategy],
    logic_seeds: &[u64],
    game_tester: &GameTester,
) -> Vec<ScenarioResult> {
    println!("{}", "🧠 Running Logic Tests".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let logic_tester = LogicTester::new(game_tester.clone(), args.verbose);
    let mut results = Vec::new();

    for scenario_name in scenarios {
        let Some(scenario) = get_scenario(scenario_name) else {
            eprintln!("⚠️  Unknown scenario: {}", scenario_name.yellow());
            continue;
        };
        if !strategies.contains(&scenario.plan.strategy) {
            log::info!(
                "skipping {} ({} not selected)",
                scenario.name,
                scenario.plan.strategy
            );
            continue;
        }
        results.extend(logic_tester.run_scenario(&scenario, logic_seeds, args.iterations));
    }

    results
}

type PlayabilitySummary = (
    Option<Vec<PlayabilityRecord>>,
    Option<Vec<PlayabilityAggregate>>,
);

fn gather_playability(
    args: &Args,
    game_tester: &GameTester,
    seed_infos: &[SeedInfo],
) -> Result<PlayabilitySummary> {
    if !matches!(args.report.as_str(), "console" | "csv") {
        return Ok((None, None));
    }
    let records = run_playability_analysis(game_tester, seed_infos, args.iterations)?;
    let aggregates = aggregate_playability(&records);
    Ok((Some(records), Some(aggregates)))
}

fn write_reports(
    args: &Args,
    results: &[ScenarioResult],
    playability_records: Option<&[PlayabilityRecord]>,
    playability_aggregates: Option<&[PlayabilityAggregate]>,
    start_time: Instant,
) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => {
            if results.is_empty() {
                writeln!(&mut output_target, "[]")?;
            } else {
                logic::reports::generate_json_report(&mut output_target, results)?;
            }
        }
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Balloon Logic Test Results\n\n_No scenarios executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, results)?;
            }
        }
        "csv" => {
            if let Some(records) = playability_records {
                logic::reports::generate_csv_report(&mut output_target, records)?;
            } else {
                writeln!(&mut output_target, "[]")?;
            }
        }
        _ => {
            let duration = start_time.elapsed();
            if results.is_empty() {
                writeln!(&mut output_target, "No logic scenarios executed.")?;
            } else {
                logic::reports::generate_console_report(
                    &mut output_target,
                    results,
                    playability_aggregates.unwrap_or(&[]),
                    duration,
                )?;
            }
        }
    }

    if matches!(args.report.as_str(), "console" | "markdown") {
        let duration = start_time.elapsed();
        writeln!(&mut output_target)?;
        writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
    }
    output_target.flush_inner()?;
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

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn base_args() -> Args {
        Args {
            scenarios: "smoke".to_string(),
            list_scenarios: false,
            strategies: "all".to_string(),
            seeds: "1337".to_string(),
            iterations: 1,
            report: "json".to_string(),
            verbose: false,
            output: None,
            config: None,
        }
    }

    fn temp_path(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "balloon-tester-{label}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ))
    }

    #[test]
    fn expand_scenarios_replaces_all_without_duplicates() {
        let scenarios = expand_scenarios("smoke,all");
        assert_eq!(scenarios.first().map(String::as_str), Some("smoke"));
        assert_eq!(scenarios.len(), all_scenario_keys().count());
        assert!(!scenarios.iter().any(|s| s == "all"));
    }

    #[test]
    fn resolve_strategies_filters_and_rejects_unknowns() {
        assert_eq!(resolve_strategies("all").unwrap().len(), GameplayStrategy::ALL.len());
        assert_eq!(
            resolve_strategies("oracle, greedy").unwrap(),
            vec![GameplayStrategy::Oracle, GameplayStrategy::Greedy]
        );
        assert!(resolve_strategies("reckless").is_err());
    }

    #[test]
    fn strategy_filter_skips_scenarios() {
        let args = base_args();
        let tester = GameTester::new(GameConfig::default(), false);
        let scenarios = vec!["oracle-never-pops".to_string(), "greedy".to_string()];
        let results = run_logic_scenarios(
            &args,
            &scenarios,
            &[GameplayStrategy::Oracle],
            &[7],
            &tester,
        );
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].strategy, "Oracle");
        assert!(results[0].passed, "{:?}", results[0].failures);
    }

    #[test]
    fn every_scenario_passes_on_default_config() {
        let args = base_args();
        let tester = GameTester::new(GameConfig::default(), false);
        let scenarios = expand_scenarios("all");
        let results = run_logic_scenarios(
            &args,
            &scenarios,
            &GameplayStrategy::ALL,
            &[1, 1337],
            &tester,
        );
        assert_eq!(results.len(), scenarios.len() * 2);
        for result in &results {
            assert!(result.passed, "{}: {:?}", result.scenario_name, result.failures);
        }
    }

    #[test]
    fn load_config_reads_json_and_rejects_invalid_files() {
        let path = temp_path("config");
        fs::write(&path, r#"{"balloon_count": 9, "points_per_pump": 2}"#).unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.balloon_count, 9);
        assert_eq!(config.points_per_pump, 2);

        fs::write(&path, r#"{"tiers": []}"#).unwrap();
        assert!(load_config(Some(&path)).is_err());
        fs::remove_file(&path).ok();

        assert_eq!(load_config(None).unwrap(), GameConfig::default());
    }

    #[test]
    fn write_reports_renders_json_to_file() {
        let path = temp_path("report");
        let mut args = base_args();
        args.output = Some(path.clone());
        let tester = GameTester::new(GameConfig::default(), false);
        let results = run_logic_scenarios(
            &args,
            &["smoke".to_string()],
            &GameplayStrategy::ALL,
            &[3],
            &tester,
        );
        write_reports(&args, &results, None, None, Instant::now()).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let parsed: Vec<ScenarioResult> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].scenario_name, "Smoke Test");
        fs::remove_file(&path).ok();
    }

    #[test]
    fn write_reports_renders_csv_from_playability() {
        let path = temp_path("csv");
        let mut args = base_args();
        args.report = "csv".to_string();
        args.output = Some(path.clone());
        let tester = GameTester::new(GameConfig::default(), false);
        let (records, aggregates) =
            gather_playability(&args, &tester, &[SeedInfo::from_numeric(9)]).unwrap();
        write_reports(
            &args,
            &[],
            records.as_deref(),
            aggregates.as_deref(),
            Instant::now(),
        )
        .unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("scenario,binding,strategy"));
        assert_eq!(text.lines().count(), 1 + records.map_or(0, |r| r.len()));
        fs::remove_file(&path).ok();
    }

    #[test]
    fn json_report_skips_playability() {
        let args = base_args();
        let tester = GameTester::new(GameConfig::default(), false);
        let (records, aggregates) =
            gather_playability(&args, &tester, &[SeedInfo::from_numeric(9)]).unwrap();
        assert!(records.is_none());
        assert!(aggregates.is_none());
    }
}
