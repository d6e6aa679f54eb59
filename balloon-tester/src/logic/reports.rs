use anyhow::Result;
use balloon_game::Verdict;
use balloon_game::numbers::{one_decimal, usize_to_f64};
use chrono::Utc;
use colored::Colorize;
use std::io::Write;
use std::time::Duration;

use super::ScenarioResult;
use super::playability::{PlayabilityAggregate, PlayabilityRecord};

fn success_rate(results: &[ScenarioResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let passed = results.iter().filter(|r| r.passed).count();
    usize_to_f64(passed) / usize_to_f64(results.len()) * 100.0
}

pub fn generate_console_report<W: Write>(
    writer: &mut W,
    results: &[ScenarioResult],
    aggregates: &[PlayabilityAggregate],
    total_duration: Duration,
) -> Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", "📊 Logic Test Results Summary".bright_cyan().bold())?;
    writeln!(writer, "{}", "==============================".cyan())?;

    let total_tests = results.len();
    let passed_tests = results.iter().filter(|r| r.passed).count();
    let failed_tests = total_tests - passed_tests;

    writeln!(writer, "Total scenarios: {total_tests}")?;
    writeln!(writer, "Passed: {}", passed_tests.to_string().green())?;
    writeln!(writer, "Failed: {}", failed_tests.to_string().red())?;
    writeln!(writer, "Success rate: {:.1}%", success_rate(results))?;
    writeln!(writer, "Total time: {total_duration:?}")?;
    writeln!(writer)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };

        writeln!(
            writer,
            "{} {} [{} seed {}]",
            status,
            result.scenario_name.bold(),
            result.strategy,
            result.seed
        )?;
        writeln!(
            writer,
            "   Iterations: {}/{} successful",
            result.successful_iterations, result.iterations_run
        )?;
        writeln!(writer, "   Average time: {:?}", result.average_duration)?;

        if !result.failures.is_empty() {
            writeln!(writer, "   Failures:")?;
            for failure in &result.failures {
                writeln!(writer, "     • {}", failure.red())?;
            }
        }
        writeln!(writer)?;
    }

    if let (Some(fastest), Some(slowest)) = (
        results.iter().min_by_key(|r| r.average_duration),
        results.iter().max_by_key(|r| r.average_duration),
    ) {
        writeln!(writer, "{}", "⚡ Performance Summary".bright_yellow().bold())?;
        writeln!(writer, "{}", "=====================".yellow())?;
        writeln!(
            writer,
            "Fastest: {} ({:?})",
            fastest.scenario_name.green(),
            fastest.average_duration
        )?;
        writeln!(
            writer,
            "Slowest: {} ({:?})",
            slowest.scenario_name.yellow(),
            slowest.average_duration
        )?;
        writeln!(writer)?;
    }

    if !aggregates.is_empty() {
        writeln!(writer, "{}", "🎈 Playability Summary".bright_magenta().bold())?;
        writeln!(writer, "{}", "======================".magenta())?;
        writeln!(
            writer,
            "{:<24} {:>5} {:>9} {:>7} {:>9} {:>7} {:>8} {:>7}  Verdict",
            "Scenario", "Runs", "Score", "±", "Success", "Pumps", "Popped", "Adapt"
        )?;
        for aggregate in aggregates {
            let verdict = aggregate
                .dominant_verdict()
                .map_or("-", Verdict::label);
            writeln!(
                writer,
                "{:<24} {:>5} {:>9.1} {:>7.1} {:>8.1}% {:>7.2} {:>7.1}% {:>6.1}%  {verdict}",
                aggregate.scenario_name,
                aggregate.iterations,
                aggregate.mean_score,
                aggregate.std_score,
                aggregate.mean_success_pct,
                aggregate.mean_avg_pumps,
                aggregate.pop_rate * 100.0,
                aggregate.adaptation_rate * 100.0
            )?;
        }
    }
    Ok(())
}

pub fn generate_json_report<W: Write>(writer: &mut W, results: &[ScenarioResult]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, results)?;
    writeln!(writer)?;
    Ok(())
}

pub fn generate_markdown_report<W: Write>(
    writer: &mut W,
    results: &[ScenarioResult],
) -> Result<()> {
    writeln!(writer, "# Balloon Logic Test Results\n")?;
    writeln!(
        writer,
        "_Generated {}_\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )?;

    let total_tests = results.len();
    let passed_tests = results.iter().filter(|r| r.passed).count();

    writeln!(writer, "## Summary\n")?;
    writeln!(writer, "- **Total scenarios**: {total_tests}")?;
    writeln!(writer, "- **Passed**: {passed_tests}")?;
    writeln!(writer, "- **Failed**: {}", total_tests - passed_tests)?;
    writeln!(writer, "- **Success rate**: {:.1}%\n", success_rate(results))?;

    writeln!(writer, "## Detailed Results\n")?;

    for result in results {
        let status = if result.passed { "✅" } else { "❌" };

        writeln!(writer, "### {} {}\n", status, result.scenario_name)?;
        writeln!(writer, "- **Strategy**: {}", result.strategy)?;
        writeln!(writer, "- **Seed**: {}", result.seed)?;
        writeln!(
            writer,
            "- **Iterations**: {}/{} successful",
            result.successful_iterations, result.iterations_run
        )?;
        writeln!(writer, "- **Average time**: {:?}", result.average_duration)?;

        if !result.failures.is_empty() {
            writeln!(writer, "- **Failures**:")?;
            for failure in &result.failures {
                writeln!(writer, "  - {failure}")?;
            }
        }
        writeln!(writer)?;
    }
    Ok(())
}

fn optional(value: Option<f64>) -> String {
    value.map_or_else(String::new, one_decimal)
}

pub fn generate_csv_report<W: Write>(writer: &mut W, records: &[PlayabilityRecord]) -> Result<()> {
    writeln!(
        writer,
        "scenario,binding,strategy,seed_code,seed,final_score,balloons,cashed,popped,total_pumps,success_pct,avg_pumps,high_avg_pumps,low_avg_pumps,verdict"
    )?;
    for record in records {
        let m = &record.metrics;
        writeln!(
            writer,
            "{},{:?},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            record.scenario_name,
            record.binding,
            record.strategy,
            record.seed_code,
            record.seed_value,
            m.final_score,
            m.balloon_count,
            m.balloons_cashed,
            m.balloons_popped,
            m.total_pumps,
            one_decimal(m.success_rate_pct),
            one_decimal(m.avg_pumps),
            optional(m.high_avg_pumps),
            optional(m.low_avg_pumps),
            m.verdict.map_or("", Verdict::key)
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::playability::PlayabilityMetrics;
    use crate::logic::policy::GameplayStrategy;
    use balloon_game::TierBinding;

    fn result(name: &str, passed: bool) -> ScenarioResult {
        ScenarioResult {
            scenario_name: name.to_string(),
            strategy: "Steady".to_string(),
            seed: 1337,
            passed,
            iterations_run: 2,
            successful_iterations: if passed { 2 } else { 1 },
            failures: if passed {
                Vec::new()
            } else {
                vec!["Iteration 2 (strategy Steady, seed 1338): boom".to_string()]
            },
            average_duration: Duration::from_millis(3),
            performance_data: vec![Duration::from_millis(3)],
        }
    }

    fn record() -> PlayabilityRecord {
        PlayabilityRecord {
            scenario_name: "Randomized - Oracle".to_string(),
            binding: TierBinding::Randomized,
            strategy: GameplayStrategy::Oracle,
            seed_code: "RN-HELIUM42".to_string(),
            seed_value: 42,
            metrics: PlayabilityMetrics {
                final_score: 640,
                balloon_count: 15,
                balloons_cashed: 15,
                balloons_popped: 0,
                total_pumps: 128,
                success_rate_pct: 100.0,
                avg_pumps: 128.0 / 15.0,
                high_avg_pumps: Some(3.4),
                low_avg_pumps: Some(13.8),
                verdict: Some(Verdict::Excellent),
            },
        }
    }

    #[test]
    fn csv_has_header_and_one_row_per_record() {
        let mut out = Vec::new();
        generate_csv_report(&mut out, &[record(), record()]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("scenario,binding,strategy"));
        assert_eq!(
            lines[1],
            "Randomized - Oracle,Randomized,Oracle,RN-HELIUM42,42,640,15,15,0,128,100.0,8.5,3.4,13.8,excellent"
        );
    }

    #[test]
    fn markdown_lists_failures() {
        let mut out = Vec::new();
        generate_markdown_report(&mut out, &[result("Smoke", true), result("Greedy", false)])
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("# Balloon Logic Test Results"));
        assert!(text.contains("- **Success rate**: 50.0%"));
        assert!(text.contains("  - Iteration 2 (strategy Steady, seed 1338): boom"));
    }

    #[test]
    fn json_round_trips_results() {
        let mut out = Vec::new();
        generate_json_report(&mut out, &[result("Smoke", true)]).unwrap();
        let parsed: Vec<ScenarioResult> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].scenario_name, "Smoke");
    }

    #[test]
    fn console_report_includes_playability_section() {
        colored::control::set_override(false);
        let records = [record()];
        let aggregates = crate::logic::playability::aggregate_playability(&records);
        let mut out = Vec::new();
        generate_console_report(
            &mut out,
            &[result("Smoke", true)],
            &aggregates,
            Duration::from_millis(10),
        )
        .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Playability Summary"));
        assert!(text.contains("Randomized - Oracle"));
        assert!(text.contains("excellent adaptation"));
        assert!(text.contains("Fastest: Smoke"));
    }
}
