use std::fmt::Write as _;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Parser, ValueEnum};
use serde::Serialize;

use crate::core::{
    CalculationResult, InputBasis, MAX_DECLINE_PERCENT, ProjectionYear, Rng, Scenario,
    SensitivityPoint, SimulationConfig, SimulationResult, evaluate, project_cumulative,
    run_simulation, sensitivity_sweep,
};

/// Decline steps shown by `--sweep`, matching the calculator's preset cases.
const SWEEP_STEPS: [f64; 5] = [10.0, 20.0, 30.0, 40.0, 50.0];

const MAX_INFLATION_PERCENT: f64 = 50.0;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliBasis {
    /// Revenue excludes VAT (taxable base).
    Net,
    /// Revenue includes VAT at the old 7% rate.
    Gross,
}

impl From<CliBasis> for InputBasis {
    fn from(value: CliBasis) -> Self {
        match value {
            CliBasis::Net => InputBasis::Net,
            CliBasis::Gross => InputBasis::Gross,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "vatshift",
    about = "Compares VAT receipts before and after the 7% -> 15% rate change"
)]
pub struct Cli {
    #[arg(long, value_enum, default_value_t = CliBasis::Net)]
    basis: CliBasis,
    #[arg(
        long,
        default_value_t = 100_000.0,
        help = "Revenue before the rate change, in the chosen basis"
    )]
    revenue: f64,
    #[arg(
        long,
        default_value_t = 20.0,
        help = "Expected revenue decline after the change in percent; clamped to [0, 80]"
    )]
    decline: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Price inflation applied before the decline in percent; clamped to [0, 50]"
    )]
    inflation: f64,
    #[arg(long, default_value_t = 500, help = "Monte Carlo runs")]
    runs: u32,
    #[arg(
        long,
        default_value_t = 5.0,
        help = "Uncertainty band around the decline rate in percentage points"
    )]
    uncertainty: f64,
    #[arg(long, help = "RNG seed; omitted means a time-derived seed")]
    seed: Option<u64>,
    #[arg(long, default_value_t = 5, help = "Years in the cumulative projection")]
    years: u32,
    #[arg(long, help = "Include the decline sensitivity sweep")]
    sweep: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScenarioEcho {
    basis: &'static str,
    base_revenue: f64,
    decline_percent: f64,
    inflation_percent: f64,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    scenario: ScenarioEcho,
    result: CalculationResult,
    simulation: SimulationResult,
    simulation_runs: u32,
    uncertainty_range_percent: f64,
    seed: u64,
    projection: Vec<ProjectionYear>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sensitivity: Option<Vec<SensitivityPoint>>,
}

pub fn run(cli: Cli) -> Result<(), String> {
    let format = cli.format;
    let report = build_report(cli)?;
    match format {
        OutputFormat::Text => println!("{}", render_text(&report)),
        OutputFormat::Json => {
            let body = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
            println!("{body}");
        }
    }
    Ok(())
}

/// Input coercion lives here, not in the engine: the core is defined over
/// the constrained domain and trusts its caller to clamp UI-reachable ranges.
fn build_scenario(cli: &Cli) -> Result<Scenario, String> {
    if !cli.revenue.is_finite() || cli.revenue < 0.0 {
        return Err("--revenue must be a finite value >= 0".to_string());
    }
    if !cli.decline.is_finite() || !cli.inflation.is_finite() {
        return Err("--decline and --inflation must be finite".to_string());
    }
    if !cli.uncertainty.is_finite() || cli.uncertainty < 0.0 {
        return Err("--uncertainty must be a finite value >= 0".to_string());
    }
    if cli.runs == 0 {
        return Err("--runs must be > 0".to_string());
    }

    Ok(Scenario {
        basis: cli.basis.into(),
        base_revenue: cli.revenue,
        decline_percent: cli.decline.clamp(0.0, MAX_DECLINE_PERCENT),
        inflation_percent: cli.inflation.clamp(0.0, MAX_INFLATION_PERCENT),
    })
}

fn build_report(cli: Cli) -> Result<Report, String> {
    let scenario = build_scenario(&cli)?;
    let result = evaluate(&scenario);

    let seed = cli.seed.unwrap_or_else(time_seed);
    let mut rng = Rng::new(seed);
    let config = SimulationConfig {
        runs: cli.runs,
        uncertainty_range_percent: cli.uncertainty,
    };
    let simulation = run_simulation(&scenario, config, Some(&mut rng));

    let projection = project_cumulative(&scenario, cli.years);
    let sensitivity = cli
        .sweep
        .then(|| sensitivity_sweep(&scenario, &SWEEP_STEPS));

    Ok(Report {
        scenario: ScenarioEcho {
            basis: match scenario.basis {
                InputBasis::Net => "net",
                InputBasis::Gross => "gross",
            },
            base_revenue: scenario.base_revenue,
            decline_percent: scenario.decline_percent,
            inflation_percent: scenario.inflation_percent,
        },
        result,
        simulation,
        simulation_runs: cli.runs,
        uncertainty_range_percent: cli.uncertainty,
        seed,
        projection,
        sensitivity,
    })
}

fn time_seed() -> u64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => elapsed.as_nanos() as u64 | 1,
        Err(_) => 0,
    }
}

fn render_text(report: &Report) -> String {
    let mut out = String::new();
    let result = &report.result;
    let stats = &report.simulation.statistics;

    let _ = writeln!(
        out,
        "Scenario: {} basis, revenue {}, decline {:.2}%, inflation {:.2}%",
        report.scenario.basis,
        format_eur(report.scenario.base_revenue),
        report.scenario.decline_percent,
        report.scenario.inflation_percent,
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "VAT before (7%)     {:>18}   net {} | gross {}",
        format_eur(result.old_vat),
        format_eur(result.net_revenue_before),
        format_eur(result.gross_revenue_before),
    );
    let _ = writeln!(
        out,
        "VAT after (15%)     {:>18}   net {} | gross {}",
        format_eur(result.new_vat),
        format_eur(result.net_revenue_after),
        format_eur(result.gross_revenue_after),
    );
    let _ = writeln!(
        out,
        "Difference          {:>18}   ({})",
        format_signed_eur(result.difference),
        format_signed_percent(result.percentage_change),
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Break-even decline  {:.2}%",
        result.break_even_decline_percent
    );
    let _ = writeln!(
        out,
        "VAT rate change     {}",
        format_signed_percent(result.vat_rate_change_percent)
    );
    let _ = writeln!(out, "Demand elasticity   {:.2}", result.demand_elasticity);
    match result.revenue_efficiency {
        Some(ratio) => {
            let _ = writeln!(out, "Revenue efficiency  {ratio:.2}");
        }
        None => {
            let _ = writeln!(out, "Revenue efficiency  n/a (old VAT is zero)");
        }
    }
    let _ = writeln!(
        out,
        "Deadweight loss     {}",
        format_eur(result.deadweight_loss)
    );

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Uncertainty simulation ({} runs, +/-{:.2} pp decline, seed {})",
        report.simulation_runs, report.uncertainty_range_percent, report.seed,
    );
    let _ = writeln!(out, "  mean     {}", format_signed_eur(stats.average));
    let _ = writeln!(out, "  median   {}", format_signed_eur(stats.median));
    let _ = writeln!(
        out,
        "  p5..p95  {} .. {}",
        format_signed_eur(stats.p5),
        format_signed_eur(stats.p95),
    );
    let _ = writeln!(
        out,
        "  std dev  {}",
        format_eur(stats.standard_deviation)
    );

    if !report.projection.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Projection over {} years (cumulative difference)",
            report.projection.len()
        );
        for row in &report.projection {
            let _ = writeln!(
                out,
                "  year {:>2}  baseline {:>16}  reformed {:>16}  cumulative {}",
                row.year,
                format_eur(row.baseline_vat),
                format_eur(row.reformed_vat),
                format_signed_eur(row.cumulative_difference),
            );
        }
    }

    if let Some(points) = &report.sensitivity {
        let _ = writeln!(out);
        let _ = writeln!(out, "Sensitivity to the decline rate");
        for point in points {
            let _ = writeln!(
                out,
                "  decline {:>5.1}%  VAT {} -> {}  ({})",
                point.decline_percent,
                format_eur(point.old_vat),
                format_eur(point.new_vat),
                format_signed_eur(point.difference),
            );
        }
    }

    out
}

// Two decimals with thousands grouping; the core deliberately emits raw
// base-currency values and leaves formatting to this layer.
fn format_eur(value: f64) -> String {
    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as u128;
    let whole = cents / 100;
    let fraction = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative && (whole > 0 || fraction > 0) {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{fraction:02} \u{20ac}")
}

fn format_signed_eur(value: f64) -> String {
    if value >= 0.0 {
        format!("+{}", format_eur(value))
    } else {
        format_eur(value)
    }
}

fn format_signed_percent(value: f64) -> String {
    if value >= 0.0 {
        format!("+{value:.2}%")
    } else {
        format!("{value:.2}%")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_cli() -> Cli {
        Cli {
            basis: CliBasis::Net,
            revenue: 100_000.0,
            decline: 20.0,
            inflation: 0.0,
            runs: 50,
            uncertainty: 5.0,
            seed: Some(42),
            years: 3,
            sweep: true,
            format: OutputFormat::Text,
        }
    }

    #[test]
    fn build_scenario_clamps_slider_ranges() {
        let mut cli = sample_cli();
        cli.decline = 95.0;
        cli.inflation = 75.0;
        let scenario = build_scenario(&cli).expect("valid scenario");
        assert_eq!(scenario.decline_percent, 80.0);
        assert_eq!(scenario.inflation_percent, 50.0);
    }

    #[test]
    fn build_scenario_rejects_negative_revenue() {
        let mut cli = sample_cli();
        cli.revenue = -1.0;
        let err = build_scenario(&cli).expect_err("must reject");
        assert!(err.contains("--revenue"));
    }

    #[test]
    fn build_scenario_rejects_non_finite_revenue() {
        let mut cli = sample_cli();
        cli.revenue = f64::NAN;
        assert!(build_scenario(&cli).is_err());
    }

    #[test]
    fn build_scenario_rejects_zero_runs() {
        let mut cli = sample_cli();
        cli.runs = 0;
        let err = build_scenario(&cli).expect_err("must reject");
        assert!(err.contains("--runs"));
    }

    #[test]
    fn build_scenario_rejects_negative_uncertainty() {
        let mut cli = sample_cli();
        cli.uncertainty = -2.0;
        assert!(build_scenario(&cli).is_err());
    }

    #[test]
    fn report_is_deterministic_under_a_fixed_seed() {
        let a = build_report(sample_cli()).expect("report");
        let b = build_report(sample_cli()).expect("report");
        assert_eq!(a.seed, 42);
        assert_eq!(
            a.simulation.statistics.average,
            b.simulation.statistics.average
        );
        assert_eq!(a.simulation.samples.len(), b.simulation.samples.len());
    }

    #[test]
    fn report_carries_projection_and_sweep_series() {
        let report = build_report(sample_cli()).expect("report");
        assert_eq!(report.projection.len(), 3);
        let sweep = report.sensitivity.as_ref().expect("sweep requested");
        assert_eq!(sweep.len(), SWEEP_STEPS.len());
        assert_eq!(sweep[0].decline_percent, 10.0);
    }

    #[test]
    fn json_report_uses_camel_case_keys() {
        let report = build_report(sample_cli()).expect("report");
        let value = serde_json::to_value(&report).expect("serializes");
        assert!(value["result"]["oldVat"].is_number());
        assert!(value["result"]["breakEvenDeclinePercent"].is_number());
        assert!(value["simulation"]["statistics"]["standardDeviation"].is_number());
        assert!(value["scenario"]["baseRevenue"].is_number());
    }

    #[test]
    fn currency_formatting_groups_thousands() {
        assert_eq!(format_eur(1_234_567.891), "1,234,567.89 \u{20ac}");
        assert_eq!(format_eur(0.0), "0.00 \u{20ac}");
        assert_eq!(format_eur(999.999), "1,000.00 \u{20ac}");
        assert_eq!(format_eur(-1_234.5), "-1,234.50 \u{20ac}");
    }

    #[test]
    fn signed_formatting_marks_gains_and_losses() {
        assert_eq!(format_signed_eur(5_000.0), "+5,000.00 \u{20ac}");
        assert_eq!(format_signed_eur(-250.25), "-250.25 \u{20ac}");
        assert_eq!(format_signed_percent(71.4285), "+71.43%");
        assert_eq!(format_signed_percent(-3.0), "-3.00%");
    }
}
