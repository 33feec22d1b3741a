use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{LevelFilter, error};
use serde::Serialize;

use vaxsim::cohort::{CohortOutcomes, CohortSummary};
use vaxsim::config::ModelConfig;
use vaxsim::econ::{self, Comparison};
use vaxsim::stats::SummaryStat;
use vaxsim::{Horizon, Result, Therapy};

/// Simulate a cohort with and without vaccination and compare outcomes.
#[derive(Debug, Parser)]
#[command(name = "vaxsim", version)]
struct Args {
    /// JSON file overriding the canonical parameters.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    pop_size: Option<usize>,
    /// Simulation length in years.
    #[arg(long)]
    horizon: Option<f64>,
    #[arg(long)]
    cohort_id: Option<u64>,
    /// Willingness-to-pay per QALY for the net monetary benefit.
    #[arg(long, default_value_t = 1000.0)]
    wtp: f64,
    /// Print a JSON summary instead of the text report.
    #[arg(long)]
    json: bool,
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct RunSummary<'a> {
    config: &'a ModelConfig,
    without: Option<&'a CohortSummary>,
    with: Option<&'a CohortSummary>,
    comparison: &'a Comparison,
    icer: Option<f64>,
    wtp: f64,
    net_monetary_benefit: Option<f64>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if args.verbose {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => ModelConfig::from_json_file(path)?,
        None => ModelConfig::canonical(),
    };
    if let Some(n) = args.pop_size {
        config.pop_size = n;
    }
    if let Some(h) = args.horizon {
        config.horizon = h;
    }
    if let Some(id) = args.cohort_id {
        config.cohort_id = id;
    }
    let horizon = Horizon::new(config.horizon)?;

    let (without, with) = econ::simulate_alternatives(&config, horizon)?;
    let comparison = Comparison::new(without.outcomes(), with.outcomes());

    if args.json {
        let summary = RunSummary {
            config: &config,
            without: without.outcomes().summary(),
            with: with.outcomes().summary(),
            comparison: &comparison,
            icer: comparison.icer(),
            wtp: args.wtp,
            net_monetary_benefit: comparison.net_monetary_benefit(args.wtp),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    print_outcomes(without.outcomes(), Therapy::Without, config.alpha)?;
    print_outcomes(with.outcomes(), Therapy::With, config.alpha)?;
    print_comparative_outcomes(&comparison, config.alpha)?;
    print_cea(&comparison, args.wtp);
    Ok(())
}

fn level(alpha: f64) -> String {
    format!("{:.0}%", (1.0 - alpha) * 100.0)
}

fn estimate_line(stat: Option<&SummaryStat>, alpha: f64, decimals: usize) -> Result<String> {
    match stat {
        Some(s) => Ok(econ::format_estimate(s.mean, s.t_confidence_interval(alpha)?, decimals)),
        None => Ok("n/a (no observations)".to_string()),
    }
}

fn print_outcomes(outcomes: &CohortOutcomes, therapy: Therapy, alpha: f64) -> Result<()> {
    let Some(summary) = outcomes.summary() else {
        return Ok(());
    };
    let ci = level(alpha);

    println!("=== {} (N={}) ===", therapy.label(), summary.pop_size);
    println!(
        "  Mean survival time and {ci} CI (years):        {}",
        estimate_line(summary.stat_survival_time.as_ref(), alpha, 2)?
    );
    println!(
        "  Mean number of episodes and {ci} CI:           {}",
        estimate_line(summary.stat_episodes.as_ref(), alpha, 2)?
    );
    println!(
        "  Mean discounted cost and {ci} CI:              {}",
        estimate_line(summary.stat_cost.as_ref(), alpha, 0)?
    );
    println!(
        "  Mean discounted utility and {ci} CI:           {}",
        estimate_line(summary.stat_utility.as_ref(), alpha, 2)?
    );

    let curve = &summary.survival_curve;
    println!(
        "  Deaths: {}   alive at horizon: {}",
        outcomes.survival_times().len(),
        curve.final_alive()
    );
    println!();
    Ok(())
}

fn print_comparative_outcomes(cmp: &Comparison, alpha: f64) -> Result<()> {
    let ci = level(alpha);
    println!("=== With vs. without vaccine ===");
    for (d, decimals) in [(&cmp.survival_time, 2), (&cmp.cost, 2), (&cmp.effect, 2)] {
        if let Some(d) = d {
            println!("  {} and {ci} CI: {}", d.name, econ::format_difference(d, alpha, decimals)?);
        }
    }
    println!();
    Ok(())
}

fn print_cea(cmp: &Comparison, wtp: f64) {
    println!("=== Cost-effectiveness ===");
    match cmp.icer() {
        Some(icer) => println!("  ICER (cost per QALY gained): {icer:.2}"),
        None => println!("  ICER undefined (no incremental effect)"),
    }
    if let Some(nmb) = cmp.net_monetary_benefit(wtp) {
        println!("  Incremental NMB at WTP {wtp:.0}/QALY: {nmb:.2}");
    }
}
