use anyhow::{bail, Result};
use clap::Parser;
use contend::{run_case, AccessPattern, Case, ExecutionMode, MapKind, RunConfig, RunReport};
use log::{error, info};

macro_rules! bench {
    ($name: expr, $body: expr) => {{
        let report: RunReport = $body;
        let status = if report.is_valid() { "ok" } else { "FAILED" };
        println!(
            "{:<40} {:>6} elapsed: {:.2?} ops: {} ({:.1} Mops/s)",
            $name,
            status,
            report.elapsed,
            report.ops(),
            mops(&report)
        );
        report
    }};
}

/// Runs the contention matrix once with an explicit configuration.
#[derive(Debug, Parser)]
#[command(name = "bench_contention", version)]
struct Opt {
    /// Keys per map; every key maps to itself.
    #[arg(long, default_value_t = 1 << 12)]
    epochs: usize,
    /// Worker threads for parallel cases [default: available parallelism].
    #[arg(long)]
    workers: Option<usize>,
    /// Iterations per worker.
    #[arg(long, default_value_t = 100)]
    budget: u64,
    /// Initial map capacity before population.
    #[arg(long, default_value_t = 8)]
    capacity: usize,
    /// Only run these maps (repeatable).
    #[arg(long = "map")]
    maps: Vec<MapKind>,
    /// Only run these access patterns (repeatable).
    #[arg(long = "pattern")]
    patterns: Vec<AccessPattern>,
    /// Only run these execution modes (repeatable).
    #[arg(long = "mode")]
    modes: Vec<ExecutionMode>,
}

impl Opt {
    fn config(&self) -> RunConfig {
        let mut config = RunConfig::default()
            .with_epochs(self.epochs)
            .with_budget(self.budget)
            .with_capacity(self.capacity);
        if let Some(workers) = self.workers {
            config = config.with_workers(workers);
        }
        config
    }

    fn selects(&self, case: &Case) -> bool {
        (self.maps.is_empty() || self.maps.contains(&case.map))
            && (self.patterns.is_empty() || self.patterns.contains(&case.pattern))
            && (self.modes.is_empty() || self.modes.contains(&case.mode))
    }
}

fn mops(report: &RunReport) -> f64 {
    let secs = report.elapsed.as_secs_f64();
    if secs == 0.0 {
        0.0
    } else {
        report.ops() as f64 / secs / 1e6
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opt = Opt::parse();
    let config = opt.config();
    config.validate()?;
    info!(
        "epochs={} workers={} budget={} capacity={}",
        config.epochs, config.workers, config.budget, config.capacity
    );

    let mut failed = Vec::new();
    for case in Case::all().filter(|case| opt.selects(case)) {
        let report = bench!(case.to_string(), run_case(case, &config)?);
        if let Err(err) = report.into_result() {
            error!("{}: {}", case, err);
            failed.push(case);
        }
    }

    if !failed.is_empty() {
        bail!("{} case(s) failed consistency checks", failed.len());
    }
    Ok(())
}
