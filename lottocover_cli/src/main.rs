mod cli;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking;
use tracing_subscriber::{prelude::*, EnvFilter};

use cli::{Cli, Commands, ProblemArgs, RunConfig, VerifyArgs};
use lottocover_rs::{
    Backend, CacheOptions, CoverageEngine, CoverageVerifier, DenseIntSet, IntSet, LotteryProblem,
    SparseIntSet,
};

fn init_tracing(log_file: Option<PathBuf>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stdout_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    if let Some(path) = log_file {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|err| anyhow!("failed to create log directory {parent:?}: {err}"))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|err| anyhow!("failed to open log file {path:?}: {err}"))?;
        let (non_blocking_writer, guard) = non_blocking(file);
        // Leak the guard so the non-blocking writer stays alive for the
        // duration of the process without additional plumbing.
        let _guard = Box::leak(Box::new(guard));
        let file_layer = tracing_subscriber::fmt::layer().with_writer(non_blocking_writer);
        tracing_subscriber::registry()
            .with(filter)
            .with(stdout_layer)
            .with(file_layer)
            .try_init()
            .map_err(|err| anyhow!("failed to initialize tracing: {err}"))
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(stdout_layer)
            .try_init()
            .map_err(|err| anyhow!("failed to initialize tracing: {err}"))
    }
}

fn build_problem(args: &ProblemArgs) -> Result<LotteryProblem> {
    LotteryProblem::new(
        args.total_num_count,
        args.num_count_in_ticket,
        args.num_count_in_draw,
        args.min_matched_num_count,
    )
}

/// Parse and validate one ticket per line: numbers separated by commas or
/// whitespace, strictly increasing, in range, exactly k of them. Blank lines
/// and lines starting with '#' are skipped.
fn read_tickets(path: &Path, problem: &LotteryProblem) -> Result<Vec<Vec<usize>>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read tickets from {path:?}"))?;

    let mut tickets = Vec::new();
    for (line_number, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let ticket: Vec<usize> = line
            .split([',', ' ', '\t'])
            .filter(|token| !token.is_empty())
            .map(|token| {
                token
                    .parse::<usize>()
                    .with_context(|| format!("line {}: invalid number {token:?}", line_number + 1))
            })
            .collect::<Result<_>>()?;

        if ticket.len() != problem.num_count_in_ticket() {
            bail!(
                "line {}: ticket has {} numbers, expected {}",
                line_number + 1,
                ticket.len(),
                problem.num_count_in_ticket()
            );
        }
        if !ticket.windows(2).all(|pair| pair[0] < pair[1]) {
            bail!(
                "line {}: ticket numbers must be strictly increasing",
                line_number + 1
            );
        }
        if ticket.last().is_some_and(|&num| num >= problem.total_num_count()) {
            bail!(
                "line {}: ticket numbers must be below {}",
                line_number + 1,
                problem.total_num_count()
            );
        }

        tickets.push(ticket);
    }

    if tickets.is_empty() {
        bail!("no tickets found in {path:?}");
    }
    Ok(tickets)
}

/// Resolve the effective run configuration: the `--config` JSON file when
/// given, the individual flags otherwise (clap rejects mixing the two).
fn load_run_config(args: &VerifyArgs) -> Result<RunConfig> {
    if let Some(path) = &args.config_path {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read run config from {path:?}"))?;
        serde_json::from_str(&raw).with_context(|| format!("invalid run config in {path:?}"))
    } else {
        Ok(RunConfig {
            backend: Backend::from(args.backend),
            caches: CacheOptions {
                covered_draws: args.cache_covered_draws,
                ..CacheOptions::default()
            },
        })
    }
}

fn run_info(args: &ProblemArgs) -> Result<()> {
    let problem = build_problem(args)?;
    problem.log_summary();
    Ok(())
}

fn run_verify<S: IntSet>(args: &VerifyArgs, caches: CacheOptions) -> Result<()> {
    let problem = build_problem(&args.problem)?;
    let tickets = read_tickets(&args.tickets_path, &problem)?;
    info!(
        "verifying coverage of {} tickets for lottery {}",
        tickets.len(),
        problem.signature()
    );

    let engine: CoverageEngine<S> = CoverageEngine::new(problem, caches);
    let ticket_indices = engine.get_indices_by_tickets(&tickets);

    let verifier = CoverageVerifier::new(&engine);
    let uncovered_count = verifier.verify_coverage(&ticket_indices);

    if args.distribution {
        for (frequency, draw_count) in verifier.coverage_distribution(&ticket_indices) {
            info!("{draw_count} draws covered by {frequency} ticket(s)");
        }
    }
    if args.redundancy {
        verifier.tickets_by_redundancy(&ticket_indices);
    }
    if args.overlap {
        for (overlap_count, pair_count) in verifier.count_overlap(&ticket_indices) {
            info!("overlap {overlap_count} appears {pair_count} time(s)");
        }
    }

    if uncovered_count > 0 {
        bail!("{uncovered_count} draws remain uncovered");
    }
    info!("all draws covered");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.clone())?;

    match &cli.command {
        Commands::Info(args) => run_info(args),
        Commands::Verify(args) => {
            let config = load_run_config(args)?;
            info!("run config: {}", serde_json::to_string(&config)?);
            info!("using {} draw-set backend", config.backend.as_str());
            match config.backend {
                Backend::Sparse => run_verify::<SparseIntSet>(args, config.caches),
                Backend::Dense => run_verify::<DenseIntSet>(args, config.caches),
            }
        }
    }
}
