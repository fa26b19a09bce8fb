//! `gridiron-sim`: plays seeded batches of computer-coached games and
//! reports the aggregate results.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use gridiron_core::batch::{simulate_batch, BatchSummary, GameSetup};
use gridiron_core::resolver::{ChartResolver, DiceTableResolver, PlayResolver};
use gridiron_core::{CoachProfile, EngineConfig};
use playbook::data::{standard_catalog, standard_chart, standard_matchups};
use playbook::{CardCatalog, Chart, MatchupBook};

/// Environment variable holding a tracing filter that overrides `-v`.
const LOG_ENV: &str = "GRIDIRON_LOG";

// =============================================================================
// Arguments
// =============================================================================

/// Play resolution backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// Chart cells keyed by play and defense letter.
    Chart,
    /// 2d20 matchup tables, falling back to the chart.
    Dice,
}

#[derive(Debug, Parser)]
#[command(name = "gridiron-sim", version, about = "Seeded batch simulation for Gridiron")]
struct Cli {
    /// Number of games to play.
    #[arg(short = 'n', long, default_value_t = 100)]
    games: u32,

    /// Seed of the first game; game `i` uses `seed + i`.
    #[arg(short, long, default_value_t = 0, env = "GRIDIRON_SEED")]
    seed: u64,

    /// Resolution backend.
    #[arg(short, long, value_enum, default_value_t = Backend::Chart)]
    backend: Backend,

    /// Card catalog JSON (bundled catalog when omitted).
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Chart JSON (bundled chart when omitted).
    #[arg(long)]
    chart: Option<PathBuf>,

    /// Matchup book JSON (bundled book when omitted).
    #[arg(long)]
    matchups: Option<PathBuf>,

    /// Engine config JSON.
    #[arg(short, long, env = "GRIDIRON_CONFIG")]
    config: Option<PathBuf>,

    /// Play sudden-death overtime after a tied regulation.
    #[arg(long)]
    overtime: bool,

    /// Home coach: conservative, balanced or aggressive.
    #[arg(long, default_value = "balanced")]
    home: String,

    /// Away coach: conservative, balanced or aggressive.
    #[arg(long, default_value = "balanced")]
    away: String,

    /// Down limit per game.
    #[arg(long, default_value_t = gridiron_core::batch::DEFAULT_MAX_DOWNS)]
    max_downs: u32,

    /// Print the summary as JSON.
    #[arg(long)]
    json: bool,

    /// More logging (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

// =============================================================================
// Logging
// =============================================================================

/// Maps a verbosity count to a tracing directive.
const fn verbosity_to_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs the stderr subscriber. `GRIDIRON_LOG` takes precedence over
/// `verbosity`.
fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(verbosity_to_directive(verbosity)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .with_writer(std::io::stderr)
        .try_init();
}

// =============================================================================
// Setup
// =============================================================================

fn profile(name: &str) -> Result<CoachProfile> {
    CoachProfile::named(name).with_context(|| {
        format!("unknown coach profile `{name}` (expected conservative, balanced or aggressive)")
    })
}

fn load_catalog(path: Option<&Path>) -> Result<CardCatalog> {
    match path {
        Some(path) => CardCatalog::load(path)
            .with_context(|| format!("loading catalog {}", path.display())),
        None => standard_catalog().context("loading bundled catalog"),
    }
}

fn load_chart(path: Option<&Path>, catalog: &CardCatalog) -> Result<Chart> {
    let chart = match path {
        Some(path) => {
            Chart::load(path).with_context(|| format!("loading chart {}", path.display()))?
        }
        None => standard_chart().context("loading bundled chart")?,
    };
    let coverage = chart.check_coverage(catalog);
    coverage.log_warnings("chart");
    if coverage.has_errors() {
        bail!("chart does not cover the catalog");
    }
    Ok(chart)
}

fn load_book(path: Option<&Path>) -> Result<MatchupBook> {
    match path {
        Some(path) => MatchupBook::load(path)
            .with_context(|| format!("loading matchup book {}", path.display())),
        None => standard_matchups().context("loading bundled matchup book"),
    }
}

fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    Ok(if cli.overtime && config.overtime.is_none() {
        config.with_overtime()
    } else {
        config
    })
}

fn build_setup(cli: &Cli) -> Result<GameSetup> {
    let catalog = Arc::new(load_catalog(cli.catalog.as_deref())?);
    let chart = ChartResolver::new(Arc::new(load_chart(cli.chart.as_deref(), &catalog)?));
    let mut book = None;
    let resolver: Arc<dyn PlayResolver> = match cli.backend {
        Backend::Chart => Arc::new(chart),
        Backend::Dice => {
            let loaded = Arc::new(load_book(cli.matchups.as_deref())?);
            book = Some(Arc::clone(&loaded));
            Arc::new(DiceTableResolver::new(loaded).with_fallback(Box::new(chart)))
        }
    };

    let mut setup = GameSetup::new(catalog, resolver)
        .with_config(load_config(cli)?)
        .with_profiles(profile(&cli.home)?, profile(&cli.away)?);
    if let Some(book) = book {
        setup = setup.with_book(book);
    }
    setup.max_downs = cli.max_downs;
    Ok(setup)
}

// =============================================================================
// Output
// =============================================================================

fn print_text(summary: &BatchSummary) {
    println!("games:        {}", summary.games);
    println!(
        "record:       home {} / away {} / ties {}",
        summary.home_wins, summary.away_wins, summary.ties
    );
    println!(
        "mean score:   home {:.1} - away {:.1}",
        summary.mean_home_points, summary.mean_away_points
    );
    println!("yards/play:   {:.2}", summary.yards_per_play);
    println!("turnover pct: {:.2}%", summary.turnover_rate * 100.0);
    if summary.violations.is_empty() {
        return;
    }
    println!("out-of-bounds pairings:");
    for violation in &summary.violations {
        println!(
            "  {} vs {} ({} plays): {}",
            violation.offense, violation.defense, violation.plays, violation.message
        );
    }
}

fn run(cli: &Cli) -> Result<()> {
    if cli.games == 0 {
        bail!("--games must be at least 1");
    }
    let setup = build_setup(cli)?;
    info!(
        games = cli.games,
        seed = cli.seed,
        backend = ?cli.backend,
        "starting batch"
    );
    let summary = simulate_batch(&setup, cli.games, cli.seed).context("simulation failed")?;
    if !summary.violations.is_empty() {
        warn!(count = summary.violations.len(), "pairings outside their bounds");
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_text(&summary);
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
