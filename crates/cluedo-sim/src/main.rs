use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::Level;

use cluedo_bot::{BotParams, ChooserKind};
use cluedo_core::{Catalog, Category, EventBus};
use cluedo_sim::config::SimulationConfig;
use cluedo_sim::logging::{init_console, init_logging};
use cluedo_sim::notes::{ConsoleRenderer, render_notes};
use cluedo_sim::tournament::TournamentRunner;
use cluedo_sim::transcript::Transcript;

/// Deduction engine and simulation harness for Cluedo.
#[derive(Debug, Parser)]
#[command(
    name = "cluedo",
    author,
    version,
    about = "Deterministic Cluedo deduction engine and simulator"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Play seeded bot-only games and write JSONL rows plus a summary.
    Simulate(SimulateArgs),
    /// Replay a recorded transcript and print the resulting notes.
    Deduce(DeduceArgs),
    /// Print the card catalog.
    Catalog(CatalogArgs),
}

#[derive(Debug, clap::Args)]
struct SimulateArgs {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/cluedo.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of games to play.
    #[arg(long, value_name = "GAMES")]
    games: Option<usize>,

    /// Override the master RNG seed.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the number of seats per game.
    #[arg(long, value_name = "COUNT")]
    players: Option<usize>,

    /// Print every table event and the final notebook.
    #[arg(short, long)]
    verbose: bool,

    /// Exit after validating the configuration (no games are played).
    #[arg(long)]
    validate_only: bool,
}

#[derive(Debug, clap::Args)]
struct DeduceArgs {
    /// YAML transcript of one player's view of a game.
    #[arg(value_name = "FILE")]
    transcript: PathBuf,

    /// JSON catalog file; the standard card set when omitted.
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// Seed for the suggestion planner.
    #[arg(long, value_name = "SEED", default_value_t = 0)]
    seed: u64,

    /// Pick among ties at random instead of by name.
    #[arg(long)]
    random: bool,
}

#[derive(Debug, clap::Args)]
struct CatalogArgs {
    /// JSON catalog file; the standard card set when omitted.
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// Emit the catalog as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Simulate(args) => simulate(args),
        Command::Deduce(args) => deduce(args),
        Command::Catalog(args) => print_catalog(args),
    }
}

fn simulate(args: SimulateArgs) -> anyhow::Result<()> {
    let mut config = SimulationConfig::from_path(&args.config)?;

    if let Some(run_id) = args.run_id {
        config.run_id = run_id;
    }

    if let Some(games) = args.games {
        config.games.count = games;
    }

    if let Some(seed) = args.seed {
        config.games.seed = Some(seed);
    }

    if let Some(players) = args.players {
        config.games.players = players;
    }

    config.validate()?;

    let outputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let games = config.games.count;
    let players = config.games.players;

    println!(
        "Loaded configuration '{run_id}' ({games} game{}, {players} players, {:?} chooser)",
        if games == 1 { "" } else { "s" },
        config.bots.chooser
    );

    let logging_guard = init_logging(&config.logging, &outputs)?;
    let runner = TournamentRunner::new(config, outputs)?;

    if args.validate_only {
        println!("Validation-only mode: no games played.");
        return Ok(());
    }

    let mut bus = EventBus::new();
    if args.verbose {
        bus.subscribe(Box::new(ConsoleRenderer::stdout()));
    }
    let summary = runner.run_observed(&mut bus)?;

    if args.verbose {
        if let Some(notes) = summary.final_notes.as_deref() {
            println!("\n{notes}");
        }
    }

    let analytics = &summary.analytics;
    println!(
        "Run complete for '{run_id}': {} games → {} rows at {}",
        summary.games_played,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!(
        "  Wins: {} ({:.1}%), incorrect: {}, timeouts: {}",
        analytics.wins,
        analytics.win_rate * 100.0,
        analytics.incorrect,
        analytics.timeouts
    );
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(guard) = logging_guard.as_ref() {
        println!("Telemetry log: {}", guard.telemetry_path.display());
    }

    Ok(())
}

fn deduce(args: DeduceArgs) -> anyhow::Result<()> {
    init_console(Level::WARN);

    let catalog = load_catalog(args.catalog.as_deref())?;
    let transcript = Transcript::from_path(&args.transcript)
        .with_context(|| format!("loading transcript {}", args.transcript.display()))?;
    let chooser = if args.random {
        ChooserKind::Random
    } else {
        ChooserKind::Deterministic
    };

    let mut replay = transcript
        .replay(Arc::new(catalog), chooser, args.seed, BotParams::default())
        .with_context(|| format!("replaying {}", args.transcript.display()))?;

    for issue in &replay.issues {
        if issue.index == 0 {
            println!("! hand: {}", issue.error);
        } else {
            println!("! observation {}: {}", issue.index, issue.error);
        }
    }

    println!("{}", render_notes(&replay.bot));
    println!(
        "Deduction: {} pass{}{}",
        replay.last_report.passes,
        if replay.last_report.passes == 1 { "" } else { "es" },
        if replay.last_report.converged { "" } else { " (pass limit reached)" }
    );

    match replay.bot.should_accuse() {
        Some(accusation) => println!("Accuse: {accusation}"),
        None => {
            let plan = replay.bot.plan_suggestion();
            match &plan.target {
                Some(target) => println!(
                    "Next suggestion ({}, probing {target}): {}",
                    plan.strategy, plan.suggestion
                ),
                None => println!("Next suggestion ({}): {}", plan.strategy, plan.suggestion),
            }
        }
    }

    Ok(())
}

fn print_catalog(args: CatalogArgs) -> anyhow::Result<()> {
    let catalog = load_catalog(args.catalog.as_deref())?;
    if args.json {
        let json = serde_json::to_string_pretty(&catalog.to_file())
            .context("serializing catalog")?;
        println!("{json}");
        return Ok(());
    }

    for category in Category::ALL {
        let cards = catalog.cards_in(category);
        println!("{category} ({}):", cards.len());
        for card in cards {
            println!("  {card}");
        }
    }
    Ok(())
}

fn load_catalog(path: Option<&Path>) -> anyhow::Result<Catalog> {
    match path {
        Some(path) => Catalog::from_path(path)
            .with_context(|| format!("loading catalog {}", path.display())),
        None => Ok(Catalog::standard()),
    }
}
