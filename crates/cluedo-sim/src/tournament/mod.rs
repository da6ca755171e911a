mod table;

pub use table::{GameOutcome, StrategyTally, Table};

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cluedo_bot::KnowledgeError;
use cluedo_core::{Catalog, CatalogError, Deal, DealError, EventBus, Suggestion, seat_names};
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::analytics::{AnalyticsCollector, AnalyticsError, AnalyticsSummary};
use crate::config::{ResolvedOutputs, SimulationConfig};
use crate::notes::render_notes;

/// Primary entry point for orchestrating simulation runs.
pub struct TournamentRunner {
    config: SimulationConfig,
    outputs: ResolvedOutputs,
    catalog: Arc<Catalog>,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub games_played: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub analytics: AnalyticsSummary,
    /// Notebook of the last game's accuser, or of its first seat on a timeout.
    pub final_notes: Option<String>,
}

impl TournamentRunner {
    /// Build a runner from a validated configuration, loading the catalog.
    pub fn new(config: SimulationConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let catalog = match &config.catalog {
            Some(path) => Catalog::from_path(path)?,
            None => Catalog::standard(),
        };
        Self::with_catalog(config, outputs, Arc::new(catalog))
    }

    pub fn with_catalog(
        config: SimulationConfig,
        outputs: ResolvedOutputs,
        catalog: Arc<Catalog>,
    ) -> Result<Self, RunnerError> {
        // Seat names are drawn from the suspects.
        let mut probe = StdRng::seed_from_u64(0);
        seat_names(&catalog, config.games.players, &mut probe)?;

        Ok(Self {
            config,
            outputs,
            catalog,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Execute the run, streaming JSONL rows to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        self.run_observed(&mut EventBus::new())
    }

    /// Like [`TournamentRunner::run`], publishing every game's events to `bus`.
    pub fn run_observed(&self, bus: &mut EventBus) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rng = StdRng::seed_from_u64(self.config.games.seed.unwrap_or(0));
        let mut analytics = AnalyticsCollector::new(&self.config.run_id, self.config.games.players);
        let mut rows_written = 0usize;
        let mut final_notes = None;

        for game_index in 0..self.config.games.count {
            let game_seed = rng.next_u64();
            let (outcome, table) = self.play_game(game_seed, bus)?;

            analytics.record_game(game_index, &outcome)?;
            write_game_row(&mut writer, &self.config.run_id, game_index, game_seed, &outcome)?;
            rows_written += 1;

            let notebook = outcome
                .accuser
                .as_deref()
                .and_then(|name| table.bot(name))
                .or_else(|| table.bots().first());
            final_notes = notebook.map(render_notes);
        }

        writer.flush()?;

        let analytics = analytics.finalize();
        analytics.write_markdown(&self.outputs.summary_md)?;
        event!(
            target: "cluedo_sim::tournament",
            Level::INFO,
            run_id = %self.config.run_id,
            games = analytics.games,
            wins = analytics.wins,
            timeouts = analytics.timeouts,
            "run complete"
        );

        Ok(RunSummary {
            games_played: self.config.games.count,
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            analytics,
            final_notes,
        })
    }

    fn play_game(&self, game_seed: u64, bus: &mut EventBus) -> Result<(GameOutcome, Table), RunnerError> {
        let mut rng = StdRng::seed_from_u64(game_seed);
        let players = seat_names(&self.catalog, self.config.games.players, &mut rng)?;
        let deal = Deal::shuffled(&self.catalog, &players, &mut rng)?;
        let seeds: Vec<u64> = players.iter().map(|_| rng.next_u64()).collect();

        let mut table = Table::new(
            Arc::clone(&self.catalog),
            deal,
            self.config.bots.chooser,
            self.config.bots.params,
            &seeds,
            self.config.games.max_turns,
        )?;
        let outcome = table.play(bus)?;
        Ok((outcome, table))
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn write_game_row(
    writer: &mut BufWriter<File>,
    run_id: &str,
    game_index: usize,
    seed: u64,
    outcome: &GameOutcome,
) -> Result<(), RunnerError> {
    let row = GameLogRow {
        run_id: run_id.to_string(),
        game_index,
        seed,
        players: outcome.players.clone(),
        winner: outcome.winner().map(str::to_string),
        accuser: outcome.accuser.clone(),
        correct: outcome.correct,
        turns: outcome.turns,
        solution: outcome.solution.clone(),
        strategies: outcome.strategies,
    };
    serde_json::to_writer(&mut *writer, &row)?;
    writer.write_all(b"\n")?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct GameLogRow {
    run_id: String,
    game_index: usize,
    seed: u64,
    players: Vec<String>,
    winner: Option<String>,
    accuser: Option<String>,
    correct: bool,
    turns: usize,
    solution: Suggestion,
    strategies: StrategyTally,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("cannot seat players: {0}")]
    Deal(#[from] DealError),
    #[error("bot '{player}' rejected the game: {source}")]
    Bot {
        player: String,
        #[source]
        source: KnowledgeError,
    },
    #[error("game execution failed: {message}")]
    Game { message: String },
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}

impl RunnerError {
    fn game(message: String) -> Self {
        RunnerError::Game { message }
    }

    fn bot(player: &str, source: KnowledgeError) -> Self {
        RunnerError::Bot {
            player: player.to_string(),
            source,
        }
    }
}
