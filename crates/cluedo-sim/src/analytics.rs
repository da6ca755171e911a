use std::fs;
use std::path::Path;

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use statrs::statistics::Statistics;
use thiserror::Error;

use crate::tournament::{GameOutcome, StrategyTally};

const CONFIDENCE_LEVEL: f64 = 0.95;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("game {game_index} has {found} players but the run expects {expected}")]
    SeatMismatch {
        game_index: usize,
        found: usize,
        expected: usize,
    },
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Accumulates game outcomes for the run summary.
pub struct AnalyticsCollector {
    run_id: String,
    players: usize,
    games: usize,
    wins: usize,
    incorrect: usize,
    timeouts: usize,
    wins_by_seat: Vec<usize>,
    winning_turns: Vec<f64>,
    strategies: StrategyTally,
}

impl AnalyticsCollector {
    pub fn new(run_id: impl Into<String>, players: usize) -> Self {
        Self {
            run_id: run_id.into(),
            players,
            games: 0,
            wins: 0,
            incorrect: 0,
            timeouts: 0,
            wins_by_seat: vec![0; players],
            winning_turns: Vec::new(),
            strategies: StrategyTally::default(),
        }
    }

    pub fn record_game(
        &mut self,
        game_index: usize,
        outcome: &GameOutcome,
    ) -> Result<(), AnalyticsError> {
        if outcome.players.len() != self.players {
            return Err(AnalyticsError::SeatMismatch {
                game_index,
                found: outcome.players.len(),
                expected: self.players,
            });
        }

        self.games += 1;
        self.strategies.merge(&outcome.strategies);
        match (outcome.accuser_seat(), outcome.correct) {
            (Some(seat), true) => {
                self.wins += 1;
                self.wins_by_seat[seat] += 1;
                self.winning_turns.push(outcome.turns as f64);
            }
            (Some(_), false) => self.incorrect += 1,
            (None, _) => self.timeouts += 1,
        }
        Ok(())
    }

    pub fn finalize(self) -> AnalyticsSummary {
        let win_rate = if self.games == 0 {
            0.0
        } else {
            self.wins as f64 / self.games as f64
        };
        let ci95 = proportion_interval(self.wins, self.games);
        let mean_turns = if self.winning_turns.is_empty() {
            None
        } else {
            Some(self.winning_turns.iter().mean())
        };

        AnalyticsSummary {
            run_id: self.run_id,
            games: self.games,
            wins: self.wins,
            incorrect: self.incorrect,
            timeouts: self.timeouts,
            win_rate,
            ci95,
            mean_turns_to_win: mean_turns,
            turns_ci95: mean_interval(&self.winning_turns),
            wins_by_seat: self.wins_by_seat,
            strategies: self.strategies,
        }
    }
}

fn z_score() -> f64 {
    Normal::new(0.0, 1.0)
        .map(|normal| normal.inverse_cdf(1.0 - (1.0 - CONFIDENCE_LEVEL) / 2.0))
        .unwrap_or(1.96)
}

/// Normal-approximation interval for a win proportion, clamped to [0, 1].
fn proportion_interval(successes: usize, trials: usize) -> (f64, f64) {
    if trials == 0 {
        return (0.0, 0.0);
    }
    let n = trials as f64;
    let p = successes as f64 / n;
    let margin = z_score() * (p * (1.0 - p) / n).sqrt();
    ((p - margin).max(0.0), (p + margin).min(1.0))
}

fn mean_interval(values: &[f64]) -> Option<(f64, f64)> {
    if values.len() < 2 {
        return None;
    }
    let mean = values.iter().mean();
    let std_dev = values.iter().std_dev();
    let margin = z_score() * std_dev / (values.len() as f64).sqrt();
    Some((mean - margin, mean + margin))
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSummary {
    pub run_id: String,
    pub games: usize,
    pub wins: usize,
    pub incorrect: usize,
    pub timeouts: usize,
    pub win_rate: f64,
    pub ci95: (f64, f64),
    pub mean_turns_to_win: Option<f64>,
    pub turns_ci95: Option<(f64, f64)>,
    pub wins_by_seat: Vec<usize>,
    pub strategies: StrategyTally,
}

impl AnalyticsSummary {
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# Simulation Summary: {}\n\n", self.run_id));
        out.push_str("| Games | Wins | Win % | 95% CI | Incorrect | Timeouts | Mean turns to win |\n");
        out.push_str("|-------|------|-------|--------|-----------|----------|-------------------|\n");
        let mean_turns = match (self.mean_turns_to_win, self.turns_ci95) {
            (Some(mean), Some((low, high))) => format!("{mean:.1} [{low:.1}, {high:.1}]"),
            (Some(mean), None) => format!("{mean:.1}"),
            _ => "-".to_string(),
        };
        out.push_str(&format!(
            "| {games} | {wins} | {rate:.1}% | [{low:.1}%, {high:.1}%] | {incorrect} | {timeouts} | {mean_turns} |\n\n",
            games = self.games,
            wins = self.wins,
            rate = self.win_rate * 100.0,
            low = self.ci95.0 * 100.0,
            high = self.ci95.1 * 100.0,
            incorrect = self.incorrect,
            timeouts = self.timeouts,
        ));

        out.push_str("## Wins by seat\n\n| Seat | Wins | Share |\n|------|------|-------|\n");
        for (seat, wins) in self.wins_by_seat.iter().enumerate() {
            let share = if self.wins == 0 {
                0.0
            } else {
                *wins as f64 / self.wins as f64 * 100.0
            };
            out.push_str(&format!("| {} | {wins} | {share:.1}% |\n", seat + 1));
        }

        let total = self.strategies.total();
        out.push_str("\n## Strategy mix\n\n| Strategy | Suggestions | Share |\n|----------|-------------|-------|\n");
        for (label, count) in [
            ("exploit", self.strategies.exploit),
            ("surgical_strike", self.strategies.surgical_strike),
            ("explore", self.strategies.explore),
        ] {
            let share = if total == 0 {
                0.0
            } else {
                count as f64 / total as f64 * 100.0
            };
            out.push_str(&format!("| {label} | {count} | {share:.1}% |\n"));
        }
        out
    }

    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        fs::write(path.as_ref(), self.to_markdown()).map_err(|source| AnalyticsError::Io {
            context: "writing summary markdown",
            source,
        })
    }
}
