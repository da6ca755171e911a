//! Recorded games: one player's view of a table, replayed into a bot.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cluedo_bot::{BotParams, ChooserKind, DeductionBot, DeductionReport, KnowledgeError};
use cluedo_core::{
    Card, Catalog, Category, DealError, Observation, TurnOutcome, validate_players,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{Level, event};

/// What one player saw: the table, their hand and every observation in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub players: Vec<String>,
    pub me: String,
    #[serde(default)]
    pub hand: Vec<Card>,
    #[serde(default)]
    pub observations: Vec<TranscriptEntry>,
}

/// A suggestion and its resolution, or a card shown outside a suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TranscriptEntry {
    Turn(TurnOutcome),
    Reveal { holder: String, card: Card },
}

impl From<TranscriptEntry> for Observation {
    fn from(entry: TranscriptEntry) -> Self {
        match entry {
            TranscriptEntry::Turn(outcome) => Observation::Turn(outcome),
            TranscriptEntry::Reveal { holder, card } => Observation::DirectReveal { holder, card },
        }
    }
}

#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("failed to read transcript {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse transcript: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid table: {0}")]
    Players(#[from] DealError),
    #[error("{context}: '{name}' is not seated at this table")]
    UnknownPlayer { context: String, name: String },
    #[error("{context}: '{card}' is not in the catalog")]
    UnknownCard { context: String, card: Card },
    #[error("{context}: {message}")]
    Invalid { context: String, message: String },
    #[error("bot could not be seated: {0}")]
    Bot(#[from] KnowledgeError),
}

/// Observation that was replayed but contradicted earlier facts.
#[derive(Debug)]
pub struct ReplayIssue {
    pub index: usize,
    pub error: KnowledgeError,
}

pub struct Replay {
    pub bot: DeductionBot,
    pub issues: Vec<ReplayIssue>,
    pub last_report: DeductionReport,
}

impl Transcript {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TranscriptError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| TranscriptError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, TranscriptError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Checks every name and card against the table and the catalog.
    pub fn validate(&self, catalog: &Catalog) -> Result<(), TranscriptError> {
        validate_players(catalog, &self.players)?;
        self.require_player("me", &self.me)?;
        for card in &self.hand {
            require_card(catalog, "hand", card)?;
        }

        for (index, entry) in self.observations.iter().enumerate() {
            let context = format!("observation {}", index + 1);
            match entry {
                TranscriptEntry::Turn(outcome) => self.validate_turn(catalog, &context, outcome)?,
                TranscriptEntry::Reveal { holder, card } => {
                    self.require_player(&context, holder)?;
                    require_card(catalog, &context, card)?;
                }
            }
        }
        Ok(())
    }

    fn validate_turn(
        &self,
        catalog: &Catalog,
        context: &str,
        outcome: &TurnOutcome,
    ) -> Result<(), TranscriptError> {
        self.require_player(context, &outcome.suggester)?;
        for category in Category::ALL {
            let card = outcome.suggestion.get(category);
            match catalog.category_of(card) {
                Some(found) if found == category => {}
                Some(found) => {
                    return Err(TranscriptError::Invalid {
                        context: context.to_string(),
                        message: format!("'{card}' is a {found}, not a {category}"),
                    });
                }
                None => return Err(unknown_card(context, card)),
            }
        }

        if let Some(disprover) = &outcome.disprover {
            self.require_player(context, disprover)?;
            if *disprover == outcome.suggester {
                return Err(TranscriptError::Invalid {
                    context: context.to_string(),
                    message: format!("'{disprover}' cannot disprove their own suggestion"),
                });
            }
        }
        if let Some(card) = &outcome.revealed {
            if outcome.disprover.is_none() {
                return Err(TranscriptError::Invalid {
                    context: context.to_string(),
                    message: "a revealed card needs a disprover".to_string(),
                });
            }
            if !outcome.suggestion.contains(card) {
                return Err(TranscriptError::Invalid {
                    context: context.to_string(),
                    message: format!("revealed card '{card}' was not suggested"),
                });
            }
        }
        Ok(())
    }

    fn require_player(&self, context: &str, name: &str) -> Result<(), TranscriptError> {
        if self.players.iter().any(|player| player == name) {
            Ok(())
        } else {
            Err(TranscriptError::UnknownPlayer {
                context: context.to_string(),
                name: name.to_string(),
            })
        }
    }

    /// Validates, then feeds the hand and every observation to a fresh bot
    /// seated as `me`. Contradictions are collected rather than fatal.
    pub fn replay(
        &self,
        catalog: Arc<Catalog>,
        chooser: ChooserKind,
        seed: u64,
        params: BotParams,
    ) -> Result<Replay, TranscriptError> {
        self.validate(&catalog)?;

        let mut bot =
            DeductionBot::seeded(catalog, self.players.clone(), &self.me, chooser, seed, params)?;
        let mut issues = Vec::new();
        let mut last_report = DeductionReport::default();

        match bot.receive_hand(&self.hand) {
            Ok(report) => last_report = report,
            Err(error) => issues.push(ReplayIssue { index: 0, error }),
        }

        for (index, entry) in self.observations.iter().enumerate() {
            let observation = Observation::from(entry.clone());
            match bot.handle_event(&observation) {
                Ok(report) => last_report = report,
                Err(error) => {
                    event!(
                        target: "cluedo_sim::transcript",
                        Level::WARN,
                        observation = index + 1,
                        error = %error,
                        "observation contradicts earlier facts"
                    );
                    issues.push(ReplayIssue {
                        index: index + 1,
                        error,
                    });
                }
            }
        }

        event!(
            target: "cluedo_sim::transcript",
            Level::INFO,
            player = %self.me,
            observations = self.observations.len(),
            issues = issues.len(),
            "transcript replayed"
        );

        Ok(Replay {
            bot,
            issues,
            last_report,
        })
    }
}

fn require_card(catalog: &Catalog, context: &str, card: &Card) -> Result<(), TranscriptError> {
    if catalog.contains(card) {
        Ok(())
    } else {
        Err(unknown_card(context, card))
    }
}

fn unknown_card(context: &str, card: &Card) -> TranscriptError {
    TranscriptError::UnknownCard {
        context: context.to_string(),
        card: card.clone(),
    }
}
