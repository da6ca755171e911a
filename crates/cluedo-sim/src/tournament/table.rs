use std::sync::Arc;

use cluedo_bot::{BotParams, ChooserKind, DeductionBot, Strategy};
use cluedo_core::{Catalog, Deal, EventBus, GameEvent, Observation, Suggestion, TurnOutcome};
use serde::Serialize;
use tracing::{Level, event};

use super::RunnerError;

/// One game in progress: the ground truth and a bot in every seat.
pub struct Table {
    deal: Deal,
    bots: Vec<DeductionBot>,
    max_turns: usize,
}

/// How a finished game went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOutcome {
    pub players: Vec<String>,
    /// Player who accused, right or wrong.
    pub accuser: Option<String>,
    pub accusation: Option<Suggestion>,
    pub correct: bool,
    /// Turns taken, counting the accusing turn.
    pub turns: usize,
    pub solution: Suggestion,
    pub strategies: StrategyTally,
}

impl GameOutcome {
    pub fn winner(&self) -> Option<&str> {
        self.accuser.as_deref().filter(|_| self.correct)
    }

    /// Seat index of the accuser.
    pub fn accuser_seat(&self) -> Option<usize> {
        let accuser = self.accuser.as_deref()?;
        self.players.iter().position(|name| name == accuser)
    }

    pub fn timed_out(&self) -> bool {
        self.accuser.is_none()
    }
}

/// Number of suggestions produced by each strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StrategyTally {
    pub exploit: usize,
    pub surgical_strike: usize,
    pub explore: usize,
}

impl StrategyTally {
    pub fn record(&mut self, strategy: Strategy) {
        match strategy {
            Strategy::Exploit => self.exploit += 1,
            Strategy::SurgicalStrike => self.surgical_strike += 1,
            Strategy::Explore => self.explore += 1,
        }
    }

    pub fn merge(&mut self, other: &StrategyTally) {
        self.exploit += other.exploit;
        self.surgical_strike += other.surgical_strike;
        self.explore += other.explore;
    }

    pub fn total(&self) -> usize {
        self.exploit + self.surgical_strike + self.explore
    }
}

impl Table {
    /// Seats one bot per dealt hand. `seeds` supplies one seed per seat.
    pub fn new(
        catalog: Arc<Catalog>,
        deal: Deal,
        chooser: ChooserKind,
        params: BotParams,
        seeds: &[u64],
        max_turns: usize,
    ) -> Result<Self, RunnerError> {
        let players: Vec<String> = deal.players().map(str::to_string).collect();
        let mut bots = Vec::with_capacity(players.len());
        for ((name, hand), seed) in deal.hands().iter().zip(seeds.iter().copied()) {
            let mut bot = DeductionBot::seeded(
                Arc::clone(&catalog),
                players.clone(),
                name.clone(),
                chooser,
                seed,
                params,
            )
            .map_err(|source| RunnerError::bot(name, source))?;
            bot.receive_hand(hand)
                .map_err(|source| RunnerError::bot(name, source))?;
            bots.push(bot);
        }
        if bots.len() != players.len() {
            return Err(RunnerError::game(format!(
                "{} seeds supplied for {} seats",
                seeds.len(),
                players.len()
            )));
        }

        Ok(Self {
            deal,
            bots,
            max_turns,
        })
    }

    pub fn deal(&self) -> &Deal {
        &self.deal
    }

    pub fn bots(&self) -> &[DeductionBot] {
        &self.bots
    }

    pub fn bot(&self, name: &str) -> Option<&DeductionBot> {
        self.bots.iter().find(|bot| bot.name() == name)
    }

    /// Plays until someone accuses or the turn limit is reached. Events are
    /// published to `bus` as they happen.
    pub fn play(&mut self, bus: &mut EventBus) -> Result<GameOutcome, RunnerError> {
        let players: Vec<String> = self.bots.iter().map(|bot| bot.name().to_string()).collect();
        let seats = players.len();
        let mut strategies = StrategyTally::default();

        bus.publish(&GameEvent::GameReady {
            players: players.clone(),
        });

        for turn in 0..self.max_turns {
            let current = turn % seats;
            let player = players[current].clone();
            bus.publish(&GameEvent::TurnStarted {
                turn: turn + 1,
                player: player.clone(),
            });

            if let Some(accusation) = self.bots[current].should_accuse() {
                let correct = self.deal.check_accusation(&accusation);
                event!(
                    target: "cluedo_sim::table",
                    Level::INFO,
                    turn = turn + 1,
                    player = %player,
                    accusation = %accusation,
                    correct,
                    "accusation"
                );
                bus.publish(&GameEvent::GameOver {
                    winner: Some(player.clone()),
                    accusation: Some(accusation.clone()),
                    solution: self.deal.solution().clone(),
                    correct,
                });
                return Ok(GameOutcome {
                    players,
                    accuser: Some(player),
                    accusation: Some(accusation),
                    correct,
                    turns: turn + 1,
                    solution: self.deal.solution().clone(),
                    strategies,
                });
            }

            let plan = self.bots[current].plan_suggestion();
            strategies.record(plan.strategy);
            let suggestion = plan.suggestion;
            bus.publish(&GameEvent::SuggestionMade {
                player: player.clone(),
                suggestion: suggestion.clone(),
            });

            let outcome = self.resolve(current, &player, suggestion);
            match &outcome.disprover {
                Some(disprover) => bus.publish(&GameEvent::Disproved {
                    suggester: player.clone(),
                    disprover: disprover.clone(),
                }),
                None => bus.publish(&GameEvent::NotDisproved {
                    suggester: player.clone(),
                }),
            }

            let redacted = Observation::Turn(outcome.redacted());
            let full = Observation::Turn(outcome);
            for (seat, bot) in self.bots.iter_mut().enumerate() {
                let seen = if seat == current { &full } else { &redacted };
                bot.handle_event(seen)
                    .map_err(|source| RunnerError::bot(bot.name(), source))?;
            }
        }

        bus.publish(&GameEvent::GameOver {
            winner: None,
            accusation: None,
            solution: self.deal.solution().clone(),
            correct: false,
        });
        Ok(GameOutcome {
            players,
            accuser: None,
            accusation: None,
            correct: false,
            turns: self.max_turns,
            solution: self.deal.solution().clone(),
            strategies,
        })
    }

    /// Asks the other seats in order after the suggester; the first one able
    /// to show a card disproves.
    fn resolve(&mut self, current: usize, player: &str, suggestion: Suggestion) -> TurnOutcome {
        let seats = self.bots.len();
        for offset in 1..seats {
            let seat = (current + offset) % seats;
            let responder = &mut self.bots[seat];
            if let Some(card) = responder.choose_card_to_show(&suggestion) {
                return TurnOutcome::disproved(player, suggestion, responder.name(), Some(card));
            }
        }
        TurnOutcome::undisproved(player, suggestion)
    }
}
