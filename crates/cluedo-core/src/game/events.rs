//! Turn records delivered to agents and game events fanned out to listeners.

use crate::model::card::Card;
use crate::model::suggestion::Suggestion;
use serde::{Deserialize, Serialize};

/// Resolution of one suggestion as seen by a particular agent.
///
/// `revealed` is only populated for the suggester; everyone else learns who
/// disproved, not which card was shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnOutcome {
    pub suggester: String,
    pub suggestion: Suggestion,
    #[serde(default)]
    pub disprover: Option<String>,
    #[serde(default)]
    pub revealed: Option<Card>,
}

impl TurnOutcome {
    pub fn undisproved(suggester: impl Into<String>, suggestion: Suggestion) -> Self {
        Self {
            suggester: suggester.into(),
            suggestion,
            disprover: None,
            revealed: None,
        }
    }

    pub fn disproved(
        suggester: impl Into<String>,
        suggestion: Suggestion,
        disprover: impl Into<String>,
        revealed: Option<Card>,
    ) -> Self {
        Self {
            suggester: suggester.into(),
            suggestion,
            disprover: Some(disprover.into()),
            revealed,
        }
    }

    /// Copy with the shown card hidden, for bystanders.
    pub fn redacted(&self) -> Self {
        Self {
            revealed: None,
            ..self.clone()
        }
    }
}

/// A fact delivered to an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Observation {
    Turn(TurnOutcome),
    /// A card shown outside the suggestion flow; always a certain fact.
    DirectReveal { holder: String, card: Card },
}

/// Table-level events for renderers and recorders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    GameReady {
        players: Vec<String>,
    },
    TurnStarted {
        turn: usize,
        player: String,
    },
    SuggestionMade {
        player: String,
        suggestion: Suggestion,
    },
    Disproved {
        suggester: String,
        disprover: String,
    },
    NotDisproved {
        suggester: String,
    },
    GameOver {
        /// Player who accused; `correct` tells whether the accusation held.
        winner: Option<String>,
        accusation: Option<Suggestion>,
        solution: Suggestion,
        correct: bool,
    },
}

pub trait Listener {
    fn on_event(&mut self, event: &GameEvent);
}

impl<F> Listener for F
where
    F: FnMut(&GameEvent),
{
    fn on_event(&mut self, event: &GameEvent) {
        self(event)
    }
}

/// Synchronous fan-out. Each listener finishes before the next one is called,
/// in registration order.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Box<dyn Listener>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Box<dyn Listener>) {
        self.listeners.push(listener);
    }

    pub fn publish(&mut self, event: &GameEvent) {
        for listener in &mut self.listeners {
            listener.on_event(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn sample_suggestion() -> Suggestion {
        Suggestion::new("Mrs. White".into(), "Rope".into(), "Hall".into())
    }

    #[test]
    fn publish_preserves_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        for tag in ["first", "second"] {
            let log = Rc::clone(&log);
            bus.subscribe(Box::new(move |event: &GameEvent| {
                if let GameEvent::TurnStarted { turn, .. } = event {
                    log.borrow_mut().push(format!("{tag}:{turn}"));
                }
            }));
        }

        bus.publish(&GameEvent::TurnStarted {
            turn: 1,
            player: "P1".into(),
        });
        bus.publish(&GameEvent::TurnStarted {
            turn: 2,
            player: "P2".into(),
        });

        assert_eq!(bus.len(), 2);
        assert_eq!(
            *log.borrow(),
            ["first:1", "second:1", "first:2", "second:2"]
        );
    }

    #[test]
    fn redacted_outcome_hides_revealed_card() {
        let outcome =
            TurnOutcome::disproved("P1", sample_suggestion(), "P2", Some(Card::from("Rope")));
        let redacted = outcome.redacted();
        assert_eq!(redacted.disprover.as_deref(), Some("P2"));
        assert!(redacted.revealed.is_none());
        assert_eq!(redacted.suggestion, outcome.suggestion);
    }

    #[test]
    fn observation_serializes_with_kind_tag() {
        let reveal = Observation::DirectReveal {
            holder: "P3".into(),
            card: Card::from("Study"),
        };
        let json = serde_json::to_string(&reveal).unwrap();
        assert!(json.contains("\"kind\":\"direct_reveal\""));
        let back: Observation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, reveal);
    }
}
