use cluedo_core::Card;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChooserKind {
    #[default]
    Random,
    Deterministic,
}

/// Picks one card among equally valid options. This is the only place the
/// engine's behaviour depends on randomness.
#[derive(Debug, Clone)]
pub enum Chooser {
    /// Uniform over the options, driven by an injected RNG.
    Random(StdRng),
    /// Always the alphabetically first option.
    Deterministic,
}

impl Chooser {
    pub fn random(seed: u64) -> Self {
        Chooser::Random(StdRng::seed_from_u64(seed))
    }

    pub fn deterministic() -> Self {
        Chooser::Deterministic
    }

    pub fn from_kind(kind: ChooserKind, seed: u64) -> Self {
        match kind {
            ChooserKind::Random => Self::random(seed),
            ChooserKind::Deterministic => Self::deterministic(),
        }
    }

    pub fn kind(&self) -> ChooserKind {
        match self {
            Chooser::Random(_) => ChooserKind::Random,
            Chooser::Deterministic => ChooserKind::Deterministic,
        }
    }

    pub fn choose(&mut self, options: &[Card]) -> Option<Card> {
        match self {
            Chooser::Random(rng) => options.choose(rng).cloned(),
            Chooser::Deterministic => options.iter().min().cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<Card> {
        ["Wrench", "Candlestick", "Rope"]
            .into_iter()
            .map(Card::from)
            .collect()
    }

    #[test]
    fn deterministic_picks_alphabetically_first() {
        let mut chooser = Chooser::deterministic();
        assert_eq!(chooser.choose(&options()), Some(Card::from("Candlestick")));
        assert_eq!(chooser.kind(), ChooserKind::Deterministic);
    }

    #[test]
    fn empty_options_yield_none() {
        assert_eq!(Chooser::deterministic().choose(&[]), None);
        assert_eq!(Chooser::random(1).choose(&[]), None);
    }

    #[test]
    fn seeded_random_choices_repeat() {
        let mut a = Chooser::random(42);
        let mut b = Chooser::random(42);
        let options = options();
        for _ in 0..16 {
            let pick = a.choose(&options);
            assert_eq!(pick, b.choose(&options));
            assert!(pick.is_some_and(|card| options.contains(&card)));
        }
    }
}
