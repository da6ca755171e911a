use crate::model::card::Card;
use crate::model::catalog::Catalog;
use crate::model::category::Category;
use crate::model::location::Location;
use crate::model::suggestion::Suggestion;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use thiserror::Error;

pub const MIN_PLAYERS: usize = 2;

/// Ground truth for one game: the hidden solution and every player's hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deal {
    solution: Suggestion,
    hands: Vec<(String, Vec<Card>)>,
}

impl Deal {
    /// Shuffles the full deck. Walking from the back, the first card seen of
    /// each category goes to the solution; the rest are put in catalog order
    /// and dealt round-robin starting with the first player.
    pub fn shuffled<R: Rng + ?Sized>(
        catalog: &Catalog,
        players: &[String],
        rng: &mut R,
    ) -> Result<Self, DealError> {
        validate_players(catalog, players)?;

        let mut deck = catalog.cards().to_vec();
        deck.shuffle(rng);

        let mut slots: [Option<Card>; 3] = [None, None, None];
        let mut remaining = Vec::with_capacity(deck.len());
        for card in deck.into_iter().rev() {
            let Some(category) = catalog.category_of(&card) else {
                continue;
            };
            let slot = &mut slots[category.index()];
            if slot.is_none() {
                *slot = Some(card);
            } else {
                remaining.push(card);
            }
        }
        let [Some(suspect), Some(weapon), Some(room)] = slots else {
            return Err(DealError::IncompleteCatalog);
        };
        remaining.sort_by_key(|card| catalog.position(card));

        let mut hands: Vec<(String, Vec<Card>)> = players
            .iter()
            .map(|name| (name.clone(), Vec::new()))
            .collect();
        let seats = hands.len();
        for (i, card) in remaining.into_iter().enumerate() {
            hands[i % seats].1.push(card);
        }

        Ok(Self {
            solution: Suggestion::new(suspect, weapon, room),
            hands,
        })
    }

    pub fn shuffled_with_seed(
        catalog: &Catalog,
        players: &[String],
        seed: u64,
    ) -> Result<Self, DealError> {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::shuffled(catalog, players, &mut rng)
    }

    /// Fixed deal for fixtures and replays.
    pub fn from_parts(solution: Suggestion, hands: Vec<(String, Vec<Card>)>) -> Self {
        Self { solution, hands }
    }

    pub fn solution(&self) -> &Suggestion {
        &self.solution
    }

    pub fn hands(&self) -> &[(String, Vec<Card>)] {
        &self.hands
    }

    pub fn players(&self) -> impl Iterator<Item = &str> {
        self.hands.iter().map(|(name, _)| name.as_str())
    }

    pub fn hand(&self, player: &str) -> Option<&[Card]> {
        self.hands
            .iter()
            .find(|(name, _)| name == player)
            .map(|(_, cards)| cards.as_slice())
    }

    /// Where `card` actually is.
    pub fn location_of(&self, card: &Card) -> Option<Location> {
        if self.solution.contains(card) {
            return Some(Location::Solution);
        }
        self.hands
            .iter()
            .find(|(_, cards)| cards.contains(card))
            .map(|(name, _)| Location::player(name.clone()))
    }

    pub fn check_accusation(&self, accusation: &Suggestion) -> bool {
        Category::ALL
            .into_iter()
            .all(|category| accusation.get(category) == self.solution.get(category))
    }
}

/// Player names are the first `count` suspects, shuffled into seat order.
pub fn seat_names<R: Rng + ?Sized>(
    catalog: &Catalog,
    count: usize,
    rng: &mut R,
) -> Result<Vec<String>, DealError> {
    let max = catalog.cards_in(Category::Suspect).len();
    if !(MIN_PLAYERS..=max).contains(&count) {
        return Err(DealError::PlayerCount {
            found: count,
            min: MIN_PLAYERS,
            max,
        });
    }
    let mut names: Vec<String> = catalog
        .cards_in(Category::Suspect)
        .iter()
        .take(count)
        .map(|card| card.name().to_string())
        .collect();
    names.shuffle(rng);
    Ok(names)
}

pub fn validate_players(catalog: &Catalog, players: &[String]) -> Result<(), DealError> {
    let max = catalog.cards_in(Category::Suspect).len();
    if !(MIN_PLAYERS..=max).contains(&players.len()) {
        return Err(DealError::PlayerCount {
            found: players.len(),
            min: MIN_PLAYERS,
            max,
        });
    }
    let mut seen = HashSet::new();
    for name in players {
        if name.trim().is_empty() {
            return Err(DealError::BlankPlayer);
        }
        if name.eq_ignore_ascii_case(Location::SOLUTION_LABEL) {
            return Err(DealError::ReservedPlayer(name.clone()));
        }
        if !seen.insert(name.as_str()) {
            return Err(DealError::DuplicatePlayer(name.clone()));
        }
    }
    Ok(())
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DealError {
    #[error("{found} players requested; expected between {min} and {max}")]
    PlayerCount { found: usize, min: usize, max: usize },
    #[error("player '{0}' is seated more than once")]
    DuplicatePlayer(String),
    #[error("'{0}' is reserved for the solution and cannot name a player")]
    ReservedPlayer(String),
    #[error("player names must not be blank")]
    BlankPlayer,
    #[error("catalog is missing a category")]
    IncompleteCatalog,
}
