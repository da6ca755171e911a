//! Tri-state knowledge matrix over every (card, location) pair.

use cluedo_core::{Card, Catalog, Category, Location};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{Level, event};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Certainty {
    Maybe,
    Yes,
    No,
}

/// Belief matrix owned by a single agent.
///
/// Rows follow catalog order; columns are the players in seat order followed by
/// the solution. A row holds at most one `Yes`, and once a cell is `Yes` it is
/// never revised. [`KnowledgeGrid::mark`] is the only way certainty changes.
#[derive(Debug, Clone)]
pub struct KnowledgeGrid {
    catalog: Arc<Catalog>,
    locations: Vec<Location>,
    cells: Vec<Certainty>,
}

impl KnowledgeGrid {
    pub fn new(catalog: Arc<Catalog>, players: &[String]) -> Self {
        let locations = Location::closed_set(players);
        let cells = vec![Certainty::Maybe; catalog.len() * locations.len()];
        Self {
            catalog,
            locations,
            cells,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Players in seat order, then the solution.
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn certainty(&self, card: &Card, location: &Location) -> Option<Certainty> {
        let row = self.row(card)?;
        let column = self.locations.iter().position(|loc| loc == location)?;
        Some(row[column])
    }

    /// All cells for `card`, aligned with [`KnowledgeGrid::locations`].
    pub fn row(&self, card: &Card) -> Option<&[Certainty]> {
        let index = self.catalog.position(card)?;
        let width = self.locations.len();
        Some(&self.cells[index * width..(index + 1) * width])
    }

    /// The location known to hold `card`.
    pub fn holder(&self, card: &Card) -> Option<&Location> {
        let row = self.row(card)?;
        row.iter()
            .position(|cell| *cell == Certainty::Yes)
            .map(|column| &self.locations[column])
    }

    pub fn is_resolved(&self, card: &Card) -> bool {
        self.holder(card).is_some()
    }

    pub fn maybe_locations(&self, card: &Card) -> Vec<&Location> {
        let Some(row) = self.row(card) else {
            return Vec::new();
        };
        row.iter()
            .zip(&self.locations)
            .filter(|(cell, _)| **cell == Certainty::Maybe)
            .map(|(_, location)| location)
            .collect()
    }

    /// The card proven to be the solution for `category`, if any.
    pub fn solution_card(&self, category: Category) -> Option<&Card> {
        self.catalog
            .cards_in(category)
            .iter()
            .find(|card| self.certainty(card, &Location::Solution) == Some(Certainty::Yes))
    }

    /// Proven solution cards indexed by [`Category::index`].
    pub fn known_solution(&self) -> [Option<&Card>; 3] {
        Category::ALL.map(|category| self.solution_card(category))
    }

    pub fn known_solution_count(&self) -> usize {
        self.known_solution().iter().flatten().count()
    }

    /// Commits `card` to `location`: that cell becomes `Yes` and every other
    /// location for the card becomes `No`.
    ///
    /// Returns `Ok(false)` when the fact was already known. Facts that would
    /// revise existing knowledge are rejected and leave the grid untouched.
    pub(crate) fn mark(&mut self, card: &Card, location: &Location) -> Result<bool, KnowledgeError> {
        let index = self
            .catalog
            .position(card)
            .ok_or_else(|| KnowledgeError::UnknownCard(card.clone()))?;
        let column = self
            .locations
            .iter()
            .position(|loc| loc == location)
            .ok_or_else(|| KnowledgeError::UnknownLocation(location.clone()))?;

        let width = self.locations.len();
        let row = &mut self.cells[index * width..(index + 1) * width];
        if row[column] == Certainty::Yes {
            return Ok(false);
        }
        if let Some(holder) = row.iter().position(|cell| *cell == Certainty::Yes) {
            return Err(KnowledgeError::Conflict {
                card: card.clone(),
                holder: self.locations[holder].clone(),
                attempted: location.clone(),
            });
        }
        if row[column] == Certainty::No {
            return Err(KnowledgeError::Excluded {
                card: card.clone(),
                location: location.clone(),
            });
        }

        row.fill(Certainty::No);
        row[column] = Certainty::Yes;
        event!(
            target: "cluedo_bot::knowledge",
            Level::DEBUG,
            card = %card,
            location = %location,
            "learned card location"
        );
        Ok(true)
    }

    #[cfg(test)]
    pub(crate) fn set(&mut self, card: &str, location: &Location, certainty: Certainty) {
        let index = self.catalog.position(&Card::from(card)).unwrap();
        let column = self.locations.iter().position(|loc| loc == location).unwrap();
        let width = self.locations.len();
        self.cells[index * width + column] = certainty;
    }
}

/// Violations surfaced by the engine. None of them modify the grid.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KnowledgeError {
    #[error("card '{0}' is not in the catalog")]
    UnknownCard(Card),
    #[error("'{0}' is not a location at this table")]
    UnknownLocation(Location),
    #[error("'{card}' is already known to be with {holder}; refusing to place it with {attempted}")]
    Conflict {
        card: Card,
        holder: Location,
        attempted: Location,
    },
    #[error("'{card}' was already ruled out for {location}")]
    Excluded { card: Card, location: Location },
    #[error("every candidate for the card shown by {disprover} has been ruled out")]
    EmptyMystery { disprover: Location },
}

impl KnowledgeError {
    /// True for errors that mean the observed events are mutually inconsistent,
    /// as opposed to malformed input.
    pub fn is_contradiction(&self) -> bool {
        matches!(
            self,
            KnowledgeError::Conflict { .. }
                | KnowledgeError::Excluded { .. }
                | KnowledgeError::EmptyMystery { .. }
        )
    }
}
