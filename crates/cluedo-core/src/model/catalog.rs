//! Static card catalog: the three categories and their cards.

use crate::model::card::Card;
use crate::model::category::Category;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const STANDARD_SUSPECTS: [&str; 6] = [
    "Miss Scarlett",
    "Colonel Mustard",
    "Mrs. White",
    "Mr. Green",
    "Mrs. Peacock",
    "Professor Plum",
];

const STANDARD_WEAPONS: [&str; 6] = [
    "Candlestick",
    "Dagger",
    "Lead Pipe",
    "Revolver",
    "Rope",
    "Wrench",
];

const STANDARD_ROOMS: [&str; 9] = [
    "Kitchen",
    "Ballroom",
    "Conservatory",
    "Dining Room",
    "Billiard Room",
    "Library",
    "Lounge",
    "Hall",
    "Study",
];

/// Immutable card catalog.
///
/// Each category is sorted alphabetically and the combined order is suspects,
/// then weapons, then rooms. That combined order is the catalog order used for
/// every deterministic tie-break in the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    categories: [Vec<Card>; 3],
    all: Vec<Card>,
    index: HashMap<Card, (Category, usize)>,
}

/// On-disk shape of a catalog file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogFile {
    pub suspects: Vec<String>,
    pub weapons: Vec<String>,
    pub rooms: Vec<String>,
}

impl Catalog {
    /// The classic board-game card set.
    pub fn standard() -> Self {
        let owned = |names: &[&str]| names.iter().map(|name| name.to_string()).collect();
        match Self::new(
            owned(&STANDARD_SUSPECTS),
            owned(&STANDARD_WEAPONS),
            owned(&STANDARD_ROOMS),
        ) {
            Ok(catalog) => catalog,
            Err(err) => unreachable!("standard catalog is valid: {err}"),
        }
    }

    pub fn new(
        suspects: Vec<String>,
        weapons: Vec<String>,
        rooms: Vec<String>,
    ) -> Result<Self, CatalogError> {
        let mut categories: [Vec<Card>; 3] = [Vec::new(), Vec::new(), Vec::new()];
        for (category, names) in Category::ALL.into_iter().zip([suspects, weapons, rooms]) {
            if names.is_empty() {
                return Err(CatalogError::EmptyCategory(category));
            }
            let mut cards = Vec::with_capacity(names.len());
            for name in names {
                let trimmed = name.trim();
                if trimmed.is_empty() {
                    return Err(CatalogError::BlankCard(category));
                }
                cards.push(Card::new(trimmed));
            }
            cards.sort();
            categories[category.index()] = cards;
        }

        let mut all = Vec::new();
        let mut index = HashMap::new();
        for category in Category::ALL {
            for card in &categories[category.index()] {
                if index.insert(card.clone(), (category, all.len())).is_some() {
                    return Err(CatalogError::DuplicateCard(card.name().to_string()));
                }
                all.push(card.clone());
            }
        }

        Ok(Self {
            categories,
            all,
            index,
        })
    }

    pub fn from_file(file: CatalogFile) -> Result<Self, CatalogError> {
        Self::new(file.suspects, file.weapons, file.rooms)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json).map_err(CatalogError::Parse)?;
        Self::from_file(file)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn to_file(&self) -> CatalogFile {
        let names = |category: Category| {
            self.cards_in(category)
                .iter()
                .map(|card| card.name().to_string())
                .collect()
        };
        CatalogFile {
            suspects: names(Category::Suspect),
            weapons: names(Category::Weapon),
            rooms: names(Category::Room),
        }
    }

    /// Every card in catalog order.
    pub fn cards(&self) -> &[Card] {
        &self.all
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Cards of one category, alphabetical. Never empty.
    pub fn cards_in(&self, category: Category) -> &[Card] {
        &self.categories[category.index()]
    }

    /// First card of a category; categories are validated non-empty.
    pub fn first_in(&self, category: Category) -> &Card {
        &self.categories[category.index()][0]
    }

    pub fn contains(&self, card: &Card) -> bool {
        self.index.contains_key(card)
    }

    pub fn category_of(&self, card: &Card) -> Option<Category> {
        self.index.get(card).map(|(category, _)| *category)
    }

    /// Position of `card` in catalog order.
    pub fn position(&self, card: &Card) -> Option<usize> {
        self.index.get(card).map(|(_, position)| *position)
    }

    /// Resolves a card by its name.
    pub fn lookup(&self, name: &str) -> Option<&Card> {
        self.index
            .get(name.trim())
            .map(|(_, position)| &self.all[*position])
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("catalog has no {} listed", .0.plural())]
    EmptyCategory(Category),
    #[error("catalog contains a blank {0} name")]
    BlankCard(Category),
    #[error("card '{0}' appears more than once in the catalog")]
    DuplicateCard(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_orders_categories_alphabetically() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.len(), 21);
        let suspects: Vec<_> = catalog
            .cards_in(Category::Suspect)
            .iter()
            .map(Card::name)
            .collect();
        assert_eq!(
            suspects,
            [
                "Colonel Mustard",
                "Miss Scarlett",
                "Mr. Green",
                "Mrs. Peacock",
                "Mrs. White",
                "Professor Plum"
            ]
        );
        assert_eq!(catalog.cards()[0].name(), "Colonel Mustard");
        assert_eq!(catalog.cards()[6].name(), "Candlestick");
        assert_eq!(catalog.cards()[12].name(), "Ballroom");
    }

    #[test]
    fn lookups_agree_with_catalog_order() {
        let catalog = Catalog::standard();
        let rope = catalog.lookup("Rope").cloned().unwrap();
        assert_eq!(catalog.category_of(&rope), Some(Category::Weapon));
        assert_eq!(catalog.position(&rope), Some(10));
        assert!(catalog.lookup("Spanner").is_none());
        assert!(!catalog.contains(&Card::from("Spanner")));
    }

    #[test]
    fn parses_json_catalog() {
        let json = r#"{
            "suspects": ["Plum", "Green"],
            "weapons": ["Rope"],
            "rooms": ["Hall", "Attic"]
        }"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(catalog.first_in(Category::Suspect).name(), "Green");
        assert_eq!(catalog.cards_in(Category::Room).len(), 2);
        assert_eq!(catalog.to_file().rooms, ["Attic", "Hall"]);
    }

    #[test]
    fn rejects_empty_category() {
        let err = Catalog::new(vec!["A".into()], vec![], vec!["B".into()]).unwrap_err();
        assert!(matches!(err, CatalogError::EmptyCategory(Category::Weapon)));
    }

    #[test]
    fn rejects_duplicate_names_across_categories() {
        let err = Catalog::new(vec!["Study".into()], vec!["Rope".into()], vec!["Study".into()])
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateCard(name) if name == "Study"));
    }
}
