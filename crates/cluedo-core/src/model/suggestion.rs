use crate::model::card::Card;
use crate::model::catalog::Catalog;
use crate::model::category::Category;
use core::fmt;
use serde::{Deserialize, Serialize};

/// One card per category. Also used for accusations and the solution itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Suggestion {
    pub suspect: Card,
    pub weapon: Card,
    pub room: Card,
}

impl Suggestion {
    pub fn new(suspect: Card, weapon: Card, room: Card) -> Self {
        Self {
            suspect,
            weapon,
            room,
        }
    }

    /// Builds a suggestion from three cards in any order, provided the catalog
    /// places exactly one of them in each category.
    pub fn from_cards(catalog: &Catalog, cards: [Card; 3]) -> Option<Self> {
        let mut slots: [Option<Card>; 3] = [None, None, None];
        for card in cards {
            let category = catalog.category_of(&card)?;
            let slot = &mut slots[category.index()];
            if slot.is_some() {
                return None;
            }
            *slot = Some(card);
        }
        let [Some(suspect), Some(weapon), Some(room)] = slots else {
            return None;
        };
        Some(Self::new(suspect, weapon, room))
    }

    pub fn get(&self, category: Category) -> &Card {
        match category {
            Category::Suspect => &self.suspect,
            Category::Weapon => &self.weapon,
            Category::Room => &self.room,
        }
    }

    /// Cards in category order.
    pub fn cards(&self) -> [&Card; 3] {
        [&self.suspect, &self.weapon, &self.room]
    }

    pub fn contains(&self, card: &Card) -> bool {
        self.cards().into_iter().any(|candidate| candidate == card)
    }
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.suspect, self.weapon, self.room)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_cards_places_each_card_in_its_category() {
        let catalog = Catalog::standard();
        let suggestion = Suggestion::from_cards(
            &catalog,
            ["Hall".into(), "Mrs. Peacock".into(), "Rope".into()],
        )
        .unwrap();
        assert_eq!(suggestion.suspect.name(), "Mrs. Peacock");
        assert_eq!(suggestion.get(Category::Weapon).name(), "Rope");
        assert_eq!(suggestion.to_string(), "Mrs. Peacock, Rope, Hall");
    }

    #[test]
    fn from_cards_rejects_two_cards_of_one_category() {
        let catalog = Catalog::standard();
        let result = Suggestion::from_cards(
            &catalog,
            ["Hall".into(), "Study".into(), "Rope".into()],
        );
        assert!(result.is_none());
    }

    #[test]
    fn contains_checks_every_slot() {
        let suggestion = Suggestion::new("Mr. Green".into(), "Dagger".into(), "Lounge".into());
        assert!(suggestion.contains(&Card::from("Lounge")));
        assert!(!suggestion.contains(&Card::from("Rope")));
    }
}
