use cluedo_core::Card;
use std::collections::VecDeque;

/// Bounded FIFO of recently targeted cards; the oldest entry falls out first.
#[derive(Debug, Clone)]
pub struct RecentTargets {
    capacity: usize,
    entries: VecDeque<Card>,
}

impl RecentTargets {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, card: Card) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(card);
    }

    pub fn contains(&self, card: &Card) -> bool {
        self.entries.contains(card)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::RecentTargets;
    use cluedo_core::Card;

    #[test]
    fn evicts_oldest_beyond_capacity() {
        let mut recent = RecentTargets::new(3);
        for name in ["Rope", "Hall", "Dagger", "Study"] {
            recent.push(Card::from(name));
        }
        assert_eq!(recent.len(), 3);
        assert!(!recent.contains(&Card::from("Rope")));
        assert!(recent.contains(&Card::from("Study")));
        let order: Vec<_> = recent.iter().map(Card::name).collect();
        assert_eq!(order, ["Hall", "Dagger", "Study"]);
    }

    #[test]
    fn zero_capacity_remembers_nothing() {
        let mut recent = RecentTargets::new(0);
        recent.push(Card::from("Rope"));
        assert!(recent.is_empty());
    }
}
