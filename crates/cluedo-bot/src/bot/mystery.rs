//! Disprovals where the shown card was not seen by this agent.

use super::knowledge::{Certainty, KnowledgeError, KnowledgeGrid};
use cluedo_core::{Card, Catalog, Location};
use tracing::{Level, event};

/// `disprover` holds at least one of `candidates`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mystery {
    disprover: Location,
    candidates: Vec<Card>,
}

impl Mystery {
    pub fn new(disprover: Location, mut candidates: Vec<Card>) -> Self {
        candidates.sort();
        candidates.dedup();
        Self {
            disprover,
            candidates,
        }
    }

    pub fn disprover(&self) -> &Location {
        &self.disprover
    }

    pub fn candidates(&self) -> &[Card] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Open mysteries in the order they were observed.
#[derive(Debug, Clone, Default)]
pub struct MysteryTracker {
    mysteries: Vec<Mystery>,
}

impl MysteryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.mysteries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mysteries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mystery> {
        self.mysteries.iter()
    }

    pub(crate) fn track(&mut self, mystery: Mystery) {
        self.mysteries.push(mystery);
    }

    /// Drops every candidate already ruled out for its disprover. A mystery
    /// narrowed to one card is committed to the grid and removed; one narrowed
    /// to nothing is removed and reported as a contradiction.
    ///
    /// Returns whether anything changed.
    pub(crate) fn prune_and_solve(
        &mut self,
        grid: &mut KnowledgeGrid,
    ) -> Result<bool, KnowledgeError> {
        let mut changed = false;
        let mut failure = None;
        let before = self.mysteries.len();
        let mut remaining = Vec::with_capacity(before);

        for mut mystery in self.mysteries.drain(..) {
            let original = mystery.candidates.len();
            mystery.candidates.retain(|card| {
                grid.certainty(card, &mystery.disprover) != Some(Certainty::No)
            });
            if mystery.candidates.len() < original {
                changed = true;
                event!(
                    target: "cluedo_bot::deduction",
                    Level::DEBUG,
                    disprover = %mystery.disprover,
                    candidates = ?mystery.candidates,
                    "narrowed mystery"
                );
            }

            match mystery.candidates.len() {
                0 => {
                    event!(
                        target: "cluedo_bot::deduction",
                        Level::WARN,
                        disprover = %mystery.disprover,
                        "mystery has no remaining candidates"
                    );
                    failure.get_or_insert(KnowledgeError::EmptyMystery {
                        disprover: mystery.disprover.clone(),
                    });
                }
                1 => {
                    let card = &mystery.candidates[0];
                    event!(
                        target: "cluedo_bot::deduction",
                        Level::INFO,
                        disprover = %mystery.disprover,
                        card = %card,
                        "solved mystery"
                    );
                    match grid.mark(card, &mystery.disprover) {
                        Ok(marked) => changed |= marked,
                        Err(err) => {
                            failure.get_or_insert(err);
                        }
                    }
                }
                _ => remaining.push(mystery),
            }
        }

        if remaining.len() < before {
            changed = true;
        }
        self.mysteries = remaining;
        match failure {
            Some(err) => Err(err),
            None => Ok(changed),
        }
    }

    /// Candidate cards ranked by how many open mysteries list them, most
    /// frequent first; ties keep catalog order.
    pub fn candidate_frequencies(&self, catalog: &Catalog) -> Vec<(Card, usize)> {
        let mut counts: Vec<(Card, usize)> = Vec::new();
        for card in self.mysteries.iter().flat_map(|mystery| mystery.candidates.iter()) {
            match counts.iter_mut().find(|(seen, _)| seen == card) {
                Some((_, count)) => *count += 1,
                None => counts.push((card.clone(), 1)),
            }
        }
        counts.sort_by(|(a, count_a), (b, count_b)| {
            count_b
                .cmp(count_a)
                .then_with(|| catalog.position(a).cmp(&catalog.position(b)))
        });
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn setup() -> (KnowledgeGrid, MysteryTracker) {
        let players = vec!["P1".to_string(), "P2".to_string(), "P3".to_string()];
        let grid = KnowledgeGrid::new(Arc::new(Catalog::standard()), &players);
        (grid, MysteryTracker::new())
    }

    fn cards(names: &[&str]) -> Vec<Card> {
        names.iter().map(|name| Card::from(*name)).collect()
    }

    #[test]
    fn prunes_ruled_out_candidate_and_keeps_mystery() {
        let (mut grid, mut tracker) = setup();
        let p2 = Location::player("P2");
        tracker.track(Mystery::new(p2.clone(), cards(&["Rope", "Dagger", "Lead Pipe"])));
        grid.set("Dagger", &p2, Certainty::No);

        assert_eq!(tracker.prune_and_solve(&mut grid), Ok(true));

        assert_eq!(tracker.len(), 1);
        let mystery = tracker.iter().next().unwrap();
        assert_eq!(mystery.candidates(), cards(&["Lead Pipe", "Rope"]).as_slice());
    }

    #[test]
    fn single_candidate_is_committed_and_removed() {
        let (mut grid, mut tracker) = setup();
        let p3 = Location::player("P3");
        tracker.track(Mystery::new(p3.clone(), cards(&["Conservatory"])));

        assert_eq!(tracker.prune_and_solve(&mut grid), Ok(true));

        assert!(tracker.is_empty());
        assert_eq!(
            grid.certainty(&Card::from("Conservatory"), &p3),
            Some(Certainty::Yes)
        );
    }

    #[test]
    fn untouched_mysteries_report_no_change() {
        let (mut grid, mut tracker) = setup();
        tracker.track(Mystery::new(
            Location::player("P2"),
            cards(&["Rope", "Hall", "Mr. Green"]),
        ));
        assert_eq!(tracker.prune_and_solve(&mut grid), Ok(false));
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.iter().next().unwrap().len(), 3);
    }

    #[test]
    fn fully_ruled_out_mystery_is_reported() {
        let (mut grid, mut tracker) = setup();
        let p2 = Location::player("P2");
        tracker.track(Mystery::new(p2.clone(), cards(&["Rope", "Hall"])));
        grid.set("Rope", &p2, Certainty::No);
        grid.set("Hall", &p2, Certainty::No);

        let err = tracker.prune_and_solve(&mut grid).unwrap_err();
        assert_eq!(err, KnowledgeError::EmptyMystery { disprover: p2 });
        assert!(tracker.is_empty());
    }

    #[test]
    fn frequencies_rank_by_count_then_catalog_order() {
        let (_, mut tracker) = setup();
        let catalog = Catalog::standard();
        tracker.track(Mystery::new(Location::player("P2"), cards(&["Rope", "Hall", "Mr. Green"])));
        tracker.track(Mystery::new(Location::player("P3"), cards(&["Rope", "Study", "Dagger"])));
        tracker.track(Mystery::new(Location::player("P3"), cards(&["Hall", "Dagger", "Mrs. White"])));

        let ranked = tracker.candidate_frequencies(&catalog);
        let names: Vec<_> = ranked.iter().map(|(card, n)| (card.name(), *n)).collect();
        assert_eq!(
            names,
            [
                ("Dagger", 2),
                ("Rope", 2),
                ("Hall", 2),
                ("Mr. Green", 1),
                ("Mrs. White", 1),
                ("Study", 1),
            ]
        );
    }
}
