//! Fixed-point inference over the knowledge grid.

use super::knowledge::{Certainty, KnowledgeError, KnowledgeGrid};
use super::mystery::MysteryTracker;
use cluedo_core::{Card, Category, Location};
use tracing::{Level, event};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeductionReport {
    /// Passes executed, including the final pass that found nothing new.
    pub passes: usize,
    /// False when the pass cap was hit while facts were still being learned.
    pub converged: bool,
    /// Whether any pass changed the grid or the mystery set.
    pub changed: bool,
}

/// Applies mystery pruning, solution elimination and location elimination
/// until a full pass changes nothing or `max_passes` is reached.
///
/// A contradiction found along the way does not stop the loop; the first one
/// is returned once the loop has finished.
pub(crate) fn run_deduction(
    grid: &mut KnowledgeGrid,
    mysteries: &mut MysteryTracker,
    max_passes: usize,
) -> Result<DeductionReport, KnowledgeError> {
    let mut report = DeductionReport::default();
    let mut failure = None;

    while report.passes < max_passes {
        report.passes += 1;
        let mut progressed = false;

        match mysteries.prune_and_solve(grid) {
            Ok(changed) => progressed |= changed,
            Err(err) => {
                // The offending mystery is already gone, so the set did change.
                progressed = true;
                failure.get_or_insert(err);
            }
        }
        progressed |= deduce_solution_by_elimination(grid);
        progressed |= deduce_locations_by_elimination(grid);

        if !progressed {
            report.converged = true;
            break;
        }
        report.changed = true;
    }

    if !report.converged {
        event!(
            target: "cluedo_bot::deduction",
            Level::WARN,
            passes = report.passes,
            "deduction stopped at pass cap"
        );
    }

    match failure {
        Some(err) => Err(err),
        None => Ok(report),
    }
}

/// For each category without a known solution card, commits the only card
/// still possible at the solution.
pub(crate) fn deduce_solution_by_elimination(grid: &mut KnowledgeGrid) -> bool {
    let mut changed = false;
    for category in Category::ALL {
        if grid.solution_card(category).is_some() {
            continue;
        }
        let open: Vec<&Card> = grid
            .catalog()
            .cards_in(category)
            .iter()
            .filter(|card| grid.certainty(card, &Location::Solution) == Some(Certainty::Maybe))
            .collect();
        let [card] = open.as_slice() else {
            continue;
        };
        let card = (*card).clone();
        changed |= commit(grid, &card, &Location::Solution, "solution elimination");
    }
    changed
}

/// Places every unresolved card whose row has a single `Maybe` left.
pub(crate) fn deduce_locations_by_elimination(grid: &mut KnowledgeGrid) -> bool {
    let mut changed = false;
    let cards = grid.catalog().cards().to_vec();
    for card in &cards {
        if grid.is_resolved(card) {
            continue;
        }
        let location = match grid.maybe_locations(card).as_slice() {
            [only] => (*only).clone(),
            _ => continue,
        };
        changed |= commit(grid, card, &location, "location elimination");
    }
    changed
}

fn commit(grid: &mut KnowledgeGrid, card: &Card, location: &Location, rule: &'static str) -> bool {
    match grid.mark(card, location) {
        Ok(marked) => {
            if marked {
                event!(
                    target: "cluedo_bot::deduction",
                    Level::DEBUG,
                    card = %card,
                    location = %location,
                    rule,
                    "deduced"
                );
            }
            marked
        }
        // Only reachable with a corrupted grid: the cell was just read as Maybe.
        Err(err) => {
            event!(
                target: "cluedo_bot::deduction",
                Level::WARN,
                error = %err,
                rule,
                "deduction rejected by grid"
            );
            false
        }
    }
}
