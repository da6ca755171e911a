//! Suggestion policies, tried in priority order.

use super::chooser::Chooser;
use super::knowledge::{Certainty, KnowledgeGrid};
use super::mystery::MysteryTracker;
use super::recent::RecentTargets;
use cluedo_core::{Card, Catalog, Category, Hand, Location, Suggestion};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;
use tracing::{Level, event};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Re-asserts proven solution cards while probing the open categories.
    Exploit,
    /// Aims at the mystery candidate most likely to settle open mysteries.
    SurgicalStrike,
    /// Fresh unknown card in every category. Always applicable.
    Explore,
}

impl Strategy {
    pub const PRIORITY: [Strategy; 3] = [
        Strategy::Exploit,
        Strategy::SurgicalStrike,
        Strategy::Explore,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Strategy::Exploit => "exploit",
            Strategy::SurgicalStrike => "surgical_strike",
            Strategy::Explore => "explore",
        }
    }

    pub fn is_applicable(self, ctx: &StrategyContext<'_>) -> bool {
        match self {
            Strategy::Exploit => {
                let known = ctx.grid.known_solution_count();
                known > 0 && known < Category::ALL.len()
            }
            Strategy::SurgicalStrike => !ctx.mysteries.is_empty(),
            Strategy::Explore => true,
        }
    }

    /// Builds a suggestion, or `None` when the strategy does not apply.
    pub fn build(self, ctx: &mut StrategyContext<'_>) -> Option<SuggestionPlan> {
        if !self.is_applicable(ctx) {
            return None;
        }
        let plan = match self {
            Strategy::Exploit => {
                let known = ctx.grid.known_solution().map(|card| card.cloned());
                let suggestion = ctx.fill(known);
                SuggestionPlan::new(self, suggestion, None)
            }
            Strategy::SurgicalStrike => {
                let target = ctx.pick_target()?;
                ctx.recent.push(target.clone());
                let suggestion = ctx.build_around(&target);
                SuggestionPlan::new(self, suggestion, Some(target))
            }
            Strategy::Explore => {
                let suggestion = ctx.fill([None, None, None]);
                SuggestionPlan::new(self, suggestion, None)
            }
        };
        Some(plan)
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionPlan {
    pub strategy: Strategy,
    pub suggestion: Suggestion,
    /// The surgical-strike target, when that strategy fired.
    pub target: Option<Card>,
}

impl SuggestionPlan {
    fn new(strategy: Strategy, suggestion: Suggestion, target: Option<Card>) -> Self {
        Self {
            strategy,
            suggestion,
            target,
        }
    }
}

/// Read access to the agent's knowledge plus the mutable sources of choice.
pub struct StrategyContext<'a> {
    pub catalog: &'a Catalog,
    pub grid: &'a KnowledgeGrid,
    pub mysteries: &'a MysteryTracker,
    pub hand: &'a Hand,
    pub chooser: &'a mut Chooser,
    pub rng: &'a mut StdRng,
    pub recent: &'a mut RecentTargets,
}

impl StrategyContext<'_> {
    /// Picks a card for `category` that is most likely to teach something:
    /// not held and not ruled out of the solution, then merely not held, then
    /// anything.
    pub fn pick_unknown_card(&mut self, category: Category) -> Card {
        let cards = self.catalog.cards_in(category);
        let open: Vec<Card> = cards
            .iter()
            .filter(|card| {
                !self.hand.contains(card)
                    && self.grid.certainty(card, &Location::Solution) == Some(Certainty::Maybe)
            })
            .cloned()
            .collect();
        if let Some(card) = self.chooser.choose(&open) {
            return card;
        }

        let not_held: Vec<Card> = cards
            .iter()
            .filter(|card| !self.hand.contains(card))
            .cloned()
            .collect();
        if let Some(card) = self.chooser.choose(&not_held) {
            return card;
        }

        self.chooser
            .choose(cards)
            .unwrap_or_else(|| self.catalog.first_in(category).clone())
    }

    fn fill(&mut self, slots: [Option<Card>; 3]) -> Suggestion {
        let [suspect, weapon, room] = slots;
        let suspect = suspect.unwrap_or_else(|| self.pick_unknown_card(Category::Suspect));
        let weapon = weapon.unwrap_or_else(|| self.pick_unknown_card(Category::Weapon));
        let room = room.unwrap_or_else(|| self.pick_unknown_card(Category::Room));
        Suggestion::new(suspect, weapon, room)
    }

    /// Highest-ranked mystery candidate not targeted recently, preferring
    /// candidates whose location is still unknown. Falls back to the
    /// unfiltered ranking when every candidate is recent.
    fn pick_target(&self) -> Option<Card> {
        let ranked = self.mysteries.candidate_frequencies(self.catalog);
        let fresh = |card: &Card| !self.recent.contains(card);
        ranked
            .iter()
            .find(|(card, _)| fresh(card) && !self.grid.is_resolved(card))
            .or_else(|| ranked.iter().find(|(card, _)| fresh(card)))
            .or_else(|| ranked.first())
            .map(|(card, _)| card.clone())
    }

    /// Places `target` in its category, covers the other categories with own
    /// cards in shuffled order, then fills any gap with unknown cards.
    fn build_around(&mut self, target: &Card) -> Suggestion {
        let mut slots: [Option<Card>; 3] = [None, None, None];
        if let Some(category) = self.catalog.category_of(target) {
            slots[category.index()] = Some(target.clone());
        }

        let mut own: Vec<Card> = self.hand.cards().to_vec();
        own.shuffle(&mut *self.rng);
        for card in own {
            let Some(category) = self.catalog.category_of(&card) else {
                continue;
            };
            let slot = &mut slots[category.index()];
            if slot.is_none() {
                *slot = Some(card);
            }
        }
        self.fill(slots)
    }
}

/// Runs the strategies in priority order. Explore guarantees a result.
pub fn plan_suggestion(ctx: &mut StrategyContext<'_>) -> SuggestionPlan {
    let plan = Strategy::PRIORITY
        .into_iter()
        .find_map(|strategy| strategy.build(ctx))
        .unwrap_or_else(|| {
            let suggestion = ctx.fill([None, None, None]);
            SuggestionPlan::new(Strategy::Explore, suggestion, None)
        });
    log_plan(ctx, &plan);
    plan
}

fn log_plan(ctx: &StrategyContext<'_>, plan: &SuggestionPlan) {
    if !tracing::enabled!(target: "cluedo_bot::strategy", Level::INFO) {
        return;
    }
    let target = plan
        .target
        .as_ref()
        .map(|card| card.name().to_string())
        .unwrap_or_default();
    event!(
        target: "cluedo_bot::strategy",
        Level::INFO,
        strategy = %plan.strategy,
        known = ctx.grid.known_solution_count(),
        mysteries = ctx.mysteries.len(),
        target = %target,
        suggestion = %plan.suggestion,
        "planned suggestion"
    );
}
