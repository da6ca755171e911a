mod chooser;
mod deduction;
mod knowledge;
mod mystery;
mod params;
mod recent;
mod strategy;

pub use chooser::{Chooser, ChooserKind};
pub use deduction::DeductionReport;
pub use knowledge::{Certainty, KnowledgeError, KnowledgeGrid};
pub use mystery::{Mystery, MysteryTracker};
pub use params::BotParams;
pub use recent::RecentTargets;
pub use strategy::{Strategy, StrategyContext, SuggestionPlan, plan_suggestion};

use cluedo_core::{Card, Catalog, Hand, Location, Observation, Suggestion, TurnOutcome};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::sync::Arc;
use tracing::{Level, event};

/// One deduction agent seated at a table.
///
/// Owns its grid, mysteries, recent targets and sources of randomness; nothing
/// is shared with other agents except the read-only catalog.
#[derive(Debug, Clone)]
pub struct DeductionBot {
    name: String,
    me: Location,
    catalog: Arc<Catalog>,
    players: Vec<String>,
    hand: Hand,
    grid: KnowledgeGrid,
    mysteries: MysteryTracker,
    recent_targets: RecentTargets,
    chooser: Chooser,
    rng: StdRng,
    params: BotParams,
}

impl DeductionBot {
    /// Seats `name` among `players` (seat order) with an empty notebook.
    pub fn new(
        catalog: Arc<Catalog>,
        players: Vec<String>,
        name: impl Into<String>,
        chooser: Chooser,
        rng: StdRng,
        params: BotParams,
    ) -> Result<Self, KnowledgeError> {
        let name = name.into();
        let me = Location::player(name.clone());
        if !players.contains(&name) {
            return Err(KnowledgeError::UnknownLocation(me));
        }
        let grid = KnowledgeGrid::new(Arc::clone(&catalog), &players);
        event!(
            target: "cluedo_bot::events",
            Level::DEBUG,
            player = %name,
            players = players.len(),
            chooser = ?chooser.kind(),
            "deduction engine ready"
        );
        Ok(Self {
            name,
            me,
            catalog,
            players,
            hand: Hand::new(),
            grid,
            mysteries: MysteryTracker::new(),
            recent_targets: RecentTargets::new(params.recent_target_capacity),
            chooser,
            rng,
            params,
        })
    }

    /// Like [`DeductionBot::new`], with the RNG and a chooser of `kind` both
    /// derived from `seed`.
    pub fn seeded(
        catalog: Arc<Catalog>,
        players: Vec<String>,
        name: impl Into<String>,
        kind: ChooserKind,
        seed: u64,
        params: BotParams,
    ) -> Result<Self, KnowledgeError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let chooser = Chooser::from_kind(kind, rng.next_u64());
        Self::new(catalog, players, name, chooser, rng, params)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Players in seat order.
    pub fn players(&self) -> &[String] {
        &self.players
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn knowledge(&self) -> &KnowledgeGrid {
        &self.grid
    }

    pub fn mysteries(&self) -> &MysteryTracker {
        &self.mysteries
    }

    pub fn recent_targets(&self) -> &RecentTargets {
        &self.recent_targets
    }

    pub fn params(&self) -> BotParams {
        self.params
    }

    /// Records the dealt cards as held by this agent, then deduces.
    pub fn receive_hand(&mut self, cards: &[Card]) -> Result<DeductionReport, KnowledgeError> {
        let mut applied: Result<(), KnowledgeError> = Ok(());
        for card in cards {
            if !self.catalog.contains(card) {
                log_unknown_card(card, &self.me);
                continue;
            }
            let me = self.me.clone();
            match self.learn(card, &me) {
                Ok(_) => {
                    self.hand.add(card.clone());
                }
                Err(err) => {
                    if applied.is_ok() {
                        applied = Err(err);
                    }
                }
            }
        }
        let deduced = self.deduce();
        applied?;
        deduced
    }

    /// Folds one observation into the notebook and runs deduction to a fixed
    /// point.
    ///
    /// Facts that contradict what is already known are not applied and come
    /// back as errors; everything else from the observation is still used.
    pub fn handle_event(
        &mut self,
        observation: &Observation,
    ) -> Result<DeductionReport, KnowledgeError> {
        let applied = self.absorb(observation);
        let deduced = self.deduce();
        applied?;
        deduced
    }

    /// The next suggestion together with the strategy that produced it.
    pub fn plan_suggestion(&mut self) -> SuggestionPlan {
        let mut ctx = StrategyContext {
            catalog: &self.catalog,
            grid: &self.grid,
            mysteries: &self.mysteries,
            hand: &self.hand,
            chooser: &mut self.chooser,
            rng: &mut self.rng,
            recent: &mut self.recent_targets,
        };
        plan_suggestion(&mut ctx)
    }

    pub fn make_suggestion(&mut self) -> Suggestion {
        self.plan_suggestion().suggestion
    }

    /// The full solution once every category is proven; never a guess.
    pub fn should_accuse(&self) -> Option<Suggestion> {
        let [Some(suspect), Some(weapon), Some(room)] = self.grid.known_solution() else {
            return None;
        };
        let accusation = Suggestion::new(suspect.clone(), weapon.clone(), room.clone());
        event!(
            target: "cluedo_bot::strategy",
            Level::INFO,
            player = %self.name,
            accusation = %accusation,
            "solution proven"
        );
        Some(accusation)
    }

    /// A held card from `suggestion`, or `None` when this agent cannot
    /// disprove it.
    pub fn choose_card_to_show(&mut self, suggestion: &Suggestion) -> Option<Card> {
        let showable: Vec<Card> = suggestion
            .cards()
            .into_iter()
            .filter(|card| self.hand.contains(card))
            .cloned()
            .collect();
        self.chooser.choose(&showable)
    }

    fn absorb(&mut self, observation: &Observation) -> Result<(), KnowledgeError> {
        match observation {
            Observation::DirectReveal { holder, card } => {
                let holder = self.seat(holder)?;
                self.learn(card, &holder).map(drop)
            }
            Observation::Turn(outcome) => self.absorb_turn(outcome),
        }
    }

    fn absorb_turn(&mut self, outcome: &TurnOutcome) -> Result<(), KnowledgeError> {
        let suggested = outcome.suggestion.cards();
        match (&outcome.disprover, &outcome.revealed) {
            (Some(disprover), Some(card)) if outcome.suggester == self.name => {
                let disprover = self.seat(disprover)?;
                self.learn(card, &disprover).map(drop)
            }
            (None, _) if outcome.suggester == self.name => {
                event!(
                    target: "cluedo_bot::events",
                    Level::INFO,
                    player = %self.name,
                    suggestion = %outcome.suggestion,
                    "own suggestion not disproved"
                );
                let mut result: Result<(), KnowledgeError> = Ok(());
                for card in suggested {
                    if self.hand.contains(card) {
                        continue;
                    }
                    if let Err(err) = self.learn(card, &Location::Solution) {
                        if result.is_ok() {
                            result = Err(err);
                        }
                    }
                }
                result
            }
            (Some(disprover), _) if *disprover != self.name => {
                let disprover = self.seat(disprover)?;
                let candidates: Vec<Card> = suggested
                    .into_iter()
                    .filter(|card| {
                        let known = self.catalog.contains(card);
                        if !known {
                            log_unknown_card(card, &disprover);
                        }
                        known
                    })
                    .cloned()
                    .collect();
                event!(
                    target: "cluedo_bot::events",
                    Level::DEBUG,
                    player = %self.name,
                    disprover = %disprover,
                    candidates = ?candidates,
                    "noted mystery"
                );
                self.mysteries.track(Mystery::new(disprover, candidates));
                Ok(())
            }
            // This agent disproved the suggestion itself: nothing new.
            _ => Ok(()),
        }
    }

    fn seat(&self, player: &str) -> Result<Location, KnowledgeError> {
        let location = Location::player(player);
        if self.players.iter().any(|name| name == player) {
            Ok(location)
        } else {
            Err(KnowledgeError::UnknownLocation(location))
        }
    }

    /// Marks a fact; cards outside the catalog are logged and skipped.
    fn learn(&mut self, card: &Card, location: &Location) -> Result<bool, KnowledgeError> {
        match self.grid.mark(card, location) {
            Err(KnowledgeError::UnknownCard(card)) => {
                log_unknown_card(&card, location);
                Ok(false)
            }
            Err(err) => {
                event!(
                    target: "cluedo_bot::knowledge",
                    Level::WARN,
                    player = %self.name,
                    error = %err,
                    "contradictory fact rejected"
                );
                Err(err)
            }
            ok => ok,
        }
    }

    fn deduce(&mut self) -> Result<DeductionReport, KnowledgeError> {
        deduction::run_deduction(
            &mut self.grid,
            &mut self.mysteries,
            self.params.max_deduction_passes,
        )
    }
}

fn log_unknown_card(card: &Card, location: &Location) {
    event!(
        target: "cluedo_bot::knowledge",
        Level::ERROR,
        card = %card,
        location = %location,
        "card is not in the catalog; ignoring"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use cluedo_core::Category;

    fn players() -> Vec<String> {
        vec!["P1".to_string(), "P2".to_string(), "P3".to_string()]
    }

    fn bot(name: &str) -> DeductionBot {
        DeductionBot::new(
            Arc::new(Catalog::standard()),
            players(),
            name,
            Chooser::deterministic(),
            StdRng::seed_from_u64(11),
            BotParams::default(),
        )
        .unwrap()
    }

    fn cards(names: &[&str]) -> Vec<Card> {
        names.iter().map(|name| Card::from(*name)).collect()
    }

    fn suggestion(suspect: &str, weapon: &str, room: &str) -> Suggestion {
        Suggestion::new(suspect.into(), weapon.into(), room.into())
    }

    #[test]
    fn rejects_a_name_that_is_not_seated() {
        let err = DeductionBot::new(
            Arc::new(Catalog::standard()),
            players(),
            "P9",
            Chooser::deterministic(),
            StdRng::seed_from_u64(0),
            BotParams::default(),
        )
        .unwrap_err();
        assert_eq!(err, KnowledgeError::UnknownLocation(Location::player("P9")));
    }

    #[test]
    fn hand_cards_are_owned_and_unknown_cards_skipped() {
        let mut bot = bot("P1");
        bot.receive_hand(&cards(&["Rope", "Hall", "Spanner"])).unwrap();
        assert_eq!(bot.hand().len(), 2);
        let grid = bot.knowledge();
        assert_eq!(grid.holder(&Card::from("Rope")), Some(&Location::player("P1")));
        assert_eq!(
            grid.certainty(&Card::from("Hall"), &Location::Solution),
            Some(Certainty::No)
        );
    }

    #[test]
    fn revealed_card_is_learned_by_the_suggester() {
        let mut bot = bot("P1");
        let outcome = TurnOutcome::disproved(
            "P1",
            suggestion("Mr. Green", "Dagger", "Study"),
            "P3",
            Some(Card::from("Dagger")),
        );
        bot.handle_event(&Observation::Turn(outcome)).unwrap();
        assert_eq!(
            bot.knowledge().holder(&Card::from("Dagger")),
            Some(&Location::player("P3"))
        );
        assert!(bot.mysteries().is_empty());
    }

    #[test]
    fn undisproved_suggestion_names_the_solution() {
        let mut bot = bot("P1");
        bot.receive_hand(&cards(&["Study"])).unwrap();
        let outcome = TurnOutcome::undisproved("P1", suggestion("Mr. Green", "Dagger", "Study"));
        bot.handle_event(&Observation::Turn(outcome)).unwrap();

        let grid = bot.knowledge();
        assert_eq!(grid.solution_card(Category::Suspect), Some(&Card::from("Mr. Green")));
        assert_eq!(grid.solution_card(Category::Weapon), Some(&Card::from("Dagger")));
        assert_eq!(grid.solution_card(Category::Room), None);
        assert_eq!(grid.holder(&Card::from("Study")), Some(&Location::player("P1")));
    }

    #[test]
    fn bystander_records_a_mystery() {
        let mut bot = bot("P1");
        let outcome = TurnOutcome::disproved(
            "P2",
            suggestion("Mrs. White", "Rope", "Lounge"),
            "P3",
            Some(Card::from("Rope")),
        )
        .redacted();
        bot.handle_event(&Observation::Turn(outcome)).unwrap();

        let mystery = bot.mysteries().iter().next().unwrap();
        assert_eq!(mystery.disprover(), &Location::player("P3"));
        assert_eq!(mystery.candidates(), cards(&["Lounge", "Mrs. White", "Rope"]).as_slice());
    }

    #[test]
    fn disprover_learns_nothing_new() {
        let mut bot = bot("P3");
        let outcome = TurnOutcome::disproved(
            "P2",
            suggestion("Mrs. White", "Rope", "Lounge"),
            "P3",
            None,
        );
        let report = bot.handle_event(&Observation::Turn(outcome)).unwrap();
        assert!(!report.changed);
        assert!(bot.mysteries().is_empty());
    }

    #[test]
    fn mystery_collapses_once_own_cards_are_known() {
        let mut bot = bot("P1");
        bot.receive_hand(&cards(&["Mrs. White", "Lounge"])).unwrap();
        let outcome = TurnOutcome::disproved(
            "P2",
            suggestion("Mrs. White", "Rope", "Lounge"),
            "P3",
            None,
        );
        bot.handle_event(&Observation::Turn(outcome)).unwrap();
        assert!(bot.mysteries().is_empty());
        assert_eq!(
            bot.knowledge().holder(&Card::from("Rope")),
            Some(&Location::player("P3"))
        );
    }

    #[test]
    fn direct_reveal_is_a_certain_fact() {
        let mut bot = bot("P2");
        let reveal = Observation::DirectReveal {
            holder: "P1".to_string(),
            card: Card::from("Kitchen"),
        };
        bot.handle_event(&reveal).unwrap();
        assert_eq!(
            bot.knowledge().holder(&Card::from("Kitchen")),
            Some(&Location::player("P1"))
        );

        let stranger = Observation::DirectReveal {
            holder: "P7".to_string(),
            card: Card::from("Kitchen"),
        };
        assert_eq!(
            bot.handle_event(&stranger),
            Err(KnowledgeError::UnknownLocation(Location::player("P7")))
        );
    }

    #[test]
    fn contradicting_reveal_is_rejected() {
        let mut bot = bot("P1");
        bot.receive_hand(&cards(&["Rope"])).unwrap();
        let reveal = Observation::DirectReveal {
            holder: "P2".to_string(),
            card: Card::from("Rope"),
        };
        let err = bot.handle_event(&reveal).unwrap_err();
        assert!(err.is_contradiction());
        assert_eq!(
            bot.knowledge().holder(&Card::from("Rope")),
            Some(&Location::player("P1"))
        );
    }

    #[test]
    fn dealt_card_placed_elsewhere_stays_out_of_the_hand() {
        let mut bot = bot("P1");
        let reveal = Observation::DirectReveal {
            holder: "P2".to_string(),
            card: Card::from("Rope"),
        };
        bot.handle_event(&reveal).unwrap();

        let err = bot.receive_hand(&cards(&["Rope", "Hall"])).unwrap_err();
        assert!(err.is_contradiction());
        assert_eq!(bot.hand().cards(), &[Card::from("Hall")][..]);
        assert_eq!(
            bot.choose_card_to_show(&suggestion("Mr. Green", "Rope", "Study")),
            None
        );
        assert_eq!(
            bot.knowledge().holder(&Card::from("Hall")),
            Some(&Location::player("P1"))
        );
    }

    #[test]
    fn accuses_only_with_a_complete_solution() {
        let mut bot = bot("P1");
        let outcome = TurnOutcome::undisproved("P1", suggestion("Mr. Green", "Dagger", "Study"));
        assert_eq!(bot.should_accuse(), None);
        bot.handle_event(&Observation::Turn(outcome)).unwrap();
        assert_eq!(bot.should_accuse(), Some(suggestion("Mr. Green", "Dagger", "Study")));
    }

    #[test]
    fn shows_alphabetically_first_held_card() {
        let mut bot = bot("P1");
        bot.receive_hand(&cards(&["Wrench", "Hall", "Mrs. Peacock"])).unwrap();
        assert_eq!(
            bot.choose_card_to_show(&suggestion("Mrs. Peacock", "Wrench", "Study")),
            Some(Card::from("Mrs. Peacock"))
        );
        assert_eq!(
            bot.choose_card_to_show(&suggestion("Mr. Green", "Rope", "Study")),
            None
        );
    }

    #[test]
    fn exploit_after_one_proven_category() {
        let mut bot = bot("P1");
        let suspects: Vec<Card> = bot.catalog().cards_in(Category::Suspect).to_vec();
        for (index, suspect) in suspects.iter().filter(|card| card.name() != "Mrs. Peacock").enumerate() {
            let holder = if index % 2 == 0 { "P2" } else { "P3" };
            let reveal = Observation::DirectReveal {
                holder: holder.to_string(),
                card: suspect.clone(),
            };
            bot.handle_event(&reveal).unwrap();
        }

        let plan = bot.plan_suggestion();
        assert_eq!(plan.strategy, Strategy::Exploit);
        assert_eq!(plan.suggestion.suspect, Card::from("Mrs. Peacock"));
    }

    #[test]
    fn explore_when_nothing_is_known() {
        let mut bot = bot("P1");
        let plan = bot.plan_suggestion();
        assert_eq!(plan.strategy, Strategy::Explore);
        for category in Category::ALL {
            assert_eq!(
                bot.catalog().category_of(plan.suggestion.get(category)),
                Some(category)
            );
        }
    }

    #[test]
    fn seeded_bots_agree() {
        let catalog = Arc::new(Catalog::standard());
        let make = || {
            DeductionBot::seeded(
                Arc::clone(&catalog),
                players(),
                "P2",
                ChooserKind::Random,
                99,
                BotParams::default(),
            )
            .unwrap()
        };
        let (mut a, mut b) = (make(), make());
        for _ in 0..5 {
            assert_eq!(a.make_suggestion(), b.make_suggestion());
        }
    }
}
