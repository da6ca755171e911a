pub mod bot;

pub use bot::{
    BotParams, Certainty, Chooser, ChooserKind, DeductionBot, DeductionReport, KnowledgeError,
    KnowledgeGrid, Mystery, MysteryTracker, RecentTargets, Strategy, SuggestionPlan,
};
