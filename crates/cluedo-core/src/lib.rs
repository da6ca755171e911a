#![deny(warnings)]
pub mod game;
pub mod model;

pub use game::deal::{Deal, DealError, MIN_PLAYERS, seat_names, validate_players};
pub use game::events::{EventBus, GameEvent, Listener, Observation, TurnOutcome};
pub use model::card::Card;
pub use model::catalog::{Catalog, CatalogError, CatalogFile};
pub use model::category::Category;
pub use model::hand::Hand;
pub use model::location::Location;
pub use model::suggestion::Suggestion;

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "cluedo"
    }

    pub const fn codename() -> &'static str {
        "Deduction Engine"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

#[cfg(test)]
mod tests {
    use super::AppInfo;

    #[test]
    fn exposes_static_metadata() {
        assert_eq!(AppInfo::name(), "cluedo");
        assert_eq!(AppInfo::codename(), "Deduction Engine");
        assert!(!AppInfo::version().is_empty());
    }
}
