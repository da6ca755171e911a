use core::fmt;

/// Where a card can live: a named player's hand or the case file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Location {
    Player(String),
    Solution,
}

impl Location {
    pub const SOLUTION_LABEL: &'static str = "solution";

    pub fn player(name: impl Into<String>) -> Self {
        Location::Player(name.into())
    }

    pub const fn is_solution(&self) -> bool {
        matches!(self, Location::Solution)
    }

    pub fn player_name(&self) -> Option<&str> {
        match self {
            Location::Player(name) => Some(name),
            Location::Solution => None,
        }
    }

    /// Closed location set for a table: every player in seat order, then the solution.
    pub fn closed_set(players: &[String]) -> Vec<Location> {
        players
            .iter()
            .cloned()
            .map(Location::Player)
            .chain(std::iter::once(Location::Solution))
            .collect()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Player(name) => f.write_str(name),
            Location::Solution => f.write_str(Self::SOLUTION_LABEL),
        }
    }
}
