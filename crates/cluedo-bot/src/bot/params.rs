use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_DEDUCTION_PASSES: usize = 10;
pub const DEFAULT_RECENT_TARGET_CAPACITY: usize = 3;

/// Tunable engine parameters, injected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotParams {
    /// Upper bound on passes of the deduction loop (default: 10)
    pub max_deduction_passes: usize,

    /// How many surgical-strike targets are remembered (default: 3)
    pub recent_target_capacity: usize,
}

impl Default for BotParams {
    fn default() -> Self {
        Self {
            max_deduction_passes: DEFAULT_MAX_DEDUCTION_PASSES,
            recent_target_capacity: DEFAULT_RECENT_TARGET_CAPACITY,
        }
    }
}
