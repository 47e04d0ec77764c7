//! Tuning constants and the runtime configuration of the parking-rules engine.

use serde::{Deserialize, Serialize};

/// Radius sentinel meaning "anywhere". Short-circuits the distance check.
pub const UNLIMITED_RADIUS: u16 = u16::MAX;

/// Default cap on relocations + evictions performed by one scheduler tick.
pub const DEFAULT_MOVE_BUDGET_PER_TICK: u32 = 64;

/// Default search distance handed to the relocation integration, in meters.
pub const DEFAULT_RELOCATION_MAX_DISTANCE: f32 = 1_000.0;

/// Initial capacity of a thread's search-context stack. Observed nesting
/// never exceeds four frames.
pub const CONTEXT_STACK_CAPACITY: usize = 4;

/// Runtime configuration, owned by `ParkingRuntime`.
///
/// Every field has a default, so a partial JSON document only overrides the
/// keys it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParkingRulesConfig {
    /// Master switch. When false, candidate filtering fails open and the
    /// reevaluation scheduler refuses and drops all work.
    pub enabled: bool,
    /// Maximum relocations + evictions per tick.
    pub move_budget_per_tick: u32,
    /// Max distance passed to the relocation integration.
    pub relocation_max_distance: f32,
    /// Ticks between automatic full sweeps of every ruled building. 0 = off.
    pub periodic_sweep_interval_ticks: u32,
    /// Attach a diagnostic episode to every pushed search context and log it
    /// on pop.
    pub log_search_episodes: bool,
}

impl Default for ParkingRulesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            move_budget_per_tick: DEFAULT_MOVE_BUDGET_PER_TICK,
            relocation_max_distance: DEFAULT_RELOCATION_MAX_DISTANCE,
            periodic_sweep_interval_ticks: 0,
            log_search_episodes: false,
        }
    }
}

impl ParkingRulesConfig {
    /// Parse a (possibly partial) JSON config document.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The move budget actually enforced. A zero budget would stall the
    /// scheduler forever, so it is clamped to one.
    pub fn effective_move_budget(&self) -> u32 {
        self.move_budget_per_tick.max(1)
    }
}
