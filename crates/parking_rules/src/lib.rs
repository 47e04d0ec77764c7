//! Parking access rules for city buildings.
//!
//! Each building may carry a `RuleRecord` limiting its lot to nearby
//! residents, nearby workers/students and (optionally) visitors. The engine
//! answers two questions for the host simulation:
//!
//! - **May this requester park here?** `CandidateFilter`, consulted at the
//!   host's parking-candidate and parked-vehicle call sites, combines the
//!   rule with the calling thread's `SearchContextRegistry` frame and the
//!   policy evaluator.
//! - **Which already-parked vehicles must leave?** `ReevaluationScheduler`
//!   re-checks a lot after its rule changes, a bounded number of moves per
//!   tick, relocating or releasing denied vehicles.
//!
//! All state lives in a session-scoped `ParkingRuntime`; `ParkingRulesPlugin`
//! wires it into a Bevy app.

pub mod candidate_filter;
pub mod config;
pub mod game_access;
pub mod ids;
pub mod policy;
pub mod reevaluation;
pub mod rules;
pub mod runtime;
pub mod search_context;
pub mod systems;

#[cfg(any(test, feature = "bench"))]
pub mod test_harness;

pub use candidate_filter::CandidateFilter;
pub use config::{ParkingRulesConfig, UNLIMITED_RADIUS};
pub use game_access::{
    CitizenRoles, NoRelocation, ParkedVehicleInfo, ParkingGameAccess, RelocationIntegration,
};
pub use ids::{BuildingId, CitizenId, ParkedVehicleId, VehicleId};
pub use policy::{DecisionReason, ParkingDecision};
pub use reevaluation::{ReevaluationScheduler, SchedulerState, SweepCounters, TickReport};
pub use rules::{RuleRecord, RuleStore};
pub use runtime::ParkingRuntime;
pub use search_context::{SearchContextGuard, SearchContextRegistry};
pub use systems::{ParkingHost, ParkingRulesPlugin};
