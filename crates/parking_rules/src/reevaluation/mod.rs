//! Incremental reevaluation of already-parked vehicles.
//!
//! When a building's rule changes (or a sweep is requested explicitly), every
//! vehicle parked on its lot must be re-checked against the new rule. A large
//! city-wide change can touch thousands of vehicles, so the work is spread
//! over simulation ticks:
//!
//! - `ReevaluationQueue`: FIFO of requested buildings plus a membership set,
//!   so a building is queued or active at most once.
//! - `ReevaluationCursor`: the building being drained, with a snapshot of its
//!   parked vehicles taken once at sweep start and running counters.
//! - `ReevaluationScheduler`: the Idle / Scheduled / Draining state machine.
//!   Each `tick` performs at most `move_budget_per_tick` relocations and
//!   evictions; vehicles that are merely classified as allowed, or that fail
//!   to resolve, do not count toward the budget.
//! - `ReevaluationInbox`: thread-safe handle used to submit requests from
//!   outside the tick thread; drained at the start of each tick.

pub mod cursor;
pub mod inbox;
pub mod queue;
pub mod scheduler;


pub use cursor::*;
pub use inbox::*;
pub use queue::*;
pub use scheduler::*;
