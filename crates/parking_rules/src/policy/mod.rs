//! Parking policy evaluation.
//!
//! Turns a `RuleRecord` plus the requester's role and positions into a
//! `ParkingDecision`. The checks run in a fixed order and the first match
//! wins:
//!
//! 1. **Visitor**: allowed iff the rule admits visitors. Nothing else runs.
//! 2. **Resident**: if the rule is residents-only and the home position is
//!    known, allowed iff home lies within the resident radius.
//! 3. **Worker/student**: if the rule is work/study-only, allowed iff the
//!    work or school position is known and lies within the radius.
//! 4. Otherwise denied with `NoMatch`.
//!
//! Distances are squared and measured on the horizontal (x/z) plane. A
//! missing position only fails its own branch.

pub mod evaluator;
pub mod reason;

#[cfg(test)]
mod tests;

pub use evaluator::*;
pub use reason::*;
