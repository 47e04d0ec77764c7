//! Per-building parking rules.
//!
//! A `RuleRecord` restricts who may park on a building's lot: residents living
//! within a radius, workers/students within a radius, and visitors. The
//! `RuleStore` is a plain map from building to record with no logic of its
//! own; the persistence layer drives it through `iter`/`set`/`remove`/`clear`.

pub mod record;
pub mod store;


pub use record::*;
pub use store::*;
