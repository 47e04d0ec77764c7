//! "Who is asking, and why" for nested parking searches.
//!
//! The host's parking-candidate and parked-vehicle call sites have fixed
//! signatures, so the requester's identity cannot travel as an argument.
//! Instead the caller pushes a `SearchContextFrame` right before the nested
//! search and the candidate filter peeks at it deeper down the stack.
//!
//! Stacks are kept per calling thread: path-finding workers run searches
//! concurrently with the simulation tick, and only nesting within one thread
//! is meaningful. A push hands back a `SearchContextGuard` which pops on drop,
//! so frames stay balanced across early returns and panics.

pub mod frame;
pub mod registry;


pub use frame::*;
pub use registry::*;
