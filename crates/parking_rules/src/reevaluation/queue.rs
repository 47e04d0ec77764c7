use std::collections::{HashSet, VecDeque};

use crate::ids::BuildingId;

/// FIFO of buildings awaiting a sweep.
///
/// Membership outlives the queue entry: a building stays a member while its
/// sweep is active and is only released once the sweep finishes or is
/// skipped, so repeated requests during that time are no-ops.
#[derive(Debug, Default)]
pub struct ReevaluationQueue {
    pending: VecDeque<BuildingId>,
    members: HashSet<BuildingId>,
}

impl ReevaluationQueue {
    /// Enqueue unless already a member. Returns whether it was enqueued.
    pub fn push(&mut self, building: BuildingId) -> bool {
        if !self.members.insert(building) {
            return false;
        }
        self.pending.push_back(building);
        true
    }

    /// Take the next building. It remains a member until `release`.
    pub fn pop(&mut self) -> Option<BuildingId> {
        self.pending.pop_front()
    }

    pub fn release(&mut self, building: BuildingId) {
        self.members.remove(&building);
    }

    pub fn is_member(&self, building: BuildingId) -> bool {
        self.members.contains(&building)
    }

    /// Buildings still waiting (not counting an active one).
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.members.clear();
    }
}
