use bevy::math::Vec3;

use crate::ids::{BuildingId, ParkedVehicleId};

/// Running totals for one sweep (or one tick, in `TickReport`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepCounters {
    pub evaluated: u32,
    pub allowed: u32,
    pub denied: u32,
    pub moved: u32,
    pub released: u32,
    /// Vehicles that could not be resolved and were passed over.
    pub skipped: u32,
}

impl SweepCounters {
    pub fn accumulate(&mut self, other: &SweepCounters) {
        self.evaluated += other.evaluated;
        self.allowed += other.allowed;
        self.denied += other.denied;
        self.moved += other.moved;
        self.released += other.released;
        self.skipped += other.skipped;
    }
}

/// Working state of the building currently being swept.
#[derive(Debug)]
pub struct ReevaluationCursor {
    building: BuildingId,
    /// Where rule radii are measured from, resolved once at sweep start.
    lot_position: Vec3,
    snapshot: Vec<ParkedVehicleId>,
    next: usize,
    pub counters: SweepCounters,
}

impl ReevaluationCursor {
    pub fn new(building: BuildingId, lot_position: Vec3, snapshot: Vec<ParkedVehicleId>) -> Self {
        Self {
            building,
            lot_position,
            snapshot,
            next: 0,
            counters: SweepCounters::default(),
        }
    }

    pub fn building(&self) -> BuildingId {
        self.building
    }

    pub fn lot_position(&self) -> Vec3 {
        self.lot_position
    }

    pub fn advance(&mut self) -> Option<ParkedVehicleId> {
        let vehicle = self.snapshot.get(self.next).copied()?;
        self.next += 1;
        Some(vehicle)
    }

    /// Skip the rest of the snapshot.
    pub fn abandon(&mut self) {
        self.next = self.snapshot.len();
    }

    pub fn is_exhausted(&self) -> bool {
        self.next >= self.snapshot.len()
    }

    pub fn remaining(&self) -> usize {
        self.snapshot.len().saturating_sub(self.next)
    }

    pub fn snapshot_len(&self) -> usize {
        self.snapshot.len()
    }
}
