use bevy::log::{debug, info};

use crate::config::ParkingRulesConfig;
use crate::game_access::{ParkingGameAccess, RelocationIntegration};
use crate::ids::BuildingId;
use crate::policy::evaluate_for_citizen;
use crate::rules::RuleStore;

use super::cursor::{ReevaluationCursor, SweepCounters};
use super::inbox::ReevaluationInbox;
use super::queue::ReevaluationQueue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    /// Nothing queued, nothing active.
    #[default]
    Idle,
    /// Work is waiting for the next tick.
    Scheduled,
    /// Inside `tick`.
    Draining,
}

/// Final counters of a building whose sweep completed during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinishedSweep {
    pub building: BuildingId,
    pub counters: SweepCounters,
}

/// What one `tick` did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub totals: SweepCounters,
    /// Relocations + evictions performed; never exceeds the move budget.
    pub moves_used: u32,
    /// Dequeued buildings dropped without a sweep (no rule or empty lot).
    pub skipped_buildings: u32,
    pub finished: Vec<FinishedSweep>,
}

/// Resumable, per-tick-bounded sweep over parked vehicles.
///
/// Lives on the simulation tick thread. Requests from other threads arrive
/// through the `ReevaluationInbox`.
#[derive(Debug)]
pub struct ReevaluationScheduler {
    state: SchedulerState,
    queue: ReevaluationQueue,
    cursor: Option<ReevaluationCursor>,
    inbox: ReevaluationInbox,
    active: bool,
    disposed: bool,
}

impl Default for ReevaluationScheduler {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ReevaluationScheduler {
    pub fn new(active: bool) -> Self {
        Self {
            state: SchedulerState::Idle,
            queue: ReevaluationQueue::default(),
            cursor: None,
            inbox: ReevaluationInbox::default(),
            active,
            disposed: false,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.active && !self.disposed
    }

    /// Handle for submitting requests from other threads.
    pub fn inbox(&self) -> ReevaluationInbox {
        self.inbox.clone()
    }

    /// True while the building is queued or being swept.
    pub fn is_pending(&self, building: BuildingId) -> bool {
        self.queue.is_member(building)
    }

    pub fn queued_len(&self) -> usize {
        self.queue.pending_len()
    }

    pub fn active_building(&self) -> Option<BuildingId> {
        self.cursor.as_ref().map(ReevaluationCursor::building)
    }

    pub fn has_work(&self) -> bool {
        self.queue.has_pending() || self.cursor.is_some()
    }

    /// Queue a sweep of `building`. Returns false when inactive, disposed or
    /// already queued/active.
    pub fn request_for_building(&mut self, building: BuildingId) -> bool {
        if !self.is_active() || !self.queue.push(building) {
            return false;
        }
        if self.state == SchedulerState::Idle {
            self.state = SchedulerState::Scheduled;
        }
        true
    }

    /// Queue every building that has a rule. Returns how many were added.
    pub fn request_all(&mut self, rules: &RuleStore) -> usize {
        rules
            .buildings()
            .filter(|building| self.request_for_building(*building))
            .count()
    }

    /// Deactivating drops all queued and in-flight work.
    pub fn set_active(&mut self, active: bool) {
        if !active {
            self.abort("feature deactivated");
        }
        self.active = active;
    }

    /// Drop all work and refuse further requests.
    pub fn dispose(&mut self) {
        self.abort("disposed");
        self.disposed = true;
    }

    fn abort(&mut self, why: &str) {
        if let Some(cursor) = &self.cursor {
            debug!(
                "Parking reevaluation of {} aborted ({}) with {} of {} vehicles unchecked",
                cursor.building(),
                why,
                cursor.remaining(),
                cursor.snapshot_len(),
            );
        }
        self.queue.clear();
        self.cursor = None;
        self.inbox.take_all();
        self.state = SchedulerState::Idle;
    }

    /// Run one bounded slice of work.
    ///
    /// Stops once `move_budget_per_tick` denied vehicles have been relocated
    /// or released, or when no work is left.
    pub fn tick(
        &mut self,
        rules: &RuleStore,
        access: &dyn ParkingGameAccess,
        relocation: &dyn RelocationIntegration,
        config: &ParkingRulesConfig,
    ) -> TickReport {
        let mut report = TickReport::default();
        for building in self.inbox.take_all() {
            self.request_for_building(building);
        }
        if !self.is_active() || self.state == SchedulerState::Idle {
            return report;
        }

        self.state = SchedulerState::Draining;
        let budget = config.effective_move_budget();
        while report.moves_used < budget {
            if self.cursor_done() {
                self.finish_cursor(&mut report);
                if !self.start_next_building(rules, access, &mut report) {
                    break;
                }
                continue;
            }
            self.step(rules, access, relocation, config, &mut report);
        }

        // The last budgeted vehicle may have emptied the snapshot.
        if self.cursor.is_some() && self.cursor_done() {
            self.finish_cursor(&mut report);
        }

        self.state = if self.has_work() {
            SchedulerState::Scheduled
        } else {
            SchedulerState::Idle
        };
        report
    }

    /// True when there is no active cursor or it has nothing left.
    fn cursor_done(&self) -> bool {
        match &self.cursor {
            Some(cursor) => cursor.is_exhausted(),
            None => true,
        }
    }

    fn finish_cursor(&mut self, report: &mut TickReport) {
        let Some(cursor) = self.cursor.take() else {
            return;
        };
        let building = cursor.building();
        let c = cursor.counters;
        info!(
            "Parking reevaluation of {} done: {} evaluated, {} allowed, {} denied \
             ({} moved, {} released), {} skipped",
            building, c.evaluated, c.allowed, c.denied, c.moved, c.released, c.skipped,
        );
        self.queue.release(building);
        report.finished.push(FinishedSweep {
            building,
            counters: c,
        });
    }

    /// Pull buildings until one has a rule, a position and parked vehicles.
    /// Returns false when the queue ran dry.
    fn start_next_building(
        &mut self,
        rules: &RuleStore,
        access: &dyn ParkingGameAccess,
        report: &mut TickReport,
    ) -> bool {
        while let Some(building) = self.queue.pop() {
            if !rules.contains(building) {
                debug!("Parking reevaluation of {} skipped: no rule", building);
                self.queue.release(building);
                report.skipped_buildings += 1;
                continue;
            }
            let Some(lot_position) = access.building_position(building) else {
                debug!("Parking reevaluation of {} skipped: no lot position", building);
                self.queue.release(building);
                report.skipped_buildings += 1;
                continue;
            };
            let snapshot = access.collect_parked_vehicles_on_lot(building);
            if snapshot.is_empty() {
                debug!("Parking reevaluation of {} skipped: lot is empty", building);
                self.queue.release(building);
                report.skipped_buildings += 1;
                continue;
            }
            debug!(
                "Parking reevaluation of {} started with {} parked vehicles",
                building,
                snapshot.len()
            );
            self.cursor = Some(ReevaluationCursor::new(building, lot_position, snapshot));
            return true;
        }
        false
    }

    /// Evaluate the next vehicle of the active cursor.
    fn step(
        &mut self,
        rules: &RuleStore,
        access: &dyn ParkingGameAccess,
        relocation: &dyn RelocationIntegration,
        config: &ParkingRulesConfig,
        report: &mut TickReport,
    ) {
        let Some(cursor) = self.cursor.as_mut() else {
            return;
        };
        let building = cursor.building();
        let Some(rule) = rules.get(building) else {
            debug!(
                "Parking reevaluation of {} cut short: rule removed mid-sweep",
                building
            );
            cursor.abandon();
            return;
        };
        let Some(vehicle) = cursor.advance() else {
            return;
        };

        let mut delta = SweepCounters::default();
        match access.resolve_parked_vehicle(vehicle) {
            None => {
                debug!("Parked vehicle {} on {} no longer resolves", vehicle, building);
                delta.skipped += 1;
            }
            Some(info) => {
                delta.evaluated += 1;
                // Radii are measured from the lot, as in the candidate filter.
                let decision = evaluate_for_citizen(
                    rule,
                    Some(info.owner),
                    false,
                    cursor.lot_position(),
                    access,
                );
                if decision.allowed {
                    delta.allowed += 1;
                } else {
                    delta.denied += 1;
                    report.moves_used += 1;
                    let moved = relocation.try_relocate_parked_vehicle(
                        vehicle,
                        info.owner,
                        info.home_building,
                        info.position,
                        config.relocation_max_distance,
                    );
                    if moved {
                        delta.moved += 1;
                    } else {
                        access.release_parked_vehicle(vehicle);
                        delta.released += 1;
                    }
                    debug!(
                        "Parked vehicle {} on {} denied ({}), {}",
                        vehicle,
                        building,
                        decision.reason,
                        if moved { "relocated" } else { "released" },
                    );
                }
            }
        }
        cursor.counters.accumulate(&delta);
        report.totals.accumulate(&delta);
    }
}
