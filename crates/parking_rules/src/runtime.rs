//! Session-scoped runtime context.
//!
//! `ParkingRuntime` owns everything the engine keeps between calls: the rule
//! store, the reevaluation scheduler, the search-context registry and the
//! bound relocation capability. It is created when a city is loaded and torn
//! down when the session ends; nothing in the engine is a process-wide
//! static.

use std::sync::Arc;

use bevy::log::info;
use bevy::prelude::Resource;

use crate::candidate_filter::CandidateFilter;
use crate::config::ParkingRulesConfig;
use crate::game_access::{NoRelocation, ParkingGameAccess, RelocationIntegration};
use crate::ids::BuildingId;
use crate::reevaluation::{ReevaluationInbox, ReevaluationScheduler, TickReport};
use crate::rules::{RuleRecord, RuleStore};
use crate::search_context::SearchContextRegistry;

#[derive(Resource)]
pub struct ParkingRuntime {
    config: ParkingRulesConfig,
    rules: RuleStore,
    scheduler: ReevaluationScheduler,
    contexts: Arc<SearchContextRegistry>,
    relocation: Box<dyn RelocationIntegration>,
    ticks: u64,
}

impl Default for ParkingRuntime {
    fn default() -> Self {
        Self::new(ParkingRulesConfig::default(), None)
    }
}

impl ParkingRuntime {
    /// Create the runtime for a new session. `relocation` is the detected
    /// traffic-management integration, if any; without one, denied parked
    /// vehicles are released.
    pub fn new(
        config: ParkingRulesConfig,
        relocation: Option<Box<dyn RelocationIntegration>>,
    ) -> Self {
        let relocation = relocation.unwrap_or_else(|| Box::new(NoRelocation));
        info!(
            "Parking rules runtime started (enabled: {}, relocation: {})",
            config.enabled,
            relocation.name()
        );
        Self {
            scheduler: ReevaluationScheduler::new(config.enabled),
            contexts: Arc::new(SearchContextRegistry::new(config.log_search_episodes)),
            config,
            rules: RuleStore::new(),
            relocation,
            ticks: 0,
        }
    }

    pub fn config(&self) -> &ParkingRulesConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Toggle the feature. Disabling drops all pending reevaluation work.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
        self.scheduler.set_active(enabled);
    }

    pub fn set_config(&mut self, config: ParkingRulesConfig) {
        self.contexts
            .set_episodes_enabled(config.log_search_episodes);
        if config.enabled != self.config.enabled {
            self.scheduler.set_active(config.enabled);
        }
        self.config = config;
    }

    pub fn relocation_name(&self) -> &str {
        self.relocation.name()
    }

    pub fn rules(&self) -> &RuleStore {
        &self.rules
    }

    /// Direct store access for the persistence layer. Does not trigger
    /// reevaluation.
    pub fn rules_mut(&mut self) -> &mut RuleStore {
        &mut self.rules
    }

    /// Install or replace a building's rule and queue a sweep of its lot.
    pub fn set_rule(&mut self, building: BuildingId, rule: RuleRecord) {
        let previous = self.rules.set(building, rule);
        if previous != Some(rule) {
            self.scheduler.request_for_building(building);
        }
    }

    pub fn remove_rule(&mut self, building: BuildingId) -> Option<RuleRecord> {
        self.rules.remove(building)
    }

    /// Interception point: the host destroyed a building.
    pub fn on_building_destroyed(&mut self, building: BuildingId) {
        self.rules.remove(building);
    }

    /// Shared handle for worker threads that push search contexts.
    pub fn contexts(&self) -> &Arc<SearchContextRegistry> {
        &self.contexts
    }

    pub fn candidate_filter<'a>(&'a self, access: &'a dyn ParkingGameAccess) -> CandidateFilter<'a> {
        CandidateFilter::new(&self.rules, &self.contexts, access, self.config.enabled)
    }

    pub fn scheduler(&self) -> &ReevaluationScheduler {
        &self.scheduler
    }

    pub fn reevaluation_inbox(&self) -> ReevaluationInbox {
        self.scheduler.inbox()
    }

    pub fn request_reevaluation(&mut self, building: BuildingId) -> bool {
        self.scheduler.request_for_building(building)
    }

    /// Queue every ruled building (debug hotkey / periodic sweep).
    pub fn request_full_sweep(&mut self) -> usize {
        self.scheduler.request_all(&self.rules)
    }

    /// Advance one simulation tick: run the periodic sweep trigger if due,
    /// then one bounded slice of reevaluation work.
    pub fn tick(&mut self, access: &dyn ParkingGameAccess) -> TickReport {
        self.ticks += 1;
        let interval = u64::from(self.config.periodic_sweep_interval_ticks);
        if interval > 0 && self.ticks.is_multiple_of(interval) {
            let queued = self.request_full_sweep();
            if queued > 0 {
                info!("Periodic parking sweep queued {} buildings", queued);
            }
        }
        self.scheduler
            .tick(&self.rules, access, self.relocation.as_ref(), &self.config)
    }

    /// End of session: drop rules, pending work and every thread's contexts.
    pub fn teardown(&mut self) {
        self.scheduler.dispose();
        self.rules.clear();
        self.contexts.clear_all();
        info!("Parking rules runtime torn down");
    }
}
