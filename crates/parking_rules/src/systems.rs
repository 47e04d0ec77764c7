use bevy::prelude::*;

use crate::game_access::ParkingGameAccess;
use crate::ids::BuildingId;
use crate::reevaluation::{SweepCounters, TickReport};
use crate::rules::RuleRecord;
use crate::runtime::ParkingRuntime;

// =============================================================================
// Resources
// =============================================================================

/// The host's world adapter. Inserted by the host once a city is loaded;
/// until then the reevaluation system does nothing.
#[derive(Resource)]
pub struct ParkingHost(pub Box<dyn ParkingGameAccess>);

/// Aggregate reevaluation statistics for the current session.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct ParkingReevaluationStats {
    pub totals: SweepCounters,
    pub sweeps_finished: u32,
    pub buildings_skipped: u32,
    pub last_tick: TickReport,
}

// =============================================================================
// Events
// =============================================================================

/// Queue a sweep of one building's lot (debug hotkey, UI button).
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestReevaluation {
    pub building: BuildingId,
}

/// Queue a sweep of every ruled building.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct RequestFullSweep;

/// A rule was set (`Some`) or cleared (`None`) from the settings UI.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParkingRuleEdited {
    pub building: BuildingId,
    pub rule: Option<RuleRecord>,
}

/// The host demolished a building.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParkingLotDemolished {
    pub building: BuildingId,
}

/// The session is ending; drop all rules and pending work. The runtime stays
/// disposed until the host inserts a fresh `ParkingRuntime`.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct ParkingSessionEnded;

/// Emitted once per building whose sweep completed.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReevaluationFinished {
    pub building: BuildingId,
    pub counters: SweepCounters,
}

// =============================================================================
// Systems
// =============================================================================

/// System: apply rule edits, demolitions and reevaluation requests that
/// arrived since the last tick.
pub fn apply_parking_events(
    mut runtime: ResMut<ParkingRuntime>,
    mut edits: EventReader<ParkingRuleEdited>,
    mut demolished: EventReader<ParkingLotDemolished>,
    mut requests: EventReader<RequestReevaluation>,
    mut full_sweeps: EventReader<RequestFullSweep>,
    mut session_end: EventReader<ParkingSessionEnded>,
    mut stats: ResMut<ParkingReevaluationStats>,
) {
    for edit in edits.read() {
        match edit.rule {
            Some(rule) => runtime.set_rule(edit.building, rule),
            None => {
                runtime.remove_rule(edit.building);
            }
        }
    }
    for event in demolished.read() {
        runtime.on_building_destroyed(event.building);
    }
    for request in requests.read() {
        runtime.request_reevaluation(request.building);
    }
    if full_sweeps.read().count() > 0 {
        runtime.request_full_sweep();
    }
    if session_end.read().count() > 0 {
        runtime.teardown();
        *stats = ParkingReevaluationStats::default();
    }
}

/// System: run one bounded slice of reevaluation work.
pub fn run_parking_reevaluation(
    mut runtime: ResMut<ParkingRuntime>,
    host: Option<Res<ParkingHost>>,
    mut stats: ResMut<ParkingReevaluationStats>,
    mut finished: EventWriter<ReevaluationFinished>,
) {
    let Some(host) = host else {
        return;
    };
    let report = runtime.tick(&*host.0);

    for sweep in &report.finished {
        finished.send(ReevaluationFinished {
            building: sweep.building,
            counters: sweep.counters,
        });
    }
    stats.totals.accumulate(&report.totals);
    stats.sweeps_finished += report.finished.len() as u32;
    stats.buildings_skipped += report.skipped_buildings;
    stats.last_tick = report;
}

// =============================================================================
// Plugin
// =============================================================================

pub struct ParkingRulesPlugin;

impl Plugin for ParkingRulesPlugin {
    fn build(&self, app: &mut App) {
        // A host that needs a custom config or relocation integration inserts
        // its own `ParkingRuntime` before adding the plugin.
        app.init_resource::<ParkingRuntime>()
            .init_resource::<ParkingReevaluationStats>()
            .add_event::<RequestReevaluation>()
            .add_event::<RequestFullSweep>()
            .add_event::<ParkingRuleEdited>()
            .add_event::<ParkingLotDemolished>()
            .add_event::<ParkingSessionEnded>()
            .add_event::<ReevaluationFinished>()
            .add_systems(
                FixedUpdate,
                (apply_parking_events, run_parking_reevaluation).chain(),
            );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    use crate::ids::ParkedVehicleId;
    use crate::test_harness::FakeCity;

    const LOT: u32 = 1;

    fn city() -> Arc<FakeCity> {
        Arc::new(
            FakeCity::new()
                .with_building(LOT, Vec3::ZERO)
                .with_citizen(5, Some(Vec3::new(900.0, 0.0, 0.0)), None)
                .with_citizen(6, Some(Vec3::new(10.0, 0.0, 0.0)), None)
                .with_parked(50, 5, LOT)
                .with_parked(60, 6, LOT),
        )
    }

    fn app_with_host(city: &Arc<FakeCity>) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(ParkingRulesPlugin);
        app.insert_resource(ParkingHost(Box::new(Arc::clone(city))));
        app
    }

    fn tick(app: &mut App, n: u32) {
        for _ in 0..n {
            app.world_mut().run_schedule(FixedUpdate);
        }
    }

    #[test]
    fn test_rule_edit_event_triggers_sweep() {
        let city = city();
        let mut app = app_with_host(&city);
        let _ = app.world_mut().send_event(ParkingRuleEdited {
            building: BuildingId(LOT),
            rule: Some(RuleRecord::closed().with_residents_within(100)),
        });

        tick(&mut app, 1);

        let stats = app.world().resource::<ParkingReevaluationStats>();
        assert_eq!(stats.sweeps_finished, 1);
        assert_eq!(stats.totals.allowed, 1);
        assert_eq!(stats.totals.released, 1);
        assert_eq!(city.released(), vec![ParkedVehicleId(50)]);
    }

    #[test]
    fn test_no_host_means_no_work() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(ParkingRulesPlugin);
        let _ = app.world_mut().send_event(ParkingRuleEdited {
            building: BuildingId(LOT),
            rule: Some(RuleRecord::closed()),
        });

        tick(&mut app, 3);

        let runtime = app.world().resource::<ParkingRuntime>();
        assert!(runtime.scheduler().is_pending(BuildingId(LOT)));
        assert_eq!(
            *app.world().resource::<ParkingReevaluationStats>(),
            ParkingReevaluationStats::default()
        );
    }

    #[test]
    fn test_cleared_rule_and_request_skips_building() {
        let city = city();
        let mut app = app_with_host(&city);
        app.world_mut()
            .resource_mut::<ParkingRuntime>()
            .rules_mut()
            .set(BuildingId(LOT), RuleRecord::closed());
        let _ = app.world_mut().send_event(ParkingRuleEdited {
            building: BuildingId(LOT),
            rule: None,
        });
        let _ = app.world_mut().send_event(RequestReevaluation {
            building: BuildingId(LOT),
        });

        tick(&mut app, 1);

        let stats = app.world().resource::<ParkingReevaluationStats>();
        assert_eq!(stats.buildings_skipped, 1);
        assert!(city.released().is_empty());
    }

    #[test]
    fn test_full_sweep_and_session_end() {
        let city = city();
        let mut app = app_with_host(&city);
        app.world_mut()
            .resource_mut::<ParkingRuntime>()
            .rules_mut()
            .set(BuildingId(LOT), RuleRecord::closed());
        let _ = app.world_mut().send_event(RequestFullSweep);

        tick(&mut app, 1);
        assert_eq!(city.released().len(), 2);

        let _ = app.world_mut().send_event(ParkingSessionEnded);
        tick(&mut app, 1);

        let runtime = app.world().resource::<ParkingRuntime>();
        assert!(runtime.rules().is_empty());
        assert_eq!(
            app.world().resource::<ParkingReevaluationStats>().sweeps_finished,
            0
        );
    }
}
