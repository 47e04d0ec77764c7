//! Candidate filtering at the host's parking interception points.
//!
//! Two call sites consult the filter: choosing a parking candidate building,
//! and creating a parked vehicle at a position. Both combine the rule store,
//! the calling thread's search context and the policy evaluator.
//!
//! When the context names a requester whose identity cannot be resolved, the
//! filter denies (fail-closed). When there is no requester at all, as in the
//! host's own relocation housekeeping, it allows (fail-open): blocking those
//! searches would leave host state inconsistent.

use bevy::math::Vec3;

use crate::game_access::ParkingGameAccess;
use crate::ids::{BuildingId, CitizenId};
use crate::policy::{evaluate_for_citizen, evaluate_for_vehicle, DecisionReason, ParkingDecision};
use crate::rules::{RuleRecord, RuleStore};
use crate::search_context::{SearchContextRegistry, SearchRequester};

pub struct CandidateFilter<'a> {
    rules: &'a RuleStore,
    contexts: &'a SearchContextRegistry,
    access: &'a dyn ParkingGameAccess,
    enabled: bool,
}

impl<'a> CandidateFilter<'a> {
    pub fn new(
        rules: &'a RuleStore,
        contexts: &'a SearchContextRegistry,
        access: &'a dyn ParkingGameAccess,
        enabled: bool,
    ) -> Self {
        Self {
            rules,
            contexts,
            access,
            enabled,
        }
    }

    /// Decide whether `candidate` must be rejected for the current thread's
    /// requester. `prefab_name` is only used for episode diagnostics.
    pub fn should_deny_candidate(
        &self,
        candidate: BuildingId,
        prefab_name: &str,
    ) -> ParkingDecision {
        let decision = self.decide_candidate(candidate);
        self.contexts
            .record_candidate(decision.is_denied(), decision.reason, candidate, prefab_name);
        decision
    }

    fn decide_candidate(&self, candidate: BuildingId) -> ParkingDecision {
        let rule = match self.applicable_rule(candidate) {
            Ok(rule) => rule,
            Err(decision) => return decision,
        };
        let Some(requester) = self.contexts.peek_requester().filter(|r| !r.is_anonymous()) else {
            return ParkingDecision::allow(DecisionReason::FailOpenNoSearchContext);
        };
        let Some(lot_position) = self.access.building_position(candidate) else {
            return ParkingDecision::allow(DecisionReason::FailOpenNoPosition);
        };
        self.decide_for_requester(rule, requester, lot_position)
    }

    /// Decide whether the host may create a parked vehicle for `owner` at
    /// `position`. The owner falls back to the current context's requester.
    pub fn should_deny_parked_vehicle_creation(
        &self,
        owner: Option<CitizenId>,
        position: Vec3,
    ) -> ParkingDecision {
        if !self.enabled {
            return ParkingDecision::allow(DecisionReason::FailOpenInactiveFeature);
        }
        let Some(lot) = self.access.lot_at_position(position) else {
            return ParkingDecision::allow(DecisionReason::FailOpenNoRule);
        };
        let rule = match self.applicable_rule(lot) {
            Ok(rule) => rule,
            Err(decision) => return decision,
        };
        let requester = self.contexts.peek_requester();
        match (owner, requester) {
            (Some(citizen), requester) => {
                let visitor_hint = requester.is_some_and(|r| r.is_visitor);
                evaluate_for_citizen(rule, Some(citizen), visitor_hint, position, self.access)
            }
            (None, Some(requester)) if !requester.is_anonymous() => {
                self.decide_for_requester(rule, requester, position)
            }
            (None, _) => ParkingDecision::allow(DecisionReason::FailOpenNoSearchContext),
        }
    }

    /// Checks shared by both call sites. `Err` carries the final decision.
    fn applicable_rule(&self, building: BuildingId) -> Result<&'a RuleRecord, ParkingDecision> {
        if !self.enabled {
            return Err(ParkingDecision::allow(
                DecisionReason::FailOpenInactiveFeature,
            ));
        }
        let Some(rule) = self.rules.get(building) else {
            return Err(ParkingDecision::allow(DecisionReason::FailOpenNoRule));
        };
        if rule.is_unrestricted() {
            return Err(ParkingDecision::allow(DecisionReason::Unrestricted));
        }
        Ok(rule)
    }

    fn decide_for_requester(
        &self,
        rule: &RuleRecord,
        requester: SearchRequester,
        position: Vec3,
    ) -> ParkingDecision {
        if let Some(citizen) = requester.citizen {
            return evaluate_for_citizen(
                rule,
                Some(citizen),
                requester.is_visitor,
                position,
                self.access,
            );
        }
        if let Some(vehicle) = requester.vehicle {
            if !self.access.is_passenger_vehicle(vehicle) {
                return ParkingDecision::allow(DecisionReason::FailOpenNonPassengerVehicle);
            }
            return evaluate_for_vehicle(
                rule,
                Some(vehicle),
                requester.is_visitor,
                position,
                self.access,
            );
        }
        ParkingDecision::allow(DecisionReason::FailOpenNoSearchContext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::UNLIMITED_RADIUS;
    use crate::ids::VehicleId;
    use crate::test_harness::FakeCity;

    const LOT: u32 = 100;
    const OPEN_LOT: u32 = 101;
    const UNRULED_LOT: u32 = 102;
    const NOWHERE_LOT: u32 = 103;

    fn city() -> FakeCity {
        FakeCity::new()
            .with_building(LOT, Vec3::ZERO)
            .with_building(OPEN_LOT, Vec3::new(1_000.0, 0.0, 0.0))
            .with_building(UNRULED_LOT, Vec3::new(2_000.0, 0.0, 0.0))
            // resident living 50m from LOT
            .with_citizen(1, Some(Vec3::new(50.0, 0.0, 0.0)), None)
            // resident living 5km away
            .with_citizen(2, Some(Vec3::new(5_000.0, 0.0, 0.0)), None)
            .with_visitor(3)
            .with_driver(20, 1)
            .with_driver(21, 2)
            .with_service_vehicle(30)
    }

    fn rules() -> RuleStore {
        let mut rules = RuleStore::new();
        rules.set(BuildingId(LOT), RuleRecord::closed().with_residents_within(200));
        rules.set(BuildingId(OPEN_LOT), RuleRecord::unrestricted());
        rules.set(
            BuildingId(NOWHERE_LOT),
            RuleRecord::closed().with_residents_within(UNLIMITED_RADIUS),
        );
        rules
    }

    #[test]
    fn test_no_context_fails_open() {
        let (city, rules, contexts) = (city(), rules(), SearchContextRegistry::default());
        let filter = CandidateFilter::new(&rules, &contexts, &city, true);
        assert_eq!(
            filter.should_deny_candidate(BuildingId(LOT), "Lot"),
            ParkingDecision::allow(DecisionReason::FailOpenNoSearchContext)
        );
    }

    #[test]
    fn test_anonymous_frame_fails_open() {
        let (city, rules, contexts) = (city(), rules(), SearchContextRegistry::default());
        let filter = CandidateFilter::new(&rules, &contexts, &city, true);
        let _guard = contexts.push(None, None, "host_relocation");
        assert!(!filter.should_deny_candidate(BuildingId(LOT), "Lot").is_denied());
    }

    #[test]
    fn test_citizen_context_evaluates_radius() {
        let (city, rules, contexts) = (city(), rules(), SearchContextRegistry::default());
        let filter = CandidateFilter::new(&rules, &contexts, &city, true);

        let near = contexts.with_context(None, Some(CitizenId(1)), "search", || {
            filter.should_deny_candidate(BuildingId(LOT), "Lot")
        });
        assert_eq!(
            near,
            ParkingDecision::allow(DecisionReason::MatchedResidentRadius)
        );

        let far = contexts.with_context(None, Some(CitizenId(2)), "search", || {
            filter.should_deny_candidate(BuildingId(LOT), "Lot")
        });
        assert_eq!(far, ParkingDecision::deny(DecisionReason::NoMatch));
    }

    #[test]
    fn test_unresolvable_citizen_fails_closed() {
        let (city, rules, contexts) = (city(), rules(), SearchContextRegistry::default());
        let filter = CandidateFilter::new(&rules, &contexts, &city, true);
        let _guard = contexts.push(None, Some(CitizenId(404)), "search");
        assert_eq!(
            filter.should_deny_candidate(BuildingId(LOT), "Lot"),
            ParkingDecision::deny(DecisionReason::NoCitizenContext)
        );
    }

    #[test]
    fn test_vehicle_context_resolves_driver_or_fails_closed() {
        let (city, rules, contexts) = (city(), rules(), SearchContextRegistry::default());
        let filter = CandidateFilter::new(&rules, &contexts, &city, true);

        let known = contexts.with_context(Some(VehicleId(20)), None, "search", || {
            filter.should_deny_candidate(BuildingId(LOT), "Lot")
        });
        assert!(known.allowed);

        let unknown = contexts.with_context(Some(VehicleId(99)), None, "search", || {
            filter.should_deny_candidate(BuildingId(LOT), "Lot")
        });
        assert_eq!(unknown, ParkingDecision::deny(DecisionReason::NoDriverContext));
    }

    #[test]
    fn test_citizen_takes_precedence_over_vehicle() {
        let (city, rules, contexts) = (city(), rules(), SearchContextRegistry::default());
        let filter = CandidateFilter::new(&rules, &contexts, &city, true);
        // Vehicle 21 is driven by the far resident, but the frame names the
        // near one explicitly.
        let _guard = contexts.push(Some(VehicleId(21)), Some(CitizenId(1)), "search");
        assert!(filter.should_deny_candidate(BuildingId(LOT), "Lot").allowed);
    }

    #[test]
    fn test_service_vehicle_fails_open() {
        let (city, rules, contexts) = (city(), rules(), SearchContextRegistry::default());
        let filter = CandidateFilter::new(&rules, &contexts, &city, true);
        let _guard = contexts.push(Some(VehicleId(30)), None, "search");
        assert_eq!(
            filter.should_deny_candidate(BuildingId(LOT), "Lot"),
            ParkingDecision::allow(DecisionReason::FailOpenNonPassengerVehicle)
        );
    }

    #[test]
    fn test_visitor_flag_set_after_push_is_honoured() {
        let (city, rules, contexts) = (city(), rules(), SearchContextRegistry::default());
        let filter = CandidateFilter::new(&rules, &contexts, &city, true);
        let guard = contexts.push(None, Some(CitizenId(1)), "search");
        guard.set_visitor_flag(true);
        assert_eq!(
            filter.should_deny_candidate(BuildingId(LOT), "Lot"),
            ParkingDecision::deny(DecisionReason::VisitorsNotAllowed)
        );
    }

    #[test]
    fn test_fail_open_shortcuts() {
        let (city, rules, contexts) = (city(), rules(), SearchContextRegistry::default());
        let _guard = contexts.push(None, Some(CitizenId(2)), "search");

        let disabled = CandidateFilter::new(&rules, &contexts, &city, false);
        assert_eq!(
            disabled.should_deny_candidate(BuildingId(LOT), "Lot").reason,
            DecisionReason::FailOpenInactiveFeature
        );

        let filter = CandidateFilter::new(&rules, &contexts, &city, true);
        assert_eq!(
            filter.should_deny_candidate(BuildingId(UNRULED_LOT), "Lot").reason,
            DecisionReason::FailOpenNoRule
        );
        assert_eq!(
            filter.should_deny_candidate(BuildingId(OPEN_LOT), "Lot").reason,
            DecisionReason::Unrestricted
        );
        assert_eq!(
            filter.should_deny_candidate(BuildingId(NOWHERE_LOT), "Lot").reason,
            DecisionReason::FailOpenNoPosition
        );
    }

    #[test]
    fn test_candidate_decisions_feed_episode() {
        let (city, rules) = (city(), rules());
        let contexts = SearchContextRegistry::new(true);
        let filter = CandidateFilter::new(&rules, &contexts, &city, true);
        let _guard = contexts.push(None, Some(CitizenId(2)), "search");
        filter.should_deny_candidate(BuildingId(OPEN_LOT), "Shop");
        filter.should_deny_candidate(BuildingId(LOT), "Tower");

        let episode = contexts.peek().unwrap().episode.unwrap();
        assert_eq!(episode.candidates, 2);
        assert_eq!(episode.denied, 1);
        assert_eq!(episode.last_denial.unwrap().prefab_name, "Tower");
    }

    #[test]
    fn test_parked_vehicle_creation_uses_owner() {
        let (city, rules, contexts) = (city(), rules(), SearchContextRegistry::default());
        let filter = CandidateFilter::new(&rules, &contexts, &city, true);
        let on_lot = Vec3::new(5.0, 0.0, 5.0);

        assert!(filter
            .should_deny_parked_vehicle_creation(Some(CitizenId(1)), on_lot)
            .allowed);
        assert_eq!(
            filter.should_deny_parked_vehicle_creation(Some(CitizenId(2)), on_lot),
            ParkingDecision::deny(DecisionReason::NoMatch)
        );
        assert_eq!(
            filter.should_deny_parked_vehicle_creation(Some(CitizenId(404)), on_lot),
            ParkingDecision::deny(DecisionReason::NoCitizenContext)
        );
    }

    #[test]
    fn test_parked_vehicle_creation_without_lot_or_owner() {
        let (city, rules, contexts) = (city(), rules(), SearchContextRegistry::default());
        let filter = CandidateFilter::new(&rules, &contexts, &city, true);
        let street = Vec3::new(-3_000.0, 0.0, 0.0);
        let on_lot = Vec3::ZERO;

        assert_eq!(
            filter
                .should_deny_parked_vehicle_creation(Some(CitizenId(2)), street)
                .reason,
            DecisionReason::FailOpenNoRule
        );
        assert_eq!(
            filter.should_deny_parked_vehicle_creation(None, on_lot).reason,
            DecisionReason::FailOpenNoSearchContext
        );

        // Without an explicit owner the context's requester is used.
        let _guard = contexts.push(Some(VehicleId(21)), None, "park_car");
        assert_eq!(
            filter.should_deny_parked_vehicle_creation(None, on_lot),
            ParkingDecision::deny(DecisionReason::NoMatch)
        );
    }
}
