//! Tests for policy evaluation order, radius boundaries and the
//! identity-resolving entry points.

use bevy::math::Vec3;

use super::*;

use crate::config::UNLIMITED_RADIUS;
use crate::ids::{CitizenId, VehicleId};
use crate::rules::RuleRecord;
use crate::test_harness::FakeCity;

const LOT: Vec3 = Vec3::ZERO;

fn at_x(x: f32) -> Vec3 {
    Vec3::new(x, 0.0, 0.0)
}

// -------------------------------------------------------------------------
// Visitor branch
// -------------------------------------------------------------------------

#[test]
fn test_visitor_denied_when_visitors_not_allowed_regardless_of_positions() {
    let rule = RuleRecord::closed()
        .with_residents_within(UNLIMITED_RADIUS)
        .with_work_study_within(UNLIMITED_RADIUS);
    let positions = [None, Some(LOT), Some(at_x(10_000.0))];
    for home in positions {
        for work in positions {
            let decision = evaluate(&rule, true, LOT, home, work);
            assert_eq!(
                decision,
                ParkingDecision::deny(DecisionReason::VisitorsNotAllowed),
                "home={home:?} work={work:?}"
            );
        }
    }
}

#[test]
fn test_visitor_allowed_even_when_resident_and_work_rules_set() {
    let rule = RuleRecord::closed()
        .with_residents_within(10)
        .with_work_study_within(10)
        .with_visitors(true);
    let decision = evaluate(&rule, true, LOT, None, None);
    assert_eq!(decision, ParkingDecision::allow(DecisionReason::MatchedVisitor));
}

// -------------------------------------------------------------------------
// Resident branch
// -------------------------------------------------------------------------

#[test]
fn test_unlimited_resident_radius_allows_any_home() {
    let rule = RuleRecord::closed().with_residents_within(UNLIMITED_RADIUS);
    for home in [LOT, at_x(1.0), at_x(1.0e7), Vec3::new(-5.0e6, 0.0, 9.0e6)] {
        let decision = evaluate(&rule, false, LOT, Some(home), None);
        assert_eq!(
            decision,
            ParkingDecision::allow(DecisionReason::MatchedResidentRadius)
        );
    }
}

#[test]
fn test_resident_radius_boundary_is_inclusive() {
    let rule = RuleRecord::closed().with_residents_within(500);

    let at_edge = evaluate(&rule, false, LOT, Some(at_x(500.0)), None);
    assert_eq!(
        at_edge,
        ParkingDecision::allow(DecisionReason::MatchedResidentRadius)
    );

    let just_past = evaluate(&rule, false, LOT, Some(at_x(500.01)), None);
    assert_eq!(just_past, ParkingDecision::deny(DecisionReason::NoMatch));
}

#[test]
fn test_distance_ignores_height() {
    let rule = RuleRecord::closed().with_residents_within(100);
    let home = Vec3::new(60.0, 5_000.0, 80.0);
    let decision = evaluate(&rule, false, LOT, Some(home), None);
    assert!(decision.allowed);
    assert!((horizontal_distance_sq(home, LOT) - 10_000.0).abs() < f32::EPSILON);
}

#[test]
fn test_missing_home_falls_through_to_work_rule() {
    let rule = RuleRecord::closed()
        .with_residents_within(100)
        .with_work_study_within(100);
    let decision = evaluate(&rule, false, LOT, None, Some(at_x(50.0)));
    assert_eq!(decision, ParkingDecision::allow(DecisionReason::MatchedWorkRadius));
}

#[test]
fn test_far_resident_still_matches_nearby_workplace() {
    let rule = RuleRecord::closed()
        .with_residents_within(100)
        .with_work_study_within(100);
    let decision = evaluate(&rule, false, LOT, Some(at_x(900.0)), Some(at_x(20.0)));
    assert_eq!(decision, ParkingDecision::allow(DecisionReason::MatchedWorkRadius));
}

// -------------------------------------------------------------------------
// Work/study branch
// -------------------------------------------------------------------------

#[test]
fn test_unlimited_work_radius_allows_without_work_position() {
    let rule = RuleRecord::closed().with_work_study_within(UNLIMITED_RADIUS);
    let decision = evaluate(&rule, false, LOT, None, None);
    assert_eq!(decision, ParkingDecision::allow(DecisionReason::MatchedWorkRadius));
}

#[test]
fn test_work_radius_requires_known_position() {
    let rule = RuleRecord::closed().with_work_study_within(300);
    assert_eq!(
        evaluate(&rule, false, LOT, None, None),
        ParkingDecision::deny(DecisionReason::NoMatch)
    );
    assert_eq!(
        evaluate(&rule, false, LOT, None, Some(at_x(301.0))),
        ParkingDecision::deny(DecisionReason::NoMatch)
    );
}

#[test]
fn test_work_radius_boundary_is_inclusive() {
    let rule = RuleRecord::closed().with_work_study_within(300);
    assert_eq!(
        evaluate(&rule, false, LOT, None, Some(at_x(300.0))),
        ParkingDecision::allow(DecisionReason::MatchedWorkRadius)
    );
    assert_eq!(
        evaluate(&rule, false, LOT, None, Some(at_x(300.01))),
        ParkingDecision::deny(DecisionReason::NoMatch)
    );
}

#[test]
fn test_no_flags_non_visitor_is_no_match() {
    let decision = evaluate(&RuleRecord::closed(), false, LOT, Some(LOT), Some(LOT));
    assert_eq!(decision, ParkingDecision::deny(DecisionReason::NoMatch));
}

#[test]
fn test_evaluation_is_idempotent() {
    let rule = RuleRecord::closed()
        .with_residents_within(250)
        .with_work_study_within(40);
    let home = Some(at_x(260.0));
    let work = Some(Vec3::new(0.0, 0.0, 39.0));
    let first = evaluate(&rule, false, LOT, home, work);
    for _ in 0..100 {
        assert_eq!(evaluate(&rule, false, LOT, home, work), first);
    }
}

// -------------------------------------------------------------------------
// Identity-resolving entry points
// -------------------------------------------------------------------------

fn city() -> FakeCity {
    FakeCity::new()
        .with_citizen(1, Some(at_x(100.0)), None)
        .with_citizen(2, Some(at_x(5_000.0)), None)
        .with_visitor(3)
        .with_driver(10, 1)
        .with_driver(11, 3)
        .with_driver(12, 99)
}

#[test]
fn test_citizen_entry_resolves_home() {
    let rule = RuleRecord::closed().with_residents_within(200);
    let city = city();
    let near = evaluate_for_citizen(&rule, Some(CitizenId(1)), false, LOT, &city);
    let far = evaluate_for_citizen(&rule, Some(CitizenId(2)), false, LOT, &city);
    assert_eq!(near.reason, DecisionReason::MatchedResidentRadius);
    assert_eq!(far, ParkingDecision::deny(DecisionReason::NoMatch));
}

#[test]
fn test_citizen_entry_fails_closed_without_citizen() {
    let rule = RuleRecord::closed().with_residents_within(200);
    let city = city();
    assert_eq!(
        evaluate_for_citizen(&rule, None, false, LOT, &city),
        ParkingDecision::deny(DecisionReason::NoCitizenContext)
    );
    assert_eq!(
        evaluate_for_citizen(&rule, Some(CitizenId(404)), false, LOT, &city),
        ParkingDecision::deny(DecisionReason::NoCitizenContext)
    );
}

#[test]
fn test_visitor_hint_overrides_resident_role() {
    let rule = RuleRecord::closed().with_residents_within(UNLIMITED_RADIUS);
    let city = city();
    let decision = evaluate_for_citizen(&rule, Some(CitizenId(1)), true, LOT, &city);
    assert_eq!(decision, ParkingDecision::deny(DecisionReason::VisitorsNotAllowed));
}

#[test]
fn test_unrestricted_rule_skips_resolution() {
    let city = FakeCity::new();
    let rule = RuleRecord::unrestricted();
    assert_eq!(
        evaluate_for_citizen(&rule, None, false, LOT, &city),
        ParkingDecision::allow(DecisionReason::Unrestricted)
    );
    assert_eq!(
        evaluate_for_vehicle(&rule, None, false, LOT, &city),
        ParkingDecision::allow(DecisionReason::Unrestricted)
    );
}

#[test]
fn test_vehicle_entry_resolves_driver() {
    let rule = RuleRecord::closed().with_residents_within(200);
    let city = city();
    assert_eq!(
        evaluate_for_vehicle(&rule, Some(VehicleId(10)), false, LOT, &city).reason,
        DecisionReason::MatchedResidentRadius
    );
    assert_eq!(
        evaluate_for_vehicle(&rule, Some(VehicleId(11)), false, LOT, &city).reason,
        DecisionReason::VisitorsNotAllowed
    );
}

#[test]
fn test_vehicle_entry_fails_closed_without_driver() {
    let rule = RuleRecord::closed().with_residents_within(200);
    let city = city();
    assert_eq!(
        evaluate_for_vehicle(&rule, None, false, LOT, &city),
        ParkingDecision::deny(DecisionReason::NoDriverContext)
    );
    assert_eq!(
        evaluate_for_vehicle(&rule, Some(VehicleId(77)), false, LOT, &city),
        ParkingDecision::deny(DecisionReason::NoDriverContext)
    );
    // Driver known to the vehicle table but not to the citizen table.
    assert_eq!(
        evaluate_for_vehicle(&rule, Some(VehicleId(12)), false, LOT, &city),
        ParkingDecision::deny(DecisionReason::NoCitizenContext)
    );
}

#[test]
fn test_reason_codes_and_fail_open_classification() {
    assert_eq!(DecisionReason::MatchedVisitor.code(), "matched_visitor");
    assert_eq!(DecisionReason::NoMatch.to_string(), "no_match");
    assert!(DecisionReason::FailOpenNoRule.is_fail_open());
    assert!(!DecisionReason::NoDriverContext.is_fail_open());
}
