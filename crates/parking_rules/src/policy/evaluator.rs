use bevy::math::Vec3;

use crate::game_access::ParkingGameAccess;
use crate::ids::{CitizenId, VehicleId};
use crate::rules::RuleRecord;

use super::reason::{DecisionReason, ParkingDecision};

/// Squared distance between two points on the horizontal (x/z) plane.
pub fn horizontal_distance_sq(a: Vec3, b: Vec3) -> f32 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    dx * dx + dz * dz
}

/// `None` radius means unlimited. The boundary is inclusive.
fn within(radius_sq: Option<f32>, a: Vec3, b: Vec3) -> bool {
    match radius_sq {
        None => true,
        Some(r2) => horizontal_distance_sq(a, b) <= r2,
    }
}

/// Decide whether a requester may park at `subject_position`.
///
/// See the module docs for the evaluation order.
pub fn evaluate(
    rule: &RuleRecord,
    is_visitor: bool,
    subject_position: Vec3,
    home_position: Option<Vec3>,
    work_position: Option<Vec3>,
) -> ParkingDecision {
    if is_visitor {
        return if rule.visitors_allowed {
            ParkingDecision::allow(DecisionReason::MatchedVisitor)
        } else {
            ParkingDecision::deny(DecisionReason::VisitorsNotAllowed)
        };
    }

    if rule.residents_only {
        if let Some(home) = home_position {
            if within(rule.residents_radius_sq(), home, subject_position) {
                return ParkingDecision::allow(DecisionReason::MatchedResidentRadius);
            }
        }
    }

    if rule.work_study_only {
        let radius_sq = rule.work_study_radius_sq();
        if radius_sq.is_none() {
            return ParkingDecision::allow(DecisionReason::MatchedWorkRadius);
        }
        if let Some(work) = work_position {
            if within(radius_sq, work, subject_position) {
                return ParkingDecision::allow(DecisionReason::MatchedWorkRadius);
            }
        }
    }

    ParkingDecision::deny(DecisionReason::NoMatch)
}

/// Resolve a citizen's roles through the host, then evaluate.
///
/// Fails closed: an absent or unresolvable citizen is denied with
/// `NoCitizenContext`. `visitor_hint` comes from the search context and is
/// OR-ed with the resolved visitor role.
pub fn evaluate_for_citizen(
    rule: &RuleRecord,
    citizen: Option<CitizenId>,
    visitor_hint: bool,
    subject_position: Vec3,
    access: &dyn ParkingGameAccess,
) -> ParkingDecision {
    if rule.is_unrestricted() {
        return ParkingDecision::allow(DecisionReason::Unrestricted);
    }
    let Some(roles) = citizen.and_then(|c| access.resolve_citizen_roles(c)) else {
        return ParkingDecision::deny(DecisionReason::NoCitizenContext);
    };
    evaluate(
        rule,
        roles.is_visitor || visitor_hint,
        subject_position,
        roles.home_position,
        roles.work_position,
    )
}

/// Resolve the driver of a moving vehicle, then evaluate as that citizen.
///
/// Fails closed: an absent vehicle or one without a resolvable driver is
/// denied with `NoDriverContext`.
pub fn evaluate_for_vehicle(
    rule: &RuleRecord,
    vehicle: Option<VehicleId>,
    visitor_hint: bool,
    subject_position: Vec3,
    access: &dyn ParkingGameAccess,
) -> ParkingDecision {
    if rule.is_unrestricted() {
        return ParkingDecision::allow(DecisionReason::Unrestricted);
    }
    let Some(driver) = vehicle.and_then(|v| access.resolve_vehicle_driver(v)) else {
        return ParkingDecision::deny(DecisionReason::NoDriverContext);
    };
    evaluate_for_citizen(rule, Some(driver), visitor_hint, subject_position, access)
}
