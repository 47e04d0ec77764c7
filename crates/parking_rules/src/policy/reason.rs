use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a parking request was allowed or denied.
///
/// The reason is part of the observable result, not just a log detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecisionReason {
    Unrestricted,
    MatchedResidentRadius,
    MatchedWorkRadius,
    MatchedVisitor,
    VisitorsNotAllowed,
    NoMatch,
    NoDriverContext,
    NoCitizenContext,
    FailOpenInactiveFeature,
    FailOpenNonPassengerVehicle,
    FailOpenNoRule,
    FailOpenNoPosition,
    /// The search carries no requester identity at all (host housekeeping).
    FailOpenNoSearchContext,
}

impl DecisionReason {
    /// Stable snake_case code used in log lines.
    pub fn code(self) -> &'static str {
        match self {
            Self::Unrestricted => "unrestricted",
            Self::MatchedResidentRadius => "matched_resident_radius",
            Self::MatchedWorkRadius => "matched_work_radius",
            Self::MatchedVisitor => "matched_visitor",
            Self::VisitorsNotAllowed => "visitors_not_allowed",
            Self::NoMatch => "no_match",
            Self::NoDriverContext => "no_driver_context",
            Self::NoCitizenContext => "no_citizen_context",
            Self::FailOpenInactiveFeature => "fail_open_inactive_feature",
            Self::FailOpenNonPassengerVehicle => "fail_open_non_passenger_vehicle",
            Self::FailOpenNoRule => "fail_open_no_rule",
            Self::FailOpenNoPosition => "fail_open_no_position",
            Self::FailOpenNoSearchContext => "fail_open_no_search_context",
        }
    }

    pub fn is_fail_open(self) -> bool {
        matches!(
            self,
            Self::FailOpenInactiveFeature
                | Self::FailOpenNonPassengerVehicle
                | Self::FailOpenNoRule
                | Self::FailOpenNoPosition
                | Self::FailOpenNoSearchContext
        )
    }
}

impl fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// An allow/deny verdict together with its reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParkingDecision {
    pub allowed: bool,
    pub reason: DecisionReason,
}

impl ParkingDecision {
    pub const fn allow(reason: DecisionReason) -> Self {
        Self {
            allowed: true,
            reason,
        }
    }

    pub const fn deny(reason: DecisionReason) -> Self {
        Self {
            allowed: false,
            reason,
        }
    }

    pub fn is_denied(&self) -> bool {
        !self.allowed
    }
}
