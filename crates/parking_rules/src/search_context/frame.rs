use std::time::{Duration, Instant};

use crate::ids::{BuildingId, CitizenId, VehicleId};
use crate::policy::DecisionReason;

/// Diagnostic record of one search: how many candidates were considered and
/// denied, and the last denial. Never influences a decision.
#[derive(Debug, Clone)]
pub struct SearchEpisode {
    started: Instant,
    pub candidates: u32,
    pub denied: u32,
    pub last_denial: Option<CandidateDenial>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateDenial {
    pub building: BuildingId,
    pub reason: DecisionReason,
    pub prefab_name: String,
}

impl SearchEpisode {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            candidates: 0,
            denied: 0,
            last_denial: None,
        }
    }

    pub fn record(
        &mut self,
        denied: bool,
        reason: DecisionReason,
        building: BuildingId,
        prefab_name: &str,
    ) {
        self.candidates += 1;
        if denied {
            self.denied += 1;
            self.last_denial = Some(CandidateDenial {
                building,
                reason,
                prefab_name: prefab_name.to_owned(),
            });
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Who pushed a frame, without its diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchRequester {
    pub vehicle: Option<VehicleId>,
    pub citizen: Option<CitizenId>,
    pub is_visitor: bool,
}

impl SearchRequester {
    /// True when neither a vehicle nor a citizen is named.
    pub fn is_anonymous(&self) -> bool {
        self.vehicle.is_none() && self.citizen.is_none()
    }
}

/// One level of search context.
#[derive(Debug, Clone)]
pub struct SearchContextFrame {
    pub requester_vehicle: Option<VehicleId>,
    pub requester_citizen: Option<CitizenId>,
    /// Free-text tag naming the call site that pushed the frame.
    pub source: &'static str,
    /// May be flipped after push once the caller learns the trip purpose.
    pub is_visitor: bool,
    pub episode: Option<SearchEpisode>,
}

impl SearchContextFrame {
    pub fn new(
        requester_vehicle: Option<VehicleId>,
        requester_citizen: Option<CitizenId>,
        source: &'static str,
    ) -> Self {
        Self {
            requester_vehicle,
            requester_citizen,
            source,
            is_visitor: false,
            episode: None,
        }
    }

    pub fn requester(&self) -> SearchRequester {
        SearchRequester {
            vehicle: self.requester_vehicle,
            citizen: self.requester_citizen,
            is_visitor: self.is_visitor,
        }
    }

    /// True when the frame names neither a vehicle nor a citizen.
    pub fn is_anonymous(&self) -> bool {
        self.requester().is_anonymous()
    }
}
