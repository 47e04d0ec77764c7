use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::config::UNLIMITED_RADIUS;

/// Access rule for one building's parking lot.
///
/// The bool flags are authoritative: a radius is only consulted when its
/// flag is set, and a radius of `UNLIMITED_RADIUS` matches anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub struct RuleRecord {
    pub residents_only: bool,
    pub residents_radius_meters: u16,
    pub work_study_only: bool,
    pub work_study_radius_meters: u16,
    pub visitors_allowed: bool,
}

impl Default for RuleRecord {
    fn default() -> Self {
        Self::unrestricted()
    }
}

impl RuleRecord {
    /// A rule that lets everyone park.
    pub const fn unrestricted() -> Self {
        Self {
            residents_only: false,
            residents_radius_meters: 0,
            work_study_only: false,
            work_study_radius_meters: 0,
            visitors_allowed: true,
        }
    }

    /// A rule that only restricts visitors; everyone else falls through to
    /// `NoMatch` until a radius flag is added.
    pub const fn closed() -> Self {
        Self {
            residents_only: false,
            residents_radius_meters: 0,
            work_study_only: false,
            work_study_radius_meters: 0,
            visitors_allowed: false,
        }
    }

    pub const fn with_residents_within(mut self, radius_meters: u16) -> Self {
        self.residents_only = true;
        self.residents_radius_meters = radius_meters;
        self
    }

    pub const fn with_work_study_within(mut self, radius_meters: u16) -> Self {
        self.work_study_only = true;
        self.work_study_radius_meters = radius_meters;
        self
    }

    pub const fn with_visitors(mut self, allowed: bool) -> Self {
        self.visitors_allowed = allowed;
        self
    }

    /// True when the rule imposes nothing: no radius restriction and
    /// visitors welcome.
    pub fn is_unrestricted(&self) -> bool {
        !self.residents_only && !self.work_study_only && self.visitors_allowed
    }

    /// Squared resident radius, or `None` when unlimited.
    pub fn residents_radius_sq(&self) -> Option<f32> {
        radius_sq(self.residents_radius_meters)
    }

    /// Squared work/study radius, or `None` when unlimited.
    pub fn work_study_radius_sq(&self) -> Option<f32> {
        radius_sq(self.work_study_radius_meters)
    }
}

fn radius_sq(radius_meters: u16) -> Option<f32> {
    if radius_meters == UNLIMITED_RADIUS {
        None
    } else {
        let r = radius_meters as f32;
        Some(r * r)
    }
}
