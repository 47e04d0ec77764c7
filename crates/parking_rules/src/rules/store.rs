use std::collections::BTreeMap;

use crate::ids::BuildingId;

use super::record::RuleRecord;

/// Mapping from building to its parking rule.
///
/// Ordered so enumeration (full sweeps, persistence) is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleStore {
    rules: BTreeMap<BuildingId, RuleRecord>,
}

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, building: BuildingId) -> Option<&RuleRecord> {
        self.rules.get(&building)
    }

    pub fn contains(&self, building: BuildingId) -> bool {
        self.rules.contains_key(&building)
    }

    /// Insert or replace a rule, returning the previous one.
    pub fn set(&mut self, building: BuildingId, rule: RuleRecord) -> Option<RuleRecord> {
        self.rules.insert(building, rule)
    }

    pub fn remove(&mut self, building: BuildingId) -> Option<RuleRecord> {
        self.rules.remove(&building)
    }

    pub fn clear(&mut self) {
        self.rules.clear();
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Enumerate rules in ascending building order.
    pub fn iter(&self) -> impl Iterator<Item = (BuildingId, &RuleRecord)> + '_ {
        self.rules.iter().map(|(id, rule)| (*id, rule))
    }

    pub fn buildings(&self) -> impl Iterator<Item = BuildingId> + '_ {
        self.rules.keys().copied()
    }
}

impl FromIterator<(BuildingId, RuleRecord)> for RuleStore {
    fn from_iter<I: IntoIterator<Item = (BuildingId, RuleRecord)>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}
