//! Encode and decode a `RuleStore` as a headered bitcode blob.

use std::collections::HashSet;
use std::path::Path;

use bevy::log::{info, warn};
use bitcode::{Decode, Encode};

use parking_rules::{BuildingId, RuleRecord, RuleStore};

use crate::atomic_write::atomic_write;
use crate::rule_header::{unwrap_header, wrap_with_header};
use crate::save_error::SaveError;

/// One persisted `{building -> rule}` pair.
#[derive(Debug, Clone, Copy, PartialEq, Encode, Decode)]
struct PersistedRule {
    building: BuildingId,
    rule: RuleRecord,
}

/// Serialize every rule in ascending building order.
pub fn encode_rules(store: &RuleStore) -> Vec<u8> {
    let records: Vec<PersistedRule> = store
        .iter()
        .map(|(building, rule)| PersistedRule {
            building,
            rule: *rule,
        })
        .collect();
    let payload = bitcode::encode(&records);
    wrap_with_header(records.len() as u32, &payload)
}

/// Parse and validate a rule blob without touching any store.
pub fn decode_rules(bytes: &[u8]) -> Result<Vec<(BuildingId, RuleRecord)>, SaveError> {
    let (header, payload) = unwrap_header(bytes)?;
    let records: Vec<PersistedRule> = bitcode::decode(payload)?;

    if records.len() != header.record_count as usize {
        return Err(SaveError::CountMismatch {
            header: header.record_count,
            decoded: records.len(),
        });
    }

    let mut seen = HashSet::with_capacity(records.len());
    for record in &records {
        if !seen.insert(record.building) {
            return Err(SaveError::DuplicateBuilding(record.building));
        }
    }

    Ok(records
        .into_iter()
        .map(|record| (record.building, record.rule))
        .collect())
}

/// Replace the contents of `store` with the rules in `bytes`.
///
/// All or nothing: on any error `store` is left exactly as it was.
pub fn load_rules_into(store: &mut RuleStore, bytes: &[u8]) -> Result<usize, SaveError> {
    let rules = match decode_rules(bytes) {
        Ok(rules) => rules,
        Err(e) => {
            warn!("Rejected parking rule load, keeping {} existing rules: {}", store.len(), e);
            return Err(e);
        }
    };
    let count = rules.len();
    *store = rules.into_iter().collect();
    Ok(count)
}

pub fn save_rules_to_file(store: &RuleStore, path: &Path) -> Result<(), SaveError> {
    let bytes = encode_rules(store);
    atomic_write(path, &bytes)?;
    info!(
        "Saved {} parking rules ({} bytes) to {}",
        store.len(),
        bytes.len(),
        path.display()
    );
    Ok(())
}

pub fn load_rules_from_file(store: &mut RuleStore, path: &Path) -> Result<usize, SaveError> {
    let bytes = std::fs::read(path)?;
    let count = load_rules_into(store, &bytes)?;
    info!("Loaded {} parking rules from {}", count, path.display());
    Ok(count)
}
