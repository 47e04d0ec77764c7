use std::sync::{Arc, Mutex};

use crate::ids::BuildingId;

/// Clonable, thread-safe mailbox for reevaluation requests.
///
/// UI handlers and background initiators submit here; the scheduler drains it
/// on the tick thread, so queue and cursor state are only ever touched by the
/// tick.
#[derive(Debug, Clone, Default)]
pub struct ReevaluationInbox(Arc<Mutex<Vec<BuildingId>>>);

impl ReevaluationInbox {
    pub fn submit(&self, building: BuildingId) {
        self.lock().push(building);
    }

    pub fn take_all(&self) -> Vec<BuildingId> {
        std::mem::take(&mut *self.lock())
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<BuildingId>> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
