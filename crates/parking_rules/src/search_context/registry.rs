use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::thread::{self, ThreadId};

use bevy::log::debug;

use crate::config::CONTEXT_STACK_CAPACITY;
use crate::ids::{BuildingId, CitizenId, VehicleId};
use crate::policy::DecisionReason;

use super::frame::{SearchContextFrame, SearchEpisode, SearchRequester};

/// Per-thread search-context stacks, keyed by thread id.
///
/// Owned by the session runtime and shared with worker threads through an
/// `Arc`. Each thread only ever reads or writes its own entry; the lock is
/// held for the duration of a single push/pop/peek, never across a search.
#[derive(Default)]
pub struct SearchContextRegistry {
    stacks: Mutex<HashMap<ThreadId, Vec<SearchContextFrame>>>,
    episodes_enabled: AtomicBool,
}

impl SearchContextRegistry {
    pub fn new(episodes_enabled: bool) -> Self {
        Self {
            stacks: Mutex::default(),
            episodes_enabled: AtomicBool::new(episodes_enabled),
        }
    }

    pub fn set_episodes_enabled(&self, enabled: bool) {
        self.episodes_enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn episodes_enabled(&self) -> bool {
        self.episodes_enabled.load(Ordering::Relaxed)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ThreadId, Vec<SearchContextFrame>>> {
        // A panic while holding the lock cannot leave a stack half-updated,
        // so a poisoned map is still consistent.
        self.stacks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Mutable access to the calling thread's stack, creating it on first
    /// push.
    fn with_stack<R>(&self, f: impl FnOnce(&mut Vec<SearchContextFrame>) -> R) -> R {
        let mut stacks = self.lock();
        let stack = stacks
            .entry(thread::current().id())
            .or_insert_with(|| Vec::with_capacity(CONTEXT_STACK_CAPACITY));
        f(stack)
    }

    /// Mutable access to the calling thread's stack if it has one.
    fn with_existing_stack<R>(
        &self,
        f: impl FnOnce(&mut Vec<SearchContextFrame>) -> R,
    ) -> Option<R> {
        self.lock().get_mut(&thread::current().id()).map(f)
    }

    /// Read the calling thread's innermost frame without creating an entry.
    fn with_top<R>(&self, f: impl FnOnce(&SearchContextFrame) -> R) -> Option<R> {
        self.lock()
            .get(&thread::current().id())
            .and_then(|stack| stack.last())
            .map(f)
    }

    /// Push a frame for the calling thread. The frame is popped when the
    /// returned guard drops.
    #[must_use = "the context is popped as soon as the guard is dropped"]
    pub fn push(
        &self,
        requester_vehicle: Option<VehicleId>,
        requester_citizen: Option<CitizenId>,
        source: &'static str,
    ) -> SearchContextGuard<'_> {
        let mut frame = SearchContextFrame::new(requester_vehicle, requester_citizen, source);
        if self.episodes_enabled() {
            frame.episode = Some(SearchEpisode::start());
        }
        let depth = self.with_stack(|stack| {
            stack.push(frame);
            stack.len()
        });
        SearchContextGuard {
            registry: self,
            depth,
            _not_send: PhantomData,
        }
    }

    /// Run `f` inside a pushed frame.
    pub fn with_context<R>(
        &self,
        requester_vehicle: Option<VehicleId>,
        requester_citizen: Option<CitizenId>,
        source: &'static str,
        f: impl FnOnce() -> R,
    ) -> R {
        let _guard = self.push(requester_vehicle, requester_citizen, source);
        f()
    }

    /// Copy of the calling thread's innermost frame.
    pub fn peek(&self) -> Option<SearchContextFrame> {
        self.with_top(SearchContextFrame::clone)
    }

    /// Identity of the innermost frame's requester. Copies no episode data.
    pub fn peek_requester(&self) -> Option<SearchRequester> {
        self.with_top(SearchContextFrame::requester)
    }

    pub fn has_context(&self) -> bool {
        self.depth() > 0
    }

    pub fn depth(&self) -> usize {
        self.lock()
            .get(&thread::current().id())
            .map_or(0, Vec::len)
    }

    /// Mark the innermost frame's requester as a visitor (or not). No-op
    /// without a frame.
    pub fn set_visitor_flag(&self, is_visitor: bool) {
        self.with_existing_stack(|stack| {
            if let Some(frame) = stack.last_mut() {
                frame.is_visitor = is_visitor;
            }
        });
    }

    /// Feed a candidate outcome into the innermost frame's episode. No-op
    /// when there is no frame or episodes are off.
    pub fn record_candidate(
        &self,
        denied: bool,
        reason: DecisionReason,
        building: BuildingId,
        prefab_name: &str,
    ) {
        self.with_existing_stack(|stack| {
            if let Some(episode) = stack.last_mut().and_then(|f| f.episode.as_mut()) {
                episode.record(denied, reason, building, prefab_name);
            }
        });
    }

    /// Drop every thread's frames. Used on session teardown.
    pub fn clear_all(&self) {
        self.lock().clear();
    }

    fn pop(&self, expected_depth: usize) {
        let popped = {
            let mut stacks = self.lock();
            let id = thread::current().id();
            let Some(stack) = stacks.get_mut(&id) else {
                // Cleared by teardown while the guard was alive.
                return;
            };
            if stack.len() < expected_depth {
                return;
            }
            // Drops frames leaked by forgotten inner guards along with ours.
            stack.truncate(expected_depth);
            let frame = stack.pop();
            if stack.is_empty() {
                stacks.remove(&id);
            }
            frame
        };
        if let Some(frame) = popped {
            if let Some(episode) = &frame.episode {
                log_episode(&frame, episode);
            }
        }
    }

    /// Number of threads currently holding a stack entry.
    #[cfg(test)]
    pub(crate) fn thread_entries(&self) -> usize {
        self.lock().len()
    }
}

fn log_episode(frame: &SearchContextFrame, episode: &SearchEpisode) {
    match &episode.last_denial {
        Some(denial) => debug!(
            "Parking search '{}' (vehicle {:?}, citizen {:?}): {} candidates, {} denied in {:?}; \
             last denial {} '{}' ({})",
            frame.source,
            frame.requester_vehicle,
            frame.requester_citizen,
            episode.candidates,
            episode.denied,
            episode.elapsed(),
            denial.building,
            denial.prefab_name,
            denial.reason,
        ),
        None => debug!(
            "Parking search '{}' (vehicle {:?}, citizen {:?}): {} candidates, none denied in {:?}",
            frame.source,
            frame.requester_vehicle,
            frame.requester_citizen,
            episode.candidates,
            episode.elapsed(),
        ),
    }
}

/// Scoped ownership of one pushed frame. Pops on drop, including during
/// unwinding. Not `Send`: it must be dropped on the thread that pushed.
pub struct SearchContextGuard<'a> {
    registry: &'a SearchContextRegistry,
    depth: usize,
    _not_send: PhantomData<*const ()>,
}

impl SearchContextGuard<'_> {
    pub fn set_visitor_flag(&self, is_visitor: bool) {
        self.registry.set_visitor_flag(is_visitor);
    }
}

impl Drop for SearchContextGuard<'_> {
    fn drop(&mut self) {
        self.registry.pop(self.depth);
    }
}
