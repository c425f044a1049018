//! Per-action in-flight flags.
//!
//! A flag only blocks a second submission of the same action. Different
//! actions run concurrently and are not ordered against each other.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex, PoisonError},
};

use tokio::sync::broadcast;
use tracing::debug;

use crate::controller::events::{Action, ConsoleEvent};

#[derive(Clone)]
pub struct InFlightTracker {
    active: Arc<Mutex<HashSet<Action>>>,
    events: broadcast::Sender<ConsoleEvent>,
}

impl InFlightTracker {
    pub fn new(events: broadcast::Sender<ConsoleEvent>) -> Self {
        Self {
            active: Arc::new(Mutex::new(HashSet::new())),
            events,
        }
    }

    /// Marks `action` busy until the returned guard drops. `None` while the
    /// same action is already running.
    pub fn try_begin(&self, action: Action) -> Option<InFlightGuard> {
        let inserted = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(action);
        if !inserted {
            debug!(action = action.label(), "inflight: duplicate submission ignored");
            return None;
        }

        let _ = self
            .events
            .send(ConsoleEvent::InFlightChanged { action, busy: true });
        Some(InFlightGuard {
            tracker: self.clone(),
            action,
        })
    }

    pub fn is_active(&self, action: Action) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&action)
    }

    fn finish(&self, action: Action) {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&action);
        let _ = self.events.send(ConsoleEvent::InFlightChanged {
            action,
            busy: false,
        });
    }
}

pub struct InFlightGuard {
    tracker: InFlightTracker,
    action: Action,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.tracker.finish(self.action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_action_is_blocked_until_guard_drops() {
        let (events, _) = broadcast::channel(16);
        let tracker = InFlightTracker::new(events);

        let guard = tracker.try_begin(Action::Load).expect("first");
        assert!(tracker.is_active(Action::Load));
        assert!(tracker.try_begin(Action::Load).is_none());

        drop(guard);
        assert!(!tracker.is_active(Action::Load));
        assert!(tracker.try_begin(Action::Load).is_some());
    }

    #[test]
    fn different_actions_do_not_block_each_other() {
        let (events, _) = broadcast::channel(16);
        let tracker = InFlightTracker::new(events);

        let _delete = tracker.try_begin(Action::Delete).expect("delete");
        let _load = tracker.try_begin(Action::Load).expect("load");
        assert!(tracker.is_active(Action::Delete));
        assert!(tracker.is_active(Action::Load));
    }

    #[test]
    fn publishes_busy_transitions() {
        let (events, mut rx) = broadcast::channel(16);
        let tracker = InFlightTracker::new(events);

        drop(tracker.try_begin(Action::Predict));

        let mut seen = Vec::new();
        while let Ok(ConsoleEvent::InFlightChanged { action, busy }) = rx.try_recv() {
            seen.push((action, busy));
        }
        assert_eq!(
            seen,
            vec![(Action::Predict, true), (Action::Predict, false)]
        );
    }
}
