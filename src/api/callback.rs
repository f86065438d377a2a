//! Observer callbacks for scan session progress
//!
//! The session queues events while its state changes; the driver takes them
//! as a `Notifications` batch and delivers it after releasing the session
//! lock. Observers run in registration order and may query the controller.

use crate::api::types::{ScanOutcome, SessionState};
use crate::core::Detection;
use std::sync::Arc;

/// Callback function type for session events
pub type SessionObserver = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

/// Events emitted by a scan session
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The state machine moved between states
    StateChanged { from: SessionState, to: SessionState },
    /// A new detection was admitted; `count` is the set size after admission
    DetectionAdmitted { detection: Detection, count: usize },
    /// The session completed
    Completed(ScanOutcome),
}

/// Callback registration handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallbackHandle(u32);

impl CallbackHandle {
    pub fn id(&self) -> u32 {
        self.0
    }
}

/// Ordered set of registered observers
#[derive(Default)]
pub struct ObserverRegistry {
    counter: u32,
    observers: Vec<(CallbackHandle, SessionObserver)>,
}

impl ObserverRegistry {
    pub fn register<F>(&mut self, observer: F) -> CallbackHandle
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        self.counter += 1;
        let handle = CallbackHandle(self.counter);
        self.observers.push((handle, Arc::new(observer)));
        handle
    }

    /// Remove an observer; returns false for unknown handles
    pub fn unregister(&mut self, handle: CallbackHandle) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(h, _)| *h != handle);
        self.observers.len() != before
    }

    /// Pair queued events with the observers registered right now
    pub fn batch(&self, events: Vec<SessionEvent>) -> Notifications {
        Notifications {
            observers: self.observers.iter().map(|(_, o)| o.clone()).collect(),
            events,
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl std::fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Events detached from the session, ready for delivery
#[must_use = "notifications do nothing until delivered"]
pub struct Notifications {
    observers: Vec<SessionObserver>,
    events: Vec<SessionEvent>,
}

impl Notifications {
    pub fn events(&self) -> &[SessionEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Run every observer over every event, in order
    pub fn deliver(self) {
        for event in &self.events {
            for observer in &self.observers {
                observer(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_register_deliver_unregister() {
        let mut registry = ObserverRegistry::default();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        let handle = registry.register(move |_: &SessionEvent| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(handle.id(), 1);

        let event = SessionEvent::StateChanged {
            from: SessionState::Idle,
            to: SessionState::Scanning,
        };
        registry.batch(vec![event.clone()]).deliver();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert!(registry.unregister(handle));
        assert!(!registry.unregister(handle));
        registry.batch(vec![event.clone()]).deliver();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_batch_snapshots_observers() {
        let mut registry = ObserverRegistry::default();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        let handle = registry.register(move |_: &SessionEvent| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let events = vec![
            SessionEvent::StateChanged { from: SessionState::Idle, to: SessionState::Scanning },
            SessionEvent::StateChanged { from: SessionState::Scanning, to: SessionState::Computing },
        ];
        let batch = registry.batch(events);
        registry.unregister(handle);

        // Observers registered when the batch was taken still receive it
        assert_eq!(batch.events().len(), 2);
        batch.deliver();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(registry.batch(Vec::new()).is_empty());
    }

    #[test]
    fn test_handles_are_unique() {
        let mut registry = ObserverRegistry::default();
        let a = registry.register(|_: &SessionEvent| {});
        let b = registry.register(|_: &SessionEvent| {});
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }
}
