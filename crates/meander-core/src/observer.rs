//! Observer notification protocol.
//!
//! The engine fans out [`GameEvent`]s to any number of registered listeners,
//! decoupling it from renderers. Dispatch iterates a snapshot of the registry,
//! so handlers that subscribe or unsubscribe re-entrantly never corrupt an
//! in-flight dispatch; such mutations are queued and drained once the
//! outermost dispatch completes. Handlers must not drive the engine from
//! inside `on_event`.

use crate::actions::GameEvent;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// A listener for engine notifications.
pub trait GameObserver {
    fn on_event(&self, event: &GameEvent);
}

/// Closures observe too.
impl<F: Fn(&GameEvent)> GameObserver for F {
    fn on_event(&self, event: &GameEvent) {
        self(event)
    }
}

/// Handle returned by [`ObserverRegistry::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

enum PendingOp {
    Subscribe(ObserverId, Rc<dyn GameObserver>),
    Unsubscribe(ObserverId),
}

/// Registry of observers with snapshot dispatch.
#[derive(Default)]
pub struct ObserverRegistry {
    next_id: Cell<u64>,
    observers: RefCell<Vec<(ObserverId, Rc<dyn GameObserver>)>>,
    dispatch_depth: Cell<u32>,
    pending: RefCell<Vec<PendingOp>>,
}

impl ObserverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer. If called while a dispatch is in flight, the
    /// observer starts receiving events after that dispatch completes.
    pub fn subscribe(&self, observer: Rc<dyn GameObserver>) -> ObserverId {
        let id = ObserverId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        if self.dispatch_depth.get() > 0 {
            self.pending
                .borrow_mut()
                .push(PendingOp::Subscribe(id, observer));
        } else {
            self.observers.borrow_mut().push((id, observer));
        }
        id
    }

    /// Remove an observer. Returns false for an unknown id. If called while
    /// a dispatch is in flight, the observer still sees the current event and
    /// is removed afterwards.
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let known = self.observers.borrow().iter().any(|(oid, _)| *oid == id)
            || self
                .pending
                .borrow()
                .iter()
                .any(|op| matches!(op, PendingOp::Subscribe(oid, _) if *oid == id));
        if !known {
            return false;
        }

        if self.dispatch_depth.get() > 0 {
            self.pending.borrow_mut().push(PendingOp::Unsubscribe(id));
        } else {
            self.observers.borrow_mut().retain(|(oid, _)| *oid != id);
        }
        true
    }

    /// Number of registered observers (queued changes excluded).
    pub fn len(&self) -> usize {
        self.observers.borrow().len()
    }

    /// Whether no observers are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver one event to a snapshot of the current observers.
    pub fn dispatch(&self, event: &GameEvent) {
        let snapshot: Vec<Rc<dyn GameObserver>> = self
            .observers
            .borrow()
            .iter()
            .map(|(_, obs)| Rc::clone(obs))
            .collect();

        self.dispatch_depth.set(self.dispatch_depth.get() + 1);
        for observer in snapshot {
            observer.on_event(event);
        }
        self.dispatch_depth.set(self.dispatch_depth.get() - 1);

        if self.dispatch_depth.get() == 0 {
            self.drain_pending();
        }
    }

    /// Deliver a batch of events in order.
    pub fn dispatch_all(&self, events: &[GameEvent]) {
        for event in events {
            self.dispatch(event);
        }
    }

    fn drain_pending(&self) {
        let pending: Vec<PendingOp> = self.pending.borrow_mut().drain(..).collect();
        for op in pending {
            match op {
                PendingOp::Subscribe(id, observer) => {
                    self.observers.borrow_mut().push((id, observer));
                }
                PendingOp::Unsubscribe(id) => {
                    self.observers.borrow_mut().retain(|(oid, _)| *oid != id);
                }
            }
        }
    }
}

impl fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.len())
            .finish()
    }
}
