use std::cell::RefCell;
use std::rc::Rc;

use crate::object::ObjectId;

use super::Event;

/// Receives events posted on an `EventChannel`.
///
/// `source` is the object that posted the event, if any.
pub trait Observer {
    fn on_notify(&mut self, source: Option<ObjectId>, event: &Event);
}

impl<F> Observer for F
where
    F: FnMut(Option<ObjectId>, &Event),
{
    fn on_notify(&mut self, source: Option<ObjectId>, event: &Event) {
        self(source, event)
    }
}

/// Registration token returned by `subscribe`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ListenerId(u64);

pub type SharedObserver = Rc<RefCell<dyn Observer>>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(ListenerId, SharedObserver)>,
}

/// Cheaply cloneable handle to a shared listener registry.
///
/// Delivery is synchronous, in registration order. The listener list is
/// snapshotted when `notify` starts: observers subscribed during dispatch do
/// not see the event being dispatched, and observers removed during dispatch
/// are skipped if they have not been reached yet.
#[derive(Clone, Default)]
pub struct EventChannel {
    registry: Rc<RefCell<Registry>>,
}

impl EventChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, observer: impl Observer + 'static) -> ListenerId {
        self.subscribe_shared(Rc::new(RefCell::new(observer)))
    }

    /// Subscribes an observer the caller keeps a handle to.
    pub fn subscribe_shared(&self, observer: SharedObserver) -> ListenerId {
        let mut registry = self.registry.borrow_mut();
        let id = ListenerId(registry.next_id);
        registry.next_id += 1;
        registry.listeners.push((id, observer));
        id
    }

    /// Returns `false` if the listener was not registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut registry = self.registry.borrow_mut();
        let before = registry.listeners.len();
        registry.listeners.retain(|(lid, _)| *lid != id);
        registry.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.registry.borrow().listeners.len()
    }

    /// Delivers `event` to every listener before returning.
    pub fn notify(&self, source: Option<ObjectId>, event: &Event) {
        let snapshot: Vec<(ListenerId, SharedObserver)> = self
            .registry
            .borrow()
            .listeners
            .iter()
            .map(|(id, obs)| (*id, Rc::clone(obs)))
            .collect();

        for (id, observer) in snapshot {
            if !self.is_registered(id) {
                continue;
            }
            // A listener posting from inside its own callback cannot be re-entered.
            match observer.try_borrow_mut() {
                Ok(mut obs) => obs.on_notify(source, event),
                Err(_) => log::debug!("skipping re-entrant delivery of {:?}", event.kind()),
            }
        }
    }

    fn is_registered(&self, id: ListenerId) -> bool {
        self.registry.borrow().listeners.iter().any(|(lid, _)| *lid == id)
    }
}
