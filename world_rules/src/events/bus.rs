//! Synchronous, single-threaded event bus.
//!
//! `publish` runs every observer subscribed at the moment of the call, in
//! subscription order, before it returns. The observer list is snapshotted
//! first, so handlers may subscribe or unsubscribe freely: the change only
//! shows up on the next publish.
//!
//! The bus holds observers weakly. Whoever subscribes an observer owns it;
//! once the last `Rc` is dropped the entry is pruned on the next publish.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use super::Message;
use crate::error::ObserverError;

/// A subsystem that reacts to bus messages.
///
/// Handlers take `&self`; observers keep their mutable state behind
/// `Cell`/`RefCell` so they can be re-entered by nested publishes.
pub trait GlobalObserver {
    /// Name used in logs and failure reports.
    fn observer_name(&self) -> &str;

    /// Handle one message. An `Err` stops only this observer's processing.
    fn on_message(&self, message: &Message) -> Result<(), ObserverError>;
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Outcome of one `publish` call.
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Observers whose handler returned `Ok`.
    pub delivered: usize,
    /// Isolated handler failures, in dispatch order.
    pub failures: Vec<ObserverError>,
}

impl DispatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// The publish/subscribe bus.
#[derive(Default)]
pub struct EventBus {
    observers: RefCell<Vec<(SubscriptionId, Weak<dyn GlobalObserver>)>>,
    next_id: Cell<u64>,
}

impl EventBus {
    /// Create a new bus with no observers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe an observer. The caller keeps ownership of the `Rc`.
    pub fn subscribe<T>(&self, observer: &Rc<T>) -> SubscriptionId
    where
        T: GlobalObserver + 'static,
    {
        let observer: Rc<dyn GlobalObserver> = observer.clone();
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        debug!(observer = observer.observer_name(), "bus subscribe");
        self.observers
            .borrow_mut()
            .push((id, Rc::downgrade(&observer)));
        id
    }

    /// Remove a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    /// Number of live subscriptions.
    pub fn observer_count(&self) -> usize {
        self.observers
            .borrow()
            .iter()
            .filter(|(_, weak)| weak.strong_count() > 0)
            .count()
    }

    /// Deliver `message` to every observer subscribed right now.
    pub fn publish(&self, message: impl Into<Message>) -> DispatchReport {
        let message = message.into();

        // Snapshot, then release the borrow before running any handler.
        let snapshot: Vec<Rc<dyn GlobalObserver>> = {
            let mut observers = self.observers.borrow_mut();
            observers.retain(|(_, weak)| weak.strong_count() > 0);
            observers
                .iter()
                .filter_map(|(_, weak)| weak.upgrade())
                .collect()
        };

        debug!(message = %message, observers = snapshot.len(), "bus publish");

        let mut report = DispatchReport::default();
        for observer in snapshot {
            match observer.on_message(&message) {
                Ok(()) => report.delivered += 1,
                Err(err) => {
                    warn!(error = %err, "observer failed, continuing dispatch");
                    report.failures.push(err);
                }
            }
        }
        report
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("observers", &self.observer_count())
            .finish()
    }
}

/// Observer that records every message it sees.
///
/// Handy for presentation code that polls what happened during a tick.
#[derive(Debug, Default)]
pub struct MessageLog {
    seen: RefCell<Vec<Message>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages seen so far, oldest first.
    pub fn messages(&self) -> Vec<Message> {
        self.seen.borrow().clone()
    }

    /// How many times a tag was seen.
    pub fn count(&self, id: &str) -> usize {
        self.seen.borrow().iter().filter(|m| m.is(id)).count()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.count(id) > 0
    }

    /// Take the recorded messages, leaving the log empty.
    pub fn drain(&self) -> Vec<Message> {
        std::mem::take(&mut *self.seen.borrow_mut())
    }
}

impl GlobalObserver for MessageLog {
    fn observer_name(&self) -> &str {
        "message log"
    }

    fn on_message(&self, message: &Message) -> Result<(), ObserverError> {
        self.seen.borrow_mut().push(message.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records its own name into a shared journal.
    struct Named {
        name: &'static str,
        journal: Rc<RefCell<Vec<&'static str>>>,
    }

    impl GlobalObserver for Named {
        fn observer_name(&self) -> &str {
            self.name
        }

        fn on_message(&self, _message: &Message) -> Result<(), ObserverError> {
            self.journal.borrow_mut().push(self.name);
            Ok(())
        }
    }

    struct Failing;

    impl GlobalObserver for Failing {
        fn observer_name(&self) -> &str {
            "failing"
        }

        fn on_message(&self, message: &Message) -> Result<(), ObserverError> {
            Err(ObserverError::new("failing", &message.id, "always fails"))
        }
    }

    /// Subscribes a late observer while handling a message.
    struct Recruiter {
        bus: Rc<EventBus>,
        recruit: Rc<MessageLog>,
        recruited: Cell<bool>,
    }

    impl GlobalObserver for Recruiter {
        fn observer_name(&self) -> &str {
            "recruiter"
        }

        fn on_message(&self, _message: &Message) -> Result<(), ObserverError> {
            if !self.recruited.replace(true) {
                self.bus.subscribe(&self.recruit);
            }
            Ok(())
        }
    }

    /// Unsubscribes a sibling while handling a message.
    struct Remover {
        bus: Rc<EventBus>,
        target: Cell<Option<SubscriptionId>>,
    }

    impl GlobalObserver for Remover {
        fn observer_name(&self) -> &str {
            "remover"
        }

        fn on_message(&self, _message: &Message) -> Result<(), ObserverError> {
            if let Some(id) = self.target.take() {
                self.bus.unsubscribe(id);
            }
            Ok(())
        }
    }

    fn named(name: &'static str, journal: &Rc<RefCell<Vec<&'static str>>>) -> Rc<Named> {
        Rc::new(Named {
            name,
            journal: journal.clone(),
        })
    }

    #[test]
    fn test_publish_in_subscription_order() {
        let bus = EventBus::new();
        let journal = Rc::new(RefCell::new(Vec::new()));
        let a = named("a", &journal);
        let b = named("b", &journal);
        let c = named("c", &journal);
        bus.subscribe(&a);
        bus.subscribe(&b);
        bus.subscribe(&c);

        let report = bus.publish("ping");

        assert_eq!(*journal.borrow(), vec!["a", "b", "c"]);
        assert_eq!(report.delivered, 3);
        assert!(report.is_clean());
    }

    #[test]
    fn test_failing_observer_is_isolated() {
        let bus = EventBus::new();
        let journal = Rc::new(RefCell::new(Vec::new()));
        let before = named("before", &journal);
        let failing = Rc::new(Failing);
        let after = named("after", &journal);
        bus.subscribe(&before);
        bus.subscribe(&failing);
        bus.subscribe(&after);

        let report = bus.publish("ping");

        assert_eq!(*journal.borrow(), vec!["before", "after"]);
        assert_eq!(report.delivered, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].observer, "failing");

        // The bus is still usable afterwards.
        let report = bus.publish("ping again");
        assert_eq!(report.delivered, 2);
        assert_eq!(journal.borrow().len(), 4);
    }

    #[test]
    fn test_subscribe_during_dispatch_waits_for_next_publish() {
        let bus = Rc::new(EventBus::new());
        let recruit = Rc::new(MessageLog::new());
        let recruiter = Rc::new(Recruiter {
            bus: bus.clone(),
            recruit: recruit.clone(),
            recruited: Cell::new(false),
        });
        bus.subscribe(&recruiter);

        bus.publish("first");
        assert!(recruit.messages().is_empty());

        bus.publish("second");
        assert_eq!(recruit.messages(), vec![Message::new("second")]);
    }

    #[test]
    fn test_unsubscribe_during_dispatch_keeps_current_snapshot() {
        let bus = Rc::new(EventBus::new());
        let remover = Rc::new(Remover {
            bus: bus.clone(),
            target: Cell::new(None),
        });
        let victim = Rc::new(MessageLog::new());
        bus.subscribe(&remover);
        let victim_id = bus.subscribe(&victim);
        remover.target.set(Some(victim_id));

        bus.publish("first");
        assert_eq!(victim.count("first"), 1);

        bus.publish("second");
        assert_eq!(victim.count("second"), 0);
        assert_eq!(bus.observer_count(), 1);
    }

    #[test]
    fn test_unsubscribe() {
        let bus = EventBus::new();
        let log = Rc::new(MessageLog::new());
        let id = bus.subscribe(&log);

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));

        bus.publish("ignored");
        assert!(log.messages().is_empty());
    }

    #[test]
    fn test_dropped_observer_is_pruned() {
        let bus = EventBus::new();
        let log = Rc::new(MessageLog::new());
        bus.subscribe(&log);
        assert_eq!(bus.observer_count(), 1);

        drop(log);

        let report = bus.publish("anyone?");
        assert_eq!(report.delivered, 0);
        assert_eq!(bus.observer_count(), 0);
    }

    #[test]
    fn test_message_log_drain() {
        let bus = EventBus::new();
        let log = Rc::new(MessageLog::new());
        bus.subscribe(&log);

        bus.publish(Message::teleport_to("Vessel"));
        bus.publish("supernova");

        assert!(log.contains("teleport to"));
        assert_eq!(log.drain().len(), 2);
        assert!(log.messages().is_empty());
    }
}
