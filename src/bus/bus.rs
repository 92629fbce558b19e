use super::channel::Channel;
use crate::domain::SelectionKey;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Handler = Rc<RefCell<dyn FnMut(&SelectionKey)>>;

struct Entry {
    id: u64,
    channel: Channel,
    handler: Handler,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: Vec<Entry>,
}

impl Registry {
    fn contains(&self, id: u64) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    fn remove(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        before != self.entries.len()
    }
}

/// Synchronous publish/subscribe hub shared by the widgets of one page.
///
/// Cloning the bus yields another handle to the same registry. Delivery is
/// in subscription order, at most once per publish per handler, and only to
/// handlers subscribed when the publish started. Nothing is buffered.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Rc<RefCell<Registry>>,
}

impl EventBus {
    /// Creates an empty bus. Clones share the same registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` on `channel`.
    ///
    /// The handler stays registered until the returned [`Subscription`] is
    /// dropped or explicitly unsubscribed.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, channel: Channel, handler: F) -> Subscription
    where
        F: FnMut(&SelectionKey) + 'static,
    {
        let mut registry = self.registry.borrow_mut();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.entries.push(Entry {
            id,
            channel,
            handler: Rc::new(RefCell::new(handler)),
        });
        tracing::debug!(channel = %channel, subscription = id, "subscribed");

        Subscription {
            id,
            channel,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Delivers `key` to every current subscriber of `channel`.
    ///
    /// Returns the number of handlers invoked. Handlers may publish, subscribe
    /// or unsubscribe while running; a handler removed mid-publish is skipped,
    /// and one added mid-publish only sees later publishes. A handler that
    /// publishes back onto its own channel is not re-entered.
    pub fn publish(&self, channel: Channel, key: &SelectionKey) -> usize {
        let snapshot: Vec<(u64, Handler)> = self
            .registry
            .borrow()
            .entries
            .iter()
            .filter(|entry| entry.channel == channel)
            .map(|entry| (entry.id, Rc::clone(&entry.handler)))
            .collect();

        let _span = tracing::debug_span!("publish", channel = %channel, key = %key).entered();

        let mut delivered = 0;
        for (id, handler) in snapshot {
            if !self.registry.borrow().contains(id) {
                continue;
            }
            let Ok(mut handler) = handler.try_borrow_mut() else {
                tracing::debug!(subscription = id, "handler already running, skipping nested delivery");
                continue;
            };
            (&mut *handler)(key);
            delivered += 1;
        }

        tracing::debug!(delivered, "published");
        delivered
    }

    /// Number of live subscriptions on `channel`.
    #[must_use]
    pub fn subscriber_count(&self, channel: Channel) -> usize {
        self.registry
            .borrow()
            .entries
            .iter()
            .filter(|entry| entry.channel == channel)
            .count()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.borrow();
        f.debug_struct("EventBus")
            .field("subscriptions", &registry.entries.len())
            .finish()
    }
}

/// Handle to a registered handler. Unsubscribes on drop.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    channel: Channel,
    registry: Weak<RefCell<Registry>>,
}

impl Subscription {
    /// Channel this subscription listens on.
    #[must_use]
    pub const fn channel(&self) -> Channel {
        self.channel
    }

    /// Whether the handler is still registered.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.borrow().contains(self.id))
    }

    /// Removes the handler now instead of at drop.
    ///
    /// Safe to call from inside the handler itself during a publish.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        // A handler dropping its own subscription runs while the registry is
        // free, since publish never holds the borrow across a handler call.
        if let Ok(mut registry) = registry.try_borrow_mut() {
            if registry.remove(self.id) {
                tracing::debug!(channel = %self.channel, subscription = self.id, "unsubscribed");
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&'static str) -> Box<dyn FnMut(&SelectionKey)>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let make = move |name: &'static str| {
            let sink = Rc::clone(&sink);
            Box::new(move |key: &SelectionKey| sink.borrow_mut().push(format!("{name}:{key}"))) as Box<dyn FnMut(&SelectionKey)>
        };
        (log, make)
    }

    #[test]
    fn delivers_in_subscription_order_to_matching_channel_only() {
        let bus = EventBus::new();
        let (log, make) = recorder();
        let _a = bus.subscribe(Channel::ShowPublisherDetails, make("a"));
        let _b = bus.subscribe(Channel::ShowPublisherDetails, make("b"));
        let _c = bus.subscribe(Channel::ShowGeoDetails, make("c"));

        let delivered = bus.publish(Channel::ShowPublisherDetails, &"P-1".into());

        assert_eq!(delivered, 2);
        assert_eq!(*log.borrow(), vec!["a:P-1", "b:P-1"]);
    }

    #[test]
    fn late_subscriber_does_not_see_earlier_publish() {
        let bus = EventBus::new();
        let (log, make) = recorder();
        assert_eq!(bus.publish(Channel::ShowRuleDetails, &"R-1".into()), 0);
        let _late = bus.subscribe(Channel::ShowRuleDetails, make("late"));
        bus.publish(Channel::ShowRuleDetails, &"R-2".into());

        assert_eq!(*log.borrow(), vec!["late:R-2"]);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let bus = EventBus::new();
        let (log, make) = recorder();
        let sub = bus.subscribe(Channel::ShowReportDetails, make("r"));
        assert!(sub.is_active());
        assert_eq!(bus.subscriber_count(Channel::ShowReportDetails), 1);

        sub.unsubscribe();
        bus.publish(Channel::ShowReportDetails, &"X".into());

        assert!(log.borrow().is_empty());
        assert_eq!(bus.subscriber_count(Channel::ShowReportDetails), 0);
    }

    #[test]
    fn handler_may_unsubscribe_a_later_handler_mid_publish() {
        let bus = EventBus::new();
        let hits = Rc::new(Cell::new(0));
        let victim: Rc<RefCell<Option<Subscription>>> = Rc::default();

        let slot = Rc::clone(&victim);
        let _first = bus.subscribe(Channel::ShowGeoDetails, move |_| {
            slot.borrow_mut().take();
        });
        let counter = Rc::clone(&hits);
        *victim.borrow_mut() = Some(bus.subscribe(Channel::ShowGeoDetails, move |_| {
            counter.set(counter.get() + 1);
        }));

        assert_eq!(bus.publish(Channel::ShowGeoDetails, &"G".into()), 1);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn nested_publish_reaches_other_channels_without_reentering() {
        let bus = EventBus::new();
        let (log, make) = recorder();
        let _detail = bus.subscribe(Channel::ShowSubCategoryDetails, make("detail"));

        let inner = bus.clone();
        let sink = Rc::clone(&log);
        let _forward = bus.subscribe(Channel::ShowPublisherDetails, move |key| {
            sink.borrow_mut().push(format!("forward:{key}"));
            inner.publish(Channel::ShowSubCategoryDetails, key);
            inner.publish(Channel::ShowPublisherDetails, key);
        });

        bus.publish(Channel::ShowPublisherDetails, &"P-9".into());
        assert_eq!(*log.borrow(), vec!["forward:P-9", "detail:P-9"]);
    }

    #[test]
    fn subscription_outliving_bus_is_harmless() {
        let bus = EventBus::new();
        let sub = bus.subscribe(Channel::ShowMailingListDetails, |_| {});
        drop(bus);
        assert!(!sub.is_active());
        drop(sub);
    }
}
