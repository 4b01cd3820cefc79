use std::sync::Arc;

use metrics::counter;
use parking_lot::Mutex;

use crate::models::Notification;

type Subscriber = Arc<dyn Fn(&Notification) + Send + Sync>;

/// Ordered synchronous fan-out of notifications.
///
/// `publish` calls every subscriber registered at publish time, in
/// subscription order, on the publishing thread. The subscriber list is
/// snapshotted before iterating, so a subscriber added during a publish
/// does not receive the in-flight notification, and callbacks may
/// subscribe or unsubscribe without deadlocking.
#[derive(Default)]
pub struct NotificationBus {
    inner: Mutex<BusState>,
}

#[derive(Default)]
struct BusState {
    next_id: u64,
    subscribers: Vec<(u64, Subscriber)>,
}

/// Handle returned by `subscribe`. Dropping it does nothing; call
/// `unsubscribe` to stop delivery.
pub struct Subscription {
    id: u64,
    bus: Arc<NotificationBus>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        let mut state = self.bus.inner.lock();
        state.subscribers.retain(|(id, _)| *id != self.id);
    }
}

impl NotificationBus {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn subscribe<F>(self: &Arc<Self>, callback: F) -> Subscription
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        let mut state = self.inner.lock();
        let id = state.next_id;
        state.next_id += 1;
        state.subscribers.push((id, Arc::new(callback)));
        Subscription {
            id,
            bus: Arc::clone(self),
        }
    }

    pub fn publish(&self, notification: Notification) {
        let snapshot: Vec<Subscriber> = {
            let state = self.inner.lock();
            state.subscribers.iter().map(|(_, s)| Arc::clone(s)).collect()
        };

        tracing::debug!(
            kind = %notification.kind,
            priority = ?notification.priority,
            message = %notification.message,
            "Publishing notification"
        );
        counter!("notifications_published").increment(1);

        for subscriber in snapshot {
            subscriber(&notification);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().subscribers.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NotificationKind, Priority};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn make_notification(message: &str) -> Notification {
        Notification::new(NotificationKind::Alert, message, Priority::Medium)
    }

    #[test]
    fn test_delivery_in_subscription_order() {
        let bus = NotificationBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let log = Arc::clone(&log);
            bus.subscribe(move |_| log.lock().push(tag));
        }

        bus.publish(make_notification("hello"));
        assert_eq!(*log.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let bus = NotificationBus::new();
        let count = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&count);
        let sub = bus.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        bus.publish(make_notification("one"));
        sub.unsubscribe();
        bus.publish(make_notification("two"));

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_subscriber_added_during_publish_misses_inflight() {
        let bus = NotificationBus::new();
        let late_count = Arc::new(AtomicUsize::new(0));

        let bus_for_callback = Arc::clone(&bus);
        let late_for_callback = Arc::clone(&late_count);
        bus.subscribe(move |_| {
            // Registers a new subscriber while the publish is in flight.
            let late = Arc::clone(&late_for_callback);
            let _sub = bus_for_callback.subscribe(move |_| {
                late.fetch_add(1, Ordering::SeqCst);
            });
        });

        bus.publish(make_notification("in-flight"));
        assert_eq!(late_count.load(Ordering::SeqCst), 0, "late subscriber saw the in-flight event");

        bus.publish(make_notification("next"));
        assert_eq!(late_count.load(Ordering::SeqCst), 1);
    }
}
