use crate::descriptor::{SubscriptionDescriptor, SubscriptionId};
use crate::registry::HandlerCollectionMap;
use std::any::TypeId;
use std::rc::{Rc, Weak};
use tracing::trace;

/// Handle to one registration, returned by the `subscribe*` methods of
/// [`EventBus`](crate::EventBus).
///
/// The handle does not own the registration: dropping it leaves the handler
/// subscribed, and it stays valid (but inert) if the bus goes away first.
#[derive(Debug, Clone)]
pub struct Subscription {
    id: SubscriptionId,
    event_type: TypeId,
    event: &'static str,
    descriptor: Weak<SubscriptionDescriptor>,
    registry: Weak<HandlerCollectionMap>,
}

impl Subscription {
    pub(crate) fn new(
        descriptor: &Rc<SubscriptionDescriptor>,
        registry: &Rc<HandlerCollectionMap>,
    ) -> Self {
        Self {
            id: descriptor.id(),
            event_type: descriptor.event_type(),
            event: descriptor.event(),
            descriptor: Rc::downgrade(descriptor),
            registry: Rc::downgrade(registry),
        }
    }

    #[must_use]
    pub const fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Type name of the event this subscription listens for.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        self.event
    }

    /// Whether the handler will still be invoked by future publishes.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.descriptor.upgrade().is_some_and(|descriptor| descriptor.is_active())
    }

    /// Removes the registration from its collection.
    ///
    /// Takes effect immediately: if a publish of this event type is in progress
    /// and has not reached this handler yet, the handler is skipped. Calling it
    /// again, or after the bus was dropped or shut down, does nothing.
    pub fn unsubscribe(&self) {
        let Some(descriptor) = self.descriptor.upgrade() else {
            return;
        };
        if !descriptor.deactivate() {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.event_type, self.id);
        }
        trace!(event = self.event, subscription = %self.id, "Subscription removed");
    }
}
