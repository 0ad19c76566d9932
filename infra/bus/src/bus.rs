use crate::descriptor::SubscriptionDescriptor;
use crate::error::{EventBusError, HandlerResult};
use crate::event::{Event, EventHandler, SourcedEvent};
use crate::registry::HandlerCollectionMap;
use crate::subscription::Subscription;
use std::any::{TypeId, type_name};
use std::rc::Rc;
use tracing::{trace, warn};

/// A synchronous, single-threaded event bus.
///
/// Manages handler collections indexed by the [`TypeId`] of the event.
/// Cloning a bus yields another handle to the same registry, which is how a
/// bus is handed to the components that publish or subscribe.
///
/// The bus is neither `Send` nor `Sync`; it never locks.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    registry: Rc<HandlerCollectionMap>,
}

impl EventBus {
    /// Creates a new, empty `EventBus`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `handler` to every published event of type `E`.
    ///
    /// # Examples
    /// ```rust
    /// use herald_bus::{Event, EventBus};
    /// use std::cell::Cell;
    /// use std::rc::Rc;
    ///
    /// #[derive(Debug, Event)]
    /// struct UserCreated { id: u64, canceled: bool }
    ///
    /// # fn main() -> Result<(), herald_bus::EventBusError> {
    /// let bus = EventBus::new();
    /// let seen = Rc::new(Cell::new(0));
    ///
    /// let sink = Rc::clone(&seen);
    /// bus.subscribe(move |e: &mut UserCreated| sink.set(e.id));
    ///
    /// bus.publish(&mut UserCreated { id: 42, canceled: false })?;
    /// assert_eq!(seen.get(), 42);
    /// # Ok(())
    /// # }
    /// ```
    pub fn subscribe<E, H>(&self, handler: H) -> Subscription
    where
        E: Event,
        H: Fn(&mut E) + 'static,
    {
        self.register(infallible(handler), |_: &E| true)
    }

    /// Subscribes `handler` to events of type `E` for which `predicate` holds.
    ///
    /// The predicate runs right before the handler, so it observes whatever
    /// earlier handlers did to the event, including canceling it.
    ///
    /// # Examples
    /// ```rust
    /// use herald_bus::{Event, EventBus};
    /// use std::cell::Cell;
    /// use std::rc::Rc;
    ///
    /// #[derive(Debug, Event)]
    /// struct Withdraw { amount: u32, canceled: bool }
    ///
    /// # fn main() -> Result<(), herald_bus::EventBusError> {
    /// let bus = EventBus::new();
    /// bus.subscribe(|e: &mut Withdraw| if e.amount > 100 { e.cancel() });
    ///
    /// let paid = Rc::new(Cell::new(0));
    /// let ledger = Rc::clone(&paid);
    /// bus.subscribe_filtered(
    ///     move |e: &mut Withdraw| ledger.set(ledger.get() + e.amount),
    ///     |e: &Withdraw| !e.is_canceled(),
    /// );
    ///
    /// let mut large = Withdraw { amount: 500, canceled: false };
    /// bus.publish(&mut large)?;
    /// assert!(large.is_canceled());
    ///
    /// bus.publish(&mut Withdraw { amount: 20, canceled: false })?;
    /// assert_eq!(paid.get(), 20);
    /// # Ok(())
    /// # }
    /// ```
    pub fn subscribe_filtered<E, H, P>(&self, handler: H, predicate: P) -> Subscription
    where
        E: Event,
        H: Fn(&mut E) + 'static,
        P: Fn(&E) -> bool + 'static,
    {
        self.register(infallible(handler), predicate)
    }

    /// Subscribes a fallible handler.
    ///
    /// If it returns an error, the publish that invoked it stops immediately:
    /// handlers registered after it do not run for that event, and `publish`
    /// returns [`EventBusError::Handler`].
    ///
    /// # Examples
    /// ```rust
    /// use herald_bus::{Event, EventBus, EventBusError};
    ///
    /// #[derive(Debug, Event)]
    /// struct Save { canceled: bool }
    ///
    /// let bus = EventBus::new();
    /// bus.try_subscribe(|_: &mut Save| Err("disk full".into()));
    ///
    /// let result = bus.publish(&mut Save { canceled: false });
    /// assert!(matches!(result, Err(EventBusError::Handler { .. })));
    /// ```
    pub fn try_subscribe<E, H>(&self, handler: H) -> Subscription
    where
        E: Event,
        H: Fn(&mut E) -> HandlerResult + 'static,
    {
        self.register(handler, |_: &E| true)
    }

    /// Fallible counterpart of [`EventBus::subscribe_filtered`].
    pub fn try_subscribe_filtered<E, H, P>(&self, handler: H, predicate: P) -> Subscription
    where
        E: Event,
        H: Fn(&mut E) -> HandlerResult + 'static,
        P: Fn(&E) -> bool + 'static,
    {
        self.register(handler, predicate)
    }

    /// Subscribes a listener object.
    ///
    /// A type implementing [`EventHandler`] for several events is registered
    /// once per event type, sharing the same `Rc`.
    pub fn subscribe_handler<E, L>(&self, listener: Rc<L>) -> Subscription
    where
        E: Event,
        L: EventHandler<E> + ?Sized + 'static,
    {
        self.subscribe(move |event: &mut E| listener.on(event))
    }

    /// Subscribes `handler` to events of type `E` whose source equals `source`.
    ///
    /// This is [`EventBus::subscribe_filtered`] with the predicate
    /// `event.source() == &source`.
    pub fn subscribe_from<E, H>(&self, source: E::Source, handler: H) -> Subscription
    where
        E: SourcedEvent,
        H: Fn(&mut E) + 'static,
    {
        self.subscribe_filtered(handler, move |event: &E| *event.source() == source)
    }

    /// Publishes `event` to every subscriber of `E`, in registration order.
    ///
    /// Returns once every matching handler has run, with the number of handlers
    /// that ran. Publishing an event type nobody subscribed to returns `Ok(0)`.
    /// Check [`Event::is_canceled`] afterwards to learn whether a handler
    /// vetoed the event; rolling back is up to the caller.
    ///
    /// # Errors
    /// Returns [`EventBusError::Handler`] from the first failing handler; the
    /// handlers after it are not invoked for this event.
    /// Returns [`EventBusError::TypeMismatch`] if the registry is corrupted.
    pub fn publish<E: Event>(&self, event: &mut E) -> Result<usize, EventBusError> {
        match self.registry.dispatch(event) {
            Ok(handlers) => {
                trace!(
                    event = type_name::<E>(),
                    handlers,
                    canceled = event.is_canceled(),
                    "Event dispatched"
                );
                Ok(handlers)
            },
            Err(err) => {
                warn!(event = type_name::<E>(), error = %err, "Event dispatch aborted");
                Err(err)
            },
        }
    }

    /// Number of active subscriptions for events of type `E`.
    #[must_use]
    pub fn subscriber_count<E: Event>(&self) -> usize {
        self.registry.subscriber_count(TypeId::of::<E>())
    }

    /// Number of event types that have a handler collection.
    #[must_use]
    pub fn event_types(&self) -> usize {
        self.registry.len()
    }

    /// Drops every handler collection.
    ///
    /// All outstanding [`Subscription`]s become inert. Returns the number of
    /// event types that were closed.
    pub fn shutdown(&self) -> usize {
        let closed = self.registry.clear();
        trace!(closed, "Event bus shut down");
        closed
    }

    fn register<E, H, P>(&self, handler: H, predicate: P) -> Subscription
    where
        E: Event,
        H: Fn(&mut E) -> HandlerResult + 'static,
        P: Fn(&E) -> bool + 'static,
    {
        let id = self.registry.next_id();
        let descriptor = self.registry.add(SubscriptionDescriptor::new(id, handler, predicate));
        trace!(event = type_name::<E>(), subscription = %id, "Subscription registered");
        Subscription::new(&descriptor, &self.registry)
    }
}

fn infallible<E, H>(handler: H) -> impl Fn(&mut E) -> HandlerResult + 'static
where
    E: Event,
    H: Fn(&mut E) + 'static,
{
    move |event: &mut E| {
        handler(event);
        Ok(())
    }
}
