use crate::error::{EventBusError, HandlerResult};
use crate::event::Event;
use std::any::{Any, TypeId, type_name};
use std::cell::Cell;
use std::fmt;
use tracing::error;

type ErasedHandler = Box<dyn Fn(&mut dyn Any) -> Result<(), EventBusError>>;
type ErasedPredicate = Box<dyn Fn(&dyn Any) -> Result<bool, EventBusError>>;

/// Identifier of a single subscription, unique per bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One registration: the captured event type plus type-erased handler and filter.
///
/// Construction is the only place the static event type is known. The closures
/// downcast from `dyn Any` back to `E` before calling the typed user code, so one
/// homogeneous collection can hold registrations for any event type while each
/// entry is only ever exercised with its own.
pub(crate) struct SubscriptionDescriptor {
    id: SubscriptionId,
    event_type: TypeId,
    event: &'static str,
    handler: ErasedHandler,
    predicate: ErasedPredicate,
    active: Cell<bool>,
}

impl SubscriptionDescriptor {
    pub(crate) fn new<E, H, P>(id: SubscriptionId, handler: H, predicate: P) -> Self
    where
        E: Event,
        H: Fn(&mut E) -> HandlerResult + 'static,
        P: Fn(&E) -> bool + 'static,
    {
        let handler: ErasedHandler = Box::new(move |event: &mut dyn Any| {
            let event = event.downcast_mut::<E>().ok_or_else(|| mismatch::<E>(id))?;
            handler(event).map_err(|source| EventBusError::Handler {
                source,
                context: Some(format!("{} in subscription {id}", type_name::<E>()).into()),
            })
        });

        let predicate: ErasedPredicate = Box::new(move |event: &dyn Any| {
            let event = event.downcast_ref::<E>().ok_or_else(|| mismatch::<E>(id))?;
            Ok(predicate(event))
        });

        Self {
            id,
            event_type: TypeId::of::<E>(),
            event: type_name::<E>(),
            handler,
            predicate,
            active: Cell::new(true),
        }
    }

    pub(crate) const fn id(&self) -> SubscriptionId {
        self.id
    }

    /// `TypeId` of the event this descriptor was built for.
    pub(crate) const fn event_type(&self) -> TypeId {
        self.event_type
    }

    pub(crate) const fn event(&self) -> &'static str {
        self.event
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Marks the descriptor inert. Returns whether it was still active.
    pub(crate) fn deactivate(&self) -> bool {
        self.active.replace(false)
    }

    /// Runs the filter and, if it passes, the handler. Returns whether the handler ran.
    ///
    /// # Errors
    /// [`EventBusError::TypeMismatch`] when `event` is not of the captured type,
    /// [`EventBusError::Handler`] when a fallible handler fails.
    pub(crate) fn dispatch(&self, event: &mut dyn Any) -> Result<bool, EventBusError> {
        if !self.is_active() {
            return Ok(false);
        }

        if runtime_type(event) != self.event_type {
            error!(
                expected = self.event,
                subscription = %self.id,
                "Dispatched event does not match the subscription type"
            );
            return Err(mismatch_named(self.event, self.id));
        }

        if !(self.predicate)(event)? {
            return Ok(false);
        }

        (self.handler)(event)?;
        Ok(true)
    }
}

impl fmt::Debug for SubscriptionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionDescriptor")
            .field("id", &self.id)
            .field("event", &self.event)
            .field("active", &self.active.get())
            .finish_non_exhaustive()
    }
}

/// Runtime type of an erased event. Takes `&dyn Any` so the call never resolves
/// to the `TypeId` of a reference type.
pub(crate) fn runtime_type(event: &dyn Any) -> TypeId {
    event.type_id()
}

fn mismatch<E: Event>(id: SubscriptionId) -> EventBusError {
    mismatch_named(type_name::<E>(), id)
}

fn mismatch_named(expected: &'static str, id: SubscriptionId) -> EventBusError {
    EventBusError::TypeMismatch {
        message: format!("expected {expected}").into(),
        context: Some(format!("subscription {id}").into()),
    }
}
