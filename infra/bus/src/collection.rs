use crate::descriptor::{SubscriptionDescriptor, SubscriptionId};
use crate::error::EventBusError;
use std::any::Any;
use std::rc::Rc;

/// Ordered registrations for exactly one event type.
///
/// Insertion order is dispatch order. Descriptors are shared (`Rc`) only with
/// dispatch passes that are currently running.
#[derive(Debug)]
pub(crate) struct HandlerCollection {
    event: &'static str,
    descriptors: Vec<Rc<SubscriptionDescriptor>>,
}

impl HandlerCollection {
    pub(crate) const fn new(event: &'static str) -> Self {
        Self { event, descriptors: Vec::new() }
    }

    pub(crate) const fn event(&self) -> &'static str {
        self.event
    }

    pub(crate) fn append(&mut self, descriptor: Rc<SubscriptionDescriptor>) {
        debug_assert_eq!(descriptor.event(), self.event);
        self.descriptors.push(descriptor);
    }

    /// Removes the registration with `id`. Returns whether one was found.
    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let Some(index) = self.descriptors.iter().position(|d| d.id() == id) else {
            return false;
        };
        // `remove`, not `swap_remove`: the survivors keep their order.
        self.descriptors.remove(index);
        true
    }

    pub(crate) fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Deactivates every registration and empties the collection.
    pub(crate) fn clear(&mut self) -> usize {
        let drained = self.descriptors.len();
        for descriptor in self.descriptors.drain(..) {
            descriptor.deactivate();
        }
        drained
    }

    /// Freezes the current membership for one dispatch pass.
    pub(crate) fn snapshot(&self) -> DispatchPass {
        DispatchPass { descriptors: self.descriptors.clone() }
    }
}

/// The registrations visited by one publish, in order.
///
/// Registrations added after the snapshot was taken are not part of the pass.
/// Registrations removed after it was taken are deactivated and skipped when
/// the pass reaches them.
#[derive(Debug)]
pub(crate) struct DispatchPass {
    descriptors: Vec<Rc<SubscriptionDescriptor>>,
}

impl DispatchPass {
    /// Visits every registration in order. Returns how many handlers ran.
    ///
    /// There is no implicit short-circuit on cancellation: a subscriber that
    /// must not see canceled events filters them with its own predicate.
    ///
    /// # Errors
    /// Stops at the first failing registration and returns its error.
    pub(crate) fn dispatch(&self, event: &mut dyn Any) -> Result<usize, EventBusError> {
        let mut invoked = 0;
        for descriptor in &self.descriptors {
            if descriptor.dispatch(event)? {
                invoked += 1;
            }
        }
        Ok(invoked)
    }
}
