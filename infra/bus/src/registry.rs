use crate::collection::HandlerCollection;
use crate::descriptor::{SubscriptionDescriptor, SubscriptionId, runtime_type};
use crate::error::EventBusError;
use fxhash::FxHashMap;
use std::any::{Any, TypeId};
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::rc::Rc;
use tracing::{debug, trace};

/// Event type identity to its [`HandlerCollection`].
///
/// Collections are created on first subscription and owned by value. Borrows of
/// the map never outlive a single method call, and none is held while user
/// handlers run, so handlers may freely subscribe, unsubscribe or publish.
#[derive(Debug, Default)]
pub(crate) struct HandlerCollectionMap {
    collections: RefCell<FxHashMap<TypeId, HandlerCollection>>,
    next_id: Cell<u64>,
}

impl HandlerCollectionMap {
    pub(crate) fn next_id(&self) -> SubscriptionId {
        let raw = self.next_id.get();
        self.next_id.set(raw.wrapping_add(1));
        SubscriptionId::new(raw)
    }

    /// Returns the collection for `type_id`, creating an empty one if absent.
    pub(crate) fn get_or_create(
        &self,
        type_id: TypeId,
        event: &'static str,
    ) -> RefMut<'_, HandlerCollection> {
        RefMut::map(self.collections.borrow_mut(), |collections| {
            collections.entry(type_id).or_insert_with(|| {
                trace!(event, "Initializing new handler collection");
                HandlerCollection::new(event)
            })
        })
    }

    /// Returns the collection for `type_id`, or `None` if nobody ever subscribed.
    pub(crate) fn lookup(&self, type_id: TypeId) -> Option<Ref<'_, HandlerCollection>> {
        Ref::filter_map(self.collections.borrow(), |collections| collections.get(&type_id)).ok()
    }

    pub(crate) fn add(&self, descriptor: SubscriptionDescriptor) -> Rc<SubscriptionDescriptor> {
        let descriptor = Rc::new(descriptor);
        self.get_or_create(descriptor.event_type(), descriptor.event()).append(Rc::clone(&descriptor));
        descriptor
    }

    pub(crate) fn remove(&self, type_id: TypeId, id: SubscriptionId) -> bool {
        self.collections
            .borrow_mut()
            .get_mut(&type_id)
            .is_some_and(|collection| collection.remove(id))
    }

    /// Dispatches `event` to the collection matching its runtime type.
    ///
    /// An event type nobody subscribed to is a no-op, not an error.
    ///
    /// # Errors
    /// Propagates the first error raised during the pass.
    pub(crate) fn dispatch(&self, event: &mut dyn Any) -> Result<usize, EventBusError> {
        let type_id = runtime_type(event);
        let Some(pass) = self.lookup(type_id).map(|collection| collection.snapshot()) else {
            debug!(?type_id, "Event dropped: no subscribers registered");
            return Ok(0);
        };
        pass.dispatch(event)
    }

    pub(crate) fn subscriber_count(&self, type_id: TypeId) -> usize {
        self.lookup(type_id).map_or(0, |collection| collection.len())
    }

    pub(crate) fn len(&self) -> usize {
        self.collections.borrow().len()
    }

    /// Drops every collection, deactivating their registrations.
    pub(crate) fn clear(&self) -> usize {
        let drained: Vec<HandlerCollection> =
            self.collections.borrow_mut().drain().map(|(_, collection)| collection).collect();
        let count = drained.len();
        for mut collection in drained {
            let handlers = collection.clear();
            trace!(event = collection.event(), handlers, "Handler collection closed");
        }
        count
    }
}
