use std::any::Any;

/// Base trait for anything that can be published on an [`EventBus`](crate::EventBus).
///
/// Every event is cancelable. A handler vetoes an event with [`Event::cancel`];
/// handlers that run later in the same publish and the producer after
/// `publish` returns all observe the flag, since the event is dispatched by
/// mutable reference and never copied.
///
/// Implement it with `#[derive(Event)]`, which uses a `canceled: bool` field
/// (or the field marked `#[event(canceled)]`).
pub trait Event: Any {
    /// Whether some handler has canceled this event.
    fn is_canceled(&self) -> bool;

    /// Sets or clears the cancel flag.
    fn set_canceled(&mut self, canceled: bool);

    /// Shorthand for `set_canceled(true)`.
    fn cancel(&mut self) {
        self.set_canceled(true);
    }
}

/// An event that carries a reference to the object it originated from.
///
/// The bus itself knows nothing about sources. This trait only powers
/// [`EventBus::subscribe_from`](crate::EventBus::subscribe_from), which turns a
/// source into an ordinary predicate.
pub trait SourcedEvent: Event {
    /// Identity of the originating object, compared with `==`.
    type Source: PartialEq + 'static;

    fn source(&self) -> &Self::Source;
}

/// A listener object for events of type `E`.
///
/// One type may implement `EventHandler` for several event types and be
/// registered once per type via
/// [`EventBus::subscribe_handler`](crate::EventBus::subscribe_handler).
pub trait EventHandler<E: Event> {
    fn on(&self, event: &mut E);
}
