//! # Event Bus
//!
//! A synchronous, type-safe, in-process event bus with cancelable events.
//!
//! ## Overview
//!
//! Producers publish typed event values; subscribers register typed handlers,
//! optionally guarded by a predicate. [`EventBus::publish`] hands the event by
//! mutable reference to every matching handler in registration order and
//! returns when the last one is done, so a handler can veto an event before
//! later handlers and the producer observe it.
//!
//! ## Features
//!
//! * **Type-Safe**: Events are identified by their Rust type; handlers receive `&mut E`.
//! * **Cancelable**: Every [`Event`] carries a cancel flag visible to the rest of the pass.
//! * **Ordered**: Handlers run in registration order; predicates filter per handler.
//! * **Re-entrant**: Handlers may subscribe, unsubscribe and publish while a publish runs.
//! * **Fail-fast**: A failing handler aborts the pass and its error is returned.
//!
//! ## Unsubscribing during a publish
//!
//! A publish iterates a snapshot of the registrations taken when it started.
//! [`Subscription::unsubscribe`] deactivates its registration at once, so a
//! handler removed by an earlier handler of the same pass is skipped. A handler
//! added during a pass first runs on the next publish.
//!
//! # Example
//!
//! ```rust
//! use herald_bus::{Event, EventBus, EventBusError};
//!
//! #[derive(Debug, Event)]
//! struct Moved { x: i32, canceled: bool }
//!
//! fn main() -> Result<(), EventBusError> {
//!     let bus = EventBus::new();
//!     bus.subscribe(|e: &mut Moved| if e.x.abs() > 500 { e.cancel() });
//!
//!     let mut inside = Moved { x: 200, canceled: false };
//!     bus.publish(&mut inside)?;
//!     assert!(!inside.is_canceled());
//!
//!     let mut outside = Moved { x: 600, canceled: false };
//!     bus.publish(&mut outside)?;
//!     assert!(outside.is_canceled());
//!     Ok(())
//! }
//! ```

extern crate self as herald_bus;

mod bus;
mod collection;
mod descriptor;
mod error;
mod event;
mod registry;
mod subscription;

pub use bus::EventBus;
pub use descriptor::SubscriptionId;
pub use error::{BoxError, EventBusError, EventBusErrorExt, HandlerResult};
pub use event::{Event, EventHandler, SourcedEvent};
pub use herald_derive::Event;
pub use subscription::Subscription;
