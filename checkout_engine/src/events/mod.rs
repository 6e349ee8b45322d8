//! Order lifecycle events.
//!
//! Hooks registered in [`EventHooks`] run on their own tasks, fed by a bounded channel. Publishing never waits on a
//! hook, so a slow or failing hook cannot hold up the code that raised the event.
mod channel;
mod event_types;
mod hooks;

pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::*;
pub use hooks::{EventHandlers, EventHooks, EventProducers};
