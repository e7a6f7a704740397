//! Events raised by elements and queued for the host.

pub mod dispatcher;
pub mod message;

pub use dispatcher::EventDispatcher;
pub use message::{Custom, Envelope, Event, SelectedIndexChanged};
