//! Catalog domain events.
//!
//! Only the event abstraction lives here; concrete event types are owned by
//! the domain crates that emit them.

pub mod event;

pub use event::Event;
