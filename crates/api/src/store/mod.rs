//! In-memory storage behind the API: the append-only event log and the
//! tenant-isolated product read model.

pub mod event_store;
pub mod tenant_store;

pub use event_store::{EventStore, EventStoreError, InMemoryEventStore, StoredEvent, UncommittedEvent};
pub use tenant_store::{InMemoryTenantStore, TenantStore};
