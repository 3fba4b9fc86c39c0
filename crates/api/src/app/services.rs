//! Command execution and read-model wiring for the catalog.
//!
//! Every write follows the same path:
//!
//! ```text
//! load stream (tenant-scoped) -> rehydrate -> handle -> check -> append -> project
//! ```
//!
//! The read model is rebuilt from the aggregate after each successful append.
//! Product writes of one tenant run one at a time, so the uniqueness check and
//! the projection always see the previous write's result.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use storefront_catalog::{
    CatalogSettings, Product, ProductCommand, ProductDocument, ProductEvent, ProductId,
    ProductLifecycle,
};
use storefront_core::{Aggregate, AggregateId, AggregateRoot, DomainError, TenantId};
use storefront_events::Event;

use crate::store::{
    EventStore, EventStoreError, InMemoryEventStore, InMemoryTenantStore, StoredEvent,
    TenantStore, UncommittedEvent,
};

pub const PRODUCT_AGGREGATE_TYPE: &str = "catalog.product";

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Stale stream version on append.
    #[error("concurrent modification: {0}")]
    Concurrency(String),

    #[error("tenant isolation violation: {0}")]
    TenantIsolation(String),

    /// A stored payload no longer matches the aggregate's event type.
    #[error("failed to deserialize stored event: {0}")]
    Deserialize(String),

    #[error(transparent)]
    Store(EventStoreError),
}

impl From<EventStoreError> for DispatchError {
    fn from(value: EventStoreError) -> Self {
        match value {
            EventStoreError::Concurrency(msg) => DispatchError::Concurrency(msg),
            EventStoreError::TenantIsolation(msg) => DispatchError::TenantIsolation(msg),
            other => DispatchError::Store(other),
        }
    }
}

/// Product projection served by the read endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductReadModel {
    pub id: ProductId,
    #[serde(flatten)]
    pub document: ProductDocument,
    pub lifecycle: ProductLifecycle,
    pub can_be_sold: bool,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of a successful dispatch.
#[derive(Debug)]
pub struct Dispatched<A> {
    pub aggregate: A,
    pub committed: Vec<StoredEvent>,
}

#[derive(Debug)]
pub struct AppServices {
    settings: CatalogSettings,
    event_store: Arc<InMemoryEventStore>,
    products: Arc<InMemoryTenantStore<ProductId, ProductReadModel>>,
    write_locks: Mutex<HashMap<TenantId, Arc<Mutex<()>>>>,
}

impl AppServices {
    pub fn new(settings: CatalogSettings) -> Self {
        Self {
            settings,
            event_store: Arc::new(InMemoryEventStore::new()),
            products: Arc::new(InMemoryTenantStore::new()),
            write_locks: Mutex::new(HashMap::new()),
        }
    }

    fn tenant_write_lock(&self, tenant_id: TenantId) -> Arc<Mutex<()>> {
        let mut locks = self.write_locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(tenant_id).or_default())
    }

    pub fn settings(&self) -> &CatalogSettings {
        &self.settings
    }

    /// Run `command` against one aggregate stream.
    ///
    /// `check` sees the decided events before they are appended and may veto
    /// them (cross-aggregate rules the aggregate cannot know about).
    pub fn dispatch<A>(
        &self,
        tenant_id: TenantId,
        aggregate_id: AggregateId,
        aggregate_type: &str,
        command: A::Command,
        make_aggregate: impl FnOnce(AggregateId) -> A,
        check: impl FnOnce(&[A::Event]) -> Result<(), DomainError>,
    ) -> Result<Dispatched<A>, DispatchError>
    where
        A: Aggregate<Error = DomainError>,
        A::Event: Event + Serialize + DeserializeOwned,
    {
        let history = self.event_store.load_stream(tenant_id, aggregate_id)?;
        let expected = validate_loaded_stream(tenant_id, aggregate_id, &history)?;

        let past = history
            .into_iter()
            .map(|stored| serde_json::from_value::<A::Event>(stored.payload))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DispatchError::Deserialize(e.to_string()))?;
        let mut aggregate = make_aggregate(aggregate_id);
        aggregate.replay(&past);

        let decided = aggregate.handle(&command)?;
        check(&decided)?;

        let uncommitted = decided
            .iter()
            .map(|ev| UncommittedEvent::from_typed(tenant_id, aggregate_id, aggregate_type, ev))
            .collect::<Result<Vec<_>, _>>()?;
        let committed = self.event_store.append(uncommitted, expected)?;

        aggregate.replay(&decided);

        for stored in &committed {
            tracing::info!(
                %tenant_id,
                %aggregate_id,
                event_type = %stored.event_type,
                sequence = stored.sequence_number,
                "event committed"
            );
        }

        Ok(Dispatched {
            aggregate,
            committed,
        })
    }

    /// Dispatch a product command and refresh the product read model.
    pub fn execute_product(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
        command: ProductCommand,
    ) -> Result<ProductReadModel, DispatchError> {
        let lock = self.tenant_write_lock(tenant_id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let dispatched = self.dispatch::<Product>(
            tenant_id,
            product_id.0,
            PRODUCT_AGGREGATE_TYPE,
            command,
            |id| Product::empty(ProductId::new(id)),
            |events| self.ensure_unique_identifiers(tenant_id, product_id, events),
        )?;

        let previous = self.products.get(tenant_id, &product_id);
        let now = dispatched
            .committed
            .last()
            .map(|e| e.occurred_at)
            .unwrap_or_else(Utc::now);
        let product = dispatched.aggregate;

        let read_model = ProductReadModel {
            id: product_id,
            document: product.document().clone(),
            lifecycle: product.lifecycle(),
            can_be_sold: product.can_be_sold(),
            version: product.version(),
            created_at: previous.map(|p| p.created_at).unwrap_or(now),
            updated_at: now,
        };
        self.products.upsert(tenant_id, product_id, read_model.clone());

        Ok(read_model)
    }

    /// The product SKU and slug may not be shared by two products of a tenant.
    fn ensure_unique_identifiers(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
        events: &[ProductEvent],
    ) -> Result<(), DomainError> {
        for event in events {
            let document = match event {
                ProductEvent::ProductCreated(e) => &e.document,
                ProductEvent::ProductUpdated(e) => &e.document,
                ProductEvent::ProductArchived(_) | ProductEvent::ProductRestored(_) => continue,
            };

            let sku = document.sku.trim();
            let slug = document.slug.as_str();
            let clash = self.products.find(tenant_id, &|id: &ProductId, other: &ProductReadModel| {
                *id != product_id
                    && (other.document.sku.trim().eq_ignore_ascii_case(sku)
                        || other.document.slug == slug)
            });

            if let Some(other) = clash {
                let field = if other.document.sku.trim().eq_ignore_ascii_case(sku) {
                    "SKU"
                } else {
                    "slug"
                };
                return Err(DomainError::conflict(format!(
                    "{field} already used by product {}",
                    other.id
                )));
            }
        }
        Ok(())
    }

    pub fn products_get(&self, tenant_id: TenantId, product_id: &ProductId) -> Option<ProductReadModel> {
        self.products.get(tenant_id, product_id)
    }

    /// Oldest first.
    pub fn products_list(&self, tenant_id: TenantId) -> Vec<ProductReadModel> {
        let mut items = self.products.list(tenant_id);
        items.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.0.as_uuid().cmp(b.id.0.as_uuid()))
        });
        items
    }

    pub fn product_events(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
    ) -> Result<Vec<StoredEvent>, DispatchError> {
        let history = self.event_store.load_stream(tenant_id, product_id.0)?;
        validate_loaded_stream(tenant_id, product_id.0, &history)?;
        Ok(history)
    }
}

/// Check a loaded stream belongs to the requested tenant/aggregate and is
/// strictly ordered; returns its version.
fn validate_loaded_stream(
    tenant_id: TenantId,
    aggregate_id: AggregateId,
    stream: &[StoredEvent],
) -> Result<u64, DispatchError> {
    let mut last = 0u64;
    for (idx, e) in stream.iter().enumerate() {
        if e.tenant_id != tenant_id || e.aggregate_id != aggregate_id {
            return Err(DispatchError::TenantIsolation(format!(
                "loaded stream contains a foreign event at index {idx}"
            )));
        }
        if e.sequence_number <= last {
            return Err(DispatchError::Store(EventStoreError::InvalidAppend(format!(
                "non-monotonic sequence_number in loaded stream (last={last}, found={})",
                e.sequence_number
            ))));
        }
        last = e.sequence_number;
    }
    Ok(last)
}
