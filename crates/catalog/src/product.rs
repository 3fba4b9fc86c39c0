//! The event-sourced `Product` aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{Aggregate, AggregateId, AggregateRoot, DomainError, DomainResult, TenantId};
use storefront_events::Event;

use crate::derive::{CatalogSettings, archive_document, prepare_for_save, restore_document};
use crate::model::{ProductDocument, ProductStructure};
use crate::status::UnitStatus;

/// Product identifier (tenant-scoped via `tenant_id` fields in events/commands).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub AggregateId);

impl ProductId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Product lifecycle (removal archives, never deletes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductLifecycle {
    Active,
    Archived,
}

/// Aggregate root: Product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    id: ProductId,
    tenant_id: Option<TenantId>,
    document: ProductDocument,
    lifecycle: ProductLifecycle,
    version: u64,
    created: bool,
}

impl Product {
    /// Create an empty, not-yet-created aggregate instance.
    pub fn empty(id: ProductId) -> Self {
        Self {
            id,
            tenant_id: None,
            document: ProductDocument::default(),
            lifecycle: ProductLifecycle::Active,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    pub fn document(&self) -> &ProductDocument {
        &self.document
    }

    pub fn lifecycle(&self) -> ProductLifecycle {
        self.lifecycle
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    /// Whether a customer could buy it right now.
    pub fn can_be_sold(&self) -> bool {
        if self.lifecycle != ProductLifecycle::Active {
            return false;
        }
        match self.document.product_structure {
            ProductStructure::Simple => {
                self.document.published == Some(true)
                    && self.document.status == Some(UnitStatus::Selling)
            }
            ProductStructure::Variant => self.document.has_sellable_variant(),
        }
    }
}

impl AggregateRoot for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProduct {
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub document: ProductDocument,
    pub settings: CatalogSettings,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateProduct (full document replacement from the edit form).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProduct {
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub document: ProductDocument,
    pub settings: CatalogSettings,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ArchiveProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveProduct {
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub settings: CatalogSettings,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RestoreProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreProduct {
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub settings: CatalogSettings,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductCommand {
    CreateProduct(CreateProduct),
    UpdateProduct(UpdateProduct),
    ArchiveProduct(ArchiveProduct),
    RestoreProduct(RestoreProduct),
}

/// Event: ProductCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCreated {
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub document: ProductDocument,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProductUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUpdated {
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub document: ProductDocument,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProductArchived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductArchived {
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub document: ProductDocument,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProductRestored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRestored {
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub document: ProductDocument,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductEvent {
    ProductCreated(ProductCreated),
    ProductUpdated(ProductUpdated),
    ProductArchived(ProductArchived),
    ProductRestored(ProductRestored),
}

impl Event for ProductEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::ProductCreated(_) => "catalog.product.created",
            ProductEvent::ProductUpdated(_) => "catalog.product.updated",
            ProductEvent::ProductArchived(_) => "catalog.product.archived",
            ProductEvent::ProductRestored(_) => "catalog.product.restored",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ProductEvent::ProductCreated(e) => e.occurred_at,
            ProductEvent::ProductUpdated(e) => e.occurred_at,
            ProductEvent::ProductArchived(e) => e.occurred_at,
            ProductEvent::ProductRestored(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Product {
    type Command = ProductCommand;
    type Event = ProductEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ProductEvent::ProductCreated(e) => {
                self.id = e.product_id;
                self.tenant_id = Some(e.tenant_id);
                self.document = e.document.clone();
                self.lifecycle = ProductLifecycle::Active;
                self.created = true;
            }
            ProductEvent::ProductUpdated(e) => {
                self.document = e.document.clone();
            }
            ProductEvent::ProductArchived(e) => {
                self.document = e.document.clone();
                self.lifecycle = ProductLifecycle::Archived;
            }
            ProductEvent::ProductRestored(e) => {
                self.document = e.document.clone();
                self.lifecycle = ProductLifecycle::Active;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ProductCommand::CreateProduct(cmd) => self.handle_create(cmd),
            ProductCommand::UpdateProduct(cmd) => self.handle_update(cmd),
            ProductCommand::ArchiveProduct(cmd) => self.handle_archive(cmd),
            ProductCommand::RestoreProduct(cmd) => self.handle_restore(cmd),
        }
    }
}

impl Product {
    fn ensure_tenant(&self, tenant_id: TenantId) -> DomainResult<()> {
        if !self.created {
            return Ok(());
        }
        if self.tenant_id != Some(tenant_id) {
            return Err(DomainError::invariant("tenant mismatch"));
        }
        Ok(())
    }

    fn ensure_product_id(&self, product_id: ProductId) -> DomainResult<()> {
        if self.id != product_id {
            return Err(DomainError::invariant("product_id mismatch"));
        }
        Ok(())
    }

    fn ensure_existing(&self, tenant_id: TenantId, product_id: ProductId) -> DomainResult<()> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_tenant(tenant_id)?;
        self.ensure_product_id(product_id)
    }

    fn handle_create(&self, cmd: &CreateProduct) -> DomainResult<Vec<ProductEvent>> {
        if self.created {
            return Err(DomainError::conflict("product already exists"));
        }

        // Uniqueness of the product SKU/slug across a tenant's catalog needs
        // the store; only per-document rules are enforced here.
        let document = prepare_for_save(cmd.document.clone(), &cmd.settings)?;

        Ok(vec![ProductEvent::ProductCreated(ProductCreated {
            tenant_id: cmd.tenant_id,
            product_id: cmd.product_id,
            document,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update(&self, cmd: &UpdateProduct) -> DomainResult<Vec<ProductEvent>> {
        self.ensure_existing(cmd.tenant_id, cmd.product_id)?;

        if self.lifecycle == ProductLifecycle::Archived {
            return Err(DomainError::invariant("archived products cannot be updated"));
        }

        let document = prepare_for_save(cmd.document.clone(), &cmd.settings)?;

        Ok(vec![ProductEvent::ProductUpdated(ProductUpdated {
            tenant_id: cmd.tenant_id,
            product_id: cmd.product_id,
            document,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_archive(&self, cmd: &ArchiveProduct) -> DomainResult<Vec<ProductEvent>> {
        self.ensure_existing(cmd.tenant_id, cmd.product_id)?;

        if self.lifecycle == ProductLifecycle::Archived {
            return Err(DomainError::conflict("product is already archived"));
        }

        Ok(vec![ProductEvent::ProductArchived(ProductArchived {
            tenant_id: cmd.tenant_id,
            product_id: cmd.product_id,
            document: archive_document(self.document.clone(), &cmd.settings.seo),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_restore(&self, cmd: &RestoreProduct) -> DomainResult<Vec<ProductEvent>> {
        self.ensure_existing(cmd.tenant_id, cmd.product_id)?;

        if self.lifecycle != ProductLifecycle::Archived {
            return Err(DomainError::conflict("product is not archived"));
        }

        Ok(vec![ProductEvent::ProductRestored(ProductRestored {
            tenant_id: cmd.tenant_id,
            product_id: cmd.product_id,
            document: restore_document(self.document.clone(), &cmd.settings.seo),
            occurred_at: cmd.occurred_at,
        })])
    }
}
