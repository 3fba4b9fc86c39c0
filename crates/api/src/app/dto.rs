use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_catalog::{Attribute, AttributeSelection, Combination, ProductDocument};

use crate::store::StoredEvent;

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /products` and `PUT /products/:id`.
#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    #[serde(flatten)]
    pub document: ProductDocument,
    /// Recompute product slug and variant sku/slug/name even when filled in.
    #[serde(default)]
    pub regenerate_identifiers: bool,
}

#[derive(Debug, Deserialize)]
pub struct AttributeRequest {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub options: Vec<String>,
}

impl From<AttributeRequest> for Attribute {
    fn from(value: AttributeRequest) -> Self {
        Attribute::new(value.id, value.name, value.options)
    }
}

/// Parent identifiers the preview derives variant identifiers from.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BaseIdentifiersRequest {
    pub product_name: String,
    pub sku: String,
    pub slug: String,
}

/// Body of `POST /variants/preview`: the variant section of the product form.
#[derive(Debug, Deserialize)]
pub struct VariantPreviewRequest {
    pub attributes: Vec<AttributeRequest>,
    #[serde(default)]
    pub selection: AttributeSelection,
    /// Combinations currently in the form; matching ones keep their edits.
    #[serde(default)]
    pub existing: Vec<Combination>,
    #[serde(default)]
    pub base: BaseIdentifiersRequest,
    #[serde(default)]
    pub regenerate: bool,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct VariantPreviewResponse {
    pub count: usize,
    pub combinations: Vec<Combination>,
}

#[derive(Debug, Serialize)]
pub struct EventSummary {
    pub event_id: String,
    pub sequence_number: u64,
    pub event_type: String,
    pub event_version: u32,
    pub occurred_at: DateTime<Utc>,
}

impl From<StoredEvent> for EventSummary {
    fn from(value: StoredEvent) -> Self {
        Self {
            event_id: value.event_id.to_string(),
            sequence_number: value.sequence_number,
            event_type: value.event_type,
            event_version: value.event_version,
            occurred_at: value.occurred_at,
        }
    }
}
