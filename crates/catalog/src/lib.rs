//! Catalog domain module (event-sourced).
//!
//! Product business rules: variant combination generation, identifier
//! generation, save-time validation, status derivation and SEO synthesis.
//! Pure, deterministic domain logic (no IO, no HTTP, no storage).

pub mod attribute;
pub mod combination;
pub mod derive;
pub mod identifiers;
pub mod model;
pub mod product;
pub mod seo;
pub mod status;
pub mod validation;

pub use attribute::{Attribute, AttributeId, AttributeSelection};
pub use combination::{
    Combination, GeneratorPhase, VariantAttributes, VariantGenerator, cartesian, merge,
};
pub use derive::{
    CatalogSettings, archive_document, assign_identifiers, derive_status_and_seo,
    normalize_structure, prepare_for_save, restore_document,
};
pub use identifiers::{
    IdentifierBase, IdentifierMode, SegmentLength, SkuPolicy, VariantIdentifiers,
    apply_identifiers, apply_identifiers_to_all, slugify, variant_name, variant_sku, variant_slug,
};
pub use model::{CategoryRef, Pricing, ProductDocument, ProductStructure, ProductType, Variant};
pub use product::{
    ArchiveProduct, CreateProduct, Product, ProductArchived, ProductCommand, ProductCreated,
    ProductEvent, ProductId, ProductLifecycle, ProductRestored, ProductUpdated, RestoreProduct,
    UpdateProduct,
};
pub use seo::{RobotsDirective, Seo, SeoMetadata, SeoSettings, synthesize, truncate_with_ellipsis};
pub use status::{StockLevels, UnitState, UnitStatus, derive_product_status, derive_unit};
pub use validation::validate;
