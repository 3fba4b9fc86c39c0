//! Product document shape: what the admin form submits and what gets stored.

use serde::{Deserialize, Serialize};

use crate::combination::VariantAttributes;
use crate::seo::Seo;
use crate::status::{StockLevels, UnitStatus};

/// Whether the product has a physical stock concept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    #[default]
    Physical,
    Digital,
}

/// Whether the product is sold as one unit or through its variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStructure {
    #[default]
    Simple,
    Variant,
}

/// Prices in the smallest currency unit (e.g. cents).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pricing {
    pub cost_price: Option<u64>,
    pub selling_price: Option<u64>,
}

/// Reference to a category (and optionally one of its subcategories).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
}

/// One sellable variant, owned by its product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Variant {
    pub sku: String,
    pub slug: String,
    pub name: String,
    pub cost_price: Option<u64>,
    pub selling_price: Option<u64>,
    pub stock: Option<i64>,
    pub min_stock: Option<i64>,
    /// Derived on save.
    pub status: UnitStatus,
    pub attributes: VariantAttributes,
    pub images: Vec<String>,
    /// Derived on save (drafts are never published).
    pub published: bool,
}

impl Variant {
    pub fn levels(&self) -> StockLevels {
        StockLevels::new(self.stock, self.min_stock)
    }

    /// Publicly listed and purchasable.
    pub fn is_sellable(&self) -> bool {
        self.published && self.status == UnitStatus::Selling
    }
}

/// A catalog product as submitted by the admin form / stored by the backend.
///
/// Exactly one side is populated after save: simple products carry `pricing`,
/// `base_stock` and `min_stock`; variant-structured products carry `variants`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductDocument {
    pub name: String,
    pub slug: String,
    pub sku: String,
    pub description: Option<String>,
    pub product_type: ProductType,
    pub product_structure: ProductStructure,

    pub pricing: Option<Pricing>,
    pub base_stock: Option<i64>,
    pub min_stock: Option<i64>,

    /// Simple products only; `None` on variant-structured parents.
    pub status: Option<UnitStatus>,
    /// Simple products: the listing flag. Variant-structured parents: `None`,
    /// or `Some(false)` when no variant is sellable.
    pub published: Option<bool>,

    pub categories: Vec<CategoryRef>,
    pub images: Vec<String>,
    pub variants: Vec<Variant>,
    pub seo: Seo,
}

impl ProductDocument {
    pub fn is_variant_structured(&self) -> bool {
        self.product_structure == ProductStructure::Variant
    }

    pub fn is_digital(&self) -> bool {
        self.product_type == ProductType::Digital
    }

    pub fn stock_levels(&self) -> StockLevels {
        StockLevels::new(self.base_stock, self.min_stock)
    }

    /// At least one variant is published and selling.
    pub fn has_sellable_variant(&self) -> bool {
        self.variants.iter().any(Variant::is_sellable)
    }

    /// Listing visibility as seen by the storefront.
    ///
    /// Variant-structured products are visible when any variant is published.
    pub fn is_published(&self) -> bool {
        match self.product_structure {
            ProductStructure::Simple => self.published == Some(true),
            ProductStructure::Variant => self.variants.iter().any(|v| v.published),
        }
    }

    /// Whether the product can currently be bought.
    ///
    /// Digital simple products have no stock concept and follow their derived
    /// status instead of stock figures.
    pub fn is_in_stock(&self) -> bool {
        match self.product_structure {
            ProductStructure::Variant => self.has_sellable_variant(),
            ProductStructure::Simple if self.is_digital() => {
                self.status == Some(UnitStatus::Selling)
            }
            ProductStructure::Simple => self.stock_levels().is_in_stock(),
        }
    }
}
