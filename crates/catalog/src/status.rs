//! Publish / stock status derivation.
//!
//! Runs on every save and never fails: missing figures degrade to `draft`
//! (unpublished) rather than erroring.

use serde::{Deserialize, Serialize};

use crate::model::{ProductDocument, ProductStructure, ProductType};

/// Status of a sellable unit (a simple product or one variant).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    Selling,
    OutOfStock,
    #[default]
    Draft,
    /// Only set by an explicit archive action; derivation leaves it alone.
    Archived,
    /// Accepted on input; derivation replaces it.
    LowStock,
}

impl UnitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitStatus::Selling => "selling",
            UnitStatus::OutOfStock => "out_of_stock",
            UnitStatus::Draft => "draft",
            UnitStatus::Archived => "archived",
            UnitStatus::LowStock => "low_stock",
        }
    }
}

impl core::fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stock figures of one unit; either may be unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StockLevels {
    pub stock: Option<i64>,
    pub min_stock: Option<i64>,
}

impl StockLevels {
    pub fn new(stock: Option<i64>, min_stock: Option<i64>) -> Self {
        Self { stock, min_stock }
    }

    /// Both figures set and stock above the minimum.
    pub fn is_in_stock(&self) -> bool {
        matches!((self.stock, self.min_stock), (Some(stock), Some(min)) if stock > min)
    }
}

/// Derived status + visibility of one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitState {
    pub status: UnitStatus,
    pub published: bool,
}

/// Status transition for one unit.
///
/// - archived stays archived and unpublished
/// - digital units always sell
/// - no stock figure: draft, forced unpublished
/// - stock at or below the minimum (unset minimum counts as 0): out of stock,
///   visibility untouched
/// - otherwise selling
pub fn derive_unit(
    product_type: ProductType,
    levels: StockLevels,
    current: UnitStatus,
    published: bool,
) -> UnitState {
    if current == UnitStatus::Archived {
        return UnitState {
            status: UnitStatus::Archived,
            published: false,
        };
    }

    if product_type == ProductType::Digital {
        return UnitState {
            status: UnitStatus::Selling,
            published,
        };
    }

    match levels.stock {
        None => UnitState {
            status: UnitStatus::Draft,
            published: false,
        },
        Some(stock) if stock <= levels.min_stock.unwrap_or(0) => UnitState {
            status: UnitStatus::OutOfStock,
            published,
        },
        Some(_) => UnitState {
            status: UnitStatus::Selling,
            published,
        },
    }
}

/// Apply the status rules to a whole product in place.
///
/// Simple products derive their own status. Variant-structured products derive
/// each variant; the parent's status is cleared and its `published` is cleared
/// too unless no variant is sellable, in which case it is forced to `false`.
pub fn derive_product_status(doc: &mut ProductDocument) {
    let product_type = doc.product_type;

    match doc.product_structure {
        ProductStructure::Simple => {
            let state = derive_unit(
                product_type,
                doc.stock_levels(),
                doc.status.unwrap_or_default(),
                doc.published.unwrap_or(false),
            );
            doc.status = Some(state.status);
            doc.published = Some(state.published);
        }
        ProductStructure::Variant => {
            for variant in &mut doc.variants {
                let state =
                    derive_unit(product_type, variant.levels(), variant.status, variant.published);
                variant.status = state.status;
                variant.published = state.published;
            }
            doc.status = None;
            doc.published = if doc.has_sellable_variant() { None } else { Some(false) };
        }
    }

    tracing::debug!(
        sku = %doc.sku,
        structure = ?doc.product_structure,
        status = ?doc.status,
        published = ?doc.published,
        "derived product status"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Variant;

    fn physical(stock: Option<i64>, min: Option<i64>, published: bool) -> UnitState {
        derive_unit(
            ProductType::Physical,
            StockLevels::new(stock, min),
            UnitStatus::Draft,
            published,
        )
    }

    #[test]
    fn stock_below_minimum_is_out_of_stock() {
        let state = physical(Some(5), Some(10), true);
        assert_eq!(state.status, UnitStatus::OutOfStock);
        assert!(state.published);
    }

    #[test]
    fn stock_at_minimum_is_out_of_stock() {
        assert_eq!(physical(Some(5), Some(5), true).status, UnitStatus::OutOfStock);
    }

    #[test]
    fn stock_above_minimum_is_selling() {
        assert_eq!(physical(Some(10), Some(5), true).status, UnitStatus::Selling);
    }

    #[test]
    fn missing_stock_is_unpublished_draft() {
        let state = physical(None, None, true);
        assert_eq!(state, UnitState { status: UnitStatus::Draft, published: false });

        let state = physical(None, Some(3), true);
        assert_eq!(state.status, UnitStatus::Draft);
        assert!(!state.published);
    }

    #[test]
    fn missing_minimum_counts_as_zero() {
        assert_eq!(physical(Some(0), None, false).status, UnitStatus::OutOfStock);
        assert_eq!(physical(Some(1), None, false).status, UnitStatus::Selling);
    }

    #[test]
    fn digital_always_sells() {
        let state = derive_unit(
            ProductType::Digital,
            StockLevels::default(),
            UnitStatus::OutOfStock,
            true,
        );
        assert_eq!(state, UnitState { status: UnitStatus::Selling, published: true });
    }

    #[test]
    fn archived_is_terminal() {
        let state = derive_unit(
            ProductType::Physical,
            StockLevels::new(Some(50), Some(1)),
            UnitStatus::Archived,
            true,
        );
        assert_eq!(state, UnitState { status: UnitStatus::Archived, published: false });
    }

    #[test]
    fn low_stock_input_is_replaced() {
        let state = derive_unit(
            ProductType::Physical,
            StockLevels::new(Some(50), Some(1)),
            UnitStatus::LowStock,
            true,
        );
        assert_eq!(state.status, UnitStatus::Selling);
    }

    #[test]
    fn variant_parent_is_cleared_and_unpublished_without_sellable_variants() {
        let mut doc = ProductDocument {
            product_structure: ProductStructure::Variant,
            status: Some(UnitStatus::Selling),
            published: Some(true),
            variants: vec![
                Variant { stock: Some(2), min_stock: Some(5), published: true, ..Variant::default() },
                Variant { stock: Some(9), min_stock: Some(1), published: false, ..Variant::default() },
            ],
            ..ProductDocument::default()
        };

        derive_product_status(&mut doc);
        assert_eq!(doc.status, None);
        assert_eq!(doc.published, Some(false));
        assert_eq!(doc.variants[0].status, UnitStatus::OutOfStock);
        assert_eq!(doc.variants[1].status, UnitStatus::Selling);

        doc.variants[1].published = true;
        derive_product_status(&mut doc);
        assert_eq!(doc.status, None);
        assert_eq!(doc.published, None);
    }

    #[test]
    fn simple_product_gets_status_and_flag() {
        let mut doc = ProductDocument {
            base_stock: Some(10),
            min_stock: Some(5),
            published: Some(true),
            ..ProductDocument::default()
        };
        derive_product_status(&mut doc);
        assert_eq!(doc.status, Some(UnitStatus::Selling));
        assert_eq!(doc.published, Some(true));

        doc.base_stock = None;
        doc.min_stock = None;
        derive_product_status(&mut doc);
        assert_eq!(doc.status, Some(UnitStatus::Draft));
        assert_eq!(doc.published, Some(false));
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&UnitStatus::OutOfStock).unwrap(), r#""out_of_stock""#);
        assert_eq!(UnitStatus::LowStock.to_string(), "low_stock");
    }
}
