//! Save-time validation of a product document.
//!
//! Runs after identifiers were filled, so blank variant SKUs have already been
//! generated when possible.

use std::collections::HashMap;

use storefront_core::FieldErrors;

use crate::model::{ProductDocument, ProductStructure};

fn check_non_negative(errors: &mut FieldErrors, field: impl Into<String>, value: Option<i64>) {
    if matches!(value, Some(v) if v < 0) {
        errors.push(field, "must not be negative");
    }
}

/// Validate a normalized product document, collecting every failure.
pub fn validate(doc: &ProductDocument) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    if doc.name.trim().is_empty() {
        errors.push("name", "name cannot be empty");
    }
    if doc.sku.trim().is_empty() {
        errors.push("sku", "SKU cannot be empty");
    } else if doc.slug.trim().is_empty() {
        errors.push("slug", "slug cannot be derived from name or SKU");
    }

    match doc.product_structure {
        ProductStructure::Simple => {
            let pricing = doc.pricing.clone().unwrap_or_default();
            if pricing.selling_price.is_none() {
                errors.push("pricing.selling_price", "selling price is required for simple products");
            }
            if pricing.cost_price.is_none() {
                errors.push("pricing.cost_price", "cost price is required for simple products");
            }
            check_non_negative(&mut errors, "base_stock", doc.base_stock);
            check_non_negative(&mut errors, "min_stock", doc.min_stock);
        }
        ProductStructure::Variant => {
            let mut seen: HashMap<String, usize> = HashMap::new();
            for (i, variant) in doc.variants.iter().enumerate() {
                let sku = variant.sku.trim();
                if sku.is_empty() {
                    errors.push(format!("variants[{i}].sku"), "variant SKU cannot be empty");
                } else if let Some(first) = seen.get(&sku.to_uppercase()) {
                    errors.push(
                        format!("variants[{i}].sku"),
                        format!("duplicate SKU '{sku}' (also used by variants[{first}])"),
                    );
                } else {
                    seen.insert(sku.to_uppercase(), i);
                }
                check_non_negative(&mut errors, format!("variants[{i}].stock"), variant.stock);
                check_non_negative(&mut errors, format!("variants[{i}].min_stock"), variant.min_stock);
            }
        }
    }

    errors.into_result()
}
