//! The save pipeline: normalize → identifiers → validate → status → SEO.
//!
//! Everything here is a plain function over a [`ProductDocument`]; callers run
//! it before handing the document to storage.

use serde::{Deserialize, Serialize};
use storefront_core::FieldErrors;

use crate::identifiers::{
    IdentifierBase, IdentifierMode, SkuPolicy, apply_identifiers_to_all, slugify,
};
use crate::model::{ProductDocument, ProductStructure};
use crate::seo::{SeoSettings, synthesize};
use crate::status::{UnitStatus, derive_product_status};
use crate::validation::validate;

/// Tenant/storefront configuration the derivation reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSettings {
    pub seo: SeoSettings,
    pub sku_policy: SkuPolicy,
}

/// Null the side of the document the product structure does not use.
pub fn normalize_structure(doc: &mut ProductDocument) {
    match doc.product_structure {
        ProductStructure::Simple => doc.variants.clear(),
        ProductStructure::Variant => {
            doc.pricing = None;
            doc.base_stock = None;
            doc.min_stock = None;
        }
    }
}

/// Fill the product slug and every variant's sku/slug/name.
///
/// A name with nothing slug-worthy (e.g. only Cyrillic) falls back to the SKU.
pub fn assign_identifiers(doc: &mut ProductDocument, policy: &SkuPolicy, mode: IdentifierMode) {
    let mut slug = if doc.slug.trim().is_empty() || mode == IdentifierMode::Regenerate {
        slugify(&doc.name)
    } else {
        slugify(&doc.slug)
    };
    if slug.is_empty() {
        slug = slugify(&doc.sku);
    }
    doc.slug = slug;

    let ProductDocument { name, sku, slug, variants, .. } = doc;
    let base = IdentifierBase {
        product_name: name.as_str(),
        sku: sku.as_str(),
        slug: slug.as_str(),
    };
    apply_identifiers_to_all(variants, &base, policy, mode);
}

/// Derive status/published and SEO metadata. Never fails.
pub fn derive_status_and_seo(mut doc: ProductDocument, settings: &SeoSettings) -> ProductDocument {
    derive_product_status(&mut doc);
    doc.seo.synthesized = Some(synthesize(&doc, settings));
    doc
}

/// Full pre-persistence pass for a create/update submission.
///
/// Only validation can reject; derivation always succeeds.
pub fn prepare_for_save(
    mut doc: ProductDocument,
    settings: &CatalogSettings,
) -> Result<ProductDocument, FieldErrors> {
    normalize_structure(&mut doc);
    assign_identifiers(&mut doc, &settings.sku_policy, IdentifierMode::FillEmpty);

    if let Err(errors) = validate(&doc) {
        tracing::debug!(sku = %doc.sku, errors = %errors, "product rejected");
        return Err(errors);
    }

    Ok(derive_status_and_seo(doc, &settings.seo))
}

/// Mark every sellable unit archived and re-derive.
pub fn archive_document(mut doc: ProductDocument, settings: &SeoSettings) -> ProductDocument {
    match doc.product_structure {
        ProductStructure::Simple => doc.status = Some(UnitStatus::Archived),
        ProductStructure::Variant => {
            for variant in &mut doc.variants {
                variant.status = UnitStatus::Archived;
            }
        }
    }
    derive_status_and_seo(doc, settings)
}

/// Lift archived units back to draft and re-derive from stock figures.
///
/// Units stay unpublished until the admin publishes them again.
pub fn restore_document(mut doc: ProductDocument, settings: &SeoSettings) -> ProductDocument {
    let unarchive = |status: &mut UnitStatus| {
        if *status == UnitStatus::Archived {
            *status = UnitStatus::Draft;
        }
    };
    if let Some(status) = doc.status.as_mut() {
        unarchive(status);
    }
    for variant in &mut doc.variants {
        unarchive(&mut variant.status);
    }
    derive_status_and_seo(doc, settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combination::VariantAttributes;
    use crate::model::{Pricing, ProductType, Variant};
    use crate::seo::RobotsDirective;

    fn settings() -> CatalogSettings {
        CatalogSettings {
            seo: SeoSettings::new("https://shop.example.com"),
            sku_policy: SkuPolicy::default(),
        }
    }

    fn attrs(size: &str, color: &str) -> VariantAttributes {
        [("size", size), ("color", color)].into_iter().collect()
    }

    fn tee() -> ProductDocument {
        ProductDocument {
            name: "Classic Tee".to_string(),
            sku: "TSHIRT".to_string(),
            product_structure: ProductStructure::Variant,
            pricing: Some(Pricing { cost_price: Some(1), selling_price: Some(2) }),
            base_stock: Some(3),
            variants: vec![
                Variant {
                    attributes: attrs("M", "Red"),
                    stock: Some(10),
                    min_stock: Some(2),
                    published: true,
                    images: vec!["m-red.jpg".to_string()],
                    ..Variant::default()
                },
                Variant { attributes: attrs("L", "Red"), published: true, ..Variant::default() },
            ],
            ..ProductDocument::default()
        }
    }

    #[test]
    fn variant_product_is_normalized_identified_and_derived() {
        let doc = prepare_for_save(tee(), &settings()).unwrap();

        assert_eq!(doc.pricing, None);
        assert_eq!(doc.base_stock, None);
        assert_eq!(doc.slug, "classic-tee");

        let m = &doc.variants[0];
        assert_eq!(m.sku, "TSHIRT-M-RED");
        assert_eq!(m.slug, "classic-tee-m-red");
        assert_eq!(m.name, "Classic Tee - M Red");
        assert_eq!(m.status, UnitStatus::Selling);
        assert!(m.published);

        let l = &doc.variants[1];
        assert_eq!(l.status, UnitStatus::Draft);
        assert!(!l.published);

        assert_eq!(doc.status, None);
        assert_eq!(doc.published, None);

        let seo = doc.seo.synthesized.as_ref().unwrap();
        assert_eq!(seo.canonical_url, "https://shop.example.com/products/classic-tee");
        assert_eq!(seo.robots, RobotsDirective::IndexFollow);
        assert_eq!(seo.og_image.as_deref(), Some("m-red.jpg"));
        assert_eq!(seo.og_title, "Classic Tee");
    }

    #[test]
    fn simple_product_drops_variants() {
        let doc = ProductDocument {
            name: "Mug".to_string(),
            sku: "MUG".to_string(),
            pricing: Some(Pricing { cost_price: Some(300), selling_price: Some(900) }),
            base_stock: Some(20),
            min_stock: Some(5),
            published: Some(true),
            variants: vec![Variant::default()],
            ..ProductDocument::default()
        };
        let doc = prepare_for_save(doc, &settings()).unwrap();
        assert!(doc.variants.is_empty());
        assert_eq!(doc.status, Some(UnitStatus::Selling));
        assert_eq!(doc.seo.synthesized.unwrap().robots, RobotsDirective::IndexFollow);
    }

    #[test]
    fn manual_identifiers_survive_and_duplicates_abort() {
        let mut doc = tee();
        doc.variants[0].sku = "tshirt-m-red".to_string();
        doc.variants[1].sku = "TSHIRT-M-RED".to_string();
        let errors = prepare_for_save(doc, &settings()).unwrap_err();
        assert!(errors.get("variants[1].sku").is_some());
    }

    #[test]
    fn generated_sku_yields_to_a_manual_one() {
        let mut doc = tee();
        doc.variants[1].sku = "TSHIRT-M-RED".to_string();
        let doc = prepare_for_save(doc, &settings()).unwrap();
        assert_eq!(doc.variants[0].sku, "TSHIRT-M-RED-2");
        assert_eq!(doc.variants[1].sku, "TSHIRT-M-RED");
    }

    #[test]
    fn sibling_values_sharing_a_prefix_still_save() {
        let mut doc = tee();
        doc.variants[0].attributes = [("color", "Blue")].into_iter().collect();
        doc.variants[1].attributes = [("color", "Blush")].into_iter().collect();

        let once = prepare_for_save(doc, &settings()).unwrap();
        assert_eq!(once.variants[0].sku, "TSHIRT-BLU");
        assert_eq!(once.variants[1].sku, "TSHIRT-BLU-2");

        let twice = prepare_for_save(once.clone(), &settings()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn non_latin_name_falls_back_to_sku_slug() {
        let doc = ProductDocument {
            name: "Чайник".to_string(),
            sku: "KETTLE-01".to_string(),
            pricing: Some(Pricing { cost_price: Some(1000), selling_price: Some(2500) }),
            base_stock: Some(4),
            ..ProductDocument::default()
        };
        let doc = prepare_for_save(doc, &settings()).unwrap();
        assert_eq!(doc.slug, "kettle-01");
        assert_eq!(
            doc.seo.synthesized.unwrap().canonical_url,
            "https://shop.example.com/products/kettle-01"
        );
    }

    #[test]
    fn underivable_slug_is_rejected() {
        let doc = ProductDocument {
            name: "Чайник".to_string(),
            sku: "ЧАЙ".to_string(),
            pricing: Some(Pricing { cost_price: Some(1000), selling_price: Some(2500) }),
            ..ProductDocument::default()
        };
        let errors = prepare_for_save(doc, &settings()).unwrap_err();
        assert!(errors.get("slug").is_some());
    }

    #[test]
    fn digital_simple_product_sells_without_stock() {
        let doc = ProductDocument {
            name: "E-book".to_string(),
            sku: "EBOOK".to_string(),
            product_type: ProductType::Digital,
            pricing: Some(Pricing { cost_price: Some(0), selling_price: Some(500) }),
            published: Some(true),
            ..ProductDocument::default()
        };
        let doc = prepare_for_save(doc, &settings()).unwrap();
        assert_eq!(doc.status, Some(UnitStatus::Selling));
        assert_eq!(doc.seo.synthesized.unwrap().robots, RobotsDirective::IndexFollow);
    }

    #[test]
    fn derivation_is_idempotent() {
        let once = prepare_for_save(tee(), &settings()).unwrap();
        let twice = prepare_for_save(once.clone(), &settings()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn archive_then_restore() {
        let saved = prepare_for_save(tee(), &settings()).unwrap();

        let archived = archive_document(saved, &settings().seo);
        assert!(archived.variants.iter().all(|v| v.status == UnitStatus::Archived && !v.published));
        assert_eq!(archived.published, Some(false));
        assert_eq!(archived.seo.synthesized.as_ref().unwrap().robots, RobotsDirective::NoindexNofollow);

        let restored = restore_document(archived, &settings().seo);
        assert_eq!(restored.variants[0].status, UnitStatus::Selling);
        assert!(!restored.variants[0].published);
        assert_eq!(restored.variants[1].status, UnitStatus::Draft);
    }

    #[test]
    fn regenerate_mode_overwrites_manual_identifiers() {
        let mut doc = tee();
        doc.slug = "Old Slug".to_string();
        doc.variants[0].sku = "CUSTOM".to_string();

        assign_identifiers(&mut doc, &SkuPolicy::default(), IdentifierMode::FillEmpty);
        assert_eq!(doc.slug, "old-slug");
        assert_eq!(doc.variants[0].sku, "CUSTOM");

        assign_identifiers(&mut doc, &SkuPolicy::default(), IdentifierMode::Regenerate);
        assert_eq!(doc.slug, "classic-tee");
        assert_eq!(doc.variants[0].sku, "TSHIRT-M-RED");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: re-running the save pipeline on its own output changes nothing.
            #[test]
            fn prepare_for_save_is_idempotent(
                stocks in proptest::collection::vec((proptest::option::of(0i64..50), proptest::option::of(0i64..50), any::<bool>()), 0..6),
                digital in any::<bool>(),
            ) {
                let variants = stocks
                    .iter()
                    .enumerate()
                    .map(|(i, (stock, min, published))| Variant {
                        attributes: [("n", i.to_string())].into_iter().collect(),
                        stock: *stock,
                        min_stock: *min,
                        published: *published,
                        ..Variant::default()
                    })
                    .collect();
                let doc = ProductDocument {
                    name: "Prop".to_string(),
                    sku: "PROP".to_string(),
                    product_type: if digital { ProductType::Digital } else { ProductType::Physical },
                    product_structure: ProductStructure::Variant,
                    variants,
                    ..ProductDocument::default()
                };

                let once = prepare_for_save(doc, &settings()).unwrap();
                let twice = prepare_for_save(once.clone(), &settings()).unwrap();
                prop_assert_eq!(&once, &twice);

                if !once.has_sellable_variant() {
                    prop_assert_eq!(once.published, Some(false));
                }
                for v in &once.variants {
                    if v.status == UnitStatus::Draft {
                        prop_assert!(!v.published);
                    }
                }
            }
        }
    }
}
