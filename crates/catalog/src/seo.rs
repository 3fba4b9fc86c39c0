//! SEO metadata synthesis (canonical URL, robots, Open Graph).
//!
//! The admin's manual entries live in [`Seo`]; the synthesized result is
//! recomputed from scratch on every save and stored next to them, so running
//! the synthesizer again on unchanged input yields the same output.

use serde::{Deserialize, Serialize};

use crate::model::{ProductDocument, ProductStructure};

/// Open Graph title limit (characters, before the ellipsis marker).
pub const OG_TITLE_MAX: usize = 60;
/// Open Graph description limit (characters, before the ellipsis marker).
pub const OG_DESCRIPTION_MAX: usize = 157;
/// Appended when a value had to be cut.
pub const ELLIPSIS: &str = "...";

/// Storefront-wide SEO configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoSettings {
    base_url: String,
}

impl SeoSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn product_url(&self, slug: &str) -> String {
        format!("{}/products/{}", self.base_url, slug)
    }
}

impl Default for SeoSettings {
    fn default() -> Self {
        Self::new("http://localhost:3000")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RobotsDirective {
    #[serde(rename = "index,follow")]
    IndexFollow,
    #[serde(rename = "noindex,follow")]
    NoindexFollow,
    #[serde(rename = "noindex,nofollow")]
    NoindexNofollow,
}

impl RobotsDirective {
    /// Visible and buyable → index; visible only → keep links crawlable;
    /// hidden → neither.
    pub fn for_listing(published: bool, in_stock: bool) -> Self {
        match (published, in_stock) {
            (true, true) => Self::IndexFollow,
            (true, false) => Self::NoindexFollow,
            (false, _) => Self::NoindexNofollow,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IndexFollow => "index,follow",
            Self::NoindexFollow => "noindex,follow",
            Self::NoindexNofollow => "noindex,nofollow",
        }
    }
}

impl core::fmt::Display for RobotsDirective {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SEO section of a product: manual entries plus the synthesized output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Seo {
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub keywords: Vec<String>,
    /// Manual override.
    pub canonical_url: Option<String>,
    /// Manual override.
    pub robots: Option<RobotsDirective>,
    /// Manual override.
    pub og_image: Option<String>,
    /// Written by the synthesizer on save.
    pub synthesized: Option<SeoMetadata>,
}

/// Effective SEO values served to crawlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoMetadata {
    pub canonical_url: String,
    pub robots: RobotsDirective,
    pub og_title: String,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Cut `text` to `max` characters, appending [`ELLIPSIS`] when anything was cut.
pub fn truncate_with_ellipsis(text: &str, max: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max).collect();
    out.push_str(ELLIPSIS);
    out
}

fn first_image(doc: &ProductDocument) -> Option<String> {
    let from_variants = match doc.product_structure {
        ProductStructure::Variant => doc
            .variants
            .iter()
            .find_map(|v| v.images.iter().find(|i| !i.trim().is_empty())),
        ProductStructure::Simple => None,
    };
    from_variants
        .or_else(|| doc.images.iter().find(|i| !i.trim().is_empty()))
        .cloned()
}

/// Compute the effective SEO metadata of a product.
///
/// Expects the product's status to be derived already.
pub fn synthesize(doc: &ProductDocument, settings: &SeoSettings) -> SeoMetadata {
    let seo = &doc.seo;

    let canonical_url = non_blank(&seo.canonical_url)
        .map(str::to_string)
        .unwrap_or_else(|| settings.product_url(&doc.slug));

    let robots = seo
        .robots
        .unwrap_or_else(|| RobotsDirective::for_listing(doc.is_published(), doc.is_in_stock()));

    let og_title = truncate_with_ellipsis(
        non_blank(&seo.meta_title).unwrap_or(doc.name.as_str()),
        OG_TITLE_MAX,
    );

    let og_description = non_blank(&seo.meta_description)
        .or_else(|| non_blank(&doc.description))
        .map(|d| truncate_with_ellipsis(d, OG_DESCRIPTION_MAX));

    let og_image = non_blank(&seo.og_image)
        .map(str::to_string)
        .or_else(|| first_image(doc));

    SeoMetadata {
        canonical_url,
        robots,
        og_title,
        og_description,
        og_image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Variant;
    use crate::status::UnitStatus;

    fn settings() -> SeoSettings {
        SeoSettings::new("https://shop.example.com/")
    }

    fn simple(published: bool, stock: i64, min: i64) -> ProductDocument {
        ProductDocument {
            name: "Mug".to_string(),
            slug: "mug".to_string(),
            published: Some(published),
            base_stock: Some(stock),
            min_stock: Some(min),
            ..ProductDocument::default()
        }
    }

    #[test]
    fn canonical_uses_base_url_and_slug() {
        let meta = synthesize(&simple(true, 20, 5), &settings());
        assert_eq!(meta.canonical_url, "https://shop.example.com/products/mug");
    }

    #[test]
    fn manual_canonical_wins_unless_blank() {
        let mut doc = simple(true, 20, 5);
        doc.seo.canonical_url = Some("https://other.example.com/mug".to_string());
        assert_eq!(synthesize(&doc, &settings()).canonical_url, "https://other.example.com/mug");

        doc.seo.canonical_url = Some("   ".to_string());
        assert_eq!(
            synthesize(&doc, &settings()).canonical_url,
            "https://shop.example.com/products/mug"
        );
    }

    #[test]
    fn robots_for_simple_products() {
        assert_eq!(synthesize(&simple(true, 20, 5), &settings()).robots, RobotsDirective::IndexFollow);
        assert_eq!(synthesize(&simple(true, 3, 5), &settings()).robots, RobotsDirective::NoindexFollow);
        assert_eq!(
            synthesize(&simple(false, 20, 5), &settings()).robots,
            RobotsDirective::NoindexNofollow
        );
    }

    #[test]
    fn robots_for_variant_products() {
        let mut doc = ProductDocument {
            slug: "tee".to_string(),
            product_structure: ProductStructure::Variant,
            variants: vec![Variant {
                published: true,
                status: UnitStatus::OutOfStock,
                ..Variant::default()
            }],
            ..ProductDocument::default()
        };
        assert_eq!(synthesize(&doc, &settings()).robots, RobotsDirective::NoindexFollow);

        doc.variants[0].status = UnitStatus::Selling;
        assert_eq!(synthesize(&doc, &settings()).robots, RobotsDirective::IndexFollow);

        doc.variants[0].published = false;
        assert_eq!(synthesize(&doc, &settings()).robots, RobotsDirective::NoindexNofollow);
    }

    #[test]
    fn long_description_is_cut_to_157_plus_ellipsis() {
        let mut doc = simple(true, 20, 5);
        doc.seo.meta_description = Some("d".repeat(200));

        let og = synthesize(&doc, &settings()).og_description.unwrap();
        assert_eq!(og.chars().count(), OG_DESCRIPTION_MAX + ELLIPSIS.len());
        assert!(og.starts_with(&"d".repeat(157)));
        assert!(og.ends_with(ELLIPSIS));
    }

    #[test]
    fn title_falls_back_to_name_and_truncates() {
        let mut doc = simple(true, 20, 5);
        assert_eq!(synthesize(&doc, &settings()).og_title, "Mug");

        doc.seo.meta_title = Some("é".repeat(61));
        let title = synthesize(&doc, &settings()).og_title;
        assert_eq!(title, format!("{}{}", "é".repeat(60), ELLIPSIS));
    }

    #[test]
    fn short_values_are_untouched() {
        assert_eq!(truncate_with_ellipsis("exactly", 7), "exactly");
        assert_eq!(truncate_with_ellipsis("", 7), "");
    }

    #[test]
    fn og_image_prefers_first_variant_with_images() {
        let doc = ProductDocument {
            product_structure: ProductStructure::Variant,
            images: vec!["main.jpg".to_string()],
            variants: vec![
                Variant::default(),
                Variant { images: vec!["red.jpg".to_string(), "red-2.jpg".to_string()], ..Variant::default() },
            ],
            ..ProductDocument::default()
        };
        assert_eq!(synthesize(&doc, &settings()).og_image.as_deref(), Some("red.jpg"));

        let plain = ProductDocument { images: vec!["main.jpg".to_string()], ..ProductDocument::default() };
        assert_eq!(synthesize(&plain, &settings()).og_image.as_deref(), Some("main.jpg"));

        assert_eq!(synthesize(&ProductDocument::default(), &settings()).og_image, None);
    }

    #[test]
    fn synthesis_is_idempotent() {
        let mut doc = simple(true, 20, 5);
        doc.description = Some("A sturdy mug".to_string());
        let first = synthesize(&doc, &settings());
        doc.seo.synthesized = Some(first.clone());
        assert_eq!(synthesize(&doc, &settings()), first);
    }

    #[test]
    fn robots_directive_serializes_as_directive_string() {
        assert_eq!(
            serde_json::to_string(&RobotsDirective::NoindexFollow).unwrap(),
            r#""noindex,follow""#
        );
    }
}
