//! SKU / slug / display-name generation for variants.
//!
//! All generators are deterministic: the same base identifiers and attribute
//! map always produce the same output.

use core::str::FromStr;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use storefront_core::DomainError;

use crate::combination::{Combination, VariantAttributes};
use crate::model::Variant;

/// How much of each attribute value goes into a variant SKU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentLength {
    /// First `n` alphanumeric characters.
    Prefix(usize),
    /// The whole value (alphanumerics only).
    Full,
}

impl FromStr for SegmentLength {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("full") {
            return Ok(Self::Full);
        }
        match s.parse::<usize>() {
            Ok(0) => Err(DomainError::validation("SKU segment length must be positive")),
            Ok(n) => Ok(Self::Prefix(n)),
            Err(_) => Err(DomainError::validation(format!(
                "SKU segment length must be 'full' or a positive integer, got '{s}'"
            ))),
        }
    }
}

/// SKU composition rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuPolicy {
    pub separator: String,
    pub segment: SegmentLength,
}

impl Default for SkuPolicy {
    fn default() -> Self {
        Self {
            separator: "-".to_string(),
            segment: SegmentLength::Prefix(3),
        }
    }
}

/// Parent identifiers the variant identifiers are derived from.
#[derive(Debug, Clone, Copy)]
pub struct IdentifierBase<'a> {
    pub product_name: &'a str,
    pub sku: &'a str,
    pub slug: &'a str,
}

/// Whether generation may overwrite what is already there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierMode {
    /// Only blank fields are filled (automatic on save).
    FillEmpty,
    /// Every field is recomputed (explicit "regenerate" action).
    Regenerate,
}

/// Lowercase, hyphen-separated, `[a-z0-9-]` only.
///
/// Any other character becomes a hyphen; runs collapse and edges are trimmed.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

fn sku_segment(value: &str, segment: SegmentLength) -> String {
    let chars = value.chars().filter(|c| c.is_alphanumeric());
    let kept: String = match segment {
        SegmentLength::Prefix(n) => chars.take(n).collect(),
        SegmentLength::Full => chars.collect(),
    };
    kept.to_uppercase()
}

/// `BASE{sep}SEG1{sep}SEG2...`, uppercased.
pub fn variant_sku(base_sku: &str, attributes: &VariantAttributes, policy: &SkuPolicy) -> String {
    let base = base_sku.trim().to_uppercase();
    let parts = std::iter::once(base)
        .chain(attributes.values().map(|v| sku_segment(v, policy.segment)))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>();
    parts.join(&policy.separator)
}

/// Base slug followed by every attribute value, slugified.
pub fn variant_slug(base_slug: &str, attributes: &VariantAttributes) -> String {
    let mut raw = base_slug.to_string();
    for value in attributes.values() {
        raw.push(' ');
        raw.push_str(value);
    }
    slugify(&raw)
}

/// `"{product name} - {v1} {v2} ..."` in declared attribute order.
pub fn variant_name(product_name: &str, attributes: &VariantAttributes) -> String {
    let product_name = product_name.trim();
    let values = attributes
        .values()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    match (product_name.is_empty(), values.is_empty()) {
        (_, true) => product_name.to_string(),
        (true, false) => values,
        (false, false) => format!("{product_name} - {values}"),
    }
}

/// Anything carrying generated variant identifiers.
pub trait VariantIdentifiers {
    fn attributes(&self) -> &VariantAttributes;
    fn identifier_fields(&mut self) -> [&mut String; 3];
}

impl VariantIdentifiers for Combination {
    fn attributes(&self) -> &VariantAttributes {
        &self.attributes
    }

    fn identifier_fields(&mut self) -> [&mut String; 3] {
        [&mut self.sku, &mut self.slug, &mut self.name]
    }
}

impl VariantIdentifiers for Variant {
    fn attributes(&self) -> &VariantAttributes {
        &self.attributes
    }

    fn identifier_fields(&mut self) -> [&mut String; 3] {
        [&mut self.sku, &mut self.slug, &mut self.name]
    }
}

/// Fill (or regenerate) sku, slug and name of one unit.
pub fn apply_identifiers<T: VariantIdentifiers>(
    unit: &mut T,
    base: &IdentifierBase<'_>,
    policy: &SkuPolicy,
    mode: IdentifierMode,
) {
    let generated = {
        let attributes = unit.attributes();
        [
            variant_sku(base.sku, attributes, policy),
            variant_slug(base.slug, attributes),
            variant_name(base.product_name, attributes),
        ]
    };

    for (field, value) in unit.identifier_fields().into_iter().zip(generated) {
        if mode == IdentifierMode::Regenerate || field.trim().is_empty() {
            *field = value;
        }
    }
}

/// [`apply_identifiers`] over sibling units, keeping generated SKUs distinct.
///
/// A generated SKU that clashes with a manual one or with an earlier sibling
/// gets `{sep}2`, `{sep}3`, ... appended. Manual SKUs are never touched, so
/// duplicates among them are left for validation to report.
pub fn apply_identifiers_to_all<T: VariantIdentifiers>(
    units: &mut [T],
    base: &IdentifierBase<'_>,
    policy: &SkuPolicy,
    mode: IdentifierMode,
) {
    let generated: Vec<bool> = units
        .iter_mut()
        .map(|unit| {
            let [sku, ..] = unit.identifier_fields();
            mode == IdentifierMode::Regenerate || sku.trim().is_empty()
        })
        .collect();

    for unit in units.iter_mut() {
        apply_identifiers(unit, base, policy, mode);
    }

    let mut taken: HashSet<String> = units
        .iter_mut()
        .zip(&generated)
        .filter(|(_, is_generated)| !**is_generated)
        .map(|(unit, _)| {
            let [sku, ..] = unit.identifier_fields();
            sku.trim().to_uppercase()
        })
        .collect();

    for (unit, _) in units.iter_mut().zip(&generated).filter(|(_, is_generated)| **is_generated) {
        let [sku, ..] = unit.identifier_fields();
        if sku.is_empty() {
            continue;
        }
        let stem = sku.clone();
        let mut n = 2;
        while !taken.insert(sku.to_uppercase()) {
            *sku = format!("{stem}{}{n}", policy.separator);
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tee() -> VariantAttributes {
        [("size", "M"), ("color", "Red")].into_iter().collect()
    }

    fn base() -> IdentifierBase<'static> {
        IdentifierBase {
            product_name: "Classic Tee",
            sku: "TSHIRT",
            slug: "classic-tee",
        }
    }

    #[test]
    fn sku_is_uppercased_prefixes() {
        let policy = SkuPolicy::default();
        assert_eq!(variant_sku("TSHIRT", &tee(), &policy), "TSHIRT-M-RED");

        let long: VariantAttributes = [("size", "Extra Large"), ("color", "navy blue")].into_iter().collect();
        assert_eq!(variant_sku("tshirt", &long, &policy), "TSHIRT-EXT-NAV");

        let full = SkuPolicy {
            separator: "_".to_string(),
            segment: SegmentLength::Full,
        };
        assert_eq!(variant_sku("TSHIRT", &long, &full), "TSHIRT_EXTRALARGE_NAVYBLUE");
    }

    #[test]
    fn sku_is_idempotent() {
        let policy = SkuPolicy::default();
        let first = variant_sku("TSHIRT", &tee(), &policy);
        let second = variant_sku("TSHIRT", &tee(), &policy);
        assert_eq!(first, second);
    }

    #[test]
    fn sku_without_base_has_no_leading_separator() {
        assert_eq!(variant_sku("  ", &tee(), &SkuPolicy::default()), "M-RED");
    }

    #[test]
    fn slug_is_restricted_to_lowercase_alnum_and_hyphen() {
        let attrs: VariantAttributes = [("size", "XL / Tall"), ("color", "Café Noir")].into_iter().collect();
        let slug = variant_slug("classic-tee", &attrs);
        assert_eq!(slug, "classic-tee-xl-tall-caf-noir");
        assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
    }

    #[test]
    fn slugify_collapses_and_trims() {
        assert_eq!(slugify("  Hello,  World!! "), "hello-world");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn name_follows_declared_order() {
        assert_eq!(variant_name("Classic Tee", &tee()), "Classic Tee - M Red");
        assert_eq!(variant_name("Classic Tee", &VariantAttributes::new()), "Classic Tee");
        assert_eq!(variant_name("", &tee()), "M Red");
    }

    #[test]
    fn fill_empty_keeps_manual_edits() {
        let mut c = Combination::new(tee());
        c.sku = "MY-OWN-SKU".to_string();

        apply_identifiers(&mut c, &base(), &SkuPolicy::default(), IdentifierMode::FillEmpty);
        assert_eq!(c.sku, "MY-OWN-SKU");
        assert_eq!(c.slug, "classic-tee-m-red");
        assert_eq!(c.name, "Classic Tee - M Red");

        apply_identifiers(&mut c, &base(), &SkuPolicy::default(), IdentifierMode::Regenerate);
        assert_eq!(c.sku, "TSHIRT-M-RED");
    }

    fn colors(values: &[&str]) -> Vec<Combination> {
        values
            .iter()
            .map(|v| Combination::new([("color", *v)].into_iter().collect()))
            .collect()
    }

    #[test]
    fn clashing_generated_skus_get_an_index() {
        let base = IdentifierBase { product_name: "Tee", sku: "TEE", slug: "tee" };
        let mut units = colors(&["Blue", "Blush", "Black", "Blueberry"]);

        apply_identifiers_to_all(&mut units, &base, &SkuPolicy::default(), IdentifierMode::FillEmpty);
        let skus: Vec<_> = units.iter().map(|c| c.sku.as_str()).collect();
        assert_eq!(skus, ["TEE-BLU", "TEE-BLU-2", "TEE-BLA", "TEE-BLU-3"]);

        let again = units.clone();
        apply_identifiers_to_all(&mut units, &base, &SkuPolicy::default(), IdentifierMode::FillEmpty);
        assert_eq!(units, again);

        apply_identifiers_to_all(&mut units, &base, &SkuPolicy::default(), IdentifierMode::Regenerate);
        assert_eq!(units, again);
    }

    #[test]
    fn manual_skus_win_over_generated_ones() {
        let base = IdentifierBase { product_name: "Tee", sku: "TEE", slug: "tee" };
        let mut units = colors(&["Blue", "Blush", "!!", "??"]);
        units[1].sku = "tee-blu".to_string();

        apply_identifiers_to_all(&mut units, &base, &SkuPolicy::default(), IdentifierMode::FillEmpty);
        let skus: Vec<_> = units.iter().map(|c| c.sku.as_str()).collect();
        assert_eq!(skus, ["TEE-BLU-2", "tee-blu", "TEE", "TEE-2"]);
    }

    #[test]
    fn segment_length_parses() {
        assert_eq!("full".parse::<SegmentLength>().unwrap(), SegmentLength::Full);
        assert_eq!(" 2 ".parse::<SegmentLength>().unwrap(), SegmentLength::Prefix(2));
        assert!("0".parse::<SegmentLength>().is_err());
        assert!("abc".parse::<SegmentLength>().is_err());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: generated identifiers are stable across repeated generation.
            #[test]
            fn apply_identifiers_is_idempotent(
                sku in "[A-Za-z0-9]{0,12}",
                name in "[A-Za-z ]{0,30}",
                values in proptest::collection::vec("[A-Za-z0-9 /]{1,12}", 0..4)
            ) {
                let attrs: VariantAttributes = values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (format!("a{i}"), v.clone()))
                    .collect();
                let slug = slugify(&name);
                let base = IdentifierBase { product_name: &name, sku: &sku, slug: &slug };
                let policy = SkuPolicy::default();

                let mut once = Combination::new(attrs);
                apply_identifiers(&mut once, &base, &policy, IdentifierMode::Regenerate);
                let mut twice = once.clone();
                apply_identifiers(&mut twice, &base, &policy, IdentifierMode::Regenerate);
                prop_assert_eq!(&once, &twice);

                let mut filled = once.clone();
                apply_identifiers(&mut filled, &base, &policy, IdentifierMode::FillEmpty);
                prop_assert_eq!(&once, &filled);
                prop_assert!(once.slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            }
        }
    }
}
