//! Variant combination generation.
//!
//! The admin picks values per attribute; every tuple of the cartesian product
//! becomes a [`Combination`]. Regenerating after a selection change keeps the
//! combinations (and whatever was typed into them) whose attribute map still
//! exists, and drops the rest.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::attribute::{Attribute, AttributeId, AttributeSelection};
use crate::model::Variant;
use crate::status::UnitStatus;

/// Attribute name → value assignments of one variant, in declared attribute order.
///
/// Equality is map equality: two assignments are equal when they bind the same
/// names to the same values, whatever the order.
#[derive(Debug, Clone, Default)]
pub struct VariantAttributes(Vec<(String, String)>);

impl VariantAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `value`, replacing an existing binding in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Values in declared order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for VariantAttributes {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(n, v)| other.get(n) == Some(v))
    }
}

impl Eq for VariantAttributes {}

impl<K, V> FromIterator<(K, V)> for VariantAttributes
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for (k, v) in iter {
            attrs.insert(k, v);
        }
        attrs
    }
}

impl Serialize for VariantAttributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for VariantAttributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AttrsVisitor;

        impl<'de> Visitor<'de> for AttrsVisitor {
            type Value = VariantAttributes;

            fn expecting(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str("a map of attribute name to value")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut attrs = VariantAttributes::new();
                while let Some((name, value)) = access.next_entry::<String, String>()? {
                    attrs.insert(name, value);
                }
                Ok(attrs)
            }
        }

        deserializer.deserialize_map(AttrsVisitor)
    }
}

/// One generated tuple plus the fields the admin can fill in before saving.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Combination {
    pub attributes: VariantAttributes,
    pub sku: String,
    pub slug: String,
    pub name: String,
    pub cost_price: Option<u64>,
    pub selling_price: Option<u64>,
    pub stock: Option<i64>,
    pub min_stock: Option<i64>,
    pub images: Vec<String>,
    pub published: bool,
}

impl Combination {
    pub fn new(attributes: VariantAttributes) -> Self {
        Self {
            attributes,
            ..Self::default()
        }
    }

    pub fn from_variant(variant: &Variant) -> Self {
        Self {
            attributes: variant.attributes.clone(),
            sku: variant.sku.clone(),
            slug: variant.slug.clone(),
            name: variant.name.clone(),
            cost_price: variant.cost_price,
            selling_price: variant.selling_price,
            stock: variant.stock,
            min_stock: variant.min_stock,
            images: variant.images.clone(),
            published: variant.published,
        }
    }

    /// Turn into a persisted variant. Status starts as draft; the save-time
    /// derivation decides the real one.
    pub fn promote(self) -> Variant {
        Variant {
            sku: self.sku,
            slug: self.slug,
            name: self.name,
            cost_price: self.cost_price,
            selling_price: self.selling_price,
            stock: self.stock,
            min_stock: self.min_stock,
            status: UnitStatus::Draft,
            attributes: self.attributes,
            images: self.images,
            published: self.published,
        }
    }
}

/// Cartesian product over every attribute with at least one selected value.
///
/// Attributes are walked in declared order and their values in declared option
/// order. Selected values that are not allowed options are ignored; attributes
/// with nothing selected do not take part at all. No selection at all yields
/// an empty list.
pub fn cartesian(attributes: &[Attribute], selection: &AttributeSelection) -> Vec<VariantAttributes> {
    let mut axes: Vec<(&str, Vec<&str>)> = Vec::new();
    for attribute in attributes {
        let chosen = selection.values(&attribute.id);
        let values: Vec<&str> = attribute
            .options
            .iter()
            .filter(|o| chosen.contains(o))
            .map(String::as_str)
            .collect();
        if values.is_empty() {
            continue;
        }
        if axes.iter().any(|(name, _)| *name == attribute.name) {
            tracing::warn!(attribute = %attribute.id, name = %attribute.name, "duplicate attribute name skipped");
            continue;
        }
        axes.push((attribute.name.as_str(), values));
    }

    if axes.is_empty() {
        return Vec::new();
    }

    let mut tuples = vec![VariantAttributes::new()];
    for (name, values) in &axes {
        tuples = tuples
            .into_iter()
            .flat_map(|partial| {
                values.iter().map(move |value| {
                    let mut next = partial.clone();
                    next.insert(*name, *value);
                    next
                })
            })
            .collect();
    }
    tuples
}

/// Line up `generated` tuples with `existing` combinations.
///
/// Output follows the generated order. A combination whose attribute map equals
/// a generated tuple is carried over untouched (apart from adopting the
/// declared attribute order); unmatched existing combinations are dropped.
pub fn merge(existing: Vec<Combination>, generated: Vec<VariantAttributes>) -> Vec<Combination> {
    let mut pool: Vec<Option<Combination>> = existing.into_iter().map(Some).collect();

    generated
        .into_iter()
        .map(|attributes| {
            let kept = pool
                .iter_mut()
                .find(|slot| slot.as_ref().is_some_and(|c| c.attributes == attributes))
                .and_then(Option::take);
            match kept {
                Some(mut combination) => {
                    combination.attributes = attributes;
                    combination
                }
                None => Combination::new(attributes),
            }
        })
        .collect()
}

/// Lifecycle of the admin form's combination state.
///
/// While `Loading`, persisted variants are being pushed into the form and the
/// transient selection may momentarily be empty; that must not wipe them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorPhase {
    Loading,
    Ready,
}

/// Combination state behind the variant section of the product form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantGenerator {
    attributes: Vec<Attribute>,
    selection: AttributeSelection,
    combinations: Vec<Combination>,
    phase: GeneratorPhase,
}

impl VariantGenerator {
    /// Fresh form: nothing selected, ready for edits.
    pub fn new(attributes: Vec<Attribute>) -> Self {
        Self {
            attributes,
            selection: AttributeSelection::new(),
            combinations: Vec::new(),
            phase: GeneratorPhase::Ready,
        }
    }

    /// Start from persisted variants.
    ///
    /// The selection is rebuilt from the values the variants use (allowed
    /// options only) and the variants become the current combinations. The
    /// generator stays `Loading` until [`mark_ready`](Self::mark_ready).
    pub fn hydrate(attributes: Vec<Attribute>, variants: &[Variant]) -> Self {
        let mut selection = AttributeSelection::new();
        for attribute in &attributes {
            let used: Vec<&str> = attribute
                .options
                .iter()
                .map(String::as_str)
                .filter(|option| {
                    variants
                        .iter()
                        .any(|v| v.attributes.get(&attribute.name) == Some(*option))
                })
                .collect();
            selection.select(&attribute.id, used);
        }

        tracing::debug!(variants = variants.len(), "hydrated variant generator");

        Self {
            attributes,
            selection,
            combinations: variants.iter().map(Combination::from_variant).collect(),
            phase: GeneratorPhase::Loading,
        }
    }

    pub fn phase(&self) -> GeneratorPhase {
        self.phase
    }

    pub fn mark_ready(&mut self) {
        self.phase = GeneratorPhase::Ready;
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn selection(&self) -> &AttributeSelection {
        &self.selection
    }

    pub fn combinations(&self) -> &[Combination] {
        &self.combinations
    }

    pub fn combinations_mut(&mut self) -> &mut [Combination] {
        &mut self.combinations
    }

    /// Replace existing combinations wholesale (e.g. form state posted back).
    pub fn set_combinations(&mut self, combinations: Vec<Combination>) {
        self.combinations = combinations;
    }

    pub fn set_attributes(&mut self, attributes: Vec<Attribute>) {
        self.attributes = attributes;
        self.regenerate();
    }

    pub fn select<I, S>(&mut self, attribute: &AttributeId, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection.select(attribute, values);
        self.regenerate();
    }

    pub fn toggle(&mut self, attribute: &AttributeId, value: &str) -> bool {
        let selected = self.selection.toggle(attribute, value);
        self.regenerate();
        selected
    }

    pub fn replace_selection(&mut self, selection: AttributeSelection) {
        self.selection = selection;
        self.regenerate();
    }

    /// Rebuild combinations from the current selection.
    pub fn regenerate(&mut self) {
        if self.selection.is_empty() {
            match self.phase {
                GeneratorPhase::Loading => {
                    tracing::debug!("empty selection while loading; keeping combinations");
                }
                GeneratorPhase::Ready => self.combinations.clear(),
            }
            return;
        }

        let generated = cartesian(&self.attributes, &self.selection);
        if generated.is_empty() && self.phase == GeneratorPhase::Loading {
            tracing::debug!("selection matches no options while loading; keeping combinations");
            return;
        }
        let existing = std::mem::take(&mut self.combinations);
        self.combinations = merge(existing, generated);
    }

    pub fn into_variants(self) -> Vec<Variant> {
        self.combinations.into_iter().map(Combination::promote).collect()
    }
}
