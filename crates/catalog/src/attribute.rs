//! Product dimensions (size, color, ...) and the admin's selection of their values.
//!
//! Attributes are transient: they only drive the combination generator and are
//! never persisted as their own collection.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Attribute identifier (as issued by the admin UI / attribute catalog).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeId(pub String);

impl AttributeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for AttributeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named product dimension with an ordered set of allowed option strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: AttributeId,
    pub name: String,
    pub options: Vec<String>,
}

impl Attribute {
    /// Build an attribute, trimming options and dropping blanks and repeats
    /// (first occurrence wins, order preserved).
    pub fn new<I, S>(id: impl Into<String>, name: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for option in options {
            let option = option.into().trim().to_string();
            if !option.is_empty() && !out.contains(&option) {
                out.push(option);
            }
        }

        Self {
            id: AttributeId::new(id),
            name: name.into().trim().to_string(),
            options: out,
        }
    }

    pub fn allows(&self, value: &str) -> bool {
        self.options.iter().any(|o| o == value)
    }
}

/// Which values the admin ticked for each attribute.
///
/// Values keep the order they were selected in; the generator re-orders them
/// by the attribute's declared option order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeSelection(HashMap<AttributeId, Vec<String>>);

impl AttributeSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selected values of one attribute.
    pub fn select<I, S>(&mut self, attribute: &AttributeId, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selected: Vec<String> = Vec::new();
        for value in values {
            let value = value.into();
            if !selected.contains(&value) {
                selected.push(value);
            }
        }
        if selected.is_empty() {
            self.0.remove(attribute);
        } else {
            self.0.insert(attribute.clone(), selected);
        }
    }

    /// Tick or un-tick a single value. Returns whether it is now selected.
    pub fn toggle(&mut self, attribute: &AttributeId, value: &str) -> bool {
        let values = self.0.entry(attribute.clone()).or_default();
        let selected = if let Some(pos) = values.iter().position(|v| v == value) {
            values.remove(pos);
            false
        } else {
            values.push(value.to_string());
            true
        };
        if values.is_empty() {
            self.0.remove(attribute);
        }
        selected
    }

    pub fn values(&self, attribute: &AttributeId) -> &[String] {
        self.0.get(attribute).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// True when no attribute has any selected value.
    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trims_and_dedups_options() {
        let attr = Attribute::new("size", " Size ", [" S", "M", "", "S", "L "]);
        assert_eq!(attr.name, "Size");
        assert_eq!(attr.options, vec!["S", "M", "L"]);
        assert!(attr.allows("M"));
        assert!(!attr.allows("XL"));
    }

    #[test]
    fn select_replaces_and_empty_removes() {
        let size = AttributeId::new("size");
        let mut sel = AttributeSelection::new();
        assert!(sel.is_empty());

        sel.select(&size, ["S", "M", "S"]);
        assert_eq!(sel.values(&size), ["S", "M"]);

        sel.select(&size, Vec::<String>::new());
        assert!(sel.values(&size).is_empty());
        assert!(sel.is_empty());
    }

    #[test]
    fn toggle_adds_then_removes() {
        let color = AttributeId::new("color");
        let mut sel = AttributeSelection::new();

        assert!(sel.toggle(&color, "Red"));
        assert!(sel.toggle(&color, "Blue"));
        assert_eq!(sel.values(&color), ["Red", "Blue"]);

        assert!(!sel.toggle(&color, "Red"));
        assert!(!sel.toggle(&color, "Blue"));
        assert!(sel.is_empty());
    }
}
