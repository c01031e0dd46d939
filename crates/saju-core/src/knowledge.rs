//! Read-only reference records keyed by element: descriptive metadata,
//! food lists and "topping" metaphors.
//!
//! The records themselves are external configuration data; this module
//! only defines their shape and guarantees that a loaded table covers all
//! five elements.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::element::{Element, ElementMap};
use crate::error::Result;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodRecommendation {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub reason: String,
}

/// Descriptive metadata and food lists for one element.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ElementInfo {
    /// Display name, e.g. "금".
    pub name: String,
    /// Glyph, e.g. "金".
    pub hanja: String,
    pub color: String,
    pub taste: String,
    pub organ: String,
    pub season: String,
    pub direction: String,
    #[serde(default)]
    pub characteristics: Vec<String>,
    /// Foods that feed this element, best first.
    pub foods: Vec<FoodRecommendation>,
    /// Foods to avoid when this element is already strong, worst first.
    pub avoid_foods: Vec<FoodRecommendation>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ToppingMetaphor {
    pub topping: String,
    pub emoji: String,
    pub description: String,
    pub pizza_name: String,
    pub vibe: String,
}

/// The complete knowledge base. Construction fails if any element is
/// missing from either table, so every lookup afterwards is total.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KnowledgeTables {
    elements: ElementMap<ElementInfo>,
    toppings: ElementMap<ToppingMetaphor>,
}

impl KnowledgeTables {
    pub fn new(elements: ElementMap<ElementInfo>, toppings: ElementMap<ToppingMetaphor>) -> Self {
        Self { elements, toppings }
    }

    /// Build from keyed maps as they come out of a config file.
    pub fn from_maps(
        elements: HashMap<Element, ElementInfo>,
        toppings: HashMap<Element, ToppingMetaphor>,
    ) -> Result<Self> {
        Ok(Self {
            elements: ElementMap::try_from_entries("elements", elements)?,
            toppings: ElementMap::try_from_entries("toppings", toppings)?,
        })
    }

    pub fn element(&self, element: Element) -> &ElementInfo {
        &self.elements[element]
    }

    pub fn topping(&self, element: Element) -> &ToppingMetaphor {
        &self.toppings[element]
    }

    pub fn elements(&self) -> &ElementMap<ElementInfo> {
        &self.elements
    }

    pub fn toppings(&self) -> &ElementMap<ToppingMetaphor> {
        &self.toppings
    }
}
