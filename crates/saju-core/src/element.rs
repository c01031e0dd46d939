use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{Result, SajuError};

/// The five elemental categories (오행).
///
/// Declaration order is the canonical order: it is the iteration order of
/// every [`ElementMap`] and therefore the tie-break order of every stable
/// sort over a balance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Wood,
    Fire,
    Earth,
    Metal,
    Water,
}

impl Element {
    pub const ALL: [Element; 5] = [
        Element::Wood,
        Element::Fire,
        Element::Earth,
        Element::Metal,
        Element::Water,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Element::Wood => "wood",
            Element::Fire => "fire",
            Element::Earth => "earth",
            Element::Metal => "metal",
            Element::Water => "water",
        }
    }

    pub fn hangul(self) -> &'static str {
        match self {
            Element::Wood => "목",
            Element::Fire => "화",
            Element::Earth => "토",
            Element::Metal => "금",
            Element::Water => "수",
        }
    }

    pub fn hanja(self) -> &'static str {
        match self {
            Element::Wood => "木",
            Element::Fire => "火",
            Element::Earth => "土",
            Element::Metal => "金",
            Element::Water => "水",
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Element {
    type Err = SajuError;

    /// Accepts the English name (any case), the hangul name or the hanja glyph.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Element::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(s) || e.hangul() == s || e.hanja() == s)
            .ok_or_else(|| SajuError::UnknownElement(s.to_string()))
    }
}

/// A total mapping from [`Element`] to `T`: exactly one value per element,
/// iterated in canonical order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementMap<T> {
    values: [T; 5],
}

impl<T> ElementMap<T> {
    pub fn from_fn(f: impl FnMut(Element) -> T) -> Self {
        Self {
            values: Element::ALL.map(f),
        }
    }

    /// Build from keyed entries, failing on a repeated element or on the
    /// first element (in canonical order) that has no entry.
    pub fn try_from_entries(
        table: &'static str,
        entries: impl IntoIterator<Item = (Element, T)>,
    ) -> Result<Self> {
        let mut slots: [Option<T>; 5] = [None, None, None, None, None];
        for (element, value) in entries {
            let slot = &mut slots[element.index()];
            if slot.is_some() {
                return Err(SajuError::DuplicateElement { table, element });
            }
            *slot = Some(value);
        }

        let take = |slot: Option<T>, element: Element| {
            slot.ok_or(SajuError::MissingElement { table, element })
        };
        let [wood, fire, earth, metal, water] = slots;
        Ok(Self {
            values: [
                take(wood, Element::Wood)?,
                take(fire, Element::Fire)?,
                take(earth, Element::Earth)?,
                take(metal, Element::Metal)?,
                take(water, Element::Water)?,
            ],
        })
    }

    pub fn get(&self, element: Element) -> &T {
        &self.values[element.index()]
    }

    pub fn get_mut(&mut self, element: Element) -> &mut T {
        &mut self.values[element.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Element, &T)> {
        Element::ALL.into_iter().zip(self.values.iter())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.values.iter()
    }
}

impl<T: Default> Default for ElementMap<T> {
    fn default() -> Self {
        Self::from_fn(|_| T::default())
    }
}

impl<T> Index<Element> for ElementMap<T> {
    type Output = T;

    fn index(&self, element: Element) -> &T {
        self.get(element)
    }
}

impl<T> IndexMut<Element> for ElementMap<T> {
    fn index_mut(&mut self, element: Element) -> &mut T {
        self.get_mut(element)
    }
}

/// Serializes as a JSON object keyed by element name, in canonical order.
impl<T: Serialize> Serialize for ElementMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (element, value) in self.iter() {
            map.serialize_entry(element.as_str(), value)?;
        }
        map.end()
    }
}
