use crate::element::{Element, ElementMap};
use crate::pillar::Pillar;

/// Element occurrence counts across a chart's pillars.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Balance {
    counts: ElementMap<u32>,
}

impl Balance {
    /// Count the stem element and the branch element of every pillar.
    pub fn tally<'a>(pillars: impl IntoIterator<Item = &'a Pillar>) -> Self {
        let mut counts = ElementMap::<u32>::default();
        for pillar in pillars {
            for element in pillar.elements {
                counts[element] += 1;
            }
        }
        Self { counts }
    }

    pub fn from_counts(counts: ElementMap<u32>) -> Self {
        Self { counts }
    }

    pub fn counts(&self) -> &ElementMap<u32> {
        &self.counts
    }

    pub fn count(&self, element: Element) -> u32 {
        self.counts[element]
    }

    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    /// Entries sorted by count, highest first. Stable: equal counts keep
    /// canonical order.
    pub fn ranked_desc(&self) -> Vec<(Element, u32)> {
        let mut entries: Vec<(Element, u32)> = self.counts.iter().map(|(e, &c)| (e, c)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }

    /// Entries sorted by count, lowest first. Stable: equal counts keep
    /// canonical order.
    pub fn ranked_asc(&self) -> Vec<(Element, u32)> {
        let mut entries: Vec<(Element, u32)> = self.counts.iter().map(|(e, &c)| (e, c)).collect();
        entries.sort_by(|a, b| a.1.cmp(&b.1));
        entries
    }

    /// First entry of the descending ranking: ties go to the earliest
    /// element in canonical order.
    pub fn dominant(&self) -> Element {
        self.ranked_desc()
            .first()
            .map_or(Element::Wood, |&(e, _)| e)
    }

    /// Last entry of the descending ranking: ties go to the latest
    /// element in canonical order.
    pub fn weakest(&self) -> Element {
        self.ranked_desc()
            .last()
            .map_or(Element::Water, |&(e, _)| e)
    }

    /// Share of the total for one element, in percent, rounded half up.
    /// Each element is rounded on its own, so the shares need not sum to 100.
    pub fn percentage(&self, element: Element) -> u32 {
        let total = self.total();
        if total == 0 {
            return 0;
        }
        (self.count(element) * 200 + total) / (2 * total)
    }

    pub fn percentages(&self) -> ElementMap<u32> {
        ElementMap::from_fn(|e| self.percentage(e))
    }
}
