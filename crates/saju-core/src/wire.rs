//! JSON wire format for a computed chart and its analysis.
//!
//! Field names are camelCase and pillars use the `cheongan`/`jiji`/`oheng`
//! vocabulary the rendering layer already consumes. Commentary fields
//! (`interpretation`, `aiReason`, `fortuneMessage`) are filled in by the
//! caller after the text-generation collaborator answers; they are absent
//! when it does not.

use serde::Serialize;

use crate::analysis::OhengAnalysis;
use crate::calendar::CivilDate;
use crate::element::{Element, ElementMap};
use crate::knowledge::{FoodRecommendation, KnowledgeTables, ToppingMetaphor};
use crate::pillar::{Pillar, SajuResult};

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WirePillar {
    pub cheongan: String,
    pub jiji: String,
    pub cheongan_hanja: String,
    pub jiji_hanja: String,
    pub oheng: [Element; 2],
}

impl From<&Pillar> for WirePillar {
    fn from(p: &Pillar) -> Self {
        Self {
            cheongan: p.stem.hangul().to_string(),
            jiji: p.branch.hangul().to_string(),
            cheongan_hanja: p.stem.hanja().to_string(),
            jiji_hanja: p.branch.hanja().to_string(),
            oheng: p.elements,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct WireSaju {
    pub year: WirePillar,
    pub month: WirePillar,
    pub day: WirePillar,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hour: Option<WirePillar>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct WireElementInfo {
    #[serde(rename = "type")]
    pub kind: Element,
    pub name: String,
    pub hanja: String,
    pub color: String,
    pub taste: String,
    pub organ: String,
    pub season: String,
    pub direction: String,
    pub characteristics: Vec<String>,
}

impl WireElementInfo {
    fn lookup(element: Element, tables: &KnowledgeTables) -> Self {
        let info = tables.element(element);
        Self {
            kind: element,
            name: info.name.clone(),
            hanja: info.hanja.clone(),
            color: info.color.clone(),
            taste: info.taste.clone(),
            organ: info.organ.clone(),
            season: info.season.clone(),
            direction: info.direction.clone(),
            characteristics: info.characteristics.clone(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WireOheng {
    pub balance: ElementMap<u32>,
    pub percentages: ElementMap<u32>,
    pub dominant: WireElementInfo,
    pub weak: WireElementInfo,
    pub boost: Element,
    pub balance_description: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WireFood {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_reason: Option<String>,
}

impl From<&FoodRecommendation> for WireFood {
    fn from(f: &FoodRecommendation) -> Self {
        Self {
            name: f.name.clone(),
            category: f.category.clone(),
            reason: f.reason.clone(),
            ai_reason: None,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WireFoodSection {
    pub recommended: Vec<WireFood>,
    pub avoid: Vec<WireFood>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fortune_message: Option<String>,
}

/// The full payload handed to the rendering layer.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChartReport {
    /// The day the boost element was computed for.
    pub today: String,
    pub saju: WireSaju,
    pub oheng: WireOheng,
    pub food: WireFoodSection,
    pub pizza_card: ToppingMetaphor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpretation: Option<String>,
}

impl ChartReport {
    pub fn build(
        saju: &SajuResult,
        analysis: &OhengAnalysis,
        tables: &KnowledgeTables,
        today: CivilDate,
    ) -> Self {
        Self {
            today: today.to_string(),
            saju: WireSaju {
                year: (&saju.year).into(),
                month: (&saju.month).into(),
                day: (&saju.day).into(),
                hour: saju.hour.as_ref().map(WirePillar::from),
            },
            oheng: WireOheng {
                balance: analysis.balance.counts().clone(),
                percentages: analysis.balance.percentages(),
                dominant: WireElementInfo::lookup(analysis.dominant, tables),
                weak: WireElementInfo::lookup(analysis.weak, tables),
                boost: analysis.boost,
                balance_description: analysis.balance_description.clone(),
            },
            food: WireFoodSection {
                recommended: analysis.recommended_foods.iter().map(WireFood::from).collect(),
                avoid: analysis.avoid_foods.iter().map(WireFood::from).collect(),
                fortune_message: None,
            },
            pizza_card: analysis.today_topping.clone(),
            interpretation: None,
        }
    }
}

/// Render a report as pretty-printed JSON.
pub fn export_json(report: &ChartReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}
