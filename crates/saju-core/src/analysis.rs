//! Elemental Analyzer: balance → dominant/weak elements, today's boost
//! element, food recommendations and a one-sentence summary.

use crate::balance::Balance;
use crate::calendar::CivilDate;
use crate::constants::{BOOST_POOL, FOOD_PICKS};
use crate::element::Element;
use crate::knowledge::{FoodRecommendation, KnowledgeTables, ToppingMetaphor};
use crate::pillar::SajuResult;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OhengAnalysis {
    pub dominant: Element,
    pub weak: Element,
    /// Element to reinforce today.
    pub boost: Element,
    pub balance: Balance,
    pub recommended_foods: Vec<FoodRecommendation>,
    pub avoid_foods: Vec<FoodRecommendation>,
    pub today_topping: ToppingMetaphor,
    pub balance_description: String,
}

/// Pick today's boost element: one of the two lowest-count elements
/// (ascending stable sort), alternating with the parity of the day of year.
pub fn today_boost(balance: &Balance, today: CivilDate) -> Element {
    let weakest: Vec<Element> = balance
        .ranked_asc()
        .into_iter()
        .take(BOOST_POOL)
        .map(|(e, _)| e)
        .collect();
    let pick = today.day_of_year() as usize % BOOST_POOL;
    weakest[pick]
}

/// Two-clause summary naming the strongest and weakest element by share:
/// "당신의 사주는 金(금) 기운이 38%로 가장 강하고, 水(수) 기운이 0%로 보충이 필요합니다."
pub fn balance_description(balance: &Balance, tables: &KnowledgeTables) -> String {
    let mut shares: Vec<(Element, u32)> = balance.percentages().iter().map(|(e, &p)| (e, p)).collect();
    shares.sort_by(|a, b| b.1.cmp(&a.1));

    let (strong, strong_pct) = shares[0];
    let (weak, weak_pct) = shares[shares.len() - 1];
    let strong_info = tables.element(strong);
    let weak_info = tables.element(weak);

    format!(
        "당신의 사주는 {}({}) 기운이 {}%로 가장 강하고, {}({}) 기운이 {}%로 보충이 필요합니다.",
        strong_info.hanja, strong_info.name, strong_pct, weak_info.hanja, weak_info.name, weak_pct
    )
}

fn first_n(foods: &[FoodRecommendation], n: usize) -> Vec<FoodRecommendation> {
    foods.iter().take(n).cloned().collect()
}

/// Analyze a chart against the knowledge tables for a given day.
///
/// Dominant and weak elements depend only on the chart; `today` only moves
/// the boost element (and therefore the recommended foods and topping).
pub fn analyze(saju: &SajuResult, today: CivilDate, tables: &KnowledgeTables) -> OhengAnalysis {
    let boost = today_boost(&saju.balance, today);

    OhengAnalysis {
        dominant: saju.dominant,
        weak: saju.weak,
        boost,
        balance: saju.balance.clone(),
        recommended_foods: first_n(&tables.element(boost).foods, FOOD_PICKS),
        avoid_foods: first_n(&tables.element(saju.dominant).avoid_foods, FOOD_PICKS),
        today_topping: tables.topping(boost).clone(),
        balance_description: balance_description(&saju.balance, tables),
    }
}
