//! Commentary from an OpenAI-compatible chat-completions endpoint.
//!
//! Purely decorative: the chart is complete before any call is made, and
//! every failure path (no key, transport error, bad status, unparseable
//! content) degrades to fixed fallback text instead of an error.

use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use regex::Regex;
use reqwest::Client;
use saju_core::{CivilDate, KnowledgeTables, OhengAnalysis, SajuResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::NarratorConfig;

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").unwrap());
static OUTER_OBJECT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

pub const INTERPRETATION_FALLBACK: &str = "오늘도 좋은 기운이 함께합니다! 🌟";

const INTERPRET_SYSTEM: &str =
    "당신은 친근하고 유쾌한 명리학 해설가입니다. 모든 해석을 긍정적이고 가볍게 전합니다.";
const FOOD_SYSTEM: &str =
    "당신은 음식과 오늘의 운세를 재치 있게 엮는 해설가입니다. 항상 JSON으로만 답합니다.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Per-food one-liners and a fortune message for today's food section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodReasons {
    #[serde(default)]
    pub recommend_reasons: Vec<String>,
    #[serde(default)]
    pub avoid_reasons: Vec<String>,
    #[serde(default)]
    pub fortune_message: String,
}

impl FoodReasons {
    /// Static reasons from the tables plus a topping-based fortune line.
    pub fn fallback(analysis: &OhengAnalysis) -> Self {
        Self {
            recommend_reasons: analysis.recommended_foods.iter().map(|f| f.reason.clone()).collect(),
            avoid_reasons: analysis.avoid_foods.iter().map(|f| f.reason.clone()).collect(),
            fortune_message: format!(
                "오늘의 {}(으)로 기운 충전! 🍕",
                analysis.today_topping.pizza_name
            ),
        }
    }
}

pub struct Narrator {
    client: Client,
    config: NarratorConfig,
}

impl Narrator {
    pub fn new(config: NarratorConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("failed to create HTTP client")?;
        Ok(Self { client, config })
    }

    /// A narrator that never calls out.
    #[cfg(test)]
    pub fn offline() -> Result<Self> {
        Self::new(NarratorConfig {
            enabled: false,
            ..NarratorConfig::default()
        })
    }

    fn api_key(&self) -> Option<&str> {
        if !self.config.enabled {
            return None;
        }
        self.config.api_key.as_deref().filter(|k| !k.is_empty())
    }

    pub fn is_active(&self) -> bool {
        self.api_key().is_some()
    }

    async fn complete(
        &self,
        system: &str,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String> {
        let Some(key) = self.api_key() else {
            bail!("narrator disabled or no API key configured");
        };
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let request = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens,
            temperature,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(key)
            .json(&request)
            .send()
            .await
            .context("chat completion request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("chat completion returned {status}: {body}");
        }

        let body: ChatResponse = response
            .json()
            .await
            .context("failed to parse chat completion response")?;
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .context("chat completion returned no content")
    }

    /// Two or three sentences of light commentary on the chart.
    pub async fn interpret(&self, saju: &SajuResult, gender: &str, tables: &KnowledgeTables) -> String {
        if !self.is_active() {
            tracing::debug!("narrator inactive, using fallback interpretation");
            return INTERPRETATION_FALLBACK.to_string();
        }
        let prompt = interpretation_prompt(saju, gender, tables);
        match self.complete(INTERPRET_SYSTEM, &prompt, 300, 0.8).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                tracing::warn!("interpretation failed: {e:#}");
                INTERPRETATION_FALLBACK.to_string()
            }
        }
    }

    /// Reasons for each recommended/avoided food and a fortune line.
    pub async fn food_reasons(
        &self,
        analysis: &OhengAnalysis,
        tables: &KnowledgeTables,
        today: CivilDate,
    ) -> FoodReasons {
        if !self.is_active() {
            tracing::debug!("narrator inactive, using fallback food reasons");
            return FoodReasons::fallback(analysis);
        }
        let prompt = food_prompt(analysis, tables, today);
        let content = match self.complete(FOOD_SYSTEM, &prompt, 400, 0.7).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("food reasons failed: {e:#}");
                return FoodReasons::fallback(analysis);
            }
        };
        match parse_json_lenient::<FoodReasons>(&content) {
            Some(mut reasons) => {
                if reasons.fortune_message.trim().is_empty() {
                    reasons.fortune_message = FoodReasons::fallback(analysis).fortune_message;
                }
                reasons
            }
            None => {
                tracing::warn!("unparseable food reasons: {content:?}");
                FoodReasons::fallback(analysis)
            }
        }
    }
}

fn gender_label(gender: &str) -> &'static str {
    match gender.trim().to_ascii_lowercase().as_str() {
        "male" | "m" | "남" | "남성" => "남성",
        "female" | "f" | "여" | "여성" => "여성",
        _ => "미상",
    }
}

pub fn interpretation_prompt(saju: &SajuResult, gender: &str, tables: &KnowledgeTables) -> String {
    let hour = saju
        .hour
        .map(|p| p.name())
        .unwrap_or_else(|| "미상".to_string());
    let dominant = tables.element(saju.dominant);
    let weak = tables.element(saju.weak);

    format!(
        "다음 사주를 바탕으로 재미있고 긍정적인 해석을 들려주세요.\n\n\
         - 년주: {}\n\
         - 월주: {}\n\
         - 일주: {}\n\
         - 시주: {}\n\
         - 성별: {}\n\
         - 가장 강한 오행: {}({})\n\
         - 보충이 필요한 오행: {}({})\n\n\
         2-3문장으로 짧게, 성격의 장점 하나와 오늘의 컨디션 한마디를 담아주세요. \
         점술처럼 딱딱하지 않게 친구에게 말하듯 써주세요.",
        saju.year.name(),
        saju.month.name(),
        saju.day.name(),
        hour,
        gender_label(gender),
        dominant.name,
        dominant.hanja,
        weak.name,
        weak.hanja,
    )
}

pub fn food_prompt(analysis: &OhengAnalysis, tables: &KnowledgeTables, today: CivilDate) -> String {
    let names = |foods: &[saju_core::FoodRecommendation]| {
        foods.iter().map(|f| f.name.as_str()).collect::<Vec<_>>().join(", ")
    };
    let dominant = tables.element(analysis.dominant);
    let weak = tables.element(analysis.weak);
    let boost = tables.element(analysis.boost);

    format!(
        "오늘 날짜: {}년 {}월 {}일\n\
         강한 오행: {}({})\n\
         보충 필요 오행: {}({})\n\
         오늘 보충할 오행: {}({})\n\
         추천 음식: {}\n\
         피할 음식: {}\n\n\
         아래 JSON 형식으로만 답해주세요:\n\
         {{\n  \"recommendReasons\": [\"추천 음식마다 20자 이내 이유\"],\n  \
         \"avoidReasons\": [\"피할 음식마다 20자 이내 이유\"],\n  \
         \"fortuneMessage\": \"오늘의 음식 운세 한마디 (30자 이내)\"\n}}\n\n\
         가볍고 재치 있게, 오행 이야기를 살짝 곁들여 주세요.",
        today.year(),
        today.month(),
        today.day(),
        dominant.name,
        dominant.hanja,
        weak.name,
        weak.hanja,
        boost.name,
        boost.hanja,
        names(&analysis.recommended_foods),
        names(&analysis.avoid_foods),
    )
}

/// Parse model output as JSON: verbatim, then inside a markdown code fence,
/// then the outermost `{...}` span.
pub fn parse_json_lenient<T: DeserializeOwned>(content: &str) -> Option<T> {
    let content = content.trim();
    if let Ok(value) = serde_json::from_str(content) {
        return Some(value);
    }
    if let Some(inner) = CODE_FENCE.captures(content).and_then(|c| c.get(1))
        && let Ok(value) = serde_json::from_str(inner.as_str())
    {
        return Some(value);
    }
    OUTER_OBJECT
        .find(content)
        .and_then(|m| serde_json::from_str(m.as_str()).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, routing::post};
    use saju_core::{Element, analyze, compute_pillars};

    fn tables() -> KnowledgeTables {
        saju_tables::load_default().unwrap()
    }

    fn fixture() -> (SajuResult, OhengAnalysis, CivilDate) {
        let today = CivilDate::new(2026, 1, 2).unwrap();
        let saju = compute_pillars(1990, 5, 15, Some(6)).unwrap();
        let analysis = analyze(&saju, today, &tables());
        (saju, analysis, today)
    }

    /// Serve a canned chat-completions reply on an ephemeral port.
    async fn mock_endpoint(content: &'static str) -> String {
        let app = Router::new().route(
            "/chat/completions",
            post(move || async move {
                Json(serde_json::json!({
                    "choices": [{ "message": { "role": "assistant", "content": content } }]
                }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn narrator_for(base_url: String) -> Narrator {
        Narrator::new(NarratorConfig {
            base_url,
            api_key: Some("test-key".to_string()),
            timeout_secs: 5,
            ..NarratorConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_parse_raw_json() {
        let parsed: FoodReasons = parse_json_lenient(
            r#"{"recommendReasons":["a","b","c"],"avoidReasons":["x"],"fortuneMessage":"good"}"#,
        )
        .unwrap();
        assert_eq!(parsed.recommend_reasons, ["a", "b", "c"]);
        assert_eq!(parsed.avoid_reasons, ["x"]);
        assert_eq!(parsed.fortune_message, "good");
    }

    #[test]
    fn test_parse_fenced_json() {
        let content = "Here you go:\n```json\n{\"fortuneMessage\": \"맛있는 하루\"}\n```\nEnjoy!";
        let parsed: FoodReasons = parse_json_lenient(content).unwrap();
        assert_eq!(parsed.fortune_message, "맛있는 하루");
        assert!(parsed.recommend_reasons.is_empty());
    }

    #[test]
    fn test_parse_embedded_object() {
        let content = "Sure! {\"fortuneMessage\": \"ok\", \"avoidReasons\": [\"y\"]} hope it helps";
        let parsed: FoodReasons = parse_json_lenient(content).unwrap();
        assert_eq!(parsed.avoid_reasons, ["y"]);
    }

    #[test]
    fn test_parse_garbage_is_none() {
        assert!(parse_json_lenient::<FoodReasons>("no json here").is_none());
        assert!(parse_json_lenient::<FoodReasons>("{ broken").is_none());
    }

    #[test]
    fn test_interpretation_prompt_content() {
        let (saju, _, _) = fixture();
        let prompt = interpretation_prompt(&saju, "female", &tables());
        assert!(prompt.contains("년주: 경오"));
        assert!(prompt.contains("일주: 경술"));
        assert!(prompt.contains("시주: 기묘"));
        assert!(prompt.contains("성별: 여성"));
        assert!(prompt.contains("가장 강한 오행: 금(金)"));
        assert!(prompt.contains("보충이 필요한 오행: 수(水)"));
    }

    #[test]
    fn test_interpretation_prompt_unknown_hour() {
        let saju = compute_pillars(1990, 5, 15, None).unwrap();
        let prompt = interpretation_prompt(&saju, "", &tables());
        assert!(prompt.contains("시주: 미상"));
        assert!(prompt.contains("성별: 미상"));
    }

    #[test]
    fn test_food_prompt_content() {
        let (_, analysis, today) = fixture();
        let tables = tables();
        let prompt = food_prompt(&analysis, &tables, today);
        assert!(prompt.contains("2026년 1월 2일"));
        assert!(prompt.contains("recommendReasons"));
        for food in &analysis.recommended_foods {
            assert!(prompt.contains(&food.name));
        }
    }

    #[test]
    fn test_food_prompt_names_weak_element_apart_from_boost() {
        let tables = tables();
        let today = CivilDate::new(2026, 1, 3).unwrap();
        let saju = compute_pillars(1990, 5, 15, Some(6)).unwrap();
        let analysis = analyze(&saju, today, &tables);
        assert_eq!(analysis.weak, Element::Water);
        assert_eq!(analysis.boost, Element::Wood);

        let prompt = food_prompt(&analysis, &tables, today);
        assert!(prompt.contains("강한 오행: 금(金)"));
        assert!(prompt.contains("보충 필요 오행: 수(水)"));
        assert!(prompt.contains("오늘 보충할 오행: 목(木)"));
    }

    #[tokio::test]
    async fn test_offline_uses_fallbacks() {
        let (saju, analysis, today) = fixture();
        let tables = tables();
        let narrator = Narrator::offline().unwrap();
        assert!(!narrator.is_active());

        assert_eq!(narrator.interpret(&saju, "male", &tables).await, INTERPRETATION_FALLBACK);
        let reasons = narrator.food_reasons(&analysis, &tables, today).await;
        assert_eq!(reasons, FoodReasons::fallback(&analysis));
        assert!(reasons.fortune_message.contains(&analysis.today_topping.pizza_name));
    }

    #[tokio::test]
    async fn test_key_without_enabled_is_inactive() {
        let narrator = Narrator::new(NarratorConfig {
            api_key: Some("k".to_string()),
            enabled: false,
            ..NarratorConfig::default()
        })
        .unwrap();
        assert!(!narrator.is_active());
    }

    #[tokio::test]
    async fn test_interpret_from_endpoint() {
        let (saju, _, _) = fixture();
        let narrator = narrator_for(mock_endpoint("  금의 기운이 반짝이는 하루!  ").await);
        let text = narrator.interpret(&saju, "male", &tables()).await;
        assert_eq!(text, "금의 기운이 반짝이는 하루!");
    }

    #[tokio::test]
    async fn test_food_reasons_from_fenced_reply() {
        let (_, analysis, today) = fixture();
        let reply = "```json\n{\"recommendReasons\":[\"r1\",\"r2\",\"r3\"],\"avoidReasons\":[\"a1\",\"a2\",\"a3\"],\"fortuneMessage\":\"f\"}\n```";
        let narrator = narrator_for(mock_endpoint(reply).await);
        let reasons = narrator.food_reasons(&analysis, &tables(), today).await;
        assert_eq!(reasons.recommend_reasons, ["r1", "r2", "r3"]);
        assert_eq!(reasons.fortune_message, "f");
    }

    #[tokio::test]
    async fn test_unparseable_reply_falls_back() {
        let (_, analysis, today) = fixture();
        let narrator = narrator_for(mock_endpoint("I cannot do that").await);
        let reasons = narrator.food_reasons(&analysis, &tables(), today).await;
        assert_eq!(reasons, FoodReasons::fallback(&analysis));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_falls_back() {
        let (saju, _, _) = fixture();
        // nothing listens on the discard port
        let narrator = narrator_for("http://127.0.0.1:9".to_string());
        assert_eq!(narrator.interpret(&saju, "male", &tables()).await, INTERPRETATION_FALLBACK);
    }
}
