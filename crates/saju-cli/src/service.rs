//! Request validation and the compute → analyze → narrate pipeline shared
//! by the HTTP and MCP front doors.

use std::fmt;

use saju_core::{
    BirthInput, CalendarKind, ChartReport, CivilDate, KnowledgeTables, SajuError, analyze,
    compute_chart,
};
use serde_json::Value;

use crate::narrator::Narrator;

/// A chart request after coercion, before calendar validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRequest {
    pub year: i64,
    pub month: i64,
    pub day: i64,
    /// 0-23; -1 or `None` means unknown.
    pub hour: Option<i64>,
    /// 0-11 two-hour slot, used only when `hour` is unknown; -1 means unknown.
    pub siji: Option<i64>,
    pub gender: String,
    pub is_lunar: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    Missing(&'static str),
    NotAnInteger { field: &'static str, value: String },
    OutOfRange { field: &'static str, value: i64 },
    Chart(SajuError),
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::Missing(field) => write!(f, "missing required field '{field}'"),
            RequestError::NotAnInteger { field, value } => {
                write!(f, "field '{field}' must be an integer, got {value}")
            }
            RequestError::OutOfRange { field, value } => {
                write!(f, "field '{field}' is out of range: {value}")
            }
            RequestError::Chart(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for RequestError {}

impl From<SajuError> for RequestError {
    fn from(e: SajuError) -> Self {
        RequestError::Chart(e)
    }
}

/// Integer from a JSON number or a numeric string. Null and blank strings
/// count as absent.
pub fn coerce_int(field: &'static str, value: Option<&Value>) -> Result<Option<i64>, RequestError> {
    let not_int = |v: &Value| RequestError::NotAnInteger {
        field,
        value: v.to_string(),
    };
    let Some(v) = value else {
        return Ok(None);
    };
    match v {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s.trim().parse().map(Some).map_err(|_| not_int(v)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(Some(i)),
            None => match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(Some(f as i64)),
                _ => Err(not_int(v)),
            },
        },
        _ => Err(not_int(v)),
    }
}

fn require(field: &'static str, value: Option<&Value>) -> Result<i64, RequestError> {
    coerce_int(field, value)?.ok_or(RequestError::Missing(field))
}

fn narrow<T: TryFrom<i64>>(field: &'static str, value: i64) -> Result<T, RequestError> {
    T::try_from(value).map_err(|_| RequestError::OutOfRange { field, value })
}

impl ChartRequest {
    /// Build from a loosely-typed JSON object, the shape browser forms post.
    pub fn from_json(body: &Value) -> Result<Self, RequestError> {
        let year = require("year", body.get("year"))?;
        let month = require("month", body.get("month"))?;
        let day = require("day", body.get("day"))?;
        let hour = coerce_int("hour", body.get("hour"))?;
        let siji = coerce_int("siji", body.get("siji"))?;

        let gender = match body.get("gender") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            _ => return Err(RequestError::Missing("gender")),
        };
        let is_lunar = match body.get("isLunar") {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s == "true",
            _ => false,
        };

        Ok(Self {
            year,
            month,
            day,
            hour,
            siji,
            gender,
            is_lunar,
        })
    }

    /// Resolve the effective hour: explicit hour first, else `2 * siji`.
    pub fn effective_hour(&self) -> Result<Option<u32>, RequestError> {
        match self.hour {
            Some(-1) | None => {}
            Some(h) => return Ok(Some(narrow("hour", h)?)),
        }
        match self.siji {
            Some(-1) | None => Ok(None),
            Some(s @ 0..=11) => Ok(Some(2 * s as u32)),
            Some(s) => Err(RequestError::OutOfRange {
                field: "siji",
                value: s,
            }),
        }
    }

    pub fn birth_input(&self) -> Result<BirthInput, RequestError> {
        let calendar = if self.is_lunar {
            CalendarKind::Lunar
        } else {
            CalendarKind::Solar
        };
        let input = BirthInput::new(
            narrow("year", self.year)?,
            narrow("month", self.month)?,
            narrow("day", self.day)?,
            self.effective_hour()?,
        )?;
        Ok(input.with_calendar(calendar))
    }
}

pub struct AppState {
    tables: KnowledgeTables,
    narrator: Narrator,
}

impl AppState {
    pub fn new(tables: KnowledgeTables, narrator: Narrator) -> Self {
        Self { tables, narrator }
    }

    /// Compute the chart and analysis, then attach narrator commentary.
    /// Only validation can fail; narrator problems degrade to fallbacks.
    pub async fn chart(
        &self,
        request: &ChartRequest,
        today: CivilDate,
    ) -> Result<ChartReport, RequestError> {
        let input = request.birth_input()?;
        if input.calendar == CalendarKind::Lunar {
            tracing::warn!(
                "lunar date {} requested; no lunar conversion available, computing as solar",
                input.date
            );
        }

        let saju = compute_chart(&input);
        let analysis = analyze(&saju, today, &self.tables);
        let mut report = ChartReport::build(&saju, &analysis, &self.tables, today);
        tracing::debug!(
            "chart {} {} {} dominant={} weak={} boost={}",
            saju.year,
            saju.month,
            saju.day,
            saju.dominant,
            saju.weak,
            analysis.boost
        );

        let (interpretation, reasons) = tokio::join!(
            self.narrator.interpret(&saju, &request.gender, &self.tables),
            self.narrator.food_reasons(&analysis, &self.tables, today),
        );

        report.interpretation = Some(interpretation);
        for (food, reason) in report.food.recommended.iter_mut().zip(pad(&reasons.recommend_reasons)) {
            food.ai_reason = Some(reason.unwrap_or(&food.reason).to_string());
        }
        for (food, reason) in report.food.avoid.iter_mut().zip(pad(&reasons.avoid_reasons)) {
            food.ai_reason = Some(reason.unwrap_or(&food.reason).to_string());
        }
        report.food.fortune_message = Some(reasons.fortune_message);
        Ok(report)
    }
}

/// Non-empty reasons in order, then `None` forever.
fn pad(reasons: &[String]) -> impl Iterator<Item = Option<&str>> {
    reasons
        .iter()
        .map(|r| Some(r.as_str()).filter(|r| !r.trim().is_empty()))
        .chain(std::iter::repeat(None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state() -> AppState {
        AppState::new(saju_tables::load_default().unwrap(), Narrator::offline().unwrap())
    }

    fn today() -> CivilDate {
        CivilDate::new(2026, 1, 2).unwrap()
    }

    #[test]
    fn test_strings_and_ints_coerce_alike() {
        let a = ChartRequest::from_json(&json!({
            "year": "1990", "month": "5", "day": "15", "hour": "6", "gender": "male"
        }))
        .unwrap();
        let b = ChartRequest::from_json(&json!({
            "year": 1990, "month": 5, "day": 15, "hour": 6, "gender": "male"
        }))
        .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.effective_hour().unwrap(), Some(6));
    }

    #[test]
    fn test_missing_fields() {
        let err = ChartRequest::from_json(&json!({"month": 5, "day": 15, "gender": "male"}))
            .unwrap_err();
        assert_eq!(err, RequestError::Missing("year"));

        let err = ChartRequest::from_json(&json!({"year": 1990, "month": 5, "day": ""}))
            .unwrap_err();
        assert_eq!(err, RequestError::Missing("day"));

        let err = ChartRequest::from_json(&json!({"year": 1990, "month": 5, "day": 15}))
            .unwrap_err();
        assert_eq!(err, RequestError::Missing("gender"));
    }

    #[test]
    fn test_non_numeric_rejected() {
        let err = ChartRequest::from_json(&json!({
            "year": "nineteen", "month": 5, "day": 15, "gender": "f"
        }))
        .unwrap_err();
        assert!(matches!(err, RequestError::NotAnInteger { field: "year", .. }));

        let err = ChartRequest::from_json(&json!({
            "year": 1990.5, "month": 5, "day": 15, "gender": "f"
        }))
        .unwrap_err();
        assert!(matches!(err, RequestError::NotAnInteger { field: "year", .. }));
    }

    fn request(hour: Option<i64>, siji: Option<i64>) -> ChartRequest {
        ChartRequest {
            year: 1990,
            month: 5,
            day: 15,
            hour,
            siji,
            gender: "male".to_string(),
            is_lunar: false,
        }
    }

    #[test]
    fn test_hour_sentinel_means_unknown() {
        assert_eq!(request(Some(-1), None).effective_hour().unwrap(), None);
        assert_eq!(request(None, None).effective_hour().unwrap(), None);
    }

    #[test]
    fn test_siji_maps_to_even_hour() {
        // slot 0 stays a real hour
        assert_eq!(request(None, Some(0)).effective_hour().unwrap(), Some(0));
        assert_eq!(request(None, Some(3)).effective_hour().unwrap(), Some(6));
        assert_eq!(request(Some(-1), Some(11)).effective_hour().unwrap(), Some(22));
        assert_eq!(request(None, Some(-1)).effective_hour().unwrap(), None);
        // explicit hour wins
        assert_eq!(request(Some(13), Some(3)).effective_hour().unwrap(), Some(13));
        assert!(request(None, Some(12)).effective_hour().is_err());
    }

    #[test]
    fn test_invalid_values_carry_engine_error() {
        let err = request(Some(24), None).birth_input().unwrap_err();
        assert_eq!(err, RequestError::Chart(SajuError::InvalidHour(24)));

        let mut bad_date = request(None, None);
        bad_date.month = 2;
        bad_date.day = 30;
        assert!(matches!(
            bad_date.birth_input().unwrap_err(),
            RequestError::Chart(SajuError::InvalidDate { .. })
        ));

        let mut negative = request(None, None);
        negative.month = -3;
        assert!(matches!(
            negative.birth_input().unwrap_err(),
            RequestError::OutOfRange { field: "month", .. }
        ));
    }

    #[tokio::test]
    async fn test_chart_attaches_fallback_commentary() {
        let state = state();
        let report = state.chart(&request(Some(6), None), today()).await.unwrap();

        assert_eq!(report.saju.day.cheongan, "경");
        assert!(report.interpretation.is_some());
        assert!(report.food.fortune_message.is_some());
        for food in report.food.recommended.iter().chain(&report.food.avoid) {
            assert_eq!(food.ai_reason.as_deref(), Some(food.reason.as_str()));
        }
    }

    #[tokio::test]
    async fn test_lunar_is_computed_as_solar() {
        let state = state();
        let solar = state.chart(&request(Some(6), None), today()).await.unwrap();
        let mut lunar_request = request(Some(6), None);
        lunar_request.is_lunar = true;
        let lunar = state.chart(&lunar_request, today()).await.unwrap();
        assert_eq!(solar.saju, lunar.saju);
    }

    #[test]
    fn test_pad_fills_blanks() {
        let reasons = vec!["a".to_string(), " ".to_string()];
        let padded: Vec<Option<&str>> = pad(&reasons).take(3).collect();
        assert_eq!(padded, [Some("a"), None, None]);
    }
}
