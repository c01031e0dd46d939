use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use saju_core::{CivilDate, export_json};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::service::{AppState, ChartRequest};

#[derive(Clone)]
pub struct SajuServer {
    state: Arc<AppState>,
    tool_router: ToolRouter<Self>,
}

impl SajuServer {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct SajuChartRequest {
    /// Birth year (proleptic Gregorian, any integer)
    year: i64,
    /// Birth month, 1-12
    month: i64,
    /// Birth day of month
    day: i64,
    /// Birth hour 0-23; omit or -1 when unknown
    hour: Option<i64>,
    /// Alternative to hour: two-hour slot index 0-11 (0 = 자시); -1 when unknown
    siji: Option<i64>,
    /// "male" or "female"; only shapes the commentary
    gender: String,
    /// Accepted for compatibility; lunar dates are computed as solar
    is_lunar: Option<bool>,
    /// Day to compute today's boost element for, YYYY-MM-DD (default: today, UTC)
    today: Option<String>,
}

#[tool_router]
impl SajuServer {
    #[tool(
        description = "Compute a Four Pillars (사주) chart for a birth date and optional hour. Returns the year/month/day/hour pillars, the five-element balance with dominant and weak elements, today's boost element with recommended and avoided foods, and a pizza-topping card, as JSON."
    )]
    async fn saju_chart(
        &self,
        Parameters(req): Parameters<SajuChartRequest>,
    ) -> Result<CallToolResult, McpError> {
        let today = match req.today.as_deref() {
            Some(s) => s
                .parse::<CivilDate>()
                .map_err(|e| McpError::invalid_params(e.to_string(), None))?,
            None => CivilDate::today_utc(),
        };
        if req.gender.trim().is_empty() {
            return Err(McpError::invalid_params("missing required field 'gender'", None));
        }
        let request = ChartRequest {
            year: req.year,
            month: req.month,
            day: req.day,
            hour: req.hour,
            siji: req.siji,
            gender: req.gender,
            is_lunar: req.is_lunar.unwrap_or(false),
        };

        let report = self
            .state
            .chart(&request, today)
            .await
            .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
        let json = export_json(&report).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

#[tool_handler]
impl ServerHandler for SajuServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Four Pillars (사주) calculator. Call saju_chart with a birth date (and hour or \
                 siji slot when known) to get the chart, its five-element balance and today's \
                 food and pizza recommendations. Results are deterministic for a given birth \
                 input and day."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
