//! Weather proxy: the one outbound dependency.
//!
//! No retries, no caching. A non-2xx upstream answer is passed through
//! with its status and message unchanged; a transport failure is a 502.
//! The only timeout is the shared client's.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::error::ApiError;
use crate::request::Request;
use crate::response::Json;

use super::AppState;

#[derive(Serialize)]
pub struct WeatherSummary {
    pub city_name: String,
    pub temperature: f64,
    pub description: String,
    pub icon: String,
}

fn upstream(message: impl Into<String>) -> ApiError {
    ApiError::Upstream { status: 502, message: message.into() }
}

/// GET /api/weather/{city}
pub async fn current(state: Arc<AppState>, req: Request) -> Result<Json<WeatherSummary>, ApiError> {
    let city = req.require_param("city")?;
    let key = state
        .config
        .weather_api_key
        .as_deref()
        .ok_or_else(|| ApiError::Internal("API key is not configured".into()))?;

    let url = format!("{}/weather", state.config.weather_base_url);
    let response = state
        .http
        .get(&url)
        .query(&[("q", city), ("appid", key), ("units", "metric")])
        .send()
        .await
        .map_err(|e| upstream(format!("weather service unreachable: {e}")))?;

    // Read the body as text first: an error answer is not guaranteed to
    // be JSON (gateways interpose HTML pages), and the upstream status
    // must survive either way.
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| upstream(format!("unreadable upstream response: {e}")))?;

    if !status.is_success() {
        warn!(status = status.as_u16(), city, "upstream weather error");
        return Err(ApiError::Upstream {
            status: status.as_u16(),
            message: error_message(&text),
        });
    }

    let body: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| upstream(format!("unreadable upstream response: {e}")))?;
    summarize(&body).ok_or_else(|| upstream("unexpected upstream payload shape"))
        .map(Json)
}

/// The provider reports errors as `{"message": …}`; anything else (an
/// HTML gateway page, an empty body) falls back to a trimmed snippet.
fn error_message(text: &str) -> String {
    if let Ok(body) = serde_json::from_str::<serde_json::Value>(text) {
        if let Some(message) = body.get("message").and_then(|m| m.as_str()) {
            return message.to_owned();
        }
    }
    let snippet: String = text.trim().chars().take(120).collect();
    if snippet.is_empty() {
        "Error fetching weather data".to_owned()
    } else {
        snippet
    }
}

/// Extracts the fields the clients actually use from the provider's
/// response document.
fn summarize(body: &serde_json::Value) -> Option<WeatherSummary> {
    let weather = body.get("weather")?.get(0)?;
    Some(WeatherSummary {
        city_name: body.get("name")?.as_str()?.to_owned(),
        temperature: body.get("main")?.get("temp")?.as_f64()?,
        description: weather.get("description")?.as_str()?.to_owned(),
        icon: weather.get("icon")?.as_str()?.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarizes_the_provider_document() {
        let body = serde_json::json!({
            "name": "London",
            "main": { "temp": 17.3 },
            "weather": [{ "description": "light rain", "icon": "10d" }]
        });
        let summary = summarize(&body).unwrap();
        assert_eq!(summary.city_name, "London");
        assert_eq!(summary.temperature, 17.3);
        assert_eq!(summary.description, "light rain");
        assert_eq!(summary.icon, "10d");
    }

    #[test]
    fn rejects_a_document_missing_fields() {
        let body = serde_json::json!({ "name": "London" });
        assert!(summarize(&body).is_none());
    }

    #[test]
    fn error_message_prefers_the_provider_field() {
        assert_eq!(error_message(r#"{"cod":"404","message":"city not found"}"#), "city not found");
    }

    #[test]
    fn error_message_falls_back_to_a_snippet_for_non_json() {
        assert_eq!(error_message("<html>502 Bad Gateway</html>"), "<html>502 Bad Gateway</html>");
        assert_eq!(error_message("   "), "Error fetching weather data");
    }
}
