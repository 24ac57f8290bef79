//! AI intent advisor.
//!
//! Runs `Live` when an API key is configured and `Degraded` otherwise. A live
//! call that fails for any reason (transport, status, or a reply that does not
//! contain a usable analysis) is answered with the canned fallback, tagged
//! `source: "fallback"` so the UI can show it as low confidence.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::error::ScentreeError;
use crate::models::{AnalysisSource, IntentAnalysis};

pub const XAI_CHAT_URL: &str = "https://api.x.ai/v1/chat/completions";

const SYSTEM_PROMPT: &str = "You are Scentree AI, a risk-first Solana wallet assistant. \
Analyze user intent and portfolio. \
Reply with a single JSON object with the keys suggestion (string), reasoning (string), \
confidence (number between 0 and 1) and riskRating (integer between 1 and 100). \
Be concise and retail-friendly.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvisorMode {
    Live,
    Degraded,
}

#[derive(Debug, Clone)]
pub struct AiAdvisor {
    client: Client,
    api_url: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Shape the model is asked for. Field names vary between replies.
#[derive(Debug, Deserialize)]
struct LooseAnalysis {
    suggestion: Option<String>,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default, alias = "risk_rating", alias = "riskScore", alias = "risk_score")]
    #[serde(rename = "riskRating")]
    risk_rating: Option<f64>,
}

/// The canned reply served whenever no live analysis is available.
pub fn fallback_analysis() -> IntentAnalysis {
    IntentAnalysis {
        suggestion: "Rebalance towards SOL/USDC LP on Devnet.".to_string(),
        confidence: 0.85,
        risk_rating: 25,
        reasoning: "Your intent for 'Low Risk' matches the current Devnet stability analysis.".to_string(),
        source: AnalysisSource::Fallback,
    }
}

/// Pulls the first `{...}` span out of free-form model text.
fn extract_json_object(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    (end > start).then(|| &content[start..=end])
}

fn normalize(loose: LooseAnalysis) -> Option<IntentAnalysis> {
    let suggestion = loose.suggestion.filter(|s| !s.trim().is_empty())?;

    // Models sometimes answer confidence as a percentage
    let confidence = loose
        .confidence
        .filter(|c| c.is_finite())
        .map(|c| if c > 1.0 { c / 100.0 } else { c })
        .unwrap_or(0.5)
        .clamp(0.0, 1.0);
    let risk_rating = loose
        .risk_rating
        .filter(|r| r.is_finite())
        .map(|r| r.round().clamp(0.0, 100.0) as u8)
        .unwrap_or(50);

    Some(IntentAnalysis {
        suggestion,
        confidence,
        risk_rating,
        reasoning: loose.reasoning.unwrap_or_default(),
        source: AnalysisSource::Live,
    })
}

/// Interprets a chat-completions body, or a body that already is an analysis.
fn parse_analysis(body: &Value) -> Option<IntentAnalysis> {
    if let Ok(chat) = serde_json::from_value::<ChatResponse>(body.clone()) {
        let content = &chat.choices.first()?.message.content;
        let json = extract_json_object(content)?;
        let loose: LooseAnalysis = serde_json::from_str(json).ok()?;
        return normalize(loose);
    }
    serde_json::from_value::<LooseAnalysis>(body.clone())
        .ok()
        .and_then(normalize)
}

impl AiAdvisor {
    pub fn new(client: Client, api_url: &str, model: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            api_url: api_url.to_string(),
            model: model.to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    pub fn mode(&self) -> AdvisorMode {
        if self.api_key.is_some() {
            AdvisorMode::Live
        } else {
            AdvisorMode::Degraded
        }
    }

    /// Never fails; see the module docs for when the fallback is used.
    pub async fn analyze_intent(&self, intent: &str, portfolio: &Value) -> IntentAnalysis {
        let Some(api_key) = self.api_key.as_deref() else {
            debug!("No AI key configured, serving fallback analysis");
            return fallback_analysis();
        };

        match self.request_analysis(api_key, intent, portfolio).await {
            Ok(analysis) => analysis,
            Err(e) => {
                error!("AI Analysis Error: {}", e);
                fallback_analysis()
            }
        }
    }

    async fn request_analysis(
        &self,
        api_key: &str,
        intent: &str,
        portfolio: &Value,
    ) -> Result<IntentAnalysis, ScentreeError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: format!("Intent: {}\nPortfolio: {}", intent, portfolio),
                },
            ],
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ScentreeError::ApiError(format!("AI request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ScentreeError::ApiError(format!(
                "AI endpoint returned status {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ScentreeError::ApiError(format!("AI response is not JSON: {}", e)))?;

        parse_analysis(&body).ok_or_else(|| {
            warn!("AI response did not contain a usable analysis: {}", body);
            ScentreeError::ApiError("AI response did not contain a usable analysis".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chat_body(content: &str) -> String {
        json!({
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_no_key_is_degraded_fallback() {
        let advisor = AiAdvisor::new(Client::new(), XAI_CHAT_URL, "grok-beta", None);
        assert_eq!(advisor.mode(), AdvisorMode::Degraded);

        let analysis = advisor.analyze_intent("low risk", &json!({})).await;
        assert_eq!(analysis.source, AnalysisSource::Fallback);
        assert!((analysis.confidence - 0.85).abs() < f64::EPSILON);
        assert_eq!(analysis.risk_rating, 25);
    }

    #[tokio::test]
    async fn test_live_analysis_parsed() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("authorization", "Bearer secret")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(chat_body(
                "Here you go:\n```json\n{\"suggestion\":\"Stake SOL\",\"reasoning\":\"Low volatility\",\"confidence\":72,\"riskRating\":18}\n```",
            ))
            .create_async()
            .await;

        let advisor = AiAdvisor::new(Client::new(), &server.url(), "grok-beta", Some("secret".to_string()));
        assert_eq!(advisor.mode(), AdvisorMode::Live);

        let analysis = advisor.analyze_intent("safe yield", &json!({"sol": 2.0})).await;
        mock.assert_async().await;
        assert_eq!(analysis.source, AnalysisSource::Live);
        assert_eq!(analysis.suggestion, "Stake SOL");
        assert!((analysis.confidence - 0.72).abs() < 1e-9);
        assert_eq!(analysis.risk_rating, 18);
    }

    #[tokio::test]
    async fn test_upstream_failure_degrades() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server.mock("POST", "/").with_status(503).create_async().await;

        let advisor = AiAdvisor::new(Client::new(), &server.url(), "grok-beta", Some("secret".to_string()));
        let analysis = advisor.analyze_intent("anything", &json!(null)).await;
        assert_eq!(analysis, fallback_analysis());
    }

    #[tokio::test]
    async fn test_malformed_reply_fails_closed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(chat_body("I think you should buy more memecoins."))
            .create_async()
            .await;

        let advisor = AiAdvisor::new(Client::new(), &server.url(), "grok-beta", Some("secret".to_string()));
        let analysis = advisor.analyze_intent("yolo", &json!({})).await;
        assert_eq!(analysis.source, AnalysisSource::Fallback);
    }

    #[test]
    fn test_parse_direct_analysis_and_clamping() {
        let body = json!({"suggestion": "Hold", "confidence": 3.5, "risk_score": 140});
        let analysis = parse_analysis(&body).unwrap();
        assert!((analysis.confidence - 0.035).abs() < 1e-9);
        assert_eq!(analysis.risk_rating, 100);
        assert_eq!(analysis.reasoning, "");
    }

    #[test]
    fn test_extract_json_object() {
        assert_eq!(extract_json_object("x {\"a\":1} y"), Some("{\"a\":1}"));
        assert_eq!(extract_json_object("no json"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
    }
}
