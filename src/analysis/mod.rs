//! Medical report analysis.
//!
//! [`Analyzer`] sends an uploaded report to a vision model, extracts the
//! JSON from its reply and validates it into an [`AnalysisResponse`]. It
//! never fails: when there is no credential, or anything goes wrong, the
//! result is the sample report marked `is_mock`, and the [`Analysis`] value
//! records why.

mod extract;
mod fallback;
mod prompt;

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::llm::{GeminiClient, InlineDocument, LlmConfig, LlmError, VisionModel};
use crate::models::AnalysisResponse;

pub use extract::extract_json_block;
pub use fallback::{sample_report, sample_report_with_notice};
pub use prompt::REPORT_ANALYSIS_PROMPT;

/// Errors from a single analysis attempt.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("{0}")]
    Model(#[from] LlmError),

    #[error("Model reply is not valid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("Model reply does not match the report schema: {0}")]
    Schema(serde_json::Error),
}

/// Why a fallback report was served.
#[derive(Debug)]
pub enum FallbackReason {
    /// No API key configured; the model was never called.
    Unconfigured,
    /// The attempt failed.
    Failed(AnalysisError),
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackReason::Unconfigured => write!(f, "API key not configured"),
            FallbackReason::Failed(e) => write!(f, "{}", e),
        }
    }
}

/// Outcome of analyzing one document.
#[derive(Debug)]
pub enum Analysis {
    /// The model produced a valid report.
    Completed(AnalysisResponse),
    /// Substitute data was used.
    Fallback {
        reason: FallbackReason,
        response: AnalysisResponse,
    },
}

impl Analysis {
    fn unconfigured() -> Self {
        Analysis::Fallback {
            reason: FallbackReason::Unconfigured,
            response: sample_report(),
        }
    }

    fn failed(error: AnalysisError) -> Self {
        let response = sample_report_with_notice(&error.to_string());
        Analysis::Fallback {
            reason: FallbackReason::Failed(error),
            response,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Analysis::Fallback { .. })
    }

    pub fn response(&self) -> &AnalysisResponse {
        match self {
            Analysis::Completed(response) => response,
            Analysis::Fallback { response, .. } => response,
        }
    }

    /// The payload served to clients.
    pub fn into_response(self) -> AnalysisResponse {
        match self {
            Analysis::Completed(response) => response,
            Analysis::Fallback { response, .. } => response,
        }
    }
}

/// Analyzes uploaded medical reports with a vision model.
#[derive(Clone)]
pub struct Analyzer {
    model: Arc<dyn VisionModel>,
}

impl Analyzer {
    pub fn new(model: Arc<dyn VisionModel>) -> Self {
        Self { model }
    }

    /// Create an analyzer backed by Gemini.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let client = GeminiClient::new(config.clone())?;
        Ok(Self::new(Arc::new(client)))
    }

    pub fn model(&self) -> &dyn VisionModel {
        self.model.as_ref()
    }

    /// Analyze a document. Always yields a servable response.
    pub async fn analyze(&self, document: &[u8], media_type: &str) -> Analysis {
        if !self.model.is_available() {
            info!("API key not configured, serving sample report");
            return Analysis::unconfigured();
        }

        match self.try_analyze(document, media_type).await {
            Ok(response) => {
                info!(
                    "Analyzed {} document with {}: {} results",
                    media_type,
                    self.model.model_name(),
                    response.results.len()
                );
                Analysis::Completed(response)
            }
            Err(e) => {
                warn!("Report analysis failed, serving sample report: {}", e);
                Analysis::failed(e)
            }
        }
    }

    async fn try_analyze(
        &self,
        document: &[u8],
        media_type: &str,
    ) -> Result<AnalysisResponse, AnalysisError> {
        let reply = self
            .model
            .generate(
                REPORT_ANALYSIS_PROMPT,
                Some(InlineDocument::new(media_type, document)),
            )
            .await?;

        let json_text = extract_json_block(&reply);
        debug!("Model reply JSON: {}", json_text);

        parse_report(json_text)
    }
}

/// Parse and validate the JSON text of a model reply.
pub fn parse_report(json_text: &str) -> Result<AnalysisResponse, AnalysisError> {
    let value: serde_json::Value =
        serde_json::from_str(json_text).map_err(AnalysisError::InvalidJson)?;
    let mut response = AnalysisResponse::from_value(value).map_err(AnalysisError::Schema)?;
    // A real analysis is never mock data, whatever the model claims.
    response.is_mock = false;
    Ok(response)
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedModel;
    use super::*;
    use crate::models::{Flag, TestStatus};

    const GOOD_REPLY: &str = r#"Sure! Here is the report:
```json
{
    "results": [
        {"test_name": "Platelets", "value": "250", "unit": "x10^9/L", "reference_range": "150 - 400",
         "status": "Normal", "flag": "green", "visual_value": 55, "interpretation": "Normal platelet count."},
        {"test_name": "LDL", "value": "162", "unit": "mg/dL", "reference_range": "< 130",
         "status": "Needs Medical Attention", "flag": "yellow", "visual_value": 120, "interpretation": "High LDL."}
    ],
    "explanation": {
        "patient_summary": "Mostly fine, cholesterol is high.",
        "doctor_summary": "Elevated LDL, platelets normal.",
        "recommendations_patient": ["Reduce saturated fat"],
        "correlations_doctor": ["Consider lipid panel follow-up"],
        "confidence_score": 0.72
    }
}
```"#;

    fn analyzer(model: &Arc<ScriptedModel>) -> Analyzer {
        Analyzer::new(model.clone())
    }

    #[tokio::test]
    async fn test_unconfigured_serves_sample_without_calling_model() {
        let model = Arc::new(ScriptedModel::unavailable());
        let analysis = analyzer(&model).analyze(b"img", "image/png").await;

        assert_eq!(model.calls(), 0);
        assert!(matches!(
            analysis,
            Analysis::Fallback {
                reason: FallbackReason::Unconfigured,
                ..
            }
        ));
        let response = analysis.into_response();
        assert!(response.is_mock);
        assert_eq!(response.results, sample_report().results);
    }

    #[tokio::test]
    async fn test_successful_analysis() {
        let model = Arc::new(ScriptedModel::replying(GOOD_REPLY));
        let analysis = analyzer(&model).analyze(b"%PDF", "application/pdf").await;

        assert_eq!(model.calls(), 1);
        assert_eq!(model.last_media_type().as_deref(), Some("application/pdf"));
        assert!(!analysis.is_fallback());

        let response = analysis.into_response();
        assert!(!response.is_mock);
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[0].name, "Platelets");
        assert_eq!(response.results[1].status, TestStatus::NeedsMedicalAttention);
        assert_eq!(response.results[1].flag, Flag::Red);
        assert_eq!(response.results[1].visual_value, 100);
        assert_eq!(response.explanation.confidence_score, 72.0);
    }

    #[tokio::test]
    async fn test_model_error_serves_notice() {
        let model = Arc::new(ScriptedModel::failing(|| {
            LlmError::Connection("connection refused".to_string())
        }));
        let analysis = analyzer(&model).analyze(b"img", "image/jpeg").await;

        assert_eq!(model.calls(), 1);
        assert!(matches!(
            analysis,
            Analysis::Fallback {
                reason: FallbackReason::Failed(AnalysisError::Model(LlmError::Connection(_))),
                ..
            }
        ));
        let response = analysis.into_response();
        assert!(response.is_mock);
        assert!(response
            .explanation
            .patient_summary
            .contains("connection refused"));
    }

    #[tokio::test]
    async fn test_unparsable_reply_serves_notice() {
        let model = Arc::new(ScriptedModel::replying("I cannot read this image."));
        let analysis = analyzer(&model).analyze(b"img", "image/png").await;

        match &analysis {
            Analysis::Fallback {
                reason: FallbackReason::Failed(AnalysisError::InvalidJson(_)),
                response,
            } => {
                assert!(response.is_mock);
                assert!(response.explanation.patient_summary.contains("not valid JSON"));
            }
            other => panic!("unexpected analysis: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_schema_mismatch_serves_notice() {
        let model = Arc::new(ScriptedModel::replying(r#"{"results": [], "summary": "ok"}"#));
        let analysis = analyzer(&model).analyze(b"img", "image/png").await;

        assert!(matches!(
            analysis,
            Analysis::Fallback {
                reason: FallbackReason::Failed(AnalysisError::Schema(_)),
                ..
            }
        ));
        assert!(analysis.response().is_mock);
    }

    #[test]
    fn test_parse_report_clears_mock_flag() {
        let json = r#"{
            "results": [],
            "explanation": {
                "patient_summary": "p", "doctor_summary": "d",
                "recommendations_patient": [], "correlations_doctor": [],
                "confidence_score": 85
            },
            "is_mock": true
        }"#;
        let response = parse_report(json).unwrap();
        assert!(!response.is_mock);
        assert!(response.results.is_empty());
        assert_eq!(response.explanation.confidence_score, 85.0);
    }

    #[test]
    fn test_fallback_reason_display() {
        assert_eq!(
            FallbackReason::Unconfigured.to_string(),
            "API key not configured"
        );
        let reason = FallbackReason::Failed(AnalysisError::Model(LlmError::EmptyResponse));
        assert_eq!(reason.to_string(), "Model returned an empty response");
    }
}
