//! Lab report analysis models.
//!
//! These types are both the wire format served by `/api/analyze` and the
//! schema the vision model is asked to produce. Deserializing a model reply
//! into [`AnalysisResponse`] is the validation step: required fields must be
//! present and typed, `status`/`flag` must be known values, `visual_value` is
//! clamped and the confidence score is rescaled.

use serde::{Deserialize, Deserializer, Serialize};

/// Fixed disclaimer attached to every analysis.
pub const DISCLAIMER: &str = "This is an AI-generated explanation, not a medical diagnosis.";

/// Clinical classification of a single test result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum TestStatus {
    #[serde(rename = "Normal")]
    Normal,
    #[serde(rename = "Borderline")]
    Borderline,
    #[serde(rename = "Needs Medical Attention")]
    NeedsMedicalAttention,
}

impl TestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Borderline => "Borderline",
            Self::NeedsMedicalAttention => "Needs Medical Attention",
        }
    }

    /// Parse a status label, ignoring case and surrounding whitespace.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Some(Self::Normal),
            "borderline" => Some(Self::Borderline),
            "needs medical attention" => Some(Self::NeedsMedicalAttention),
            _ => None,
        }
    }

    /// The traffic-light flag that matches this status.
    pub fn flag(&self) -> Flag {
        match self {
            Self::Normal => Flag::Green,
            Self::Borderline => Flag::Yellow,
            Self::NeedsMedicalAttention => Flag::Red,
        }
    }
}

impl TryFrom<String> for TestStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value).ok_or_else(|| format!("unknown test status: {:?}", value))
    }
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Traffic-light severity of a single test result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Flag {
    Green,
    Yellow,
    Red,
}

impl Flag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "green" => Some(Self::Green),
            "yellow" => Some(Self::Yellow),
            "red" => Some(Self::Red),
            _ => None,
        }
    }
}

impl TryFrom<String> for Flag {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value).ok_or_else(|| format!("unknown flag: {:?}", value))
    }
}

impl std::fmt::Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One extracted lab measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawTestResult")]
pub struct TestResult {
    #[serde(rename = "test_name")]
    pub name: String,
    /// Value exactly as printed on the report (e.g. "11.5").
    pub value: String,
    pub unit: Option<String>,
    pub reference_range: Option<String>,
    pub status: TestStatus,
    pub flag: Flag,
    /// Gauge position, always within 0..=100.
    pub visual_value: u8,
    pub interpretation: String,
}

#[derive(Deserialize)]
struct RawTestResult {
    #[serde(rename = "test_name", alias = "name")]
    name: String,
    value: String,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    reference_range: Option<String>,
    status: TestStatus,
    flag: Flag,
    #[serde(deserialize_with = "deserialize_visual_value")]
    visual_value: u8,
    interpretation: String,
}

impl From<RawTestResult> for TestResult {
    fn from(raw: RawTestResult) -> Self {
        // Status is the classification the model reasons about; the flag follows it.
        let flag = raw.status.flag();
        if flag != raw.flag {
            tracing::debug!(
                "Flag {} does not match status {} for {}, using {}",
                raw.flag,
                raw.status,
                raw.name,
                flag
            );
        }

        Self {
            name: raw.name,
            value: raw.value,
            unit: raw.unit,
            reference_range: raw.reference_range,
            status: raw.status,
            flag,
            visual_value: raw.visual_value,
            interpretation: raw.interpretation,
        }
    }
}

fn deserialize_visual_value<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if raw.is_nan() {
        return Err(serde::de::Error::custom("visual_value is not a number"));
    }
    Ok(raw.trunc().clamp(0.0, 100.0) as u8)
}

/// Narrative summary of all results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub patient_summary: String,
    pub doctor_summary: String,
    pub recommendations_patient: Vec<String>,
    pub correlations_doctor: Vec<String>,
    /// Overall wellness index on a 0-100 scale (100 is perfect health).
    #[serde(deserialize_with = "deserialize_confidence_score")]
    pub confidence_score: f64,
}

fn deserialize_confidence_score<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if raw.is_nan() {
        return Err(serde::de::Error::custom("confidence_score is not a number"));
    }
    Ok(normalize_confidence_score(raw))
}

/// Bring a confidence score onto the 0-100 scale.
///
/// Anything at or below 1.0 is read as a fraction and multiplied by 100, then
/// truncated. A genuine score of 1 therefore becomes 100; the model is told
/// to answer with integers, so this only matters for replies that ignore it.
pub fn normalize_confidence_score(score: f64) -> f64 {
    let scaled = if score <= 1.0 {
        (score * 100.0).trunc()
    } else {
        score
    };
    scaled.clamp(0.0, 100.0)
}

/// Top-level payload returned for an analyzed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    /// Results in extraction order.
    pub results: Vec<TestResult>,
    pub explanation: Explanation,
    #[serde(default = "default_disclaimer")]
    pub disclaimer: String,
    /// True when the payload is substitute data rather than a real analysis.
    #[serde(default)]
    pub is_mock: bool,
}

fn default_disclaimer() -> String {
    DISCLAIMER.to_string()
}

impl AnalysisResponse {
    /// Build a response from a JSON value, validating it against the schema.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}
