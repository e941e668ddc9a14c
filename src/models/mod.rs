//! Data models for Medilens.

mod health;
mod report;

pub use health::HealthCheck;
pub use report::{
    normalize_confidence_score, AnalysisResponse, Explanation, Flag, TestResult, TestStatus,
    DISCLAIMER,
};
