//! Canned report served when a real analysis cannot be produced.

use crate::models::{AnalysisResponse, Explanation, Flag, TestResult, TestStatus, DISCLAIMER};

/// The sample Hemoglobin/WBC report, marked as mock data.
pub fn sample_report() -> AnalysisResponse {
    AnalysisResponse {
        results: vec![
            TestResult {
                name: "Hemoglobin".to_string(),
                value: "11.5".to_string(),
                unit: Some("g/dL".to_string()),
                reference_range: Some("13.5 - 17.5".to_string()),
                status: TestStatus::NeedsMedicalAttention,
                flag: Flag::Red,
                visual_value: 30,
                interpretation: "Low hemoglobin indicates potential anemia.".to_string(),
            },
            TestResult {
                name: "WBC Count".to_string(),
                value: "7.8".to_string(),
                unit: Some("x10^9/L".to_string()),
                reference_range: Some("4.5 - 11.0".to_string()),
                status: TestStatus::Normal,
                flag: Flag::Green,
                visual_value: 50,
                interpretation: "White blood cell count is within healthy range.".to_string(),
            },
        ],
        explanation: Explanation {
            patient_summary: "Your hemoglobin levels are lower than normal, which suggests you \
                might have anemia. This can cause fatigue and weakness. Your white blood cells \
                are normal, meaning no immediate sign of infection."
                .to_string(),
            doctor_summary: "Patient presents with mild anemia (Hb 11.5 g/dL). WBC count is \
                normal. Suggest evaluating Iron studies and Ferritin to rule out Iron Deficiency \
                Anemia."
                .to_string(),
            recommendations_patient: vec![
                "Eating iron-rich foods like spinach and red meat".to_string(),
                "Consulting a doctor about iron supplements".to_string(),
                "Resting if feeling fatigued".to_string(),
            ],
            correlations_doctor: vec![
                "Low Hb isolated, consistent with IDA".to_string(),
                "No leukocytosis".to_string(),
            ],
            confidence_score: 85.0,
        },
        disclaimer: DISCLAIMER.to_string(),
        is_mock: true,
    }
}

/// The sample report with the patient summary replaced by an error notice.
pub fn sample_report_with_notice(message: &str) -> AnalysisResponse {
    let mut report = sample_report();
    report.explanation.patient_summary = format!(
        "Error processing report: {}. Please ensure the document is clear and try again.",
        message
    );
    report
}
