//! Instruction prompt sent with every report.

/// Prompt asking the model to extract, classify and explain lab results as JSON.
pub const REPORT_ANALYSIS_PROMPT: &str = r#"ACT AS A MEDICAL AI EXPERT.
Analyze the provided medical report image/document.

TASK:
1. OCR & Extract: Identify all test names, numerical values, units, and reference ranges.
2. Analyze: Compare values to ranges. Determine status: "Normal", "Borderline", or "Needs Medical Attention".
3. Explain (Patient Mode): Summarize findings in simple, non-medical language.
4. Explain (Doctor Mode): Summarize with clinical terminology and correlations.

CRITICAL RULES:
- Output ONLY valid JSON.
- "flag" MUST be "green", "yellow", or "red" ("green" for Normal, "yellow" for Borderline, "red" for Needs Medical Attention).
- "visual_value": integer 0-100 (percentage).
- "confidence_score": integer 0-100 (representing the overall health score/wellness index, where 100 is perfect health).
- Keep "value" exactly as printed on the report.

SCHEMA:
{
    "results": [
        {"test_name": "...", "value": "...", "unit": "...", "reference_range": "...", "status": "...", "flag": "...", "visual_value": 50, "interpretation": "..."}
    ],
    "explanation": {
        "patient_summary": "...",
        "doctor_summary": "...",
        "recommendations_patient": ["..."],
        "correlations_doctor": ["..."],
        "confidence_score": 85
    }
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_pins_output_contract() {
        for needle in [
            "\"green\", \"yellow\", or \"red\"",
            "Needs Medical Attention",
            "\"visual_value\": integer 0-100",
            "\"confidence_score\": integer 0-100",
            "\"test_name\"",
            "\"correlations_doctor\"",
        ] {
            assert!(REPORT_ANALYSIS_PROMPT.contains(needle), "missing {}", needle);
        }
    }
}
