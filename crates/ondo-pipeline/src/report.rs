//! Final report assembly.
//!
//! Combines the whole-image verdict, the region histogram, and the
//! advisory text into the externally visible analysis report. The
//! optional narrative elaboration is merged by the transport layer
//! after the fact; the numeric report is complete without it.

use serde::{Deserialize, Serialize, Serializer};

use crate::classify::ImageClassification;
use crate::types::RegionHistogram;

/// Externally visible result of analyzing one image.
///
/// Field names and rounding follow the service's wire contract, so
/// serializing this struct IS the response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Number of segmented regions.
    pub num_regions: usize,

    /// Whole-image temperature estimate. Rounded to two decimals on
    /// the wire; the in-memory value keeps full precision.
    #[serde(serialize_with = "round_two_decimals")]
    pub mean_temperature: f64,

    /// Whole-image condition text.
    pub condition: String,

    /// Per-tier region counts; always sums to `num_regions`.
    pub conditions: RegionHistogram,

    /// Advisory text for the requested body part at the image tier.
    pub implications: String,

    /// Optional elaboration from the narrative collaborator.
    #[serde(
        rename = "gemini_response",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub narrative: Option<String>,

    /// Non-fatal degradations encountered while producing the report.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl AnalysisReport {
    /// Assemble the report from the pipeline stage outputs.
    #[must_use]
    pub fn assemble(
        num_regions: usize,
        classification: ImageClassification,
        conditions: RegionHistogram,
        implications: String,
    ) -> Self {
        Self {
            num_regions,
            mean_temperature: classification.estimated_temperature,
            condition: classification.condition,
            conditions,
            implications,
            narrative: None,
            warnings: Vec::new(),
        }
    }
}

fn round_two_decimals<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64((value * 100.0).round() / 100.0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::classify::TemperatureTier;

    fn sample_report() -> AnalysisReport {
        AnalysisReport::assemble(
            3,
            ImageClassification {
                estimated_temperature: 31.234_56,
                tier: TemperatureTier::Normal,
                condition: "Normal temperature - No abnormalities detected.".to_owned(),
            },
            RegionHistogram {
                cold: 1,
                normal: 2,
                hot: 0,
            },
            "advisory".to_owned(),
        )
    }

    #[test]
    fn wire_temperature_rounds_to_two_decimals() {
        let json = serde_json::to_value(sample_report()).unwrap();
        assert_eq!(json["mean_temperature"], serde_json::json!(31.23));
    }

    #[test]
    fn integral_temperature_survives_rounding() {
        let mut report = sample_report();
        report.mean_temperature = 36.0;
        let json = serde_json::to_value(report).unwrap();
        assert_eq!(json["mean_temperature"], serde_json::json!(36.0));
    }

    #[test]
    fn narrative_field_uses_wire_name_and_is_omitted_when_absent() {
        let json = serde_json::to_value(sample_report()).unwrap();
        assert!(json.get("gemini_response").is_none());
        assert!(json.get("narrative").is_none());

        let mut report = sample_report();
        report.narrative = Some("elaboration".to_owned());
        let json = serde_json::to_value(report).unwrap();
        assert_eq!(json["gemini_response"], "elaboration");
    }

    #[test]
    fn warnings_omitted_when_empty() {
        let json = serde_json::to_value(sample_report()).unwrap();
        assert!(json.get("warnings").is_none());

        let mut report = sample_report();
        report.warnings.push("narrative unavailable".to_owned());
        let json = serde_json::to_value(report).unwrap();
        assert_eq!(json["warnings"][0], "narrative unavailable");
    }

    #[test]
    fn histogram_nested_under_conditions() {
        let json = serde_json::to_value(sample_report()).unwrap();
        assert_eq!(json["conditions"]["cold"], 1);
        assert_eq!(json["conditions"]["normal"], 2);
        assert_eq!(json["conditions"]["hot"], 0);
        assert_eq!(json["num_regions"], 3);
    }

    #[test]
    fn serde_round_trip() {
        let mut report = sample_report();
        report.narrative = Some("text".to_owned());
        // Rounding only affects the wire value, so round-trip through
        // a report whose temperature is already two decimals.
        report.mean_temperature = 31.23;
        let json = serde_json::to_string(&report).unwrap();
        let deserialized: AnalysisReport = serde_json::from_str(&json).unwrap();
        assert_eq!(report, deserialized);
    }
}
