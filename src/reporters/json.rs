//! JSON reporter
//!
//! Outputs the full RunSummary as pretty-printed JSON for piping to jq or
//! comparing runs.

use anyhow::Result;

use crate::pipeline::RunSummary;

/// Render summary as JSON
pub fn render(summary: &RunSummary) -> Result<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_summary;

    #[test]
    fn test_json_render_valid() {
        let json_str = render(&test_summary()).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");
        assert_eq!(parsed["backend"], "random-forest");
        assert_eq!(parsed["evaluation"]["accuracy"], 1.0);
        assert_eq!(parsed["load"]["dropped_invalid_label"], 1);
        assert_eq!(parsed["elapsed"], 1.5);
        assert_eq!(parsed["feature_importances"][0]["feature"], "length");
    }

    #[test]
    fn test_json_without_importances() {
        let mut summary = test_summary();
        summary.feature_importances = None;
        let parsed: serde_json::Value =
            serde_json::from_str(&render(&summary).expect("render JSON")).expect("parse JSON");
        assert!(parsed["feature_importances"].is_null());
    }
}
