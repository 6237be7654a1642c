//! The guaranteed-valid answer used whenever generation fails.

use algoviz_core::artifact::{Extra, Highlight, SequenceStep, StepFrame};
use algoviz_core::{QueryResult, VisualizationArtifact, VisualizationKind};
use serde_json::Value;

const INTUITION: &str = "Bubble Sort is the simplest sorting algorithm that works by repeatedly swapping the adjacent elements if they are in wrong order. Imagine a bubble rising to the surface; in each pass, the largest unsorted element 'bubbles' to its correct position.";

const CODE: &str = "public class Demo {\n    public static void sort(int[] arr) {\n        // Basic Bubble Sort logic\n    }\n}";

/// A bubble-sort walkthrough explaining why the real answer is missing.
///
/// Only the message differs between reasons.
pub fn fallback(reason: &str) -> QueryResult {
    QueryResult {
        message: format!("# ⚠️ System Message\n{reason}\n\n# 💡 Intuition\n{INTUITION}"),
        code: CODE.to_string(),
        visualization: VisualizationArtifact {
            title: "Fallback Demo".into(),
            kind: VisualizationKind::Array,
            description: Some("A robust example to demonstrate the logic clearly.".into()),
            time_complexity: Some("O(N^2)".into()),
            space_complexity: Some("O(1)".into()),
            steps: vec![
                frame([8, 3, 11, 4, 1, 9, 2, 7], &[], "Initial setup."),
                frame([3, 8, 11, 4, 1, 9, 2, 7], &[0, 1], "Comparing 8 and 3."),
            ],
            extra: Extra::new(),
        },
        extra: Extra::new(),
    }
}

fn frame(state: [i64; 8], active: &[i64], description: &str) -> StepFrame {
    StepFrame::Sequence(SequenceStep {
        state: state.into_iter().map(Value::from).collect(),
        highlight: Highlight {
            description: Some(description.into()),
            active_indices: Some(active.to_vec()),
            ..Highlight::default()
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate;
    use serde_json::json;

    #[test]
    fn canonical_shape() {
        let result = fallback("Something broke.");
        assert!(result.message.contains("Something broke."));
        assert_eq!(result.visualization.kind, VisualizationKind::Array);
        assert_eq!(result.visualization.steps.len(), 2);

        let wire = serde_json::to_value(&result).unwrap();
        assert_eq!(wire["visualization"]["steps"][0]["state"], json!([8, 3, 11, 4, 1, 9, 2, 7]));
        assert_eq!(wire["visualization"]["steps"][0]["activeIndices"], json!([]));
        assert_eq!(wire["visualization"]["steps"][1]["activeIndices"], json!([0, 1]));
        assert_eq!(wire["visualization"]["timeComplexity"], "O(N^2)");
    }

    #[test]
    fn only_reason_differs() {
        let a = fallback("first reason");
        let b = fallback("second reason");
        assert_ne!(a.message, b.message);
        assert_eq!(a.code, b.code);
        assert_eq!(a.visualization, b.visualization);
        assert_eq!(
            a.message.replace("first reason", "second reason"),
            b.message
        );
    }

    #[test]
    fn passes_validation() {
        for reason in ["", "API key is missing", "timeout: 60s"] {
            let wire = serde_json::to_value(fallback(reason)).unwrap();
            let validated = validate(&wire).unwrap();
            assert_eq!(validated, fallback(reason));
        }
    }
}
