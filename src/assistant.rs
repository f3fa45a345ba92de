//! AI recommendation panel: a one-shot request/response cycle with defensive
//! decoding of the semi-structured response. The decode step never fails the
//! render; it only selects between the structured and opaque variants.

use serde::Deserialize;
use serde_json::Value;

use crate::model::{RecommendationRequest, course_detail_path};

pub const PANEL_TITLE: &str = "Your Personalized Course Recommendations";
pub const FAILURE_TITLE: &str = "Unable to Generate Recommendation";
pub const LOADING_MESSAGE: &str = "Generating personalized recommendations...";
pub const GENERIC_FAILURE: &str =
    "Sorry, we couldn't generate a recommendation at this time. Please try again.";

/// One recommended course with the model's reasoning and a detail-page link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CourseAdvice {
    pub course: String,
    pub reason: String,
    pub detail_path: String,
}

/// The two shapes a recommendation payload can decode into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecommendationOutcome {
    Structured(Vec<CourseAdvice>),
    Opaque(String),
}

/// Interpret the `recommendation` field, which may be a JSON-encoded string
/// or an already-structured object. Anything that does not match the
/// `{recommended_courses: [{course, reason}]}` shape falls back to plain
/// text rather than an error.
pub fn decode_recommendation(value: &Value) -> RecommendationOutcome {
    #[derive(Deserialize)]
    struct Shape {
        recommended_courses: Vec<Entry>,
    }
    #[derive(Deserialize)]
    struct Entry {
        course: String,
        reason: String,
    }

    let structured: Option<Shape> = match value {
        Value::String(s) => serde_json::from_str(s).ok(),
        Value::Object(_) => serde_json::from_value(value.clone()).ok(),
        _ => None,
    };

    if let Some(shape) = structured {
        let advice = shape
            .recommended_courses
            .into_iter()
            .map(|e| CourseAdvice {
                detail_path: course_detail_path(&e.course),
                course: e.course,
                reason: e.reason,
            })
            .collect();
        return RecommendationOutcome::Structured(advice);
    }

    RecommendationOutcome::Opaque(match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum PanelState {
    #[default]
    Hidden,
    Loading,
    Ready(RecommendationOutcome),
    Failed(String),
}

/// Stateless between submissions: submit replaces whatever was displayed,
/// dismiss clears the active display state.
#[derive(Debug, Default)]
pub struct RecommendationPanel {
    state: PanelState,
}

impl RecommendationPanel {
    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != PanelState::Hidden
    }

    /// Form submission: the panel switches to its loading placeholder and the
    /// returned request is what the caller POSTs to the AI endpoint.
    pub fn submit(&mut self, major: &str, goals: &str, priorities: &[String]) -> RecommendationRequest {
        self.state = PanelState::Loading;
        RecommendationRequest {
            major: major.to_string(),
            goals: goals.to_string(),
            priorities: priorities.to_vec(),
        }
    }

    pub fn apply_outcome(&mut self, outcome: anyhow::Result<Value>) {
        self.state = match outcome {
            Ok(value) => PanelState::Ready(decode_recommendation(&value)),
            Err(err) => {
                log::warn!("recommendation request failed: {err:#}");
                PanelState::Failed(err.to_string())
            }
        };
    }

    pub fn dismiss(&mut self) {
        self.state = PanelState::Hidden;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_encoded_string_decodes_to_cards() {
        let value = json!("{\"recommended_courses\":[{\"course\":\"CS101\",\"reason\":\"intro\"}]}");
        match decode_recommendation(&value) {
            RecommendationOutcome::Structured(advice) => {
                assert_eq!(advice.len(), 1);
                assert_eq!(advice[0].course, "CS101");
                assert_eq!(advice[0].reason, "intro");
                assert_eq!(advice[0].detail_path, "/course/CS101");
            }
            other => panic!("expected structured outcome, got {other:?}"),
        }
    }

    #[test]
    fn structured_object_decodes_without_reencoding() {
        let value = json!({
            "recommended_courses": [
                {"course": "CS 225", "reason": "core data structures"},
                {"course": "MATH 241", "reason": "multivariable calculus"},
            ]
        });
        match decode_recommendation(&value) {
            RecommendationOutcome::Structured(advice) => {
                assert_eq!(advice.len(), 2);
                assert_eq!(advice[1].detail_path, "/course/MATH%20241");
            }
            other => panic!("expected structured outcome, got {other:?}"),
        }
    }

    #[test]
    fn non_json_string_falls_back_to_plain_text() {
        let value = json!("Take CS101");
        assert_eq!(
            decode_recommendation(&value),
            RecommendationOutcome::Opaque("Take CS101".to_string())
        );
    }

    #[test]
    fn unexpected_shapes_are_stringified_not_errors() {
        let value = json!({"advice": "take something fun"});
        match decode_recommendation(&value) {
            RecommendationOutcome::Opaque(text) => {
                assert!(text.contains("take something fun"));
            }
            other => panic!("expected opaque outcome, got {other:?}"),
        }

        // Arrays and numbers stringify too.
        assert!(matches!(
            decode_recommendation(&json!([1, 2, 3])),
            RecommendationOutcome::Opaque(_)
        ));
    }

    #[test]
    fn panel_lifecycle_submit_resolve_dismiss() {
        let mut panel = RecommendationPanel::default();
        assert!(!panel.is_active());

        let req = panel.submit("CS", "graduate early", &["Lighter workload".to_string()]);
        assert_eq!(panel.state(), &PanelState::Loading);
        assert!(panel.is_active());
        assert_eq!(req.major, "CS");
        assert_eq!(req.priorities, ["Lighter workload"]);

        panel.apply_outcome(Ok(json!("Take CS101")));
        assert_eq!(
            panel.state(),
            &PanelState::Ready(RecommendationOutcome::Opaque("Take CS101".to_string()))
        );

        panel.dismiss();
        assert!(!panel.is_active());
    }

    #[test]
    fn failed_outcome_surfaces_the_message() {
        let mut panel = RecommendationPanel::default();
        panel.submit("CS", "goals", &[]);
        panel.apply_outcome(Err(anyhow::anyhow!("model quota exhausted")));
        assert_eq!(
            panel.state(),
            &PanelState::Failed("model quota exhausted".to_string())
        );
    }
}
