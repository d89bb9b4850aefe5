//! Hiring-manager review of an extracted CV: prompt construction per position category
//! and a single completion call that always yields Markdown text.

pub mod prompts;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::assessment::prompts::{build_system_prompt, USER_INPUT_PREFIX};
use crate::llm_client::{ChatCompletion, ChatRequest, LlmError};

pub const NOT_CONFIGURED_MESSAGE: &str = "OpenAI API ključ nije konfiguriran";

/// The role family a candidate is being assessed for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionCategory {
    #[default]
    General,
    Tech,
    Management,
    Sales,
    Marketing,
    Finance,
    Hr,
    Design,
}

impl PositionCategory {
    pub const ALL: [PositionCategory; 8] = [
        PositionCategory::General,
        PositionCategory::Tech,
        PositionCategory::Management,
        PositionCategory::Sales,
        PositionCategory::Marketing,
        PositionCategory::Finance,
        PositionCategory::Hr,
        PositionCategory::Design,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PositionCategory::General => "general",
            PositionCategory::Tech => "tech",
            PositionCategory::Management => "management",
            PositionCategory::Sales => "sales",
            PositionCategory::Marketing => "marketing",
            PositionCategory::Finance => "finance",
            PositionCategory::Hr => "hr",
            PositionCategory::Design => "design",
        }
    }

    /// Parses a form value. Missing or unknown labels fall back to `General`.
    pub fn from_label(label: Option<&str>) -> Self {
        let Some(label) = label else {
            return PositionCategory::General;
        };
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(label))
            .unwrap_or_default()
    }
}

/// Builds the completion request for one CV.
pub fn build_request(raw_data: &Value, category: PositionCategory) -> Result<ChatRequest, LlmError> {
    let data_json = serde_json::to_string_pretty(raw_data)?;
    Ok(ChatRequest::new(
        build_system_prompt(category),
        format!("{USER_INPUT_PREFIX}{data_json}"),
    ))
}

/// Generates the assessment Markdown. Never fails: every problem is reported as text
/// that ends up in the response in place of the assessment.
pub async fn generate_assessment(
    llm: Option<&dyn ChatCompletion>,
    raw_data: &Value,
    category: PositionCategory,
) -> String {
    let Some(llm) = llm else {
        return NOT_CONFIGURED_MESSAGE.to_string();
    };

    let result = match build_request(raw_data, category) {
        Ok(request) => llm.complete(&request).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(markdown) => markdown,
        Err(e) => {
            warn!("Assessment generation failed: {e}");
            format!("Greška pri obradi s OpenAI: {e}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::prompts::position_guidance;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct RecordingLlm {
        reply: Result<String, u16>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl RecordingLlm {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                reply: Err(status),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatCompletion for RecordingLlm {
        async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
            self.requests.lock().unwrap().push(request.clone());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(LlmError::Api {
                    status: *status,
                    message: "Rate limit reached".to_string(),
                }),
            }
        }
    }

    #[test]
    fn test_from_label_known_values() {
        assert_eq!(PositionCategory::from_label(Some("tech")), PositionCategory::Tech);
        assert_eq!(PositionCategory::from_label(Some("hr")), PositionCategory::Hr);
        assert_eq!(
            PositionCategory::from_label(Some(" Design ")),
            PositionCategory::Design
        );
    }

    #[test]
    fn test_from_label_unknown_or_missing_is_general() {
        assert_eq!(PositionCategory::from_label(None), PositionCategory::General);
        assert_eq!(
            PositionCategory::from_label(Some("astronaut")),
            PositionCategory::General
        );
        assert_eq!(PositionCategory::from_label(Some("")), PositionCategory::General);
    }

    #[test]
    fn test_tech_request_carries_only_tech_guidance() {
        let request = build_request(&json!({"ime": "Ana"}), PositionCategory::Tech).unwrap();
        let system = request.system_prompt().unwrap();
        assert!(system.contains(position_guidance(PositionCategory::Tech)));
        assert!(system.contains("(TECH)"));
        for other in PositionCategory::ALL
            .into_iter()
            .filter(|c| *c != PositionCategory::Tech)
        {
            assert!(!system.contains(position_guidance(other)));
        }
    }

    #[test]
    fn test_user_turn_is_pretty_json_with_unicode() {
        let data = json!({"ime": "Željko", "grad": "Čakovec"});
        let request = build_request(&data, PositionCategory::General).unwrap();
        let user = request.user_prompt().unwrap();
        assert!(user.starts_with("Ulazni JSON:\n{\n  \""));
        assert!(user.contains("Željko"));
        assert!(user.contains("Čakovec"));
    }

    #[tokio::test]
    async fn test_without_client_returns_not_configured() {
        let text = generate_assessment(None, &json!({}), PositionCategory::General).await;
        assert_eq!(text, NOT_CONFIGURED_MESSAGE);
    }

    #[tokio::test]
    async fn test_generated_text_returned_verbatim() {
        let llm = RecordingLlm::replying("# Ana Horvat\n\nNEPREPORUČUJEM kandidata.");
        let text = generate_assessment(Some(&llm), &json!({}), PositionCategory::Sales).await;
        assert_eq!(text, "# Ana Horvat\n\nNEPREPORUČUJEM kandidata.");
        assert_eq!(llm.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_completion_error_becomes_message() {
        let llm = RecordingLlm::failing(429);
        let text = generate_assessment(Some(&llm), &json!({}), PositionCategory::General).await;
        assert!(text.starts_with("Greška pri obradi s OpenAI: "));
        assert!(text.contains("Rate limit reached"));
    }
}
