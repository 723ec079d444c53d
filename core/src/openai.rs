use serde::{Deserialize, Serialize};

use crate::ai::ReplacementPrompt;

pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

#[derive(Debug, Serialize)]
pub struct ResponsesRequest<'a> {
    pub model: &'a str,
    pub input: Vec<InputMessage<'a>>,
}

#[derive(Debug, Serialize)]
pub struct InputMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

impl<'a> ResponsesRequest<'a> {
    /// System instruction, then the task, then the menu as its own message.
    #[must_use]
    pub fn for_prompt(model: &'a str, prompt: &'a ReplacementPrompt) -> Self {
        Self {
            model,
            input: vec![
                InputMessage {
                    role: "system",
                    content: &prompt.system,
                },
                InputMessage {
                    role: "user",
                    content: &prompt.instructions,
                },
                InputMessage {
                    role: "user",
                    content: &prompt.menu_json,
                },
            ],
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ResponsesResponse {
    #[serde(default)]
    pub output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
pub struct OutputItem {
    #[serde(default)]
    pub content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
pub struct ContentPart {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

impl ResponsesResponse {
    /// Concatenated text of every `output_text` part.
    #[must_use]
    pub fn output_text(&self) -> String {
        self.output
            .iter()
            .flat_map(|item| &item.content)
            .filter(|part| part.kind == "output_text")
            .filter_map(|part| part.text.as_deref())
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiError,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_message_order() {
        let prompt = ReplacementPrompt {
            system: "sys".to_string(),
            instructions: "do it".to_string(),
            menu_json: "{}".to_string(),
        };
        let body =
            serde_json::to_value(ResponsesRequest::for_prompt(DEFAULT_MODEL, &prompt)).unwrap();
        assert_eq!(body["model"], "gpt-4.1-mini");
        assert_eq!(body["input"][0]["role"], "system");
        assert_eq!(body["input"][1]["content"], "do it");
        assert_eq!(body["input"][2]["content"], "{}");
    }

    #[test]
    fn test_output_text_joins_text_parts() {
        let json = r#"{
            "id": "resp_1",
            "output": [
                {"type": "reasoning", "summary": []},
                {"type": "message", "role": "assistant", "content": [
                    {"type": "output_text", "text": "{\"replacements\":", "annotations": []},
                    {"type": "refusal", "refusal": "no"},
                    {"type": "output_text", "text": " []}"}
                ]}
            ]
        }"#;
        let resp: ResponsesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.output_text(), r#"{"replacements": []}"#);
    }

    #[test]
    fn test_output_text_empty() {
        let resp: ResponsesResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(resp.output_text(), "");
    }

    #[test]
    fn test_api_error_body() {
        let raw = r#"{"error": {"message": "Invalid API key", "type": "invalid_request_error"}}"#;
        let body: ApiErrorBody = serde_json::from_str(raw).unwrap();
        assert_eq!(body.error.message, "Invalid API key");
    }
}
