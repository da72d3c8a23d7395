use serde::{Deserialize, Serialize};

/// Chat completion request sent to the upstream API
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Individual message in the request
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

impl<'a> ChatMessage<'a> {
    pub fn system(content: &'a str) -> Self {
        Self {
            role: "system",
            content,
        }
    }

    pub fn user(content: &'a str) -> Self {
        Self {
            role: "user",
            content,
        }
    }
}

/// Response from the chat completion API
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: Option<ChoiceMessage>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    /// Some providers send `null` content when the completion was filtered
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    /// Text of the first choice, if it has any non-blank content
    pub fn first_text(&self) -> Option<&str> {
        self.choices
            .first()?
            .message
            .as_ref()?
            .content
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Why the first choice stopped, e.g. `length` or `content_filter`
    pub fn finish_reason(&self) -> Option<&str> {
        self.choices.first()?.finish_reason.as_deref()
    }
}

/// Body of `POST /api/weather`
///
/// Either `city` + `state` (optionally with `zip`), a bare `zip`, or a
/// free-text `location` typed by the user.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct WeatherRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Successful weather response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub report: String,
    pub cached: bool,
}

/// Query string of `GET /api/suggest`
#[derive(Debug, Default, Deserialize)]
pub struct SuggestQuery {
    #[serde(default)]
    pub q: Option<String>,
}

/// Response of `GET /api/suggest`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestResponse {
    pub suggestions: Vec<String>,
}

/// Error body shared by every endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_text() {
        let body = r#"{
            "id": "gen-1",
            "choices": [
                {"message": {"role": "assistant", "content": "  CURRENT CONDITIONS\nSunny  "}, "finish_reason": "stop"},
                {"message": {"role": "assistant", "content": "ignored"}}
            ]
        }"#;
        let response: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.first_text(), Some("CURRENT CONDITIONS\nSunny"));
    }

    #[test]
    fn test_first_text_missing() {
        for body in [
            r#"{"choices": []}"#,
            r#"{}"#,
            r#"{"choices": [{"message": {"content": null}}]}"#,
            r#"{"choices": [{"message": {"content": "   "}}]}"#,
            r#"{"choices": [{"finish_reason": "length"}]}"#,
        ] {
            let response: ChatResponse = serde_json::from_str(body).unwrap();
            assert_eq!(response.first_text(), None, "body: {}", body);
        }
    }

    #[test]
    fn test_finish_reason() {
        let response: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"content": null}, "finish_reason": "content_filter"}]}"#)
                .unwrap();
        assert_eq!(response.finish_reason(), Some("content_filter"));

        let response: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert_eq!(response.finish_reason(), None);
    }

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            model: "openai/gpt-4o-mini",
            messages: vec![ChatMessage::system("sys"), ChatMessage::user("hi")],
            max_tokens: 100,
            temperature: 0.5,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "openai/gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
        assert_eq!(json["max_tokens"], 100);
    }

    #[test]
    fn test_weather_request_accepts_partial_bodies() {
        let req: WeatherRequest = serde_json::from_str(r#"{"zip": "80202"}"#).unwrap();
        assert_eq!(req.zip.as_deref(), Some("80202"));
        assert!(req.city.is_none());
    }
}
