//! Dialogflow fulfillment requests and Google Assistant responses.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRequest {
    #[serde(default)]
    pub session: String,
    pub query_result: QueryResult,
    #[serde(default)]
    pub original_detect_intent_request: Option<OriginalRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub query_text: String,
    #[serde(default)]
    pub parameters: Map<String, JsonValue>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OriginalRequest {
    #[serde(default)]
    pub payload: OriginalPayload,
}

#[derive(Debug, Default, Deserialize)]
pub struct OriginalPayload {
    #[serde(default)]
    pub inputs: Vec<AssistantInput>,
}

#[derive(Debug, Deserialize)]
pub struct AssistantInput {
    #[serde(default)]
    pub intent: String,
    #[serde(default)]
    pub arguments: Vec<AssistantArgument>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantArgument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub text_value: Option<String>,
}

pub const OPTION_INTENT: &str = "actions.intent.OPTION";

impl WebhookRequest {
    /// Last path segment of the Dialogflow session name
    pub fn session_id(&self) -> &str {
        self.session.rsplit('/').next().unwrap_or_default()
    }

    pub fn action(&self) -> Option<&str> {
        self.query_result.action.as_deref()
    }

    pub fn query_text(&self) -> &str {
        &self.query_result.query_text
    }

    /// String parameter; Dialogflow sends unfilled parameters as `""`.
    pub fn param_str(&self, name: &str) -> Option<&str> {
        match self.query_result.parameters.get(name) {
            Some(JsonValue::String(s)) if !s.is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn param_list(&self, name: &str) -> Vec<&str> {
        match self.query_result.parameters.get(name) {
            Some(JsonValue::Array(items)) => items.iter().filter_map(JsonValue::as_str).collect(),
            Some(JsonValue::String(s)) if !s.is_empty() => vec![s.as_str()],
            _ => Vec::new(),
        }
    }

    /// Key the user picked from an option list.
    pub fn chosen_option(&self) -> Option<&str> {
        self.original_detect_intent_request
            .as_ref()?
            .payload
            .inputs
            .iter()
            .find(|input| input.intent == OPTION_INTENT)?
            .arguments
            .iter()
            .find(|arg| arg.name == "OPTION")?
            .text_value
            .as_deref()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionItem {
    pub option_info: OptionInfo,
    pub description: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptionInfo {
    pub key: String,
}

impl OptionItem {
    pub fn new(key: &str, description: &str, title: &str) -> Self {
        Self {
            option_info: OptionInfo { key: key.to_string() },
            description: description.to_string(),
            title: title.to_string(),
        }
    }
}

/// Build the fulfillment response. `expect_user_response: false` ends the
/// conversation.
pub fn response(text: &str, expect_user_response: bool, options: &[OptionItem]) -> JsonValue {
    let mut google = serde_json::json!({
        "expectUserResponse": expect_user_response,
        "richResponse": {
            "items": [{ "simpleResponse": { "textToSpeech": text } }],
        },
    });

    if !options.is_empty() {
        google["systemIntent"] = serde_json::json!({
            "intent": OPTION_INTENT,
            "data": {
                "@type": "type.googleapis.com/google.actions.v2.OptionValueSpec",
                "listSelect": { "items": options },
            },
        });
    }

    serde_json::json!({ "payload": { "google": google } })
}

pub fn simple(text: &str) -> JsonValue {
    response(text, true, &[])
}

pub fn closing(text: &str) -> JsonValue {
    response(text, false, &[])
}

pub fn with_options(text: &str, options: &[OptionItem]) -> JsonValue {
    response(text, true, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: JsonValue) -> WebhookRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_simple_response() {
        assert_eq!(
            simple("this is a simple response"),
            json!({
                "payload": {
                    "google": {
                        "expectUserResponse": true,
                        "richResponse": {
                            "items": [{ "simpleResponse": { "textToSpeech": "this is a simple response" } }]
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn test_closing_response() {
        let res = closing("GG! Thanks for playing.");
        assert_eq!(res["payload"]["google"]["expectUserResponse"], json!(false));
        assert!(res["payload"]["google"].get("systemIntent").is_none());
    }

    #[test]
    fn test_options_response() {
        let res = with_options("Pick one", &[OptionItem::new("first", "first description", "First")]);
        let intent = &res["payload"]["google"]["systemIntent"];
        assert_eq!(intent["intent"], json!("actions.intent.OPTION"));
        assert_eq!(
            intent["data"]["@type"],
            json!("type.googleapis.com/google.actions.v2.OptionValueSpec")
        );
        assert_eq!(
            intent["data"]["listSelect"]["items"],
            json!([{ "optionInfo": { "key": "first" }, "description": "first description", "title": "First" }])
        );
    }

    #[test]
    fn test_request_fields() {
        let req = request(json!({
            "responseId": "d7c29b4d",
            "session": "projects/chess/agent/sessions/abc-123",
            "queryResult": {
                "queryText": "knight from g1 to f3",
                "action": "two_squares",
                "parameters": { "squares": ["G1", "f3"], "piece": "knight", "promotion": "" }
            }
        }));
        assert_eq!(req.session_id(), "abc-123");
        assert_eq!(req.action(), Some("two_squares"));
        assert_eq!(req.query_text(), "knight from g1 to f3");
        assert_eq!(req.param_list("squares"), vec!["G1", "f3"]);
        assert_eq!(req.param_str("piece"), Some("knight"));
        assert_eq!(req.param_str("promotion"), None);
        assert_eq!(req.param_str("missing"), None);
        assert_eq!(req.chosen_option(), None);
    }

    #[test]
    fn test_chosen_option() {
        let req = request(json!({
            "session": "projects/chess/agent/sessions/abc",
            "queryResult": { "action": "choose_color", "parameters": {} },
            "originalDetectIntentRequest": {
                "payload": {
                    "inputs": [
                        { "intent": "actions.intent.TEXT", "arguments": [{ "name": "text", "textValue": "white" }] },
                        { "intent": "actions.intent.OPTION", "arguments": [
                            { "name": "text", "textValue": "Black" },
                            { "name": "OPTION", "textValue": "black" }
                        ] }
                    ]
                }
            }
        }));
        assert_eq!(req.chosen_option(), Some("black"));
    }
}
