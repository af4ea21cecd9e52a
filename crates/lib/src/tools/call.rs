//! Tool-call wire format embedded in model output.
//!
//! The model is instructed to reply with `<tool_call>{"name": ..., "arguments": {...}}</tool_call>`
//! when it wants a local service. The payload is decoded once into a [`ToolRequest`].

use serde::Deserialize;
use std::collections::HashMap;

pub const TOOL_CALL_OPEN: &str = "<tool_call>";
pub const TOOL_CALL_CLOSE: &str = "</tool_call>";

/// Why a delimited payload could not be turned into a request.
#[derive(Debug, thiserror::Error)]
pub enum ToolCallError {
    #[error("invalid tool call payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("missing argument '{argument}' for {tool}")]
    MissingArgument {
        tool: &'static str,
        argument: &'static str,
    },
}

/// A decoded tool invocation: one of the four supported services, or an unknown name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolRequest {
    FetchSchemeInfo { scheme_name: String },
    RaiseGrievance { grievance_description: Option<String> },
    TrackApplication { application_id: String },
    CitizenFeedback { feedback: String },
    Unrecognized { name: String },
}

impl ToolRequest {
    pub fn name(&self) -> &str {
        match self {
            ToolRequest::FetchSchemeInfo { .. } => "fetch_scheme_info",
            ToolRequest::RaiseGrievance { .. } => "raise_grievance",
            ToolRequest::TrackApplication { .. } => "track_application",
            ToolRequest::CitizenFeedback { .. } => "citizen_feedback",
            ToolRequest::Unrecognized { name } => name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawToolCall {
    name: String,
    #[serde(default)]
    arguments: HashMap<String, String>,
}

/// Text strictly between the first opening marker and the first closing marker after it.
/// None when either marker is missing or they are out of order.
pub fn extract_payload(text: &str) -> Option<&str> {
    let start = text.find(TOOL_CALL_OPEN)? + TOOL_CALL_OPEN.len();
    let len = text[start..].find(TOOL_CALL_CLOSE)?;
    Some(&text[start..start + len])
}

/// Decode a payload (surrounding whitespace allowed) into a request.
pub fn decode(payload: &str) -> Result<ToolRequest, ToolCallError> {
    let RawToolCall { name, mut arguments } = serde_json::from_str(payload.trim())?;
    let request = match name.as_str() {
        "fetch_scheme_info" => ToolRequest::FetchSchemeInfo {
            scheme_name: required(&mut arguments, "fetch_scheme_info", "scheme_name")?,
        },
        "raise_grievance" => ToolRequest::RaiseGrievance {
            grievance_description: arguments.remove("grievance_description"),
        },
        "track_application" => ToolRequest::TrackApplication {
            application_id: required(&mut arguments, "track_application", "application_id")?,
        },
        "citizen_feedback" => ToolRequest::CitizenFeedback {
            feedback: required(&mut arguments, "citizen_feedback", "feedback")?,
        },
        _ => ToolRequest::Unrecognized { name: name.clone() },
    };
    Ok(request)
}

fn required(
    arguments: &mut HashMap<String, String>,
    tool: &'static str,
    argument: &'static str,
) -> Result<String, ToolCallError> {
    arguments
        .remove(argument)
        .ok_or(ToolCallError::MissingArgument { tool, argument })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_between_markers() {
        let text = "sure <tool_call>\n{\"name\":\"x\"}\n</tool_call> done";
        assert_eq!(extract_payload(text), Some("\n{\"name\":\"x\"}\n"));
    }

    #[test]
    fn missing_or_reversed_markers_are_plain_text() {
        assert_eq!(extract_payload("no call here"), None);
        assert_eq!(extract_payload("<tool_call>{}"), None);
        assert_eq!(extract_payload("{}</tool_call>"), None);
        assert_eq!(extract_payload("</tool_call>{}<tool_call>"), None);
    }

    #[test]
    fn decodes_each_known_tool() {
        assert_eq!(
            decode(r#"{"name":"fetch_scheme_info","arguments":{"scheme_name":"PMAY"}}"#).unwrap(),
            ToolRequest::FetchSchemeInfo {
                scheme_name: "PMAY".to_string()
            }
        );
        assert_eq!(
            decode(r#"{"name":"raise_grievance"}"#).unwrap(),
            ToolRequest::RaiseGrievance {
                grievance_description: None
            }
        );
        assert_eq!(
            decode(r#" {"name":"track_application","arguments":{"application_id":"app1234"}} "#)
                .unwrap(),
            ToolRequest::TrackApplication {
                application_id: "app1234".to_string()
            }
        );
        assert_eq!(
            decode(r#"{"name":"citizen_feedback","arguments":{"feedback":"great"}}"#).unwrap(),
            ToolRequest::CitizenFeedback {
                feedback: "great".to_string()
            }
        );
    }

    #[test]
    fn unknown_name_is_unrecognized() {
        let req = decode(r#"{"name":"book_train","arguments":{}}"#).unwrap();
        assert_eq!(
            req,
            ToolRequest::Unrecognized {
                name: "book_train".to_string()
            }
        );
        assert_eq!(req.name(), "book_train");
    }

    #[test]
    fn malformed_payloads_fail() {
        assert!(matches!(decode("not json"), Err(ToolCallError::Malformed(_))));
        assert!(matches!(
            decode(r#"{"arguments":{}}"#),
            Err(ToolCallError::Malformed(_))
        ));
        assert!(matches!(
            decode(r#"{"name":"track_application","arguments":{"application_id":42}}"#),
            Err(ToolCallError::Malformed(_))
        ));
    }

    #[test]
    fn missing_required_argument_fails() {
        let err = decode(r#"{"name":"fetch_scheme_info","arguments":{}}"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing argument 'scheme_name' for fetch_scheme_info"
        );
    }
}
