//! Chat WebSocket protocol: JSON text frames `{ "event": ..., "data": {...} }`.

use serde::{Deserialize, Serialize};

/// Frames sent by the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// `{"event":"send_message","data":{"message":"..."}}`
    SendMessage { message: String },
}

/// Frames sent by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// `{"event":"receive_message","data":{"message":"<html>","is_user":false}}`
    ReceiveMessage { message: String, is_user: bool },
    /// Sent to every open connection before the gateway stops.
    Shutdown {},
}

impl ServerEvent {
    /// An assistant reply (never a user echo).
    pub fn assistant(message: impl Into<String>) -> Self {
        ServerEvent::ReceiveMessage {
            message: message.into(),
            is_user: false,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"event":"error","data":{}}"#.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbound_frame_shape() {
        let ev: ClientEvent =
            serde_json::from_str(r#"{"event":"send_message","data":{"message":"hello"}}"#).unwrap();
        assert_eq!(
            ev,
            ClientEvent::SendMessage {
                message: "hello".to_string()
            }
        );
        assert!(serde_json::from_str::<ClientEvent>(r#"{"event":"other","data":{}}"#).is_err());
        assert!(serde_json::from_str::<ClientEvent>(r#"{"event":"send_message"}"#).is_err());
    }

    #[test]
    fn outbound_frame_shape() {
        let v: serde_json::Value =
            serde_json::from_str(&ServerEvent::assistant("<p>hi</p>").to_json()).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "event": "receive_message",
                "data": { "message": "<p>hi</p>", "is_user": false }
            })
        );
        let v: serde_json::Value = serde_json::from_str(&ServerEvent::Shutdown {}.to_json()).unwrap();
        assert_eq!(v["event"], "shutdown");
    }
}
