//! Session-start payload

use crate::http::HttpResponse;
use polyglue_core::{GlueError, GlueResult};
use serde::{Deserialize, Serialize};

/// The authenticated identity returned by session start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfInfo {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Successful session-start payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// WebSocket URL for the event stream
    pub url: String,
    #[serde(rename = "self")]
    pub self_info: SelfInfo,
}

impl SessionInfo {
    /// Interpret a session-start response
    ///
    /// Non-2xx statuses are transport failures. A payload with `"ok": false`
    /// or without `url` and `self.id` is an authentication failure.
    pub fn from_response(response: &HttpResponse) -> GlueResult<Self> {
        if !response.is_success() {
            return Err(GlueError::Transport(format!(
                "session start returned HTTP {}",
                response.status
            )));
        }

        let payload: serde_json::Value = serde_json::from_slice(&response.body).map_err(|e| {
            GlueError::Authentication(format!("malformed session payload: {}", e))
        })?;

        Self::from_payload(&payload)
    }

    pub fn from_payload(payload: &serde_json::Value) -> GlueResult<Self> {
        if payload.get("ok").and_then(|ok| ok.as_bool()) == Some(false) {
            let reason = payload
                .get("error")
                .and_then(|e| e.as_str())
                .unwrap_or("unknown error");
            return Err(GlueError::Authentication(reason.to_string()));
        }

        Self::deserialize(payload).map_err(|e| {
            GlueError::Authentication(format!("malformed session payload: {}", e))
        })
    }
}
