//! Request and response types for the HTTP surface.

use crate::ncco::UNKNOWN_PARTY;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// DTMF value logged when the webhook carries none.
pub const NO_DTMF: &str = "-1";

/// Query string of the inbound-call webhook (`GET /ncco`).
///
/// Missing `to`/`from` fall back to `"unknown"`. Unknown parameters the
/// platform adds (`uuid`, `conversation_uuid`, ...) are ignored, and a
/// repeated parameter keeps its first value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NccoQuery {
    pub to: String,
    pub from: String,

    /// Digits pressed by the caller. Logged only.
    pub dtmf: Option<String>,
}

impl NccoQuery {
    /// Build from decoded query pairs in the order they appeared.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut to = None;
        let mut from = None;
        let mut dtmf = None;

        for (key, value) in pairs {
            let slot = match key.as_str() {
                "to" => &mut to,
                "from" => &mut from,
                "dtmf" => &mut dtmf,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }

        Self {
            to: to.unwrap_or_else(unknown_party),
            from: from.unwrap_or_else(unknown_party),
            dtmf,
        }
    }

    pub fn dtmf_or_default(&self) -> &str {
        self.dtmf.as_deref().unwrap_or(NO_DTMF)
    }
}

fn unknown_party() -> String {
    UNKNOWN_PARTY.to_string()
}

/// `GET /ping` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingResponse {
    pub success: bool,
}

/// `POST /voiceEvent` response: the received event, echoed back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceEventResponse {
    pub body: Value,
}

/// `POST /tokens/:username` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserTokenResponse {
    pub username: String,
    pub token: String,
}
