//! Telephony platform webhooks.
//!
//! - `GET /ncco` - inbound call; answered with a call-control document
//! - `POST /voiceEvent` - call state changes; acknowledged by echoing them

use crate::errors::VoiceError;
use crate::models::{NccoQuery, VoiceEventResponse};
use crate::ncco::{self, Ncco};
use axum::body::Bytes;
use axum::extract::Query;
use axum::http::{header, HeaderMap};
use axum::Json;
use serde_json::Value;
use tracing::{debug, info, instrument};

/// `GET /ncco`
///
/// Never fails: the query is taken as raw pairs, missing parameters default
/// to `"unknown"` and every `to` value yields a document.
#[instrument(skip_all, name = "voice.webhook.answer")]
pub async fn answer_call(Query(pairs): Query<Vec<(String, String)>>) -> Json<Ncco> {
    let query = NccoQuery::from_pairs(pairs);

    info!(
        target: "voice.webhook",
        to = %query.to,
        from = %query.from,
        dtmf = %query.dtmf_or_default(),
        "Inbound call"
    );

    Json(ncco::synthesize(&query.to, &query.from))
}

/// `POST /voiceEvent`
///
/// Only JSON bodies are read. Any other content type, and an empty JSON
/// body, is acknowledged as `{}`. A malformed JSON body is a bad request.
#[instrument(skip_all, name = "voice.webhook.event")]
pub async fn voice_event(
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<VoiceEventResponse>, VoiceError> {
    let event = if is_json_content(&headers) {
        parse_event(&body)?
    } else {
        debug!(target: "voice.webhook", bytes = body.len(), "Ignoring non-JSON event body");
        empty_event()
    };

    let status = event.get("status").and_then(Value::as_str).unwrap_or("none");
    let call_uuid = event.get("uuid").and_then(Value::as_str).unwrap_or("none");
    info!(
        target: "voice.webhook",
        status = status,
        call_uuid = call_uuid,
        "Call event received"
    );
    debug!(target: "voice.webhook", event = %event, "Call event body");

    Ok(Json(VoiceEventResponse { body: event }))
}

/// `application/json` or any `+json` media type, parameters ignored.
fn is_json_content(headers: &HeaderMap) -> bool {
    let Some(value) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };

    let media_type = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    media_type == "application/json" || media_type.ends_with("+json")
}

fn empty_event() -> Value {
    Value::Object(serde_json::Map::new())
}

fn parse_event(body: &[u8]) -> Result<Value, VoiceError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(empty_event());
    }

    serde_json::from_slice(body)
        .map_err(|e| VoiceError::BadRequest(format!("Event body is not valid JSON: {e}")))
}
