//! Liveness handler.

use crate::models::PingResponse;
use axum::Json;

/// `GET /ping`
///
/// Always `{"success": true}` while the process is serving.
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse { success: true })
}
