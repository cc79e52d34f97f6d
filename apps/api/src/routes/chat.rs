//! `POST /chat` → `{ "bot_response": "..." }`

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::routes::json_body;
use crate::services::assistant_service;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Missing or empty gets the help text.
    #[serde(default)]
    pub mensaje: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub bot_response: String,
}

pub async fn reply(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<Json<ChatResponse>> {
    let request = json_body(payload)?;
    let bot_response = assistant_service::reply(&state, &request.mensaje, Utc::now()).await?;
    Ok(Json(ChatResponse { bot_response }))
}
