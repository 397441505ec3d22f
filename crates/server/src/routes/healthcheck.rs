use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Response,
};
use serde_json::json;

use crate::json::{Envelope, write_json};
use crate::{ApiResult, AppState, VERSION};

pub async fn healthcheck(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    let envelope = Envelope::new("status", "available")?.with(
        "system_info",
        json!({
            "environment": state.environment,
            "version": VERSION,
        }),
    )?;

    Ok(write_json(StatusCode::OK, envelope, HeaderMap::new())?)
}
