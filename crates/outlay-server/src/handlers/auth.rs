//! Authentication-related handlers

use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;

use crate::{get_user_email, AppState};

/// Response for the /api/me endpoint
#[derive(Serialize)]
pub struct MeResponse {
    /// The authenticated user's email or identifier
    pub user: String,
    /// How the user was authenticated
    pub auth_method: String,
}

/// GET /api/me - Get the currently authenticated user
pub async fn get_me(State(_state): State<Arc<AppState>>, headers: HeaderMap) -> Json<MeResponse> {
    let user = get_user_email(&headers);

    let auth_method = if user == "api-key" {
        "api_key"
    } else if user == "local-dev" {
        "none"
    } else if user.contains('@') {
        "cloudflare_header"
    } else {
        "unknown"
    };

    Json(MeResponse {
        user,
        auth_method: auth_method.to_string(),
    })
}
