use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::middleware::extract_bearer;

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, e.body_text()),
    };

    if let Err(e) = services.login.verify(&body.username, &body.password) {
        return errors::json_error(StatusCode::UNAUTHORIZED, e.to_string());
    }

    match services.tokens.issue(&body.username, Utc::now()) {
        Ok(token) => Json(dto::LoginResponse {
            success: true,
            message: "Login successful",
            token,
        })
        .into_response(),
        Err(e) => errors::domain_error_to_response(e.into()),
    }
}

/// Tokens are stateless; the client discards its copy.
pub async fn logout() -> Json<dto::MessageResponse> {
    Json(dto::MessageResponse {
        success: true,
        message: "Logged out successfully",
    })
}

pub async fn check_auth(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
) -> Json<dto::CheckAuthResponse> {
    let username = extract_bearer(&headers)
        .ok()
        .and_then(|token| services.tokens.validate(token, Utc::now()).ok())
        .map(|claims| claims.sub);

    Json(dto::CheckAuthResponse {
        authenticated: username.is_some(),
        username,
    })
}
