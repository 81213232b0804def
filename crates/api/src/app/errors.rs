use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::{error, warn};

use sheetbill_core::DomainError;

/// Map a domain error to its status code and the `{success:false,error}` envelope.
pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let status = status_for(&err);
    if status.is_server_error() {
        error!(kind = err.kind(), error = %err, "request failed");
    } else {
        warn!(kind = err.kind(), error = %err, "request rejected");
    }
    json_error(status, err.to_string())
}

pub fn status_for(err: &DomainError) -> StatusCode {
    match err {
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::Upstream(_) | DomainError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "success": false,
            "error": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_map_to_status_codes() {
        assert_eq!(status_for(&DomainError::validation("x")), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&DomainError::not_found("x")), StatusCode::NOT_FOUND);
        assert_eq!(status_for(&DomainError::upstream("x")), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_for(&DomainError::persistence("x")), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
