//! HTTP error rendering.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::Error;

/// Wrapper that renders crate errors as JSON HTTP responses.
///
/// The envelope shape is shared with success responses: clients can always
/// branch on the `success` field.
pub struct AppError(pub Error);

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!("request failed: {}", self.0);
        } else {
            tracing::debug!("request rejected: {}", self.0);
        }

        let body = Json(json!({
            "success": false,
            "message": self.0.to_string(),
            "errors": [],
        }));

        // An unsatisfiable range must report the representation size so the
        // client can retry with a valid offset.
        if let Error::RangeNotSatisfiable { total_length, .. } = self.0 {
            return (
                status,
                [(header::CONTENT_RANGE, format!("bytes */{total_length}"))],
                body,
            )
                .into_response();
        }

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404_envelope() {
        let response = AppError(Error::not_found("video", "abc")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn unsatisfiable_range_carries_content_range() {
        let response = AppError(Error::RangeNotSatisfiable {
            start: 5000,
            total_length: 1000,
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(
            response.headers().get(header::CONTENT_RANGE).unwrap(),
            "bytes */1000"
        );
    }

    #[test]
    fn transform_failure_is_a_bad_gateway() {
        let response = AppError(Error::transform("ffmpeg died")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
