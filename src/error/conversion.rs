/**
 * Error Conversion
 *
 * Terminal stage of the pipeline: converts a `GatewayError` into the one
 * JSON error response a request is allowed to produce.
 *
 * # Response Format
 *
 * ```json
 * {
 *   "error": {
 *     "status": 401,
 *     "message": "unauthorized"
 *   }
 * }
 * ```
 */

use axum::{
    body::Body,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::types::GatewayError;

impl IntoResponse for GatewayError {
    /// Convert a gateway error into an HTTP response
    ///
    /// Server-side causes (storage context, internal detail) are logged here
    /// and replaced with the client-safe message.
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.client_message();

        match &self {
            GatewayError::Storage { .. } | GatewayError::Internal(_) => {
                tracing::error!(error = %self, status = status.as_u16(), "request failed");
            }
            GatewayError::Provider(_) => {
                tracing::warn!(error = %self, "provider handshake failed");
            }
            _ => {
                tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
            }
        }

        let body = serde_json::json!({
            "error": {
                "status": status.as_u16(),
                "message": message,
            }
        });

        Response::builder()
            .status(status)
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap_or_else(|_| {
                format!(
                    r#"{{"error":{{"status":{},"message":"{}"}}}}"#,
                    status.as_u16(),
                    message
                )
            })))
            .unwrap_or_else(|_| {
                Response::builder()
                    .status(StatusCode::INTERNAL_SERVER_ERROR)
                    .body(Body::from("Internal Server Error"))
                    .unwrap()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_shape() {
        let response = GatewayError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get("Content-Type").unwrap(),
            "application/json"
        );
    }

    #[test]
    fn test_not_found_response() {
        let response = GatewayError::not_found("route is not defined").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
