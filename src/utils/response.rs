use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::any::Any;
use std::panic::Location;

pub const DEFAULT_ERROR_MESSAGE: &str = "Something Went Wrong";
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Success";

/// The single vocabulary for "this request failed". Services return
/// `Result<_, ApiError>` and axum renders the error through one path, so
/// every failure body has the same `{success, message, errors}` shape.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub errors: Vec<String>,
    cause: Option<String>,
    location: &'static Location<'static>,
}

impl ApiError {
    #[track_caller]
    pub fn new(status: StatusCode) -> Self {
        Self::with_message(status, DEFAULT_ERROR_MESSAGE)
    }

    #[track_caller]
    pub fn with_message(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            errors: vec![],
            cause: None,
            location: Location::caller(),
        }
    }

    /// Field-level detail, rendered in the `errors` array.
    pub fn errors(mut self, errors: Vec<String>) -> Self {
        self.errors = errors;
        self
    }

    /// Attach an upstream diagnostic. It is logged when the error is
    /// rendered but never serialized into the response body.
    pub fn caused_by(mut self, cause: impl ToString) -> Self {
        self.cause = Some(cause.to_string());
        self
    }

    #[track_caller]
    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.cause {
            Some(cause) => tracing::error!(
                "Request failed at {}: {} ({}): {}",
                self.location,
                self.message,
                self.status,
                cause
            ),
            None => tracing::error!(
                "Request failed at {}: {} ({})",
                self.location,
                self.message,
                self.status
            ),
        }

        (
            self.status,
            Json(json!({
                "success": false,
                "message": self.message,
                "errors": self.errors,
            })),
        )
            .into_response()
    }
}

/// The success envelope every normal response body uses, so clients can
/// branch on `success` uniformly regardless of endpoint.
pub struct ApiResponse<T> {
    pub status: StatusCode,
    pub data: T,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        Self::with_message(status, data, DEFAULT_SUCCESS_MESSAGE)
    }

    pub fn with_message(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        Self {
            status,
            data,
            message: message.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.status.as_u16() < 400
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let success = self.success();
        (
            self.status,
            Json(json!({
                "statusCode": self.status.as_u16(),
                "data": self.data,
                "message": self.message,
                "success": success,
            })),
        )
            .into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

/// Bridges handler panics into the normalization layer: a panicking handler
/// answers with the same generic 500 envelope as any unstructured fault,
/// and the process keeps serving. Wired up via `CatchPanicLayer::custom`.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!("Handler panicked: {}", detail);

    ApiError::internal().into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get, Router};
    use tower::ServiceExt;
    use tower_http::catch_panic::CatchPanicLayer;

    async fn read_json(res: Response) -> (StatusCode, serde_json::Value) {
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn error_without_message_uses_default() {
        let err = ApiError::new(StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Something Went Wrong");
        assert!(err.errors.is_empty());
    }

    #[tokio::test]
    async fn success_envelope_shape() {
        let res = ApiResponse::new(StatusCode::OK, json!({ "user": "John Doe" })).into_response();
        let (status, body) = read_json(res).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "statusCode": 200,
                "data": { "user": "John Doe" },
                "message": "Success",
                "success": true,
            })
        );
    }

    #[tokio::test]
    async fn success_flag_follows_status_classification() {
        let ok = ApiResponse::new(StatusCode::OK, ());
        assert!(ok.success());

        let bad = ApiResponse::with_message(
            StatusCode::BAD_REQUEST,
            serde_json::Value::Null,
            "Bad Request",
        );
        assert!(!bad.success());

        let (status, body) = read_json(bad.into_response()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["message"], json!("Bad Request"));
    }

    #[tokio::test]
    async fn attached_diagnostics_never_leak_into_the_body() {
        let err = ApiError::internal().caused_by("connection reset by peer");
        let (status, body) = read_json(err.into_response()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({
                "success": false,
                "message": "Something Went Wrong",
                "errors": [],
            })
        );
    }

    #[tokio::test]
    async fn error_envelope_carries_sub_errors() {
        let err = ApiError::with_message(StatusCode::UNPROCESSABLE_ENTITY, "Invalid payload")
            .errors(vec!["email: invalid".to_string()]);
        let (status, body) = read_json(err.into_response()).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body,
            json!({
                "success": false,
                "message": "Invalid payload",
                "errors": ["email: invalid"],
            })
        );
    }

    #[tokio::test]
    async fn sync_and_async_faults_render_identically() {
        async fn fails_before_first_await() -> ApiResult<()> {
            Err(ApiError::with_message(StatusCode::BAD_REQUEST, "boom"))
        }

        async fn fails_after_await() -> ApiResult<()> {
            tokio::task::yield_now().await;
            Err(ApiError::with_message(StatusCode::BAD_REQUEST, "boom"))
        }

        let router = Router::new()
            .route("/sync", get(fails_before_first_await))
            .route("/async", get(fails_after_await));

        let res_sync = router
            .clone()
            .oneshot(Request::builder().uri("/sync").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let res_async = router
            .oneshot(
                Request::builder()
                    .uri("/async")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let (status_sync, body_sync) = read_json(res_sync).await;
        let (status_async, body_async) = read_json(res_async).await;

        assert_eq!(status_sync, status_async);
        assert_eq!(body_sync, body_async);
        assert_eq!(status_sync, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn panicking_handler_answers_with_generic_500() {
        async fn panics() -> ApiResult<()> {
            panic!("handler exploded");
        }

        let router = Router::new()
            .route("/panic", get(panics))
            .layer(CatchPanicLayer::custom(handle_panic));

        let res = router
            .oneshot(
                Request::builder()
                    .uri("/panic")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let (status, body) = read_json(res).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({
                "success": false,
                "message": "Something Went Wrong",
                "errors": [],
            })
        );
    }
}
