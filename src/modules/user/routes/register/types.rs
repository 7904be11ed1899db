pub mod response {
    use crate::utils::response::ApiError;
    use axum::{extract::Json, http::StatusCode, response::IntoResponse};
    use serde_json::json;

    pub enum Success {
        Acknowledged,
    }

    impl IntoResponse for Success {
        fn into_response(self) -> axum::response::Response {
            match self {
                Self::Acknowledged => {
                    (StatusCode::OK, Json(json!({ "message": "ok" }))).into_response()
                }
            }
        }
    }

    pub type Response = Result<Success, ApiError>;
}
