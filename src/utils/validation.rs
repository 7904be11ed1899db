use crate::utils::response::ApiError;
use axum::http::StatusCode;
use validator::ValidationErrors;

/// Flattens `validator` output into the error envelope's `errors` array,
/// one `field: detail` entry per violation.
pub fn into_api_error(errors: ValidationErrors) -> ApiError {
    let mut details: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| {
                let detail = err
                    .message
                    .clone()
                    .unwrap_or_else(|| err.code.clone());
                format!("{}: {}", field, detail)
            })
        })
        .collect();
    details.sort();

    ApiError::with_message(StatusCode::UNPROCESSABLE_ENTITY, "Received invalid payload")
        .errors(details)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use validator::Validate;

    #[derive(Deserialize, Validate)]
    struct Payload {
        #[validate(email(code = "INVALID_EMAIL", message = "Invalid email address"))]
        email: String,
    }

    #[test]
    fn violations_become_sub_errors() {
        let payload = Payload {
            email: "not-an-email".to_string(),
        };

        let err = into_api_error(payload.validate().unwrap_err());

        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.errors, vec!["email: Invalid email address".to_string()]);
    }
}
