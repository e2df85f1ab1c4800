use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::{CinemaError, NON_FIELD_ERRORS, ValidationErrors};

fn detail(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "detail": message.into() }))).into_response()
}

impl IntoResponse for CinemaError {
    fn into_response(self) -> Response {
        match self {
            CinemaError::NotFound | CinemaError::InvalidPage => {
                detail(StatusCode::NOT_FOUND, self.to_string())
            }
            CinemaError::Validation(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            CinemaError::BadRequest(message) => detail(StatusCode::BAD_REQUEST, message),
            CinemaError::NotAuthenticated | CinemaError::InvalidToken => {
                let mut response = detail(StatusCode::UNAUTHORIZED, self.to_string());
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                response
            }
            CinemaError::Database(err) => {
                tracing::error!("{err:?}");
                detail(StatusCode::INTERNAL_SERVER_ERROR, "A server error occurred.")
            }
        }
    }
}

/// Pull the field name out of serde's "missing field `name`" message.
fn missing_field(message: &str) -> Option<&str> {
    let rest = message.split("missing field `").nth(1)?;
    rest.split('`').next()
}

impl From<JsonRejection> for CinemaError {
    fn from(rejection: JsonRejection) -> Self {
        let message = rejection.body_text();
        match rejection {
            JsonRejection::JsonDataError(_) => match missing_field(&message) {
                Some(field) => CinemaError::validation(field, "This field is required."),
                None => CinemaError::Validation(ValidationErrors::single(NON_FIELD_ERRORS, message)),
            },
            _ => CinemaError::BadRequest(message),
        }
    }
}

impl From<QueryRejection> for CinemaError {
    fn from(rejection: QueryRejection) -> Self {
        CinemaError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for CinemaError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!("Unmatched path parameter: {}", rejection.body_text());
        CinemaError::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_is_extracted() {
        let message = "Failed to deserialize the JSON body into the target type: missing field `name` at line 1 column 2";
        assert_eq!(missing_field(message), Some("name"));
        assert_eq!(missing_field("expected a string"), None);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(CinemaError::NotFound.into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            CinemaError::validation("name", "This field may not be blank.")
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        let unauthorized = CinemaError::NotAuthenticated.into_response();
        assert_eq!(unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            unauthorized.headers().get(header::WWW_AUTHENTICATE),
            Some(&HeaderValue::from_static("Bearer"))
        );
    }
}
