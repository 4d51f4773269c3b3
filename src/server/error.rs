use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};
use validator::ValidationErrors;

pub type AppResult<T> = Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // these two are shown straight to the person staring at the iframe so they're plain text and
    // intentionally vague
    #[error("Invalid URL")]
    InvalidUrl,

    // the inner string is only for logs
    #[error("Failed to retrieve stream.")]
    UpstreamUnavailable(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("unexpected error occured")]
    InternalServerError,

    #[error("{0}")]
    InternalServerErrorWithContext(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error(transparent)]
    ValidationError(#[from] ValidationErrors),

    #[error(transparent)]
    AxumJsonRejection(#[from] JsonRejection),

    #[error(transparent)]
    AxumQueryRejection(#[from] QueryRejection),

    #[error(transparent)]
    AnyhowError(#[from] anyhow::Error),
}

impl Error {
    fn status(&self) -> StatusCode {
        match self {
            Error::InvalidUrl => StatusCode::BAD_REQUEST,
            Error::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::AxumJsonRejection(_) | Error::AxumQueryRejection(_) => StatusCode::BAD_REQUEST,
            Error::InternalServerError
            | Error::InternalServerErrorWithContext(_)
            | Error::AnyhowError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn is_plain_text(&self) -> bool {
        matches!(self, Error::InvalidUrl | Error::UpstreamUnavailable(_))
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();

        if self.is_plain_text() {
            if let Error::UpstreamUnavailable(ref context) = self {
                debug!("upstream unavailable: {}", context);
            }
            return (
                status,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                self.to_string(),
            )
                .into_response();
        }

        // validation errors list every field so the client doesn't have to guess
        let messages: Vec<String> = match &self {
            Error::ValidationError(errors) => errors
                .field_errors()
                .into_iter()
                .flat_map(|(field, errs)| {
                    errs.iter().map(move |e| match &e.message {
                        Some(message) => format!("{}: {}", field, message),
                        None => format!("{}: {}", field, e.code),
                    })
                })
                .collect(),
            Error::AnyhowError(e) => {
                error!("unhandled anyhow error: {:?}", e);
                vec![Error::InternalServerError.to_string()]
            }
            other => {
                if status.is_server_error() {
                    error!("request failed with {}: {}", status, other);
                }
                vec![other.to_string()]
            }
        };

        (status, Json(json!({ "errors": { "message": messages } }))).into_response()
    }
}
