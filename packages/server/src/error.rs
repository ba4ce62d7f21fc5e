use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use folio_content::ContentError;
use folio_render::RenderError;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Missing or invalid admin token")]
    Unauthorized,

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

pub type ServerResult<T> = Result<T, ServerError>;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServerError::Content(ContentError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            ServerError::Content(ContentError::NotAdmin | ContentError::EditModeInactive) => {
                StatusCode::FORBIDDEN
            }
            ServerError::Content(ContentError::Storage(_) | ContentError::Json(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ServerError::Content(_) => StatusCode::BAD_REQUEST,
            ServerError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            warn!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
