use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{event, Level};

use cp_store::StoreError;

/// The single place where store conditions become transport status codes.
#[derive(Debug)]
pub struct ApiError(pub StoreError);

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            StoreError::AveragePriceTooLow(_) => StatusCode::BAD_REQUEST,
            StoreError::BrandAlreadyExists(_) | StoreError::ModelAlreadyExists { .. } => StatusCode::BAD_REQUEST,
            StoreError::BrandNotFound(_) | StoreError::ModelNotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Database(err) => {
                event!(Level::ERROR, "Storage failure: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (
            status,
            Json(ErrorBody {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
