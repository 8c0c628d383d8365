use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

use crate::codec::CodecError;
use crate::share::ShareError;
use crate::store::StoreError;
use crate::trip::TripError;
use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Couldn't find the desired trip")]
    TripNotFound,
    #[error(transparent)]
    Trip(#[from] TripError),
    #[error(transparent)]
    Share(#[from] ShareError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Trip(err.into())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::TripNotFound
            | AppError::Trip(TripError::PersonNotFound(_))
            | AppError::Trip(TripError::ExpenseNotFound(_))
            | AppError::Share(ShareError::NotFound)
            | AppError::Share(ShareError::Expired) => StatusCode::NOT_FOUND,
            AppError::Trip(TripError::Invalid(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Share(ShareError::InvalidTrip) | AppError::Codec(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Store(StoreError::Conflict) => StatusCode::CONFLICT,
            AppError::Share(ShareError::Store(_)) | AppError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("storage error: {self}");
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        HttpResponse::build(status).json(ErrorBody { error })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_things_map_to_404() {
        assert_eq!(AppError::TripNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::from(ShareError::Expired).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(TripError::ExpenseNotFound("x".to_string())).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn validation_maps_to_422() {
        let err = AppError::from(ValidationError::InvalidAmount);
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.to_string(), "Amount must be a positive number");
    }

    #[test]
    fn concurrent_write_maps_to_409() {
        let err = AppError::from(StoreError::Conflict);
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.error_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn bad_share_payload_maps_to_400() {
        assert_eq!(
            AppError::from(ShareError::InvalidTrip).status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
