// error.rs
use axum::response::{IntoResponse, Response};
use http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE};
use thiserror::Error;
use tracing::error;

use crate::{
    redeem::{Field, SubmitError},
    store::StoreError,
};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("pemilihan belum dimulai atau sudah ditutup")]
    WindowClosed,

    #[error("{0} diperlukan")]
    InvalidInput(&'static str),

    #[error("kode tidak ditemukan")]
    CodeNotFound,

    #[error("kode sudah digunakan")]
    AlreadyUsed,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("database error")]
    Store(#[from] StoreError),
}

impl From<SubmitError> for AppError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::WindowClosed => AppError::WindowClosed,
            SubmitError::InvalidInput(field) => AppError::InvalidInput(match field {
                Field::Code => "kode",
                Field::Choice => "pilihan",
            }),
            SubmitError::CodeNotFound => AppError::CodeNotFound,
            SubmitError::AlreadyUsed => AppError::AlreadyUsed,
            SubmitError::Store(e) => AppError::Store(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::WindowClosed => StatusCode::FORBIDDEN,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::CodeNotFound => StatusCode::BAD_REQUEST,
            AppError::AlreadyUsed => StatusCode::CONFLICT,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Store(ref e) => {
                error!("Store error: {e}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let mut response = (status, self.to_string()).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                WWW_AUTHENTICATE,
                HeaderValue::from_static(r#"Basic realm="Admin Area""#),
            );
        }

        response
    }
}
