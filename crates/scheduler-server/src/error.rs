//! Maps `ScheduleError` onto HTTP responses. Grounded on the teacher's
//! `sem_os_server::error::AppError`: a newtype wrapper implementing
//! `IntoResponse`, matching on the domain error to pick a status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use scheduler_core::ScheduleError;
use serde_json::json;

pub struct AppError(pub ScheduleError);

impl From<ScheduleError> for AppError {
    fn from(e: ScheduleError) -> Self {
        Self(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = json!({
            "error": self.0.to_string(),
            "code": status.as_u16(),
        });
        (status, Json(body)).into_response()
    }
}
