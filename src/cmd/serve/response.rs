// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use fibocards_core::error::ErrorReport;
use fibocards_core::validate::FieldErrors;
use serde_json::Value;
use serde_json::json;

/// Everything a handler can fail with. Each variant renders as a JSON
/// envelope carrying `status` and `message`.
#[derive(Debug)]
pub enum ApiError {
    Validation {
        message: &'static str,
        errors: FieldErrors,
    },
    BadRequest(String),
    Unauthorized(&'static str),
    Forbidden(&'static str),
    NotFound(String),
    Internal(ErrorReport),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<ErrorReport> for ApiError {
    fn from(value: ErrorReport) -> Self {
        ApiError::Internal(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation { message, errors } => {
                let status = StatusCode::UNPROCESSABLE_ENTITY;
                let body = json!({
                    "status": status.as_u16(),
                    "message": message,
                    "errors": errors,
                });
                (status, Json(body)).into_response()
            }
            ApiError::BadRequest(message) => reply(StatusCode::BAD_REQUEST, &message),
            ApiError::Unauthorized(message) => reply(StatusCode::UNAUTHORIZED, message),
            ApiError::Forbidden(message) => reply(StatusCode::FORBIDDEN, message),
            ApiError::NotFound(message) => reply(StatusCode::NOT_FOUND, &message),
            ApiError::Internal(e) => {
                log::error!("Internal error: {e}");
                reply(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

/// A bare `{status, message}` envelope.
pub fn reply(status: StatusCode, message: &str) -> Response {
    envelope(status, message, json!({}))
}

/// A `{status, message, ...}` envelope, with the fields of `payload` merged
/// in.
pub fn envelope(status: StatusCode, message: &str, payload: Value) -> Response {
    let mut body = json!({
        "status": status.as_u16(),
        "message": message,
    });
    if let (Some(body), Value::Object(payload)) = (body.as_object_mut(), payload) {
        body.extend(payload);
    }
    (status, Json(body)).into_response()
}
