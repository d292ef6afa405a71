use axum::{
    Json,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::filtering::Pageable;

/// Success envelope shared by every endpoint.
///
/// `code` mirrors the HTTP status so clients that only read the body still see it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    #[must_use]
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::with_status(StatusCode::OK, message, data)
    }

    #[must_use]
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::with_status(StatusCode::CREATED, message, data)
    }

    #[must_use]
    pub fn with_status(status: StatusCode, message: impl Into<String>, data: T) -> Self {
        Self {
            code: status.as_u16(),
            message: message.into(),
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

/// Body of a list response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PageData {
    pub pageable: Pageable,
    pub list: Vec<Value>,
}

/// A list response with its `Content-Range` header.
pub struct ListResponse {
    pub headers: HeaderMap,
    pub body: ApiResponse<PageData>,
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        (self.headers, self.body).into_response()
    }
}

/// Query parameters understood by list and export endpoints.
///
/// Only the reserved keys are listed; every other key is read as a column filter of
/// the form `column` or `column__lookup`, for example `title__icontains=rust`.
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Page number, starting at 1
    #[param(example = 1)]
    pub page: Option<u64>,
    /// Rows per page
    #[param(example = 10)]
    pub size: Option<u64>,
    /// Comma separated ordering, e.g. `created_at_desc,title` or `-views`
    #[param(example = "created_at_desc")]
    pub order_by: Option<String>,
    /// Export file name, without extension
    pub name: Option<String>,
}

/// Query parameters of the detail and delete endpoints
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IdParams {
    pub id: Option<String>,
}
