//! HTTP handlers mapping methods and paths onto resource controller calls
//!
//! | Method | Path                      | Operation       |
//! |--------|---------------------------|-----------------|
//! | POST   | `/{resource}`             | `handle_create` |
//! | GET    | `/{resource}`             | `handle_list`   |
//! | GET    | `/{resource}/{position}`  | `handle_get`    |
//! | DELETE | `/{resource}/{position}`  | `handle_delete` |

use crate::AppState;
use crate::error::ApiResult;
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use shelf_core::{Record, ResourceResponse, ResponseStatus};
use std::sync::Arc;
use tracing::debug;

pub async fn create_record(
    State(state): State<Arc<AppState>>,
    Path(resource): Path<String>,
    payload: Result<Json<Record>, JsonRejection>,
) -> ApiResult<Response> {
    let controller = state.controller(&resource)?;
    let Json(record) = payload?;
    debug!(resource = %resource, payload = ?record, "Create payload accepted");
    Ok(into_http(controller.handle_create(record).await?))
}

pub async fn list_records(
    State(state): State<Arc<AppState>>,
    Path(resource): Path<String>,
) -> ApiResult<Response> {
    let controller = state.controller(&resource)?;
    Ok(into_http(controller.handle_list().await?))
}

pub async fn get_record(
    State(state): State<Arc<AppState>>,
    Path((resource, position)): Path<(String, String)>,
) -> ApiResult<Response> {
    let controller = state.controller(&resource)?;
    Ok(into_http(controller.handle_get(&position).await?))
}

pub async fn delete_record(
    State(state): State<Arc<AppState>>,
    Path((resource, position)): Path<(String, String)>,
) -> ApiResult<Response> {
    let controller = state.controller(&resource)?;
    Ok(into_http(controller.handle_delete(&position).await?))
}

fn status_code(status: ResponseStatus) -> StatusCode {
    StatusCode::from_u16(status.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn into_http(response: ResourceResponse) -> Response {
    (status_code(response.status), Json(response.body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_match_controller_codes() {
        assert_eq!(status_code(ResponseStatus::Ok), StatusCode::OK);
        assert_eq!(status_code(ResponseStatus::Created), StatusCode::CREATED);
        assert_eq!(status_code(ResponseStatus::BadRequest), StatusCode::BAD_REQUEST);
    }
}
