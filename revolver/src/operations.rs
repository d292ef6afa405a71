//! # Generated Operations
//!
//! Generic Axum handlers for any [`ApiResource`]. They are wired by
//! [`register`](crate::routes::register) but can also be mounted one by one:
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/posts", get(operations::list::<PostApi>))
//!     .route("/posts.detail", get(operations::detail::<PostApi>))
//!     .with_state(ApiState::new(db));
//! ```
//!
//! | Operation | Input | Success message |
//! |-----------|-------|-----------------|
//! | `list`    | filters, `order_by`, `page`, `size` | `fetched successfully` |
//! | `detail`  | `?id=` | `fetched successfully` |
//! | `create`  | form or JSON body | `create success` |
//! | `update`  | form or JSON body with `id` | `update success` |
//! | `delete`  | `?id=` | `delete success` |
//! | `export`  | filters, `order_by`, `name` | CSV attachment |

use axum::extract::{Query, State};
use chrono::{Local, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, IntoActiveModel, Order};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::config::ApiConfig;
use crate::core::records;
use crate::core::{ApiResource, WriteKind};
use crate::errors::ApiError;
use crate::export::{ExportFile, export_file_name, render_csv};
use crate::filtering::{
    Pageable, apply_filters, calculate_content_range, parse_order_by, parse_pagination,
};
use crate::models::{ApiResponse, ListResponse, PageData};
use crate::ownership::{Access, CurrentUser, Scope, Viewer};
use crate::payload::Payload;
use crate::routes::ApiState;
use crate::serializer::{SerializeOptions, SerializerModel};
use crate::serializer::value::{ValueKind, typed_value};
use crate::validation::{Rule, param_as_string, validate_rules};

fn serialize_options<R: ApiResource>(config: &ApiConfig) -> SerializeOptions {
    let options = R::serialize_options();
    let max_depth = options.max_depth.min(config.max_relation_depth);
    options.with_max_depth(max_depth)
}

fn scope_condition<R: ApiResource>(
    viewer: Option<&CurrentUser>,
    access: Access,
) -> Result<Condition, ApiError> {
    let owner = R::owner_column();
    Scope::resolve(viewer, owner.is_some(), R::PUBLIC_VIEW, access)?.condition(owner)
}

/// Filters, scope and ordering shared by list and export.
fn default_query<R: ApiResource>(
    params: &HashMap<String, String>,
    viewer: Option<&CurrentUser>,
) -> Result<(Condition, Vec<(R::Column, Order)>), ApiError> {
    let condition = Condition::all()
        .add(apply_filters::<R::Column>(params)?)
        .add(scope_condition::<R>(viewer, Access::Read)?);

    let mut order = parse_order_by::<R::Column>(params.get("order_by").map(String::as_str));
    if order.is_empty() {
        order = R::default_order();
    }
    Ok((condition, order))
}

/// The `id` of a detail, update or delete request.
fn required_id(fields: &Map<String, Value>) -> Result<String, ApiError> {
    validate_rules(
        &[Rule::new("id").required().message("id is required")],
        fields,
    )?;
    Ok(fields
        .get("id")
        .and_then(param_as_string)
        .unwrap_or_default()
        .trim()
        .to_string())
}

fn query_fields(params: &HashMap<String, String>) -> Map<String, Value> {
    params
        .iter()
        .map(|(key, value)| (key.clone(), Value::String(value.clone())))
        .collect()
}

/// Load a row by id within the viewer's scope.
async fn find_in_scope<R: ApiResource>(
    state: &ApiState,
    id: &str,
    viewer: Option<&CurrentUser>,
    access: Access,
) -> Result<R::Model, ApiError> {
    let Ok(key) = typed_value(ValueKind::of_column(&R::ID_COLUMN), id) else {
        return Err(ApiError::record_not_found(id));
    };
    let condition = Condition::all()
        .add(R::ID_COLUMN.eq(key))
        .add(scope_condition::<R>(viewer, access)?);

    R::get_one(&state.db, condition)
        .await?
        .ok_or_else(|| ApiError::record_not_found(id))
}

/// `GET /<route>`: one page of rows matching the query filters.
///
/// # Errors
///
/// 400 for malformed filters or pagination, 401 for anonymous access to private rows.
pub async fn list<R: ApiResource>(
    State(state): State<ApiState>,
    Viewer(viewer): Viewer,
    Query(params): Query<HashMap<String, String>>,
) -> Result<ListResponse, ApiError> {
    let route = R::route_name();
    let (page, size) = parse_pagination(&params, &state.config)?;
    let (condition, order) = default_query::<R>(&params, viewer.as_ref())?;

    let total = R::total_count(&state.db, condition.clone()).await?;
    let pageable = Pageable::new(page, size, total);
    let rows = R::get_all(&state.db, condition, &order, pageable.offset(), size).await?;

    let options = serialize_options::<R>(&state.config);
    let mut list = Vec::with_capacity(rows.len());
    for row in &rows {
        list.push(Value::Object(row.to_json(&state.db, options).await?));
    }

    tracing::debug!(resource = %route, page, size, total, "listed");

    Ok(ListResponse {
        headers: calculate_content_range(&pageable, &route),
        body: ApiResponse::ok("fetched successfully", PageData { pageable, list }),
    })
}

/// `GET /<route>.detail?id=`
///
/// # Errors
///
/// 422 without an id, 404 when the row does not exist or is out of scope.
pub async fn detail<R: ApiResource>(
    State(state): State<ApiState>,
    Viewer(viewer): Viewer,
    Query(params): Query<HashMap<String, String>>,
) -> Result<ApiResponse<Value>, ApiError> {
    let id = required_id(&query_fields(&params))?;
    let model = find_in_scope::<R>(&state, &id, viewer.as_ref(), Access::Read).await?;
    let json = model
        .to_json(&state.db, serialize_options::<R>(&state.config))
        .await?;

    tracing::debug!(resource = %R::route_name(), id = %id, "fetched");
    Ok(ApiResponse::ok("fetched successfully", Value::Object(json)))
}

/// `POST /<route>.create`
///
/// # Errors
///
/// 422 when a rule fails, 400 when a field does not fit its column, 409 on duplicates.
pub async fn create<R: ApiResource>(
    State(state): State<ApiState>,
    Viewer(viewer): Viewer,
    Payload(payload): Payload,
) -> Result<ApiResponse<Value>, ApiError> {
    let owner = R::owner_column();
    Scope::resolve(viewer.as_ref(), owner.is_some(), R::PUBLIC_VIEW, Access::Write)?;
    validate_rules(&R::rules(), &payload)?;

    let mut fields = records::writable_fields::<R>(payload, WriteKind::Create);
    records::assign_owner::<R>(&mut fields, viewer.as_ref(), WriteKind::Create);
    R::prepare_payload(&mut fields, viewer.as_ref(), WriteKind::Create)?;
    let fields = records::coerce_fields::<R>(fields)?;

    let model = records::new_model::<R>(fields, Utc::now())?;
    let saved = records::insert_model::<R>(&model).insert(&state.db).await?;
    let json = saved
        .to_json(&state.db, serialize_options::<R>(&state.config))
        .await?;

    tracing::info!(resource = %R::route_name(), "created");
    Ok(ApiResponse::created("create success", Value::Object(json)))
}

/// `PUT /<route>.update` with the row `id` in the body.
///
/// Only fillable keys are applied; `updated_at` is refreshed.
///
/// # Errors
///
/// 422 when a rule fails or the id is missing, 404 when the row is out of scope.
pub async fn update<R: ApiResource>(
    State(state): State<ApiState>,
    Viewer(viewer): Viewer,
    Payload(payload): Payload,
) -> Result<ApiResponse<Value>, ApiError> {
    validate_rules(&R::rules(), &payload)?;
    let id = required_id(&payload)?;
    let existing = find_in_scope::<R>(&state, &id, viewer.as_ref(), Access::Write).await?;

    let mut fields = records::writable_fields::<R>(payload, WriteKind::Update);
    records::assign_owner::<R>(&mut fields, viewer.as_ref(), WriteKind::Update);
    R::prepare_payload(&mut fields, viewer.as_ref(), WriteKind::Update)?;
    let fields = records::coerce_fields::<R>(fields)?;

    let active = records::update_model::<R>(&existing, fields, Utc::now())?;
    let saved = if active.is_changed() {
        active.update(&state.db).await?
    } else {
        existing
    };
    let json = saved
        .to_json(&state.db, serialize_options::<R>(&state.config))
        .await?;

    tracing::info!(resource = %R::route_name(), id = %id, "updated");
    Ok(ApiResponse::ok("update success", Value::Object(json)))
}

/// `DELETE /<route>.delete?id=`, answering with the row as it was.
///
/// # Errors
///
/// 422 without an id, 404 when the row is out of scope.
pub async fn delete<R: ApiResource>(
    State(state): State<ApiState>,
    Viewer(viewer): Viewer,
    Query(params): Query<HashMap<String, String>>,
) -> Result<ApiResponse<Value>, ApiError> {
    let id = required_id(&query_fields(&params))?;
    let existing = find_in_scope::<R>(&state, &id, viewer.as_ref(), Access::Write).await?;
    let json = existing
        .to_json(&state.db, serialize_options::<R>(&state.config))
        .await?;

    let active: R::ActiveModel = existing.into_active_model();
    active.delete(&state.db).await?;

    tracing::info!(resource = %R::route_name(), id = %id, "deleted");
    Ok(ApiResponse::ok("delete success", Value::Object(json)))
}

/// `GET /<route>.export`: every matching row as a CSV attachment.
///
/// # Errors
///
/// 404 when nothing matches.
pub async fn export<R: ApiResource>(
    State(state): State<ApiState>,
    Viewer(viewer): Viewer,
    Query(params): Query<HashMap<String, String>>,
) -> Result<ExportFile, ApiError> {
    let route = R::route_name();
    let (condition, order) = default_query::<R>(&params, viewer.as_ref())?;
    let limit = state.config.export.row_limit();
    let rows = R::get_all(&state.db, condition, &order, 0, limit).await?;
    if rows.is_empty() {
        return Err(ApiError::not_found("no records found"));
    }

    let options = serialize_options::<R>(&state.config);
    let mut serialized = Vec::with_capacity(rows.len());
    for row in &rows {
        serialized.push(row.to_json(&state.db, options).await?);
    }

    let data = render_csv::<R::Model>(&serialized, &state.config.export)?;
    let file_name = export_file_name(params.get("name").map(String::as_str), &route, Local::now());

    tracing::info!(resource = %route, rows = serialized.len(), file = %file_name, "exported");
    Ok(ExportFile {
        file_name,
        data,
        row_count: serialized.len(),
    })
}
