//! `/employees` collection and item resources.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    routing::get,
};
use platform_api::{ApiError, ApiResult};
use products_hr::{
    Employee, ListParams,
    validate::{validate_new, validate_patch},
};
use serde_json::Value;
use tracing::info;

use crate::{auth::CurrentUser, http::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/employees", get(list_employees).post(create_employee))
        .route(
            "/employees/{id}",
            get(get_employee)
                .put(update_employee)
                .delete(delete_employee),
        )
}

async fn list_employees(
    _user: CurrentUser,
    State(state): State<AppState>,
    pairs: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> ApiResult<Json<Vec<Employee>>> {
    let Query(pairs) = pairs.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let query = pairs.into_iter().collect::<ListParams>().parse()?;
    let employees = state
        .employees
        .list(&query.filter, query.window())
        .await?;
    Ok(Json(employees))
}

async fn create_employee(
    user: CurrentUser,
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Employee>)> {
    let body = json_body(body)?;
    let new = validate_new(&body)?;
    let employee = state.employees.create(new).await?;
    info!(employee_id = employee.id, actor = %user.subject, "employee created");
    Ok((StatusCode::CREATED, Json(employee)))
}

async fn get_employee(
    _user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Employee>> {
    let employee = state.employees.read(parse_id(&id)?).await?;
    Ok(Json(employee))
}

/// Partial merge: only the supplied fields change.
async fn update_employee(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Employee>> {
    let id = parse_id(&id)?;
    // Unknown ids are reported before body problems.
    state.employees.read(id).await?;
    let body = json_body(body)?;
    let patch = validate_patch(&body)?;
    let employee = state.employees.update(id, patch).await?;
    info!(employee_id = id, actor = %user.subject, "employee updated");
    Ok(Json(employee))
}

async fn delete_employee(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    state.employees.delete(id).await?;
    info!(employee_id = id, actor = %user.subject, "employee deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Only integer ids match an item route.
fn parse_id(raw: &str) -> ApiResult<i64> {
    raw.parse::<i64>().map_err(|_| ApiError::NotFound)
}

fn json_body(body: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}
