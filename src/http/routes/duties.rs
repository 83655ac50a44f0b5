use axum::extract::{rejection::{JsonRejection, PathRejection}, Path, State};
use axum::http::StatusCode;
use axum::{routing::{get, put}, Json, Router};
use serde_json::Value;

use crate::{application::duty_service::DutyService, domain::{duty::Duty, error::AppError}, http::types::method_not_allowed};

#[derive(Clone)]
pub struct AppState<S: DutyService> { pub service: S }

pub fn router<S: DutyService + Clone + Send + Sync + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/duties", get(list_duties::<S>).post(create_duty::<S>).fallback(method_not_allowed))
        .route("/duties/:id", get(get_duty::<S>).put(update_duty::<S>).delete(delete_duty::<S>).fallback(method_not_allowed))
        .route("/duties/:id/status", put(update_duty_status::<S>).fallback(method_not_allowed))
        .with_state(state)
}

type IdParam = Result<Path<String>, PathRejection>;
type JsonBody = Result<Json<Value>, JsonRejection>;

async fn list_duties<S: DutyService>(State(state): State<AppState<S>>) -> Result<Json<Vec<Duty>>, AppError> {
    state.service.list().await.map(Json)
}

async fn get_duty<S: DutyService>(State(state): State<AppState<S>>, id: IdParam) -> Result<Json<Duty>, AppError> {
    let id = path_id(id)?;
    state.service.get(&id).await.map(Json)
}

async fn create_duty<S: DutyService>(State(state): State<AppState<S>>, body: JsonBody) -> Result<(StatusCode, Json<Duty>), AppError> {
    let body = json_body(body)?;
    let duty = state.service.create(&body).await?;
    Ok((StatusCode::CREATED, Json(duty)))
}

async fn update_duty<S: DutyService>(State(state): State<AppState<S>>, id: IdParam, body: JsonBody) -> Result<Json<Duty>, AppError> {
    let id = path_id(id)?;
    let body = json_body(body)?;
    state.service.update(&id, &body).await.map(Json)
}

async fn update_duty_status<S: DutyService>(State(state): State<AppState<S>>, id: IdParam, body: JsonBody) -> Result<Json<Duty>, AppError> {
    let id = path_id(id)?;
    let body = json_body(body)?;
    state.service.update_status(&id, &body).await.map(Json)
}

async fn delete_duty<S: DutyService>(State(state): State<AppState<S>>, id: IdParam) -> Result<StatusCode, AppError> {
    let id = path_id(id)?;
    state.service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn path_id(id: IdParam) -> Result<String, AppError> {
    id.map(|Path(id)| id).map_err(|rejection| AppError::invalid_path(rejection.body_text()))
}

/// A body sent without a JSON content type is read as `{}` so the rule table
/// still decides the outcome; JSON that fails to parse is rejected.
fn json_body(body: JsonBody) -> Result<Value, AppError> {
    match body {
        Ok(Json(body)) => Ok(body),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(Value::Object(Default::default())),
        Err(rejection) => Err(AppError::invalid_json(rejection.body_text())),
    }
}
