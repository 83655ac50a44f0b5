use async_trait::async_trait;
use serde_json::Value;

use crate::application::validation::{self, Input};
use crate::domain::duty::{Duty, DutyChange, DutyId};
use crate::domain::error::{AppError, ErrorCode};
use crate::domain::repository::DutyRepository;

/// Request orchestration: validate raw input, issue exactly one repository
/// call, map the outcome into a duty or an [`AppError`].
#[async_trait]
pub trait DutyService: Send + Sync + 'static {
    async fn list(&self) -> Result<Vec<Duty>, AppError>;
    async fn get(&self, id: &str) -> Result<Duty, AppError>;
    async fn create(&self, body: &Value) -> Result<Duty, AppError>;
    async fn update(&self, id: &str, body: &Value) -> Result<Duty, AppError>;
    async fn update_status(&self, id: &str, body: &Value) -> Result<Duty, AppError>;
    async fn delete(&self, id: &str) -> Result<Duty, AppError>;
}

#[derive(Clone)]
pub struct DutyServiceImpl<R: DutyRepository> {
    repo: R,
}

impl<R: DutyRepository> DutyServiceImpl<R> {
    pub fn new(repo: R) -> Self { Self { repo } }
}

/// Picks the single persistence path for an update body: `name` wins when
/// present, otherwise `is_completed`. Expects a body that already passed
/// `UPDATE_RULES`, which rejects one carrying neither field; `None` only
/// comes back for unvalidated input.
pub fn dispatch(body: &Value) -> Option<DutyChange> {
    if let Some(name) = body.get("name").and_then(Value::as_str) {
        return Some(DutyChange::Rename(name.trim().to_owned()));
    }
    body.get("is_completed").and_then(Value::as_bool).map(DutyChange::SetCompleted)
}

fn parse_id(raw: &str) -> Result<DutyId, AppError> {
    raw.parse().map_err(|_| AppError::from_code(ErrorCode::InvalidId, None))
}

fn found(raw_id: &str, duty: Option<Duty>) -> Result<Duty, AppError> {
    duty.ok_or_else(|| AppError::not_found(raw_id))
}

impl<R: DutyRepository> DutyServiceImpl<R> {
    async fn apply(&self, raw_id: &str, change: DutyChange) -> Result<Duty, AppError> {
        let id = parse_id(raw_id)?;
        let outcome = match change {
            DutyChange::Rename(name) => self.repo.update_name(id, &name).await,
            DutyChange::SetCompleted(done) => self.repo.update_status(id, done).await,
        };
        let duty = outcome.map_err(|e| {
            tracing::error!(id = raw_id, error = %format!("{e:#}"), "error updating duty");
            AppError::internal(&e)
        })?;
        found(raw_id, duty)
    }
}

#[async_trait]
impl<R: DutyRepository> DutyService for DutyServiceImpl<R> {
    async fn list(&self) -> Result<Vec<Duty>, AppError> {
        validation::first_violation(validation::LIST_RULES, &Input::default())?;
        self.repo.list().await.map_err(|e| {
            tracing::error!(error = %format!("{e:#}"), "error listing duties");
            AppError::internal(&e)
        })
    }

    async fn get(&self, raw_id: &str) -> Result<Duty, AppError> {
        validation::first_violation(validation::GET_RULES, &Input::path(raw_id))?;
        let id = parse_id(raw_id)?;
        let duty = self.repo.get(id).await.map_err(|e| {
            tracing::error!(id = raw_id, error = %format!("{e:#}"), "error getting duty");
            AppError::internal(&e)
        })?;
        found(raw_id, duty)
    }

    async fn create(&self, body: &Value) -> Result<Duty, AppError> {
        validation::first_violation(validation::CREATE_RULES, &Input::body(body))?;
        let name = body.get("name").and_then(Value::as_str).unwrap_or_default().trim();
        let duty = self.repo.create(name).await.map_err(|e| {
            tracing::error!(error = %format!("{e:#}"), "error creating duty");
            AppError::internal(&e)
        })?;
        tracing::debug!(id = %duty.id, "duty created");
        Ok(duty)
    }

    async fn update(&self, raw_id: &str, body: &Value) -> Result<Duty, AppError> {
        validation::first_violation(validation::UPDATE_RULES, &Input::path_and_body(raw_id, body))?;
        match dispatch(body) {
            Some(change) => self.apply(raw_id, change).await,
            None => Err(AppError::from_code(ErrorCode::ValidationFailed, None)),
        }
    }

    async fn update_status(&self, raw_id: &str, body: &Value) -> Result<Duty, AppError> {
        validation::first_violation(validation::UPDATE_STATUS_RULES, &Input::path_and_body(raw_id, body))?;
        let done = body.get("is_completed").and_then(Value::as_bool).unwrap_or_default();
        self.apply(raw_id, DutyChange::SetCompleted(done)).await
    }

    async fn delete(&self, raw_id: &str) -> Result<Duty, AppError> {
        validation::first_violation(validation::DELETE_RULES, &Input::path(raw_id))?;
        let id = parse_id(raw_id)?;
        let duty = self.repo.delete(id).await.map_err(|e| {
            tracing::error!(id = raw_id, error = %format!("{e:#}"), "error deleting duty");
            AppError::internal(&e)
        })?;
        found(raw_id, duty)
    }
}
