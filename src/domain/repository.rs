use async_trait::async_trait;
use super::duty::{Duty, DutyId};

/// Storage for duties. "Not found" is an empty result, never an error;
/// errors are reserved for storage failures.
#[async_trait]
pub trait DutyRepository: Send + Sync + 'static {
    async fn init(&self) -> anyhow::Result<()>;
    async fn list(&self) -> anyhow::Result<Vec<Duty>>;
    async fn get(&self, id: DutyId) -> anyhow::Result<Option<Duty>>;
    async fn create(&self, name: &str) -> anyhow::Result<Duty>;
    async fn update_name(&self, id: DutyId, name: &str) -> anyhow::Result<Option<Duty>>;
    async fn update_status(&self, id: DutyId, is_completed: bool) -> anyhow::Result<Option<Duty>>;
    async fn delete(&self, id: DutyId) -> anyhow::Result<Option<Duty>>;
}
