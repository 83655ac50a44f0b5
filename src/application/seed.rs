use anyhow::Result;

use crate::domain::repository::DutyRepository;

pub const DEFAULT_DUTIES: &[&str] = &["Finish project proposal", "Schedule team meeting", "Buy groceries"];

/// Inserts one duty per name when the table is empty. Returns the number of
/// rows inserted.
pub async fn seed_if_empty<R: DutyRepository>(repo: &R, names: &[&str]) -> Result<usize> {
    if !repo.list().await?.is_empty() {
        tracing::info!("duties table already contains data, skipping seed");
        return Ok(0);
    }
    for name in names {
        repo.create(name).await?;
    }
    tracing::info!(count = names.len(), "database seeded");
    Ok(names.len())
}
