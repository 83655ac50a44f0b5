#[cfg(test)]
mod tests {
    use super::super::duty_service::{dispatch, DutyService, DutyServiceImpl};
    use super::super::seed::{seed_if_empty, DEFAULT_DUTIES};
    use crate::domain::{duty::{Duty, DutyChange, DutyId}, error::{ErrorCode, ErrorKind}, repository::DutyRepository};
    use anyhow::{Context, Result};
    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    const MISSING: &str = "00000000-0000-0000-0000-000000000000";

    fn pause() { std::thread::sleep(std::time::Duration::from_millis(2)); }

    #[derive(Clone, Default)]
    struct InMemoryRepo {
        items: Arc<Mutex<Vec<Duty>>>,
        calls: Arc<AtomicUsize>,
    }

    impl InMemoryRepo {
        fn touch(&self) { self.calls.fetch_add(1, Ordering::SeqCst); }
        fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }

        fn modify(&self, id: DutyId, f: impl FnOnce(&mut Duty)) -> Option<Duty> {
            let mut items = self.items.lock().unwrap();
            let duty = items.iter_mut().find(|d| d.id == id)?;
            f(duty);
            duty.updated_at = Utc::now();
            Some(duty.clone())
        }
    }

    #[async_trait]
    impl DutyRepository for InMemoryRepo {
        async fn init(&self) -> Result<()> { Ok(()) }
        async fn list(&self) -> Result<Vec<Duty>> { self.touch(); Ok(self.items.lock().unwrap().clone()) }
        async fn get(&self, id: DutyId) -> Result<Option<Duty>> {
            self.touch();
            Ok(self.items.lock().unwrap().iter().find(|d| d.id == id).cloned())
        }
        async fn create(&self, name: &str) -> Result<Duty> {
            self.touch();
            let now = Utc::now();
            let duty = Duty { id: DutyId::new(), name: name.to_owned(), is_completed: false, created_at: now, updated_at: now };
            self.items.lock().unwrap().push(duty.clone());
            Ok(duty)
        }
        async fn update_name(&self, id: DutyId, name: &str) -> Result<Option<Duty>> {
            self.touch();
            Ok(self.modify(id, |d| d.name = name.to_owned()))
        }
        async fn update_status(&self, id: DutyId, is_completed: bool) -> Result<Option<Duty>> {
            self.touch();
            Ok(self.modify(id, |d| d.is_completed = is_completed))
        }
        async fn delete(&self, id: DutyId) -> Result<Option<Duty>> {
            self.touch();
            let mut items = self.items.lock().unwrap();
            let pos = items.iter().position(|d| d.id == id);
            Ok(pos.map(|i| items.remove(i)))
        }
    }

    #[derive(Clone, Default)]
    struct BrokenRepo;

    fn broken<T>(op: &'static str) -> Result<T> {
        Err(anyhow::anyhow!("connection refused")).context(op)
    }

    #[async_trait]
    impl DutyRepository for BrokenRepo {
        async fn init(&self) -> Result<()> { Ok(()) }
        async fn list(&self) -> Result<Vec<Duty>> { broken("Failed to get duties") }
        async fn get(&self, _: DutyId) -> Result<Option<Duty>> { broken("Failed to get duty") }
        async fn create(&self, _: &str) -> Result<Duty> { broken("Failed to create duty") }
        async fn update_name(&self, _: DutyId, _: &str) -> Result<Option<Duty>> { broken("Failed to update duty name") }
        async fn update_status(&self, _: DutyId, _: bool) -> Result<Option<Duty>> { broken("Failed to update duty status") }
        async fn delete(&self, _: DutyId) -> Result<Option<Duty>> { broken("Failed to delete duty") }
    }

    #[tokio::test]
    async fn unit_create_and_get() {
        let service = DutyServiceImpl::new(InMemoryRepo::default());
        let created = service.create(&json!({ "name": "X" })).await.unwrap();
        assert_eq!(created.name, "X");
        assert!(!created.is_completed);
        assert_eq!(created.created_at, created.updated_at);
        let got = service.get(&created.id.to_string()).await.unwrap();
        assert_eq!(got.id, created.id);
    }

    #[tokio::test]
    async fn create_trims_name() {
        let service = DutyServiceImpl::new(InMemoryRepo::default());
        let created = service.create(&json!({ "name": "  Water plants  " })).await.unwrap();
        assert_eq!(created.name, "Water plants");
    }

    #[tokio::test]
    async fn invalid_name_persists_nothing() {
        let repo = InMemoryRepo::default();
        let service = DutyServiceImpl::new(repo.clone());
        for body in [json!({ "name": "" }), json!({ "name": "   " }), json!({ "name": "x".repeat(101) }), json!({ "name": 5 }), json!({})] {
            let err = service.create(&body).await.unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidName);
        }
        assert_eq!(repo.calls(), 0);
        assert!(repo.items.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_id_never_reaches_storage() {
        let repo = InMemoryRepo::default();
        let service = DutyServiceImpl::new(repo.clone());
        for raw in ["42", "abc", "3f2b8c1e5d4a4b6f9e217a0c4d9e8b13", ""] {
            assert_eq!(service.get(raw).await.unwrap_err().code, ErrorCode::InvalidId);
            assert_eq!(service.update(raw, &json!({ "name": "y" })).await.unwrap_err().code, ErrorCode::InvalidId);
            assert_eq!(service.update_status(raw, &json!({ "is_completed": true })).await.unwrap_err().code, ErrorCode::InvalidId);
            assert_eq!(service.delete(raw).await.unwrap_err().code, ErrorCode::InvalidId);
        }
        assert_eq!(repo.calls(), 0);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let service = DutyServiceImpl::new(InMemoryRepo::default());
        let err = service.get(MISSING).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.details.as_deref(), Some(format!("Duty with ID {MISSING} not found").as_str()));
        assert_eq!(service.update(MISSING, &json!({ "name": "y" })).await.unwrap_err().code, ErrorCode::NotFound);
        assert_eq!(service.update(MISSING, &json!({ "is_completed": true })).await.unwrap_err().code, ErrorCode::NotFound);
        assert_eq!(service.delete(MISSING).await.unwrap_err().code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn update_dispatches_one_field() {
        let service = DutyServiceImpl::new(InMemoryRepo::default());
        let created = service.create(&json!({ "name": "Original" })).await.unwrap();
        let id = created.id.to_string();
        pause();

        let renamed = service.update(&id, &json!({ "name": "Renamed" })).await.unwrap();
        assert_eq!(renamed.name, "Renamed");
        assert!(!renamed.is_completed);
        assert!(renamed.updated_at > created.updated_at);
        pause();

        let done = service.update(&id, &json!({ "is_completed": true })).await.unwrap();
        assert_eq!(done.name, "Renamed");
        assert!(done.is_completed);
        assert!(done.updated_at > renamed.updated_at);
        assert_eq!(done.created_at, created.created_at);
    }

    #[tokio::test]
    async fn update_with_both_fields_only_renames() {
        let service = DutyServiceImpl::new(InMemoryRepo::default());
        let created = service.create(&json!({ "name": "Original" })).await.unwrap();
        let updated = service.update(&created.id.to_string(), &json!({ "name": "New", "is_completed": true })).await.unwrap();
        assert_eq!(updated.name, "New");
        assert!(!updated.is_completed);
    }

    #[tokio::test]
    async fn update_without_fields_is_rejected() {
        let repo = InMemoryRepo::default();
        let service = DutyServiceImpl::new(repo.clone());
        let err = service.update(MISSING, &json!({})).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(repo.calls(), 0);
    }

    #[tokio::test]
    async fn delete_returns_last_state_then_not_found() {
        let service = DutyServiceImpl::new(InMemoryRepo::default());
        let created = service.create(&json!({ "name": "Gone soon" })).await.unwrap();
        let id = created.id.to_string();
        let deleted = service.delete(&id).await.unwrap();
        assert_eq!(deleted, created);
        assert_eq!(service.delete(&id).await.unwrap_err().code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn list_empty_is_ok() {
        let service = DutyServiceImpl::new(InMemoryRepo::default());
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn storage_failures_become_internal_errors() {
        let service = DutyServiceImpl::new(BrokenRepo);
        let err = service.list().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.message, "Internal Server Error");
        assert_eq!(err.details.as_deref(), Some("Failed to get duties: connection refused"));

        let err = service.update_status(MISSING, &json!({ "is_completed": false })).await.unwrap_err();
        assert_eq!(err.details.as_deref(), Some("Failed to update duty status: connection refused"));

        assert_eq!(service.create(&json!({ "name": "x" })).await.unwrap_err().code, ErrorCode::InternalServerError);
        assert_eq!(service.get(MISSING).await.unwrap_err().code, ErrorCode::InternalServerError);
        assert_eq!(service.delete(MISSING).await.unwrap_err().code, ErrorCode::InternalServerError);
    }

    #[test]
    fn dispatch_prefers_name() {
        assert_eq!(dispatch(&json!({ "name": " a ", "is_completed": true })), Some(DutyChange::Rename("a".into())));
        assert_eq!(dispatch(&json!({ "is_completed": false })), Some(DutyChange::SetCompleted(false)));
        assert_eq!(dispatch(&json!({})), None);
    }

    #[tokio::test]
    async fn seed_only_fills_empty_table() {
        let repo = InMemoryRepo::default();
        assert_eq!(seed_if_empty(&repo, DEFAULT_DUTIES).await.unwrap(), 3);
        assert_eq!(seed_if_empty(&repo, DEFAULT_DUTIES).await.unwrap(), 0);
        let names: Vec<_> = repo.list().await.unwrap().into_iter().map(|d| d.name).collect();
        assert_eq!(names, DEFAULT_DUTIES);
    }
}
