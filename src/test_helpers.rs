//! Shared test utilities for the folio test suite.
//!
//! Provides recording doubles for every collaborator trait plus fixture
//! builders for projects and settings.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let store = RecordingStore::with_projects(vec![project("a", 0), project("b", 1)]);
//! store.fail(StoreOp::ListProjects, "connection reset");
//!
//! let mut catalog = Catalog::new(
//!     Arc::new(store.clone()),
//!     Arc::new(RecordingStorage::new()),
//!     Buckets::default(),
//! );
//! assert!(catalog.load().await.is_err());
//! assert_eq!(store.calls(), vec![StoreOp::ListProjects, StoreOp::GetSettings]);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::backend::{
    NotificationSink, ObjectStorageBackend, ProjectRepository, SessionProvider,
    SettingsRepository, StoreError, StoreResult,
};
use crate::store::{JsonStore, StoreState};
use crate::types::{
    NewProject, Notice, Project, ProjectUpdate, RecordId, Role, Session, SettingsPatch,
    SiteSettings,
};

// =========================================================================
// Fixtures
// =========================================================================

/// A project with a predictable id (`id-{title}`).
pub fn project(title: &str, display_order: i64) -> Project {
    Project {
        id: RecordId::new(format!("id-{title}")),
        title: title.to_string(),
        description: format!("About {title}"),
        tech: vec!["Rust".to_string()],
        link: "#".to_string(),
        display_order,
        image_url: None,
    }
}

pub fn settings(contact_link: Option<&str>) -> SiteSettings {
    SiteSettings {
        id: RecordId::new("settings-1"),
        profile_image_url: None,
        contact_link: contact_link.map(str::to_string),
    }
}

// =========================================================================
// Record store double
// =========================================================================

/// Store operations, recorded in call order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    ListProjects,
    InsertProject,
    UpdateProject,
    DeleteProject,
    GetSettings,
    UpdateSettings,
}

/// In-memory record store that records every call and can be told to fail
/// specific operations with a given message.
#[derive(Debug, Clone)]
pub struct RecordingStore {
    inner: Arc<JsonStore>,
    calls: Arc<Mutex<Vec<StoreOp>>>,
    failures: Arc<Mutex<HashMap<StoreOp, String>>>,
}

impl RecordingStore {
    pub fn with_state(state: StoreState) -> Self {
        Self {
            inner: Arc::new(JsonStore::in_memory(state)),
            calls: Arc::new(Mutex::new(Vec::new())),
            failures: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Store holding `projects` and the [`settings`] fixture.
    pub fn with_projects(projects: Vec<Project>) -> Self {
        Self::with_state(StoreState {
            projects,
            settings: Some(settings(Some("https://t.me/fixture"))),
            ..Default::default()
        })
    }

    /// Make every later call of `op` fail with `message`.
    pub fn fail(&self, op: StoreOp, message: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert(op, message.to_string());
    }

    pub fn heal(&self, op: StoreOp) {
        self.failures.lock().unwrap().remove(&op);
    }

    pub fn calls(&self) -> Vec<StoreOp> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Whether any write (insert/update/delete/settings update) was attempted.
    pub fn wrote(&self) -> bool {
        self.calls().iter().any(|op| {
            matches!(
                op,
                StoreOp::InsertProject
                    | StoreOp::UpdateProject
                    | StoreOp::DeleteProject
                    | StoreOp::UpdateSettings
            )
        })
    }

    pub async fn stored_projects(&self) -> Vec<Project> {
        self.inner.snapshot().await.projects
    }

    fn record(&self, op: StoreOp) -> StoreResult<()> {
        self.calls.lock().unwrap().push(op);
        match self.failures.lock().unwrap().get(&op) {
            Some(message) => Err(StoreError::Backend(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl ProjectRepository for RecordingStore {
    async fn list_projects(&self) -> StoreResult<Vec<Project>> {
        self.record(StoreOp::ListProjects)?;
        self.inner.list_projects().await
    }

    async fn insert_project(&self, project: &NewProject) -> StoreResult<Project> {
        self.record(StoreOp::InsertProject)?;
        self.inner.insert_project(project).await
    }

    async fn update_project(&self, id: &RecordId, update: &ProjectUpdate) -> StoreResult<()> {
        self.record(StoreOp::UpdateProject)?;
        self.inner.update_project(id, update).await
    }

    async fn delete_project(&self, id: &RecordId) -> StoreResult<()> {
        self.record(StoreOp::DeleteProject)?;
        self.inner.delete_project(id).await
    }
}

#[async_trait::async_trait]
impl SettingsRepository for RecordingStore {
    async fn get_settings(&self) -> StoreResult<SiteSettings> {
        self.record(StoreOp::GetSettings)?;
        self.inner.get_settings().await
    }

    async fn update_settings(&self, id: &RecordId, patch: &SettingsPatch) -> StoreResult<()> {
        self.record(StoreOp::UpdateSettings)?;
        self.inner.update_settings(id, patch).await
    }
}

// =========================================================================
// Object storage double
// =========================================================================

/// Object storage that keeps uploads in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingStorage {
    uploads: Arc<Mutex<Vec<(String, String, Vec<u8>)>>>,
    failure: Option<String>,
}

impl RecordingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage whose uploads all fail with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// `(bucket, filename)` of every successful upload.
    pub fn uploads(&self) -> Vec<(String, String)> {
        self.uploads
            .lock()
            .unwrap()
            .iter()
            .map(|(bucket, name, _)| (bucket.clone(), name.clone()))
            .collect()
    }
}

#[async_trait::async_trait]
impl ObjectStorageBackend for RecordingStorage {
    async fn upload(&self, bucket: &str, filename: &str, data: &[u8]) -> StoreResult<()> {
        if let Some(message) = &self.failure {
            return Err(StoreError::Backend(message.clone()));
        }
        self.uploads
            .lock()
            .unwrap()
            .push((bucket.to_string(), filename.to_string(), data.to_vec()));
        Ok(())
    }

    fn public_url(&self, bucket: &str, filename: &str) -> String {
        format!("https://storage.test/{bucket}/{filename}")
    }
}

// =========================================================================
// Session and notification doubles
// =========================================================================

/// Session provider with a fixed session and role table.
#[derive(Debug, Default)]
pub struct FixedSessions {
    pub session: Mutex<Option<Session>>,
    pub roles: HashMap<String, Role>,
    pub role_lookup_error: Option<String>,
}

impl FixedSessions {
    pub fn signed_in(user_id: &str, role: Option<Role>) -> Self {
        let mut roles = HashMap::new();
        if let Some(role) = role {
            roles.insert(user_id.to_string(), role);
        }
        Self {
            session: Mutex::new(Some(Session {
                user_id: user_id.to_string(),
            })),
            roles,
            role_lookup_error: None,
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SessionProvider for FixedSessions {
    async fn current_session(&self) -> StoreResult<Option<Session>> {
        Ok(self.session.lock().unwrap().clone())
    }

    async fn user_role(&self, user_id: &str) -> StoreResult<Option<Role>> {
        if let Some(message) = &self.role_lookup_error {
            return Err(StoreError::Backend(message.clone()));
        }
        Ok(self.roles.get(user_id).cloned())
    }

    async fn sign_out(&self) -> StoreResult<()> {
        self.session.lock().unwrap().take();
        Ok(())
    }
}

/// Notification sink that keeps every notice.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    /// The only notice sent. Panics if there were zero or several.
    pub fn single(&self) -> Notice {
        let notices = self.notices();
        assert_eq!(notices.len(), 1, "expected one notice, got {notices:?}");
        notices[0].clone()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}
