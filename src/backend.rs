//! Collaborator traits for the external backend.
//!
//! The catalog and the admin surface never talk to a concrete backend; they go
//! through these traits so the rest of the codebase is backend-agnostic:
//!
//! | Trait | Operations |
//! |-------|------------|
//! | [`ProjectRepository`] | list (ascending `display_order`), insert, update, delete |
//! | [`SettingsRepository`] | fetch the singleton row, patch it |
//! | [`ObjectStorageBackend`] | upload bytes under a caller-chosen name, resolve its public URL |
//! | [`SessionProvider`] | current session, role lookup, sign-out |
//! | [`NotificationSink`] | fire-and-forget user notices |
//!
//! The production implementations live in [`crate::store`].

use crate::types::{
    NewProject, Notice, Project, ProjectUpdate, RecordId, Role, Session, SettingsPatch,
    SiteSettings,
};
use std::fmt::Debug;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),
    /// A store-side failure, carrying the store's own message.
    #[error("{0}")]
    Backend(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub type RecordStore = Arc<dyn RecordStoreBackend>;
pub type ObjectStorage = Arc<dyn ObjectStorageBackend>;

#[async_trait::async_trait]
pub trait ProjectRepository: Send + Sync {
    /// All projects, sorted ascending by `display_order`.
    async fn list_projects(&self) -> StoreResult<Vec<Project>>;

    async fn insert_project(&self, project: &NewProject) -> StoreResult<Project>;

    async fn update_project(&self, id: &RecordId, update: &ProjectUpdate) -> StoreResult<()>;

    async fn delete_project(&self, id: &RecordId) -> StoreResult<()>;
}

#[async_trait::async_trait]
pub trait SettingsRepository: Send + Sync {
    /// The singleton settings row. [`StoreError::NotFound`] when absent.
    async fn get_settings(&self) -> StoreResult<SiteSettings>;

    async fn update_settings(&self, id: &RecordId, patch: &SettingsPatch) -> StoreResult<()>;
}

pub trait RecordStoreBackend: Debug + ProjectRepository + SettingsRepository {}

impl<T> RecordStoreBackend for T where T: Debug + ProjectRepository + SettingsRepository {}

#[async_trait::async_trait]
pub trait ObjectStorageBackend: Debug + Send + Sync {
    /// Store `data` as `bucket/filename`. Names are never deduplicated:
    /// uploading to an existing name fails.
    async fn upload(&self, bucket: &str, filename: &str, data: &[u8]) -> StoreResult<()>;

    /// Public URL under which `bucket/filename` is served.
    fn public_url(&self, bucket: &str, filename: &str) -> String;
}

#[async_trait::async_trait]
pub trait SessionProvider: Send + Sync {
    async fn current_session(&self) -> StoreResult<Option<Session>>;

    /// Role of `user_id`, or `None` if the user has no role row.
    async fn user_role(&self, user_id: &str) -> StoreResult<Option<Role>>;

    async fn sign_out(&self) -> StoreResult<()>;
}

pub trait NotificationSink: Send + Sync {
    fn notify(&self, notice: Notice);
}
