//! Concrete backends: a JSON-file record store and local-directory object storage.
//!
//! ## Record store file
//!
//! [`JsonStore`] keeps every collection in one JSON document and rewrites it
//! after each confirmed write:
//!
//! ```json
//! {
//!   "projects": [ { "id": "…", "title": "…", "display_order": 0, … } ],
//!   "settings": { "id": "…", "profile_image_url": null, "contact_link": null },
//!   "user_roles": { "alice": "admin" }
//! }
//! ```
//!
//! A missing file is treated as an empty store with a fresh settings row, so a
//! first run needs no setup beyond granting someone the `admin` role.
//!
//! ## Object storage layout
//!
//! [`LocalObjectStorage`] writes `<root>/<bucket>/<filename>` and serves it as
//! `<public_base_url>/<bucket>/<filename>`.

use crate::backend::{
    ObjectStorage, ObjectStorageBackend, ProjectRepository, SessionProvider, SettingsRepository,
    StoreError, StoreResult,
};
use crate::types::{
    NewProject, Project, ProjectUpdate, RecordId, Role, Session, SettingsPatch, SiteSettings,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

/// Everything the record store holds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreState {
    pub projects: Vec<Project>,
    pub settings: Option<SiteSettings>,
    pub user_roles: BTreeMap<String, Role>,
}

impl StoreState {
    /// Empty state with a freshly created settings row.
    pub fn seeded() -> Self {
        Self {
            settings: Some(SiteSettings {
                id: new_record_id(),
                profile_image_url: None,
                contact_link: None,
            }),
            ..Default::default()
        }
    }
}

fn new_record_id() -> RecordId {
    RecordId::new(uuid::Uuid::new_v4().to_string())
}

/// Record store backed by a single JSON file, or by nothing at all.
#[derive(Debug)]
pub struct JsonStore {
    path: Option<PathBuf>,
    state: Mutex<StoreState>,
    session: Mutex<Option<Session>>,
}

impl JsonStore {
    /// A store that lives only in memory.
    pub fn in_memory(state: StoreState) -> Self {
        Self {
            path: None,
            state: Mutex::new(state),
            session: Mutex::new(None),
        }
    }

    /// Open the store file at `path`, creating an empty seeded store if the
    /// file does not exist yet. Nothing is written until the first write.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let state = match fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "store file missing, starting empty");
                StoreState::seeded()
            }
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            path: Some(path),
            state: Mutex::new(state),
            session: Mutex::new(None),
        })
    }

    /// Act as `user_id` until [`SessionProvider::sign_out`].
    pub fn with_session(self, user_id: impl Into<String>) -> Self {
        Self {
            session: Mutex::new(Some(Session {
                user_id: user_id.into(),
            })),
            ..self
        }
    }

    /// Grant `role` to `user_id`, replacing any previous role.
    pub async fn set_role(&self, user_id: &str, role: Role) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        next.user_roles.insert(user_id.to_string(), role);
        self.commit(&mut state, next).await
    }

    /// Clone of the current contents.
    pub async fn snapshot(&self) -> StoreState {
        self.state.lock().await.clone()
    }

    /// Write `next` to disk, then make it the live state. A failed write
    /// leaves the live state untouched.
    async fn commit(&self, state: &mut StoreState, next: StoreState) -> StoreResult<()> {
        self.persist(&next).await?;
        *state = next;
        Ok(())
    }

    async fn persist(&self, state: &StoreState) -> StoreResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(state)?;
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, json).await?;
        fs::rename(&temp_path, path).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProjectRepository for JsonStore {
    async fn list_projects(&self) -> StoreResult<Vec<Project>> {
        let mut projects = self.state.lock().await.projects.clone();
        projects.sort_by_key(|p| p.display_order);
        Ok(projects)
    }

    async fn insert_project(&self, project: &NewProject) -> StoreResult<Project> {
        let mut state = self.state.lock().await;
        let record = project.clone().into_project(new_record_id());
        let mut next = state.clone();
        next.projects.push(record.clone());
        self.commit(&mut state, next).await?;
        Ok(record)
    }

    async fn update_project(&self, id: &RecordId, update: &ProjectUpdate) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        let project = next
            .projects
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        project.title = update.title.clone();
        project.description = update.description.clone();
        project.tech = update.tech.clone();
        project.link = update.link.clone();
        project.image_url = update.image_url.clone();
        self.commit(&mut state, next).await
    }

    async fn delete_project(&self, id: &RecordId) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        next.projects.retain(|p| &p.id != id);
        if next.projects.len() == state.projects.len() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.commit(&mut state, next).await
    }
}

#[async_trait::async_trait]
impl SettingsRepository for JsonStore {
    async fn get_settings(&self) -> StoreResult<SiteSettings> {
        self.state
            .lock()
            .await
            .settings
            .clone()
            .ok_or_else(|| StoreError::NotFound("settings".to_string()))
    }

    async fn update_settings(&self, id: &RecordId, patch: &SettingsPatch) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        let settings = next
            .settings
            .as_mut()
            .filter(|s| &s.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        patch.apply_to(settings);
        self.commit(&mut state, next).await
    }
}

#[async_trait::async_trait]
impl SessionProvider for JsonStore {
    async fn current_session(&self) -> StoreResult<Option<Session>> {
        Ok(self.session.lock().await.clone())
    }

    async fn user_role(&self, user_id: &str) -> StoreResult<Option<Role>> {
        Ok(self.state.lock().await.user_roles.get(user_id).cloned())
    }

    async fn sign_out(&self) -> StoreResult<()> {
        self.session.lock().await.take();
        Ok(())
    }
}

/// Object storage on the local filesystem.
#[derive(Clone, Debug)]
pub struct LocalObjectStorage {
    location: PathBuf,
    public_base_url: String,
}

impl LocalObjectStorage {
    pub async fn open(
        location: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
    ) -> StoreResult<ObjectStorage> {
        let location = location.into();
        fs::create_dir_all(&location).await?;
        Ok(Arc::new(LocalObjectStorage {
            location,
            public_base_url: public_base_url.into(),
        }))
    }
}

/// Write `data` to the freshly created object at `path`; on failure the
/// partial file is removed so the name can be reused.
async fn write_or_discard(
    mut writer: impl AsyncWrite + Unpin,
    path: &Path,
    data: &[u8],
) -> StoreResult<()> {
    let written = async {
        writer.write_all(data).await?;
        writer.flush().await
    }
    .await;
    if let Err(err) = written {
        drop(writer);
        if let Err(cleanup) = fs::remove_file(path).await {
            tracing::warn!(path = %path.display(), error = %cleanup, "failed to remove partial object");
        }
        return Err(err.into());
    }
    Ok(())
}

/// Bucket and object names are single path components.
fn check_object_name(name: &str) -> StoreResult<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(StoreError::Backend(format!("Invalid object name: {name:?}")));
    }
    Ok(())
}

#[async_trait::async_trait]
impl ObjectStorageBackend for LocalObjectStorage {
    async fn upload(&self, bucket: &str, filename: &str, data: &[u8]) -> StoreResult<()> {
        check_object_name(bucket)?;
        check_object_name(filename)?;

        let dir = self.location.join(bucket);
        fs::create_dir_all(&dir).await?;

        let path = dir.join(filename);
        let file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(StoreError::Backend("The resource already exists".to_string()));
            }
            Err(err) => return Err(err.into()),
        };
        write_or_discard(file, &path, data).await?;

        tracing::debug!(bucket, filename, bytes = data.len(), "object stored");
        Ok(())
    }

    fn public_url(&self, bucket: &str, filename: &str) -> String {
        format!(
            "{}/{}/{}",
            self.public_base_url.trim_end_matches('/'),
            bucket,
            filename
        )
    }
}
