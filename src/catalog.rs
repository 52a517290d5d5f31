//! The project catalog: the in-memory mirror of the project list and the
//! singleton settings row.
//!
//! One [`Catalog`] is owned per page session and every admin action goes
//! through it. The external store is authoritative, so mutations follow a
//! strict **confirm, then refresh** cycle:
//!
//! 1. Validate the input locally. Validation failures never reach the store.
//! 2. Resolve media (possibly uploading a file).
//! 3. Send the write and wait for the store to acknowledge it.
//! 4. Apply the confirmed change to the in-memory state.
//! 5. Reload everything from the store with [`Catalog::load`].
//!
//! Step 5 picks up server-assigned fields and anything another writer did.
//! A failed refresh is logged but does not turn a confirmed write into an
//! error.
//!
//! ## Ordering
//!
//! Projects are shown ascending by `display_order`. A new project gets the
//! current list length as its order; deletes leave gaps and nothing is ever
//! renumbered, so orders may be sparse or even repeat. Sorting is purely by
//! value and stable for ties.

use crate::backend::{ObjectStorage, RecordStore, StoreError};
use crate::resolve::{self, FormMode, MediaInput, MediaUpload, ObjectKind};
use crate::tags::parse_tech_list;
use crate::types::{
    NO_LINK, NewProject, Project, ProjectDraft, ProjectEdit, ProjectUpdate, RecordId,
    SettingsPatch, SiteSettings,
};
use thiserror::Error;

const REQUIRED_FIELDS_MESSAGE: &str = "Please fill in all required fields";

#[derive(Error, Debug)]
pub enum CatalogError {
    /// Missing required input; raised before any store call.
    #[error("{0}")]
    Validation(String),
    /// Reading from the store failed. Carries the store's message.
    #[error("{0}")]
    Fetch(String),
    /// The store rejected a write. Carries the store's message.
    #[error("{0}")]
    Write(String),
    /// Object storage rejected an upload. Carries the storage message.
    #[error("{0}")]
    Upload(String),
    #[error("Settings have not been loaded yet")]
    NotInitialized,
    #[error("Project {0} no longer exists")]
    NotFound(RecordId),
}

/// Storage buckets for uploaded media.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buckets {
    pub projects: String,
    pub profile: String,
}

impl Default for Buckets {
    fn default() -> Self {
        Self {
            projects: "project-images".to_string(),
            profile: "profile-images".to_string(),
        }
    }
}

#[derive(Debug)]
pub struct Catalog {
    store: RecordStore,
    storage: ObjectStorage,
    buckets: Buckets,
    projects: Vec<Project>,
    settings: Option<SiteSettings>,
}

impl Catalog {
    /// An empty catalog. Call [`Catalog::load`] to populate it.
    pub fn new(store: RecordStore, storage: ObjectStorage, buckets: Buckets) -> Self {
        Self {
            store,
            storage,
            buckets,
            projects: Vec::new(),
            settings: None,
        }
    }

    /// Projects in display order.
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn project(&self, id: &RecordId) -> Option<&Project> {
        self.projects.iter().find(|p| &p.id == id)
    }

    /// The settings row, once a load has fetched it.
    pub fn settings(&self) -> Option<&SiteSettings> {
        self.settings.as_ref()
    }

    /// Fetch projects and settings concurrently.
    ///
    /// Each half is applied as soon as it succeeds, independently of the
    /// other; a failure in one never discards the other's result. If either
    /// failed the first failure is returned as [`CatalogError::Fetch`].
    pub async fn load(&mut self) -> Result<(), CatalogError> {
        let (projects, settings) =
            tokio::join!(self.store.list_projects(), self.store.get_settings());

        let mut failure: Option<String> = None;

        match projects {
            Ok(mut projects) => {
                projects.sort_by_key(|p| p.display_order);
                self.projects = projects;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to fetch projects");
                failure.get_or_insert(err.to_string());
            }
        }

        match settings {
            Ok(settings) => self.settings = Some(settings),
            Err(err) => {
                tracing::warn!(error = %err, "failed to fetch settings");
                failure.get_or_insert(err.to_string());
            }
        }

        tracing::debug!(
            projects = self.projects.len(),
            settings = self.settings.is_some(),
            "catalog loaded"
        );

        match failure {
            Some(message) => Err(CatalogError::Fetch(message)),
            None => Ok(()),
        }
    }

    /// Add a project at the end of the list.
    pub async fn create(
        &mut self,
        draft: ProjectDraft,
        media: MediaInput,
    ) -> Result<Project, CatalogError> {
        if is_blank(&draft.title) || is_blank(&draft.description) {
            return Err(CatalogError::Validation(REQUIRED_FIELDS_MESSAGE.to_string()));
        }

        let display_order = self.projects.len() as i64;
        let image_url = resolve::resolve_media(
            media,
            FormMode::Create,
            self.storage.as_ref(),
            &self.buckets.projects,
        )
        .await
        .map_err(|err| CatalogError::Upload(err.to_string()))?;

        let new_project = NewProject {
            tech: parse_tech_list(&draft.tech),
            link: normalize_link(&draft.link),
            title: draft.title,
            description: draft.description,
            display_order,
            image_url,
        };

        let created = self
            .store
            .insert_project(&new_project)
            .await
            .map_err(|err| CatalogError::Write(err.to_string()))?;
        tracing::info!(project_id = %created.id, display_order, "project created");

        self.projects.push(created.clone());
        self.refresh().await;
        Ok(created)
    }

    /// Replace a project's editable fields. `display_order` is left alone.
    pub async fn update(&mut self, edit: ProjectEdit, media: MediaInput) -> Result<(), CatalogError> {
        if is_blank(&edit.title) {
            return Err(CatalogError::Validation(REQUIRED_FIELDS_MESSAGE.to_string()));
        }

        let image_url = resolve::resolve_media(
            media,
            FormMode::Edit {
                stored: edit.stored_image_url.as_deref(),
            },
            self.storage.as_ref(),
            &self.buckets.projects,
        )
        .await
        .map_err(|err| CatalogError::Upload(err.to_string()))?;

        let update = ProjectUpdate {
            title: edit.title,
            description: edit.description,
            tech: edit.tech,
            link: normalize_link(&edit.link),
            image_url,
        };

        self.store
            .update_project(&edit.id, &update)
            .await
            .map_err(|err| write_error(err, &edit.id))?;
        tracing::info!(project_id = %edit.id, "project updated");

        if let Some(project) = self.projects.iter_mut().find(|p| p.id == edit.id) {
            project.title = update.title;
            project.description = update.description;
            project.tech = update.tech;
            project.link = update.link;
            project.image_url = update.image_url;
        }
        self.refresh().await;
        Ok(())
    }

    /// Remove a project. Remaining orders are not renumbered.
    pub async fn delete(&mut self, id: &RecordId) -> Result<(), CatalogError> {
        self.store
            .delete_project(id)
            .await
            .map_err(|err| write_error(err, id))?;
        tracing::info!(project_id = %id, "project deleted");

        self.projects.retain(|p| &p.id != id);
        self.refresh().await;
        Ok(())
    }

    /// Patch the settings row. Requires a prior successful settings fetch.
    pub async fn update_settings(&mut self, patch: SettingsPatch) -> Result<(), CatalogError> {
        let id = self
            .settings
            .as_ref()
            .map(|s| s.id.clone())
            .ok_or(CatalogError::NotInitialized)?;

        self.store
            .update_settings(&id, &patch)
            .await
            .map_err(|err| CatalogError::Write(err.to_string()))?;
        tracing::info!(settings_id = %id, "settings updated");

        if let Some(settings) = self.settings.as_mut() {
            patch.apply_to(settings);
        }
        self.refresh().await;
        Ok(())
    }

    /// Upload a new profile picture and point the settings row at it.
    pub async fn upload_profile_image(
        &mut self,
        upload: &MediaUpload,
    ) -> Result<String, CatalogError> {
        if self.settings.is_none() {
            return Err(CatalogError::NotInitialized);
        }

        let url = resolve::upload_media(
            self.storage.as_ref(),
            &self.buckets.profile,
            ObjectKind::ProfileImage,
            upload,
        )
        .await
        .map_err(|err| CatalogError::Upload(err.to_string()))?;

        self.update_settings(SettingsPatch {
            profile_image_url: Some(url.clone()),
            contact_link: None,
        })
        .await?;
        Ok(url)
    }

    /// Set the contact call-to-action target.
    pub async fn update_contact_link(&mut self, link: &str) -> Result<(), CatalogError> {
        self.update_settings(SettingsPatch {
            profile_image_url: None,
            contact_link: Some(link.trim().to_string()),
        })
        .await
    }

    async fn refresh(&mut self) {
        if let Err(err) = self.load().await {
            tracing::warn!(error = %err, "refresh after write failed");
        }
    }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn normalize_link(link: &str) -> String {
    match link.trim() {
        "" => NO_LINK.to_string(),
        link => link.to_string(),
    }
}

fn write_error(err: StoreError, id: &RecordId) -> CatalogError {
    match err {
        StoreError::NotFound(_) => CatalogError::NotFound(id.clone()),
        other => CatalogError::Write(other.to_string()),
    }
}
