//! Records shared by the catalog, the record store and both rendered surfaces.
//!
//! [`Project`] and [`SiteSettings`] mirror rows held by the external store and
//! are serialized with the same field names the store uses. The draft/edit/patch
//! types are the admin form payloads that the catalog turns into store writes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel stored in [`Project::link`] when the project has no outbound link.
pub const NO_LINK: &str = "#";

/// Opaque identifier assigned by the store on insert.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A portfolio project as stored upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: RecordId,
    pub title: String,
    pub description: String,
    /// Technology tags, in the order they were typed.
    #[serde(default)]
    pub tech: Vec<String>,
    /// Outbound URL, or [`NO_LINK`].
    pub link: String,
    /// Public-page ordering key. Gaps and duplicates are allowed.
    pub display_order: i64,
    /// Raw media reference; see [`crate::media::classify`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Project {
    /// The outbound link, if the project has a real one.
    pub fn outbound_link(&self) -> Option<&str> {
        match self.link.as_str() {
            "" | NO_LINK => None,
            link => Some(link),
        }
    }
}

/// Insert payload. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub tech: Vec<String>,
    pub link: String,
    pub display_order: i64,
    pub image_url: Option<String>,
}

impl NewProject {
    pub fn into_project(self, id: RecordId) -> Project {
        Project {
            id,
            title: self.title,
            description: self.description,
            tech: self.tech,
            link: self.link,
            display_order: self.display_order,
            image_url: self.image_url,
        }
    }
}

/// Full-record replace of the editable project fields. Edits never touch
/// `display_order`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectUpdate {
    pub title: String,
    pub description: String,
    pub tech: Vec<String>,
    pub link: String,
    pub image_url: Option<String>,
}

/// Raw "Add New Project" form input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectDraft {
    pub title: String,
    pub description: String,
    /// Comma-separated technology list, as typed.
    pub tech: String,
    /// Empty means no link.
    pub link: String,
}

/// "Edit Project" form state, seeded from a loaded [`Project`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectEdit {
    pub id: RecordId,
    pub title: String,
    pub description: String,
    pub tech: Vec<String>,
    pub link: String,
    /// The media reference stored when the form was opened.
    pub stored_image_url: Option<String>,
}

impl From<&Project> for ProjectEdit {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id.clone(),
            title: project.title.clone(),
            description: project.description.clone(),
            tech: project.tech.clone(),
            link: project.link.clone(),
            stored_image_url: project.image_url.clone(),
        }
    }
}

/// The singleton settings row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteSettings {
    pub id: RecordId,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub contact_link: Option<String>,
}

/// Partial settings update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_link: Option<String>,
}

impl SettingsPatch {
    /// Apply the patch to a settings row in place.
    pub fn apply_to(&self, settings: &mut SiteSettings) {
        if let Some(url) = &self.profile_image_url {
            settings.profile_image_url = Some(url.clone());
        }
        if let Some(link) = &self.contact_link {
            settings.contact_link = Some(link.clone());
        }
    }
}

/// Role attached to a user in the store's role table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    #[serde(untagged)]
    Other(String),
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
}

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Normal,
    Destructive,
}

/// A message for the notification sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notice {
    pub fn success(description: impl Into<String>) -> Self {
        Self {
            title: "Success".to_string(),
            description: description.into(),
            severity: Severity::Normal,
        }
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self {
            title: "Error".to_string(),
            description: description.into(),
            severity: Severity::Destructive,
        }
    }
}
