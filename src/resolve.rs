//! Media input resolution: which string ends up in `image_url`.
//!
//! The add and edit forms both offer two ways to attach media, a file upload
//! and a "Media URL" text field. When a form is submitted the two are
//! resolved into a single stored value, first rule wins:
//!
//! 1. **Upload**: a file chosen in this submission is uploaded and its public
//!    URL is stored, even if a URL was also typed.
//! 2. **Typed URL**: a non-blank URL field is stored as typed (trimmed). It is
//!    not validated or normalized; classification happens at render time.
//! 3. **Nothing new**: create stores no media; edit keeps what was stored.
//!
//! On edit, a URL field that was cleared to blank clears the media. Blank
//! strings are never stored, so "no media" is always `None` for both flows.
//!
//! ## Object names
//!
//! Storage never deduplicates, so every upload gets a fresh name:
//!
//! | Kind | Name |
//! |------|------|
//! | project media | `{sha256(bytes)[..12]}-{unix_millis}.{ext}` |
//! | profile image | `profile-{unix_millis}.{ext}` |
//!
//! The extension comes from the uploaded file's name, lowercased; names
//! without a usable extension get none.

use crate::backend::{ObjectStorageBackend, StoreResult};
use sha2::{Digest, Sha256};
use std::path::Path;

/// A file picked in a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUpload {
    /// Name of the file on the user's machine; only its extension is kept.
    pub original_name: String,
    pub data: Vec<u8>,
}

impl MediaUpload {
    pub fn new(original_name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            original_name: original_name.into(),
            data,
        }
    }
}

/// What the media part of a submitted form contained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaInput {
    pub upload: Option<MediaUpload>,
    /// Value of the URL field, or `None` when the field was left untouched.
    pub url: Option<String>,
}

impl MediaInput {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self {
            upload: None,
            url: Some(url.into()),
        }
    }

    pub fn upload(upload: MediaUpload) -> Self {
        Self {
            upload: Some(upload),
            url: None,
        }
    }
}

/// Which form is being submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode<'a> {
    Create,
    /// Editing a project whose current media is `stored`.
    Edit { stored: Option<&'a str> },
}

/// The outcome of applying the precedence rules, before any upload runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaPlan {
    Upload(MediaUpload),
    Store(Option<String>),
}

/// Apply the precedence rules without touching storage.
pub fn plan_media(input: MediaInput, mode: FormMode<'_>) -> MediaPlan {
    if let Some(upload) = input.upload {
        return MediaPlan::Upload(upload);
    }
    let typed = input.url.as_deref().map(str::trim);
    match (typed, mode) {
        (Some(url), _) if !url.is_empty() => MediaPlan::Store(Some(url.to_string())),
        (Some(_), _) | (None, FormMode::Create) => MediaPlan::Store(None),
        (None, FormMode::Edit { stored }) => MediaPlan::Store(stored.map(str::to_string)),
    }
}

/// What an uploaded object is for; decides its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    ProjectMedia,
    ProfileImage,
}

const CONTENT_PREFIX_LEN: usize = 12;

/// Build a unique object name for an upload.
pub fn object_name(
    kind: ObjectKind,
    original_name: &str,
    data: &[u8],
    timestamp_millis: i64,
) -> String {
    let stem = match kind {
        ObjectKind::ProjectMedia => {
            let digest = format!("{:x}", Sha256::digest(data));
            format!("{}-{timestamp_millis}", &digest[..CONTENT_PREFIX_LEN])
        }
        ObjectKind::ProfileImage => format!("profile-{timestamp_millis}"),
    };
    match file_extension(original_name) {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem,
    }
}

fn file_extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
}

/// Upload a file under a fresh name and return its public URL.
pub async fn upload_media(
    storage: &dyn ObjectStorageBackend,
    bucket: &str,
    kind: ObjectKind,
    upload: &MediaUpload,
) -> StoreResult<String> {
    let filename = object_name(
        kind,
        &upload.original_name,
        &upload.data,
        chrono::Utc::now().timestamp_millis(),
    );
    storage.upload(bucket, &filename, &upload.data).await?;
    let url = storage.public_url(bucket, &filename);
    tracing::info!(bucket, filename = %filename, "media uploaded");
    Ok(url)
}

/// Resolve a form's media input into the value to store, uploading if needed.
pub async fn resolve_media(
    input: MediaInput,
    mode: FormMode<'_>,
    storage: &dyn ObjectStorageBackend,
    bucket: &str,
) -> StoreResult<Option<String>> {
    match plan_media(input, mode) {
        MediaPlan::Upload(upload) => {
            upload_media(storage, bucket, ObjectKind::ProjectMedia, &upload)
                .await
                .map(Some)
        }
        MediaPlan::Store(value) => Ok(value),
    }
}
