//! End-to-end flow against the file-backed store and local media storage:
//! load, admin edits, reopen from disk, render.

use folio::admin::{AdminDashboard, Redirect};
use folio::backend::{NotificationSink, ObjectStorage, RecordStore, SessionProvider};
use folio::catalog::{Buckets, Catalog};
use folio::config::FolioConfig;
use folio::render;
use folio::resolve::{MediaInput, MediaUpload};
use folio::store::{JsonStore, LocalObjectStorage, StoreState};
use folio::types::{Notice, Project, ProjectDraft, RecordId, Role, SiteSettings};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

#[derive(Default)]
struct Notices(Mutex<Vec<Notice>>);

impl NotificationSink for Notices {
    fn notify(&self, notice: Notice) {
        self.0.lock().unwrap().push(notice);
    }
}

impl Notices {
    fn descriptions(&self) -> Vec<String> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .map(|n| format!("{}: {}", n.title, n.description))
            .collect()
    }
}

fn seeded_project(id: &str, title: &str, order: i64) -> Project {
    Project {
        id: RecordId::new(id),
        title: title.to_string(),
        description: format!("{title} description"),
        tech: vec!["Rust".to_string()],
        link: "#".to_string(),
        display_order: order,
        image_url: None,
    }
}

fn write_store(path: &Path) {
    let state = StoreState {
        projects: vec![
            seeded_project("p2", "Second", 1),
            seeded_project("p1", "First", 0),
        ],
        settings: Some(SiteSettings {
            id: RecordId::new("settings"),
            profile_image_url: None,
            contact_link: Some("https://t.me/alice".to_string()),
        }),
        ..Default::default()
    };
    std::fs::write(path, serde_json::to_string(&state).unwrap()).unwrap();
}

async fn open_catalog(records: &Path, media: &Path) -> (Arc<JsonStore>, Catalog) {
    let store = Arc::new(JsonStore::open(records).await.unwrap().with_session("alice"));
    let storage: ObjectStorage = LocalObjectStorage::open(media, "/media").await.unwrap();
    let record_store: RecordStore = store.clone();
    (store, Catalog::new(record_store, storage, Buckets::default()))
}

#[tokio::test]
async fn load_sorts_projects_and_reads_contact_link() {
    let tmp = TempDir::new().unwrap();
    let records = tmp.path().join("folio-data.json");
    write_store(&records);

    let (_, mut catalog) = open_catalog(&records, &tmp.path().join("media")).await;
    catalog.load().await.unwrap();

    let titles: Vec<&str> = catalog.projects().iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["First", "Second"]);

    let config = FolioConfig::default();
    assert_eq!(
        render::contact_link(catalog.settings(), &config.site),
        "https://t.me/alice"
    );
}

#[tokio::test]
async fn admin_session_edits_persist_and_render() {
    let tmp = TempDir::new().unwrap();
    let records = tmp.path().join("folio-data.json");
    let media = tmp.path().join("media");
    write_store(&records);

    let (store, catalog) = open_catalog(&records, &media).await;
    store.set_role("alice", Role::Admin).await.unwrap();

    let notices = Arc::new(Notices::default());
    let sessions: Arc<dyn SessionProvider> = store.clone();
    let mut dashboard = AdminDashboard::open(sessions, catalog, notices.clone())
        .await
        .unwrap();

    let created = dashboard
        .add_project(
            ProjectDraft {
                title: "Demo reel".to_string(),
                description: "Motion work".to_string(),
                tech: "Blender, ".to_string(),
                link: "https://reel.example.com".to_string(),
            },
            MediaInput {
                upload: Some(MediaUpload::new("reel.mp4", b"fake video".to_vec())),
                url: Some("https://youtu.be/ignored".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(created.display_order, 2);
    assert_eq!(created.tech, vec!["Blender"]);

    let media_url = created.image_url.clone().unwrap();
    let filename = media_url.strip_prefix("/media/project-images/").unwrap();
    assert!(media.join("project-images").join(filename).exists());

    assert!(dashboard.delete_project(&RecordId::new("p1")).await);
    assert!(dashboard.update_contact_link("https://t.me/alice_dev").await);
    assert_eq!(
        notices.descriptions(),
        vec![
            "Success: Project added",
            "Success: Project deleted",
            "Success: Contact link updated"
        ]
    );

    // A fresh process sees the same data.
    let (_, mut reopened) = open_catalog(&records, &media).await;
    reopened.load().await.unwrap();
    let orders: Vec<(&str, i64)> = reopened
        .projects()
        .iter()
        .map(|p| (p.id.as_str(), p.display_order))
        .collect();
    assert_eq!(orders, vec![("p2", 1), (created.id.as_str(), 2)]);

    let out = tmp.path().join("dist");
    let page = render::write_landing_page(
        &FolioConfig::default(),
        reopened.projects(),
        reopened.settings(),
        &out,
    )
    .unwrap();
    let html = std::fs::read_to_string(page).unwrap();
    assert!(html.contains(&format!(r#"<video src="{media_url}" controls preload="metadata">"#)));
    assert!(html.contains(r#"href="https://t.me/alice_dev""#));
    assert!(html.contains(r#"href="https://reel.example.com""#));
    assert!(!html.contains("youtu.be/ignored"));

    assert_eq!(dashboard.sign_out().await, Redirect::Login);
}

#[tokio::test]
async fn rejected_write_does_not_reappear_after_reload() {
    let tmp = TempDir::new().unwrap();
    let records = tmp.path().join("folio-data.json");
    write_store(&records);
    let (_, mut catalog) = open_catalog(&records, &tmp.path().join("media")).await;
    catalog.load().await.unwrap();

    // A directory where the store stages its rewrite makes every write fail.
    std::fs::create_dir(records.with_extension("json.tmp")).unwrap();

    let draft = ProjectDraft {
        title: "Ghost".to_string(),
        description: "Never saved".to_string(),
        tech: String::new(),
        link: String::new(),
    };
    assert!(catalog.create(draft, MediaInput::none()).await.is_err());

    catalog.load().await.unwrap();
    let titles: Vec<&str> = catalog.projects().iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["First", "Second"]);
}

#[tokio::test]
async fn non_admin_cannot_open_dashboard() {
    let tmp = TempDir::new().unwrap();
    let records = tmp.path().join("folio-data.json");
    let (store, catalog) = open_catalog(&records, &tmp.path().join("media")).await;
    store
        .set_role("alice", Role::Other("viewer".to_string()))
        .await
        .unwrap();

    let notices = Arc::new(Notices::default());
    let result = AdminDashboard::open(store.clone(), catalog, notices.clone()).await;

    assert_eq!(result.err(), Some(Redirect::Home));
    assert_eq!(
        notices.descriptions(),
        vec!["Access Denied: You don't have admin privileges"]
    );
}
