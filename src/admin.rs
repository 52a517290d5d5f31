//! The admin surface: access gate plus the dashboard actions.
//!
//! ## Access
//!
//! [`AdminDashboard::open`] only hands out a dashboard to a signed-in user
//! whose role is `admin`. Everyone else is redirected, never shown an inline
//! error:
//!
//! | Situation | Redirect | Notice |
//! |-----------|----------|--------|
//! | no session, or the session lookup fails | [`Redirect::Login`] | none |
//! | role missing, not `admin`, or role lookup fails | [`Redirect::Home`] | "Access Denied" |
//!
//! ## Actions
//!
//! Every dashboard action reports exactly one notice: `Success` with a short
//! description, or `Error` carrying the failure message with destructive
//! severity. Failures stop at this layer; actions return `None`/`false` and
//! the caller keeps its form state so the user can retry by hand.

use crate::backend::{NotificationSink, SessionProvider};
use crate::catalog::{Catalog, CatalogError};
use crate::resolve::{MediaInput, MediaUpload};
use crate::types::{Notice, Project, ProjectDraft, ProjectEdit, RecordId, Session, Severity};
use std::sync::Arc;

/// Where a non-admin visitor is sent instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    Login,
    Home,
}

fn access_denied() -> Notice {
    Notice {
        title: "Access Denied".to_string(),
        description: "You don't have admin privileges".to_string(),
        severity: Severity::Destructive,
    }
}

/// Check that the current session belongs to an admin.
pub async fn authorize(
    sessions: &dyn SessionProvider,
    notifier: &dyn NotificationSink,
) -> Result<Session, Redirect> {
    let session = match sessions.current_session().await {
        Ok(Some(session)) => session,
        Ok(None) => return Err(Redirect::Login),
        Err(err) => {
            tracing::warn!(error = %err, "session lookup failed");
            return Err(Redirect::Login);
        }
    };

    match sessions.user_role(&session.user_id).await {
        Ok(Some(role)) if role.is_admin() => Ok(session),
        Ok(role) => {
            tracing::info!(user_id = %session.user_id, ?role, "admin access denied");
            notifier.notify(access_denied());
            Err(Redirect::Home)
        }
        Err(err) => {
            tracing::warn!(user_id = %session.user_id, error = %err, "role lookup failed");
            notifier.notify(access_denied());
            Err(Redirect::Home)
        }
    }
}

pub struct AdminDashboard {
    session: Session,
    catalog: Catalog,
    sessions: Arc<dyn SessionProvider>,
    notifier: Arc<dyn NotificationSink>,
}

impl AdminDashboard {
    /// Gate on the admin role, then load the catalog.
    ///
    /// A failed load is reported as a notice but still opens the dashboard
    /// with whatever half of the data arrived.
    pub async fn open(
        sessions: Arc<dyn SessionProvider>,
        mut catalog: Catalog,
        notifier: Arc<dyn NotificationSink>,
    ) -> Result<Self, Redirect> {
        let session = authorize(sessions.as_ref(), notifier.as_ref()).await?;
        if let Err(err) = catalog.load().await {
            notifier.notify(Notice::error(err.to_string()));
        }
        Ok(Self {
            session,
            catalog,
            sessions,
            notifier,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Seed the edit form for a loaded project.
    pub fn edit_form(&self, id: &RecordId) -> Option<ProjectEdit> {
        self.catalog.project(id).map(ProjectEdit::from)
    }

    pub async fn add_project(&mut self, draft: ProjectDraft, media: MediaInput) -> Option<Project> {
        let result = self.catalog.create(draft, media).await;
        self.report(result, "Project added")
    }

    pub async fn update_project(&mut self, edit: ProjectEdit, media: MediaInput) -> bool {
        let result = self.catalog.update(edit, media).await;
        self.report(result, "Project updated").is_some()
    }

    pub async fn delete_project(&mut self, id: &RecordId) -> bool {
        let result = self.catalog.delete(id).await;
        self.report(result, "Project deleted").is_some()
    }

    pub async fn update_contact_link(&mut self, link: &str) -> bool {
        let result = self.catalog.update_contact_link(link).await;
        self.report(result, "Contact link updated").is_some()
    }

    pub async fn upload_profile_image(&mut self, upload: &MediaUpload) -> Option<String> {
        let result = self.catalog.upload_profile_image(upload).await;
        self.report(result, "Profile image updated")
    }

    /// End the session. Always lands on the login page.
    pub async fn sign_out(self) -> Redirect {
        if let Err(err) = self.sessions.sign_out().await {
            tracing::warn!(error = %err, "sign-out failed");
        }
        Redirect::Login
    }

    fn report<T>(&self, result: Result<T, CatalogError>, success: &str) -> Option<T> {
        match result {
            Ok(value) => {
                self.notifier.notify(Notice::success(success));
                Some(value)
            }
            Err(err) => {
                tracing::debug!(error = ?err, "admin action failed");
                self.notifier.notify(Notice::error(err.to_string()));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Buckets;
    use crate::test_helpers::*;
    use crate::types::Role;

    struct Harness {
        store: RecordingStore,
        notifier: RecordingNotifier,
    }

    impl Harness {
        fn new(projects: Vec<Project>) -> Self {
            Self {
                store: RecordingStore::with_projects(projects),
                notifier: RecordingNotifier::new(),
            }
        }

        async fn open(&self, sessions: FixedSessions) -> Result<AdminDashboard, Redirect> {
            let catalog = Catalog::new(
                Arc::new(self.store.clone()),
                Arc::new(RecordingStorage::new()),
                Buckets::default(),
            );
            AdminDashboard::open(Arc::new(sessions), catalog, Arc::new(self.notifier.clone()))
                .await
        }

        async fn admin(&self) -> AdminDashboard {
            let dashboard = self
                .open(FixedSessions::signed_in("alice", Some(Role::Admin)))
                .await
                .unwrap();
            self.store.clear_calls();
            dashboard
        }
    }

    fn draft(title: &str) -> ProjectDraft {
        ProjectDraft {
            title: title.to_string(),
            description: "desc".to_string(),
            tech: "Rust".to_string(),
            link: String::new(),
        }
    }

    // =========================================================================
    // Access gate
    // =========================================================================

    #[tokio::test]
    async fn no_session_redirects_to_login_silently() {
        let h = Harness::new(vec![]);
        let result = h.open(FixedSessions::signed_out()).await;
        assert_eq!(result.err(), Some(Redirect::Login));
        assert!(h.notifier.notices().is_empty());
        assert!(h.store.calls().is_empty());
    }

    #[tokio::test]
    async fn non_admin_is_denied_and_sent_home() {
        let h = Harness::new(vec![]);
        let result = h
            .open(FixedSessions::signed_in(
                "bob",
                Some(Role::Other("editor".to_string())),
            ))
            .await;
        assert_eq!(result.err(), Some(Redirect::Home));
        let notice = h.notifier.single();
        assert_eq!(notice.title, "Access Denied");
        assert_eq!(notice.severity, Severity::Destructive);
        assert!(h.store.calls().is_empty());
    }

    #[tokio::test]
    async fn missing_role_is_denied() {
        let h = Harness::new(vec![]);
        let result = h.open(FixedSessions::signed_in("carol", None)).await;
        assert_eq!(result.err(), Some(Redirect::Home));
    }

    #[tokio::test]
    async fn failing_role_lookup_is_denied() {
        let h = Harness::new(vec![]);
        let mut sessions = FixedSessions::signed_in("alice", Some(Role::Admin));
        sessions.role_lookup_error = Some("JWT expired".to_string());
        assert_eq!(h.open(sessions).await.err(), Some(Redirect::Home));
    }

    #[tokio::test]
    async fn admin_gets_loaded_dashboard() {
        let h = Harness::new(vec![project("a", 0)]);
        let dashboard = h.admin().await;
        assert_eq!(dashboard.session().user_id, "alice");
        assert_eq!(dashboard.catalog().projects().len(), 1);
        assert!(h.notifier.notices().is_empty());
    }

    #[tokio::test]
    async fn failed_initial_load_is_reported_but_dashboard_opens() {
        let h = Harness::new(vec![project("a", 0)]);
        h.store.fail(StoreOp::ListProjects, "relation \"projects\" does not exist");
        let dashboard = h
            .open(FixedSessions::signed_in("alice", Some(Role::Admin)))
            .await
            .unwrap();
        assert!(dashboard.catalog().settings().is_some());
        assert_eq!(
            h.notifier.single(),
            Notice::error("relation \"projects\" does not exist")
        );
    }

    // =========================================================================
    // Actions
    // =========================================================================

    #[tokio::test]
    async fn add_project_reports_success() {
        let h = Harness::new(vec![]);
        let mut dashboard = h.admin().await;
        let created = dashboard.add_project(draft("Site"), MediaInput::none()).await;
        assert!(created.is_some());
        assert_eq!(h.notifier.single(), Notice::success("Project added"));
    }

    #[tokio::test]
    async fn add_project_validation_error_is_a_notice() {
        let h = Harness::new(vec![]);
        let mut dashboard = h.admin().await;
        let created = dashboard.add_project(draft(""), MediaInput::none()).await;
        assert!(created.is_none());
        assert_eq!(
            h.notifier.single(),
            Notice::error("Please fill in all required fields")
        );
        assert!(!h.store.wrote());
    }

    #[tokio::test]
    async fn store_errors_are_shown_verbatim() {
        let h = Harness::new(vec![project("a", 0)]);
        let mut dashboard = h.admin().await;
        h.store.fail(StoreOp::DeleteProject, "violates row-level security policy");

        assert!(!dashboard.delete_project(&RecordId::new("id-a")).await);
        assert_eq!(
            h.notifier.single(),
            Notice::error("violates row-level security policy")
        );
        assert_eq!(dashboard.catalog().projects().len(), 1);

        h.store.heal(StoreOp::DeleteProject);
        assert!(dashboard.delete_project(&RecordId::new("id-a")).await);
        assert!(dashboard.catalog().projects().is_empty());
    }

    #[tokio::test]
    async fn edit_form_round_trips_through_update() {
        let h = Harness::new(vec![project("a", 0)]);
        let mut dashboard = h.admin().await;
        let mut edit = dashboard.edit_form(&RecordId::new("id-a")).unwrap();
        edit.link = "https://example.com".to_string();

        assert!(dashboard.update_project(edit, MediaInput::none()).await);
        assert_eq!(h.notifier.single(), Notice::success("Project updated"));
        assert_eq!(
            dashboard.catalog().projects()[0].outbound_link(),
            Some("https://example.com")
        );
    }

    #[tokio::test]
    async fn settings_actions_report() {
        let h = Harness::new(vec![]);
        let mut dashboard = h.admin().await;
        assert!(dashboard.update_contact_link("https://t.me/alice").await);
        let url = dashboard
            .upload_profile_image(&MediaUpload::new("me.png", vec![1, 2, 3]))
            .await;
        assert!(url.is_some());
        assert_eq!(
            h.notifier.notices(),
            vec![
                Notice::success("Contact link updated"),
                Notice::success("Profile image updated")
            ]
        );
    }

    #[tokio::test]
    async fn sign_out_ends_session() {
        let h = Harness::new(vec![]);
        let sessions = Arc::new(FixedSessions::signed_in("alice", Some(Role::Admin)));
        let catalog = Catalog::new(
            Arc::new(h.store.clone()),
            Arc::new(RecordingStorage::new()),
            Buckets::default(),
        );
        let dashboard =
            AdminDashboard::open(sessions.clone(), catalog, Arc::new(h.notifier.clone()))
                .await
                .unwrap();

        assert_eq!(dashboard.sign_out().await, Redirect::Login);
        assert_eq!(sessions.current_session().await.unwrap(), None);
    }
}
