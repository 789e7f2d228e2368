//! Dashboard data controller.
//!
//! Caches the student and teacher collections in memory and issues the
//! administration requests. The backend is the only source of truth: after
//! every successful mutation the affected collections are re-fetched through
//! [`Dashboard::refresh`] and replaced wholesale, never patched.
//!
//! A 401 or 403 on any request hands control back to the
//! [`SessionManager`]; from then on every action fails with
//! [`ActionError::SessionExpired`] without touching the network.

mod forms;
mod tab;

pub use forms::{AssignmentSelector, EditForm, Form, SelectOption};
pub use tab::Tab;

use askama::Template;
use schoolhouse_core::{Profile, Role, Student, Teacher, UserId, UserRecord};
use tracing::instrument;

use crate::api::NewAccount;
use crate::confirm::Confirm;
use crate::error::{ActionError, ApiError};
use crate::navigator::Screen;
use crate::session::{Session, SessionManager};
use crate::views::DashboardPage;

const NETWORK_ERROR: &str = "Network error";
const ADMIN_REQUIRED: &str = "Administrator access required";
const SELECT_BOTH: &str = "Please select both student and teacher";
const UNASSIGN_PROMPT: &str = "Are you sure you want to unassign this student from their teacher?";
const UPDATE_FAILED: &str = "Failed to update user";
const ASSIGNMENT_AFTER_UPDATE_FAILED: &str = "User updated but assignment failed";

/// Which collections a [`Dashboard::refresh`] re-fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshScope {
    Students,
    Teachers,
    All,
}

impl RefreshScope {
    /// The collection a newly created account of `role` appears in.
    const fn for_role(role: Role) -> Self {
        match role {
            Role::Student => Self::Students,
            Role::Teacher => Self::Teachers,
            Role::Admin | Role::Unknown => Self::All,
        }
    }

    const fn includes_students(self) -> bool {
        matches!(self, Self::Students | Self::All)
    }

    const fn includes_teachers(self) -> bool {
        matches!(self, Self::Teachers | Self::All)
    }
}

/// The authenticated dashboard.
///
/// Only constructible through [`Dashboard::open`], which requires a verified
/// session. Handlers take `&mut self`, so one runs at a time.
pub struct Dashboard {
    manager: SessionManager,
    session: Session,
    confirm: Box<dyn Confirm>,
    students: Vec<Student>,
    teachers: Vec<Teacher>,
    tab: Tab,
    form: Option<Form>,
    assignment: AssignmentSelector,
    expired: bool,
}

impl Dashboard {
    /// Load and verify the persisted session, then fetch both collections.
    ///
    /// Returns `None` without a data request when there is no session or the
    /// server rejects it; the navigator is then on the login screen. An
    /// unreachable server also returns `None`, with "Network error" shown and
    /// the stored session kept.
    #[instrument(skip_all)]
    pub async fn open(manager: SessionManager, confirm: impl Confirm + 'static) -> Option<Self> {
        let session = manager.load_session()?;
        if !manager.verify_session(&session).await {
            return None;
        }
        manager.navigator().go(Screen::Dashboard);

        let mut dashboard = Self::new(manager, session, Box::new(confirm));
        match dashboard.refresh(RefreshScope::All).await {
            Err(ActionError::SessionExpired) => None,
            // Load failures are already on screen; the dashboard still opens.
            _ => Some(dashboard),
        }
    }

    fn new(manager: SessionManager, session: Session, confirm: Box<dyn Confirm>) -> Self {
        Self {
            manager,
            session,
            confirm,
            students: Vec::new(),
            teachers: Vec::new(),
            tab: Tab::default(),
            form: None,
            assignment: AssignmentSelector::default(),
            expired: false,
        }
    }

    // =========================================================================
    // State
    // =========================================================================

    /// The session this dashboard was opened with.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// The session manager (navigator and message slot live here).
    #[must_use]
    pub const fn manager(&self) -> &SessionManager {
        &self.manager
    }

    /// Cached students, as last reported by the server.
    #[must_use]
    pub fn students(&self) -> &[Student] {
        &self.students
    }

    /// Cached teachers, as last reported by the server.
    #[must_use]
    pub fn teachers(&self) -> &[Teacher] {
        &self.teachers
    }

    #[must_use]
    pub const fn tab(&self) -> Tab {
        self.tab
    }

    /// The open creation or edit form, if any.
    #[must_use]
    pub const fn form(&self) -> Option<&Form> {
        self.form.as_ref()
    }

    /// Selector options of the assignments tab.
    #[must_use]
    pub const fn assignment(&self) -> &AssignmentSelector {
        &self.assignment
    }

    /// Whether the server has rejected the session since opening.
    #[must_use]
    pub const fn is_expired(&self) -> bool {
        self.expired
    }

    /// Cached students without a teacher. Derived on every call.
    #[must_use]
    pub fn unassigned_students(&self) -> Vec<&Student> {
        self.students.iter().filter(|s| s.is_unassigned()).collect()
    }

    // =========================================================================
    // Synchronization
    // =========================================================================

    /// Re-fetch the collections named by `scope`.
    ///
    /// Every mutation reloads through here. Both loads run even if the first
    /// fails, except after a 401/403.
    ///
    /// # Errors
    ///
    /// Returns `SessionExpired` if either load was rejected, otherwise the
    /// first load failure.
    pub async fn refresh(&mut self, scope: RefreshScope) -> Result<(), ActionError> {
        let students = if scope.includes_students() {
            self.load_students().await
        } else {
            Ok(())
        };
        let teachers = if scope.includes_teachers() {
            self.load_teachers().await
        } else {
            Ok(())
        };

        self.ensure_live()?;
        if self.tab == Tab::Assignments {
            self.rebuild_assignment();
        }
        students.and(teachers)
    }

    /// Replace the student cache.
    ///
    /// # Errors
    ///
    /// On failure the previous collection is kept and the message shown.
    #[instrument(skip(self))]
    pub async fn load_students(&mut self) -> Result<(), ActionError> {
        self.ensure_live()?;
        match self.manager.api().students(self.session.token()).await {
            Ok(students) => {
                tracing::debug!(count = students.len(), "Students loaded");
                self.students = students;
                Ok(())
            }
            Err(e) => Err(self.fail(&e, "Failed to load students")),
        }
    }

    /// Replace the teacher cache.
    ///
    /// # Errors
    ///
    /// On failure the previous collection is kept and the message shown.
    #[instrument(skip(self))]
    pub async fn load_teachers(&mut self) -> Result<(), ActionError> {
        self.ensure_live()?;
        match self.manager.api().teachers(self.session.token()).await {
            Ok(teachers) => {
                tracing::debug!(count = teachers.len(), "Teachers loaded");
                self.teachers = teachers;
                Ok(())
            }
            Err(e) => Err(self.fail(&e, "Failed to load teachers")),
        }
    }

    /// Fetch a single account. Does not touch the caches.
    ///
    /// # Errors
    ///
    /// Returns the server text or "Failed to load user".
    #[instrument(skip(self), fields(id = %id))]
    pub async fn fetch_user(&mut self, id: UserId) -> Result<UserRecord, ActionError> {
        self.ensure_live()?;
        match self.manager.api().user(id, self.session.token()).await {
            Ok(user) => Ok(user),
            Err(e) => Err(self.fail(&e, e.message_or("Failed to load user"))),
        }
    }

    // =========================================================================
    // Mutations (ADMIN role)
    // =========================================================================

    /// Create an account with the fixed `role`, then reload its collection.
    ///
    /// # Errors
    ///
    /// Returns the server text or "Failed to add student/teacher"; nothing
    /// is reloaded on failure.
    #[instrument(skip(self, account), fields(username = %account.profile.username, role = %role))]
    pub async fn add_user(&mut self, account: NewAccount, role: Role) -> Result<(), ActionError> {
        self.ensure_admin()?;
        let account = account.with_role(role);

        match self
            .manager
            .api()
            .create_user(&account, self.session.token())
            .await
        {
            Ok(()) => {
                tracing::info!("User created");
                self.manager
                    .notifier()
                    .success(format!("{} added successfully", role.title()));
                self.form = None;
                self.resync(RefreshScope::for_role(role)).await
            }
            Err(e) => {
                let fallback = format!("Failed to add {}", role.noun());
                Err(self.fail(&e, e.message_or(&fallback)))
            }
        }
    }

    /// Delete an account after confirmation, then reload both collections.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` when declined (nothing is sent), otherwise the
    /// generic "Failed to delete student/teacher".
    #[instrument(skip(self), fields(id = %id, role = %role))]
    pub async fn delete_user(&mut self, id: UserId, role: Role) -> Result<(), ActionError> {
        self.ensure_admin()?;
        let prompt = format!("Are you sure you want to delete this {}?", role.noun());
        if !self.confirm.confirm(&prompt) {
            tracing::debug!("Delete declined");
            return Err(ActionError::Cancelled);
        }

        match self
            .manager
            .api()
            .delete_user(id, self.session.token())
            .await
        {
            Ok(()) => {
                tracing::info!("User deleted");
                self.manager
                    .notifier()
                    .success(format!("{} deleted successfully", role.title()));
                // Deleting either side can orphan references held by the other.
                self.resync(RefreshScope::All).await
            }
            Err(e) => Err(self.fail(&e, format!("Failed to delete {}", role.noun()))),
        }
    }

    /// Assign a student to a teacher, then reload both collections.
    ///
    /// # Errors
    ///
    /// Returns `Validation` without a request unless both ids are given,
    /// otherwise "Failed to assign student" on failure.
    #[instrument(skip(self))]
    pub async fn assign(
        &mut self,
        student: Option<UserId>,
        teacher: Option<UserId>,
    ) -> Result<(), ActionError> {
        self.ensure_admin()?;
        let (Some(student), Some(teacher)) = (student, teacher) else {
            self.manager.notifier().error(SELECT_BOTH);
            return Err(ActionError::Validation(SELECT_BOTH.to_owned()));
        };

        match self
            .manager
            .api()
            .assign(student, teacher, self.session.token())
            .await
        {
            Ok(()) => {
                tracing::info!("Student assigned");
                self.manager
                    .notifier()
                    .success("Student assigned successfully");
                let synced = self.resync(RefreshScope::All).await;
                self.rebuild_assignment();
                synced
            }
            Err(e) => Err(self.fail(&e, "Failed to assign student")),
        }
    }

    /// Remove a student's assignment after confirmation.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` when declined, otherwise "Failed to unassign
    /// student" on failure.
    #[instrument(skip(self), fields(student = %student))]
    pub async fn unassign(&mut self, student: UserId) -> Result<(), ActionError> {
        self.ensure_admin()?;
        if !self.confirm.confirm(UNASSIGN_PROMPT) {
            tracing::debug!("Unassign declined");
            return Err(ActionError::Cancelled);
        }

        match self
            .manager
            .api()
            .unassign(student, self.session.token())
            .await
        {
            Ok(()) => {
                tracing::info!("Student unassigned");
                self.manager
                    .notifier()
                    .success("Student unassigned successfully");
                self.resync(RefreshScope::All).await
            }
            Err(e) => Err(self.fail(&e, "Failed to unassign student")),
        }
    }

    /// Update a profile, then for students set the assignment to `teacher`.
    ///
    /// The profile request always goes first; if it fails nothing else is
    /// sent. For students a second request follows: assign when `teacher`
    /// is given, unassign otherwise. A refused unassign counts as "already
    /// unassigned". Both collections are reloaded afterwards unless the
    /// session was rejected.
    ///
    /// # Errors
    ///
    /// Returns the server text or "Failed to update user" when the profile
    /// update fails, and "User updated but assignment failed" when the
    /// assign step does.
    #[instrument(skip(self, profile), fields(id = %id, role = %role))]
    pub async fn update_user(
        &mut self,
        id: UserId,
        profile: Profile,
        role: Role,
        teacher: Option<UserId>,
    ) -> Result<(), ActionError> {
        self.ensure_admin()?;

        if let Err(e) = self
            .manager
            .api()
            .update_user(id, &profile, role, self.session.token())
            .await
        {
            return Err(self.fail(&e, e.message_or(UPDATE_FAILED)));
        }

        let outcome = if role == Role::Student {
            self.reassign(id, teacher).await
        } else {
            Ok(())
        };

        match outcome {
            Err(ActionError::SessionExpired) => return outcome,
            Ok(()) => {
                tracing::info!("User updated");
                self.manager.notifier().success("User updated successfully");
                self.form = None;
            }
            // The form stays open so the assignment can be retried.
            Err(_) => {}
        }

        let synced = self.resync(RefreshScope::All).await;
        outcome.and(synced)
    }

    async fn reassign(&mut self, student: UserId, teacher: Option<UserId>) -> Result<(), ActionError> {
        let api = self.manager.api();
        let token = self.session.token();

        let Some(teacher) = teacher else {
            return match api.unassign(student, token).await {
                Ok(()) => Ok(()),
                Err(ApiError::Rejected { status, message }) => {
                    tracing::debug!(status, %message, "Unassign refused, student already unassigned");
                    Ok(())
                }
                Err(e) => Err(self.fail(&e, NETWORK_ERROR)),
            };
        };

        match api.assign(student, teacher, token).await {
            Ok(()) => Ok(()),
            Err(e) => Err(self.fail(&e, ASSIGNMENT_AFTER_UPDATE_FAILED)),
        }
    }

    // =========================================================================
    // Navigation and forms
    // =========================================================================

    /// Switch tabs. Opening the assignments tab rebuilds its selectors from
    /// the caches without a request.
    ///
    /// # Errors
    ///
    /// Non-administrators cannot open the assignments tab.
    pub fn select_tab(&mut self, tab: Tab) -> Result<(), ActionError> {
        self.ensure_live()?;
        if tab.is_admin_only() {
            self.ensure_admin()?;
        }
        self.tab = tab;
        if tab == Tab::Assignments {
            self.rebuild_assignment();
        }
        Ok(())
    }

    /// Open the "Add student" / "Add teacher" form.
    ///
    /// # Errors
    ///
    /// Administrators only.
    pub fn open_create_form(&mut self, role: Role) -> Result<(), ActionError> {
        self.ensure_admin()?;
        self.form = Some(Form::Create { role });
        Ok(())
    }

    /// Open the edit form for a cached account, pre-filled from the cache.
    ///
    /// # Errors
    ///
    /// Administrators only; the account must be in the cache.
    pub fn open_edit_form(&mut self, id: UserId, role: Role) -> Result<(), ActionError> {
        self.ensure_admin()?;
        let form = match role {
            Role::Student => self
                .students
                .iter()
                .find(|s| s.id == id)
                .map(|s| EditForm::for_student(s, &self.teachers)),
            Role::Teacher => self
                .teachers
                .iter()
                .find(|t| t.id == id)
                .map(EditForm::for_teacher),
            Role::Admin | Role::Unknown => None,
        };

        let Some(form) = form else {
            let message = format!("No {} with id {id}", role.noun());
            self.manager.notifier().error(&message);
            return Err(ActionError::Validation(message));
        };

        self.form = Some(Form::Edit(form));
        Ok(())
    }

    /// Close whichever form is open.
    pub fn close_form(&mut self) {
        self.form = None;
    }

    /// Render the dashboard with the visible message.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render(&self) -> Result<String, askama::Error> {
        let toast = self.manager.notifier().current();
        DashboardPage::new(self, toast.as_ref()).render()
    }

    /// Forget the session and return to the login screen.
    pub fn logout(self) {
        self.manager.logout();
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn resync(&mut self, scope: RefreshScope) -> Result<(), ActionError> {
        match self.refresh(scope).await {
            Err(ActionError::SessionExpired) => Err(ActionError::SessionExpired),
            // The mutation itself went through; load failures are on screen.
            _ => Ok(()),
        }
    }

    fn rebuild_assignment(&mut self) {
        self.assignment = AssignmentSelector::build(
            self.students.iter().filter(|s| s.is_unassigned()),
            &self.teachers,
        );
    }

    const fn ensure_live(&self) -> Result<(), ActionError> {
        if self.expired {
            Err(ActionError::SessionExpired)
        } else {
            Ok(())
        }
    }

    fn ensure_admin(&self) -> Result<(), ActionError> {
        self.ensure_live()?;
        if self.session.is_admin() {
            Ok(())
        } else {
            self.manager.notifier().error(ADMIN_REQUIRED);
            Err(ActionError::Validation(ADMIN_REQUIRED.to_owned()))
        }
    }

    /// Report a failed request and map it to the action outcome.
    fn fail(&mut self, error: &ApiError, message: impl Into<String>) -> ActionError {
        if error.is_auth_failure() {
            self.expired = true;
            self.form = None;
            self.manager.invalidate();
            return ActionError::SessionExpired;
        }

        let message = if error.is_transport() {
            NETWORK_ERROR.to_owned()
        } else {
            message.into()
        };
        tracing::warn!(error = %error, %message, "Request failed");
        self.manager.notifier().error(message.clone());
        ActionError::Failed(message)
    }
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("session", &self.session)
            .field("students", &self.students.len())
            .field("teachers", &self.teachers.len())
            .field("tab", &self.tab)
            .field("form", &self.form)
            .field("expired", &self.expired)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use schoolhouse_core::{Email, UserSummary};
    use url::Url;

    use super::*;
    use crate::api::ApiClient;
    use crate::config::ClientConfig;
    use crate::navigator::Navigator;
    use crate::notify::Notifier;
    use crate::store::MemoryStore;

    /// A dashboard pointed at a port nothing listens on.
    fn offline_dashboard(role: Role) -> Dashboard {
        let config = ClientConfig::for_api(
            Url::parse("http://127.0.0.1:9/api").unwrap(),
            PathBuf::from("unused"),
        );
        let api = ApiClient::new(&config).unwrap();
        let manager = SessionManager::new(
            &config,
            api,
            MemoryStore::new(),
            Navigator::new(Screen::Dashboard),
            Notifier::new(config.toast_ttl),
        );
        let session = Session::new("abc", role, "a@b.com");
        Dashboard::new(manager, session, Box::new(|_: &str| false))
    }

    fn summary(id: i64, name: &str) -> UserSummary {
        UserSummary {
            id: UserId::new(id),
            username: name.to_string(),
            email: Email::parse(&format!("{name}@school.edu")).unwrap(),
            department: "Math".to_string(),
        }
    }

    fn student(id: i64, teacher: Option<UserSummary>) -> Student {
        let s = summary(id, &format!("student{id}"));
        Student {
            id: s.id,
            username: s.username,
            email: s.email,
            department: s.department,
            assigned_teacher: teacher,
        }
    }

    fn teacher(id: i64) -> Teacher {
        let t = summary(id, &format!("teacher{id}"));
        Teacher {
            id: t.id,
            username: t.username,
            email: t.email,
            department: t.department,
            assigned_students: Vec::new(),
        }
    }

    fn toast(dashboard: &Dashboard) -> Option<String> {
        dashboard.manager.notifier().current().map(|t| t.message)
    }

    #[test]
    fn test_unassigned_students_filters_cache() {
        let mut dashboard = offline_dashboard(Role::Admin);
        dashboard.students = vec![
            student(1, None),
            student(2, Some(summary(10, "t"))),
            student(3, None),
        ];

        let ids: Vec<_> = dashboard
            .unassigned_students()
            .iter()
            .map(|s| s.id.as_i64())
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_assign_requires_both_ids() {
        let mut dashboard = offline_dashboard(Role::Admin);

        let err = dashboard
            .assign(Some(UserId::new(1)), None)
            .await
            .unwrap_err();
        assert_eq!(err, ActionError::Validation(SELECT_BOTH.to_string()));
        assert_eq!(toast(&dashboard).as_deref(), Some(SELECT_BOTH));
    }

    #[tokio::test]
    async fn test_non_admin_cannot_mutate() {
        let mut dashboard = offline_dashboard(Role::Teacher);

        let err = dashboard
            .delete_user(UserId::new(1), Role::Student)
            .await
            .unwrap_err();
        assert_eq!(err, ActionError::Validation(ADMIN_REQUIRED.to_string()));
        assert!(dashboard.select_tab(Tab::Assignments).is_err());
        assert_eq!(dashboard.tab(), Tab::Students);
    }

    #[tokio::test]
    async fn test_declined_delete_is_cancelled() {
        let mut dashboard = offline_dashboard(Role::Admin);

        let err = dashboard
            .delete_user(UserId::new(1), Role::Teacher)
            .await
            .unwrap_err();
        assert_eq!(err, ActionError::Cancelled);
        assert!(toast(&dashboard).is_none());
    }

    #[tokio::test]
    async fn test_load_transport_failure_keeps_cache() {
        let mut dashboard = offline_dashboard(Role::Admin);
        dashboard.students = vec![student(1, None)];

        let err = dashboard.load_students().await.unwrap_err();
        assert_eq!(err, ActionError::Failed(NETWORK_ERROR.to_string()));
        assert_eq!(dashboard.students().len(), 1);
    }

    #[test]
    fn test_assignments_tab_rebuilds_selector() {
        let mut dashboard = offline_dashboard(Role::Admin);
        dashboard.students = vec![student(1, None), student(2, Some(summary(10, "t")))];
        dashboard.teachers = vec![teacher(10)];

        dashboard.select_tab(Tab::Assignments).unwrap();
        assert_eq!(dashboard.assignment().students.len(), 2);
        assert_eq!(dashboard.assignment().teachers.len(), 2);
    }

    #[test]
    fn test_render_empty_states() {
        let mut dashboard = offline_dashboard(Role::Admin);
        let text = dashboard.render().unwrap();
        assert!(text.contains("a@b.com (ADMIN)"));
        assert!(text.contains("No students found."));

        dashboard.select_tab(Tab::Teachers).unwrap();
        assert!(dashboard.render().unwrap().contains("No teachers found."));
    }

    #[test]
    fn test_render_hides_assignments_tab_for_students() {
        let dashboard = offline_dashboard(Role::Student);
        let text = dashboard.render().unwrap();
        assert!(!text.contains("Assignments"));
        assert!(!text.contains("Actions:"));
    }

    #[test]
    fn test_edit_form_prefills_from_cache() {
        let mut dashboard = offline_dashboard(Role::Admin);
        dashboard.students = vec![student(1, Some(summary(10, "teacher10")))];
        dashboard.teachers = vec![teacher(10), teacher(11)];

        dashboard
            .open_edit_form(UserId::new(1), Role::Student)
            .unwrap();
        let Some(Form::Edit(form)) = dashboard.form() else {
            panic!("edit form not open");
        };
        assert_eq!(form.username, "student1");
        assert_eq!(form.selected_teacher(), Some(UserId::new(10)));

        assert!(dashboard.open_edit_form(UserId::new(99), Role::Teacher).is_err());
    }
}
