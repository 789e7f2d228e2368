//! Student, teacher and assignment endpoints.

use reqwest::Method;
use schoolhouse_core::{Profile, Role, Student, Teacher, UserId, UserRecord};
use secrecy::SecretString;
use tracing::instrument;

use super::ApiClient;
use super::types::{HealthStatus, NewAccount, ProfileUpdateRequest};
use crate::error::ApiError;

impl ApiClient {
    // =========================================================================
    // Collections (any authenticated role)
    // =========================================================================

    /// Fetch every student.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` when the token is rejected.
    #[instrument(skip(self, token))]
    pub async fn students(&self, token: &SecretString) -> Result<Vec<Student>, ApiError> {
        self.get("/students", token).await
    }

    /// Fetch every teacher.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` when the token is rejected.
    #[instrument(skip(self, token))]
    pub async fn teachers(&self, token: &SecretString) -> Result<Vec<Teacher>, ApiError> {
        self.get("/teachers", token).await
    }

    /// Fetch one account by id.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` with status 404 when the id is unknown.
    #[instrument(skip(self, token), fields(id = %id))]
    pub async fn user(&self, id: UserId, token: &SecretString) -> Result<UserRecord, ApiError> {
        self.get(&format!("/users/{id}"), token).await
    }

    /// Query the unauthenticated health endpoint at the server root.
    ///
    /// # Errors
    ///
    /// Returns an error when the server is unreachable or unhealthy.
    #[instrument(skip(self))]
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        let response = self
            .inner
            .client
            .get(self.inner.health_url.clone())
            .send()
            .await?;
        Self::handle_json(response).await
    }

    // =========================================================================
    // Administration (ADMIN role)
    // =========================================================================

    /// Create an account with the role carried by `account`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` with the server's reason (duplicate email, ...).
    #[instrument(skip(self, token, account), fields(username = %account.profile.username, role = %account.role))]
    pub async fn create_user(
        &self,
        account: &NewAccount,
        token: &SecretString,
    ) -> Result<(), ApiError> {
        self.send_json(Method::POST, "/admin/users", token, &account.to_request())
            .await
    }

    /// Replace an account's profile fields and role.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` with the server's reason.
    #[instrument(skip(self, token, profile), fields(id = %id, role = %role))]
    pub async fn update_user(
        &self,
        id: UserId,
        profile: &Profile,
        role: Role,
        token: &SecretString,
    ) -> Result<(), ApiError> {
        self.send_json(
            Method::PUT,
            &format!("/admin/users/{id}"),
            token,
            &ProfileUpdateRequest::new(profile, role),
        )
        .await
    }

    /// Delete an account. Deleting a teacher orphans their students server-side.
    ///
    /// # Errors
    ///
    /// Returns an error if the server refuses.
    #[instrument(skip(self, token), fields(id = %id))]
    pub async fn delete_user(&self, id: UserId, token: &SecretString) -> Result<(), ApiError> {
        self.send_empty(Method::DELETE, &format!("/admin/users/{id}"), token)
            .await
    }

    /// Assign a student to a teacher, replacing any previous assignment.
    ///
    /// # Errors
    ///
    /// Returns an error if either id is unknown or has the wrong role.
    #[instrument(skip(self, token), fields(student = %student, teacher = %teacher))]
    pub async fn assign(
        &self,
        student: UserId,
        teacher: UserId,
        token: &SecretString,
    ) -> Result<(), ApiError> {
        self.send_empty(
            Method::PUT,
            &format!("/admin/assign/{student}/to/{teacher}"),
            token,
        )
        .await
    }

    /// Remove a student's teacher assignment.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is unknown or not a student.
    #[instrument(skip(self, token), fields(student = %student))]
    pub async fn unassign(&self, student: UserId, token: &SecretString) -> Result<(), ApiError> {
        self.send_empty(Method::PUT, &format!("/admin/unassign/{student}"), token)
            .await
    }
}
