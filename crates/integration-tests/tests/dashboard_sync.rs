//! Integration tests for dashboard mutations and the reload that follows
//! each one.
//!
//! Run with: cargo test -p schoolhouse-integration-tests

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::http::Method;
use schoolhouse_client::ActionError;
use schoolhouse_client::api::NewAccount;
use schoolhouse_client::dashboard::{Dashboard, Form, Tab};
use schoolhouse_client::navigator::Screen;
use schoolhouse_core::{Profile, Role, UserId};
use schoolhouse_integration_tests::{MockBackend, logged_in_store};
use serde_json::json;

async fn open_as(backend: &MockBackend, role: &str) -> Dashboard {
    let manager = backend.manager(logged_in_store("abc", role).unwrap()).unwrap();
    let dashboard = Dashboard::open(manager, |_: &str| true).await.unwrap();
    backend.clear_requests();
    dashboard
}

async fn open_admin(backend: &MockBackend) -> Dashboard {
    open_as(backend, "ADMIN").await
}

fn toast(dashboard: &Dashboard) -> Option<String> {
    dashboard.manager().notifier().current().map(|t| t.message)
}

fn id(n: i64) -> UserId {
    UserId::new(n)
}

// ============================================================================
// Derived state
// ============================================================================

#[tokio::test]
async fn test_unassigned_students_matches_cache() {
    let backend = MockBackend::with_school().await.unwrap();
    let dashboard = open_admin(&backend).await;

    let expected: Vec<_> = dashboard
        .students()
        .iter()
        .filter(|s| s.assigned_teacher.is_none())
        .map(|s| s.id)
        .collect();
    let derived: Vec<_> = dashboard.unassigned_students().iter().map(|s| s.id).collect();

    assert_eq!(derived, expected);
    assert_eq!(derived, vec![id(1)]);
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_assignments_tab_needs_no_request() {
    let backend = MockBackend::with_school().await.unwrap();
    let mut dashboard = open_admin(&backend).await;

    dashboard.select_tab(Tab::Assignments).unwrap();

    let labels: Vec<_> = dashboard
        .assignment()
        .students
        .iter()
        .map(|o| o.label.as_str())
        .collect();
    assert_eq!(labels, vec!["Select a student", "ada (Math)"]);
    assert_eq!(dashboard.assignment().teachers.len(), 3);
    assert!(backend.requests().is_empty());
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_add_student_reloads_students_only() {
    let backend = MockBackend::with_school().await.unwrap();
    let mut dashboard = open_admin(&backend).await;
    dashboard.open_create_form(Role::Student).unwrap();

    let profile = Profile::new("sam", "sam@school.edu", "Physics").unwrap();
    // The role tag is fixed by the form, whatever the account says
    let account = NewAccount::new(profile, "pw", Role::Teacher);
    dashboard.add_user(account, Role::Student).await.unwrap();

    assert_eq!(
        backend.request_lines(),
        vec!["POST /api/admin/users", "GET /api/students"]
    );
    let body = backend.requests()[0].body.clone().unwrap();
    assert_eq!(body["role"], json!("STUDENT"));
    assert_eq!(body["password"], json!("pw"));
    assert!(dashboard.form().is_none());
    assert_eq!(toast(&dashboard).as_deref(), Some("Student added successfully"));
}

#[tokio::test]
async fn test_add_failure_shows_server_text_without_reload() {
    let backend = MockBackend::with_school().await.unwrap();
    backend.on(Method::POST, "/api/admin/users", 400, "Username already taken");
    let mut dashboard = open_admin(&backend).await;
    dashboard.open_create_form(Role::Teacher).unwrap();

    let profile = Profile::new("curie", "c@school.edu", "Physics").unwrap();
    let err = dashboard
        .add_user(NewAccount::new(profile, "pw", Role::Teacher), Role::Teacher)
        .await
        .unwrap_err();

    assert_eq!(err, ActionError::Failed("Username already taken".to_string()));
    assert_eq!(backend.request_lines(), vec!["POST /api/admin/users"]);
    assert_eq!(
        dashboard.form(),
        Some(&Form::Create {
            role: Role::Teacher
        })
    );
}

#[tokio::test]
async fn test_add_failure_empty_body_uses_generic_text() {
    let backend = MockBackend::with_school().await.unwrap();
    backend.on(Method::POST, "/api/admin/users", 500, "");
    let mut dashboard = open_admin(&backend).await;

    let profile = Profile::new("curie", "c@school.edu", "Physics").unwrap();
    let err = dashboard
        .add_user(NewAccount::new(profile, "pw", Role::Teacher), Role::Teacher)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Failed to add teacher");
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
async fn test_delete_teacher_reloads_both_collections() {
    let backend = MockBackend::with_school().await.unwrap();
    let mut dashboard = open_admin(&backend).await;

    dashboard.delete_user(id(10), Role::Teacher).await.unwrap();

    assert_eq!(
        backend.request_lines(),
        vec![
            "DELETE /api/admin/users/10",
            "GET /api/students",
            "GET /api/teachers"
        ]
    );
    assert_eq!(toast(&dashboard).as_deref(), Some("Teacher deleted successfully"));
}

#[tokio::test]
async fn test_declined_delete_sends_nothing() {
    let backend = MockBackend::with_school().await.unwrap();
    let manager = backend.manager(logged_in_store("abc", "ADMIN").unwrap()).unwrap();
    let prompts = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&prompts);
    let mut dashboard = Dashboard::open(manager, move |prompt: &str| {
        assert_eq!(prompt, "Are you sure you want to delete this student?");
        seen.fetch_add(1, Ordering::SeqCst);
        false
    })
    .await
    .unwrap();
    backend.clear_requests();

    let err = dashboard.delete_user(id(1), Role::Student).await.unwrap_err();

    assert_eq!(err, ActionError::Cancelled);
    assert_eq!(prompts.load(Ordering::SeqCst), 1);
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_delete_failure_is_generic() {
    let backend = MockBackend::with_school().await.unwrap();
    backend.on(Method::DELETE, "/api/admin/users/1", 500, "constraint violation");
    let mut dashboard = open_admin(&backend).await;

    let err = dashboard.delete_user(id(1), Role::Student).await.unwrap_err();

    assert_eq!(err.to_string(), "Failed to delete student");
    assert_eq!(backend.request_lines(), vec!["DELETE /api/admin/users/1"]);
}

// ============================================================================
// Assign / unassign
// ============================================================================

#[tokio::test]
async fn test_assign_with_missing_id_sends_nothing() {
    let backend = MockBackend::with_school().await.unwrap();
    let mut dashboard = open_admin(&backend).await;

    for (student, teacher) in [(None, Some(id(10))), (Some(id(1)), None), (None, None)] {
        let err = dashboard.assign(student, teacher).await.unwrap_err();
        assert_eq!(
            err,
            ActionError::Validation("Please select both student and teacher".to_string())
        );
    }
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_assign_reloads_and_rebuilds_selector() {
    let backend = MockBackend::with_school().await.unwrap();
    let mut dashboard = open_admin(&backend).await;

    // The server now reports ada as assigned
    backend.json(
        Method::GET,
        "/api/students",
        200,
        &json!([{
            "id": 1, "username": "ada", "email": "ada@school.edu", "department": "Math",
            "assignedTeacher": {"id": 11, "username": "bohr", "email": "bohr@school.edu", "department": "Physics"}
        }]),
    );
    dashboard.assign(Some(id(1)), Some(id(11))).await.unwrap();

    assert_eq!(
        backend.request_lines(),
        vec![
            "PUT /api/admin/assign/1/to/11",
            "GET /api/students",
            "GET /api/teachers"
        ]
    );
    assert_eq!(backend.requests()[0].authorization.as_deref(), Some("Bearer abc"));
    assert!(dashboard.unassigned_students().is_empty());
    assert_eq!(dashboard.assignment().students.len(), 1);
    assert_eq!(toast(&dashboard).as_deref(), Some("Student assigned successfully"));
}

#[tokio::test]
async fn test_assign_failure_leaves_state() {
    let backend = MockBackend::with_school().await.unwrap();
    backend.on(Method::PUT, "/api/admin/assign/1/to/10", 400, "Invalid student or teacher");
    let mut dashboard = open_admin(&backend).await;

    let err = dashboard.assign(Some(id(1)), Some(id(10))).await.unwrap_err();

    assert_eq!(err.to_string(), "Failed to assign student");
    assert_eq!(backend.request_lines(), vec!["PUT /api/admin/assign/1/to/10"]);
    assert_eq!(dashboard.unassigned_students().len(), 1);
}

#[tokio::test]
async fn test_unassign_reloads_both() {
    let backend = MockBackend::with_school().await.unwrap();
    let mut dashboard = open_admin(&backend).await;

    dashboard.unassign(id(2)).await.unwrap();

    assert_eq!(
        backend.request_lines(),
        vec![
            "PUT /api/admin/unassign/2",
            "GET /api/students",
            "GET /api/teachers"
        ]
    );
    assert_eq!(toast(&dashboard).as_deref(), Some("Student unassigned successfully"));
}

// ============================================================================
// Update
// ============================================================================

fn profile() -> Profile {
    Profile::new("ada", "ada@school.edu", "Chemistry").unwrap()
}

#[tokio::test]
async fn test_update_student_with_teacher_orders_requests() {
    let backend = MockBackend::with_school().await.unwrap();
    let mut dashboard = open_admin(&backend).await;
    dashboard.open_edit_form(id(1), Role::Student).unwrap();

    dashboard
        .update_user(id(1), profile(), Role::Student, Some(id(10)))
        .await
        .unwrap();

    assert_eq!(
        backend.request_lines(),
        vec![
            "PUT /api/admin/users/1",
            "PUT /api/admin/assign/1/to/10",
            "GET /api/students",
            "GET /api/teachers"
        ]
    );
    assert_eq!(
        backend.requests()[0].body,
        Some(json!({
            "username": "ada",
            "email": "ada@school.edu",
            "department": "Chemistry",
            "role": "STUDENT"
        }))
    );
    assert!(dashboard.form().is_none());
    assert_eq!(toast(&dashboard).as_deref(), Some("User updated successfully"));
}

#[tokio::test]
async fn test_update_failure_stops_before_assignment() {
    let backend = MockBackend::with_school().await.unwrap();
    backend.on(Method::PUT, "/api/admin/users/1", 400, "Email already in use");
    let mut dashboard = open_admin(&backend).await;

    let err = dashboard
        .update_user(id(1), profile(), Role::Student, Some(id(10)))
        .await
        .unwrap_err();

    assert_eq!(err, ActionError::Failed("Email already in use".to_string()));
    assert_eq!(backend.request_lines(), vec!["PUT /api/admin/users/1"]);
}

#[tokio::test]
async fn test_update_failure_empty_body() {
    let backend = MockBackend::with_school().await.unwrap();
    backend.on(Method::PUT, "/api/admin/users/1", 500, "");
    let mut dashboard = open_admin(&backend).await;

    let err = dashboard
        .update_user(id(1), profile(), Role::Student, None)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Failed to update user");
}

#[tokio::test]
async fn test_update_refused_unassign_is_silent() {
    let backend = MockBackend::with_school().await.unwrap();
    backend.on(Method::PUT, "/api/admin/unassign/1", 400, "Student has no teacher");
    let mut dashboard = open_admin(&backend).await;

    dashboard
        .update_user(id(1), profile(), Role::Student, None)
        .await
        .unwrap();

    assert_eq!(
        backend.mutation_lines(),
        vec!["PUT /api/admin/users/1", "PUT /api/admin/unassign/1"]
    );
    assert_eq!(toast(&dashboard).as_deref(), Some("User updated successfully"));
}

#[tokio::test]
async fn test_update_assign_failure_reports_and_reloads() {
    let backend = MockBackend::with_school().await.unwrap();
    backend.on(Method::PUT, "/api/admin/assign/1/to/10", 400, "");
    let mut dashboard = open_admin(&backend).await;
    dashboard.open_edit_form(id(1), Role::Student).unwrap();

    let err = dashboard
        .update_user(id(1), profile(), Role::Student, Some(id(10)))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "User updated but assignment failed");
    assert_eq!(
        backend.request_lines(),
        vec![
            "PUT /api/admin/users/1",
            "PUT /api/admin/assign/1/to/10",
            "GET /api/students",
            "GET /api/teachers"
        ]
    );
    assert!(matches!(dashboard.form(), Some(Form::Edit(_))));
}

#[tokio::test]
async fn test_update_teacher_skips_second_phase() {
    let backend = MockBackend::with_school().await.unwrap();
    let mut dashboard = open_admin(&backend).await;

    let profile = Profile::new("curie", "curie@school.edu", "Chemistry").unwrap();
    dashboard
        .update_user(id(10), profile, Role::Teacher, Some(id(11)))
        .await
        .unwrap();

    assert_eq!(backend.mutation_lines(), vec!["PUT /api/admin/users/10"]);
}

// ============================================================================
// Session rejection mid-session
// ============================================================================

#[tokio::test]
async fn test_rejection_during_mutation_invalidates_session() {
    let backend = MockBackend::with_school().await.unwrap();
    backend.on(Method::DELETE, "/api/admin/users/1", 403, "");
    let mut dashboard = open_admin(&backend).await;

    let err = dashboard.delete_user(id(1), Role::Student).await.unwrap_err();

    assert_eq!(err, ActionError::SessionExpired);
    assert!(dashboard.is_expired());
    assert_eq!(dashboard.manager().navigator().current(), Screen::Login);
    assert!(dashboard.manager().load_session().is_none());
    assert_eq!(
        toast(&dashboard).as_deref(),
        Some("Session expired or unauthorized. Redirecting to login...")
    );

    // Nothing more goes out once the session is gone
    backend.clear_requests();
    let err = dashboard.unassign(id(2)).await.unwrap_err();
    assert_eq!(err, ActionError::SessionExpired);
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_rejection_during_update_skips_reload() {
    let backend = MockBackend::with_school().await.unwrap();
    backend.on(Method::PUT, "/api/admin/assign/1/to/10", 401, "");
    let mut dashboard = open_admin(&backend).await;

    let err = dashboard
        .update_user(id(1), profile(), Role::Student, Some(id(10)))
        .await
        .unwrap_err();

    assert_eq!(err, ActionError::SessionExpired);
    assert_eq!(
        backend.request_lines(),
        vec!["PUT /api/admin/users/1", "PUT /api/admin/assign/1/to/10"]
    );
}

#[tokio::test]
async fn test_rejected_teacher_load_on_open_invalidates_session() {
    let backend = MockBackend::with_school().await.unwrap();
    backend.on(Method::GET, "/api/teachers", 403, "");
    let manager = backend.manager(logged_in_store("abc", "ADMIN").unwrap()).unwrap();

    let dashboard = Dashboard::open(manager.clone(), |_: &str| true).await;

    assert!(dashboard.is_none());
    assert_eq!(manager.navigator().current(), Screen::Login);
    assert!(!manager.has_stored_token());
    assert_eq!(
        manager.notifier().current().map(|t| t.message).as_deref(),
        Some("Session expired or unauthorized. Redirecting to login...")
    );
    assert_eq!(
        backend.request_lines(),
        vec!["GET /api/students", "GET /api/students", "GET /api/teachers"]
    );
}

#[tokio::test]
async fn test_mutations_while_unreachable_leave_state() {
    let backend = MockBackend::with_school().await.unwrap();
    let mut dashboard = open_admin(&backend).await;
    backend.stop().await;

    let err = dashboard.assign(Some(id(1)), Some(id(10))).await.unwrap_err();
    assert_eq!(err, ActionError::Failed("Network error".to_string()));
    assert_eq!(toast(&dashboard).as_deref(), Some("Network error"));

    let err = dashboard.delete_user(id(2), Role::Student).await.unwrap_err();
    assert_eq!(err, ActionError::Failed("Network error".to_string()));

    assert!(!dashboard.is_expired());
    assert!(dashboard.manager().has_stored_token());
    assert_eq!(dashboard.manager().navigator().current(), Screen::Dashboard);
    assert_eq!(dashboard.students().len(), 2);
    assert_eq!(dashboard.teachers().len(), 2);
    assert_eq!(dashboard.unassigned_students().len(), 1);
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_load_failure_keeps_previous_collection() {
    let backend = MockBackend::with_school().await.unwrap();
    let mut dashboard = open_admin(&backend).await;
    backend.on(Method::GET, "/api/teachers", 500, "");

    let err = dashboard.load_teachers().await.unwrap_err();

    assert_eq!(err.to_string(), "Failed to load teachers");
    assert_eq!(dashboard.teachers().len(), 2);
}

// ============================================================================
// Role gating and single-user fetch
// ============================================================================

#[tokio::test]
async fn test_teacher_role_is_read_only() {
    let backend = MockBackend::with_school().await.unwrap();
    let mut dashboard = open_as(&backend, "TEACHER").await;

    assert!(dashboard.select_tab(Tab::Assignments).is_err());
    let err = dashboard.unassign(id(2)).await.unwrap_err();
    assert_eq!(
        err,
        ActionError::Validation("Administrator access required".to_string())
    );
    assert!(backend.requests().is_empty());

    dashboard.select_tab(Tab::Teachers).unwrap();
    let text = dashboard.render().unwrap();
    assert!(text.contains("curie"));
    assert!(text.contains("Assigned Students: 1"));
    assert!(!text.contains("Actions:"));
}

#[tokio::test]
async fn test_fetch_user() {
    let backend = MockBackend::with_school().await.unwrap();
    backend.json(
        Method::GET,
        "/api/users/2",
        200,
        &json!({
            "id": 2, "username": "ben", "email": "ben@school.edu", "department": "Physics",
            "role": "STUDENT",
            "assignedTeacher": {"id": 10, "username": "curie", "email": "curie@school.edu", "department": "Physics"},
            "assignedStudents": null
        }),
    );
    let mut dashboard = open_admin(&backend).await;

    let user = dashboard.fetch_user(id(2)).await.unwrap();
    assert_eq!(user.role, Role::Student);
    assert_eq!(user.assigned_teacher.map(|t| t.id), Some(id(10)));

    let err = dashboard.fetch_user(id(99)).await.unwrap_err();
    assert_eq!(err.to_string(), "Not found");
}
