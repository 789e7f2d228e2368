//! Student and teacher records as returned by the backend.
//!
//! Both collections come from the same `users` table; the backend embeds the
//! other side of an assignment as a trimmed-down [`UserSummary`]. The client
//! never checks that the two sides agree; it renders what the server reports.

use serde::{Deserialize, Deserializer, Serialize};

use super::{Email, Role, UserId};

/// The nested view of a user on the other side of an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub email: Email,
    #[serde(default)]
    pub department: String,
}

/// A student account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: UserId,
    pub username: String,
    pub email: Email,
    #[serde(default)]
    pub department: String,
    /// The teacher this student is assigned to, if any.
    #[serde(default)]
    pub assigned_teacher: Option<UserSummary>,
}

impl Student {
    /// Whether the server reports no teacher for this student.
    #[must_use]
    pub const fn is_unassigned(&self) -> bool {
        self.assigned_teacher.is_none()
    }

    /// ID of the assigned teacher, if any.
    #[must_use]
    pub fn teacher_id(&self) -> Option<UserId> {
        self.assigned_teacher.as_ref().map(|t| t.id)
    }
}

/// A teacher account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: UserId,
    pub username: String,
    pub email: Email,
    #[serde(default)]
    pub department: String,
    /// Derived back-reference: the students the server lists for this teacher.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub assigned_students: Vec<UserSummary>,
}

/// A full user record as returned by `GET /users/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub email: Email,
    #[serde(default)]
    pub department: String,
    pub role: Role,
    #[serde(default)]
    pub assigned_teacher: Option<UserSummary>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub assigned_students: Vec<UserSummary>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_student_with_teacher() {
        let json = r#"{
            "id": 3,
            "username": "sam",
            "email": "sam@school.edu",
            "password": "$2a$10$hash",
            "department": "Physics",
            "role": "STUDENT",
            "assignedTeacher": {
                "id": 7,
                "username": "mrs_t",
                "email": "t@school.edu",
                "department": "Physics",
                "role": "TEACHER"
            }
        }"#;

        let student: Student = serde_json::from_str(json).unwrap();
        assert_eq!(student.teacher_id(), Some(UserId::new(7)));
        assert!(!student.is_unassigned());
    }

    #[test]
    fn test_student_with_null_teacher() {
        let json = r#"{"id":4,"username":"kim","email":"k@s.edu","department":"Art","assignedTeacher":null}"#;
        let student: Student = serde_json::from_str(json).unwrap();
        assert!(student.is_unassigned());
    }

    #[test]
    fn test_teacher_null_students_is_empty() {
        let json = r#"{"id":7,"username":"t","email":"t@s.edu","department":"Art","assignedStudents":null}"#;
        let teacher: Teacher = serde_json::from_str(json).unwrap();
        assert!(teacher.assigned_students.is_empty());

        let json = r#"{"id":7,"username":"t","email":"t@s.edu","department":"Art"}"#;
        let teacher: Teacher = serde_json::from_str(json).unwrap();
        assert!(teacher.assigned_students.is_empty());
    }

    #[test]
    fn test_user_record_unknown_role() {
        let json = r#"{"id":1,"username":"p","email":"p@s.edu","department":"Office","role":"PRINCIPAL"}"#;
        let user: UserRecord = serde_json::from_str(json).unwrap();
        assert_eq!(user.role, Role::Unknown);
    }
}
