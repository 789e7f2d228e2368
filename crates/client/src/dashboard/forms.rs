//! Form and selector state derived from the cached collections.
//!
//! Nothing here is persisted or sent anywhere; it is rebuilt from the caches
//! whenever the dashboard needs it.

use schoolhouse_core::{Role, Student, Teacher, UserId};

/// One entry of a selector. `value: None` is the placeholder entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: Option<UserId>,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    fn placeholder(label: &str) -> Self {
        Self {
            value: None,
            label: label.to_owned(),
            selected: false,
        }
    }

    fn user(id: UserId, username: &str, department: &str, selected: bool) -> Self {
        Self {
            value: Some(id),
            label: format!("{username} ({department})"),
            selected,
        }
    }
}

/// The two selectors on the assignments tab.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentSelector {
    /// Placeholder plus every unassigned student.
    pub students: Vec<SelectOption>,
    /// Placeholder plus every teacher.
    pub teachers: Vec<SelectOption>,
}

impl AssignmentSelector {
    pub(crate) fn build<'a>(
        unassigned: impl IntoIterator<Item = &'a Student>,
        teachers: &[Teacher],
    ) -> Self {
        let students = std::iter::once(SelectOption::placeholder("Select a student"))
            .chain(
                unassigned
                    .into_iter()
                    .map(|s| SelectOption::user(s.id, &s.username, &s.department, false)),
            )
            .collect();
        let teachers = std::iter::once(SelectOption::placeholder("Select a teacher"))
            .chain(
                teachers
                    .iter()
                    .map(|t| SelectOption::user(t.id, &t.username, &t.department, false)),
            )
            .collect();

        Self { students, teachers }
    }
}

/// Pre-filled state of the edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditForm {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub department: String,
    pub role: Role,
    /// "None (Unassigned)" plus every teacher; empty unless editing a student.
    pub teacher_options: Vec<SelectOption>,
}

impl EditForm {
    pub(crate) fn for_student(student: &Student, teachers: &[Teacher]) -> Self {
        let current = student.teacher_id();
        let teacher_options = std::iter::once(SelectOption {
            selected: current.is_none(),
            ..SelectOption::placeholder("None (Unassigned)")
        })
        .chain(teachers.iter().map(|t| {
            SelectOption::user(t.id, &t.username, &t.department, Some(t.id) == current)
        }))
        .collect();

        Self {
            id: student.id,
            username: student.username.clone(),
            email: student.email.to_string(),
            department: student.department.clone(),
            role: Role::Student,
            teacher_options,
        }
    }

    pub(crate) fn for_teacher(teacher: &Teacher) -> Self {
        Self {
            id: teacher.id,
            username: teacher.username.clone(),
            email: teacher.email.to_string(),
            department: teacher.department.clone(),
            role: Role::Teacher,
            teacher_options: Vec::new(),
        }
    }

    /// The teacher preselected in the form, if any.
    #[must_use]
    pub fn selected_teacher(&self) -> Option<UserId> {
        self.teacher_options
            .iter()
            .find(|o| o.selected)
            .and_then(|o| o.value)
    }
}

/// The form currently open on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Form {
    /// "Add student" / "Add teacher".
    Create { role: Role },
    /// "Edit user".
    Edit(EditForm),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use schoolhouse_core::{Email, UserSummary};

    use super::*;

    fn teacher(id: i64, name: &str) -> Teacher {
        Teacher {
            id: UserId::new(id),
            username: name.to_string(),
            email: Email::parse(&format!("{name}@school.edu")).unwrap(),
            department: "Science".to_string(),
            assigned_students: Vec::new(),
        }
    }

    fn student(id: i64, name: &str, teacher: Option<&Teacher>) -> Student {
        Student {
            id: UserId::new(id),
            username: name.to_string(),
            email: Email::parse(&format!("{name}@school.edu")).unwrap(),
            department: "Science".to_string(),
            assigned_teacher: teacher.map(|t| UserSummary {
                id: t.id,
                username: t.username.clone(),
                email: t.email.clone(),
                department: t.department.clone(),
            }),
        }
    }

    #[test]
    fn test_assignment_selector_placeholders_first() {
        let teachers = vec![teacher(10, "curie")];
        let students = [student(1, "ada", None)];
        let selector = AssignmentSelector::build(students.iter(), &teachers);

        assert_eq!(selector.students.len(), 2);
        assert_eq!(selector.students[0].label, "Select a student");
        assert_eq!(selector.students[0].value, None);
        assert_eq!(selector.students[1].label, "ada (Science)");
        assert_eq!(selector.teachers[0].label, "Select a teacher");
        assert_eq!(selector.teachers[1].value, Some(UserId::new(10)));
    }

    #[test]
    fn test_edit_form_preselects_current_teacher() {
        let teachers = vec![teacher(10, "curie"), teacher(11, "bohr")];
        let form = EditForm::for_student(&student(1, "ada", Some(&teachers[1])), &teachers);

        assert_eq!(form.teacher_options.len(), 3);
        assert_eq!(form.selected_teacher(), Some(UserId::new(11)));
        assert!(!form.teacher_options[0].selected);
    }

    #[test]
    fn test_edit_form_unassigned_selects_none() {
        let teachers = vec![teacher(10, "curie")];
        let form = EditForm::for_student(&student(1, "ada", None), &teachers);

        assert!(form.teacher_options[0].selected);
        assert_eq!(form.selected_teacher(), None);
    }

    #[test]
    fn test_edit_form_for_teacher_has_no_selector() {
        let form = EditForm::for_teacher(&teacher(10, "curie"));
        assert_eq!(form.role, Role::Teacher);
        assert!(form.teacher_options.is_empty());
    }
}
