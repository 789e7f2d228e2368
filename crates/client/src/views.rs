//! Text views rendered with Askama.
//!
//! View models hold precomputed strings and flags only; the templates under
//! `templates/` do no formatting of their own beyond loops and conditionals.

use askama::Template;
use schoolhouse_core::{Role, Student, Teacher, UserRecord};

use crate::dashboard::{Dashboard, Form, SelectOption, Tab};
use crate::navigator::Screen;
use crate::notify::Toast;

/// Label shown for a student without a teacher.
const NOT_ASSIGNED: &str = "Not assigned";

/// One entry of the tab bar.
#[derive(Debug, Clone)]
pub struct TabView {
    pub label: &'static str,
    pub active: bool,
}

/// A student card.
#[derive(Debug, Clone)]
pub struct StudentCard {
    pub id: String,
    pub username: String,
    pub email: String,
    pub department: String,
    pub teacher: String,
    pub has_teacher: bool,
}

impl From<&Student> for StudentCard {
    fn from(student: &Student) -> Self {
        Self {
            id: student.id.to_string(),
            username: student.username.clone(),
            email: student.email.to_string(),
            department: student.department.clone(),
            teacher: student
                .assigned_teacher
                .as_ref()
                .map_or_else(|| NOT_ASSIGNED.to_owned(), |t| t.username.clone()),
            has_teacher: !student.is_unassigned(),
        }
    }
}

/// A teacher card.
#[derive(Debug, Clone)]
pub struct TeacherCard {
    pub id: String,
    pub username: String,
    pub email: String,
    pub department: String,
    pub student_count: usize,
}

impl From<&Teacher> for TeacherCard {
    fn from(teacher: &Teacher) -> Self {
        Self {
            id: teacher.id.to_string(),
            username: teacher.username.clone(),
            email: teacher.email.to_string(),
            department: teacher.department.clone(),
            student_count: teacher.assigned_students.len(),
        }
    }
}

/// A selector entry. Placeholders have an empty value.
#[derive(Debug, Clone)]
pub struct OptionView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl From<&SelectOption> for OptionView {
    fn from(option: &SelectOption) -> Self {
        Self {
            value: option.value.map(|id| id.to_string()).unwrap_or_default(),
            label: option.label.clone(),
            selected: option.selected,
        }
    }
}

/// A labelled form field.
#[derive(Debug, Clone)]
pub struct FieldView {
    pub label: &'static str,
    pub value: String,
}

/// The open creation or edit form.
#[derive(Debug, Clone)]
pub struct FormView {
    pub title: String,
    pub fields: Vec<FieldView>,
    pub teacher_options: Vec<OptionView>,
}

impl From<&Form> for FormView {
    fn from(form: &Form) -> Self {
        match form {
            Form::Create { role } => Self {
                title: format!("Add {}", role.title()),
                fields: ["Username", "Email", "Password", "Department"]
                    .into_iter()
                    .map(|label| FieldView {
                        label,
                        value: String::new(),
                    })
                    .collect(),
                teacher_options: Vec::new(),
            },
            Form::Edit(edit) => Self {
                title: format!("Edit User #{}", edit.id),
                fields: vec![
                    FieldView {
                        label: "Username",
                        value: edit.username.clone(),
                    },
                    FieldView {
                        label: "Email",
                        value: edit.email.clone(),
                    },
                    FieldView {
                        label: "Department",
                        value: edit.department.clone(),
                    },
                    FieldView {
                        label: "Role",
                        value: edit.role.to_string(),
                    },
                ],
                teacher_options: edit.teacher_options.iter().map(OptionView::from).collect(),
            },
        }
    }
}

/// The authenticated dashboard screen.
#[derive(Template)]
#[template(path = "dashboard.txt")]
pub struct DashboardPage {
    pub email: String,
    pub role: String,
    pub is_admin: bool,
    pub tabs: Vec<TabView>,
    pub show_students: bool,
    pub show_teachers: bool,
    pub show_assignments: bool,
    pub students: Vec<StudentCard>,
    pub teachers: Vec<TeacherCard>,
    pub assign_students: Vec<OptionView>,
    pub assign_teachers: Vec<OptionView>,
    pub has_form: bool,
    pub form: FormView,
    pub has_toast: bool,
    pub toast_kind: String,
    pub toast_message: String,
}

impl DashboardPage {
    /// Build the view from the dashboard's caches and the visible message.
    #[must_use]
    pub fn new(dashboard: &Dashboard, toast: Option<&Toast>) -> Self {
        let session = dashboard.session();
        let is_admin = session.is_admin();
        let tab = dashboard.tab();
        let form = dashboard.form().map(FormView::from);

        Self {
            email: session.email().to_owned(),
            role: session.role().to_string(),
            is_admin,
            tabs: Tab::ALL
                .into_iter()
                .filter(|t| is_admin || !t.is_admin_only())
                .map(|t| TabView {
                    label: t.label(),
                    active: t == tab,
                })
                .collect(),
            show_students: tab == Tab::Students,
            show_teachers: tab == Tab::Teachers,
            show_assignments: tab == Tab::Assignments,
            students: dashboard.students().iter().map(StudentCard::from).collect(),
            teachers: dashboard.teachers().iter().map(TeacherCard::from).collect(),
            assign_students: dashboard
                .assignment()
                .students
                .iter()
                .map(OptionView::from)
                .collect(),
            assign_teachers: dashboard
                .assignment()
                .teachers
                .iter()
                .map(OptionView::from)
                .collect(),
            has_form: form.is_some(),
            form: form.unwrap_or_else(|| FormView {
                title: String::new(),
                fields: Vec::new(),
                teacher_options: Vec::new(),
            }),
            has_toast: toast.is_some(),
            toast_kind: toast.map(|t| t.kind.to_string()).unwrap_or_default(),
            toast_message: toast.map(|t| t.message.clone()).unwrap_or_default(),
        }
    }
}

/// A single account, as returned by `GET /users/{id}`.
#[derive(Template)]
#[template(path = "user.txt")]
pub struct UserPage {
    pub id: String,
    pub username: String,
    pub email: String,
    pub department: String,
    pub role: String,
    pub is_student: bool,
    pub is_teacher: bool,
    pub teacher: String,
    /// "username (department)" for each assigned student.
    pub students: Vec<String>,
}

impl From<&UserRecord> for UserPage {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            email: user.email.to_string(),
            department: user.department.clone(),
            role: user.role.to_string(),
            is_student: user.role == Role::Student,
            is_teacher: user.role == Role::Teacher,
            teacher: user
                .assigned_teacher
                .as_ref()
                .map_or_else(|| NOT_ASSIGNED.to_owned(), |t| t.username.clone()),
            students: user
                .assigned_students
                .iter()
                .map(|s| format!("{} ({})", s.username, s.department))
                .collect(),
        }
    }
}

/// The login and registration screens.
#[derive(Template)]
#[template(path = "login.txt")]
pub struct LoginPage {
    pub register: bool,
    pub has_toast: bool,
    pub toast_kind: String,
    pub toast_message: String,
}

impl LoginPage {
    /// Build the view for `screen`. The dashboard screen renders as login.
    #[must_use]
    pub fn new(screen: Screen, toast: Option<&Toast>) -> Self {
        Self {
            register: screen == Screen::Register,
            has_toast: toast.is_some(),
            toast_kind: toast.map(|t| t.kind.to_string()).unwrap_or_default(),
            toast_message: toast.map(|t| t.message.clone()).unwrap_or_default(),
        }
    }
}
