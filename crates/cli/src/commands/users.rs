//! Student and teacher commands.
//!
//! # Usage
//!
//! ```bash
//! school students
//! school show 3
//! school add-teacher -u curie -e curie@school.edu -d Physics
//! school edit 3 --role student --department Chemistry --teacher 7
//! school delete 3 --role student
//! ```

use askama::Template;
use schoolhouse_client::api::NewAccount;
use schoolhouse_client::dashboard::{Form, Tab};
use schoolhouse_client::views::UserPage;
use schoolhouse_core::{Profile, Role, UserId};

use super::{CommandError, Context, print};

/// Fields given on the `edit` command line. `None` keeps the current value.
pub struct Changes {
    pub username: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub teacher: Option<UserId>,
    pub unassign: bool,
}

/// Show one tab of the dashboard.
pub async fn list(ctx: &Context, tab: Tab) -> Result<(), CommandError> {
    let mut dashboard = ctx.dashboard().await?;
    let outcome = dashboard.select_tab(tab);
    ctx.finish(&dashboard, outcome)
}

/// Show a single account.
pub async fn show(ctx: &Context, id: UserId) -> Result<(), CommandError> {
    let mut dashboard = ctx.dashboard().await?;
    match dashboard.fetch_user(id).await {
        Ok(user) => print(&UserPage::from(&user).render()?),
        Err(e) => ctx.finish(&dashboard, Err(e)),
    }
}

/// Create a student or teacher.
pub async fn add(
    ctx: &Context,
    username: &str,
    email: &str,
    department: &str,
    password: Option<String>,
    role: Role,
) -> Result<(), CommandError> {
    let profile = Profile::new(username, email, department)
        .map_err(|e| CommandError::InvalidInput(e.to_string()))?;
    let account = NewAccount::new(profile, super::password(password)?, role);

    let mut dashboard = ctx.dashboard().await?;
    let outcome = match dashboard.open_create_form(role) {
        Ok(()) => dashboard.add_user(account, role).await,
        Err(e) => Err(e),
    };
    ctx.finish(&dashboard, outcome)
}

/// Edit an account. Omitted fields keep the values the edit form was
/// pre-filled with.
pub async fn edit(ctx: &Context, id: UserId, role: Role, changes: Changes) -> Result<(), CommandError> {
    let mut dashboard = ctx.dashboard().await?;
    if let Err(e) = dashboard.open_edit_form(id, role) {
        return ctx.finish(&dashboard, Err(e));
    }
    let Some(Form::Edit(form)) = dashboard.form().cloned() else {
        return ctx.finish(&dashboard, Ok(()));
    };

    let profile = Profile::new(
        changes.username.as_deref().unwrap_or(&form.username),
        changes.email.as_deref().unwrap_or(&form.email),
        changes.department.as_deref().unwrap_or(&form.department),
    )
    .map_err(|e| CommandError::InvalidInput(e.to_string()))?;

    let teacher = if changes.unassign {
        None
    } else {
        changes.teacher.or_else(|| form.selected_teacher())
    };

    let outcome = dashboard.update_user(id, profile, role, teacher).await;
    ctx.finish(&dashboard, outcome)
}

/// Delete an account after confirmation.
pub async fn delete(ctx: &Context, id: UserId, role: Role) -> Result<(), CommandError> {
    let mut dashboard = ctx.dashboard().await?;
    let outcome = dashboard.delete_user(id, role).await;
    ctx.finish(&dashboard, outcome)
}
