//! Assignment commands.
//!
//! # Usage
//!
//! ```bash
//! school assignments
//! school assign --student 3 --teacher 7
//! school unassign 3 --yes
//! ```

use schoolhouse_client::dashboard::Tab;
use schoolhouse_core::UserId;

use super::{CommandError, Context};

/// Assign a student to a teacher. Both ids are required.
pub async fn assign(
    ctx: &Context,
    student: Option<UserId>,
    teacher: Option<UserId>,
) -> Result<(), CommandError> {
    let mut dashboard = ctx.dashboard().await?;
    let mut outcome = dashboard.select_tab(Tab::Assignments);
    if outcome.is_ok() {
        outcome = dashboard.assign(student, teacher).await;
    }
    ctx.finish(&dashboard, outcome)
}

/// Remove a student's teacher after confirmation.
pub async fn unassign(ctx: &Context, student: UserId) -> Result<(), CommandError> {
    let mut dashboard = ctx.dashboard().await?;
    let outcome = dashboard.unassign(student).await;
    ctx.finish(&dashboard, outcome)
}
