//! Login, registration and session commands.
//!
//! # Usage
//!
//! ```bash
//! school register -u alice -e alice@school.edu -d Physics -r TEACHER
//! school login -u alice
//! school whoami
//! school logout
//! ```

use schoolhouse_client::api::NewAccount;
use schoolhouse_core::{Profile, Role};
use secrecy::SecretString;

use super::{CommandError, Context, print};

/// Log in, then show the dashboard the session opens onto.
pub async fn login(
    ctx: &Context,
    username: &str,
    password: Option<String>,
) -> Result<(), CommandError> {
    let password = SecretString::from(super::password(password)?);

    if let Err(e) = ctx.manager().login(username, &password).await {
        ctx.print_screen()?;
        return Err(e.into());
    }

    let dashboard = ctx.dashboard().await?;
    ctx.finish(&dashboard, Ok(()))
}

/// Create an account through the public registration endpoint.
pub async fn register(
    ctx: &Context,
    username: &str,
    email: &str,
    department: &str,
    role: Role,
    password: Option<String>,
) -> Result<(), CommandError> {
    let profile = Profile::new(username, email, department)
        .map_err(|e| CommandError::InvalidInput(e.to_string()))?;
    let account = NewAccount::new(profile, super::password(password)?, role);

    ctx.manager().show_register();
    let outcome = ctx.manager().register(&account).await;
    ctx.print_screen()?;
    outcome.map_err(CommandError::from)
}

/// Forget the persisted session.
pub fn logout(ctx: &Context) -> Result<(), CommandError> {
    ctx.manager().logout();
    ctx.print_screen()
}

/// Show the persisted session without contacting the server.
pub fn whoami(ctx: &Context) -> Result<(), CommandError> {
    match ctx.manager().load_session() {
        Some(session) => print(&format!("{} ({})", session.email(), session.role())),
        None => {
            ctx.print_screen()?;
            Err(CommandError::NotLoggedIn)
        }
    }
}

/// Query the backend health endpoint.
pub async fn health(ctx: &Context) -> Result<(), CommandError> {
    let status = ctx.manager().api().health().await?;
    print(&format!("Backend status: {}", status.status))?;

    if status.is_up() {
        Ok(())
    } else {
        Err(CommandError::Unhealthy(status.status))
    }
}
