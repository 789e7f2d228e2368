//! Command implementations.
//!
//! Every data command opens the dashboard first, so the session gate runs
//! before anything else, then prints the rendered screen to stdout.

pub mod assign;
pub mod auth;
pub mod users;

use std::io::{BufRead, Write};

use askama::Template;
use schoolhouse_client::api::ApiClient;
use schoolhouse_client::confirm::{AssumeYes, Confirm};
use schoolhouse_client::dashboard::Dashboard;
use schoolhouse_client::navigator::Navigator;
use schoolhouse_client::notify::Notifier;
use schoolhouse_client::store::FileStore;
use schoolhouse_client::views::LoginPage;
use schoolhouse_client::{ActionError, ApiError, ClientConfig, SessionManager};
use thiserror::Error;

/// Errors that end a command with a non-zero exit status.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("{0}")]
    Action(#[from] ActionError),

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Backend unreachable, session kept")]
    Unreachable,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Backend is not healthy: {0}")]
    Unhealthy(String),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything a command needs: the session manager and the prompt policy.
pub struct Context {
    manager: SessionManager,
    assume_yes: bool,
}

impl Context {
    /// Wire the session manager to the file store named in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: ClientConfig, assume_yes: bool) -> Result<Self, CommandError> {
        let api = ApiClient::new(&config)?;
        let store = FileStore::new(config.session_file.clone());
        let notifier = Notifier::new(config.toast_ttl);
        let manager = SessionManager::new(&config, api, store, Navigator::default(), notifier);

        Ok(Self {
            manager,
            assume_yes,
        })
    }

    pub const fn manager(&self) -> &SessionManager {
        &self.manager
    }

    /// Open the dashboard, or print the login screen when the session gate
    /// refuses.
    ///
    /// A token that is still stored after a refusal means the backend could
    /// not be reached; only the message is printed then.
    pub async fn dashboard(&self) -> Result<Dashboard, CommandError> {
        let prompt = Prompt {
            assume_yes: self.assume_yes,
        };
        if let Some(dashboard) = Dashboard::open(self.manager.clone(), prompt).await {
            return Ok(dashboard);
        }

        if self.manager.has_stored_token() {
            if let Some(toast) = self.manager.notifier().current() {
                print(&format!("[{}] {}", toast.kind, toast.message))?;
            }
            return Err(CommandError::Unreachable);
        }
        self.print_screen()?;
        Err(CommandError::NotLoggedIn)
    }

    /// Print the current unauthenticated screen with its message.
    pub fn print_screen(&self) -> Result<(), CommandError> {
        let toast = self.manager.notifier().current();
        let page = LoginPage::new(self.manager.navigator().current(), toast.as_ref());
        print(&page.render()?)
    }

    /// Print the dashboard (or the login screen if the session was rejected)
    /// and turn the action outcome into the command result.
    pub fn finish(
        &self,
        dashboard: &Dashboard,
        outcome: Result<(), ActionError>,
    ) -> Result<(), CommandError> {
        if dashboard.is_expired() {
            self.print_screen()?;
        } else {
            print(&dashboard.render()?)?;
        }

        match outcome {
            Ok(()) => Ok(()),
            Err(ActionError::Cancelled) => {
                tracing::info!("Cancelled");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Confirmation on stdin, skipped with `--yes`.
struct Prompt {
    assume_yes: bool,
}

impl Confirm for Prompt {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return AssumeYes.confirm(prompt);
        }
        match read_line(&format!("{prompt} [y/N] ")) {
            Ok(answer) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read confirmation");
                false
            }
        }
    }
}

/// Write `prompt` to stderr and read one line from stdin.
pub fn read_line(prompt: &str) -> std::io::Result<String> {
    let mut err = std::io::stderr().lock();
    write!(err, "{prompt}")?;
    err.flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

/// The given password, or one read from stdin.
pub fn password(given: Option<String>) -> Result<String, CommandError> {
    let password = match given {
        Some(password) => password,
        None => read_line("Password: ")?,
    };
    if password.is_empty() {
        return Err(CommandError::InvalidInput("Password is required".to_string()));
    }
    Ok(password)
}

/// Write a rendered view to stdout.
pub fn print(text: &str) -> Result<(), CommandError> {
    let mut out = std::io::stdout().lock();
    writeln!(out, "{}", text.trim_end())?;
    Ok(())
}
