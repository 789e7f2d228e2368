//! Schoolhouse CLI - terminal client for the school-management backend.
//!
//! # Usage
//!
//! ```bash
//! # Log in (the session is kept in SCHOOLHOUSE_SESSION_FILE)
//! school login -u alice
//!
//! # Browse
//! school students
//! school teachers
//!
//! # Administer (ADMIN role)
//! school add-student -u sam -e sam@school.edu -d Physics
//! school assign --student 3 --teacher 7
//! school delete 3 --role student --yes
//! ```
//!
//! # Environment Variables
//!
//! - `SCHOOLHOUSE_API_URL` - API base URL (default `http://localhost:8081/api`)
//! - `SCHOOLHOUSE_SESSION_FILE` - Where the session is persisted
//! - `SCHOOLHOUSE_LOG_FORMAT` - `json` for structured logs
//! - `SENTRY_DSN` - Enables error tracking when set
//! - `SENTRY_SAMPLE_RATE` - Share of error events sent (default 1.0)
//! - `RUST_LOG` - Log filter (default `schoolhouse=info`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use schoolhouse_client::ClientConfig;
use schoolhouse_client::dashboard::Tab;
use schoolhouse_core::{Role, UserId};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{CommandError, Context};

#[derive(Parser)]
#[command(name = "school")]
#[command(author, version, about = "Schoolhouse school-management client")]
struct Cli {
    /// Answer yes to every confirmation prompt
    #[arg(short, long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and persist the session
    Login {
        #[arg(short, long)]
        username: String,

        /// Read from stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Create an account, then return to the login screen
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        department: String,

        /// `STUDENT`, `TEACHER` or `ADMIN`
        #[arg(short, long, default_value = "STUDENT")]
        role: Role,

        /// Read from stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Forget the persisted session
    Logout,
    /// Show the persisted session
    Whoami,
    /// Check that the backend is up
    Health,
    /// List students
    Students,
    /// List teachers
    Teachers,
    /// Show the assignment selectors (ADMIN)
    Assignments,
    /// Show one account
    Show { id: UserId },
    /// Create a student (ADMIN)
    AddStudent(NewUserArgs),
    /// Create a teacher (ADMIN)
    AddTeacher(NewUserArgs),
    /// Edit an account; omitted fields keep their current value (ADMIN)
    Edit {
        id: UserId,

        /// `student` or `teacher`
        #[arg(short, long)]
        role: Role,

        #[arg(short, long)]
        username: Option<String>,

        #[arg(short, long)]
        email: Option<String>,

        #[arg(short, long)]
        department: Option<String>,

        /// Assign the student to this teacher
        #[arg(short, long, conflicts_with = "unassign")]
        teacher: Option<UserId>,

        /// Remove the student's teacher
        #[arg(long)]
        unassign: bool,
    },
    /// Delete an account (ADMIN)
    Delete {
        id: UserId,

        /// `student` or `teacher`
        #[arg(short, long)]
        role: Role,
    },
    /// Assign a student to a teacher (ADMIN)
    Assign {
        #[arg(short, long)]
        student: Option<UserId>,

        #[arg(short, long)]
        teacher: Option<UserId>,
    },
    /// Remove a student's teacher (ADMIN)
    Unassign { student: UserId },
}

#[derive(clap::Args)]
struct NewUserArgs {
    #[arg(short, long)]
    username: String,

    #[arg(short, long)]
    email: String,

    #[arg(short, long)]
    department: String,

    /// Read from stdin when omitted
    #[arg(short, long)]
    password: Option<String>,
}

/// Start Sentry when a DSN is configured. The guard flushes pending events
/// on drop.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_deref()?;

    let options = sentry::ClientOptions {
        release: sentry::release_name!(),
        environment: config.sentry_environment.clone().map(Into::into),
        sample_rate: config.sentry_sample_rate,
        // Tokens and account emails stay on this machine
        send_default_pii: false,
        ..Default::default()
    };
    let guard = sentry::init((dsn, options));

    sentry::configure_scope(|scope| {
        if let Some(host) = config.api_url.host_str() {
            scope.set_tag("api_host", host);
        }
    });

    tracing::info!(sample_rate = config.sentry_sample_rate, "Sentry initialized");
    Some(guard)
}

/// Only this client's own errors become Sentry events; its warnings and
/// notices ride along as breadcrumbs. HTTP stack chatter is dropped.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    if !metadata.target().starts_with("schoolhouse") {
        return sentry_tracing::EventFilter::Ignore;
    }
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "schoolhouse=info".into());

    let is_json = std::env::var("SCHOOLHOUSE_LOG_FORMAT").is_ok_and(|f| f == "json");
    // stdout carries the rendered views, so logs go to stderr
    let json_layer = is_json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer =
        (!is_json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let sentry_guard = init_sentry(&config);
    init_tracing();

    let result = run(cli, config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        // exit() skips destructors; flush pending Sentry events first
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: ClientConfig) -> Result<(), CommandError> {
    let ctx = Context::new(config, cli.yes)?;

    match cli.command {
        Commands::Login { username, password } => {
            commands::auth::login(&ctx, &username, password).await?;
        }
        Commands::Register {
            username,
            email,
            department,
            role,
            password,
        } => {
            commands::auth::register(&ctx, &username, &email, &department, role, password).await?;
        }
        Commands::Logout => commands::auth::logout(&ctx)?,
        Commands::Whoami => commands::auth::whoami(&ctx)?,
        Commands::Health => commands::auth::health(&ctx).await?,
        Commands::Students => commands::users::list(&ctx, Tab::Students).await?,
        Commands::Teachers => commands::users::list(&ctx, Tab::Teachers).await?,
        Commands::Assignments => commands::users::list(&ctx, Tab::Assignments).await?,
        Commands::Show { id } => commands::users::show(&ctx, id).await?,
        Commands::AddStudent(args) => add(&ctx, args, Role::Student).await?,
        Commands::AddTeacher(args) => add(&ctx, args, Role::Teacher).await?,
        Commands::Edit {
            id,
            role,
            username,
            email,
            department,
            teacher,
            unassign,
        } => {
            let changes = commands::users::Changes {
                username,
                email,
                department,
                teacher,
                unassign,
            };
            commands::users::edit(&ctx, id, role, changes).await?;
        }
        Commands::Delete { id, role } => commands::users::delete(&ctx, id, role).await?,
        Commands::Assign { student, teacher } => {
            commands::assign::assign(&ctx, student, teacher).await?;
        }
        Commands::Unassign { student } => commands::assign::unassign(&ctx, student).await?,
    }
    Ok(())
}

async fn add(ctx: &Context, args: NewUserArgs, role: Role) -> Result<(), CommandError> {
    commands::users::add(
        ctx,
        &args.username,
        &args.email,
        &args.department,
        args.password,
        role,
    )
    .await
}
