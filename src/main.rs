//! HRMS Portal command-line front end.
//!
//! Each invocation restores the persisted session, runs one operation and
//! prints its outcome as JSON.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use chrono::Datelike;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

use hrms_portal::api::ProjectsQuery;
use hrms_portal::config::{AppConfig, ConfigArgs};
use hrms_portal::domains::{LeaveForm, TaskQuery};
use hrms_portal::normalized::TaskStatus;
use hrms_portal::{Outcome, Portal, Result, telemetry};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and persist the session
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long, env = "HRMS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out and delete the persisted session
    Logout,
    /// Show the restored session
    Status,
    /// Show the signed-in user's profile
    Profile,
    /// Show dashboard summary cards
    Dashboard {
        /// Show the administrative overview instead
        #[arg(long)]
        admin: bool,
    },
    PunchIn,
    PunchOut,
    /// Show today's attendance record
    Today,
    /// Show the monthly attendance summary
    Calendar {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
    },
    #[command(subcommand)]
    Leave(LeaveCommand),
    /// List assigned tasks
    Tasks {
        #[arg(long, default_value_t = 1)]
        page: u64,
        #[arg(long, default_value_t = 20)]
        page_size: u64,
        #[arg(long)]
        status: Option<TaskStatus>,
    },
    #[command(subcommand)]
    Task(TaskCommand),
    /// Query projects
    Projects {
        #[arg(long, default_value_t = 1)]
        page: u64,
        #[arg(long, default_value_t = 10)]
        page_size: u64,
        /// Extra filter, repeatable (e.g. --filter status=active)
        #[arg(long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
    },
    /// Ask the AI assistant
    Ask { question: String },
}

#[derive(Subcommand, Debug)]
enum LeaveCommand {
    Types,
    Requests,
    Balance,
    /// Apply for leave (dates as YYYY-MM-DD)
    Apply {
        #[arg(long)]
        type_id: Option<i64>,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(long)]
        reason: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum TaskCommand {
    Show { id: String },
    SetStatus { id: String, status: TaskStatus },
}

fn parse_filter(raw: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))?;
    if ProjectsQuery::RESERVED_KEYS.contains(&key.as_str()) {
        return Err(format!("use --{} instead of --filter {key}=...", key.replace('_', "-")));
    }
    Ok((key, value))
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load .env (if present)
    let _ = dotenv();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config).context("Failed to load configuration")?;
    telemetry::init(&config.logging);

    info!(
        name: "portal.config.loaded",
        base_url = %config.api.base_url,
        storage_dir = %config.storage.dir.display(),
        "Configuration loaded"
    );

    let portal = Portal::from_config(&config).context("Failed to build API client")?;
    portal.restore_session().await;

    Ok(run(&portal, cli.command).await)
}

async fn run(portal: &Portal, command: Command) -> ExitCode {
    match command {
        Command::Login { username, password } => {
            report(portal.login().login(&username, &password).await)
        }
        Command::Logout => {
            portal.sign_out().await;
            report(Ok(portal.session().current()))
        }
        Command::Status => report(Ok(portal.session().current())),
        Command::Profile => report(portal.login().fetch_profile().await),
        Command::Dashboard { admin: false } => report(portal.dashboard().get_dashboard().await),
        Command::Dashboard { admin: true } => {
            report(portal.dashboard().get_admin_overview().await)
        }
        Command::PunchIn => {
            let result = portal.attendance().punch_in().await;
            report(result.map(|_| Arc::clone(&portal.view().attendance)))
        }
        Command::PunchOut => {
            let result = portal.attendance().punch_out().await;
            report(result.map(|_| Arc::clone(&portal.view().attendance)))
        }
        Command::Today => report(portal.attendance().fetch_today().await),
        Command::Calendar { year, month } => {
            let now = chrono::Local::now();
            let year = year.unwrap_or_else(|| now.year());
            let month = month.unwrap_or_else(|| now.month());
            report(portal.attendance().fetch_calendar(year, month).await)
        }
        Command::Leave(LeaveCommand::Types) => report(portal.leave().get_leave_types().await),
        Command::Leave(LeaveCommand::Requests) => {
            report(portal.leave().get_leave_requests().await)
        }
        Command::Leave(LeaveCommand::Balance) => report(portal.leave().get_leave_balance().await),
        Command::Leave(LeaveCommand::Apply {
            type_id,
            start,
            end,
            reason,
        }) => {
            let form = LeaveForm {
                leave_type_id: type_id,
                start_date: start,
                end_date: end,
                reason,
            };
            report(portal.leave().apply_for_leave(&form).await)
        }
        Command::Tasks {
            page,
            page_size,
            status,
        } => {
            let query = TaskQuery {
                page,
                page_size,
                status,
            };
            report(portal.tasks().get_tasks(query).await)
        }
        Command::Task(TaskCommand::Show { id }) => report(portal.tasks().get_task(&id).await),
        Command::Task(TaskCommand::SetStatus { id, status }) => {
            report(portal.tasks().update_task_status(&id, status).await)
        }
        Command::Projects {
            page,
            page_size,
            filters,
        } => {
            let filters: Map<String, Value> = filters
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect();
            let query = ProjectsQuery {
                page,
                page_size,
                filters,
            };
            report(portal.projects().query_projects(&query).await)
        }
        Command::Ask { question } => report(portal.ai_chat().ask(&question).await),
    }
}

/// Print the outcome as JSON; failures exit with status 1.
fn report<T: Serialize>(result: Result<T>) -> ExitCode {
    let outcome = Outcome::from(result);
    let code = if outcome.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    };
    match serde_json::to_string_pretty(&outcome) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Failed to render result: {e}"),
    }
    code
}
