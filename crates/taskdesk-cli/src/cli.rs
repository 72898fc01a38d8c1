//! CLI schema for the taskdesk binary.

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "taskdesk")]
#[command(about = "Track your tasks and manage the team task list")]
#[command(version)]
pub struct Cli {
    /// API base URL (overrides config and TASKDESK_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and store the session
    Login {
        /// Account email (defaults to TASKDESK_EMAIL or the last one used)
        #[arg(long, short)]
        email: Option<String>,
    },
    /// Sign out and remove the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Show which screen this session lands on
    Route,
    /// Dashboard summary (admins)
    Overview,
    /// List tasks
    Tasks {
        /// Only tasks whose title or description contains this text
        #[arg(long, short)]
        search: Option<String>,
        #[arg(long, value_enum, default_value_t = StatusArg::All)]
        status: StatusArg,
        /// Only my tasks, even as an admin
        #[arg(long)]
        mine: bool,
        /// Only tasks assigned to this user id (admins)
        #[arg(long)]
        user: Option<i64>,
    },
    /// Create, update, complete or delete a task
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },
    /// List users (admins)
    Users {
        /// Only users whose email or name contains this text
        #[arg(long, short)]
        search: Option<String>,
    },
    /// Create, update or delete a user (admins)
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Show or change the display theme
    Theme {
        #[arg(value_enum)]
        choice: Option<ThemeArg>,
    },
}

#[derive(Subcommand, Debug)]
pub enum TaskAction {
    /// Create a task (admins may assign it to another user)
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Assignee user id
        #[arg(long)]
        user: Option<i64>,
        /// Time spent in minutes
        #[arg(long)]
        minutes: Option<u32>,
    },
    /// Change task fields
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        user: Option<i64>,
        #[arg(long)]
        minutes: Option<u32>,
        /// What was done
        #[arg(long)]
        notes: Option<String>,
    },
    /// Mark a task as completed
    Complete {
        id: String,
        #[arg(long)]
        minutes: Option<u32>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Mark a task as pending again
    Reopen { id: String },
    /// Confirm a completed task (admins)
    Confirm {
        id: String,
        /// Withdraw the confirmation instead
        #[arg(long)]
        undo: bool,
    },
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum UserAction {
    /// Create a user; the password is prompted for
    Create {
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        staff: bool,
    },
    Update {
        id: i64,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        staff: Option<bool>,
        /// Prompt for a new password
        #[arg(long)]
        password: bool,
    },
    Delete { id: i64 },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusArg {
    All,
    Completed,
    Pending,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThemeArg {
    Light,
    Dark,
    Toggle,
}
