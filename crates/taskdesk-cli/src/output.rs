//! Plain-text rendering of tasks, users and the dashboard summary.

use taskdesk_core::models::{DashboardOverview, Task, User};
use taskdesk_core::utils::{format_datetime, format_flag, format_minutes, truncate};
use taskdesk_core::ApiError;

/// Column widths for the task table
const TITLE_WIDTH: usize = 32;
const ASSIGNEE_WIDTH: usize = 22;

/// Number of tasks shown under "Recent tasks" in the overview
const RECENT_TASK_COUNT: usize = 5;

pub fn task_row(task: &Task) -> String {
    format!(
        "{:<36}  {:<title$}  {:<10}  {:<assignee$}  {:>7}",
        task.id,
        truncate(&task.title, TITLE_WIDTH),
        task.status_display(),
        truncate(&task.assignee_display(), ASSIGNEE_WIDTH),
        format_minutes(task.time_spent_minutes),
        title = TITLE_WIDTH,
        assignee = ASSIGNEE_WIDTH,
    )
}

pub fn print_tasks(tasks: &[&Task]) {
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }
    println!(
        "{:<36}  {:<title$}  {:<10}  {:<assignee$}  {:>7}",
        "ID",
        "TITLE",
        "STATUS",
        "ASSIGNEE",
        "TIME",
        title = TITLE_WIDTH,
        assignee = ASSIGNEE_WIDTH,
    );
    for task in tasks {
        println!("{}", task_row(task));
    }
}

pub fn print_task_detail(task: &Task) {
    println!("{}", task.title);
    println!("  id:         {}", task.id);
    println!("  status:     {}", task.status_display());
    println!("  assignee:   {}", task.assignee_display());
    println!("  time spent: {}", format_minutes(task.time_spent_minutes));
    println!("  created:    {}", format_datetime(&task.created_at));
    println!("  updated:    {}", format_datetime(&task.updated_at));
    if !task.description.is_empty() {
        println!("  description: {}", task.description);
    }
    if !task.completion_notes.is_empty() {
        println!("  notes:      {}", task.completion_notes);
    }
}

pub fn user_row(user: &User) -> String {
    format!(
        "{:>5}  {:<32}  {:<28}  {:<9}",
        user.id,
        truncate(&user.email, 32),
        truncate(&user.full_name(), 28),
        user.role_display(),
    )
}

pub fn print_users(users: &[&User]) {
    if users.is_empty() {
        println!("No users found.");
        return;
    }
    println!("{:>5}  {:<32}  {:<28}  {:<9}", "ID", "EMAIL", "NAME", "ROLE");
    for user in users {
        println!("{}", user_row(user));
    }
}

pub fn print_identity(user: &User) {
    println!("{} <{}>", user.full_name(), user.email);
    println!("  id:    {}", user.id);
    println!("  role:  {}", user.role_display());
    println!("  admin: {}", format_flag(user.is_admin()));
}

pub fn print_overview(overview: &DashboardOverview) {
    println!("Tasks:  {} total", overview.total_tasks());
    println!("        {} completed", overview.completed_tasks());
    println!("        {} pending", overview.pending_tasks());
    println!("        {} awaiting confirmation", overview.awaiting_confirmation());
    println!("Users:  {} total, {} admins", overview.total_users(), overview.admin_users());

    let recent = overview.recent_tasks(RECENT_TASK_COUNT);
    if !recent.is_empty() {
        println!();
        println!("Recent tasks:");
        for task in recent {
            println!("  {}", task_row(task));
        }
    }
}

/// Short message for an error, phrased for the person at the terminal
pub fn user_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ApiError>() {
        Some(e) if e.is_auth_failure() => {
            "Session expired. Please run `taskdesk login` again.".to_string()
        }
        Some(ApiError::AccessDenied(_)) => "You do not have permission to do that.".to_string(),
        Some(ApiError::RateLimited) => {
            "Server is busy. Please wait a moment and try again.".to_string()
        }
        Some(ApiError::NetworkError(_)) => {
            "Unable to reach the server. Check your connection and the API URL.".to_string()
        }
        _ => format!("{:#}", err),
    }
}
