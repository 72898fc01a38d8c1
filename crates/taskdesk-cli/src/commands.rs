//! Command handlers. Each one checks the route guard locally, then calls the
//! API through the authorized pipeline.

use anyhow::{Context, Result};
use tracing::{error, info};

use taskdesk_core::models::{
    NewTask, NewUser, StatusFilter, TaskFilter, TaskPatch, TaskQuery, UserFilter, UserUpdate,
};
use taskdesk_core::prefs::Theme;
use taskdesk_core::{landing_route, ApiError, Route};

use crate::app::App;
use crate::cli::{Command, StatusArg, TaskAction, ThemeArg, UserAction};
use crate::output;

/// Environment variables consulted before prompting
const EMAIL_ENV: &str = "TASKDESK_EMAIL";
const PASSWORD_ENV: &str = "TASKDESK_PASSWORD";

pub async fn run(app: &mut App, command: Command) -> Result<()> {
    match command {
        Command::Login { email } => login(app, email).await,
        Command::Logout => {
            app.api.logout()?;
            println!("Signed out.");
            Ok(())
        }
        Command::Whoami => whoami(app),
        Command::Route => {
            let route = landing_route(&app.session());
            println!("{}", route);
            Ok(())
        }
        Command::Overview => {
            app.require(Route::Admin)?;
            let overview = app.api.overview().await?;
            output::print_overview(&overview);
            Ok(())
        }
        Command::Tasks {
            search,
            status,
            mine,
            user,
        } => list_tasks(app, search, status, mine, user).await,
        Command::Task { action } => task_action(app, action).await,
        Command::Users { search } => {
            app.require(Route::Admin)?;
            let users = app.api.list_users().await?;
            let filter = UserFilter {
                search: search.unwrap_or_default(),
            };
            output::print_users(&filter.apply(&users));
            Ok(())
        }
        Command::User { action } => user_action(app, action).await,
        Command::Theme { choice } => theme(app, choice),
    }
}

async fn login(app: &mut App, email: Option<String>) -> Result<()> {
    let email = match email
        .or_else(|| std::env::var(EMAIL_ENV).ok())
        .or_else(|| app.config.last_email.clone())
    {
        Some(email) if !email.trim().is_empty() => email.trim().to_string(),
        _ => prompt_line("Email: ")?,
    };

    let password = match std::env::var(PASSWORD_ENV) {
        Ok(password) if !password.is_empty() => password,
        _ => rpassword::prompt_password("Password: ").context("Failed to read password")?,
    };

    if email.is_empty() || password.is_empty() {
        anyhow::bail!("Email and password required");
    }

    match app.api.login(&email, &password).await {
        Ok(identity) => {
            app.remember_email(&email);
            info!("Login successful");
            println!("Signed in as {}.", identity.full_name());
            println!("Start at {}", landing_route(&app.session()));
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Login failed");
            let message = match e {
                ApiError::Unauthorized | ApiError::NotFound(_) => {
                    "Invalid email or password".to_string()
                }
                ApiError::AccessDenied(_) => {
                    "Account locked. Please try again later.".to_string()
                }
                ApiError::NetworkError(_) => {
                    "Unable to connect to server. Check your internet connection.".to_string()
                }
                other => format!("Login failed: {}", other),
            };
            anyhow::bail!(message)
        }
    }
}

fn whoami(app: &App) -> Result<()> {
    let session = app.require(Route::MyTasks)?;
    match session.identity() {
        Some(identity) => output::print_identity(identity),
        None => println!("Signed in (no profile stored)."),
    }
    Ok(())
}

fn status_filter(status: StatusArg) -> StatusFilter {
    match status {
        StatusArg::All => StatusFilter::All,
        StatusArg::Completed => StatusFilter::Completed,
        StatusArg::Pending => StatusFilter::Pending,
    }
}

async fn list_tasks(
    app: &App,
    search: Option<String>,
    status: StatusArg,
    mine: bool,
    user: Option<i64>,
) -> Result<()> {
    let session = app.require(Route::MyTasks)?;

    let status = status_filter(status);
    let (tasks, filter) = if mine || !session.is_admin() {
        // Own task list: search is applied locally
        let filter = TaskFilter {
            search: search.unwrap_or_default(),
            status,
        };
        (app.api.my_tasks().await?, filter)
    } else {
        // Global list: the server searches, status is applied locally
        let filter = TaskFilter {
            search: String::new(),
            status,
        };
        (app.api.list_tasks(&TaskQuery { user, search }).await?, filter)
    };

    output::print_tasks(&filter.apply(&tasks));
    Ok(())
}

async fn task_action(app: &App, action: TaskAction) -> Result<()> {
    match action {
        TaskAction::Create {
            title,
            description,
            user,
            minutes,
        } => {
            let session = app.require(Route::MyTasks)?;
            if user.is_some() && !session.is_admin() {
                anyhow::bail!("Only administrators can assign tasks to other users");
            }
            let task = app
                .api
                .create_task(&NewTask {
                    title,
                    description,
                    user,
                    time_spent_minutes: minutes,
                    ..Default::default()
                })
                .await?;
            output::print_task_detail(&task);
        }
        TaskAction::Update {
            id,
            title,
            description,
            user,
            minutes,
            notes,
        } => {
            let session = app.require(Route::MyTasks)?;
            let patch = TaskPatch {
                title,
                description,
                user,
                time_spent_minutes: minutes,
                completion_notes: notes,
                ..Default::default()
            };
            if patch.is_empty() {
                anyhow::bail!("Nothing to update");
            }
            if !session.is_admin()
                && (patch.title.is_some() || patch.description.is_some() || patch.user.is_some())
            {
                anyhow::bail!("Only administrators can change title, description or assignee");
            }
            let task = app.api.update_task(&id, &patch).await?;
            output::print_task_detail(&task);
        }
        TaskAction::Complete { id, minutes, notes } => {
            app.require(Route::MyTasks)?;
            let patch = TaskPatch {
                completed: Some(true),
                time_spent_minutes: minutes,
                completion_notes: notes,
                ..Default::default()
            };
            let task = app.api.update_task(&id, &patch).await?;
            println!("Completed: {}", task.title);
        }
        TaskAction::Reopen { id } => {
            app.require(Route::MyTasks)?;
            let task = app.api.set_task_completed(&id, false).await?;
            println!("Reopened: {}", task.title);
        }
        TaskAction::Confirm { id, undo } => {
            app.require(Route::Admin)?;
            let task = app.api.set_task_confirmed(&id, !undo).await?;
            println!("{}: {}", task.status_display(), task.title);
        }
        TaskAction::Delete { id } => {
            app.require(Route::MyTasks)?;
            app.api.delete_task(&id).await?;
            println!("Deleted task {}.", id);
        }
    }
    Ok(())
}

async fn user_action(app: &App, action: UserAction) -> Result<()> {
    app.require(Route::Admin)?;
    match action {
        UserAction::Create {
            email,
            first_name,
            last_name,
            staff,
        } => {
            let password = prompt_new_password()?;
            let user = app
                .api
                .create_user(&NewUser {
                    email,
                    first_name,
                    last_name,
                    password: password.clone(),
                    password_confirm: password,
                    is_staff: staff,
                })
                .await?;
            println!("Created user {} ({}).", user.email, user.id);
        }
        UserAction::Update {
            id,
            email,
            first_name,
            last_name,
            staff,
            password,
        } => {
            let users = app.api.list_users().await?;
            let current = users
                .iter()
                .find(|u| u.id == id)
                .ok_or_else(|| anyhow::anyhow!("No user with id {}", id))?;

            let mut update = UserUpdate::from_user(current);
            if let Some(email) = email {
                update.email = email;
            }
            if let Some(first_name) = first_name {
                update.first_name = first_name;
            }
            if let Some(last_name) = last_name {
                update.last_name = last_name;
            }
            if let Some(staff) = staff {
                update.is_staff = staff;
            }
            if password {
                let password = prompt_new_password()?;
                update.password = Some(password.clone());
                update.password_confirm = Some(password);
            }

            let user = app.api.update_user(id, &update).await?;
            output::print_identity(&user);
        }
        UserAction::Delete { id } => {
            if app.session().user_id() == Some(id) {
                anyhow::bail!("You cannot delete your own account");
            }
            app.api.delete_user(id).await?;
            println!("Deleted user {}.", id);
        }
    }
    Ok(())
}

fn theme(app: &App, choice: Option<ThemeArg>) -> Result<()> {
    let theme = match choice {
        None => app.prefs.theme(),
        Some(ThemeArg::Toggle) => app.prefs.toggle_theme()?,
        Some(ThemeArg::Light) => {
            app.prefs.set_theme(Theme::Light)?;
            Theme::Light
        }
        Some(ThemeArg::Dark) => {
            app.prefs.set_theme(Theme::Dark)?;
            Theme::Dark
        }
    };
    println!("{}", theme);
    Ok(())
}

fn prompt_line(prompt: &str) -> Result<String> {
    use std::io::Write;

    print!("{}", prompt);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn prompt_new_password() -> Result<String> {
    let password = rpassword::prompt_password("New password: ")?;
    let confirm = rpassword::prompt_password("Confirm password: ")?;
    if password != confirm {
        anyhow::bail!("Passwords do not match");
    }
    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_filter_mapping() {
        assert_eq!(status_filter(StatusArg::All), StatusFilter::All);
        assert_eq!(status_filter(StatusArg::Completed), StatusFilter::Completed);
        assert_eq!(status_filter(StatusArg::Pending), StatusFilter::Pending);
    }
}
