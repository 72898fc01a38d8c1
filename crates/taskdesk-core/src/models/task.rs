use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::contains_ignore_case;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub is_confirmed_by_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: Option<i64>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(rename = "tiempo_empleado", default)]
    pub time_spent_minutes: Option<u32>,
    #[serde(rename = "descripcion_realizada", default)]
    pub completion_notes: String,
}

impl Task {
    pub fn status_display(&self) -> &'static str {
        match (self.completed, self.is_confirmed_by_admin) {
            (true, true) => "Confirmed",
            (true, false) => "Completed",
            (false, _) => "Pending",
        }
    }

    pub fn assignee_display(&self) -> String {
        self.user_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| self.user_email.clone())
            .unwrap_or_else(|| "-".to_string())
    }
}

/// Payload for `POST /api/tasks/`. Without `user` the server assigns the caller.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<i64>,
    #[serde(rename = "tiempo_empleado", skip_serializing_if = "Option::is_none")]
    pub time_spent_minutes: Option<u32>,
    pub completed: bool,
    pub is_confirmed_by_admin: bool,
}

/// Payload for `PATCH /api/tasks/{id}/`. Only fields that are set are sent.
/// Non-admin users may only change `completed`, `time_spent_minutes` and
/// `completion_notes`; the server enforces this.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_confirmed_by_admin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<i64>,
    #[serde(rename = "tiempo_empleado", skip_serializing_if = "Option::is_none")]
    pub time_spent_minutes: Option<u32>,
    #[serde(rename = "descripcion_realizada", skip_serializing_if = "Option::is_none")]
    pub completion_notes: Option<String>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Server-side filters for `GET /api/tasks/`
#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
    pub user: Option<i64>,
    pub search: Option<String>,
}

impl TaskQuery {
    pub fn for_user(user_id: i64) -> Self {
        Self {
            user: Some(user_id),
            search: None,
        }
    }

    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(user) = self.user {
            pairs.push(("user".to_string(), user.to_string()));
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            pairs.push(("search".to_string(), search.to_string()));
        }
        pairs
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    Pending,
}

impl StatusFilter {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "all" => Some(StatusFilter::All),
            "completed" | "done" => Some(StatusFilter::Completed),
            "pending" | "open" => Some(StatusFilter::Pending),
            _ => None,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Completed,
            StatusFilter::Completed => StatusFilter::Pending,
            StatusFilter::Pending => StatusFilter::All,
        }
    }

    fn matches(&self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Completed => task.completed,
            StatusFilter::Pending => !task.completed,
        }
    }
}

/// Client-side filter for an already loaded task list.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub search: String,
    pub status: StatusFilter,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        let search = self.search.trim();
        let matches_search = search.is_empty()
            || contains_ignore_case(&task.title, search)
            || contains_ignore_case(&task.description, search);
        matches_search && self.status.matches(task)
    }

    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks.iter().filter(|t| self.matches(t)).collect()
    }
}
