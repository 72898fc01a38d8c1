use super::{Task, User};

/// Tasks and users loaded together for the dashboard summary.
#[derive(Debug, Clone, Default)]
pub struct DashboardOverview {
    pub tasks: Vec<Task>,
    pub users: Vec<User>,
}

impl DashboardOverview {
    pub fn total_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub fn completed_tasks(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    pub fn pending_tasks(&self) -> usize {
        self.total_tasks() - self.completed_tasks()
    }

    /// Completed tasks still waiting on an admin to confirm them
    pub fn awaiting_confirmation(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.completed && !t.is_confirmed_by_admin)
            .count()
    }

    pub fn confirmed_tasks(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_confirmed_by_admin).count()
    }

    pub fn total_users(&self) -> usize {
        self.users.len()
    }

    pub fn admin_users(&self) -> usize {
        self.users.iter().filter(|u| u.is_admin()).count()
    }

    /// Newest tasks first, at most `limit` of them
    pub fn recent_tasks(&self, limit: usize) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self.tasks.iter().collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        tasks.truncate(limit);
        tasks
    }
}
