//! Typed calls to the task tracker REST API.
//!
//! `ApiClient` never handles credentials itself: every call goes through the
//! [`AuthPipeline`], which attaches and renews them.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::pipeline::AuthPipeline;
use super::transport::ApiRequest;
use super::ApiError;
use crate::auth::{Identity, Session, SessionStore};
use crate::models::{
    DashboardOverview, NewTask, NewUser, Task, TaskPatch, TaskQuery, User, UserUpdate,
};

const TASKS_PATH: &str = "/api/tasks/";
const USERS_PATH: &str = "/api/users/";

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access: String,
    refresh: String,
    user: Identity,
}

#[derive(Clone)]
pub struct ApiClient {
    pipeline: Arc<AuthPipeline>,
}

impl ApiClient {
    pub fn new(pipeline: Arc<AuthPipeline>) -> Self {
        Self { pipeline }
    }

    pub fn session_store(&self) -> &Arc<SessionStore> {
        self.pipeline.session()
    }

    pub fn session(&self) -> Session {
        self.pipeline.session().read()
    }

    // ===== Authentication =====

    /// Sign in and store the issued credentials. A failed login leaves the
    /// current session untouched.
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, ApiError> {
        let request = ApiRequest::post(self.pipeline.endpoints().login_path.as_str())
            .with_json(&LoginRequest { email, password })?;
        let response = self.pipeline.execute(request).await?;
        let login: LoginResponse = response.json()?;

        self.pipeline
            .session()
            .write(&login.access, &login.refresh, &login.user)?;
        info!(user_id = login.user.id, admin = login.user.is_admin(), "Login successful");
        Ok(login.user)
    }

    /// Explicit sign-out: drop the stored session.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.pipeline.session().clear()?;
        info!("Logged out");
        Ok(())
    }

    fn current_user_id(&self) -> Result<i64, ApiError> {
        self.session().user_id().ok_or(ApiError::NotAuthenticated)
    }

    async fn fetch_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let path = request.path.clone();
        let response = self.pipeline.execute(request).await?;
        response.json().map_err(|e| {
            warn!(path = %path, error = %e, "Unexpected response body");
            e
        })
    }

    // ===== Tasks =====

    pub async fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>, ApiError> {
        let tasks: Vec<Task> = self
            .fetch_json(ApiRequest::get(TASKS_PATH).with_query(query.to_pairs()))
            .await?;
        debug!(count = tasks.len(), "Tasks loaded");
        Ok(tasks)
    }

    /// Tasks assigned to the signed-in user
    pub async fn my_tasks(&self) -> Result<Vec<Task>, ApiError> {
        let user_id = self.current_user_id()?;
        self.list_tasks(&TaskQuery::for_user(user_id)).await
    }

    pub async fn create_task(&self, task: &NewTask) -> Result<Task, ApiError> {
        let created: Task = self
            .fetch_json(ApiRequest::post(TASKS_PATH).with_json(task)?)
            .await?;
        info!(task_id = %created.id, "Task created");
        Ok(created)
    }

    pub async fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<Task, ApiError> {
        self.fetch_json(ApiRequest::patch(task_path(id)).with_json(patch)?)
            .await
    }

    pub async fn set_task_completed(&self, id: &str, completed: bool) -> Result<Task, ApiError> {
        let patch = TaskPatch {
            completed: Some(completed),
            ..Default::default()
        };
        self.update_task(id, &patch).await
    }

    /// Admin confirmation of a completed task
    pub async fn set_task_confirmed(&self, id: &str, confirmed: bool) -> Result<Task, ApiError> {
        let patch = TaskPatch {
            is_confirmed_by_admin: Some(confirmed),
            ..Default::default()
        };
        self.update_task(id, &patch).await
    }

    pub async fn delete_task(&self, id: &str) -> Result<(), ApiError> {
        self.pipeline.execute(ApiRequest::delete(task_path(id))).await?;
        info!(task_id = id, "Task deleted");
        Ok(())
    }

    // ===== Users =====

    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.fetch_json(ApiRequest::get(USERS_PATH)).await
    }

    pub async fn create_user(&self, user: &NewUser) -> Result<User, ApiError> {
        let created: User = self
            .fetch_json(ApiRequest::post(USERS_PATH).with_json(user)?)
            .await?;
        info!(user_id = created.id, "User created");
        Ok(created)
    }

    pub async fn update_user(&self, id: i64, update: &UserUpdate) -> Result<User, ApiError> {
        self.fetch_json(ApiRequest::put(user_path(id)).with_json(update)?)
            .await
    }

    pub async fn delete_user(&self, id: i64) -> Result<(), ApiError> {
        self.pipeline.execute(ApiRequest::delete(user_path(id))).await?;
        info!(user_id = id, "User deleted");
        Ok(())
    }

    // ===== Dashboard =====

    /// Load tasks and users concurrently. Admins see every task, everyone
    /// else only their own.
    pub async fn overview(&self) -> Result<DashboardOverview, ApiError> {
        let session = self.session();
        let user_id = session.user_id().ok_or(ApiError::NotAuthenticated)?;
        let query = if session.is_admin() {
            TaskQuery::default()
        } else {
            TaskQuery::for_user(user_id)
        };

        let (tasks, users) = futures::try_join!(self.list_tasks(&query), self.list_users())?;
        Ok(DashboardOverview { tasks, users })
    }
}

fn task_path(id: &str) -> String {
    format!("{}{}/", TASKS_PATH, id)
}

fn user_path(id: i64) -> String {
    format!("{}{}/", USERS_PATH, id)
}
