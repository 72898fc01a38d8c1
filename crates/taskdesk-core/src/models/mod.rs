//! Data models for the task tracker API.
//!
//! - `Task`, `NewTask`, `TaskPatch`: tasks and their write payloads
//! - `User`, `NewUser`, `UserUpdate`: roster entries and their write payloads
//! - `TaskFilter`, `UserFilter`: client-side search over loaded lists
//! - `DashboardOverview`: tasks and users loaded together for the summary view

pub mod overview;
pub mod task;
pub mod user;

pub use overview::DashboardOverview;
pub use task::{NewTask, StatusFilter, Task, TaskFilter, TaskPatch, TaskQuery};
pub use user::{NewUser, User, UserFilter, UserUpdate};
