use serde::{Deserialize, Serialize};

use crate::utils::contains_ignore_case;

/// A user account as serialized by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.is_staff || self.is_superuser
    }

    pub fn full_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }

    pub fn role_display(&self) -> &'static str {
        if self.is_superuser {
            "Superuser"
        } else if self.is_staff {
            "Staff"
        } else {
            "User"
        }
    }
}

/// Payload for `POST /api/users/`
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub password_confirm: String,
    pub is_staff: bool,
}

/// Payload for `PUT /api/users/{id}/`. Password fields are sent only when set.
#[derive(Debug, Clone, Serialize)]
pub struct UserUpdate {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_confirm: Option<String>,
}

impl UserUpdate {
    /// Start an update from the current state of `user`
    pub fn from_user(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_staff: user.is_staff,
            password: None,
            password_confirm: None,
        }
    }
}

/// Roster search on email, first name or last name.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub search: String,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        let search = self.search.trim();
        search.is_empty()
            || contains_ignore_case(&user.email, search)
            || contains_ignore_case(&user.first_name, search)
            || contains_ignore_case(&user.last_name, search)
    }

    pub fn apply<'a>(&self, users: &'a [User]) -> Vec<&'a User> {
        users.iter().filter(|u| self.matches(u)).collect()
    }
}
