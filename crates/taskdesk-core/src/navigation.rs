//! Where the front end sends the user.
//!
//! The pipeline only needs to force a trip to the login entry point, which it
//! does through the injected [`Navigator`]. [`landing_route`] picks the start
//! screen for a session.

use crate::auth::Session;

/// Front-end capability to show the login entry point.
pub trait Navigator: Send + Sync {
    fn redirect_to_login(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    /// Admin dashboard: overview, user management, task management
    Admin,
    /// The signed-in user's own task list
    MyTasks,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Admin => "/admin",
            Route::MyTasks => "/tasks",
        }
    }

    /// Whether `session` may view this route
    pub fn allows(&self, session: &Session) -> bool {
        match self {
            Route::Login => true,
            Route::Admin => session.is_admin(),
            Route::MyTasks => session.is_authenticated(),
        }
    }

    /// The route to show instead when `session` may not view this one
    pub fn resolve(self, session: &Session) -> Route {
        if self.allows(session) {
            self
        } else {
            Route::Login
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

pub fn landing_route(session: &Session) -> Route {
    if !session.is_authenticated() {
        Route::Login
    } else if session.is_admin() {
        Route::Admin
    } else {
        Route::MyTasks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::identity;

    fn session(access: Option<&str>, admin: bool) -> Session {
        Session {
            access_credential: access.map(String::from),
            renewal_credential: None,
            identity: Some(identity(1, admin)),
        }
    }

    #[test]
    fn test_landing_route() {
        assert_eq!(landing_route(&Session::default()), Route::Login);
        assert_eq!(landing_route(&session(None, true)), Route::Login);
        assert_eq!(landing_route(&session(Some("A1"), true)), Route::Admin);
        assert_eq!(landing_route(&session(Some("A1"), false)), Route::MyTasks);
    }

    #[test]
    fn test_route_guards() {
        let user = session(Some("A1"), false);
        assert!(Route::MyTasks.allows(&user));
        assert!(!Route::Admin.allows(&user));
        assert_eq!(Route::Admin.resolve(&user), Route::Login);
        assert_eq!(Route::MyTasks.resolve(&Session::default()), Route::Login);
        assert!(Route::Login.allows(&Session::default()));
    }
}
