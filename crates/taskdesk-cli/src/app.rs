//! Wiring between configuration, storage, the auth pipeline and the API client.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use taskdesk_core::api::HttpTransport;
use taskdesk_core::prefs::Preferences;
use taskdesk_core::{ApiClient, AuthPipeline, Config, Navigator, Route, Session, SessionStore};

/// Stands in for the browser's redirect to the login page.
pub struct CliNavigator;

impl Navigator for CliNavigator {
    fn redirect_to_login(&self) {
        warn!("Session could not be renewed, login required");
        eprintln!("Your session has expired. Run `taskdesk login` to sign in again.");
    }
}

pub struct App {
    pub config: Config,
    pub api: ApiClient,
    pub prefs: Preferences,
}

impl App {
    pub fn new(config: Config, api_url_override: Option<String>) -> Result<Self> {
        let storage = config
            .open_storage()
            .context("Failed to open session storage")?;
        debug!(backend = ?config.storage, "Session storage opened");

        let sessions = Arc::new(SessionStore::load(storage.clone()));

        let api_url = api_url_override.unwrap_or_else(|| config.api_url());
        let transport = HttpTransport::new(&api_url, config.request_timeout())
            .context("Failed to build HTTP client")?;
        debug!(api_url = %transport.base_url(), "API client configured");

        let pipeline = AuthPipeline::new(
            Arc::new(transport),
            sessions,
            Arc::new(CliNavigator),
            config.endpoints(),
        );

        Ok(Self {
            config,
            api: ApiClient::new(Arc::new(pipeline)),
            prefs: Preferences::new(storage),
        })
    }

    pub fn session(&self) -> Session {
        self.api.session()
    }

    /// Fail unless the current session may use `route`
    pub fn require(&self, route: Route) -> Result<Session> {
        let session = self.session();
        if route.allows(&session) {
            return Ok(session);
        }
        if session.is_authenticated() {
            anyhow::bail!("This command requires an administrator account")
        } else {
            anyhow::bail!("Not signed in. Run `taskdesk login` first")
        }
    }

    /// Remember the email for the next login prompt
    pub fn remember_email(&mut self, email: &str) {
        self.config.last_email = Some(email.to_string());
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }
}
