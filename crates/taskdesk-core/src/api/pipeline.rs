//! Authorized request pipeline.
//!
//! Every API call goes through [`AuthPipeline::dispatch`], which attaches the
//! current access credential and survives one credential expiry per request:
//!
//! 1. Attach `Authorization: Bearer <access>` when the session has one.
//! 2. Send. Anything but a 401 goes straight back to the caller.
//! 3. On a 401 for a request still in [`RetryState::Initial`] that is not the
//!    login or renewal endpoint, renew the access credential once, mark the
//!    request [`RetryState::Retried`] and send it again. Whatever the retry
//!    returns goes back to the caller as received.
//! 4. If renewal is impossible or fails, clear the session, send the user to
//!    the login entry point and return the error. A renewal that completes
//!    after the session was cleared or replaced is discarded.
//!
//! Concurrent requests renew independently; the last successful renewal wins.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::transport::{ApiRequest, ApiResponse, RetryState, Transport};
use super::ApiError;
use crate::auth::SessionStore;
use crate::navigation::Navigator;

/// Default path of the login endpoint
pub const DEFAULT_LOGIN_PATH: &str = "/api/users/login/";

/// Default path of the credential renewal endpoint
pub const DEFAULT_RENEWAL_PATH: &str = "/api/token/refresh/";

/// Endpoints that issue credentials. A 401 from these never triggers renewal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthEndpoints {
    pub login_path: String,
    pub renewal_path: String,
}

impl Default for AuthEndpoints {
    fn default() -> Self {
        Self {
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            renewal_path: DEFAULT_RENEWAL_PATH.to_string(),
        }
    }
}

impl AuthEndpoints {
    pub fn is_auth_endpoint(&self, path: &str) -> bool {
        let path = path.split('?').next().unwrap_or(path).trim_end_matches('/');
        [&self.login_path, &self.renewal_path]
            .iter()
            .map(|p| p.trim_end_matches('/'))
            .any(|p| !p.is_empty() && path.ends_with(p))
    }
}

#[derive(Serialize)]
struct RenewalRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct RenewalResponse {
    access: String,
}

pub struct AuthPipeline {
    transport: Arc<dyn Transport>,
    session: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
    endpoints: AuthEndpoints,
}

impl AuthPipeline {
    pub fn new(
        transport: Arc<dyn Transport>,
        session: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
        endpoints: AuthEndpoints,
    ) -> Self {
        Self {
            transport,
            session,
            navigator,
            endpoints,
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn endpoints(&self) -> &AuthEndpoints {
        &self.endpoints
    }

    /// Send `request` with credentials attached. Returns the response as
    /// received, whatever its status, except when renewal fails.
    pub async fn dispatch(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.attach_credential(&mut request);
        let response = self.transport.send(&request).await?;

        if !self.should_renew(&request, &response) {
            return Ok(response);
        }

        debug!(method = %request.method, path = %request.path, "Access credential rejected, renewing");
        request.retry = RetryState::Retried;

        let access = match self.renew().await {
            Ok(Some(access)) => access,
            // Signed out or signed in again meanwhile; that path already did the cleanup
            Ok(None) => return Err(ApiError::NotAuthenticated),
            Err(e) => return Err(self.fail(e)),
        };

        request.set_bearer(&access);
        let retried = self.transport.send(&request).await?;
        debug!(path = %request.path, status = %retried.status, "Retried request after renewal");
        Ok(retried)
    }

    /// Like [`dispatch`](Self::dispatch), but non-2xx responses become errors.
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.dispatch(request).await?.error_for_status()
    }

    fn attach_credential(&self, request: &mut ApiRequest) {
        match self.session.access_credential() {
            Some(access) => request.set_bearer(&access),
            None => request.authorization = None,
        }
    }

    fn should_renew(&self, request: &ApiRequest, response: &ApiResponse) -> bool {
        response.status == reqwest::StatusCode::UNAUTHORIZED
            && request.retry == RetryState::Initial
            && !self.endpoints.is_auth_endpoint(&request.path)
    }

    /// Obtain and store a new access credential. `Ok(None)` means the session
    /// changed while the renewal call was in flight and the result was dropped.
    async fn renew(&self) -> Result<Option<String>, ApiError> {
        let renewal = self
            .session
            .renewal_credential()
            .ok_or(ApiError::NoRenewalCredential)?;

        // Sent straight to the transport so the renewal call never renews itself
        let request = ApiRequest::post(self.endpoints.renewal_path.as_str())
            .with_json(&RenewalRequest { refresh: &renewal })?;
        let response = self.transport.send(&request).await?.error_for_status()?;
        let RenewalResponse { access } = response.json()?;

        if !self.session.update_access_credential(&renewal, &access)? {
            return Ok(None);
        }
        info!("Access credential renewed");
        Ok(Some(access))
    }

    fn fail(&self, error: ApiError) -> ApiError {
        warn!(error = %error, "Session renewal failed, signing out");
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to remove stored session");
        }
        self.navigator.redirect_to_login();
        error
    }
}
