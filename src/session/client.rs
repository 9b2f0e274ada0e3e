use reqwest::Url;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::transport::{HttpTransport, RawResponse, ReqwestTransport};
use super::{Credentials, SessionError, SessionState};
use crate::config::{HicdConfig, LOGIN_SUCCESS_MARKER};

/// Session handle bound to one HICD backend.
///
/// Passed by `&mut` to every adapter call; there is no process-wide session.
pub struct SessionClient<T: HttpTransport = ReqwestTransport> {
    transport: T,
    config: HicdConfig,
    credentials: Option<Credentials>,
    state: SessionState,
}

impl SessionClient<ReqwestTransport> {
    /// Session over a real reqwest transport.
    pub fn connect(config: HicdConfig) -> Result<Self, SessionError> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(transport, config))
    }
}

impl<T: HttpTransport> SessionClient<T> {
    pub fn with_transport(transport: T, config: HicdConfig) -> Self {
        Self {
            transport,
            config,
            credentials: None,
            state: SessionState::Unauthenticated,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    pub fn config(&self) -> &HicdConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Landing GET for cookies, then the form login.
    ///
    /// Succeeds only when the body starts with the `ok` marker. Any other body is
    /// returned verbatim inside `SessionError::Auth`. A login attempt replaces the
    /// previous identity: on failure the handle holds no credentials at all.
    pub fn login(&mut self, credentials: Credentials) -> Result<(), SessionError> {
        let landing_url = self.config.landing_url.clone();
        let login_url = self.config.login_url.clone();
        self.credentials = None;
        self.state = SessionState::Unauthenticated;

        debug!(url = %landing_url, "Fetching landing page for session cookies");
        let landing = self.transport.get(&landing_url, &[], &[])?;
        if !landing.is_success() {
            return Err(SessionError::Http {
                status: landing.status,
                body: landing.body,
            });
        }

        debug!(user = credentials.user(), "Submitting login form");
        let response = self.transport.post_form(
            &login_url,
            &[("user", credentials.user()), ("pass", credentials.password())],
            &[("Referer", landing_url.as_str())],
        )?;
        if !response.is_success() {
            return Err(SessionError::Http {
                status: response.status,
                body: response.body,
            });
        }

        if !response.body.starts_with(LOGIN_SUCCESS_MARKER) {
            warn!(user = credentials.user(), "Login rejected by backend");
            return Err(SessionError::Auth(response.body));
        }

        info!(user = credentials.user(), "Session authenticated");
        self.credentials = Some(credentials);
        self.state = SessionState::Authenticated;
        Ok(())
    }

    /// Make sure the session can issue resource calls.
    ///
    /// After an expiry the retained credentials are used for one fresh login. A
    /// network failure during that login keeps them for the next attempt; a rejection
    /// drops them.
    pub fn ensure_authenticated(&mut self) -> Result<(), SessionError> {
        if self.is_authenticated() {
            return Ok(());
        }
        let Some(credentials) = self.credentials.clone() else {
            return Err(SessionError::NotAuthenticated);
        };

        info!("Session invalidated, logging in again");
        match self.login(credentials.clone()) {
            Err(e @ SessionError::Network(_)) => {
                self.credentials = Some(credentials);
                Err(e)
            }
            result => result,
        }
    }

    /// End the session: notify the backend, drop cookies and credentials.
    pub fn logout(&mut self) -> Result<(), SessionError> {
        let login_url = self.config.login_url.clone();
        if self.is_authenticated() {
            match self
                .transport
                .post_form(&login_url, &[("Param", "LOGOUT")], &[])
            {
                Ok(response) if !response.is_success() => {
                    warn!(status = response.status, "Logout request returned an error status")
                }
                Ok(_) => debug!("Logout acknowledged by backend"),
                Err(e) => warn!(error = %e, "Logout request failed"),
            }
        }

        self.credentials = None;
        self.state = SessionState::Unauthenticated;
        self.transport.clear_cookies()?;
        info!("Session closed");
        Ok(())
    }

    /// GET `<api base>/<segments...>` and return the body. Each segment is
    /// percent-encoded, so identifiers cannot alter the path or query.
    pub fn get(&mut self, segments: &[&str], params: &[(&str, &str)]) -> Result<String, SessionError> {
        let url = self.api_url(segments)?;
        let bearer = self.bearer();
        let headers = with_authorization(&[], bearer.as_deref());
        debug!(url = %url, "GET");
        let response = self.transport.get(&url, params, &headers)?;
        self.check_response(&url, response)
    }

    /// GET and decode a JSON body. An HTML page where JSON was expected means the
    /// backend served its login screen.
    pub fn get_json(&mut self, segments: &[&str], params: &[(&str, &str)]) -> Result<Value, SessionError> {
        let body = self.get(segments, params)?;
        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(_) if looks_like_html(&body) => {
                self.invalidate("HTML page returned instead of JSON");
                Err(SessionError::SessionExpired { status: 200 })
            }
            Err(e) => Err(SessionError::InvalidPayload(e.to_string())),
        }
    }

    /// POST a form to `<api base>/<segments...>` with extra headers.
    pub fn post(
        &mut self,
        segments: &[&str],
        form: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> Result<String, SessionError> {
        let url = self.api_url(segments)?;
        let bearer = self.bearer();
        let headers = with_authorization(headers, bearer.as_deref());
        debug!(url = %url, "POST");
        let response = self.transport.post_form(&url, form, &headers)?;
        self.check_response(&url, response)
    }

    fn api_url(&self, segments: &[&str]) -> Result<String, SessionError> {
        let mut url = Url::parse(self.config.api_base())
            .map_err(|e| SessionError::Client(format!("Invalid API base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| SessionError::Client("API base URL cannot take a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url.into())
    }

    /// Gateway token, sent only to the resource API, never to the login host.
    fn bearer(&self) -> Option<String> {
        self.config
            .api_token
            .as_ref()
            .map(|token| format!("Bearer {token}"))
    }

    fn check_response(&mut self, url: &str, response: RawResponse) -> Result<String, SessionError> {
        if response.status == 401 || response.status == 403 {
            self.invalidate("unauthorized status");
            return Err(SessionError::SessionExpired {
                status: response.status,
            });
        }
        if !response.is_success() {
            return Err(SessionError::Http {
                status: response.status,
                body: response.body,
            });
        }
        if response.url != url && self.is_login_page(&response.url) {
            self.invalidate("redirected to login page");
            return Err(SessionError::SessionExpired {
                status: response.status,
            });
        }
        Ok(response.body)
    }

    fn is_login_page(&self, url: &str) -> bool {
        let url = url.split('?').next().unwrap_or(url);
        url == self.config.landing_url || url == self.config.login_url
    }

    fn invalidate(&mut self, reason: &str) {
        if self.is_authenticated() {
            warn!(reason, "Session no longer authenticated");
        }
        self.state = SessionState::Unauthenticated;
    }
}

fn with_authorization<'a>(
    headers: &[(&'a str, &'a str)],
    bearer: Option<&'a str>,
) -> Vec<(&'a str, &'a str)> {
    let mut all = headers.to_vec();
    if let Some(value) = bearer {
        all.push(("Authorization", value));
    }
    all
}

fn looks_like_html(body: &str) -> bool {
    let head = body.trim_start();
    head.starts_with('<') && head.to_ascii_lowercase().contains("<html")
        || head.to_ascii_lowercase().starts_with("<!doctype html")
}
