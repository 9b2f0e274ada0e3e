use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::sync::Arc;

use reqwest::blocking::{Client, Response};
use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION};

use super::SessionError;
use crate::config::HicdConfig;

/// Status, final URL (after redirects) and body of one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub url: String,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP seam of the session client (allows mocking).
///
/// Implementations own the cookie jar: cookies set by one response are sent on
/// every following request until `clear_cookies`.
pub trait HttpTransport {
    fn get(
        &self,
        url: &str,
        query: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> Result<RawResponse, SessionError>;

    fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> Result<RawResponse, SessionError>;

    fn clear_cookies(&mut self) -> Result<(), SessionError>;
}

// ═══════════════════════════════════════════════════════════
// reqwest implementation
// ═══════════════════════════════════════════════════════════

/// Blocking reqwest client with a private cookie jar.
pub struct ReqwestTransport {
    client: Client,
    config: HicdConfig,
}

impl ReqwestTransport {
    pub fn new(config: &HicdConfig) -> Result<Self, SessionError> {
        Ok(Self {
            client: build_client(config)?,
            config: config.clone(),
        })
    }

    fn send_error(&self, url: &str, e: reqwest::Error) -> SessionError {
        if e.is_timeout() {
            SessionError::Network(format!(
                "Request to {url} timed out after {}s",
                self.config.timeout_secs
            ))
        } else if e.is_connect() {
            SessionError::Network(format!("Cannot reach {url}: {e}"))
        } else {
            SessionError::Network(e.to_string())
        }
    }
}

fn build_client(config: &HicdConfig) -> Result<Client, SessionError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json,text/html;q=0.9,*/*;q=0.8"),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("pt-BR,pt;q=0.9,en;q=0.8"),
    );
    Client::builder()
        .cookie_provider(Arc::new(Jar::default()))
        .default_headers(headers)
        .user_agent(config.user_agent.as_str())
        .timeout(config.timeout())
        .build()
        .map_err(|e| SessionError::Client(e.to_string()))
}

/// Per-request headers; `Authorization` values are marked sensitive.
fn request_headers(pairs: &[(&str, &str)]) -> Result<HeaderMap, SessionError> {
    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| SessionError::Client(format!("Invalid header name {name}: {e}")))?;
        let mut value = HeaderValue::from_str(value)
            .map_err(|e| SessionError::Client(format!("Invalid value for header {name}: {e}")))?;
        if name == AUTHORIZATION {
            value.set_sensitive(true);
        }
        headers.insert(name, value);
    }
    Ok(headers)
}

fn read_response(response: Response) -> Result<RawResponse, SessionError> {
    let status = response.status().as_u16();
    let url = response.url().to_string();
    let body = response
        .text()
        .map_err(|e| SessionError::Network(format!("Failed to read response body: {e}")))?;
    Ok(RawResponse { status, url, body })
}

impl HttpTransport for ReqwestTransport {
    fn get(
        &self,
        url: &str,
        query: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> Result<RawResponse, SessionError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .headers(request_headers(headers)?)
            .send()
            .map_err(|e| self.send_error(url, e))?;
        read_response(response)
    }

    fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> Result<RawResponse, SessionError> {
        let response = self
            .client
            .post(url)
            .form(form)
            .headers(request_headers(headers)?)
            .send()
            .map_err(|e| self.send_error(url, e))?;
        read_response(response)
    }

    fn clear_cookies(&mut self) -> Result<(), SessionError> {
        // reqwest's Jar has no removal API; a fresh client gets a fresh jar.
        self.client = build_client(&self.config)?;
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════
// Scripted transport
// ═══════════════════════════════════════════════════════════

/// One request seen by `MockTransport`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub url: String,
    pub params: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
enum MockReply {
    Response(RawResponse),
    NetworkError(String),
}

struct MockRoute {
    method: &'static str,
    url: String,
    replies: VecDeque<MockReply>,
}

/// Scripted transport for testing. Replies are queued per (method, URL); the last
/// reply of a route repeats once the queue is drained. Unknown routes answer 404.
#[derive(Default)]
pub struct MockTransport {
    routes: RefCell<Vec<MockRoute>>,
    requests: RefCell<Vec<RecordedRequest>>,
    cookie_resets: Cell<u32>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_get(self, url: &str, status: u16, body: &str) -> Self {
        let reply = MockReply::Response(RawResponse {
            status,
            url: url.to_string(),
            body: body.to_string(),
        });
        self.push("GET", url, reply)
    }

    /// GET that ends on `final_url` after following redirects.
    pub fn on_get_redirected(self, url: &str, final_url: &str, body: &str) -> Self {
        let reply = MockReply::Response(RawResponse {
            status: 200,
            url: final_url.to_string(),
            body: body.to_string(),
        });
        self.push("GET", url, reply)
    }

    pub fn on_get_network_error(self, url: &str, message: &str) -> Self {
        self.push("GET", url, MockReply::NetworkError(message.to_string()))
    }

    pub fn on_post(self, url: &str, status: u16, body: &str) -> Self {
        let reply = MockReply::Response(RawResponse {
            status,
            url: url.to_string(),
            body: body.to_string(),
        });
        self.push("POST", url, reply)
    }

    pub fn on_post_network_error(self, url: &str, message: &str) -> Self {
        self.push("POST", url, MockReply::NetworkError(message.to_string()))
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.borrow().clone()
    }

    pub fn cookie_resets(&self) -> u32 {
        self.cookie_resets.get()
    }

    fn push(self, method: &'static str, url: &str, reply: MockReply) -> Self {
        {
            let mut routes = self.routes.borrow_mut();
            match routes.iter_mut().find(|r| r.method == method && r.url == url) {
                Some(route) => route.replies.push_back(reply),
                None => routes.push(MockRoute {
                    method,
                    url: url.to_string(),
                    replies: VecDeque::from([reply]),
                }),
            }
        }
        self
    }

    fn reply(
        &self,
        method: &'static str,
        url: &str,
        params: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> Result<RawResponse, SessionError> {
        self.requests.borrow_mut().push(RecordedRequest {
            method,
            url: url.to_string(),
            params: to_owned_pairs(params),
            headers: to_owned_pairs(headers),
        });

        let mut routes = self.routes.borrow_mut();
        let reply = routes
            .iter_mut()
            .find(|r| r.method == method && r.url == url)
            .and_then(|route| {
                if route.replies.len() > 1 {
                    route.replies.pop_front()
                } else {
                    route.replies.front().cloned()
                }
            });

        match reply {
            Some(MockReply::Response(response)) => Ok(response),
            Some(MockReply::NetworkError(message)) => Err(SessionError::Network(message)),
            None => Ok(RawResponse {
                status: 404,
                url: url.to_string(),
                body: "not found".to_string(),
            }),
        }
    }
}

fn to_owned_pairs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl HttpTransport for MockTransport {
    fn get(
        &self,
        url: &str,
        query: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> Result<RawResponse, SessionError> {
        self.reply("GET", url, query, headers)
    }

    fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> Result<RawResponse, SessionError> {
        self.reply("POST", url, form, headers)
    }

    fn clear_cookies(&mut self) -> Result<(), SessionError> {
        self.cookie_resets.set(self.cookie_resets.get() + 1);
        Ok(())
    }
}
