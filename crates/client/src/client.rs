//! Poll service HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required). The service keeps the
//! login in a session cookie, so the client carries a cookie store and logs
//! in once per process: shared password, then participant selection.
//! Redirects are not followed; the service answers form posts with a
//! redirect whose target tells success from rejection.

use std::time::Duration;

use reqwest::Url;

use duudl_core::GridState;
use duudl_protocol::{parse_overview, AdminResponseUpdate, NewPollForm, PollStatePayload, PollSummary, ResponseUpdate};

use crate::auth::Credentials;

/// Read/update access to one poll.
///
/// Implementations enforce nothing; the service is the authority on who may
/// write what.
pub trait PersistenceClient: Send + Sync {
    /// Fetch the full poll state.
    fn fetch_state(&self) -> Result<GridState, ClientError>;

    /// Self-service update of the logged-in participant's own cell.
    fn update_response(&self, update: &ResponseUpdate) -> Result<(), ClientError>;

    /// Privileged override of any participant's value.
    fn override_response(&self, update: &AdminResponseUpdate) -> Result<(), ClientError>;
}

/// Error type for service calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Login missing or rejected
    NotAuthenticated,
    /// Poll token does not exist
    NotFound(String),
    /// Network error
    Network(String),
    /// HTTP error with status code
    Http(u16, String),
    /// Body could not be parsed
    Parse(String),
    /// Server rejected the request body (400)
    Validation(String),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::NotAuthenticated => write!(f, "Not logged in: run `duudl login` first"),
            ClientError::NotFound(token) => write!(f, "No poll with token {:?}", token),
            ClientError::Network(msg) => write!(f, "Network error: {}", msg),
            ClientError::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            ClientError::Parse(msg) => write!(f, "Parse error: {}", msg),
            ClientError::Validation(msg) => write!(f, "Rejected by server: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

/// Shareable link for a poll.
pub fn share_link(base_url: &str, token: &str) -> String {
    format!("{}/d/{}", base_url.trim_end_matches('/'), token)
}

/// Poll service client (blocking), bound to one poll token.
#[derive(Clone)]
pub struct HttpClient {
    http: reqwest::blocking::Client,
    base: Url,
    base_url: String,
    token: String,
}

impl HttpClient {
    /// Create a client without logging in.
    pub fn new(base_url: &str, token: &str) -> Result<Self, ClientError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("duudl/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let base = Url::parse(base_url)
            .ok()
            .filter(|u| !u.cannot_be_a_base())
            .ok_or_else(|| ClientError::Network(format!("invalid server URL {:?}", base_url)))?;

        Ok(Self {
            http,
            base,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// Create a client and log in with saved credentials.
    pub fn connect(creds: &Credentials, token: &str) -> Result<Self, ClientError> {
        let client = Self::new(&creds.base_url, token)?;
        client.login(&creds.password, creds.participant_id)?;
        Ok(client)
    }

    /// Log in with the shared password and select the participant to act as.
    pub fn login(&self, password: &str, participant_id: i64) -> Result<(), ClientError> {
        let resp = self.http.post(self.url(&["login"]))
            .form(&[("password", password)])
            .send()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let resp = check_status(resp, &self.token)?;
        // A rejected password redirects back to the login page.
        if redirects_to(&resp, "/login") {
            return Err(ClientError::NotAuthenticated);
        }

        let resp = self.http.post(self.url(&["select-user"]))
            .form(&[("user_id", participant_id.to_string())])
            .send()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let resp = check_status(resp, &self.token)?;
        if redirects_to(&resp, "/login") {
            return Err(ClientError::NotAuthenticated);
        }
        if redirects_to(&resp, "/select-user") {
            return Err(ClientError::Validation(format!("unknown participant {}", participant_id)));
        }

        log::debug!("logged in as participant {}", participant_id);
        Ok(())
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Shareable link for this client's poll.
    pub fn share_link(&self) -> String {
        share_link(&self.base_url, &self.token)
    }

    // ── Poll management ─────────────────────────────────────────────

    /// Polls on the service's overview page, newest first.
    pub fn list_polls(&self) -> Result<Vec<PollSummary>, ClientError> {
        let resp = self.http.get(self.url(&[""]))
            .header("accept", "text/html")
            .send()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let resp = check_api_response(check_status(resp, &self.token)?)?;
        let html = resp.text().map_err(|e| ClientError::Parse(e.to_string()))?;
        Ok(parse_overview(&html))
    }

    /// Create a poll and return its token.
    pub fn create_poll(&self, form: &NewPollForm) -> Result<String, ClientError> {
        let resp = self.http.post(self.url(&["duudl", "new"]))
            .form(form)
            .send()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let resp = check_status(resp, &self.token)?;
        if redirects_to(&resp, "/login") || redirects_to(&resp, "/select-user") {
            return Err(ClientError::NotAuthenticated);
        }
        // A rejected form goes back to the form page.
        if redirects_to(&resp, "/duudl/new") {
            return Err(ClientError::Validation("a poll needs a title and at least one day".to_string()));
        }
        // Success redirects to the new poll's page.
        let token = redirect_path(&resp)
            .and_then(|path| path.rfind("/d/").map(|i| &path[i + 3..]))
            .filter(|t| !t.is_empty() && !t.contains('/'))
            .map(str::to_string);
        match token {
            Some(token) => {
                log::debug!("created poll {}", token);
                Ok(token)
            }
            None => Err(ClientError::Http(
                resp.status().as_u16(),
                "no redirect to the new poll".to_string(),
            )),
        }
    }

    /// Delete this client's poll.
    pub fn delete_poll(&self) -> Result<(), ClientError> {
        let resp = self.http.post(self.url(&["d", self.token.as_str(), "delete"]))
            .send()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let resp = check_status(resp, &self.token)?;
        if redirects_to(&resp, "/login") || redirects_to(&resp, "/select-user") {
            return Err(ClientError::NotAuthenticated);
        }
        log::debug!("deleted poll {}", self.token);
        Ok(())
    }

    // ── Internal helpers ────────────────────────────────────────────

    /// `segments` appended to the base URL, each percent-encoded.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // `new` rejects URLs that cannot take a path.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn api_url(&self, suffix: &[&str]) -> Url {
        let mut segments = vec!["api", "duudl", self.token.as_str()];
        segments.extend_from_slice(suffix);
        self.url(&segments)
    }

    fn get(&self, url: Url) -> Result<reqwest::blocking::Response, ClientError> {
        let response = self.http.get(url)
            .header("accept", "application/json")
            .send()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        check_api_response(check_status(response, &self.token)?)
    }

    fn post_json<T: serde::Serialize>(&self, url: Url, body: &T) -> Result<reqwest::blocking::Response, ClientError> {
        let response = self.http.post(url)
            .json(body)
            .send()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        check_api_response(check_status(response, &self.token)?)
    }
}

impl PersistenceClient for HttpClient {
    fn fetch_state(&self) -> Result<GridState, ClientError> {
        let resp = self.get(self.api_url(&[]))?;
        let payload: PollStatePayload = resp.json().map_err(|e| ClientError::Parse(e.to_string()))?;
        payload.into_grid_state().map_err(|e| ClientError::Parse(e.to_string()))
    }

    fn update_response(&self, update: &ResponseUpdate) -> Result<(), ClientError> {
        self.post_json(self.api_url(&["response"]), update)?;
        Ok(())
    }

    fn override_response(&self, update: &AdminResponseUpdate) -> Result<(), ClientError> {
        self.post_json(self.api_url(&["admin-response"]), update)?;
        Ok(())
    }
}

fn check_status(
    response: reqwest::blocking::Response,
    token: &str,
) -> Result<reqwest::blocking::Response, ClientError> {
    let status = response.status().as_u16();
    if response.status().is_success() || response.status().is_redirection() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    Err(match status {
        400 | 422 => ClientError::Validation(body),
        401 | 403 => ClientError::NotAuthenticated,
        404 => ClientError::NotFound(token.to_string()),
        _ => ClientError::Http(status, body),
    })
}

/// Path of the redirect target, if the response is a redirect.
fn redirect_path(response: &reqwest::blocking::Response) -> Option<&str> {
    if !response.status().is_redirection() {
        return None;
    }
    let location = response.headers().get(reqwest::header::LOCATION)?.to_str().ok()?;
    // Location may be absolute or a bare path; drop any query either way.
    let path = match location.find("://") {
        Some(i) => location[i + 3..].find('/').map(|j| &location[i + 3 + j..]).unwrap_or("/"),
        None => location,
    };
    Some(path.split('?').next().unwrap_or(path))
}

/// The service answers a rejected form post with a redirect back to a form page.
fn redirects_to(response: &reqwest::blocking::Response, page: &str) -> bool {
    redirect_path(response).is_some_and(|p| p.ends_with(page))
}

/// API endpoints never redirect; a redirect to the login pages means the session is gone.
fn check_api_response(response: reqwest::blocking::Response) -> Result<reqwest::blocking::Response, ClientError> {
    if !response.status().is_redirection() {
        return Ok(response);
    }
    if redirects_to(&response, "/login") || redirects_to(&response, "/select-user") {
        return Err(ClientError::NotAuthenticated);
    }
    let status = response.status().as_u16();
    Err(ClientError::Http(status, redirect_path(&response).unwrap_or_default().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_link() {
        assert_eq!(share_link("https://duudl.example/", "abc123"), "https://duudl.example/d/abc123");
        assert_eq!(share_link("http://127.0.0.1:5001", "x"), "http://127.0.0.1:5001/d/x");
    }

    #[test]
    fn test_urls_encode_token_and_keep_base_path() {
        let client = HttpClient::new("http://127.0.0.1:5001/", "a b/c?").unwrap();
        assert_eq!(client.api_url(&["response"]).as_str(), "http://127.0.0.1:5001/api/duudl/a%20b%2Fc%3F/response");
        assert_eq!(client.url(&[""]).as_str(), "http://127.0.0.1:5001/");

        let client = HttpClient::new("https://polls.example/duudl", "tok1").unwrap();
        assert_eq!(client.api_url(&[]).as_str(), "https://polls.example/duudl/api/duudl/tok1");
        assert_eq!(client.url(&["login"]).as_str(), "https://polls.example/duudl/login");
    }

    #[test]
    fn test_invalid_server_url() {
        assert!(matches!(HttpClient::new("polls.example", "tok1"), Err(ClientError::Network(_))));
    }

    #[test]
    fn test_error_messages() {
        assert!(ClientError::NotAuthenticated.to_string().contains("duudl login"));
        assert_eq!(ClientError::Http(500, "boom".into()).to_string(), "HTTP 500: boom");
    }
}
