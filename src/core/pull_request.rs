//! Pull request creation against the hosting service's REST API.

use crate::core::error::{Result, StoryError};
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestRequest {
    pub title: String,
    pub body: String,
    /// `<owner>:<branch>` of the branch being merged
    pub head: String,
    pub base: String,
}

#[derive(Debug, Deserialize)]
struct PullRequestResponse {
    html_url: String,
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    field: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

impl ApiErrorDetail {
    fn describe(&self) -> Option<String> {
        if let Some(message) = &self.message {
            return Some(message.clone());
        }
        match (&self.field, &self.code) {
            (Some(field), Some(code)) => Some(format!("{field} {code}")),
            (None, Some(code)) => Some(code.clone()),
            _ => None,
        }
    }
}

/// Turn an error response body into one readable line
pub fn describe_api_error(body: &str) -> String {
    let parsed: ApiErrorBody = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(_) => return body.trim().to_string(),
    };

    let details: Vec<String> = parsed.errors.iter().filter_map(ApiErrorDetail::describe).collect();
    match (parsed.message.is_empty(), details.is_empty()) {
        (false, true) => parsed.message,
        (false, false) => format!("{}: {}", parsed.message, details.join("; ")),
        (true, false) => details.join("; "),
        (true, true) => body.trim().to_string(),
    }
}

pub struct PullRequestClient {
    base_url: String,
    token: String,
    client: reqwest::blocking::Client,
}

impl PullRequestClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let client = Self::client_builder().build()?;
        Ok(Self::with_client(base_url, token, client))
    }

    fn client_builder() -> reqwest::blocking::ClientBuilder {
        reqwest::blocking::Client::builder().user_agent(concat!("gitcli/", env!("CARGO_PKG_VERSION")))
    }

    pub fn with_client(base_url: &str, token: &str, client: reqwest::blocking::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Open a pull request on `owner/repo` and return its web URL
    pub fn create(&self, owner: &str, repo: &str, request: &PullRequestRequest) -> Result<String> {
        let url = self.url(&format!("/repos/{owner}/{repo}/pulls"));
        log::debug!("POST {url} head={} base={}", request.head, request.base);

        let resp = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, self.auth())
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .json(request)
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            log::debug!("Pull request rejected with {status}: {body}");
            return Err(StoryError::pull_request_rejected(
                status.as_u16(),
                describe_api_error(&body),
            ));
        }

        let created: PullRequestResponse = resp.json()?;
        Ok(created.html_url)
    }
}
