use std::fmt;
use std::sync::Arc;

use reqwest::Url;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::LookupSettings;
use crate::http_transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};

pub const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
pub const RAW_MEDIA_TYPE: &str = "application/vnd.github.v3.raw";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub handle: String,
    pub avatar_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadmeStatus {
    Loading,
    Loaded,
    NotFound,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadmeContent {
    pub owner: String,
    pub repository: String,
    pub text: String,
    pub status: ReadmeStatus,
}

impl ReadmeContent {
    pub fn loading(owner: &str, repository: &str) -> Self {
        Self::with_status(owner, repository, String::new(), ReadmeStatus::Loading)
    }

    pub fn loaded(owner: &str, repository: &str, text: String) -> Self {
        Self::with_status(owner, repository, text, ReadmeStatus::Loaded)
    }

    pub fn not_found(owner: &str, repository: &str) -> Self {
        Self::with_status(owner, repository, String::new(), ReadmeStatus::NotFound)
    }

    pub fn error(owner: &str, repository: &str) -> Self {
        Self::with_status(owner, repository, String::new(), ReadmeStatus::Error)
    }

    fn with_status(owner: &str, repository: &str, text: String, status: ReadmeStatus) -> Self {
        Self {
            owner: owner.to_string(),
            repository: repository.to_string(),
            text,
            status,
        }
    }

    pub fn display_text(&self) -> &str {
        match self.status {
            ReadmeStatus::Loading => "Loading README…",
            ReadmeStatus::Loaded => self.text.as_str(),
            ReadmeStatus::NotFound => "README not found.",
            ReadmeStatus::Error => "Error loading README.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Parse,
    NotFoundStatus,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => write!(f, "transport"),
            Self::Parse => write!(f, "parse"),
            Self::NotFoundStatus => write!(f, "status"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("malformed response from {url}: {message}")]
    Parse { url: String, message: String },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

impl LookupError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Transport { .. } => FailureKind::Transport,
            Self::Parse { .. } => FailureKind::Parse,
            Self::Status { .. } => FailureKind::NotFoundStatus,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchUsersResponse {
    items: Vec<UserItem>,
}

#[derive(Debug, Deserialize)]
struct UserItem {
    login: String,
    avatar_url: String,
}

#[derive(Debug, Deserialize)]
struct RepositoryItem {
    name: String,
    full_name: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RateLimitResponse {
    rate: RateLimitItem,
}

#[derive(Debug, Deserialize)]
struct RateLimitItem {
    limit: u64,
    remaining: u64,
}

/// Read-only client for the three lookups the browser performs.
///
/// The `try_*` methods surface the full [`LookupError`]. The plain methods
/// apply the soft-failure policy: search and repository listing fall back to
/// an empty list, README fetches fold the failure into [`ReadmeStatus`].
#[derive(Clone)]
pub struct LookupClient {
    transport: Arc<dyn HttpTransport>,
    settings: LookupSettings,
    user_agent: String,
}

impl LookupClient {
    pub fn new(transport: Arc<dyn HttpTransport>, settings: LookupSettings) -> Self {
        Self {
            transport,
            settings,
            user_agent: format!("ghscout/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn with_reqwest(settings: LookupSettings) -> anyhow::Result<Self> {
        let transport = ReqwestTransport::new()?;
        Ok(Self::new(Arc::new(transport), settings))
    }

    pub fn search_accounts(&self, text: &str) -> Vec<Account> {
        match self.try_search_accounts(text) {
            Ok(accounts) => accounts,
            Err(error) => {
                warn!(kind = %error.kind(), %error, "account search failed, showing no results");
                Vec::new()
            }
        }
    }

    pub fn list_repositories(&self, handle: &str) -> Vec<Repository> {
        match self.try_list_repositories(handle) {
            Ok(repositories) => repositories,
            Err(error) => {
                warn!(kind = %error.kind(), %error, "repository listing failed, showing no results");
                Vec::new()
            }
        }
    }

    pub fn fetch_readme(&self, handle: &str, repository: &str) -> ReadmeContent {
        match self.try_fetch_readme(handle, repository) {
            Ok(text) => ReadmeContent::loaded(handle, repository, text),
            Err(error) => {
                warn!(kind = %error.kind(), %error, "readme fetch failed");
                match error.kind() {
                    FailureKind::NotFoundStatus => ReadmeContent::not_found(handle, repository),
                    FailureKind::Transport | FailureKind::Parse => {
                        ReadmeContent::error(handle, repository)
                    }
                }
            }
        }
    }

    pub fn try_search_accounts(&self, text: &str) -> Result<Vec<Account>, LookupError> {
        let mut url = self.endpoint(&["search", "users"])?;
        url.query_pairs_mut().append_pair("q", text);

        let response = self.fetch(self.request(url.as_str(), JSON_MEDIA_TYPE))?;
        let parsed: SearchUsersResponse = parse_json(url.as_str(), &response.body)?;

        Ok(parsed
            .items
            .into_iter()
            .map(|item| Account {
                handle: item.login,
                avatar_url: item.avatar_url,
            })
            .collect())
    }

    pub fn try_list_repositories(&self, handle: &str) -> Result<Vec<Repository>, LookupError> {
        let url = self.endpoint(&["users", handle, "repos"])?;

        let response = self.fetch(self.request(url.as_str(), JSON_MEDIA_TYPE))?;
        let parsed: Vec<RepositoryItem> = parse_json(url.as_str(), &response.body)?;

        Ok(parsed
            .into_iter()
            .map(|item| Repository {
                name: item.name,
                display_name: item.full_name,
                description: item.description,
            })
            .collect())
    }

    pub fn try_fetch_readme(&self, handle: &str, repository: &str) -> Result<String, LookupError> {
        let url = self.endpoint(&["repos", handle, repository, "readme"])?;
        let response = self.fetch(self.request(url.as_str(), RAW_MEDIA_TYPE))?;
        Ok(response.body)
    }

    pub fn probe_rate_limit(&self) -> Result<RateLimit, LookupError> {
        let url = self.endpoint(&["rate_limit"])?;
        let response = self.fetch(self.request(url.as_str(), JSON_MEDIA_TYPE))?;
        let parsed: RateLimitResponse = parse_json(url.as_str(), &response.body)?;

        Ok(RateLimit {
            limit: parsed.rate.limit,
            remaining: parsed.rate.remaining,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, LookupError> {
        let invalid = |message: String| LookupError::Transport {
            url: self.settings.api_base.clone(),
            message,
        };

        let mut url = Url::parse(&self.settings.api_base).map_err(|error| invalid(error.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid("api base cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, url: &str, accept: &str) -> HttpRequest {
        let request = HttpRequest::get(url)
            .header("Accept", accept)
            .header("User-Agent", self.user_agent.as_str());

        match &self.settings.credential {
            Some(credential) => {
                request.header("Authorization", format!("Bearer {}", credential.expose()))
            }
            None => request,
        }
    }

    fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, LookupError> {
        debug!(url = %request.url, "lookup request");

        let response = self
            .transport
            .get(&request)
            .map_err(|error| LookupError::Transport {
                url: request.url.clone(),
                message: format!("{error:#}"),
            })?;

        if !response.is_success() {
            return Err(LookupError::Status {
                url: request.url,
                status: response.status,
            });
        }

        Ok(response)
    }
}

fn parse_json<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, LookupError> {
    serde_json::from_str(body).map_err(|error| LookupError::Parse {
        url: url.to_string(),
        message: error.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::Credential;
    use crate::test_support::{RecordingTransport, response, transport_error};

    fn client(transport: &Arc<RecordingTransport>, token: Option<&str>) -> LookupClient {
        LookupClient::new(
            transport.clone(),
            LookupSettings {
                api_base: "https://api.github.com".to_string(),
                credential: token.and_then(Credential::new),
            },
        )
    }

    #[test]
    fn search_maps_login_and_avatar() {
        let transport = Arc::new(RecordingTransport::new(vec![response(
            200,
            r#"{"total_count":1,"items":[{"login":"octocat","id":1,"avatar_url":"https://avatars.example/u/1"}]}"#,
        )]));

        let accounts = client(&transport, None).search_accounts("octo");

        assert_eq!(
            accounts,
            vec![Account {
                handle: "octocat".to_string(),
                avatar_url: "https://avatars.example/u/1".to_string(),
            }]
        );
        let calls = transport.calls();
        assert_eq!(calls[0].url, "https://api.github.com/search/users?q=octo");
        assert_eq!(calls[0].header_value("Accept"), Some(JSON_MEDIA_TYPE));
        assert!(calls[0].header_value("User-Agent").unwrap_or("").starts_with("ghscout/"));
    }

    #[test]
    fn search_query_is_url_encoded() {
        let transport = Arc::new(RecordingTransport::new(vec![response(200, r#"{"items":[]}"#)]));

        client(&transport, None).search_accounts("a b&c");

        assert_eq!(
            transport.calls()[0].url,
            "https://api.github.com/search/users?q=a+b%26c"
        );
    }

    #[test]
    fn bearer_header_only_sent_with_credential() {
        let transport = Arc::new(RecordingTransport::new(vec![
            response(200, "[]"),
            response(200, "[]"),
        ]));

        client(&transport, Some("t0ken")).list_repositories("octocat");
        client(&transport, None).list_repositories("octocat");

        let calls = transport.calls();
        assert_eq!(calls[0].header_value("Authorization"), Some("Bearer t0ken"));
        assert_eq!(calls[1].header_value("Authorization"), None);
    }

    #[test]
    fn list_repositories_maps_full_name_and_optional_description() {
        let transport = Arc::new(RecordingTransport::new(vec![response(
            200,
            r#"[
                {"name":"Hello-World","full_name":"octocat/Hello-World","description":"My first repo"},
                {"name":"Spoon-Knife","full_name":"octocat/Spoon-Knife","description":null}
            ]"#,
        )]));

        let repositories = client(&transport, None).list_repositories("octocat");

        assert_eq!(transport.calls()[0].url, "https://api.github.com/users/octocat/repos");
        assert_eq!(repositories.len(), 2);
        assert_eq!(repositories[0].name, "Hello-World");
        assert_eq!(repositories[0].display_name, "octocat/Hello-World");
        assert_eq!(repositories[0].description.as_deref(), Some("My first repo"));
        assert!(repositories[1].description.is_none());
    }

    #[test]
    fn search_and_listing_collapse_every_failure_to_empty() {
        let transport = Arc::new(RecordingTransport::new(vec![
            transport_error("connection refused"),
            response(200, "not json"),
            response(500, ""),
            transport_error("dns failure"),
            response(200, r#"{"unexpected":true}"#),
            response(404, r#"{"message":"Not Found"}"#),
        ]));
        let client = client(&transport, None);

        assert!(client.search_accounts("octo").is_empty());
        assert!(client.search_accounts("octo").is_empty());
        assert!(client.search_accounts("octo").is_empty());
        assert!(client.list_repositories("octocat").is_empty());
        assert!(client.list_repositories("octocat").is_empty());
        assert!(client.list_repositories("octocat").is_empty());
    }

    #[test]
    fn strict_variants_keep_failure_kinds_apart() {
        let transport = Arc::new(RecordingTransport::new(vec![
            transport_error("connection refused"),
            response(200, "not json"),
            response(404, ""),
        ]));
        let client = client(&transport, None);

        let transport_failure = client.try_search_accounts("x").expect_err("transport");
        let parse_failure = client.try_search_accounts("x").expect_err("parse");
        let status_failure = client.try_list_repositories("x").expect_err("status");

        assert_eq!(transport_failure.kind(), FailureKind::Transport);
        assert!(transport_failure.to_string().contains("connection refused"));
        assert_eq!(parse_failure.kind(), FailureKind::Parse);
        assert_eq!(
            status_failure,
            LookupError::Status {
                url: "https://api.github.com/users/x/repos".to_string(),
                status: 404,
            }
        );
    }

    #[test]
    fn readme_uses_raw_media_type_and_returns_body() {
        let transport = Arc::new(RecordingTransport::new(vec![response(200, "# Hello World\n")]));

        let readme = client(&transport, None).fetch_readme("octocat", "Hello-World");

        assert_eq!(readme.status, ReadmeStatus::Loaded);
        assert_eq!(readme.display_text(), "# Hello World\n");
        let calls = transport.calls();
        assert_eq!(calls[0].url, "https://api.github.com/repos/octocat/Hello-World/readme");
        assert_eq!(calls[0].header_value("Accept"), Some(RAW_MEDIA_TYPE));
    }

    #[test]
    fn readme_distinguishes_not_found_from_error() {
        let transport = Arc::new(RecordingTransport::new(vec![
            response(404, r#"{"message":"Not Found"}"#),
            transport_error("timed out"),
        ]));
        let client = client(&transport, None);

        let missing = client.fetch_readme("octocat", "Hello-World");
        let broken = client.fetch_readme("octocat", "Hello-World");

        assert_eq!(missing.status, ReadmeStatus::NotFound);
        assert_eq!(missing.display_text(), "README not found.");
        assert_eq!(broken.status, ReadmeStatus::Error);
        assert_eq!(broken.display_text(), "Error loading README.");
    }

    #[test]
    fn endpoint_keeps_enterprise_base_path() {
        let transport = Arc::new(RecordingTransport::new(vec![response(
            200,
            r#"{"resources":{},"rate":{"limit":60,"remaining":57,"reset":0}}"#,
        )]));
        let client = LookupClient::new(
            transport.clone(),
            LookupSettings {
                api_base: "https://github.example.com/api/v3".to_string(),
                credential: None,
            },
        );

        let rate = client.probe_rate_limit().expect("rate limit");

        assert_eq!(rate, RateLimit { limit: 60, remaining: 57 });
        assert_eq!(transport.calls()[0].url, "https://github.example.com/api/v3/rate_limit");
    }
}
