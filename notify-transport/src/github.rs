//! GitHub REST client: rule-file contents and change information.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use notify_core::{Author, TransportError};
use notify_routing::ContentReader;

use crate::error::ClientError;

pub const DEFAULT_API_URL: &str = "https://api.github.com/";

/// Files per page when listing pull request or commit files.
const PAGE_SIZE: usize = 100;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Wire DTOs
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct UserDto {
    login: String,
    #[serde(default)]
    html_url: Option<String>,
}

#[derive(Deserialize)]
struct BaseDto {
    #[serde(rename = "ref")]
    name: String,
}

#[derive(Deserialize)]
struct PullDto {
    html_url: String,
    #[serde(default)]
    user: Option<UserDto>,
    base: BaseDto,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct FileDto {
    filename: String,
}

#[derive(Deserialize)]
struct GitActorDto {
    #[serde(default)]
    date: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct GitCommitDto {
    #[serde(default)]
    author: Option<GitActorDto>,
}

#[derive(Deserialize)]
struct CommitDto {
    html_url: String,
    #[serde(default)]
    author: Option<UserDto>,
    commit: GitCommitDto,
    #[serde(default)]
    files: Vec<FileDto>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ContentsDto {
    Listing(Vec<serde_json::Value>),
    Entry(EntryDto),
}

#[derive(Deserialize)]
struct EntryDto {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

impl From<UserDto> for Author {
    fn from(user: UserDto) -> Self {
        Author {
            login: user.login,
            url: user.html_url,
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// What GitHub reports about the pull request or commit being announced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeInfo {
    pub changed_files: Vec<String>,
    pub link_to_change: Option<String>,
    pub author: Author,
    /// Base branch of a pull request.
    pub base_ref: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Authenticated client scoped to one repository.
pub struct GithubClient {
    http: Client,
    token: SecretString,
    api: Url,
    owner: String,
    repo: String,
}

impl GithubClient {
    /// `repository` is `owner/name`.
    pub fn new(token: SecretString, repository: &str) -> Result<Self, ClientError> {
        let (owner, repo) = repository
            .split_once('/')
            .filter(|(owner, repo)| !owner.is_empty() && !repo.is_empty() && !repo.contains('/'))
            .ok_or_else(|| ClientError::Repository(repository.to_string()))?;
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("notify-on-change/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Build)?;
        Ok(Self {
            http,
            token,
            api: parse_base_url(DEFAULT_API_URL)?,
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }

    /// Point the client at another API root (GitHub Enterprise, tests).
    pub fn with_api_url(mut self, url: &str) -> Result<Self, ClientError> {
        self.api = parse_base_url(url)?;
        Ok(self)
    }

    pub fn repository(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Raw bytes of the file at `path` and `revision`.
    ///
    /// `None` when nothing exists there or the path is a directory.
    pub async fn contents(&self, path: &str, revision: &str) -> Result<Option<Vec<u8>>, ClientError> {
        let route = format!("repos/{}/{}/contents/{}", self.owner, self.repo, path);
        let response = self.get(&route, &[("ref", revision.to_string())]).await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(path, "not found");
            return Ok(None);
        }
        let dto: ContentsDto = decode(&route, response).await?;
        let entry = match dto {
            ContentsDto::Listing(_) => {
                debug!(path, "is a directory");
                return Ok(None);
            }
            ContentsDto::Entry(entry) => entry,
        };
        if entry.kind != "file" {
            debug!(path, kind = %entry.kind, "not a regular file");
            return Ok(None);
        }
        match (entry.encoding.as_deref(), entry.content) {
            (Some("base64"), Some(content)) => {
                let compact: String = content.split_whitespace().collect();
                STANDARD
                    .decode(compact)
                    .map(Some)
                    .map_err(|e| ClientError::Decode {
                        target: route,
                        message: e.to_string(),
                    })
            }
            (encoding, _) => Err(ClientError::Decode {
                target: route,
                message: format!("no inline content (encoding {encoding:?})"),
            }),
        }
    }

    /// Pull request link, author, base branch and every changed file.
    pub async fn pull_request_info(&self, number: u64) -> Result<ChangeInfo, ClientError> {
        let route = format!("repos/{}/{}/pulls/{number}", self.owner, self.repo);
        let pull: PullDto = self.get_json(&route, &[]).await?;

        let files_route = format!("{route}/files");
        let mut changed_files = Vec::new();
        for page in 1.. {
            let files: Vec<FileDto> = self.get_json(&files_route, &page_query(page)).await?;
            let count = files.len();
            changed_files.extend(files.into_iter().map(|f| f.filename));
            if count < PAGE_SIZE {
                break;
            }
        }
        info!(number, files = changed_files.len(), "fetched pull request");

        Ok(ChangeInfo {
            changed_files,
            link_to_change: Some(pull.html_url),
            author: pull.user.map(Author::from).unwrap_or_default(),
            base_ref: Some(pull.base.name).filter(|b| !b.is_empty()),
            timestamp: pull.created_at,
        })
    }

    /// Commit link, author and every changed file.
    pub async fn commit_info(&self, sha: &str) -> Result<ChangeInfo, ClientError> {
        let route = format!("repos/{}/{}/commits/{sha}", self.owner, self.repo);
        let mut info = ChangeInfo::default();
        for page in 1.. {
            let commit: CommitDto = self.get_json(&route, &page_query(page)).await?;
            if page == 1 {
                info.link_to_change = Some(commit.html_url);
                info.author = commit.author.map(Author::from).unwrap_or_default();
                info.timestamp = commit.commit.author.and_then(|a| a.date);
            }
            let count = commit.files.len();
            info.changed_files
                .extend(commit.files.into_iter().map(|f| f.filename));
            if count < PAGE_SIZE {
                break;
            }
        }
        info!(sha, files = info.changed_files.len(), "fetched commit");
        Ok(info)
    }

    async fn get(&self, route: &str, query: &[(&str, String)]) -> Result<reqwest::Response, ClientError> {
        let url = self.endpoint(route)?;
        self.http
            .get(url)
            .bearer_auth(self.token.expose_secret())
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .query(query)
            .send()
            .await
            .map_err(|source| ClientError::Http {
                target: route.to_string(),
                source,
            })
    }

    /// Append `route` to the API root one segment at a time, so `#`, `?` and
    /// `%` in repository paths are percent-encoded.
    fn endpoint(&self, route: &str) -> Result<Url, ClientError> {
        let mut url = self.api.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::Url {
                url: self.api.to_string(),
                message: "not a hierarchical base URL".to_string(),
            })?
            .pop_if_empty()
            .extend(route.split('/'));
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        route: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let response = self.get(route, query).await?;
        decode(route, response).await
    }
}

#[async_trait]
impl ContentReader for GithubClient {
    async fn get_contents(&self, path: &str, revision: &str) -> Result<Option<Vec<u8>>, TransportError> {
        Ok(self.contents(path, revision).await?)
    }
}

fn page_query(page: usize) -> [(&'static str, String); 2] {
    [("per_page", PAGE_SIZE.to_string()), ("page", page.to_string())]
}

async fn decode<T: DeserializeOwned>(route: &str, response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Status {
            target: route.to_string(),
            status: status.as_u16(),
            body,
        });
    }
    response.json().await.map_err(|e| ClientError::Decode {
        target: route.to_string(),
        message: e.to_string(),
    })
}

/// Parse an API root, forcing a trailing slash so relative joins append.
pub(crate) fn parse_base_url(url: &str) -> Result<Url, ClientError> {
    let normalized = if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    };
    Url::parse(&normalized).map_err(|e| ClientError::Url {
        url: url.to_string(),
        message: e.to_string(),
    })
}
