//! Typed client for the GitHub repository Contents API.
//!
//! ## API Paths
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET    | `/repos/{owner}/{repo}/contents/{path}?ref={branch}` | Read file and blob SHA |
//! | PUT    | `/repos/{owner}/{repo}/contents/{path}` | Create or update file |
//!
//! The blob SHA is the version token. An update must present the SHA it
//! was derived from; GitHub rejects a stale SHA with 409. A create sends no
//! SHA, and GitHub rejects it with 422 if the file already exists.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use smslog_core::VersionToken;
use url::Url;

use crate::blob::{BlobPath, BlobStore, CommitOutcome, CommitRequest, FetchOutcome, RemoteBlob};
use crate::config::{ConfigError, GitHubConfig, RepoSlug};
use crate::error::StoreError;

const API_VERSION: &str = "2022-11-28";

// -- Request/Response types ---------------------------------------------------

/// File entry returned by `GET /contents/{path}`.
#[derive(Debug, Deserialize)]
struct ContentsFile {
    sha: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: Option<String>,
}

/// Body of `PUT /contents/{path}`.
#[derive(Debug, Serialize)]
struct PutContentsRequest<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct PutContentsResponse {
    content: CommittedFile,
}

#[derive(Debug, Deserialize)]
struct CommittedFile {
    sha: String,
}

// -- Client -------------------------------------------------------------------

/// [`BlobStore`] over the GitHub Contents API.
#[derive(Debug, Clone)]
pub struct GitHubContentStore {
    http: reqwest::Client,
    api_url: Url,
    repository: RepoSlug,
    branch: String,
}

impl GitHubContentStore {
    /// Create a client from configuration.
    pub fn new(config: &GitHubConfig) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers({
                let mut headers = HeaderMap::new();
                let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token.as_str()))
                    .map_err(|_| {
                        ConfigError::InvalidToken("token contains invalid header characters".into())
                    })?;
                auth.set_sensitive(true);
                headers.insert(AUTHORIZATION, auth);
                headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
                headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));
                headers.insert(
                    USER_AGENT,
                    HeaderValue::from_static(concat!("smslog/", env!("CARGO_PKG_VERSION"))),
                );
                headers
            })
            .build()
            .map_err(|e| StoreError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            repository: config.repository.clone(),
            branch: config.branch.clone(),
        })
    }

    /// `{api}/repos/{owner}/{repo}/contents/{path}`
    fn contents_url(&self, path: &BlobPath) -> Result<Url, StoreError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ConfigError::InvalidUrl(self.api_url.to_string(), "cannot be a base URL".into())
            })?
            .pop_if_empty()
            .extend([
                "repos",
                self.repository.owner.as_str(),
                self.repository.name.as_str(),
                "contents",
            ])
            .extend(path.segments());
        Ok(url)
    }

    async fn error_from(endpoint: String, resp: reqwest::Response) -> StoreError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        StoreError::Api {
            endpoint,
            status,
            body,
        }
    }
}

impl BlobStore for GitHubContentStore {
    async fn fetch(&self, path: &BlobPath) -> Result<FetchOutcome, StoreError> {
        let endpoint = format!("GET /contents/{path}");
        let mut url = self.contents_url(path)?;
        url.query_pairs_mut().append_pair("ref", &self.branch);

        tracing::debug!(%path, branch = %self.branch, "fetching log blob");
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| StoreError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(FetchOutcome::NotFound);
        }
        if !resp.status().is_success() {
            return Err(Self::error_from(endpoint, resp).await);
        }

        let file: ContentsFile = resp.json().await.map_err(|e| StoreError::Deserialization {
            endpoint: endpoint.clone(),
            source: e,
        })?;

        let encoding = file.encoding.as_deref().unwrap_or("base64");
        if encoding != "base64" {
            // GitHub answers "none" for files above 1 MB.
            return Err(StoreError::UnsupportedEncoding {
                endpoint,
                encoding: encoding.to_string(),
            });
        }

        // The API wraps base64 content at 60 columns.
        let packed: String = file
            .content
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let content = STANDARD
            .decode(packed.as_bytes())
            .map_err(|e| StoreError::InvalidResponse {
                endpoint: endpoint.clone(),
                reason: format!("content is not valid base64: {e}"),
            })?;
        let version = VersionToken::new(file.sha).map_err(|e| StoreError::InvalidResponse {
            endpoint,
            reason: e.to_string(),
        })?;

        Ok(FetchOutcome::Found(RemoteBlob { content, version }))
    }

    async fn commit(
        &self,
        path: &BlobPath,
        request: CommitRequest<'_>,
    ) -> Result<CommitOutcome, StoreError> {
        let endpoint = format!("PUT /contents/{path}");
        let url = self.contents_url(path)?;
        let body = PutContentsRequest {
            message: request.message,
            content: STANDARD.encode(request.content),
            branch: &self.branch,
            sha: request.precondition.map(VersionToken::as_str),
        };

        tracing::debug!(
            %path,
            branch = %self.branch,
            precondition = body.sha.unwrap_or("<create>"),
            bytes = request.content.len(),
            "committing log blob"
        );
        let resp = self
            .http
            .put(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        match resp.status() {
            StatusCode::CONFLICT => return Ok(CommitOutcome::Conflict),
            // A create that finds the file already present is reported as a
            // validation failure about the missing sha. Other 422s on create
            // (bad branch, bad path) stay errors.
            StatusCode::UNPROCESSABLE_ENTITY if request.precondition.is_none() => {
                let detail = resp.text().await.unwrap_or_default();
                if detail.contains("sha") {
                    tracing::debug!(%path, %detail, "create rejected; file appeared concurrently");
                    return Ok(CommitOutcome::Conflict);
                }
                return Err(StoreError::Api {
                    endpoint,
                    status: StatusCode::UNPROCESSABLE_ENTITY.as_u16(),
                    body: detail,
                });
            }
            s if !s.is_success() => return Err(Self::error_from(endpoint, resp).await),
            _ => {}
        }

        let committed: PutContentsResponse =
            resp.json().await.map_err(|e| StoreError::Deserialization {
                endpoint: endpoint.clone(),
                source: e,
            })?;
        let version =
            VersionToken::new(committed.content.sha).map_err(|e| StoreError::InvalidResponse {
                endpoint,
                reason: e.to_string(),
            })?;
        Ok(CommitOutcome::Committed { version })
    }
}
