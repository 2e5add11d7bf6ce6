use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::repos::{RepoPage, SortDirection},
};

/// Ordering enum of the repository directory API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepoOrdering {
    #[serde(rename = "NAME")]
    Name,
    #[serde(rename = "COVERAGE")]
    Coverage,
    #[serde(rename = "COMMIT_DATE")]
    CommitDate,
}

/// Row filters of the directory list query. Absent filters are omitted from
/// the wire body entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_configured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_names: Option<Vec<String>>,
}

/// One page request against the directory API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoListParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    pub ordering: RepoOrdering,
    pub direction: SortDirection,
    pub filters: ListFilters,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

/// The repository directory upstream.
#[async_trait]
pub trait RepoDirectory: Send + Sync {
    async fn fetch_page(
        &self,
        provider: &str,
        owner: &str,
        params: &RepoListParams,
    ) -> AppResult<RepoPage>;

    /// How many of the owner's repositories already have coverage or bundle
    /// analysis configured. Drives the demo-row onboarding heuristic.
    async fn configured_count(&self, provider: &str, owner: &str) -> AppResult<i64>;
}

#[derive(Debug, Deserialize)]
struct ConfiguredCountBody {
    count: i64,
}

#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    detail: Option<String>,
}

/// reqwest-backed client for the repository directory upstream.
#[derive(Clone)]
pub struct HttpRepoDirectory {
    http: reqwest::Client,
    base_url: String,
}

impl HttpRepoDirectory {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn owner_url(&self, provider: &str, owner: &str, tail: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base_url,
            urlencoding::encode(provider),
            urlencoding::encode(owner),
            tail
        )
    }
}

async fn upstream_failure(response: reqwest::Response) -> AppError {
    let detail = response
        .json::<UpstreamErrorBody>()
        .await
        .ok()
        .and_then(|body| body.detail);
    AppError::Upstream { detail }
}

#[async_trait]
impl RepoDirectory for HttpRepoDirectory {
    async fn fetch_page(
        &self,
        provider: &str,
        owner: &str,
        params: &RepoListParams,
    ) -> AppResult<RepoPage> {
        let url = self.owner_url(provider, owner, "repos/list");
        let response = self.http.post(&url).json(params).send().await?;
        if !response.status().is_success() {
            return Err(upstream_failure(response).await);
        }

        Ok(response.json::<RepoPage>().await?)
    }

    async fn configured_count(&self, provider: &str, owner: &str) -> AppResult<i64> {
        let url = self.owner_url(provider, owner, "repos/configured-count");
        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(upstream_failure(response).await);
        }

        let body = response.json::<ConfiguredCountBody>().await?;
        Ok(body.count)
    }
}
