//! ArchivesSpace HTTP client
//!
//! Production implementation of [`ArchivesClient`] over the ArchivesSpace
//! backend API. Authentication is session-based: a login request yields a
//! token sent as `X-ArchivesSpace-Session` on every call. Sessions expire
//! server-side, so each request retries once with a fresh session when the
//! server rejects the current one.

use crate::adapters::archivesspace::models::{
    ArchivalObject, DigitalObject, Resource, ResolvedRecord, SessionResponse, TreeComponent,
    TreeNode,
};
use crate::adapters::archivesspace::traits::ArchivesClient;
use crate::config::{ArchivesSpaceConfig, EadOptions};
use crate::domain::errors::{ApiError, AspexError};
use crate::domain::Result;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

const SESSION_HEADER: &str = "X-ArchivesSpace-Session";

/// Session-authenticated client for one ArchivesSpace repository
pub struct ArchivesSpaceClient {
    http: Client,
    config: ArchivesSpaceConfig,
    session: RwLock<Option<String>>,
}

impl ArchivesSpaceClient {
    /// Create a new client; no request is made until `authenticate`.
    pub fn new(config: ArchivesSpaceConfig) -> Self {
        Self {
            http: Client::new(),
            config,
            session: RwLock::new(None),
        }
    }

    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repositories/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.repository,
            path
        )
    }

    fn abs_url(&self, uri: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), uri)
    }

    /// Log in and store a fresh session token.
    async fn login(&self) -> Result<()> {
        let url = format!(
            "{}/users/{}/login",
            self.config.base_url.trim_end_matches('/'),
            self.config.username
        );

        let response = self
            .http
            .post(&url)
            .query(&[("password", self.config.password.as_str())])
            .send()
            .await
            .map_err(|e| ApiError::ConnectionFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ApiError::AuthenticationFailed(format!(
                "login returned HTTP {}",
                response.status()
            ))
            .into());
        }

        let session: SessionResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("login response: {e}")))?;

        *self.session.write().await = Some(session.session);
        tracing::debug!("ArchivesSpace session established");
        Ok(())
    }

    /// Perform a GET with the current session, re-authenticating once if the
    /// server rejects the session mid-run.
    async fn get_raw(&self, url: &str, query: &[(String, String)]) -> Result<Response> {
        for attempt in 0..2 {
            let token = {
                let guard = self.session.read().await;
                guard.clone()
            };
            let token = match token {
                Some(t) => t,
                None => {
                    self.login().await?;
                    self.session
                        .read()
                        .await
                        .clone()
                        .ok_or_else(|| ApiError::AuthenticationFailed("no session".into()))?
                }
            };

            let response = self
                .http
                .get(url)
                .header(SESSION_HEADER, token)
                .query(query)
                .send()
                .await
                .map_err(|e| ApiError::ConnectionFailed(e.to_string()))?;

            let status = response.status();
            if session_rejected(status) && attempt == 0 {
                tracing::debug!(url = %url, status = %status, "Session rejected, re-authenticating");
                *self.session.write().await = None;
                continue;
            }

            return match status {
                s if s.is_success() => Ok(response),
                StatusCode::NOT_FOUND => Err(ApiError::NotFound(url.to_string()).into()),
                s if s.is_server_error() => Err(ApiError::ServerError {
                    status: s.as_u16(),
                    message: body_snippet(response).await,
                }
                .into()),
                s => Err(ApiError::ClientError {
                    status: s.as_u16(),
                    message: body_snippet(response).await,
                }
                .into()),
            };
        }
        unreachable!("get_raw retries at most once")
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<T> {
        let response = self.get_raw(url, query).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("{url}: {e}")).into())
    }

    async fn get_bytes(&self, url: &str, query: &[(String, String)]) -> Result<Vec<u8>> {
        let response = self.get_raw(url, query).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("{url}: {e}")))?;
        Ok(bytes.to_vec())
    }

    async fn list_ids(&self, record_type: &str, modified_since: Option<i64>) -> Result<Vec<u64>> {
        let url = self.repo_url(record_type);
        let mut query = vec![("all_ids".to_string(), "true".to_string())];
        if let Some(since) = modified_since {
            query.push(("modified_since".to_string(), since.to_string()));
        }
        self.get_json(&url, &query).await
    }
}

/// Session expiry surfaces as 401 or 412 depending on server version.
fn session_rejected(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::PRECONDITION_FAILED
    )
}

async fn body_snippet(response: Response) -> String {
    match response.text().await {
        Ok(body) => body.chars().take(200).collect(),
        Err(_) => String::from("<unreadable body>"),
    }
}

fn bool_param(value: bool) -> String {
    if value { "true" } else { "false" }.to_string()
}

#[async_trait]
impl ArchivesClient for ArchivesSpaceClient {
    async fn authenticate(&self) -> Result<()> {
        self.login().await.map_err(|e| match e {
            AspexError::Api(api) => AspexError::Setup(format!("cannot reach API: {api}")),
            other => other,
        })
    }

    async fn list_resource_ids(&self, modified_since: Option<i64>) -> Result<Vec<u64>> {
        self.list_ids("resources", modified_since).await
    }

    async fn list_archival_object_ids(&self, modified_since: Option<i64>) -> Result<Vec<u64>> {
        self.list_ids("archival_objects", modified_since).await
    }

    async fn list_digital_object_ids(&self, modified_since: Option<i64>) -> Result<Vec<u64>> {
        self.list_ids("digital_objects", modified_since).await
    }

    async fn get_resource(&self, id: u64) -> Result<Resource> {
        self.get_json(&self.repo_url(&format!("resources/{id}")), &[])
            .await
    }

    async fn get_archival_object(&self, id: u64) -> Result<ArchivalObject> {
        self.get_json(&self.repo_url(&format!("archival_objects/{id}")), &[])
            .await
    }

    async fn get_digital_object(&self, id: u64) -> Result<DigitalObject> {
        self.get_json(&self.repo_url(&format!("digital_objects/{id}")), &[])
            .await
    }

    async fn get_digital_object_by_ref(&self, uri: &str) -> Result<DigitalObject> {
        self.get_json(&self.abs_url(uri), &[]).await
    }

    async fn resolve_ref(&self, uri: &str) -> Result<ResolvedRecord> {
        self.get_json(&self.abs_url(uri), &[]).await
    }

    async fn fetch_ead(&self, resource_id: u64, options: &EadOptions) -> Result<Vec<u8>> {
        let url = self.repo_url(&format!("resource_descriptions/{resource_id}.xml"));
        let query = vec![
            (
                "include_unpublished".to_string(),
                bool_param(options.include_unpublished),
            ),
            (
                "include_daos".to_string(),
                bool_param(options.include_daos),
            ),
            ("numbered_cs".to_string(), bool_param(options.numbered_cs)),
        ];
        self.get_bytes(&url, &query).await
    }

    async fn fetch_mets(&self, digital_object_id: u64) -> Result<Vec<u8>> {
        let url = self.repo_url(&format!("digital_objects/mets/{digital_object_id}.xml"));
        self.get_bytes(&url, &[]).await
    }

    async fn walk_tree(&self, resource_id: u64) -> Result<Vec<TreeComponent>> {
        let tree: TreeNode = self
            .get_json(&self.repo_url(&format!("resources/{resource_id}/tree")), &[])
            .await?;

        let mut components = Vec::new();
        for uri in tree.record_uris() {
            match self.get_json::<TreeComponent>(&self.abs_url(&uri), &[]).await {
                Ok(component) => components.push(component),
                Err(e) => {
                    tracing::warn!(uri = %uri, error = %e, "Skipping unreadable tree component");
                }
            }
        }
        Ok(components)
    }
}
