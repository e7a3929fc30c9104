//! HTTP adapter for the remote user collection.
//!
//! Every request runs inside an `outgoing_http` span carrying method, URL and
//! response status.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, field, info_span, instrument, Instrument};
use url::Url;

use crate::config::UsersStoreConfig;
use crate::contract::client::RemoteUsersApi;
use crate::contract::error::RemoteError;
use crate::contract::model::{ListParams, RawUser, UserId, UserList, UserPatch};

/// Remote collection client speaking the `/users` REST dialect.
#[derive(Clone)]
pub struct HttpUsersClient {
    client: reqwest::Client,
    base: Url,
}

impl HttpUsersClient {
    pub fn new(client: reqwest::Client, base: Url) -> Self {
        Self { client, base }
    }

    /// Build a client from module config; a zero timeout leaves requests unbounded.
    pub fn from_config(cfg: &UsersStoreConfig) -> Result<Self, RemoteError> {
        let base = Url::parse(&cfg.base_url)
            .map_err(|e| RemoteError::invalid_url(format!("{}: {}", cfg.base_url, e)))?;

        let mut builder = reqwest::Client::builder();
        if cfg.request_timeout_ms > 0 {
            builder = builder.timeout(Duration::from_millis(cfg.request_timeout_ms));
        }
        let client = builder
            .build()
            .map_err(|e| RemoteError::transport(e.to_string()))?;

        Ok(Self::new(client, base))
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| RemoteError::invalid_url(format!("{} cannot be a base", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn execute(
        &self,
        method: Method,
        url: Url,
        body: Option<&RawUser>,
    ) -> Result<Response, RemoteError> {
        let span = info_span!(
            "outgoing_http",
            http.method = %method,
            http.url = %url,
            http.status_code = field::Empty,
            otel.kind = "client",
        );

        let mut req: RequestBuilder = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(body);
        }

        async move {
            let response = req
                .send()
                .await
                .map_err(|e| RemoteError::transport(e.to_string()))?;

            let status = response.status();
            tracing::Span::current().record("http.status_code", status.as_u16());
            debug!(status = status.as_u16(), "Remote call completed");

            if !status.is_success() {
                return Err(RemoteError::status(status.as_u16()));
            }
            Ok(response)
        }
        .instrument(span)
        .await
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| RemoteError::transport(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| RemoteError::decode(e.to_string()))
    }
}

#[async_trait]
impl RemoteUsersApi for HttpUsersClient {
    #[instrument(
        name = "users_store.http.list",
        skip_all,
        fields(limit = params.limit, offset = params.offset)
    )]
    async fn list(&self, params: ListParams) -> Result<UserList, RemoteError> {
        let mut url = self.url(&["users"])?;
        {
            let mut q = url.query_pairs_mut();
            q.append_pair("limit", &params.limit.to_string());
            q.append_pair("skip", &params.offset.to_string());
            if let Some(search) = params.search.as_deref().filter(|s| !s.is_empty()) {
                q.append_pair("q", search);
            }
            if let Some((field, order)) = params.sort {
                q.append_pair("sortBy", field.as_str());
                q.append_pair("order", order.as_str());
            }
        }

        let response = self.execute(Method::GET, url, None).await?;
        Self::read_json(response).await
    }

    #[instrument(name = "users_store.http.get", skip(self), fields(user_id = id))]
    async fn get_by_id(&self, id: UserId) -> Result<RawUser, RemoteError> {
        let url = self.url(&["users", &id.to_string()])?;
        let response = self.execute(Method::GET, url, None).await?;
        Self::read_json(response).await
    }

    #[instrument(name = "users_store.http.create", skip_all)]
    async fn create(&self, body: RawUser) -> Result<RawUser, RemoteError> {
        let url = self.url(&["users", "add"])?;
        let response = self.execute(Method::POST, url, Some(&body)).await?;
        Self::read_json(response).await
    }

    #[instrument(name = "users_store.http.update", skip(self, patch), fields(user_id = id))]
    async fn update(&self, id: UserId, patch: UserPatch) -> Result<Option<RawUser>, RemoteError> {
        let url = self.url(&["users", &id.to_string()])?;
        let response = self.execute(Method::PUT, url, Some(&patch)).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| RemoteError::transport(e.to_string()))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| RemoteError::decode(e.to_string()))
    }

    #[instrument(name = "users_store.http.delete", skip(self), fields(user_id = id))]
    async fn delete(&self, id: UserId) -> Result<(), RemoteError> {
        let url = self.url(&["users", &id.to_string()])?;
        self.execute(Method::DELETE, url, None).await?;
        Ok(())
    }
}
