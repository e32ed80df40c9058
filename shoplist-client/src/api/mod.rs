//! HTTP collaborators for the ShopList REST API.
//!
//! One [`ApiClient`] serves every resource family; each family lives in its
//! own module. The session and group families are also exposed as traits
//! ([`SessionApi`], [`GroupApi`]) so the state containers can run against
//! test doubles.

mod auth;
mod groups;
mod recipes;
mod shopping;

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use shared::{
    config::ClientConfig,
    models::{RefreshRequest, RefreshResponse},
};
use tracing::{debug, warn};
use url::Url;

use crate::{
    error::{ClientError, ClientResult, CollaboratorError},
    storage::{SharedStorage, TokenStore},
};

pub use auth::SessionApi;
pub use groups::GroupApi;
pub use recipes::RecipeImage;

const USER_AGENT: &str = concat!("shoplist-client/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const REFRESH_PATH: &str = "auth/token/refresh/";

/// API client for the ShopList REST API.
///
/// Authenticated requests carry the stored access token as a bearer token.
/// A 401 triggers one refresh with the stored refresh token and one retry.
#[derive(Clone, Debug)]
pub struct ApiClient {
    base_url: String,
    client: Client,
    tokens: TokenStore,
}

impl ApiClient {
    /// Create a client rooted at `base_url` that reads tokens from `storage`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: &Url, storage: SharedStorage) -> ClientResult<Self> {
        Self::with_timeout(base_url, storage, DEFAULT_TIMEOUT)
    }

    /// Create a client from the resolved configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &ClientConfig, storage: SharedStorage) -> ClientResult<Self> {
        Self::with_timeout(
            &config.api_base_url,
            storage,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn with_timeout(
        base_url: &Url,
        storage: SharedStorage,
        timeout: Duration,
    ) -> ClientResult<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            client,
            tokens: TokenStore::new(storage),
        })
    }

    /// The persisted token pair this client authenticates with.
    #[must_use]
    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub(crate) fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.tokens.access() {
            Ok(Some(token)) => request.bearer_auth(token),
            Ok(None) => request,
            Err(err) => {
                warn!(error = %err, "could not read access token; sending request anonymously");
                request
            }
        }
    }

    /// Send an authenticated request, refreshing the session once on 401.
    ///
    /// `build` must produce a fresh request each time it is called.
    async fn send_with_refresh<F>(&self, build: F) -> ClientResult<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let response = self.authorize(build()).send().await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }
        let Some(refresh) = self.tokens.refresh()? else {
            return Ok(response);
        };
        drop(response);

        match self.refresh_session(&refresh).await {
            Ok(()) => {}
            Err(err @ ClientError::Collaborator(CollaboratorError::Transport(_))) => {
                return Err(err);
            }
            Err(err) => {
                debug!(error = %err, "session refresh rejected");
                self.tokens.clear_quietly();
                return Err(ClientError::SessionExpired);
            }
        }

        let retried = self.authorize(build()).send().await?;
        if retried.status() == StatusCode::UNAUTHORIZED {
            self.tokens.clear_quietly();
            return Err(ClientError::SessionExpired);
        }
        Ok(retried)
    }

    /// Exchange the refresh token for a new access token.
    async fn refresh_session(&self, refresh: &str) -> ClientResult<()> {
        let response = self
            .client
            .post(self.api_url(REFRESH_PATH))
            .json(&RefreshRequest {
                refresh: refresh.to_string(),
            })
            .send()
            .await?;
        let body: RefreshResponse = decode(response).await?;
        self.tokens
            .save_refreshed(&body.access, body.refresh.as_deref())?;
        debug!("access token refreshed");
        Ok(())
    }

    /// `GET` a JSON resource.
    pub(crate) async fn get_json<T>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        let url = self.api_url(path);
        debug!(%url, "GET");
        let response = self
            .send_with_refresh(|| self.client.get(url.as_str()).query(query))
            .await?;
        decode(response).await
    }

    /// Send a request with an optional JSON body and decode a JSON response.
    pub(crate) async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ClientResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self.send_body(method, path, body).await?;
        decode(response).await
    }

    /// Send a request whose response body is irrelevant.
    pub(crate) async fn send_unit<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ClientResult<()>
    where
        B: Serialize + ?Sized + Sync,
    {
        let response = self.send_body(method, path, body).await?;
        expect_success(response).await
    }

    async fn send_body<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ClientResult<Response>
    where
        B: Serialize + ?Sized + Sync,
    {
        let url = self.api_url(path);
        debug!(%method, %url, "sending");
        self.send_with_refresh(|| {
            let request = self.client.request(method.clone(), url.as_str());
            match body {
                Some(body) => request.json(body),
                None => request,
            }
        })
        .await
    }

    /// Send an unauthenticated JSON request, used by the credential
    /// endpoints where a stale bearer token would be rejected.
    pub(crate) async fn send_anonymous<B>(&self, path: &str, body: &B) -> ClientResult<Response>
    where
        B: Serialize + ?Sized + Sync,
    {
        let url = self.api_url(path);
        debug!(%url, "POST (anonymous)");
        Ok(self.client.post(url).json(body).send().await?)
    }
}

/// Decode a JSON body, classifying non-success statuses.
pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ClientError::from_status(status, &body));
    }
    serde_json::from_str(&body).map_err(|err| CollaboratorError::Decode(err).into())
}

async fn expect_success(response: Response) -> ClientResult<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::from_status(status, &body))
}
