use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use shared::models::{AuthTokens, FieldErrors, LoginCredentials, RegisterData, RegisterResponse, User};
use tracing::instrument;

use super::{ApiClient, decode};
use crate::error::{ClientError, ClientResult, response_message};

const LOGIN_PATH: &str = "auth/login/";
const REGISTER_PATH: &str = "auth/register/";
const ME_PATH: &str = "auth/me/";
const SEARCH_PATH: &str = "auth/search/";

/// Session endpoints consumed by [`crate::state::SessionState`].
#[async_trait]
pub trait SessionApi: Send + Sync {
    /// Exchange credentials for a token pair.
    ///
    /// # Errors
    /// [`ClientError::Authentication`] when the credentials are rejected.
    async fn login(&self, credentials: &LoginCredentials) -> ClientResult<AuthTokens>;

    /// Create an account and receive its first token pair.
    ///
    /// # Errors
    /// [`ClientError::Validation`] when the server rejects the fields.
    async fn register(&self, data: &RegisterData) -> ClientResult<RegisterResponse>;

    /// Fetch the account the stored access token belongs to.
    ///
    /// # Errors
    /// [`ClientError::SessionExpired`] when the token is invalid or expired.
    async fn current_user(&self) -> ClientResult<User>;
}

#[async_trait]
impl SessionApi for ApiClient {
    #[instrument(skip_all, fields(username = %credentials.username))]
    async fn login(&self, credentials: &LoginCredentials) -> ClientResult<AuthTokens> {
        let response = self.send_anonymous(LOGIN_PATH, credentials).await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::BAD_REQUEST {
            let body = response.text().await?;
            return Err(login_rejection(status, &body));
        }
        decode(response).await
    }

    #[instrument(skip_all, fields(username = %data.username))]
    async fn register(&self, data: &RegisterData) -> ClientResult<RegisterResponse> {
        let response = self.send_anonymous(REGISTER_PATH, data).await?;
        decode(response).await
    }

    async fn current_user(&self) -> ClientResult<User> {
        self.get_json(ME_PATH, &[]).await
    }
}

impl ApiClient {
    /// Find users by username or email fragment, e.g. to pick an invitee.
    ///
    /// # Errors
    /// Propagates any API failure.
    pub async fn search_users(&self, query: &str) -> ClientResult<Vec<User>> {
        self.get_json(SEARCH_PATH, &[("q", query.to_string())]).await
    }
}

/// Map a rejected login to the error the caller can act on.
///
/// Field messages about the form itself (blank username, say) stay
/// validation errors; anything else means the credentials were wrong.
fn login_rejection(status: StatusCode, body: &str) -> ClientError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    if status == StatusCode::BAD_REQUEST {
        if let Some(fields) = parsed.as_ref().and_then(FieldErrors::from_value) {
            let only_form_wide = fields
                .iter()
                .all(|(field, _)| field == FieldErrors::NON_FIELD);
            if !only_form_wide {
                return ClientError::Validation(fields);
            }
            return ClientError::Authentication {
                message: fields.to_string(),
            };
        }
    }
    ClientError::Authentication {
        message: response_message(status, parsed.as_ref(), body),
    }
}
