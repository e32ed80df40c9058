use std::{fmt, sync::Arc};

use shared::models::{LoginCredentials, RegisterData, User};
use tracing::{debug, info, instrument, warn};

use super::{EventSink, StateEvent};
use crate::{api::SessionApi, error::ClientResult, storage::TokenStore};

/// Who is logged in.
///
/// The user record exists exactly when the session is authenticated, and
/// `Loading` is only ever the initial status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionStatus {
    /// The persisted session has not been checked yet.
    #[default]
    Loading,
    Anonymous,
    Authenticated(User),
}

/// Single source of truth for the current session.
pub struct SessionState {
    status: SessionStatus,
    api: Arc<dyn SessionApi>,
    tokens: TokenStore,
    events: EventSink,
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl SessionState {
    /// A session in the [`SessionStatus::Loading`] status. Call
    /// [`SessionState::load_user`] to resolve it.
    pub fn new(api: Arc<dyn SessionApi>, tokens: TokenStore, events: EventSink) -> Self {
        Self {
            status: SessionStatus::Loading,
            api,
            tokens,
            events,
        }
    }

    #[must_use]
    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    #[must_use]
    pub fn current_user(&self) -> Option<&User> {
        match &self.status {
            SessionStatus::Authenticated(user) => Some(user),
            SessionStatus::Loading | SessionStatus::Anonymous => None,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self.status, SessionStatus::Authenticated(_))
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.status, SessionStatus::Loading)
    }

    /// Log in and adopt the account the new tokens belong to.
    ///
    /// On any failure the status and the previously stored tokens are left
    /// as they were.
    ///
    /// # Errors
    /// [`crate::ClientError::Authentication`] for rejected credentials, or
    /// whatever the follow-up current-user fetch or token storage failed with.
    #[instrument(skip(self, password))]
    pub async fn login(&mut self, username: &str, password: &str) -> ClientResult<User> {
        let credentials = LoginCredentials {
            username: username.to_string(),
            password: password.to_string(),
        };
        let issued = self.api.login(&credentials).await?;

        let previous = match self.tokens.pair() {
            Ok(previous) => previous,
            Err(err) => {
                warn!(error = %err, "stored session tokens are unreadable; replacing them");
                None
            }
        };
        self.tokens.save(&issued)?;
        let user = match self.api.current_user().await {
            Ok(user) => user,
            Err(err) => {
                if let Err(restore_err) = self.tokens.restore(previous.as_ref()) {
                    warn!(error = %restore_err, "could not restore previous session tokens");
                }
                return Err(err);
            }
        };

        info!(user_id = user.id, "logged in");
        Ok(self.authenticate(user))
    }

    /// Create an account and adopt the user record from the response.
    ///
    /// # Errors
    /// [`crate::ClientError::Validation`] when the server rejects the fields.
    #[instrument(skip_all, fields(username = %data.username))]
    pub async fn register(&mut self, data: &RegisterData) -> ClientResult<User> {
        let response = self.api.register(data).await?;
        self.tokens.save(&response.tokens)?;
        info!(user_id = response.user.id, "registered");
        Ok(self.authenticate(response.user))
    }

    /// Forget the session. Storage failures are logged, never returned.
    #[instrument(skip(self))]
    pub fn logout(&mut self) {
        self.tokens.clear_quietly();
        self.set_status(SessionStatus::Anonymous);
        info!("logged out");
    }

    /// Resolve the persisted session, if any.
    ///
    /// Never fails: an unreadable, missing, expired or unverifiable token
    /// all end in [`SessionStatus::Anonymous`], and a token that was
    /// present is cleared.
    #[instrument(skip(self))]
    pub async fn load_user(&mut self) -> &SessionStatus {
        let token = match self.tokens.access() {
            Ok(token) => token,
            Err(err) => {
                warn!(error = %err, "could not read stored access token");
                None
            }
        };

        let status = match token {
            None => {
                debug!("no stored session");
                SessionStatus::Anonymous
            }
            Some(_) => match self.api.current_user().await {
                Ok(user) => {
                    debug!(user_id = user.id, "stored session is valid");
                    SessionStatus::Authenticated(user)
                }
                Err(err) => {
                    warn!(error = %err, "discarding stored session");
                    self.tokens.clear_quietly();
                    SessionStatus::Anonymous
                }
            },
        };
        self.set_status(status);
        &self.status
    }

    fn authenticate(&mut self, user: User) -> User {
        self.set_status(SessionStatus::Authenticated(user.clone()));
        user
    }

    fn set_status(&mut self, status: SessionStatus) {
        self.status = status;
        self.events.emit(StateEvent::SessionChanged {
            authenticated: self.is_authenticated(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::ClientError,
        state::fakes::{FakeSessionApi, tokens, user},
        storage::{
            ACCESS_TOKEN_KEY, FileStorage, KeyValueStorage, MemoryStorage, REFRESH_TOKEN_KEY,
            testing::FlakyStorage,
        },
    };
    use tempfile::TempDir;

    struct Harness {
        storage: Arc<MemoryStorage>,
        api: Arc<FakeSessionApi>,
        session: SessionState,
    }

    fn harness(api: FakeSessionApi, stored: Option<(&str, &str)>) -> Harness {
        let storage = Arc::new(match stored {
            Some((access, refresh)) => {
                MemoryStorage::with_entries([(ACCESS_TOKEN_KEY, access), (REFRESH_TOKEN_KEY, refresh)])
            }
            None => MemoryStorage::new(),
        });
        let api = Arc::new(api);
        let session = SessionState::new(
            api.clone(),
            TokenStore::new(storage.clone()),
            EventSink::disabled(),
        );
        Harness {
            storage,
            api,
            session,
        }
    }

    fn assert_consistent(session: &SessionState) {
        assert_eq!(session.is_authenticated(), session.current_user().is_some());
        if session.is_loading() {
            assert!(!session.is_authenticated());
        }
    }

    #[test]
    fn test_starts_loading() {
        let h = harness(FakeSessionApi::default(), None);

        assert!(h.session.is_loading());
        assert!(h.session.current_user().is_none());
        assert_consistent(&h.session);
    }

    #[tokio::test]
    async fn test_load_user_without_token_is_anonymous() {
        let mut h = harness(FakeSessionApi::accepting("pw", user(1, "anna")), None);

        h.session.load_user().await;

        assert_eq!(h.session.status(), &SessionStatus::Anonymous);
        assert!(!h.session.is_loading());
        assert_eq!(h.api.me_calls(), 0);
    }

    #[tokio::test]
    async fn test_load_user_with_valid_token_authenticates() {
        let mut h = harness(
            FakeSessionApi::accepting("pw", user(1, "anna")),
            Some(("access", "refresh")),
        );

        h.session.load_user().await;

        assert_eq!(h.session.current_user().map(|u| u.id), Some(1));
        assert!(!h.session.is_loading());
        assert_eq!(h.storage.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("access"));
    }

    #[tokio::test]
    async fn test_load_user_with_expired_token_clears_tokens() {
        let mut h = harness(FakeSessionApi::default(), Some(("stale", "stale-refresh")));

        h.session.load_user().await;

        assert_eq!(h.session.status(), &SessionStatus::Anonymous);
        assert!(!h.session.is_loading());
        assert!(h.storage.snapshot().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_user_network_failure_is_recovered() {
        let api = FakeSessionApi {
            offline: true,
            ..FakeSessionApi::accepting("pw", user(1, "anna"))
        };
        let mut h = harness(api, Some(("access", "refresh")));

        h.session.load_user().await;

        assert_eq!(h.session.status(), &SessionStatus::Anonymous);
        assert!(h.storage.get(REFRESH_TOKEN_KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_user_twice_repeats_resolution() {
        let mut h = harness(
            FakeSessionApi::accepting("pw", user(1, "anna")),
            Some(("access", "refresh")),
        );

        h.session.load_user().await;
        h.session.load_user().await;

        assert!(h.session.is_authenticated());
        assert_eq!(h.api.me_calls(), 2);
    }

    #[tokio::test]
    async fn test_login_persists_tokens_and_fetches_user() {
        let mut h = harness(FakeSessionApi::accepting("secret", user(4, "boris")), None);
        h.session.load_user().await;

        let logged_in = h.session.login("boris", "secret").await.unwrap();

        assert_eq!(logged_in.username, "boris");
        assert_eq!(
            h.storage.get(ACCESS_TOKEN_KEY).unwrap().as_deref(),
            Some("access-boris")
        );
        assert_eq!(
            h.storage.get(REFRESH_TOKEN_KEY).unwrap().as_deref(),
            Some("refresh-boris")
        );
        assert_consistent(&h.session);
    }

    #[tokio::test]
    async fn test_rejected_login_leaves_state_unchanged() {
        let mut h = harness(FakeSessionApi::accepting("secret", user(4, "boris")), None);
        h.session.load_user().await;

        let err = h.session.login("boris", "wrong").await.unwrap_err();

        assert!(matches!(err, ClientError::Authentication { .. }));
        assert_eq!(h.session.status(), &SessionStatus::Anonymous);
        assert!(h.storage.snapshot().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_login_with_failing_user_fetch_restores_tokens() {
        let api = FakeSessionApi {
            password: "secret".to_string(),
            ..FakeSessionApi::default()
        };
        let mut h = harness(api, Some(("old-access", "old-refresh")));

        let err = h.session.login("boris", "secret").await.unwrap_err();

        assert!(matches!(err, ClientError::SessionExpired));
        assert!(h.session.is_loading());
        assert_eq!(
            h.storage.get(ACCESS_TOKEN_KEY).unwrap().as_deref(),
            Some("old-access")
        );
        assert_eq!(
            h.storage.get(REFRESH_TOKEN_KEY).unwrap().as_deref(),
            Some("old-refresh")
        );
    }

    #[tokio::test]
    async fn test_login_with_failing_token_write_keeps_previous_pair() {
        let storage = Arc::new(
            FlakyStorage::seeded(Some(("old-access", "old-refresh")))
                .failing_writes_to(REFRESH_TOKEN_KEY),
        );
        let mut session = SessionState::new(
            Arc::new(FakeSessionApi::accepting("pw", user(1, "anna"))),
            TokenStore::new(storage.clone()),
            EventSink::disabled(),
        );

        let err = session.login("anna", "pw").await.unwrap_err();

        assert!(matches!(err, ClientError::Storage(_)));
        assert!(session.is_loading());
        assert_eq!(
            storage.snapshot().get(ACCESS_TOKEN_KEY).map(String::as_str),
            Some("old-access")
        );
        assert_eq!(
            storage.snapshot().get(REFRESH_TOKEN_KEY).map(String::as_str),
            Some("old-refresh")
        );
    }

    #[tokio::test]
    async fn test_login_with_unreadable_storage_still_logs_in() {
        let mut session = SessionState::new(
            Arc::new(FakeSessionApi::accepting("pw", user(1, "anna"))),
            TokenStore::new(Arc::new(FlakyStorage::seeded(None).failing_reads())),
            EventSink::disabled(),
        );

        session.load_user().await;
        assert_eq!(session.status(), &SessionStatus::Anonymous);

        let logged_in = session.login("anna", "pw").await.unwrap();
        assert_eq!(logged_in.id, 1);
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn test_corrupt_storage_file_does_not_lock_out_login() {
        let dir = TempDir::new().unwrap();
        let storage = Arc::new(FileStorage::open(dir.path()).unwrap());
        std::fs::write(storage.path(), "{not json").unwrap();
        let mut session = SessionState::new(
            Arc::new(FakeSessionApi::accepting("pw", user(1, "anna"))),
            TokenStore::new(storage.clone()),
            EventSink::disabled(),
        );

        session.load_user().await;
        session.logout();
        session.login("anna", "pw").await.unwrap();

        assert!(session.is_authenticated());
        assert_eq!(
            TokenStore::new(storage).pair().unwrap(),
            Some(tokens("access-anna", "refresh-anna"))
        );
    }

    #[tokio::test]
    async fn test_register_adopts_returned_user_without_fetch() {
        let mut h = harness(FakeSessionApi::default(), None);
        let data = RegisterData {
            username: "vera".to_string(),
            email: "vera@example.com".to_string(),
            password: "pw12345!".to_string(),
            password2: "pw12345!".to_string(),
            ..RegisterData::default()
        };

        let registered = h.session.register(&data).await.unwrap();

        assert_eq!(registered.username, "vera");
        assert_eq!(h.api.me_calls(), 0);
        assert_eq!(
            TokenStore::new(h.storage.clone()).pair().unwrap(),
            Some(tokens("access-new", "refresh-new"))
        );
    }

    #[tokio::test]
    async fn test_register_validation_error_carries_fields() {
        let mut h = harness(FakeSessionApi::default(), None);
        let data = RegisterData {
            username: "vera".to_string(),
            password: "one".to_string(),
            password2: "two".to_string(),
            ..RegisterData::default()
        };

        let err = h.session.register(&data).await.unwrap_err();

        let fields = err.field_errors().expect("validation error");
        assert_eq!(fields.get("password"), ["Password fields didn't match."]);
        assert!(!h.session.is_authenticated());
    }

    #[tokio::test]
    async fn test_register_with_failing_token_write_stores_nothing() {
        let storage = Arc::new(FlakyStorage::seeded(None).failing_writes_to(REFRESH_TOKEN_KEY));
        let mut session = SessionState::new(
            Arc::new(FakeSessionApi::default()),
            TokenStore::new(storage.clone()),
            EventSink::disabled(),
        );
        let data = RegisterData {
            username: "vera".to_string(),
            password: "pw12345!".to_string(),
            password2: "pw12345!".to_string(),
            ..RegisterData::default()
        };

        let err = session.register(&data).await.unwrap_err();

        assert!(matches!(err, ClientError::Storage(_)));
        assert!(!session.is_authenticated());
        assert!(storage.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_load_user_with_unreadable_storage_is_anonymous() {
        let api = Arc::new(FakeSessionApi::accepting("pw", user(1, "anna")));
        let mut session = SessionState::new(
            api.clone(),
            TokenStore::new(Arc::new(
                FlakyStorage::seeded(Some(("access", "refresh"))).failing_reads(),
            )),
            EventSink::disabled(),
        );

        let status = session.load_user().await;

        assert_eq!(status, &SessionStatus::Anonymous);
        assert_eq!(api.me_calls(), 0);
    }

    #[tokio::test]
    async fn test_logout_clears_tokens_and_user() {
        let mut h = harness(
            FakeSessionApi::accepting("pw", user(1, "anna")),
            Some(("access", "refresh")),
        );
        h.session.load_user().await;

        h.session.logout();

        assert_eq!(h.session.status(), &SessionStatus::Anonymous);
        assert!(h.storage.snapshot().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_login_logout_sequences_keep_user_and_flag_in_step() {
        let mut h = harness(FakeSessionApi::accepting("pw", user(1, "anna")), None);
        h.session.load_user().await;

        for password in ["pw", "nope", "pw", "pw"] {
            let _ = h.session.login("anna", password).await;
            assert_consistent(&h.session);
            h.session.logout();
            assert_consistent(&h.session);
        }
        let _ = h.session.login("anna", "pw").await;
        assert_consistent(&h.session);
        assert!(h.session.is_authenticated());
    }

    #[tokio::test]
    async fn test_transitions_emit_session_events() {
        let storage = Arc::new(MemoryStorage::new());
        let (sink, mut events) = EventSink::channel();
        let mut session = SessionState::new(
            Arc::new(FakeSessionApi::accepting("pw", user(1, "anna"))),
            TokenStore::new(storage),
            sink,
        );

        session.load_user().await;
        session.login("anna", "pw").await.unwrap();
        session.logout();

        let received: Vec<_> = std::iter::from_fn(|| events.try_recv().ok()).collect();
        assert_eq!(
            received,
            [
                StateEvent::SessionChanged { authenticated: false },
                StateEvent::SessionChanged { authenticated: true },
                StateEvent::SessionChanged { authenticated: false },
            ]
        );
    }
}
