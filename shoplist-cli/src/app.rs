use std::sync::Arc;

use anyhow::{Context, Result, bail};
use client::{
    ApiClient, EventSink, FileStorage, GroupDirectory, KeyValueStorage, SessionState,
    SharedStorage, TabPreferences, TokenStore,
};
use shared::{
    config::ClientConfig,
    models::{GroupId, User},
};
use tracing::debug;

/// Storage key for the group selected with `shoplist groups use`.
const CURRENT_GROUP_KEY: &str = "current-group";

/// Everything a command needs: configuration, storage, and the API client.
#[derive(Debug)]
pub struct App {
    config: ClientConfig,
    storage: SharedStorage,
    api: Arc<ApiClient>,
}

impl App {
    pub fn open(config: ClientConfig) -> Result<Self> {
        let dir = config.resolved_storage_dir();
        let storage: SharedStorage = Arc::new(
            FileStorage::open(&dir)
                .with_context(|| format!("failed to open storage in {}", dir.display()))?,
        );
        let api = Arc::new(
            ApiClient::from_config(&config, storage.clone())
                .context("failed to build HTTP client")?,
        );
        debug!(api = %config.api_base_url, storage = %dir.display(), "client ready");
        Ok(Self {
            config,
            storage,
            api,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// A session resolved against the stored tokens.
    pub async fn session(&self) -> SessionState {
        let mut session = SessionState::new(
            self.api.clone(),
            TokenStore::new(self.storage.clone()),
            EventSink::disabled(),
        );
        session.load_user().await;
        session
    }

    /// The logged-in user, or an error telling the user to log in.
    pub async fn require_user(&self) -> Result<User> {
        match self.session().await.current_user() {
            Some(user) => Ok(user.clone()),
            None => bail!("not logged in; run `shoplist session login` first"),
        }
    }

    pub fn groups(&self) -> GroupDirectory {
        GroupDirectory::new(self.api.clone(), EventSink::disabled())
    }

    pub fn tabs(&self) -> TabPreferences {
        TabPreferences::restore(self.storage.clone(), EventSink::disabled())
    }

    pub fn current_group(&self) -> Result<Option<GroupId>> {
        let Some(raw) = self.storage.get(CURRENT_GROUP_KEY)? else {
            return Ok(None);
        };
        match raw.parse() {
            Ok(id) => Ok(Some(id)),
            Err(_) => {
                debug!(value = %raw, "ignoring malformed current group");
                Ok(None)
            }
        }
    }

    pub fn remember_group(&self, id: Option<GroupId>) -> Result<()> {
        match id {
            Some(id) => self.storage.set(CURRENT_GROUP_KEY, &id.to_string())?,
            None => self.storage.remove(CURRENT_GROUP_KEY)?,
        }
        Ok(())
    }

    /// `explicit` when given, otherwise the remembered group.
    pub fn group_or_current(&self, explicit: Option<GroupId>) -> Result<GroupId> {
        if let Some(id) = explicit {
            return Ok(id);
        }
        match self.current_group()? {
            Some(id) => Ok(id),
            None => bail!("no group selected; pass --group or run `shoplist groups use <id>`"),
        }
    }
}
