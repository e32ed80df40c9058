#![cfg_attr(not(test), forbid(unsafe_code))]
//! ShopList client: REST collaborators, durable storage, and the session,
//! group and tab-preference state containers built on top of them.

pub mod api;
pub mod error;
pub mod state;
pub mod storage;

pub use api::{ApiClient, GroupApi, RecipeImage, SessionApi};
pub use error::{ClientError, ClientResult, CollaboratorError};
pub use state::{
    EventSink, GroupDirectory, GroupTab, SessionState, SessionStatus, StateEvent, TabPreferences,
};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, SharedStorage, TokenStore};
