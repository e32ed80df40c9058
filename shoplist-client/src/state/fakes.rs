//! Hand-written collaborator doubles for container tests.

use std::sync::{
    Mutex,
    atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use reqwest::StatusCode;
use shared::models::{
    AuthTokens, CreateGroupRequest, FieldErrors, Group, GroupId, LoginCredentials, RegisterData,
    RegisterResponse, UpdateGroupRequest, User, UserId,
};

use crate::{
    api::{GroupApi, SessionApi},
    error::{ClientError, ClientResult, CollaboratorError},
};

pub(crate) fn user(id: UserId, username: &str) -> User {
    User {
        id,
        username: username.to_string(),
        email: format!("{username}@example.com"),
        first_name: String::new(),
        last_name: String::new(),
        bio: None,
        avatar: None,
        created_at: None,
    }
}

pub(crate) fn group(id: GroupId, name: &str) -> Group {
    Group {
        id,
        name: name.to_string(),
        description: None,
        owner: None,
        members_detail: Vec::new(),
        members_count: 1,
        created_at: None,
        updated_at: None,
    }
}

pub(crate) fn tokens(access: &str, refresh: &str) -> AuthTokens {
    AuthTokens {
        access: access.to_string(),
        refresh: refresh.to_string(),
    }
}

fn status_error(status: StatusCode, message: &str) -> ClientError {
    CollaboratorError::Status {
        status,
        message: message.to_string(),
    }
    .into()
}

/// Accepts one password and answers `current_user` with a fixed record.
#[derive(Debug, Default)]
pub(crate) struct FakeSessionApi {
    pub(crate) password: String,
    /// `None` makes `current_user` fail as an expired session would.
    pub(crate) me: Option<User>,
    /// Makes `current_user` fail as an unreachable server would.
    pub(crate) offline: bool,
    pub(crate) me_calls: AtomicUsize,
}

impl FakeSessionApi {
    pub(crate) fn accepting(password: &str, me: User) -> Self {
        Self {
            password: password.to_string(),
            me: Some(me),
            ..Self::default()
        }
    }

    pub(crate) fn me_calls(&self) -> usize {
        self.me_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionApi for FakeSessionApi {
    async fn login(&self, credentials: &LoginCredentials) -> ClientResult<AuthTokens> {
        if credentials.password == self.password {
            Ok(tokens(
                &format!("access-{}", credentials.username),
                &format!("refresh-{}", credentials.username),
            ))
        } else {
            Err(ClientError::Authentication {
                message: "No active account found with the given credentials".to_string(),
            })
        }
    }

    async fn register(&self, data: &RegisterData) -> ClientResult<RegisterResponse> {
        if data.password != data.password2 {
            let mut fields = FieldErrors::default();
            fields
                .0
                .insert("password".to_string(), vec!["Password fields didn't match.".to_string()]);
            return Err(ClientError::Validation(fields));
        }
        Ok(RegisterResponse {
            user: user(100, &data.username),
            tokens: tokens("access-new", "refresh-new"),
        })
    }

    async fn current_user(&self) -> ClientResult<User> {
        self.me_calls.fetch_add(1, Ordering::SeqCst);
        if self.offline {
            return Err(status_error(StatusCode::BAD_GATEWAY, "Bad Gateway"));
        }
        self.me.clone().ok_or(ClientError::SessionExpired)
    }
}

/// An in-memory group server that can be switched into failing mode.
#[derive(Debug, Default)]
pub(crate) struct FakeGroupApi {
    server: Mutex<Vec<Group>>,
    next_id: AtomicI64,
    failing: AtomicBool,
}

impl FakeGroupApi {
    pub(crate) fn with_groups(groups: Vec<Group>) -> Self {
        let next_id = groups.iter().map(|group| group.id).max().unwrap_or(0) + 1;
        Self {
            server: Mutex::new(groups),
            next_id: AtomicI64::new(next_id),
            failing: AtomicBool::new(false),
        }
    }

    /// Id the next created group receives.
    pub(crate) fn next_id(self, id: GroupId) -> Self {
        self.next_id.store(id, Ordering::SeqCst);
        self
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn server_groups(&self) -> Vec<Group> {
        self.server.lock().unwrap().clone()
    }

    fn check(&self) -> ClientResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(status_error(StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable"))
        } else {
            Ok(())
        }
    }

    fn remove(&self, id: GroupId) -> ClientResult<()> {
        self.check()?;
        let mut server = self.server.lock().unwrap();
        let before = server.len();
        server.retain(|group| group.id != id);
        if server.len() == before {
            return Err(status_error(StatusCode::NOT_FOUND, "Not found."));
        }
        Ok(())
    }
}

#[async_trait]
impl GroupApi for FakeGroupApi {
    async fn list_groups(&self) -> ClientResult<Vec<Group>> {
        self.check()?;
        Ok(self.server_groups())
    }

    async fn create_group(&self, request: &CreateGroupRequest) -> ClientResult<Group> {
        self.check()?;
        if request.name.trim().is_empty() {
            let mut fields = FieldErrors::default();
            fields
                .0
                .insert("name".to_string(), vec!["This field may not be blank.".to_string()]);
            return Err(ClientError::Validation(fields));
        }
        let mut created = group(self.next_id.fetch_add(1, Ordering::SeqCst), &request.name);
        created.description.clone_from(&request.description);
        self.server.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update_group(&self, id: GroupId, patch: &UpdateGroupRequest) -> ClientResult<Group> {
        self.check()?;
        let mut server = self.server.lock().unwrap();
        let Some(stored) = server.iter_mut().find(|group| group.id == id) else {
            return Err(status_error(StatusCode::NOT_FOUND, "Not found."));
        };
        if let Some(name) = &patch.name {
            stored.name.clone_from(name);
        }
        if let Some(description) = &patch.description {
            stored.description = Some(description.clone());
        }
        Ok(stored.clone())
    }

    async fn delete_group(&self, id: GroupId) -> ClientResult<()> {
        self.remove(id)
    }

    async fn leave_group(&self, id: GroupId) -> ClientResult<()> {
        self.remove(id)
    }
}
