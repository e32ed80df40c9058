//! Exercises the real reqwest client against an in-process axum server.

use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    routing::{get, post},
};
use client::{
    ApiClient, ClientError, EventSink, FileStorage, GroupApi, KeyValueStorage, MemoryStorage,
    SessionApi, SessionState, SessionStatus, SharedStorage, TokenStore,
    storage::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY},
};
use serde_json::{Value, json};
use shared::models::{CreateGroupRequest, LoginCredentials};
use tokio::net::TcpListener;
use url::Url;

const VALID_ACCESS: &str = "fresh-access";
const VALID_REFRESH: &str = "good-refresh";

#[derive(Default)]
struct FakeServer {
    seen: Mutex<Vec<String>>,
}

type Shared = Arc<FakeServer>;

impl FakeServer {
    fn record(&self, route: &str, headers: &HeaderMap) {
        let auth = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("anonymous");
        self.seen.lock().unwrap().push(format!("{route} [{auth}]"));
    }

    fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {VALID_ACCESS}"))
}

fn token_not_valid() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "detail": "Given token not valid for any token type",
            "code": "token_not_valid"
        })),
    )
}

async fn me(State(server): State<Shared>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    server.record("GET me", &headers);
    if !authorized(&headers) {
        return token_not_valid();
    }
    (
        StatusCode::OK,
        Json(json!({"id": 1, "username": "anna", "email": "anna@example.com"})),
    )
}

async fn refresh(
    State(server): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    server.record("POST refresh", &headers);
    if body["refresh"] == VALID_REFRESH {
        (StatusCode::OK, Json(json!({"access": VALID_ACCESS})))
    } else {
        token_not_valid()
    }
}

async fn login(
    State(server): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    server.record("POST login", &headers);
    if body["password"] == "pw" {
        (
            StatusCode::OK,
            Json(json!({"access": VALID_ACCESS, "refresh": VALID_REFRESH})),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "No active account found with the given credentials"})),
        )
    }
}

async fn list_groups(State(server): State<Shared>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    server.record("GET groups", &headers);
    if !authorized(&headers) {
        return token_not_valid();
    }
    (
        StatusCode::OK,
        Json(json!([{"id": 7, "name": "Trip", "members_count": 2}])),
    )
}

async fn create_group(
    State(server): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    server.record("POST groups", &headers);
    if !authorized(&headers) {
        return token_not_valid();
    }
    match body["name"].as_str() {
        Some(name) if !name.trim().is_empty() => (
            StatusCode::CREATED,
            Json(json!({"id": 8, "name": name})),
        ),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({"name": ["This field is required."]})),
        ),
    }
}

async fn get_group(
    State(server): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> (StatusCode, Json<Value>) {
    server.record("GET group", &headers);
    if id == 7 {
        (StatusCode::OK, Json(json!({"id": 7, "name": "Trip"})))
    } else {
        (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."})))
    }
}

async fn spawn_server() -> (Url, Shared) {
    let server = Shared::default();
    let app = Router::new()
        .route("/api/auth/me/", get(me))
        .route("/api/auth/login/", post(login))
        .route("/api/auth/token/refresh/", post(refresh))
        .route("/api/groups/", get(list_groups).post(create_group))
        .route("/api/groups/{id}/", get(get_group))
        .with_state(server.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (Url::parse(&format!("http://{addr}/api/")).unwrap(), server)
}

fn storage_with(access: &str, refresh: &str) -> Arc<MemoryStorage> {
    Arc::new(MemoryStorage::with_entries([
        (ACCESS_TOKEN_KEY, access),
        (REFRESH_TOKEN_KEY, refresh),
    ]))
}

#[tokio::test]
async fn test_requests_carry_bearer_token() {
    let (base, server) = spawn_server().await;
    let api = ApiClient::new(&base, storage_with(VALID_ACCESS, VALID_REFRESH)).unwrap();

    let groups = api.list_groups().await.unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].name, "Trip");
    assert_eq!(server.seen(), [format!("GET groups [Bearer {VALID_ACCESS}]")]);
}

#[tokio::test]
async fn test_expired_access_token_is_refreshed_and_retried_once() {
    let (base, server) = spawn_server().await;
    let storage = storage_with("stale-access", VALID_REFRESH);
    let api = ApiClient::new(&base, storage.clone()).unwrap();

    let user = api.current_user().await.unwrap();

    assert_eq!(user.username, "anna");
    assert_eq!(
        server.seen(),
        [
            "GET me [Bearer stale-access]".to_string(),
            "POST refresh [anonymous]".to_string(),
            format!("GET me [Bearer {VALID_ACCESS}]"),
        ]
    );
    assert_eq!(storage.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some(VALID_ACCESS));
    assert_eq!(storage.get(REFRESH_TOKEN_KEY).unwrap().as_deref(), Some(VALID_REFRESH));
}

#[tokio::test]
async fn test_rejected_refresh_clears_tokens_and_expires_session() {
    let (base, server) = spawn_server().await;
    let storage = storage_with("stale-access", "revoked-refresh");
    let api = ApiClient::new(&base, storage.clone()).unwrap();

    let err = api.current_user().await.unwrap_err();

    assert!(matches!(err, ClientError::SessionExpired));
    assert!(storage.snapshot().unwrap().is_empty());
    assert_eq!(server.seen().len(), 2);
}

#[tokio::test]
async fn test_unauthorized_without_refresh_token_is_session_expired() {
    let (base, _server) = spawn_server().await;
    let storage = Arc::new(MemoryStorage::with_entries([(ACCESS_TOKEN_KEY, "stale-access")]));
    let api = ApiClient::new(&base, storage).unwrap();

    let err = api.list_groups().await.unwrap_err();

    assert!(matches!(err, ClientError::SessionExpired));
}

#[tokio::test]
async fn test_bad_request_maps_to_field_errors() {
    let (base, _server) = spawn_server().await;
    let api = ApiClient::new(&base, storage_with(VALID_ACCESS, VALID_REFRESH)).unwrap();

    let err = api
        .create_group(&CreateGroupRequest::new(""))
        .await
        .unwrap_err();

    let fields = err.field_errors().expect("validation error");
    assert_eq!(fields.get("name"), ["This field is required."]);
}

#[tokio::test]
async fn test_created_group_decodes_from_minimal_body() {
    let (base, _server) = spawn_server().await;
    let api = ApiClient::new(&base, storage_with(VALID_ACCESS, VALID_REFRESH)).unwrap();

    let group = api
        .create_group(&CreateGroupRequest::new("Family"))
        .await
        .unwrap();

    assert_eq!((group.id, group.name.as_str()), (8, "Family"));
    assert!(group.members_detail.is_empty());
}

#[tokio::test]
async fn test_missing_group_is_not_found() {
    let (base, _server) = spawn_server().await;
    let api = ApiClient::new(&base, storage_with(VALID_ACCESS, VALID_REFRESH)).unwrap();

    let err = api.get_group(99).await.unwrap_err();

    assert!(err.is_not_found());
    assert!(err.to_string().contains("Not found."));
}

#[tokio::test]
async fn test_login_is_sent_without_stale_bearer() {
    let (base, server) = spawn_server().await;
    let api = ApiClient::new(&base, storage_with("stale-access", "revoked-refresh")).unwrap();
    let credentials = LoginCredentials {
        username: "anna".to_string(),
        password: "pw".to_string(),
    };

    let tokens = api.login(&credentials).await.unwrap();

    assert_eq!(tokens.access, VALID_ACCESS);
    assert_eq!(server.seen(), ["POST login [anonymous]"]);
}

#[tokio::test]
async fn test_wrong_password_is_authentication_error() {
    let (base, _server) = spawn_server().await;
    let api = ApiClient::new(&base, Arc::new(MemoryStorage::new())).unwrap();
    let credentials = LoginCredentials {
        username: "anna".to_string(),
        password: "guess".to_string(),
    };

    let err = api.login(&credentials).await.unwrap_err();

    assert!(matches!(
        err,
        ClientError::Authentication { ref message }
            if message == "No active account found with the given credentials"
    ));
}

#[tokio::test]
async fn test_session_survives_restart_through_file_storage() {
    let (base, _server) = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();

    {
        let storage: SharedStorage = Arc::new(FileStorage::open(dir.path()).unwrap());
        let api = Arc::new(ApiClient::new(&base, storage.clone()).unwrap());
        let mut session = SessionState::new(api, TokenStore::new(storage), EventSink::disabled());
        session.load_user().await;
        assert_eq!(session.status(), &SessionStatus::Anonymous);
        session.login("anna", "pw").await.unwrap();
    }

    let storage: SharedStorage = Arc::new(FileStorage::open(dir.path()).unwrap());
    let api = Arc::new(ApiClient::new(&base, storage.clone()).unwrap());
    let mut session = SessionState::new(api, TokenStore::new(storage), EventSink::disabled());
    session.load_user().await;

    assert_eq!(session.current_user().map(|user| user.id), Some(1));
}
