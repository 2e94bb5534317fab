//! Black-box tests for the session lifecycle against a stub backend.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{EncodingKey, Header};

use aula_auth::{
    CredentialStore, Navigator, RouteDecision, SessionManager, TokenClaims,
};
use aula_client::{ClientConfig, RecordingSink};
use aula_models::{AuthRequest, AuthResponse, RegisterRequest};

struct ServerState {
    fail_logout: AtomicBool,
}

struct TestServer {
    base_url: String,
    state: Arc<ServerState>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let state = Arc::new(ServerState {
            fail_logout: AtomicBool::new(false),
        });

        let app = Router::new()
            .route("/api/v1/auth/register", post(register))
            .route("/api/v1/auth/authenticate", post(authenticate))
            .route("/api/v1/auth/logout", post(logout))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            state,
            handle,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_token(name: &str, email: &str, role: &str) -> String {
    let now = Utc::now();
    let claims = TokenClaims {
        sub: email.to_string(),
        name: name.to_string(),
        roles: vec![role.to_string()],
        iat: now,
        exp: now + ChronoDuration::minutes(10),
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"test-secret"),
    )
    .expect("failed to encode jwt")
}

async fn register(
    Json(request): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, StatusCode> {
    if request.email == "taken@example.com" {
        return Err(StatusCode::CONFLICT);
    }
    Ok(Json(AuthResponse {
        token: mint_token(&request.name, &request.email, &request.role),
    }))
}

async fn authenticate(
    Json(request): Json<AuthRequest>,
) -> Result<Json<AuthResponse>, StatusCode> {
    if request.password == "slow" {
        tokio::time::sleep(std::time::Duration::from_millis(300)).await;
        return Err(StatusCode::UNAUTHORIZED);
    }
    if request.email == "alice@example.com" && request.password == "secret" {
        return Ok(Json(AuthResponse {
            token: mint_token("Alice Smith", &request.email, "STUDENT"),
        }));
    }
    Err(StatusCode::UNAUTHORIZED)
}

async fn logout(State(state): State<Arc<ServerState>>, headers: HeaderMap) -> StatusCode {
    let bearer = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    match bearer {
        Some(token) if !token.is_empty() => {
            if state.fail_logout.load(Ordering::SeqCst) {
                StatusCode::SERVICE_UNAVAILABLE
            } else {
                StatusCode::OK
            }
        }
        _ => StatusCode::UNAUTHORIZED,
    }
}

#[derive(Default)]
struct RecordingNavigator(Mutex<Vec<String>>);

impl RecordingNavigator {
    fn visited(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.0.lock().unwrap().push(path.to_string());
    }
}

struct TestContext {
    session: Arc<SessionManager>,
    sink: Arc<RecordingSink>,
    navigator: Arc<RecordingNavigator>,
    server: TestServer,
}

async fn context() -> TestContext {
    aula_observability::init();

    let server = TestServer::spawn().await;
    let sink = Arc::new(RecordingSink::new());
    let navigator = Arc::new(RecordingNavigator::default());
    let session = Arc::new(SessionManager::new(
        reqwest::Client::new(),
        ClientConfig::new(&server.base_url),
        Arc::new(CredentialStore::in_memory()),
        sink.clone(),
        navigator.clone(),
    ));

    TestContext {
        session,
        sink,
        navigator,
        server,
    }
}

fn alice() -> AuthRequest {
    AuthRequest {
        email: "alice@example.com".to_string(),
        password: "secret".to_string(),
    }
}

#[tokio::test]
async fn authenticate_then_terminate_round_trip() {
    let ctx = context().await;

    ctx.session.authenticate(&alice()).await;

    assert!(ctx.session.is_logged_in());
    let identity = ctx.session.identity().unwrap();
    assert_eq!(identity.name, "Alice Smith");
    assert_eq!(identity.subject, "alice@example.com");
    assert!(identity.valid);
    assert!(ctx.session.has_role("STUDENT"));
    assert!(!ctx.session.has_role("TEACHER"));
    assert!(!ctx.session.store().get().is_empty());
    assert_eq!(ctx.sink.successes(), vec!["Signed in.".to_string()]);
    assert_eq!(ctx.navigator.visited(), vec!["/".to_string()]);

    ctx.session.terminate().await;

    assert!(!ctx.session.is_logged_in());
    assert_eq!(ctx.session.store().get(), "");
    assert_eq!(
        ctx.sink.successes(),
        vec!["Signed in.".to_string(), "Signed out.".to_string()]
    );
    assert_eq!(ctx.navigator.visited(), vec!["/".to_string(), "/".to_string()]);
}

#[tokio::test]
async fn authenticate_failure_reports_fixed_message() {
    let ctx = context().await;

    ctx.session
        .authenticate(&AuthRequest {
            email: "alice@example.com".to_string(),
            password: "wrong".to_string(),
        })
        .await;

    assert!(!ctx.session.is_logged_in());
    assert_eq!(ctx.session.store().get(), "");
    // The classified 401 is never shown; the message is fixed by design.
    assert_eq!(ctx.sink.errors(), vec!["Invalid email and/or password.".to_string()]);
    assert!(ctx.navigator.visited().is_empty());
}

#[tokio::test]
async fn register_stores_token_and_navigates() {
    let ctx = context().await;

    ctx.session
        .register(&RegisterRequest {
            name: "Bob Jones".to_string(),
            email: "bob@example.com".to_string(),
            password: "hunter2".to_string(),
            role: "TEACHER".to_string(),
        })
        .await;

    assert!(ctx.session.is_logged_in());
    assert!(ctx.session.has_role("TEACHER"));
    assert_eq!(ctx.sink.successes(), vec!["Registration successful.".to_string()]);
    assert_eq!(ctx.navigator.visited(), vec!["/".to_string()]);
}

#[tokio::test]
async fn register_conflict_surfaces_classified_error() {
    let ctx = context().await;

    ctx.session
        .register(&RegisterRequest {
            name: "Eve".to_string(),
            email: "taken@example.com".to_string(),
            password: "pw".to_string(),
            role: "STUDENT".to_string(),
        })
        .await;

    assert!(!ctx.session.is_logged_in());
    let errors = ctx.sink.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("409"), "got: {}", errors[0]);
}

#[tokio::test]
async fn failed_logout_keeps_session() {
    let ctx = context().await;

    ctx.session.authenticate(&alice()).await;
    assert!(ctx.session.is_logged_in());

    ctx.server.state.fail_logout.store(true, Ordering::SeqCst);
    ctx.session.terminate().await;

    assert!(ctx.session.is_logged_in());
    assert!(!ctx.session.store().get().is_empty());
    let errors = ctx.sink.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("503"), "got: {}", errors[0]);
}

#[tokio::test]
async fn busy_flag_tracks_in_flight_operations() {
    let ctx = context().await;
    assert!(!ctx.session.is_loading());

    let session = ctx.session.clone();
    let task = tokio::spawn(async move {
        session
            .authenticate(&AuthRequest {
                email: "alice@example.com".to_string(),
                password: "slow".to_string(),
            })
            .await;
    });

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert!(ctx.session.is_loading());

    task.await.unwrap();
    assert!(!ctx.session.is_loading());
}

#[tokio::test]
async fn route_decisions_follow_session_state() {
    let ctx = context().await;

    // Logged out: any protected route bounces to login.
    assert_eq!(
        ctx.session.route_decision(Some("STUDENT")),
        RouteDecision::RedirectToLogin
    );
    assert_eq!(ctx.session.route_decision(None), RouteDecision::RedirectToLogin);
    assert_eq!(ctx.session.pre_auth_decision(), RouteDecision::Render);

    ctx.session.authenticate(&alice()).await;

    // Signed in as STUDENT.
    assert_eq!(ctx.session.route_decision(None), RouteDecision::Render);
    assert_eq!(
        ctx.session.route_decision(Some("STUDENT")),
        RouteDecision::Render
    );
    assert_eq!(
        ctx.session.route_decision(Some("TEACHER")),
        RouteDecision::RedirectToRoot
    );
    assert_eq!(ctx.session.pre_auth_decision(), RouteDecision::RedirectToRoot);
}
