//! Session lifecycle: register, authenticate, terminate.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use reqwest::Method;
use serde::Serialize;

use aula_client::notify::NotificationSink;
use aula_client::transport;
use aula_client::{ClientConfig, CredentialSource as _};
use aula_core::{ApiError, ApiResult};
use aula_models::{AuthRequest, AuthResponse, RegisterRequest};

use crate::gate::{self, RouteDecision};
use crate::identity::{self, Identity};
use crate::store::CredentialStore;

const REGISTER_PATH: &str = "/api/v1/auth/register";
const AUTHENTICATE_PATH: &str = "/api/v1/auth/authenticate";
const LOGOUT_PATH: &str = "/api/v1/auth/logout";

/// Fixed text for a failed sign-in. Never reveals which field was wrong.
const AUTHENTICATE_FAILED: &str = "Invalid email and/or password.";

/// Client-side navigation hook (router integration point).
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Navigator that only logs. Useful headless and in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNavigator;

impl Navigator for NullNavigator {
    fn navigate(&self, path: &str) {
        tracing::debug!("navigate to {path}");
    }
}

/// Owns the credential store and drives the three session operations.
///
/// Each operation keeps at most one request in flight; callers are expected
/// to disable triggers off [`SessionManager::is_loading`] (a second call is
/// not rejected, only unexpected). Failures never propagate to the caller:
/// they are reported once through the notification sink and the attempt
/// ends, leaving the session unchanged.
pub struct SessionManager {
    store: Arc<CredentialStore>,
    http: reqwest::Client,
    config: ClientConfig,
    sink: Arc<dyn NotificationSink>,
    navigator: Arc<dyn Navigator>,
    registering: AtomicBool,
    authenticating: AtomicBool,
    terminating: AtomicBool,
}

impl SessionManager {
    pub fn new(
        http: reqwest::Client,
        config: ClientConfig,
        store: Arc<CredentialStore>,
        sink: Arc<dyn NotificationSink>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            store,
            http,
            config,
            sink,
            navigator,
            registering: AtomicBool::new(false),
            authenticating: AtomicBool::new(false),
            terminating: AtomicBool::new(false),
        }
    }

    /// Create an account. On success the returned token becomes the active
    /// credential and the app navigates to the root.
    pub async fn register(&self, request: &RegisterRequest) {
        let _busy = Busy::begin(&self.registering);
        match self.post_for_token(REGISTER_PATH, request).await {
            Ok(response) => {
                self.store.set(&response.token);
                self.sink.success("Registration successful.");
                self.navigator.navigate("/");
            }
            Err(err) => self.sink.error(Some(&err), None),
        }
    }

    /// Sign in. Failure reports a fixed message regardless of the underlying
    /// transport error.
    pub async fn authenticate(&self, request: &AuthRequest) {
        let _busy = Busy::begin(&self.authenticating);
        match self.post_for_token(AUTHENTICATE_PATH, request).await {
            Ok(response) => {
                self.store.set(&response.token);
                self.sink.success("Signed in.");
                self.navigator.navigate("/");
            }
            Err(err) => self.sink.error(Some(&err), Some(AUTHENTICATE_FAILED)),
        }
    }

    /// Sign out server-side, then clear the local credential.
    ///
    /// The credential is cleared only on a confirmed logout; a failed
    /// request leaves the client still signed in.
    pub async fn terminate(&self) {
        let _busy = Busy::begin(&self.terminating);
        let credential = self.store.get();

        let outcome = async {
            let response = transport::send_json::<()>(
                &self.http,
                Method::POST,
                &self.config.endpoint(LOGOUT_PATH),
                Some(&credential),
                None,
            )
            .await?;
            transport::ensure_ok(response).map(|_| ())
        }
        .await;

        match outcome {
            Ok(()) => {
                self.store.set("");
                self.sink.success("Signed out.");
                self.navigator.navigate("/");
            }
            Err(err) => self.sink.error(Some(&err), None),
        }
    }

    async fn post_for_token<B: Serialize>(&self, path: &str, body: &B) -> ApiResult<AuthResponse> {
        let response = transport::send_json(
            &self.http,
            Method::POST,
            &self.config.endpoint(path),
            None,
            Some(body),
        )
        .await?;
        let response = transport::ensure_ok(response)?;
        transport::parse_json::<AuthResponse>(response)
            .await?
            .ok_or_else(|| ApiError::transport("empty response body"))
    }

    /// Identity derived from the current credential; `None` when logged out
    /// or when the stored token does not decode.
    pub fn identity(&self) -> Option<Identity> {
        identity::decode(&self.store.credential())
    }

    pub fn is_logged_in(&self) -> bool {
        self.identity().is_some_and(|identity| identity.valid)
    }

    /// True while register, authenticate or terminate is in flight.
    pub fn is_loading(&self) -> bool {
        self.registering.load(Ordering::SeqCst)
            || self.authenticating.load(Ordering::SeqCst)
            || self.terminating.load(Ordering::SeqCst)
    }

    /// Case-sensitive exact match against the effective role.
    pub fn has_role(&self, role: &str) -> bool {
        self.identity()
            .is_some_and(|identity| identity.role.as_str() == role)
    }

    /// Gate decision for a protected screen.
    pub fn route_decision(&self, required_role: Option<&str>) -> RouteDecision {
        let has_role = required_role.map(|role| self.has_role(role)).unwrap_or(false);
        gate::resolve_protected(self.is_loading(), self.is_logged_in(), has_role, required_role)
    }

    /// Gate decision for the login/registration screens.
    pub fn pre_auth_decision(&self) -> RouteDecision {
        gate::resolve_pre_auth(self.is_loading(), self.is_logged_in())
    }

    /// The credential store, for wiring read-side consumers.
    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }
}

/// Per-operation busy flag, cleared on every exit path.
struct Busy<'a>(&'a AtomicBool);

impl<'a> Busy<'a> {
    fn begin(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
