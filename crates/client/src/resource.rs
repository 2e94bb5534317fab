//! Typed resource operations over the shared transport.
//!
//! Four operation shapes share one request core: `read` (GET, cached),
//! `create` (POST), `replace` (PUT) and `remove` (`DELETE {url}/{id}`).
//! Failures are terminal for the attempt: reported once through the sink
//! (and the descriptor's `on_error`), never retried.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use aula_core::ApiError;

use crate::cache::{CacheKey, RequestCache};
use crate::notify::NotificationSink;
use crate::transport::{self, CredentialSource};

pub type SuccessCallback<Resp> = Arc<dyn Fn(Option<&Resp>) + Send + Sync>;
pub type ErrorCallback = Arc<dyn Fn(&ApiError) + Send + Sync>;

/// Per-call configuration, constructed by the screen that owns the call.
///
/// Only the handle minted from it carries runtime state; the descriptor
/// itself is immutable. `on_success` and `success_message` apply to
/// mutations; reads report failures only.
pub struct Descriptor<Resp> {
    pub key: CacheKey,
    pub url: String,
    pub requires_auth: bool,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
    pub on_success: Option<SuccessCallback<Resp>>,
    pub on_error: Option<ErrorCallback>,
}

impl<Resp> Descriptor<Resp> {
    pub fn new(key: CacheKey, url: impl Into<String>) -> Self {
        Self {
            key,
            url: url.into(),
            requires_auth: false,
            success_message: None,
            error_message: None,
            on_success: None,
            on_error: None,
        }
    }

    /// Attach the current credential as a bearer header on every request.
    pub fn with_auth(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    pub fn with_success_message(mut self, message: impl Into<String>) -> Self {
        self.success_message = Some(message.into());
        self
    }

    /// Text shown instead of the classified error on failure.
    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn on_success(mut self, callback: impl Fn(Option<&Resp>) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Arc::new(callback));
        self
    }

    pub fn on_error(mut self, callback: impl Fn(&ApiError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(callback));
        self
    }
}

/// Pieces every handle shares.
struct Context {
    http: reqwest::Client,
    credentials: Arc<dyn CredentialSource>,
    cache: Arc<RequestCache>,
    sink: Arc<dyn NotificationSink>,
}

impl Context {
    fn credential_for<Resp>(&self, descriptor: &Descriptor<Resp>) -> Option<String> {
        descriptor
            .requires_auth
            .then(|| self.credentials.credential())
    }

    fn report_error<Resp>(&self, descriptor: &Descriptor<Resp>, error: &ApiError) {
        self.sink.error(Some(error), descriptor.error_message.as_deref());
        if let Some(callback) = &descriptor.on_error {
            callback(error);
        }
    }

    fn report_success<Resp>(&self, descriptor: &Descriptor<Resp>, payload: Option<&Resp>) {
        if let Some(message) = &descriptor.success_message {
            self.sink.success(message);
        }
        if let Some(callback) = &descriptor.on_success {
            callback(payload);
        }
    }
}

/// Entry point binding transport, credentials, cache and sink together.
///
/// Cheap to clone; all clones share one request cache.
#[derive(Clone)]
pub struct ResourceClient {
    ctx: Arc<Context>,
}

impl ResourceClient {
    pub fn new(
        http: reqwest::Client,
        credentials: Arc<dyn CredentialSource>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            ctx: Arc::new(Context {
                http,
                credentials,
                cache: Arc::new(RequestCache::new()),
                sink,
            }),
        }
    }

    /// The cache backing `read` handles, for manual invalidation.
    pub fn cache(&self) -> &Arc<RequestCache> {
        &self.ctx.cache
    }

    pub fn read<Resp: DeserializeOwned>(&self, descriptor: Descriptor<Resp>) -> ReadHandle<Resp> {
        let key = descriptor.key.joined(&descriptor.url);
        ReadHandle {
            ctx: self.ctx.clone(),
            descriptor: Arc::new(descriptor),
            key,
            state: Arc::new(Mutex::new(ReadState::default())),
        }
    }

    pub fn create<Resp: DeserializeOwned>(
        &self,
        descriptor: Descriptor<Resp>,
    ) -> CreateHandle<Resp> {
        CreateHandle {
            inner: MutationInner::new(self.ctx.clone(), descriptor, Method::POST),
        }
    }

    pub fn replace<Resp: DeserializeOwned>(
        &self,
        descriptor: Descriptor<Resp>,
    ) -> ReplaceHandle<Resp> {
        ReplaceHandle {
            inner: MutationInner::new(self.ctx.clone(), descriptor, Method::PUT),
        }
    }

    pub fn remove<Resp: DeserializeOwned>(
        &self,
        descriptor: Descriptor<Resp>,
    ) -> RemoveHandle<Resp> {
        RemoveHandle {
            inner: MutationInner::new(self.ctx.clone(), descriptor, Method::DELETE),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Read
// ─────────────────────────────────────────────────────────────────────────────

struct ReadState<Resp> {
    data: Option<Resp>,
    loading: bool,
    refetching: bool,
}

impl<Resp> Default for ReadState<Resp> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            refetching: false,
        }
    }
}

/// Cached GET against one endpoint.
pub struct ReadHandle<Resp> {
    ctx: Arc<Context>,
    descriptor: Arc<Descriptor<Resp>>,
    key: CacheKey,
    state: Arc<Mutex<ReadState<Resp>>>,
}

impl<Resp> Clone for ReadHandle<Resp> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            descriptor: self.descriptor.clone(),
            key: self.key.clone(),
            state: self.state.clone(),
        }
    }
}

impl<Resp: DeserializeOwned> ReadHandle<Resp> {
    /// Initial load. Served from the cache when a value is already stored
    /// for this key; an identical in-flight fetch is joined, not repeated.
    pub async fn fetch(&self) {
        self.run(false).await;
    }

    /// Force a new round trip. The previous `data` stays visible until the
    /// new result arrives. In-flight requests are not cancelled, so a slower
    /// earlier response can still overwrite a newer one (known unguarded
    /// race, inherited from the service contract).
    pub async fn refetch(&self) {
        self.run(true).await;
    }

    async fn run(&self, force: bool) {
        {
            let mut state = lock(&self.state);
            if force {
                state.refetching = true;
            } else {
                state.loading = true;
            }
        }

        // Credential is read before the send, by construction.
        let credential = self.ctx.credential_for(&self.descriptor);
        let ctx = self.ctx.clone();
        let url = self.descriptor.url.clone();

        let result = self
            .ctx
            .cache
            .fetch(&self.key, force, || async move {
                let response = transport::send_json::<()>(
                    &ctx.http,
                    Method::GET,
                    &url,
                    credential.as_deref(),
                    None,
                )
                .await?;
                let response = transport::ensure_ok(response)?;
                match transport::parse_json::<Value>(response).await? {
                    Some(value) => Ok(value),
                    None => Err(ApiError::transport("empty response body")),
                }
            })
            .await
            .and_then(|value| {
                serde_json::from_value::<Resp>(value)
                    .map_err(|err| ApiError::transport(format!("invalid response body: {err}")))
            });

        match result {
            Ok(data) => {
                let mut state = lock(&self.state);
                state.data = Some(data);
                state.loading = false;
                state.refetching = false;
            }
            Err(error) => {
                // Stale data is retained; only the flags settle.
                {
                    let mut state = lock(&self.state);
                    state.loading = false;
                    state.refetching = false;
                }
                self.ctx.report_error(&self.descriptor, &error);
            }
        }
    }

    /// True during the initial load, before any data exists.
    pub fn loading(&self) -> bool {
        lock(&self.state).loading
    }

    /// True while a forced refetch is in flight; `data` keeps the previous
    /// value for the duration.
    pub fn refetching(&self) -> bool {
        lock(&self.state).refetching
    }

    /// Effective cache key (descriptor key joined with the URL).
    pub fn key(&self) -> &CacheKey {
        &self.key
    }
}

impl<Resp: Clone> ReadHandle<Resp> {
    /// Last successfully fetched payload.
    pub fn data(&self) -> Option<Resp> {
        lock(&self.state).data.clone()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Mutations
// ─────────────────────────────────────────────────────────────────────────────

struct MutationState<Resp> {
    data: Option<Resp>,
    loading: bool,
}

impl<Resp> Default for MutationState<Resp> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
        }
    }
}

struct MutationInner<Resp> {
    ctx: Arc<Context>,
    descriptor: Arc<Descriptor<Resp>>,
    method: Method,
    state: Arc<Mutex<MutationState<Resp>>>,
}

impl<Resp> Clone for MutationInner<Resp> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            descriptor: self.descriptor.clone(),
            method: self.method.clone(),
            state: self.state.clone(),
        }
    }
}

impl<Resp: DeserializeOwned> MutationInner<Resp> {
    fn new(ctx: Arc<Context>, descriptor: Descriptor<Resp>, method: Method) -> Self {
        Self {
            ctx,
            descriptor: Arc::new(descriptor),
            method,
            state: Arc::new(Mutex::new(MutationState::default())),
        }
    }

    async fn run<B: Serialize + ?Sized>(&self, url: &str, body: Option<&B>) {
        lock(&self.state).loading = true;

        let credential = self.ctx.credential_for(&self.descriptor);
        let outcome = async {
            let response = transport::send_json(
                &self.ctx.http,
                self.method.clone(),
                url,
                credential.as_deref(),
                body,
            )
            .await?;
            let response = transport::ensure_success(response)?;
            transport::parse_json::<Resp>(response).await
        }
        .await;

        lock(&self.state).loading = false;

        match outcome {
            Ok(payload) => {
                self.ctx.report_success(&self.descriptor, payload.as_ref());
                lock(&self.state).data = payload;
            }
            Err(error) => self.ctx.report_error(&self.descriptor, &error),
        }
    }

    fn loading(&self) -> bool {
        lock(&self.state).loading
    }
}

/// POST against one endpoint.
pub struct CreateHandle<Resp> {
    inner: MutationInner<Resp>,
}

impl<Resp> Clone for CreateHandle<Resp> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<Resp: DeserializeOwned> CreateHandle<Resp> {
    pub async fn submit<Req: Serialize + ?Sized>(&self, request: &Req) {
        self.inner.run(&self.inner.descriptor.url, Some(request)).await;
    }

    pub fn loading(&self) -> bool {
        self.inner.loading()
    }
}

impl<Resp: Clone> CreateHandle<Resp> {
    /// Payload of the last successful submit, if the server returned one.
    pub fn data(&self) -> Option<Resp> {
        lock(&self.inner.state).data.clone()
    }
}

/// PUT against one endpoint.
pub struct ReplaceHandle<Resp> {
    inner: MutationInner<Resp>,
}

impl<Resp> Clone for ReplaceHandle<Resp> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<Resp: DeserializeOwned> ReplaceHandle<Resp> {
    pub async fn submit<Req: Serialize + ?Sized>(&self, request: &Req) {
        self.inner.run(&self.inner.descriptor.url, Some(request)).await;
    }

    pub fn loading(&self) -> bool {
        self.inner.loading()
    }
}

/// DELETE against one endpoint; the target id is appended to the URL.
pub struct RemoveHandle<Resp> {
    inner: MutationInner<Resp>,
}

impl<Resp> Clone for RemoveHandle<Resp> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<Resp: DeserializeOwned> RemoveHandle<Resp> {
    /// Issues `DELETE {url}/{id}`.
    pub async fn submit(&self, id: &str) {
        let url = format!("{}/{}", self.inner.descriptor.url, id);
        self.inner.run::<()>(&url, None).await;
    }

    pub fn loading(&self) -> bool {
        self.inner.loading()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
