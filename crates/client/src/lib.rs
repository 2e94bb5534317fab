//! `aula-client`: generic typed access to the Aula HTTP API.
//!
//! One transport core, four typed operation wrappers (read / create /
//! replace / remove), a keyed request cache that deduplicates concurrent
//! reads, and the notification sink the UI layer plugs into.

pub mod cache;
pub mod config;
pub mod notify;
pub mod resource;
pub mod transport;

pub use cache::{CacheKey, RequestCache};
pub use config::ClientConfig;
pub use notify::{Notification, NotificationSink, RecordingSink, TracingSink};
pub use resource::{
    CreateHandle, Descriptor, ReadHandle, RemoveHandle, ReplaceHandle, ResourceClient,
};
pub use transport::{CredentialSource, StaticCredential};
