//! `aula-auth`: session layer of the Aula client.
//!
//! Credential storage and lifecycle, identity derivation (the token is
//! decoded, never verified), and route authorization decisions. The
//! [`SessionManager`] is built once at startup and passed by reference to
//! every consumer; there is no ambient global state.

pub mod gate;
pub mod identity;
pub mod session;
pub mod store;

pub use gate::{RouteDecision, resolve_pre_auth, resolve_protected};
pub use identity::{Identity, TokenClaims, decode};
pub use session::{Navigator, NullNavigator, SessionManager};
pub use store::{CredentialSlot, CredentialStore, FileSlot, MemorySlot};
