//! Identity derivation from a bearer credential.
//!
//! The client decodes the token payload but performs no signature or expiry
//! check; trust in the claims is delegated to the issuing backend and the
//! transport. A token that fails to decode is treated as "no session",
//! never as an error.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use aula_core::Role;

/// Claims payload carried in the credential (JWT compact form, middle
/// segment).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the account email.
    pub sub: String,

    /// Display name.
    pub name: String,

    /// Granted roles. Only the first entry becomes the effective role;
    /// multi-role tokens are deliberately collapsed.
    pub roles: Vec<String>,

    #[serde(with = "chrono::serde::ts_seconds")]
    pub iat: DateTime<Utc>,

    #[serde(with = "chrono::serde::ts_seconds")]
    pub exp: DateTime<Utc>,
}

/// Decoded, locally-trusted view of who the current credential represents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,

    /// Subject claim (the account email).
    pub subject: String,

    /// Effective role: the first entry of the roles claim.
    pub role: Role,

    /// Always true for a decoded identity; malformed tokens yield `None`
    /// from [`decode`] instead of an invalid identity.
    pub valid: bool,
}

/// Decode a bearer token into an [`Identity`].
///
/// Deterministic and free of I/O. Returns `None` for the empty string and
/// for any structurally malformed payload (wrong segment count, bad base64,
/// bad JSON, empty roles list).
pub fn decode(token: &str) -> Option<Identity> {
    if token.is_empty() {
        return None;
    }
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claims: TokenClaims = serde_json::from_slice(&bytes).ok()?;
    let role = claims.roles.first()?.clone();
    Some(Identity {
        name: claims.name,
        subject: claims.sub,
        role: Role::new(role),
        valid: true,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use jsonwebtoken::{EncodingKey, Header};
    use proptest::prelude::*;

    use super::*;

    fn mint(name: &str, sub: &str, roles: &[&str]) -> String {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: sub.to_string(),
            name: name.to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            iat: now,
            exp: now + Duration::minutes(10),
        };
        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .expect("failed to encode jwt")
    }

    #[test]
    fn empty_token_is_no_session() {
        assert_eq!(decode(""), None);
    }

    #[test]
    fn decodes_name_subject_and_first_role() {
        let token = mint("Alice Smith", "alice@example.com", &["TEACHER", "STUDENT"]);
        let identity = decode(&token).unwrap();

        assert_eq!(identity.name, "Alice Smith");
        assert_eq!(identity.subject, "alice@example.com");
        assert_eq!(identity.role, Role::new("TEACHER"));
        assert!(identity.valid);
    }

    #[test]
    fn empty_roles_list_is_malformed() {
        let token = mint("Bob", "bob@example.com", &[]);
        assert_eq!(decode(&token), None);
    }

    #[test]
    fn structurally_broken_tokens_decode_to_none() {
        assert_eq!(decode("no-dots-here"), None);
        assert_eq!(decode("a.$$$not-base64$$$.c"), None);

        let not_json = URL_SAFE_NO_PAD.encode(b"plainly not json");
        assert_eq!(decode(&format!("h.{not_json}.s")), None);
    }

    #[test]
    fn decoding_is_deterministic() {
        let token = mint("Carol", "carol@example.com", &["STUDENT"]);
        assert_eq!(decode(&token), decode(&token));
    }

    proptest! {
        #[test]
        fn decode_never_panics(token in ".*") {
            let _ = decode(&token);
        }
    }
}
