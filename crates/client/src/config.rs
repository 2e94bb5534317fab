//! Client configuration.

/// Where the Aula backend lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    /// Read the base URL from `AULA_API_URL`, falling back to the local
    /// development default.
    pub fn from_env() -> Self {
        let base_url = std::env::var("AULA_API_URL").unwrap_or_else(|_| {
            tracing::warn!("AULA_API_URL not set; using local dev default");
            "http://127.0.0.1:8080".to_string()
        });
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path (`path` must start with `/`).
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
