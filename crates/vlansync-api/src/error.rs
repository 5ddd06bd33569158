use thiserror::Error;

/// Everything that can go wrong talking to NetBox.
///
/// `vlansync-core` folds these into its inventory error taxonomy; only the
/// auth/transient split matters past that boundary.
#[derive(Debug, Error)]
pub enum Error {
    // ── Credentials ─────────────────────────────────────────────────
    /// NetBox answered 401 or 403.
    #[error("NetBox rejected the API token: {message}")]
    Authentication { message: String },

    /// The token contains bytes that cannot go into a header.
    #[error("API token is not a valid header value: {0}")]
    InvalidToken(String),

    // ── Connection ──────────────────────────────────────────────────
    #[error("request to NetBox failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("bad NetBox URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// CA bundle unreadable, or the client could not be built with it.
    #[error("TLS setup failed: {0}")]
    Tls(String),

    // ── Responses ───────────────────────────────────────────────────
    #[error("NetBox API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Body was not the JSON shape we expected. `body` keeps the raw text.
    #[error("unexpected NetBox response: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::InvalidToken(_))
    }

    /// Timeouts, refused connections, 5xx and 429. A later event may
    /// succeed where this one failed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_connect() || e.is_timeout(),
            Self::Api { status, .. } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }
}
