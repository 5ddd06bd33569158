// HTTP client construction for NetBox.
//
// Certificate policy and request timeout are decided by configuration;
// the client module only adds its own default headers.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::header::HeaderMap;

use crate::error::Error;

const USER_AGENT: &str = concat!("vlansync/", env!("CARGO_PKG_VERSION"));

/// How the NetBox server certificate is checked.
#[derive(Debug, Clone)]
pub enum TlsMode {
    /// Platform roots.
    System,
    /// Trust an extra PEM bundle, e.g. an internal CA.
    CustomCa(PathBuf),
    /// No verification. `NETBOX_CERT_VERIFY=false`.
    DangerAcceptInvalid,
}

#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    /// Whole-request timeout, connect included.
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// A `reqwest::Client` that sends `headers` on every request.
    pub fn http_client(&self, headers: HeaderMap) -> Result<reqwest::Client, Error> {
        let builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(self.timeout)
            .default_headers(headers);

        let builder = match &self.tls {
            TlsMode::System => builder,
            TlsMode::CustomCa(path) => builder.add_root_certificate(load_ca(path)?),
            TlsMode::DangerAcceptInvalid => builder.danger_accept_invalid_certs(true),
        };

        builder
            .build()
            .map_err(|e| Error::Tls(format!("cannot build HTTP client: {e}")))
    }
}

fn load_ca(path: &Path) -> Result<reqwest::Certificate, Error> {
    let pem = std::fs::read(path)
        .map_err(|e| Error::Tls(format!("cannot read {}: {e}", path.display())))?;
    reqwest::Certificate::from_pem(&pem)
        .map_err(|e| Error::Tls(format!("{} is not a PEM certificate: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_ca_bundle_fails_early() {
        let config = TransportConfig {
            tls: TlsMode::CustomCa(PathBuf::from("/nonexistent/vlansync-ca.pem")),
            timeout: Duration::from_secs(5),
        };
        let err = config.http_client(HeaderMap::new()).err();
        assert!(matches!(err, Some(Error::Tls(ref m)) if m.contains("vlansync-ca.pem")), "got {err:?}");
    }

    #[test]
    fn verification_can_be_disabled() {
        let config = TransportConfig {
            tls: TlsMode::DangerAcceptInvalid,
            ..TransportConfig::default()
        };
        assert!(config.http_client(HeaderMap::new()).is_ok());
    }
}
