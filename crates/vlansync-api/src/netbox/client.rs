// NetBox HTTP client
//
// Wraps `reqwest::Client` with token auth, URL construction, status
// mapping, and `next`-link pagination. Endpoint groups (devices, ...)
// are inherent methods in sibling files.

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::netbox::models::Paginated;
use crate::transport::TransportConfig;

/// Upper bound on followed `next` links, guards against a looping API.
const MAX_PAGES: usize = 1000;

/// Raw HTTP client for the NetBox REST API.
///
/// Every request carries `Authorization: Token <token>`. List endpoints
/// are fully drained by following the `next` link, so callers always
/// receive the complete result set.
pub struct NetboxClient {
    http: reqwest::Client,
    base_url: Url,
    page_size: u32,
}

impl NetboxClient {
    /// Create a client authenticated with a NetBox API token.
    ///
    /// `base_url` is the NetBox root (e.g. `https://netbox.example.com`),
    /// without the `/api` suffix.
    pub fn new(
        base_url: Url,
        token: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Token {}", token.expose_secret()))
            .map_err(|e| Error::InvalidToken(e.to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = transport.http_client(headers)?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            page_size: 250,
        }
    }

    /// Override the `limit` sent on list requests.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// The NetBox base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn page_size(&self) -> u32 {
        self.page_size
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/api/{path}`. `path` keeps its trailing slash since
    /// NetBox redirects slash-less list URLs.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let full = format!("{base}/api/{}", path.trim_start_matches('/'));
        Ok(Url::parse(&full)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// GET a single page of a list endpoint.
    pub(crate) async fn get_page<T: DeserializeOwned>(
        &self,
        url: Url,
    ) -> Result<Paginated<T>, Error> {
        debug!("GET {}", url);
        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        Self::parse_json(resp).await
    }

    /// GET every page of a list endpoint, starting at `url`.
    pub(crate) async fn get_all<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, Error> {
        let mut results = Vec::new();
        let mut next = Some(url);
        let mut pages = 0;

        while let Some(url) = next.take() {
            let page: Paginated<T> = self.get_page(url.clone()).await?;
            results.extend(page.results);
            pages += 1;

            if let Some(link) = page.next {
                let link = Url::parse(&link)?;
                if link == url || pages >= MAX_PAGES {
                    trace!(pages, "stopping pagination");
                    break;
                }
                next = Some(link);
            }
        }

        Ok(results)
    }

    async fn parse_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("HTTP {status}: {}", preview(&body)),
            });
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message: preview(&body).to_owned(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body: body.clone(),
        })
    }
}

fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
