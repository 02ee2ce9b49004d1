//! One HTTPS exchange against the ACME API, plus the replay-nonce pool.

use std::{
    collections::{HashMap, VecDeque},
    fmt,
    sync::Arc,
    time::Duration,
};

use parking_lot::Mutex;
use reqwest::{header, StatusCode};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    acc::Account,
    error::{Error, Result},
};

/// Media type of signed request bodies.
pub(crate) const CONTENT_TYPE_JOSE: &str = "application/jose+json";

/// Media type of DER certificates, sent as `Accept` on issuance and retrieval.
pub(crate) const CONTENT_TYPE_PKIX: &str = "application/pkix-cert";

const REPLAY_NONCE: &str = "replay-nonce";

/// Response body decoded according to the response's content type.
///
/// The issuance endpoint may answer with either a JSON problem/pending document or raw
/// certificate bytes depending on status, so callers pattern-match the expected cases instead of
/// guessing at an untyped value.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Any `*+json` or `application/json` response.
    Json(serde_json::Value),

    /// An `application/pkix-cert` response: DER certificate bytes.
    Cert(Vec<u8>),

    /// Anything else, kept as text.
    Text(String),
}

impl Body {
    /// Deserialize a JSON body into `T`.
    ///
    /// Fails when the response was not JSON to begin with.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        match self {
            Body::Json(value) => Ok(serde_json::from_value(value.clone())?),
            other => {
                use serde::de::Error as _;
                Err(serde_json::Error::custom(format!("expected JSON body, got {other}")).into())
            }
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Json(value) => write!(f, "{value}"),
            Body::Cert(der) => write!(f, "<{} bytes of certificate>", der.len()),
            Body::Text(text) => f.write_str(text),
        }
    }
}

/// Everything the engine needs out of a single response.
#[derive(Debug, Clone)]
pub(crate) struct ApiResponse {
    pub status: StatusCode,

    /// Relation name to URI, from the `Link` header, plus a synthetic `self` relation taken from
    /// `Location` or the request URI.
    pub links: HashMap<String, String>,

    /// Parsed integer seconds from `Retry-After`, if present.
    pub retry_after: Option<Duration>,

    pub body: Body,
}

/// Signed request handling against the API.
///
/// Performs exactly one exchange per call; transport-level failures surface as
/// [`Error::Network`] without retry.
#[derive(Debug, Clone)]
pub(crate) struct Transport {
    http: reqwest::Client,
    nonce_pool: Arc<NoncePool>,
    account: Account,
}

impl Transport {
    pub fn new(http: reqwest::Client, nonce_pool: Arc<NoncePool>, account: Account) -> Self {
        Transport {
            http,
            nonce_pool,
            account,
        }
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    /// POST a signed payload to `url`.
    ///
    /// Takes one nonce from the pool and never reuses it: even if the exchange fails, the server
    /// already consumed the nonce when it parsed the request.
    pub async fn signed_post<T: Serialize + ?Sized>(
        &self,
        url: &str,
        payload: &T,
        accept: Option<&str>,
    ) -> Result<ApiResponse> {
        let nonce = self.nonce_pool.take(&self.http).await?;
        let body = self.account.sign(payload, nonce)?;

        log::debug!("POST {url}");

        let mut req = self
            .http
            .post(url)
            .header(header::CONTENT_TYPE, CONTENT_TYPE_JOSE)
            .body(body);

        if let Some(accept) = accept {
            req = req.header(header::ACCEPT, accept);
        }

        let res = req.send().await?;
        self.convert(url, res).await
    }

    /// Plain GET, no signing.
    pub async fn get(&self, url: &str, accept: Option<&str>) -> Result<ApiResponse> {
        log::debug!("GET {url}");

        let mut req = self.http.get(url);

        if let Some(accept) = accept {
            req = req.header(header::ACCEPT, accept);
        }

        let res = req.send().await?;
        self.convert(url, res).await
    }

    /// Extract nonce, links, retry hint and the decoded body from a response.
    ///
    /// Runs for failed responses too, so their nonces are not wasted.
    async fn convert(&self, request_url: &str, res: reqwest::Response) -> Result<ApiResponse> {
        self.nonce_pool.extract_nonce(&res);

        let status = res.status();

        let mut links = HashMap::new();
        for value in res.headers().get_all(header::LINK) {
            if let Ok(value) = value.to_str() {
                parse_link_header(value, &mut links);
            }
        }

        let self_link = res
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(request_url)
            .to_owned();
        links.insert("self".to_owned(), self_link);

        let retry_after = res
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs);

        let content_type = res
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_owned();

        let body = if content_type.starts_with(CONTENT_TYPE_PKIX) {
            Body::Cert(res.bytes().await?.to_vec())
        } else {
            let text = res.text().await?;
            let mime = content_type.split(';').next().unwrap_or("").trim();

            if mime == "application/json" || mime.ends_with("+json") {
                match serde_json::from_str(&text) {
                    Ok(value) => Body::Json(value),
                    // servers occasionally mislabel plain bodies
                    Err(_) => Body::Text(text),
                }
            } else {
                Body::Text(text)
            }
        };

        Ok(ApiResponse {
            status,
            links,
            retry_after,
            body,
        })
    }
}

/// Parse a `Link` header value (`<uri>; rel="name", ...`) into the relation map.
fn parse_link_header(value: &str, links: &mut HashMap<String, String>) {
    for part in value.split(',') {
        let part = part.trim();

        let Some(rest) = part.strip_prefix('<') else {
            continue;
        };
        let Some((url, params)) = rest.split_once('>') else {
            continue;
        };

        for param in params.split(';') {
            if let Some(rel) = param.trim().strip_prefix("rel=") {
                links.insert(rel.trim_matches('"').to_owned(), url.to_owned());
            }
        }
    }
}

/// Process-local cache of unused replay nonces.
///
/// Every signed request consumes exactly one nonce; every response's `Replay-Nonce` header is
/// offered back. Consumption is FIFO, which is fine since any unused server-issued nonce stays
/// valid until spent. Scoped to one engine instance: concurrent engines get their own pools.
#[derive(Debug)]
pub(crate) struct NoncePool {
    nonce_url: String,
    pool: Mutex<VecDeque<String>>,
}

impl NoncePool {
    /// `nonce_url` is the directory root; a HEAD against it yields a fresh nonce.
    pub fn new(nonce_url: &str) -> Self {
        NoncePool {
            nonce_url: nonce_url.to_owned(),
            pool: Mutex::new(VecDeque::new()),
        }
    }

    /// Push a freshly observed nonce.
    pub fn offer(&self, nonce: &str) {
        if nonce.is_empty() {
            return;
        }

        log::trace!("Offering nonce to pool");

        let mut pool = self.pool.lock();
        pool.push_back(nonce.to_owned());

        if pool.len() > 10 {
            pool.pop_front();
        }
    }

    fn extract_nonce(&self, res: &reqwest::Response) {
        if let Some(nonce) = res.headers().get(REPLAY_NONCE) {
            if let Ok(nonce) = nonce.to_str() {
                self.offer(nonce);
            }
        }
    }

    /// Take the oldest unused nonce, fetching a fresh one when the pool is empty.
    pub async fn take(&self, http: &reqwest::Client) -> Result<String> {
        {
            let mut pool = self.pool.lock();

            if let Some(nonce) = pool.pop_front() {
                log::trace!("Use pooled nonce");
                return Ok(nonce);
            }
        }

        log::debug!("Request new nonce");
        let res = http.head(&self.nonce_url).send().await?;

        res.headers()
            .get(REPLAY_NONCE)
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned)
            .ok_or(Error::MissingNonce)
    }
}
