//! The protocol engine: registration, authorization, challenge completion and issuance.

use std::{collections::HashMap, future::Future, sync::Arc, time::Duration};

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use time::OffsetDateTime;
use tokio::time::Instant;

use crate::{
    api,
    dir::DirectoryCache,
    error::{Error, Result},
    trans::{ApiResponse, Body, NoncePool, Transport, CONTENT_TYPE_PKIX},
    Account,
};

/// Wait between polls when a pending response carries no `Retry-After` hint.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(5);

/// Outcome of one protocol step, handed back to the driver.
///
/// The driver decides from `status` and `payload` whether to continue, prompt the user, or
/// abort; the engine itself only branches on the one documented conflict code.
#[derive(Debug, Clone)]
pub struct Step<T> {
    /// The resource's own URI: the response's `Location` header, or the request URI.
    pub url: String,

    pub status: StatusCode,

    /// Relation name to URI from the response's `Link` header (plus `self`).
    pub links: HashMap<String, String>,

    pub payload: T,
}

impl<T: DeserializeOwned> Step<T> {
    fn decode(res: ApiResponse) -> Result<Step<T>> {
        let payload = res.body.json()?;
        Ok(Step {
            url: self_link(&res),
            status: res.status,
            links: res.links,
            payload,
        })
    }
}

impl Step<Body> {
    fn raw(res: ApiResponse) -> Step<Body> {
        Step {
            url: self_link(&res),
            status: res.status,
            links: res.links,
            payload: res.body,
        }
    }
}

// transport always fills the self relation
fn self_link(res: &ApiResponse) -> String {
    res.links.get("self").cloned().unwrap_or_default()
}

/// Client for one ACME v1 server.
///
/// Owns its directory cache and nonce pool, so independent instances (e.g. one per target
/// server, or one per domain driven concurrently) never interfere. All operations suspend only
/// on network I/O and on the deliberate sleep inside [`poll_authorization`]; requests are
/// cancelled by dropping the returned future.
///
/// [`poll_authorization`]: Client::poll_authorization
#[derive(Debug)]
pub struct Client {
    trans: Transport,
    dir: DirectoryCache,
}

impl Client {
    /// Create an engine for the server whose directory lives at `dir_url`.
    ///
    /// The directory is not fetched until the first operation needs it.
    pub fn new(dir_url: &str, account: Account) -> Client {
        let http = reqwest::Client::new();
        let nonce_pool = Arc::new(NoncePool::new(dir_url));

        Client {
            trans: Transport::new(http, nonce_pool, account),
            dir: DirectoryCache::new(dir_url),
        }
    }

    /// The account this engine signs with.
    pub fn account(&self) -> &Account {
        self.trans.account()
    }

    /// Register the account with the server.
    ///
    /// Idempotent across repeated runs with the same key: on 409 the engine transparently
    /// re-fetches the existing registration by following the conflict's `self` link and returns
    /// it in place of a new one. Look for a `terms-of-service` relation in [`Step::links`] to
    /// decide whether [`accept_terms`](Client::accept_terms) is needed.
    pub async fn register(&self, email: &str) -> Result<Step<api::Registration>> {
        let url = self.dir.resolve(&self.trans, "new-reg").await?;

        let payload = api::NewRegistration::from_email(email);
        let res = self.trans.signed_post(&url, &payload, None).await?;

        if res.status == StatusCode::CONFLICT {
            let existing = self_link(&res);
            log::debug!("Already registered, fetching {existing}");
            return self.registration(&existing).await;
        }

        expect_status(&url, res, &[200, 201, 202]).and_then(Step::decode)
    }

    /// Re-fetch an existing registration resource.
    pub async fn registration(&self, url: &str) -> Result<Step<api::Registration>> {
        let res = self
            .trans
            .signed_post(url, &api::FetchRegistration::default(), None)
            .await?;

        expect_status(url, res, &[200, 202]).and_then(Step::decode)
    }

    /// Update the registration's `agreement` field to `terms_url`.
    ///
    /// Only call when the current agreement differs from the offered terms (see
    /// [`api::Registration::needs_agreement`]); an accepted agreement must not be re-submitted.
    pub async fn accept_terms(
        &self,
        registration_url: &str,
        terms_url: &str,
    ) -> Result<Step<api::Registration>> {
        let payload = api::UpdateAgreement::new(terms_url);
        let res = self
            .trans
            .signed_post(registration_url, &payload, None)
            .await?;

        expect_status(registration_url, res, &[200, 201, 202]).and_then(Step::decode)
    }

    /// Create an authorization for a DNS identifier, returning its challenge set.
    pub async fn authorize_domain(&self, domain: &str) -> Result<Step<api::Authorization>> {
        let url = self.dir.resolve(&self.trans, "new-authz").await?;

        let payload = api::NewAuthorization::dns(domain);
        let res = self.trans.signed_post(&url, &payload, None).await?;

        expect_status(&url, res, &[201]).and_then(Step::decode)
    }

    /// Tell the server to begin validating a challenge.
    ///
    /// The proof must be in place (for dns-01, the TXT record published and propagated) before
    /// this call; the server validates asynchronously, so follow up with
    /// [`poll_authorization`](Client::poll_authorization).
    pub async fn submit_challenge_response(
        &self,
        challenge_url: &str,
        challenge_type: &str,
        key_authorization: &str,
    ) -> Result<Step<api::Challenge>> {
        let payload = api::ChallengeResponse::new(challenge_type, key_authorization);
        let res = self.trans.signed_post(challenge_url, &payload, None).await?;

        expect_status(challenge_url, res, &[202]).and_then(Step::decode)
    }

    /// Wait for a caller-supplied readiness signal, then submit the challenge response.
    ///
    /// The signal is how an external collaborator (the thing that publishes the TXT record and
    /// watches propagation) tells the engine it may proceed.
    pub async fn submit_challenge_response_when<F>(
        &self,
        ready: F,
        challenge_url: &str,
        challenge_type: &str,
        key_authorization: &str,
    ) -> Result<Step<api::Challenge>>
    where
        F: Future<Output = ()>,
    {
        ready.await;
        self.submit_challenge_response(challenge_url, challenge_type, key_authorization)
            .await
    }

    /// Poll an authorization until it leaves the pending state.
    ///
    /// Re-GETs `authz_url` for as long as the server answers 202 with a `pending` payload,
    /// sleeping for the response's `Retry-After` or `default_retry` between attempts. The loop
    /// is unbounded by design (the protocol gives no maximum-attempts signal); pass a
    /// `deadline` to get [`Error::Cancelled`] instead of polling forever. Terminal statuses are
    /// returned as-is, the caller decides success or failure from the payload.
    pub async fn poll_authorization(
        &self,
        authz_url: &str,
        default_retry: Duration,
        deadline: Option<Instant>,
    ) -> Result<Step<api::Authorization>> {
        loop {
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    return Err(Error::Cancelled);
                }
            }

            let res = self.trans.get(authz_url, None).await?;
            let retry_after = res.retry_after;
            let step = Step::<api::Authorization>::decode(res)?;

            if step.status != StatusCode::ACCEPTED || !step.payload.is_pending() {
                return Ok(step);
            }

            let mut wait = retry_after.unwrap_or(default_retry);
            if let Some(deadline) = deadline {
                wait = wait.min(deadline.saturating_duration_since(Instant::now()));
            }

            log::debug!("Authorization pending, retry in {wait:?}");
            tokio::time::sleep(wait).await;
        }
    }

    /// Request issuance for a DER-encoded CSR.
    ///
    /// Validity bounds default to now / now + 90 days. On success (200/201) the returned step's
    /// `url` is where the certificate can be (re-)fetched and the payload holds the decoded
    /// body, certificate bytes or a JSON document depending on what the server sent. Any other
    /// status is a hard failure carrying the decoded problem body.
    pub async fn request_certificate(
        &self,
        csr_der: &[u8],
        not_before: Option<OffsetDateTime>,
        not_after: Option<OffsetDateTime>,
    ) -> Result<Step<Body>> {
        let url = self.dir.resolve(&self.trans, "new-cert").await?;

        let payload = api::NewCertificate::new(csr_der, not_before, not_after)?;
        let res = self
            .trans
            .signed_post(&url, &payload, Some(CONTENT_TYPE_PKIX))
            .await?;

        expect_status(&url, res, &[200, 201]).map(Step::raw)
    }

    /// Download an issued certificate as DER bytes.
    pub async fn fetch_certificate(&self, cert_url: &str) -> Result<Vec<u8>> {
        let res = self.trans.get(cert_url, Some(CONTENT_TYPE_PKIX)).await?;
        let res = expect_status(cert_url, res, &[200])?;

        match res.body {
            Body::Cert(der) => Ok(der),
            other => Err(Error::Protocol {
                url: cert_url.to_owned(),
                status: res.status,
                body: Box::new(other),
            }),
        }
    }
}

fn expect_status(url: &str, res: ApiResponse, expected: &[u16]) -> Result<ApiResponse> {
    if expected.contains(&res.status.as_u16()) {
        Ok(res)
    } else {
        Err(Error::Protocol {
            url: url.to_owned(),
            status: res.status,
            body: Box::new(res.body),
        })
    }
}
