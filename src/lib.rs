//! Client engine for the legacy ACME v1 protocol, the certificate-issuance API behind the first
//! generation of [Let's Encrypt](https://letsencrypt.org/).
//!
//! The engine covers the protocol proper: directory-based endpoint discovery, the replay-nonce
//! lifecycle, request signing (compact JWS, RS256), the
//! registration/authorization/challenge/issuance state transitions, and the polling loop used
//! while the server validates asynchronously. Reading key material or CSRs from disk, writing
//! certificates out, DNS record publication and CLI concerns all live in the calling driver.
//!
//! # Usage
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use acme::{challenge, Account, Client, DEFAULT_RETRY_AFTER};
//!
//! async fn issue(csr_der: &[u8]) -> acme::Result<Vec<u8>> {
//!     let account = Account::new(acme::create_rsa_key()?)?;
//!     let client = Client::new("https://acme-v01.api.example.org/directory", account);
//!
//!     let reg = client.register("foo@bar.com").await?;
//!     if let Some(terms) = reg.links.get("terms-of-service") {
//!         if reg.payload.needs_agreement(terms) {
//!             client.accept_terms(&reg.url, terms).await?;
//!         }
//!     }
//!
//!     let authz = client.authorize_domain("example.com").await?;
//!     let ch = challenge::select_dns_challenge(&authz.payload.challenges)?;
//!     let proof = challenge::DnsProof::compute(
//!         "example.com",
//!         ch,
//!         client.account().thumbprint(),
//!     );
//!
//!     // publish proof.record_value as a TXT record under proof.record_name,
//!     // then signal readiness; here we are ready immediately.
//!     client
//!         .submit_challenge_response_when(
//!             std::future::ready(()),
//!             &ch.uri,
//!             &ch._type,
//!             &proof.key_authorization,
//!         )
//!         .await?;
//!
//!     let authz = client
//!         .poll_authorization(&authz.url, DEFAULT_RETRY_AFTER, None)
//!         .await?;
//!     assert!(authz.payload.is_valid());
//!
//!     let issued = client.request_certificate(csr_der, None, None).await?;
//!     client.fetch_certificate(&issued.url).await
//! }
//! ```
//!
//! # Concurrency
//!
//! One [`Client`] drives one logical workflow; it owns its directory cache and nonce pool, so
//! concurrent domains want one client each. Sharing an [`Account`] between clients is fine, its
//! thumbprint and signing are pure computations.
//!
//! # Rate limits
//!
//! ACME providers rate-limit aggressively. Resist lowering the polling delay; use a staging
//! environment for development.

#![deny(rust_2018_idioms, nonstandard_style, future_incompatible)]

mod acc;
mod client;
mod dir;
mod error;
mod jws;
mod trans;
mod util;

pub mod api;
pub mod challenge;


pub use crate::{
    acc::{create_rsa_key, Account},
    client::{Client, Step, DEFAULT_RETRY_AFTER},
    error::{Error, Result},
    trans::Body,
};
