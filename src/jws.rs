//! Compact JWS construction for signed ACME requests.
//!
//! ACME v1 servers expect every POST body to be a compact JWS signed with the account key, with
//! the public JWK and a fresh replay nonce carried in the protected header.

use rsa::{
    pkcs1v15::SigningKey,
    signature::{SignatureEncoding as _, Signer as _},
    traits::PublicKeyParts as _,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

use crate::{
    acc::AcmeKey,
    error::{Error, Result},
    util::base64url,
};

/// Protected header of a signed request.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct JwsProtectedHeader {
    alg: String,
    nonce: String,
    jwk: Jwk,
}

impl JwsProtectedHeader {
    pub(crate) fn new(jwk: Jwk, nonce: String) -> Self {
        JwsProtectedHeader {
            alg: "RS256".to_owned(),
            nonce,
            jwk,
        }
    }
}

/// Public RSA key as a JWK.
#[derive(Debug, Serialize, Deserialize, Clone)]
// LEXICAL ORDER OF FIELDS MATTER! The thumbprint is the hash of this exact serialization, and
// every dns-01 proof is derived from the thumbprint.
pub(crate) struct Jwk {
    e: String,
    kty: String,
    n: String,
}

impl From<&AcmeKey> for Jwk {
    fn from(key: &AcmeKey) -> Self {
        let public = key.public_key();

        Jwk {
            e: base64url(&public.e().to_bytes_be()),
            kty: "RSA".to_owned(),
            n: base64url(&public.n().to_bytes_be()),
        }
    }
}

impl Jwk {
    /// Thumbprint per [RFC 7638]: base64url of the SHA-256 of the ordered JWK JSON.
    ///
    /// [RFC 7638]: https://datatracker.ietf.org/doc/html/rfc7638
    pub(crate) fn thumbprint(&self) -> Result<String> {
        let jwk_json = serde_json::to_string(self)?;
        Ok(base64url(&Sha256::digest(jwk_json)))
    }
}

/// Construct a compact JWS (`header.payload.signature`) according to [RFC 7515 §7.1].
///
/// [RFC 7515 §7.1]: https://datatracker.ietf.org/doc/html/rfc7515#section-7.1
pub(crate) fn jws_compact<T: Serialize + ?Sized>(
    protected: JwsProtectedHeader,
    key: &AcmeKey,
    payload: &T,
) -> Result<String> {
    let header = {
        let pro_json = serde_json::to_string(&protected)?;
        base64url(&pro_json)
    };

    let payload = {
        let payload_json = serde_json::to_string(payload)?;
        base64url(&payload_json)
    };

    let to_sign = format!("{header}.{payload}");

    let signing_key = SigningKey::<Sha256>::new(key.private_key().clone());
    let signature = signing_key
        .try_sign(to_sign.as_bytes())
        .map_err(|err| Error::Signing(err.to_string()))?;

    let signature = base64url(&signature.to_bytes());

    Ok(format!("{to_sign}.{signature}"))
}
