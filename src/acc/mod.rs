use serde::Serialize;
use zeroize::Zeroizing;

use crate::{
    error::Result,
    jws::{jws_compact, Jwk, JwsProtectedHeader},
};

mod acme_key;

pub use self::acme_key::create_rsa_key;
pub(crate) use self::acme_key::AcmeKey;

/// The ACME account: an RSA key pair plus its JWK form and thumbprint.
///
/// Immutable once constructed. Signing requests and computing the dns-01 proof both go through
/// this type, so one account drives any number of [`Client`](crate::Client) instances safely.
///
/// The key uses the RS256 signature scheme, the only algorithm the v1 API generation accepted
/// from every CA.
#[derive(Debug, Clone)]
pub struct Account {
    key: AcmeKey,
    jwk: Jwk,
    thumbprint: String,
}

impl Account {
    /// Create an account from an RSA private key.
    ///
    /// See [`create_rsa_key()`] for making a new key.
    pub fn new(private_key: rsa::RsaPrivateKey) -> Result<Account> {
        Self::from_key(AcmeKey::from_key(private_key))
    }

    /// Create an account from a PKCS#8 PEM encoded RSA private key.
    pub fn from_pem(private_key_pem: &str) -> Result<Account> {
        Self::from_key(AcmeKey::from_pem(private_key_pem)?)
    }

    fn from_key(key: AcmeKey) -> Result<Account> {
        let jwk = Jwk::from(&key);
        let thumbprint = jwk.thumbprint()?;

        Ok(Account {
            key,
            jwk,
            thumbprint,
        })
    }

    /// The account private key as PKCS#8 PEM.
    pub fn private_key_pem(&self) -> Result<Zeroizing<String>> {
        self.key.to_pem()
    }

    /// The base64url SHA-256 thumbprint of the account's public JWK.
    ///
    /// Stable for the lifetime of the key. Every challenge proof is derived from it.
    pub fn thumbprint(&self) -> &str {
        &self.thumbprint
    }

    /// Sign `payload` into a compact JWS carrying the JWK and `nonce` in the protected header.
    pub(crate) fn sign<T: Serialize + ?Sized>(&self, payload: &T, nonce: String) -> Result<String> {
        let protected = JwsProtectedHeader::new(self.jwk.clone(), nonce);
        jws_compact(protected, &self.key, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_account() -> Account {
        // small key to keep test key generation fast; real accounts use create_rsa_key()
        let key = rsa::RsaPrivateKey::new(&mut rand::thread_rng(), 512).unwrap();
        Account::new(key).unwrap()
    }

    #[test]
    fn test_sign_produces_compact_jws() {
        let acc = test_account();
        let jws = acc
            .sign(
                &serde_json::json!({ "resource": "new-reg" }),
                "nonce-1".to_owned(),
            )
            .unwrap();

        let parts = jws.split('.').collect::<Vec<_>>();
        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(|p| !p.is_empty()));
    }

    #[test]
    fn test_thumbprint_stable() {
        let acc = test_account();
        assert_eq!(acc.thumbprint(), acc.thumbprint());
        assert!(!acc.thumbprint().contains('='));
    }
}
