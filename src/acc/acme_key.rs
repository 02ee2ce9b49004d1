use std::fmt;

use pkcs8::{DecodePrivateKey as _, EncodePrivateKey as _};
use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// Make a 2048-bit RSA private key (from which we can derive a public key).
pub fn create_rsa_key() -> Result<rsa::RsaPrivateKey> {
    let csprng = &mut rand::thread_rng();
    rsa::RsaPrivateKey::new(csprng, 2048).map_err(|err| Error::Signing(err.to_string()))
}

/// The RSA account key used to sign every request.
#[derive(Clone)]
pub(crate) struct AcmeKey {
    private_key: rsa::RsaPrivateKey,
}

impl AcmeKey {
    pub(crate) fn from_key(private_key: rsa::RsaPrivateKey) -> AcmeKey {
        AcmeKey { private_key }
    }

    pub(crate) fn from_pem(pem: &str) -> Result<AcmeKey> {
        let private_key = rsa::RsaPrivateKey::from_pkcs8_pem(pem)
            .map_err(|err| Error::Signing(format!("failed to read PEM: {err}")))?;
        Ok(Self::from_key(private_key))
    }

    pub(crate) fn to_pem(&self) -> Result<Zeroizing<String>> {
        self.private_key
            .to_pkcs8_pem(pkcs8::LineEnding::LF)
            .map_err(|err| Error::Signing(err.to_string()))
    }

    pub(crate) fn private_key(&self) -> &rsa::RsaPrivateKey {
        &self.private_key
    }

    pub(crate) fn public_key(&self) -> rsa::RsaPublicKey {
        self.private_key.to_public_key()
    }
}

impl fmt::Debug for AcmeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AcmeKey").finish_non_exhaustive()
    }
}
