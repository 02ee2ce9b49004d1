use serde::{Deserialize, Serialize};

/// Payload for registering a new account against the `new-reg` resource.
#[derive(Debug, Clone, Serialize)]
pub struct NewRegistration {
    resource: &'static str,
    contact: Vec<String>,
}

impl NewRegistration {
    pub(crate) fn from_email(email: &str) -> Self {
        NewRegistration {
            resource: "new-reg",
            contact: vec![format!("mailto:{email}")],
        }
    }
}

/// Payload for re-fetching an existing registration by POSTing to its URI.
#[derive(Debug, Clone, Serialize)]
pub struct FetchRegistration {
    resource: &'static str,
}

impl Default for FetchRegistration {
    fn default() -> Self {
        FetchRegistration { resource: "reg" }
    }
}

/// Payload updating a registration's `agreement` field to a terms-of-service URI.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateAgreement {
    resource: &'static str,
    agreement: String,
}

impl UpdateAgreement {
    pub(crate) fn new(terms_url: &str) -> Self {
        UpdateAgreement {
            resource: "reg",
            agreement: terms_url.to_owned(),
        }
    }
}

/// The server-side account resource.
///
/// # Example JSON
///
/// ```json
/// {
///   "id": 12345,
///   "key": { "e": "AQAB", "kty": "RSA", "n": "..." },
///   "contact": ["mailto:foo@bar.com"],
///   "agreement": "https://example.com/acme/terms",
///   "initialIp": "203.0.113.9",
///   "createdAt": "2016-05-01T12:00:00Z"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub id: Option<u64>,

    /// Public JWK the registration is bound to.
    pub key: Option<serde_json::Value>,

    pub contact: Option<Vec<String>>,

    /// The terms-of-service URI the account has accepted, if any.
    ///
    /// Compare against the `terms-of-service` relation link before calling
    /// [`Client::accept_terms`](crate::Client::accept_terms); an already accepted agreement must
    /// not be re-submitted.
    pub agreement: Option<String>,
}

impl Registration {
    /// Whether `terms_url` still needs accepting.
    pub fn needs_agreement(&self, terms_url: &str) -> bool {
        self.agreement.as_deref() != Some(terms_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_agreement() {
        let mut reg = Registration::default();
        assert!(reg.needs_agreement("https://example.com/terms"));

        reg.agreement = Some("https://example.com/terms".to_owned());
        assert!(!reg.needs_agreement("https://example.com/terms"));
        assert!(reg.needs_agreement("https://example.com/terms-v2"));
    }
}
