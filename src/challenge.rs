//! Challenge negotiation and the dns-01 proof computation.
//!
//! The engine only executes the dns-01 flow. Selection picks the dns-01 descriptor out of the
//! server's offer; the proof functions are pure and must reproduce bit-identical output for the
//! same token/thumbprint pair, since the value ends up in a world-visible TXT record.

use sha2::{Digest as _, Sha256};

use crate::{
    api,
    error::{Error, Result},
    util::base64url,
};

/// The one challenge type this engine can satisfy.
pub const DNS_CHALLENGE_TYPE: &str = "dns-01";

/// Pick the dns-01 challenge from a server-offered set.
///
/// Fails with [`Error::UnsupportedChallenge`] listing the offered types when none matches.
pub fn select_dns_challenge(challenges: &[api::Challenge]) -> Result<&api::Challenge> {
    challenges
        .iter()
        .find(|c| c._type == DNS_CHALLENGE_TYPE)
        .ok_or_else(|| Error::UnsupportedChallenge {
            offered: challenges.iter().map(|c| c._type.clone()).collect(),
        })
}

/// Key authorization: `token + "." + thumbprint`.
pub fn key_authorization(token: &str, thumbprint: &str) -> String {
    format!("{token}.{thumbprint}")
}

/// TXT record value to publish: base64url of the SHA-256 of the key authorization.
pub fn dns_txt_value(key_authorization: &str) -> String {
    base64url(&Sha256::digest(key_authorization))
}

/// Hostname the TXT record goes under: `_acme-challenge.<domain>`.
pub fn dns_record_name(domain: &str) -> String {
    format!("_acme-challenge.{domain}")
}

/// The complete record a caller must publish to satisfy a dns-01 challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsProof {
    /// Record hostname, `_acme-challenge.<domain>`.
    pub record_name: String,

    /// TXT record value.
    pub record_value: String,

    /// The key authorization submitted back to the server with the challenge response.
    pub key_authorization: String,
}

impl DnsProof {
    /// Compute the proof for `challenge` on `domain` with an account `thumbprint`.
    pub fn compute(domain: &str, challenge: &api::Challenge, thumbprint: &str) -> DnsProof {
        let key_authorization = key_authorization(&challenge.token, thumbprint);

        DnsProof {
            record_name: dns_record_name(domain),
            record_value: dns_txt_value(&key_authorization),
            key_authorization,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ChallengeStatus;

    fn challenge(_type: &str, token: &str) -> api::Challenge {
        api::Challenge {
            _type: _type.to_owned(),
            status: ChallengeStatus::Pending,
            uri: format!("https://example.com/acme/challenge/{token}"),
            token: token.to_owned(),
            key_authorization: None,
            error: None,
        }
    }

    #[test]
    fn test_txt_value_pinned_vector() {
        // sha256("abc.XYZ"), computed once and pinned
        let key_auth = key_authorization("abc", "XYZ");
        assert_eq!(key_auth, "abc.XYZ");
        assert_eq!(
            dns_txt_value(&key_auth),
            "r_si5DTP5_e2ob3_mMI_LbARtP4YVVs2G55Q12_6FS4"
        );
    }

    #[test]
    fn test_txt_value_deterministic() {
        let a = dns_txt_value("tok.thumb");
        let b = dns_txt_value("tok.thumb");
        assert_eq!(a, b);
        assert_ne!(a, dns_txt_value("tok.thumb2"));
    }

    #[test]
    fn test_record_name() {
        assert_eq!(dns_record_name("example.com"), "_acme-challenge.example.com");
    }

    #[test]
    fn test_select_dns_challenge() {
        let offered = [challenge("http-01", "a"), challenge("dns-01", "b")];
        let selected = select_dns_challenge(&offered).unwrap();
        assert_eq!(selected.token, "b");
    }

    #[test]
    fn test_select_reports_offered_types() {
        let offered = [challenge("http-01", "a"), challenge("tls-alpn-01", "b")];
        let err = select_dns_challenge(&offered).unwrap_err();

        match err {
            Error::UnsupportedChallenge { offered } => {
                assert_eq!(offered, vec!["http-01", "tls-alpn-01"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_proof_compute() {
        let ch = challenge("dns-01", "abc");
        let proof = DnsProof::compute("example.com", &ch, "XYZ");

        assert_eq!(proof.record_name, "_acme-challenge.example.com");
        assert_eq!(proof.key_authorization, "abc.XYZ");
        assert_eq!(
            proof.record_value,
            "r_si5DTP5_e2ob3_mMI_LbARtP4YVVs2G55Q12_6FS4"
        );
    }
}
