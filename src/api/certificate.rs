use serde::Serialize;
use time::{format_description::well_known::Rfc3339, Duration, OffsetDateTime};

use crate::{error::Result, util::base64url};

/// Payload requesting issuance against the `new-cert` resource.
#[derive(Debug, Clone, Serialize)]
pub struct NewCertificate {
    resource: &'static str,

    /// base64url-encoded DER CSR.
    csr: String,

    #[serde(rename = "notBefore")]
    not_before: String,

    #[serde(rename = "notAfter")]
    not_after: String,
}

impl NewCertificate {
    /// Validity bounds default to now / now + 90 days when unspecified.
    pub(crate) fn new(
        csr_der: &[u8],
        not_before: Option<OffsetDateTime>,
        not_after: Option<OffsetDateTime>,
    ) -> Result<Self> {
        let now = OffsetDateTime::now_utc();

        let not_before = not_before.unwrap_or(now);
        let not_after = not_after.unwrap_or(now + Duration::days(90));

        Ok(NewCertificate {
            resource: "new-cert",
            csr: base64url(csr_der),
            not_before: not_before.format(&Rfc3339)?,
            not_after: not_after.format(&Rfc3339)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn test_new_cert_payload() {
        let payload = NewCertificate::new(
            b"csr-der-bytes",
            Some(datetime!(2016-05-01 12:00:00 UTC)),
            Some(datetime!(2016-07-30 12:00:00 UTC)),
        )
        .unwrap();

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["resource"], "new-cert");
        assert_eq!(json["csr"], "Y3NyLWRlci1ieXRlcw");
        assert_eq!(json["notBefore"], "2016-05-01T12:00:00Z");
        assert_eq!(json["notAfter"], "2016-07-30T12:00:00Z");
    }

    #[test]
    fn test_default_validity_window() {
        let payload = NewCertificate::new(b"csr", None, None).unwrap();
        let json = serde_json::to_value(&payload).unwrap();

        let not_before =
            OffsetDateTime::parse(json["notBefore"].as_str().unwrap(), &Rfc3339).unwrap();
        let not_after =
            OffsetDateTime::parse(json["notAfter"].as_str().unwrap(), &Rfc3339).unwrap();

        assert_eq!(not_after - not_before, Duration::days(90));
    }
}
