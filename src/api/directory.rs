use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The server's map from logical resource name to endpoint URI.
///
/// # Example JSON
///
/// ```json
/// {
///   "new-authz": "https://example.com/acme/new-authz",
///   "new-cert": "https://example.com/acme/new-cert",
///   "new-reg": "https://example.com/acme/new-reg",
///   "revoke-cert": "https://example.com/acme/revoke-cert"
/// }
/// ```
///
/// Servers are free to advertise additional resource names, and some nest non-string values (a
/// `meta` object), so this keeps the raw values and exposes only string-valued entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resources(BTreeMap<String, serde_json::Value>);

impl Resources {
    /// Endpoint URI for `resource`, if the server advertises one.
    pub fn endpoint(&self, resource: &str) -> Option<&str> {
        self.0.get(resource).and_then(|value| value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_non_string_entries() {
        let resources = serde_json::from_str::<Resources>(
            r#"{
                "new-reg": "https://example.com/acme/new-reg",
                "meta": { "terms-of-service": "https://example.com/terms" }
            }"#,
        )
        .unwrap();

        assert_eq!(
            resources.endpoint("new-reg"),
            Some("https://example.com/acme/new-reg")
        );
        assert_eq!(resources.endpoint("meta"), None);
        assert_eq!(resources.endpoint("new-authz"), None);
    }
}
