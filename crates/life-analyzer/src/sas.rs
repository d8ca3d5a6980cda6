//! Shared access signatures for blob storage.
//!
//! Tokens are signed locally with the account key (HMAC-SHA256 over the
//! service's string-to-sign) and appended to request URLs as query pairs.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use life_core::{Error, Result};
use reqwest::Url;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Storage service version the signatures are computed for
pub const SAS_VERSION: &str = "2021-08-06";

/// Account name plus the decoded account key
#[derive(Clone)]
pub struct SharedKey {
    account: String,
    mac: HmacSha256,
}

impl SharedKey {
    pub fn new(account: impl Into<String>, base64_key: &str) -> Result<Self> {
        let key = STANDARD
            .decode(base64_key.trim())
            .map_err(|e| Error::InvalidConfig(format!("account key is not base64: {}", e)))?;
        let mac = HmacSha256::new_from_slice(&key)
            .map_err(|e| Error::InvalidConfig(format!("unusable account key: {}", e)))?;

        Ok(Self {
            account: account.into(),
            mac,
        })
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    fn sign(&self, string_to_sign: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(string_to_sign.as_bytes());
        STANDARD.encode(mac.finalize().into_bytes())
    }
}

/// A signed set of SAS query parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SasToken {
    pairs: Vec<(&'static str, String)>,
}

impl SasToken {
    /// Append the token to `url`'s query string
    pub fn apply(&self, url: &mut Url) {
        let mut query = url.query_pairs_mut();
        for (name, value) in &self.pairs {
            query.append_pair(name, value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }
}

fn format_time(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Read-only service SAS for a single blob
pub fn blob_read_sas(key: &SharedKey, container: &str, blob: &str, expiry: DateTime<Utc>) -> SasToken {
    let permissions = "r";
    let resource = "b";
    let expiry = format_time(expiry);
    let canonicalized = format!("/blob/{}/{}/{}", key.account, container, blob);

    let string_to_sign = [
        permissions,
        "", // start
        expiry.as_str(),
        canonicalized.as_str(),
        "", // identifier
        "", // ip
        "", // protocol
        SAS_VERSION,
        resource,
        "", // snapshot time
        "", // encryption scope
        "", // cache-control
        "", // content-disposition
        "", // content-encoding
        "", // content-language
        "", // content-type
    ]
    .join("\n");

    SasToken {
        pairs: vec![
            ("sv", SAS_VERSION.to_string()),
            ("sr", resource.to_string()),
            ("sp", permissions.to_string()),
            ("se", expiry),
            ("sig", key.sign(&string_to_sign)),
        ],
    }
}

/// Account SAS allowing container and blob listing
pub fn account_list_sas(key: &SharedKey, expiry: DateTime<Utc>) -> SasToken {
    let permissions = "rl";
    let services = "b";
    let resource_types = "sc";
    let expiry = format_time(expiry);

    let string_to_sign = format!(
        "{}\n{}\n{}\n{}\n{}\n{}\n{}\n{}\n{}\n{}\n",
        key.account,
        permissions,
        services,
        resource_types,
        "", // start
        expiry,
        "", // ip
        "", // protocol
        SAS_VERSION,
        "", // encryption scope
    );

    SasToken {
        pairs: vec![
            ("sv", SAS_VERSION.to_string()),
            ("ss", services.to_string()),
            ("srt", resource_types.to_string()),
            ("sp", permissions.to_string()),
            ("se", expiry),
            ("sig", key.sign(&string_to_sign)),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // base64 of "0123456789abcdef0123456789abcdef"
    const KEY: &str = "MDEyMzQ1Njc4OWFiY2RlZjAxMjM0NTY3ODlhYmNkZWY=";

    fn expiry() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 1, 0, 0).unwrap()
    }

    #[test]
    fn test_blob_read_sas_signature() {
        let key = SharedKey::new("lifedemo", KEY).unwrap();
        let token = blob_read_sas(&key, "gamestatepng", "gameState.png", expiry());

        assert_eq!(token.get("sp"), Some("r"));
        assert_eq!(token.get("sr"), Some("b"));
        assert_eq!(token.get("se"), Some("2026-01-01T01:00:00Z"));
        assert_eq!(
            token.get("sig"),
            Some("hUezALkBpAJrWBylDQCSujI+xFQJyMv6RHffrxhMGSo=")
        );
    }

    #[test]
    fn test_account_list_sas_signature() {
        let key = SharedKey::new("lifedemo", KEY).unwrap();
        let token = account_list_sas(&key, expiry());

        assert_eq!(token.get("sp"), Some("rl"));
        assert_eq!(
            token.get("sig"),
            Some("uoaz8D15cfwXeI/gcnVasoUzK5wnqjHNO73V1SXNOes=")
        );
    }

    #[test]
    fn test_apply_percent_encodes_signature() {
        let key = SharedKey::new("lifedemo", KEY).unwrap();
        let token = blob_read_sas(&key, "gamestatepng", "gameState.png", expiry());

        let mut url =
            Url::parse("https://lifedemo.blob.core.windows.net/gamestatepng/gameState.png").unwrap();
        token.apply(&mut url);

        let query = url.query().unwrap();
        assert!(query.contains("sig=hUezALkBpAJrWBylDQCSujI%2BxFQJyMv6RHffrxhMGSo%3D"));
        assert!(query.starts_with("sv=2021-08-06&sr=b&sp=r&se=2026-01-01T01%3A00%3A00Z"));
    }

    #[test]
    fn test_rejects_non_base64_key() {
        assert!(matches!(
            SharedKey::new("lifedemo", "not base64!"),
            Err(Error::InvalidConfig(_))
        ));
    }
}
