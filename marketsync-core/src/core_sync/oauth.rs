//! OAuth redirect parsing and credential (de)serialization

use super::types::{OAuthAccounts, OAuthCredential, Timestamp};
use serde_json::Value;
use tracing::warn;

/// Build a credential from a redirect fragment such as
/// `#access_token=abc&token_type=Bearer&expires_in=3600`
///
/// `expires_on` is fixed here as `now + expires_in` seconds, in epoch
/// milliseconds. A missing or non-numeric `expires_in` leaves it unset.
pub fn credential_from_fragment(fragment: &str, now: Timestamp) -> OAuthCredential {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    let mut credential = OAuthCredential::default();

    for (key, value) in url::form_urlencoded::parse(fragment.as_bytes()) {
        match key.as_ref() {
            "access_token" => credential.access_token = value.into_owned(),
            "token_type" => credential.token_type = Some(value.into_owned()),
            "expires_in" => credential.expires_in = Some(value.into_owned()),
            "expires_on" => {}
            _ => {
                credential.extra.insert(key.into_owned(), Value::String(value.into_owned()));
            }
        }
    }

    credential.expires_on = match credential.expires_in.as_deref().map(str::parse::<u64>) {
        Some(Ok(seconds)) => Some(now.as_millis().saturating_add(seconds.saturating_mul(1000))),
        Some(Err(e)) => {
            warn!(error = %e, "Ignoring non-numeric expires_in in OAuth redirect");
            None
        }
        None => None,
    };

    credential
}

/// Decode the persisted slot; absent or malformed content reads as empty
pub fn decode_accounts(raw: Option<&str>) -> OAuthAccounts {
    let Some(raw) = raw else {
        return OAuthAccounts::new();
    };
    if raw.trim().is_empty() || raw.trim() == "null" {
        return OAuthAccounts::new();
    }
    match serde_json::from_str(raw) {
        Ok(accounts) => accounts,
        Err(e) => {
            warn!(error = %e, "Persisted OAuth accounts are malformed, treating as empty");
            OAuthAccounts::new()
        }
    }
}

pub fn encode_accounts(accounts: &OAuthAccounts) -> Result<String, serde_json::Error> {
    serde_json::to_string(accounts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expires_on_is_absolute_millis() {
        let now = Timestamp::from_millis(1_700_000_000_000);
        let credential = credential_from_fragment("#access_token=abc&expires_in=3600", now);
        assert_eq!(credential.access_token, "abc");
        assert_eq!(credential.expires_on, Some(1_700_000_000_000 + 3_600_000));
    }

    #[test]
    fn test_fragment_keeps_extra_fields_and_decodes() {
        let credential = credential_from_fragment(
            "access_token=a%2Bb&token_type=Bearer&state=xyz&resource=https%3A%2F%2Fstorage",
            Timestamp::from_millis(0),
        );
        assert_eq!(credential.access_token, "a+b");
        assert_eq!(credential.token_type.as_deref(), Some("Bearer"));
        assert_eq!(credential.extra["state"], "xyz");
        assert_eq!(credential.extra["resource"], "https://storage");
        assert_eq!(credential.expires_on, None);
    }

    #[test]
    fn test_non_numeric_expires_in() {
        let credential =
            credential_from_fragment("#access_token=a&expires_in=soon", Timestamp::from_millis(5));
        assert_eq!(credential.expires_in.as_deref(), Some("soon"));
        assert_eq!(credential.expires_on, None);
    }

    #[test]
    fn test_decode_is_permissive() {
        assert!(decode_accounts(None).is_empty());
        assert!(decode_accounts(Some("null")).is_empty());
        assert!(decode_accounts(Some("")).is_empty());
        assert!(decode_accounts(Some("{not json")).is_empty());
        assert!(decode_accounts(Some("[1,2]")).is_empty());

        let accounts = decode_accounts(Some(r#"{"azure":{"access_token":"t","expires_on":42}}"#));
        assert_eq!(accounts["azure"].access_token, "t");
        assert_eq!(accounts["azure"].expires_on, Some(42));
    }

    #[test]
    fn test_encode_then_decode() {
        let mut accounts = OAuthAccounts::new();
        accounts.insert(
            "azure".to_string(),
            credential_from_fragment(
                "#access_token=t&expires_in=60",
                Timestamp::from_millis(1_000),
            ),
        );
        let raw = encode_accounts(&accounts).unwrap();
        assert_eq!(decode_accounts(Some(&raw)), accounts);
    }
}
