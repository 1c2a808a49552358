//! The OAuth credential record.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How long before the recorded expiry an access token is treated as stale.
const EXPIRY_SKEW_SECS: i64 = 60;

/// Token type assumed when the provider or an older cache file leaves it out.
pub(crate) const DEFAULT_TOKEN_TYPE: &str = "Bearer";

fn default_token_type() -> String {
    DEFAULT_TOKEN_TYPE.to_string()
}

/// An OAuth access/refresh token pair.
///
/// This is the record written to the credential cache. Optional fields are
/// omitted from the JSON when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Token sent as the bearer on API requests.
    pub access_token: String,

    /// Token used to mint new access tokens without user interaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Token type reported by the provider, usually `Bearer`.
    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// When the access token stops being accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl Credential {
    /// Creates a credential with no refresh token and no expiry.
    pub fn new(access_token: impl Into<String>, token_type: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            token_type: token_type.into(),
            expiry: None,
        }
    }

    /// Sets the refresh token.
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Sets an absolute expiry.
    pub fn with_expiry(mut self, expiry: DateTime<Utc>) -> Self {
        self.expiry = Some(expiry);
        self
    }

    /// Sets the expiry relative to now, as token endpoints report it.
    ///
    /// A lifetime too large to represent leaves the expiry unset.
    pub fn expires_in(mut self, secs: i64) -> Self {
        self.expiry = Self::expiry_after(secs);
        self
    }

    /// The instant `secs` seconds from now, or `None` if out of range.
    pub fn expiry_after(secs: i64) -> Option<DateTime<Utc>> {
        Duration::try_seconds(secs).and_then(|delta| Utc::now().checked_add_signed(delta))
    }

    /// Returns true if the access token is expired or about to expire.
    ///
    /// Credentials without an expiry never expire.
    pub fn is_expired(&self) -> bool {
        match self.expiry {
            Some(expiry) => Utc::now() + Duration::seconds(EXPIRY_SKEW_SECS) >= expiry,
            None => false,
        }
    }

    /// Returns true if a non-empty refresh token is present.
    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token
            .as_deref()
            .is_some_and(|token| !token.is_empty())
    }

    /// Returns the time until the token expires, if known.
    pub fn time_until_expiry(&self) -> Option<Duration> {
        self.expiry.map(|expiry| expiry - Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_only_present_fields() {
        let credential = Credential::new("AT1", "Bearer").with_refresh_token("RT1");
        let json = serde_json::to_string(&credential).unwrap();
        assert_eq!(
            json,
            r#"{"access_token":"AT1","refresh_token":"RT1","token_type":"Bearer"}"#
        );

        let bare = serde_json::to_string(&Credential::new("AT", "Bearer")).unwrap();
        assert_eq!(bare, r#"{"access_token":"AT","token_type":"Bearer"}"#);
    }

    #[test]
    fn expiry_is_rfc3339() {
        let expiry = DateTime::parse_from_rfc3339("2026-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc);
        let credential = Credential::new("AT", "Bearer").with_expiry(expiry);
        let value: serde_json::Value = serde_json::to_value(&credential).unwrap();
        assert_eq!(value["expiry"], "2026-01-02T03:04:05Z");
    }

    #[test]
    fn deserializes_provider_native_offsets() {
        let json = r#"{
            "access_token": "ya29.a0",
            "token_type": "Bearer",
            "refresh_token": "1//0g",
            "expiry": "2017-06-14T18:03:39.123456789-04:00"
        }"#;
        let credential: Credential = serde_json::from_str(json).unwrap();
        assert_eq!(credential.refresh_token.as_deref(), Some("1//0g"));
        assert!(credential.expiry.is_some());
        assert!(credential.is_expired());
    }

    #[test]
    fn missing_access_token_does_not_decode() {
        let result = serde_json::from_str::<Credential>(r#"{"token_type":"Bearer"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn missing_token_type_defaults_to_bearer() {
        let credential: Credential =
            serde_json::from_str(r#"{"access_token":"AT","refresh_token":"RT"}"#).unwrap();
        assert_eq!(credential.token_type, "Bearer");
        assert!(credential.has_refresh_token());
    }

    #[test]
    fn out_of_range_lifetime_has_no_expiry() {
        assert!(Credential::expiry_after(10_000_000_000_000).is_none());
        assert!(Credential::expiry_after(i64::MAX).is_none());
        assert!(Credential::expiry_after(3600).is_some());

        let credential = Credential::new("AT", "Bearer").expires_in(i64::MAX);
        assert!(credential.expiry.is_none());
    }

    #[test]
    fn expiry_checks() {
        let fresh = Credential::new("AT", "Bearer").expires_in(3600);
        assert!(!fresh.is_expired());
        assert!(fresh.time_until_expiry().unwrap() > Duration::minutes(59));

        let stale = Credential::new("AT", "Bearer").expires_in(30);
        assert!(stale.is_expired());

        let forever = Credential::new("AT", "Bearer");
        assert!(!forever.is_expired());
        assert!(forever.time_until_expiry().is_none());
    }

    #[test]
    fn refresh_token_presence() {
        assert!(!Credential::new("AT", "Bearer").has_refresh_token());
        assert!(!Credential::new("AT", "Bearer").with_refresh_token("").has_refresh_token());
        assert!(Credential::new("AT", "Bearer").with_refresh_token("RT").has_refresh_token());
    }
}
