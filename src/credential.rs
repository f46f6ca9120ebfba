//! The [`Credential`] value type and its expiration capability.

use chrono::{DateTime, Duration, Utc};
use std::fmt;

/// An immutable SigV4 credential.
///
/// A credential is [`empty`](Credential::is_empty) iff either key field is the empty string. An
/// empty credential is a valid placeholder (used as the default chain terminator, spec §4.J) but
/// MUST NOT be used for signing.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential {
    access_key_id: String,
    secret_access_key: String,
    session_token: Option<String>,
    expiration: Option<DateTime<Utc>>,
}

impl Credential {
    /// Construct a credential from explicit fields.
    ///
    /// `session_token` is taken as given; this constructor never consults the process
    /// environment. [`StaticCredentialProvider::from_environment`](crate::provider::StaticCredentialProvider::from_environment)
    /// is the one place `AWS_SESSION_TOKEN` is read, so a credential sourced from a file profile
    /// or another provider never silently picks up an ambient session token.
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        Credential {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token,
            expiration: None,
        }
    }

    /// Construct a credential carrying an expiration timestamp.
    pub fn with_expiration(mut self, expiration: DateTime<Utc>) -> Self {
        self.expiration = Some(expiration);
        self
    }

    /// The deliberately empty credential used as the default chain terminator (spec §4.J).
    ///
    /// Downstream signing code detects this via [`is_empty`](Credential::is_empty) and skips
    /// signing rather than treating it as an error.
    pub fn anonymous() -> Self {
        Credential {
            access_key_id: String::new(),
            secret_access_key: String::new(),
            session_token: None,
            expiration: None,
        }
    }

    /// The access key id.
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// The secret access key.
    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    /// The session token, if any.
    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    /// The expiration timestamp, if any.
    pub fn expiration(&self) -> Option<DateTime<Utc>> {
        self.expiration
    }

    /// True iff either key field is the empty string.
    pub fn is_empty(&self) -> bool {
        self.access_key_id.is_empty() || self.secret_access_key.is_empty()
    }

    /// True iff this credential carries an expiration that is within `within` of `now`.
    ///
    /// A credential without an expiration never expires.
    pub fn is_expiring_at(&self, now: DateTime<Utc>, within: Duration) -> bool {
        match self.expiration {
            Some(exp) => exp - now < within,
            None => false,
        }
    }

    /// True iff this credential is already expired as of `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.is_expiring_at(now, Duration::zero())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "***"),
            )
            .field("expiration", &self.expiration)
            .finish()
    }
}
