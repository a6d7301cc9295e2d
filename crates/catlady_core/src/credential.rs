use std::fmt;
use std::time::{Duration, Instant};

/// Bearer credential issued by the token endpoint.
///
/// A credential is valid while less than `expires_in` has elapsed since
/// `issued_at`. A zero `expires_in` is never valid.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub access_token: String,
    pub token_type: String,
    pub scope: String,
    pub expires_in: Duration,
    pub issued_at: Instant,
}

impl Credential {
    pub fn new(
        access_token: impl Into<String>,
        token_type: impl Into<String>,
        scope: impl Into<String>,
        expires_in_secs: u64,
        issued_at: Instant,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: token_type.into(),
            scope: scope.into(),
            expires_in: Duration::from_secs(expires_in_secs),
            issued_at,
        }
    }

    pub fn is_valid_at(&self, now: Instant) -> bool {
        if self.expires_in.is_zero() {
            return false;
        }
        now.saturating_duration_since(self.issued_at) < self.expires_in
    }

    /// Value for the `Authorization` header: `"<token_type> <access_token>"`.
    pub fn authorization_value(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .field("expires_in", &self.expires_in)
            .field("issued_at", &self.issued_at)
            .finish()
    }
}
