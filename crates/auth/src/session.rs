//! Credential shapes read from the identity provider.
//!
//! The gateway never creates or refreshes a session; it only reads what the
//! provider hands over and asks the provider to invalidate it.

use serde::{Deserialize, Serialize};

use commissionhub_core::SubjectId;

/// Bearer access token. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl core::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Identity record attached to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(rename = "id")]
    pub subject: SubjectId,
    #[serde(default)]
    pub email: Option<String>,
}

impl Identity {
    pub fn new(subject: SubjectId) -> Self {
        Self {
            subject,
            email: None,
        }
    }
}

/// Session as exposed by the provider: an access token plus (maybe) its user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: AccessToken,
    pub identity: Option<Identity>,
}

impl Session {
    pub fn new(access_token: AccessToken, identity: Option<Identity>) -> Self {
        Self {
            access_token,
            identity,
        }
    }

    /// Token and subject, if both are present and non-empty.
    pub fn credentials(&self) -> Option<(&AccessToken, &SubjectId)> {
        if self.access_token.is_empty() {
            return None;
        }
        let identity = self.identity.as_ref()?;
        if identity.subject.is_empty() {
            return None;
        }
        Some((&self.access_token, &identity.subject))
    }
}

/// Result of exchanging a token with the backend verifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Verified,
    Rejected { reason: String },
}

impl Verification {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }
}

/// Row from the role store. A `null` role column deserializes as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserRoleRecord {
    #[serde(default)]
    pub role: Option<String>,
}

impl UserRoleRecord {
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(sub: &str) -> Option<Identity> {
        Some(Identity::new(SubjectId::new(sub)))
    }

    #[test]
    fn credentials_require_token_and_subject() {
        let full = Session::new(AccessToken::new("tok"), identity("u1"));
        assert!(full.credentials().is_some());

        let no_token = Session::new(AccessToken::new("  "), identity("u1"));
        assert!(no_token.credentials().is_none());

        let no_identity = Session::new(AccessToken::new("tok"), None);
        assert!(no_identity.credentials().is_none());

        let blank_subject = Session::new(AccessToken::new("tok"), identity(""));
        assert!(blank_subject.credentials().is_none());
    }

    #[test]
    fn token_debug_is_redacted() {
        let rendered = format!("{:?}", AccessToken::new("super-secret"));
        assert!(!rendered.contains("super-secret"));
    }

    #[test]
    fn role_record_accepts_null_role() {
        let record: UserRoleRecord = serde_json::from_str(r#"{"role":null}"#).unwrap();
        assert_eq!(record.role, None);
    }
}
