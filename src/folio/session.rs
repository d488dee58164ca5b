//! Who is editing.
//!
//! The engine itself never checks identity. The API asks the [`AccessPolicy`] before every
//! mutating call; everybody else gets a read-only view of the same workspace.

use crate::config::FolioConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    identity: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn as_identity(identity: impl Into<String>) -> Self {
        let identity = identity.into();
        Self {
            identity: (!identity.trim().is_empty()).then(|| identity.trim().to_string()),
        }
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Whoever runs folio owns the workspace.
    Open,
    /// Only the named identity may write.
    AdminOnly(String),
}

impl AccessPolicy {
    pub fn from_config(config: &FolioConfig) -> Self {
        match &config.admin {
            Some(admin) => AccessPolicy::AdminOnly(admin.clone()),
            None => AccessPolicy::Open,
        }
    }

    pub fn can_write(&self, session: &Session) -> bool {
        match self {
            AccessPolicy::Open => true,
            AccessPolicy::AdminOnly(admin) => session.identity() == Some(admin.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_policy_lets_anyone_write() {
        assert!(AccessPolicy::Open.can_write(&Session::anonymous()));
    }

    #[test]
    fn admin_only_policy_checks_identity() {
        let config = FolioConfig {
            admin: Some("ada".into()),
            ..FolioConfig::default()
        };
        let policy = AccessPolicy::from_config(&config);
        assert!(policy.can_write(&Session::as_identity("ada")));
        assert!(!policy.can_write(&Session::as_identity("bob")));
        assert!(!policy.can_write(&Session::anonymous()));
        assert!(!policy.can_write(&Session::as_identity("  ")));
    }
}
