use std::fmt;
use std::path::PathBuf;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::categorizer::MatchPolicy;
use crate::db::{get_connection, init_db};
use crate::error::{HqError, Result};
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Admin,
    Sales,
    Developer,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Admin => "admin",
            Self::Sales => "sales",
            Self::Developer => "developer",
        })
    }
}

/// Roles allowed to touch accounting data.
pub const ACCOUNTING_ROLES: &[UserRole] = &[UserRole::Admin, UserRole::Developer];

pub const DB_FILE: &str = "hqledger.db";

/// Per-invocation context. Built once in `main` and handed to each command.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_name: String,
    pub role: UserRole,
    pub data_dir: PathBuf,
    pub policy: MatchPolicy,
}

impl Session {
    pub fn new(settings: &Settings, role: Option<UserRole>, policy: Option<MatchPolicy>) -> Self {
        Self {
            user_name: settings.user_name.clone(),
            role: role.unwrap_or(settings.role),
            data_dir: PathBuf::from(&settings.data_dir),
            policy: policy.unwrap_or(settings.match_policy),
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE)
    }

    pub fn require(&self, allowed: &[UserRole], action: &'static str) -> Result<()> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            tracing::warn!(role = %self.role, action, "permission denied");
            Err(HqError::PermissionDenied {
                role: self.role.to_string(),
                action,
            })
        }
    }

    /// Role check plus a connection to an initialized database.
    pub fn accounting(&self, action: &'static str) -> Result<Connection> {
        self.require(ACCOUNTING_ROLES, action)?;
        self.connect()
    }

    pub fn connect(&self) -> Result<Connection> {
        let path = self.db_path();
        if !path.exists() {
            return Err(HqError::Other(format!(
                "no database at {}; run `hqledger init` first",
                path.display()
            )));
        }
        let conn = get_connection(&path)?;
        init_db(&conn)?;
        Ok(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(role: UserRole) -> Session {
        Session {
            user_name: "tester".into(),
            role,
            data_dir: PathBuf::from("/nonexistent"),
            policy: MatchPolicy::FirstMatch,
        }
    }

    #[test]
    fn test_accounting_roles() {
        assert!(session(UserRole::Admin).require(ACCOUNTING_ROLES, "import").is_ok());
        assert!(session(UserRole::Developer).require(ACCOUNTING_ROLES, "import").is_ok());
        let err = session(UserRole::Sales).require(ACCOUNTING_ROLES, "import").unwrap_err();
        assert!(matches!(err, HqError::PermissionDenied { .. }));
    }

    #[test]
    fn test_overrides_beat_settings() {
        let settings = Settings {
            role: UserRole::Sales,
            match_policy: MatchPolicy::LastMatch,
            ..Settings::default()
        };
        let s = Session::new(&settings, Some(UserRole::Developer), None);
        assert_eq!(s.role, UserRole::Developer);
        assert_eq!(s.policy, MatchPolicy::LastMatch);
        assert!(s.db_path().ends_with(DB_FILE));
    }

    #[test]
    fn test_connect_requires_init() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(UserRole::Admin);
        s.data_dir = dir.path().to_path_buf();
        assert!(s.connect().is_err());
        std::fs::write(s.db_path(), b"").unwrap();
        assert!(s.connect().is_ok());
    }
}
