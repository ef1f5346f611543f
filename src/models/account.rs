//! System account model
//!
//! This module defines the `SystemAccount` entity and the role enum that
//! gates the admin screens.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account entity as returned by the backend.
///
/// The password never leaves the backend on reads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct SystemAccount {
    /// Unique identifier
    pub account_id: i64,
    /// Display name
    pub account_name: String,
    /// Login email
    pub account_email: String,
    /// Role
    pub account_role: AccountRole,
}

impl SystemAccount {
    /// Check if the account is an administrator
    pub fn is_admin(&self) -> bool {
        self.account_role == AccountRole::Admin
    }

    /// Check if the account can manage news content (Staff or Admin)
    pub fn is_staff(&self) -> bool {
        matches!(self.account_role, AccountRole::Staff | AccountRole::Admin)
    }
}

/// Account role for authorization.
///
/// Roles determine what a signed-in user can reach:
/// - Admin: accounts, permanent deletes, and everything Staff can do
/// - Staff: articles, categories, tags, trash
/// - Lecturer: public pages only
///
/// Serialized as the backend's integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum AccountRole {
    /// Staff member (code 1)
    Staff,
    /// Lecturer (code 2)
    Lecturer,
    /// Administrator (code 3)
    Admin,
}

impl AccountRole {
    /// All roles in form display order
    pub const ALL: [AccountRole; 3] = [AccountRole::Admin, AccountRole::Staff, AccountRole::Lecturer];

    pub fn code(&self) -> i32 {
        match self {
            AccountRole::Staff => 1,
            AccountRole::Lecturer => 2,
            AccountRole::Admin => 3,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(AccountRole::Staff),
            2 => Some(AccountRole::Lecturer),
            3 => Some(AccountRole::Admin),
            _ => None,
        }
    }
}

impl Default for AccountRole {
    fn default() -> Self {
        Self::Lecturer
    }
}

impl TryFrom<i32> for AccountRole {
    type Error = String;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| format!("invalid account role: {}", code))
    }
}

impl From<AccountRole> for i32 {
    fn from(role: AccountRole) -> Self {
        role.code()
    }
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountRole::Admin => write!(f, "Admin"),
            AccountRole::Staff => write!(f, "Staff"),
            AccountRole::Lecturer => write!(f, "Lecturer"),
        }
    }
}

impl FromStr for AccountRole {
    type Err = anyhow::Error;

    /// Accepts role names (any case) or numeric codes as posted by forms.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<i32>() {
            return Self::from_code(code).ok_or_else(|| anyhow::anyhow!("Invalid account role: {}", s));
        }
        match s.to_lowercase().as_str() {
            "admin" => Ok(AccountRole::Admin),
            "staff" => Ok(AccountRole::Staff),
            "lecturer" => Ok(AccountRole::Lecturer),
            _ => Err(anyhow::anyhow!("Invalid account role: {}", s)),
        }
    }
}

/// Payload for creating or updating an account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct AccountInput {
    pub account_name: String,
    pub account_email: String,
    pub account_role: AccountRole,
    /// Required on create; omitted on update to keep the current password
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(role: AccountRole) -> SystemAccount {
        SystemAccount {
            account_id: 1,
            account_name: "Nguyen Van A".to_string(),
            account_email: "a@fu.edu.vn".to_string(),
            account_role: role,
        }
    }

    #[test]
    fn test_account_is_admin() {
        assert!(account(AccountRole::Admin).is_admin());
        assert!(!account(AccountRole::Staff).is_admin());
        assert!(!account(AccountRole::Lecturer).is_admin());
    }

    #[test]
    fn test_account_is_staff() {
        assert!(account(AccountRole::Admin).is_staff());
        assert!(account(AccountRole::Staff).is_staff());
        assert!(!account(AccountRole::Lecturer).is_staff());
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!(AccountRole::from_str("admin").unwrap(), AccountRole::Admin);
        assert_eq!(AccountRole::from_str("STAFF").unwrap(), AccountRole::Staff);
        assert_eq!(AccountRole::from_str("2").unwrap(), AccountRole::Lecturer);
        assert!(AccountRole::from_str("9").is_err());
        assert!(AccountRole::from_str("editor").is_err());
    }

    #[test]
    fn test_role_wire_format() {
        let json = serde_json::to_string(&account(AccountRole::Staff)).unwrap();
        assert!(json.contains("\"AccountRole\":1"));

        let parsed: SystemAccount = serde_json::from_str(
            r#"{"AccountId":9,"AccountName":"B","AccountEmail":"b@fu.edu.vn","AccountRole":3}"#,
        )
        .unwrap();
        assert_eq!(parsed.account_role, AccountRole::Admin);

        let invalid = serde_json::from_str::<SystemAccount>(
            r#"{"AccountId":9,"AccountName":"B","AccountEmail":"b@fu.edu.vn","AccountRole":7}"#,
        );
        assert!(invalid.is_err());
    }

    #[test]
    fn test_password_omitted_when_none() {
        let input = AccountInput {
            account_name: "B".to_string(),
            account_email: "b@fu.edu.vn".to_string(),
            account_role: AccountRole::Staff,
            account_password: None,
        };
        let body = serde_json::to_value(&input).unwrap();
        assert!(body.get("AccountPassword").is_none());
    }
}
