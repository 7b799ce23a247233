//! User domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use siteulation_core::{UserId, Username};

/// A siteulation user (public record).
///
/// Credential material never appears here; see [`StoredUser`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Unique handle.
    pub username: Username,
    /// Generation budget. Decremented by generation, never negative.
    pub token_balance: i64,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// A user as persisted in the local cache record.
///
/// Carries the Argon2 credential hash so logins keep working while
/// disconnected. Conversion to [`User`] drops the hash; it never crosses
/// the store boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredUser {
    /// Unique user ID.
    pub id: UserId,
    /// Unique handle.
    pub username: Username,
    /// Argon2 PHC string. `None` for identities mirrored from the remote
    /// service, which never reveals credential material.
    #[serde(default)]
    pub credential_hash: Option<String>,
    /// Generation budget.
    #[serde(default)]
    pub token_balance: i64,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl StoredUser {
    /// The public record, without credential material.
    #[must_use]
    pub fn to_user(&self) -> User {
        User {
            id: self.id,
            username: self.username.clone(),
            token_balance: self.token_balance,
            created_at: self.created_at,
        }
    }
}
