//! Session-related types.

use serde::{Deserialize, Serialize};

use siteulation_core::{UserId, Username};

/// Cached user identity.
///
/// The only identity fields that ever reach the durable cache: no
/// credential material, no balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's ID.
    pub id: UserId,
    /// User's handle.
    pub username: Username,
}
