//! Project and version domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use siteulation_core::{ProjectId, Slug, UserId, Username};

/// An immutable content snapshot within a project.
///
/// Once created, neither the number nor the content ever changes.
/// Versions are append-only; there is no delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Version {
    /// Position in the project's history, starting at 1.
    pub number: u32,
    /// Full generated HTML. Opaque to the core; only ever displayed in a
    /// sandboxed embed, never inline-executed.
    pub content: String,
    /// When the snapshot was taken.
    pub created_at: DateTime<Utc>,
}

/// A user-owned generated site with a version history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Unique project ID.
    pub id: ProjectId,
    /// Owner. Immutable after creation.
    pub owner: UserId,
    /// Display title.
    pub title: String,
    /// URL-safe handle, unique per owner.
    pub slug: Slug,
    /// Default version shown absent an explicit request. Always refers to
    /// an existing version of this project.
    #[serde(default)]
    pub pinned_version: Option<u32>,
    /// View counter, monotonically non-decreasing.
    #[serde(default)]
    pub views: u64,
    /// When the project was created.
    pub created_at: DateTime<Utc>,
    /// When the project last changed.
    pub updated_at: DateTime<Utc>,
    /// History in ascending version order.
    #[serde(default)]
    pub versions: Vec<Version>,
}

impl Project {
    /// Look up a version by number.
    #[must_use]
    pub fn version(&self, number: u32) -> Option<&Version> {
        self.versions.iter().find(|v| v.number == number)
    }

    /// The number the next appended version will receive.
    #[must_use]
    pub fn next_version_number(&self) -> u32 {
        self.versions.iter().map(|v| v.number).max().unwrap_or(0) + 1
    }

    /// Resolve which version a viewer should see.
    ///
    /// Precedence: an explicit request that resolves to an existing
    /// version, then the pin, then the most recently created version.
    /// `None` only for a project with no versions at all.
    #[must_use]
    pub fn resolve_displayed_version(&self, requested: Option<u32>) -> Option<&Version> {
        requested
            .and_then(|n| self.version(n))
            .or_else(|| self.pinned_version.and_then(|n| self.version(n)))
            .or_else(|| self.versions.last())
    }
}

/// Listing row for discovery views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSummary {
    /// Owner's handle.
    pub owner: Username,
    /// Project slug.
    pub slug: Slug,
    /// Display title.
    pub title: String,
    /// View counter.
    pub views: u64,
}

/// Aggregate row for the popular-users listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopularUser {
    /// User's handle.
    pub username: Username,
    /// Total views across the user's projects.
    pub views: u64,
    /// Number of projects the user owns.
    pub project_count: usize,
}
