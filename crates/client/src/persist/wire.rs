//! Wire representations of remote API payloads.
//!
//! Kept separate from the domain types so the server's JSON shapes can
//! drift without touching the store. Conversions normalize as they go
//! (version order, defaults for absent fields).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use siteulation_core::{ProjectId, Slug, UserId, Username};

use crate::models::{CurrentUser, PopularUser, Project, ProjectSummary, Version};

/// Error payload: `{"error": "..."}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: String,
}

/// Response of `GET /api/me`.
#[derive(Debug, Deserialize)]
pub(crate) struct MeResponse {
    #[serde(default)]
    pub user: Option<SessionUser>,
}

/// Public identity fields of the session user.
#[derive(Debug, Deserialize)]
pub(crate) struct SessionUser {
    pub id: UserId,
    pub username: Username,
}

impl From<SessionUser> for CurrentUser {
    fn from(user: SessionUser) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

/// Body of `POST /api/login` and `POST /api/signup`.
#[derive(Debug, Serialize)]
pub(crate) struct Credentials<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Response of `POST /api/login` and `POST /api/signup`.
#[derive(Debug, Deserialize)]
pub(crate) struct AuthResponse {
    pub user: SessionUser,
}

/// Response of `GET /api/projects` and the per-user variant.
#[derive(Debug, Deserialize)]
pub(crate) struct ProjectsResponse {
    #[serde(default)]
    pub projects: Vec<SummaryRow>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SummaryRow {
    pub username: Username,
    pub slug: Slug,
    pub title: String,
    #[serde(default)]
    pub views: u64,
}

impl From<SummaryRow> for ProjectSummary {
    fn from(row: SummaryRow) -> Self {
        Self {
            owner: row.username,
            slug: row.slug,
            title: row.title,
            views: row.views,
        }
    }
}

/// Response of `GET /api/popular-users`.
#[derive(Debug, Deserialize)]
pub(crate) struct PopularResponse {
    #[serde(default)]
    pub users: Vec<PopularRow>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PopularRow {
    pub username: Username,
    #[serde(default)]
    pub views: u64,
    #[serde(default, rename = "projects")]
    pub project_count: usize,
}

impl From<PopularRow> for PopularUser {
    fn from(row: PopularRow) -> Self {
        Self {
            username: row.username,
            views: row.views,
            project_count: row.project_count,
        }
    }
}

/// Response of `GET /api/@{username}/{slug}` and the mutating project
/// endpoints: the project record plus its versions.
#[derive(Debug, Deserialize)]
pub(crate) struct ProjectResponse {
    pub project: ProjectBody,
    #[serde(default)]
    pub versions: Vec<VersionBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectBody {
    pub id: ProjectId,
    pub owner: UserId,
    pub title: String,
    pub slug: Slug,
    #[serde(default)]
    pub pinned_version: Option<u32>,
    #[serde(default)]
    pub views: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VersionBody {
    #[serde(rename = "version_number")]
    pub number: u32,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<VersionBody> for Version {
    fn from(body: VersionBody) -> Self {
        Self {
            number: body.number,
            content: body.content,
            created_at: body.created_at,
        }
    }
}

impl From<ProjectResponse> for Project {
    fn from(response: ProjectResponse) -> Self {
        let mut versions: Vec<Version> =
            response.versions.into_iter().map(Version::from).collect();
        // The server lists newest-first; the domain order is ascending.
        versions.sort_by_key(|v| v.number);

        let body = response.project;
        Self {
            id: body.id,
            owner: body.owner,
            title: body.title,
            slug: body.slug,
            pinned_version: body.pinned_version,
            views: body.views,
            created_at: body.created_at,
            updated_at: body.updated_at,
            versions,
        }
    }
}

/// Body of `POST /api/projects`.
#[derive(Debug, Serialize)]
pub(crate) struct CreateProjectBody<'a> {
    pub title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<&'a str>,
}

/// Body of `POST /api/projects/{id}/versions`.
#[derive(Debug, Serialize)]
pub(crate) struct AppendVersionBody<'a> {
    pub content: &'a str,
}

/// Body of `POST /api/projects/{id}/pin`. `null` clears the pin.
#[derive(Debug, Serialize)]
pub(crate) struct PinBody {
    pub version: Option<u32>,
}

/// Body of `POST /api/generate`.
#[derive(Debug, Serialize)]
pub(crate) struct GenerateBody<'a> {
    pub prompt: &'a str,
}

/// Response of `POST /api/generate`.
#[derive(Debug, Deserialize)]
pub(crate) struct GenerateResponse {
    pub content: String,
    #[serde(default)]
    pub tokens_remaining: i64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_project_response_normalizes_version_order() {
        let json = format!(
            r#"{{
                "project": {{
                    "id": "{}",
                    "owner": "{}",
                    "title": "My Site",
                    "slug": "my-site",
                    "pinned_version": 1,
                    "views": 3,
                    "created_at": "2024-01-01T00:00:00Z",
                    "updated_at": "2024-01-02T00:00:00Z"
                }},
                "versions": [
                    {{"version_number": 2, "content": "<h1>B</h1>", "created_at": "2024-01-02T00:00:00Z"}},
                    {{"version_number": 1, "content": "<h1>A</h1>", "created_at": "2024-01-01T00:00:00Z"}}
                ]
            }}"#,
            ProjectId::generate(),
            UserId::generate()
        );

        let project: Project = serde_json::from_str::<ProjectResponse>(&json).unwrap().into();
        let numbers: Vec<u32> = project.versions.iter().map(|v| v.number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(project.pinned_version, Some(1));
    }

    #[test]
    fn test_listing_rows_tolerate_missing_views() {
        let response: ProjectsResponse = serde_json::from_str(
            r#"{"projects": [{"username": "alice", "slug": "my-site", "title": "My Site"}]}"#,
        )
        .unwrap();
        let row: ProjectSummary = response.projects.into_iter().next().unwrap().into();
        assert_eq!(row.views, 0);
    }

    #[test]
    fn test_empty_listing_response() {
        let response: ProjectsResponse = serde_json::from_str("{}").unwrap();
        assert!(response.projects.is_empty());

        let response: PopularResponse = serde_json::from_str("{}").unwrap();
        assert!(response.users.is_empty());
    }
}
