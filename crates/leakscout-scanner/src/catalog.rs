//! Project catalog.
//!
//! Discovers public projects through the paginated listing endpoint and
//! records them idempotently; existing rows are left untouched even if the
//! upstream URL or path changed. Also serves the list of projects still
//! awaiting a scan.

use crate::error::Result;
use leakscout_core::SourceType;
use leakscout_db::projects::{self, NewProject, Project, STATUS_SCANNED};
use leakscout_gitlab::CodeSearchApi;
use sqlx::{Pool, Sqlite};

/// Page size for the project listing endpoint.
pub const PROJECTS_PER_PAGE: u64 = 100;

/// Walk the public project listing and insert every project not yet known.
///
/// Pagination starts at page 1 and follows the next-page cursor until it is
/// 0. Any fetch failure (transport error or non-success status) is logged
/// and aborts the remaining pages for this cycle; the next cycle's refresh
/// starts over from page 1.
pub async fn refresh_projects(
    api: &dyn CodeSearchApi,
    pool: &Pool<Sqlite>,
    source_type: SourceType,
) {
    let mut page = 1;
    let mut discovered = 0_u64;

    loop {
        let listing = match api.list_projects(page, PROJECTS_PER_PAGE).await {
            Ok(listing) => listing,
            Err(e) => {
                tracing::error!("project listing failed on page {}: {}", page, e);
                break;
            }
        };

        for remote in listing.projects {
            let project = NewProject {
                url: remote.web_url,
                path: remote.path_with_namespace,
                source_type,
                project_id: remote.id,
            };

            // A failed existence check falls through to the insert attempt;
            // the unique key on (source_type, project_id) still holds.
            let known = projects::exists(pool, source_type, project.project_id)
                .await
                .unwrap_or_else(|e| {
                    tracing::error!("existence check failed for {}: {}", project.path, e);
                    false
                });

            if !known {
                match projects::insert(pool, &project).await {
                    Ok(_) => discovered += 1,
                    Err(e) => tracing::error!("failed to insert project {}: {}", project.path, e),
                }
            }
        }

        if listing.next_page == 0 {
            break;
        }
        page = listing.next_page;
    }

    tracing::info!("project refresh discovered {} new projects", discovered);
}

/// Load the projects of `source_type` that have not been scanned yet.
///
/// The store returns all projects in natural order; scanned ones are
/// filtered out here.
pub async fn list_valid_projects(
    pool: &Pool<Sqlite>,
    source_type: SourceType,
) -> Result<Vec<Project>> {
    let projects = projects::list_by_type(pool, source_type).await?;

    Ok(projects
        .into_iter()
        .filter(|p| p.status != STATUS_SCANNED)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use leakscout_db::Database;

    #[tokio::test]
    async fn test_list_valid_projects_excludes_scanned() {
        let db = Database::new(":memory:").await.expect("create database");
        db.run_migrations().await.expect("run migrations");

        for project_id in [1, 2] {
            projects::insert(
                db.pool(),
                &NewProject {
                    url: format!("https://gitlab.com/acme/repo-{project_id}"),
                    path: format!("acme/repo-{project_id}"),
                    source_type: SourceType::Gitlab,
                    project_id,
                },
            )
            .await
            .expect("insert project");
        }

        projects::update_status_by_project_id(db.pool(), STATUS_SCANNED, 2)
            .await
            .expect("mark scanned");

        let valid = list_valid_projects(db.pool(), SourceType::Gitlab)
            .await
            .expect("list valid projects");

        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].project_id, 1);
    }
}
