//! The remote operations the engine needs, independent of transport.

use async_trait::async_trait;
use tracing::info;

use crate::error::AppError;
use crate::models::{Page, TemplateSearch, Visibility};

/// Remote project-management service.
///
/// Read operations fail with an `Err` on transport errors and on non-success
/// statuses. Mutations fail with an `Err` only on transport errors and
/// otherwise return the HTTP status they received, success or not.
///
/// Implementations must be safe to call concurrently.
#[async_trait]
pub trait ProjectService: Send + Sync {
    /// Fetches one 1-based page of the project listing.
    async fn list_projects(&self, page_size: u32, page_index: u32) -> Result<Page, AppError>;

    /// Looks up permission templates matching `query`.
    async fn search_templates(&self, query: &str) -> Result<TemplateSearch, AppError>;

    /// Changes the visibility of a single project.
    async fn update_visibility(&self, project: &str, visibility: Visibility)
        -> Result<u16, AppError>;

    /// Applies a permission template to several projects in one call.
    async fn bulk_apply_template(
        &self,
        template_id: &str,
        projects: &[String],
    ) -> Result<u16, AppError>;
}

/// Confirms that `template_id` exists on the service and returns it.
///
/// # Errors
///
/// Returns `AppError::TemplateNotFound` when neither a listed template nor a
/// default template carries this id.
pub async fn resolve_template<S>(service: &S, template_id: &str) -> Result<String, AppError>
where
    S: ProjectService + ?Sized,
{
    let search = service.search_templates(template_id).await?;
    if !search.contains(template_id) {
        return Err(AppError::TemplateNotFound(template_id.to_string()));
    }

    let name = search
        .permission_templates
        .iter()
        .find(|t| t.id == template_id)
        .map(|t| t.name.as_str())
        .unwrap_or("default template");
    info!("Using permission template {} ({})", template_id, name);

    Ok(template_id.to_string())
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use crate::models::{Paging, PermissionTemplate, Project};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory service holding `total` public projects `p1..=pN`.
    #[derive(Default)]
    pub(crate) struct FakeService {
        pub(crate) projects: Vec<Project>,
        pub(crate) templates: Vec<PermissionTemplate>,
        /// Status returned by `update_visibility` per project key; 204 otherwise.
        pub(crate) visibility_status: HashMap<String, u16>,
        /// Project key whose visibility call fails at the transport level.
        pub(crate) broken_project: Option<String>,
        /// Status returned by every bulk template call.
        pub(crate) template_status: Option<u16>,
        pub(crate) listed_pages: Mutex<Vec<u32>>,
        pub(crate) privatized: Mutex<Vec<String>>,
        pub(crate) applied: Mutex<Vec<Vec<String>>>,
    }

    impl FakeService {
        pub(crate) fn with_projects(total: usize) -> Self {
            let projects = (1..=total)
                .map(|i| Project {
                    key: format!("p{}", i),
                    name: format!("Project {}", i),
                    qualifier: "TRK".to_string(),
                    visibility: "public".to_string(),
                    last_analysis_date: None,
                    revision: None,
                })
                .collect();
            Self {
                projects,
                templates: vec![PermissionTemplate {
                    id: "tpl-1".to_string(),
                    name: "Private projects".to_string(),
                    description: None,
                }],
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl ProjectService for FakeService {
        async fn list_projects(&self, page_size: u32, page_index: u32) -> Result<Page, AppError> {
            self.listed_pages.lock().unwrap().push(page_index);
            let start = ((page_index - 1) * page_size) as usize;
            let end = (start + page_size as usize).min(self.projects.len());
            let projects = self.projects.get(start..end).unwrap_or_default().to_vec();
            Ok(Page {
                paging: Paging {
                    page_index,
                    page_size,
                    total: self.projects.len(),
                },
                projects,
            })
        }

        async fn search_templates(&self, query: &str) -> Result<TemplateSearch, AppError> {
            Ok(TemplateSearch {
                permission_templates: self
                    .templates
                    .iter()
                    .filter(|t| t.id.contains(query) || t.name.contains(query))
                    .cloned()
                    .collect(),
                default_templates: Vec::new(),
            })
        }

        async fn update_visibility(
            &self,
            project: &str,
            visibility: Visibility,
        ) -> Result<u16, AppError> {
            assert_eq!(visibility, Visibility::Private);
            if self.broken_project.as_deref() == Some(project) {
                return Err(AppError::NetworkError("connection reset".to_string()));
            }
            self.privatized.lock().unwrap().push(project.to_string());
            Ok(*self.visibility_status.get(project).unwrap_or(&204))
        }

        async fn bulk_apply_template(
            &self,
            _template_id: &str,
            projects: &[String],
        ) -> Result<u16, AppError> {
            self.applied.lock().unwrap().push(projects.to_vec());
            Ok(self.template_status.unwrap_or(204))
        }
    }
}
