use serde::{Deserialize, Serialize};
use std::fmt;

/// Status codes at or above this value mark an operation as failed.
pub const FAILURE_STATUS_THRESHOLD: u16 = 300;

/// A project as listed by the remote service. Never mutated locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub key: String,
    pub name: String,
    pub qualifier: String,
    pub visibility: String,
    #[serde(default)]
    pub last_analysis_date: Option<String>,
    #[serde(default)]
    pub revision: Option<String>,
}

/// Project visibility as understood by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Paging block returned with every listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paging {
    /// 1-based index of this page.
    pub page_index: u32,
    pub page_size: u32,
    /// Number of projects across all pages.
    pub total: usize,
}

impl Paging {
    /// Number of pages needed to cover `total` at `page_size` per page.
    pub fn total_pages(&self) -> u32 {
        page_count(self.total, self.page_size)
    }
}

/// One slice of the project listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub paging: Paging,
    pub projects: Vec<Project>,
}

/// Result of one remote mutation: its HTTP status and what it acted on.
///
/// `identifier` is a project key for per-project calls and the batch index
/// for bulk calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationOutcome {
    pub status_code: u16,
    pub identifier: String,
}

impl OperationOutcome {
    pub fn new(status_code: u16, identifier: impl Into<String>) -> Self {
        Self {
            status_code,
            identifier: identifier.into(),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status_code >= FAILURE_STATUS_THRESHOLD
    }
}

/// A permission template known to the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A template the service applies by default to a qualifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultTemplate {
    pub template_id: String,
    pub qualifier: String,
}

/// Response of a permission template lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSearch {
    #[serde(default)]
    pub permission_templates: Vec<PermissionTemplate>,
    #[serde(default)]
    pub default_templates: Vec<DefaultTemplate>,
}

impl TemplateSearch {
    /// Returns true if `id` names a listed template or a default template.
    pub fn contains(&self, id: &str) -> bool {
        self.permission_templates.iter().any(|t| t.id == id)
            || self.default_templates.iter().any(|t| t.template_id == id)
    }
}

/// `ceil(total / per_page)` without floating point.
pub fn page_count(total: usize, per_page: u32) -> u32 {
    if per_page == 0 {
        return 0;
    }
    total.div_ceil(per_page as usize) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_deserialization() {
        let json = r#"{
            "key": "my-project",
            "name": "My Project",
            "qualifier": "TRK",
            "visibility": "public",
            "lastAnalysisDate": "2017-03-01T11:39:03+0100",
            "revision": "cfb82f55c6ef32e61828c4cb3db2da12795fd767"
        }"#;

        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.key, "my-project");
        assert_eq!(project.visibility, "public");
        assert_eq!(
            project.last_analysis_date.as_deref(),
            Some("2017-03-01T11:39:03+0100")
        );
    }

    #[test]
    fn test_project_optional_fields_missing() {
        let json = r#"{"key": "k", "name": "n", "qualifier": "TRK", "visibility": "private"}"#;
        let project: Project = serde_json::from_str(json).unwrap();
        assert!(project.last_analysis_date.is_none());
        assert!(project.revision.is_none());
    }

    #[test]
    fn test_visibility_strings() {
        assert_eq!(Visibility::Private.to_string(), "private");
        assert_eq!(
            serde_json::to_string(&Visibility::Public).unwrap(),
            "\"public\""
        );
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 500), 0);
        assert_eq!(page_count(1, 500), 1);
        assert_eq!(page_count(500, 500), 1);
        assert_eq!(page_count(1200, 500), 3);
        assert_eq!(page_count(7, 0), 0);
    }

    #[test]
    fn test_paging_total_pages() {
        let paging = Paging {
            page_index: 1,
            page_size: 100,
            total: 250,
        };
        assert_eq!(paging.total_pages(), 3);
    }

    #[test]
    fn test_outcome_failure_threshold() {
        assert!(!OperationOutcome::new(204, "a").is_failure());
        assert!(!OperationOutcome::new(299, "a").is_failure());
        assert!(OperationOutcome::new(300, "a").is_failure());
        assert!(OperationOutcome::new(404, "a").is_failure());
    }

    #[test]
    fn test_template_search_contains() {
        let json = r#"{
            "permissionTemplates": [{"id": "tpl-1", "name": "Default"}],
            "defaultTemplates": [{"templateId": "tpl-2", "qualifier": "TRK"}]
        }"#;
        let search: TemplateSearch = serde_json::from_str(json).unwrap();
        assert!(search.contains("tpl-1"));
        assert!(search.contains("tpl-2"));
        assert!(!search.contains("tpl-3"));
    }
}
