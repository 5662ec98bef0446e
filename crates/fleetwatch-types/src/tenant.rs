//! Tenant and project records

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::{CorrelationKey, ProjectId, TenantId};

/// A tenant with its project memberships and variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    /// Tenant identifier
    pub id: TenantId,

    /// Display name (used as the key of classification output)
    pub name: String,

    /// Projects this tenant is connected to
    #[serde(default)]
    pub project_ids: BTreeSet<ProjectId>,

    /// Variable name -> value
    #[serde(default)]
    pub variables: HashMap<String, String>,
}

impl Tenant {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: TenantId::new(id),
            name: name.into(),
            project_ids: BTreeSet::new(),
            variables: HashMap::new(),
        }
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project_ids.insert(ProjectId::new(project));
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Is this tenant a member of at least one of the given projects?
    pub fn belongs_to_any(&self, projects: &[ProjectId]) -> bool {
        projects.iter().any(|p| self.project_ids.contains(p))
    }

    /// Correlation key stored under the given variable name, if present.
    pub fn correlation_key(&self, variable: &str) -> Option<CorrelationKey> {
        self.variables
            .get(variable)
            .filter(|v| !v.is_empty())
            .map(|v| CorrelationKey::new(v.as_str()))
    }
}

/// A deployment project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_belongs_to_any() {
        let tenant = Tenant::new("Tenants-1", "Acme").with_project("Projects-1");

        assert!(tenant.belongs_to_any(&[ProjectId::new("Projects-9"), ProjectId::new("Projects-1")]));
        assert!(!tenant.belongs_to_any(&[ProjectId::new("Projects-2")]));
        assert!(!tenant.belongs_to_any(&[]));
    }

    #[test]
    fn test_correlation_key_absent_or_empty() {
        let tenant = Tenant::new("Tenants-1", "Acme").with_variable("UAID", "ABC123");
        assert_eq!(tenant.correlation_key("UAID"), Some(CorrelationKey::new("ABC123")));
        assert_eq!(tenant.correlation_key("Other"), None);

        let blank = Tenant::new("Tenants-2", "Blank").with_variable("UAID", "");
        assert_eq!(blank.correlation_key("UAID"), None);
    }

    #[test]
    fn test_project_decodes_inventory_shape() {
        let project: Project =
            serde_json::from_str(r#"{"Id": "Projects-3", "Name": "CDC Install", "Slug": "cdc"}"#)
                .unwrap();
        assert_eq!(project.id, ProjectId::new("Projects-3"));
        assert_eq!(project.name, "CDC Install");
    }
}
