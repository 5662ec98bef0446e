//! Response shapes that differ from the domain model

use std::collections::{BTreeSet, HashMap};

use fleetwatch_types::{Event, Metric, ProjectId, Tenant, TenantId};
use serde::Deserialize;
use serde_json::Value;

/// One entry of the tenant variables listing.
///
/// Project membership is the key set of `ProjectVariables`. Variable values
/// are addressed by template id and resolved to names through the
/// templates declared next to them.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct TenantVariablesResource {
    tenant_id: String,
    tenant_name: String,
    #[serde(default)]
    project_variables: HashMap<String, ProjectVariableSet>,
    #[serde(default)]
    library_variables: HashMap<String, LibraryVariableSet>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct ProjectVariableSet {
    templates: Vec<VariableTemplate>,
    /// Environment id -> template id -> value
    variables: HashMap<String, HashMap<String, Value>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct LibraryVariableSet {
    templates: Vec<VariableTemplate>,
    /// Template id -> value
    variables: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct VariableTemplate {
    id: String,
    name: String,
}

/// Only plain string values are usable; sensitive values come back as objects.
fn plain_value(value: &Value) -> Option<&str> {
    value.as_str()
}

impl From<TenantVariablesResource> for Tenant {
    fn from(resource: TenantVariablesResource) -> Self {
        let mut variables = HashMap::new();

        for set in resource.library_variables.values() {
            for template in &set.templates {
                if let Some(value) = set.variables.get(&template.id).and_then(plain_value) {
                    variables.insert(template.name.clone(), value.to_string());
                }
            }
        }

        // Project-scoped values never shadow library values.
        for set in resource.project_variables.values() {
            for template in &set.templates {
                let value = set
                    .variables
                    .values()
                    .find_map(|by_template| by_template.get(&template.id).and_then(plain_value));
                if let Some(value) = value {
                    variables
                        .entry(template.name.clone())
                        .or_insert_with(|| value.to_string());
                }
            }
        }

        let project_ids: BTreeSet<ProjectId> = resource
            .project_variables
            .keys()
            .map(|k| ProjectId::new(k.as_str()))
            .collect();

        Tenant {
            id: TenantId::new(resource.tenant_id),
            name: resource.tenant_name,
            project_ids,
            variables,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct EventsPage {
    #[serde(default)]
    pub items: Vec<Event>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MetricsResponse {
    pub page: MetricsPage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MetricsPage {
    #[serde(default)]
    pub content: Vec<Metric>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SamplesResponse {
    #[serde(default)]
    pub samples: Vec<Sample>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Sample {
    pub data: SampleData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SampleData {
    pub val: f64,
}
