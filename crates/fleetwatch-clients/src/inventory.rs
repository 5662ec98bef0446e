//! Deployment/inventory manager client

use async_trait::async_trait;
use fleetwatch_types::{Event, EventQuery, Machine, Project, Tenant};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{ClientError, ClientResult};
use crate::http::{handle_response, segment_url};
use crate::wire::{EventsPage, TenantVariablesResource};

const API_KEY_HEADER: &str = "X-Octopus-ApiKey";

/// Read access to the inventory system.
#[async_trait]
pub trait InventoryClient: Send + Sync {
    /// All machines, in upstream order.
    async fn fetch_machines(&self) -> ClientResult<Vec<Machine>>;

    /// All tenants with their project memberships and variables.
    async fn fetch_tenants(&self) -> ClientResult<Vec<Tenant>>;

    /// A single project looked up by name.
    async fn fetch_project(&self, name: &str) -> ClientResult<Project>;

    /// Lifecycle events matching a filter, newest first.
    async fn fetch_events(&self, query: &EventQuery) -> ClientResult<Vec<Event>>;
}

/// HTTP client for the inventory REST API.
pub struct HttpInventoryClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpInventoryClient {
    /// Create a client scoped to one space of an instance.
    pub fn new(client: Client, instance_url: &str, space: &str, api_key: impl Into<String>) -> Self {
        let instance_url = instance_url.trim_end_matches('/');
        let base_url = if space.is_empty() {
            format!("{}/api", instance_url)
        } else {
            format!("{}/api/{}", instance_url, space)
        };

        Self {
            client,
            base_url,
            api_key: api_key.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
        caller: &str,
    ) -> ClientResult<T> {
        let url = segment_url(&self.base_url, segments)?;
        debug!(url = %url, "inventory request");

        let response = self
            .client
            .get(url)
            .query(query)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        handle_response(response, caller).await
    }
}

#[async_trait]
impl InventoryClient for HttpInventoryClient {
    async fn fetch_machines(&self) -> ClientResult<Vec<Machine>> {
        self.get(&["machines", "all"], &[], "machines").await
    }

    async fn fetch_tenants(&self) -> ClientResult<Vec<Tenant>> {
        let resources: Vec<TenantVariablesResource> =
            self.get(&["tenantvariables", "all"], &[], "tenants").await?;

        Ok(resources.into_iter().map(Tenant::from).collect())
    }

    async fn fetch_project(&self, name: &str) -> ClientResult<Project> {
        if name.is_empty() || name == "all" {
            return Err(ClientError::InvalidInput(format!(
                "project name {:?} does not identify a single project",
                name
            )));
        }

        self.get(&["projects", name], &[], "project").await
    }

    async fn fetch_events(&self, query: &EventQuery) -> ClientResult<Vec<Event>> {
        let page: EventsPage = self
            .get(&["events"], &query.query_pairs(), "events")
            .await?;

        Ok(page.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalization() {
        let client = HttpInventoryClient::new(Client::new(), "https://deploy.example.com/", "Spaces-1", "key");
        assert_eq!(client.base_url(), "https://deploy.example.com/api/Spaces-1");

        let client = HttpInventoryClient::new(Client::new(), "https://deploy.example.com", "", "key");
        assert_eq!(client.base_url(), "https://deploy.example.com/api");
    }

    #[tokio::test]
    async fn test_fetch_project_rejects_listing_names() {
        let client = HttpInventoryClient::new(Client::new(), "http://127.0.0.1:1", "Spaces-1", "key");

        assert!(matches!(
            client.fetch_project("").await,
            Err(ClientError::InvalidInput(_))
        ));
        assert!(matches!(
            client.fetch_project("all").await,
            Err(ClientError::InvalidInput(_))
        ));
    }
}
