// Runtime repository - reads explore and metrics view resources over REST
use crate::application::explore_repository::{ExploreContext, ExploreNotFound, ExploreRepository};
use crate::domain::schema::{ExploreSpec, MetricsViewSpec};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;

const EXPLORE_KIND: &str = "rill.runtime.v1.Explore";
const METRICS_VIEW_KIND: &str = "rill.runtime.v1.MetricsView";

#[derive(Debug, Clone)]
pub struct RuntimeRepository {
    host: String,
    instance_id: String,
    token: Option<String>,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct GetResourceResponse {
    resource: Resource,
}

#[derive(Debug, Deserialize)]
struct ListResourcesResponse {
    #[serde(default)]
    resources: Vec<Resource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Resource {
    #[serde(default)]
    meta: Option<ResourceMeta>,
    #[serde(default)]
    explore: Option<ResourceState<ExploreSpec>>,
    #[serde(default)]
    metrics_view: Option<ResourceState<MetricsViewSpec>>,
}

#[derive(Debug, Deserialize)]
struct ResourceMeta {
    name: ResourceName,
}

#[derive(Debug, Deserialize)]
struct ResourceName {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ResourceState<T> {
    #[serde(default = "Option::default")]
    state: Option<ValidSpec<T>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidSpec<T> {
    #[serde(default = "Option::default")]
    valid_spec: Option<T>,
}

impl<T> ResourceState<T> {
    fn into_valid_spec(self) -> Option<T> {
        self.state.and_then(|s| s.valid_spec)
    }
}

impl RuntimeRepository {
    pub fn new(host: String, instance_id: String, token: Option<String>) -> Self {
        Self {
            host: host.trim_end_matches('/').to_string(),
            instance_id,
            token,
            client: reqwest::Client::new(),
        }
    }

    fn instance_url(&self, path: &str) -> String {
        format!(
            "{}/v1/instances/{}/{}",
            self.host,
            urlencoding::encode(&self.instance_id),
            path
        )
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<Option<T>> {
        let mut request = self
            .client
            .get(self.instance_url(path))
            .query(query)
            .header("Accept", "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .context("Failed to send request to runtime")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Runtime request failed with status {}: {}", status, body);
        }

        let data = response
            .json::<T>()
            .await
            .context("Failed to parse runtime response")?;
        Ok(Some(data))
    }

    async fn get_resource(&self, kind: &str, name: &str) -> Result<Option<Resource>> {
        let response: Option<GetResourceResponse> = self
            .fetch("resource", &[("name.kind", kind), ("name.name", name)])
            .await?;
        Ok(response.map(|r| r.resource))
    }
}

#[async_trait]
impl ExploreRepository for RuntimeRepository {
    async fn list_explores(&self) -> Result<Vec<String>> {
        let response: Option<ListResourcesResponse> =
            self.fetch("resources", &[("kind", EXPLORE_KIND)]).await?;

        Ok(response
            .map(|r| r.resources)
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.explore.as_ref().is_some_and(|e| e.state.is_some()))
            .filter_map(|r| r.meta.map(|m| m.name.name))
            .collect())
    }

    async fn get_explore(&self, name: &str) -> Result<ExploreContext> {
        let explore = self
            .get_resource(EXPLORE_KIND, name)
            .await?
            .and_then(|r| r.explore)
            .and_then(ResourceState::into_valid_spec)
            .ok_or_else(|| ExploreNotFound(name.to_string()))?;

        tracing::debug!("Fetching metrics view {} for explore {}", explore.metrics_view, name);
        let metrics_view = self
            .get_resource(METRICS_VIEW_KIND, &explore.metrics_view)
            .await?
            .and_then(|r| r.metrics_view)
            .and_then(ResourceState::into_valid_spec)
            .with_context(|| {
                format!(
                    "Metrics view {} of explore {} has no valid spec",
                    explore.metrics_view, name
                )
            })?;

        Ok(ExploreContext::new(name, metrics_view, explore))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::ExploreWebView;

    #[test]
    fn test_parse_explore_resource() {
        let body = r#"{
            "resource": {
                "meta": {"name": {"kind": "rill.runtime.v1.Explore", "name": "bids_explore"}},
                "explore": {
                    "spec": {"metricsView": "bids"},
                    "state": {
                        "validSpec": {
                            "metricsView": "bids",
                            "measures": ["revenue"],
                            "dimensions": ["publisher"],
                            "defaultPreset": {"view": "EXPLORE_WEB_VIEW_PIVOT", "pivotCols": ["revenue"]}
                        }
                    }
                }
            }
        }"#;
        let response: GetResourceResponse = serde_json::from_str(body).unwrap();
        let spec = response.resource.explore.unwrap().into_valid_spec().unwrap();
        assert_eq!(spec.metrics_view, "bids");
        let preset = spec.default_preset.unwrap();
        assert_eq!(preset.view, Some(ExploreWebView::Pivot));
        assert_eq!(preset.pivot_cols, Some(vec!["revenue".to_string()]));
    }

    #[test]
    fn test_invalid_resource_has_no_spec() {
        let body = r#"{"resource": {"metricsView": {"state": {}}}}"#;
        let response: GetResourceResponse = serde_json::from_str(body).unwrap();
        assert!(response.resource.metrics_view.unwrap().into_valid_spec().is_none());
    }

    #[test]
    fn test_instance_url_trims_host() {
        let repo = RuntimeRepository::new("http://localhost:9009/".into(), "default".into(), None);
        assert_eq!(
            repo.instance_url("resource"),
            "http://localhost:9009/v1/instances/default/resource"
        );
    }
}
