// Explore definitions served from the local TOML catalog
use crate::application::explore_repository::{ExploreContext, ExploreNotFound, ExploreRepository};
use crate::infrastructure::config::CatalogConfig;
use anyhow::Result;
use async_trait::async_trait;

#[derive(Debug, Clone, Default)]
pub struct CatalogRepository {
    explores: Vec<ExploreContext>,
}

impl CatalogRepository {
    pub fn new(catalog: CatalogConfig) -> Self {
        let explores = catalog
            .explores
            .into_iter()
            .map(|entry| ExploreContext::new(entry.name, entry.metrics_view, entry.explore))
            .collect();
        Self { explores }
    }
}

#[async_trait]
impl ExploreRepository for CatalogRepository {
    async fn list_explores(&self) -> Result<Vec<String>> {
        Ok(self.explores.iter().map(|e| e.name.clone()).collect())
    }

    async fn get_explore(&self, name: &str) -> Result<ExploreContext> {
        self.explores
            .iter()
            .find(|e| e.name == name)
            .cloned()
            .ok_or_else(|| ExploreNotFound(name.to_string()).into())
    }
}
