// Repository trait for explore definitions
use crate::domain::schema::{ExplorePreset, ExploreSpec, MetricsViewSpec};
use async_trait::async_trait;
use thiserror::Error;

/// Everything the URL state mappers read for one explore.
#[derive(Debug, Clone, Default)]
pub struct ExploreContext {
    pub name: String,
    pub metrics_view: MetricsViewSpec,
    pub explore: ExploreSpec,
    pub preset: ExplorePreset,
}

impl ExploreContext {
    /// Uses the explore's default preset when it has one.
    pub fn new(name: impl Into<String>, metrics_view: MetricsViewSpec, explore: ExploreSpec) -> Self {
        let preset = explore.default_preset.clone().unwrap_or_default();
        Self {
            name: name.into(),
            metrics_view,
            explore,
            preset,
        }
    }
}

#[derive(Debug, Error)]
#[error("explore {0} not found")]
pub struct ExploreNotFound(pub String);

#[async_trait]
pub trait ExploreRepository: Send + Sync {
    /// Names of every explore this repository can serve
    async fn list_explores(&self) -> anyhow::Result<Vec<String>>;

    /// Metrics view, explore spec and preset for one explore. Fails with
    /// [`ExploreNotFound`] when the name is unknown.
    async fn get_explore(&self, name: &str) -> anyhow::Result<ExploreContext>;
}
