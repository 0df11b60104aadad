use crate::domain::schema::{ExploreSpec, MetricsViewSpec};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub server: ServerSettings,
    #[serde(default)]
    pub runtime: Option<RuntimeSettings>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind_addr: String,
    #[serde(default)]
    pub source: ExploreSource,
}

/// Where explore definitions come from.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExploreSource {
    #[default]
    Catalog,
    Runtime,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RuntimeSettings {
    pub host: String,
    pub instance_id: String,
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CatalogConfig {
    #[serde(default)]
    pub explores: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogEntry {
    pub name: String,
    pub metrics_view: MetricsViewSpec,
    pub explore: ExploreSpec,
}

pub fn load_service_config() -> anyhow::Result<ServiceConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/server"))
        .add_source(config::Environment::with_prefix("EXPLORE_STATE").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

pub fn load_catalog_config() -> anyhow::Result<CatalogConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/explores"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Parses a catalog from TOML text.
#[cfg(test)]
pub fn parse_catalog_config(toml: &str) -> anyhow::Result<CatalogConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::ExploreWebView;

    #[test]
    fn test_parse_catalog_config() {
        let catalog = parse_catalog_config(
            r#"
            [[explores]]
            name = "bids_explore"

            [explores.metrics_view]
            measures = [{ name = "revenue", label = "Revenue" }]
            dimensions = [{ name = "publisher" }]

            [explores.explore]
            metrics_view = "bids"
            measures = ["revenue"]
            dimensions = ["publisher"]

            [explores.explore.default_preset]
            time_range = "P7D"
            view = "pivot"
            pivot_rows = ["publisher"]
            "#,
        )
        .unwrap();

        assert_eq!(catalog.explores.len(), 1);
        let entry = &catalog.explores[0];
        assert_eq!(entry.name, "bids_explore");
        assert_eq!(entry.metrics_view.measures[0].label.as_deref(), Some("Revenue"));
        assert_eq!(entry.explore.metrics_view, "bids");
        let preset = entry.explore.default_preset.as_ref().unwrap();
        assert_eq!(preset.time_range.as_deref(), Some("P7D"));
        assert_eq!(preset.view, Some(ExploreWebView::Pivot));
        assert_eq!(preset.pivot_rows, Some(vec!["publisher".to_string()]));
    }
}
