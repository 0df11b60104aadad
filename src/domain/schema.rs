// Read-only schema inputs: metrics view, explore spec and preset
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureSpec {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionSpec {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsViewSpec {
    #[serde(default)]
    pub measures: Vec<MeasureSpec>,
    #[serde(default)]
    pub dimensions: Vec<DimensionSpec>,
}

/// Preset view. Older runtimes spell the values `EXPLORE_ACTIVE_PAGE_*`;
/// anything unrecognized reads as unspecified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExploreWebView {
    #[serde(
        rename = "EXPLORE_WEB_VIEW_OVERVIEW",
        alias = "EXPLORE_ACTIVE_PAGE_OVERVIEW",
        alias = "overview"
    )]
    Overview,
    #[serde(
        rename = "EXPLORE_WEB_VIEW_TIME_DIMENSION",
        alias = "EXPLORE_ACTIVE_PAGE_TIME_DIMENSION",
        alias = "time_dimension"
    )]
    TimeDimension,
    #[serde(
        rename = "EXPLORE_WEB_VIEW_PIVOT",
        alias = "EXPLORE_ACTIVE_PAGE_PIVOT",
        alias = "pivot"
    )]
    Pivot,
    #[serde(rename = "EXPLORE_WEB_VIEW_UNSPECIFIED", other)]
    Unspecified,
}

/// Defaults for every field a URL may override.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorePreset {
    #[serde(default, alias = "time_range")]
    pub time_range: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default, alias = "compare_time_range")]
    pub compare_time_range: Option<String>,
    #[serde(default, alias = "comparison_dimension")]
    pub comparison_dimension: Option<String>,
    #[serde(default)]
    pub measures: Option<Vec<String>>,
    #[serde(default)]
    pub dimensions: Option<Vec<String>>,
    #[serde(default)]
    pub view: Option<ExploreWebView>,
    #[serde(default, alias = "overview_sort_by")]
    pub overview_sort_by: Option<String>,
    #[serde(default, alias = "overview_sort_asc")]
    pub overview_sort_asc: Option<bool>,
    #[serde(default, alias = "overview_expanded_dimension")]
    pub overview_expanded_dimension: Option<String>,
    #[serde(default, alias = "time_dimension_measure")]
    pub time_dimension_measure: Option<String>,
    #[serde(default, alias = "time_dimension_chart_type")]
    pub time_dimension_chart_type: Option<String>,
    #[serde(default, alias = "pivot_rows")]
    pub pivot_rows: Option<Vec<String>>,
    #[serde(default, alias = "pivot_cols")]
    pub pivot_cols: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExploreSpec {
    #[serde(default, alias = "metrics_view")]
    pub metrics_view: String,
    #[serde(default)]
    pub measures: Vec<String>,
    #[serde(default)]
    pub dimensions: Vec<String>,
    #[serde(default, alias = "default_preset")]
    pub default_preset: Option<ExplorePreset>,
}

/// Measures and dimensions that are both defined by the metrics view and
/// exposed by the explore. Membership checks go through here.
#[derive(Debug, Clone, Default)]
pub struct KnownFields {
    measures: HashMap<String, MeasureSpec>,
    dimensions: HashMap<String, DimensionSpec>,
}

impl KnownFields {
    pub fn new(metrics_view: &MetricsViewSpec, explore: &ExploreSpec) -> Self {
        let measures = metrics_view
            .measures
            .iter()
            .filter(|m| explore.measures.contains(&m.name))
            .map(|m| (m.name.clone(), m.clone()))
            .collect();
        let dimensions = metrics_view
            .dimensions
            .iter()
            .filter(|d| explore.dimensions.contains(&d.name))
            .map(|d| (d.name.clone(), d.clone()))
            .collect();
        Self {
            measures,
            dimensions,
        }
    }

    pub fn measure(&self, name: &str) -> Option<&MeasureSpec> {
        self.measures.get(name)
    }

    pub fn dimension(&self, name: &str) -> Option<&DimensionSpec> {
        self.dimensions.get(name)
    }

    pub fn has_measure(&self, name: &str) -> bool {
        self.measures.contains_key(name)
    }

    pub fn has_dimension(&self, name: &str) -> bool {
        self.dimensions.contains_key(name)
    }
}
