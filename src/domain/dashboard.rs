// Dashboard domain model
use super::expression::{Expression, Operation};
use super::pivot::PivotState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

pub const DEFAULT_TIMEZONE: &str = "UTC";
pub const DEFAULT_SORT_DIRECTION: SortDirection = SortDirection::Descending;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Page shown by the dashboard, numbered like the persisted dashboard proto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ActivePage {
    #[default]
    Unspecified,
    Default,
    DimensionTable,
    TimeDimensionalDetail,
    Pivot,
}

impl From<ActivePage> for u8 {
    fn from(page: ActivePage) -> u8 {
        match page {
            ActivePage::Unspecified => 0,
            ActivePage::Default => 1,
            ActivePage::DimensionTable => 2,
            ActivePage::TimeDimensionalDetail => 3,
            ActivePage::Pivot => 4,
        }
    }
}

impl TryFrom<u8> for ActivePage {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ActivePage::Unspecified),
            1 => Ok(ActivePage::Default),
            2 => Ok(ActivePage::DimensionTable),
            3 => Ok(ActivePage::TimeDimensionalDetail),
            4 => Ok(ActivePage::Pivot),
            other => Err(format!("unknown active page {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardTimeControls {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureFilterEntry {
    pub measure: String,
    pub operation: Operation,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionThresholdFilter {
    pub name: String,
    pub filters: Vec<MeasureFilterEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TddChart {
    #[default]
    Default,
    GroupedBar,
    StackedBar,
    StackedArea,
}

impl TddChart {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "default" => Some(TddChart::Default),
            "grouped_bar" => Some(TddChart::GroupedBar),
            "stacked_bar" => Some(TddChart::StackedBar),
            "stacked_area" => Some(TddChart::StackedArea),
            _ => None,
        }
    }
}

/// Time-dimension-detail view state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TddState {
    pub expanded_measure_name: String,
    pub chart_type: TddChart,
    pub pin_index: i64,
}

impl Default for TddState {
    fn default() -> Self {
        Self {
            expanded_measure_name: String::new(),
            chart_type: TddChart::Default,
            pin_index: -1,
        }
    }
}

/// Partial dashboard entity produced from a URL. Unset fields leave the
/// current state untouched when applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExploreStatePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_page: Option<ActivePage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub where_filter: Option<Expression>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension_threshold_filters: Option<Vec<DimensionThresholdFilter>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_time_range: Option<DashboardTimeControls>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_comparison_time_range: Option<DashboardTimeControls>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_comparison_dimension: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_measures_visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible_measure_keys: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_dimensions_visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible_dimension_keys: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leaderboard_measure_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_direction: Option<SortDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_dimension_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tdd: Option<TddState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pivot: Option<PivotState>,
}

impl ExploreStatePatch {
    /// Copies every field set in `other` over this patch.
    pub fn merge(&mut self, other: ExploreStatePatch) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() { self.$field = other.$field; })*
            };
        }
        take!(
            active_page,
            where_filter,
            dimension_threshold_filters,
            selected_time_range,
            selected_timezone,
            selected_comparison_time_range,
            selected_comparison_dimension,
            all_measures_visible,
            visible_measure_keys,
            all_dimensions_visible,
            visible_dimension_keys,
            leaderboard_measure_name,
            sort_direction,
            selected_dimension_name,
            tdd,
            pivot
        );
    }
}

/// Complete dashboard state as held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardState {
    pub name: String,
    pub active_page: ActivePage,
    pub where_filter: Expression,
    pub dimension_threshold_filters: Vec<DimensionThresholdFilter>,
    pub selected_time_range: Option<DashboardTimeControls>,
    pub selected_timezone: String,
    pub selected_comparison_time_range: Option<DashboardTimeControls>,
    pub selected_comparison_dimension: Option<String>,
    pub all_measures_visible: bool,
    pub visible_measure_keys: BTreeSet<String>,
    pub all_dimensions_visible: bool,
    pub visible_dimension_keys: BTreeSet<String>,
    pub leaderboard_measure_name: String,
    pub sort_direction: SortDirection,
    pub selected_dimension_name: String,
    pub tdd: TddState,
    pub pivot: PivotState,
}

impl DashboardState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active_page: ActivePage::Default,
            where_filter: Expression::and(Vec::new()),
            dimension_threshold_filters: Vec::new(),
            selected_time_range: None,
            selected_timezone: DEFAULT_TIMEZONE.to_string(),
            selected_comparison_time_range: None,
            selected_comparison_dimension: None,
            all_measures_visible: true,
            visible_measure_keys: BTreeSet::new(),
            all_dimensions_visible: true,
            visible_dimension_keys: BTreeSet::new(),
            leaderboard_measure_name: String::new(),
            sort_direction: DEFAULT_SORT_DIRECTION,
            selected_dimension_name: String::new(),
            tdd: TddState::default(),
            pivot: PivotState::default(),
        }
    }

    /// Returns a new state with every field set in `patch` replaced.
    pub fn with_patch(&self, patch: ExploreStatePatch) -> Self {
        let mut next = self.clone();
        if let Some(page) = patch.active_page {
            next.active_page = page;
        }
        if let Some(filter) = patch.where_filter {
            next.where_filter = filter;
        }
        if let Some(filters) = patch.dimension_threshold_filters {
            next.dimension_threshold_filters = filters;
        }
        if let Some(range) = patch.selected_time_range {
            next.selected_time_range = Some(range);
        }
        if let Some(tz) = patch.selected_timezone {
            next.selected_timezone = tz;
        }
        if let Some(range) = patch.selected_comparison_time_range {
            next.selected_comparison_time_range = Some(range);
        }
        if let Some(dim) = patch.selected_comparison_dimension {
            next.selected_comparison_dimension = Some(dim);
        }
        if let Some(all) = patch.all_measures_visible {
            next.all_measures_visible = all;
        }
        if let Some(keys) = patch.visible_measure_keys {
            next.visible_measure_keys = keys;
        }
        if let Some(all) = patch.all_dimensions_visible {
            next.all_dimensions_visible = all;
        }
        if let Some(keys) = patch.visible_dimension_keys {
            next.visible_dimension_keys = keys;
        }
        if let Some(measure) = patch.leaderboard_measure_name {
            next.leaderboard_measure_name = measure;
        }
        if let Some(dir) = patch.sort_direction {
            next.sort_direction = dir;
        }
        if let Some(dim) = patch.selected_dimension_name {
            next.selected_dimension_name = dim;
        }
        if let Some(tdd) = patch.tdd {
            next.tdd = tdd;
        }
        if let Some(pivot) = patch.pivot {
            next.pivot = pivot;
        }
        next
    }
}
