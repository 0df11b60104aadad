// Dashboard state assembler - URL params -> partial dashboard entity
use crate::application::filter_codec::{FilterParseError, decode_filter_param};
use crate::application::overview::{from_overview_params, from_time_dimension_params};
use crate::application::pivot_builder::from_pivot_params;
use crate::application::time_range::from_time_range_params;
use crate::application::view_state::{active_page_for, active_page_from_code};
use crate::domain::dashboard::ExploreStatePatch;
use crate::domain::schema::{ExplorePreset, ExploreSpec, KnownFields, MetricsViewSpec};
use crate::infrastructure::search_params::SearchParams;
use serde::Serialize;
use thiserror::Error;

/// Recoverable problems found while reading a URL. None of them stop the
/// rest of the state from being restored.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UrlStateError {
    #[error("invalid filter: {0}")]
    Filter(#[from] FilterParseError),
}

impl Serialize for UrlStateError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExploreStateResult {
    pub entity: ExploreStatePatch,
    pub errors: Vec<UrlStateError>,
}

pub fn explore_state_from_url(
    params: &SearchParams,
    metrics_view: &MetricsViewSpec,
    explore: &ExploreSpec,
    preset: &ExplorePreset,
) -> ExploreStateResult {
    let known = KnownFields::new(metrics_view, explore);
    let mut entity = ExploreStatePatch::default();
    let mut errors = Vec::new();

    if let Some(code) = params.get("vw") {
        entity.active_page = Some(active_page_from_code(code));
    } else if let Some(view) = preset.view {
        entity.active_page = Some(active_page_for(view));
    }

    if let Some(filter) = params.get("f") {
        match decode_filter_param(filter) {
            Ok(decoded) => {
                entity.where_filter = Some(decoded.where_filter);
                entity.dimension_threshold_filters = Some(decoded.dimension_threshold_filters);
            }
            Err(e) => {
                tracing::warn!("Ignoring filter {:?}: {}", filter, e);
                errors.push(UrlStateError::from(e));
            }
        }
    }

    entity.merge(from_time_range_params(params, &known, preset));
    entity.merge(from_overview_params(params, &known, explore, preset));
    entity.tdd = Some(from_time_dimension_params(params, &known, preset));
    entity.pivot = Some(from_pivot_params(params, &known, preset));

    tracing::debug!(
        "Restored explore state for {} from {} params with {} errors",
        explore.metrics_view,
        params.iter().count(),
        errors.len()
    );

    ExploreStateResult { entity, errors }
}
