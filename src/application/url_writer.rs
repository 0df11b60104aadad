// Dashboard state -> canonical URL params
//
// Only values that differ from what an empty URL restores are written, so a
// dashboard sitting on its preset has an empty query string.
use crate::application::filter_codec::{encode_filter, merge_where_filter};
use crate::application::overview::ALL_FIELDS_TOKEN;
use crate::application::url_state::explore_state_from_url;
use crate::application::view_state::{
    sort_direction_code, tdd_chart_code, time_grain_code, web_view_code, web_view_for,
};
use crate::domain::dashboard::DashboardState;
use crate::domain::pivot::{PivotChipData, PivotChipType};
use crate::domain::schema::{ExplorePreset, ExploreSpec, MetricsViewSpec};
use crate::domain::time_grain::TimeGrain;
use crate::infrastructure::search_params::SearchParams;
use std::collections::BTreeSet;

/// State an empty URL restores to for this explore.
pub fn baseline_state(
    metrics_view: &MetricsViewSpec,
    explore: &ExploreSpec,
    preset: &ExplorePreset,
) -> DashboardState {
    let restored = explore_state_from_url(&SearchParams::new(), metrics_view, explore, preset);
    DashboardState::new(explore.metrics_view.clone()).with_patch(restored.entity)
}

pub fn to_url_params(
    state: &DashboardState,
    metrics_view: &MetricsViewSpec,
    explore: &ExploreSpec,
    preset: &ExplorePreset,
) -> SearchParams {
    let base = baseline_state(metrics_view, explore, preset);
    let mut params = SearchParams::new();

    if state.active_page != base.active_page || state.pivot.active != base.pivot.active {
        if let Some(code) = web_view_code(web_view_for(state.active_page)) {
            params.append("vw", code);
        }
    }

    let filter = encode_filter(&merge_where_filter(
        &state.where_filter,
        &state.dimension_threshold_filters,
    ));
    let base_filter = encode_filter(&merge_where_filter(
        &base.where_filter,
        &base.dimension_threshold_filters,
    ));
    if filter != base_filter {
        params.append("f", filter);
    }

    if state.selected_time_range != base.selected_time_range {
        if let Some(tr) = &state.selected_time_range {
            params.append("tr", tr.name.clone());
        }
    }
    if state.selected_timezone != base.selected_timezone {
        params.append("tz", state.selected_timezone.clone());
    }
    if state.selected_comparison_time_range != base.selected_comparison_time_range {
        if let Some(ctr) = &state.selected_comparison_time_range {
            params.append("ctr", ctr.name.clone());
        }
    }
    if state.selected_comparison_dimension != base.selected_comparison_dimension {
        if let Some(cd) = &state.selected_comparison_dimension {
            params.append("cd", cd.clone());
        }
    }

    if state.visible_measure_keys != base.visible_measure_keys {
        params.append(
            "o.m",
            field_list(&state.visible_measure_keys, &explore.measures),
        );
    }
    if state.visible_dimension_keys != base.visible_dimension_keys {
        params.append(
            "o.d",
            field_list(&state.visible_dimension_keys, &explore.dimensions),
        );
    }
    if state.leaderboard_measure_name != base.leaderboard_measure_name {
        params.append("o.sb", state.leaderboard_measure_name.clone());
    }
    if state.sort_direction != base.sort_direction {
        params.append("o.sd", sort_direction_code(state.sort_direction));
    }
    if state.selected_dimension_name != base.selected_dimension_name {
        params.append("o.ed", state.selected_dimension_name.clone());
    }

    if state.tdd.expanded_measure_name != base.tdd.expanded_measure_name {
        params.append("tdd.m", state.tdd.expanded_measure_name.clone());
    }
    if state.tdd.chart_type != base.tdd.chart_type {
        params.append("tdd.ct", tdd_chart_code(state.tdd.chart_type));
    }
    if state.tdd.pin_index != base.tdd.pin_index {
        params.append("tdd.p", state.tdd.pin_index.to_string());
    }

    if state.pivot.rows != base.pivot.rows {
        params.append("p.r", chip_list(state.pivot.rows.dimension.iter()));
    }
    if state.pivot.columns != base.pivot.columns {
        let columns = state
            .pivot
            .columns
            .dimension
            .iter()
            .chain(state.pivot.columns.measure.iter());
        params.append("p.c", chip_list(columns));
    }

    params
}

/// `*` when every explore field is visible, else the visible ones in explore
/// order.
fn field_list(visible: &BTreeSet<String>, all: &[String]) -> String {
    if !all.is_empty() && all.iter().all(|f| visible.contains(f)) {
        return ALL_FIELDS_TOKEN.to_string();
    }
    all.iter()
        .filter(|f| visible.contains(*f))
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

fn chip_list<'a>(chips: impl Iterator<Item = &'a PivotChipData>) -> String {
    chips
        .map(|chip| match chip.chip_type {
            PivotChipType::Time => TimeGrain::from_id(&chip.id)
                .map(time_grain_code)
                .unwrap_or(chip.id.as_str()),
            PivotChipType::Measure | PivotChipType::Dimension => chip.id.as_str(),
        })
        .collect::<Vec<_>>()
        .join(",")
}
