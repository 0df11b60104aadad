// Overview (leaderboard) and time-dimension-detail URL params
use crate::application::view_state::{sort_direction_from_code, tdd_chart_from_code};
use crate::domain::dashboard::{
    DEFAULT_SORT_DIRECTION, ExploreStatePatch, SortDirection, TddChart, TddState,
};
use crate::domain::schema::{ExplorePreset, ExploreSpec, KnownFields};
use crate::infrastructure::search_params::SearchParams;
use std::collections::BTreeSet;

pub const ALL_FIELDS_TOKEN: &str = "*";

pub fn from_overview_params(
    params: &SearchParams,
    known: &KnownFields,
    explore: &ExploreSpec,
    preset: &ExplorePreset,
) -> ExploreStatePatch {
    let mut patch = ExploreStatePatch::default();

    let measures = select_fields(
        params.get("o.m"),
        preset.measures.as_deref(),
        &explore.measures,
        |m| known.has_measure(m),
    );
    patch.all_measures_visible = Some(measures.len() == explore.measures.len());
    patch.visible_measure_keys = Some(measures.into_iter().collect::<BTreeSet<_>>());

    let dimensions = select_fields(
        params.get("o.d"),
        preset.dimensions.as_deref(),
        &explore.dimensions,
        |d| known.has_dimension(d),
    );
    patch.all_dimensions_visible = Some(dimensions.len() == explore.dimensions.len());
    patch.visible_dimension_keys = Some(dimensions.into_iter().collect::<BTreeSet<_>>());

    let leaderboard_measure = named_field(params.get("o.sb"), |m| known.has_measure(m))
        .or(preset.overview_sort_by.as_deref())
        .or(preset.measures.as_ref().and_then(|m| m.first()).map(String::as_str))
        .or(explore.measures.first().map(String::as_str));
    patch.leaderboard_measure_name = leaderboard_measure.map(str::to_string);

    patch.sort_direction = Some(match params.get("o.sd") {
        Some(code) => sort_direction_from_code(code),
        None => match preset.overview_sort_asc {
            Some(true) => SortDirection::Ascending,
            Some(false) => SortDirection::Descending,
            None => DEFAULT_SORT_DIRECTION,
        },
    });

    let expanded = named_field(params.get("o.ed"), |d| known.has_dimension(d))
        .or(preset.overview_expanded_dimension.as_deref())
        .unwrap_or_default();
    patch.selected_dimension_name = Some(expanded.to_string());

    patch
}

/// A present but empty param clears the field; unknown names fall through to
/// the preset.
fn named_field<'a>(param: Option<&'a str>, is_known: impl Fn(&str) -> bool) -> Option<&'a str> {
    param.filter(|name| name.is_empty() || is_known(*name))
}

/// `*` selects every explore field; a list keeps only the known names; no
/// param falls back to the preset, then to the explore.
fn select_fields(
    param: Option<&str>,
    preset: Option<&[String]>,
    explore: &[String],
    is_known: impl Fn(&str) -> bool,
) -> Vec<String> {
    match param {
        Some(ALL_FIELDS_TOKEN) => explore.to_vec(),
        Some(list) => list
            .split(',')
            .filter(|name| is_known(*name))
            .map(str::to_string)
            .collect(),
        None => preset.unwrap_or(explore).to_vec(),
    }
}

pub fn from_time_dimension_params(
    params: &SearchParams,
    known: &KnownFields,
    preset: &ExplorePreset,
) -> TddState {
    let expanded_measure_name = named_field(params.get("tdd.m"), |m| known.has_measure(m))
        .or(preset.time_dimension_measure.as_deref())
        .unwrap_or_default()
        .to_string();

    let chart_type = params
        .get("tdd.ct")
        .and_then(tdd_chart_from_code)
        .or_else(|| {
            preset
                .time_dimension_chart_type
                .as_deref()
                .and_then(|ct| TddChart::parse(ct).or_else(|| tdd_chart_from_code(ct)))
        })
        .unwrap_or_default();

    let pin_index = params
        .get("tdd.p")
        .and_then(|p| p.trim().parse::<i64>().ok())
        .unwrap_or(-1);

    TddState {
        expanded_measure_name,
        chart_type,
        pin_index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::{DimensionSpec, MeasureSpec, MetricsViewSpec};

    fn fixture() -> (KnownFields, ExploreSpec) {
        let metrics_view = MetricsViewSpec {
            measures: ["revenue", "clicks", "ctr"]
                .iter()
                .map(|n| MeasureSpec {
                    name: n.to_string(),
                    label: None,
                })
                .collect(),
            dimensions: ["country", "device"]
                .iter()
                .map(|n| DimensionSpec {
                    name: n.to_string(),
                    label: None,
                })
                .collect(),
        };
        let explore = ExploreSpec {
            metrics_view: "ads".to_string(),
            measures: vec!["revenue".into(), "clicks".into(), "ctr".into()],
            dimensions: vec!["country".into(), "device".into()],
            default_preset: None,
        };
        (KnownFields::new(&metrics_view, &explore), explore)
    }

    #[test]
    fn test_star_selects_every_explore_measure() {
        let (known, explore) = fixture();
        let preset = ExplorePreset {
            measures: Some(vec!["revenue".into()]),
            ..Default::default()
        };
        let patch = from_overview_params(&SearchParams::parse("o.m=*"), &known, &explore, &preset);
        assert_eq!(patch.all_measures_visible, Some(true));
        assert_eq!(
            patch.visible_measure_keys.unwrap(),
            explore.measures.iter().cloned().collect::<BTreeSet<_>>()
        );
    }

    #[test]
    fn test_measure_list_drops_unknown_names() {
        let (known, explore) = fixture();
        let params = SearchParams::parse("o.m=clicks,bogus&o.d=device");
        let patch = from_overview_params(&params, &known, &explore, &ExplorePreset::default());
        assert_eq!(patch.all_measures_visible, Some(false));
        assert_eq!(
            patch.visible_measure_keys.unwrap().into_iter().collect::<Vec<_>>(),
            vec!["clicks".to_string()]
        );
        assert_eq!(patch.all_dimensions_visible, Some(false));
    }

    #[test]
    fn test_sort_direction_url_overrides_preset() {
        let (known, explore) = fixture();
        let preset = ExplorePreset {
            overview_sort_asc: Some(false),
            ..Default::default()
        };
        let patch = from_overview_params(&SearchParams::parse("o.sd=ASC"), &known, &explore, &preset);
        assert_eq!(patch.sort_direction, Some(SortDirection::Ascending));

        let patch = from_overview_params(&SearchParams::new(), &known, &explore, &ExplorePreset::default());
        assert_eq!(patch.sort_direction, Some(DEFAULT_SORT_DIRECTION));
    }

    #[test]
    fn test_leaderboard_measure_fallbacks() {
        let (known, explore) = fixture();
        let patch = from_overview_params(&SearchParams::parse("o.sb=bogus"), &known, &explore, &ExplorePreset::default());
        assert_eq!(patch.leaderboard_measure_name.as_deref(), Some("revenue"));

        let preset = ExplorePreset {
            measures: Some(vec!["ctr".into()]),
            ..Default::default()
        };
        let patch = from_overview_params(&SearchParams::new(), &known, &explore, &preset);
        assert_eq!(patch.leaderboard_measure_name.as_deref(), Some("ctr"));

        let patch = from_overview_params(&SearchParams::parse("o.sb=clicks&o.ed=device"), &known, &explore, &preset);
        assert_eq!(patch.leaderboard_measure_name.as_deref(), Some("clicks"));
        assert_eq!(patch.selected_dimension_name.as_deref(), Some("device"));
    }

    #[test]
    fn test_empty_param_clears_preset_field() {
        let (known, explore) = fixture();
        let preset = ExplorePreset {
            overview_expanded_dimension: Some("country".into()),
            overview_sort_by: Some("ctr".into()),
            time_dimension_measure: Some("revenue".into()),
            ..Default::default()
        };
        let params = SearchParams::parse("o.ed=&o.sb=&tdd.m=");
        let patch = from_overview_params(&params, &known, &explore, &preset);
        assert_eq!(patch.selected_dimension_name.as_deref(), Some(""));
        assert_eq!(patch.leaderboard_measure_name.as_deref(), Some(""));
        let tdd = from_time_dimension_params(&params, &known, &preset);
        assert_eq!(tdd.expanded_measure_name, "");

        let params = SearchParams::parse("o.ed=bogus&o.sb=bogus&tdd.m=bogus");
        let patch = from_overview_params(&params, &known, &explore, &preset);
        assert_eq!(patch.selected_dimension_name.as_deref(), Some("country"));
        assert_eq!(patch.leaderboard_measure_name.as_deref(), Some("ctr"));
        let tdd = from_time_dimension_params(&params, &known, &preset);
        assert_eq!(tdd.expanded_measure_name, "revenue");
    }

    #[test]
    fn test_time_dimension_state() {
        let (known, _) = fixture();
        let tdd = from_time_dimension_params(
            &SearchParams::parse("tdd.m=clicks&tdd.ct=stacked_area&tdd.p=3"),
            &known,
            &ExplorePreset::default(),
        );
        assert_eq!(tdd.expanded_measure_name, "clicks");
        assert_eq!(tdd.chart_type, TddChart::StackedArea);
        assert_eq!(tdd.pin_index, 3);

        let tdd = from_time_dimension_params(
            &SearchParams::parse("tdd.m=bogus&tdd.ct=pie&tdd.p=abc"),
            &known,
            &ExplorePreset::default(),
        );
        assert_eq!(tdd, TddState::default());
    }
}
