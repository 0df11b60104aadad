// Time-range tokens (`tr`, `ctr`, `tz`, `cd`)
use crate::domain::dashboard::{DEFAULT_TIMEZONE, DashboardTimeControls, ExploreStatePatch};
use crate::domain::schema::{ExplorePreset, KnownFields};
use crate::infrastructure::search_params::SearchParams;
use chrono::{DateTime, Utc};

/// Named ranges (`P7D`, `inf`, ...) are resolved downstream; a custom
/// `<start>,<end>` ISO range also carries its instants.
pub fn time_range_from_param(token: &str) -> DashboardTimeControls {
    let (start, end) = token
        .split_once(',')
        .and_then(|(start, end)| Some((parse_instant(start)?, parse_instant(end)?)))
        .map(|(start, end)| (Some(start), Some(end)))
        .unwrap_or((None, None));

    DashboardTimeControls {
        name: token.to_string(),
        start,
        end,
    }
}

fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn from_time_range_params(
    params: &SearchParams,
    known: &KnownFields,
    preset: &ExplorePreset,
) -> ExploreStatePatch {
    let mut patch = ExploreStatePatch::default();

    if let Some(tr) = params.get("tr").or(preset.time_range.as_deref()) {
        patch.selected_time_range = Some(time_range_from_param(tr));
    }

    let timezone = params
        .get("tz")
        .filter(|tz| !tz.is_empty())
        .or(preset.timezone.as_deref().filter(|tz| !tz.is_empty()))
        .unwrap_or(DEFAULT_TIMEZONE);
    patch.selected_timezone = Some(timezone.to_string());

    if let Some(ctr) = params.get("ctr").or(preset.compare_time_range.as_deref()) {
        patch.selected_comparison_time_range = Some(time_range_from_param(ctr));
    }

    if let Some(cd) = params.get("cd").or(preset.comparison_dimension.as_deref()) {
        if known.has_dimension(cd) {
            patch.selected_comparison_dimension = Some(cd.to_string());
        }
    }

    patch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::{DimensionSpec, ExploreSpec, MetricsViewSpec};
    use chrono::TimeZone;

    fn known() -> KnownFields {
        let metrics_view = MetricsViewSpec {
            measures: vec![],
            dimensions: vec![DimensionSpec {
                name: "country".to_string(),
                label: None,
            }],
        };
        let explore = ExploreSpec {
            dimensions: vec!["country".to_string()],
            ..Default::default()
        };
        KnownFields::new(&metrics_view, &explore)
    }

    #[test]
    fn test_named_range_is_not_validated() {
        let tr = time_range_from_param("not-a-range");
        assert_eq!(tr.name, "not-a-range");
        assert_eq!(tr.start, None);
        assert_eq!(tr.end, None);
    }

    #[test]
    fn test_iso_range_carries_instants() {
        let tr = time_range_from_param("2024-01-01T00:00:00Z,2024-02-01T00:00:00+01:00");
        assert_eq!(tr.start, Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
        assert_eq!(tr.end, Some(Utc.with_ymd_and_hms(2024, 1, 31, 23, 0, 0).unwrap()));
    }

    #[test]
    fn test_timezone_defaults_to_utc() {
        let patch = from_time_range_params(&SearchParams::new(), &known(), &ExplorePreset::default());
        assert_eq!(patch.selected_timezone.as_deref(), Some(DEFAULT_TIMEZONE));
        assert_eq!(patch.selected_time_range, None);
    }

    #[test]
    fn test_url_overrides_preset() {
        let preset = ExplorePreset {
            time_range: Some("P7D".to_string()),
            timezone: Some("Europe/Paris".to_string()),
            ..Default::default()
        };
        let params = SearchParams::parse("tr=PT24H&tz=Asia/Kolkata");
        let patch = from_time_range_params(&params, &known(), &preset);
        assert_eq!(patch.selected_time_range.unwrap().name, "PT24H");
        assert_eq!(patch.selected_timezone.as_deref(), Some("Asia/Kolkata"));

        let patch = from_time_range_params(&SearchParams::new(), &known(), &preset);
        assert_eq!(patch.selected_time_range.unwrap().name, "P7D");
        assert_eq!(patch.selected_timezone.as_deref(), Some("Europe/Paris"));

        let patch = from_time_range_params(&SearchParams::parse("tz="), &known(), &preset);
        assert_eq!(patch.selected_timezone.as_deref(), Some("Europe/Paris"));
    }

    #[test]
    fn test_comparison_dimension_must_be_known() {
        let params = SearchParams::parse("cd=device&ctr=rill-PP");
        let patch = from_time_range_params(&params, &known(), &ExplorePreset::default());
        assert_eq!(patch.selected_comparison_dimension, None);
        assert_eq!(patch.selected_comparison_time_range.unwrap().name, "rill-PP");

        let params = SearchParams::parse("cd=country");
        let patch = from_time_range_params(&params, &known(), &ExplorePreset::default());
        assert_eq!(patch.selected_comparison_dimension.as_deref(), Some("country"));
    }
}
