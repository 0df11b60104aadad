// Pivot rows/columns from `p.r` / `p.c`
use crate::application::view_state::{PIVOT_VIEW_CODE, time_grain_from_code};
use crate::domain::pivot::{PivotChipData, PivotChipType, PivotColumns, PivotRows, PivotState};
use crate::domain::schema::{ExplorePreset, ExploreWebView, KnownFields};
use crate::infrastructure::search_params::SearchParams;

/// Resolves one token: time grain first, then measure, then dimension.
/// Anything else is `None` and gets dropped by the caller.
pub fn pivot_chip_for(token: &str, known: &KnownFields) -> Option<PivotChipData> {
    if let Some(grain) = time_grain_from_code(token) {
        return Some(PivotChipData {
            id: grain.id().to_string(),
            title: grain.label().to_string(),
            chip_type: PivotChipType::Time,
        });
    }

    if let Some(measure) = known.measure(token) {
        return Some(PivotChipData {
            id: token.to_string(),
            title: display_title(measure.label.as_deref(), &measure.name),
            chip_type: PivotChipType::Measure,
        });
    }

    if let Some(dimension) = known.dimension(token) {
        return Some(PivotChipData {
            id: token.to_string(),
            title: display_title(dimension.label.as_deref(), &dimension.name),
            chip_type: PivotChipType::Dimension,
        });
    }

    None
}

fn display_title(label: Option<&str>, name: &str) -> String {
    label
        .filter(|l| !l.is_empty())
        .or(Some(name).filter(|n| !n.is_empty()))
        .unwrap_or("Unknown")
        .to_string()
}

fn tokens_for<'a>(params: &'a SearchParams, key: &str, preset: Option<&'a [String]>) -> Vec<&'a str> {
    match params.get(key) {
        Some(list) => list.split(',').collect(),
        None => preset
            .map(|p| p.iter().map(String::as_str).collect())
            .unwrap_or_default(),
    }
}

pub fn from_pivot_params(
    params: &SearchParams,
    known: &KnownFields,
    preset: &ExplorePreset,
) -> PivotState {
    let rows = PivotRows {
        dimension: tokens_for(params, "p.r", preset.pivot_rows.as_deref())
            .into_iter()
            .filter_map(|token| pivot_chip_for(token, known))
            .collect(),
    };

    let mut columns = PivotColumns::default();
    for chip in tokens_for(params, "p.c", preset.pivot_cols.as_deref())
        .into_iter()
        .filter_map(|token| pivot_chip_for(token, known))
    {
        if chip.chip_type == PivotChipType::Measure {
            columns.measure.push(chip);
        } else {
            columns.dimension.push(chip);
        }
    }

    let active =
        params.get("vw") == Some(PIVOT_VIEW_CODE) || preset.view == Some(ExploreWebView::Pivot);

    PivotState {
        active,
        rows,
        columns,
        ..PivotState::default()
    }
}
