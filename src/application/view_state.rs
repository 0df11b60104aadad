// URL short codes <-> view enums
use crate::domain::dashboard::{ActivePage, DEFAULT_SORT_DIRECTION, SortDirection, TddChart};
use crate::domain::schema::ExploreWebView;
use crate::domain::time_grain::TimeGrain;

const VIEW_CODES: [(&str, ExploreWebView); 3] = [
    ("overview", ExploreWebView::Overview),
    ("time_dimension", ExploreWebView::TimeDimension),
    ("pivot", ExploreWebView::Pivot),
];

const TDD_CHART_CODES: [(&str, TddChart); 4] = [
    ("line", TddChart::Default),
    ("bar", TddChart::GroupedBar),
    ("stacked_bar", TddChart::StackedBar),
    ("stacked_area", TddChart::StackedArea),
];

const TIME_GRAIN_CODES: [(&str, TimeGrain); 9] = [
    ("time.millisecond", TimeGrain::Millisecond),
    ("time.second", TimeGrain::Second),
    ("time.minute", TimeGrain::Minute),
    ("time.hour", TimeGrain::Hour),
    ("time.day", TimeGrain::Day),
    ("time.week", TimeGrain::Week),
    ("time.month", TimeGrain::Month),
    ("time.quarter", TimeGrain::Quarter),
    ("time.year", TimeGrain::Year),
];

pub const PIVOT_VIEW_CODE: &str = "pivot";

pub fn web_view_from_code(code: &str) -> Option<ExploreWebView> {
    VIEW_CODES.iter().find(|(c, _)| *c == code).map(|(_, v)| *v)
}

pub fn web_view_code(view: ExploreWebView) -> Option<&'static str> {
    VIEW_CODES.iter().find(|(_, v)| *v == view).map(|(c, _)| *c)
}

pub fn active_page_for(view: ExploreWebView) -> ActivePage {
    match view {
        ExploreWebView::Overview => ActivePage::Default,
        ExploreWebView::TimeDimension => ActivePage::TimeDimensionalDetail,
        ExploreWebView::Pivot => ActivePage::Pivot,
        ExploreWebView::Unspecified => ActivePage::Unspecified,
    }
}

/// Unknown codes leave the page unspecified.
pub fn active_page_from_code(code: &str) -> ActivePage {
    web_view_from_code(code)
        .map(active_page_for)
        .unwrap_or(ActivePage::Unspecified)
}

/// Web view that renders the given page. The dimension table is part of the
/// overview.
pub fn web_view_for(page: ActivePage) -> ExploreWebView {
    match page {
        ActivePage::Default | ActivePage::DimensionTable => ExploreWebView::Overview,
        ActivePage::TimeDimensionalDetail => ExploreWebView::TimeDimension,
        ActivePage::Pivot => ExploreWebView::Pivot,
        ActivePage::Unspecified => ExploreWebView::Unspecified,
    }
}

pub fn sort_direction_from_code(code: &str) -> SortDirection {
    match code {
        "ASC" => SortDirection::Ascending,
        "DESC" => SortDirection::Descending,
        _ => DEFAULT_SORT_DIRECTION,
    }
}

pub fn sort_direction_code(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Ascending => "ASC",
        SortDirection::Descending => "DESC",
    }
}

pub fn tdd_chart_from_code(code: &str) -> Option<TddChart> {
    TDD_CHART_CODES.iter().find(|(c, _)| *c == code).map(|(_, t)| *t)
}

pub fn tdd_chart_code(chart: TddChart) -> &'static str {
    TDD_CHART_CODES
        .iter()
        .find(|(_, t)| *t == chart)
        .map(|(c, _)| *c)
        .unwrap_or("line")
}

pub fn time_grain_from_code(code: &str) -> Option<TimeGrain> {
    TIME_GRAIN_CODES.iter().find(|(c, _)| *c == code).map(|(_, g)| *g)
}

pub fn time_grain_code(grain: TimeGrain) -> &'static str {
    TIME_GRAIN_CODES
        .iter()
        .find(|(_, g)| *g == grain)
        .map(|(c, _)| *c)
        .unwrap_or("time.day")
}
