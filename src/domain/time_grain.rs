// Time grains usable as pivot chips
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeGrain {
    #[serde(rename = "TIME_GRAIN_MILLISECOND")]
    Millisecond,
    #[serde(rename = "TIME_GRAIN_SECOND")]
    Second,
    #[serde(rename = "TIME_GRAIN_MINUTE")]
    Minute,
    #[serde(rename = "TIME_GRAIN_HOUR")]
    Hour,
    #[serde(rename = "TIME_GRAIN_DAY")]
    Day,
    #[serde(rename = "TIME_GRAIN_WEEK")]
    Week,
    #[serde(rename = "TIME_GRAIN_MONTH")]
    Month,
    #[serde(rename = "TIME_GRAIN_QUARTER")]
    Quarter,
    #[serde(rename = "TIME_GRAIN_YEAR")]
    Year,
}

impl TimeGrain {
    pub const ALL: [TimeGrain; 9] = [
        TimeGrain::Millisecond,
        TimeGrain::Second,
        TimeGrain::Minute,
        TimeGrain::Hour,
        TimeGrain::Day,
        TimeGrain::Week,
        TimeGrain::Month,
        TimeGrain::Quarter,
        TimeGrain::Year,
    ];

    /// Enum name as the runtime spells it; used as the chip id.
    pub fn id(self) -> &'static str {
        match self {
            TimeGrain::Millisecond => "TIME_GRAIN_MILLISECOND",
            TimeGrain::Second => "TIME_GRAIN_SECOND",
            TimeGrain::Minute => "TIME_GRAIN_MINUTE",
            TimeGrain::Hour => "TIME_GRAIN_HOUR",
            TimeGrain::Day => "TIME_GRAIN_DAY",
            TimeGrain::Week => "TIME_GRAIN_WEEK",
            TimeGrain::Month => "TIME_GRAIN_MONTH",
            TimeGrain::Quarter => "TIME_GRAIN_QUARTER",
            TimeGrain::Year => "TIME_GRAIN_YEAR",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeGrain::Millisecond => "millisecond",
            TimeGrain::Second => "second",
            TimeGrain::Minute => "minute",
            TimeGrain::Hour => "hour",
            TimeGrain::Day => "day",
            TimeGrain::Week => "week",
            TimeGrain::Month => "month",
            TimeGrain::Quarter => "quarter",
            TimeGrain::Year => "year",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.id() == id)
    }
}
