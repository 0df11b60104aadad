// Pivot table state
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PivotChipType {
    Time,
    Measure,
    Dimension,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotChipData {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub chip_type: PivotChipType,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PivotRows {
    pub dimension: Vec<PivotChipData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PivotColumns {
    pub measure: Vec<PivotChipData>,
    pub dimension: Vec<PivotChipData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotSort {
    pub id: String,
    pub desc: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PivotRowJoinType {
    #[default]
    Nest,
    Flat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotState {
    pub active: bool,
    pub rows: PivotRows,
    pub columns: PivotColumns,
    pub expanded: BTreeMap<String, bool>,
    pub sorting: Vec<PivotSort>,
    pub column_page: u32,
    pub row_page: u32,
    pub enable_comparison: bool,
    pub active_cell: Option<(String, String)>,
    pub row_join_type: PivotRowJoinType,
}

impl Default for PivotState {
    fn default() -> Self {
        Self {
            active: false,
            rows: PivotRows::default(),
            columns: PivotColumns::default(),
            expanded: BTreeMap::new(),
            sorting: Vec::new(),
            column_page: 1,
            row_page: 1,
            enable_comparison: false,
            active_cell: None,
            row_join_type: PivotRowJoinType::Nest,
        }
    }
}
