use chrono::NaiveDate;

/// One observation of a surveillance series, as of a given revision date.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundTruthRow {
    pub location: String,
    /// `None` when the source table has no `target` column.
    pub target: Option<String>,
    pub date: NaiveDate,
    pub as_of: NaiveDate,
    pub observation: Option<f64>,
}
