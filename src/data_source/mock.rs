//! Sample data source for demos and development
//!
//! Provides a small set of multi-channel conversion journeys using the same
//! column names as a typical warehouse export.

use super::{DataSource, InputTable, Row};
use crate::Result;
use async_trait::async_trait;
use serde_json::json;

pub const SAMPLE_ID_COLUMN: &str = "conversion_id";
pub const SAMPLE_CHANNEL_COLUMN: &str = "source_medium";
pub const SAMPLE_TIMESTAMP_COLUMN: &str = "interaction_datetime";
pub const SAMPLE_FIRST_CLICK_COLUMN: &str = "first_click";
pub const SAMPLE_LAST_CLICK_COLUMN: &str = "last_click";

/// (conversion id, channel, timestamp)
const SAMPLE_TOUCHPOINTS: &[(&str, &str, &str)] = &[
    ("CONV_001", "google / cpc", "2024-06-01 10:30:00"),
    ("CONV_001", "facebook / social", "2024-06-01 12:05:00"),
    ("CONV_001", "email / newsletter", "2024-06-01 15:40:00"),
    ("CONV_002", "facebook / social", "2024-06-01 14:20:00"),
    ("CONV_002", "direct / none", "2024-06-01 16:25:00"),
    ("CONV_003", "email / newsletter", "2024-06-02 09:15:00"),
    ("CONV_004", "google / cpc", "2024-06-02 08:00:00"),
    ("CONV_004", "google / organic", "2024-06-02 09:30:00"),
    ("CONV_004", "email / newsletter", "2024-06-02 11:10:00"),
    ("CONV_005", "google / cpc", "2024-06-03 18:45:00"),
    ("CONV_005", "facebook / social", "2024-06-03 19:10:00"),
    ("CONV_005", "email / newsletter", "2024-06-04 07:55:00"),
    ("CONV_006", "direct / none", "2024-06-04 13:00:00"),
    ("CONV_007", "google / organic", "2024-06-05 10:00:00"),
    ("CONV_007", "direct / none", "2024-06-05 10:45:00"),
    ("CONV_008", "facebook / social", "2024-06-05 21:30:00"),
    ("CONV_008", "google / cpc", "2024-06-06 08:10:00"),
    ("CONV_008", "direct / none", "2024-06-06 09:00:00"),
];

/// Sample data source providing hardcoded touchpoint rows
#[derive(Debug, Clone, Default)]
pub struct SampleDataSource;

impl SampleDataSource {
    pub fn new() -> Self {
        Self
    }

    /// Build the sample table synchronously
    pub fn table() -> InputTable {
        let mut rows: Vec<Row> = Vec::with_capacity(SAMPLE_TOUCHPOINTS.len());
        for (i, (id, channel, ts)) in SAMPLE_TOUCHPOINTS.iter().enumerate() {
            let is_first = i == 0 || SAMPLE_TOUCHPOINTS[i - 1].0 != *id;
            let is_last = SAMPLE_TOUCHPOINTS.get(i + 1).is_none_or(|next| next.0 != *id);
            let row = json!({
                SAMPLE_ID_COLUMN: id,
                SAMPLE_CHANNEL_COLUMN: channel,
                SAMPLE_TIMESTAMP_COLUMN: ts,
                SAMPLE_FIRST_CLICK_COLUMN: if is_first { "TRUE" } else { "FALSE" },
                SAMPLE_LAST_CLICK_COLUMN: if is_last { "TRUE" } else { "FALSE" },
            });
            if let serde_json::Value::Object(map) = row {
                rows.push(map);
            }
        }

        InputTable::new(
            vec![
                SAMPLE_ID_COLUMN.to_string(),
                SAMPLE_CHANNEL_COLUMN.to_string(),
                SAMPLE_TIMESTAMP_COLUMN.to_string(),
                SAMPLE_FIRST_CLICK_COLUMN.to_string(),
                SAMPLE_LAST_CLICK_COLUMN.to_string(),
            ],
            rows,
        )
    }
}

#[async_trait]
impl DataSource for SampleDataSource {
    async fn load_table(&self) -> Result<InputTable> {
        Ok(Self::table())
    }

    fn describe(&self) -> String {
        "built-in sample".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sample_table_shape() {
        let table = SampleDataSource::new().load_table().await.unwrap();
        assert_eq!(table.len(), SAMPLE_TOUCHPOINTS.len());
        assert_eq!(table.columns.len(), 5);
        for row in &table.rows {
            for column in &table.columns {
                assert!(row.contains_key(column));
            }
        }
    }

    #[test]
    fn test_sample_flags_mark_journey_edges() {
        let table = SampleDataSource::table();
        assert_eq!(table.rows[0][SAMPLE_FIRST_CLICK_COLUMN], "TRUE");
        assert_eq!(table.rows[0][SAMPLE_LAST_CLICK_COLUMN], "FALSE");
        assert_eq!(table.rows[2][SAMPLE_LAST_CLICK_COLUMN], "TRUE");
        assert_eq!(table.rows[5][SAMPLE_FIRST_CLICK_COLUMN], "TRUE");
        assert_eq!(table.rows[5][SAMPLE_LAST_CLICK_COLUMN], "TRUE");
    }
}
