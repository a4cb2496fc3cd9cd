//! Conversion path reconstruction
//!
//! Groups touchpoint rows by conversion identifier and orders each group by
//! event time, producing one `ConversionPath` per conversion.

use super::touchpoint::{ColumnMapping, ColumnRole, FlagAudits, ResolvedColumns, Touchpoint};
use crate::Result;
use crate::data_source::InputTable;
use std::collections::BTreeMap;

/// Separator between channel labels in a path signature
pub const PATH_SEPARATOR: &str = " -> ";

/// Time-ordered touchpoints leading to one conversion. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionPath {
    pub conversion_id: String,
    touchpoints: Vec<Touchpoint>,
}

impl ConversionPath {
    /// Build a path from already ordered touchpoints; `None` when empty
    pub fn new(conversion_id: impl Into<String>, touchpoints: Vec<Touchpoint>) -> Option<Self> {
        if touchpoints.is_empty() {
            return None;
        }
        Some(Self {
            conversion_id: conversion_id.into(),
            touchpoints,
        })
    }

    pub fn touchpoints(&self) -> &[Touchpoint] {
        &self.touchpoints
    }

    /// Channel labels in visiting order
    pub fn channels(&self) -> impl Iterator<Item = &str> + '_ {
        self.touchpoints.iter().map(|t| t.channel.as_str())
    }

    pub fn len(&self) -> usize {
        self.touchpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.touchpoints.is_empty()
    }

    pub fn first_touch(&self) -> &str {
        &self.touchpoints[0].channel
    }

    pub fn last_touch(&self) -> &str {
        &self.touchpoints[self.touchpoints.len() - 1].channel
    }

    /// Channel labels joined by `" -> "`
    pub fn signature(&self) -> String {
        self.channels().collect::<Vec<_>>().join(PATH_SEPARATOR)
    }
}

/// Reconstructs conversion paths from a touchpoint table
pub struct PathBuilder<'a> {
    mapping: &'a ColumnMapping,
}

impl<'a> PathBuilder<'a> {
    pub fn new(mapping: &'a ColumnMapping) -> Self {
        Self { mapping }
    }

    /// Build one path per distinct conversion id, in ascending id order.
    ///
    /// Ids are compared by their text, so `1` and `"1"` are one conversion.
    /// Touchpoints are sorted by timestamp; ties keep their table row order.
    pub fn build(&self, table: &InputTable) -> Result<Vec<ConversionPath>> {
        let columns = ResolvedColumns::resolve(self.mapping, &table.columns)?;
        let mut audits = FlagAudits::default();

        let mut groups: BTreeMap<String, Vec<Touchpoint>> = BTreeMap::new();
        for (index, row) in table.rows.iter().enumerate() {
            let touchpoint = Touchpoint::from_row(row, index, &columns, &mut audits)?;
            groups
                .entry(touchpoint.conversion_id.clone())
                .or_default()
                .push(touchpoint);
        }

        audits
            .first_click
            .report(ColumnRole::FirstClick, columns.first_click);
        audits
            .last_click
            .report(ColumnRole::LastClick, columns.last_click);
        audits
            .post_click
            .report(ColumnRole::PostClick, columns.post_click);

        let paths: Vec<ConversionPath> = groups
            .into_iter()
            .filter_map(|(conversion_id, mut touchpoints)| {
                touchpoints.sort_by_key(|t| t.timestamp);
                ConversionPath::new(conversion_id, touchpoints)
            })
            .collect();

        tracing::debug!(
            "Built {} conversion paths from {} rows",
            paths.len(),
            table.len()
        );
        Ok(paths)
    }
}

/// Build conversion paths from a table with the given column mapping
pub fn build_paths(table: &InputTable, mapping: &ColumnMapping) -> Result<Vec<ConversionPath>> {
    PathBuilder::new(mapping).build(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use serde_json::json;

    fn table(rows: serde_json::Value) -> InputTable {
        let rows = rows
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r.as_object().unwrap().clone())
            .collect();
        InputTable::new(
            vec!["id".into(), "channel".into(), "ts".into(), "last".into()],
            rows,
        )
    }

    fn mapping() -> ColumnMapping {
        ColumnMapping::new("id", "channel", "ts")
    }

    #[test]
    fn test_single_conversion_path() {
        let t = table(json!([
            {"id": "C1", "channel": "email", "ts": "2024-06-01 11:00:00"},
            {"id": "C1", "channel": "google", "ts": "2024-06-01 10:00:00"},
            {"id": "C1", "channel": "direct", "ts": "2024-06-01 12:00:00"},
        ]));
        let paths = build_paths(&t, &mapping()).unwrap();
        assert_eq!(paths.len(), 1);

        let path = &paths[0];
        assert_eq!(path.conversion_id, "C1");
        assert_eq!(path.signature(), "google -> email -> direct");
        assert_eq!(path.len(), 3);
        assert_eq!(path.first_touch(), "google");
        assert_eq!(path.last_touch(), "direct");
    }

    #[test]
    fn test_timestamp_ties_keep_row_order() {
        let t = table(json!([
            {"id": "C1", "channel": "b", "ts": "2024-06-01 10:00:00"},
            {"id": "C1", "channel": "a", "ts": "2024-06-01 10:00:00"},
            {"id": "C1", "channel": "c", "ts": "2024-06-01 09:00:00"},
        ]));
        let paths = build_paths(&t, &mapping()).unwrap();
        assert_eq!(paths[0].signature(), "c -> b -> a");
    }

    #[test]
    fn test_paths_grouped_and_ordered_by_id() {
        let t = table(json!([
            {"id": "C2", "channel": "email", "ts": "2024-06-01 10:00:00"},
            {"id": "C1", "channel": "google", "ts": "2024-06-02 10:00:00"},
            {"id": "C2", "channel": "direct", "ts": "2024-06-01 11:00:00"},
        ]));
        let paths = build_paths(&t, &mapping()).unwrap();
        let ids: Vec<_> = paths.iter().map(|p| p.conversion_id.as_str()).collect();
        assert_eq!(ids, vec!["C1", "C2"]);
        assert_eq!(paths[1].signature(), "email -> direct");
    }

    #[test]
    fn test_path_properties_hold() {
        let t = table(json!([
            {"id": "A", "channel": "x", "ts": "2024-06-01 10:00:00"},
            {"id": "A", "channel": "y", "ts": "2024-06-01 10:05:00"},
            {"id": "B", "channel": "y", "ts": "2024-06-01 10:00:00"},
            {"id": "C", "channel": "x", "ts": "2024-06-01 10:00:00"},
            {"id": "C", "channel": "x", "ts": "2024-06-01 10:01:00"},
            {"id": "C", "channel": "z", "ts": "2024-06-01 10:02:00"},
        ]));
        for path in build_paths(&t, &mapping()).unwrap() {
            let channels: Vec<&str> = path.channels().collect();
            assert_eq!(path.signature(), channels.join(PATH_SEPARATOR));
            assert_eq!(path.len(), channels.len());
            assert_eq!(path.first_touch(), channels[0]);
            assert_eq!(path.last_touch(), *channels.last().unwrap());
        }
    }

    #[test]
    fn test_empty_table_yields_no_paths() {
        let t = table(json!([]));
        assert!(build_paths(&t, &mapping()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_required_column() {
        let t = table(json!([]));
        let mapping = ColumnMapping::new("order_id", "channel", "ts");
        let err = build_paths(&t, &mapping).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingColumn {
                role: ColumnRole::ConversionId,
                ..
            }
        ));
    }

    #[test]
    fn test_flags_carried_on_touchpoints() {
        let t = table(json!([
            {"id": "C1", "channel": "google", "ts": "2024-06-01 10:00:00", "last": "FALSE"},
            {"id": "C1", "channel": "email", "ts": "2024-06-01 11:00:00", "last": "TRUE"},
        ]));
        let paths = build_paths(&t, &mapping().with_last_click("last")).unwrap();
        let flags: Vec<bool> = paths[0].touchpoints().iter().map(|t| t.last_click).collect();
        assert_eq!(flags, vec![false, true]);
        assert!(paths[0].touchpoints().iter().all(|t| !t.first_click));
    }

    #[test]
    fn test_numeric_and_text_ids_share_a_conversion() {
        let t = table(json!([
            {"id": 1, "channel": "google", "ts": "2024-06-01 10:00:00"},
            {"id": "1", "channel": "email", "ts": "2024-06-01 11:00:00"},
            {"id": 2, "channel": "direct", "ts": "2024-06-01 12:00:00"},
        ]));
        let paths = build_paths(&t, &mapping()).unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].conversion_id, "1");
        assert_eq!(paths[0].signature(), "google -> email");
    }

    #[test]
    fn test_empty_path_is_discarded() {
        assert!(ConversionPath::new("C1", Vec::new()).is_none());
    }
}
