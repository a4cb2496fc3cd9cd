//! Touchpoint representation and column mapping

use crate::data_source::Row;
use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Logical role a table column plays in the analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnRole {
    ConversionId,
    Channel,
    Timestamp,
    FirstClick,
    LastClick,
    PostClick,
}

impl ColumnRole {
    pub fn name(&self) -> &'static str {
        match self {
            ColumnRole::ConversionId => "conversion id",
            ColumnRole::Channel => "channel",
            ColumnRole::Timestamp => "timestamp",
            ColumnRole::FirstClick => "first click flag",
            ColumnRole::LastClick => "last click flag",
            ColumnRole::PostClick => "post click flag",
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// User-declared mapping from logical roles to table columns.
///
/// Flag columns that are unset (or absent from the table) make every row's
/// flag a constant `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub id: Option<String>,
    pub channel: Option<String>,
    pub timestamp: Option<String>,
    pub first_click: Option<String>,
    pub last_click: Option<String>,
    pub post_click: Option<String>,
}

impl ColumnMapping {
    pub fn new(
        id: impl Into<String>,
        channel: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            id: Some(id.into()),
            channel: Some(channel.into()),
            timestamp: Some(timestamp.into()),
            ..Default::default()
        }
    }

    pub fn with_first_click(mut self, column: impl Into<String>) -> Self {
        self.first_click = Some(column.into());
        self
    }

    pub fn with_last_click(mut self, column: impl Into<String>) -> Self {
        self.last_click = Some(column.into());
        self
    }

    pub fn with_post_click(mut self, column: impl Into<String>) -> Self {
        self.post_click = Some(column.into());
        self
    }

    /// Overlay `other` on top of `self`: roles set in `other` win
    pub fn merged_with(&self, other: &ColumnMapping) -> ColumnMapping {
        fn pick(over: &Option<String>, base: &Option<String>) -> Option<String> {
            over.clone().or_else(|| base.clone())
        }
        ColumnMapping {
            id: pick(&other.id, &self.id),
            channel: pick(&other.channel, &self.channel),
            timestamp: pick(&other.timestamp, &self.timestamp),
            first_click: pick(&other.first_click, &self.first_click),
            last_click: pick(&other.last_click, &self.last_click),
            post_click: pick(&other.post_click, &self.post_click),
        }
    }

    pub fn column_for(&self, role: ColumnRole) -> Option<&str> {
        match role {
            ColumnRole::ConversionId => self.id.as_deref(),
            ColumnRole::Channel => self.channel.as_deref(),
            ColumnRole::Timestamp => self.timestamp.as_deref(),
            ColumnRole::FirstClick => self.first_click.as_deref(),
            ColumnRole::LastClick => self.last_click.as_deref(),
            ColumnRole::PostClick => self.post_click.as_deref(),
        }
    }
}

/// One input row lifted into typed form
#[derive(Debug, Clone, PartialEq)]
pub struct Touchpoint {
    pub conversion_id: String,
    pub channel: String,
    pub timestamp: NaiveDateTime,
    pub first_click: bool,
    pub last_click: bool,
    pub post_click: bool,
}

/// How a flag cell was interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagValue {
    Recognized(bool),
    Unrecognized,
}

impl FlagValue {
    pub fn as_bool(self) -> bool {
        matches!(self, FlagValue::Recognized(true))
    }
}

/// Interpret a flag cell. Text is matched case-sensitively against `TRUE`/`FALSE`.
pub fn parse_flag(value: &Value) -> FlagValue {
    match value {
        Value::Bool(b) => FlagValue::Recognized(*b),
        Value::Null => FlagValue::Recognized(false),
        Value::Number(n) => FlagValue::Recognized(n.as_f64().is_some_and(|f| f != 0.0)),
        Value::String(s) => match s.as_str() {
            "TRUE" => FlagValue::Recognized(true),
            "FALSE" => FlagValue::Recognized(false),
            _ => FlagValue::Unrecognized,
        },
        Value::Array(_) | Value::Object(_) => FlagValue::Unrecognized,
    }
}

/// Render an identifier or label cell as text; `None` for null
pub fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Parse a timestamp cell: RFC 3339, common datetime layouts, a bare date, or Unix seconds
pub fn parse_timestamp(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.naive_utc());
            }
            for format in TIMESTAMP_FORMATS {
                if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
                    return Some(dt);
                }
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        }
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.naive_utc()),
        _ => None,
    }
}

/// Resolved column names for one run
#[derive(Debug, Clone)]
pub(crate) struct ResolvedColumns<'a> {
    pub id: &'a str,
    pub channel: &'a str,
    pub timestamp: &'a str,
    pub first_click: Option<&'a str>,
    pub last_click: Option<&'a str>,
    pub post_click: Option<&'a str>,
}

impl<'a> ResolvedColumns<'a> {
    /// Check required roles against the table's columns.
    ///
    /// Flag roles resolve to `None` when unset or not present in the table.
    pub fn resolve(mapping: &'a ColumnMapping, columns: &[String]) -> Result<Self> {
        let present = |name: &str| columns.iter().any(|c| c == name);
        let required = |role: ColumnRole| -> Result<&'a str> {
            match mapping.column_for(role) {
                Some(name) if present(name) => Ok(name),
                other => Err(Error::missing_column(role, other)),
            }
        };
        let optional = |role: ColumnRole| -> Option<&'a str> {
            let name = mapping.column_for(role)?;
            if present(name) {
                Some(name)
            } else {
                tracing::debug!("{} column '{}' not in table, defaulting to false", role, name);
                None
            }
        };

        Ok(Self {
            id: required(ColumnRole::ConversionId)?,
            channel: required(ColumnRole::Channel)?,
            timestamp: required(ColumnRole::Timestamp)?,
            first_click: optional(ColumnRole::FirstClick),
            last_click: optional(ColumnRole::LastClick),
            post_click: optional(ColumnRole::PostClick),
        })
    }
}

/// Tally of flag cells that were neither boolean nor `TRUE`/`FALSE`
#[derive(Debug, Default)]
pub(crate) struct FlagAudit {
    pub unrecognized: usize,
    pub sample: Option<String>,
}

impl FlagAudit {
    fn read(&mut self, row: &Row, column: Option<&str>) -> bool {
        let Some(value) = column.and_then(|c| row.get(c)) else {
            return false;
        };
        match parse_flag(value) {
            FlagValue::Recognized(b) => b,
            FlagValue::Unrecognized => {
                self.unrecognized += 1;
                if self.sample.is_none() {
                    self.sample = Some(value.to_string());
                }
                false
            }
        }
    }

    pub fn report(&self, role: ColumnRole, column: Option<&str>) {
        if self.unrecognized > 0 {
            tracing::warn!(
                "{} cell(s) in {} column '{}' are not TRUE/FALSE (e.g. {}); treated as false",
                self.unrecognized,
                role,
                column.unwrap_or_default(),
                self.sample.as_deref().unwrap_or_default()
            );
        }
    }
}

/// Per-flag audits collected while reading a table
#[derive(Debug, Default)]
pub(crate) struct FlagAudits {
    pub first_click: FlagAudit,
    pub last_click: FlagAudit,
    pub post_click: FlagAudit,
}

impl Touchpoint {
    pub fn new(
        conversion_id: impl Into<String>,
        channel: impl Into<String>,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            conversion_id: conversion_id.into(),
            channel: channel.into(),
            timestamp,
            first_click: false,
            last_click: false,
            post_click: false,
        }
    }

    /// Read a touchpoint from a table row
    pub(crate) fn from_row(
        row: &Row,
        index: usize,
        columns: &ResolvedColumns<'_>,
        audits: &mut FlagAudits,
    ) -> Result<Self> {
        let required = |column: &str| -> Result<&Value> {
            match row.get(column) {
                Some(Value::Null) | None => Err(Error::computation(format!(
                    "row {}: missing value in column '{}'",
                    index, column
                ))),
                Some(value) => Ok(value),
            }
        };

        let conversion_id = cell_text(required(columns.id)?).unwrap_or_default();
        let channel = cell_text(required(columns.channel)?).unwrap_or_default();
        let raw_ts = required(columns.timestamp)?;
        let timestamp = parse_timestamp(raw_ts).ok_or_else(|| {
            Error::computation(format!(
                "row {}: cannot parse timestamp {} in column '{}'",
                index, raw_ts, columns.timestamp
            ))
        })?;

        Ok(Self {
            conversion_id,
            channel,
            timestamp,
            first_click: audits.first_click.read(row, columns.first_click),
            last_click: audits.last_click.read(row, columns.last_click),
            post_click: audits.post_click.read(row, columns.post_click),
        })
    }
}
