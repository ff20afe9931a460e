//! Session rows from the record store.
//!
//! Rows are decoded loosely: a missing field reads as empty, a scalar where a
//! list is expected reads as a one-element list, and numbers or booleans are
//! rendered as text.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;

/// Status used when a session has no linked curation status.
pub const NO_STATUS: &str = "No Status Available";

/// One row of a table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl Record {
    /// Field as text; lists are joined with `", "`.
    pub fn text(&self, field: &str) -> String {
        match self.fields.get(field) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(scalar_text)
                .collect::<Vec<_>>()
                .join(", "),
            Some(value) => scalar_text(value).unwrap_or_default(),
            None => String::new(),
        }
    }

    /// Field as a list of strings.
    ///
    /// Null items read as `""` so positions line up across parallel lists.
    pub fn list(&self, field: &str) -> Vec<String> {
        match self.fields.get(field) {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| scalar_text(item).unwrap_or_default())
                .collect(),
            Some(value) => scalar_text(value).into_iter().collect(),
            None => Vec::new(),
        }
    }
}

/// Column names of the sessions table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldNames {
    pub slide_id: String,
    pub curation_status: String,
    pub speakers: String,
    pub moderators: String,
    pub speaker_statuses: String,
    pub moderator_statuses: String,
    pub datetime: String,
    pub notes: String,
    pub title: String,
    pub channel: String,
    pub description: String,
    pub last_modified: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            slide_id: "Slide ID".to_string(),
            curation_status: "Curation Status".to_string(),
            speakers: "Speaker Name & Title (from Speaker)".to_string(),
            moderators: "Moderator Name & Title".to_string(),
            speaker_statuses: "S Status (from Speaker)".to_string(),
            moderator_statuses: "S Status (from Moderator)".to_string(),
            datetime: "S25 Start Date/Time".to_string(),
            notes: "Notes".to_string(),
            title: "Session Title (<100 characters)".to_string(),
            channel: "W Channel Text".to_string(),
            description: "Description (<2500 characters)".to_string(),
            last_modified: "Last Modified".to_string(),
        }
    }
}

/// Table names in the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableNames {
    pub sessions: String,
    pub statuses: String,
    /// Column of the statuses table holding the status label.
    pub status_column: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            sessions: "Sessions".to_string(),
            statuses: "Statuses".to_string(),
            status_column: "Status".to_string(),
        }
    }
}

/// A session row with its fields pulled out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionRecord {
    pub record_id: String,
    /// Slide to update; `None` when the session has no slide yet.
    pub slide_id: Option<String>,
    /// Ids of linked curation status rows.
    pub curation_status_links: Vec<String>,
    pub title: String,
    pub datetime: String,
    pub channel: String,
    pub description: String,
    pub notes: String,
    pub speakers: Vec<String>,
    pub speaker_statuses: Vec<String>,
    pub moderators: Vec<String>,
    pub moderator_statuses: Vec<String>,
    pub last_modified: Option<String>,
}

impl SessionRecord {
    pub fn from_record(record: &Record, fields: &FieldNames) -> Self {
        let non_empty = |value: String| {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };

        Self {
            record_id: record.id.clone(),
            slide_id: non_empty(record.text(&fields.slide_id)),
            curation_status_links: record.list(&fields.curation_status),
            title: record.text(&fields.title),
            datetime: record.text(&fields.datetime),
            channel: record.text(&fields.channel),
            description: record.text(&fields.description),
            notes: record.text(&fields.notes),
            speakers: record.list(&fields.speakers),
            speaker_statuses: record.list(&fields.speaker_statuses),
            moderators: record.list(&fields.moderators),
            moderator_statuses: record.list(&fields.moderator_statuses),
            last_modified: non_empty(record.text(&fields.last_modified)),
        }
    }

    /// Whether the row was modified after `cutoff`.
    ///
    /// Rows without a parseable RFC 3339 timestamp are never considered recent.
    pub fn modified_after(&self, cutoff: DateTime<Utc>) -> bool {
        let Some(raw) = self.last_modified.as_deref() else {
            return false;
        };
        match DateTime::parse_from_rfc3339(raw) {
            Ok(stamp) => stamp.with_timezone(&Utc) > cutoff,
            Err(e) => {
                log::debug!(
                    "Record {} has unparseable modification time {:?}: {}",
                    self.record_id,
                    raw,
                    e
                );
                false
            }
        }
    }
}

/// The record store sessions are read from.
pub trait RecordSource {
    /// All session rows.
    fn sessions(&self) -> Result<Vec<Record>>;

    /// One field of one row of another table; `None` if the row or field is absent.
    fn lookup_field(&self, table: &str, record_id: &str, field: &str) -> Result<Option<String>>;
}

/// Resolve the curation status label of a session.
///
/// Only the first linked row is consulted.
pub fn resolve_curation_status(
    source: &dyn RecordSource,
    tables: &TableNames,
    session: &SessionRecord,
) -> Result<String> {
    let Some(link) = session.curation_status_links.first() else {
        return Ok(NO_STATUS.to_string());
    };
    let status = source.lookup_field(&tables.statuses, link, &tables.status_column)?;
    Ok(status
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| NO_STATUS.to_string()))
}

/// A record store held in memory, loaded from a JSON export.
///
/// The file maps table names to arrays of `{ "id": ..., "fields": {...} }`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JsonRecordStore {
    #[serde(skip)]
    sessions_table: String,
    #[serde(flatten)]
    tables: HashMap<String, Vec<Record>>,
}

impl JsonRecordStore {
    pub fn new(sessions_table: impl Into<String>) -> Self {
        Self {
            sessions_table: sessions_table.into(),
            tables: HashMap::new(),
        }
    }

    /// Parse an export, reading sessions from `sessions_table`.
    pub fn from_json(content: &str, sessions_table: impl Into<String>) -> Result<Self> {
        let mut store: Self = serde_json::from_str(content)?;
        store.sessions_table = sessions_table.into();
        Ok(store)
    }

    pub fn load(path: &Path, sessions_table: impl Into<String>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content, sessions_table)
    }

    pub fn insert(&mut self, table: impl Into<String>, record: Record) {
        self.tables.entry(table.into()).or_default().push(record);
    }
}

impl RecordSource for JsonRecordStore {
    fn sessions(&self) -> Result<Vec<Record>> {
        self.tables
            .get(&self.sessions_table)
            .cloned()
            .ok_or_else(|| Error::RecordSource(format!("No table named {}", self.sessions_table)))
    }

    fn lookup_field(&self, table: &str, record_id: &str, field: &str) -> Result<Option<String>> {
        let rows = self
            .tables
            .get(table)
            .ok_or_else(|| Error::RecordSource(format!("No table named {}", table)))?;
        Ok(rows
            .iter()
            .find(|row| row.id == record_id)
            .map(|row| row.text(field))
            .filter(|value| !value.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::StatusColorTable;
    use crate::normalize::{PeopleList, RepresentationNormalizer};
    use crate::types::ColorLabel;
    use chrono::TimeZone;
    use serde_json::json;

    fn record(fields: Value) -> Record {
        serde_json::from_value(json!({ "id": "rec1", "fields": fields })).unwrap()
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let session = SessionRecord::from_record(&record(json!({})), &FieldNames::default());

        assert_eq!(session.record_id, "rec1");
        assert_eq!(session.slide_id, None);
        assert_eq!(session.title, "");
        assert!(session.speakers.is_empty());
        assert!(session.curation_status_links.is_empty());
    }

    #[test]
    fn test_field_extraction() {
        let session = SessionRecord::from_record(
            &record(json!({
                "Slide ID": " g123_0_5 ",
                "Session Title (<100 characters)": "Future of Freight",
                "W Channel Text": ["Main Stage"],
                "S25 Start Date/Time": "2025-03-04T10:00:00.000Z",
                "Speaker Name & Title (from Speaker)": ["Jane Doe (VP, Acme)", "Bob Lee"],
                "S Status (from Speaker)": ["Registered", null, "Idea"],
                "Moderator Name & Title": "Mo Deer (Host)",
                "Curation Status": ["recStatus"],
                "Notes": 42
            })),
            &FieldNames::default(),
        );

        assert_eq!(session.slide_id.as_deref(), Some("g123_0_5"));
        assert_eq!(session.title, "Future of Freight");
        assert_eq!(session.channel, "Main Stage");
        assert_eq!(session.speakers, vec!["Jane Doe (VP, Acme)", "Bob Lee"]);
        assert_eq!(session.speaker_statuses, vec!["Registered", "", "Idea"]);
        assert_eq!(session.moderators, vec!["Mo Deer (Host)"]);
        assert_eq!(session.curation_status_links, vec!["recStatus"]);
        assert_eq!(session.notes, "42");
    }

    #[test]
    fn test_null_status_keeps_colour_positions() {
        let session = SessionRecord::from_record(
            &record(json!({
                "Speaker Name & Title (from Speaker)": ["Ann", "Bo", "Cy"],
                "S Status (from Speaker)": ["Registered", null, "Idea"]
            })),
            &FieldNames::default(),
        );
        let people = PeopleList::build(
            &RepresentationNormalizer::new(),
            &StatusColorTable::builtin(),
            &session.speakers,
            &session.speaker_statuses,
        );

        let styled: Vec<(&str, ColorLabel)> = people
            .styled_segments()
            .map(|(segment, color)| (segment.text.as_str(), color))
            .collect();
        assert_eq!(styled, vec![("Ann", ColorLabel::Green), ("Cy", ColorLabel::Red)]);
    }

    #[test]
    fn test_modified_after() {
        let cutoff = Utc.with_ymd_and_hms(2025, 3, 4, 9, 0, 0).unwrap();
        let fields = FieldNames::default();

        let recent = SessionRecord::from_record(
            &record(json!({ "Last Modified": "2025-03-04T09:30:00.000Z" })),
            &fields,
        );
        assert!(recent.modified_after(cutoff));

        let stale = SessionRecord::from_record(
            &record(json!({ "Last Modified": "2025-03-04T10:30:00+02:00" })),
            &fields,
        );
        assert!(!stale.modified_after(cutoff));

        let garbled =
            SessionRecord::from_record(&record(json!({ "Last Modified": "yesterday" })), &fields);
        assert!(!garbled.modified_after(cutoff));

        let missing = SessionRecord::from_record(&record(json!({})), &fields);
        assert!(!missing.modified_after(cutoff));
    }

    fn store() -> JsonRecordStore {
        JsonRecordStore::from_json(
            r#"{
                "Sessions": [ { "id": "rec1", "fields": { "Curation Status": ["recS"] } } ],
                "Statuses": [
                    { "id": "recS", "fields": { "Status": "(5) Confirmed" } },
                    { "id": "recBlank", "fields": {} }
                ]
            }"#,
            "Sessions",
        )
        .unwrap()
    }

    #[test]
    fn test_json_store_sessions_and_lookup() {
        let store = store();

        assert_eq!(store.sessions().unwrap().len(), 1);
        assert_eq!(
            store.lookup_field("Statuses", "recS", "Status").unwrap().as_deref(),
            Some("(5) Confirmed")
        );
        assert_eq!(store.lookup_field("Statuses", "recBlank", "Status").unwrap(), None);
        assert!(matches!(
            store.lookup_field("Nope", "recS", "Status"),
            Err(Error::RecordSource(_))
        ));

        let other = JsonRecordStore::from_json(r#"{"Statuses": []}"#, "Sessions").unwrap();
        assert!(other.sessions().is_err());
    }

    #[test]
    fn test_resolve_curation_status() {
        let store = store();
        let tables = TableNames::default();
        let fields = FieldNames::default();

        let linked = SessionRecord::from_record(
            &record(json!({ "Curation Status": ["recS"] })),
            &fields,
        );
        assert_eq!(
            resolve_curation_status(&store, &tables, &linked).unwrap(),
            "(5) Confirmed"
        );

        let blank = SessionRecord::from_record(
            &record(json!({ "Curation Status": ["recBlank"] })),
            &fields,
        );
        assert_eq!(resolve_curation_status(&store, &tables, &blank).unwrap(), NO_STATUS);

        let unlinked = SessionRecord::from_record(&record(json!({})), &fields);
        assert_eq!(resolve_curation_status(&store, &tables, &unlinked).unwrap(), NO_STATUS);
    }

    #[test]
    fn test_store_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        std::fs::write(&path, r#"{"Sessions": [ { "id": "a" }, { "id": "b" } ]}"#).unwrap();

        let store = JsonRecordStore::load(&path, "Sessions").unwrap();
        let ids: Vec<String> = store.sessions().unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["a", "b"]);

        assert!(matches!(
            JsonRecordStore::load(&dir.path().join("missing.json"), "Sessions"),
            Err(Error::IoError(_))
        ));
    }
}
