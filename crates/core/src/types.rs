//! Domain types for the styled-range engine and the Slides request batch.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;

/// One top-level entry recovered from a canonical list.
///
/// `start` and `end` are UTF-16 code unit offsets into the canonical string
/// (the unit Slides text ranges are expressed in), `end` exclusive. They
/// describe the untrimmed span; `text` is the trimmed entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl Segment {
    /// Build a segment from its untrimmed slice and offsets.
    pub fn new(raw: &str, start: usize, end: usize) -> Self {
        Self {
            text: raw.trim().to_string(),
            start,
            end,
        }
    }

    /// The untrimmed span this segment covers in `canonical`.
    ///
    /// Returns `None` if the offsets fall outside the string or split a
    /// surrogate pair.
    pub fn slice_of(&self, canonical: &str) -> Option<String> {
        let units: Vec<u16> = canonical.encode_utf16().collect();
        let span = units.get(self.start..self.end)?;
        String::from_utf16(span).ok()
    }
}

/// Semantic colour assigned to a participant from their status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorLabel {
    Green,
    Yellow,
    Red,
    Orange,
    Unknown,
}

impl ColorLabel {
    /// Parse a colour name. Anything outside the palette is `Unknown`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "green" => Self::Green,
            "yellow" => Self::Yellow,
            "red" => Self::Red,
            "orange" => Self::Orange,
            _ => Self::Unknown,
        }
    }

    /// Highlight colour painted behind the entry, `None` for `Unknown`.
    pub fn rgb(self) -> Option<RgbColor> {
        match self {
            Self::Green => Some(RgbColor::new(0.6, 1.0, 0.6)),
            Self::Yellow => Some(RgbColor::new(1.0, 1.0, 0.6)),
            Self::Red => Some(RgbColor::new(1.0, 0.6, 0.6)),
            Self::Orange => Some(RgbColor::new(1.0, 0.647, 0.0)),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for ColorLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
            Self::Orange => "orange",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// An RGB colour with channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RgbColor {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl RgbColor {
    pub const fn new(red: f64, green: f64, blue: f64) -> Self {
        Self { red, green, blue }
    }

    fn to_json(self) -> Value {
        json!({ "red": self.red, "green": self.green, "blue": self.blue })
    }
}

/// A table cell address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellLocation {
    pub row_index: usize,
    pub column_index: usize,
}

impl CellLocation {
    pub const fn new(row_index: usize, column_index: usize) -> Self {
        Self {
            row_index,
            column_index,
        }
    }

    fn to_json(self) -> Value {
        json!({ "rowIndex": self.row_index, "columnIndex": self.column_index })
    }
}

/// The part of a text body a request applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRange {
    All,
    /// UTF-16 code unit range, end exclusive.
    Fixed { start: usize, end: usize },
}

impl TextRange {
    fn to_json(self) -> Value {
        match self {
            Self::All => json!({ "type": "ALL" }),
            Self::Fixed { start, end } => json!({
                "type": "FIXED_RANGE",
                "startIndex": start,
                "endIndex": end,
            }),
        }
    }
}

/// The three object ids a duplicated template slide is addressed by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectIdentity {
    pub slide_id: String,
    pub table_id: String,
    pub notes_id: String,
}

/// A single presentation mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOp {
    InsertText {
        object_id: String,
        cell: Option<CellLocation>,
        insertion_index: usize,
        text: String,
    },
    DeleteText {
        object_id: String,
        cell: Option<CellLocation>,
        range: TextRange,
    },
    SetPageBackground {
        object_id: String,
        color: RgbColor,
    },
    /// Text highlight over a range of a table cell; `color: None` clears it.
    SetTextStyleRange {
        object_id: String,
        cell: CellLocation,
        range: TextRange,
        color: Option<RgbColor>,
    },
    DuplicateObject {
        source_id: String,
        id_map: BTreeMap<String, String>,
    },
}

impl MutationOp {
    /// Short request kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InsertText { .. } => "insertText",
            Self::DeleteText { .. } => "deleteText",
            Self::SetPageBackground { .. } => "updatePageProperties",
            Self::SetTextStyleRange { .. } => "updateTextStyle",
            Self::DuplicateObject { .. } => "duplicateObject",
        }
    }

    /// The Slides `batchUpdate` request object for this operation.
    pub fn to_request(&self) -> Value {
        match self {
            Self::InsertText {
                object_id,
                cell,
                insertion_index,
                text,
            } => {
                let mut body = json!({
                    "objectId": object_id,
                    "insertionIndex": insertion_index,
                    "text": text,
                });
                if let Some(cell) = cell {
                    body["cellLocation"] = cell.to_json();
                }
                json!({ "insertText": body })
            }
            Self::DeleteText {
                object_id,
                cell,
                range,
            } => {
                let mut body = json!({
                    "objectId": object_id,
                    "textRange": range.to_json(),
                });
                if let Some(cell) = cell {
                    body["cellLocation"] = cell.to_json();
                }
                json!({ "deleteText": body })
            }
            Self::SetPageBackground { object_id, color } => json!({
                "updatePageProperties": {
                    "objectId": object_id,
                    "pageProperties": {
                        "pageBackgroundFill": {
                            "solidFill": { "color": { "rgbColor": color.to_json() } }
                        }
                    },
                    "fields": "pageBackgroundFill.solidFill.color",
                }
            }),
            Self::SetTextStyleRange {
                object_id,
                cell,
                range,
                color,
            } => {
                let background = match color {
                    Some(rgb) => json!({ "opaqueColor": { "rgbColor": rgb.to_json() } }),
                    None => json!({}),
                };
                json!({
                    "updateTextStyle": {
                        "objectId": object_id,
                        "cellLocation": cell.to_json(),
                        "textRange": range.to_json(),
                        "style": { "backgroundColor": background },
                        "fields": "backgroundColor",
                    }
                })
            }
            Self::DuplicateObject { source_id, id_map } => json!({
                "duplicateObject": {
                    "objectId": source_id,
                    "objectIds": id_map,
                }
            }),
        }
    }
}

/// Serialize a whole batch into the `requests` array of a `batchUpdate` body.
pub fn to_requests(ops: &[MutationOp]) -> Vec<Value> {
    ops.iter().map(MutationOp::to_request).collect()
}
