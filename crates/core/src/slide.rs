//! Read-only view of a Slides presentation, as returned by `presentations.get`.
//!
//! Only the parts the batch builder inspects are modelled; everything else in
//! the payload is ignored on deserialization.

use crate::error::{Error, Result};
use crate::types::CellLocation;
use serde::{Deserialize, Serialize};

/// A presentation snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationDoc {
    #[serde(default)]
    pub presentation_id: String,
    #[serde(default)]
    pub slides: Vec<Page>,
}

impl PresentationDoc {
    /// Find a slide by object id.
    pub fn slide(&self, slide_id: &str) -> Option<&Page> {
        self.slides.iter().find(|page| page.object_id == slide_id)
    }
}

/// A slide or notes page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub object_id: String,
    #[serde(default)]
    pub page_elements: Vec<PageElement>,
    #[serde(default)]
    pub slide_properties: Option<SlideProperties>,
    #[serde(default)]
    pub notes_properties: Option<NotesProperties>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideProperties {
    #[serde(default)]
    pub notes_page: Option<Box<Page>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesProperties {
    #[serde(default)]
    pub speaker_notes_object_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageElement {
    pub object_id: String,
    #[serde(default)]
    pub table: Option<Table>,
    #[serde(default)]
    pub shape: Option<Shape>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    #[serde(default)]
    pub table_rows: Vec<TableRow>,
}

impl Table {
    pub fn cell(&self, location: CellLocation) -> Option<&TableCell> {
        self.table_rows
            .get(location.row_index)?
            .table_cells
            .get(location.column_index)
    }

    /// Whether the cell holds any non-whitespace text.
    pub fn cell_has_text(&self, location: CellLocation) -> bool {
        self.cell(location)
            .and_then(|cell| cell.text.as_ref())
            .is_some_and(|text| !text.plain_text().trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    #[serde(default)]
    pub table_cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCell {
    #[serde(default)]
    pub text: Option<TextContent>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    #[serde(default)]
    pub shape_type: Option<String>,
    #[serde(default)]
    pub placeholder: Option<Placeholder>,
    #[serde(default)]
    pub text: Option<TextContent>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placeholder {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub index: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    #[serde(default)]
    pub text_elements: Vec<TextElement>,
}

impl TextContent {
    /// Concatenated content of all text runs.
    pub fn plain_text(&self) -> String {
        self.text_elements
            .iter()
            .filter_map(|element| element.text_run.as_ref())
            .map(|run| run.content.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    #[serde(default)]
    pub text_run: Option<TextRun>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRun {
    #[serde(default)]
    pub content: String,
}

/// How the speaker notes shape was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotesLookup {
    /// Named by the notes page's `speakerNotesObjectId`.
    NotesProperties,
    /// A shape with a `BODY` placeholder.
    BodyPlaceholder,
    /// Second element of the notes page, by position only.
    Positional,
}

/// Speaker notes shape of a slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakerNotes {
    pub object_id: String,
    pub has_text: bool,
    pub found_by: NotesLookup,
}

/// Position of the speaker notes body on a stock notes page.
const POSITIONAL_NOTES_INDEX: usize = 1;

/// The pieces of an existing slide an update batch writes into.
#[derive(Debug, Clone, Copy)]
pub struct SlideTarget<'a> {
    pub slide: &'a Page,
    pub table_id: &'a str,
    pub table: &'a Table,
}

impl<'a> SlideTarget<'a> {
    /// Locate the table on `slide`.
    ///
    /// Fails when the slide has no elements or none of them is a table.
    pub fn locate(slide: &'a Page) -> Result<Self> {
        if slide.page_elements.is_empty() {
            return Err(Error::NoPageElements(slide.object_id.clone()));
        }

        let (table_id, table) = slide
            .page_elements
            .iter()
            .find_map(|element| {
                element
                    .table
                    .as_ref()
                    .map(|table| (element.object_id.as_str(), table))
            })
            .ok_or_else(|| Error::TableNotFound(slide.object_id.clone()))?;

        Ok(Self {
            slide,
            table_id,
            table,
        })
    }

    /// Locate the speaker notes shape of the slide, if it has one.
    pub fn speaker_notes(&self) -> Option<SpeakerNotes> {
        let notes_page = self
            .slide
            .slide_properties
            .as_ref()?
            .notes_page
            .as_deref()?;

        let shape_text = |element: &PageElement| {
            element
                .shape
                .as_ref()
                .and_then(|shape| shape.text.as_ref())
                .is_some_and(|text| !text.plain_text().trim().is_empty())
        };

        let declared = notes_page
            .notes_properties
            .as_ref()
            .and_then(|props| props.speaker_notes_object_id.as_deref());
        if let Some(object_id) = declared {
            let has_text = notes_page
                .page_elements
                .iter()
                .find(|element| element.object_id == object_id)
                .is_some_and(shape_text);
            return Some(SpeakerNotes {
                object_id: object_id.to_string(),
                has_text,
                found_by: NotesLookup::NotesProperties,
            });
        }

        let body = notes_page.page_elements.iter().find(|element| {
            element
                .shape
                .as_ref()
                .and_then(|shape| shape.placeholder.as_ref())
                .and_then(|placeholder| placeholder.kind.as_deref())
                == Some("BODY")
        });
        if let Some(element) = body {
            return Some(SpeakerNotes {
                object_id: element.object_id.clone(),
                has_text: shape_text(element),
                found_by: NotesLookup::BodyPlaceholder,
            });
        }

        let element = notes_page.page_elements.get(POSITIONAL_NOTES_INDEX)?;
        log::warn!(
            "Speaker notes of slide {} located by position only ({})",
            self.slide.object_id,
            element.object_id
        );
        Some(SpeakerNotes {
            object_id: element.object_id.clone(),
            has_text: shape_text(element),
            found_by: NotesLookup::Positional,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(value: serde_json::Value) -> Page {
        serde_json::from_value(value).unwrap()
    }

    fn text(content: &str) -> serde_json::Value {
        json!({ "textElements": [ { "paragraphMarker": {} }, { "textRun": { "content": content } } ] })
    }

    #[test]
    fn test_locate_table() {
        let slide = page(json!({
            "objectId": "s1",
            "pageElements": [
                { "objectId": "title", "shape": { "shapeType": "TEXT_BOX" } },
                { "objectId": "t1", "table": { "tableRows": [
                    { "tableCells": [ {}, { "text": text("Keynote\n") } ] }
                ] } }
            ]
        }));

        let target = SlideTarget::locate(&slide).unwrap();
        assert_eq!(target.table_id, "t1");
        assert!(target.table.cell_has_text(CellLocation::new(0, 1)));
        assert!(!target.table.cell_has_text(CellLocation::new(0, 0)));
        assert!(!target.table.cell_has_text(CellLocation::new(9, 9)));
    }

    #[test]
    fn test_locate_missing_structure() {
        let empty = page(json!({ "objectId": "s1" }));
        assert!(matches!(
            SlideTarget::locate(&empty),
            Err(Error::NoPageElements(id)) if id == "s1"
        ));

        let no_table = page(json!({
            "objectId": "s2",
            "pageElements": [ { "objectId": "shape", "shape": {} } ]
        }));
        assert!(matches!(
            SlideTarget::locate(&no_table),
            Err(Error::TableNotFound(id)) if id == "s2"
        ));
    }

    #[test]
    fn test_whitespace_only_cell_is_empty() {
        let slide = page(json!({
            "objectId": "s1",
            "pageElements": [ { "objectId": "t1", "table": { "tableRows": [
                { "tableCells": [ { "text": text(" \n") } ] }
            ] } } ]
        }));
        let target = SlideTarget::locate(&slide).unwrap();
        assert!(!target.table.cell_has_text(CellLocation::new(0, 0)));
    }

    fn slide_with_notes(notes_page: serde_json::Value) -> Page {
        page(json!({
            "objectId": "s1",
            "pageElements": [ { "objectId": "t1", "table": {} } ],
            "slideProperties": { "notesPage": notes_page }
        }))
    }

    #[test]
    fn test_notes_from_notes_properties() {
        let slide = slide_with_notes(json!({
            "objectId": "n",
            "notesProperties": { "speakerNotesObjectId": "n_body" },
            "pageElements": [
                { "objectId": "n_thumb", "shape": {} },
                { "objectId": "n_body", "shape": { "text": text("Bring mics\n") } }
            ]
        }));
        let target = SlideTarget::locate(&slide).unwrap();
        let notes = target.speaker_notes().unwrap();

        assert_eq!(notes.object_id, "n_body");
        assert!(notes.has_text);
        assert_eq!(notes.found_by, NotesLookup::NotesProperties);
    }

    #[test]
    fn test_notes_from_body_placeholder() {
        let slide = slide_with_notes(json!({
            "objectId": "n",
            "pageElements": [
                { "objectId": "n_body", "shape": { "placeholder": { "type": "BODY", "index": 1 } } },
                { "objectId": "n_other", "shape": {} }
            ]
        }));
        let target = SlideTarget::locate(&slide).unwrap();
        let notes = target.speaker_notes().unwrap();

        assert_eq!(notes.object_id, "n_body");
        assert!(!notes.has_text);
        assert_eq!(notes.found_by, NotesLookup::BodyPlaceholder);
    }

    #[test]
    fn test_notes_positional_fallback() {
        let slide = slide_with_notes(json!({
            "objectId": "n",
            "pageElements": [
                { "objectId": "n0", "shape": {} },
                { "objectId": "n1", "shape": { "text": text("old\n") } }
            ]
        }));
        let target = SlideTarget::locate(&slide).unwrap();
        let notes = target.speaker_notes().unwrap();

        assert_eq!(notes.object_id, "n1");
        assert!(notes.has_text);
        assert_eq!(notes.found_by, NotesLookup::Positional);

        let lonely = slide_with_notes(json!({
            "objectId": "n",
            "pageElements": [ { "objectId": "n0", "shape": {} } ]
        }));
        assert!(SlideTarget::locate(&lonely).unwrap().speaker_notes().is_none());
    }

    #[test]
    fn test_presentation_lookup() {
        let doc: PresentationDoc = serde_json::from_value(json!({
            "presentationId": "p",
            "title": "ignored",
            "slides": [ { "objectId": "a" }, { "objectId": "b" } ]
        }))
        .unwrap();

        assert!(doc.slide("b").is_some());
        assert!(doc.slide("c").is_none());
    }
}
