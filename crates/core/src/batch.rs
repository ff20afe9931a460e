//! Assembles the ordered `batchUpdate` request list for one session.

use crate::error::{Error, Result};
use crate::identity::DuplicationPlan;
use crate::normalize::PeopleList;
use crate::slide::{PresentationDoc, SlideTarget, Table};
use crate::types::{CellLocation, MutationOp, RgbColor, TextRange};
use serde::{Deserialize, Serialize};

/// Where each field lives in the template's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellLayout {
    pub title: CellLocation,
    pub datetime: CellLocation,
    pub channel: CellLocation,
    pub description: CellLocation,
    pub moderators: CellLocation,
    pub speakers: CellLocation,
}

impl Default for CellLayout {
    fn default() -> Self {
        Self {
            title: CellLocation::new(0, 1),
            datetime: CellLocation::new(1, 1),
            channel: CellLocation::new(2, 1),
            description: CellLocation::new(3, 1),
            moderators: CellLocation::new(4, 1),
            speakers: CellLocation::new(5, 1),
        }
    }
}

/// Everything written into one slide.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContent {
    pub title: String,
    pub datetime: String,
    pub channel: String,
    pub description: String,
    pub moderators: PeopleList,
    pub speakers: PeopleList,
    pub notes: String,
    pub background: RgbColor,
}

/// The slide a batch writes into.
#[derive(Debug, Clone, Copy)]
pub enum BatchTarget<'a> {
    /// Duplicate the template and fill the copy.
    Create(&'a DuplicationPlan),
    /// Overwrite an existing slide of `doc`.
    Update {
        doc: &'a PresentationDoc,
        slide_id: &'a str,
    },
}

/// Object ids the batch addresses, plus the existing content when updating.
struct ResolvedTarget<'a> {
    slide_id: String,
    table_id: String,
    existing_table: Option<&'a Table>,
    notes_id: Option<String>,
    notes_has_text: bool,
}

/// Builds request batches against a fixed table layout.
#[derive(Debug, Clone, Default)]
pub struct BatchBuilder {
    layout: CellLayout,
}

impl BatchBuilder {
    pub fn new(layout: CellLayout) -> Self {
        Self { layout }
    }

    /// Build the full request list for `content`.
    ///
    /// In update mode every cell or notes shape that already holds text is
    /// cleared before it is written, so re-applying a batch replaces content
    /// instead of appending to it. A missing slide, an empty slide or a slide
    /// without a table fails the whole batch.
    pub fn build(
        &self,
        target: BatchTarget<'_>,
        content: &SessionContent,
    ) -> Result<Vec<MutationOp>> {
        let mut ops = Vec::new();

        let resolved = match target {
            BatchTarget::Create(plan) => {
                ops.push(MutationOp::DuplicateObject {
                    source_id: plan.template_id.clone(),
                    id_map: plan.id_map(),
                });
                ResolvedTarget {
                    slide_id: plan.identity.slide_id.clone(),
                    table_id: plan.identity.table_id.clone(),
                    existing_table: None,
                    notes_id: Some(plan.identity.notes_id.clone()),
                    notes_has_text: false,
                }
            }
            BatchTarget::Update { doc, slide_id } => {
                let slide = doc
                    .slide(slide_id)
                    .ok_or_else(|| Error::SlideNotFound(slide_id.to_string()))?;
                let located = SlideTarget::locate(slide)?;
                let notes = located.speaker_notes();
                if notes.is_none() {
                    log::warn!(
                        "Speaker notes element not found on slide {}; notes are not written",
                        slide_id
                    );
                }
                ResolvedTarget {
                    slide_id: slide_id.to_string(),
                    table_id: located.table_id.to_string(),
                    existing_table: Some(located.table),
                    notes_has_text: notes.as_ref().is_some_and(|n| n.has_text),
                    notes_id: notes.map(|n| n.object_id),
                }
            }
        };

        let layout = &self.layout;
        let cells = [
            (layout.title, content.title.as_str()),
            (layout.datetime, content.datetime.as_str()),
            (layout.channel, content.channel.as_str()),
            (layout.description, content.description.as_str()),
            (layout.moderators, content.moderators.text.as_str()),
            (layout.speakers, content.speakers.text.as_str()),
        ];
        for (cell, text) in cells {
            let has_text = resolved
                .existing_table
                .is_some_and(|table| table.cell_has_text(cell));
            write_text(&mut ops, &resolved.table_id, Some(cell), has_text, text);
        }

        ops.push(MutationOp::SetPageBackground {
            object_id: resolved.slide_id.clone(),
            color: content.background,
        });

        if let Some(notes_id) = &resolved.notes_id {
            write_text(&mut ops, notes_id, None, resolved.notes_has_text, &content.notes);
        }

        for cell in [layout.speakers, layout.moderators] {
            ops.push(MutationOp::SetTextStyleRange {
                object_id: resolved.table_id.clone(),
                cell,
                range: TextRange::All,
                color: None,
            });
        }

        for (cell, people) in [
            (layout.speakers, &content.speakers),
            (layout.moderators, &content.moderators),
        ] {
            for (segment, color) in people.styled_segments() {
                ops.push(MutationOp::SetTextStyleRange {
                    object_id: resolved.table_id.clone(),
                    cell,
                    range: TextRange::Fixed {
                        start: segment.start,
                        end: segment.end,
                    },
                    color: color.rgb(),
                });
            }
        }

        log::debug!(
            "Built {} requests for slide {} (table {})",
            ops.len(),
            resolved.slide_id,
            resolved.table_id
        );
        Ok(ops)
    }
}

/// Clear (when needed) and write one text body.
///
/// Empty text is not inserted; the clear still happens.
fn write_text(
    ops: &mut Vec<MutationOp>,
    object_id: &str,
    cell: Option<CellLocation>,
    has_text: bool,
    text: &str,
) {
    if has_text {
        ops.push(MutationOp::DeleteText {
            object_id: object_id.to_string(),
            cell,
            range: TextRange::All,
        });
    }
    if !text.is_empty() {
        ops.push(MutationOp::InsertText {
            object_id: object_id.to_string(),
            cell,
            insertion_index: 0,
            text: text.to_string(),
        });
    }
}
