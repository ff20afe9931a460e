//! Text normalization for participant lists.
//!
//! Turns free-typed `Name (Role, Company)` entries into canonical form, joins
//! them with a single `", "` separator at parenthesis depth 0, and recovers
//! the exact offset span of each entry in the joined string.

use crate::colors::StatusColorTable;
use crate::types::{ColorLabel, Segment};
use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Splits an entry into its name and the content of the first parenthesis pair.
static ENTRY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^(]+?)(?:\s*\(\s*(.*?)\s*\))?$").unwrap());

/// Regex to collapse runs of whitespace into one space.
static WHITESPACE_COLLAPSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").unwrap());

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_COLLAPSE_REGEX
        .replace_all(text.trim(), " ")
        .into_owned()
}

/// Normalizer for a single `Name (Role, Company)` entry.
#[derive(Debug, Clone)]
pub struct RepresentationNormalizer {
    /// Whether to compose the entry to Unicode NFC before parsing.
    compose_unicode: bool,
}

impl Default for RepresentationNormalizer {
    fn default() -> Self {
        Self {
            compose_unicode: true,
        }
    }
}

impl RepresentationNormalizer {
    /// Create a new normalizer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to compose entries to NFC first.
    pub fn with_compose_unicode(mut self, compose: bool) -> Self {
        self.compose_unicode = compose;
        self
    }

    /// Normalize one entry.
    ///
    /// - Trims the entry and collapses whitespace inside the name
    /// - Splits the first parenthetical on commas, trims each piece and
    ///   drops the empty ones
    /// - Renders `Name (Piece1, Piece2)`, or just `Name` when no piece survives
    ///
    /// Input the pattern does not accept (an unclosed parenthesis, a leading
    /// parenthesis) comes back trimmed and otherwise untouched. Nested or
    /// repeated groups are not parsed: everything between the first `(` and
    /// the final `)` is treated as one parenthetical.
    pub fn normalize(&self, raw: &str) -> String {
        let composed: String = if self.compose_unicode {
            raw.nfc().collect()
        } else {
            raw.to_string()
        };
        let trimmed = composed.trim();

        let Some(captures) = ENTRY_REGEX.captures(trimmed) else {
            log::debug!("Entry {:?} is not in `Name (details)` form, kept as is", trimmed);
            return trimmed.to_string();
        };

        let name = collapse_whitespace(&captures[1]);
        let pieces: Vec<String> = captures
            .get(2)
            .map(|inner| {
                inner
                    .as_str()
                    .split(',')
                    .map(collapse_whitespace)
                    .filter(|piece| !piece.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        if pieces.is_empty() {
            name
        } else {
            format!("{} ({})", name, pieces.join(", "))
        }
    }

    /// Normalize every entry of a list, keeping order.
    pub fn normalize_all<S: AsRef<str>>(&self, entries: &[S]) -> Vec<String> {
        entries.iter().map(|e| self.normalize(e.as_ref())).collect()
    }
}

/// Rewrite every depth-0 comma to exactly `", "`.
///
/// Spaces following a top-level comma are swallowed; commas inside
/// parentheses are left alone. A stray `)` never drives the depth below
/// zero, so commas after it still count as top-level.
pub fn canonicalize_separators(text: &str) -> String {
    let mut output = String::with_capacity(text.len() + 8);
    let mut depth = 0usize;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '(' => {
                depth += 1;
                output.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                output.push(c);
            }
            ',' if depth == 0 => {
                output.push_str(", ");
                while chars.peek() == Some(&' ') {
                    chars.next();
                }
            }
            _ => output.push(c),
        }
    }

    output
}

/// Join entries into a canonical list.
pub fn format_list<S: AsRef<str>>(entries: &[S]) -> String {
    let joined = entries
        .iter()
        .map(|e| e.as_ref())
        .collect::<Vec<_>>()
        .join(",");
    canonicalize_separators(&joined)
}

/// Count commas at parenthesis depth 0.
pub fn count_top_level_commas(text: &str) -> usize {
    let mut depth = 0usize;
    let mut count = 0;
    for c in text.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => count += 1,
            _ => {}
        }
    }
    count
}

/// Recover the span of every top-level entry in a canonical list.
///
/// A boundary is a depth-0 comma followed by a space; only that one space is
/// consumed as separator. Offsets are in UTF-16 code units.
pub fn index_segments(canonical: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut segment_byte = 0;
    let mut segment_unit = 0;
    let mut unit = 0;
    let mut chars = canonical.char_indices().peekable();

    while let Some((byte, c)) = chars.next() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 && matches!(chars.peek(), Some((_, ' '))) => {
                segments.push(Segment::new(
                    &canonical[segment_byte..byte],
                    segment_unit,
                    unit,
                ));
                chars.next();
                unit += 2;
                segment_byte = byte + 2;
                segment_unit = unit;
                continue;
            }
            _ => {}
        }
        unit += c.len_utf16();
    }

    if segment_byte < canonical.len() {
        segments.push(Segment::new(&canonical[segment_byte..], segment_unit, unit));
    }

    segments
}

/// A formatted participant cell: its text, entry spans and entry colours.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PeopleList {
    /// Canonical list written into the cell.
    pub text: String,
    /// Span of each entry in `text`.
    pub segments: Vec<Segment>,
    /// Colour of each entry, positionally; may be shorter than `segments`.
    pub colors: Vec<ColorLabel>,
}

impl PeopleList {
    /// Normalize, join and index `entries`, resolving `statuses` to colours.
    pub fn build<S: AsRef<str>, T: AsRef<str>>(
        normalizer: &RepresentationNormalizer,
        table: &StatusColorTable,
        entries: &[S],
        statuses: &[T],
    ) -> Self {
        let normalized = normalizer.normalize_all(entries);
        let text = format_list(&normalized);
        let segments = index_segments(&text);
        let colors = table.resolve_all(statuses);

        if segments.len() != normalized.len() {
            log::warn!(
                "{} entries produced {} segments in {:?}; colours may shift",
                normalized.len(),
                segments.len(),
                text
            );
        }

        Self {
            text,
            segments,
            colors,
        }
    }

    /// Segments paired with a paintable colour, skipping unknown ones.
    pub fn styled_segments(&self) -> impl Iterator<Item = (&Segment, ColorLabel)> {
        self.segments
            .iter()
            .zip(self.colors.iter().copied())
            .filter(|(_, color)| color.rgb().is_some())
    }
}
