//! Status-to-colour lookup and slide background policy.

use crate::types::{ColorLabel, RgbColor};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Participant statuses known out of the box.
const BUILTIN_STATUS_COLORS: &[(&str, ColorLabel)] = &[
    ("Idea", ColorLabel::Red),
    ("Inbound", ColorLabel::Red),
    ("Confirmed, Needs Reg", ColorLabel::Orange),
    ("Ask Needed", ColorLabel::Red),
    ("Inquired", ColorLabel::Red),
    ("To Inquire", ColorLabel::Red),
    ("Partner Idea", ColorLabel::Red),
    ("LL Keynote Idea", ColorLabel::Red),
    ("Keynote Target", ColorLabel::Red),
    ("Flag For Next Year", ColorLabel::Red),
    ("In Progress", ColorLabel::Yellow),
    ("Sent Registration", ColorLabel::Yellow),
    ("Registered", ColorLabel::Green),
    ("Registered, Missing Headshot/Bio", ColorLabel::Orange),
    ("Meeting - to set", ColorLabel::Yellow),
    ("Meeting - being set", ColorLabel::Yellow),
    ("Meeting - upcoming", ColorLabel::Yellow),
    ("Meeting - complete", ColorLabel::Yellow),
    ("Signed, No Content Request", ColorLabel::Red),
    ("Signed, No Content Request, but helpful", ColorLabel::Red),
    ("Waiting for Content Ideas", ColorLabel::Yellow),
    ("Need to Review Proposals", ColorLabel::Yellow),
    ("Need Representation in Program", ColorLabel::Yellow),
    ("No Further Action Needed", ColorLabel::Green),
    ("Program Representation Secured", ColorLabel::Green),
];

static BUILTIN_TABLE: LazyLock<StatusColorTable> =
    LazyLock::new(|| StatusColorTable::from_pairs(BUILTIN_STATUS_COLORS.iter().copied()));

/// Immutable exact-match lookup from status label to colour.
///
/// Keys are stored trimmed and lookups trim their input, so `"Registered "`
/// and `"Registered"` resolve alike.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusColorTable {
    entries: HashMap<String, ColorLabel>,
}

impl StatusColorTable {
    /// The built-in table, constructed once per process.
    pub fn builtin() -> Self {
        BUILTIN_TABLE.clone()
    }

    /// Build a table from `(status, colour)` pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, ColorLabel)>) -> Self {
        let entries = pairs
            .into_iter()
            .map(|(status, color)| (status.trim().to_string(), color))
            .collect();
        Self { entries }
    }

    /// Build a table from `status -> colour name`, as written in config files.
    ///
    /// Colour names outside the palette are kept and resolve to `Unknown`.
    pub fn from_names(names: &HashMap<String, String>) -> Self {
        let entries = names
            .iter()
            .map(|(status, color)| (status.trim().to_string(), ColorLabel::from_name(color)))
            .collect();
        Self { entries }
    }

    /// Colour for one status; unmapped or empty statuses are `Unknown`.
    pub fn resolve(&self, status: &str) -> ColorLabel {
        self.entries
            .get(status.trim())
            .copied()
            .unwrap_or(ColorLabel::Unknown)
    }

    /// Colours for a list of statuses, positionally.
    pub fn resolve_all<S: AsRef<str>>(&self, statuses: &[S]) -> Vec<ColorLabel> {
        statuses.iter().map(|s| self.resolve(s.as_ref())).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Picks the slide background from the session's curation status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundPolicy {
    /// Curation status that marks a session as confirmed.
    pub confirmed_status: String,
    /// Background for confirmed sessions.
    pub confirmed: RgbColor,
    /// Background for every other session.
    pub pending: RgbColor,
}

impl Default for BackgroundPolicy {
    fn default() -> Self {
        Self {
            confirmed_status: "(5) Confirmed".to_string(),
            confirmed: RgbColor::new(0.83, 0.898, 0.812),
            pending: RgbColor::new(0.804, 0.87, 0.98),
        }
    }
}

impl BackgroundPolicy {
    pub fn color_for(&self, curation_status: &str) -> RgbColor {
        if curation_status.trim() == self.confirmed_status.trim() {
            self.confirmed
        } else {
            self.pending
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookups() {
        let table = StatusColorTable::builtin();

        assert_eq!(table.resolve("Registered"), ColorLabel::Green);
        assert_eq!(table.resolve("Confirmed, Needs Reg"), ColorLabel::Orange);
        assert_eq!(table.resolve("In Progress"), ColorLabel::Yellow);
        assert_eq!(table.resolve("Idea"), ColorLabel::Red);
        assert_eq!(table.len(), 25);
    }

    #[test]
    fn test_unmapped_statuses_are_unknown() {
        let table = StatusColorTable::builtin();

        assert_eq!(table.resolve("nonexistent-status"), ColorLabel::Unknown);
        assert_eq!(table.resolve(""), ColorLabel::Unknown);
        assert_eq!(table.resolve("registered"), ColorLabel::Unknown);
    }

    #[test]
    fn test_lookup_trims_input() {
        let table = StatusColorTable::builtin();

        assert_eq!(table.resolve("  Sent Registration "), ColorLabel::Yellow);
        assert_eq!(table.resolve("Meeting - being set "), ColorLabel::Yellow);
        assert_eq!(table.resolve("Meeting - being set"), ColorLabel::Yellow);
    }

    #[test]
    fn test_resolve_all_keeps_order() {
        let table = StatusColorTable::builtin();
        let colors = table.resolve_all(&["Idea", "???", "Registered"]);
        assert_eq!(
            colors,
            vec![ColorLabel::Red, ColorLabel::Unknown, ColorLabel::Green]
        );
    }

    #[test]
    fn test_table_from_config_names() {
        let mut names = HashMap::new();
        names.insert("Booked ".to_string(), "green".to_string());
        names.insert("Maybe".to_string(), "blue".to_string());

        let table = StatusColorTable::from_names(&names);
        assert_eq!(table.resolve("Booked"), ColorLabel::Green);
        assert_eq!(table.resolve("Maybe"), ColorLabel::Unknown);
        assert_eq!(table.resolve("Registered"), ColorLabel::Unknown);
    }

    #[test]
    fn test_background_policy() {
        let policy = BackgroundPolicy::default();

        assert_eq!(policy.color_for(" (5) Confirmed "), policy.confirmed);
        assert_eq!(policy.color_for("(4) Pending"), policy.pending);
        assert_eq!(policy.color_for("No Status Available"), policy.pending);
    }
}
