//! Core types for proptrans.
//!
//! [`Line`] is one logical line of a single `.properties` file, as the parser
//! produces it and the writer consumes it. [`LineEntry`] is one row of a
//! source/destination pair, holding both sides of that row.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Which file of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Source,
    Destination,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Source => Side::Destination,
            Side::Destination => Side::Source,
        }
    }
}

impl Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Source => write!(f, "source"),
            Side::Destination => write!(f, "destination"),
        }
    }
}

/// A column of the aligned pair view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Key,
    Source,
    Destination,
}

impl Column {
    pub const ALL: [Column; 3] = [Column::Key, Column::Source, Column::Destination];

    /// The file side a value column belongs to; `None` for the key column.
    pub fn side(self) -> Option<Side> {
        match self {
            Column::Key => None,
            Column::Source => Some(Side::Source),
            Column::Destination => Some(Side::Destination),
        }
    }
}

impl From<Side> for Column {
    fn from(side: Side) -> Self {
        match side {
            Side::Source => Column::Source,
            Side::Destination => Column::Destination,
        }
    }
}

/// Line terminator used when writing a file back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// The physical lines a key/value line was read from, continuations included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawText(pub Vec<String>);

impl RawText {
    pub fn lines(&self) -> &[String] {
        &self.0
    }
}

/// A comment or blank line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentLine {
    /// 1-based line number in the file it was read from, if any.
    pub line_number: Option<usize>,
    /// The line exactly as written, leading whitespace included.
    pub text: String,
}

/// A key/value line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairLine {
    pub line_number: Option<usize>,
    pub key: String,
    /// Decoded value; an empty value is stored as `None`.
    pub value: Option<String>,
    /// Whether the separator was surrounded by spaces (`key = value`).
    pub spaced_equals: bool,
    /// Original text, written verbatim while the line is unmodified.
    pub raw: Option<RawText>,
}

impl PairLine {
    /// A freshly composed line with no original text.
    pub fn new(key: impl Into<String>, value: Option<String>, spaced_equals: bool) -> Self {
        PairLine {
            line_number: None,
            key: key.into(),
            value,
            spaced_equals,
            raw: None,
        }
    }
}

/// One logical line of a single `.properties` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Comment(CommentLine),
    Pair(PairLine),
}

impl Line {
    pub fn comment(text: impl Into<String>) -> Self {
        Line::Comment(CommentLine {
            line_number: None,
            text: text.into(),
        })
    }

    pub fn line_number(&self) -> Option<usize> {
        match self {
            Line::Comment(comment) => comment.line_number,
            Line::Pair(pair) => pair.line_number,
        }
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            Line::Comment(_) => None,
            Line::Pair(pair) => Some(&pair.key),
        }
    }
}

/// A comment row of the pair view. Each side is independent; `None` means the
/// row does not exist in that file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentEntry {
    pub line_number: Option<usize>,
    pub source: Option<String>,
    pub destination: Option<String>,
}

impl CommentEntry {
    pub fn text(&self, side: Side) -> Option<&str> {
        match side {
            Side::Source => self.source.as_deref(),
            Side::Destination => self.destination.as_deref(),
        }
    }

    pub(crate) fn text_mut(&mut self, side: Side) -> &mut Option<String> {
        match side {
            Side::Source => &mut self.source,
            Side::Destination => &mut self.destination,
        }
    }

    /// True for a real comment (not a blank line) on either side.
    pub fn has_text(&self) -> bool {
        [&self.source, &self.destination]
            .into_iter()
            .any(|text| text.as_deref().is_some_and(|t| !t.trim().is_empty()))
    }
}

/// A key/value row of the pair view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyEntry {
    pub line_number: Option<usize>,
    /// `None` only while a newly added row is waiting for its key.
    pub key: Option<String>,
    pub source_value: Option<String>,
    pub destination_value: Option<String>,
    pub source_spaced_equals: bool,
    pub destination_spaced_equals: bool,
    /// Inserted by the user and not yet committed.
    pub newly_added: bool,
    pub source_raw: Option<RawText>,
    pub destination_raw: Option<RawText>,
}

impl KeyEntry {
    /// An empty, uncommitted row.
    pub fn new_added() -> Self {
        KeyEntry {
            newly_added: true,
            ..KeyEntry::default()
        }
    }

    pub fn value(&self, side: Side) -> Option<&str> {
        match side {
            Side::Source => self.source_value.as_deref(),
            Side::Destination => self.destination_value.as_deref(),
        }
    }

    pub(crate) fn value_mut(&mut self, side: Side) -> &mut Option<String> {
        match side {
            Side::Source => &mut self.source_value,
            Side::Destination => &mut self.destination_value,
        }
    }

    pub fn raw(&self, side: Side) -> Option<&RawText> {
        match side {
            Side::Source => self.source_raw.as_ref(),
            Side::Destination => self.destination_raw.as_ref(),
        }
    }

    pub(crate) fn raw_mut(&mut self, side: Side) -> &mut Option<RawText> {
        match side {
            Side::Source => &mut self.source_raw,
            Side::Destination => &mut self.destination_raw,
        }
    }

    pub fn spaced_equals(&self, side: Side) -> bool {
        match side {
            Side::Source => self.source_spaced_equals,
            Side::Destination => self.destination_spaced_equals,
        }
    }

    /// True if this row has a line in the given file.
    pub fn is_present(&self, side: Side) -> bool {
        self.value(side).is_some() || self.raw(side).is_some()
    }

    /// The committed key, if this row takes part in key classification.
    pub fn committed_key(&self) -> Option<&str> {
        if self.newly_added {
            None
        } else {
            self.key.as_deref()
        }
    }

    /// Projects one side of this row onto a single-file line.
    pub fn to_pair_line(&self, side: Side) -> Option<PairLine> {
        let key = self.key.clone()?;
        if !self.is_present(side) {
            return None;
        }
        Some(PairLine {
            line_number: self.line_number,
            key,
            value: self.value(side).map(str::to_string),
            spaced_equals: self.spaced_equals(side),
            raw: self.raw(side).cloned(),
        })
    }
}

/// One row of the aligned source/destination view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEntry {
    Comment(CommentEntry),
    Key(KeyEntry),
}

impl LineEntry {
    pub fn is_comment(&self) -> bool {
        matches!(self, LineEntry::Comment(_))
    }

    pub fn line_number(&self) -> Option<usize> {
        match self {
            LineEntry::Comment(comment) => comment.line_number,
            LineEntry::Key(entry) => entry.line_number,
        }
    }

    pub fn is_newly_added(&self) -> bool {
        matches!(self, LineEntry::Key(entry) if entry.newly_added)
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            LineEntry::Comment(_) => None,
            LineEntry::Key(entry) => entry.key.as_deref(),
        }
    }

    /// Cell text as a view shows it; absent values render as `""`.
    pub fn value(&self, column: Column) -> &str {
        match (self, column) {
            (LineEntry::Key(entry), Column::Key) => entry.key.as_deref().unwrap_or(""),
            (LineEntry::Key(entry), Column::Source) => entry.value(Side::Source).unwrap_or(""),
            (LineEntry::Key(entry), Column::Destination) => {
                entry.value(Side::Destination).unwrap_or("")
            }
            (LineEntry::Comment(_), Column::Key) => "",
            (LineEntry::Comment(comment), Column::Source) => {
                comment.text(Side::Source).unwrap_or("")
            }
            (LineEntry::Comment(comment), Column::Destination) => {
                comment.text(Side::Destination).unwrap_or("")
            }
        }
    }

    /// Whether a view should let the user edit this cell.
    ///
    /// Comment rows have no key cell; keys are editable only on rows the user
    /// added; no-localize keys are read-only in the destination column.
    pub fn is_editable(&self, column: Column, no_localize_prefix: &str) -> bool {
        match self {
            LineEntry::Comment(_) => column != Column::Key,
            LineEntry::Key(entry) => match column {
                Column::Key => entry.newly_added,
                Column::Source => true,
                Column::Destination => !entry.key.as_deref().is_some_and(|key| {
                    !no_localize_prefix.is_empty() && key.starts_with(no_localize_prefix)
                }),
            },
        }
    }
}

/// Presentation status of one cell of the pair view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellStatus {
    /// Nothing to report.
    Default,
    /// Destination value of a key present in both files.
    SharedKeyOk,
    /// Key column of a comment row (not a blank row).
    CommentKeyColumn,
    /// Key exists but the source value is empty.
    SourceValueMissing,
    /// Source has a value, destination does not: ready to translate.
    DestinationValueMissing,
    /// Key exists in the destination only.
    DestinationOnlyOrphan,
    /// Destination cell of a no-localize key.
    ReadOnlyNotLocalized,
}

impl Display for CellStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CellStatus::Default => "default",
            CellStatus::SharedKeyOk => "ok",
            CellStatus::CommentKeyColumn => "comment",
            CellStatus::SourceValueMissing => "source-missing",
            CellStatus::DestinationValueMissing => "untranslated",
            CellStatus::DestinationOnlyOrphan => "orphan",
            CellStatus::ReadOnlyNotLocalized => "no-localize",
        };
        write!(f, "{}", name)
    }
}

/// All classifications of one row at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RowClassification {
    pub shared_key_ok: bool,
    pub source_value_missing: bool,
    pub destination_value_missing: bool,
    pub destination_only_orphan: bool,
    pub read_only_not_localized: bool,
    pub comment_key_column: bool,
}
