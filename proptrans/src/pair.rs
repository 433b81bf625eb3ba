//! A source/destination pair of `.properties` files, aligned row by row.
//!
//! [`FilePair`] owns both parsed files and a single list of [`LineEntry`]
//! rows. Row `i` holds the same conceptual line of both files: a key row
//! carries the source and destination value of one key, a comment row the
//! comment text of each side. Edits go through [`FilePair::set_value`] and
//! [`FilePair::insert_row`]; [`FilePair::save`] writes one side back.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    error::Error,
    formats::properties::{Format, ParseWarning},
    observer::PairObserver,
    read_options::PairOptions,
    traits::Parser,
    types::{
        CellStatus, Column, CommentEntry, CommentLine, KeyEntry, Line, LineEntry, PairLine,
        RowClassification, Side,
    },
};

/// Counts over the whole pair, for summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PairStats {
    pub rows: usize,
    pub comment_rows: usize,
    pub key_rows: usize,
    /// Keys with a value on both sides.
    pub translated: usize,
    /// Keys with a source value and no destination value.
    pub untranslated: usize,
    pub source_missing: usize,
    pub destination_only: usize,
    pub not_localized: usize,
    pub uncommitted: usize,
}

impl PairStats {
    /// Share of translatable keys that have a destination value, in percent.
    pub fn completion_percent(&self) -> f64 {
        let denominator = self.translated + self.untranslated;
        if denominator == 0 {
            100.0
        } else {
            (self.translated as f64) * 100.0 / (denominator as f64)
        }
    }
}

/// The aligned view of a source and a destination `.properties` file.
pub struct FilePair {
    source_path: PathBuf,
    destination_path: PathBuf,
    options: PairOptions,
    source: Option<Format>,
    destination: Option<Format>,
    rows: Vec<LineEntry>,
    unsaved_source: bool,
    unsaved_destination: bool,
    unsaved_inserted_rows: bool,
    destination_only_keys: BTreeSet<String>,
    source_duplicates: Vec<String>,
    destination_duplicates: Vec<String>,
    observer: Option<Box<dyn PairObserver>>,
}

impl std::fmt::Debug for FilePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilePair")
            .field("source_path", &self.source_path)
            .field("destination_path", &self.destination_path)
            .field("rows", &self.rows.len())
            .field("unsaved_source", &self.unsaved_source)
            .field("unsaved_destination", &self.unsaved_destination)
            .field("unsaved_inserted_rows", &self.unsaved_inserted_rows)
            .field("destination_only_keys", &self.destination_only_keys)
            .finish_non_exhaustive()
    }
}

impl FilePair {
    /// Creates a pair for two paths with default options. Nothing is read yet.
    pub fn new<S: Into<PathBuf>, D: Into<PathBuf>>(source_path: S, destination_path: D) -> Self {
        Self::with_options(source_path, destination_path, PairOptions::default())
    }

    pub fn with_options<S: Into<PathBuf>, D: Into<PathBuf>>(
        source_path: S,
        destination_path: D,
        options: PairOptions,
    ) -> Self {
        FilePair {
            source_path: source_path.into(),
            destination_path: destination_path.into(),
            options,
            source: None,
            destination: None,
            rows: Vec::new(),
            unsaved_source: false,
            unsaved_destination: false,
            unsaved_inserted_rows: false,
            destination_only_keys: BTreeSet::new(),
            source_duplicates: Vec::new(),
            destination_duplicates: Vec::new(),
            observer: None,
        }
    }

    pub fn path(&self, side: Side) -> &Path {
        match side {
            Side::Source => &self.source_path,
            Side::Destination => &self.destination_path,
        }
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn destination_path(&self) -> &Path {
        &self.destination_path
    }

    pub fn options(&self) -> &PairOptions {
        &self.options
    }

    /// Installs the view notified of row insertions and cell changes.
    pub fn set_observer(&mut self, observer: Box<dyn PairObserver>) {
        self.observer = Some(observer);
    }

    fn notify(&mut self, event: impl FnOnce(&mut dyn PairObserver)) {
        if let Some(observer) = self.observer.as_deref_mut() {
            event(observer);
        }
    }

    // ----- parsing -----

    /// Reads and parses the source file, then rebuilds the rows.
    pub fn parse_source(&mut self) -> Result<(), Error> {
        let format = Format::read_with(&self.source_path, &self.options.read)?;
        self.load_source(format);
        Ok(())
    }

    /// Reads and parses the destination file, then rebuilds the rows.
    pub fn parse_destination(&mut self) -> Result<(), Error> {
        let format = Format::read_with(&self.destination_path, &self.options.read)?;
        self.load_destination(format);
        Ok(())
    }

    /// Uses an already parsed source file.
    pub fn load_source(&mut self, format: Format) {
        self.source = Some(format);
        self.rebuild();
    }

    /// Uses an already parsed destination file.
    pub fn load_destination(&mut self, format: Format) {
        self.destination = Some(format);
        self.rebuild();
    }

    pub fn is_parsed(&self, side: Side) -> bool {
        match side {
            Side::Source => self.source.is_some(),
            Side::Destination => self.destination.is_some(),
        }
    }

    /// Throws away every edit since the last parse.
    pub fn revert(&mut self) {
        self.rebuild();
    }

    fn rebuild(&mut self) {
        if self.has_unsaved_changes() || self.unsaved_inserted_rows {
            warn!(
                source = %self.source_path.display(),
                destination = %self.destination_path.display(),
                "discarding unsaved edits"
            );
        }

        self.source_duplicates.clear();
        self.destination_duplicates.clear();

        let mut rows = Vec::new();
        if let Some(source) = &self.source {
            let mut seen = HashSet::new();
            for line in &source.lines {
                match line {
                    Line::Comment(comment) => rows.push(LineEntry::Comment(CommentEntry {
                        line_number: comment.line_number,
                        source: Some(comment.text.clone()),
                        destination: None,
                    })),
                    Line::Pair(pair) => {
                        if !seen.insert(pair.key.as_str()) {
                            warn!(key = %pair.key, line = ?pair.line_number, "duplicate key in source file");
                            self.source_duplicates.push(pair.key.clone());
                        }
                        rows.push(LineEntry::Key(KeyEntry {
                            line_number: pair.line_number,
                            key: Some(pair.key.clone()),
                            source_value: pair.value.clone(),
                            source_spaced_equals: pair.spaced_equals,
                            source_raw: pair.raw.clone(),
                            ..KeyEntry::default()
                        }));
                    }
                }
            }
        }

        if let Some(destination) = &self.destination {
            rows = align_destination(rows, destination, &mut self.destination_duplicates);
        }

        self.rows = rows;
        self.unsaved_source = false;
        self.unsaved_destination = false;
        self.unsaved_inserted_rows = false;
        self.refresh_destination_only();

        debug!(
            rows = self.rows.len(),
            destination_only = self.destination_only_keys.len(),
            "rebuilt aligned rows"
        );
        self.notify(|o| o.data_changed());
    }

    // ----- queries -----

    /// Number of real rows, not counting the virtual append row.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Same as [`FilePair::row_count`]; the index of the virtual append row.
    pub fn size(&self) -> usize {
        self.row_count()
    }

    pub fn rows(&self) -> &[LineEntry] {
        &self.rows
    }

    pub fn get_row(&self, index: usize) -> Result<&LineEntry, Error> {
        self.rows.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.rows.len(),
        })
    }

    /// Index of the first row with this key, committed or not.
    pub fn find_key(&self, key: &str) -> Option<usize> {
        self.rows.iter().position(|row| row.key() == Some(key))
    }

    pub fn unsaved_source(&self) -> bool {
        self.unsaved_source
    }

    pub fn unsaved_destination(&self) -> bool {
        self.unsaved_destination
    }

    pub fn unsaved_inserted_rows(&self) -> bool {
        self.unsaved_inserted_rows
    }

    pub fn is_unsaved(&self, side: Side) -> bool {
        match side {
            Side::Source => self.unsaved_source,
            Side::Destination => self.unsaved_destination,
        }
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved_source || self.unsaved_destination
    }

    /// Keys that appear more than once in one file, as found while parsing.
    pub fn duplicate_keys(&self, side: Side) -> &[String] {
        match side {
            Side::Source => &self.source_duplicates,
            Side::Destination => &self.destination_duplicates,
        }
    }

    /// Malformed escapes kept literally while parsing one file.
    pub fn parse_warnings(&self, side: Side) -> &[ParseWarning] {
        let format = match side {
            Side::Source => self.source.as_ref(),
            Side::Destination => self.destination.as_ref(),
        };
        format.map_or(&[], |format| &format.warnings)
    }

    /// Committed keys present in the destination file but not in the source.
    pub fn destination_only_keys(&self) -> &BTreeSet<String> {
        &self.destination_only_keys
    }

    pub fn is_key_destination_only(&self, key: &str) -> bool {
        self.destination_only_keys.contains(key)
    }

    fn committed_keys(&self, side: Side) -> HashSet<&str> {
        self.rows
            .iter()
            .filter_map(|row| match row {
                LineEntry::Key(entry) if entry.is_present(side) => entry.committed_key(),
                _ => None,
            })
            .collect()
    }

    fn refresh_destination_only(&mut self) {
        let source_keys = self.committed_keys(Side::Source);
        let destination_only = self
            .committed_keys(Side::Destination)
            .into_iter()
            .filter(|key| !source_keys.contains(key))
            .map(str::to_string)
            .collect();
        self.destination_only_keys = destination_only;
    }

    /// Presentation status of one cell. The virtual append row is always
    /// [`CellStatus::Default`].
    pub fn cell_status(&self, row: usize, column: Column) -> Result<CellStatus, Error> {
        if row == self.rows.len() {
            return Ok(CellStatus::Default);
        }
        let status = match self.get_row(row)? {
            LineEntry::Comment(comment) => {
                if column == Column::Key && comment.has_text() {
                    CellStatus::CommentKeyColumn
                } else {
                    CellStatus::Default
                }
            }
            LineEntry::Key(entry) => {
                let Some(key) = entry.key.as_deref() else {
                    return Ok(CellStatus::Default);
                };
                match column {
                    Column::Key => CellStatus::Default,
                    Column::Source if entry.source_value.is_none() => {
                        CellStatus::SourceValueMissing
                    }
                    Column::Source => CellStatus::Default,
                    Column::Destination => {
                        if self.options.is_no_localize(key) {
                            CellStatus::ReadOnlyNotLocalized
                        } else if entry.destination_value.is_none() && entry.source_value.is_some() {
                            CellStatus::DestinationValueMissing
                        } else if self.is_key_destination_only(key) {
                            CellStatus::DestinationOnlyOrphan
                        } else if entry.destination_value.is_some() && entry.source_value.is_some() {
                            CellStatus::SharedKeyOk
                        } else {
                            CellStatus::Default
                        }
                    }
                }
            }
        };
        Ok(status)
    }

    /// Every classification of one row at once.
    pub fn classify_row(&self, row: usize) -> Result<RowClassification, Error> {
        let key = self.cell_status(row, Column::Key)?;
        let source = self.cell_status(row, Column::Source)?;
        let destination = self.cell_status(row, Column::Destination)?;
        Ok(RowClassification {
            shared_key_ok: destination == CellStatus::SharedKeyOk,
            source_value_missing: source == CellStatus::SourceValueMissing,
            destination_value_missing: destination == CellStatus::DestinationValueMissing,
            destination_only_orphan: destination == CellStatus::DestinationOnlyOrphan,
            read_only_not_localized: destination == CellStatus::ReadOnlyNotLocalized,
            comment_key_column: key == CellStatus::CommentKeyColumn,
        })
    }

    pub fn stats(&self) -> PairStats {
        let mut stats = PairStats {
            rows: self.rows.len(),
            ..PairStats::default()
        };
        for (index, row) in self.rows.iter().enumerate() {
            let LineEntry::Key(entry) = row else {
                stats.comment_rows += 1;
                continue;
            };
            stats.key_rows += 1;
            if entry.newly_added {
                stats.uncommitted += 1;
                continue;
            }
            let Ok(class) = self.classify_row(index) else {
                continue;
            };
            if class.source_value_missing && !class.destination_only_orphan {
                stats.source_missing += 1;
            }
            if class.shared_key_ok {
                stats.translated += 1;
            }
            if class.destination_value_missing {
                stats.untranslated += 1;
            }
            if class.destination_only_orphan {
                stats.destination_only += 1;
            }
            if class.read_only_not_localized {
                stats.not_localized += 1;
            }
        }
        stats
    }

    // ----- mutation -----

    /// Changes one cell.
    ///
    /// Whitespace-only input counts as empty, and empty is stored as absent.
    /// Returns `Ok(false)` when nothing changed: the value was already equal,
    /// or the edit is not allowed (clearing a committed key's source value,
    /// renaming a committed key, editing a no-localize destination value,
    /// duplicating a key within one file). Writing to row [`FilePair::row_count`]
    /// first appends a new row.
    pub fn set_value(&mut self, row: usize, column: Column, new_value: &str) -> Result<bool, Error> {
        let len = self.rows.len();
        if row > len {
            return Err(Error::IndexOutOfRange { index: row, len });
        }

        let normalized = if new_value.trim().is_empty() {
            None
        } else if column == Column::Key {
            Some(new_value.trim().to_string())
        } else {
            Some(new_value.to_string())
        };
        let current = self.rows.get(row).map_or("", |r| r.value(column));
        if normalized.as_deref().unwrap_or("") == current {
            return Ok(false);
        }

        if row == len {
            self.rows.push(LineEntry::Key(KeyEntry::new_added()));
            self.unsaved_inserted_rows = true;
            debug!(row, "materialized append row");
            self.notify(|o| o.rows_inserted(row, row));
        }

        if let Some(reason) = self.rejection(row, column, normalized.as_deref()) {
            debug!(row, ?column, reason, "edit rejected");
            return Ok(false);
        }

        let mut dirty_source = false;
        let mut dirty_destination = false;
        let mut key_changed = false;

        match &mut self.rows[row] {
            LineEntry::Key(entry) => match column {
                Column::Key => {
                    entry.key = normalized;
                    dirty_source = true;
                    dirty_destination = entry.destination_value.is_some();
                    key_changed = true;
                }
                Column::Source | Column::Destination => {
                    let side = if column == Column::Source {
                        Side::Source
                    } else {
                        Side::Destination
                    };
                    if entry.value(side).is_none() && normalized.is_some() {
                        // A first value on one side takes the other side's layout.
                        let spaced = entry.spaced_equals(side.other());
                        match side {
                            Side::Source => entry.source_spaced_equals = spaced,
                            Side::Destination => entry.destination_spaced_equals = spaced,
                        }
                    }
                    *entry.value_mut(side) = normalized;
                    *entry.raw_mut(side) = None;
                    match side {
                        Side::Source => dirty_source = true,
                        Side::Destination => dirty_destination = true,
                    }
                }
            },
            LineEntry::Comment(comment) => {
                let Some(side) = column.side() else {
                    return Ok(false);
                };
                let text = match normalized {
                    Some(text) => {
                        let text = text.trim();
                        if text.starts_with('#') || text.starts_with('!') {
                            text.to_string()
                        } else {
                            format!("# {}", text)
                        }
                    }
                    None => String::new(),
                };
                let slot = comment.text_mut(side);
                if slot.as_deref() == Some(text.as_str()) {
                    return Ok(false);
                }
                *slot = Some(text);
                match side {
                    Side::Source => dirty_source = true,
                    Side::Destination => dirty_destination = true,
                }
            }
        }

        if key_changed {
            self.unsaved_inserted_rows = true;
        }
        self.unsaved_source |= dirty_source;
        self.unsaved_destination |= dirty_destination;
        self.refresh_destination_only();
        self.notify(|o| o.cell_changed(row, column));
        Ok(true)
    }

    fn rejection(&self, row: usize, column: Column, value: Option<&str>) -> Option<&'static str> {
        let LineEntry::Key(entry) = &self.rows[row] else {
            return None;
        };
        match column {
            Column::Key if !entry.newly_added => Some("committed keys cannot be renamed"),
            Column::Key => None,
            Column::Source if value.is_none() && !entry.newly_added => {
                Some("the source value of an established key cannot be cleared")
            }
            Column::Destination
                if entry
                    .key
                    .as_deref()
                    .is_some_and(|key| self.options.is_no_localize(key)) =>
            {
                Some("no-localize keys are read-only in the destination")
            }
            Column::Source | Column::Destination => {
                let side = column.side()?;
                let key = entry.committed_key()?;
                let taken = !entry.is_present(side)
                    && self.rows.iter().enumerate().any(|(i, other)| {
                        i != row
                            && matches!(other, LineEntry::Key(o)
                                if o.committed_key() == Some(key) && o.is_present(side))
                    });
                taken.then_some("key already present in that file")
            }
        }
    }

    /// Inserts an empty, uncommitted key row above (`before`) or below
    /// `anchor_row`, in both files at once. `anchor_row` may be the virtual
    /// append row. Returns the new row's index.
    pub fn insert_row(&mut self, anchor_row: usize, before: bool) -> Result<usize, Error> {
        let len = self.rows.len();
        if anchor_row > len {
            return Err(Error::IndexOutOfRange {
                index: anchor_row,
                len,
            });
        }
        let index = if before || anchor_row == len {
            anchor_row
        } else {
            anchor_row + 1
        };
        self.rows.insert(index, LineEntry::Key(KeyEntry::new_added()));
        self.unsaved_inserted_rows = true;
        debug!(index, "inserted row");
        self.notify(|o| o.rows_inserted(index, index));
        Ok(index)
    }

    /// Commits newly added rows that have a usable key.
    ///
    /// A key already committed in a file where the new row has a value stays
    /// uncommitted, and keeps `unsaved_inserted_rows` set. Returns true if any
    /// row was committed.
    pub fn convert_inserted_rows(&mut self) -> bool {
        let mut taken: HashMap<Side, HashSet<String>> = HashMap::new();
        for side in [Side::Source, Side::Destination] {
            let keys = self
                .committed_keys(side)
                .into_iter()
                .map(str::to_string)
                .collect();
            taken.insert(side, keys);
        }

        let mut changed = false;
        for (index, row) in self.rows.iter_mut().enumerate() {
            let LineEntry::Key(entry) = row else {
                continue;
            };
            if !entry.newly_added {
                continue;
            }
            let Some(key) = entry.key.as_deref().filter(|k| !k.is_empty()) else {
                continue;
            };
            let sides: Vec<Side> = [Side::Source, Side::Destination]
                .into_iter()
                .filter(|&side| entry.is_present(side))
                .collect();
            let conflict = if sides.is_empty() {
                taken.values().any(|keys| keys.contains(key))
            } else {
                sides.iter().any(|side| taken[side].contains(key))
            };
            if conflict {
                warn!(row = index, key, "key already in use; row stays uncommitted");
                continue;
            }
            for side in &sides {
                if let Some(keys) = taken.get_mut(side) {
                    keys.insert(key.to_string());
                }
            }
            entry.newly_added = false;
            changed = true;
        }

        self.unsaved_inserted_rows = self.rows.iter().any(|row| {
            matches!(row, LineEntry::Key(entry)
                if entry.newly_added && entry.key.as_deref().is_some_and(|k| !k.is_empty()))
        });
        if changed {
            self.refresh_destination_only();
            self.notify(|o| o.data_changed());
        }
        changed
    }

    // ----- writing -----

    /// The lines to write for one file, in file order.
    ///
    /// The source file gets only its own lines. The destination follows the
    /// source layout: a comment row it lacks becomes a blank line. Key rows
    /// are written only where they have a value (or original text), and
    /// keyless or uncommitted rows are never written.
    pub fn extract_contents_for_side(&self, side: Side) -> Vec<Line> {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(index, row)| match row {
                LineEntry::Comment(comment) => match comment.text(side) {
                    Some(text) => Some(Line::Comment(CommentLine {
                        line_number: comment.line_number,
                        text: text.to_string(),
                    })),
                    None if side == Side::Destination && comment.source.is_some() => {
                        Some(Line::comment(""))
                    }
                    None => None,
                },
                LineEntry::Key(entry) => {
                    if entry.newly_added {
                        if entry.is_present(side) {
                            warn!(row = index, key = ?entry.key, %side, "skipping uncommitted row");
                        }
                        return None;
                    }
                    entry.to_pair_line(side).map(Line::Pair)
                }
            })
            .collect()
    }

    /// One side as a writable file, keeping that file's line-ending style.
    pub fn extract_format(&self, side: Side) -> Format {
        let parsed = |side: Side| match side {
            Side::Source => self.source.as_ref(),
            Side::Destination => self.destination.as_ref(),
        };
        let template = [side, side.other()]
            .into_iter()
            .filter_map(parsed)
            .find(|format| !format.lines.is_empty());
        let mut format = Format::new();
        if let Some(template) = template {
            format.line_ending = template.line_ending;
            format.trailing_newline = template.trailing_newline;
        }
        format.lines = self.extract_contents_for_side(side);
        format
    }

    /// Writes one side to `path` without touching the unsaved flags.
    ///
    /// Commits inserted rows first when there are any pending.
    pub fn save_to<P: AsRef<Path>>(&mut self, side: Side, path: P) -> Result<(), Error> {
        if self.unsaved_inserted_rows {
            self.convert_inserted_rows();
        }
        let path = path.as_ref();
        let format = self.extract_format(side);
        format.write_to(path)?;
        info!(%side, path = %path.display(), lines = format.lines.len(), "saved properties file");
        Ok(())
    }

    /// Writes one side back to its own file and marks it clean.
    ///
    /// On failure the unsaved flag stays set.
    pub fn save(&mut self, side: Side) -> Result<(), Error> {
        let path = self.path(side).to_path_buf();
        self.save_to(side, &path)?;
        match side {
            Side::Source => self.unsaved_source = false,
            Side::Destination => self.unsaved_destination = false,
        }
        Ok(())
    }

    /// Saves every side with unsaved changes, destination first.
    pub fn save_all(&mut self) -> Result<(), Error> {
        if self.unsaved_destination {
            self.save(Side::Destination)?;
        }
        if self.unsaved_source {
            self.save(Side::Source)?;
        }
        Ok(())
    }
}

/// A destination key line with the comment lines directly above it, or the
/// comments after the last key.
struct DestinationBlock {
    comments: Vec<CommentLine>,
    pair: Option<PairLine>,
}

fn split_blocks(format: &Format) -> Vec<DestinationBlock> {
    let mut blocks = Vec::new();
    let mut comments = Vec::new();
    for line in &format.lines {
        match line {
            Line::Comment(comment) => comments.push(comment.clone()),
            Line::Pair(pair) => blocks.push(DestinationBlock {
                comments: std::mem::take(&mut comments),
                pair: Some(pair.clone()),
            }),
        }
    }
    if !comments.is_empty() {
        blocks.push(DestinationBlock {
            comments,
            pair: None,
        });
    }
    blocks
}

/// Fills the comment run `pending` with destination comments, bottom-aligned,
/// adding rows at the top of the run when the destination has more.
fn merge_comments(pending: &mut Vec<CommentEntry>, comments: Vec<CommentLine>) {
    if comments.len() > pending.len() {
        let extra = comments.len() - pending.len();
        pending.splice(0..0, std::iter::repeat_with(CommentEntry::default).take(extra));
    }
    let start = pending.len() - comments.len();
    for (slot, comment) in pending[start..].iter_mut().zip(comments) {
        if slot.line_number.is_none() {
            slot.line_number = comment.line_number;
        }
        slot.destination = Some(comment.text);
    }
}

fn align_destination(
    source_rows: Vec<LineEntry>,
    destination: &Format,
    duplicates: &mut Vec<String>,
) -> Vec<LineEntry> {
    let source_keys: HashSet<String> = source_rows
        .iter()
        .filter_map(|row| row.key().map(str::to_string))
        .collect();

    let blocks = split_blocks(destination);
    let mut seen = HashSet::new();
    let mut matched: HashMap<String, usize> = HashMap::new();
    for (index, block) in blocks.iter().enumerate() {
        let Some(pair) = &block.pair else {
            continue;
        };
        if !seen.insert(pair.key.clone()) {
            warn!(key = %pair.key, line = ?pair.line_number, "duplicate key in destination file");
            duplicates.push(pair.key.clone());
            continue;
        }
        if source_keys.contains(&pair.key) {
            matched.insert(pair.key.clone(), index);
        }
    }

    // Destination-only blocks stay below the matched key they follow in the
    // destination file; those before any matched key lead the rows.
    let matched_indices: HashSet<usize> = matched.values().copied().collect();
    let trailing = blocks
        .len()
        .checked_sub(1)
        .filter(|&last| blocks[last].pair.is_none());
    let mut leading = Vec::new();
    let mut followers: Vec<Vec<usize>> = vec![Vec::new(); blocks.len()];
    let mut anchor = None;
    for index in 0..blocks.len() {
        if matched_indices.contains(&index) {
            anchor = Some(index);
        } else if Some(index) != trailing {
            match anchor {
                Some(anchor) => followers[anchor].push(index),
                None => leading.push(index),
            }
        }
    }

    let mut slots: Vec<Option<DestinationBlock>> = blocks.into_iter().map(Some).collect();
    let mut rows = Vec::with_capacity(source_rows.len() + slots.len());
    let mut pending: Vec<CommentEntry> = Vec::new();

    for index in leading {
        if let Some(block) = slots[index].take() {
            push_destination_block(&mut rows, block);
        }
    }

    for row in source_rows {
        match row {
            LineEntry::Comment(comment) => pending.push(comment),
            LineEntry::Key(mut entry) => {
                let matched_index = entry.key.as_deref().and_then(|key| matched.remove(key));
                if let Some(block) = matched_index.and_then(|index| slots[index].take()) {
                    merge_comments(&mut pending, block.comments);
                    if let Some(pair) = block.pair {
                        entry.destination_value = pair.value;
                        entry.destination_spaced_equals = pair.spaced_equals;
                        entry.destination_raw = pair.raw;
                    }
                }
                rows.extend(pending.drain(..).map(LineEntry::Comment));
                rows.push(LineEntry::Key(entry));

                if let Some(index) = matched_index {
                    for follower in std::mem::take(&mut followers[index]) {
                        if let Some(block) = slots[follower].take() {
                            push_destination_block(&mut rows, block);
                        }
                    }
                }
            }
        }
    }

    let trailing_is_comments = slots
        .last()
        .is_some_and(|slot| slot.as_ref().is_some_and(|block| block.pair.is_none()));
    if trailing_is_comments && let Some(Some(block)) = slots.pop() {
        merge_comments(&mut pending, block.comments);
    }
    rows.extend(pending.drain(..).map(LineEntry::Comment));

    for block in slots.into_iter().flatten() {
        push_destination_block(&mut rows, block);
    }

    rows
}

/// Adds the rows of a block that has no counterpart in the source file.
fn push_destination_block(rows: &mut Vec<LineEntry>, block: DestinationBlock) {
    rows.extend(block.comments.into_iter().map(|comment| {
        LineEntry::Comment(CommentEntry {
            line_number: comment.line_number,
            source: None,
            destination: Some(comment.text),
        })
    }));
    if let Some(pair) = block.pair {
        rows.push(LineEntry::Key(KeyEntry {
            line_number: pair.line_number,
            key: Some(pair.key),
            destination_value: pair.value,
            destination_spaced_equals: pair.spaced_equals,
            destination_raw: pair.raw,
            ..KeyEntry::default()
        }));
    }
}
