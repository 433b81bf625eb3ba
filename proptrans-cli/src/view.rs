use proptrans::{CellStatus, Column, FilePair, LineEntry, Side};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// What `view` prints.
#[derive(Debug, Clone, Default)]
pub struct ViewOptions {
    /// Display full values without truncation
    pub full: bool,
    /// Add a per-row status column
    pub status: bool,
    /// Only key rows that still need a translation
    pub untranslated: bool,
    /// Maximum column width when not `full`
    pub truncate: usize,
}

/// Print the aligned rows of a pair as a table.
pub fn print_view(pair: &FilePair, options: &ViewOptions) {
    print!("{}", render_view(pair, options));
    if let Some(summary) = warning_summary(pair) {
        println!("{}", summary);
    }
}

/// One line counting the malformed escapes kept literally in each file, or
/// `None` when both files parsed cleanly.
pub fn warning_summary(pair: &FilePair) -> Option<String> {
    let source = pair.parse_warnings(Side::Source).len();
    let destination = pair.parse_warnings(Side::Destination).len();
    if source + destination == 0 {
        return None;
    }
    Some(format!(
        "Parse warnings: {} in source, {} in destination",
        source, destination
    ))
}

pub fn render_view(pair: &FilePair, options: &ViewOptions) -> String {
    let mut table: Vec<[String; 5]> = Vec::new();
    for (index, row) in pair.rows().iter().enumerate() {
        let status = row_status(pair, index);
        if options.untranslated && status != CellStatus::DestinationValueMissing {
            continue;
        }
        let key = match row {
            LineEntry::Comment(_) => String::new(),
            LineEntry::Key(entry) if entry.newly_added => {
                format!("{}*", entry.key.as_deref().unwrap_or(""))
            }
            LineEntry::Key(entry) => entry.key.clone().unwrap_or_default(),
        };
        table.push([
            index.to_string(),
            key,
            single_line(row.value(Column::Source)),
            single_line(row.value(Column::Destination)),
            status.to_string(),
        ]);
    }

    let limit = if options.full { usize::MAX } else { options.truncate.max(4) };
    let columns = if options.status { 5 } else { 4 };
    let headers = ["#", "key", "source", "destination", "status"];

    let mut widths = [0usize; 5];
    for (i, header) in headers.iter().enumerate() {
        widths[i] = header.width();
    }
    for cells in &table {
        for (i, cell) in cells.iter().enumerate() {
            widths[i] = widths[i].max(cell.width().min(limit));
        }
    }

    let mut out = String::new();
    let header: Vec<String> = headers[..columns]
        .iter()
        .enumerate()
        .map(|(i, h)| fit(h, widths[i], limit))
        .collect();
    out.push_str(header.join("  ").trim_end());
    out.push('\n');
    for cells in &table {
        let line: Vec<String> = cells[..columns]
            .iter()
            .enumerate()
            .map(|(i, cell)| fit(cell, widths[i], limit))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    out
}

/// Print destination-only keys, one per line.
pub fn print_orphans(pair: &FilePair) {
    for key in pair.destination_only_keys() {
        println!("{}", key);
    }
}

/// The most telling status of a row, for one status column.
fn row_status(pair: &FilePair, index: usize) -> CellStatus {
    [Column::Destination, Column::Source, Column::Key]
        .into_iter()
        .filter_map(|column| pair.cell_status(index, column).ok())
        .find(|status| *status != CellStatus::Default)
        .unwrap_or(CellStatus::Default)
}

fn single_line(value: &str) -> String {
    value.replace('\n', "\\n").replace('\r', "\\r").replace('\t', "\\t")
}

/// Truncate `text` to `limit` display columns and pad it to `width`.
fn fit(text: &str, width: usize, limit: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    if text.width() > limit {
        for c in text.chars() {
            let w = c.width().unwrap_or(0);
            if used + w + 1 > limit {
                break;
            }
            out.push(c);
            used += w;
        }
        out.push('…');
        used += 1;
    } else {
        out.push_str(text);
        used = text.width();
    }
    if used < width {
        out.push_str(&" ".repeat(width - used));
    }
    out
}
