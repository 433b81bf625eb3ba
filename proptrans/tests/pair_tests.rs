use std::fs;
use std::path::PathBuf;

use proptrans::{CellStatus, Column, Error, FilePair, LineEntry, PairOptions, Side};
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    source: PathBuf,
    destination: PathBuf,
}

fn write_pair(source: &[u8], destination: &[u8]) -> Fixture {
    let dir = TempDir::new().unwrap();
    let source_path = dir.path().join("strings.properties");
    let destination_path = dir.path().join("strings_fr.properties");
    fs::write(&source_path, source).unwrap();
    fs::write(&destination_path, destination).unwrap();
    Fixture {
        _dir: dir,
        source: source_path,
        destination: destination_path,
    }
}

fn open(fixture: &Fixture) -> FilePair {
    let mut pair = FilePair::new(&fixture.source, &fixture.destination);
    pair.parse_source().unwrap();
    pair.parse_destination().unwrap();
    pair
}

#[test]
fn test_untranslated_key_becomes_translated() {
    let fixture = write_pair(b"greeting=Hello\n", b"");
    let mut pair = open(&fixture);

    let class = pair.classify_row(0).unwrap();
    assert!(!class.source_value_missing);
    assert!(class.destination_value_missing);

    assert!(pair.set_value(0, Column::Destination, "Bonjour").unwrap());
    let class = pair.classify_row(0).unwrap();
    assert!(!class.destination_value_missing);
    assert!(class.shared_key_ok);
    assert!(pair.unsaved_destination());
    assert!(!pair.unsaved_source());

    pair.save(Side::Destination).unwrap();
    assert!(!pair.unsaved_destination());
    assert_eq!(
        fs::read_to_string(&fixture.destination).unwrap(),
        "greeting=Bonjour\n"
    );
}

#[test]
fn test_orphan_key_in_destination() {
    let fixture = write_pair(b"greeting=Hello\n", b"orphanKey=Bonjour\n");
    let pair = open(&fixture);

    let keys: Vec<&str> = pair
        .destination_only_keys()
        .iter()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, vec!["orphanKey"]);

    let row = pair.find_key("orphanKey").unwrap();
    assert!(pair.classify_row(row).unwrap().destination_only_orphan);
    assert_eq!(
        pair.cell_status(row, Column::Destination).unwrap(),
        CellStatus::DestinationOnlyOrphan
    );
}

#[test]
fn test_orphan_resolved_by_source_value() {
    let fixture = write_pair(b"greeting=Hello\n", b"orphanKey=Bonjour\n");
    let mut pair = open(&fixture);
    let row = pair.find_key("orphanKey").unwrap();

    assert!(pair.set_value(row, Column::Source, "Hi there").unwrap());
    assert!(!pair.is_key_destination_only("orphanKey"));
    assert!(pair.unsaved_source());

    pair.save_all().unwrap();
    assert_eq!(
        fs::read_to_string(&fixture.source).unwrap(),
        "orphanKey=Hi there\ngreeting=Hello\n"
    );
}

#[test]
fn test_orphan_resolved_by_inserted_source_row() {
    let fixture = write_pair(b"greeting=Hello\n", b"orphanKey=Bonjour\n");
    let mut pair = open(&fixture);

    let row = pair.insert_row(0, false).unwrap();
    pair.set_value(row, Column::Key, "orphanKey").unwrap();
    pair.set_value(row, Column::Source, "Hi").unwrap();
    assert!(pair.is_key_destination_only("orphanKey"));

    assert!(pair.convert_inserted_rows());
    assert!(!pair.is_key_destination_only("orphanKey"));
}

#[test]
fn test_unmodified_pair_saves_byte_identical() {
    let source = b"# Section\r\nname = Caf\\u00e9 \\\r\n    au lait\r\n\r\n! bang\r\nother:x\r\n";
    let destination = b"# Section\r\nname = Caf\xe9 au lait\r\n\r\n! bang\r\nother:y";
    let fixture = write_pair(source, destination);
    let mut pair = open(&fixture);

    pair.save(Side::Source).unwrap();
    pair.save(Side::Destination).unwrap();
    assert_eq!(fs::read(&fixture.source).unwrap(), source.to_vec());
    assert_eq!(fs::read(&fixture.destination).unwrap(), destination.to_vec());
}

#[test]
fn test_set_value_idempotent() {
    let fixture = write_pair(b"a=1\n", b"a=un\n");
    let mut pair = open(&fixture);

    assert!(pair.set_value(0, Column::Destination, "uno").unwrap());
    assert!(!pair.set_value(0, Column::Destination, "uno").unwrap());
    assert!(pair.unsaved_destination());

    pair.save(Side::Destination).unwrap();
    assert!(!pair.set_value(0, Column::Destination, "uno").unwrap());
    assert!(!pair.unsaved_destination());
}

#[test]
fn test_whitespace_only_is_empty() {
    let fixture = write_pair(b"a=1\n", b"a=un\n");
    let mut pair = open(&fixture);

    assert!(pair.set_value(0, Column::Destination, "   ").unwrap());
    assert_eq!(pair.get_row(0).unwrap().value(Column::Destination), "");
    assert!(pair.classify_row(0).unwrap().destination_value_missing);

    pair.save(Side::Destination).unwrap();
    assert_eq!(fs::read_to_string(&fixture.destination).unwrap(), "");
}

#[test]
fn test_clearing_committed_source_value_rejected() {
    let fixture = write_pair(b"a=1\n", b"");
    let mut pair = open(&fixture);

    assert!(!pair.set_value(0, Column::Source, "").unwrap());
    assert_eq!(pair.get_row(0).unwrap().value(Column::Source), "1");
    assert!(!pair.has_unsaved_changes());
}

#[test]
fn test_committed_key_rename_rejected() {
    let fixture = write_pair(b"a=1\n", b"");
    let mut pair = open(&fixture);

    assert!(!pair.set_value(0, Column::Key, "b").unwrap());
    assert_eq!(pair.get_row(0).unwrap().key(), Some("a"));
    assert!(!pair.has_unsaved_changes());
}

#[test]
fn test_no_localize_destination_is_read_only() {
    let fixture = write_pair(b"_nolocaliz.font=Arial\n", b"");
    let mut pair = open(&fixture);

    assert_eq!(
        pair.cell_status(0, Column::Destination).unwrap(),
        CellStatus::ReadOnlyNotLocalized
    );
    assert!(!pair.set_value(0, Column::Destination, "Helvetica").unwrap());
    assert!(!pair.unsaved_destination());
    assert!(pair.set_value(0, Column::Source, "Helvetica").unwrap());
}

#[test]
fn test_custom_no_localize_prefix() {
    let fixture = write_pair(b"fixed.font=Arial\n_nolocaliz.x=1\n", b"");
    let mut pair = FilePair::with_options(
        &fixture.source,
        &fixture.destination,
        PairOptions::new().with_no_localize_prefix("fixed."),
    );
    pair.parse_source().unwrap();
    pair.parse_destination().unwrap();

    assert!(!pair.set_value(0, Column::Destination, "Helvetica").unwrap());
    assert!(pair.set_value(1, Column::Destination, "2").unwrap());
}

#[test]
fn test_first_destination_value_copies_spacing() {
    let fixture = write_pair(b"spaced = yes\ntight=no\n", b"");
    let mut pair = open(&fixture);

    pair.set_value(0, Column::Destination, "oui").unwrap();
    pair.set_value(1, Column::Destination, "non").unwrap();
    pair.save(Side::Destination).unwrap();
    assert_eq!(
        fs::read_to_string(&fixture.destination).unwrap(),
        "spaced = oui\ntight=non\n"
    );
}

#[test]
fn test_insert_row_shifts_both_sides() {
    let fixture = write_pair(b"a=1\nb=2\n", b"a=un\nb=deux\n");
    let mut pair = open(&fixture);

    let index = pair.insert_row(1, true).unwrap();
    assert_eq!(index, 1);
    assert_eq!(pair.row_count(), 3);
    assert!(pair.unsaved_inserted_rows());

    match pair.get_row(1).unwrap() {
        LineEntry::Key(entry) => {
            assert!(entry.newly_added);
            assert_eq!(entry.key, None);
            assert_eq!(entry.source_value, None);
            assert_eq!(entry.destination_value, None);
        }
        other => panic!("expected key row, got {:?}", other),
    }
    let moved = pair.get_row(2).unwrap();
    assert_eq!(moved.key(), Some("b"));
    assert_eq!(moved.value(Column::Source), "2");
    assert_eq!(moved.value(Column::Destination), "deux");

    assert_eq!(pair.insert_row(2, false).unwrap(), 3);
    assert_eq!(pair.insert_row(pair.row_count(), false).unwrap(), 4);
    assert!(matches!(
        pair.insert_row(99, true),
        Err(Error::IndexOutOfRange { .. })
    ));
}

#[test]
fn test_new_row_saved_after_commit() {
    let fixture = write_pair(b"a=1\n", b"a=un\n");
    let mut pair = open(&fixture);

    let append = pair.row_count();
    assert!(pair.set_value(append, Column::Key, "  b  ").unwrap());
    assert_eq!(pair.row_count(), 2);
    assert_eq!(pair.get_row(1).unwrap().key(), Some("b"));
    pair.set_value(1, Column::Source, "two").unwrap();
    pair.set_value(1, Column::Destination, "deux").unwrap();

    pair.save_all().unwrap();
    assert!(!pair.unsaved_inserted_rows());
    assert!(!pair.get_row(1).unwrap().is_newly_added());
    assert_eq!(fs::read_to_string(&fixture.source).unwrap(), "a=1\nb=two\n");
    assert_eq!(
        fs::read_to_string(&fixture.destination).unwrap(),
        "a=un\nb=deux\n"
    );
}

#[test]
fn test_keyless_and_duplicate_rows_not_written() {
    let fixture = write_pair(b"a=1\n", b"");
    let mut pair = open(&fixture);

    pair.insert_row(0, false).unwrap();
    pair.set_value(1, Column::Source, "orphan value").unwrap();
    let dup = pair.insert_row(1, false).unwrap();
    pair.set_value(dup, Column::Key, "a").unwrap();
    pair.set_value(dup, Column::Source, "again").unwrap();

    assert!(!pair.convert_inserted_rows());
    assert!(pair.get_row(1).unwrap().is_newly_added());
    assert!(pair.get_row(dup).unwrap().is_newly_added());
    assert!(pair.unsaved_inserted_rows());

    pair.save(Side::Source).unwrap();
    assert_eq!(fs::read_to_string(&fixture.source).unwrap(), "a=1\n");
}

#[test]
fn test_inserted_rows_flag_clears_once_all_keyed_rows_commit() {
    let fixture = write_pair(b"a=1\n", b"");
    let mut pair = open(&fixture);

    let dup = pair.insert_row(0, false).unwrap();
    pair.set_value(dup, Column::Key, "a").unwrap();
    pair.set_value(dup, Column::Source, "again").unwrap();
    let fresh = pair.insert_row(dup, false).unwrap();
    pair.set_value(fresh, Column::Key, "b").unwrap();
    pair.set_value(fresh, Column::Source, "2").unwrap();

    assert!(pair.convert_inserted_rows());
    assert!(!pair.get_row(fresh).unwrap().is_newly_added());
    assert!(pair.unsaved_inserted_rows());

    pair.set_value(dup, Column::Key, "c").unwrap();
    assert!(pair.convert_inserted_rows());
    assert!(!pair.unsaved_inserted_rows());

    let keyless = pair.insert_row(0, true).unwrap();
    pair.set_value(keyless, Column::Source, "no key").unwrap();
    assert!(!pair.convert_inserted_rows());
    assert!(!pair.unsaved_inserted_rows());
}

#[test]
fn test_value_for_empty_destination_line_copies_source_spacing() {
    let fixture = write_pair(b"k = v\n", b"k=\n");
    let mut pair = open(&fixture);

    assert_eq!(pair.get_row(0).unwrap().value(Column::Destination), "");
    assert!(pair.set_value(0, Column::Destination, "x").unwrap());
    pair.save(Side::Destination).unwrap();
    assert_eq!(fs::read_to_string(&fixture.destination).unwrap(), "k = x\n");
}

#[test]
fn test_non_ascii_value_escaped_on_write() {
    let fixture = write_pair(b"drink=coffee\n", b"");
    let mut pair = open(&fixture);

    pair.set_value(0, Column::Destination, "café ☕").unwrap();
    pair.save(Side::Destination).unwrap();
    let written = fs::read_to_string(&fixture.destination).unwrap();
    assert_eq!(written, "drink=caf\\u00E9 \\u2615\n");

    let mut reopened = open(&fixture);
    assert_eq!(
        reopened.get_row(0).unwrap().value(Column::Destination),
        "café ☕"
    );
    assert!(!reopened.set_value(0, Column::Destination, "café ☕").unwrap());
}

#[test]
fn test_comment_edits() {
    let fixture = write_pair(b"# Menu\nopen=Open\n", b"# Menu\nopen=Ouvrir\n");
    let mut pair = open(&fixture);

    assert_eq!(
        pair.cell_status(0, Column::Key).unwrap(),
        CellStatus::CommentKeyColumn
    );
    assert!(pair.set_value(0, Column::Destination, "  Le menu ").unwrap());
    assert!(pair.set_value(0, Column::Source, "! The menu").unwrap());
    pair.save_all().unwrap();
    assert_eq!(
        fs::read_to_string(&fixture.source).unwrap(),
        "! The menu\nopen=Open\n"
    );
    assert_eq!(
        fs::read_to_string(&fixture.destination).unwrap(),
        "# Le menu\nopen=Ouvrir\n"
    );

    assert!(pair.set_value(0, Column::Destination, "").unwrap());
    pair.save(Side::Destination).unwrap();
    assert_eq!(
        fs::read_to_string(&fixture.destination).unwrap(),
        "\nopen=Ouvrir\n"
    );
}

#[test]
fn test_save_failure_keeps_flags() {
    let fixture = write_pair(b"a=1\n", b"");
    let mut pair = open(&fixture);
    pair.set_value(0, Column::Destination, "un").unwrap();

    let blocker = fixture.destination.with_file_name("blocked");
    fs::create_dir_all(&blocker).unwrap();
    let result = pair.save_to(Side::Destination, &blocker);
    assert!(matches!(result, Err(Error::FileAccess { .. })));
    assert!(pair.unsaved_destination());
    assert_eq!(pair.get_row(0).unwrap().value(Column::Destination), "un");
}

#[test]
fn test_missing_file_is_file_access_error() {
    let dir = TempDir::new().unwrap();
    let mut pair = FilePair::new(
        dir.path().join("missing.properties"),
        dir.path().join("missing_fr.properties"),
    );
    let error = pair.parse_source().unwrap_err();
    assert!(error.is_file_access());
    assert_eq!(pair.row_count(), 0);
}

#[test]
fn test_revert_discards_edits() {
    let fixture = write_pair(b"a=1\n", b"a=un\n");
    let mut pair = open(&fixture);

    pair.set_value(0, Column::Destination, "uno").unwrap();
    pair.insert_row(0, true).unwrap();
    pair.revert();

    assert_eq!(pair.row_count(), 1);
    assert_eq!(pair.get_row(0).unwrap().value(Column::Destination), "un");
    assert!(!pair.has_unsaved_changes());
    assert!(!pair.unsaved_inserted_rows());
}
