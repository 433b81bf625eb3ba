use proptrans::{CellStatus, Column, FilePair, Side};
use tracing::debug;

/// Where a key that is not in the files yet gets inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anchor {
    After(String),
    Before(String),
}

/// Outcome of [`set_entry`], for the message printed to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    Updated,
    Added,
    Unchanged,
}

/// Sets the value of `key` on one side, adding the key as a new row when no
/// row has it yet. Does not save.
pub fn set_entry(
    pair: &mut FilePair,
    key: &str,
    side: Side,
    value: &str,
    anchor: Option<&Anchor>,
) -> Result<SetOutcome, String> {
    let key = key.trim();
    if key.is_empty() {
        return Err("Key must not be empty".to_string());
    }
    let column = Column::from(side);

    if let Some(row) = pair.find_key(key) {
        let current = pair.get_row(row).map_err(|e| e.to_string())?.value(column);
        let normalized = if value.trim().is_empty() { "" } else { value };
        if current == normalized {
            return Ok(SetOutcome::Unchanged);
        }
        if pair.set_value(row, column, value).map_err(|e| e.to_string())? {
            return Ok(SetOutcome::Updated);
        }
        return Err(rejection_message(pair, row, key, side));
    }

    if value.trim().is_empty() {
        return Err(format!("A value is required to add key '{}'", key));
    }
    let row = match anchor {
        Some(Anchor::After(anchor_key)) => {
            let anchor_row = find_anchor(pair, anchor_key)?;
            pair.insert_row(anchor_row, false).map_err(|e| e.to_string())?
        }
        Some(Anchor::Before(anchor_key)) => {
            let anchor_row = find_anchor(pair, anchor_key)?;
            pair.insert_row(anchor_row, true).map_err(|e| e.to_string())?
        }
        None => pair.row_count(),
    };
    debug!(key, row, "adding key");

    pair.set_value(row, Column::Key, key)
        .map_err(|e| e.to_string())?;
    if !pair.set_value(row, column, value).map_err(|e| e.to_string())? {
        return Err(rejection_message(pair, row, key, side));
    }
    pair.convert_inserted_rows();
    if pair.get_row(row).map_err(|e| e.to_string())?.is_newly_added() {
        return Err(format!("Key '{}' could not be added", key));
    }
    Ok(SetOutcome::Added)
}

fn find_anchor(pair: &FilePair, anchor_key: &str) -> Result<usize, String> {
    pair.find_key(anchor_key)
        .ok_or_else(|| format!("Anchor key '{}' not found", anchor_key))
}

fn rejection_message(pair: &FilePair, row: usize, key: &str, side: Side) -> String {
    match pair.cell_status(row, Column::from(side)) {
        Ok(CellStatus::ReadOnlyNotLocalized) => {
            format!("Key '{}' is not localized; its destination value is read-only", key)
        }
        _ if side == Side::Source => {
            format!("Cannot clear the source value of existing key '{}'", key)
        }
        _ => format!("Edit of key '{}' in the {} file was rejected", key, side),
    }
}

/// `set` command: edit one value and save the files that changed.
pub fn run_set_command(
    mut pair: FilePair,
    key: &str,
    side: Side,
    value: &str,
    anchor: Option<Anchor>,
) -> Result<(), String> {
    let outcome = set_entry(&mut pair, key, side, value, anchor.as_ref())?;
    if outcome == SetOutcome::Unchanged {
        println!("'{}' unchanged", key.trim());
        return Ok(());
    }

    pair.save_all()
        .map_err(|e| format!("Error writing output: {}", e))?;
    let verb = match outcome {
        SetOutcome::Added => "Added",
        _ => "Updated",
    };
    println!("{} '{}' in {}", verb, key.trim(), pair.path(side).display());
    if side == Side::Destination && pair.is_key_destination_only(key.trim()) {
        println!("Note: '{}' does not exist in the source file", key.trim());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptrans::{Parser, PropertiesFormat};

    fn pair_of(source: &str, destination: &str) -> FilePair {
        let mut pair = FilePair::new("strings.properties", "strings_fr.properties");
        pair.load_source(PropertiesFormat::from_bytes(source.as_bytes()).unwrap());
        pair.load_destination(PropertiesFormat::from_bytes(destination.as_bytes()).unwrap());
        pair
    }

    #[test]
    fn test_set_existing_key() {
        let mut pair = pair_of("a=1\n", "");
        let outcome = set_entry(&mut pair, "a", Side::Destination, "un", None).unwrap();
        assert_eq!(outcome, SetOutcome::Updated);
        assert!(pair.unsaved_destination());

        let outcome = set_entry(&mut pair, "a", Side::Destination, "un", None).unwrap();
        assert_eq!(outcome, SetOutcome::Unchanged);
    }

    #[test]
    fn test_add_key_after_anchor() {
        let mut pair = pair_of("a=1\nc=3\n", "");
        let anchor = Anchor::After("a".to_string());
        let outcome = set_entry(&mut pair, "b", Side::Source, "2", Some(&anchor)).unwrap();
        assert_eq!(outcome, SetOutcome::Added);
        assert_eq!(pair.find_key("b"), Some(1));
        assert!(!pair.unsaved_inserted_rows());
        assert_eq!(
            pair.extract_format(Side::Source).render(),
            "a=1\nb=2\nc=3\n"
        );
    }

    #[test]
    fn test_add_key_at_end() {
        let mut pair = pair_of("a=1\n", "");
        set_entry(&mut pair, "z", Side::Source, "26", None).unwrap();
        assert_eq!(pair.find_key("z"), Some(1));
    }

    #[test]
    fn test_rejections() {
        let mut pair = pair_of("a=1\n_nolocaliz.f=x\n", "");
        let err = set_entry(&mut pair, "a", Side::Source, "", None).unwrap_err();
        assert!(err.contains("Cannot clear"), "{}", err);
        let err = set_entry(&mut pair, "_nolocaliz.f", Side::Destination, "y", None).unwrap_err();
        assert!(err.contains("read-only"), "{}", err);
        let err = set_entry(&mut pair, "b", Side::Source, "2", Some(&Anchor::Before("zz".into())))
            .unwrap_err();
        assert!(err.contains("not found"), "{}", err);
        assert!(!pair.has_unsaved_changes());
    }
}
