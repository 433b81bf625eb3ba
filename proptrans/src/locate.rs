//! Finding the source-language file for a destination-language file.
//!
//! Destination files follow the resource-bundle naming convention
//! `<base>_<locale>.properties`; the source is the same name with one `_xx`
//! level removed (`strings_fr_CA.properties` → `strings_fr.properties`,
//! then `strings.properties`).

use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{error::Error, formats::PROPERTIES_EXTENSION};

/// Candidate source paths for `destination`, most specific first.
///
/// Fails with [`Error::InvalidPath`] unless the file name ends in
/// `_xx.properties`.
pub fn source_candidates<P: AsRef<Path>>(destination: P) -> Result<Vec<PathBuf>, Error> {
    let destination = destination.as_ref();
    let invalid = || {
        Error::InvalidPath(format!(
            "{} must end with _xx.{}",
            destination.display(),
            PROPERTIES_EXTENSION
        ))
    };

    if destination.extension().and_then(|e| e.to_str()) != Some(PROPERTIES_EXTENSION) {
        return Err(invalid());
    }
    let stem = destination
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(invalid)?;

    let parent = strip_locale_level(stem).ok_or_else(invalid)?;
    let mut candidates = vec![with_stem(destination, parent)];
    if let Some(grandparent) = strip_locale_level(parent) {
        candidates.push(with_stem(destination, grandparent));
    }
    Ok(candidates)
}

/// The existing source file for `destination`.
///
/// Fails with [`Error::FileAccess`] (not found) when no candidate exists.
pub fn source_path_for_destination<P: AsRef<Path>>(destination: P) -> Result<PathBuf, Error> {
    let destination = destination.as_ref();
    let candidates = source_candidates(destination)?;
    for candidate in &candidates {
        if candidate.exists() {
            debug!(
                destination = %destination.display(),
                source = %candidate.display(),
                "located source file"
            );
            return Ok(candidate.clone());
        }
    }
    Err(Error::file_access(
        &candidates[0],
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("no source file on disk for {}", destination.display()),
        ),
    ))
}

fn strip_locale_level(stem: &str) -> Option<&str> {
    let underscore = stem.rfind('_')?;
    if underscore == 0 || underscore + 1 == stem.len() {
        return None;
    }
    Some(&stem[..underscore])
}

fn with_stem(path: &Path, stem: &str) -> PathBuf {
    path.with_file_name(format!("{}.{}", stem, PROPERTIES_EXTENSION))
}
