#![forbid(unsafe_code)]
//! Side-by-side translation engine for Java `.properties` files.
//!
//! A [`FilePair`] loads a source-language file and its destination-language
//! counterpart, aligns them into one list of rows (one per key or comment
//! line), lets you edit either side, and writes each file back without
//! disturbing lines you did not touch.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use proptrans::{Column, FilePair, Side};
//!
//! let mut pair = FilePair::new("strings.properties", "strings_fr.properties");
//! pair.parse_source()?;
//! pair.parse_destination()?;
//!
//! if let Some(row) = pair.find_key("greeting") {
//!     pair.set_value(row, Column::Destination, "Bonjour")?;
//! }
//! pair.save(Side::Destination)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # File handling
//!
//! - Files are read and written as ISO-8859-1; other characters travel as
//!   `\uXXXX` escapes.
//! - Unedited key lines (including `\`-continued ones) are written back
//!   exactly as read.
//! - Keys whose name starts with `_nolocaliz` are read-only in the
//!   destination (see [`PairOptions`]).

pub mod error;
pub mod escape;
pub mod formats;
pub mod locate;
pub mod observer;
pub mod pair;
pub mod read_options;
pub mod traits;
pub mod types;

// Re-export most used types for easy consumption
pub use crate::{
    error::Error,
    formats::{ParseWarning, PropertiesFormat},
    locate::{source_candidates, source_path_for_destination},
    observer::PairObserver,
    pair::{FilePair, PairStats},
    read_options::{DEFAULT_NO_LOCALIZE_PREFIX, PairOptions, ReadOptions},
    traits::Parser,
    types::{
        CellStatus, Column, CommentEntry, CommentLine, KeyEntry, Line, LineEnding, LineEntry,
        PairLine, RawText, RowClassification, Side,
    },
};
