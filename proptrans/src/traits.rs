//! Traits for reading and writing one localization file.

use std::{
    fs::File,
    io::{BufReader, Cursor, Read, Write},
    path::Path,
};

use crate::error::Error;

/// A trait for parsing and writing a localization file from/to bytes.
///
/// `.properties` files are byte-oriented (ISO-8859-1), so the required methods
/// work on raw readers and writers rather than on decoded text.
///
/// # Example
///
/// ```rust,no_run
/// use proptrans::traits::Parser;
/// let format = proptrans::formats::properties::Format::read_from("strings_fr.properties")?;
/// format.write_to("strings_fr_copy.properties")?;
/// Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait Parser {
    /// Parse from any reader.
    fn from_reader<R: Read>(reader: R) -> Result<Self, Error>
    where
        Self: Sized;

    /// Parse from file path.
    fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error>
    where
        Self: Sized,
    {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::file_access(path, e))?;
        Self::from_reader(BufReader::new(file))
    }

    /// Write to any writer (file, memory, etc.).
    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error>;

    /// Write to file path.
    ///
    /// The content is serialized in memory first, so a failure while
    /// serializing never truncates the file on disk.
    fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes).map_err(|e| Error::file_access(path, e))
    }

    /// Parse from bytes.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Error>
    where
        Self: Sized,
    {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Serialize into a byte buffer.
    fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut buffer = Vec::new();
        self.to_writer(&mut buffer)?;
        Ok(buffer)
    }
}
