use std::path::PathBuf;

use proptrans::{FilePair, PropertiesFormat, source_path_for_destination};
use tracing::info;

use crate::config::Config;

/// The two files a command works on.
#[derive(clap::Args, Debug, Clone)]
pub struct PairArgs {
    /// The destination (translated) file, e.g. strings_fr.properties
    #[arg(short, long)]
    pub destination: PathBuf,

    /// The source file; derived from the destination name when omitted
    #[arg(short, long)]
    pub source: Option<PathBuf>,
}

/// Parses both files of a pair.
///
/// A destination that does not exist yet starts out empty and is created on
/// the first save.
pub fn open_pair(args: &PairArgs, config: &Config) -> Result<FilePair, String> {
    let source = match &args.source {
        Some(source) => source.clone(),
        None => source_path_for_destination(&args.destination).map_err(|e| e.to_string())?,
    };

    let mut pair = FilePair::with_options(source, &args.destination, config.pair_options());
    pair.parse_source()
        .map_err(|e| format!("Error reading source: {}", e))?;

    if args.destination.exists() {
        pair.parse_destination()
            .map_err(|e| format!("Error reading destination: {}", e))?;
    } else {
        info!(
            destination = %args.destination.display(),
            "destination does not exist yet; starting empty"
        );
        pair.load_destination(PropertiesFormat::new());
    }
    Ok(pair)
}
