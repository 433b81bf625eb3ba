//! CLI library for testing purposes

pub mod config;
pub mod edit;
pub mod open;
pub mod stats;
pub mod view;

pub use config::Config;
pub use edit::{Anchor, SetOutcome, run_set_command, set_entry};
pub use open::{PairArgs, open_pair};
pub use proptrans::FilePair;
