use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use proptrans::Side;
use proptrans_cli::{
    Anchor, Config, PairArgs, open_pair, run_set_command,
    stats::print_stats,
    view::{ViewOptions, print_orphans, print_view},
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log debug details to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file; ./proptrans.toml is used when present
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Fail on malformed \uXXXX escapes instead of keeping them literally
    #[arg(long, global = true)]
    strict: bool,

    /// Key prefix whose destination values are read-only
    #[arg(long, global = true)]
    no_localize_prefix: Option<String>,

    #[command(subcommand)]
    commands: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SideArg {
    Source,
    Destination,
}

impl From<SideArg> for Side {
    fn from(side: SideArg) -> Self {
        match side {
            SideArg::Source => Side::Source,
            SideArg::Destination => Side::Destination,
        }
    }
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the source and destination side by side.
    View {
        #[command(flatten)]
        pair: PairArgs,

        /// Display full values without truncation
        #[arg(long)]
        full: bool,

        /// Add a status column
        #[arg(long)]
        status: bool,

        /// Only rows whose destination value is missing
        #[arg(long)]
        untranslated: bool,
    },

    /// Summarize translation progress.
    Stats {
        #[command(flatten)]
        pair: PairArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List keys that exist only in the destination file.
    Orphans {
        #[command(flatten)]
        pair: PairArgs,
    },

    /// Set one value and save.
    Set {
        #[command(flatten)]
        pair: PairArgs,

        /// The key to set; added as a new row if missing
        #[arg(short, long)]
        key: String,

        /// Which file to change
        #[arg(long, value_enum, default_value = "destination")]
        side: SideArg,

        /// The new value; empty clears it
        #[arg(long, allow_hyphen_values = true)]
        value: String,

        /// Insert a new key below this key
        #[arg(long, conflicts_with = "before")]
        after: Option<String>,

        /// Insert a new key above this key
        #[arg(long)]
        before: Option<String>,
    },

    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<(), String> {
    let mut config = Config::resolve(args.config.as_deref())?;
    if args.strict {
        config.strict_escapes = true;
    }
    if let Some(prefix) = args.no_localize_prefix {
        config.no_localize_prefix = prefix;
    }

    match args.commands {
        Commands::View {
            pair,
            full,
            status,
            untranslated,
        } => {
            let pair = open_pair(&pair, &config)?;
            let options = ViewOptions {
                full,
                status,
                untranslated,
                truncate: config.truncate,
            };
            print_view(&pair, &options);
        }
        Commands::Stats { pair, json } => {
            let pair = open_pair(&pair, &config)?;
            print_stats(&pair, json)?;
        }
        Commands::Orphans { pair } => {
            let pair = open_pair(&pair, &config)?;
            print_orphans(&pair);
        }
        Commands::Set {
            pair,
            key,
            side,
            value,
            after,
            before,
        } => {
            let pair = open_pair(&pair, &config)?;
            let anchor = after.map(Anchor::After).or(before.map(Anchor::Before));
            run_set_command(pair, &key, side.into(), &value, anchor)?;
        }
        Commands::Completions { shell } => {
            let mut command = Args::command();
            clap_complete::generate(shell, &mut command, "proptrans", &mut std::io::stdout());
        }
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
