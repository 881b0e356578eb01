use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use sequencer_core::LinkKey;
use std::path::PathBuf;

/// Sequencer: chain notes together with prev/next links and walk the chain.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault to use instead of searching the current directory and its parents.
    #[arg(long, global = true, env = "SEQUENCER_VAULT")]
    pub vault: Option<PathBuf>,

    /// Increase verbosity (use multiple times for more).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Link a note to its previous or next note.
    Link(LinkArgs),
    /// Show a note's prev/next links and where they lead.
    Show(ShowArgs),
    /// Print the note a prev/next link leads to.
    Nav(NavArgs),
    /// List the notes offered when linking from a note.
    Suggest(SuggestArgs),
    /// Manage vault settings.
    Config(ConfigArgs),
    /// Manage vaults.
    Vault(VaultArgs),
}

/// Link direction as typed on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

impl From<Direction> for LinkKey {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Prev => LinkKey::Prev,
            Direction::Next => LinkKey::Next,
        }
    }
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("direction").required(true).args(["prev", "next"])))]
pub struct LinkArgs {
    /// Path or name of the note to edit.
    pub note: String,

    /// Note to link to. Prompts with a fuzzy picker when omitted; a name
    /// with no matching note creates it.
    pub target: Option<String>,

    /// Set the note's `prev` link.
    #[arg(long)]
    pub prev: bool,

    /// Set the note's `next` link.
    #[arg(long)]
    pub next: bool,

    /// Do not write the link back on the target, whatever the settings say.
    #[arg(long)]
    pub no_reciprocal: bool,
}

impl LinkArgs {
    pub fn key(&self) -> LinkKey {
        if self.prev { LinkKey::Prev } else { LinkKey::Next }
    }
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Path or name of the note.
    pub note: String,
}

#[derive(Args, Debug)]
pub struct NavArgs {
    /// Path or name of the note to start from.
    pub note: String,

    /// Which link to follow.
    #[arg(value_enum)]
    pub direction: Direction,
}

#[derive(Args, Debug)]
pub struct SuggestArgs {
    /// Path or name of the note being linked from.
    pub note: String,

    /// Only show suggestions matching this text.
    #[arg(default_value = "")]
    pub query: String,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Get the value of a setting (`reciprocal_links`, `only_sibling_files`).
    Get {
        key: String,
    },
    /// Set a setting to `true` or `false`.
    Set {
        key: String,
        value: String,
    },
    /// List all settings.
    List {},
}

#[derive(Args, Debug)]
pub struct VaultArgs {
    #[command(subcommand)]
    pub command: VaultCommands,
}

#[derive(Subcommand, Debug)]
pub enum VaultCommands {
    /// Turn a directory into a vault. Defaults to the current directory.
    Init {
        path: Option<PathBuf>,
    },
    /// Show information about the current vault.
    Info {},
}
