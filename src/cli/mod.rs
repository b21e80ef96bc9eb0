//! The `sonarcond` command line front end
use crate::Result;
use clap::Parser;
use std::fs::File;
use std::io::{stdout, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

pub mod condition;
pub mod count;
pub mod info;
pub mod list;

/// Inspect and condition Kongsberg `.all` and POS MV `.000` files
#[derive(Parser, Debug)]
#[command(name = "sonarcond", version, about)]
pub struct Args {
    /// What to do
    #[command(subcommand)]
    pub cmd: Action,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Subcommands
#[derive(clap::Subcommand, Debug)]
pub enum Action {
    /// Count the records of each type in a file
    Count {
        /// `.all` or POS MV file
        path: PathBuf,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List every record in a file
    List {
        /// `.all` or POS MV file
        path: PathBuf,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Summarise a file
    Info {
        /// `.all` or POS MV file
        path: PathBuf,
    },
    /// Rewrite a `.all` file with injected, excluded and split output
    Condition(condition::ConditionArgs),
}

/// Which stream family a file belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// Kongsberg `.all`
    Sonar,
    /// POS MV `.000`
    Navigation,
}

impl Family {
    /// Tell the family from the first bytes of the file
    ///
    /// POS MV files start with a `$GRP` or `$MSG` marker; anything else is
    /// taken to be `.all`.
    pub fn detect<P: AsRef<Path>>(path: P) -> Result<Family> {
        let mut start = Vec::with_capacity(4);
        File::open(path.as_ref())?.take(4).read_to_end(&mut start)?;
        let family = match start.as_slice() {
            b"$GRP" | b"$MSG" => Family::Navigation,
            _ => Family::Sonar,
        };
        log::debug!("{}: {:?}", path.as_ref().display(), family);
        Ok(family)
    }
}

/// A buffered writer on `output`, or on stdout
pub fn writer(output: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(stdout().lock())),
    })
}

/// Run a parsed command line
pub fn run(args: Args) -> Result<()> {
    match args.cmd {
        Action::Count { path, output } => {
            count::count(path, output)?;
        }
        Action::List { path, output } => {
            list::list(path, output)?;
        }
        Action::Info { path } => {
            info::info(path)?;
        }
        Action::Condition(args) => {
            condition::condition(args)?;
        }
    };
    Ok(())
}
