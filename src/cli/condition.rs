//! Condition a `.all` file from the command line
use crate::condition::{self as cond, ConditionOptions, InjectionSource};
use crate::Result;
use std::path::PathBuf;

/// Arguments of the `condition` subcommand
///
/// Flags are applied on top of the `--config` file, if one is given.
#[derive(clap::Args, Debug)]
pub struct ConditionArgs {
    /// The `.all` file to condition
    pub input: PathBuf,
    /// The first output file; split files are written beside it
    pub output: PathBuf,

    /// TOML file of conditioning options
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Datagram type tags to leave out, e.g. `YN`
    #[arg(short = 'x', long, value_name = "TAGS")]
    pub exclude: Option<String>,

    /// Inject attitude from a text file
    #[arg(long, value_name = "FILE")]
    pub attitude: Option<PathBuf>,

    /// Inject attitude and height from a text file
    #[arg(long, value_name = "FILE")]
    pub attitude_height: Option<PathBuf>,

    /// Inject height from a text file
    #[arg(long, value_name = "FILE")]
    pub height: Option<PathBuf>,

    /// Inject position from a text file
    #[arg(long, value_name = "FILE")]
    pub position: Option<PathBuf>,

    /// Inject Seapath delayed heave from an `.srh` file
    #[arg(long, value_name = "FILE")]
    pub srh: Option<PathBuf>,

    /// Replace attitude heave with true heave from a POS MV file
    #[arg(long, value_name = "FILE")]
    pub true_heave: Option<PathBuf>,

    /// Split when the ping mode changes
    #[arg(long)]
    pub split_depth: bool,

    /// Split when the centre frequency changes
    #[arg(long)]
    pub split_frequency: bool,

    /// Split every this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub split_time: Option<f64>,

    /// Drop injection records more than this many seconds late
    #[arg(long, value_name = "SECONDS")]
    pub max_lookahead: Option<f64>,
}

impl ConditionArgs {
    /// The options these arguments ask for
    pub fn options(&self) -> Result<ConditionOptions> {
        let mut options = match &self.config {
            Some(path) => ConditionOptions::load(path)?,
            None => ConditionOptions::default(),
        };
        if let Some(tags) = &self.exclude {
            options = options.with_exclude(tags);
        }

        let sources = [
            self.attitude.clone().map(InjectionSource::Attitude),
            self.attitude_height.clone().map(InjectionSource::AttitudeHeight),
            self.height.clone().map(InjectionSource::Height),
            self.position.clone().map(InjectionSource::Position),
            self.srh.clone().map(InjectionSource::Srh),
            self.true_heave.clone().map(InjectionSource::PosTrueHeave),
        ];
        for source in sources.into_iter().flatten() {
            options = options.with_source(source);
        }

        options.split.depth_mode |= self.split_depth;
        options.split.frequency |= self.split_frequency;
        if self.split_time.is_some() {
            options.split.interval_seconds = self.split_time;
        }
        if let Some(seconds) = self.max_lookahead {
            options.policy.max_lookahead = seconds;
        }
        Ok(options)
    }
}

/// Run the conditioner and print the files written
pub fn condition(args: ConditionArgs) -> Result<()> {
    let options = args.options()?;
    log::debug!("{:?}", options);
    for path in cond::condition(&args.input, &args.output, &options)? {
        println!("{}", path.display());
    }
    Ok(())
}
