//! Stream conditioning: injecting external sensor data into a sonar file,
//! dropping unwanted datagram types, and splitting the output
//!
//! [`condition`] is the one-call entry point. Options come from code
//! through the `with_*` builders or from a TOML file:
//!
//! ```toml
//! exclude = "YN"
//!
//! [[inject]]
//! kind = "attitude"
//! path = "attitude.txt"
//!
//! [split]
//! depth_mode = true
//!
//! [policy]
//! max_lookahead = 2.0
//! ```
use crate::model::{InjectionKind, InjectionRecord};
use crate::parser::all::AllReader;
use crate::timeseries::TimeSeries;
use crate::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

mod conditioner;
mod queue;
mod sources;
mod split;

pub use conditioner::{StreamConditioner, ATTITUDE_DESCRIPTOR, DEFAULT_SERIAL};
pub use queue::{InjectionPolicy, InjectionQueue, HEIGHT_INTERVAL, MAX_LOOKAHEAD, TRIM_EPSILON};
pub use sources::{
    apply_heave, fuse_attitude_height, load_attitude, load_attitude_height, load_heights,
    load_positions, load_srh, load_true_heave,
};
pub use split::{split_path, SplitPolicy, SplitReason};

/// An external data file to inject
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum InjectionSource {
    /// Attitude text, injected as `A`
    Attitude(PathBuf),
    /// Attitude text with a height column, injected as `A` and `h`
    AttitudeHeight(PathBuf),
    /// Height text, injected as `h` at the attitude sample times when
    /// attitude is injected too, otherwise at its own times
    Height(PathBuf),
    /// Position text, injected as `P`
    Position(PathBuf),
    /// Seapath delayed heave, injected as `A` with zero angles
    Srh(PathBuf),
    /// POS MV true heave, written into the heave of the input's own `A`
    PosTrueHeave(PathBuf),
}

impl InjectionSource {
    /// The file to load
    pub fn path(&self) -> &Path {
        match self {
            InjectionSource::Attitude(p)
            | InjectionSource::AttitudeHeight(p)
            | InjectionSource::Height(p)
            | InjectionSource::Position(p)
            | InjectionSource::Srh(p)
            | InjectionSource::PosTrueHeave(p) => p,
        }
    }
}

/// Everything [`condition`] can be asked to do
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConditionOptions {
    /// Type tags of datagrams to leave out of the output, e.g. `"YN"`
    pub exclude: String,
    /// External data to inject
    pub inject: Vec<InjectionSource>,
    /// When to start a new output file
    pub split: SplitPolicy,
    /// Injection queue tuning
    pub policy: InjectionPolicy,
}

impl ConditionOptions {
    /// Parse options from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load options from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_toml(&fs::read_to_string(path)?)
    }

    /// Exclude datagrams with these type tags
    pub fn with_exclude(mut self, tags: &str) -> Self {
        self.exclude = tags.to_string();
        self
    }

    /// Add an injection source
    pub fn with_source(mut self, source: InjectionSource) -> Self {
        self.inject.push(source);
        self
    }

    /// Use this split policy
    pub fn with_split(mut self, split: SplitPolicy) -> Self {
        self.split = split;
        self
    }

    /// Use this injection policy
    pub fn with_policy(mut self, policy: InjectionPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Records to queue and a heave series, from every configured source
///
/// Sources that are missing, empty or unreadable are skipped with a
/// warning.
fn load_sources(sources: &[InjectionSource]) -> (Vec<InjectionRecord>, Option<TimeSeries>) {
    let mut records = Vec::new();
    let mut heights = Vec::new();
    let mut true_heave = None;

    for source in sources {
        let loaded = match source {
            InjectionSource::Attitude(p) => load_attitude(p).map(|r| records.extend(r)),
            InjectionSource::AttitudeHeight(p) => load_attitude_height(p).map(|r| records.extend(r)),
            InjectionSource::Height(p) => load_heights(p).map(|s| heights.push(s)),
            InjectionSource::Position(p) => load_positions(p).map(|r| records.extend(r)),
            InjectionSource::Srh(p) => load_srh(p).map(|r| records.extend(r)),
            InjectionSource::PosTrueHeave(p) => load_true_heave(p).map(|s| true_heave = Some(s)),
        };
        if let Err(e) = loaded {
            log::warn!("skipping {}: {}", source.path().display(), e);
        }
    }

    let has_attitude = records.iter().any(|r| r.kind() == InjectionKind::Attitude);
    for series in heights {
        if has_attitude {
            let fused = fuse_attitude_height(&records, &series);
            records.extend(fused);
        } else {
            records.extend(series.samples().map(|(t, h)| InjectionRecord::height(t, h)));
        }
    }
    (records, true_heave)
}

/// Condition `input` into `output`
///
/// Returns the output files in the order they were written: `output`
/// itself, then any split files beside it.
///
/// # Errors
///
/// Fails if the input cannot be read through to the end or an output
/// cannot be written. Injection sources never fail the run.
pub fn condition<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    options: &ConditionOptions,
) -> Result<Vec<PathBuf>> {
    let (input, output) = (input.as_ref(), output.as_ref());
    if output.exists() && fs::canonicalize(input)? == fs::canonicalize(output)? {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("refusing to overwrite the input {}", input.display()),
        )));
    }

    let (records, true_heave) = load_sources(&options.inject);
    let mut conditioner = StreamConditioner::new(&options.exclude, options.split, options.policy);
    conditioner.add_records(records);
    if let Some(heave) = true_heave {
        conditioner.set_true_heave(heave);
    }

    let mut reader = AllReader::open(input)?;
    conditioner.run(&mut reader, output)
}
