//! When to start a new output file, and what to call it
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Conditions that close the current output and open a new one
///
/// Any combination may be enabled; the first that fires on a record wins.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SplitPolicy {
    /// Split when the ping mode of a runtime datagram changes
    pub depth_mode: bool,
    /// Split when the centre frequency of a range and angle datagram
    /// changes
    pub frequency: bool,
    /// Split when this many seconds have passed since the last split
    pub interval_seconds: Option<f64>,
}

impl SplitPolicy {
    /// Whether any split condition is enabled
    pub fn is_enabled(&self) -> bool {
        self.depth_mode || self.frequency || self.interval_seconds.is_some()
    }
}

/// Why the conditioner split, carrying the label for the new file name
#[derive(Debug, Clone, PartialEq)]
pub enum SplitReason {
    /// The ping mode changed to the named mode
    DepthMode(String),
    /// The centre frequency changed to this many Hz
    Frequency(f32),
    /// The split interval elapsed
    Interval,
}

impl SplitReason {
    /// The suffix for the new file name, if any
    pub fn label(&self) -> Option<String> {
        match self {
            SplitReason::DepthMode(mode) => Some(mode.clone()),
            SplitReason::Frequency(hz) => Some(format!("{}", hz)),
            SplitReason::Interval => None,
        }
    }
}

/// The name of a split output next to `base`
///
/// The candidate is `<stem>_<label><ext>`, or `base` itself without a
/// label. If that file already exists `_1`, `_2` and so on are appended to
/// the stem until the name is free.
pub fn split_path(base: &Path, label: Option<&str>) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = base
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let stem = match label {
        Some(label) => format!("{}_{}", stem, label),
        None => stem,
    };

    let candidate = base.with_file_name(format!("{}{}", stem, ext));
    if !candidate.exists() {
        return candidate;
    }
    (1u32..)
        .map(|n| base.with_file_name(format!("{}_{}{}", stem, n, ext)))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}
