//! Reading, writing and conditioning multibeam sonar and navigation logs
//!
//! Two stream families are supported: Kongsberg EM `.all` datagrams
//! ([`parser::all`]) and Applanix POS MV `.000` groups ([`parser::pos`]).
//! Both are walked by the same lazy [`reader::Reader`]. The
//! [`condition`] module rewrites `.all` files with injected sensor data,
//! excluded datagram types and split outputs.
pub mod cli;
pub mod clock;
pub mod condition;
pub mod cursor;
pub mod error;
pub mod model;
pub mod parser;
pub mod reader;
pub mod timeseries;

pub use error::{Error, Result};

/// Crate version, as reported by the command line tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
