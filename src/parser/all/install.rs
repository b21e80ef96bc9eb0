//! Installation parameter and extra parameter datagrams
use super::{body, footer_text, to_footer, Padding, Stamp};
use binrw::binrw;
use std::collections::BTreeMap;

/// Installation parameters (`I` at the start of a line, `i` at the end)
///
/// The text is a comma separated list of `KEY=value` pairs.
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Installation {
    #[brw(ignore)]
    pub stamp: Stamp,
    pub survey_line: u16,
    pub serial: u16,
    /// Serial number of the second sonar head
    pub secondary_serial: u16,
    /// The parameter text; bytes that are not UTF-8 are replaced
    #[br(parse_with = footer_text)]
    #[bw(map = |text: &String| text.as_bytes().to_vec())]
    pub text: String,
}
body!(Installation, Padding::Parity);

impl Installation {
    /// The parameters as a key/value map
    ///
    /// Entries without an `=` are skipped and values are trimmed.
    pub fn parameters(&self) -> BTreeMap<String, String> {
        self.text
            .trim_end_matches('\0')
            .split(',')
            .filter_map(|p| {
                let (key, value) = p.split_once('=')?;
                Some((key.trim().to_string(), value.trim().to_string()))
            })
            .collect()
    }
}

/// Extra parameters (`3`)
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtraParameters {
    #[brw(ignore)]
    pub stamp: Stamp,
    pub counter: u16,
    pub serial: u16,
    /// Identifies what the content holds
    pub content_identifier: u16,
    /// The content, interpreted according to the identifier
    #[br(parse_with = to_footer)]
    pub content: Vec<u8>,
}
body!(ExtraParameters, Padding::Parity);
