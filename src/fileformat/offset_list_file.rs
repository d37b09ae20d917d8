use std::collections::BTreeSet;
use std::fs::read_to_string;
use std::path::Path;

use crate::common::U8_CHAR_COMMENT;
use crate::runtime::Error;

///////////////////////////////
/// Read significant locations, one 1-based location per line. Blank lines and
/// lines starting with # are skipped. Returned offsets are 0-based
pub fn read_offset_list_file(filename: &Path) -> Result<BTreeSet<usize>, Error> {
    if !filename.exists() {
        return Err(Error::file_not_found(filename));
    }
    let content = read_to_string(filename)?;
    parse_offset_list(&content)
}

pub fn parse_offset_list(content: &str) -> Result<BTreeSet<usize>, Error> {
    let mut offsets = BTreeSet::new();
    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.as_bytes()[0] == U8_CHAR_COMMENT {
            continue;
        }

        let location: usize = line.parse().map_err(|_| {
            Error::parse_error(
                format!("offset list line {}", line_no + 1),
                Some(format!("'{}' is not a location", line)),
            )
        })?;
        if location == 0 {
            return Err(Error::parse_error(
                format!("offset list line {}", line_no + 1),
                Some("locations are 1-based"),
            ));
        }
        offsets.insert(location - 1);
    }
    Ok(offsets)
}
