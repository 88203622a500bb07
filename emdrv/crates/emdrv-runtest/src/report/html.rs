//! HTML table pieces and the phase-wise writes of the report file.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use quick_xml::escape::escape;

use super::FailureRecord;

pub const HEADER: &str = concat!(
    "<html><body><table border=\"1\" cellpadding=\"1\" cellspacing=\"1\" style=\"width:100%\">\n",
    "<tbody>\n",
    "<tr bgcolor=\"#99CCFF\" style=\"font-weight:bold\" align=\"center\">",
    "<td>Family</td><td>Failed Test Case</td><td>Error</td></tr>\n",
);

pub const FOOTER: &str = "</tbody></table></body></html>\n";

/// One table row, cell text escaped
pub fn row(record: &FailureRecord) -> String {
    format!(
        "<tr><td align=\"center\">{}</td><td>{}</td><td>{}</td></tr>\n",
        escape(record.family.as_str()),
        escape(record.test_case.as_str()),
        escape(record.message.as_str()),
    )
}

/// Create or truncate `path` and write the header
pub fn write_header(path: &Path) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(HEADER.as_bytes())?;
    file.flush()
}

/// Append the rows of one result file
pub fn append_rows(path: &Path, records: &[FailureRecord]) -> io::Result<()> {
    let mut file = OpenOptions::new().append(true).open(path)?;
    for record in records {
        file.write_all(row(record).as_bytes())?;
    }
    file.flush()
}

pub fn write_footer(path: &Path) -> io::Result<()> {
    let mut file = OpenOptions::new().append(true).open(path)?;
    file.write_all(FOOTER.as_bytes())?;
    file.flush()
}
