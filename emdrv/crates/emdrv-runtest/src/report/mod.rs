//! HTML failure report.
//!
//! Reads a directory of XML result documents and renders every failed test
//! case as one row of an HTML table, suitable for attaching to an email.
//!
//! The output is written in three phases: the header when the run starts,
//! one append per result file that has failures, and the footer when every
//! file has been read. A run that stops part way leaves a report with header
//! and rows but no closing tags.

pub mod html;
pub mod result_doc;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::RuntestError;
pub use result_doc::{ChildNode, ERROR_TAG, ParseError, ResultDocument, TestCase};

/// How result files are picked up and how bad ones are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    /// Abort on a result file that does not parse; otherwise skip it
    pub strict: bool,
    /// Only read files ending in `.xml`
    pub require_xml_extension: bool,
    /// Process files sorted by name instead of directory order
    pub sort_files: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            strict: true,
            require_xml_extension: true,
            sort_files: false,
        }
    }
}

/// One row of the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    /// Result file name without extension
    pub family: String,
    pub test_case: String,
    pub message: String,
}

/// What a report run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSummary {
    /// Result files read successfully
    pub files_read: usize,
    /// Result files that did not parse (lenient mode only)
    pub files_skipped: Vec<PathBuf>,
    /// Data rows written
    pub rows: usize,
}

/// Render the failures found in `results_dir` into `output_path`
///
/// The output file is overwritten. In strict mode the first unparsable result
/// file ends the run with [`RuntestError::ResultParse`] and no footer.
pub fn render_failure_report(
    results_dir: &Path,
    output_path: &Path,
    options: &ReportOptions,
) -> Result<ReportSummary, RuntestError> {
    html::write_header(output_path).map_err(|e| RuntestError::io(output_path, e))?;

    let mut summary = ReportSummary::default();

    for path in result_files(results_dir, options)? {
        let bytes = fs::read(&path).map_err(|e| RuntestError::io(&path, e));
        let document = bytes.and_then(|bytes| {
            ResultDocument::parse_bytes(&bytes).map_err(|e| RuntestError::ResultParse {
                path: path.clone(),
                message: e.to_string(),
            })
        });

        let document = match document {
            Ok(document) => document,
            Err(e) if options.strict => return Err(e),
            Err(e) => {
                log::warn!("{e}; skipping");
                summary.files_skipped.push(path);
                continue;
            }
        };
        summary.files_read += 1;

        let family = family_name(&path);
        let records: Vec<FailureRecord> = document
            .failures()
            .into_iter()
            .map(|(test_case, message)| FailureRecord {
                family: family.clone(),
                test_case: test_case.to_string(),
                message: message.to_string(),
            })
            .collect();

        if records.is_empty() {
            log::debug!("{}: no failures", path.display());
            continue;
        }

        log::debug!("{}: {} failure(s)", path.display(), records.len());
        html::append_rows(output_path, &records).map_err(|e| RuntestError::io(output_path, e))?;
        summary.rows += records.len();
    }

    html::write_footer(output_path).map_err(|e| RuntestError::io(output_path, e))?;

    log::info!(
        "Wrote {} failure row(s) from {} result file(s) to {}",
        summary.rows,
        summary.files_read,
        output_path.display()
    );
    Ok(summary)
}

/// Result files of `dir`, in the order they will be processed
fn result_files(dir: &Path, options: &ReportOptions) -> Result<Vec<PathBuf>, RuntestError> {
    let entries = fs::read_dir(dir).map_err(|e| RuntestError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| RuntestError::io(dir, e))?.path();
        if !path.is_file() {
            continue;
        }
        if options.require_xml_extension && !path.extension().is_some_and(|ext| ext == "xml") {
            log::debug!("Ignoring {}", path.display());
            continue;
        }
        files.push(path);
    }

    if options.sort_files {
        files.sort();
    }
    Ok(files)
}

/// Report label of a result file: its name without the last extension
fn family_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_name_strips_last_extension() {
        assert_eq!(family_name(Path::new("out/spidrv.xml")), "spidrv");
        assert_eq!(
            family_name(Path::new("out/EFM32GG_STK3700.armgcc.xml")),
            "EFM32GG_STK3700.armgcc"
        );
        assert_eq!(family_name(Path::new("out/noext")), "noext");
    }

    #[test]
    fn test_result_files_filters_extension_and_dirs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.xml"), "").unwrap();
        fs::write(dir.path().join("a.xml"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::create_dir(dir.path().join("nested.xml")).unwrap();

        let options = ReportOptions {
            sort_files: true,
            ..Default::default()
        };
        let files = result_files(dir.path(), &options).unwrap();
        assert_eq!(files, vec![dir.path().join("a.xml"), dir.path().join("b.xml")]);

        let options = ReportOptions {
            require_xml_extension: false,
            sort_files: true,
            ..Default::default()
        };
        let files = result_files(dir.path(), &options).unwrap();
        assert_eq!(files.len(), 3);
    }
}
