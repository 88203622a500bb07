//! Outcome recording and XML result documents
//!
//! Every test the harness touches ends up as one [`TestRecord`]. The
//! [`TestReporter`] keeps them in the order they happened and writes them out
//! as `<out>/<kit>.xml`, the document shape the HTML failure report reads.

use std::fs;
use std::path::{Path, PathBuf};

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};

use crate::error::RuntestError;

/// What happened to a test
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    /// Failed, with the message shown in reports
    Failed(String),
    /// Not run, with the reason
    Skipped(String),
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

/// Outcome of a single test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRecord {
    pub module: String,
    /// Test name. Module-wide skips use the module name here.
    pub test: String,
    pub outcome: Outcome,
}

/// Sink for test outcomes
pub trait Reporter {
    fn record(&mut self, record: TestRecord);

    fn report_pass(&mut self, module: &str, test: &str) {
        self.record(TestRecord {
            module: module.to_string(),
            test: test.to_string(),
            outcome: Outcome::Passed,
        });
    }

    fn report_fail(&mut self, module: &str, test: &str, message: &str) {
        self.record(TestRecord {
            module: module.to_string(),
            test: test.to_string(),
            outcome: Outcome::Failed(message.to_string()),
        });
    }

    fn report_skipped(&mut self, module: &str, test: &str, reason: &str) {
        self.record(TestRecord {
            module: module.to_string(),
            test: test.to_string(),
            outcome: Outcome::Skipped(reason.to_string()),
        });
    }
}

/// Outcome counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statistics {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Statistics {
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped
    }
}

/// Collects outcomes for one kit/session
#[derive(Debug, Clone)]
pub struct TestReporter {
    name: String,
    records: Vec<TestRecord>,
}

impl TestReporter {
    /// Create a reporter; `name` becomes the suite name and the XML file name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn records(&self) -> &[TestRecord] {
        &self.records
    }

    pub fn statistics(&self) -> Statistics {
        let mut stats = Statistics::default();
        for record in &self.records {
            match record.outcome {
                Outcome::Passed => stats.passed += 1,
                Outcome::Failed(_) => stats.failed += 1,
                Outcome::Skipped(_) => stats.skipped += 1,
            }
        }
        stats
    }

    pub fn failures(&self) -> impl Iterator<Item = &TestRecord> {
        self.records.iter().filter(|r| r.outcome.is_failure())
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    /// Render the result document
    pub fn to_xml(&self) -> Result<String, String> {
        let stats = self.statistics();
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(|e| e.to_string())?;

        let mut suite = BytesStart::new("testsuite");
        suite.push_attribute(("name", self.name.as_str()));
        suite.push_attribute(("tests", stats.total().to_string().as_str()));
        suite.push_attribute(("failures", stats.failed.to_string().as_str()));
        suite.push_attribute(("skipped", stats.skipped.to_string().as_str()));
        writer
            .write_event(Event::Start(suite))
            .map_err(|e| e.to_string())?;

        for record in &self.records {
            let mut case = BytesStart::new("testcase");
            case.push_attribute(("classname", record.module.as_str()));
            case.push_attribute(("name", record.test.as_str()));

            let (tag, message) = match &record.outcome {
                Outcome::Passed => {
                    writer
                        .write_event(Event::Empty(case))
                        .map_err(|e| e.to_string())?;
                    continue;
                }
                Outcome::Failed(message) => ("error", message),
                Outcome::Skipped(reason) => ("skipped", reason),
            };

            writer
                .write_event(Event::Start(case))
                .map_err(|e| e.to_string())?;
            let mut child = BytesStart::new(tag);
            child.push_attribute(("message", message.as_str()));
            writer
                .write_event(Event::Empty(child))
                .map_err(|e| e.to_string())?;
            writer
                .write_event(Event::End(BytesEnd::new("testcase")))
                .map_err(|e| e.to_string())?;
        }

        writer
            .write_event(Event::End(BytesEnd::new("testsuite")))
            .map_err(|e| e.to_string())?;

        String::from_utf8(writer.into_inner()).map_err(|e| e.to_string())
    }

    /// Write `<dir>/<name>.xml`, creating `dir` if needed
    ///
    /// Returns the path written.
    pub fn write_report(&self, dir: &Path) -> Result<PathBuf, RuntestError> {
        let path = dir.join(format!("{}.xml", self.name));
        let xml = self.to_xml().map_err(|message| RuntestError::XmlWrite {
            path: path.clone(),
            message,
        })?;

        fs::create_dir_all(dir).map_err(|e| RuntestError::io(dir, e))?;
        fs::write(&path, xml).map_err(|e| RuntestError::io(&path, e))?;

        log::info!("Wrote result document {}", path.display());
        Ok(path)
    }
}

impl Reporter for TestReporter {
    fn record(&mut self, record: TestRecord) {
        match &record.outcome {
            Outcome::Passed => log::debug!("PASS {}/{}", record.module, record.test),
            Outcome::Failed(message) => {
                log::debug!("FAIL {}/{}: {}", record.module, record.test, message)
            }
            Outcome::Skipped(reason) => {
                log::info!("Skipping {}/{}: {}", record.module, record.test, reason)
            }
        }
        self.records.push(record);
    }
}
