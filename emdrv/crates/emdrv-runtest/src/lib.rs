//! emdrv regression test harness library.
//!
//! This library holds the logic behind the `emdrv-runtest` CLI:
//! - Module catalog and test descriptor discovery
//! - Handing selected tests to the external toolchain
//! - Recording outcomes into per-kit XML result documents
//! - Turning a directory of result documents into an HTML failure report

pub mod catalog;
pub mod console;
pub mod descriptor;
pub mod error;
pub mod report;
pub mod reporter;
pub mod runner;
pub mod selector;

pub use catalog::ModuleCatalog;
pub use descriptor::{DescriptorParser, JsonDescriptorParser, ParseRequest, TestDescriptor};
pub use error::RuntestError;
pub use report::{FailureRecord, ReportOptions, ReportSummary, render_failure_report};
pub use reporter::{Outcome, Reporter, TestRecord, TestReporter};
pub use runner::{BuildConfig, CommandRunner, Compiler, Flasher, RunConfig, RunMode, Runner};
pub use selector::{TestSelection, find_test_json, select_tests};
