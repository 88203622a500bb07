//! Test selection.
//!
//! Decides which modules to look at, finds their `_test.json` descriptor
//! files and collects the tests to hand to the runner.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::catalog::ModuleCatalog;
use crate::descriptor::{DescriptorParser, ParseRequest, TestDescriptor};
use crate::error::RuntestError;
use crate::reporter::Reporter;

/// File name suffix of test descriptor files
pub const TEST_DESCRIPTOR_SUFFIX: &str = "_test.json";

const MODULE_SKIPPED_REASON: &str = "All tests for this module disabled on command line.";

/// Which tests to run
#[derive(Debug, Clone, Default)]
pub struct TestSelection {
    /// Only run tests of this module
    pub module_filter: Option<String>,
    /// Only run the test with this name, searched in every available module
    pub test_filter: Option<String>,
    pub skip_modules: HashSet<String>,
    pub skip_tests: HashSet<String>,
    pub kit: String,
}

impl TestSelection {
    pub fn new(kit: impl Into<String>) -> Self {
        Self {
            kit: kit.into(),
            ..Default::default()
        }
    }

    /// Modules to scan, in iteration order
    ///
    /// A test filter searches every available module, a module filter
    /// narrows to that module alone, and with neither the auto-run set is
    /// used.
    pub fn candidate_modules(&self, catalog: &ModuleCatalog) -> Vec<String> {
        if self.test_filter.is_some() {
            catalog.available().to_vec()
        } else if let Some(module) = &self.module_filter {
            vec![module.clone()]
        } else {
            catalog.auto_run().to_vec()
        }
    }
}

/// Find all descriptor files below `dir`
///
/// Each directory's files come before its subdirectories, otherwise in
/// directory order. A missing directory yields nothing.
pub fn find_test_json(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        log::debug!("No test directory at {}", dir.display());
        return Vec::new();
    }

    let mut paths = Vec::new();
    let walker = WalkDir::new(dir)
        .sort_by(|a, b| a.file_type().is_dir().cmp(&b.file_type().is_dir()));
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable entry under {}: {}", dir.display(), e);
                continue;
            }
        };

        // File name rule is <peri>_test.json or <peri>_<somefunction>_test.json
        let is_descriptor = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(TEST_DESCRIPTOR_SUFFIX));
        if entry.file_type().is_file() && is_descriptor {
            paths.push(entry.into_path());
        }
    }
    paths
}

/// Collect the tests described by `selection`
///
/// `root` is the directory holding the module directories. Skipped modules
/// and tests are recorded on `reporter`.
pub fn select_tests(
    root: &Path,
    catalog: &ModuleCatalog,
    selection: &TestSelection,
    parser: &dyn DescriptorParser,
    reporter: &mut dyn Reporter,
) -> Result<Vec<TestDescriptor>, RuntestError> {
    if let Some(test) = &selection.test_filter {
        log::info!("Only processing test: {test}");
    } else if let Some(module) = &selection.module_filter {
        log::info!("Only processing module: {module}");
        if catalog.lookup(module).is_none() {
            log::warn!("Module {module} is not in the module catalog");
        }
    }

    let mut tests = Vec::new();

    for module in selection.candidate_modules(catalog) {
        if selection.skip_modules.contains(&module) {
            reporter.report_skipped(&module, &module, MODULE_SKIPPED_REASON);
            continue;
        }

        let files = find_test_json(&ModuleCatalog::test_dir(root, &module));
        if files.is_empty() {
            continue;
        }

        let request = ParseRequest {
            module: &module,
            kit: &selection.kit,
            test_filter: selection.test_filter.as_deref(),
            skip_tests: &selection.skip_tests,
        };
        tests.extend(parser.parse(&files, &request, reporter)?);
    }

    log::info!(
        "Selected {} test(s) for kit {}",
        tests.len(),
        selection.kit
    );
    Ok(tests)
}
