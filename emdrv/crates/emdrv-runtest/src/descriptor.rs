//! Test descriptors
//!
//! A test descriptor is the declarative description of one runnable test:
//! its sources, defines and include paths, plus the project template the
//! external toolchain generates the build from. Descriptors are read from
//! `<name>_test.json` files in each module's `test/` directory.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::RuntestError;
use crate::reporter::Reporter;

/// Project template used when a descriptor does not name one
pub const DEFAULT_GENPROJECT_TEMPLATE: &str = "./templates/emdrvtest.xml";

/// A single runnable test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestDescriptor {
    pub module: String,
    pub name: String,
    pub defines: Vec<String>,
    pub includes: Vec<String>,
    pub src: Vec<String>,
    pub genproject_template: String,
}

/// Filters applied while parsing descriptor files of one module
#[derive(Debug, Clone, Copy)]
pub struct ParseRequest<'a> {
    pub module: &'a str,
    pub kit: &'a str,
    /// Keep only the test with exactly this name
    pub test_filter: Option<&'a str>,
    /// Tests recorded as skipped instead of returned
    pub skip_tests: &'a HashSet<String>,
}

/// Turns descriptor files into [`TestDescriptor`]s
pub trait DescriptorParser {
    fn parse(
        &self,
        paths: &[PathBuf],
        request: &ParseRequest<'_>,
        reporter: &mut dyn Reporter,
    ) -> Result<Vec<TestDescriptor>, RuntestError>;
}

#[derive(Debug, Deserialize)]
struct DescriptorFile {
    #[serde(default)]
    tests: Vec<RawTest>,
}

#[derive(Debug, Deserialize)]
struct RawTest {
    name: String,
    #[serde(default)]
    src: Vec<String>,
    #[serde(default)]
    defines: Vec<String>,
    #[serde(default)]
    includes: Vec<String>,
    /// Kits the test applies to; empty means all kits
    #[serde(default)]
    kits: Vec<String>,
    #[serde(default)]
    genproject_template: Option<String>,
}

/// Parser for the JSON descriptor format
#[derive(Debug, Clone)]
pub struct JsonDescriptorParser {
    default_template: String,
    /// `key:file` source entries expand to `<path><file>`
    custom_src_paths: BTreeMap<String, String>,
}

impl JsonDescriptorParser {
    pub fn new() -> Self {
        Self {
            default_template: DEFAULT_GENPROJECT_TEMPLATE.to_string(),
            custom_src_paths: BTreeMap::new(),
        }
    }

    /// Parser configured the way the emdrv suite needs it
    pub fn emdrv() -> Self {
        Self::new()
            .with_custom_src_path("emlib", "##em-path-emlib##/src/")
            .with_custom_src_path("emdrv", "##em-path-emdrv##/")
    }

    pub fn with_default_template(mut self, template: impl Into<String>) -> Self {
        self.default_template = template.into();
        self
    }

    pub fn with_custom_src_path(mut self, key: impl Into<String>, path: impl Into<String>) -> Self {
        self.custom_src_paths.insert(key.into(), path.into());
        self
    }

    /// Resolve one `src` entry of a descriptor found in `dir`
    fn resolve_src(&self, dir: &Path, entry: &str) -> String {
        if let Some((key, file)) = entry.split_once(':') {
            if let Some(prefix) = self.custom_src_paths.get(key) {
                return format!("{prefix}{file}");
            }
        }
        dir.join(entry).to_string_lossy().into_owned()
    }

    fn parse_file(
        &self,
        path: &Path,
        request: &ParseRequest<'_>,
        reporter: &mut dyn Reporter,
    ) -> Result<Vec<TestDescriptor>, RuntestError> {
        let text = fs::read_to_string(path).map_err(|e| RuntestError::io(path, e))?;
        let file: DescriptorFile =
            serde_json::from_str(&text).map_err(|source| RuntestError::Descriptor {
                path: path.to_path_buf(),
                source,
            })?;

        let dir = path.parent().unwrap_or_else(|| Path::new(""));
        let mut tests = Vec::new();

        for raw in file.tests {
            if request.test_filter.is_some_and(|name| name != raw.name) {
                continue;
            }

            if !raw.kits.is_empty() && !raw.kits.iter().any(|k| k == request.kit) {
                reporter.report_skipped(
                    request.module,
                    &raw.name,
                    &format!("Test not supported on kit {}.", request.kit),
                );
                continue;
            }

            if request.skip_tests.contains(&raw.name) {
                reporter.report_skipped(request.module, &raw.name, "Test disabled on command line.");
                continue;
            }

            let src = raw.src.iter().map(|s| self.resolve_src(dir, s)).collect();
            tests.push(TestDescriptor {
                module: request.module.to_string(),
                name: raw.name,
                defines: raw.defines,
                includes: raw.includes,
                src,
                genproject_template: raw
                    .genproject_template
                    .unwrap_or_else(|| self.default_template.clone()),
            });
        }

        log::debug!("{}: {} test(s)", path.display(), tests.len());
        Ok(tests)
    }
}

impl Default for JsonDescriptorParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DescriptorParser for JsonDescriptorParser {
    fn parse(
        &self,
        paths: &[PathBuf],
        request: &ParseRequest<'_>,
        reporter: &mut dyn Reporter,
    ) -> Result<Vec<TestDescriptor>, RuntestError> {
        let mut tests = Vec::new();
        for path in paths {
            tests.extend(self.parse_file(path, request, reporter)?);
        }
        Ok(tests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::{Outcome, TestReporter};

    const SPIDRV_JSON: &str = r#"{
        "tests": [
            {
                "name": "spidrv_test",
                "src": ["main.c", "emlib:em_usart.c", "emdrv:spidrv/src/spidrv.c"],
                "defines": ["SPIDRV_LOOPBACK"],
                "includes": ["../config"]
            },
            {
                "name": "spidrv_slave_test",
                "src": ["slave.c"],
                "kits": ["EFM32GG_DK3750"],
                "genproject_template": "./templates/slave.xml"
            },
            {
                "name": "spidrv_dma_test"
            }
        ]
    }"#;

    fn write_descriptor(dir: &Path) -> PathBuf {
        let path = dir.join("spidrv_test.json");
        fs::write(&path, SPIDRV_JSON).unwrap();
        path
    }

    fn request<'a>(skip: &'a HashSet<String>, filter: Option<&'a str>) -> ParseRequest<'a> {
        ParseRequest {
            module: "SPIDRV",
            kit: "EFM32GG_STK3700",
            test_filter: filter,
            skip_tests: skip,
        }
    }

    #[test]
    fn test_parse_resolves_sources_and_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_descriptor(dir.path());
        let skip = HashSet::new();
        let mut reporter = TestReporter::new("kit");

        let tests = JsonDescriptorParser::emdrv()
            .parse(&[path], &request(&skip, None), &mut reporter)
            .unwrap();

        assert_eq!(tests.len(), 2);
        let first = &tests[0];
        assert_eq!(first.module, "SPIDRV");
        assert_eq!(first.name, "spidrv_test");
        assert_eq!(first.defines, vec!["SPIDRV_LOOPBACK"]);
        assert_eq!(first.includes, vec!["../config"]);
        assert_eq!(
            first.src,
            vec![
                dir.path().join("main.c").to_string_lossy().into_owned(),
                "##em-path-emlib##/src/em_usart.c".to_string(),
                "##em-path-emdrv##/spidrv/src/spidrv.c".to_string(),
            ]
        );
        assert_eq!(first.genproject_template, DEFAULT_GENPROJECT_TEMPLATE);
        assert_eq!(tests[1].name, "spidrv_dma_test");
        assert!(tests[1].src.is_empty());
    }

    #[test]
    fn test_kit_restricted_test_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_descriptor(dir.path());
        let skip = HashSet::new();
        let mut reporter = TestReporter::new("kit");

        JsonDescriptorParser::emdrv()
            .parse(&[path], &request(&skip, None), &mut reporter)
            .unwrap();

        assert_eq!(reporter.records().len(), 1);
        assert_eq!(reporter.records()[0].test, "spidrv_slave_test");
        assert!(matches!(reporter.records()[0].outcome, Outcome::Skipped(_)));
    }

    #[test]
    fn test_test_filter_and_skip_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_descriptor(dir.path());
        let skip: HashSet<String> = ["spidrv_dma_test".to_string()].into_iter().collect();
        let mut reporter = TestReporter::new("kit");
        let parser = JsonDescriptorParser::emdrv();

        let filtered = parser
            .parse(&[path.clone()], &request(&skip, Some("spidrv_test")), &mut reporter)
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "spidrv_test");
        assert!(reporter.records().is_empty());

        let rest = parser
            .parse(&[path], &request(&skip, None), &mut reporter)
            .unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(
            reporter.records().last().map(|r| r.outcome.clone()),
            Some(Outcome::Skipped("Test disabled on command line.".to_string()))
        );
    }

    #[test]
    fn test_unknown_prefix_is_a_relative_path() {
        let parser = JsonDescriptorParser::emdrv();
        assert_eq!(
            parser.resolve_src(Path::new("test"), "common:util.c"),
            Path::new("test").join("common:util.c").to_string_lossy()
        );
    }

    #[test]
    fn test_custom_default_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nvm_test.json");
        fs::write(&path, r#"{"tests": [{"name": "nvm_test"}]}"#).unwrap();
        let skip = HashSet::new();
        let mut reporter = TestReporter::new("kit");

        let tests = JsonDescriptorParser::new()
            .with_default_template("./templates/nvm.xml")
            .parse(&[path], &request(&skip, None), &mut reporter)
            .unwrap();
        assert_eq!(tests[0].genproject_template, "./templates/nvm.xml");
    }

    #[test]
    fn test_malformed_json_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken_test.json");
        fs::write(&path, "{ \"tests\": [ ").unwrap();
        let skip = HashSet::new();
        let mut reporter = TestReporter::new("kit");

        let err = JsonDescriptorParser::new()
            .parse(&[path.clone()], &request(&skip, None), &mut reporter)
            .unwrap_err();
        assert!(matches!(err, RuntestError::Descriptor { .. }));
        assert_eq!(err.path(), path.as_path());
    }
}
