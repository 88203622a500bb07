//! Module catalog
//!
//! Static table of the driver modules the regression suite knows about, and
//! which of them run by default.

use std::path::{Path, PathBuf};

/// All modules that can be run
const EMDRV_AVAILABLE: &[&str] = &[
    "AESDRV",
    "CAPSENSE",
    "CRYPTODRV",
    "DMADRV",
    "ECC",
    "EZRADIODRV",
    "GPIOINTERRUPT",
    "NVM",
    "RSADRV",
    "RTCDRV",
    "SHADRV",
    "SLEEP",
    "SPIDRV",
    "TEMPDRV",
    "TRACE",
    "UARTDRV",
    "USTIMER",
    "CPP",
];

/// Modules that run in the regression suite when no filter is given
const EMDRV_AUTO_RUN: &[&str] = &[
    "AESDRV",
    "DMADRV",
    "GPIOINTERRUPT",
    "RTCDRV",
    "SLEEP",
    "NVM",
    "SPIDRV",  // requires loopback connection on DK
    "TEMPDRV",
    "UARTDRV", // requires loopback connection on DK
    "USTIMER",
];

/// Availability flags for a single module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleInfo {
    pub available: bool,
    pub auto_run: bool,
}

/// Known modules, in iteration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleCatalog {
    available: Vec<String>,
    auto_run: Vec<String>,
}

impl ModuleCatalog {
    /// Create a catalog from explicit lists
    ///
    /// `auto_run` keeps its own order; it is the default run order.
    pub fn new<A, R>(available: A, auto_run: R) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            available: available.into_iter().map(Into::into).collect(),
            auto_run: auto_run.into_iter().map(Into::into).collect(),
        }
    }

    /// The emdrv module table
    pub fn emdrv() -> Self {
        Self::new(EMDRV_AVAILABLE.iter().copied(), EMDRV_AUTO_RUN.iter().copied())
    }

    pub fn available(&self) -> &[String] {
        &self.available
    }

    pub fn auto_run(&self) -> &[String] {
        &self.auto_run
    }

    /// Look up the flags for `module`, `None` if the catalog has never heard of it
    pub fn lookup(&self, module: &str) -> Option<ModuleInfo> {
        let available = self.available.iter().any(|m| m == module);
        let auto_run = self.auto_run.iter().any(|m| m == module);
        if available || auto_run {
            Some(ModuleInfo { available, auto_run })
        } else {
            None
        }
    }

    /// Directory holding the test descriptors of `module`
    ///
    /// Modules live in lowercase directories next to each other, each with a
    /// `test/` subdirectory.
    pub fn test_dir(root: &Path, module: &str) -> PathBuf {
        root.join(module.to_lowercase()).join("test")
    }
}

impl Default for ModuleCatalog {
    fn default() -> Self {
        Self::emdrv()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_run_is_subset_of_available() {
        let catalog = ModuleCatalog::emdrv();
        for module in catalog.auto_run() {
            assert!(
                catalog.available().contains(module),
                "{module} runs automatically but is not available"
            );
        }
    }

    #[test]
    fn test_lookup() {
        let catalog = ModuleCatalog::emdrv();
        assert_eq!(
            catalog.lookup("SPIDRV"),
            Some(ModuleInfo {
                available: true,
                auto_run: true
            })
        );
        assert_eq!(
            catalog.lookup("ECC"),
            Some(ModuleInfo {
                available: true,
                auto_run: false
            })
        );
        assert_eq!(catalog.lookup("NOSUCHDRV"), None);
    }

    #[test]
    fn test_auto_run_order_is_preserved() {
        let catalog = ModuleCatalog::emdrv();
        let sleep = catalog.auto_run().iter().position(|m| m == "SLEEP");
        let nvm = catalog.auto_run().iter().position(|m| m == "NVM");
        assert!(sleep < nvm);
    }

    #[test]
    fn test_test_dir_is_lowercase() {
        let dir = ModuleCatalog::test_dir(Path::new(".."), "UARTDRV");
        assert_eq!(dir, Path::new("../uartdrv/test"));
    }
}
