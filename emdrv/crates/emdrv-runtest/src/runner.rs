//! Handing tests to the external toolchain
//!
//! Generating, building, flashing and running a test on a kit is done by an
//! external toolchain executable. [`CommandRunner`] invokes it once per test
//! and turns its exit status into an [`Outcome`].

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::console;
use crate::descriptor::TestDescriptor;
use crate::error::RuntestError;
use crate::reporter::{Outcome, Reporter, TestRecord};

/// Kits that sometimes fail to masserase and are flashed without it
pub const NO_MASSERASE_KITS: &[&str] = &["EFM32LG_DK3650", "EFM32GG_DK3750", "EFM32WG_DK3850"];

/// Runs selected tests and records one outcome per test
pub trait Runner {
    fn run(
        &mut self,
        tests: &[TestDescriptor],
        reporter: &mut dyn Reporter,
    ) -> Result<(), RuntestError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Compiler {
    #[default]
    ArmGcc,
    Iar,
}

impl Compiler {
    pub fn as_str(self) -> &'static str {
        match self {
            Compiler::ArmGcc => "armgcc",
            Compiler::Iar => "iar",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuildConfig {
    Debug,
    #[default]
    Release,
}

impl BuildConfig {
    pub fn as_str(self) -> &'static str {
        match self {
            BuildConfig::Debug => "debug",
            BuildConfig::Release => "release",
        }
    }
}

/// Tool used to flash the kit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Flasher {
    #[default]
    SimplicityCommander,
    EaCommander,
}

impl Flasher {
    pub fn as_str(self) -> &'static str {
        match self {
            Flasher::SimplicityCommander => "simplicity-commander",
            Flasher::EaCommander => "eacommander",
        }
    }
}

/// How far the toolchain goes with each test
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunMode {
    /// Generate, build, flash and run
    #[default]
    Full,
    /// Generate and build, don't run on device
    BuildOnly,
    /// Only generate the project
    GenerateOnly,
}

/// Settings shared by every test of a run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub kit: String,
    pub project_name: String,
    pub compiler: Compiler,
    pub build_config: BuildConfig,
    pub mode: RunMode,
    pub flasher: Flasher,
    pub jlink_serial: Option<String>,
    pub jlink_ip: Option<String>,
    /// Serial port to read results from
    pub serial_port: Option<String>,
    /// Custom flashloader
    pub flashloader: Option<PathBuf>,
    /// Echo toolchain output
    pub verbose: bool,
    /// Write raw toolchain output to `<out_dir>/<kit>_<compiler>_<test>.txt`
    pub dump_output: bool,
    pub out_dir: PathBuf,
}

impl RunConfig {
    pub fn new(kit: impl Into<String>) -> Self {
        Self {
            kit: kit.into(),
            project_name: "emdrvtest".to_string(),
            compiler: Compiler::default(),
            build_config: BuildConfig::default(),
            mode: RunMode::default(),
            flasher: Flasher::default(),
            jlink_serial: None,
            jlink_ip: None,
            serial_port: None,
            flashloader: None,
            verbose: false,
            dump_output: false,
            out_dir: PathBuf::from("./out"),
        }
    }

    /// Whether the kit is mass erased before flashing
    pub fn masserase(&self) -> bool {
        !NO_MASSERASE_KITS.contains(&self.kit.as_str())
    }

    /// Path of the raw output dump for `test`
    pub fn dump_path(&self, test: &TestDescriptor) -> PathBuf {
        self.out_dir.join(format!(
            "{}_{}_{}.txt",
            self.kit,
            self.compiler.as_str(),
            test.name
        ))
    }
}

/// Runs each test through an external toolchain executable
///
/// The descriptor is written as JSON to the child's stdin; everything else
/// goes on the command line. Exit status 0 is a pass.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    program: PathBuf,
    config: RunConfig,
}

impl CommandRunner {
    pub fn new(program: impl Into<PathBuf>, config: RunConfig) -> Self {
        Self {
            program: program.into(),
            config,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Command line passed to the toolchain for `test`
    pub fn command_args(&self, test: &TestDescriptor) -> Vec<String> {
        let config = &self.config;
        let mut args = vec![
            "--kit".to_string(),
            config.kit.clone(),
            "--project".to_string(),
            config.project_name.clone(),
            "--compiler".to_string(),
            config.compiler.as_str().to_string(),
            "--module".to_string(),
            test.module.clone(),
            "--test".to_string(),
            test.name.clone(),
        ];

        match config.mode {
            RunMode::GenerateOnly => args.push("--genonly".to_string()),
            RunMode::BuildOnly => {
                args.extend(["--build-config".to_string(), config.build_config.as_str().to_string()]);
                args.push("--buildonly".to_string());
            }
            RunMode::Full => {
                args.extend(["--build-config".to_string(), config.build_config.as_str().to_string()]);
                args.extend(["--flasher".to_string(), config.flasher.as_str().to_string()]);
                if !config.masserase() {
                    args.push("--no-masserase".to_string());
                }
                if let Some(serial) = &config.jlink_serial {
                    args.extend(["--jlink-serial".to_string(), serial.clone()]);
                }
                if let Some(ip) = &config.jlink_ip {
                    args.extend(["--jlink-ip".to_string(), ip.clone()]);
                }
                if let Some(port) = &config.serial_port {
                    args.extend(["--serialport".to_string(), port.clone()]);
                }
                if let Some(flashloader) = &config.flashloader {
                    args.extend([
                        "--flashloader".to_string(),
                        flashloader.to_string_lossy().into_owned(),
                    ]);
                }
            }
        }
        args
    }

    /// Run one test; only output dump failures are errors
    fn run_one(&self, test: &TestDescriptor) -> Result<Outcome, RuntestError> {
        let args = self.command_args(test);
        log::debug!("{} {}", self.program.display(), args.join(" "));

        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();
        let mut child = match child {
            Ok(child) => child,
            Err(e) => {
                return Ok(Outcome::Failed(format!(
                    "Failed to start {}: {e}",
                    self.program.display()
                )));
            }
        };

        if let Some(mut stdin) = child.stdin.take() {
            let written = serde_json::to_vec(test)
                .map_err(std::io::Error::from)
                .and_then(|json| stdin.write_all(&json));
            if let Err(e) = written {
                // The toolchain may exit without reading its input
                log::debug!("Could not send descriptor to toolchain: {e}");
            }
        }

        let output = match child.wait_with_output() {
            Ok(output) => output,
            Err(e) => return Ok(Outcome::Failed(format!("Toolchain did not finish: {e}"))),
        };
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if self.config.verbose {
            for line in stdout.lines().chain(stderr.lines()) {
                log::info!("  {line}");
            }
        }

        if self.config.dump_output {
            let path = self.config.dump_path(test);
            fs::create_dir_all(&self.config.out_dir)
                .map_err(|e| RuntestError::io(&self.config.out_dir, e))?;
            fs::write(&path, format!("{stdout}{stderr}")).map_err(|e| RuntestError::io(&path, e))?;
        }

        if output.status.success() {
            return Ok(Outcome::Passed);
        }

        let message = last_line(&stderr)
            .or_else(|| last_line(&stdout))
            .map(str::to_string)
            .unwrap_or_else(|| format!("Toolchain exited with {}", output.status));
        Ok(Outcome::Failed(message))
    }
}

impl Runner for CommandRunner {
    fn run(
        &mut self,
        tests: &[TestDescriptor],
        reporter: &mut dyn Reporter,
    ) -> Result<(), RuntestError> {
        log::info!(
            "Running {} test(s) on {} ({}, {})",
            tests.len(),
            self.config.kit,
            self.config.compiler.as_str(),
            self.config.build_config.as_str()
        );

        for test in tests {
            let label = format!("{}/{}", test.module, test.name);
            let mut fatal = None;
            let outcome = console::execute_step(&label, || match self.run_one(test) {
                Ok(outcome) => outcome,
                Err(e) => {
                    let outcome = Outcome::Failed(e.to_string());
                    fatal = Some(e);
                    outcome
                }
            });
            if let Some(e) = fatal {
                return Err(e);
            }

            reporter.record(TestRecord {
                module: test.module.clone(),
                test: test.name.clone(),
                outcome,
            });
        }
        Ok(())
    }
}

fn last_line(text: &str) -> Option<&str> {
    text.lines().rev().map(str::trim).find(|line| !line.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> TestDescriptor {
        TestDescriptor {
            module: "SPIDRV".to_string(),
            name: "spidrv_test".to_string(),
            defines: vec![],
            includes: vec![],
            src: vec!["main.c".to_string()],
            genproject_template: "./templates/emdrvtest.xml".to_string(),
        }
    }

    #[test]
    fn test_masserase_exceptions() {
        assert!(RunConfig::new("EFM32GG_STK3700").masserase());
        assert!(!RunConfig::new("EFM32GG_DK3750").masserase());
    }

    #[test]
    fn test_full_mode_args() {
        let mut config = RunConfig::new("EFM32WG_DK3850");
        config.jlink_serial = Some("440012345".to_string());
        config.serial_port = Some("/dev/ttyACM0".to_string());
        let runner = CommandRunner::new("toolchain", config);

        let args = runner.command_args(&descriptor());
        assert_eq!(
            args,
            vec![
                "--kit",
                "EFM32WG_DK3850",
                "--project",
                "emdrvtest",
                "--compiler",
                "armgcc",
                "--module",
                "SPIDRV",
                "--test",
                "spidrv_test",
                "--build-config",
                "release",
                "--flasher",
                "simplicity-commander",
                "--no-masserase",
                "--jlink-serial",
                "440012345",
                "--serialport",
                "/dev/ttyACM0",
            ]
        );
    }

    #[test]
    fn test_genonly_skips_build_and_flash_args() {
        let mut config = RunConfig::new("EFM32GG_STK3700");
        config.mode = RunMode::GenerateOnly;
        config.jlink_ip = Some("10.0.0.2".to_string());
        let args = CommandRunner::new("toolchain", config).command_args(&descriptor());
        assert!(args.contains(&"--genonly".to_string()));
        assert!(!args.contains(&"--build-config".to_string()));
        assert!(!args.contains(&"--jlink-ip".to_string()));
    }

    #[test]
    fn test_dump_path() {
        let mut config = RunConfig::new("EFM32GG_STK3700");
        config.compiler = Compiler::Iar;
        assert_eq!(
            config.dump_path(&descriptor()),
            PathBuf::from("./out/EFM32GG_STK3700_iar_spidrv_test.txt")
        );
    }

    #[test]
    fn test_last_line() {
        assert_eq!(last_line("building\nFAIL: timeout\n\n"), Some("FAIL: timeout"));
        assert_eq!(last_line("  \n"), None);
    }
}
