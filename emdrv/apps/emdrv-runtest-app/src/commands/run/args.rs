use std::path::PathBuf;

use clap::{Args, ValueEnum};
use emdrv_runtest::{BuildConfig, Compiler, Flasher, RunConfig, RunMode};

use crate::commands::selection::SelectionArgs;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CompilerArg {
    Armgcc,
    Iar,
}

impl From<CompilerArg> for Compiler {
    fn from(value: CompilerArg) -> Self {
        match value {
            CompilerArg::Armgcc => Compiler::ArmGcc,
            CompilerArg::Iar => Compiler::Iar,
        }
    }
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Connect to this J-Link serial. If you only have one kit connected, you can ignore this option.
    #[arg(long = "serial")]
    pub jlink_serial: Option<String>,

    /// Connect to this J-Link IP
    #[arg(long = "ip")]
    pub jlink_ip: Option<String>,

    /// Only generate project
    #[arg(long)]
    pub genonly: bool,

    /// Only build project, don't run on device
    #[arg(long)]
    pub buildonly: bool,

    /// Specify the compiler to use
    #[arg(long, value_enum, default_value_t = CompilerArg::Armgcc)]
    pub compiler: CompilerArg,

    /// Build in debug mode
    #[arg(long)]
    pub debug: bool,

    /// Build in release mode (default)
    #[allow(dead_code, reason = "release is the default build config")]
    #[arg(long)]
    pub release: bool,

    /// Serial port to read results from
    #[arg(long)]
    pub serialport: Option<String>,

    /// DEPRECATED: Simplicity Commander is always used unless --eacommander is given
    #[allow(dead_code, reason = "accepted so older invocations keep working")]
    #[arg(long, hide = true)]
    pub commander: bool,

    /// Use energyAware Commander
    #[arg(long)]
    pub eacommander: bool,

    /// Write raw test output to <out>/<kit>_<compiler>_<test>.txt
    #[arg(long = "output-to-file")]
    pub dump_output: bool,

    /// Path to a custom flashloader to use
    #[arg(long)]
    pub flashloader: Option<PathBuf>,

    /// Directory for the XML report and output dumps
    #[arg(long, default_value = "./out")]
    pub out: PathBuf,

    /// Toolchain executable that generates, builds, flashes and runs one test
    #[arg(long, env = "EMDRV_RUNNER")]
    pub runner: PathBuf,
}

impl RunArgs {
    pub fn run_config(&self, verbose: bool) -> RunConfig {
        let mode = if self.genonly {
            RunMode::GenerateOnly
        } else if self.buildonly {
            RunMode::BuildOnly
        } else {
            RunMode::Full
        };

        let mut config = RunConfig::new(&self.selection.kit);
        config.compiler = self.compiler.into();
        // --release is the default; --debug takes precedence
        config.build_config = if self.debug {
            BuildConfig::Debug
        } else {
            BuildConfig::Release
        };
        config.mode = mode;
        config.flasher = if self.eacommander {
            Flasher::EaCommander
        } else {
            Flasher::SimplicityCommander
        };
        config.jlink_serial = self.jlink_serial.clone();
        config.jlink_ip = self.jlink_ip.clone();
        config.serial_port = self.serialport.clone();
        config.flashloader = self.flashloader.clone();
        config.verbose = verbose;
        config.dump_output = self.dump_output;
        config.out_dir = self.out.clone();
        config
    }
}
