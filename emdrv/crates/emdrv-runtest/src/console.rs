//! Human readable test output with ANSI colors

use std::time::Instant;

use crate::reporter::{Outcome, TestReporter};

/// ANSI color codes
mod colors {
    pub const GREEN: &str = "\x1b[32m";
    pub const RED: &str = "\x1b[31m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const DIM: &str = "\x1b[2m";
    pub const RESET: &str = "\x1b[0m";
}

const RULE_WIDTH: usize = 80;

/// Status symbol printed in front of a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Ok,
    Failed,
    Skipped,
}

impl StepStatus {
    fn symbol(self) -> String {
        match self {
            StepStatus::Ok => colorize("✓", colors::GREEN),
            StepStatus::Failed => colorize("✗", colors::RED),
            StepStatus::Skipped => colorize("-", colors::YELLOW),
        }
    }
}

/// Check if colors should be enabled
/// Respects NO_COLOR environment variable
fn should_color() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

fn colorize(text: &str, color: &str) -> String {
    if should_color() {
        format!("{color}{text}{}", colors::RESET)
    } else {
        text.to_string()
    }
}

/// Print a dashed separator line
pub fn print_rule() {
    eprintln!("{}", "-".repeat(RULE_WIDTH));
}

/// Print a step with status symbol on the left
///
/// `details` are shown dimmed after the message (e.g. kit name, timing).
pub fn print_step(status: StepStatus, message: &str, details: Option<&str>) {
    match details {
        Some(details) => eprintln!(
            "{} {} {}",
            status.symbol(),
            message,
            colorize(details, colors::DIM)
        ),
        None => eprintln!("{} {}", status.symbol(), message),
    }
}

/// Execute a step and print its outcome with timing
///
/// The closure decides the outcome; its return value is passed through.
pub fn execute_step<F>(message: &str, f: F) -> Outcome
where
    F: FnOnce() -> Outcome,
{
    let start = Instant::now();
    let outcome = f();
    let elapsed = format!("({:.1}s)", start.elapsed().as_secs_f64());

    match &outcome {
        Outcome::Passed => print_step(StepStatus::Ok, message, Some(&elapsed)),
        Outcome::Failed(error) => {
            print_step(StepStatus::Failed, message, Some(&elapsed));
            eprintln!("  ERROR: {error}");
        }
        Outcome::Skipped(reason) => print_step(StepStatus::Skipped, message, Some(reason)),
    }
    outcome
}

/// Print outcome counts
pub fn print_statistics(reporter: &TestReporter) {
    let stats = reporter.statistics();
    let line = format!(
        "{}: {} passed, {} failed, {} skipped ({} total)",
        reporter.name(),
        stats.passed,
        stats.failed,
        stats.skipped,
        stats.total()
    );
    let color = if stats.failed == 0 {
        colors::GREEN
    } else {
        colors::YELLOW
    };
    eprintln!("{}", colorize(&line, color));
}

/// Print every failed test with its message
pub fn print_failures(reporter: &TestReporter) {
    let mut any = false;
    for record in reporter.failures() {
        if let Outcome::Failed(message) = &record.outcome {
            any = true;
            print_step(
                StepStatus::Failed,
                &format!("{}/{}", record.module, record.test),
                Some(message),
            );
        }
    }
    if !any {
        eprintln!("{}", colorize("No failures", colors::DIM));
    }
}
