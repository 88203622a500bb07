//! A run recorded by the reporter feeds the HTML failure report

use std::fs;

use emdrv_runtest::{
    CommandRunner, Outcome, ReportOptions, Reporter, RunConfig, RunMode, Runner, TestDescriptor,
    TestReporter, render_failure_report,
};

fn descriptor(module: &str, name: &str) -> TestDescriptor {
    TestDescriptor {
        module: module.to_string(),
        name: name.to_string(),
        defines: vec![],
        includes: vec![],
        src: vec![format!("{name}.c")],
        genproject_template: "./templates/emdrvtest.xml".to_string(),
    }
}

#[test]
fn reporter_output_lists_exactly_the_failed_tests() {
    let out = tempfile::tempdir().unwrap();
    let mut reporter = TestReporter::new("EFM32GG_STK3700");
    reporter.report_pass("RTCDRV", "rtcdrv_test");
    reporter.report_fail("SPIDRV", "spidrv_test", "TEST_ASSERT failed: rx != tx");
    reporter.report_skipped("ECC", "ECC", "All tests for this module disabled on command line.");
    reporter.report_fail("NVM", "nvm_test", "page <3> & <4> overlap");
    reporter.write_report(out.path()).unwrap();

    let html_path = out.path().join("emdrvreportfile.html");
    let summary =
        render_failure_report(out.path(), &html_path, &ReportOptions::default()).unwrap();

    let html = fs::read_to_string(&html_path).unwrap();
    assert_eq!(summary.rows, 2);
    assert!(html.contains(
        "<tr><td align=\"center\">EFM32GG_STK3700</td><td>spidrv_test</td><td>TEST_ASSERT failed: rx != tx</td></tr>"
    ));
    assert!(html.contains("<td>nvm_test</td><td>page &lt;3&gt; &amp; &lt;4&gt; overlap</td>"));
    assert!(!html.contains("rtcdrv_test"));
    assert!(!html.contains("<td>ECC</td>"));
}

#[cfg(unix)]
#[test_log::test]
fn command_runner_records_exit_status() {
    let out = tempfile::tempdir().unwrap();
    let tests = vec![descriptor("RTCDRV", "rtcdrv_test")];

    let mut config = RunConfig::new("EFM32GG_STK3700");
    config.out_dir = out.path().to_path_buf();
    config.mode = RunMode::BuildOnly;

    let mut reporter = TestReporter::new("EFM32GG_STK3700");
    CommandRunner::new("true", config.clone())
        .run(&tests, &mut reporter)
        .unwrap();
    CommandRunner::new("false", config)
        .run(&tests, &mut reporter)
        .unwrap();

    let outcomes: Vec<_> = reporter.records().iter().map(|r| r.outcome.clone()).collect();
    assert_eq!(outcomes[0], Outcome::Passed);
    assert!(matches!(outcomes[1], Outcome::Failed(_)));
}

#[test]
fn missing_toolchain_is_a_failed_test() {
    let out = tempfile::tempdir().unwrap();
    let mut config = RunConfig::new("EFM32GG_STK3700");
    config.out_dir = out.path().to_path_buf();

    let mut reporter = TestReporter::new("EFM32GG_STK3700");
    CommandRunner::new(out.path().join("no-such-toolchain"), config)
        .run(&[descriptor("SPIDRV", "spidrv_test")], &mut reporter)
        .unwrap();

    match &reporter.records()[0].outcome {
        Outcome::Failed(message) => assert!(message.starts_with("Failed to start")),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[cfg(unix)]
#[test]
fn output_is_dumped_per_test() {
    let out = tempfile::tempdir().unwrap();
    let mut config = RunConfig::new("EFM32GG_STK3700");
    config.out_dir = out.path().to_path_buf();
    config.mode = RunMode::GenerateOnly;
    config.dump_output = true;

    let test = descriptor("USTIMER", "ustimer_test");
    let mut reporter = TestReporter::new("EFM32GG_STK3700");
    // `echo` prints its arguments, which end with the run mode flag
    CommandRunner::new("echo", config.clone())
        .run(std::slice::from_ref(&test), &mut reporter)
        .unwrap();

    let dump = fs::read_to_string(config.dump_path(&test)).unwrap();
    assert!(dump.contains("--test ustimer_test"));
    assert!(dump.trim_end().ends_with("--genonly"));
    assert_eq!(reporter.records()[0].outcome, Outcome::Passed);
}
