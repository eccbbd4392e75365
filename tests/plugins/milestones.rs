use gradegate::core::config::Config;
use gradegate::core::context::HarnessContext;
use gradegate::core::evidence::ALL_PASSED_MARKER;
use gradegate::core::report::{GroupStatus, Reporter};
use gradegate::core::vcs::ScriptedVcs;
use gradegate::plugins::milestones::{self, GradeReport};
use gradegate::plugins::{led, sensor};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const LED_SCRIPT: &str = "import RPi.GPIO as GPIO\nimport time\n\nGPIO.setmode(GPIO.BCM)\nGPIO.setup(17, GPIO.OUT)\nGPIO.output(17, GPIO.HIGH)\ntime.sleep(1)\nGPIO.cleanup()\n";

const SENSOR_SCRIPT: &str = "\
import time
import board
import adafruit_dht

MAX_RETRIES = 5
dht = adafruit_dht.DHT22(board.D4)
for attempt in range(MAX_RETRIES):
    try:
        print(dht.temperature)
        break
    except RuntimeError as e:
        time.sleep(2)
";

const SENSOR_NO_LOOP: &str = "\
import board
import adafruit_dht

dht = adafruit_dht.DHT22(board.D4)
try:
    print(dht.temperature)
except RuntimeError:
    pass
";

fn status(report: &GradeReport, id: &str) -> GroupStatus {
    report.case(id).unwrap_or_else(|| panic!("case {id}")).status
}

fn complete_repo(root: &Path) {
    fs::write(root.join("led_simple.py"), LED_SCRIPT).expect("led");
    fs::write(root.join("dht22.py"), SENSOR_SCRIPT).expect("dht22");
}

fn ctx(root: &Path, vcs: ScriptedVcs) -> HarnessContext {
    HarnessContext::new(root, Config::default()).with_vcs(vcs)
}

#[test]
fn complete_submission_scores_full_marks() {
    let tmp = tempdir().expect("tempdir");
    complete_repo(tmp.path());
    let ctx = ctx(
        tmp.path(),
        ScriptedVcs::with_subjects(&["add DHT22 reading with retry", "add LED control script"]),
    );
    ctx.evidence.put(led::MARKER, "Verified", "").expect("led marker");
    ctx.evidence.put(sensor::MARKER, "Verified", "").expect("dht marker");
    ctx.evidence.put(ALL_PASSED_MARKER, "Verified", "").expect("all marker");

    let report = milestones::grade(&ctx, None);
    assert_eq!(report.possible, 100);
    assert_eq!(report.earned, 100);
    assert_eq!(status(&report, "3.5"), GroupStatus::Skipped);
    assert_eq!(report.exit_code(), 0);
}

#[test]
fn empty_repository_skips_dependent_cases() {
    let tmp = tempdir().expect("tempdir");
    let report = milestones::grade(&ctx(tmp.path(), ScriptedVcs::with_subjects(&[])), None);

    assert_eq!(status(&report, "1.1"), GroupStatus::Failed);
    assert_eq!(status(&report, "1.2"), GroupStatus::Skipped);
    assert_eq!(status(&report, "1.5"), GroupStatus::Failed);
    assert_eq!(status(&report, "2.6"), GroupStatus::Skipped);
    assert_eq!(status(&report, "3.1"), GroupStatus::Failed);
    assert_eq!(report.earned, 0);
    assert_eq!(report.exit_code(), 1);
}

#[test]
fn retry_without_error_name_or_counter_is_rejected() {
    let tmp = tempdir().expect("tempdir");
    fs::write(
        tmp.path().join("dht22.py"),
        "import board\nimport adafruit_dht\ndht = adafruit_dht.DHT22(board.D4)\nwhile True:\n    try:\n        print(dht.temperature)\n    except:\n        pass\n",
    )
    .expect("dht22");
    let report = milestones::grade(&ctx(tmp.path(), ScriptedVcs::default()), Some(2));

    let case = report.case("2.5").expect("case 2.5");
    assert_eq!(case.status, GroupStatus::Failed);
    assert_eq!(case.earned, 0);
    let message = case.message.as_deref().unwrap_or_default();
    assert!(message.contains("loop=true, try/except=true, error handling=false"));
    assert_eq!(status(&report, "2.3"), GroupStatus::Passed);
    assert_eq!(status(&report, "2.4"), GroupStatus::Passed);
}

#[test]
fn sensor_without_loop_keeps_creation_points_but_loses_retry() {
    let tmp = tempdir().expect("tempdir");
    fs::write(tmp.path().join("dht22.py"), SENSOR_NO_LOOP).expect("dht22");
    let report = milestones::grade(&ctx(tmp.path(), ScriptedVcs::default()), Some(2));

    assert_eq!(status(&report, "2.1"), GroupStatus::Passed);
    assert_eq!(status(&report, "2.2"), GroupStatus::Passed);
    assert_eq!(status(&report, "2.3"), GroupStatus::Passed);
    assert_eq!(status(&report, "2.4"), GroupStatus::Passed);
    let retry = report.case("2.5").expect("case 2.5");
    assert_eq!(retry.status, GroupStatus::Failed);
    assert_eq!(retry.earned, 0);
    let message = retry.message.as_deref().unwrap_or_default();
    assert!(message.contains("loop=false, try/except=true, error handling=true"));
    assert_eq!(report.exit_code(), 1);
}

#[test]
fn mostly_generic_messages_fail() {
    let tmp = tempdir().expect("tempdir");
    let vcs = ScriptedVcs::with_subjects(&["update", "wip", "fix", "add LED control script"]);
    let report = milestones::grade(&ctx(tmp.path(), vcs), Some(3));
    assert_eq!(status(&report, "3.2"), GroupStatus::Failed);

    let vcs = ScriptedVcs::with_subjects(&["update", "add LED control script"]);
    let report = milestones::grade(&ctx(tmp.path(), vcs), Some(3));
    assert_eq!(status(&report, "3.2"), GroupStatus::Passed);
}

#[test]
fn git_unavailable_skips_git_cases() {
    let tmp = tempdir().expect("tempdir");
    complete_repo(tmp.path());
    let report = milestones::grade(&ctx(tmp.path(), ScriptedVcs::unavailable()), Some(3));

    assert_eq!(status(&report, "3.1"), GroupStatus::Skipped);
    assert_eq!(status(&report, "3.2"), GroupStatus::Skipped);
    assert_eq!(report.milestones.len(), 1);
    assert_eq!(report.possible, 40);
}

#[test]
fn individual_markers_satisfy_local_tests_case() {
    let tmp = tempdir().expect("tempdir");
    complete_repo(tmp.path());
    let ctx = ctx(tmp.path(), ScriptedVcs::with_subjects(&["a commit", "another commit"]));
    ctx.evidence.put(led::MARKER, "Verified", "").expect("led marker");
    let report = milestones::grade(&ctx, Some(3));
    assert_eq!(status(&report, "3.4"), GroupStatus::Failed);
    assert!(
        report
            .case("3.4")
            .and_then(|c| c.message.as_deref())
            .is_some_and(|m| m.contains("led_scripts_verified"))
    );

    ctx.evidence.put(sensor::MARKER, "Verified", "").expect("dht marker");
    let report = milestones::grade(&ctx, Some(3));
    assert_eq!(status(&report, "3.4"), GroupStatus::Passed);
}

#[test]
fn rgb_bonus_needs_gpio_reference() {
    let tmp = tempdir().expect("tempdir");
    fs::write(tmp.path().join("led_rgb.py"), "import time\ntime.sleep(1)\n").expect("rgb");
    let report = milestones::grade(&ctx(tmp.path(), ScriptedVcs::default()), Some(3));
    let case = report.case("3.5").expect("case 3.5");
    assert_eq!(case.status, GroupStatus::Failed);
    assert_eq!(case.points, 0);
}

#[test]
fn json_report_shape() {
    let tmp = tempdir().expect("tempdir");
    complete_repo(tmp.path());
    let report = milestones::grade(&ctx(tmp.path(), ScriptedVcs::default()), Some(1));
    let value = serde_json::to_value(&report).expect("json");

    assert_eq!(value["possible"], 25);
    let cases = value["milestones"][0]["cases"].as_array().expect("cases");
    assert_eq!(cases.len(), 5);
    assert_eq!(cases[0]["id"], "1.1");
    assert_eq!(cases[0]["status"], "passed");
    assert!(cases[0].get("message").is_none());
    assert_eq!(cases[4]["status"], "failed");
}

#[test]
fn text_report_lists_every_case() {
    let tmp = tempdir().expect("tempdir");
    complete_repo(tmp.path());
    let report = milestones::grade(&ctx(tmp.path(), ScriptedVcs::default()), None);
    let mut rep = Reporter::captured();
    milestones::print_report(&mut rep, &report);

    let transcript = rep.transcript();
    assert!(transcript.contains("MILESTONE 1: LED Control (25 points)"));
    assert!(transcript.contains("[PASS] 1.1 LED script exists (5/5 pts)"));
    assert!(transcript.contains("[FAIL] 1.5 LED markers present (0/5 pts)"));
    assert!(transcript.contains(&format!("Score: {}/100", report.earned)));
}
