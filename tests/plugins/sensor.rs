use gradegate::core::config::Config;
use gradegate::core::context::HarnessContext;
use gradegate::core::heuristic::RetryEvidence;
use gradegate::core::report::{GroupStatus, Reporter, Severity};
use gradegate::core::vcs::ScriptedVcs;
use gradegate::plugins::{Profile, sensor};
use std::fs;
use tempfile::tempdir;

fn run(script: &str, profile: Profile) -> (GroupStatus, String, bool) {
    let tmp = tempdir().expect("tempdir");
    fs::write(tmp.path().join("dht22.py"), script).expect("write");
    let ctx = HarnessContext::new(tmp.path(), Config::default()).with_vcs(ScriptedVcs::default());
    let mut rep = Reporter::captured();
    let status = rep.run_group("DHT22", Severity::Mandatory, |r| {
        sensor::check_sensor_script(&ctx, r, profile)
    });
    (status, rep.transcript(), ctx.evidence.exists(sensor::MARKER))
}

#[test]
fn missing_imports_are_enumerated() {
    let (status, transcript, marker) = run("import time\nprint('hi')\n", Profile::Workstation);
    assert_eq!(status, GroupStatus::Failed);
    assert!(transcript.contains("[FAIL] Missing required tokens: board, adafruit_dht"));
    assert!(transcript.contains("  import adafruit_dht"));
    assert!(!marker);
}

#[test]
fn syntax_error_reports_line_and_hint() {
    let (status, transcript, _) = run(
        "import board\nimport adafruit_dht\nwhile True\n    pass\n",
        Profile::Device,
    );
    assert_eq!(status, GroupStatus::Failed);
    assert!(transcript.contains("[FAIL] Syntax error on line 3: expected ':'"));
    assert!(transcript.contains("missing colon"));
}

#[test]
fn loop_without_handler_gets_its_own_remediation() {
    let (status, transcript, _) = run(
        "import board\nimport adafruit_dht\nwhile True:\n    print(1)\n",
        Profile::Device,
    );
    assert_eq!(status, GroupStatus::Failed);
    assert!(transcript.contains("[FAIL] CRITICAL: No try/except error handling found!"));
    assert!(transcript.contains("Wrap your reading code in try/except."));
}

#[test]
fn exception_counts_like_runtime_error() {
    let broad = "for i in range(2):\n    try:\n        read()\n    except Exception:\n        pass\n";
    let evidence = RetryEvidence::scan(broad);
    assert!(evidence.has_error_name);
    assert!(evidence.is_retry_shaped());
}

#[test]
fn device_marker_carries_detail() {
    let tmp = tempdir().expect("tempdir");
    fs::write(
        tmp.path().join("dht22.py"),
        "import board\nimport adafruit_dht\nfor attempt in range(5):\n    try:\n        x = 1\n        break\n    except RuntimeError:\n        pass\n",
    )
    .expect("write");
    let ctx = HarnessContext::new(tmp.path(), Config::default()).with_vcs(ScriptedVcs::default());
    let mut rep = Reporter::captured();
    sensor::check_sensor_script(&ctx, &mut rep, Profile::Device).expect("sensor ok");

    let marker = ctx.evidence.read(sensor::MARKER).expect("marker");
    assert_eq!(marker.label, "Verified");
    assert_eq!(marker.detail, "DHT22 script with retry logic validated");
}
