//! Remote milestone grader.
//!
//! Three milestones worth 100 points. Cases are independent: a case whose
//! input file is missing is skipped rather than failed (the existence case
//! already charged for it), and git-dependent cases are skipped when git is
//! unavailable or slow. The grader only reads; it never writes markers.

use crate::core::context::HarnessContext;
use crate::core::error::CheckError;
use crate::core::evidence::ALL_PASSED_MARKER;
use crate::core::heuristic::{RetryEvidence, TextPattern};
use crate::core::report::{GroupStatus, Reporter};
use crate::core::rules::{self, SourceFile};
use crate::core::time;
use crate::plugins::{led, sensor};
use serde::Serialize;

const GENERIC_SUBJECTS: &[&str] = &["update", "fix", "test", "wip", ".", "...", "asdf"];
const DESCRIPTIVE_WINDOW: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseOutcome {
    Passed,
    Failed(String),
    Skipped(String),
}

impl CaseOutcome {
    pub fn status(&self) -> GroupStatus {
        match self {
            CaseOutcome::Passed => GroupStatus::Passed,
            CaseOutcome::Failed(_) => GroupStatus::Failed,
            CaseOutcome::Skipped(_) => GroupStatus::Skipped,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            CaseOutcome::Passed => None,
            CaseOutcome::Failed(m) | CaseOutcome::Skipped(m) => Some(m),
        }
    }
}

fn failed(expected: &str, actual: &str, suggestion: &str) -> CaseOutcome {
    CaseOutcome::Failed(format!(
        "Expected: {}\nActual: {}\n\nSuggestion: {}",
        expected, actual, suggestion
    ))
}

pub struct Case {
    pub id: &'static str,
    pub title: &'static str,
    pub points: u32,
    run: fn(&HarnessContext) -> CaseOutcome,
}

pub struct Milestone {
    pub number: u8,
    pub title: &'static str,
    pub cases: Vec<Case>,
}

impl Milestone {
    pub fn points(&self) -> u32 {
        self.cases.iter().map(|c| c.points).sum()
    }
}

fn case(
    id: &'static str,
    title: &'static str,
    points: u32,
    run: fn(&HarnessContext) -> CaseOutcome,
) -> Case {
    Case {
        id,
        title,
        points,
        run,
    }
}

pub fn milestones() -> Vec<Milestone> {
    vec![
        Milestone {
            number: 1,
            title: "LED Control",
            cases: vec![
                case("1.1", "LED script exists", 5, led_script_exists),
                case("1.2", "LED script syntax", 5, led_script_syntax),
                case("1.3", "RPi.GPIO import", 5, led_gpio_import),
                case("1.4", "GPIO mode configuration", 5, led_setmode),
                case("1.5", "LED markers present", 5, led_marker),
            ],
        },
        Milestone {
            number: 2,
            title: "DHT22 Sensor with Retry Logic",
            cases: vec![
                case("2.1", "DHT22 script exists", 5, sensor_script_exists),
                case("2.2", "DHT22 script syntax", 5, sensor_script_syntax),
                case("2.3", "Adafruit DHT imports", 5, sensor_imports),
                case("2.4", "DHT22 sensor creation", 5, sensor_creation),
                case("2.5", "Retry logic", 10, sensor_retry_logic),
                case("2.6", "DHT22 markers present", 5, sensor_marker),
            ],
        },
        Milestone {
            number: 3,
            title: "Git Workflow",
            cases: vec![
                case("3.1", "Multiple commits", 10, multiple_commits),
                case("3.2", "Descriptive commit messages", 10, descriptive_messages),
                case("3.3", "All required files present", 10, required_files),
                case("3.4", "All local tests passed", 10, local_tests_passed),
                case("3.5", "RGB LED script (bonus)", 0, rgb_bonus),
            ],
        },
    ]
}

/// Reads `name` under the repository root, or skips the case when absent.
fn with_source(
    ctx: &HarnessContext,
    name: &str,
    check: impl FnOnce(&SourceFile) -> CaseOutcome,
) -> CaseOutcome {
    match SourceFile::load_optional(&ctx.artifact(name)) {
        Ok(Some(file)) => check(&file),
        Ok(None) => CaseOutcome::Skipped(format!("{} not found", name)),
        Err(err) => CaseOutcome::Failed(err.to_string()),
    }
}

fn exists_case(ctx: &HarnessContext, name: &str, what: &str) -> CaseOutcome {
    match rules::check_exists(&ctx.artifact(name)) {
        Ok(_) => CaseOutcome::Passed,
        Err(_) => failed(
            &format!("{} in repository root", name),
            "file not found",
            &format!("create {} with your {} code.", name, what),
        ),
    }
}

fn syntax_case(file: &SourceFile) -> CaseOutcome {
    match rules::check_syntax(file) {
        Ok(_) => CaseOutcome::Passed,
        Err(CheckError::Syntax { line, message }) => failed(
            "valid Python syntax",
            &format!("SyntaxError on line {}: {}", line, message),
            &format!("check line {} for a missing colon or an unbalanced bracket.", line),
        ),
        Err(err) => CaseOutcome::Failed(err.to_string()),
    }
}

fn marker_listing(ctx: &HarnessContext) -> String {
    let names = ctx.evidence.list().unwrap_or_default();
    format!("found markers: [{}]", names.join(", "))
}

fn led_script_exists(ctx: &HarnessContext) -> CaseOutcome {
    exists_case(ctx, &ctx.config.artifacts.led_script, "LED control")
}

fn led_script_syntax(ctx: &HarnessContext) -> CaseOutcome {
    with_source(ctx, &ctx.config.artifacts.led_script, syntax_case)
}

fn led_gpio_import(ctx: &HarnessContext) -> CaseOutcome {
    let pattern =
        TextPattern::any_literal(&["import RPi.GPIO", "from RPi import GPIO", "from RPi.GPIO"]);
    with_source(ctx, &ctx.config.artifacts.led_script, |file| {
        if rules::check_pattern(file, "RPi.GPIO import", &pattern).is_ok() {
            CaseOutcome::Passed
        } else {
            failed(
                "RPi.GPIO import for LED control",
                "no RPi.GPIO import found",
                "add `import RPi.GPIO as GPIO` at the top of the script.",
            )
        }
    })
}

fn led_setmode(ctx: &HarnessContext) -> CaseOutcome {
    let pattern = TextPattern::any_literal(&["GPIO.setmode", "setmode("]);
    with_source(ctx, &ctx.config.artifacts.led_script, |file| {
        if rules::check_pattern(file, "GPIO mode configuration", &pattern).is_ok() {
            CaseOutcome::Passed
        } else {
            failed(
                "GPIO mode configuration (BCM or BOARD)",
                "no GPIO.setmode() found",
                "call GPIO.setmode(GPIO.BCM) before using any pin.",
            )
        }
    })
}

fn led_marker(ctx: &HarnessContext) -> CaseOutcome {
    if !ctx.evidence.dir_exists() {
        return failed(
            &format!("{}/ directory with local test results", ctx.config.evidence.dir),
            "directory not found",
            "run validate-pi on your Raspberry Pi, then commit the markers.",
        );
    }
    if ctx.evidence.exists(led::MARKER) {
        return CaseOutcome::Passed;
    }
    failed(
        &format!("{}.txt marker", led::MARKER),
        &marker_listing(ctx),
        "run validate-pi again to generate the LED marker.",
    )
}

fn sensor_script_exists(ctx: &HarnessContext) -> CaseOutcome {
    exists_case(ctx, &ctx.config.artifacts.sensor_script, "DHT22 sensor")
}

fn sensor_script_syntax(ctx: &HarnessContext) -> CaseOutcome {
    with_source(ctx, &ctx.config.artifacts.sensor_script, syntax_case)
}

fn sensor_imports(ctx: &HarnessContext) -> CaseOutcome {
    let board = TextPattern::any_literal(&["import board", "from board"]);
    with_source(ctx, &ctx.config.artifacts.sensor_script, |file| {
        let mut missing = Vec::new();
        if !board.matches(&file.text) {
            missing.push("board");
        }
        if !file.text.contains("adafruit_dht") {
            missing.push("adafruit_dht");
        }
        if missing.is_empty() {
            return CaseOutcome::Passed;
        }
        failed(
            "required imports for the DHT22 sensor",
            &format!("missing imports: {}", missing.join(", ")),
            "add `import board` and `import adafruit_dht` at the top of the script.",
        )
    })
}

fn sensor_creation(ctx: &HarnessContext) -> CaseOutcome {
    let pattern = TextPattern::any_literal(&["DHT22(", "DHT11(", "adafruit_dht."]);
    with_source(ctx, &ctx.config.artifacts.sensor_script, |file| {
        if rules::check_pattern(file, "DHT22 sensor creation", &pattern).is_ok() {
            CaseOutcome::Passed
        } else {
            failed(
                "DHT22 sensor object creation",
                "no DHT22/DHT11 sensor creation found",
                "create the sensor with `dht = adafruit_dht.DHT22(board.D4)`.",
            )
        }
    })
}

fn sensor_retry_logic(ctx: &HarnessContext) -> CaseOutcome {
    with_source(ctx, &ctx.config.artifacts.sensor_script, |file| {
        match rules::check_retry_shape(file, true) {
            Ok(_) => CaseOutcome::Passed,
            Err(err) => {
                let e = RetryEvidence::scan(&file.text);
                CaseOutcome::Failed(format!(
                    "CRITICAL: DHT22 retry logic not detected!\n\n\
                     Expected: loop with try/except to handle DHT22 read failures\n\
                     Actual: found loop={}, try/except={}, error handling={}\n\n{}",
                    e.has_loop,
                    e.has_try_except,
                    e.has_error_name || e.has_retry_indicator,
                    err.remediation().unwrap_or_default()
                ))
            }
        }
    })
}

fn sensor_marker(ctx: &HarnessContext) -> CaseOutcome {
    if !ctx.evidence.dir_exists() {
        return CaseOutcome::Skipped(format!("no {}/ directory", ctx.config.evidence.dir));
    }
    if ctx.evidence.exists(sensor::MARKER) {
        return CaseOutcome::Passed;
    }
    failed(
        &format!("{}.txt marker", sensor::MARKER),
        &marker_listing(ctx),
        "run validate-pi to generate the DHT22 marker.",
    )
}

fn git_skip(err: &CheckError) -> Option<CaseOutcome> {
    err.is_inconclusive()
        .then(|| CaseOutcome::Skipped(format!("git not usable: {}", err)))
}

fn multiple_commits(ctx: &HarnessContext) -> CaseOutcome {
    let required = ctx.config.git.min_commits;
    match rules::check_commit_history(ctx.vcs.as_ref(), None, required, None) {
        Ok(_) => CaseOutcome::Passed,
        Err(CheckError::TooFewCommits { found, required }) => failed(
            &format!("at least {} commits", required),
            &format!("{} commit(s) found", found),
            "commit each piece of work separately: `git commit -m \"add LED script\"`.",
        ),
        Err(err) => git_skip(&err).unwrap_or_else(|| CaseOutcome::Failed(err.to_string())),
    }
}

fn is_generic(subject: &str) -> bool {
    let subject = subject.trim().to_lowercase();
    subject.chars().count() < 3 || GENERIC_SUBJECTS.contains(&subject.as_str())
}

fn descriptive_messages(ctx: &HarnessContext) -> CaseOutcome {
    let commits = match ctx.vcs.history(Some(DESCRIPTIVE_WINDOW)) {
        Ok(commits) => commits,
        Err(err) => {
            let err = CheckError::from(err);
            return git_skip(&err).unwrap_or_else(|| CaseOutcome::Failed(err.to_string()));
        }
    };
    let generic: Vec<String> = commits
        .iter()
        .filter(|c| !c.subject.is_empty() && is_generic(&c.subject))
        .map(|c| format!("{} {}", c.id, c.subject))
        .collect();
    if generic.is_empty() || generic.len() * 2 <= commits.len() {
        return CaseOutcome::Passed;
    }
    let shown: Vec<&str> = generic.iter().take(3).map(String::as_str).collect();
    failed(
        "descriptive commit messages",
        &format!("messages too short or generic: {}", shown.join("; ")),
        "describe the change, e.g. \"implement DHT22 reading with retry\", not \"update\".",
    )
}

fn required_files(ctx: &HarnessContext) -> CaseOutcome {
    let artifacts = &ctx.config.artifacts;
    let mut missing = Vec::new();
    for name in [&artifacts.led_script, &artifacts.sensor_script] {
        if !ctx.artifact(name).exists() {
            missing.push(name.clone());
        }
    }
    if !ctx.evidence.dir_exists() {
        missing.push(format!("{}/", ctx.config.evidence.dir));
    }
    if missing.is_empty() {
        return CaseOutcome::Passed;
    }
    failed(
        "all required files present",
        &format!("missing: {}", missing.join(", ")),
        "create the missing scripts and run validate-pi to create the marker directory.",
    )
}

fn local_tests_passed(ctx: &HarnessContext) -> CaseOutcome {
    if !ctx.evidence.dir_exists() {
        return failed(
            &format!("{}/ directory", ctx.config.evidence.dir),
            "directory not found",
            "run validate-pi on your Raspberry Pi.",
        );
    }
    if ctx.evidence.exists(ALL_PASSED_MARKER)
        || (ctx.evidence.exists(led::MARKER) && ctx.evidence.exists(sensor::MARKER))
    {
        return CaseOutcome::Passed;
    }
    failed(
        &format!("{}.txt (or both LED and DHT22 markers)", ALL_PASSED_MARKER),
        &marker_listing(ctx),
        "fix the failing checks, run validate-pi again, then commit and push the markers.",
    )
}

fn rgb_bonus(ctx: &HarnessContext) -> CaseOutcome {
    let name = &ctx.config.artifacts.rgb_script;
    if !ctx.artifact(name).exists() {
        return CaseOutcome::Skipped(format!("{} not found, optional bonus", name));
    }
    with_source(ctx, name, |file| match syntax_case(file) {
        CaseOutcome::Passed if !file.text.contains("GPIO") => failed(
            &format!("GPIO usage in {}", name),
            "no GPIO reference found",
            "the RGB script should drive the LEDs through GPIO.",
        ),
        other => other,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub id: String,
    pub title: String,
    pub points: u32,
    pub earned: u32,
    pub status: GroupStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MilestoneReport {
    pub number: u8,
    pub title: String,
    pub earned: u32,
    pub possible: u32,
    pub cases: Vec<CaseReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GradeReport {
    pub run_id: String,
    pub generated: String,
    pub earned: u32,
    pub possible: u32,
    pub milestones: Vec<MilestoneReport>,
}

impl GradeReport {
    pub fn cases(&self) -> impl Iterator<Item = &CaseReport> {
        self.milestones.iter().flat_map(|m| m.cases.iter())
    }

    pub fn case(&self, id: &str) -> Option<&CaseReport> {
        self.cases().find(|c| c.id == id)
    }

    pub fn count(&self, status: GroupStatus) -> usize {
        self.cases().filter(|c| c.status == status).count()
    }

    pub fn exit_code(&self) -> u8 {
        if self.count(GroupStatus::Failed) == 0 { 0 } else { 1 }
    }
}

/// Runs every case of every milestone, or of milestone `only`.
pub fn grade(ctx: &HarnessContext, only: Option<u8>) -> GradeReport {
    let mut reports = Vec::new();
    for milestone in milestones() {
        if only.is_some_and(|n| n != milestone.number) {
            continue;
        }
        let cases: Vec<CaseReport> = milestone
            .cases
            .iter()
            .map(|case| {
                let outcome = (case.run)(ctx);
                CaseReport {
                    id: case.id.to_string(),
                    title: case.title.to_string(),
                    points: case.points,
                    earned: if outcome == CaseOutcome::Passed { case.points } else { 0 },
                    status: outcome.status(),
                    message: outcome.message().map(str::to_string),
                }
            })
            .collect();
        reports.push(MilestoneReport {
            number: milestone.number,
            title: milestone.title.to_string(),
            earned: cases.iter().map(|c| c.earned).sum(),
            possible: milestone.points(),
            cases,
        });
    }
    GradeReport {
        run_id: time::new_run_id(),
        generated: time::now_iso8601(),
        earned: reports.iter().map(|m| m.earned).sum(),
        possible: reports.iter().map(|m| m.possible).sum(),
        milestones: reports,
    }
}

pub fn print_report(rep: &mut Reporter, report: &GradeReport) {
    for m in &report.milestones {
        rep.header(&format!("MILESTONE {}: {} ({} points)", m.number, m.title, m.possible));
        for c in &m.cases {
            let line = format!("{} {} ({}/{} pts)", c.id, c.title, c.earned, c.points);
            match c.status {
                GroupStatus::Passed => rep.pass(&line),
                GroupStatus::Failed => {
                    rep.fail(&line);
                    if let Some(msg) = &c.message {
                        rep.note(msg);
                    }
                }
                GroupStatus::Skipped => rep.skip(&format!(
                    "{}: {}",
                    line,
                    c.message.as_deref().unwrap_or("skipped")
                )),
            }
        }
    }
    rep.header("SCORE");
    rep.info(&format!(
        "Score: {}/{} (passed={} failed={} skipped={})",
        report.earned,
        report.possible,
        report.count(GroupStatus::Passed),
        report.count(GroupStatus::Failed),
        report.count(GroupStatus::Skipped)
    ));
}
