//! LED script check-group.

use crate::core::context::HarnessContext;
use crate::core::error::{CheckError, CheckResultExt};
use crate::core::report::{GroupStatus, Reporter};
use crate::core::rules::{self, SYNTAX_HINT, SourceFile};
use crate::plugins::Profile;

pub const MARKER: &str = "led_scripts_verified";

const IMPORT_HINT: &str = "Add: import RPi.GPIO as GPIO";

fn required_tokens(profile: Profile) -> &'static [&'static str] {
    match profile {
        Profile::Workstation => &["RPi.GPIO", "GPIO"],
        Profile::Device => &["GPIO"],
    }
}

pub fn check_led_scripts(
    ctx: &HarnessContext,
    rep: &mut Reporter,
    profile: Profile,
) -> Result<GroupStatus, CheckError> {
    rep.header("LED SCRIPTS VERIFICATION");
    let artifacts = &ctx.config.artifacts;

    let file = SourceFile::load(&ctx.artifact(&artifacts.led_script))
        .hint(format!("Create {} with your LED control code.", artifacts.led_script))?;
    rep.pass(&format!("{} found", file.file_name()));

    rep.pass(&rules::check_syntax(&file).hint(SYNTAX_HINT)?);
    rules::check_tokens(&file, required_tokens(profile)).hint(IMPORT_HINT)?;
    rep.pass("RPi.GPIO import present");

    check_bonus_script(ctx, rep);

    let detail = match profile {
        Profile::Workstation => "",
        Profile::Device => "LED scripts validated",
    };
    ctx.evidence
        .put(MARKER, profile.label("LED scripts verified"), detail)?;
    rep.info(&format!("Marker created: {}.txt", MARKER));
    Ok(GroupStatus::Passed)
}

/// The RGB chaser is a bonus: reported, never counted.
fn check_bonus_script(ctx: &HarnessContext, rep: &mut Reporter) {
    let name = &ctx.config.artifacts.rgb_script;
    match SourceFile::load_optional(&ctx.artifact(name)) {
        Ok(Some(file)) => {
            rep.pass(&format!("{} found (bonus)", name));
            match rules::check_syntax(&file) {
                Ok(msg) => rep.pass(&msg),
                Err(err) => rep.warn(&format!("{}: {}", name, err)),
            }
        }
        Ok(None) => rep.skip(&format!("{} not found (optional)", name)),
        Err(err) => rep.warn(&format!("{}: {}", name, err)),
    }
}
