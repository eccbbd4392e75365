//! Raspberry Pi detection and the manual wiring checklist.
//!
//! Nothing here touches GPIO. Off-device the group is skipped; on-device it
//! only records that the student was shown the checklist.

use crate::core::config::HardwareConfig;
use crate::core::context::HarnessContext;
use crate::core::error::CheckError;
use crate::core::report::{GroupStatus, Reporter};
use crate::plugins::Profile;
use std::fs;

pub const DETECTED_MARKER: &str = "hardware_detected";
pub const CHECKED_MARKER: &str = "hardware_checked";

/// Any configured signature in the cpuinfo file. Unreadable = not a Pi.
pub fn is_raspberry_pi(config: &HardwareConfig) -> bool {
    fs::read_to_string(&config.cpuinfo)
        .map(|text| config.signatures.iter().any(|s| text.contains(s.as_str())))
        .unwrap_or(false)
}

pub fn check_hardware(
    ctx: &HarnessContext,
    rep: &mut Reporter,
    profile: Profile,
) -> Result<GroupStatus, CheckError> {
    rep.header("HARDWARE VERIFICATION (Raspberry Pi)");
    if !is_raspberry_pi(&ctx.config.hardware) {
        rep.skip("Not running on a Raspberry Pi, hardware checks skipped");
        rep.note("Run this on the Raspberry Pi for the hardware checklist.");
        return Ok(GroupStatus::Skipped);
    }
    rep.pass("Raspberry Pi detected");

    match profile {
        Profile::Workstation => {
            rep.info("DHT22 uses a one-wire protocol (not I2C)");
            rep.info("Manual verification required:");
            rep.note("- Is the sensor data pin wired to GPIO 4?");
            rep.note("- Is the 10K pull-up resistor in place?");
            rep.note("- Is VCC connected (3.3V or 5V)?");
            ctx.evidence.put(
                DETECTED_MARKER,
                "Hardware scan",
                "DHT22: manual verification required (GPIO 4)",
            )?;
            rep.info(&format!("Marker created: {}.txt", DETECTED_MARKER));
        }
        Profile::Device => {
            rep.info("Check the wiring before running the scripts:");
            rep.note("- LED on GPIO 17 through a 220 ohm resistor");
            rep.note("- RGB LED on GPIO 17, 27 and 22 (bonus)");
            rep.note("- DHT22 data on GPIO 4 with a 10K pull-up");
            ctx.evidence
                .put(CHECKED_MARKER, "Verified", "Hardware check completed")?;
        }
    }
    Ok(GroupStatus::Passed)
}
